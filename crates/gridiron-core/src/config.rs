// Configuration loading and parsing (contests.toml, strategy.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pool::player::Position;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },

    #[error("unknown contest profile `{name}`")]
    UnknownContest { name: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub contests: HashMap<String, ContestRules>,
    pub strategy: StrategyConfig,
    pub run: RunConfig,
    pub data_paths: DataPaths,
}

impl Config {
    /// Look up a contest profile by key (e.g. "small_gpp").
    pub fn contest(&self, name: &str) -> Result<&ContestRules, ConfigError> {
        self.contests
            .get(name)
            .ok_or_else(|| ConfigError::UnknownContest {
                name: name.to_string(),
            })
    }

    /// The contest profile selected by `[run] contest`.
    pub fn active_contest(&self) -> Result<&ContestRules, ConfigError> {
        self.contest(&self.run.contest)
    }
}

// ---------------------------------------------------------------------------
// Shared value types
// ---------------------------------------------------------------------------

/// An inclusive `(min, max)` range written as a two-element TOML array.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "(f64, f64)")]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl From<(f64, f64)> for Band {
    fn from((min, max): (f64, f64)) -> Self {
        Band { min, max }
    }
}

impl Band {
    pub fn new(min: f64, max: f64) -> Self {
        Band { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Widen the band by `fraction` of each bound: the lower bound shrinks
    /// to `min * (1 - fraction)` and the upper grows to `max * (1 + fraction)`.
    pub fn relaxed(&self, fraction: f64) -> Band {
        Band {
            min: self.min * (1.0 - fraction),
            max: self.max * (1.0 + fraction),
        }
    }

    pub fn overlaps(&self, other: &Band) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

// ---------------------------------------------------------------------------
// contests.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[contests.*]` tables in contests.toml.
#[derive(Debug, Clone, Deserialize)]
struct ContestsFile {
    contests: HashMap<String, ContestRules>,
}

/// Target ranges and tuning for one contest-size profile.
#[derive(Debug, Clone, Deserialize)]
pub struct ContestRules {
    pub name: String,
    pub entries: u32,
    /// Band for the summed ownership of all nine players.
    pub ownership_total_range: Band,
    /// Band for the average per-player ownership; its midpoint is the
    /// ranker's ownership target.
    pub ownership_target_avg: Band,
    pub qb_ownership_target: Band,
    pub core_rb_ownership: Band,
    pub ultra_leverage_required: (usize, usize),
    pub core_players_required: (usize, usize),
    pub heavy_chalk_max: usize,
    /// QB plus same-team teammates (2 or 3).
    pub stack_size: usize,
    pub bring_back_pct: f64,
    /// Target share of the batch whose QB sits in `qb_ownership_target`.
    pub leverage_qb_pct: f64,
    /// Target share of the batch stacking the QB with two teammates.
    pub game_stack_pct: f64,
    pub core_rb_usage_pct: f64,
    pub te_punt_pct: f64,
    pub te_punt_salary_max: u32,
    /// Fraction of the jittered candidate ranking kept for the weighted draw.
    pub top_fraction: f64,
    pub projection_weight: f64,
    pub ownership_weight: f64,
    pub payout: PayoutProfile,
}

impl ContestRules {
    /// Number of same-team teammates the builder must add next to the QB.
    pub fn stack_teammates(&self) -> usize {
        self.stack_size.saturating_sub(1).clamp(1, 2)
    }
}

/// Prize distribution shape for a contest profile.
#[derive(Debug, Clone, Deserialize)]
pub struct PayoutProfile {
    /// Share of the prize pool paid to first place.
    pub first_place_share: f64,
    /// Explicit shares of the pool for places 2, 3, ... in order.
    #[serde(default)]
    pub top_shares: Vec<f64>,
    /// Fraction of entries that cash.
    pub places_paid_fraction: f64,
    /// Flat payout for cashing places outside the explicit table, as a
    /// multiple of the entry fee.
    pub flat_payout_multiple: f64,
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire strategy.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StrategyFile {
    roster: RosterConfig,
    selection: SelectionConfig,
    builder: BuilderConfig,
    validation: ValidationConfig,
    tiers: TierThresholds,
    dedup: DedupConfig,
    ranking: RankingConfig,
    simulation: SimulationConfig,
    variance: PositionVariance,
    run: RunConfig,
    data_paths: DataPaths,
}

/// The public strategy config assembled from the strategy.toml sections.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub roster: RosterConfig,
    pub selection: SelectionConfig,
    pub builder: BuilderConfig,
    pub validation: ValidationConfig,
    pub tiers: TierThresholds,
    pub dedup: DedupConfig,
    pub ranking: RankingConfig,
    pub simulation: SimulationConfig,
    pub variance: PositionVariance,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
    pub salary_cap: u32,
    /// Minimum share of the cap a lineup must spend.
    pub salary_floor_fraction: f64,
}

impl RosterConfig {
    pub fn salary_floor(&self) -> u32 {
        (self.salary_cap as f64 * self.salary_floor_fraction).round() as u32
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectionConfig {
    pub jitter_low: f64,
    pub jitter_high: f64,
    /// Lower clamp on the ownership leverage term.
    pub leverage_floor: f64,
}

/// Per-step budget fractions and correlation probabilities for the builder.
#[derive(Debug, Clone, Deserialize)]
pub struct BuilderConfig {
    /// QB ceiling as a share of the full salary cap.
    pub qb_cap_fraction: f64,
    /// Remaining fractions are shares of the budget left at that step.
    pub stack_fraction: f64,
    pub rb_fraction: f64,
    pub wr_fraction: f64,
    pub te_fraction: f64,
    pub flex_fraction: f64,
    pub flex_te_pct: f64,
    pub bring_back_max_ownership: f64,
    pub dst_correlation_pct: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// How far (as a fraction) the total-ownership band is widened.
    pub ownership_relaxation: f64,
    #[serde(default)]
    pub enforce_structure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TierThresholds {
    pub ultra_leverage_max: f64,
    pub core_min: f64,
    pub core_max: f64,
    pub chalk_min: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DedupConfig {
    /// Shared players at or above which two lineups count as duplicates.
    pub overlap_threshold: usize,
    /// Also reject lineups sharing the QB and two of the top-3 salaries.
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    pub projection_normalizer: f64,
    pub exposure_threshold: f64,
    pub exposure_penalty: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    pub iterations: usize,
    pub field_mean: f64,
    pub field_std_dev: f64,
    pub top_decile_fraction: f64,
    /// Largest field simulated entry by entry. Bigger contests draw the
    /// beaten-by count from the field's tail probability instead.
    #[serde(default)]
    pub field_sample_size: Option<u32>,
}

/// Default score standard deviation per position, used when a pool row
/// carries none.
#[derive(Debug, Clone, Deserialize)]
#[allow(non_snake_case)]
pub struct PositionVariance {
    pub QB: f64,
    pub RB: f64,
    pub WR: f64,
    pub TE: f64,
    pub DST: f64,
}

impl PositionVariance {
    pub fn for_position(&self, pos: Position) -> f64 {
        match pos {
            Position::Quarterback => self.QB,
            Position::RunningBack => self.RB,
            Position::WideReceiver => self.WR,
            Position::TightEnd => self.TE,
            Position::Defense => self.DST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub contest: String,
    pub entry_fee: f64,
    pub num_lineups: usize,
    /// Attempt budget = `num_lineups * attempt_multiplier`.
    pub attempt_multiplier: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub locks: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub player_pool: String,
    pub export_dir: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Parse and validate a config from the raw text of the two files.
///
/// `contests_path` and `strategy_path` are only used for error messages.
pub fn parse_config(
    contests_text: &str,
    contests_path: &Path,
    strategy_text: &str,
    strategy_path: &Path,
) -> Result<Config, ConfigError> {
    let contests_file: ContestsFile =
        toml::from_str(contests_text).map_err(|e| ConfigError::ParseError {
            path: contests_path.to_path_buf(),
            source: e,
        })?;

    let strategy_file: StrategyFile =
        toml::from_str(strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.to_path_buf(),
            source: e,
        })?;

    let strategy = StrategyConfig {
        roster: strategy_file.roster,
        selection: strategy_file.selection,
        builder: strategy_file.builder,
        validation: strategy_file.validation,
        tiers: strategy_file.tiers,
        dedup: strategy_file.dedup,
        ranking: strategy_file.ranking,
        simulation: strategy_file.simulation,
        variance: strategy_file.variance,
    };

    let config = Config {
        contests: contests_file.contests,
        strategy,
        run: strategy_file.run,
        data_paths: strategy_file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Load and validate configuration from `config/contests.toml` and
/// `config/strategy.toml`, relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let contests_path = config_dir.join("contests.toml");
    let contests_text = read_file(&contests_path)?;

    let strategy_path = config_dir.join("strategy.toml");
    let strategy_text = read_file(&strategy_path)?;

    parse_config(&contests_text, &contests_path, &strategy_text, &strategy_path)
}

/// Files seeded into `config/` on first run.
const CONFIG_FILES: [&str; 2] = ["contests.toml", "strategy.toml"];

/// Seed `config/` with any of `contests.toml` / `strategy.toml` it is
/// missing, copied from `defaults/`. Existing files are never touched.
/// Returns the paths written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(Vec::new());
        }
        return Err(seed_error(format!(
            "neither defaults/ nor config/ directory found in {}; \
             run from the project root or ensure defaults/ is present",
            base_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| seed_error(format!("cannot create {}: {e}", config_dir.display())))?;

    let mut seeded = Vec::new();
    for name in CONFIG_FILES {
        let target = config_dir.join(name);
        if copy_if_missing(&defaults_dir.join(name), &target)? {
            seeded.push(target);
        }
    }
    Ok(seeded)
}

/// Copy `source` to `target` unless `target` already exists. Returns
/// whether anything was written.
fn copy_if_missing(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    use std::io::Write;

    if target.exists() {
        return Ok(false);
    }
    let bytes = std::fs::read(source)
        .map_err(|e| seed_error(format!("cannot read {}: {e}", source.display())))?;
    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(mut file) => file
            .write_all(&bytes)
            .map(|()| true)
            .map_err(|e| seed_error(format!("cannot write {}: {e}", target.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(seed_error(format!("cannot create {}: {e}", target.display()))),
    }
}

fn seed_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn check_unit(field: String, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(
            field,
            format!("must be between 0.0 and 1.0 inclusive, got {value}"),
        ));
    }
    Ok(())
}

fn check_band(field: String, band: &Band) -> Result<(), ConfigError> {
    if !band.min.is_finite() || !band.max.is_finite() || band.min > band.max {
        return Err(invalid(
            field,
            format!("min must not exceed max, got ({}, {})", band.min, band.max),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let strategy = &config.strategy;

    if strategy.roster.salary_cap == 0 {
        return Err(invalid("roster.salary_cap", "must be greater than 0"));
    }
    let floor = strategy.roster.salary_floor_fraction;
    if !(floor > 0.0 && floor <= 1.0) {
        return Err(invalid(
            "roster.salary_floor_fraction",
            format!("must be in (0.0, 1.0], got {floor}"),
        ));
    }

    let sel = &strategy.selection;
    if !(sel.jitter_low > 0.0 && sel.jitter_low <= 1.0 && sel.jitter_high >= 1.0) {
        return Err(invalid(
            "selection.jitter_low",
            format!(
                "jitter band must satisfy 0 < low <= 1 <= high, got ({}, {})",
                sel.jitter_low, sel.jitter_high
            ),
        ));
    }
    check_unit("selection.leverage_floor".into(), sel.leverage_floor)?;

    let b = &strategy.builder;
    let fractions: &[(&str, f64)] = &[
        ("builder.qb_cap_fraction", b.qb_cap_fraction),
        ("builder.stack_fraction", b.stack_fraction),
        ("builder.rb_fraction", b.rb_fraction),
        ("builder.wr_fraction", b.wr_fraction),
        ("builder.te_fraction", b.te_fraction),
        ("builder.flex_fraction", b.flex_fraction),
    ];
    for (name, val) in fractions {
        if !(*val > 0.0 && *val <= 1.0) {
            return Err(invalid(*name, format!("must be in (0.0, 1.0], got {val}")));
        }
    }
    check_unit("builder.flex_te_pct".into(), b.flex_te_pct)?;
    check_unit("builder.dst_correlation_pct".into(), b.dst_correlation_pct)?;

    check_unit(
        "validation.ownership_relaxation".into(),
        strategy.validation.ownership_relaxation,
    )?;

    let t = &strategy.tiers;
    if !(t.ultra_leverage_max <= t.core_min && t.core_min <= t.core_max && t.core_max <= t.chalk_min)
    {
        return Err(invalid(
            "tiers",
            "thresholds must be ordered: ultra_leverage_max <= core_min <= core_max <= chalk_min",
        ));
    }

    if strategy.dedup.overlap_threshold == 0 || strategy.dedup.overlap_threshold > 9 {
        return Err(invalid(
            "dedup.overlap_threshold",
            format!("must be in 1..=9, got {}", strategy.dedup.overlap_threshold),
        ));
    }

    if strategy.ranking.projection_normalizer <= 0.0 {
        return Err(invalid("ranking.projection_normalizer", "must be > 0"));
    }
    check_unit(
        "ranking.exposure_threshold".into(),
        strategy.ranking.exposure_threshold,
    )?;

    let sim = &strategy.simulation;
    if sim.iterations == 0 {
        return Err(invalid("simulation.iterations", "must be > 0"));
    }
    if !(sim.field_std_dev >= 0.0) {
        return Err(invalid("simulation.field_std_dev", "must be >= 0"));
    }
    check_unit("simulation.top_decile_fraction".into(), sim.top_decile_fraction)?;
    if sim.field_sample_size == Some(0) {
        return Err(invalid("simulation.field_sample_size", "must be > 0 when set"));
    }

    let v = &strategy.variance;
    for (name, val) in [("QB", v.QB), ("RB", v.RB), ("WR", v.WR), ("TE", v.TE), ("DST", v.DST)] {
        if !(val >= 0.0) {
            return Err(invalid(format!("variance.{name}"), format!("must be >= 0, got {val}")));
        }
    }

    if config.contests.is_empty() {
        return Err(invalid("contests", "at least one contest profile is required"));
    }
    for (key, rules) in &config.contests {
        validate_contest(key, rules)?;
    }

    let run = &config.run;
    if !config.contests.contains_key(&run.contest) {
        return Err(invalid(
            "run.contest",
            format!("no contest profile named `{}`", run.contest),
        ));
    }
    if run.num_lineups == 0 {
        return Err(invalid("run.num_lineups", "must be > 0"));
    }
    if run.attempt_multiplier == 0 {
        return Err(invalid("run.attempt_multiplier", "must be > 0"));
    }
    if !(run.entry_fee >= 0.0) {
        return Err(invalid("run.entry_fee", "must be >= 0"));
    }

    Ok(())
}

fn validate_contest(key: &str, rules: &ContestRules) -> Result<(), ConfigError> {
    let field = |name: &str| format!("contests.{key}.{name}");

    if rules.entries == 0 {
        return Err(invalid(field("entries"), "must be greater than 0"));
    }

    let weight_sum = rules.projection_weight + rules.ownership_weight;
    if rules.projection_weight < 0.0
        || rules.ownership_weight < 0.0
        || (weight_sum - 1.0).abs() > 1e-6
    {
        return Err(invalid(
            field("projection_weight"),
            format!("projection_weight + ownership_weight must equal 1.0, got {weight_sum}"),
        ));
    }

    check_band(field("ownership_total_range"), &rules.ownership_total_range)?;
    check_band(field("ownership_target_avg"), &rules.ownership_target_avg)?;
    check_band(field("qb_ownership_target"), &rules.qb_ownership_target)?;
    check_band(field("core_rb_ownership"), &rules.core_rb_ownership)?;
    if rules.ownership_target_avg.midpoint() <= 0.0 {
        return Err(invalid(field("ownership_target_avg"), "midpoint must be > 0"));
    }
    if rules.qb_ownership_target.overlaps(&rules.core_rb_ownership) {
        return Err(invalid(
            field("qb_ownership_target"),
            "QB and core RB ownership bands must not overlap",
        ));
    }

    for (name, (lo, hi)) in [
        ("ultra_leverage_required", rules.ultra_leverage_required),
        ("core_players_required", rules.core_players_required),
    ] {
        if lo > hi || hi > 9 {
            return Err(invalid(field(name), format!("invalid count range ({lo}, {hi})")));
        }
    }

    if !(2..=3).contains(&rules.stack_size) {
        return Err(invalid(
            field("stack_size"),
            format!("must be 2 or 3, got {}", rules.stack_size),
        ));
    }

    check_unit(field("bring_back_pct"), rules.bring_back_pct)?;
    check_unit(field("leverage_qb_pct"), rules.leverage_qb_pct)?;
    check_unit(field("game_stack_pct"), rules.game_stack_pct)?;
    check_unit(field("core_rb_usage_pct"), rules.core_rb_usage_pct)?;
    check_unit(field("te_punt_pct"), rules.te_punt_pct)?;
    if !(rules.top_fraction > 0.0 && rules.top_fraction <= 1.0) {
        return Err(invalid(
            field("top_fraction"),
            format!("must be in (0.0, 1.0], got {}", rules.top_fraction),
        ));
    }

    let payout = &rules.payout;
    check_unit(field("payout.first_place_share"), payout.first_place_share)?;
    check_unit(field("payout.places_paid_fraction"), payout.places_paid_fraction)?;
    let explicit: f64 = payout.first_place_share + payout.top_shares.iter().sum::<f64>();
    if payout.top_shares.iter().any(|s| *s < 0.0) || explicit > 1.0 + 1e-9 {
        return Err(invalid(
            field("payout.top_shares"),
            format!("explicit shares must be >= 0 and sum to at most 1.0, got {explicit}"),
        ));
    }
    if payout.flat_payout_multiple < 0.0 {
        return Err(invalid(field("payout.flat_payout_multiple"), "must be >= 0"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
