// Batch orchestration: build, validate, de-duplicate, rank and simulate one
// run's worth of lineups.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::build::{
    exposures, BuildOutcome, Deduplicator, LineupBuilder, LineupMix, LineupQuota, LineupRanker,
    LineupValidator,
};
use crate::config::{Config, ConfigError};
use crate::lineup::Lineup;
use crate::pool::player::{Player, PlayerPool, TierCounts};
use crate::sim::{OutcomeSimulator, OutcomeStats, PayoutStructure};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no valid lineups after {attempts} attempts")]
    NoLineups { attempts: usize },
}

/// One accepted lineup with its 1-based rank and simulated outcome.
#[derive(Debug, Clone, Serialize)]
pub struct RankedLineup {
    pub rank: usize,
    pub lineup: Lineup,
    pub tiers: TierCounts,
    pub outcome: OutcomeStats,
}

/// Everything a run produced, ready for presentation or export.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Contest profile key, e.g. "small_gpp".
    pub contest: String,
    pub contest_name: String,
    pub seed: u64,
    pub requested: usize,
    pub attempts: usize,
    pub max_attempts: usize,
    pub aborted: usize,
    pub duplicates: usize,
    /// Validator rejections keyed by check.
    pub rejections: BTreeMap<String, usize>,
    /// Leverage-QB and game-stack counts among accepted lineups.
    pub mix: LineupMix,
    pub lineups: Vec<RankedLineup>,
    /// Share of the batch holding each player.
    pub exposures: BTreeMap<String, f64>,
    pub payout: PayoutStructure,
}

impl RunReport {
    pub fn built(&self) -> usize {
        self.lineups.len()
    }

    /// Fewer lineups than requested before the attempt budget ran out.
    pub fn is_partial(&self) -> bool {
        self.built() < self.requested
    }
}

/// Run with the configured seed, or a fresh random one when none is set.
pub fn run(config: &Config, pool: &PlayerPool) -> Result<RunReport, RunError> {
    let seed = match config.run.seed {
        Some(seed) => seed,
        None => {
            let seed = rand::random::<u64>();
            info!("No seed configured, drew {}", seed);
            seed
        }
    };
    run_seeded(config, pool, seed)
}

/// Run with an explicit seed. Identical inputs and seeds give identical
/// reports.
pub fn run_seeded(config: &Config, pool: &PlayerPool, seed: u64) -> Result<RunReport, RunError> {
    let rules = config.active_contest()?;
    let strategy = &config.strategy;
    let settings = &config.run;
    let mut rng = StdRng::seed_from_u64(seed);

    let pool = pool.without(&settings.exclude);
    let locks = resolve_locks(&pool, &settings.locks);

    info!(
        "Run: contest={} lineups={} pool={} locks={} excluded={} seed={}",
        settings.contest,
        settings.num_lineups,
        pool.len(),
        locks.len(),
        settings.exclude.len(),
        seed
    );

    let builder = LineupBuilder::new(&pool, rules, strategy, locks);
    let validator = LineupValidator::new(rules, strategy);
    let dedup = Deduplicator::new(&strategy.dedup);
    let mut quota = LineupQuota::new(rules, settings.num_lineups);

    let max_attempts = settings.num_lineups * settings.attempt_multiplier;
    let mut accepted: Vec<Lineup> = Vec::with_capacity(settings.num_lineups);
    let mut attempts = 0;
    let mut aborted = 0;
    let mut duplicates = 0;
    let mut rejections: BTreeMap<String, usize> = BTreeMap::new();

    while accepted.len() < settings.num_lineups && attempts < max_attempts {
        attempts += 1;

        let lineup_type = quota.next_type();
        let lineup = match builder.build(lineup_type, &mut rng) {
            BuildOutcome::Complete(lineup) => lineup,
            BuildOutcome::Aborted { stage, reason } => {
                debug!(
                    "attempt {} ({}) aborted at {:?}: {}",
                    attempts,
                    lineup_type.label(),
                    stage,
                    reason
                );
                aborted += 1;
                continue;
            }
        };

        if let Err(rejection) = validator.check(&lineup) {
            debug!("attempt {} rejected: {}", attempts, rejection);
            *rejections.entry(rejection.kind().to_string()).or_insert(0) += 1;
            continue;
        }

        if dedup.is_duplicate(&lineup, &accepted) {
            debug!("attempt {} duplicates an accepted lineup", attempts);
            duplicates += 1;
            continue;
        }

        quota.record(&lineup);
        accepted.push(lineup);
    }

    if accepted.is_empty() {
        warn!(
            "No valid lineups after {} attempts ({} aborted, {} rejected)",
            attempts,
            aborted,
            rejections.values().sum::<usize>()
        );
        return Err(RunError::NoLineups { attempts });
    }
    if accepted.len() < settings.num_lineups {
        warn!(
            "Built {} of {} requested lineups in {} attempts",
            accepted.len(),
            settings.num_lineups,
            attempts
        );
    } else {
        info!("Built {} lineups in {} attempts", accepted.len(), attempts);
    }
    let mix = quota.into_mix();
    info!(
        "Lineup mix: {}/{} leverage QB, {}/{} game stacks",
        mix.leverage_qb, mix.leverage_qb_target, mix.game_stack, mix.game_stack_target
    );

    let ranked = LineupRanker::new(rules, &strategy.ranking).rank(accepted);
    let exposure = exposures(&ranked);

    let payout = PayoutStructure::build(rules, settings.entry_fee);
    let simulator = OutcomeSimulator::new(&strategy.simulation);
    let outcomes = simulator.simulate_batch(&ranked, &payout, &mut rng);

    let lineups = ranked
        .into_iter()
        .zip(outcomes)
        .enumerate()
        .map(|(i, (lineup, outcome))| RankedLineup {
            rank: i + 1,
            tiers: lineup.tier_counts(&strategy.tiers),
            lineup,
            outcome,
        })
        .collect();

    Ok(RunReport {
        contest: settings.contest.clone(),
        contest_name: rules.name.clone(),
        seed,
        requested: settings.num_lineups,
        attempts,
        max_attempts,
        aborted,
        duplicates,
        rejections,
        mix,
        lineups,
        exposures: exposure,
        payout,
    })
}

/// Look up locked names in the pool, dropping (with a warning) any that are
/// missing or excluded. A name listed twice is locked once.
fn resolve_locks<'a>(pool: &'a PlayerPool, names: &[String]) -> Vec<&'a Player> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(String::as_str)
        .filter(|name| {
            let first = seen.insert(*name);
            if !first {
                warn!("Locked player {} listed more than once", name);
            }
            first
        })
        .filter_map(|name| {
            let found = pool.by_name(name);
            if found.is_none() {
                warn!("Locked player {} is not in the pool, ignoring", name);
            }
            found
        })
        .collect()
}
