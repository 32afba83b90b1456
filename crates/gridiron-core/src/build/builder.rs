// Randomized lineup construction.
//
// A build walks the roster in a fixed order (locks, QB, stack, optional
// bring-back, RB, WR, TE, FLEX, DST). Each step asks the selection policy
// for one player under a salary ceiling; the first step that finds no
// candidate aborts the attempt. There is no backtracking: the caller simply
// starts a fresh attempt. The requested `LineupType` decides whether the QB
// comes from the leverage band and whether the stack is a full game stack.

use rand::Rng;
use std::fmt;

use crate::build::quota::{LineupType, GAME_STACK_TEAMMATES};
use crate::build::selection::SelectionPolicy;
use crate::config::{BuilderConfig, ContestRules, StrategyConfig};
use crate::lineup::{Budget, Lineup, LineupDraft, SlotKind};
use crate::pool::player::{Player, PlayerPool, Position};

/// Core RBs must project at least this many points to anchor a lineup.
const CORE_RB_MIN_PROJECTION: f64 = 15.0;

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// How far a build got. Stages advance strictly in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildStage {
    Empty,
    QbFilled,
    StackFilled,
    RbFilled,
    WrFilled,
    TeFilled,
    FlexFilled,
    Complete,
}

/// Why an attempt was abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// A locked player could not be placed (slot taken or unaffordable).
    LockUnplaceable(String),
    /// No eligible candidate for the slot under the current ceiling.
    NoCandidate(SlotKind),
    /// Not enough affordable teammates to complete the QB stack.
    NoStackPartner,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::LockUnplaceable(name) => write!(f, "locked player {name} does not fit"),
            AbortReason::NoCandidate(SlotKind::Fixed(pos)) => write!(f, "no eligible {pos}"),
            AbortReason::NoCandidate(SlotKind::Flex) => write!(f, "no eligible FLEX"),
            AbortReason::NoStackPartner => write!(f, "no affordable QB teammate"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum BuildOutcome {
    Complete(Lineup),
    Aborted { stage: BuildStage, reason: AbortReason },
}

impl BuildOutcome {
    pub fn into_lineup(self) -> Option<Lineup> {
        match self {
            BuildOutcome::Complete(lineup) => Some(lineup),
            BuildOutcome::Aborted { .. } => None,
        }
    }
}

/// Which slot a step may fill.
#[derive(Debug, Clone, Copy)]
enum Target {
    Slot(SlotKind),
    /// The player's dedicated slot, else FLEX.
    Natural,
}

impl Target {
    fn slot_for(&self, draft: &LineupDraft, pos: Position) -> Option<SlotKind> {
        match self {
            Target::Slot(kind) => (kind.accepts(pos) && draft.has_open(*kind)).then_some(*kind),
            Target::Natural => draft.slot_for(pos),
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builds lineups for one contest profile from a fixed pool.
#[derive(Debug, Clone)]
pub struct LineupBuilder<'a> {
    pool: &'a PlayerPool,
    rules: &'a ContestRules,
    config: &'a BuilderConfig,
    salary_cap: u32,
    policy: SelectionPolicy,
    locks: Vec<&'a Player>,
    core_rb: Option<&'a Player>,
}

impl<'a> LineupBuilder<'a> {
    pub fn new(
        pool: &'a PlayerPool,
        rules: &'a ContestRules,
        strategy: &'a StrategyConfig,
        locks: Vec<&'a Player>,
    ) -> Self {
        LineupBuilder {
            pool,
            rules,
            config: &strategy.builder,
            salary_cap: strategy.roster.salary_cap,
            policy: SelectionPolicy::new(rules, &strategy.selection),
            locks,
            core_rb: find_core_rb(pool, rules),
        }
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    /// The RB anchored into lineups at the profile's core-RB usage rate.
    pub fn core_rb(&self) -> Option<&'a Player> {
        self.core_rb
    }

    /// Same-team teammates the stack step adds next to the QB.
    fn stack_target(&self, lineup_type: LineupType) -> usize {
        if lineup_type.wants_game_stack() {
            GAME_STACK_TEAMMATES
        } else {
            self.rules.stack_teammates()
        }
    }

    /// Run one build attempt aiming for `lineup_type`.
    pub fn build<R: Rng + ?Sized>(&self, lineup_type: LineupType, rng: &mut R) -> BuildOutcome {
        let mut draft = LineupDraft::new(self.salary_cap, self.pool);
        let mut stage = BuildStage::Empty;

        macro_rules! abort {
            ($reason:expr) => {
                return BuildOutcome::Aborted {
                    stage,
                    reason: $reason,
                }
            };
        }

        for lock in &self.locks {
            if draft.place(lock).is_none() {
                abort!(AbortReason::LockUnplaceable(lock.name.clone()));
            }
        }

        // QB
        let qb_slot = SlotKind::Fixed(Position::Quarterback);
        let qb_target = Target::Slot(qb_slot);
        if draft.has_open(qb_slot) {
            let budget = Budget::CapShare(self.config.qb_cap_fraction);
            let mut picked = None;
            if lineup_type.wants_leverage_qb() {
                let band = self.rules.qb_ownership_target;
                let leverage_qbs = self
                    .pool
                    .by_position(Position::Quarterback)
                    .filter(|p| band.contains(p.ownership));
                picked = self.step(&mut draft, leverage_qbs, qb_target, budget, None, rng);
            }
            if picked.is_none() {
                let qbs = self.pool.by_position(Position::Quarterback);
                picked = self.step(&mut draft, qbs, qb_target, budget, None, rng);
            }
            if picked.is_none() {
                abort!(AbortReason::NoCandidate(qb_slot));
            }
        }
        stage = BuildStage::QbFilled;

        let Some(qb) = draft
            .players()
            .find(|p| p.position == Position::Quarterback)
            .cloned()
        else {
            abort!(AbortReason::NoCandidate(qb_slot));
        };

        // Stack: same-team pass catchers first, RBs as a fallback.
        let have = draft
            .players()
            .filter(|p| p.position != Position::Quarterback && p.team == qb.team)
            .count();
        let stack_budget = Budget::RemainingShare(self.config.stack_fraction);
        let pool = self.pool;
        let qb_team = qb.team.as_str();
        let teammates = move || {
            pool.players()
                .iter()
                .filter(move |p| p.team == qb_team && p.position.is_flex_eligible())
        };
        for _ in have..self.stack_target(lineup_type) {
            let catchers = teammates().filter(|p| p.position.is_pass_catcher());
            if self
                .step(&mut draft, catchers, Target::Natural, stack_budget, None, rng)
                .is_some()
            {
                continue;
            }
            let backs = teammates().filter(|p| p.position == Position::RunningBack);
            if self
                .step(&mut draft, backs, Target::Natural, stack_budget, None, rng)
                .is_none()
            {
                abort!(AbortReason::NoStackPartner);
            }
        }
        stage = BuildStage::StackFilled;

        // Bring-back: one low-owned player from the QB's opponent.
        if qb.has_opponent() && rng.random_bool(self.rules.bring_back_pct) {
            let max_own = self.config.bring_back_max_ownership;
            let opponents = self.pool.players().iter().filter(|p| {
                p.team == qb.opponent && p.position.is_flex_eligible() && p.ownership <= max_own
            });
            // Optional step: a miss is not an abort.
            let _ = self.step(&mut draft, opponents, Target::Natural, stack_budget, None, rng);
        }

        // RB, with the core RB anchored first at the profile's usage rate.
        let rb_slot = SlotKind::Fixed(Position::RunningBack);
        let rb_budget = Budget::RemainingShare(self.config.rb_fraction);
        if let Some(core) = self.core_rb {
            if draft.has_open(rb_slot) && rng.random_bool(self.rules.core_rb_usage_pct) {
                let _ = self.step(&mut draft, [core], Target::Slot(rb_slot), rb_budget, None, rng);
            }
        }
        while draft.has_open(rb_slot) {
            let rbs = self.pool.by_position(Position::RunningBack);
            if self
                .step(&mut draft, rbs, Target::Slot(rb_slot), rb_budget, None, rng)
                .is_none()
            {
                abort!(AbortReason::NoCandidate(rb_slot));
            }
        }
        stage = BuildStage::RbFilled;

        // WR
        let wr_slot = SlotKind::Fixed(Position::WideReceiver);
        let wr_budget = Budget::RemainingShare(self.config.wr_fraction);
        while draft.has_open(wr_slot) {
            let wrs = self.pool.by_position(Position::WideReceiver);
            if self
                .step(&mut draft, wrs, Target::Slot(wr_slot), wr_budget, None, rng)
                .is_none()
            {
                abort!(AbortReason::NoCandidate(wr_slot));
            }
        }
        stage = BuildStage::WrFilled;

        // TE, sometimes restricted to a punt price.
        let te_slot = SlotKind::Fixed(Position::TightEnd);
        let te_target = Target::Slot(te_slot);
        if draft.has_open(te_slot) {
            let te_budget = Budget::RemainingShare(self.config.te_fraction);
            let mut picked = None;
            if rng.random_bool(self.rules.te_punt_pct) {
                let tes = self.pool.by_position(Position::TightEnd);
                let punt = Some(self.rules.te_punt_salary_max);
                picked = self.step(&mut draft, tes, te_target, te_budget, punt, rng);
            }
            if picked.is_none() {
                let tes = self.pool.by_position(Position::TightEnd);
                picked = self.step(&mut draft, tes, te_target, te_budget, None, rng);
            }
            if picked.is_none() {
                abort!(AbortReason::NoCandidate(te_slot));
            }
        }
        stage = BuildStage::TeFilled;

        // FLEX from RB and WR, occasionally TE.
        let flex_slot = SlotKind::Flex;
        if draft.has_open(flex_slot) {
            let include_te = rng.random_bool(self.config.flex_te_pct);
            let flex = self.pool.players().iter().filter(|p| {
                matches!(p.position, Position::RunningBack | Position::WideReceiver)
                    || (include_te && p.position == Position::TightEnd)
            });
            let budget = Budget::RemainingShare(self.config.flex_fraction);
            if self
                .step(&mut draft, flex, Target::Slot(flex_slot), budget, None, rng)
                .is_none()
            {
                abort!(AbortReason::NoCandidate(flex_slot));
            }
        }
        stage = BuildStage::FlexFilled;

        // DST with whatever is left, preferring correlated defenses.
        let dst_slot = SlotKind::Fixed(Position::Defense);
        let dst_target = Target::Slot(dst_slot);
        if draft.has_open(dst_slot) {
            let mut picked = None;
            if rng.random_bool(self.config.dst_correlation_pct) {
                let rb_teams: Vec<String> = draft
                    .players()
                    .filter(|p| p.position == Position::RunningBack)
                    .map(|p| p.team.clone())
                    .collect();
                let correlated = self.pool.by_position(Position::Defense).filter(|d| {
                    (d.has_opponent() && rb_teams.contains(&d.opponent))
                        || (qb.has_opponent() && d.team == qb.opponent)
                });
                picked = self.step(&mut draft, correlated, dst_target, Budget::Headroom, None, rng);
            }
            if picked.is_none() {
                let dsts = self.pool.by_position(Position::Defense);
                picked = self.step(&mut draft, dsts, dst_target, Budget::Headroom, None, rng);
            }
            if picked.is_none() {
                abort!(AbortReason::NoCandidate(dst_slot));
            }
        }

        match draft.into_lineup() {
            Some(lineup) => BuildOutcome::Complete(lineup),
            None => abort!(AbortReason::NoCandidate(flex_slot)),
        }
    }

    /// One selection step: keep candidates that fit their target slot's
    /// ceiling, draw one, place it.
    fn step<'p, R: Rng + ?Sized>(
        &self,
        draft: &mut LineupDraft,
        candidates: impl IntoIterator<Item = &'p Player>,
        target: Target,
        budget: Budget,
        salary_limit: Option<u32>,
        rng: &mut R,
    ) -> Option<&'p Player> {
        let ceiling_for = |draft: &LineupDraft, kind: SlotKind| {
            let ceiling = draft.ceiling(kind, budget);
            salary_limit.map_or(ceiling, |limit| ceiling.min(limit))
        };

        let mut eligible = Vec::new();
        let mut max_ceiling = 0;
        for player in candidates {
            let Some(kind) = target.slot_for(draft, player.position) else {
                continue;
            };
            let ceiling = ceiling_for(draft, kind);
            if player.salary <= ceiling {
                max_ceiling = max_ceiling.max(ceiling);
                eligible.push(player);
            }
        }

        let used = draft.used_names();
        let pick = self.policy.select(eligible, max_ceiling, &used, rng)?;
        let kind = target.slot_for(draft, pick.position)?;
        let ceiling = ceiling_for(draft, kind);
        draft.place_in(kind, pick)?;
        if matches!(budget, Budget::RemainingShare(_)) {
            draft.settle_ceiling(ceiling);
        }
        Some(pick)
    }
}

/// Highest-projected RB inside the profile's core ownership band, else the
/// highest-projected RB overall.
fn find_core_rb<'a>(pool: &'a PlayerPool, rules: &ContestRules) -> Option<&'a Player> {
    let by_projection = |a: &&Player, b: &&Player| a.projection.total_cmp(&b.projection);
    let band = rules.core_rb_ownership;
    pool.by_position(Position::RunningBack)
        .filter(|p| band.contains(p.ownership) && p.projection >= CORE_RB_MIN_PROJECTION)
        .max_by(by_projection)
        .or_else(|| pool.by_position(Position::RunningBack).max_by(by_projection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::default_config;
    use crate::config::{Band, Config};
    use crate::lineup::LineupSlot;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn player(name: &str, pos: Position, team: &str, salary: u32, proj: f64, own: f64) -> Player {
        Player::new(name, pos, team, salary, proj, own, 5.0)
    }

    /// Two games (AAA vs BBB, CCC vs DDD) with enough depth at every slot.
    fn slate() -> PlayerPool {
        let mut players = Vec::new();
        let games = [("AAA", "BBB"), ("BBB", "AAA"), ("CCC", "DDD"), ("DDD", "CCC")];
        for (t, (team, opp)) in games.iter().enumerate() {
            let bump = t as f64;
            let mut add = |name: String, pos: Position, salary: u32, proj: f64, own: f64| {
                players.push(player(&name, pos, team, salary, proj, own).with_opponent(*opp));
            };
            add(format!("QB {team}"), Position::Quarterback, 6000, 20.0 + bump, 5.0 + bump);
            for i in 0..3 {
                let salary = 4500 + 500 * i as u32;
                let proj = 10.0 + i as f64 + bump;
                add(format!("RB{i} {team}"), Position::RunningBack, salary, proj, 12.0);
                add(format!("WR{i} {team}"), Position::WideReceiver, salary, proj, 8.0);
            }
            add(format!("TE {team}"), Position::TightEnd, 3500, 7.0 + bump, 4.0);
            add(format!("DST {team}"), Position::Defense, 2500, 6.0, 6.0);
        }
        PlayerPool::new(players)
    }

    fn relaxed_config() -> Config {
        let mut config = default_config();
        let b = &mut config.strategy.builder;
        b.qb_cap_fraction = 0.2;
        b.stack_fraction = 1.0;
        b.rb_fraction = 1.0;
        b.wr_fraction = 1.0;
        b.te_fraction = 1.0;
        b.flex_fraction = 1.0;
        config
    }

    fn build_many(
        pool: &PlayerPool,
        config: &Config,
        locks: Vec<&Player>,
        n: usize,
    ) -> Vec<BuildOutcome> {
        let rules = config.contest("small_gpp").unwrap();
        let builder = LineupBuilder::new(pool, rules, &config.strategy, locks);
        let mut rng = StdRng::seed_from_u64(99);
        (0..n)
            .map(|_| builder.build(LineupType::Balanced, &mut rng))
            .collect()
    }

    /// Completed lineups of `lineup_type` from `n` small_gpp attempts.
    fn complete(
        pool: &PlayerPool,
        config: &Config,
        locks: Vec<&Player>,
        lineup_type: LineupType,
        n: usize,
    ) -> Vec<Lineup> {
        let rules = config.contest("small_gpp").unwrap();
        let builder = LineupBuilder::new(pool, rules, &config.strategy, locks);
        let mut rng = StdRng::seed_from_u64(7);
        let lineups: Vec<Lineup> = (0..n)
            .filter_map(|_| builder.build(lineup_type, &mut rng).into_lineup())
            .collect();
        assert!(!lineups.is_empty(), "no attempt completed");
        lineups
    }

    fn small_gpp(config: &mut Config) -> &mut ContestRules {
        config.contests.get_mut("small_gpp").unwrap()
    }

    fn slate_with(extra: Vec<Player>) -> PlayerPool {
        let mut players = slate().players().to_vec();
        players.extend(extra);
        PlayerPool::new(players)
    }

    fn in_slot(lineup: &Lineup, slot: LineupSlot) -> Option<&str> {
        lineup
            .entries
            .iter()
            .find(|e| e.slot == slot)
            .map(|e| e.player.name.as_str())
    }

    #[test]
    fn complete_lineups_respect_cap_slots_and_stack() {
        let pool = slate();
        let config = relaxed_config();
        let outcomes = build_many(&pool, &config, vec![], 50);
        let lineups: Vec<Lineup> = outcomes
            .into_iter()
            .filter_map(BuildOutcome::into_lineup)
            .collect();
        assert!(!lineups.is_empty());
        for lineup in &lineups {
            assert_eq!(lineup.len(), 9);
            assert!(lineup.total_salary <= 50_000);
            assert_eq!(lineup.names().len(), 9);
            assert_eq!(lineup.count_position(Position::Quarterback), 1);
            assert!(lineup.count_position(Position::RunningBack) >= 2);
            assert!(lineup.count_position(Position::WideReceiver) >= 3);
            assert!(lineup.count_position(Position::TightEnd) >= 1);
            assert_eq!(lineup.count_position(Position::Defense), 1);
            // small_gpp stacks QB + 2
            assert!(lineup.stack_count() >= 2, "stack too small: {lineup:?}");
        }
    }

    #[test]
    fn missing_qb_aborts_at_empty() {
        let qbs: Vec<String> = ["QB AAA", "QB BBB", "QB CCC", "QB DDD"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let pool = slate().without(&qbs);
        let config = relaxed_config();
        for outcome in build_many(&pool, &config, vec![], 5) {
            match outcome {
                BuildOutcome::Aborted { stage, reason } => {
                    assert_eq!(stage, BuildStage::Empty);
                    let qb = SlotKind::Fixed(Position::Quarterback);
                    assert_eq!(reason, AbortReason::NoCandidate(qb));
                }
                BuildOutcome::Complete(_) => panic!("built a lineup without a QB"),
            }
        }
    }

    #[test]
    fn missing_teammates_aborts_at_stack() {
        // Keep only one team's QB; strip its skill players.
        let mut names: Vec<String> = ["QB BBB", "QB CCC", "QB DDD", "TE AAA"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for i in 0..3 {
            names.push(format!("RB{i} AAA"));
            names.push(format!("WR{i} AAA"));
        }
        let pool = slate().without(&names);
        let config = relaxed_config();
        for outcome in build_many(&pool, &config, vec![], 5) {
            match outcome {
                BuildOutcome::Aborted { stage, reason } => {
                    assert_eq!(stage, BuildStage::QbFilled);
                    assert_eq!(reason, AbortReason::NoStackPartner);
                }
                BuildOutcome::Complete(_) => panic!("built a lineup without a stack"),
            }
        }
    }

    #[test]
    fn locks_appear_in_every_lineup() {
        let pool = slate();
        let config = relaxed_config();
        let lock = pool.by_name("WR0 DDD").unwrap();
        let lineups: Vec<Lineup> = build_many(&pool, &config, vec![lock], 30)
            .into_iter()
            .filter_map(BuildOutcome::into_lineup)
            .collect();
        assert!(!lineups.is_empty());
        assert!(lineups.iter().all(|l| l.contains("WR0 DDD")));
    }

    #[test]
    fn unplaceable_lock_aborts_every_attempt() {
        let pool = slate();
        let config = relaxed_config();
        let qbs: Vec<&Player> = pool.by_position(Position::Quarterback).take(2).collect();
        for outcome in build_many(&pool, &config, qbs, 5) {
            assert!(matches!(
                outcome,
                BuildOutcome::Aborted {
                    stage: BuildStage::Empty,
                    reason: AbortReason::LockUnplaceable(_),
                }
            ));
        }
    }

    #[test]
    fn core_rb_prefers_band_then_projection() {
        let pool = slate();
        let config = default_config();
        let rules = config.contest("small_gpp").unwrap();
        // No RB projects 15+ inside the 18-25% band, so fall back to the best RB.
        let core = find_core_rb(&pool, rules).unwrap();
        assert_eq!(core.name, "RB2 DDD");

        let mut players = pool.players().to_vec();
        players.push(player("Core Back", Position::RunningBack, "CCC", 7000, 16.0, 20.0));
        let pool = PlayerPool::new(players);
        assert_eq!(find_core_rb(&pool, rules).unwrap().name, "Core Back");
    }

    // -----------------------------------------------------------------------
    // Probability branches, each pinned to 1.0 and 0.0
    // -----------------------------------------------------------------------

    #[test]
    fn leverage_type_draws_qb_from_band() {
        let pool = slate();
        let mut config = relaxed_config();
        // Only QB AAA (5% owned) sits in the band.
        small_gpp(&mut config).qb_ownership_target = Band::new(4.5, 5.5);

        let leveraged = complete(&pool, &config, vec![], LineupType::LeverageQb, 30);
        assert!(leveraged.iter().all(|l| l.qb().unwrap().name == "QB AAA"));

        let balanced = complete(&pool, &config, vec![], LineupType::Balanced, 30);
        assert!(balanced.iter().any(|l| l.qb().unwrap().name != "QB AAA"));
    }

    #[test]
    fn game_stack_type_adds_two_teammates() {
        let pool = slate();
        let mut config = relaxed_config();
        small_gpp(&mut config).stack_size = 2;

        let stacked = complete(&pool, &config, vec![], LineupType::GameStack, 30);
        assert!(stacked.iter().all(|l| l.stack_count() >= 2));

        let rules = config.contest("small_gpp").unwrap();
        let builder = LineupBuilder::new(&pool, rules, &config.strategy, vec![]);
        assert_eq!(builder.stack_target(LineupType::Balanced), 1);
        assert_eq!(builder.stack_target(LineupType::LeverageQb), 1);
        assert_eq!(builder.stack_target(LineupType::LeverageStack), 2);
    }

    #[test]
    fn bring_back_adds_an_opponent() {
        // BBB keeps a single cheap, weak receiver: only the bring-back step
        // ever reaches for it.
        let mut stripped: Vec<String> = vec!["TE BBB".into()];
        for i in 0..3 {
            stripped.push(format!("RB{i} BBB"));
            stripped.push(format!("WR{i} BBB"));
        }
        let mut players = slate().without(&stripped).players().to_vec();
        players.push(
            player("WR Back BBB", Position::WideReceiver, "BBB", 3000, 1.0, 2.0).with_opponent("AAA"),
        );
        let pool = PlayerPool::new(players);
        let qb = || vec![pool.by_name("QB AAA").unwrap()];

        let mut config = relaxed_config();
        small_gpp(&mut config).bring_back_pct = 1.0;
        let lineups = complete(&pool, &config, qb(), LineupType::Balanced, 30);
        assert!(lineups.iter().all(|l| l.contains("WR Back BBB")));

        small_gpp(&mut config).bring_back_pct = 0.0;
        let lineups = complete(&pool, &config, qb(), LineupType::Balanced, 30);
        assert!(lineups.iter().all(|l| !l.contains("WR Back BBB")));
    }

    #[test]
    fn core_rb_usage_anchors_the_core_back() {
        let pool = slate();
        let mut config = relaxed_config();
        let core = {
            let rules = config.contest("small_gpp").unwrap();
            find_core_rb(&pool, rules).unwrap().name.clone()
        };

        small_gpp(&mut config).core_rb_usage_pct = 1.0;
        let lineups = complete(&pool, &config, vec![], LineupType::Balanced, 30);
        assert!(lineups.iter().all(|l| l.contains(&core)));

        small_gpp(&mut config).core_rb_usage_pct = 0.0;
        let lineups = complete(&pool, &config, vec![], LineupType::Balanced, 40);
        assert!(lineups.iter().any(|l| !l.contains(&core)));
    }

    #[test]
    fn te_punt_caps_the_te_salary() {
        // QB AAA has no TE teammate, so the TE slot is always filled by the
        // TE step.
        let pool = slate_with(vec![
            player("TE Cheap CCC", Position::TightEnd, "CCC", 2800, 3.0, 2.0).with_opponent("DDD"),
        ])
        .without(&["TE AAA".to_string()]);
        let qb = || vec![pool.by_name("QB AAA").unwrap()];
        let te = LineupSlot::Fixed(Position::TightEnd);
        let mut config = relaxed_config();
        small_gpp(&mut config).te_punt_salary_max = 3000;

        small_gpp(&mut config).te_punt_pct = 1.0;
        let lineups = complete(&pool, &config, qb(), LineupType::Balanced, 30);
        for lineup in &lineups {
            let name = in_slot(lineup, te).unwrap();
            let salary = pool.by_name(name).unwrap().salary;
            assert!(salary <= 3000, "{name} costs {salary}");
        }

        small_gpp(&mut config).te_punt_pct = 0.0;
        let lineups = complete(&pool, &config, qb(), LineupType::Balanced, 30);
        assert!(lineups.iter().all(|l| in_slot(l, te) != Some("TE Cheap CCC")));
    }

    #[test]
    fn flex_te_only_when_enabled() {
        // Two elite TEs off the QB's team: one fills TE, the other is the
        // best FLEX option.
        let pool = slate_with(vec![
            player("TE Star BBB", Position::TightEnd, "BBB", 4000, 30.0, 3.0).with_opponent("AAA"),
            player("TE Star CCC", Position::TightEnd, "CCC", 4000, 30.0, 3.0).with_opponent("DDD"),
        ]);
        let qb = || vec![pool.by_name("QB AAA").unwrap()];
        let flex_te = LineupSlot::Flex(Position::TightEnd);
        let mut config = relaxed_config();
        small_gpp(&mut config).te_punt_pct = 0.0;

        config.strategy.builder.flex_te_pct = 1.0;
        let lineups = complete(&pool, &config, qb(), LineupType::Balanced, 40);
        assert!(lineups.iter().any(|l| in_slot(l, flex_te).is_some()));

        config.strategy.builder.flex_te_pct = 0.0;
        let lineups = complete(&pool, &config, qb(), LineupType::Balanced, 40);
        assert!(lineups.iter().all(|l| in_slot(l, flex_te).is_none()));
    }

    #[test]
    fn dst_correlation_prefers_linked_defenses() {
        // A strong defense from a game with no other players is never linked.
        let pool = slate_with(vec![
            player("DST Lone EEE", Position::Defense, "EEE", 2500, 15.0, 3.0).with_opponent("FFF"),
        ]);
        let correlated = |l: &Lineup| {
            let qb = l.qb().unwrap();
            let dst = l.players().find(|p| p.position == Position::Defense).unwrap();
            dst.team == qb.opponent
                || l.players()
                    .any(|p| p.position == Position::RunningBack && p.team == dst.opponent)
        };
        let mut config = relaxed_config();

        config.strategy.builder.dst_correlation_pct = 1.0;
        let lineups = complete(&pool, &config, vec![], LineupType::Balanced, 30);
        assert!(lineups.iter().all(correlated));

        config.strategy.builder.dst_correlation_pct = 0.0;
        let lineups = complete(&pool, &config, vec![], LineupType::Balanced, 40);
        assert!(lineups.iter().any(|l| l.contains("DST Lone EEE")));
    }

    #[test]
    fn stage_order() {
        assert!(BuildStage::Empty < BuildStage::QbFilled);
        assert!(BuildStage::FlexFilled < BuildStage::Complete);
        assert_eq!(
            AbortReason::NoCandidate(SlotKind::Fixed(Position::TightEnd)).to_string(),
            "no eligible TE"
        );
    }
}
