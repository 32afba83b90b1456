// Post-build lineup validation.

use std::fmt;

use crate::config::{Band, ContestRules, StrategyConfig, TierThresholds};
use crate::lineup::{Lineup, LINEUP_SIZE};
use crate::pool::player::Position;

/// Why a complete lineup was rejected. Checks run in declaration order and
/// stop at the first failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    Salary { total: u32, floor: u32, cap: u32 },
    Ownership { total: f64, band: Band },
    Slots(String),
    Structure(String),
}

impl Rejection {
    /// Short label used to tally rejections in run reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::Salary { .. } => "salary",
            Rejection::Ownership { .. } => "ownership",
            Rejection::Slots(_) => "slots",
            Rejection::Structure(_) => "structure",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Salary { total, floor, cap } => {
                write!(f, "salary {total} outside [{floor}, {cap}]")
            }
            Rejection::Ownership { total, band } => write!(
                f,
                "total ownership {total:.1}% outside [{:.1}, {:.1}]",
                band.min, band.max
            ),
            Rejection::Slots(msg) => write!(f, "slot check failed: {msg}"),
            Rejection::Structure(msg) => write!(f, "structure check failed: {msg}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineupValidator {
    salary_cap: u32,
    salary_floor: u32,
    /// Total-ownership band after relaxation.
    ownership_band: Band,
    enforce_structure: bool,
    tiers: TierThresholds,
    min_ultra_leverage: usize,
    min_core: usize,
    max_heavy_chalk: usize,
}

impl LineupValidator {
    pub fn new(rules: &ContestRules, strategy: &StrategyConfig) -> Self {
        LineupValidator {
            salary_cap: strategy.roster.salary_cap,
            salary_floor: strategy.roster.salary_floor(),
            ownership_band: rules
                .ownership_total_range
                .relaxed(strategy.validation.ownership_relaxation),
            enforce_structure: strategy.validation.enforce_structure,
            tiers: strategy.tiers.clone(),
            min_ultra_leverage: rules.ultra_leverage_required.0,
            min_core: rules.core_players_required.0,
            max_heavy_chalk: rules.heavy_chalk_max,
        }
    }

    pub fn ownership_band(&self) -> Band {
        self.ownership_band
    }

    pub fn is_valid(&self, lineup: &Lineup) -> bool {
        self.check(lineup).is_ok()
    }

    pub fn check(&self, lineup: &Lineup) -> Result<(), Rejection> {
        if lineup.total_salary > self.salary_cap || lineup.total_salary < self.salary_floor {
            return Err(Rejection::Salary {
                total: lineup.total_salary,
                floor: self.salary_floor,
                cap: self.salary_cap,
            });
        }

        if !self.ownership_band.contains(lineup.total_ownership) {
            return Err(Rejection::Ownership {
                total: lineup.total_ownership,
                band: self.ownership_band,
            });
        }

        check_slots(lineup).map_err(Rejection::Slots)?;

        if self.enforce_structure {
            self.check_structure(lineup).map_err(Rejection::Structure)?;
        }

        Ok(())
    }

    fn check_structure(&self, lineup: &Lineup) -> Result<(), String> {
        let counts = lineup.tier_counts(&self.tiers);
        if counts.ultra_leverage < self.min_ultra_leverage {
            return Err(format!(
                "{} ultra-leverage players, need {}",
                counts.ultra_leverage, self.min_ultra_leverage
            ));
        }
        if counts.core < self.min_core {
            return Err(format!(
                "{} core players, need {}",
                counts.core, self.min_core
            ));
        }
        if counts.chalk > self.max_heavy_chalk {
            return Err(format!(
                "{} chalk players, at most {} allowed",
                counts.chalk, self.max_heavy_chalk
            ));
        }
        if lineup.stack_count() == 0 {
            return Err("no QB teammate".into());
        }
        Ok(())
    }
}

/// Position counts, roster size, unique names and slot compatibility.
fn check_slots(lineup: &Lineup) -> Result<(), String> {
    if lineup.len() != LINEUP_SIZE {
        return Err(format!("{} players, expected {LINEUP_SIZE}", lineup.len()));
    }
    if lineup.names().len() != LINEUP_SIZE {
        return Err("a player appears twice".into());
    }
    for entry in &lineup.entries {
        if !entry.slot.kind().accepts(entry.player.position) {
            return Err(format!("{} cannot play {}", entry.player.name, entry.slot));
        }
    }

    let count = |pos| lineup.count_position(pos);
    let requirements = [
        (Position::Quarterback, count(Position::Quarterback) == 1, "exactly 1"),
        (Position::RunningBack, count(Position::RunningBack) >= 2, "at least 2"),
        (Position::WideReceiver, count(Position::WideReceiver) >= 3, "at least 3"),
        (Position::TightEnd, count(Position::TightEnd) >= 1, "at least 1"),
        (Position::Defense, count(Position::Defense) == 1, "exactly 1"),
    ];
    for (pos, ok, rule) in requirements {
        if !ok {
            return Err(format!("{} {pos}, need {rule}", count(pos)));
        }
    }
    Ok(())
}
