// Batch-level lineup mix: how many accepted lineups should carry a leverage
// QB and how many a full game stack, and which kind the next attempt builds.

use serde::Serialize;

use crate::config::{Band, ContestRules};
use crate::lineup::Lineup;

/// QB teammates that make a stack a game stack.
pub const GAME_STACK_TEAMMATES: usize = 2;

/// What a build attempt is aiming for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineupType {
    LeverageStack,
    LeverageQb,
    GameStack,
    Balanced,
}

impl LineupType {
    pub fn wants_leverage_qb(self) -> bool {
        matches!(self, LineupType::LeverageStack | LineupType::LeverageQb)
    }

    pub fn wants_game_stack(self) -> bool {
        matches!(self, LineupType::LeverageStack | LineupType::GameStack)
    }

    pub fn label(self) -> &'static str {
        match self {
            LineupType::LeverageStack => "leverage_stack",
            LineupType::LeverageQb => "leverage_qb",
            LineupType::GameStack => "game_stack",
            LineupType::Balanced => "balanced",
        }
    }
}

/// Target and accepted counts for the two tracked lineup traits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineupMix {
    pub leverage_qb_target: usize,
    pub leverage_qb: usize,
    pub game_stack_target: usize,
    pub game_stack: usize,
}

#[derive(Debug, Clone)]
pub struct LineupQuota {
    leverage_band: Band,
    mix: LineupMix,
}

impl LineupQuota {
    /// Targets are `floor(batch * pct)` for each trait.
    pub fn new(rules: &ContestRules, batch: usize) -> Self {
        let target = |pct: f64| (batch as f64 * pct).floor() as usize;
        LineupQuota {
            leverage_band: rules.qb_ownership_target,
            mix: LineupMix {
                leverage_qb_target: target(rules.leverage_qb_pct),
                leverage_qb: 0,
                game_stack_target: target(rules.game_stack_pct),
                game_stack: 0,
            },
        }
    }

    /// The kind of lineup the next attempt should build, given what has
    /// been accepted so far.
    pub fn next_type(&self) -> LineupType {
        let m = &self.mix;
        let need_leverage = m.leverage_qb < m.leverage_qb_target;
        let need_stack = m.game_stack < m.game_stack_target;
        match (need_leverage, need_stack) {
            (true, true) => LineupType::LeverageStack,
            (true, false) => LineupType::LeverageQb,
            (false, true) => LineupType::GameStack,
            (false, false) => LineupType::Balanced,
        }
    }

    /// QB ownership inside the profile's leverage band.
    pub fn has_leverage_qb(&self, lineup: &Lineup) -> bool {
        lineup
            .qb()
            .is_some_and(|qb| self.leverage_band.contains(qb.ownership))
    }

    pub fn has_game_stack(&self, lineup: &Lineup) -> bool {
        lineup.stack_count() >= GAME_STACK_TEAMMATES
    }

    /// Count an accepted lineup by what it actually holds, whatever it was
    /// built for.
    pub fn record(&mut self, lineup: &Lineup) {
        if self.has_leverage_qb(lineup) {
            self.mix.leverage_qb += 1;
        }
        if self.has_game_stack(lineup) {
            self.mix.game_stack += 1;
        }
    }

    pub fn mix(&self) -> &LineupMix {
        &self.mix
    }

    pub fn into_mix(self) -> LineupMix {
        self.mix
    }
}
