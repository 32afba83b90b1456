// Player records and the per-run player pool.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::config::TierThresholds;

/// Football positions eligible for a classic DFS roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "QB")]
    Quarterback,
    #[serde(rename = "RB")]
    RunningBack,
    #[serde(rename = "WR")]
    WideReceiver,
    #[serde(rename = "TE")]
    TightEnd,
    #[serde(rename = "DST")]
    Defense,
}

impl Position {
    /// All positions in roster display order.
    pub const ALL: [Position; 5] = [
        Position::Quarterback,
        Position::RunningBack,
        Position::WideReceiver,
        Position::TightEnd,
        Position::Defense,
    ];

    /// Parse a position string into a Position enum.
    ///
    /// Accepts the usual site abbreviations plus a few aliases seen in
    /// exported pools ("D", "DEF" and "D/ST" all map to `Defense`).
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "DST" | "D/ST" | "DEF" | "D" => Some(Position::Defense),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Defense => "DST",
        }
    }

    /// Whether this position may occupy the FLEX slot.
    pub fn is_flex_eligible(&self) -> bool {
        matches!(
            self,
            Position::RunningBack | Position::WideReceiver | Position::TightEnd
        )
    }

    /// Whether this position is a pass catcher (preferred stack partner).
    pub fn is_pass_catcher(&self) -> bool {
        matches!(self, Position::WideReceiver | Position::TightEnd)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Ownership tier used for structure checks and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnershipTier {
    UltraLeverage,
    Core,
    Chalk,
    Other,
}

impl OwnershipTier {
    pub fn classify(ownership: f64, tiers: &TierThresholds) -> Self {
        if ownership < tiers.ultra_leverage_max {
            OwnershipTier::UltraLeverage
        } else if ownership > tiers.chalk_min {
            OwnershipTier::Chalk
        } else if (tiers.core_min..=tiers.core_max).contains(&ownership) {
            OwnershipTier::Core
        } else {
            OwnershipTier::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OwnershipTier::UltraLeverage => "leverage",
            OwnershipTier::Core => "core",
            OwnershipTier::Chalk => "chalk",
            OwnershipTier::Other => "-",
        }
    }
}

/// Players per ownership tier in one lineup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub ultra_leverage: usize,
    pub core: usize,
    pub chalk: usize,
    pub other: usize,
}

impl TierCounts {
    pub fn tally(tiers: impl IntoIterator<Item = OwnershipTier>) -> Self {
        let mut counts = TierCounts::default();
        for tier in tiers {
            match tier {
                OwnershipTier::UltraLeverage => counts.ultra_leverage += 1,
                OwnershipTier::Core => counts.core += 1,
                OwnershipTier::Chalk => counts.chalk += 1,
                OwnershipTier::Other => counts.other += 1,
            }
        }
        counts
    }

    /// e.g. "3 leverage / 4 core / 1 chalk"; empty tiers and `Other` are
    /// left out.
    pub fn summary(&self) -> String {
        [
            (OwnershipTier::UltraLeverage, self.ultra_leverage),
            (OwnershipTier::Core, self.core),
            (OwnershipTier::Chalk, self.chalk),
        ]
        .iter()
        .filter(|(_, n)| *n > 0)
        .map(|(tier, n)| format!("{n} {}", tier.label()))
        .collect::<Vec<_>>()
        .join(" / ")
    }
}

/// A single player in the slate.
///
/// Immutable for the duration of a run; derived fields are computed once on
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub position: Position,
    pub team: String,
    /// Opposing team abbreviation. Empty when unknown, which disables the
    /// bring-back and opponent-DST logic for this player.
    pub opponent: String,
    pub salary: u32,
    pub projection: f64,
    /// Standard deviation of the fantasy score, always >= 0.
    pub std_dev: f64,
    /// Projected ownership percentage, clipped to 0..=100.
    pub ownership: f64,
    /// Projected points per 1000 salary units.
    pub value: f64,
}

impl Player {
    pub fn new(
        name: impl Into<String>,
        position: Position,
        team: impl Into<String>,
        salary: u32,
        projection: f64,
        ownership: f64,
        std_dev: f64,
    ) -> Self {
        let value = if salary > 0 {
            projection / (salary as f64 / 1000.0)
        } else {
            0.0
        };
        Player {
            name: name.into(),
            position,
            team: team.into(),
            opponent: String::new(),
            salary,
            projection,
            std_dev: std_dev.max(0.0),
            ownership: ownership.clamp(0.0, 100.0),
            value,
        }
    }

    /// Builder-style setter for the opposing team.
    pub fn with_opponent(mut self, opponent: impl Into<String>) -> Self {
        self.opponent = opponent.into();
        self
    }

    pub fn has_opponent(&self) -> bool {
        !self.opponent.is_empty()
    }

    pub fn tier(&self, tiers: &TierThresholds) -> OwnershipTier {
        OwnershipTier::classify(self.ownership, tiers)
    }
}

/// The normalized player table for one optimization run.
#[derive(Debug, Clone, Default)]
pub struct PlayerPool {
    players: Vec<Player>,
}

impl PlayerPool {
    pub fn new(players: Vec<Player>) -> Self {
        PlayerPool { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn by_position(&self, pos: Position) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(move |p| p.position == pos)
    }

    /// Drop every player whose name appears in `names`.
    pub fn without(&self, names: &[String]) -> PlayerPool {
        PlayerPool {
            players: self
                .players
                .iter()
                .filter(|p| !names.contains(&p.name))
                .cloned()
                .collect(),
        }
    }

    /// Player count per position, for logging.
    pub fn position_counts(&self) -> HashMap<Position, usize> {
        let mut counts = HashMap::new();
        for p in &self.players {
            *counts.entry(p.position).or_insert(0) += 1;
        }
        counts
    }

    /// Cheapest salary at any of the given positions, if one exists.
    pub fn min_salary(&self, positions: &[Position]) -> Option<u32> {
        self.players
            .iter()
            .filter(|p| positions.contains(&p.position))
            .map(|p| p.salary)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiers() -> TierThresholds {
        TierThresholds {
            ultra_leverage_max: 5.0,
            core_min: 10.0,
            core_max: 25.0,
            chalk_min: 25.0,
        }
    }

    #[test]
    fn position_parsing_accepts_aliases() {
        assert_eq!(Position::from_str_pos("qb"), Some(Position::Quarterback));
        assert_eq!(Position::from_str_pos(" WR "), Some(Position::WideReceiver));
        assert_eq!(Position::from_str_pos("D/ST"), Some(Position::Defense));
        assert_eq!(Position::from_str_pos("DEF"), Some(Position::Defense));
        assert_eq!(Position::from_str_pos("K"), None);
    }

    #[test]
    fn flex_eligibility() {
        assert!(Position::RunningBack.is_flex_eligible());
        assert!(Position::WideReceiver.is_flex_eligible());
        assert!(Position::TightEnd.is_flex_eligible());
        assert!(!Position::Quarterback.is_flex_eligible());
        assert!(!Position::Defense.is_flex_eligible());
    }

    #[test]
    fn player_new_derives_value_and_clips() {
        let p = Player::new("Josh Allen", Position::Quarterback, "BUF", 8000, 24.0, 140.0, -3.0);
        assert!((p.value - 3.0).abs() < 1e-9);
        assert_eq!(p.ownership, 100.0);
        assert_eq!(p.std_dev, 0.0);
        assert!(!p.has_opponent());
        assert!(p.clone().with_opponent("MIA").has_opponent());
    }

    #[test]
    fn tier_classification() {
        let t = tiers();
        assert_eq!(OwnershipTier::classify(3.0, &t), OwnershipTier::UltraLeverage);
        assert_eq!(OwnershipTier::classify(7.0, &t), OwnershipTier::Other);
        assert_eq!(OwnershipTier::classify(10.0, &t), OwnershipTier::Core);
        assert_eq!(OwnershipTier::classify(25.0, &t), OwnershipTier::Core);
        assert_eq!(OwnershipTier::classify(25.5, &t), OwnershipTier::Chalk);
    }

    #[test]
    fn tier_counts_tally_and_summarize() {
        let t = tiers();
        let counts = TierCounts::tally([2.0, 3.0, 12.0, 20.0, 30.0, 7.0].map(|own| {
            OwnershipTier::classify(own, &t)
        }));
        assert_eq!(
            counts,
            TierCounts {
                ultra_leverage: 2,
                core: 2,
                chalk: 1,
                other: 1,
            }
        );
        assert_eq!(counts.summary(), "2 leverage / 2 core / 1 chalk");
        assert_eq!(TierCounts::default().summary(), "");
    }

    #[test]
    fn pool_queries() {
        let pool = PlayerPool::new(vec![
            Player::new("QB1", Position::Quarterback, "AAA", 6000, 20.0, 10.0, 6.5),
            Player::new("RB1", Position::RunningBack, "AAA", 5000, 12.0, 10.0, 7.0),
            Player::new("RB2", Position::RunningBack, "BBB", 7000, 16.0, 10.0, 7.0),
        ]);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.by_position(Position::RunningBack).count(), 2);
        assert_eq!(pool.min_salary(&[Position::RunningBack]), Some(5000));
        assert_eq!(pool.min_salary(&[Position::Defense]), None);
        assert!(pool.by_name("RB2").is_some());
        let trimmed = pool.without(&["RB1".to_string()]);
        assert_eq!(trimmed.len(), 2);
        assert!(trimmed.by_name("RB1").is_none());
        assert_eq!(pool.position_counts().get(&Position::RunningBack), Some(&2));
    }
}
