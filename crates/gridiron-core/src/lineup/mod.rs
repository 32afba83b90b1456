// Lineups: the slot model, the in-progress draft and the finished roster.

pub mod draft;
pub mod slot;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::TierThresholds;
use crate::pool::player::{Player, Position, TierCounts};
pub use draft::{Budget, LineupDraft};
pub use slot::{LineupSlot, SlotKind, LINEUP_SIZE, ROSTER_TEMPLATE, SLOT_LABELS};

/// A player and the slot they occupy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupEntry {
    pub slot: LineupSlot,
    pub player: Player,
}

/// A complete nine-player lineup with its aggregates.
///
/// Entries are kept in roster template order. `score` is filled in by the
/// ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    pub entries: Vec<LineupEntry>,
    pub total_salary: u32,
    pub total_projection: f64,
    /// Sum of the nine players' ownership percentages.
    pub total_ownership: f64,
    pub score: Option<f64>,
}

impl Lineup {
    pub fn new(entries: Vec<LineupEntry>) -> Self {
        let total_salary = entries.iter().map(|e| e.player.salary).sum();
        let total_projection = entries.iter().map(|e| e.player.projection).sum();
        let total_ownership = entries.iter().map(|e| e.player.ownership).sum();
        Lineup {
            entries,
            total_salary,
            total_projection,
            total_ownership,
            score: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn avg_ownership(&self) -> f64 {
        if self.entries.is_empty() {
            0.0
        } else {
            self.total_ownership / self.entries.len() as f64
        }
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.entries.iter().map(|e| &e.player)
    }

    pub fn names(&self) -> HashSet<&str> {
        self.players().map(|p| p.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.players().any(|p| p.name == name)
    }

    pub fn count_position(&self, pos: Position) -> usize {
        self.players().filter(|p| p.position == pos).count()
    }

    pub fn qb(&self) -> Option<&Player> {
        self.players().find(|p| p.position == Position::Quarterback)
    }

    /// Non-QB players on the QB's team.
    pub fn stack_count(&self) -> usize {
        let Some(qb) = self.qb() else {
            return 0;
        };
        self.players()
            .filter(|p| p.position != Position::Quarterback && p.team == qb.team)
            .count()
    }

    pub fn tier_counts(&self, tiers: &TierThresholds) -> TierCounts {
        TierCounts::tally(self.players().map(|p| p.tier(tiers)))
    }

    /// Number of player names shared with `other`.
    pub fn overlap(&self, other: &Lineup) -> usize {
        let mine = self.names();
        other
            .players()
            .filter(|p| mine.contains(p.name.as_str()))
            .count()
    }

    /// Names of the `n` highest-salaried players, most expensive first.
    pub fn top_salaries(&self, n: usize) -> Vec<&str> {
        let mut players: Vec<&Player> = self.players().collect();
        players.sort_by(|a, b| b.salary.cmp(&a.salary).then_with(|| a.name.cmp(&b.name)));
        players.into_iter().take(n).map(|p| p.name.as_str()).collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Nine players in template order; QB and the first WR share a team.
    pub(crate) fn sample_lineup() -> Lineup {
        let specs: [(&str, LineupSlot, &str, u32, f64, f64); 9] = [
            ("QB A", LineupSlot::Fixed(Position::Quarterback), "AAA", 6000, 20.0, 10.0),
            ("RB A", LineupSlot::Fixed(Position::RunningBack), "BBB", 5000, 12.0, 10.0),
            ("RB B", LineupSlot::Fixed(Position::RunningBack), "CCC", 6000, 14.0, 10.0),
            ("WR A", LineupSlot::Fixed(Position::WideReceiver), "AAA", 4000, 10.0, 10.0),
            ("WR B", LineupSlot::Fixed(Position::WideReceiver), "DDD", 5000, 12.0, 10.0),
            ("WR C", LineupSlot::Fixed(Position::WideReceiver), "EEE", 6000, 15.0, 10.0),
            ("TE A", LineupSlot::Fixed(Position::TightEnd), "FFF", 3000, 6.0, 10.0),
            ("FLEX A", LineupSlot::Flex(Position::RunningBack), "GGG", 7000, 16.0, 10.0),
            ("DST A", LineupSlot::Fixed(Position::Defense), "HHH", 2500, 7.0, 10.0),
        ];
        Lineup::new(
            specs
                .iter()
                .map(|(name, slot, team, salary, proj, own)| LineupEntry {
                    slot: *slot,
                    player: Player::new(*name, slot.position(), *team, *salary, *proj, *own, 5.0),
                })
                .collect(),
        )
    }

    #[test]
    fn aggregates() {
        let lineup = sample_lineup();
        assert_eq!(lineup.len(), 9);
        assert_eq!(lineup.total_salary, 44_500);
        assert!((lineup.total_projection - 112.0).abs() < 1e-9);
        assert!((lineup.total_ownership - 90.0).abs() < 1e-9);
        assert!((lineup.avg_ownership() - 10.0).abs() < 1e-9);
        assert!(lineup.score.is_none());
    }

    #[test]
    fn position_and_stack_queries() {
        let lineup = sample_lineup();
        assert_eq!(lineup.count_position(Position::RunningBack), 3);
        assert_eq!(lineup.qb().map(|p| p.name.as_str()), Some("QB A"));
        assert_eq!(lineup.stack_count(), 1);
        assert!(lineup.contains("TE A"));
    }

    #[test]
    fn overlap_and_top_salaries() {
        let a = sample_lineup();
        let mut b = sample_lineup();
        b.entries[8].player.name = "DST B".into();
        assert_eq!(a.overlap(&b), 8);
        assert_eq!(a.top_salaries(3), vec!["FLEX A", "QB A", "RB B"]);
    }
}
