// Candidate scoring and weighted random selection.

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use std::collections::HashSet;

use crate::config::{ContestRules, SelectionConfig};
use crate::pool::player::Player;

/// Picks one player from a candidate set: a projection/leverage blend,
/// perturbed by per-candidate jitter, drawn by weight from the top of the
/// jittered ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionPolicy {
    pub projection_weight: f64,
    pub ownership_weight: f64,
    pub top_fraction: f64,
    pub jitter_low: f64,
    pub jitter_high: f64,
    pub leverage_floor: f64,
}

impl SelectionPolicy {
    pub fn new(rules: &ContestRules, selection: &SelectionConfig) -> Self {
        SelectionPolicy {
            projection_weight: rules.projection_weight,
            ownership_weight: rules.ownership_weight,
            top_fraction: rules.top_fraction,
            jitter_low: selection.jitter_low,
            jitter_high: selection.jitter_high,
            leverage_floor: selection.leverage_floor,
        }
    }

    /// Ownership leverage: 1.0 for an unowned player, falling linearly to
    /// the floor.
    pub fn leverage(&self, ownership: f64) -> f64 {
        ((100.0 - ownership) / 100.0).max(self.leverage_floor)
    }

    /// Deterministic part of the pick score.
    pub fn base_score(&self, player: &Player, max_projection: f64) -> f64 {
        let norm = if max_projection > 0.0 {
            player.projection / max_projection
        } else {
            0.0
        };
        self.projection_weight * norm + self.ownership_weight * self.leverage(player.ownership)
    }

    /// Select one eligible candidate, or `None` when nothing qualifies.
    ///
    /// Eligible means: not in `excluded`, salary at most `max_salary`, and a
    /// strictly positive projection.
    pub fn select<'a, R: Rng + ?Sized>(
        &self,
        candidates: impl IntoIterator<Item = &'a Player>,
        max_salary: u32,
        excluded: &HashSet<String>,
        rng: &mut R,
    ) -> Option<&'a Player> {
        let eligible: Vec<&Player> = candidates
            .into_iter()
            .filter(|p| p.salary <= max_salary && p.projection > 0.0 && !excluded.contains(&p.name))
            .collect();
        if eligible.is_empty() {
            return None;
        }

        let max_projection = eligible
            .iter()
            .map(|p| p.projection)
            .fold(f64::MIN, f64::max);

        let mut scored: Vec<(&Player, f64)> = eligible
            .into_iter()
            .map(|p| {
                let jitter = rng.random_range(self.jitter_low..=self.jitter_high);
                (p, self.base_score(p, max_projection) * jitter)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let keep = ((scored.len() as f64 * self.top_fraction).ceil() as usize).clamp(1, scored.len());
        scored.truncate(keep);

        match WeightedIndex::new(scored.iter().map(|(_, s)| s.max(0.0))) {
            Ok(dist) => Some(scored[dist.sample(rng)].0),
            // All weights zero: fall back to the best jittered score.
            Err(_) => Some(scored[0].0),
        }
    }
}
