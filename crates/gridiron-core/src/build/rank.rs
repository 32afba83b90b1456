// Final ordering of an accepted batch.

use std::collections::BTreeMap;

use crate::config::{ContestRules, RankingConfig};
use crate::lineup::Lineup;

/// Share of `lineups` containing each player, keyed by name.
pub fn exposures(lineups: &[Lineup]) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for lineup in lineups {
        for player in lineup.players() {
            *counts.entry(player.name.clone()).or_insert(0) += 1;
        }
    }
    let n = lineups.len().max(1) as f64;
    counts
        .into_iter()
        .map(|(name, c)| (name, c as f64 / n))
        .collect()
}

#[derive(Debug, Clone)]
pub struct LineupRanker {
    projection_weight: f64,
    ownership_weight: f64,
    projection_normalizer: f64,
    /// Midpoint of the profile's average-ownership band.
    ownership_target: f64,
    exposure_threshold: f64,
    exposure_penalty: f64,
}

impl LineupRanker {
    pub fn new(rules: &ContestRules, ranking: &RankingConfig) -> Self {
        LineupRanker {
            projection_weight: rules.projection_weight,
            ownership_weight: rules.ownership_weight,
            projection_normalizer: ranking.projection_normalizer,
            ownership_target: rules.ownership_target_avg.midpoint(),
            exposure_threshold: ranking.exposure_threshold,
            exposure_penalty: ranking.exposure_penalty,
        }
    }

    /// 1.0 when average ownership sits on the target, falling linearly to 0.
    pub fn ownership_fit(&self, lineup: &Lineup) -> f64 {
        let target = self.ownership_target;
        (1.0 - (lineup.avg_ownership() - target).abs() / target).max(0.0)
    }

    /// Score before any exposure penalty.
    pub fn base_score(&self, lineup: &Lineup) -> f64 {
        self.projection_weight * (lineup.total_projection / self.projection_normalizer)
            + self.ownership_weight * self.ownership_fit(lineup)
    }

    /// Score every lineup and sort best first. Equal scores keep their
    /// input order.
    ///
    /// Lineups holding a player above the exposure threshold lose
    /// `exposure_penalty`. A batch of one has no meaningful exposure and is
    /// never penalized.
    pub fn rank(&self, mut lineups: Vec<Lineup>) -> Vec<Lineup> {
        let exposure = if lineups.len() > 1 {
            exposures(&lineups)
        } else {
            BTreeMap::new()
        };

        for lineup in &mut lineups {
            let overexposed = lineup
                .players()
                .any(|p| exposure.get(&p.name).is_some_and(|e| *e > self.exposure_threshold));
            let mut score = self.base_score(lineup);
            if overexposed {
                score -= self.exposure_penalty;
            }
            lineup.score = Some(score);
        }

        lineups.sort_by(|a, b| {
            let sa = a.score.unwrap_or(f64::MIN);
            let sb = b.score.unwrap_or(f64::MIN);
            sb.total_cmp(&sa)
        });
        lineups
    }
}
