// Monte Carlo tournament simulation for finished lineups.
//
// Each trial draws every rostered player's score from N(projection, std_dev)
// floored at zero, sums them, and places the lineup against a field whose
// entries are drawn from a single N(field_mean, field_std_dev). Only field
// scores strictly above the lineup's count against it. Fields larger than
// the configured sample size are not drawn entry by entry: the beaten-by
// count comes from Binomial(entries, P(field entry > lineup score)).

use rand::Rng;
use rand_distr::{Binomial, Distribution, Normal};
use statrs::distribution::{self as stats, ContinuousCDF};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::lineup::{Lineup, LINEUP_SIZE};
use crate::sim::payout::PayoutStructure;

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("lineup has {players} players, expected {LINEUP_SIZE}")]
    MalformedLineup { players: usize },

    #[error("invalid score distribution for {name}: mean {mean}, std dev {std_dev}")]
    InvalidDistribution {
        name: String,
        mean: f64,
        std_dev: f64,
    },

    #[error("simulation needs at least one iteration")]
    ZeroIterations,

    #[error("contest has no entries to simulate against")]
    EmptyField,
}

/// Expected ROI as a percentage of the entry fee. Zero for free contests.
pub fn roi_percent(expected_payout: f64, entry_fee: f64) -> f64 {
    if entry_fee > 0.0 {
        (expected_payout - entry_fee) / entry_fee * 100.0
    } else {
        0.0
    }
}

/// Simulated results for one lineup. Rates are fractions in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeStats {
    pub win_rate: f64,
    pub top_decile_rate: f64,
    pub cash_rate: f64,
    pub expected_payout: f64,
    /// `(expected_payout - entry_fee) / entry_fee * 100`.
    pub expected_roi: f64,
    pub mean_placement: f64,
    pub median_placement: f64,
    pub iterations: usize,
}

impl OutcomeStats {
    /// Zero-filled result used when a lineup cannot be simulated.
    pub fn neutral(entry_fee: f64) -> Self {
        OutcomeStats {
            win_rate: 0.0,
            top_decile_rate: 0.0,
            cash_rate: 0.0,
            expected_payout: 0.0,
            expected_roi: roi_percent(0.0, entry_fee),
            mean_placement: 0.0,
            median_placement: 0.0,
            iterations: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutcomeSimulator {
    iterations: usize,
    field_mean: f64,
    field_std_dev: f64,
    top_decile_fraction: f64,
    field_sample_size: Option<u32>,
}

impl OutcomeSimulator {
    pub fn new(config: &SimulationConfig) -> Self {
        OutcomeSimulator {
            iterations: config.iterations,
            field_mean: config.field_mean,
            field_std_dev: config.field_std_dev,
            top_decile_fraction: config.top_decile_fraction,
            field_sample_size: config.field_sample_size,
        }
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Simulate one lineup. Any failure yields neutral stats instead of an
    /// error so one bad lineup never sinks a batch.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        lineup: &Lineup,
        payout: &PayoutStructure,
        rng: &mut R,
    ) -> OutcomeStats {
        match self.try_simulate(lineup, payout, rng) {
            Ok(stats) => stats,
            Err(e) => {
                warn!("simulation failed, using neutral stats: {}", e);
                OutcomeStats::neutral(payout.entry_fee)
            }
        }
    }

    /// Simulate every lineup; results are index-aligned with `lineups`.
    pub fn simulate_batch<R: Rng + ?Sized>(
        &self,
        lineups: &[Lineup],
        payout: &PayoutStructure,
        rng: &mut R,
    ) -> Vec<OutcomeStats> {
        let stats: Vec<OutcomeStats> = lineups
            .iter()
            .map(|l| self.simulate(l, payout, rng))
            .collect();
        info!(
            "Simulated {} lineups x {} iterations against {} entries",
            lineups.len(),
            self.iterations,
            payout.entries
        );
        stats
    }

    pub fn try_simulate<R: Rng + ?Sized>(
        &self,
        lineup: &Lineup,
        payout: &PayoutStructure,
        rng: &mut R,
    ) -> Result<OutcomeStats, SimulationError> {
        if lineup.len() != LINEUP_SIZE {
            return Err(SimulationError::MalformedLineup {
                players: lineup.len(),
            });
        }
        if self.iterations == 0 {
            return Err(SimulationError::ZeroIterations);
        }
        if payout.entries == 0 {
            return Err(SimulationError::EmptyField);
        }

        let n = self.iterations;
        let lineup_scores = self.lineup_scores(lineup, n, rng)?;
        let field = normal("field", self.field_mean, self.field_std_dev)?;

        let exact = self
            .field_sample_size
            .map_or(true, |max| payout.entries <= max);
        let tail = FieldTail::new(self.field_mean, self.field_std_dev)?;

        let top_decile_cut = (payout.entries as f64 * self.top_decile_fraction).floor() as u32;
        let mut placements: Vec<u32> = Vec::with_capacity(n);
        let mut wins = 0usize;
        let mut top_decile = 0usize;
        let mut cashes = 0usize;
        let mut total_payout = 0.0;

        for score in lineup_scores {
            let beaten_by = if exact {
                (0..payout.entries)
                    .filter(|_| field.sample(rng) > score)
                    .count() as u32
            } else {
                let p = tail.beat_probability(score);
                Binomial::new(u64::from(payout.entries), p)
                    .map_err(|_| SimulationError::InvalidDistribution {
                        name: "field".to_string(),
                        mean: self.field_mean,
                        std_dev: self.field_std_dev,
                    })?
                    .sample(rng) as u32
            };
            let placement = beaten_by + 1;

            if placement == 1 {
                wins += 1;
            }
            if placement <= top_decile_cut {
                top_decile += 1;
            }
            let prize = payout.payout(placement);
            if prize > 0.0 {
                cashes += 1;
                total_payout += prize;
            }
            placements.push(placement);
        }

        let trials = n as f64;
        let expected_payout = total_payout / trials;
        Ok(OutcomeStats {
            win_rate: wins as f64 / trials,
            top_decile_rate: top_decile as f64 / trials,
            cash_rate: cashes as f64 / trials,
            expected_payout,
            expected_roi: roi_percent(expected_payout, payout.entry_fee),
            mean_placement: placements.iter().map(|p| *p as f64).sum::<f64>() / trials,
            median_placement: median(&mut placements),
            iterations: n,
        })
    }

    /// Lineup total per trial, built one player column at a time.
    fn lineup_scores<R: Rng + ?Sized>(
        &self,
        lineup: &Lineup,
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<f64>, SimulationError> {
        let mut totals = vec![0.0; n];
        for player in lineup.players() {
            let dist = normal(&player.name, player.projection, player.std_dev)?;
            for total in totals.iter_mut() {
                *total += dist.sample(rng).max(0.0);
            }
        }
        Ok(totals)
    }
}

/// Upper tail of the field score distribution.
enum FieldTail {
    Curve(stats::Normal),
    /// Zero spread: every entry scores exactly the mean.
    Point(f64),
}

impl FieldTail {
    fn new(mean: f64, std_dev: f64) -> Result<Self, SimulationError> {
        if std_dev == 0.0 {
            return Ok(FieldTail::Point(mean));
        }
        stats::Normal::new(mean, std_dev)
            .map(FieldTail::Curve)
            .map_err(|_| SimulationError::InvalidDistribution {
                name: "field".to_string(),
                mean,
                std_dev,
            })
    }

    /// Probability that one field entry scores strictly above `score`.
    fn beat_probability(&self, score: f64) -> f64 {
        match self {
            FieldTail::Curve(curve) => curve.sf(score).clamp(0.0, 1.0),
            FieldTail::Point(mean) if *mean > score => 1.0,
            FieldTail::Point(_) => 0.0,
        }
    }
}

fn normal(name: &str, mean: f64, std_dev: f64) -> Result<Normal<f64>, SimulationError> {
    let invalid = || SimulationError::InvalidDistribution {
        name: name.to_string(),
        mean,
        std_dev,
    };
    if !mean.is_finite() {
        return Err(invalid());
    }
    Normal::new(mean, std_dev).map_err(|_| invalid())
}

fn median(values: &mut [u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] as f64 + values[mid] as f64) / 2.0
    } else {
        values[mid] as f64
    }
}
