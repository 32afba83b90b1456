// Near-duplicate suppression across an accepted batch.

use crate::config::DedupConfig;
use crate::lineup::Lineup;

#[derive(Debug, Clone)]
pub struct Deduplicator {
    threshold: usize,
    strict: bool,
}

impl Deduplicator {
    pub fn new(config: &DedupConfig) -> Self {
        Deduplicator {
            threshold: config.overlap_threshold,
            strict: config.strict,
        }
    }

    /// Whether `candidate` is too close to any accepted lineup.
    pub fn is_duplicate(&self, candidate: &Lineup, accepted: &[Lineup]) -> bool {
        accepted.iter().any(|other| self.too_close(candidate, other))
    }

    fn too_close(&self, a: &Lineup, b: &Lineup) -> bool {
        if a.overlap(b) >= self.threshold {
            return true;
        }
        if self.strict {
            let same_qb = match (a.qb(), b.qb()) {
                (Some(x), Some(y)) => x.name == y.name,
                _ => false,
            };
            if same_qb {
                let top_b = b.top_salaries(3);
                let shared = a
                    .top_salaries(3)
                    .into_iter()
                    .filter(|name| top_b.contains(name))
                    .count();
                return shared >= 2;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineup::tests::sample_lineup;
    use crate::lineup::Lineup;

    fn dedup(strict: bool) -> Deduplicator {
        Deduplicator {
            threshold: 7,
            strict,
        }
    }

    /// Rename the players at `indices` so they no longer match the sample.
    fn swap(indices: &[usize]) -> Lineup {
        let mut lineup = sample_lineup();
        for &i in indices {
            lineup.entries[i].player.name = format!("Other {i}");
        }
        Lineup::new(lineup.entries)
    }

    #[test]
    fn overlap_at_threshold_is_duplicate() {
        let accepted = vec![sample_lineup()];
        // 7 shared
        assert!(dedup(false).is_duplicate(&swap(&[4, 6]), &accepted));
        // 6 shared
        assert!(!dedup(false).is_duplicate(&swap(&[4, 6, 8]), &accepted));
    }

    #[test]
    fn empty_batch_never_duplicate() {
        assert!(!dedup(true).is_duplicate(&sample_lineup(), &[]));
    }

    #[test]
    fn strict_mode_checks_qb_and_top_salaries() {
        let accepted = vec![sample_lineup()];
        // Same QB and the same three top salaries, but only 5 shared overall.
        let candidate = swap(&[1, 3, 4, 6]);
        assert!(!dedup(false).is_duplicate(&candidate, &accepted));
        assert!(dedup(true).is_duplicate(&candidate, &accepted));

        // Different QB: strict rule does not apply.
        let candidate = swap(&[0, 1, 3, 4, 6]);
        assert!(!dedup(true).is_duplicate(&candidate, &accepted));
    }
}
