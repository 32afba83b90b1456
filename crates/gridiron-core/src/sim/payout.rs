// Placement-to-prize mapping for a contest profile.

use serde::Serialize;

use crate::config::ContestRules;

/// Approximate prize table: a few explicit top payouts, then a flat
/// min-cash for every other paid place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoutStructure {
    pub entries: u32,
    pub entry_fee: f64,
    pub prize_pool: f64,
    /// Last paid placement for the flat tier.
    pub places_paid: u32,
    /// `explicit[i]` is the prize for placement `i + 1`.
    pub explicit: Vec<f64>,
    pub flat_payout: f64,
}

impl PayoutStructure {
    pub fn build(rules: &ContestRules, entry_fee: f64) -> Self {
        let prize_pool = rules.entries as f64 * entry_fee;
        let shape = &rules.payout;
        let explicit = std::iter::once(shape.first_place_share)
            .chain(shape.top_shares.iter().copied())
            .map(|share| share * prize_pool)
            .collect();
        PayoutStructure {
            entries: rules.entries,
            entry_fee,
            prize_pool,
            places_paid: (rules.entries as f64 * shape.places_paid_fraction).floor() as u32,
            explicit,
            flat_payout: entry_fee * shape.flat_payout_multiple,
        }
    }

    /// Prize for a 1-based placement. Explicit entries win over the flat
    /// tier; anything past the paid cutoff and not listed pays nothing.
    pub fn payout(&self, placement: u32) -> f64 {
        if placement == 0 {
            return 0.0;
        }
        if let Some(prize) = self.explicit.get(placement as usize - 1) {
            return *prize;
        }
        if placement <= self.places_paid {
            return self.flat_payout;
        }
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::default_config;

    #[test]
    fn small_gpp_table() {
        let config = default_config();
        let rules = config.contest("small_gpp").unwrap();
        let payout = PayoutStructure::build(rules, 20.0);

        assert!((payout.prize_pool - 88_880.0).abs() < 1e-6);
        assert_eq!(payout.places_paid, 888);
        assert_eq!(payout.explicit.len(), 5);
        assert!((payout.payout(1) - 22_220.0).abs() < 1e-6);
        assert!((payout.payout(2) - 8_888.0).abs() < 1e-6);
        assert!((payout.payout(6) - 30.0).abs() < 1e-9);
        assert!((payout.payout(888) - 30.0).abs() < 1e-9);
        assert_eq!(payout.payout(889), 0.0);
        assert_eq!(payout.payout(0), 0.0);
    }

    #[test]
    fn explicit_entries_pay_past_cutoff() {
        let payout = PayoutStructure {
            entries: 10,
            entry_fee: 5.0,
            prize_pool: 50.0,
            places_paid: 1,
            explicit: vec![20.0, 10.0, 5.0],
            flat_payout: 7.5,
        };
        assert_eq!(payout.payout(3), 5.0);
        assert_eq!(payout.payout(4), 0.0);
    }
}
