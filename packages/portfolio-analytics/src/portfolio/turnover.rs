//! Turnover estimate.

use crate::config::RebalanceFrequency;

/// Estimate annual portfolio turnover from the rebalancing policy.
///
/// This is a policy lookup, not derived from prices or trades: monthly
/// rebalancing gives 1/12, quarterly 1/4, anything else 0.1. It stands in
/// until actual holdings changes are tracked.
pub fn turnover_rate(frequency: &RebalanceFrequency) -> f64 {
    match frequency {
        RebalanceFrequency::Monthly => 1.0 / 12.0,
        RebalanceFrequency::Quarterly => 1.0 / 4.0,
        RebalanceFrequency::Other(_) => 0.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turnover_rate() {
        assert_eq!(turnover_rate(&RebalanceFrequency::Monthly), 1.0 / 12.0);
        assert_eq!(turnover_rate(&RebalanceFrequency::Quarterly), 0.25);
        assert_eq!(turnover_rate(&RebalanceFrequency::parse("A")), 0.1);
        // Labels are case-sensitive
        assert_eq!(turnover_rate(&RebalanceFrequency::parse("m")), 0.1);
        assert_eq!(turnover_rate(&RebalanceFrequency::parse("q")), 0.1);
    }
}
