//! Payout and expected-value scoring for poll entries.

use common::{EvResult, PollEntry};

/// Payout for an entry: a fixed per-rank bonus plus the dollar return on
/// a notional $100 stake at the poll-quoted price.
pub fn payout(rank: u32, american_odds: i32) -> f64 {
    let rank_bonus = 20.0 * rank as f64;
    let odds_payout = if american_odds < 0 {
        (100.0 / american_odds.abs() as f64) * 100.0
    } else {
        american_odds as f64
    };
    rank_bonus + odds_payout
}

/// Score one poll entry against its resolved probability (manual or
/// computed). An absent probability flags the row missing with EV 0 —
/// downstream ranking excludes it rather than treating it as a real
/// zero-EV outcome.
pub fn score_entry(entry: &PollEntry, team_id: i64, fair_prob: Option<f64>) -> EvResult {
    let pay = payout(entry.rank, entry.american_odds);
    let (expected_value, is_missing) = match fair_prob {
        Some(p) => (pay * p, false),
        None => (0.0, true),
    };
    EvResult {
        team: entry.label.clone(),
        team_id,
        rank: entry.rank,
        real_odds: entry.american_odds,
        payout: pay,
        fair_prob,
        expected_value,
        is_missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rank: u32, odds: i32) -> PollEntry {
        PollEntry {
            label: "BOS".into(),
            american_odds: odds,
            votes: 10,
            rank,
            team_id: Some(1),
        }
    }

    #[test]
    fn test_payout_positive_odds() {
        assert!((payout(1, 150) - 170.0).abs() < 1e-12);
    }

    #[test]
    fn test_payout_negative_odds() {
        let expected = 40.0 + (100.0 / 120.0) * 100.0;
        assert!((payout(2, -120) - expected).abs() < 1e-9);
        assert!((expected - 123.333_333).abs() < 1e-3);
    }

    #[test]
    fn test_expected_value_exact() {
        let e = entry(1, 150);
        let scored = score_entry(&e, 1, Some(0.42));
        assert_eq!(scored.expected_value, payout(1, 150) * 0.42);
        assert!(!scored.is_missing);
    }

    #[test]
    fn test_missing_probability() {
        let e = entry(3, -140);
        let scored = score_entry(&e, 1, None);
        assert!(scored.is_missing);
        assert_eq!(scored.expected_value, 0.0);
        assert_eq!(scored.fair_prob, None);
        // Payout is still reported for the manual-entry fallback view.
        assert!(scored.payout > 0.0);
    }
}
