//! Manually entered fair probabilities.
//!
//! Owned by the orchestrating layer and handed into the aggregator each
//! cycle; a manual value always beats a computed one for the same team.

use std::collections::HashMap;

use common::Result;

use crate::fair::pair_fair_prob;

/// Per-cycle manual probability overrides keyed by team id.
#[derive(Debug, Clone, Default)]
pub struct ManualOverrides {
    probs: HashMap<i64, f64>,
}

impl ManualOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive and store an override from two user-entered odds, using the
    /// same devig as the computed path. Returns the stored probability.
    pub fn set_from_odds(&mut self, team_id: i64, team_odds: i32, opponent_odds: i32) -> Result<f64> {
        let p = pair_fair_prob(team_odds, opponent_odds)?;
        self.probs.insert(team_id, p);
        Ok(p)
    }

    pub fn get(&self, team_id: i64) -> Option<f64> {
        self.probs.get(&team_id).copied()
    }

    /// Manual value if present, else the computed fallback.
    pub fn resolve(&self, team_id: i64, computed: Option<f64>) -> Option<f64> {
        self.get(team_id).or(computed)
    }

    pub fn clear(&mut self) {
        self.probs.clear();
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_from_odds_matches_pair_fair() {
        let mut overrides = ManualOverrides::new();
        let stored = overrides.set_from_odds(5, -130, 110).unwrap();
        assert_eq!(overrides.get(5), Some(stored));
        assert_eq!(stored, pair_fair_prob(-130, 110).unwrap());
    }

    #[test]
    fn test_zero_odds_rejected() {
        let mut overrides = ManualOverrides::new();
        assert!(overrides.set_from_odds(5, 0, 110).is_err());
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_resolve_precedence() {
        let mut overrides = ManualOverrides::new();
        overrides.set_from_odds(5, -130, 110).unwrap();

        let manual = overrides.get(5).unwrap();
        assert_eq!(overrides.resolve(5, Some(0.9)), Some(manual));
        assert_eq!(overrides.resolve(6, Some(0.9)), Some(0.9));
        assert_eq!(overrides.resolve(6, None), None);
    }

    #[test]
    fn test_clear() {
        let mut overrides = ManualOverrides::new();
        overrides.set_from_odds(5, -130, 110).unwrap();
        overrides.clear();
        assert!(overrides.is_empty());
    }
}
