//! Report assembly.
//!
//! Joins the processed poll, the computed fair probabilities, and any
//! manual overrides into one row per resolvable entry, then partitions
//! into valid (has a probability) and missing.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use common::{EvReport, FairProbability, ProcessedPoll};
use tracing::debug;

use crate::ev::score_entry;
use crate::overrides::ManualOverrides;

/// Build the per-cycle EV report. Entries with an unresolved team id are
/// skipped entirely; the valid partition is sorted by expected value
/// descending with ties keeping encounter order.
pub fn build_report(
    poll: &ProcessedPoll,
    fair: &BTreeMap<i64, FairProbability>,
    overrides: &ManualOverrides,
) -> EvReport {
    let mut valid = Vec::new();
    let mut missing = Vec::new();

    for entry in &poll.entries {
        let Some(team_id) = entry.team_id else {
            debug!("Skipping unresolved poll entry: {}", entry.label);
            continue;
        };
        let computed = fair.get(&team_id).map(|f| f.mean);
        let prob = overrides.resolve(team_id, computed);
        let row = score_entry(entry, team_id, prob);
        if row.is_missing {
            missing.push(row);
        } else {
            valid.push(row);
        }
    }

    // Vec::sort_by is stable, so equal EVs keep encounter order.
    valid.sort_by(|a, b| {
        b.expected_value
            .partial_cmp(&a.expected_value)
            .unwrap_or(Ordering::Equal)
    });

    EvReport {
        valid,
        missing,
        total_votes: poll.total_votes,
    }
}
