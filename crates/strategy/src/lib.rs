//! EV scoring for the daily underdog poll.
//!
//! Turns normalized per-book odds into no-vig win probabilities, scores
//! each poll entry's payout against them, and assembles the ranked report.

pub mod engine;
pub mod ev;
pub mod fair;
pub mod overrides;

pub use engine::build_report;
pub use fair::{american_to_prob, compute_fair_probabilities, pair_fair_prob, prob_to_american};
pub use overrides::ManualOverrides;
