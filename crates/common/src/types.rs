//! Domain types shared across the bot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Reference directories ─────────────────────────────────────────────

/// A bookmaker/book entry from the odds feed's market-source directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSource {
    pub id: i64,
    pub name: String,
}

/// Book id → display name, rebuilt wholesale on every refresh.
pub type MarketDirectory = BTreeMap<i64, String>;

/// A team from the odds feed's team directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub abbreviation: String,
    #[serde(default)]
    pub event_id: Option<i64>,
    pub league_id: u32,
}

/// Team id → team, rebuilt wholesale on every refresh.
pub type TeamDirectory = BTreeMap<i64, Team>;

// ── Normalized odds ───────────────────────────────────────────────────

/// One book's quote for one side of an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookPrice {
    /// Signed American odds; never zero for a real quote.
    pub american_odds: i32,
    /// Point line — only meaningful for spread-style bet types.
    #[serde(default)]
    pub line: Option<f64>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

/// One side of an event with its per-book quotes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideOdds {
    pub team_id: i64,
    /// Book id → quote. Partial coverage per book is normal.
    #[serde(default)]
    pub books: BTreeMap<i64, BookPrice>,
}

/// A single matchup for "today" in the target league.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub start_time_utc: DateTime<Utc>,
    pub sides: [SideOdds; 2],
}

// ── Poll ──────────────────────────────────────────────────────────────

/// A parsed poll option, annotated with its vote rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollEntry {
    pub label: String,
    /// Poll-quoted American odds; 0 when the quoted value was malformed.
    pub american_odds: i32,
    pub votes: i64,
    /// 1-based rank by descending votes; ties keep input order.
    pub rank: u32,
    /// Resolved via abbreviation lookup scoped to one league.
    pub team_id: Option<i64>,
}

/// The processed poll for one cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessedPoll {
    pub entries: Vec<PollEntry>,
    pub total_votes: i64,
}

// ── Fair probabilities ────────────────────────────────────────────────

/// One qualifying book pair's contribution to a team's fair probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookFair {
    pub book: String,
    pub team_odds: i32,
    pub opponent_odds: i32,
    pub fair_prob: f64,
}

/// A team's no-vig win probability averaged across qualifying books.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairProbability {
    pub team_id: i64,
    pub mean: f64,
    /// Per-book audit detail, in feed order.
    pub books: Vec<BookFair>,
}

// ── EV report ─────────────────────────────────────────────────────────

/// One report row for a poll entry with a resolvable team id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvResult {
    pub team: String,
    pub team_id: i64,
    pub rank: u32,
    pub real_odds: i32,
    pub payout: f64,
    pub fair_prob: Option<f64>,
    /// payout × fair_prob; 0 when no probability is available.
    pub expected_value: f64,
    /// No qualifying book pair and no manual override for this team.
    pub is_missing: bool,
}

/// The per-cycle report: valid rows sorted by EV, missing rows apart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvReport {
    pub valid: Vec<EvResult>,
    pub missing: Vec<EvResult>,
    pub total_votes: i64,
}
