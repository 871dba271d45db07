//! Underdog-poll feed client and processor.
//!
//! Fetches the daily poll through its proxy worker (a sport-key
//! directory resolves the rotating poll id first), then parses options
//! into ranked entries with team ids resolved by abbreviation.

use std::collections::HashMap;

use common::{Error, PollEntry, ProcessedPoll, Result, TeamDirectory};
use serde::Deserialize;
use tracing::{debug, warn};

// ── Poll feed types ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct PollFeed {
    pub poll: Poll,
}

/// Options stay as raw values so one malformed entry cannot fail the
/// whole poll; each is parsed individually in [`process_poll`].
#[derive(Debug, Clone, Deserialize)]
pub struct Poll {
    #[serde(default)]
    pub options: Vec<serde_json::Value>,
}

/// One raw poll option. `odds` arrives as a string, sometimes with a
/// leading "+", occasionally as a bare number.
#[derive(Debug, Clone, Deserialize)]
pub struct PollOption {
    pub label: String,
    #[serde(default)]
    pub odds: serde_json::Value,
    #[serde(default)]
    pub count: i64,
}

// ── Client ────────────────────────────────────────────────────────────

/// HTTP client for the poll-id directory and poll proxy.
#[derive(Debug, Clone)]
pub struct PollClient {
    client: reqwest::Client,
    ids_url: String,
    proxy_url: String,
}

impl PollClient {
    pub fn new(ids_url: &str, proxy_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build poll HTTP client");

        Self {
            client,
            ids_url: ids_url.to_string(),
            proxy_url: proxy_url.to_string(),
        }
    }

    /// Resolve the current poll id for a sport key.
    pub async fn fetch_poll_id(&self, sport: &str) -> Result<String> {
        let resp = self
            .client
            .get(&self.ids_url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status().as_u16();
        if status != 200 {
            return Err(Error::Poll(format!("poll id directory returned {}", status)));
        }

        let ids: HashMap<String, serde_json::Value> = resp.json().await.map_err(|e| {
            Error::Poll(format!("poll id directory parse error: {}", e))
        })?;

        match ids.get(sport) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
            _ => Err(Error::Poll(format!("no poll id for sport: {}", sport))),
        }
    }

    /// Fetch today's poll for a sport key.
    pub async fn fetch_poll(&self, sport: &str) -> Result<PollFeed> {
        let poll_id = self.fetch_poll_id(sport).await?;
        let url = format!(
            "{}?url=https://api.real.vg/polls/{}",
            self.proxy_url, poll_id
        );
        debug!("Fetching poll: {}", url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status().as_u16();
        if status != 200 {
            return Err(Error::Poll(format!("poll fetch returned {}", status)));
        }

        resp.json()
            .await
            .map_err(|e| Error::Poll(format!("poll parse error: {}", e)))
    }
}

// ── Processing ────────────────────────────────────────────────────────

/// Parse a quoted odds value: strip a leading "+", accept bare numbers.
/// Malformed values default to 0 rather than failing the whole poll.
fn parse_quoted_odds(raw: &serde_json::Value) -> i32 {
    let text = match raw {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return 0,
    };
    text.trim()
        .trim_start_matches('+')
        .parse::<i32>()
        .unwrap_or(0)
}

/// Parse and rank the raw poll against a team directory restricted to
/// one league. Entries keep input order; `rank` is 1-based by descending
/// votes with stable ties. Unmatched labels keep `team_id = None`.
pub fn process_poll(feed: &PollFeed, teams: &TeamDirectory, league_id: u32) -> ProcessedPoll {
    let abbr_to_id: HashMap<&str, i64> = teams
        .values()
        .filter(|t| t.league_id == league_id)
        .map(|t| (t.abbreviation.as_str(), t.id))
        .collect();

    let mut entries: Vec<PollEntry> = Vec::with_capacity(feed.poll.options.len());
    let mut total_votes = 0i64;

    for raw in &feed.poll.options {
        let option: PollOption = match serde_json::from_value(raw.clone()) {
            Ok(o) => o,
            Err(e) => {
                warn!("Skipping malformed poll option: {}", e);
                continue;
            }
        };
        let odds = parse_quoted_odds(&option.odds);
        if odds == 0 {
            warn!("Malformed odds for poll entry {:?}", option.label);
        }
        let team_id = abbr_to_id.get(option.label.as_str()).copied();
        if team_id.is_none() {
            debug!("No team match for poll label {:?}", option.label);
        }
        total_votes += option.count;
        entries.push(PollEntry {
            label: option.label.clone(),
            american_odds: odds,
            votes: option.count,
            rank: 0,
            team_id,
        });
    }

    // Stable sort of indices by descending votes, then write ranks back
    // so entries keep their input order.
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&a, &b| entries[b].votes.cmp(&entries[a].votes));
    for (rank, idx) in order.into_iter().enumerate() {
        entries[idx].rank = rank as u32 + 1;
    }

    ProcessedPoll {
        entries,
        total_votes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Team;
    use serde_json::json;

    fn feed(options: serde_json::Value) -> PollFeed {
        serde_json::from_value(json!({ "poll": { "options": options } })).unwrap()
    }

    fn team(id: i64, abbr: &str, league_id: u32) -> Team {
        Team {
            id,
            name: format!("Team {}", abbr),
            abbreviation: abbr.into(),
            event_id: Some(100 + id),
            league_id,
        }
    }

    fn directory() -> TeamDirectory {
        let mut teams = TeamDirectory::new();
        teams.insert(1, team(1, "BOS", 6));
        teams.insert(2, team(2, "CHI", 6));
        teams.insert(3, team(3, "SEA", 6));
        teams.insert(4, team(4, "DAL", 6));
        // Same abbreviation, different league — must not match.
        teams.insert(9, team(9, "BOS", 3));
        teams
    }

    #[test]
    fn test_odds_parsing() {
        let feed = feed(json!([
            { "label": "BOS", "odds": "+150", "count": 10 },
            { "label": "CHI", "odds": "-120", "count": 5 },
            { "label": "SEA", "odds": 135, "count": 3 },
            { "label": "DAL", "odds": "abc", "count": 2 },
        ]));
        let poll = process_poll(&feed, &directory(), 6);

        assert_eq!(poll.entries[0].american_odds, 150);
        assert_eq!(poll.entries[1].american_odds, -120);
        assert_eq!(poll.entries[2].american_odds, 135);
        assert_eq!(poll.entries[3].american_odds, 0);
        assert_eq!(poll.total_votes, 20);
    }

    #[test]
    fn test_ranking_stable_ties() {
        let feed = feed(json!([
            { "label": "BOS", "odds": "+100", "count": 10 },
            { "label": "CHI", "odds": "+100", "count": 30 },
            { "label": "SEA", "odds": "+100", "count": 30 },
            { "label": "DAL", "odds": "+100", "count": 5 },
        ]));
        let poll = process_poll(&feed, &directory(), 6);

        let ranks: Vec<u32> = poll.entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![4, 1, 2, 3]);
        // Input order preserved.
        let labels: Vec<&str> = poll.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["BOS", "CHI", "SEA", "DAL"]);
    }

    #[test]
    fn test_team_resolution_scoped_to_league() {
        let feed = feed(json!([
            { "label": "BOS", "odds": "+150", "count": 10 },
            { "label": "XXX", "odds": "+150", "count": 5 },
        ]));

        let poll = process_poll(&feed, &directory(), 6);
        assert_eq!(poll.entries[0].team_id, Some(1));
        assert_eq!(poll.entries[1].team_id, None);

        // Restricting to league 3 resolves the other BOS.
        let poll = process_poll(&feed, &directory(), 3);
        assert_eq!(poll.entries[0].team_id, Some(9));
    }

    #[test]
    fn test_malformed_option_skipped() {
        let feed = feed(json!([
            { "label": "BOS", "odds": "+150", "count": 10 },
            { "count": 5 },
        ]));
        let poll = process_poll(&feed, &directory(), 6);
        assert_eq!(poll.entries.len(), 1);
        assert_eq!(poll.total_votes, 10);
    }

    #[test]
    fn test_empty_poll() {
        let poll = process_poll(&feed(json!([])), &directory(), 6);
        assert!(poll.entries.is_empty());
        assert_eq!(poll.total_votes, 0);
    }
}
