//! Unabated game-odds feed client.
//!
//! Fetches the pregame odds payload for a league and extracts the
//! reference directories (market sources, teams) it embeds. Record-level
//! parsing is deliberately lenient: a malformed market source, team, or
//! event is skipped with a warning, never failing the whole feed.

pub mod normalize;
pub mod snapshot;
pub mod token;

use std::collections::HashMap;

use common::{Error, MarketDirectory, MarketSource, Result, Team, TeamDirectory};
use serde::Deserialize;
use tracing::{debug, warn};

pub use token::{EnvToken, StaticToken, TokenProvider};

// ── Feed types ────────────────────────────────────────────────────────

/// Top level of `b_gameodds.json`. Record lists stay as raw values so a
/// single bad record cannot poison its siblings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOddsFeed {
    #[serde(default)]
    pub market_sources: Vec<serde_json::Value>,
    #[serde(default)]
    pub teams: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub game_odds_events: HashMap<String, Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedTeam {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    abbreviation: String,
    #[serde(default)]
    event_id: Option<i64>,
    #[serde(default)]
    league_id: u32,
}

/// One event record inside a league's event list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FeedEvent {
    pub event_id: i64,
    pub event_start: String,
    #[serde(default)]
    pub name: String,
    pub event_teams: HashMap<String, FeedTeamRef>,
    #[serde(default)]
    pub game_odds_market_sources_lines: HashMap<String, HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FeedTeamRef {
    pub id: i64,
}

/// One book's line for one side and bet type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FeedLine {
    pub market_source_id: i64,
    pub american_price: i32,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub modified_on: Option<String>,
}

// ── Client ────────────────────────────────────────────────────────────

/// HTTP client for the game-odds feed.
#[derive(Debug, Clone)]
pub struct UnabatedClient {
    client: reqwest::Client,
    feed_url: String,
}

impl UnabatedClient {
    pub fn new(feed_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build odds HTTP client");

        Self {
            client,
            feed_url: feed_url.to_string(),
        }
    }

    /// Fetch the raw feed. The session token goes out as the `v` query
    /// parameter; a non-success status is an explicit failure and the
    /// caller keeps its previous cycle's results.
    pub async fn fetch_game_odds(&self, token: &str) -> Result<GameOddsFeed> {
        debug!("Fetching game odds feed");

        let resp = self
            .client
            .get(&self.feed_url)
            .query(&[("v", token)])
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Feed {
                status,
                message: body.chars().take(300).collect(),
            });
        }

        resp.json().await.map_err(|e| Error::Http(e.to_string()))
    }
}

// ── Reference directories ─────────────────────────────────────────────

/// Build the book directory from the feed. Rebuilt wholesale per cycle.
pub fn market_directory(feed: &GameOddsFeed) -> MarketDirectory {
    let mut directory = MarketDirectory::new();
    for raw in &feed.market_sources {
        match serde_json::from_value::<MarketSource>(raw.clone()) {
            Ok(source) => {
                directory.insert(source.id, source.name);
            }
            Err(e) => warn!("Skipping malformed market source: {}", e),
        }
    }
    directory
}

/// Build the team directory from the feed. Rebuilt wholesale per cycle.
pub fn team_directory(feed: &GameOddsFeed) -> TeamDirectory {
    let mut directory = TeamDirectory::new();
    for raw in feed.teams.values() {
        match serde_json::from_value::<FeedTeam>(raw.clone()) {
            Ok(team) => {
                directory.insert(
                    team.id,
                    Team {
                        id: team.id,
                        name: team.name,
                        abbreviation: team.abbreviation,
                        event_id: team.event_id,
                        league_id: team.league_id,
                    },
                );
            }
            Err(e) => warn!("Skipping malformed team record: {}", e),
        }
    }
    directory
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_market_directory_skips_malformed() {
        let feed: GameOddsFeed = serde_json::from_value(json!({
            "marketSources": [
                { "id": 1, "name": "Pinnacle" },
                { "name": "missing id" },
                { "id": 2, "name": "Circa" },
            ]
        }))
        .unwrap();

        let directory = market_directory(&feed);
        assert_eq!(directory.len(), 2);
        assert_eq!(directory[&1], "Pinnacle");
        assert_eq!(directory[&2], "Circa");
    }

    #[test]
    fn test_team_directory_skips_malformed() {
        let feed: GameOddsFeed = serde_json::from_value(json!({
            "teams": {
                "101": { "id": 101, "name": "Boston", "abbreviation": "BOS",
                         "eventId": 7, "leagueId": 6 },
                "bad": { "abbreviation": "no id" },
            }
        }))
        .unwrap();

        let directory = team_directory(&feed);
        assert_eq!(directory.len(), 1);
        assert_eq!(directory[&101].abbreviation, "BOS");
        assert_eq!(directory[&101].event_id, Some(7));
        assert_eq!(directory[&101].league_id, 6);
    }

    #[test]
    fn test_empty_feed_sections_default() {
        let feed: GameOddsFeed = serde_json::from_value(json!({})).unwrap();
        assert!(market_directory(&feed).is_empty());
        assert!(team_directory(&feed).is_empty());
        assert!(feed.game_odds_events.is_empty());
    }
}
