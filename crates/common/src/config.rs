//! Bot configuration types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Bet type quoted by the odds feed, selected per league.
///
/// Leagues scored with a point spread carry their moneyline under a
/// different feed tag than spread-less leagues (hockey), so the tag is a
/// per-league constant, not something inferred per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetType {
    Moneyline,
    PointSpread,
}

impl BetType {
    /// Feed key for this bet type (`bt1` / `bt2`).
    pub fn tag(&self) -> &'static str {
        match self {
            BetType::Moneyline => "bt1",
            BetType::PointSpread => "bt2",
        }
    }

    /// Whether the feed's `points` field is meaningful for this bet type.
    pub fn has_line(&self) -> bool {
        matches!(self, BetType::PointSpread)
    }
}

/// Per-league feed parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueConfig {
    /// Numeric league id used in the feed's league key.
    pub id: u32,
    /// Bet-type tag the feed quotes this league's moneyline under.
    pub bet_type: BetType,
}

/// Remote endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Game-odds feed URL (the session token is appended as `?v=`).
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Sport key → poll id directory.
    #[serde(default = "default_poll_ids_url")]
    pub poll_ids_url: String,

    /// Proxy worker that forwards to the poll API.
    #[serde(default = "default_poll_proxy_url")]
    pub poll_proxy_url: String,
}

/// Timing parameters (all values in seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Odds feed request timeout.
    #[serde(default = "default_feed_timeout")]
    pub feed_timeout_secs: u64,

    /// Poll request timeout.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    /// Allowance for session-token resolution, which may wait on a page
    /// navigation in an external browser automation.
    #[serde(default = "default_token_timeout")]
    pub token_timeout_secs: u64,
}

/// Top-level bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Active league key (must exist in `leagues`).
    #[serde(default = "default_league")]
    pub league: String,

    /// League key → feed parameters. Adding a league is a data change.
    #[serde(default = "default_leagues")]
    pub leagues: BTreeMap<String, LeagueConfig>,

    /// Reference timezone for "today" filtering (IANA name).
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default)]
    pub endpoints: EndpointConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    /// Where the odds snapshot artifact is written.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Persisted reference directory paths.
    #[serde(default = "default_market_config_path")]
    pub market_config_path: String,

    #[serde(default = "default_team_config_path")]
    pub team_config_path: String,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_league() -> String {
    "nhl".into()
}

fn default_timezone() -> String {
    "America/New_York".into()
}

fn default_feed_url() -> String {
    "https://content.unabated.com/markets/game-odds/b_gameodds.json".into()
}

fn default_poll_ids_url() -> String {
    "https://dotd-ids.tomfconreal.workers.dev/".into()
}

fn default_poll_proxy_url() -> String {
    "https://dotd.tomfconreal.workers.dev/".into()
}

fn default_feed_timeout() -> u64 {
    8
}

fn default_poll_timeout() -> u64 {
    5
}

fn default_token_timeout() -> u64 {
    60
}

fn default_snapshot_path() -> String {
    "odds.json".into()
}

fn default_market_config_path() -> String {
    "market_config.json".into()
}

fn default_team_config_path() -> String {
    "team_config.json".into()
}

fn default_leagues() -> BTreeMap<String, LeagueConfig> {
    let mut leagues = BTreeMap::new();
    let spread = |id| LeagueConfig {
        id,
        bet_type: BetType::PointSpread,
    };
    leagues.insert("nfl".to_string(), spread(1));
    leagues.insert("cfb".to_string(), spread(2));
    leagues.insert("nba".to_string(), spread(3));
    leagues.insert("cbb".to_string(), spread(4));
    leagues.insert("mlb".to_string(), spread(5));
    leagues.insert(
        "nhl".to_string(),
        LeagueConfig {
            id: 6,
            bet_type: BetType::Moneyline,
        },
    );
    leagues.insert("wnba".to_string(), spread(7));
    leagues.insert("pga".to_string(), spread(8));
    leagues
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            poll_ids_url: default_poll_ids_url(),
            poll_proxy_url: default_poll_proxy_url(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            feed_timeout_secs: default_feed_timeout(),
            poll_timeout_secs: default_poll_timeout(),
            token_timeout_secs: default_token_timeout(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            league: default_league(),
            leagues: default_leagues(),
            timezone: default_timezone(),
            endpoints: EndpointConfig::default(),
            timing: TimingConfig::default(),
            snapshot_path: default_snapshot_path(),
            market_config_path: default_market_config_path(),
            team_config_path: default_team_config_path(),
        }
    }
}

impl AppConfig {
    /// Look up the active league's feed parameters.
    pub fn active_league(&self) -> Option<&LeagueConfig> {
        self.leagues.get(&self.league)
    }
}
