//! dotd-bot: daily underdog-poll EV ranker.
//!
//! Single-pass batch binary that:
//! 1. Resolves the odds feed session token
//! 2. Fetches the pregame odds feed and rebuilds reference directories
//! 3. Normalizes today's events and strips the vig per book pair
//! 4. Fetches and ranks the underdog poll
//! 5. Scores every entry's payout × fair probability and prints the report
//!
//! One invocation is one refresh cycle. Any transport failure exits
//! non-zero before anything is written, so artifacts from the previous
//! cycle stay intact on disk.

mod config;

use std::path::Path;

use chrono::Utc;
use chrono_tz::Tz;
use clap::Parser;
use tracing::{error, info, warn};

use common::{EvReport, MarketDirectory, TeamDirectory};
use poll_client::PollClient;
use strategy::{build_report, compute_fair_probabilities, ManualOverrides};
use unabated_client::{
    normalize::normalize_events, snapshot, EnvToken, StaticToken, TokenProvider, UnabatedClient,
};

const TOKEN_ENV_VAR: &str = "UNABATED_TOKEN";

/// Daily underdog-poll EV ranker
#[derive(Parser)]
#[command(name = "dotd-bot", about = "Daily underdog-poll EV ranker")]
struct Cli {
    /// League key to evaluate (defaults to the configured league).
    #[arg(long)]
    league: Option<String>,

    /// Feed session token; falls back to the UNABATED_TOKEN env var.
    #[arg(long)]
    token: Option<String>,

    /// Fetch the feed, print directory counts, then exit.
    #[arg(long)]
    check_feed: bool,

    /// Skip writing the odds snapshot artifact.
    #[arg(long)]
    no_snapshot: bool,

    /// Manual fair-odds override as TEAM_ID:TEAM_ODDS:OPPONENT_ODDS.
    /// Repeatable; beats computed probabilities for this run.
    #[arg(long = "manual", value_name = "ENTRY")]
    manual: Vec<String>,
}

fn parse_manual_arg(raw: &str) -> Option<(i64, i32, i32)> {
    let mut parts = raw.split(':');
    let team_id = parts.next()?.trim().parse().ok()?;
    let team_odds = parts.next()?.trim().parse().ok()?;
    let opponent_odds = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((team_id, team_odds, opponent_odds))
}

fn build_overrides(args: &[String]) -> Result<ManualOverrides, String> {
    let mut overrides = ManualOverrides::new();
    for arg in args {
        let Some((team_id, team_odds, opponent_odds)) = parse_manual_arg(arg) else {
            return Err(format!(
                "--manual {:?} is not TEAM_ID:TEAM_ODDS:OPPONENT_ODDS",
                arg
            ));
        };
        let prob = overrides
            .set_from_odds(team_id, team_odds, opponent_odds)
            .map_err(|e| format!("--manual {:?}: {}", arg, e))?;
        info!(
            "Manual override: team {} → fair prob {:.4} (from {}/{})",
            team_id, prob, team_odds, opponent_odds
        );
    }
    Ok(overrides)
}

fn persist_json<T: serde::Serialize>(path: &str, value: &T) {
    // Directory persistence is best-effort; a failed write never aborts
    // the cycle.
    match serde_json::to_string_pretty(value) {
        Ok(body) => {
            if let Err(e) = std::fs::write(path, body) {
                warn!("Failed to write {}: {}", path, e);
            }
        }
        Err(e) => warn!("Failed to serialize {}: {}", path, e),
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &str) -> Option<T> {
    let body = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&body).ok()
}

fn print_report(report: &EvReport) {
    info!("Total poll votes: {}", report.total_votes);
    info!(
        "{:<22} {:>4} {:>9} {:>8} {:>9} {:>8}",
        "Team", "Rank", "RealOdds", "Payout", "FairProb", "EV"
    );
    for row in &report.valid {
        info!(
            "{:<22} {:>4} {:>9} {:>8.2} {:>9.4} {:>8.2}",
            row.team,
            row.rank,
            row.real_odds,
            row.payout,
            row.fair_prob.unwrap_or(0.0),
            row.expected_value
        );
    }
    if !report.missing.is_empty() {
        warn!(
            "{} entries missing market odds (use --manual TEAM_ID:TEAM_ODDS:OPPONENT_ODDS):",
            report.missing.len()
        );
        for row in &report.missing {
            warn!(
                "  {:<22} rank={} odds={} (team id {})",
                row.team, row.rank, row.real_odds, row.team_id
            );
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "dotd_bot=info,unabated_client=info,poll_client=info,strategy=info".into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    // Load configuration.
    let mut cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(league) = cli.league {
        cfg.league = league.trim().to_ascii_lowercase();
    }
    let Some(league_cfg) = cfg.active_league().cloned() else {
        error!(
            "Unknown league {:?} (known: {})",
            cfg.league,
            cfg.leagues.keys().cloned().collect::<Vec<_>>().join(", ")
        );
        std::process::exit(1);
    };
    let tz: Tz = match cfg.timezone.parse() {
        Ok(tz) => tz,
        Err(_) => {
            error!("Invalid timezone {:?}", cfg.timezone);
            std::process::exit(1);
        }
    };

    info!(
        "League: {} (id={}, bet type {})",
        cfg.league,
        league_cfg.id,
        league_cfg.bet_type.tag()
    );

    // Manual overrides parse before any network work.
    let overrides = match build_overrides(&cli.manual) {
        Ok(o) => o,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    // Resolve the session token.
    let token = {
        let result = match &cli.token {
            Some(t) => StaticToken(t.clone()).resolve(),
            None => EnvToken(TOKEN_ENV_VAR.into()).resolve(),
        };
        match result {
            Ok(t) => t,
            Err(e) => {
                error!("{} (pass --token or set {})", e, TOKEN_ENV_VAR);
                std::process::exit(1);
            }
        }
    };

    // ── Fetch + reference directories ────────────────────────────────
    let odds_client = UnabatedClient::new(&cfg.endpoints.feed_url, cfg.timing.feed_timeout_secs);
    let feed = match odds_client.fetch_game_odds(&token).await {
        Ok(f) => f,
        Err(e) => {
            error!("Odds feed fetch failed: {}", e);
            std::process::exit(1);
        }
    };

    // Directories are rebuilt wholesale from the feed each cycle; the
    // persisted copies only fill in when the feed omits a section.
    let mut markets = unabated_client::market_directory(&feed);
    let mut teams = unabated_client::team_directory(&feed);
    if markets.is_empty() {
        if let Some(cached) = load_json::<MarketDirectory>(&cfg.market_config_path) {
            warn!("Feed had no market sources; using {}", cfg.market_config_path);
            markets = cached;
        }
    } else {
        persist_json(&cfg.market_config_path, &markets);
    }
    if teams.is_empty() {
        if let Some(cached) = load_json::<TeamDirectory>(&cfg.team_config_path) {
            warn!("Feed had no teams; using {}", cfg.team_config_path);
            teams = cached;
        }
    } else {
        persist_json(&cfg.team_config_path, &teams);
    }
    info!(
        "Reference directories: {} books, {} teams",
        markets.len(),
        teams.len()
    );

    if cli.check_feed {
        info!(
            "Feed OK: {} league sections",
            feed.game_odds_events.len()
        );
        return;
    }

    // ── Normalize + fair probabilities ───────────────────────────────
    let now = Utc::now();
    let today = now.with_timezone(&tz).date_naive();
    let events = normalize_events(&feed, &league_cfg, today, tz);
    info!("Today's events ({}): {}", today, events.len());

    let fair = compute_fair_probabilities(&events, &markets);
    info!("Fair probabilities for {} teams", fair.len());

    // ── Poll ─────────────────────────────────────────────────────────
    let poll_client = PollClient::new(
        &cfg.endpoints.poll_ids_url,
        &cfg.endpoints.poll_proxy_url,
        cfg.timing.poll_timeout_secs,
    );
    let poll_feed = match poll_client.fetch_poll(&cfg.league).await {
        Ok(p) => p,
        Err(e) => {
            error!("Poll fetch failed: {}", e);
            std::process::exit(1);
        }
    };
    let poll = poll_client::process_poll(&poll_feed, &teams, league_cfg.id);
    info!("Poll entries: {}", poll.entries.len());

    // ── Report ───────────────────────────────────────────────────────
    let report = build_report(&poll, &fair, &overrides);
    print_report(&report);

    // ── Snapshot artifact ────────────────────────────────────────────
    if !cli.no_snapshot {
        let snap = snapshot::snapshot_value(&cfg.league, &events, &markets, now);
        match snapshot::write_snapshot(Path::new(&cfg.snapshot_path), &snap) {
            Ok(()) => info!("Snapshot written to {}", cfg.snapshot_path),
            Err(e) => {
                error!("Snapshot write failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}
