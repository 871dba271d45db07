//! Feed → domain-event normalization.
//!
//! Selects the active league's event list, keeps only events whose start
//! date (in the reference timezone) matches "today", and flattens each
//! book's line for the league's bet type onto the matching side. Every
//! event is date-filtered individually — the feed is usually
//! chronological, but that ordering is not relied on.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use common::config::LeagueConfig;
use common::{BookPrice, Event, SideOdds};
use tracing::{debug, warn};

use crate::{FeedEvent, FeedLine, GameOddsFeed};

/// Feed key for a league's pregame section.
pub fn league_key(league_id: u32) -> String {
    format!("lg{}:pt1:pregame", league_id)
}

/// Parse a feed timestamp: RFC 3339, or a naive ISO timestamp assumed UTC.
fn parse_feed_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Normalize one league's feed into today's events, keyed by event id.
///
/// `today` is the caller's calendar date in `tz`; passing it in keeps
/// this a pure function. Events or books that fail extraction are
/// skipped, never aborting the whole normalization.
pub fn normalize_events(
    feed: &GameOddsFeed,
    league: &LeagueConfig,
    today: NaiveDate,
    tz: Tz,
) -> BTreeMap<i64, Event> {
    let key = league_key(league.id);
    let Some(raw_events) = feed.game_odds_events.get(&key) else {
        warn!("No feed section for league key {}", key);
        return BTreeMap::new();
    };

    let bet_tag = league.bet_type.tag();
    let mut events = BTreeMap::new();

    for raw in raw_events {
        let parsed: FeedEvent = match serde_json::from_value(raw.clone()) {
            Ok(ev) => ev,
            Err(e) => {
                warn!("Skipping malformed event record: {}", e);
                continue;
            }
        };

        let Some(start_utc) = parse_feed_timestamp(&parsed.event_start) else {
            warn!(
                "Skipping event {}: unparseable start {:?}",
                parsed.event_id, parsed.event_start
            );
            continue;
        };

        if start_utc.with_timezone(&tz).date_naive() != today {
            debug!("Skipping event {}: not today", parsed.event_id);
            continue;
        }

        let (Some(team0), Some(team1)) = (
            parsed.event_teams.get("0").map(|t| t.id),
            parsed.event_teams.get("1").map(|t| t.id),
        ) else {
            warn!("Skipping event {}: missing team refs", parsed.event_id);
            continue;
        };

        let mut sides = [
            SideOdds {
                team_id: team0,
                books: BTreeMap::new(),
            },
            SideOdds {
                team_id: team1,
                books: BTreeMap::new(),
            },
        ];

        for (source_key, bet_types) in &parsed.game_odds_market_sources_lines {
            let side = match source_key.get(..3) {
                Some("si0") => 0usize,
                Some("si1") => 1usize,
                _ => continue,
            };
            // Books without the league's bet type are skipped; partial
            // coverage per book is acceptable.
            let Some(raw_line) = bet_types.get(bet_tag) else {
                continue;
            };
            let line: FeedLine = match serde_json::from_value(raw_line.clone()) {
                Ok(l) => l,
                Err(e) => {
                    warn!(
                        "Skipping book line on event {}: {}",
                        parsed.event_id, e
                    );
                    continue;
                }
            };
            sides[side].books.insert(
                line.market_source_id,
                BookPrice {
                    american_odds: line.american_price,
                    line: if league.bet_type.has_line() {
                        line.points
                    } else {
                        None
                    },
                    last_modified: line
                        .modified_on
                        .as_deref()
                        .and_then(parse_feed_timestamp),
                },
            );
        }

        events.insert(
            parsed.event_id,
            Event {
                id: parsed.event_id,
                name: parsed.name,
                start_time_utc: start_utc,
                sides,
            },
        );
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::BetType;
    use serde_json::json;

    const EASTERN: &str = "America/New_York";

    fn tz() -> Tz {
        EASTERN.parse().unwrap()
    }

    fn nhl() -> LeagueConfig {
        LeagueConfig {
            id: 6,
            bet_type: BetType::Moneyline,
        }
    }

    fn nba() -> LeagueConfig {
        LeagueConfig {
            id: 3,
            bet_type: BetType::PointSpread,
        }
    }

    fn event_json(event_id: i64, start: &str, lines: serde_json::Value) -> serde_json::Value {
        json!({
            "eventId": event_id,
            "eventStart": start,
            "name": "Boston at Chicago",
            "eventTeams": { "0": { "id": 100 }, "1": { "id": 200 } },
            "gameOddsMarketSourcesLines": lines,
        })
    }

    fn feed_for(league_id: u32, events: Vec<serde_json::Value>) -> GameOddsFeed {
        serde_json::from_value(json!({
            "gameOddsEvents": { league_key(league_id): events }
        }))
        .unwrap()
    }

    #[test]
    fn test_league_key_format() {
        assert_eq!(league_key(6), "lg6:pt1:pregame");
    }

    #[test]
    fn test_date_filter_in_reference_timezone() {
        // 2026-01-10T01:30Z is still 2026-01-09 in New York.
        let feed = feed_for(
            6,
            vec![
                event_json(1, "2026-01-10T01:30:00", json!({})),
                event_json(2, "2026-01-10T18:00:00", json!({})),
            ],
        );
        let today = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();
        let events = normalize_events(&feed, &nhl(), today, tz());
        assert_eq!(events.len(), 1);
        assert!(events.contains_key(&1));
    }

    #[test]
    fn test_all_events_filtered_not_just_prefix() {
        // A same-day event *after* an off-day event must still be kept.
        let feed = feed_for(
            6,
            vec![
                event_json(1, "2026-01-11T18:00:00", json!({})),
                event_json(2, "2026-01-09T23:00:00", json!({})),
            ],
        );
        let today = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();
        let events = normalize_events(&feed, &nhl(), today, tz());
        assert_eq!(events.len(), 1);
        assert!(events.contains_key(&2));
    }

    #[test]
    fn test_bet_type_selection_and_sides() {
        let lines = json!({
            "si0:ml": { "bt1": { "marketSourceId": 7, "americanPrice": -120,
                                  "modifiedOn": "2026-01-09T12:00:00" } },
            "si1:ml": { "bt1": { "marketSourceId": 7, "americanPrice": 100 } },
            // bt2 must be ignored for a moneyline league.
            "si0:sp": { "bt2": { "marketSourceId": 8, "americanPrice": -110,
                                  "points": -1.5 } },
        });
        let feed = feed_for(6, vec![event_json(1, "2026-01-09T23:00:00", lines)]);
        let today = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();

        let events = normalize_events(&feed, &nhl(), today, tz());
        let event = &events[&1];
        assert_eq!(event.sides[0].team_id, 100);
        assert_eq!(event.sides[1].team_id, 200);
        assert_eq!(event.sides[0].books[&7].american_odds, -120);
        assert_eq!(event.sides[1].books[&7].american_odds, 100);
        assert!(event.sides[0].books[&7].last_modified.is_some());
        // The bt2-only book contributed nothing.
        assert!(!event.sides[0].books.contains_key(&8));
    }

    #[test]
    fn test_spread_league_keeps_line() {
        let lines = json!({
            "si0:sp": { "bt2": { "marketSourceId": 8, "americanPrice": -112,
                                  "points": -3.5 } },
            "si1:sp": { "bt2": { "marketSourceId": 8, "americanPrice": -108,
                                  "points": 3.5 } },
        });
        let feed = feed_for(3, vec![event_json(1, "2026-01-09T23:00:00", lines)]);
        let today = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();

        let events = normalize_events(&feed, &nba(), today, tz());
        assert_eq!(events[&1].sides[0].books[&8].line, Some(-3.5));
        assert_eq!(events[&1].sides[1].books[&8].line, Some(3.5));
    }

    #[test]
    fn test_malformed_event_skipped() {
        let feed = feed_for(
            6,
            vec![
                json!({ "eventId": "not a number" }),
                event_json(2, "2026-01-09T23:00:00", json!({})),
            ],
        );
        let today = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();
        let events = normalize_events(&feed, &nhl(), today, tz());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_missing_league_section() {
        let feed = feed_for(3, vec![]);
        let today = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();
        assert!(normalize_events(&feed, &nhl(), today, tz()).is_empty());
    }

    #[test]
    fn test_rfc3339_timestamps_accepted() {
        let feed = feed_for(
            6,
            vec![event_json(1, "2026-01-09T23:00:00Z", json!({}))],
        );
        let today = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();
        assert_eq!(normalize_events(&feed, &nhl(), today, tz()).len(), 1);
    }
}
