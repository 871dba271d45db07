//! Odds snapshot artifact.
//!
//! The presentation layer reads a JSON file mapping league key → event
//! id → event record, where each record carries the two sides keyed by
//! their team ids. Written whole on every successful cycle.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use common::{Event, MarketDirectory, Result};
use serde_json::{json, Map, Value};

fn side_value(
    books: &BTreeMap<i64, common::BookPrice>,
    markets: &MarketDirectory,
) -> Value {
    let mut side = Map::new();
    for (book_id, price) in books {
        let market_name = markets
            .get(book_id)
            .cloned()
            .unwrap_or_else(|| format!("Book {}", book_id));
        side.insert(
            book_id.to_string(),
            json!({
                "odds": price.american_odds,
                "timestamp": price
                    .last_modified
                    .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
                "market_name": market_name,
                "line": price.line,
            }),
        );
    }
    Value::Object(side)
}

/// Build the snapshot for one league's events.
pub fn snapshot_value(
    league: &str,
    events: &BTreeMap<i64, Event>,
    markets: &MarketDirectory,
    generated_at: DateTime<Utc>,
) -> Value {
    let mut league_map = Map::new();
    for (event_id, event) in events {
        let mut record = Map::new();
        record.insert(
            "start_time".into(),
            json!(event
                .start_time_utc
                .to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        record.insert("name".into(), json!(event.name));
        record.insert(
            "timestamp".into(),
            json!(generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        for side in &event.sides {
            record.insert(
                side.team_id.to_string(),
                side_value(&side.books, markets),
            );
        }
        league_map.insert(event_id.to_string(), Value::Object(record));
    }

    json!({ league: league_map })
}

/// Write the snapshot to disk, pretty-printed.
pub fn write_snapshot(path: &Path, snapshot: &Value) -> Result<()> {
    let body = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, body)?;
    Ok(())
}
