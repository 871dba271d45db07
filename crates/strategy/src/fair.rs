//! American-odds math and the no-vig probability engine.
//!
//! A book's two moneyline prices imply probabilities that sum to more
//! than 1 (the overround). `pair_fair_prob` rescales them proportionally
//! so the pair sums to exactly 1, and per-event probabilities are the
//! arithmetic mean of all qualifying book pairs.

use std::collections::BTreeMap;

use common::{BookFair, Error, Event, FairProbability, MarketDirectory, Result};
use tracing::warn;

/// Both sides quoting exactly this price is a placeholder, not a quote.
const PLACEHOLDER_PRICE: i32 = -110;

/// Sentinel returned by [`prob_to_american`] for a certainty.
const CERTAINTY_SENTINEL: i32 = -10_000;

/// Convert signed American odds to an implied probability in (0,1).
pub fn american_to_prob(odds: i32) -> Result<f64> {
    if odds == 0 {
        return Err(Error::ZeroOdds);
    }
    let p = if odds > 0 {
        100.0 / (odds as f64 + 100.0)
    } else {
        let stake = odds.abs() as f64;
        stake / (stake + 100.0)
    };
    if p <= 0.0 || p >= 1.0 {
        return Err(Error::ProbabilityRange(p));
    }
    Ok(p)
}

/// Fair probability of the first side given both sides' quoted odds.
///
/// Proportional overround removal: the complementary call with swapped
/// arguments returns exactly `1 - p`.
pub fn pair_fair_prob(odds1: i32, odds2: i32) -> Result<f64> {
    let p1 = american_to_prob(odds1)?;
    let p2 = american_to_prob(odds2)?;
    Ok(p1 / (p1 + p2))
}

/// Inverse conversion, for display only. Truncates to an integer price;
/// degenerate probabilities map to 0 (≤0) or a large negative sentinel (≥1).
pub fn prob_to_american(prob: f64) -> i32 {
    if prob <= 0.0 {
        return 0;
    }
    if prob >= 1.0 {
        return CERTAINTY_SENTINEL;
    }
    if prob > 0.5 {
        (-(prob * 100.0) / (1.0 - prob)) as i32
    } else {
        ((1.0 - prob) * 100.0 / prob) as i32
    }
}

/// Compute both sides' fair probabilities for one event.
///
/// Only books quoting both sides count; a pair where both sides are
/// exactly -110 is discarded. Returns `None` when no book qualifies —
/// the event then contributes nothing and both teams surface as missing
/// downstream.
pub fn event_fair_probabilities(
    event: &Event,
    markets: &MarketDirectory,
) -> Option<(FairProbability, FairProbability)> {
    let [side_a, side_b] = &event.sides;

    let mut books: Vec<BookFair> = Vec::new();
    for (book_id, price_a) in &side_a.books {
        let Some(price_b) = side_b.books.get(book_id) else {
            continue;
        };
        let (o1, o2) = (price_a.american_odds, price_b.american_odds);
        if o1 == PLACEHOLDER_PRICE && o2 == PLACEHOLDER_PRICE {
            continue;
        }
        let fair = match pair_fair_prob(o1, o2) {
            Ok(p) => p,
            Err(e) => {
                warn!(
                    "Skipping book {} on event {}: {}",
                    book_id, event.id, e
                );
                continue;
            }
        };
        let book = markets
            .get(book_id)
            .cloned()
            .unwrap_or_else(|| format!("Book {}", book_id));
        books.push(BookFair {
            book,
            team_odds: o1,
            opponent_odds: o2,
            fair_prob: fair,
        });
    }

    if books.is_empty() {
        return None;
    }

    let mean = books.iter().map(|b| b.fair_prob).sum::<f64>() / books.len() as f64;

    // Side B mirrors side A with odds swapped and probabilities complemented.
    let mirrored: Vec<BookFair> = books
        .iter()
        .map(|b| BookFair {
            book: b.book.clone(),
            team_odds: b.opponent_odds,
            opponent_odds: b.team_odds,
            fair_prob: 1.0 - b.fair_prob,
        })
        .collect();

    Some((
        FairProbability {
            team_id: side_a.team_id,
            mean,
            books,
        },
        FairProbability {
            team_id: side_b.team_id,
            mean: 1.0 - mean,
            books: mirrored,
        },
    ))
}

/// Fair probabilities for every team across today's events, keyed by
/// team id. Events with no qualifying book pair are absent.
pub fn compute_fair_probabilities(
    events: &BTreeMap<i64, Event>,
    markets: &MarketDirectory,
) -> BTreeMap<i64, FairProbability> {
    let mut probs = BTreeMap::new();
    for event in events.values() {
        let Some((side_a, side_b)) = event_fair_probabilities(event, markets) else {
            continue;
        };
        probs.insert(side_a.team_id, side_a);
        probs.insert(side_b.team_id, side_b);
    }
    probs
}
