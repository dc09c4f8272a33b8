//! Mapping from the vendor's market index JSON to [`NewStore`] records.
//!
//! The feed is loosely typed: identifiers and coordinates show up as numbers
//! in some nodes and as strings in others, so every field is read through
//! the tolerant helpers below rather than a strict serde model.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::Value;

use storegeo_core::{Coordinate, NewStore, OpeningHours};

use crate::error::ScraperError;

const NODES_POINTER: &str = "/result/data/markets/nodes";
const NODES_PATH: &str = "result.data.markets.nodes";

/// Feed status for superseded or closed entries.
const EXCLUDED_STATUS: &str = "4";

/// Parse the market index document into store records.
///
/// Nodes without a usable `marketId` or `name` are skipped with a warning,
/// nodes with status `"4"` are dropped, and when a `marketId` appears more
/// than once the last occurrence wins (keeping the first one's position).
///
/// # Errors
///
/// Returns [`ScraperError::UnexpectedShape`] when the document has no node
/// array at `result.data.markets.nodes`.
pub fn parse_market_index(document: &Value) -> Result<Vec<NewStore>, ScraperError> {
    let nodes = document
        .pointer(NODES_POINTER)
        .and_then(Value::as_array)
        .ok_or(ScraperError::UnexpectedShape { path: NODES_PATH })?;

    tracing::info!(nodes = nodes.len(), "market index nodes found");

    let mut stores: Vec<NewStore> = Vec::with_capacity(nodes.len());
    let mut positions: HashMap<i64, usize> = HashMap::new();
    let mut excluded = 0usize;

    for node in nodes {
        let Some(store) = parse_node(node) else {
            continue;
        };
        if store.status.as_deref() == Some(EXCLUDED_STATUS) {
            excluded += 1;
            continue;
        }
        if let Some(&idx) = positions.get(&store.market_id) {
            tracing::debug!(market_id = store.market_id, "duplicate market id in feed");
            stores[idx] = store;
        } else {
            positions.insert(store.market_id, stores.len());
            stores.push(store);
        }
    }

    tracing::info!(stores = stores.len(), excluded, "market index parsed");
    Ok(stores)
}

fn parse_node(node: &Value) -> Option<NewStore> {
    let Some(market_id) = node.get("marketId").and_then(as_i64_lenient) else {
        tracing::warn!(market_id = ?node.get("marketId"), "skipping store with invalid marketId");
        return None;
    };
    let Some(name) = string_field(node, "name") else {
        tracing::warn!(market_id, "skipping store without a name");
        return None;
    };

    let address = node.get("address").unwrap_or(&Value::Null);
    let contact = node.get("contact").unwrap_or(&Value::Null);

    let coordinate = Coordinate::from_feed(
        address.get("lat").and_then(as_f64_lenient),
        address.get("lon").and_then(as_f64_lenient),
    );
    if coordinate.is_none() {
        tracing::debug!(market_id, "store has no usable feed coordinate");
    }

    Some(NewStore {
        market_id,
        name,
        street: string_field(address, "street"),
        zip: string_field(address, "zip"),
        city: string_field(address, "city"),
        coordinate,
        phone: string_field(contact, "phone"),
        email: string_field(contact, "email"),
        country_code: string_field(node, "countryCode"),
        status: string_field(node, "status"),
        opening_day: string_field(node, "openingDay").and_then(|s| parse_opening_day(&s)),
        is_loyalty_market: node.get("isLoyaltyMarket").and_then(as_bool_lenient),
        google_maps_link: string_field(address, "googleProfileLink"),
        opening_hours: parse_opening_hours(node.get("openingHoursMarket")),
    })
}

fn parse_opening_hours(value: Option<&Value>) -> Vec<OpeningHours> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            Some(OpeningHours {
                weekday: string_field(entry, "weekday")?,
                open_from: string_field(entry, "open_from"),
                open_until: string_field(entry, "open_until"),
            })
        })
        .collect()
}

/// Accepts `YYYY-MM-DD` as well as full ISO timestamps.
fn parse_opening_day(raw: &str) -> Option<NaiveDate> {
    let date = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Non-empty trimmed string; numbers are rendered as text.
fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_i64_lenient(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64_lenient(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool_lenient(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
