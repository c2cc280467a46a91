//! Keyed record list upsert
//!
//! Alongside the pages, the site keeps one JSON array with an entry per
//! published item. Republishing an identifier must replace its entry in
//! place, never append a duplicate. Entries are matched the way the list
//! is actually keyed: an `attributes` element with `trait_type == "ID"`,
//! or a `name` ending in `#<id>`.

use galleria_splice::Identifier;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record list is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("record list is not a JSON array")]
    NotAnArray,
}

/// Replace the entry for `id` in a JSON-array record list, or append it
/// when absent. Returns the list serialized the way the site publishes
/// it (pretty, 2-space indent).
pub fn upsert_record(list_json: &str, id: &Identifier, entry: Value) -> Result<String, RecordError> {
    let mut list: Value = serde_json::from_str(list_json)?;
    let items = list.as_array_mut().ok_or(RecordError::NotAnArray)?;

    match items.iter().position(|item| matches_identifier(item, id)) {
        Some(index) => items[index] = entry,
        None => items.push(entry),
    }

    Ok(serde_json::to_string_pretty(&list)?)
}

fn matches_identifier(item: &Value, id: &Identifier) -> bool {
    let by_attribute = item
        .get("attributes")
        .and_then(Value::as_array)
        .map(|attrs| {
            attrs.iter().any(|attr| {
                attr.get("trait_type").and_then(Value::as_str) == Some("ID")
                    && attr.get("value").and_then(Value::as_str) == Some(id.as_str())
            })
        })
        .unwrap_or(false);

    by_attribute
        || item
            .get("name")
            .and_then(Value::as_str)
            .map(|name| name.ends_with(&format!("#{id}")))
            .unwrap_or(false)
}
