//! Relay event and subscription filter types.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::tags::{parse_merge_mining_tags, MiningTag, ADDRESS_TAG};

/// An event as delivered by the relay.
///
/// Relay data is untrusted, so every field falls back to a default when it is
/// missing, null or of the wrong type, and the tag list is kept as raw JSON
/// until it is decoded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pubkey: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: u64,
    #[serde(default, deserialize_with = "lenient_kind")]
    pub kind: u32,
    #[serde(default)]
    pub tags: Value,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sig: String,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

/// Whole seconds; fractional timestamps are floored, anything else is 0.
fn lenient_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(|secs| secs.floor() as u64)
        })
        .unwrap_or(0))
}

fn lenient_kind<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_u64()
        .and_then(|kind| u32::try_from(kind).ok())
        .unwrap_or(0))
}

impl Event {
    /// Decode the per-coin mining addresses carried in the tags.
    pub fn mining_tags(&self) -> Vec<MiningTag> {
        parse_merge_mining_tags(&self.tags)
    }
}

/// Subscription filter sent with a `REQ`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Filter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<u32>,
    /// Tag filters, serialized as `"#<name>": [values]`.
    #[serde(flatten)]
    pub tags: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: u32) -> Self {
        self.kinds.push(kind);
        self
    }

    pub fn tag(mut self, name: &str, value: impl Into<String>) -> Self {
        self.tags.entry(format!("#{name}")).or_default().push(value.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Filter for the merge-mining attestation of one address.
    pub fn merge_mining(kind: u32, address: &str, limit: u32) -> Self {
        Filter::new().kind(kind).tag(ADDRESS_TAG, address).limit(limit)
    }
}

/// Pick the newest event. On equal timestamps the earliest delivered wins.
pub fn latest_event(events: Vec<Event>) -> Option<Event> {
    events.into_iter().fold(None, |best, event| match best {
        Some(best) if event.created_at <= best.created_at => Some(best),
        _ => Some(event),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(id: &str, created_at: u64) -> Event {
        Event {
            id: id.into(),
            created_at,
            ..Event::default()
        }
    }

    #[test]
    fn test_merge_mining_filter_shape() {
        let filter = Filter::merge_mining(30001, "fc1qexample", 1);

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"kinds": [30001], "#a": ["fc1qexample"], "limit": 1})
        );
    }

    #[test]
    fn test_latest_event() {
        let picked = latest_event(vec![event("old", 100), event("new", 200), event("mid", 150)]);
        assert_eq!(picked.unwrap().id, "new");
    }

    #[test]
    fn test_latest_event_tie_keeps_first() {
        let picked = latest_event(vec![event("first", 200), event("second", 200)]);
        assert_eq!(picked.unwrap().id, "first");
    }

    #[test]
    fn test_latest_event_empty() {
        assert!(latest_event(Vec::new()).is_none());
    }

    #[test]
    fn test_event_tolerates_missing_fields() {
        let parsed: Event = serde_json::from_value(json!({"tags": [["doge", "D1"]]})).unwrap();

        assert_eq!(parsed.created_at, 0);
        assert_eq!(parsed.mining_tags().len(), 1);
    }

    #[test]
    fn test_event_tolerates_null_and_mistyped_fields() {
        let parsed: Event = serde_json::from_value(json!({
            "id": null,
            "pubkey": 7,
            "created_at": 1700000000.75,
            "kind": "30001",
            "tags": [["doge", "D1"]],
            "content": null,
            "sig": ["x"]
        }))
        .unwrap();

        assert_eq!(parsed.id, "");
        assert_eq!(parsed.pubkey, "");
        assert_eq!(parsed.created_at, 1_700_000_000);
        assert_eq!(parsed.kind, 0);
        assert_eq!(parsed.content, "");
        assert_eq!(parsed.sig, "");
        assert_eq!(parsed.mining_tags().len(), 1);
    }

    #[test]
    fn test_event_invalid_timestamps_default_to_zero() {
        for created_at in [json!(-5), json!(-1.5), json!("1700000000"), json!(null)] {
            let parsed: Event = serde_json::from_value(json!({ "created_at": created_at })).unwrap();
            assert_eq!(parsed.created_at, 0, "{created_at}");
        }
    }
}
