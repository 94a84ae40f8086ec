//! Merge-mining coin registry and event tag decoding.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Tag key that references the Flokicoin address itself rather than a coin.
pub const ADDRESS_TAG: &str = "a";

/// Display metadata for a merge-mined coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coin {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

/// Coins that can be merge-mined alongside Flokicoin, in display order.
pub const MERGE_MINING_COINS: [Coin; 3] = [
    Coin { id: "doge", label: "DOGE", icon: "doge" },
    Coin { id: "bells", label: "BELLS", icon: "bells" },
    Coin { id: "pep", label: "PEP", icon: "pep" },
];

/// Look up a coin by id.
pub fn coin(id: &str) -> Option<&'static Coin> {
    MERGE_MINING_COINS.iter().find(|coin| coin.id == id)
}

/// The registry keyed by coin id.
pub fn coins_by_id() -> BTreeMap<&'static str, &'static Coin> {
    MERGE_MINING_COINS.iter().map(|coin| (coin.id, coin)).collect()
}

/// One per-coin mining address declared in a merge-mining event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningTag {
    pub coin_id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub address: String,
    pub signature: String,
}

/// Decode the tag list of a merge-mining event.
///
/// The input is untrusted: anything that is not a list is treated as empty,
/// and individual malformed tags are skipped. Order is preserved and
/// duplicate coin ids are kept.
pub fn parse_merge_mining_tags(tags: &Value) -> Vec<MiningTag> {
    let Some(tags) = tags.as_array() else {
        return Vec::new();
    };

    let mut parsed = Vec::new();
    for tag in tags {
        let Some(fields) = tag.as_array() else {
            continue;
        };
        if fields.len() < 2 {
            continue;
        }

        let key = to_display_string(&fields[0]).to_lowercase();
        if key == ADDRESS_TAG {
            continue;
        }

        let address = &fields[1];
        if !is_truthy(address) {
            continue;
        }

        let (label, icon) = match coin(&key) {
            Some(coin) => (coin.label.to_string(), Some(coin.icon.to_string())),
            None => (key.to_uppercase(), None),
        };

        let signature = match fields.get(2) {
            None | Some(Value::Null) => String::new(),
            Some(value) => to_display_string(value),
        };

        parsed.push(MiningTag {
            coin_id: key,
            label,
            icon,
            address: to_display_string(address),
            signature,
        });
    }
    parsed
}

/// String form of a JSON value, with strings taken verbatim.
fn to_display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(to_display_string).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
