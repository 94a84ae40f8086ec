//! Relay endpoint and query parameters.

use std::time::Duration;

/// The single relay that hosts merge-mining attestations.
pub const MERGE_MINING_RELAY_URL: &str = "wss://sharenote.ohstr.com";

/// Event kind used for merge-mining attestations.
pub const MERGE_MINING_KIND: u32 = 30001;

/// Upper bound on a single event query.
pub const MERGE_MINING_TIMEOUT: Duration = Duration::from_millis(6000);

/// Connection and query settings for a [`Relay`](super::Relay).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// WebSocket URL of the relay.
    pub url: String,
    /// Event kind requested in every subscription.
    pub kind: u32,
    /// How long a query waits for the end-of-stored-events signal.
    pub timeout: Duration,
    /// Result limit sent with every subscription.
    pub limit: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            url: MERGE_MINING_RELAY_URL.to_string(),
            kind: MERGE_MINING_KIND,
            timeout: MERGE_MINING_TIMEOUT,
            limit: 1,
        }
    }
}
