//! Client for merge-mining attestation events published on a relay.
//!
//! The relay speaks a small JSON publish/subscribe protocol over a
//! WebSocket. This module is runtime-agnostic: the socket and the timer are
//! supplied by the embedder through the [`Connector`] and [`Timer`] traits.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod message;
pub mod transport;

pub use client::Relay;
pub use config::{RelayConfig, MERGE_MINING_KIND, MERGE_MINING_RELAY_URL, MERGE_MINING_TIMEOUT};
pub use dispatch::{Dispatcher, SubscriptionItem};
pub use error::RelayError;
pub use event::{latest_event, Event, Filter};
pub use message::{ClientMessage, RelayMessage};
pub use transport::{Connection, Connector, Timer};
