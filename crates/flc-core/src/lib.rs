//! Core logic for the Flokicoin site.
//!
//! This crate provides pure Rust implementations of:
//! - Flokicoin address decoding (SegWit, legacy Base58Check)
//! - Form-field validation messages for user-entered addresses
//! - A client for merge-mining attestation events published on a relay
//! - Decoding of per-coin mining addresses from event tags

pub mod address;
pub mod hash;
pub mod network;
pub mod relay;
pub mod tags;
pub mod validation;

pub use address::{classify_address, AddressClass, AddressError};
pub use network::Network;
pub use relay::{Event, Relay, RelayConfig, RelayError};
pub use tags::{parse_merge_mining_tags, Coin, MiningTag, MERGE_MINING_COINS};
pub use validation::{base58_address_error, flc_address_error, AddressOptions, Base58Options};
