//! Form-field validation messages for user-entered addresses.
//!
//! Both checks are total: every input maps to either an empty string (valid)
//! or one of a small set of human-readable messages. Decoding failures never
//! escape to the caller.

use serde::Deserialize;

use crate::address::{base58check_decode, classify_address, AddressClass};
use crate::network::Network;

/// Message shown when a required address field is left blank.
pub const REQUIRED_MESSAGE: &str = "Enter your Flokicoin wallet address.";
/// Message for a SegWit address with a foreign prefix.
pub const WRONG_NETWORK_MESSAGE: &str = "Use a mainnet Flokicoin address (fc...).";
/// Message for legacy P2PKH/P2SH addresses.
pub const LEGACY_MESSAGE: &str = "Legacy Flokicoin addresses (starting with F or 3) are not supported.";
/// Message for anything that is not an address at all.
pub const INVALID_MESSAGE: &str = "Enter a valid Flokicoin address.";

/// Options for [`flc_address_error`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddressOptions {
    /// Treat blank input as valid.
    pub allow_empty: bool,
}

impl Default for AddressOptions {
    fn default() -> Self {
        AddressOptions { allow_empty: true }
    }
}

/// Options for [`base58_address_error`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Base58Options {
    /// Treat blank input as valid.
    pub allow_empty: bool,
    /// Noun used in the messages, e.g. "address" or "public key".
    pub label: String,
}

impl Default for Base58Options {
    fn default() -> Self {
        Base58Options {
            allow_empty: true,
            label: "address".to_string(),
        }
    }
}

/// Validate a Flokicoin mainnet SegWit address.
///
/// Returns an empty string when the input is acceptable.
pub fn flc_address_error(value: &str, options: &AddressOptions) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return if options.allow_empty {
            String::new()
        } else {
            REQUIRED_MESSAGE.to_string()
        };
    }

    match classify_address(trimmed, Network::Mainnet) {
        AddressClass::Segwit(_) => String::new(),
        AddressClass::WrongNetwork { .. } => WRONG_NETWORK_MESSAGE.to_string(),
        AddressClass::Legacy { .. } => LEGACY_MESSAGE.to_string(),
        AddressClass::Invalid => INVALID_MESSAGE.to_string(),
    }
}

/// Validate any Base58Check-encoded string.
pub fn base58_address_error(value: &str, options: &Base58Options) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return if options.allow_empty {
            String::new()
        } else {
            format!("Enter a {}.", options.label)
        };
    }

    match base58check_decode(trimmed) {
        Ok(_) => String::new(),
        Err(_) => format!("Enter a valid {}.", options.label),
    }
}
