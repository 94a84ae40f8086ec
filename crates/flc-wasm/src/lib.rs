//! WebAssembly bindings for the Flokicoin site.
//!
//! This crate provides JavaScript-accessible APIs for:
//! - Validating user-entered Flokicoin and Base58Check addresses
//! - Fetching merge-mining attestation events from the relay
//! - Decoding the per-coin mining addresses in those events

use wasm_bindgen::prelude::*;

pub mod relay;
pub mod state;
pub mod validation;

// Re-export main types for JS access
pub use relay::{BrowserConnector, BrowserSocket, BrowserTimer};

/// Initialize the WASM module with better panic messages.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
