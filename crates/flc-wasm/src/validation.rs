//! Address validators for form fields.

use flc_core::{base58_address_error, flc_address_error, AddressOptions, Base58Options};
use wasm_bindgen::prelude::*;

use crate::state::{js_to_string, options_from_js};

/// Validate a Flokicoin mainnet address.
///
/// Returns an empty string for valid input, otherwise a message suitable
/// for display next to the field. `options` may set `allowEmpty`.
#[wasm_bindgen(js_name = getFlcAddressError)]
pub fn get_flc_address_error(value: JsValue, options: JsValue) -> String {
    let options: AddressOptions = options_from_js(&options);
    flc_address_error(&js_to_string(&value), &options)
}

/// Validate any Base58Check string. `options` may set `allowEmpty` and `label`.
#[wasm_bindgen(js_name = getBase58AddressError)]
pub fn get_base58_address_error(value: JsValue, options: JsValue) -> String {
    let options: Base58Options = options_from_js(&options);
    base58_address_error(&js_to_string(&value), &options)
}
