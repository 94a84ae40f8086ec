//! Conversions between JavaScript values and core types.

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Convert to a plain JS value (objects, not `Map`s).
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {:?}", e)))
}

/// Read an optional options bag. Missing or malformed options fall back to
/// the defaults so validators stay total.
pub fn options_from_js<T: DeserializeOwned + Default>(value: &JsValue) -> T {
    if value.is_undefined() || value.is_null() {
        return T::default();
    }
    serde_wasm_bindgen::from_value(value.clone()).unwrap_or_default()
}

/// Read an arbitrary JS value as JSON. Values with no JSON form become `null`.
pub fn json_from_js(value: &JsValue) -> serde_json::Value {
    serde_wasm_bindgen::from_value(value.clone()).unwrap_or(serde_json::Value::Null)
}

/// String form of a form-field value; `null` and `undefined` read as empty.
pub fn js_to_string(value: &JsValue) -> String {
    if value.is_undefined() || value.is_null() {
        return String::new();
    }
    if let Some(s) = value.as_string() {
        return s;
    }
    String::from(js_sys::Object::from(value.clone()).to_string())
}
