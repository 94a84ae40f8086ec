//! Browser tests for the JS-facing API. Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use flc_wasm::relay::{merge_mining_coins_map, merge_mining_timeout_ms, parse_merge_mining_tags};
use flc_wasm::validation::{get_base58_address_error, get_flc_address_error};
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn options(pairs: &[(&str, JsValue)]) -> JsValue {
    let object = Object::new();
    for (key, value) in pairs {
        Reflect::set(&object, &JsValue::from_str(key), value).unwrap();
    }
    object.into()
}

fn get(value: &JsValue, key: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn flc_address_defaults_allow_empty() {
    assert_eq!(get_flc_address_error(JsValue::UNDEFINED, JsValue::UNDEFINED), "");
    assert_eq!(get_flc_address_error(JsValue::from_str("   "), JsValue::UNDEFINED), "");
}

#[wasm_bindgen_test]
fn flc_address_required() {
    let strict = options(&[("allowEmpty", JsValue::FALSE)]);
    assert_eq!(
        get_flc_address_error(JsValue::NULL, strict),
        "Enter your Flokicoin wallet address."
    );
}

#[wasm_bindgen_test]
fn flc_address_messages() {
    let valid = JsValue::from_str("fc1qw508d6qejxtdg4y5r3zarvary0c5xw7kkrmtt5");
    assert_eq!(get_flc_address_error(valid, JsValue::UNDEFINED), "");

    let legacy = JsValue::from_str("FGWP1xKhDP5RmV525TmUoEwX9mTZwp3sJn");
    assert_eq!(
        get_flc_address_error(legacy, JsValue::UNDEFINED),
        "Legacy Flokicoin addresses (starting with F or 3) are not supported."
    );

    let number = JsValue::from_f64(42.0);
    assert_eq!(
        get_flc_address_error(number, JsValue::UNDEFINED),
        "Enter a valid Flokicoin address."
    );
}

#[wasm_bindgen_test]
fn base58_label_option() {
    let opts = options(&[("label", JsValue::from_str("share key"))]);
    assert_eq!(
        get_base58_address_error(JsValue::from_str("nope"), opts),
        "Enter a valid share key."
    );
}

#[wasm_bindgen_test]
fn parse_tags_from_js_arrays() {
    let tags: Array = [
        Array::of2(&"a".into(), &"ignored".into()),
        Array::of3(&"doge".into(), &"D123...".into(), &"sig1".into()),
        Array::of2(&"unknown".into(), &"U1".into()),
    ]
    .into_iter()
    .collect();

    let parsed: Array = parse_merge_mining_tags(tags.into()).unwrap().into();
    assert_eq!(parsed.length(), 2);

    let doge = parsed.get(0);
    assert_eq!(get(&doge, "coinId"), "doge");
    assert_eq!(get(&doge, "icon"), "doge");
    assert_eq!(get(&doge, "signature"), "sig1");

    let unknown = parsed.get(1);
    assert_eq!(get(&unknown, "label"), "UNKNOWN");
    assert!(get(&unknown, "icon").is_undefined());
    assert_eq!(get(&unknown, "signature"), "");
}

#[wasm_bindgen_test]
fn parse_tags_rejects_non_arrays() {
    let parsed: Array = parse_merge_mining_tags(JsValue::from_str("doge")).unwrap().into();
    assert_eq!(parsed.length(), 0);
}

#[wasm_bindgen_test]
fn coins_map_and_constants() {
    let map = merge_mining_coins_map().unwrap();
    assert_eq!(get(&get(&map, "pep"), "label"), "PEP");
    assert_eq!(merge_mining_timeout_ms(), 6000);
}
