//! Browser side of the merge-mining relay client.
//!
//! Supplies a `WebSocket` connector and a `setTimeout` timer to the core
//! client, and owns the page-wide relay instance.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Duration;

use flc_core::relay::{
    Connection, Connector, Dispatcher, Timer, MERGE_MINING_KIND, MERGE_MINING_RELAY_URL,
    MERGE_MINING_TIMEOUT,
};
use flc_core::tags::{coins_by_id, parse_merge_mining_tags as parse_tags, MERGE_MINING_COINS};
use flc_core::{Relay, RelayConfig, RelayError};
use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use crate::state::{json_from_js, to_js};

type BrowserRelay = Relay<BrowserConnector, BrowserTimer>;

thread_local! {
    static RELAY: Rc<BrowserRelay> =
        Rc::new(Relay::new(BrowserConnector, BrowserTimer, RelayConfig::default()));
}

fn relay() -> Rc<BrowserRelay> {
    RELAY.with(Rc::clone)
}

/// Opens relay connections with the browser `WebSocket` API.
pub struct BrowserConnector;

impl Connector for BrowserConnector {
    type Conn = BrowserSocket;

    fn is_available(&self) -> bool {
        web_sys::window().is_some()
            && js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str("WebSocket"))
                .unwrap_or(false)
    }

    fn connect(
        &self,
        url: &str,
        dispatcher: Dispatcher,
    ) -> LocalBoxFuture<'static, Result<BrowserSocket, RelayError>> {
        let url = url.to_string();
        async move { BrowserSocket::open(&url, dispatcher).await }.boxed_local()
    }
}

/// An open browser WebSocket plus the JS callbacks attached to it.
pub struct BrowserSocket {
    ws: WebSocket,
    _on_settle: [Closure<dyn FnMut(Event)>; 3],
    _on_message: Closure<dyn FnMut(MessageEvent)>,
}

impl BrowserSocket {
    async fn open(url: &str, dispatcher: Dispatcher) -> Result<Self, RelayError> {
        let ws = WebSocket::new(url).map_err(|e| RelayError::Connection(describe(&e)))?;

        let (tx, rx) = oneshot::channel::<Result<(), String>>();
        let settle = Rc::new(RefCell::new(Some(tx)));
        let settler = |outcome: fn(&Event) -> Result<(), String>| {
            let settle = Rc::clone(&settle);
            Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                if let Some(tx) = settle.borrow_mut().take() {
                    let _ = tx.send(outcome(&event));
                }
            })
        };

        let on_open = settler(|_| Ok(()));
        let on_error = settler(|_| Err("WebSocket error".to_string()));
        let on_close = settler(|event| {
            let code = event.dyn_ref::<CloseEvent>().map(CloseEvent::code).unwrap_or_default();
            Err(format!("closed before opening (code {code})"))
        });
        let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            if let Some(text) = event.data().as_string() {
                dispatcher.dispatch(&text);
            }
        });

        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        let socket = BrowserSocket {
            ws,
            _on_settle: [on_open, on_error, on_close],
            _on_message: on_message,
        };

        match rx.await {
            Ok(Ok(())) => Ok(socket),
            Ok(Err(reason)) => Err(RelayError::Connection(reason)),
            Err(_) => Err(RelayError::Connection("connection attempt abandoned".into())),
        }
    }
}

impl Connection for BrowserSocket {
    fn is_open(&self) -> bool {
        self.ws.ready_state() == WebSocket::OPEN
    }

    fn send_text(&self, text: &str) -> Result<(), RelayError> {
        self.ws
            .send_with_str(text)
            .map_err(|e| RelayError::Connection(describe(&e)))
    }

    fn close(&self) {
        let _ = self.ws.close();
    }
}

impl Drop for BrowserSocket {
    fn drop(&mut self) {
        // Detach first: the callbacks are freed with `self`
        self.ws.set_onopen(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
        self.ws.set_onmessage(None);
        if matches!(self.ws.ready_state(), WebSocket::CONNECTING | WebSocket::OPEN) {
            let _ = self.ws.close();
        }
    }
}

/// Timers backed by `window.setTimeout`.
pub struct BrowserTimer;

impl Timer for BrowserTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        match Timeout::start(duration) {
            Ok(timeout) => timeout.boxed_local(),
            Err(e) => {
                web_sys::console::warn_1(&JsValue::from_str(&format!(
                    "setTimeout unavailable: {}",
                    describe(&e)
                )));
                future::ready(()).boxed_local()
            }
        }
    }
}

/// A pending `setTimeout`, cleared when dropped.
struct Timeout {
    handle: i32,
    fired: oneshot::Receiver<()>,
    _callback: Closure<dyn FnMut()>,
}

impl Timeout {
    fn start(duration: Duration) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;

        let (tx, rx) = oneshot::channel();
        let mut tx = Some(tx);
        let callback = Closure::<dyn FnMut()>::new(move || {
            if let Some(tx) = tx.take() {
                let _ = tx.send(());
            }
        });

        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let handle = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            millis,
        )?;

        Ok(Timeout {
            handle,
            fired: rx,
            _callback: callback,
        })
    }
}

impl Future for Timeout {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.fired.poll_unpin(cx).map(|_| ())
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(self.handle);
        }
    }
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn to_js_error(error: RelayError) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&error.to_string()));
    js_sys::Error::new(&error.to_string()).into()
}

/// Open the shared relay connection, or wait for the one being opened.
#[wasm_bindgen(js_name = ensureMergeMiningRelay)]
pub async fn ensure_merge_mining_relay() -> Result<(), JsValue> {
    let relay = relay();
    relay.ensure_connection().await.map(|_| ()).map_err(to_js_error)
}

/// Fetch the newest merge-mining event for `address`, or `null`.
#[wasm_bindgen(js_name = fetchMergeMiningEvent)]
pub async fn fetch_merge_mining_event(address: String) -> Result<JsValue, JsValue> {
    let relay = relay();
    match relay.fetch_event(&address).await {
        Ok(Some(event)) => to_js(&event),
        Ok(None) => Ok(JsValue::NULL),
        Err(e) => Err(to_js_error(e)),
    }
}

/// Close the shared relay connection.
#[wasm_bindgen(js_name = closeMergeMiningRelay)]
pub fn close_merge_mining_relay() {
    relay().close_connection();
}

/// Decode the tag list of a merge-mining event.
#[wasm_bindgen(js_name = parseMergeMiningTags)]
pub fn parse_merge_mining_tags(tags: JsValue) -> Result<JsValue, JsValue> {
    to_js(&parse_tags(&json_from_js(&tags)))
}

/// The merge-mined coins in display order.
#[wasm_bindgen(js_name = mergeMiningCoins)]
pub fn merge_mining_coins() -> Result<JsValue, JsValue> {
    to_js(&MERGE_MINING_COINS)
}

/// The merge-mined coins keyed by id.
#[wasm_bindgen(js_name = mergeMiningCoinsMap)]
pub fn merge_mining_coins_map() -> Result<JsValue, JsValue> {
    to_js(&coins_by_id())
}

#[wasm_bindgen(js_name = mergeMiningRelayUrl)]
pub fn merge_mining_relay_url() -> String {
    MERGE_MINING_RELAY_URL.to_string()
}

#[wasm_bindgen(js_name = mergeMiningKind)]
pub fn merge_mining_kind() -> u32 {
    MERGE_MINING_KIND
}

#[wasm_bindgen(js_name = mergeMiningTimeoutMs)]
pub fn merge_mining_timeout_ms() -> u32 {
    MERGE_MINING_TIMEOUT.as_millis() as u32
}
