//! Seams between the relay client and its host environment.
//!
//! The browser binding implements these with `WebSocket` and `setTimeout`;
//! tests implement them with scripted fakes. Futures are `!Send` because the
//! host is single-threaded.

use std::time::Duration;

use futures::future::LocalBoxFuture;

use super::dispatch::Dispatcher;
use super::error::RelayError;

/// Opens connections to a relay.
pub trait Connector {
    type Conn: Connection + 'static;

    /// Whether this environment can open sockets at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Open a connection. Every inbound text frame must be handed to
    /// `dispatcher`. Resolves once the socket is open.
    fn connect(
        &self,
        url: &str,
        dispatcher: Dispatcher,
    ) -> LocalBoxFuture<'static, Result<Self::Conn, RelayError>>;
}

/// An established relay connection.
pub trait Connection {
    fn is_open(&self) -> bool;

    /// Queue a text frame for sending.
    fn send_text(&self, text: &str) -> Result<(), RelayError>;

    fn close(&self);
}

/// One-shot timers.
pub trait Timer {
    /// Resolve after `duration`. Dropping the future cancels the timer.
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}
