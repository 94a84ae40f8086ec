//! Merge-mining relay client.
//!
//! Holds at most one connection to the configured relay. Concurrent callers
//! that find no open connection coalesce onto a single in-flight attempt.
//! Each query runs its own subscription raced against a timer.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{LocalBoxFuture, Shared};
use futures::{pin_mut, select, FutureExt, StreamExt};
use tracing::{debug, warn};

use super::config::RelayConfig;
use super::dispatch::{Dispatcher, SubscriptionItem};
use super::error::RelayError;
use super::event::{latest_event, Event, Filter};
use super::message::ClientMessage;
use super::transport::{Connection, Connector, Timer};

type ConnectAttempt<S> = Shared<LocalBoxFuture<'static, Result<Rc<S>, RelayError>>>;

struct ConnectionState<S> {
    connection: Option<Rc<S>>,
    pending: Option<ConnectAttempt<S>>,
    /// Bumped by every close so a stale attempt cannot repopulate the state.
    epoch: u64,
}

impl<S> Default for ConnectionState<S> {
    fn default() -> Self {
        ConnectionState {
            connection: None,
            pending: None,
            epoch: 0,
        }
    }
}

/// Client for one relay endpoint.
pub struct Relay<C: Connector, T: Timer> {
    connector: C,
    timer: T,
    config: RelayConfig,
    dispatcher: Dispatcher,
    state: Rc<RefCell<ConnectionState<C::Conn>>>,
}

impl<C: Connector, T: Timer> Relay<C, T> {
    pub fn new(connector: C, timer: T, config: RelayConfig) -> Self {
        Relay {
            connector,
            timer,
            config,
            dispatcher: Dispatcher::new(),
            state: Rc::new(RefCell::new(ConnectionState::default())),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Return the open connection, connecting first if necessary.
    ///
    /// If an attempt is already in flight the caller waits on it and shares
    /// its outcome, including its error.
    pub async fn ensure_connection(&self) -> Result<Rc<C::Conn>, RelayError> {
        if !self.connector.is_available() {
            return Err(RelayError::Unavailable);
        }

        if let Some(conn) = self.open_connection() {
            return Ok(conn);
        }

        let in_flight = self.state.borrow().pending.clone();
        if let Some(attempt) = in_flight {
            attempt.await?;
            if let Some(conn) = self.open_connection() {
                return Ok(conn);
            }
        }

        let in_flight = self.state.borrow().pending.clone();
        let attempt = match in_flight {
            Some(attempt) => attempt,
            None => self.begin_connect(),
        };
        attempt.await
    }

    /// Fetch the newest merge-mining event tagged with `address`.
    ///
    /// Resolves with `None` when the relay has nothing or does not finish
    /// within the configured timeout. Fails only when no connection can be
    /// obtained.
    pub async fn fetch_event(&self, address: &str) -> Result<Option<Event>, RelayError> {
        let conn = self.ensure_connection().await?;

        let mut subscription = Subscription::open(&self.dispatcher, conn);
        let request = ClientMessage::Req {
            subscription_id: subscription.id.clone(),
            filters: vec![Filter::merge_mining(self.config.kind, address, self.config.limit)],
        };
        // A lost request surfaces as a timeout, not an error.
        if let Err(e) = request
            .to_json()
            .and_then(|frame| subscription.conn.send_text(&frame))
        {
            warn!(subscription = %subscription.id, error = %e, "failed to send subscription request");
        }

        let deadline = self.timer.sleep(self.config.timeout).fuse();
        pin_mut!(deadline);

        let mut events = Vec::new();
        loop {
            select! {
                item = subscription.receiver.next() => match item {
                    Some(SubscriptionItem::Event(event)) => events.push(event),
                    Some(SubscriptionItem::EndOfStoredEvents) | None => break,
                    Some(SubscriptionItem::Closed(reason)) => {
                        debug!(subscription = %subscription.id, %reason, "relay closed subscription");
                        break;
                    }
                },
                () = deadline => {
                    debug!(subscription = %subscription.id, timeout = ?self.config.timeout, "relay query timed out");
                    break;
                }
            }
        }

        drop(subscription);
        Ok(latest_event(events))
    }

    /// Close the connection if open and forget any in-flight attempt.
    pub fn close_connection(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(conn) = state.connection.take() {
            if conn.is_open() {
                debug!(url = %self.config.url, "closing relay connection");
                conn.close();
            }
        }
        state.pending = None;
        state.epoch += 1;
    }

    fn open_connection(&self) -> Option<Rc<C::Conn>> {
        self.state
            .borrow()
            .connection
            .as_ref()
            .filter(|conn| conn.is_open())
            .cloned()
    }

    fn begin_connect(&self) -> ConnectAttempt<C::Conn> {
        let epoch = {
            let mut state = self.state.borrow_mut();
            state.connection = None;
            state.epoch
        };

        debug!(url = %self.config.url, "connecting to relay");
        let connecting = self.connector.connect(&self.config.url, self.dispatcher.clone());
        let state = Rc::clone(&self.state);
        let url = self.config.url.clone();

        let attempt = async move {
            let result = connecting.await.map(Rc::new);

            let mut state = state.borrow_mut();
            if state.epoch == epoch {
                match &result {
                    Ok(conn) => state.connection = Some(Rc::clone(conn)),
                    Err(e) => {
                        warn!(%url, error = %e, "relay connection failed");
                        state.connection = None;
                    }
                }
                state.pending = None;
            }
            result
        }
        .boxed_local()
        .shared();

        self.state.borrow_mut().pending = Some(attempt.clone());
        attempt
    }
}

/// A live subscription. Dropping it unregisters the route and asks the
/// relay to close the subscription, exactly once.
struct Subscription<'a, S: Connection> {
    id: String,
    conn: Rc<S>,
    dispatcher: &'a Dispatcher,
    receiver: futures::channel::mpsc::UnboundedReceiver<SubscriptionItem>,
}

impl<'a, S: Connection> Subscription<'a, S> {
    fn open(dispatcher: &'a Dispatcher, conn: Rc<S>) -> Self {
        let id = dispatcher.next_subscription_id();
        let receiver = dispatcher.register(&id);
        Subscription {
            id,
            conn,
            dispatcher,
            receiver,
        }
    }
}

impl<S: Connection> Drop for Subscription<'_, S> {
    fn drop(&mut self) {
        self.dispatcher.unregister(&self.id);
        if !self.conn.is_open() {
            return;
        }
        let close = ClientMessage::Close {
            subscription_id: self.id.clone(),
        };
        if let Err(e) = close.to_json().and_then(|frame| self.conn.send_text(&frame)) {
            debug!(subscription = %self.id, error = %e, "failed to close subscription");
        }
    }
}
