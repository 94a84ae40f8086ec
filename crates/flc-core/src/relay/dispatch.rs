//! Routing of inbound relay frames to their subscriptions.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::channel::mpsc;
use tracing::{debug, info, trace, warn};

use super::event::Event;
use super::message::RelayMessage;

/// What a subscription can observe.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionItem {
    Event(Event),
    /// The relay has sent every stored match.
    EndOfStoredEvents,
    /// The relay terminated the subscription.
    Closed(String),
}

/// Shared routing table from subscription id to receiver.
///
/// Cloning is cheap; all clones share one table.
#[derive(Clone, Default)]
pub struct Dispatcher {
    routes: Rc<RefCell<HashMap<String, mpsc::UnboundedSender<SubscriptionItem>>>>,
    fallback_ids: Rc<Cell<u64>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one inbound text frame. Malformed frames and frames for
    /// unknown subscriptions are logged and dropped.
    pub fn dispatch(&self, frame: &str) {
        let message = match RelayMessage::from_json(frame) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "dropping malformed relay frame");
                return;
            }
        };

        match message {
            RelayMessage::Event {
                subscription_id,
                event,
            } => self.route(&subscription_id, SubscriptionItem::Event(*event)),
            RelayMessage::EndOfStoredEvents { subscription_id } => {
                self.route(&subscription_id, SubscriptionItem::EndOfStoredEvents)
            }
            RelayMessage::Closed {
                subscription_id,
                message,
            } => self.route(&subscription_id, SubscriptionItem::Closed(message)),
            RelayMessage::Notice { message } => info!(%message, "relay notice"),
            RelayMessage::Ok { event_id, .. } => trace!(%event_id, "ignoring OK frame"),
        }
    }

    /// Start receiving items for `subscription_id`.
    pub fn register(&self, subscription_id: &str) -> mpsc::UnboundedReceiver<SubscriptionItem> {
        let (tx, rx) = mpsc::unbounded();
        self.routes.borrow_mut().insert(subscription_id.to_string(), tx);
        rx
    }

    pub fn unregister(&self, subscription_id: &str) {
        self.routes.borrow_mut().remove(subscription_id);
    }

    /// Number of live subscriptions.
    pub fn active(&self) -> usize {
        self.routes.borrow().len()
    }

    /// A fresh subscription id: 16 random hex characters.
    pub fn next_subscription_id(&self) -> String {
        let mut bytes = [0u8; 8];
        match getrandom::getrandom(&mut bytes) {
            Ok(()) => hex::encode(bytes),
            Err(e) => {
                let n = self.fallback_ids.get() + 1;
                self.fallback_ids.set(n);
                debug!(error = %e, "no randomness available, using counter id");
                format!("{n:016x}")
            }
        }
    }

    fn route(&self, subscription_id: &str, item: SubscriptionItem) {
        let sender = self.routes.borrow().get(subscription_id).cloned();
        match sender {
            Some(sender) => {
                let _ = sender.unbounded_send(item);
            }
            None => trace!(%subscription_id, "frame for unknown subscription"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_routes_by_subscription() {
        let dispatcher = Dispatcher::new();
        let mut first = dispatcher.register("one");
        let mut second = dispatcher.register("two");

        dispatcher.dispatch(r#"["EVENT","one",{"id":"e1","created_at":1}]"#);
        dispatcher.dispatch(r#"["EOSE","two"]"#);
        dispatcher.dispatch(r#"["EOSE","three"]"#);
        dispatcher.dispatch("not json");

        match first.try_next() {
            Ok(Some(SubscriptionItem::Event(event))) => assert_eq!(event.id, "e1"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(first.try_next().is_err());
        assert_eq!(second.try_next().unwrap(), Some(SubscriptionItem::EndOfStoredEvents));
    }

    #[test]
    fn test_delivers_events_with_loosely_typed_fields() {
        let dispatcher = Dispatcher::new();
        let mut rx = dispatcher.register("one");

        dispatcher.dispatch(r#"["EVENT","one",{"id":"e1","content":null,"created_at":5}]"#);
        dispatcher.dispatch(r#"["EVENT","one",{"id":"e2","created_at":1700000000.0}]"#);
        dispatcher.dispatch(r#"["EVENT","one",{"id":null,"created_at":7}]"#);

        let mut delivered = Vec::new();
        while let Ok(Some(SubscriptionItem::Event(event))) = rx.try_next() {
            delivered.push((event.id, event.created_at));
        }
        assert_eq!(
            delivered,
            vec![
                ("e1".to_string(), 5),
                ("e2".to_string(), 1_700_000_000),
                (String::new(), 7)
            ]
        );
    }

    #[test]
    fn test_unregister_closes_stream() {
        let dispatcher = Dispatcher::new();
        let mut rx = dispatcher.register("one");
        dispatcher.unregister("one");

        assert_eq!(dispatcher.active(), 0);
        assert_eq!(futures::executor::block_on(rx.next()), None);
    }

    #[test]
    fn test_subscription_ids_are_distinct() {
        let dispatcher = Dispatcher::new();
        let a = dispatcher.next_subscription_id();
        let b = dispatcher.next_subscription_id();

        assert_eq!(a.len(), 16);
        assert_ne!(a, b);
    }
}
