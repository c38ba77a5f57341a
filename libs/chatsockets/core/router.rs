//! Event routing: decouples "a server frame arrived" from "N independent
//! subscribers need to react"
//!
//! # Delivery contract
//!
//! - Callbacks on a topic are invoked in subscription order
//! - Each callback runs inside its own failure boundary; a panicking
//!   subscriber is logged and never prevents delivery to the others, nor
//!   does the panic reach the dispatcher's caller
//! - No ordering guarantee exists across topics
//!
//! The router performs no validation or transformation of payloads.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{debug, error};

use crate::protocol::events::{ServerEvent, Topic};

type Callback = Arc<dyn Fn(&ServerEvent) + Send + Sync + 'static>;

struct RouterInner {
    subscribers: RwLock<HashMap<Topic, Vec<(u64, Callback)>>>,
    next_id: AtomicU64,
}

/// Topic-based subscriber registry with per-callback failure isolation
#[derive(Clone)]
pub struct EventRouter {
    inner: Arc<RouterInner>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RouterInner {
                subscribers: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register a callback under a topic
    ///
    /// Every registration is retained and invoked, including multiple
    /// registrations on the same topic. The returned [`Subscription`]
    /// removes exactly this registration.
    pub fn subscribe<F>(&self, topic: Topic, callback: F) -> Subscription
    where
        F: Fn(&ServerEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .write()
            .entry(topic)
            .or_default()
            .push((id, Arc::new(callback)));

        debug!(?topic, id, "subscriber registered");
        Subscription {
            topic,
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Remove a single registration; returns whether it was present
    pub fn unsubscribe(&self, topic: Topic, id: u64) -> bool {
        remove_subscriber(&self.inner, topic, id)
    }

    /// Deliver an event to every subscriber of its topic, in
    /// subscription order
    pub fn dispatch(&self, event: &ServerEvent) {
        let topic = event.topic();
        let callbacks: Vec<(u64, Callback)> = {
            let subscribers = self.inner.subscribers.read();
            match subscribers.get(&topic) {
                Some(entries) => entries.clone(),
                None => return,
            }
        };

        for (id, callback) in callbacks {
            // One malfunctioning subscriber must never break delivery to
            // the others.
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                error!(?topic, id, "subscriber panicked during dispatch");
            }
        }
    }

    /// Number of registrations currently held for a topic
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner
            .subscribers
            .read()
            .get(&topic)
            .map_or(0, Vec::len)
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

fn remove_subscriber(inner: &RouterInner, topic: Topic, id: u64) -> bool {
    let mut subscribers = inner.subscribers.write();
    if let Some(entries) = subscribers.get_mut(&topic) {
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        return entries.len() != before;
    }
    false
}

/// Handle to a single registration, returned by [`EventRouter::subscribe`]
pub struct Subscription {
    topic: Topic,
    id: u64,
    inner: Weak<RouterInner>,
}

impl Subscription {
    /// The registration id, usable with [`EventRouter::unsubscribe`]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remove exactly this registration, leaving other subscribers to the
    /// same topic intact
    pub fn unsubscribe(self) {
        if let Some(inner) = self.inner.upgrade() {
            remove_subscriber(&inner, self.topic, self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::events::ErrorPayload;
    use std::sync::Mutex;

    fn error_event(code: &str) -> ServerEvent {
        ServerEvent::Error(ErrorPayload {
            code: code.into(),
            message: "test".into(),
        })
    }

    #[test]
    fn delivers_to_all_subscribers_in_subscription_order() {
        let router = EventRouter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        let _a = router.subscribe(Topic::Error, move |_| first.lock().unwrap().push("first"));
        let second = Arc::clone(&seen);
        let _b = router.subscribe(Topic::Error, move |_| second.lock().unwrap().push("second"));

        router.dispatch(&error_event("E1"));

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn panicking_subscriber_does_not_block_later_subscribers() {
        let router = EventRouter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let _a = router.subscribe(Topic::Error, |_| panic!("subscriber bug"));
        let tail = Arc::clone(&seen);
        let _b = router.subscribe(Topic::Error, move |_| tail.lock().unwrap().push("tail"));

        // Must not propagate the panic either.
        router.dispatch(&error_event("E1"));

        assert_eq!(*seen.lock().unwrap(), vec!["tail"]);
    }

    #[test]
    fn message_payload_survives_an_earlier_panicking_subscriber() {
        use crate::protocol::events::NewMessagePayload;
        use crate::protocol::types::{Message, MessageType, UserRole};

        let router = EventRouter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let _a = router.subscribe(Topic::NewMessage, |_| panic!("subscriber bug"));
        let tail = Arc::clone(&seen);
        let _b = router.subscribe(Topic::NewMessage, move |event| {
            if let ServerEvent::NewMessage(payload) = event {
                tail.lock().unwrap().push(payload.message.content.clone());
            }
        });

        router.dispatch(&ServerEvent::NewMessage(NewMessagePayload {
            message: Message {
                id: "m1".into(),
                room_id: "r1".into(),
                sender_id: "u2".into(),
                sender_role: UserRole::Recruiter,
                content: "still delivered".into(),
                message_type: MessageType::Text,
                metadata: None,
                is_read: false,
                created_at: chrono::Utc::now(),
            },
        }));

        assert_eq!(*seen.lock().unwrap(), vec!["still delivered"]);
    }

    #[test]
    fn unsubscribe_removes_exactly_one_registration() {
        let router = EventRouter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        let a = router.subscribe(Topic::Error, move |_| first.lock().unwrap().push("first"));
        let second = Arc::clone(&seen);
        let _b = router.subscribe(Topic::Error, move |_| second.lock().unwrap().push("second"));

        assert_eq!(router.subscriber_count(Topic::Error), 2);
        a.unsubscribe();
        assert_eq!(router.subscriber_count(Topic::Error), 1);

        router.dispatch(&error_event("E1"));
        assert_eq!(*seen.lock().unwrap(), vec!["second"]);
    }

    #[test]
    fn explicit_unsubscribe_by_id_matches_handle_behavior() {
        let router = EventRouter::new();
        let sub = router.subscribe(Topic::NewMessage, |_| {});
        let id = sub.id();

        assert!(router.unsubscribe(Topic::NewMessage, id));
        assert!(!router.unsubscribe(Topic::NewMessage, id));
        assert_eq!(router.subscriber_count(Topic::NewMessage), 0);
    }

    #[test]
    fn dispatch_to_empty_topic_is_a_no_op() {
        let router = EventRouter::new();
        router.dispatch(&error_event("E1"));
    }

    #[test]
    fn topics_are_isolated_from_each_other() {
        let router = EventRouter::new();
        let seen = Arc::new(Mutex::new(0usize));

        let counter = Arc::clone(&seen);
        let _sub = router.subscribe(Topic::NewMessage, move |_| *counter.lock().unwrap() += 1);

        router.dispatch(&error_event("E1"));
        assert_eq!(*seen.lock().unwrap(), 0);
    }
}
