use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Handler invoked for every event published on the subscribed topic.
/// Returning `Err` is logged and does not stop delivery to later handlers.
pub type Handler = Arc<dyn Fn(&serde_json::Value) -> Result<(), String> + Send + Sync>;

/// Token returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: u64,
    topic: String,
    handler: Handler,
}

struct Inner {
    subscribers: Vec<Subscriber>,
    next_id: u64,
    delivering: bool,
    queue: VecDeque<(String, serde_json::Value)>,
}

/// In-memory named-topic publish/subscribe registry.
///
/// Delivery is synchronous and in subscription order. A publish issued from
/// inside a handler is queued and delivered after the current delivery
/// finishes, so no notification is ever lost or delivered reentrantly.
pub struct EventBus {
    inner: Mutex<Inner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                subscribers: Vec::new(),
                next_id: 0,
                delivering: false,
                queue: VecDeque::new(),
            }),
        }
    }

    /// Register a handler for `topic`. Handlers run in subscription order.
    pub fn subscribe<F>(&self, topic: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: Fn(&serde_json::Value) -> Result<(), String> + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push(Subscriber {
            id,
            topic: topic.into(),
            handler: Arc::new(handler),
        });
        SubscriptionId(id)
    }

    /// Remove a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&self, subscription: SubscriptionId) {
        let mut inner = self.lock();
        inner.subscribers.retain(|s| s.id != subscription.0);
    }

    /// Deliver `payload` to every current subscriber of `topic`.
    ///
    /// Publishing with no subscribers is a no-op. A handler that fails is
    /// logged and skipped; delivery continues with the next handler.
    pub fn publish(&self, topic: &str, payload: serde_json::Value) {
        let mut inner = self.lock();
        inner.queue.push_back((topic.to_string(), payload));
        if inner.delivering {
            // A handler published during delivery; the outer loop drains it.
            return;
        }
        inner.delivering = true;

        while let Some((topic, payload)) = inner.queue.pop_front() {
            // Snapshot handlers so subscribers can (un)subscribe or publish
            // from inside a handler without holding the registry lock.
            let handlers: Vec<(u64, Handler)> = inner
                .subscribers
                .iter()
                .filter(|s| s.topic == topic)
                .map(|s| (s.id, s.handler.clone()))
                .collect();
            drop(inner);

            for (id, handler) in handlers {
                if let Err(e) = handler(&payload) {
                    tracing::warn!("subscriber {id} for topic {topic} failed: {e}");
                }
            }

            inner = self.lock();
        }

        inner.delivering = false;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("event bus mutex poisoned")
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<serde_json::Value>>>, Handler) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler: Handler = Arc::new(move |payload| {
            sink.lock().unwrap().push(payload.clone());
            Ok(())
        });
        (seen, handler)
    }

    #[test]
    fn delivers_to_topic_subscribers_only() {
        let bus = EventBus::new();
        let (seen_a, handler_a) = recorder();
        let (seen_b, handler_b) = recorder();
        bus.subscribe("a", move |p| handler_a(p));
        bus.subscribe("b", move |p| handler_b(p));

        bus.publish("a", json!({"n": 1}));

        assert_eq!(seen_a.lock().unwrap().len(), 1);
        assert!(seen_b.lock().unwrap().is_empty());
    }

    #[test]
    fn delivers_in_subscription_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = order.clone();
            bus.subscribe("t", move |_| {
                order.lock().unwrap().push(tag);
                Ok(())
            });
        }

        bus.publish("t", json!(null));

        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn publish_without_subscribers_is_noop() {
        let bus = EventBus::new();
        bus.publish("nobody-home", json!({"x": true}));
    }

    #[test]
    fn failing_handler_does_not_block_later_handlers() {
        let bus = EventBus::new();
        let (seen, handler) = recorder();
        bus.subscribe("t", |_| Err("boom".to_string()));
        bus.subscribe("t", move |p| handler(p));

        bus.publish("t", json!(42));

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let (seen, handler) = recorder();
        let sub = bus.subscribe("t", move |p| handler(p));

        bus.publish("t", json!(1));
        bus.unsubscribe(sub);
        bus.publish("t", json!(2));

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn late_subscriber_never_observes_earlier_publish() {
        let bus = EventBus::new();
        bus.publish("t", json!("early"));

        let (seen, handler) = recorder();
        bus.subscribe("t", move |p| handler(p));
        bus.publish("t", json!("late"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], json!("late"));
    }

    #[test]
    fn reentrant_publish_is_queued_not_lost() {
        let bus = Arc::new(EventBus::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let bus_inner = bus.clone();
        let order_inner = order.clone();
        bus.subscribe("t", move |payload| {
            order_inner.lock().unwrap().push(payload.clone());
            if payload == &json!("outer") {
                bus_inner.publish("t", json!("inner"));
            }
            Ok(())
        });

        bus.publish("t", json!("outer"));

        let order = order.lock().unwrap();
        assert_eq!(*order, vec![json!("outer"), json!("inner")]);
    }
}
