//! The main EventBus implementation.
//!
//! The EventBus is the primary interface for publishing and subscribing to
//! messages. It owns the ordered subscriber list and the dispatch loop;
//! handler discovery is delegated to the [`HandlerCache`] and UI-thread
//! relocation to the optional [`UiMarshaller`].
//!
//! # Locking discipline
//!
//! Publish snapshots the live subscriber list under the registry lock,
//! releases the lock, then dispatches. Records whose referent has been
//! dropped are pruned inside that same locked section. No user code ever
//! runs under the lock, so handlers may reenter the bus (subscribe,
//! unsubscribe, publish, clear) without deadlocking. The trade-off is
//! that registrations made during a pass see only later messages, and a
//! reentrant unsubscribe cannot recall invocations already snapshotted.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::cache::HandlerCache;
use crate::marshal::UiMarshaller;
use crate::message::Message;
use crate::subscription::{HandlerList, Subscriber, SubscriberRecord};
use crate::{Error, Result};

pub mod builder;

pub use builder::EventBusBuilder;

/// One upgraded subscriber captured by the publish snapshot. Holding the
/// strong reference keeps the subscriber alive for the duration of the
/// pass.
struct LiveSubscriber {
    id: Uuid,
    target: Arc<dyn Any + Send + Sync>,
    handlers: HandlerList,
}

/// A synchronous in-process publish/subscribe message bus.
///
/// One bus instance is one independent registry; subscribers are held by
/// weak reference and dropped subscribers are pruned lazily during
/// publish.
///
/// # Example
///
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use sync_events::{EventBus, Handle, Interests, Message, Subscriber};
///
/// #[derive(Debug)]
/// struct Saved;
///
/// impl Message for Saved {}
///
/// #[derive(Default)]
/// struct Toast {
///     shown: AtomicUsize,
/// }
///
/// impl Subscriber for Toast {
///     fn declare(interests: &mut Interests<Self>) {
///         interests.handles::<Saved>();
///     }
/// }
///
/// impl Handle<Saved> for Toast {
///     fn handle(&self, _message: &Saved) -> sync_events::Result<()> {
///         self.shown.fetch_add(1, Ordering::SeqCst);
///         Ok(())
///     }
/// }
///
/// fn main() -> sync_events::Result<()> {
///     let bus = EventBus::new();
///     let toast = Arc::new(Toast::default());
///     bus.subscribe(&toast)?;
///     bus.publish(Saved)?;
///     assert_eq!(toast.shown.load(Ordering::SeqCst), 1);
///     Ok(())
/// }
/// ```
pub struct EventBus {
    pub(crate) subscribers: Mutex<Vec<SubscriberRecord>>,
    pub(crate) marshaller: Option<UiMarshaller>,
}

impl EventBus {
    /// Create a bus with no UI marshaller.
    ///
    /// Handlers declared with `handles_on_ui` fail at dispatch time on
    /// such a bus; everything else works normally.
    pub fn new() -> Self {
        EventBusBuilder::new().build()
    }

    /// Create a new EventBus builder
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::new()
    }

    /// Register `target` to receive messages matching its declared
    /// interests.
    ///
    /// Idempotent: subscribing an already-registered instance is a no-op.
    /// Fails with [`Error::AmbiguousInterest`] when `S` declares the same
    /// message type twice.
    pub fn subscribe<S: Subscriber>(&self, target: &Arc<S>) -> Result<()> {
        // Resolve before taking the registry lock: `S::declare` is user
        // code and may itself touch a bus.
        let handlers = HandlerCache::global().resolve::<S>()?;
        let addr = Arc::as_ptr(target) as usize;

        let mut subscribers = self.subscribers.lock();
        if subscribers.iter().any(|record| record.refers_to(addr)) {
            trace!(
                subscriber = std::any::type_name::<S>(),
                "already subscribed"
            );
            return Ok(());
        }

        let record = SubscriberRecord::new(target, handlers);
        debug!(
            subscriber_id = %record.id(),
            subscriber = record.type_name(),
            handlers = record.handlers().len(),
            "subscribed"
        );
        subscribers.push(record);
        Ok(())
    }

    /// Remove every registration whose live referent is `target`.
    ///
    /// No-op when `target` was never subscribed.
    pub fn unsubscribe<S: Subscriber>(&self, target: &Arc<S>) {
        let addr = Arc::as_ptr(target) as usize;
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|record| {
            let matched = record.refers_to(addr);
            if matched {
                debug!(
                    subscriber_id = %record.id(),
                    subscriber = record.type_name(),
                    "unsubscribed"
                );
            }
            !matched
        });
    }

    /// Publish a message to every compatible handler of every live
    /// subscriber.
    ///
    /// A handler declared for a parent message type also receives
    /// refinements of it, projected to the view it expects (see
    /// [`Message::parent`]). Handler errors propagate immediately and
    /// abort the remainder of the pass.
    ///
    /// Subscribers are visited in registration order and each record's
    /// handlers run in declaration order; the cross-subscriber order is an
    /// implementation convenience, not a contract to rely on.
    pub fn publish<M: Message>(&self, message: M) -> Result<()> {
        self.publish_shared(Arc::new(message))
    }

    /// Default-construct an `M` and publish it.
    pub fn publish_default<M: Message + Default>(&self) -> Result<()> {
        self.publish_shared(Arc::new(M::default()))
    }

    /// Publish an already-shared message without re-wrapping it.
    pub fn publish_shared<M: Message>(&self, message: Arc<M>) -> Result<()> {
        let root: Arc<dyn Message> = message;
        self.dispatch(root, std::any::type_name::<M>())
    }

    fn dispatch(&self, root: Arc<dyn Message>, message_name: &'static str) -> Result<()> {
        trace!(message_type = message_name, "publishing");

        for subscriber in self.snapshot_live() {
            for descriptor in subscriber.handlers.iter() {
                let Some(view) = descriptor.matching_view(root.as_ref()) else {
                    continue;
                };
                trace!(
                    subscriber_id = %subscriber.id,
                    message_type = descriptor.message_name(),
                    marshalled = descriptor.needs_marshalling(),
                    "delivering"
                );
                if descriptor.needs_marshalling() {
                    let marshaller =
                        self.marshaller
                            .as_ref()
                            .ok_or(Error::MarshallerMissing {
                                message: descriptor.message_name(),
                            })?;
                    marshaller.invoke(descriptor.into_unit_of_work(
                        Arc::clone(&subscriber.target),
                        Arc::clone(&root),
                    ));
                } else {
                    descriptor.invoke(subscriber.target.as_ref(), view)?;
                }
            }
        }
        Ok(())
    }

    /// Copies the live subscriber list under the lock, pruning records
    /// whose referent has been dropped.
    fn snapshot_live(&self) -> Vec<LiveSubscriber> {
        let mut subscribers = self.subscribers.lock();
        let mut live = Vec::with_capacity(subscribers.len());
        subscribers.retain(|record| match record.upgrade() {
            Some(target) => {
                live.push(LiveSubscriber {
                    id: record.id(),
                    target,
                    handlers: record.handlers().clone(),
                });
                true
            }
            None => {
                debug!(
                    subscriber_id = %record.id(),
                    subscriber = record.type_name(),
                    "pruning collected subscriber"
                );
                false
            }
        });
        live
    }

    /// Remove all registrations unconditionally.
    pub fn clear(&self) {
        let mut subscribers = self.subscribers.lock();
        let removed = subscribers.len();
        subscribers.clear();
        debug!(removed, "cleared registry");
    }

    /// Number of currently live registrations.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .iter()
            .filter(|record| record.is_alive())
            .count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.lock().len())
            .field("has_marshaller", &self.marshaller.is_some())
            .finish()
    }
}
