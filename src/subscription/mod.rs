//! Subscription bookkeeping for registered subscribers.
//!
//! A [`SubscriberRecord`] wraps one subscribed object: a weak reference to
//! it plus the descriptor list resolved for its type. The record never
//! keeps the subscriber alive; once the last strong reference outside the
//! bus is dropped, the next publish pass prunes the record.

use std::any::Any;
use std::sync::{Arc, Weak};

use uuid::Uuid;

mod descriptor;
mod interests;

pub use descriptor::{Handle, HandlerDescriptor, HandlerList};
pub use interests::{Interests, Subscriber};

/// One registered subscriber: weak reference, identity, and resolved
/// handlers.
pub(crate) struct SubscriberRecord {
    /// Unique ID for log correlation only
    id: Uuid,
    type_name: &'static str,
    target: Weak<dyn Any + Send + Sync>,
    /// `Arc` data-pointer identity. Stable for the record's lifetime: the
    /// held `Weak` keeps the allocation from being reused.
    addr: usize,
    handlers: HandlerList,
}

impl SubscriberRecord {
    pub(crate) fn new<S: Subscriber>(target: &Arc<S>, handlers: HandlerList) -> Self {
        let dyn_target: Arc<dyn Any + Send + Sync> = target.clone();
        let weak: Weak<dyn Any + Send + Sync> = Arc::downgrade(&dyn_target);
        Self {
            id: Uuid::new_v4(),
            type_name: std::any::type_name::<S>(),
            target: weak,
            addr: Arc::as_ptr(target) as usize,
            handlers,
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// True iff this record's referent is still alive and is the same
    /// allocation as `addr`.
    pub(crate) fn refers_to(&self, addr: usize) -> bool {
        self.addr == addr && self.target.strong_count() > 0
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }

    pub(crate) fn upgrade(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.target.upgrade()
    }

    pub(crate) fn handlers(&self) -> &HandlerList {
        &self.handlers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::Result;

    #[derive(Debug)]
    struct Ping;

    impl Message for Ping {}

    struct Listener;

    impl Subscriber for Listener {
        fn declare(interests: &mut Interests<Self>) {
            interests.handles::<Ping>();
        }
    }

    impl Handle<Ping> for Listener {
        fn handle(&self, _message: &Ping) -> Result<()> {
            Ok(())
        }
    }

    fn handlers_for<S: Subscriber>() -> HandlerList {
        let mut interests = Interests::<S>::new();
        S::declare(&mut interests);
        interests.into_handlers().unwrap()
    }

    #[test]
    fn test_record_identity_tracks_the_allocation() {
        let first = Arc::new(Listener);
        let second = Arc::new(Listener);

        let record = SubscriberRecord::new(&first, handlers_for::<Listener>());
        assert!(record.refers_to(Arc::as_ptr(&first) as usize));
        assert!(!record.refers_to(Arc::as_ptr(&second) as usize));
    }

    #[test]
    fn test_record_does_not_keep_the_subscriber_alive() {
        let listener = Arc::new(Listener);
        let record = SubscriberRecord::new(&listener, handlers_for::<Listener>());

        assert!(record.is_alive());
        assert!(record.upgrade().is_some());

        drop(listener);
        assert!(!record.is_alive());
        assert!(record.upgrade().is_none());
        // A dead record matches no identity, even its own old one.
        assert!(!record.refers_to(record.addr));
    }
}
