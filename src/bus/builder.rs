//! Builder pattern for constructing EventBus instances.

use parking_lot::Mutex;

use super::EventBus;
use crate::marshal::{UiMarshaller, UnitOfWork};

/// Builder for creating EventBus instances
///
/// # Example
///
/// ```rust
/// use sync_events::EventBus;
///
/// let bus = EventBus::builder()
///     .ui_marshaller_fn(|work| work()) // run "UI" work inline
///     .subscriber_capacity(32)
///     .build();
/// # drop(bus);
/// ```
#[derive(Debug, Default)]
pub struct EventBusBuilder {
    marshaller: Option<UiMarshaller>,
    capacity: usize,
}

impl EventBusBuilder {
    /// Create a new builder with no marshaller configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the marshaller that relocates `handles_on_ui` invocations
    /// onto the designated execution context.
    pub fn ui_marshaller(mut self, marshaller: UiMarshaller) -> Self {
        self.marshaller = Some(marshaller);
        self
    }

    /// Convenience form of [`ui_marshaller`](Self::ui_marshaller) taking
    /// the callback directly.
    pub fn ui_marshaller_fn(self, invoke: impl Fn(UnitOfWork) + Send + Sync + 'static) -> Self {
        self.ui_marshaller(UiMarshaller::new(invoke))
    }

    /// Pre-allocate room for `capacity` subscriber records.
    pub fn subscriber_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Build the EventBus
    pub fn build(self) -> EventBus {
        EventBus {
            subscribers: Mutex::new(Vec::with_capacity(self.capacity)),
            marshaller: self.marshaller,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_build_has_no_marshaller() {
        let bus = EventBusBuilder::new().build();
        assert!(bus.marshaller.is_none());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_marshaller_is_instance_scoped() {
        // Two buses in one process keep their own marshaller configuration.
        let with = EventBus::builder().ui_marshaller(UiMarshaller::inline()).build();
        let without = EventBus::new();

        assert!(with.marshaller.is_some());
        assert!(without.marshaller.is_none());
    }

    #[test]
    fn test_capacity_is_preallocated() {
        let bus = EventBusBuilder::new().subscriber_capacity(16).build();
        assert!(bus.subscribers.lock().capacity() >= 16);
    }
}
