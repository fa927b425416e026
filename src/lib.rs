//! # sync-events
//!
//! A synchronous, type-safe in-process publish/subscribe message bus.
//!
//! Subscribers declare the message types they handle; publishers hand a
//! message to the bus and every compatible handler of every live
//! subscriber runs before the call returns. The bus holds subscribers by
//! weak reference, so dropping the last outside handle to a subscriber is
//! all the unsubscription it ever needs.
//!
//! ## Features
//!
//! - **Type-safe** handler declaration checked at compile time
//! - **Hierarchy-aware** dispatch: handlers for a parent message type also
//!   receive its refinements
//! - **Weak subscriptions**: dropped subscribers are pruned automatically
//! - **UI marshalling**: individual handlers can be relocated onto a
//!   caller-supplied execution context
//! - **Thread-safe** and reentrant: handlers may subscribe, unsubscribe,
//!   and publish on the bus that is dispatching to them
//!
//! ## Quick Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use sync_events::{EventBus, Handle, Interests, Message, Subscriber};
//!
//! #[derive(Debug)]
//! struct JobFinished {
//!     name: String,
//! }
//!
//! impl Message for JobFinished {}
//!
//! #[derive(Default)]
//! struct StatusPanel {
//!     last: Mutex<Option<String>>,
//! }
//!
//! impl Subscriber for StatusPanel {
//!     fn declare(interests: &mut Interests<Self>) {
//!         interests.handles::<JobFinished>();
//!     }
//! }
//!
//! impl Handle<JobFinished> for StatusPanel {
//!     fn handle(&self, message: &JobFinished) -> sync_events::Result<()> {
//!         *self.last.lock().unwrap() = Some(message.name.clone());
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> sync_events::Result<()> {
//!     let bus = EventBus::new();
//!     let panel = Arc::new(StatusPanel::default());
//!
//!     bus.subscribe(&panel)?;
//!     bus.publish(JobFinished {
//!         name: "indexing".into(),
//!     })?;
//!
//!     assert_eq!(panel.last.lock().unwrap().as_deref(), Some("indexing"));
//!     Ok(())
//! }
//! ```

#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    unreachable_pub
)]

/// The main event bus implementation
pub mod bus;

/// Process-wide handler descriptor cache
pub mod cache;

/// Error types and result aliases
pub mod error;

/// UI-thread marshalling collaborator
pub mod marshal;

/// Core message trait and hierarchy projection
pub mod message;

/// Subscriber declaration and subscription records
pub mod subscription;

// Re-export commonly used types
pub use bus::{EventBus, EventBusBuilder};
pub use error::{Error, Result};
pub use marshal::{UiMarshaller, UnitOfWork};
pub use message::{AsAny, Message};
pub use subscription::{Handle, HandlerDescriptor, HandlerList, Interests, Subscriber};

/// Prelude module for convenient imports
///
/// # Example
/// ```rust
/// use sync_events::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bus::{EventBus, EventBusBuilder};
    pub use crate::error::{Error, Result};
    pub use crate::marshal::UiMarshaller;
    pub use crate::message::Message;
    pub use crate::subscription::{Handle, Interests, Subscriber};
}
