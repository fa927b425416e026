//! Explicit declaration of the message types a subscriber handles.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use super::descriptor::{Handle, HandlerDescriptor, HandlerList};
use crate::message::Message;
use crate::{Error, Result};

/// Trait for types that can be registered on an [`EventBus`](crate::EventBus).
///
/// `declare` names every message type the subscriber wants delivered, in
/// the order handlers should run for one published message. It runs once
/// per subscriber type; the resulting descriptor list is cached and reused
/// for every instance of that type.
///
/// A type with an empty `declare` body is a valid subscriber that simply
/// receives nothing.
///
/// # Example
///
/// ```rust
/// use sync_events::{Handle, Interests, Message, Subscriber};
///
/// #[derive(Debug)]
/// struct Progress {
///     percent: u8,
/// }
///
/// impl Message for Progress {}
///
/// struct ProgressBar;
///
/// impl Subscriber for ProgressBar {
///     fn declare(interests: &mut Interests<Self>) {
///         interests.handles::<Progress>();
///     }
/// }
///
/// impl Handle<Progress> for ProgressBar {
///     fn handle(&self, message: &Progress) -> sync_events::Result<()> {
///         println!("{}%", message.percent);
///         Ok(())
///     }
/// }
/// ```
pub trait Subscriber: Any + Send + Sync + 'static {
    /// Declares the message types this subscriber wants delivered.
    fn declare(interests: &mut Interests<Self>)
    where
        Self: Sized;
}

/// Ordered declaration list for subscriber type `S`, collected while its
/// [`Subscriber::declare`] body runs.
pub struct Interests<S> {
    descriptors: Vec<HandlerDescriptor>,
    _subscriber: PhantomData<fn(S)>,
}

impl<S: Subscriber> Interests<S> {
    pub(crate) fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            _subscriber: PhantomData,
        }
    }

    /// Declares that `S` handles messages of type `M` on the publishing
    /// thread.
    pub fn handles<M: Message>(&mut self) -> &mut Self
    where
        S: Handle<M>,
    {
        self.descriptors.push(HandlerDescriptor::new::<S, M>(false));
        self
    }

    /// Declares that `S` handles messages of type `M` through the bus's
    /// UI marshaller.
    ///
    /// Publishing a matching message on a bus constructed without a
    /// marshaller fails with [`Error::MarshallerMissing`] at dispatch time.
    pub fn handles_on_ui<M: Message>(&mut self) -> &mut Self
    where
        S: Handle<M>,
    {
        self.descriptors.push(HandlerDescriptor::new::<S, M>(true));
        self
    }

    /// Finalizes the declaration list, rejecting duplicate message types.
    pub(crate) fn into_handlers(self) -> Result<HandlerList> {
        for (idx, descriptor) in self.descriptors.iter().enumerate() {
            let duplicate = self.descriptors[..idx]
                .iter()
                .any(|prev| prev.message_type() == descriptor.message_type());
            if duplicate {
                return Err(Error::AmbiguousInterest {
                    subscriber: std::any::type_name::<S>(),
                    message: descriptor.message_name(),
                });
            }
        }
        Ok(self.descriptors.into())
    }
}

impl<S> fmt::Debug for Interests<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interests")
            .field("declared", &self.descriptors.len())
            .finish()
    }
}
