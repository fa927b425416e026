//! Handler descriptors binding one message type to one invocation thunk.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use tracing::error;

use crate::marshal::UnitOfWork;
use crate::message::{project, Message};
use crate::{Error, Result};

/// Trait for subscriber types that can process messages of type `M`.
///
/// A subscriber type implements `Handle<M>` once per message type it wants
/// delivered, and names `M` in its [`Subscriber::declare`] body. Coherence
/// guarantees at most one handling method per message type per subscriber
/// type.
///
/// Errors returned from [`handle`](Handle::handle) propagate to the
/// publisher and abort the remainder of that publish pass.
///
/// [`Subscriber::declare`]: crate::Subscriber::declare
pub trait Handle<M: Message>: Send + Sync {
    /// Process one delivered message.
    fn handle(&self, message: &M) -> Result<()>;
}

/// Type-erased invocation thunk: downcasts the target and the message view,
/// then calls the typed handling method.
type InvokeFn = Arc<dyn Fn(&dyn Any, &dyn Message) -> Result<()> + Send + Sync>;

/// The precomputed, immutable descriptor list for one subscriber type,
/// shared by every instance of that type via the handler cache.
pub type HandlerList = Arc<[HandlerDescriptor]>;

/// Binds one message type to one handling method on one subscriber type,
/// plus a flag for UI-thread marshalling. Immutable after construction.
#[derive(Clone)]
pub struct HandlerDescriptor {
    message_type: TypeId,
    message_name: &'static str,
    marshal: bool,
    thunk: InvokeFn,
}

impl HandlerDescriptor {
    pub(crate) fn new<S, M>(marshal: bool) -> Self
    where
        S: Handle<M> + Any,
        M: Message,
    {
        let thunk: InvokeFn = Arc::new(|target: &dyn Any, view: &dyn Message| {
            let target = target
                .downcast_ref::<S>()
                .ok_or_else(|| Error::internal("subscriber type mismatch during dispatch"))?;
            let message = view
                .as_any()
                .downcast_ref::<M>()
                .ok_or_else(|| Error::internal("message type mismatch during dispatch"))?;
            target.handle(message)
        });

        Self {
            message_type: TypeId::of::<M>(),
            message_name: std::any::type_name::<M>(),
            marshal,
            thunk,
        }
    }

    /// The message type this descriptor accepts.
    pub fn message_type(&self) -> TypeId {
        self.message_type
    }

    /// Human-readable name of the accepted message type.
    pub fn message_name(&self) -> &'static str {
        self.message_name
    }

    /// Whether invocation must go through the bus's UI marshaller.
    pub fn needs_marshalling(&self) -> bool {
        self.marshal
    }

    /// Resolves the view of `root` this descriptor accepts by walking the
    /// published message's parent chain. `None` means the descriptor does
    /// not match this message.
    pub(crate) fn matching_view<'a>(&self, root: &'a dyn Message) -> Option<&'a dyn Message> {
        project(root, self.message_type)
    }

    /// Invokes the handling method on `target` with the projected view.
    pub(crate) fn invoke(&self, target: &dyn Any, view: &dyn Message) -> Result<()> {
        (self.thunk)(target, view)
    }

    /// Packages one invocation as a self-contained unit of work for the
    /// marshaller. The closure owns the upgraded subscriber and the shared
    /// message, so the marshaller may defer execution.
    ///
    /// A handler failure inside the unit of work cannot reach the publisher
    /// (the marshaller contract is fire-and-forget); it is reported via
    /// `tracing` instead.
    pub(crate) fn into_unit_of_work(
        &self,
        target: Arc<dyn Any + Send + Sync>,
        root: Arc<dyn Message>,
    ) -> UnitOfWork {
        let thunk = Arc::clone(&self.thunk);
        let wanted = self.message_type;
        let message_name = self.message_name;
        Box::new(move || {
            let Some(view) = project(root.as_ref(), wanted) else {
                return;
            };
            if let Err(err) = thunk(&*target, view) {
                error!(message_type = message_name, %err, "marshalled handler failed");
            }
        })
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("message_name", &self.message_name)
            .field("marshal", &self.marshal)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct Ping {
        seq: u32,
    }

    impl Message for Ping {}

    #[derive(Debug)]
    struct Pong;

    impl Message for Pong {}

    #[derive(Default)]
    struct Recorder {
        last_seq: AtomicU32,
    }

    impl Handle<Ping> for Recorder {
        fn handle(&self, message: &Ping) -> Result<()> {
            self.last_seq.store(message.seq, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_invoke_downcasts_and_calls() {
        let descriptor = HandlerDescriptor::new::<Recorder, Ping>(false);
        let recorder = Recorder::default();
        let ping = Ping { seq: 9 };

        let view = descriptor.matching_view(&ping).unwrap();
        descriptor.invoke(&recorder, view).unwrap();
        assert_eq!(recorder.last_seq.load(Ordering::SeqCst), 9);
    }

    #[test]
    fn test_matching_view_rejects_unrelated() {
        let descriptor = HandlerDescriptor::new::<Recorder, Ping>(false);
        let pong = Pong;
        assert!(descriptor.matching_view(&pong).is_none());
    }

    #[test]
    fn test_unit_of_work_owns_its_inputs() {
        let descriptor = HandlerDescriptor::new::<Recorder, Ping>(true);
        let recorder: Arc<Recorder> = Arc::new(Recorder::default());
        let message: Arc<dyn Message> = Arc::new(Ping { seq: 3 });

        let target: Arc<dyn Any + Send + Sync> = recorder.clone();
        let work = descriptor.into_unit_of_work(target, message);

        // Runs on whatever thread the marshaller chooses.
        std::thread::spawn(work).join().unwrap();
        assert_eq!(recorder.last_seq.load(Ordering::SeqCst), 3);
    }
}
