//! UI-thread marshalling collaborator.
//!
//! The bus never implements threading itself: relocating a handler
//! invocation onto a designated execution context (typically a UI thread)
//! is delegated to a caller-supplied [`UiMarshaller`]. The bus only hands
//! it a [`UnitOfWork`] and returns; whether the marshaller runs the work
//! synchronously or defers it is invisible to the bus.

use std::fmt;
use std::sync::Arc;

/// A self-contained handler invocation handed to the marshaller.
///
/// Owns everything it needs (the subscriber and the message), so the
/// marshaller may execute it on any thread, at any later time.
pub type UnitOfWork = Box<dyn FnOnce() + Send + 'static>;

/// Caller-supplied callback that relocates execution of a unit of work
/// onto a designated context.
///
/// Cheap to clone; the underlying callback is shared.
#[derive(Clone)]
pub struct UiMarshaller {
    invoke: Arc<dyn Fn(UnitOfWork) + Send + Sync>,
}

impl UiMarshaller {
    /// Wrap a marshalling callback.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::mpsc;
    /// use sync_events::{UiMarshaller, UnitOfWork};
    ///
    /// // Forward units of work to a dedicated thread's queue.
    /// let (tx, rx) = mpsc::channel::<UnitOfWork>();
    /// let marshaller = UiMarshaller::new(move |work| {
    ///     tx.send(work).expect("ui thread gone");
    /// });
    /// # drop(marshaller);
    /// # drop(rx);
    /// ```
    pub fn new(invoke: impl Fn(UnitOfWork) + Send + Sync + 'static) -> Self {
        Self {
            invoke: Arc::new(invoke),
        }
    }

    /// A marshaller that runs each unit of work inline on the calling
    /// thread. Useful in tests and single-threaded hosts.
    pub fn inline() -> Self {
        Self::new(|work| work())
    }

    /// Hand one unit of work to the marshalling callback.
    pub fn invoke(&self, work: UnitOfWork) {
        (self.invoke)(work);
    }
}

impl fmt::Debug for UiMarshaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiMarshaller").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_inline_marshaller_runs_synchronously() {
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_in_work = ran.clone();

        UiMarshaller::inline().invoke(Box::new(move || {
            ran_in_work.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_custom_marshaller_receives_the_work() {
        let wrapped = Arc::new(AtomicUsize::new(0));
        let wrapped_in_marshaller = wrapped.clone();

        let marshaller = UiMarshaller::new(move |work| {
            wrapped_in_marshaller.fetch_add(1, Ordering::SeqCst);
            work();
        });

        let ran = Arc::new(AtomicUsize::new(0));
        let ran_in_work = ran.clone();
        marshaller.invoke(Box::new(move || {
            ran_in_work.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(wrapped.load(Ordering::SeqCst), 1);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
