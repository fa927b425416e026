//! Core message trait and type-hierarchy projection.
//!
//! Any `Send + Sync + 'static` value can act as a message by implementing
//! the [`Message`] marker trait. Messages need no base type; hierarchy is
//! structural: a message type that refines another embeds its parent and
//! exposes it through [`Message::parent`]. Dispatch walks that chain, so a
//! handler declared for the parent type also receives refined messages,
//! projected down to the view it expects.

use std::any::{Any, TypeId};

/// Object-safe access to a value as `&dyn Any`.
///
/// Blanket-implemented for every `'static` type; exists so that trait
/// objects of [`Message`] can be downcast to the concrete type a handler
/// was declared for.
pub trait AsAny: Any {
    /// Returns this value as a `&dyn Any` reference.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Marker trait for values published on an [`EventBus`](crate::EventBus).
///
/// # Example
///
/// ```rust
/// use sync_events::Message;
///
/// #[derive(Debug)]
/// struct Alert {
///     code: u32,
/// }
///
/// impl Message for Alert {}
///
/// // A refinement of `Alert`: handlers declared for `Alert` also
/// // receive a `DiskAlert`, seeing its embedded `Alert` view.
/// #[derive(Debug)]
/// struct DiskAlert {
///     alert: Alert,
///     path: String,
/// }
///
/// impl Message for DiskAlert {
///     fn parent(&self) -> Option<&dyn Message> {
///         Some(&self.alert)
///     }
/// }
/// ```
pub trait Message: AsAny + Send + Sync + 'static {
    /// The parent message view, if this type refines another message type.
    ///
    /// Chains must be finite: each link points at a value embedded in the
    /// child, never back at the child itself.
    fn parent(&self) -> Option<&dyn Message> {
        None
    }
}

/// Walks `root`'s parent chain and returns the first view whose concrete
/// type is `wanted`, or `None` when the chain does not reach it.
pub(crate) fn project(root: &dyn Message, wanted: TypeId) -> Option<&dyn Message> {
    let mut view = Some(root);
    while let Some(current) = view {
        if current.as_any().type_id() == wanted {
            return Some(current);
        }
        view = current.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Base {
        code: u32,
    }

    impl Message for Base {}

    #[derive(Debug)]
    struct Derived {
        base: Base,
    }

    impl Message for Derived {
        fn parent(&self) -> Option<&dyn Message> {
            Some(&self.base)
        }
    }

    #[derive(Debug)]
    struct Unrelated;

    impl Message for Unrelated {}

    #[test]
    fn test_project_exact_type() {
        let msg = Base { code: 7 };
        let view = project(&msg, TypeId::of::<Base>()).unwrap();
        assert_eq!(view.as_any().downcast_ref::<Base>().unwrap().code, 7);
    }

    #[test]
    fn test_project_parent_view() {
        let msg = Derived {
            base: Base { code: 42 },
        };
        let view = project(&msg, TypeId::of::<Base>()).unwrap();
        assert_eq!(view.as_any().downcast_ref::<Base>().unwrap().code, 42);
    }

    #[test]
    fn test_project_unrelated_type_misses() {
        let msg = Derived {
            base: Base { code: 1 },
        };
        assert!(project(&msg, TypeId::of::<Unrelated>()).is_none());
    }

    #[test]
    fn test_project_does_not_walk_downward() {
        // The chain runs child -> parent only; a parent never satisfies a
        // handler declared for one of its refinements.
        let msg = Base { code: 1 };
        assert!(project(&msg, TypeId::of::<Derived>()).is_none());
    }
}
