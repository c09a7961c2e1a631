//! Binding registration types.

use std::any::Any;
use std::sync::Arc;

use crate::key::Shape;
use crate::traits::Injectable;

/// Type-erased handle holding an `Arc<T>` for some possibly unsized `T`.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Erases an `Arc<T>`; the slot side recovers it with `downcast_ref::<Arc<T>>()`.
pub(crate) fn erase<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> AnyArc {
    Arc::new(value)
}

/// Address of the bound instance, used to deduplicate by identity.
pub(crate) fn identity_of<T: ?Sized>(value: &Arc<T>) -> usize {
    Arc::as_ptr(value) as *const () as usize
}

/// A value available to satisfy requirements.
#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) shape: Shape,
    pub(crate) value: AnyArc,
    pub(crate) identity: usize,
    /// Present for records; capability values are opaque
    pub(crate) object: Option<Arc<dyn Injectable>>,
}

impl Binding {
    pub(crate) fn record<T: Injectable>(value: Arc<T>) -> Self {
        Self {
            shape: Shape::record::<T>(),
            identity: identity_of(&value),
            object: Some(value.clone() as Arc<dyn Injectable>),
            value: erase(value),
        }
    }

    pub(crate) fn capability<C: ?Sized + Send + Sync + 'static>(value: Arc<C>) -> Self {
        Self {
            shape: Shape::capability::<C>(),
            identity: identity_of(&value),
            object: None,
            value: erase(value),
        }
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("shape", &self.shape.name())
            .field("identity", &format_args!("{:#x}", self.identity))
            .finish()
    }
}
