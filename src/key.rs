//! Shapes and keys identifying bindings and requirements.

use std::any::TypeId;
use std::fmt;
use std::mem::size_of;

/// Whether a shape is a concrete record or an abstract capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Concrete, sized type bound as `Arc<T>`
    Record,
    /// Unsized trait object bound as `Arc<dyn Trait>`
    Capability,
}

/// Run-time identity of a bound type.
///
/// A shape pairs a `TypeId` with the `type_name` used in diagnostics.
/// Equality and hashing only look at the `TypeId`.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{Shape, ShapeKind};
///
/// trait Clock: Send + Sync {}
/// struct Database;
///
/// let record = Shape::record::<Database>();
/// assert_eq!(record.kind(), ShapeKind::Record);
/// assert!(record.name().ends_with("Database"));
///
/// let capability = Shape::capability::<dyn Clock>();
/// assert!(capability.is_capability());
/// assert_ne!(record, capability);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    id: TypeId,
    name: &'static str,
    kind: ShapeKind,
}

impl Shape {
    /// Shape of a concrete record type.
    pub fn record<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            kind: ShapeKind::Record,
        }
    }

    /// Shape of a capability type, usually `dyn Trait`.
    ///
    /// The kind is not validated here; see [`Shape::is_unsized`].
    pub fn capability<C: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
            kind: ShapeKind::Capability,
        }
    }

    /// True when references to `T` are fat pointers, i.e. `T` is unsized.
    pub(crate) fn is_unsized<T: ?Sized>() -> bool {
        size_of::<&T>() != size_of::<&()>()
    }

    /// Type name for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn is_capability(&self) -> bool {
        self.kind == ShapeKind::Capability
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for Shape {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Shape {}

impl std::hash::Hash for Shape {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Lookup key of a binding or a requirement.
///
/// Unnamed bindings are keyed by shape, named ones by their name alone.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{Key, Shape};
///
/// struct Cache;
///
/// let unnamed = Key::Unnamed(Shape::record::<Cache>());
/// assert_eq!(unnamed.service_name(), None);
///
/// let named = Key::named("hot_cache");
/// assert_eq!(named.service_name(), Some("hot_cache"));
/// assert_eq!(named.to_string(), "\"hot_cache\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Unnamed(Shape),
    Named(String),
}

impl Key {
    pub fn named(name: impl Into<String>) -> Self {
        Key::Named(name.into())
    }

    /// The name for named keys, or None for unnamed keys
    pub fn service_name(&self) -> Option<&str> {
        match self {
            Key::Unnamed(_) => None,
            Key::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Unnamed(shape) => write!(f, "{}", shape),
            Key::Named(name) => write!(f, "\"{}\"", name),
        }
    }
}

// Helper for record keys
#[inline(always)]
pub fn key_of_type<T: 'static>() -> Key {
    Key::Unnamed(Shape::record::<T>())
}
