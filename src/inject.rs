//! Injection slots filled by the object graph.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::registration::{identity_of, AnyArc};

/// Injection-marked field.
///
/// An `Inject<T>` starts empty and is filled exactly once during
/// `Container::populate`. `T` is either a record type (`Inject<Database>`)
/// or a capability (`Inject<dyn Logger>`). The owning record declares the
/// slot from [`Injectable::describe`](crate::Injectable::describe).
///
/// Dereferencing an empty slot panics; use [`Inject::get`] before population.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::Inject;
///
/// struct Database;
///
/// let slot: Inject<Database> = Inject::new();
/// assert!(slot.get().is_none());
/// assert!(!slot.is_filled());
/// ```
pub struct Inject<T: ?Sized + 'static> {
    cell: Arc<OnceCell<Arc<T>>>,
}

impl<T: ?Sized + Send + Sync + 'static> Inject<T> {
    pub fn new() -> Self {
        Self {
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// The injected value, or None before population.
    pub fn get(&self) -> Option<&Arc<T>> {
        self.cell.get()
    }

    pub fn is_filled(&self) -> bool {
        self.cell.get().is_some()
    }

    pub(crate) fn writer(&self) -> Arc<dyn SlotWriter> {
        self.cell.clone()
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + Send + Sync + 'static> Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.cell.get() {
            Some(value) => value,
            None => panic!("Inject<{}> read before population", std::any::type_name::<T>()),
        }
    }
}

impl<T: ?Sized + 'static> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inject")
            .field("shape", &std::any::type_name::<T>())
            .field("filled", &self.cell.get().is_some())
            .finish()
    }
}

/// Handle a factory writes its produced value into.
///
/// Clones share the same cell, so the caller keeps one clone and hands
/// another to [`Factory::receiver`](crate::Factory::receiver).
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::Receiver;
///
/// struct Server;
///
/// let receiver: Receiver<Server> = Receiver::new();
/// let handle = receiver.clone();
/// assert!(handle.get().is_none());
/// ```
pub struct Receiver<T: ?Sized + 'static> {
    cell: Arc<OnceCell<Arc<T>>>,
}

impl<T: ?Sized + Send + Sync + 'static> Receiver<T> {
    pub fn new() -> Self {
        Self {
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// The produced value, or None if the factory has not run.
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }

    pub(crate) fn set(&self, value: Arc<T>) {
        // A factory runs at most once, so the cell is empty here.
        let _ = self.cell.set(value);
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for Receiver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + 'static> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

/// Outcome of writing an erased value into a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fill {
    Written,
    /// Slot already holds this same instance (record reached through two keys)
    AlreadyFilled,
    /// Slot holds a different instance, written by another container
    Occupied,
    /// Erased value does not hold an `Arc<T>` for this slot
    Mismatch,
}

/// Type-erased writer into an `Inject<T>` slot.
pub(crate) trait SlotWriter {
    fn fill(&self, value: &AnyArc) -> Fill;
}

impl<T: ?Sized + Send + Sync + 'static> SlotWriter for OnceCell<Arc<T>> {
    fn fill(&self, value: &AnyArc) -> Fill {
        let Some(value) = value.downcast_ref::<Arc<T>>() else {
            return Fill::Mismatch;
        };
        match self.get() {
            Some(existing) if identity_of(existing) == identity_of(value) => Fill::AlreadyFilled,
            Some(_) => Fill::Occupied,
            None => match self.set(value.clone()) {
                Ok(()) => Fill::Written,
                Err(_) => Fill::Occupied,
            },
        }
    }
}
