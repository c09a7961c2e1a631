//! Diagnostic observers for population and lifecycle events.
//!
//! Observers are called synchronously from `Container::populate` and
//! `Container::close`. Keep implementations lightweight.

use std::sync::Arc;

use crate::key::Key;

/// Observer trait for container events.
///
/// Every method has an empty default, so an observer only overrides what it
/// cares about.
///
/// # Examples
///
/// ```
/// use ferrous_inject::{Container, DiObserver, Key};
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Default)]
/// struct Wiring {
///     edges: Mutex<Vec<String>>,
/// }
///
/// impl DiObserver for Wiring {
///     fn wired(&self, owner: &'static str, field: &'static str, target: &Key) {
///         self.edges.lock().unwrap().push(format!("{owner}.{field} <- {target}"));
///     }
/// }
///
/// let wiring = Arc::new(Wiring::default());
/// let mut container = Container::new();
/// container.add_observer(wiring.clone());
/// container.populate().unwrap();
/// assert!(wiring.edges.lock().unwrap().is_empty());
/// ```
pub trait DiObserver: Send + Sync {
    /// A binding was registered under `key`.
    fn registered(&self, _key: &Key, _shape: &'static str) {}

    /// A factory was invoked during populate.
    fn factory_invoked(&self, _factory: &str, _label: Option<&str>) {}

    /// A requirement of `owner` was filled with the binding found under `target`.
    fn wired(&self, _owner: &'static str, _field: &'static str, _target: &Key) {}

    fn initialized(&self, _object: &'static str) {}

    fn closed(&self, _object: &'static str) {}
}

/// Container for registered observers.
#[derive(Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn registered(&self, key: &Key, shape: &'static str) {
        for observer in &self.observers {
            observer.registered(key, shape);
        }
    }

    #[inline]
    pub(crate) fn factory_invoked(&self, factory: &str, label: Option<&str>) {
        for observer in &self.observers {
            observer.factory_invoked(factory, label);
        }
    }

    #[inline]
    pub(crate) fn wired(&self, owner: &'static str, field: &'static str, target: &Key) {
        for observer in &self.observers {
            observer.wired(owner, field, target);
        }
    }

    #[inline]
    pub(crate) fn initialized(&self, object: &'static str) {
        for observer in &self.observers {
            observer.initialized(object);
        }
    }

    #[inline]
    pub(crate) fn closed(&self, object: &'static str) {
        for observer in &self.observers {
            observer.closed(object);
        }
    }
}

/// Built-in observer that forwards every event to `tracing`.
///
/// # Examples
///
/// ```
/// use ferrous_inject::{Container, LoggingObserver};
/// use std::sync::Arc;
///
/// let mut container = Container::new();
/// container.add_observer(Arc::new(LoggingObserver::new()));
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self {
            prefix: "ferrous-inject".to_string(),
        }
    }

    /// Creates a logging observer that tags events with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for LoggingObserver {
    fn registered(&self, key: &Key, shape: &'static str) {
        tracing::info!(prefix = %self.prefix, %key, shape, "binding registered");
    }

    fn factory_invoked(&self, factory: &str, label: Option<&str>) {
        tracing::info!(prefix = %self.prefix, factory, label = label.unwrap_or(""), "factory invoked");
    }

    fn wired(&self, owner: &'static str, field: &'static str, target: &Key) {
        tracing::info!(prefix = %self.prefix, owner, field, %target, "field wired");
    }

    fn initialized(&self, object: &'static str) {
        tracing::info!(prefix = %self.prefix, object, "initialized");
    }

    fn closed(&self, object: &'static str) {
        tracing::info!(prefix = %self.prefix, object, "closed");
    }
}
