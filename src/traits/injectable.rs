//! Binding descriptor trait implemented by every injectable record.

use crate::capabilities::Capabilities;
use crate::descriptors::Dependencies;
use crate::traits::{Close, Initialize};

/// A record that can be bound into a [`Container`](crate::Container).
///
/// Implementations declare, explicitly, what run-time reflection would
/// otherwise discover: which fields are injection slots, which capabilities
/// the record implements, and which lifecycle hooks it exposes. Every method
/// has a default, so a plain leaf record is a one-line impl.
///
/// # Examples
///
/// ```
/// use ferrous_inject::{Capabilities, Container, Dependencies, Inject, Injectable};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// struct FixedClock;
///
/// impl Clock for FixedClock {
///     fn now(&self) -> u64 { 42 }
/// }
///
/// impl Injectable for FixedClock {
///     fn capabilities(caps: &mut Capabilities<Self>) {
///         caps.implements::<dyn Clock>(|this| this as Arc<dyn Clock>);
///     }
/// }
///
/// struct Database;
/// impl Injectable for Database {}
///
/// struct Repository {
///     db: Inject<Database>,
///     clock: Inject<dyn Clock>,
/// }
///
/// impl Injectable for Repository {
///     fn describe(&self, deps: &mut Dependencies) {
///         deps.inject("db", &self.db);
///         deps.capability("clock", &self.clock);
///     }
/// }
///
/// let repo = Arc::new(Repository { db: Inject::new(), clock: Inject::new() });
///
/// let mut container = Container::new();
/// container.provide(repo.clone()).unwrap();
/// container.provide(Arc::new(Database)).unwrap();
/// container.provide(Arc::new(FixedClock)).unwrap();
/// container.populate().unwrap();
///
/// assert_eq!(repo.clock.now(), 42);
/// ```
pub trait Injectable: Send + Sync + 'static {
    /// Declares the record's injection-marked fields.
    ///
    /// Called once per instance. Instances of one type may declare different
    /// fields; cycle detection considers the union for the type.
    fn describe(&self, _deps: &mut Dependencies) {}

    /// Declares the capabilities this record implements.
    fn capabilities(_caps: &mut Capabilities<Self>)
    where
        Self: Sized,
    {
    }

    fn as_initialize(&self) -> Option<&dyn Initialize> {
        None
    }

    fn as_close(&self) -> Option<&dyn Close> {
        None
    }
}
