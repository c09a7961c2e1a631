//! Capability table: which record shapes implement which capabilities.
//!
//! Rust has no run-time "is `T` assignable to `dyn Trait`" query, so each
//! record declares its capabilities with an explicit upcast when it is
//! bound. The container keeps the resulting {capability -> implementors}
//! table and uses it both for fulfillment checking and for wiring.

use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::key::Shape;
use crate::registration::{erase, AnyArc, Binding};
use crate::traits::Injectable;

type Upcast = Arc<dyn Fn(&AnyArc) -> Option<AnyArc>>;

/// Builder passed to [`Injectable::capabilities`].
///
/// # Examples
///
/// ```
/// use ferrous_inject::{Capabilities, Injectable};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str);
/// }
///
/// trait Flush: Send + Sync {
///     fn flush(&self);
/// }
///
/// struct ConsoleLogger;
///
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) { println!("{}", msg); }
/// }
///
/// impl Flush for ConsoleLogger {
///     fn flush(&self) {}
/// }
///
/// impl Injectable for ConsoleLogger {
///     fn capabilities(caps: &mut Capabilities<Self>) {
///         caps.implements::<dyn Logger>(|this| this as Arc<dyn Logger>)
///             .implements::<dyn Flush>(|this| this as Arc<dyn Flush>);
///     }
/// }
/// ```
pub struct Capabilities<S> {
    entries: Vec<(Shape, Upcast)>,
    _record: PhantomData<fn(S)>,
}

impl<S: Injectable> Capabilities<S> {
    pub(crate) fn collect() -> Vec<(Shape, Upcast)> {
        let mut caps = Self {
            entries: Vec::new(),
            _record: PhantomData,
        };
        S::capabilities(&mut caps);
        caps.entries
    }

    /// Declares that `S` implements capability `C` through `upcast`.
    pub fn implements<C>(&mut self, upcast: fn(Arc<S>) -> Arc<C>) -> &mut Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let erased = move |value: &AnyArc| -> Option<AnyArc> {
            let record = value.downcast_ref::<Arc<S>>()?;
            Some(erase(upcast(record.clone())))
        };
        self.entries.push((Shape::capability::<C>(), Arc::new(erased)));
        self
    }
}

struct Implementor {
    shape: Shape,
    upcast: Upcast,
}

/// Registry of capability implementations, filled as records are bound.
#[derive(Default)]
pub(crate) struct CapabilityRegistry {
    implementors: HashMap<Shape, Vec<Implementor>>,
    registered: HashSet<Shape>,
}

impl CapabilityRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records the capabilities of `T` once per record shape.
    pub(crate) fn register<T: Injectable>(&mut self) {
        let shape = Shape::record::<T>();
        if !self.registered.insert(shape) {
            return;
        }
        for (capability, upcast) in Capabilities::<T>::collect() {
            tracing::trace!(record = shape.name(), capability = capability.name(), "capability registered");
            let list = self.implementors.entry(capability).or_default();
            if list.iter().all(|i| i.shape != shape) {
                list.push(Implementor { shape, upcast });
            }
        }
    }

    /// True if a binding of shape `found` can fill a slot of shape `wanted`.
    pub(crate) fn satisfies(&self, found: Shape, wanted: Shape) -> bool {
        found == wanted || self.implements(found, wanted)
    }

    pub(crate) fn implements(&self, record: Shape, capability: Shape) -> bool {
        self.implementors
            .get(&capability)
            .is_some_and(|list| list.iter().any(|i| i.shape == record))
    }

    /// Value of `binding` viewed as `wanted`, upcasting when needed.
    pub(crate) fn view(&self, binding: &Binding, wanted: Shape) -> Option<AnyArc> {
        if binding.shape == wanted {
            return Some(binding.value.clone());
        }
        self.implementors
            .get(&wanted)?
            .iter()
            .find(|i| i.shape == binding.shape)
            .and_then(|i| (i.upcast)(&binding.value))
    }
}
