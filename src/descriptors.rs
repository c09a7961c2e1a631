//! Requirement descriptors declared by injectable records, and the
//! introspection view over registered bindings.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::inject::{Inject, SlotWriter};
use crate::key::{Key, Shape};
use crate::traits::Injectable;

/// One injection-marked field of a record.
pub(crate) struct Requirement {
    pub(crate) owner: Shape,
    pub(crate) field: &'static str,
    /// Unnamed requirements are keyed by `target`
    pub(crate) key: Key,
    pub(crate) target: Shape,
    pub(crate) satisfied: bool,
    pub(crate) writer: Arc<dyn SlotWriter>,
}

impl std::fmt::Debug for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}: {}, key: {}, satisfied: {}}}",
            self.field, self.target, self.key, self.satisfied
        )
    }
}

/// Collects the injection-marked fields of one record.
///
/// Passed to [`Injectable::describe`]. Record-typed slots are checked at
/// compile time; capability slots are checked when the record is bound, and
/// a sized type in a capability slot fails with
/// [`DiError::InvalidFieldShape`].
///
/// # Examples
///
/// ```
/// use ferrous_inject::{Dependencies, Inject, Injectable};
///
/// trait Metrics: Send + Sync {}
///
/// struct Store;
/// impl Injectable for Store {}
///
/// struct Handler {
///     primary: Inject<Store>,
///     replica: Inject<Store>,
///     metrics: Inject<dyn Metrics>,
/// }
///
/// impl Injectable for Handler {
///     fn describe(&self, deps: &mut Dependencies) {
///         deps.inject("primary", &self.primary)
///             .inject_named("replica", "replica", &self.replica)
///             .capability("metrics", &self.metrics);
///     }
/// }
/// ```
pub struct Dependencies {
    owner: Shape,
    requirements: Vec<Requirement>,
    error: Option<DiError>,
}

impl Dependencies {
    pub(crate) fn new(owner: Shape) -> Self {
        Self {
            owner,
            requirements: Vec::new(),
            error: None,
        }
    }

    /// Scans a record's declared fields.
    pub(crate) fn scan<T: Injectable>(object: &T) -> DiResult<Vec<Requirement>> {
        let mut deps = Self::new(Shape::record::<T>());
        object.describe(&mut deps);
        deps.finish()
    }

    /// Unnamed record field, matched by exact shape.
    pub fn inject<T: Injectable>(&mut self, field: &'static str, slot: &Inject<T>) -> &mut Self {
        let target = Shape::record::<T>();
        self.push(field, Key::Unnamed(target), target, slot.writer());
        self
    }

    /// Named record field, matched by name.
    pub fn inject_named<T: Injectable>(
        &mut self,
        field: &'static str,
        name: impl Into<String>,
        slot: &Inject<T>,
    ) -> &mut Self {
        self.push(field, Key::Named(name.into()), Shape::record::<T>(), slot.writer());
        self
    }

    /// Unnamed capability field, matched by any binding implementing `C`.
    pub fn capability<C>(&mut self, field: &'static str, slot: &Inject<C>) -> &mut Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let target = Shape::capability::<C>();
        if self.check_capability::<C>(field) {
            self.push(field, Key::Unnamed(target), target, slot.writer());
        }
        self
    }

    /// Named capability field.
    pub fn capability_named<C>(
        &mut self,
        field: &'static str,
        name: impl Into<String>,
        slot: &Inject<C>,
    ) -> &mut Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        if self.check_capability::<C>(field) {
            self.push(field, Key::Named(name.into()), Shape::capability::<C>(), slot.writer());
        }
        self
    }

    fn check_capability<C: ?Sized + 'static>(&mut self, field: &'static str) -> bool {
        if Shape::is_unsized::<C>() {
            return true;
        }
        if self.error.is_none() {
            self.error = Some(DiError::InvalidFieldShape {
                owner: self.owner.name(),
                field,
                shape: std::any::type_name::<C>(),
            });
        }
        false
    }

    fn push(&mut self, field: &'static str, key: Key, target: Shape, writer: Arc<dyn SlotWriter>) {
        self.requirements.push(Requirement {
            owner: self.owner,
            field,
            key,
            target,
            satisfied: false,
            writer,
        });
    }

    pub(crate) fn finish(self) -> DiResult<Vec<Requirement>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.requirements),
        }
    }
}

/// Introspection view of one requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementDescriptor {
    pub field: &'static str,
    pub key: Key,
    pub shape: &'static str,
    pub satisfied: bool,
}

/// Introspection view of one graph node.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{Container, Dependencies, Inject, Injectable};
/// use std::sync::Arc;
///
/// struct Config;
/// impl Injectable for Config {}
///
/// struct App { config: Inject<Config> }
/// impl Injectable for App {
///     fn describe(&self, deps: &mut Dependencies) {
///         deps.inject("config", &self.config);
///     }
/// }
///
/// let mut container = Container::new();
/// container.provide(Arc::new(App { config: Inject::new() })).unwrap();
/// container.provide(Arc::new(Config)).unwrap();
///
/// let before = container.descriptors();
/// let app = before.iter().find(|d| d.shape.ends_with("App")).unwrap();
/// assert!(!app.complete);
/// assert_eq!(app.unsatisfied(), 1);
///
/// container.populate().unwrap();
/// assert!(container.descriptors().iter().all(|d| d.complete));
/// ```
#[derive(Debug, Clone)]
pub struct BindingDescriptor {
    /// Every key this node is registered under
    pub keys: Vec<Key>,
    pub shape: &'static str,
    pub requirements: Vec<RequirementDescriptor>,
    pub complete: bool,
}

impl BindingDescriptor {
    pub fn is_named(&self) -> bool {
        self.keys.iter().any(|k| k.service_name().is_some())
    }

    pub fn unsatisfied(&self) -> usize {
        self.requirements.iter().filter(|r| !r.satisfied).count()
    }
}

impl From<&Requirement> for RequirementDescriptor {
    fn from(req: &Requirement) -> Self {
        Self {
            field: req.field,
            key: req.key.clone(),
            shape: req.target.name(),
            satisfied: req.satisfied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Sink: Send + Sync {}

    struct Leaf;
    impl Injectable for Leaf {}

    struct Owner {
        leaf: Inject<Leaf>,
        named: Inject<Leaf>,
        sink: Inject<dyn Sink>,
    }

    impl Injectable for Owner {
        fn describe(&self, deps: &mut Dependencies) {
            deps.inject("leaf", &self.leaf)
                .inject_named("named", "special", &self.named)
                .capability("sink", &self.sink);
        }
    }

    struct BadOwner {
        count: Inject<u32>,
    }

    impl Injectable for BadOwner {
        fn describe(&self, deps: &mut Dependencies) {
            deps.capability("count", &self.count);
        }
    }

    #[test]
    fn scan_collects_fields_in_declaration_order() {
        let owner = Owner {
            leaf: Inject::new(),
            named: Inject::new(),
            sink: Inject::new(),
        };
        let reqs = Dependencies::scan(&owner).unwrap();

        let fields: Vec<_> = reqs.iter().map(|r| r.field).collect();
        assert_eq!(fields, vec!["leaf", "named", "sink"]);
        assert_eq!(reqs[0].key, Key::Unnamed(Shape::record::<Leaf>()));
        assert_eq!(reqs[1].key.service_name(), Some("special"));
        assert!(reqs[2].target.is_capability());
        assert!(reqs.iter().all(|r| !r.satisfied));
    }

    #[test]
    fn sized_capability_field_is_rejected() {
        let bad = BadOwner { count: Inject::new() };
        match Dependencies::scan(&bad) {
            Err(DiError::InvalidFieldShape { field, shape, .. }) => {
                assert_eq!(field, "count");
                assert_eq!(shape, "u32");
            }
            other => panic!("expected InvalidFieldShape, got {:?}", other.map(|r| r.len())),
        }
    }
}
