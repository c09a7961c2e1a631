//! Container: registration surface and the populate/close pipeline.
//!
//! A container owns one fulfillment checker, one cycle detector, one
//! capability table and one object graph. Nothing is shared between
//! containers.

mod factory;

pub use factory::{Factory, FactoryOutput, LabelSelector, Labels};

use std::collections::HashSet;
use std::sync::Arc;

use crate::capabilities::CapabilityRegistry;
use crate::config::ContainerConfig;
use crate::descriptors::{BindingDescriptor, Dependencies, Requirement};
use crate::error::{DiError, DiResult};
use crate::fulfillment::FulfillmentChecker;
use crate::graph::ObjectGraph;
use crate::internal::{path_names, CycleDetector};
use crate::key::{Key, Shape};
use crate::observer::{DiObserver, Observers};
use crate::registration::Binding;
use crate::traits::Injectable;

/// What a factory hands back to the container once it has run.
struct Produced {
    binding: Binding,
    requirements: Vec<Requirement>,
    register_capabilities: fn(&mut CapabilityRegistry),
}

struct PendingFactory {
    name: Option<String>,
    label: Option<String>,
    description: &'static str,
    run: Box<dyn FnOnce() -> DiResult<Produced>>,
}

/// Field-injection container.
///
/// Bindings are provided as `Arc`s (or produced by factories), wired by
/// [`Container::populate`], initialized in dependency order and closed in
/// reverse by [`Container::close`].
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{Container, Dependencies, Inject, Injectable};
/// use std::sync::Arc;
///
/// struct B { name: &'static str }
/// impl Injectable for B {}
///
/// struct A { b: Inject<B> }
/// impl Injectable for A {
///     fn describe(&self, deps: &mut Dependencies) {
///         deps.inject("b", &self.b);
///     }
/// }
///
/// let a = Arc::new(A { b: Inject::new() });
/// let b = Arc::new(B { name: "b" });
///
/// let mut container = Container::new();
/// container.provide(a.clone())?.provide(b.clone())?;
/// container.populate()?;
///
/// assert!(Arc::ptr_eq(a.b.get().unwrap(), &b));
/// assert_eq!(a.b.name, "b");
/// container.close()?;
/// # Ok::<(), ferrous_inject::DiError>(())
/// ```
pub struct Container {
    config: ContainerConfig,
    checker: FulfillmentChecker,
    detector: CycleDetector,
    capabilities: CapabilityRegistry,
    graph: ObjectGraph,
    factories: Vec<PendingFactory>,
    names: HashSet<String>,
    observers: Observers,
}

impl Container {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            graph: ObjectGraph::new(config.max_depth),
            config,
            checker: FulfillmentChecker::new(),
            detector: CycleDetector::new(),
            capabilities: CapabilityRegistry::new(),
            factories: Vec::new(),
            names: HashSet::new(),
            observers: Observers::new(),
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Adds an observer for registration, wiring and lifecycle events.
    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    // ----- Values -----

    /// Binds a record under its own shape.
    ///
    /// If another instance of the same shape is already bound, the earlier
    /// one keeps satisfying unnamed requirements; this one is still wired
    /// and takes part in the lifecycle.
    pub fn provide<T: Injectable>(&mut self, value: Arc<T>) -> DiResult<&mut Self> {
        let requirements = Dependencies::scan(value.as_ref())?;
        self.capabilities.register::<T>();
        let shape = Shape::record::<T>();
        self.bind(Key::Unnamed(shape), Binding::record(value), requirements);
        Ok(self)
    }

    /// Binds a record under `name`.
    pub fn provide_named<T: Injectable>(&mut self, name: impl Into<String>, value: Arc<T>) -> DiResult<&mut Self> {
        let name = self.claim_name(name.into())?;
        let requirements = Dependencies::scan(value.as_ref())?;
        self.capabilities.register::<T>();
        self.names.insert(name.clone());
        self.bind(Key::Named(name), Binding::record(value), requirements);
        Ok(self)
    }

    /// Binds a capability value, e.g. an `Arc<dyn Logger>`.
    ///
    /// `C` must be unsized; anything else fails with
    /// [`DiError::InvalidBindingShape`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_inject::{Container, DiError};
    /// use std::sync::Arc;
    ///
    /// trait Logger: Send + Sync {}
    /// struct Stdout;
    /// impl Logger for Stdout {}
    ///
    /// let mut container = Container::new();
    /// container.provide_capability::<dyn Logger>(Arc::new(Stdout)).unwrap();
    ///
    /// let err = container.provide_capability(Arc::new(7u32)).err().unwrap();
    /// assert!(matches!(err, DiError::InvalidBindingShape { .. }));
    /// ```
    pub fn provide_capability<C>(&mut self, value: Arc<C>) -> DiResult<&mut Self>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        check_capability::<C>()?;
        self.bind(Key::Unnamed(Shape::capability::<C>()), Binding::capability(value), Vec::new());
        Ok(self)
    }

    pub fn provide_named_capability<C>(&mut self, name: impl Into<String>, value: Arc<C>) -> DiResult<&mut Self>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        check_capability::<C>()?;
        let name = self.claim_name(name.into())?;
        self.names.insert(name.clone());
        self.bind(Key::Named(name), Binding::capability(value), Vec::new());
        Ok(self)
    }

    // ----- Factories -----

    /// Registers a factory producing a record. It runs during the next
    /// [`populate`](Container::populate) whose selector allows its label.
    pub fn provide_fn<T: Injectable>(&mut self, factory: Factory<T>) -> DiResult<&mut Self> {
        self.push_factory(None, factory, record_output::<T>);
        Ok(self)
    }

    pub fn provide_fn_named<T: Injectable>(&mut self, name: impl Into<String>, factory: Factory<T>) -> DiResult<&mut Self> {
        let name = self.claim_name(name.into())?;
        self.names.insert(name.clone());
        self.push_factory(Some(name), factory, record_output::<T>);
        Ok(self)
    }

    /// Registers a factory producing a capability value.
    pub fn provide_capability_fn<C>(&mut self, factory: Factory<C>) -> DiResult<&mut Self>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        check_capability::<C>()?;
        self.push_factory(None, factory, capability_output::<C>);
        Ok(self)
    }

    pub fn provide_named_capability_fn<C>(&mut self, name: impl Into<String>, factory: Factory<C>) -> DiResult<&mut Self>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        check_capability::<C>()?;
        let name = self.claim_name(name.into())?;
        self.names.insert(name.clone());
        self.push_factory(Some(name), factory, capability_output::<C>);
        Ok(self)
    }

    // ----- Resolution -----

    /// Runs every pending factory, then checks, wires and initializes the graph.
    pub fn populate(&mut self) -> DiResult<()> {
        self.resolve(None)
    }

    /// Like [`populate`](Container::populate), but labeled factories run only
    /// when `selector` allows their label. Skipped factories stay pending.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_inject::{Container, Factory, Injectable, Receiver};
    /// use std::sync::Arc;
    ///
    /// struct Cache;
    /// impl Injectable for Cache {}
    ///
    /// let cache = Receiver::new();
    /// let mut container = Container::new();
    /// container
    ///     .provide_fn(Factory::new(|| Arc::new(Cache)).label("redis").receiver(cache.clone()))
    ///     .unwrap();
    ///
    /// container.populate_selected(&|label: &str| label == "memory").unwrap();
    /// assert!(cache.get().is_none());
    ///
    /// container.populate().unwrap();
    /// assert!(cache.get().is_some());
    /// ```
    pub fn populate_selected(&mut self, selector: &dyn LabelSelector) -> DiResult<()> {
        self.resolve(Some(selector))
    }

    /// Runs close hooks in reverse initialization order.
    ///
    /// Every hook runs even if an earlier one fails; all failures are
    /// returned together. A second call does nothing.
    pub fn close(&mut self) -> DiResult<()> {
        tracing::debug!("closing container");
        self.graph.close(&self.observers)
    }

    // ----- Lookup -----

    /// The record that satisfies unnamed requirements for `T`.
    pub fn get<T: Injectable>(&self) -> Option<Arc<T>> {
        self.graph
            .lookup(&Key::Unnamed(Shape::record::<T>()), Shape::record::<T>(), &self.capabilities)
            .and_then(|binding| binding.value.downcast_ref::<Arc<T>>().cloned())
    }

    /// The binding registered under `name`, as a record or as a capability it implements.
    pub fn get_named<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let binding = self.graph.named(name)?;
        if let Some(value) = binding.value.downcast_ref::<Arc<T>>() {
            return Some(value.clone());
        }
        let viewed = self.capabilities.view(binding, Shape::capability::<T>())?;
        viewed.downcast_ref::<Arc<T>>().cloned()
    }

    /// The value an unnamed `Inject<C>` field would receive.
    pub fn get_capability<C>(&self) -> Option<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let wanted = Shape::capability::<C>();
        let binding = self.graph.lookup(&Key::Unnamed(wanted), wanted, &self.capabilities)?;
        let viewed = self.capabilities.view(binding, wanted)?;
        viewed.downcast_ref::<Arc<C>>().cloned()
    }

    /// Every graph node, in registration order.
    pub fn descriptors(&self) -> Vec<BindingDescriptor> {
        self.graph.descriptors()
    }

    /// Shapes with lifecycle hooks, in initialization order.
    pub fn lifecycle_order(&self) -> Vec<&'static str> {
        self.graph.lifecycle_order()
    }

    fn resolve(&mut self, selector: Option<&dyn LabelSelector>) -> DiResult<()> {
        self.run_factories(selector)?;

        self.checker.reconcile(&self.capabilities);
        if !self.checker.is_complete() {
            let unmet = self.checker.unmet();
            tracing::error!(count = unmet.len(), "unmet requirements");
            return Err(DiError::Unmet(unmet));
        }

        if let Some(cycle) = self.detector.detect_cycle() {
            let path = path_names(&cycle);
            tracing::error!(path = %path.join(" -> "), "circular dependency");
            return Err(DiError::Circular(path));
        }

        self.graph.populate(&self.capabilities, &self.observers)?;
        self.graph.initialize_pending(&self.observers)
    }

    fn run_factories(&mut self, selector: Option<&dyn LabelSelector>) -> DiResult<()> {
        let mut pending = std::mem::take(&mut self.factories).into_iter();
        let mut skipped = Vec::new();

        while let Some(factory) = pending.next() {
            let allowed = match (factory.label.as_deref(), selector) {
                (Some(label), Some(selector)) => selector.is_label_allowed(label),
                _ => true,
            };
            if !allowed {
                tracing::debug!(factory = factory.description, label = ?factory.label, "factory skipped by label");
                skipped.push(factory);
                continue;
            }

            tracing::debug!(factory = factory.description, label = ?factory.label, "invoking factory");
            self.observers.factory_invoked(factory.description, factory.label.as_deref());

            let produced = match (factory.run)() {
                Ok(produced) => produced,
                Err(err) => {
                    tracing::error!(factory = factory.description, error = %err, "factory failed");
                    skipped.extend(pending);
                    self.factories = skipped;
                    return Err(err);
                }
            };

            (produced.register_capabilities)(&mut self.capabilities);
            let key = match factory.name {
                Some(name) => Key::Named(name),
                None => Key::Unnamed(produced.binding.shape),
            };
            self.bind(key, produced.binding, produced.requirements);
        }

        self.factories = skipped;
        Ok(())
    }

    /// Feeds one binding to the checker, the detector and the graph.
    fn bind(&mut self, key: Key, binding: Binding, requirements: Vec<Requirement>) {
        let shape = binding.shape;
        if self.graph.find_instance(&binding).is_none() {
            self.checker.declare_requirements(&requirements, &self.capabilities);
            if !shape.is_capability() {
                self.detector.track(shape, &requirements);
            }
        }

        match &key {
            Key::Named(name) => self.checker.register_named(name, shape),
            Key::Unnamed(_) => self.checker.register_binding(shape, &self.capabilities),
        }

        self.observers.registered(&key, shape.name());
        let key_text = key.to_string();
        let node = self.graph.insert(key, binding, requirements);
        tracing::debug!(key = %key_text, shape = shape.name(), node, "binding registered");
    }

    fn claim_name(&self, name: String) -> DiResult<String> {
        if self.names.contains(&name) {
            tracing::warn!(name = %name, "duplicate name");
            return Err(DiError::DuplicateName(name));
        }
        Ok(name)
    }

    fn push_factory<T, F>(&mut self, name: Option<String>, factory: Factory<T>, output: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: FnOnce(Arc<T>) -> DiResult<Produced> + 'static,
    {
        self.factories.push(PendingFactory {
            name,
            label: factory.label.clone(),
            description: factory.description,
            run: Box::new(move || output(factory.invoke()?)),
        });
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

fn check_capability<C: ?Sized + 'static>() -> DiResult<()> {
    if Shape::is_unsized::<C>() {
        return Ok(());
    }
    Err(DiError::InvalidBindingShape {
        shape: std::any::type_name::<C>(),
        reason: "capability bindings must be trait objects",
    })
}

fn record_output<T: Injectable>(value: Arc<T>) -> DiResult<Produced> {
    Ok(Produced {
        requirements: Dependencies::scan(value.as_ref())?,
        binding: Binding::record(value),
        register_capabilities: CapabilityRegistry::register::<T>,
    })
}

fn capability_output<C: ?Sized + Send + Sync + 'static>(value: Arc<C>) -> DiResult<Produced> {
    Ok(Produced {
        binding: Binding::capability(value),
        requirements: Vec::new(),
        register_capabilities: |_| {},
    })
}
