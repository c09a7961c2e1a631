use ferrous_inject::{Container, Dependencies, DiObserver, Factory, Inject, Injectable, Key, LoggingObserver};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ferrous_inject=trace")))
        .with_test_writer()
        .try_init();
}

struct Config;
impl Injectable for Config {}

struct Server {
    config: Inject<Config>,
    fallback: Inject<Config>,
}

impl Injectable for Server {
    fn describe(&self, deps: &mut Dependencies) {
        deps.inject("config", &self.config)
            .inject_named("fallback", "fallback", &self.fallback);
    }
}

#[derive(Default)]
struct Events {
    registered: Mutex<Vec<Key>>,
    wired: Mutex<Vec<(&'static str, Key)>>,
}

impl DiObserver for Events {
    fn registered(&self, key: &Key, _shape: &'static str) {
        self.registered.lock().unwrap().push(key.clone());
    }

    fn wired(&self, _owner: &'static str, field: &'static str, target: &Key) {
        self.wired.lock().unwrap().push((field, target.clone()));
    }
}

#[test]
fn test_observer_sees_registration_and_wiring() {
    init_tracing();
    let events = Arc::new(Events::default());

    let mut container = Container::new();
    container.add_observer(events.clone());
    container.add_observer(Arc::new(LoggingObserver::with_prefix("observer-test")));

    container.provide(Arc::new(Server { config: Inject::new(), fallback: Inject::new() })).unwrap();
    container.provide(Arc::new(Config)).unwrap();
    container.provide_fn_named("fallback", Factory::new(|| Arc::new(Config))).unwrap();

    // Factory outputs are registered during populate.
    assert_eq!(events.registered.lock().unwrap().len(), 2);

    container.populate().unwrap();

    let registered = events.registered.lock().unwrap();
    assert_eq!(registered.len(), 3);
    assert_eq!(registered[2], Key::named("fallback"));

    let wired = events.wired.lock().unwrap();
    assert_eq!(wired.len(), 2);
    assert_eq!(wired[0].0, "config");
    assert_eq!(wired[1], ("fallback", Key::named("fallback")));
}

#[test]
fn test_logging_observer_with_unmet_requirements() {
    init_tracing();

    let mut container = Container::new();
    container.add_observer(Arc::new(LoggingObserver::default()));
    container.provide(Arc::new(Server { config: Inject::new(), fallback: Inject::new() })).unwrap();

    assert!(container.populate().is_err());
    assert!(container.descriptors().iter().all(|d| !d.complete));
}
