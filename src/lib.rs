//! # ferrous-inject
//!
//! Field-injection object graph for Rust: bind pre-built records and
//! factories, then let the container wire every `Inject<T>` field, check the
//! graph before touching it, and drive an ordered initialize/close lifecycle.
//!
//! ## Features
//!
//! - **Fulfillment checking**: every unmet requirement is reported at once, with the record that declared it
//! - **Cycle detection**: concrete dependency cycles are rejected with the full path
//! - **Depth-first wiring**: records can be provided in any order
//! - **Named and unnamed bindings**: by shape, by name, or by capability (`dyn Trait`)
//! - **Ordered lifecycle**: initialize in dependency order, close in reverse
//! - **Labeled factories**: zero-argument providers selected per populate pass
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_inject::{Container, Dependencies, Inject, Injectable};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//! impl Injectable for Database {}
//!
//! struct UserService {
//!     db: Inject<Database>,
//! }
//!
//! impl Injectable for UserService {
//!     fn describe(&self, deps: &mut Dependencies) {
//!         deps.inject("db", &self.db);
//!     }
//! }
//!
//! let users = Arc::new(UserService { db: Inject::new() });
//!
//! let mut container = Container::new();
//! container.provide(users.clone()).unwrap();
//! container
//!     .provide(Arc::new(Database { url: "postgres://localhost".to_string() }))
//!     .unwrap();
//! container.populate().unwrap();
//!
//! assert_eq!(users.db.url, "postgres://localhost");
//! ```
//!
//! ## Capabilities
//!
//! ```rust
//! use ferrous_inject::{Capabilities, Container, Dependencies, Inject, Injectable};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String {
//!         format!("[LOG] {}", message)
//!     }
//! }
//!
//! impl Injectable for ConsoleLogger {
//!     fn capabilities(caps: &mut Capabilities<Self>) {
//!         caps.implements::<dyn Logger>(|this| this as Arc<dyn Logger>);
//!     }
//! }
//!
//! struct Handler {
//!     logger: Inject<dyn Logger>,
//! }
//!
//! impl Injectable for Handler {
//!     fn describe(&self, deps: &mut Dependencies) {
//!         deps.capability("logger", &self.logger);
//!     }
//! }
//!
//! let handler = Arc::new(Handler { logger: Inject::new() });
//!
//! let mut container = Container::new();
//! container.provide(handler.clone()).unwrap();
//! container.provide(Arc::new(ConsoleLogger)).unwrap();
//! container.populate().unwrap();
//!
//! assert_eq!(handler.logger.log("hi"), "[LOG] hi");
//! ```
//!
//! ## Lifecycle
//!
//! Records expose [`Initialize`] and [`Close`] through
//! [`Injectable::as_initialize`] and [`Injectable::as_close`]. A record is
//! initialized once all of its dependencies are, and closed before them.

// Module declarations
pub mod capabilities;
pub mod config;
pub mod container;
pub mod descriptors;
pub mod error;
pub mod inject;
pub mod key;
pub mod observer;
pub mod traits;

// Internal modules
mod fulfillment;
mod graph;
mod internal;
mod registration;

// Re-export core types
pub use capabilities::Capabilities;
pub use config::ContainerConfig;
pub use container::{Container, Factory, FactoryOutput, LabelSelector, Labels};
pub use descriptors::{BindingDescriptor, Dependencies, RequirementDescriptor};
pub use error::{BoxError, DiError, DiResult, LifecycleFailure, LifecyclePhase, SharedError, UnmetRequirement};
pub use inject::{Inject, Receiver};
pub use key::{key_of_type, Key, Shape, ShapeKind};
pub use observer::{DiObserver, LoggingObserver};
pub use traits::{Close, Initialize, Injectable};
