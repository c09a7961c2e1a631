//! Lifecycle traits for startup and teardown.

use crate::error::BoxError;

/// Trait for objects that need work done once their fields are wired.
///
/// Initialization runs after a successful population, in dependency order:
/// an object is initialized only after everything it requires.
///
/// # Examples
///
/// ```
/// use ferrous_inject::{Initialize, BoxError};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct Pool {
///     warmed: AtomicBool,
/// }
///
/// impl Initialize for Pool {
///     fn initialize(&self) -> Result<(), BoxError> {
///         self.warmed.store(true, Ordering::SeqCst);
///         Ok(())
///     }
/// }
/// ```
pub trait Initialize: Send + Sync {
    fn initialize(&self) -> Result<(), BoxError>;
}

/// Trait for objects that release resources on teardown.
///
/// Close hooks run in exact reverse of initialization order. A failing hook
/// does not stop the remaining ones.
///
/// # Examples
///
/// ```
/// use ferrous_inject::{Close, BoxError};
///
/// struct Connection {
///     url: String,
/// }
///
/// impl Close for Connection {
///     fn close(&self) -> Result<(), BoxError> {
///         println!("closing {}", self.url);
///         Ok(())
///     }
/// }
/// ```
pub trait Close: Send + Sync {
    fn close(&self) -> Result<(), BoxError>;
}
