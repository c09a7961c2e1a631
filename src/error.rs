//! Error types for the injection container.

use std::fmt;
use std::sync::Arc;

/// Boxed error returned by factories and lifecycle hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared form of a user error, kept behind an `Arc` so [`DiError`] stays `Clone`.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Injection errors
///
/// Every condition here is a configuration error: the call that triggered it
/// fails and nothing is retried.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::DiError;
///
/// let circular = DiError::Circular(vec!["A", "B", "A"]);
/// assert_eq!(circular.to_string(), "Circular dependency: A -> B -> A");
///
/// let duplicate = DiError::DuplicateName("primary".to_string());
/// assert_eq!(duplicate.to_string(), "Duplicate name: primary");
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiError {
    /// Value bound in a capability position is not a capability
    #[error("Invalid binding shape: {shape} ({reason})")]
    InvalidBindingShape {
        shape: &'static str,
        reason: &'static str,
    },
    /// Injection-marked field is neither a capability nor a record
    #[error("Invalid field shape: {owner}.{field} has shape {shape}, expected a capability or a record")]
    InvalidFieldShape {
        owner: &'static str,
        field: &'static str,
        shape: &'static str,
    },
    /// Name already registered as a value or a factory
    #[error("Duplicate name: {0}")]
    DuplicateName(String),
    /// Requirements left without a binding after reconciliation
    #[error("Unmet requirements: {}", join(.0))]
    Unmet(Vec<UnmetRequirement>),
    /// A requirement found no node during population
    #[error("No provider for {requirement} required by {owner}.{field}")]
    NoMatchingProvider {
        owner: &'static str,
        field: &'static str,
        requirement: String,
    },
    /// Requirement graph contains a cycle (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<&'static str>),
    /// A factory returned an error
    #[error("Factory {factory} failed: {source}")]
    Factory {
        factory: String,
        #[source]
        source: SharedError,
    },
    /// A factory produced no usable value
    #[error("Factory {factory} has an invalid output: {reason}")]
    FactoryShape {
        factory: String,
        reason: &'static str,
    },
    /// Maximum recursion depth exceeded while resolving `shape`
    #[error("Max depth {max_depth} exceeded resolving {shape}: {}", .path.join(" -> "))]
    DepthExceeded {
        max_depth: usize,
        shape: &'static str,
        /// Resolution chain from the first pending node down to `shape`
        path: Vec<&'static str>,
    },
    /// A binding matched by name cannot be stored in the requiring field
    #[error("Type mismatch for {owner}.{field}: expected {expected}, found {found}")]
    TypeMismatch {
        owner: &'static str,
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    /// Initialize or close hook failed
    #[error("Lifecycle error during {phase}: {}", join(.failures))]
    Lifecycle {
        phase: LifecyclePhase,
        failures: Vec<LifecycleFailure>,
    },
}

/// A requirement nobody provides, with the shape of the record that declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmetRequirement {
    /// Shape of the declaring record
    pub owner: &'static str,
    /// Missing shape or name
    pub requirement: String,
    /// Whether the requirement was declared by name
    pub named: bool,
}

impl fmt::Display for UnmetRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.named {
            write!(f, "({}):{}", self.owner, self.requirement)
        } else {
            write!(f, "({}).{{{}}}", self.owner, self.requirement)
        }
    }
}

/// Which lifecycle operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Initialize,
    Close,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecyclePhase::Initialize => f.write_str("initialize"),
            LifecyclePhase::Close => f.write_str("close"),
        }
    }
}

/// One object's failed lifecycle hook.
#[derive(Debug, Clone)]
pub struct LifecycleFailure {
    /// Shape of the failing object
    pub object: &'static str,
    pub source: SharedError,
}

impl fmt::Display for LifecycleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.object, self.source)
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Result type for injection operations
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{DiResult, DiError};
///
/// fn check(name: &str) -> DiResult<()> {
///     Err(DiError::DuplicateName(name.to_string()))
/// }
///
/// assert!(check("db").is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
