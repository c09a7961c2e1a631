//! Zero-argument factories and label selection.

use std::sync::Arc;

use crate::error::{BoxError, DiError, DiResult};
use crate::inject::Receiver;

/// Result shape of a factory.
///
/// The arity and the "second result is an error" rule are expressed by the
/// implementors: a factory returns a value, a value or an error, or an
/// optional value. An empty `Option` is rejected at invocation time.
pub trait FactoryOutput {
    type Value: ?Sized + Send + Sync + 'static;

    /// Converts the output into the produced value, naming `factory` on failure.
    fn into_value(self, factory: &str) -> DiResult<Arc<Self::Value>>;
}

impl<T: ?Sized + Send + Sync + 'static> FactoryOutput for Arc<T> {
    type Value = T;

    fn into_value(self, _factory: &str) -> DiResult<Arc<T>> {
        Ok(self)
    }
}

impl<T, E> FactoryOutput for Result<Arc<T>, E>
where
    T: ?Sized + Send + Sync + 'static,
    E: Into<BoxError>,
{
    type Value = T;

    fn into_value(self, factory: &str) -> DiResult<Arc<T>> {
        self.map_err(|err| DiError::Factory {
            factory: factory.to_string(),
            source: Arc::from(err.into()),
        })
    }
}

impl<T: ?Sized + Send + Sync + 'static> FactoryOutput for Option<Arc<T>> {
    type Value = T;

    fn into_value(self, factory: &str) -> DiResult<Arc<T>> {
        self.ok_or_else(|| DiError::FactoryShape {
            factory: factory.to_string(),
            reason: "factory produced no value",
        })
    }
}

type Produce<T> = Box<dyn FnOnce(&str) -> DiResult<Arc<T>>>;

/// A provider function run once during `Container::populate`.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{Container, Factory, Injectable, Receiver};
/// use std::sync::Arc;
///
/// struct Pool { size: usize }
/// impl Injectable for Pool {}
///
/// let pool = Receiver::new();
///
/// let mut container = Container::new();
/// container
///     .provide_fn(
///         Factory::new(|| Ok::<_, std::io::Error>(Arc::new(Pool { size: 4 })))
///             .label("db")
///             .receiver(pool.clone()),
///     )
///     .unwrap();
/// container.populate().unwrap();
///
/// assert_eq!(pool.get().unwrap().size, 4);
/// ```
pub struct Factory<T: ?Sized + 'static> {
    pub(crate) description: &'static str,
    pub(crate) label: Option<String>,
    produce: Produce<T>,
    receiver: Option<Receiver<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Factory<T> {
    pub fn new<F, O>(factory: F) -> Self
    where
        F: FnOnce() -> O + 'static,
        O: FactoryOutput<Value = T>,
    {
        Self {
            description: std::any::type_name::<F>(),
            label: None,
            produce: Box::new(move |description| factory().into_value(description)),
            receiver: None,
        }
    }

    /// Runs only when the label is allowed by the selector passed to
    /// `Container::populate_selected`.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Receives the produced value once the factory has run.
    pub fn receiver(mut self, receiver: Receiver<T>) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub(crate) fn invoke(self) -> DiResult<Arc<T>> {
        let value = (self.produce)(self.description)?;
        if let Some(receiver) = &self.receiver {
            receiver.set(value.clone());
        }
        Ok(value)
    }
}

impl<T: ?Sized + 'static> std::fmt::Debug for Factory<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("factory", &self.description)
            .field("label", &self.label)
            .field("receiver", &self.receiver.is_some())
            .finish()
    }
}

/// Decides whether a labeled factory runs during a populate pass.
///
/// Implemented for closures over the label and for [`Labels`].
pub trait LabelSelector {
    fn is_label_allowed(&self, label: &str) -> bool;
}

impl<F: Fn(&str) -> bool> LabelSelector for F {
    fn is_label_allowed(&self, label: &str) -> bool {
        self(label)
    }
}

/// Allow-list of factory labels.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{LabelSelector, Labels};
///
/// let labels = Labels::new(["prod", "metrics"]);
/// assert!(labels.is_label_allowed("prod"));
/// assert!(!labels.is_label_allowed("test"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels(Vec<String>);

impl Labels {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }
}

impl LabelSelector for Labels {
    fn is_label_allowed(&self, label: &str) -> bool {
        self.0.iter().any(|allowed| allowed == label)
    }
}
