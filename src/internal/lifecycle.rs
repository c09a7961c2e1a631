//! Ordered lifecycle record for initialize and close hooks.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{DiError, DiResult, LifecycleFailure, LifecyclePhase};
use crate::observer::Observers;
use crate::traits::Injectable;

struct Entry {
    shape: &'static str,
    object: Arc<dyn Injectable>,
}

/// Objects with lifecycle hooks, in the order they became complete.
///
/// Initialization walks the record forward, close walks it in reverse (LIFO).
/// Scheduling is deduplicated by instance identity.
#[derive(Default)]
pub(crate) struct LifecycleRecord {
    entries: Vec<Entry>,
    seen: HashSet<usize>,
    /// Entries before this index have been initialized
    initialized: usize,
    closed: bool,
}

impl LifecycleRecord {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Schedules a record instance once.
    ///
    /// Returns false for capability values (no object) and for identities
    /// already scheduled. A capability bound to the same allocation as a
    /// record does not claim the identity.
    pub(crate) fn schedule(&mut self, identity: usize, shape: &'static str, object: Option<&Arc<dyn Injectable>>) -> bool {
        let Some(object) = object else {
            return false;
        };
        if !self.seen.insert(identity) {
            return false;
        }
        if object.as_initialize().is_some() || object.as_close().is_some() {
            tracing::trace!(shape, position = self.entries.len(), "scheduled for lifecycle");
            self.entries.push(Entry {
                shape,
                object: object.clone(),
            });
        }
        true
    }

    /// Runs initialize on every entry scheduled since the last call, stopping at the first failure.
    pub(crate) fn initialize_pending(&mut self, observers: &Observers) -> DiResult<()> {
        while self.initialized < self.entries.len() {
            let entry = &self.entries[self.initialized];
            if let Some(hook) = entry.object.as_initialize() {
                if let Err(err) = hook.initialize() {
                    tracing::error!(object = entry.shape, error = %err, "initialize failed");
                    return Err(DiError::Lifecycle {
                        phase: LifecyclePhase::Initialize,
                        failures: vec![LifecycleFailure {
                            object: entry.shape,
                            source: Arc::from(err),
                        }],
                    });
                }
                observers.initialized(entry.shape);
            }
            self.initialized += 1;
        }
        Ok(())
    }

    /// Runs close on every entry in reverse order. Failures do not stop the walk.
    pub(crate) fn close_all_reverse(&mut self, observers: &Observers) -> DiResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut failures = Vec::new();
        for entry in self.entries.iter().rev() {
            let Some(hook) = entry.object.as_close() else {
                continue;
            };
            match hook.close() {
                Ok(()) => observers.closed(entry.shape),
                Err(err) => {
                    tracing::warn!(object = entry.shape, error = %err, "close failed");
                    failures.push(LifecycleFailure {
                        object: entry.shape,
                        source: Arc::from(err),
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DiError::Lifecycle {
                phase: LifecyclePhase::Close,
                failures,
            })
        }
    }

    pub(crate) fn shapes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.shape)
    }
}
