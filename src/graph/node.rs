//! Graph node: one bound instance and its declared requirements.

use crate::descriptors::{BindingDescriptor, Requirement};
use crate::key::Key;
use crate::registration::Binding;

pub(crate) type NodeId = usize;

/// Pending while any requirement is unsatisfied, complete afterwards.
pub(crate) struct Node {
    pub(crate) binding: Binding,
    /// Every key the instance was registered under
    pub(crate) keys: Vec<Key>,
    pub(crate) requirements: Vec<Requirement>,
    unfulfilled: usize,
    pub(crate) scheduled: bool,
}

impl Node {
    pub(crate) fn new(key: Key, binding: Binding, requirements: Vec<Requirement>) -> Self {
        Self {
            binding,
            keys: vec![key],
            unfulfilled: requirements.len(),
            requirements,
            scheduled: false,
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.unfulfilled == 0
    }

    /// Marks requirement `index` satisfied and returns whether the node is now complete.
    pub(crate) fn satisfy(&mut self, index: usize) -> bool {
        let req = &mut self.requirements[index];
        debug_assert!(!req.satisfied, "{}.{} satisfied twice", req.owner, req.field);
        if !req.satisfied {
            req.satisfied = true;
            self.unfulfilled -= 1;
        }
        self.is_complete()
    }

    pub(crate) fn descriptor(&self) -> BindingDescriptor {
        BindingDescriptor {
            keys: self.keys.clone(),
            shape: self.binding.shape.name(),
            requirements: self.requirements.iter().map(Into::into).collect(),
            complete: self.is_complete(),
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("shape", &self.binding.shape.name())
            .field("requirements", &self.requirements)
            .field("complete", &self.is_complete())
            .finish()
    }
}
