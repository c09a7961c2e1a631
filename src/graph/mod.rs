//! Object graph: depth-first wiring of registered instances.
//!
//! Every bound instance becomes one [`Node`]. Population walks each pending
//! node, resolves the node behind every unsatisfied requirement first, and
//! only then writes that node's value into the requiring slot. A node is
//! scheduled for lifecycle the moment it becomes complete, so the lifecycle
//! record is always in dependency order.

mod node;

use std::collections::HashMap;

use crate::capabilities::CapabilityRegistry;
use crate::descriptors::{BindingDescriptor, Requirement};
use crate::error::{DiError, DiResult};
use crate::inject::Fill;
use crate::internal::LifecycleRecord;
use crate::key::{Key, Shape};
use crate::observer::Observers;
use crate::registration::Binding;

pub(crate) use node::{Node, NodeId};

pub(crate) struct ObjectGraph {
    nodes: Vec<Node>,
    by_instance: HashMap<(usize, Shape), NodeId>,
    /// First registered node per unnamed shape
    unnamed: HashMap<Shape, NodeId>,
    unnamed_order: Vec<NodeId>,
    named: HashMap<String, NodeId>,
    lifecycle: LifecycleRecord,
    max_depth: usize,
}

impl ObjectGraph {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            nodes: Vec::new(),
            by_instance: HashMap::new(),
            unnamed: HashMap::new(),
            unnamed_order: Vec::new(),
            named: HashMap::new(),
            lifecycle: LifecycleRecord::new(),
            max_depth,
        }
    }

    /// Node already holding this instance, if any.
    pub(crate) fn find_instance(&self, binding: &Binding) -> Option<NodeId> {
        self.by_instance.get(&(binding.identity, binding.shape)).copied()
    }

    /// Adds `binding` under `key`.
    ///
    /// `requirements` is only consulted for a new instance; a known instance
    /// gains another key and keeps its node.
    pub(crate) fn insert(&mut self, key: Key, binding: Binding, requirements: Vec<Requirement>) -> NodeId {
        let shape = binding.shape;
        let id = match self.find_instance(&binding) {
            Some(id) => {
                if !self.nodes[id].keys.contains(&key) {
                    self.nodes[id].keys.push(key.clone());
                }
                id
            }
            None => {
                let id = self.nodes.len();
                self.by_instance.insert((binding.identity, shape), id);
                self.nodes.push(Node::new(key.clone(), binding, requirements));
                id
            }
        };

        match &key {
            Key::Named(name) => {
                self.named.entry(name.clone()).or_insert(id);
            }
            Key::Unnamed(_) => match self.unnamed.get(&shape) {
                None => {
                    self.unnamed.insert(shape, id);
                    self.unnamed_order.push(id);
                }
                Some(&winner) if winner != id => {
                    tracing::debug!(shape = shape.name(), "unnamed binding shadowed by earlier registration");
                }
                Some(_) => {}
            },
        }

        if self.nodes[id].is_complete() {
            self.schedule(id);
        }
        id
    }

    /// Resolves every pending node.
    pub(crate) fn populate(&mut self, caps: &CapabilityRegistry, observers: &Observers) -> DiResult<()> {
        let mut chain = Vec::new();
        for id in 0..self.nodes.len() {
            if !self.nodes[id].is_complete() {
                chain.clear();
                self.populate_node(id, &mut chain, caps, observers)?;
            }
        }
        Ok(())
    }

    /// `chain` is the current resolution path; this node is pushed on entry.
    fn populate_node(
        &mut self,
        id: NodeId,
        chain: &mut Vec<&'static str>,
        caps: &CapabilityRegistry,
        observers: &Observers,
    ) -> DiResult<()> {
        let shape = self.nodes[id].binding.shape.name();
        chain.push(shape);
        if chain.len() > self.max_depth + 1 {
            tracing::error!(shape, depth = chain.len() - 1, "resolution depth exceeded");
            return Err(DiError::DepthExceeded {
                max_depth: self.max_depth,
                shape,
                path: std::mem::take(chain),
            });
        }

        for index in 0..self.nodes[id].requirements.len() {
            let req = &self.nodes[id].requirements[index];
            if req.satisfied {
                continue;
            }
            let (owner, field, key, wanted) = (req.owner, req.field, req.key.clone(), req.target);
            let writer = req.writer.clone();

            let target = self
                .find_match(&key, wanted, caps)
                .ok_or_else(|| DiError::NoMatchingProvider {
                    owner: owner.name(),
                    field,
                    requirement: key.to_string(),
                })?;

            if !self.nodes[target].is_complete() {
                self.populate_node(target, chain, caps, observers)?;
            }

            let found = &self.nodes[target].binding;
            let mismatch = || DiError::TypeMismatch {
                owner: owner.name(),
                field,
                expected: wanted.name(),
                found: found.shape.name(),
            };
            let value = caps.view(found, wanted).ok_or_else(mismatch)?;
            match writer.fill(&value) {
                Fill::Mismatch => return Err(mismatch()),
                Fill::Occupied => {
                    tracing::warn!(
                        owner = owner.name(),
                        field,
                        requirement = %key,
                        "field already holds an instance from another container; keeping it"
                    );
                }
                Fill::Written | Fill::AlreadyFilled => {}
            }

            tracing::trace!(owner = owner.name(), field, requirement = %key, "requirement wired");
            observers.wired(owner.name(), field, &key);
            self.nodes[id].satisfy(index);
        }

        chain.pop();
        self.schedule(id);
        Ok(())
    }

    /// Exact key first; for unnamed capabilities, the first complete
    /// implementor and then the first pending one.
    fn find_match(&self, key: &Key, wanted: Shape, caps: &CapabilityRegistry) -> Option<NodeId> {
        match key {
            Key::Named(name) => self.named.get(name).copied(),
            Key::Unnamed(shape) => {
                if let Some(id) = self.unnamed.get(shape) {
                    return Some(*id);
                }
                if !wanted.is_capability() {
                    return None;
                }
                let implementors = || {
                    self.unnamed_order
                        .iter()
                        .copied()
                        .filter(|id| caps.implements(self.nodes[*id].binding.shape, wanted))
                };
                implementors()
                    .find(|id| self.nodes[*id].is_complete())
                    .or_else(|| implementors().next())
            }
        }
    }

    fn schedule(&mut self, id: NodeId) {
        let node = &mut self.nodes[id];
        if node.scheduled || !node.is_complete() {
            return;
        }
        node.scheduled = true;
        let binding = &node.binding;
        if !self.lifecycle.schedule(binding.identity, binding.shape.name(), binding.object.as_ref()) {
            tracing::trace!(shape = binding.shape.name(), "not added to lifecycle");
        }
    }

    pub(crate) fn initialize_pending(&mut self, observers: &Observers) -> DiResult<()> {
        self.lifecycle.initialize_pending(observers)
    }

    pub(crate) fn close(&mut self, observers: &Observers) -> DiResult<()> {
        self.lifecycle.close_all_reverse(observers)
    }

    /// Binding an unnamed or named requirement of shape `wanted` would receive.
    pub(crate) fn lookup(&self, key: &Key, wanted: Shape, caps: &CapabilityRegistry) -> Option<&Binding> {
        self.find_match(key, wanted, caps).map(|id| &self.nodes[id].binding)
    }

    pub(crate) fn named(&self, name: &str) -> Option<&Binding> {
        self.named.get(name).map(|id| &self.nodes[*id].binding)
    }

    pub(crate) fn descriptors(&self) -> Vec<BindingDescriptor> {
        self.nodes.iter().map(Node::descriptor).collect()
    }

    pub(crate) fn lifecycle_order(&self) -> Vec<&'static str> {
        self.lifecycle.shapes().collect()
    }
}
