//! Fulfillment tracking between declared requirements and available bindings.
//!
//! Requirements and bindings arrive in any order, so the checker keeps two
//! monotonically growing views: what is still outstanding and what has been
//! bound. [`FulfillmentChecker::reconcile`] runs once after every factory has
//! produced its value and clears anything a late binding satisfies.

use std::collections::{HashMap, HashSet};

use crate::capabilities::CapabilityRegistry;
use crate::descriptors::Requirement;
use crate::error::UnmetRequirement;
use crate::key::{Key, Shape};

#[derive(Default)]
pub(crate) struct FulfillmentChecker {
    /// Outstanding unnamed record requirements, with the first declaring owner
    unmet_records: HashMap<Shape, Shape>,
    unmet_capabilities: HashMap<Shape, Shape>,
    unmet_named: HashMap<String, Shape>,

    named: HashMap<String, Shape>,
    unnamed: Vec<Shape>,
    unnamed_seen: HashSet<Shape>,
}

impl FulfillmentChecker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records each requirement as outstanding unless something already meets it.
    pub(crate) fn declare_requirements(&mut self, requirements: &[Requirement], caps: &CapabilityRegistry) {
        for req in requirements {
            match &req.key {
                Key::Named(name) => {
                    if !self.named.contains_key(name) {
                        self.unmet_named.entry(name.clone()).or_insert(req.owner);
                    }
                }
                Key::Unnamed(target) if target.is_capability() => {
                    if !self.capability_met(*target, caps) {
                        self.unmet_capabilities.entry(*target).or_insert(req.owner);
                    }
                }
                Key::Unnamed(target) => {
                    if !self.unnamed_seen.contains(target) {
                        self.unmet_records.entry(*target).or_insert(req.owner);
                    }
                }
            }
        }
    }

    /// Marks an unnamed shape as available. The first registration wins.
    pub(crate) fn register_binding(&mut self, shape: Shape, caps: &CapabilityRegistry) {
        if self.unnamed_seen.insert(shape) {
            self.unnamed.push(shape);
        }
        self.unmet_records.remove(&shape);
        self.unmet_capabilities
            .retain(|capability, _| !caps.satisfies(shape, *capability));
    }

    /// Marks a name as available. The first registration wins.
    pub(crate) fn register_named(&mut self, name: &str, shape: Shape) {
        self.named.entry(name.to_string()).or_insert(shape);
        self.unmet_named.remove(name);
    }

    /// Re-checks outstanding requirements against every known binding.
    pub(crate) fn reconcile(&mut self, caps: &CapabilityRegistry) {
        if !self.unmet_records.is_empty() || !self.unmet_capabilities.is_empty() {
            for shape in self.unnamed.clone() {
                self.register_binding(shape, caps);
            }
        }
        if !self.unmet_named.is_empty() {
            let named = &self.named;
            self.unmet_named.retain(|name, _| !named.contains_key(name));
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.unmet_records.is_empty() && self.unmet_capabilities.is_empty() && self.unmet_named.is_empty()
    }

    /// Every outstanding requirement, named ones first, sorted for stable diagnostics.
    pub(crate) fn unmet(&self) -> Vec<UnmetRequirement> {
        let mut named: Vec<_> = self
            .unmet_named
            .iter()
            .map(|(name, owner)| UnmetRequirement {
                owner: owner.name(),
                requirement: name.clone(),
                named: true,
            })
            .collect();
        let mut unnamed: Vec<_> = self
            .unmet_capabilities
            .iter()
            .chain(self.unmet_records.iter())
            .map(|(shape, owner)| UnmetRequirement {
                owner: owner.name(),
                requirement: shape.name().to_string(),
                named: false,
            })
            .collect();
        named.sort_by(|a, b| (a.owner, &a.requirement).cmp(&(b.owner, &b.requirement)));
        unnamed.sort_by(|a, b| (a.owner, &a.requirement).cmp(&(b.owner, &b.requirement)));
        named.extend(unnamed);
        named
    }

    fn capability_met(&self, capability: Shape, caps: &CapabilityRegistry) -> bool {
        self.unnamed.iter().any(|shape| caps.satisfies(*shape, capability))
    }
}
