//! Circular dependency detection over the static requirement graph.

use std::collections::{HashMap, HashSet};

use crate::descriptors::Requirement;
use crate::key::Shape;

/// Record shape -> record shapes it requires, in declaration order.
///
/// Capability requirements are left out: they are matched by
/// implementation, not by concrete identity.
#[derive(Default)]
pub(crate) struct CycleDetector {
    deps: HashMap<Shape, Vec<Shape>>,
    order: Vec<Shape>,
}

impl CycleDetector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds the record-typed dependencies of one instance to its shape's entry.
    ///
    /// Instances of one shape may declare different fields; the entry is the
    /// union of all of them.
    pub(crate) fn track(&mut self, shape: Shape, requirements: &[Requirement]) {
        let targets = self.deps.entry(shape).or_insert_with(|| {
            self.order.push(shape);
            Vec::new()
        });
        for req in requirements {
            if !req.target.is_capability() && !targets.contains(&req.target) {
                targets.push(req.target);
            }
        }
    }

    /// Depth-first search from every tracked shape.
    ///
    /// Returns the cyclic path, e.g. `[A, B, A]`, or None if the graph is acyclic.
    pub(crate) fn detect_cycle(&self) -> Option<Vec<Shape>> {
        let mut cleared = HashSet::new();
        let mut path = Vec::new();
        for root in &self.order {
            if let Some(cycle) = self.visit(*root, &mut path, &mut cleared) {
                return Some(cycle);
            }
        }
        None
    }

    fn visit(&self, shape: Shape, path: &mut Vec<Shape>, cleared: &mut HashSet<Shape>) -> Option<Vec<Shape>> {
        if cleared.contains(&shape) {
            return None;
        }
        path.push(shape);
        if let Some(targets) = self.deps.get(&shape) {
            for target in targets {
                if let Some(start) = path.iter().position(|s| s == target) {
                    let mut cycle = path[start..].to_vec();
                    cycle.push(*target);
                    return Some(cycle);
                }
                if let Some(cycle) = self.visit(*target, path, cleared) {
                    return Some(cycle);
                }
            }
        }
        path.pop();
        // Every path below `shape` is acyclic; later roots can skip it.
        cleared.insert(shape);
        None
    }
}

/// Names of a cyclic path, for [`DiError::Circular`](crate::DiError::Circular).
pub(crate) fn path_names(path: &[Shape]) -> Vec<&'static str> {
    path.iter().map(|s| s.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::Dependencies;
    use crate::inject::Inject;
    use crate::traits::Injectable;

    trait Port: Send + Sync {}

    macro_rules! record {
        ($name:ident $(, $field:ident : $dep:ty)*) => {
            #[allow(dead_code)]
            struct $name { $($field: Inject<$dep>,)* }
            impl Injectable for $name {
                fn describe(&self, _deps: &mut Dependencies) {
                    $(_deps.inject(stringify!($field), &self.$field);)*
                }
            }
            impl $name {
                fn requirements() -> Vec<Requirement> {
                    let value = $name { $($field: Inject::new(),)* };
                    Dependencies::scan(&value).unwrap()
                }
            }
        };
    }

    record!(A, b: B);
    record!(B, a: A);
    record!(Loop, next: Loop);
    record!(Top, mid: Mid, leaf: Leaf);
    record!(Mid, leaf: Leaf);
    record!(Leaf);

    struct UsesPort {
        port: Inject<dyn Port>,
    }

    impl Injectable for UsesPort {
        fn describe(&self, deps: &mut Dependencies) {
            deps.capability("port", &self.port);
        }
    }

    #[test]
    fn two_node_cycle_reports_full_path() {
        let mut detector = CycleDetector::new();
        detector.track(Shape::record::<A>(), &A::requirements());
        detector.track(Shape::record::<B>(), &B::requirements());

        let cycle = detector.detect_cycle().unwrap();
        assert_eq!(cycle, vec![Shape::record::<A>(), Shape::record::<B>(), Shape::record::<A>()]);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let mut detector = CycleDetector::new();
        detector.track(Shape::record::<Loop>(), &Loop::requirements());

        let cycle = detector.detect_cycle().unwrap();
        assert_eq!(path_names(&cycle).len(), 2);
        assert!(path_names(&cycle).iter().all(|n| n.ends_with("Loop")));
    }

    #[test]
    fn diamond_is_acyclic() {
        let mut detector = CycleDetector::new();
        detector.track(Shape::record::<Top>(), &Top::requirements());
        detector.track(Shape::record::<Mid>(), &Mid::requirements());
        detector.track(Shape::record::<Leaf>(), &Leaf::requirements());

        assert!(detector.detect_cycle().is_none());
    }

    #[test]
    fn capability_requirements_are_ignored() {
        let port = UsesPort { port: Inject::new() };
        let mut detector = CycleDetector::new();
        detector.track(Shape::record::<UsesPort>(), &Dependencies::scan(&port).unwrap());

        assert!(detector.deps[&Shape::record::<UsesPort>()].is_empty());
        assert!(detector.detect_cycle().is_none());
    }

    #[test]
    fn tracking_a_shape_twice_merges_targets() {
        let mut detector = CycleDetector::new();
        detector.track(Shape::record::<Mid>(), &[]);
        detector.track(Shape::record::<Mid>(), &Mid::requirements());
        detector.track(Shape::record::<Mid>(), &Mid::requirements());

        assert_eq!(detector.order.len(), 1);
        assert_eq!(detector.deps[&Shape::record::<Mid>()], vec![Shape::record::<Leaf>()]);
    }
}
