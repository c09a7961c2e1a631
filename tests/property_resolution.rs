/// Property-based tests for population
///
/// A fixed DAG of record types must wire completely and initialize
/// dependencies before dependents, whatever order the records arrive in.

use ferrous_inject::{BoxError, Container, Dependencies, DiError, Initialize, Inject, Injectable};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<&'static str>>>;

macro_rules! node {
    ($name:ident $(, $field:ident : $dep:ident)*) => {
        struct $name {
            $($field: Inject<$dep>,)*
            log: Log,
        }

        impl $name {
            fn boxed(log: &Log) -> Arc<Self> {
                Arc::new(Self { $($field: Inject::new(),)* log: log.clone() })
            }

            #[allow(dead_code)]
            fn wired(&self) -> bool {
                true $(&& self.$field.is_filled())*
            }
        }

        impl Injectable for $name {
            fn describe(&self, _deps: &mut Dependencies) {
                $(_deps.inject(stringify!($field), &self.$field);)*
            }

            fn as_initialize(&self) -> Option<&dyn Initialize> {
                Some(self)
            }
        }

        impl Initialize for $name {
            fn initialize(&self) -> Result<(), BoxError> {
                self.log.lock().unwrap().push(stringify!($name));
                Ok(())
            }
        }
    };
}

node!(N0);
node!(N1, n0: N0);
node!(N2, n0: N0, n1: N1);
node!(N3, n1: N1);
node!(N4, n2: N2, n3: N3);
node!(N5, n4: N4, n0: N0);

const EDGES: &[(&str, &str)] = &[
    ("N1", "N0"),
    ("N2", "N0"),
    ("N2", "N1"),
    ("N3", "N1"),
    ("N4", "N2"),
    ("N4", "N3"),
    ("N5", "N4"),
    ("N5", "N0"),
];

proptest! {
    #[test]
    fn dag_wires_and_initializes_in_dependency_order(
        order in Just((0usize..6).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let log: Log = Arc::default();
        let (n0, n1, n2) = (N0::boxed(&log), N1::boxed(&log), N2::boxed(&log));
        let (n3, n4, n5) = (N3::boxed(&log), N4::boxed(&log), N5::boxed(&log));

        let mut container = Container::new();
        for &index in &order {
            let provided = match index {
                0 => container.provide(n0.clone()).map(|_| ()),
                1 => container.provide(n1.clone()).map(|_| ()),
                2 => container.provide(n2.clone()).map(|_| ()),
                3 => container.provide(n3.clone()).map(|_| ()),
                4 => container.provide(n4.clone()).map(|_| ()),
                _ => container.provide(n5.clone()).map(|_| ()),
            };
            provided.unwrap();
        }
        container.populate().unwrap();

        prop_assert!(n1.wired() && n2.wired() && n3.wired() && n4.wired() && n5.wired());
        prop_assert!(Arc::ptr_eq(n5.n4.get().unwrap(), &n4));
        prop_assert!(Arc::ptr_eq(n4.n2.n0.get().unwrap(), &n0));

        let log = log.lock().unwrap();
        prop_assert_eq!(log.len(), 6);
        let position = |name: &str| log.iter().position(|x| *x == name).unwrap();
        for &(dependent, dependency) in EDGES {
            prop_assert!(position(dependency) < position(dependent));
        }
    }
}

/// Record requiring other records of its own type by name.
struct Unit {
    next: Inject<Unit>,
}

impl Injectable for Unit {
    fn describe(&self, deps: &mut Dependencies) {
        deps.inject_named("next", "next", &self.next);
    }
}

proptest! {
    #[test]
    fn self_typed_requirement_is_always_circular(count in 1usize..6, named_first in any::<bool>()) {
        // Cycles are detected per shape, so Unit -> Unit is a cycle no
        // matter how many instances or names are involved.
        let mut container = Container::new();
        for i in 0..count {
            let unit = Arc::new(Unit { next: Inject::new() });
            if named_first && i == 0 {
                container.provide_named("next", unit).unwrap();
            } else {
                container.provide(unit).unwrap();
            }
        }
        if !named_first {
            container.provide_named("next", Arc::new(Unit { next: Inject::new() })).unwrap();
        }

        match container.populate() {
            Err(DiError::Circular(path)) => {
                prop_assert_eq!(path.len(), 2);
                prop_assert_eq!(path[0], path[1]);
            }
            other => prop_assert!(false, "expected Circular, got {:?}", other),
        }
    }
}
