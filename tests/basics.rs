use ferrous_inject::{Capabilities, Container, Dependencies, DiError, Inject, Injectable};
use std::sync::Arc;

struct B {
    name: &'static str,
}
impl Injectable for B {}

struct A {
    b: Inject<B>,
}

impl Injectable for A {
    fn describe(&self, deps: &mut Dependencies) {
        deps.inject("b", &self.b);
    }
}

struct NamedA {
    b: Inject<B>,
}

impl Injectable for NamedA {
    fn describe(&self, deps: &mut Dependencies) {
        deps.inject_named("b", "NameB", &self.b);
    }
}

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

struct English;

impl Greeter for English {
    fn greet(&self) -> String {
        "hello".to_string()
    }
}

impl Injectable for English {
    fn capabilities(caps: &mut Capabilities<Self>) {
        caps.implements::<dyn Greeter>(|this| this as Arc<dyn Greeter>);
    }
}

struct Front {
    greeter: Inject<dyn Greeter>,
    formal: Inject<dyn Greeter>,
}

impl Injectable for Front {
    fn describe(&self, deps: &mut Dependencies) {
        deps.capability("greeter", &self.greeter)
            .capability_named("formal", "formal", &self.formal);
    }
}

#[test]
fn test_unnamed_field_points_to_registered_instance() {
    let a = Arc::new(A { b: Inject::new() });
    let b = Arc::new(B { name: "b" });

    let mut container = Container::new();
    container.provide(a.clone()).unwrap();
    container.provide(b.clone()).unwrap();
    container.populate().unwrap();

    assert!(Arc::ptr_eq(a.b.get().unwrap(), &b));
    assert_eq!(a.b.name, "b");
}

#[test]
fn test_registration_order_does_not_matter() {
    let a = Arc::new(A { b: Inject::new() });
    let b = Arc::new(B { name: "late" });

    let mut container = Container::new();
    container.provide(b.clone()).unwrap();
    container.provide(a.clone()).unwrap();
    container.populate().unwrap();

    assert!(Arc::ptr_eq(a.b.get().unwrap(), &b));
}

#[test]
fn test_missing_named_binding_is_unmet() {
    let mut container = Container::new();
    container.provide(Arc::new(NamedA { b: Inject::new() })).unwrap();

    let err = container.populate().unwrap_err();
    match &err {
        DiError::Unmet(unmet) => {
            assert_eq!(unmet.len(), 1);
            assert_eq!(unmet[0].requirement, "NameB");
            assert!(unmet[0].named);
            assert!(unmet[0].owner.ends_with("NamedA"));
        }
        other => panic!("expected Unmet, got {:?}", other),
    }
    assert!(err.to_string().contains("NameB"));
}

#[test]
fn test_named_binding_fills_named_field() {
    let named_a = Arc::new(NamedA { b: Inject::new() });
    let plain = Arc::new(B { name: "plain" });
    let special = Arc::new(B { name: "special" });

    let mut container = Container::new();
    container.provide(named_a.clone()).unwrap();
    container.provide(plain).unwrap();
    container.provide_named("NameB", special.clone()).unwrap();
    container.populate().unwrap();

    assert!(Arc::ptr_eq(named_a.b.get().unwrap(), &special));
    assert_eq!(container.get::<B>().unwrap().name, "plain");
    assert_eq!(container.get_named::<B>("NameB").unwrap().name, "special");
}

#[test]
fn test_capability_fields_wire_to_implementors() {
    let front = Arc::new(Front {
        greeter: Inject::new(),
        formal: Inject::new(),
    });

    let mut container = Container::new();
    container.provide(front.clone()).unwrap();
    container.provide(Arc::new(English)).unwrap();
    container.provide_named("formal", Arc::new(English)).unwrap();
    container.populate().unwrap();

    assert_eq!(front.greeter.greet(), "hello");
    assert_eq!(front.formal.greet(), "hello");
    assert!(!Arc::ptr_eq(front.greeter.get().unwrap(), front.formal.get().unwrap()));
    assert_eq!(container.get_capability::<dyn Greeter>().unwrap().greet(), "hello");
    assert!(container.get_named::<dyn Greeter>("formal").is_some());
}

#[test]
fn test_provided_capability_value_satisfies_field() {
    let front = Arc::new(Front {
        greeter: Inject::new(),
        formal: Inject::new(),
    });
    let greeter: Arc<dyn Greeter> = Arc::new(English);

    let mut container = Container::new();
    container.provide(front.clone()).unwrap();
    container.provide_capability(greeter.clone()).unwrap();
    container.provide_named_capability("formal", greeter.clone()).unwrap();
    container.populate().unwrap();

    assert!(Arc::ptr_eq(front.greeter.get().unwrap(), &greeter));
    assert!(Arc::ptr_eq(front.formal.get().unwrap(), &greeter));
}

#[test]
fn test_missing_capability_is_unmet() {
    let mut container = Container::new();
    container
        .provide(Arc::new(Front {
            greeter: Inject::new(),
            formal: Inject::new(),
        }))
        .unwrap();

    match container.populate() {
        Err(DiError::Unmet(unmet)) => {
            assert_eq!(unmet.len(), 2);
            assert!(unmet[0].named);
            assert!(unmet[1].requirement.contains("Greeter"));
        }
        other => panic!("expected Unmet, got {:?}", other),
    }
}

#[test]
fn test_named_binding_of_wrong_shape_is_type_mismatch() {
    let mut container = Container::new();
    container.provide(Arc::new(NamedA { b: Inject::new() })).unwrap();
    container.provide_named("NameB", Arc::new(English)).unwrap();

    match container.populate() {
        Err(DiError::TypeMismatch { field, expected, found, .. }) => {
            assert_eq!(field, "b");
            assert!(expected.ends_with("B"));
            assert!(found.ends_with("English"));
        }
        other => panic!("expected TypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_sized_capability_binding_is_rejected() {
    let mut container = Container::new();
    let err = container.provide_capability(Arc::new(B { name: "b" })).err().unwrap();
    assert!(matches!(err, DiError::InvalidBindingShape { .. }));
}

#[test]
fn test_sized_capability_field_is_rejected() {
    struct Bad {
        count: Inject<u64>,
    }

    impl Injectable for Bad {
        fn describe(&self, deps: &mut Dependencies) {
            deps.capability("count", &self.count);
        }
    }

    let mut container = Container::new();
    let err = container.provide(Arc::new(Bad { count: Inject::new() })).err().unwrap();
    match err {
        DiError::InvalidFieldShape { owner, field, shape } => {
            assert!(owner.ends_with("Bad"));
            assert_eq!(field, "count");
            assert_eq!(shape, "u64");
        }
        other => panic!("expected InvalidFieldShape, got {:?}", other),
    }
}

#[test]
fn test_duplicate_name_is_rejected() {
    let mut container = Container::new();
    container.provide_named("b", Arc::new(B { name: "one" })).unwrap();

    let err = container.provide_named("b", Arc::new(B { name: "two" })).err().unwrap();
    assert_eq!(err.to_string(), "Duplicate name: b");
}

#[test]
fn test_first_unnamed_binding_wins() {
    let a = Arc::new(A { b: Inject::new() });
    let first = Arc::new(B { name: "first" });
    let second = Arc::new(B { name: "second" });

    let mut container = Container::new();
    container.provide(first.clone()).unwrap();
    container.provide(a.clone()).unwrap();
    container.provide(second).unwrap();
    container.populate().unwrap();

    assert!(Arc::ptr_eq(a.b.get().unwrap(), &first));
    // The shadowed instance is still a node.
    assert_eq!(container.descriptors().len(), 3);
}

#[test]
fn test_same_instance_twice_is_one_node() {
    let b = Arc::new(B { name: "b" });

    let mut container = Container::new();
    container.provide(b.clone()).unwrap();
    container.provide(b.clone()).unwrap();
    container.provide_named("alias", b.clone()).unwrap();

    let descriptors = container.descriptors();
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].keys.len(), 2);
    assert!(descriptors[0].is_named());
}

#[test]
fn test_provide_after_populate_is_resolved_next_time() {
    let mut container = Container::new();
    container.provide(Arc::new(B { name: "b" })).unwrap();
    container.populate().unwrap();

    let a = Arc::new(A { b: Inject::new() });
    container.provide(a.clone()).unwrap();
    assert!(!a.b.is_filled());

    container.populate().unwrap();
    assert_eq!(a.b.name, "b");
}

#[test]
fn test_record_reused_in_second_container_keeps_first_dependency() {
    let a = Arc::new(A { b: Inject::new() });
    let first = Arc::new(B { name: "first" });

    let mut container = Container::new();
    container.provide(a.clone()).unwrap().provide(first.clone()).unwrap();
    container.populate().unwrap();

    let mut other = Container::new();
    other.provide(a.clone()).unwrap().provide(Arc::new(B { name: "second" })).unwrap();
    other.populate().unwrap();

    assert!(Arc::ptr_eq(a.b.get().unwrap(), &first));
    assert!(other.descriptors().iter().all(|d| d.complete));
}

#[test]
fn test_descriptors_report_requirements() {
    let mut container = Container::new();
    container.provide(Arc::new(A { b: Inject::new() })).unwrap();
    container.provide(Arc::new(B { name: "b" })).unwrap();

    let before = container.descriptors();
    assert_eq!(before[0].requirements.len(), 1);
    assert_eq!(before[0].requirements[0].field, "b");
    assert_eq!(before[0].unsatisfied(), 1);
    assert!(before[1].complete);

    container.populate().unwrap();
    assert_eq!(container.descriptors()[0].unsatisfied(), 0);
}
