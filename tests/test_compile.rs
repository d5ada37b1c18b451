//! Input-function compiler tests
//!
//! Covers bundle construction, reclassification of unknowns into
//! parameters, layout stability, and compile-time error surfacing.

use forcing::{Error, Problem, System};

/// dy/dt = u with u driven externally, plus two ordinary parameters
fn plant() -> (System, forcing::Variable, forcing::Variable) {
    let mut sys = System::new("plant");
    let y = sys.unknown("y");
    let u = sys.unknown("u");
    {
        let (y, u) = (y.clone(), u.clone());
        sys.set_rhs(move |_t, _s, p, d| {
            d.set(&y, p.get(&u));
        });
    }
    (sys, y, u)
}

#[test]
fn test_bundle_sequences_are_parallel() {
    let mut sys = System::new("parallel");
    let a = sys.unknown("a");
    let b = sys.unknown("b");
    let u = sys.unknown("u");
    let v = sys.unknown("v");
    {
        let (a, b, u, v) = (a.clone(), b.clone(), u.clone(), v.clone());
        sys.set_rhs(move |_t, _s, p, d| {
            d.set(&a, p.get(&u));
            d.set(&b, p.get(&v));
        });
    }
    let sys = sys.compile(&[u.clone(), v.clone()]).unwrap();
    let bundle = sys.input_functions().unwrap();

    assert_eq!(bundle.len(), 2);
    assert_eq!(bundle.events().len(), 2);
    assert_eq!(bundle.variables().len(), 2);
    assert_eq!(bundle.setters().len(), 2);

    // Index i refers to the same variable in every sequence
    assert_eq!(bundle.index_of(&u), Some(0));
    assert_eq!(bundle.index_of(&v), Some(1));
    assert_eq!(bundle.variable(0), &u);
    assert_eq!(bundle.variable(1), &v);
    assert_ne!(bundle.setter(0).slot(), bundle.setter(1).slot());
    assert_eq!(
        sys.events()[bundle.event(0).0].variable(),
        &u,
        "event 0 must be bound to the first declared input"
    );
}

#[test]
fn test_unknown_is_reclassified_as_parameter() {
    let (sys, y, u) = plant();
    let sys = sys.compile(&[u.clone()]).unwrap();

    assert_eq!(sys.unknowns(), std::slice::from_ref(&y));
    assert!(sys.parameters().contains(&u));
    assert_eq!(sys.state_layout().len(), 1);
    assert_eq!(sys.param_layout().slot_of(&u), Some(0));
}

#[test]
fn test_already_parameter_input_keeps_classification() {
    let mut sys = System::new("param_input");
    let y = sys.unknown("y");
    let u = sys.parameter("u");
    {
        let (y, u) = (y.clone(), u.clone());
        sys.set_rhs(move |_t, _s, p, d| {
            d.set(&y, p.get(&u));
        });
    }
    let sys = sys.compile(&[u.clone()]).unwrap();
    assert_eq!(sys.parameters(), std::slice::from_ref(&u));
    assert!(sys.input_functions().is_some());
}

#[test]
fn test_missing_default_becomes_zero() {
    let (sys, _y, u) = plant();
    let sys = sys.compile(&[u.clone()]).unwrap();
    assert_eq!(sys.default_of(&u), Some(0.0));
}

#[test]
fn test_explicit_default_is_preserved() {
    let (mut sys, _y, u) = plant();
    sys.set_default(&u, 4.5);
    let sys = sys.compile(&[u.clone()]).unwrap();
    assert_eq!(sys.default_of(&u), Some(4.5));
}

#[test]
fn test_preexisting_parameters_keep_their_slots() {
    let mut sys = System::new("slots");
    let y = sys.unknown("y");
    let k = sys.parameter("k");
    let c = sys.parameter("c");
    let u = sys.unknown("u");
    {
        let (y, k, c, u) = (y.clone(), k.clone(), c.clone(), u.clone());
        sys.set_rhs(move |_t, s, p, d| {
            d.set(&y, p.get(&k) * s.get(&y) + p.get(&c) + p.get(&u));
        });
    }
    let sys = sys.compile(&[u.clone()]).unwrap();

    // Pre-existing parameters first, inputs appended after
    assert_eq!(sys.param_layout().slot_of(&k), Some(0));
    assert_eq!(sys.param_layout().slot_of(&c), Some(1));
    assert_eq!(sys.param_layout().slot_of(&u), Some(2));
}

#[test]
fn test_preexisting_events_keep_their_ids() {
    let (mut sys, _y, u) = plant();
    let w = sys.parameter("w");
    let first = sys.add_event(&w);
    let sys = sys.compile(&[u.clone()]).unwrap();

    assert_eq!(first.0, 0);
    assert_eq!(sys.events()[0].variable(), &w);
    let bundle = sys.input_functions().unwrap();
    assert_eq!(bundle.event(0).0, 1, "input event appended after existing");
    assert!(sys.events().iter().all(|e| e.is_placeholder()));
}

#[test]
fn test_duplicate_inputs_collapse() {
    let (sys, _y, u) = plant();
    let sys = sys.compile(&[u.clone(), u.clone()]).unwrap();
    assert_eq!(sys.input_functions().unwrap().len(), 1);
}

#[test]
fn test_empty_input_list_compiles_without_bundle() {
    let mut sys = System::new("plain");
    let y = sys.unknown("y");
    {
        let y = y.clone();
        sys.set_rhs(move |_t, s, _p, d| {
            d.set(&y, -s.get(&y));
        });
    }
    let sys = sys.compile(&[]).unwrap();
    assert!(sys.input_functions().is_none());

    let problem = Problem::new(sys, (0.0, 1.0)).unwrap();
    assert!(problem.input_functions().is_none());
}

#[test]
fn test_foreign_variable_is_rejected() {
    let (sys, _y, _u) = plant();
    let mut other = System::new("other");
    let z = other.unknown("z");
    let err = sys.compile(&[z]).unwrap_err();
    assert!(matches!(err, Error::UnknownVariable { .. }));
}

#[test]
fn test_uncompiled_system_is_rejected_by_problem() {
    let (sys, _y, _u) = plant();
    let err = Problem::new(sys, (0.0, 1.0)).unwrap_err();
    assert!(matches!(err, Error::NotCompiled { .. }));
}

#[test]
fn test_reversed_span_is_rejected() {
    let (sys, _y, u) = plant();
    let sys = sys.compile(&[u]).unwrap();
    let err = Problem::new(sys, (1.0, 0.0)).unwrap_err();
    assert!(matches!(err, Error::BadSpan { .. }));
}

#[test]
fn test_bundle_is_shared_not_rebuilt() {
    let (sys, _y, u) = plant();
    let sys = std::sync::Arc::new(sys.compile(&[u]).unwrap());
    let p1 = Problem::new(std::sync::Arc::clone(&sys), (0.0, 1.0)).unwrap();
    let p2 = Problem::new(std::sync::Arc::clone(&sys), (0.0, 2.0)).unwrap();
    assert!(std::sync::Arc::ptr_eq(
        p1.input_functions().unwrap(),
        p2.input_functions().unwrap()
    ));
}
