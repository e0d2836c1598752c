use fieldml::prelude::*;

/// session with one working region and a scalar value type
fn fixture() -> (Session, RegionId, Handle) {
    let mut session = Session::new();
    let region = session.create_region("test", "test.xml");
    let real = session
        .add_object(
            region,
            FieldmlObject::new("real.1d", ObjectPayload::ContinuousType(ContinuousType::scalar())),
        )
        .unwrap();
    (session, region, real)
}

fn add_evaluator(session: &mut Session, region: RegionId, name: &str, evaluator: Evaluator) -> Handle {
    session
        .add_object(region, FieldmlObject::new(name, ObjectPayload::Evaluator(evaluator)))
        .unwrap()
}

fn direct_delegates(session: &Session, handle: Handle) -> HandleSet {
    let mut out = HandleSet::new();
    session.store().evaluator(handle).unwrap().add_delegates(&mut out);
    out
}

#[test]
fn reference_delegates_are_source_plus_bind_values() {
    let (mut session, region, real) = fixture();

    let a = add_evaluator(&mut session, region, "a", Evaluator::constant(real, "1.0"));
    let b = add_evaluator(&mut session, region, "b", Evaluator::constant(real, "2.0"));
    let c = add_evaluator(&mut session, region, "c", Evaluator::constant(real, "3.0"));
    let x = add_evaluator(&mut session, region, "x", Evaluator::argument(real));
    let y = add_evaluator(&mut session, region, "y", Evaluator::argument(real));

    let mut reference = Evaluator::reference(real, a);
    reference.bind(x, Some(b));
    reference.bind(y, Some(c));
    let reference = add_evaluator(&mut session, region, "ref", reference);

    let delegates = direct_delegates(&session, reference);
    assert_eq!(delegates, [a, b, c].into_iter().collect());
}

#[test]
fn leaf_evaluators_report_no_delegates() {
    let (mut session, region, real) = fixture();

    let nested = add_evaluator(&mut session, region, "nested", Evaluator::argument(real));
    let constant = add_evaluator(&mut session, region, "k", Evaluator::constant(real, "1"));

    let mut argument = Evaluator::argument(real);
    if let EvaluatorKind::Argument(inner) = &mut argument.kind {
        inner.arguments.insert(nested);
    }
    let argument = add_evaluator(&mut session, region, "arg", argument);

    let mut external = Evaluator::external(real);
    if let EvaluatorKind::External(inner) = &mut external.kind {
        inner.arguments.insert(nested);
    }
    let external = add_evaluator(&mut session, region, "ext", external);

    for leaf in [constant, argument, external] {
        let mut out = HandleSet::new();
        let any = session.store().evaluator(leaf).unwrap().add_delegates(&mut out);
        assert!(!any);
        assert!(out.is_empty());
    }
}

#[test]
fn piecewise_delegates_include_index_default_and_binds() {
    let (mut session, region, real) = fixture();

    let elements = session
        .add_object(
            region,
            FieldmlObject::new("elements", ObjectPayload::EnsembleType(EnsembleType::range(1, 4, 1))),
        )
        .unwrap();

    let index = add_evaluator(&mut session, region, "element", Evaluator::argument(elements));
    let case_one = add_evaluator(&mut session, region, "case1", Evaluator::constant(real, "1"));
    let fallback = add_evaluator(&mut session, region, "fallback", Evaluator::constant(real, "0"));
    let x = add_evaluator(&mut session, region, "x", Evaluator::argument(real));
    let supplied = add_evaluator(&mut session, region, "supplied", Evaluator::constant(real, "9"));

    let mut piecewise = Evaluator::piecewise(real, index);
    if let EvaluatorKind::Piecewise(inner) = &mut piecewise.kind {
        inner.evaluators.set(1, Some(case_one));
        inner.evaluators.set_default(Some(fallback));
    }
    piecewise.bind(x, Some(supplied));
    let piecewise = add_evaluator(&mut session, region, "pw", piecewise);

    let delegates = direct_delegates(&session, piecewise);
    assert_eq!(delegates, [case_one, fallback, index, supplied].into_iter().collect());
}

#[test]
fn parameter_delegates_are_the_layout_indexes() {
    let (mut session, region, real) = fixture();

    let elements = session
        .add_object(
            region,
            FieldmlObject::new("elements", ObjectPayload::EnsembleType(EnsembleType::range(1, 8, 1))),
        )
        .unwrap();
    let element = add_evaluator(&mut session, region, "element", Evaluator::argument(elements));
    let node = add_evaluator(&mut session, region, "node", Evaluator::argument(elements));

    let mut parameter = Evaluator::parameter(real);
    if let EvaluatorKind::Parameter(inner) = &mut parameter.kind {
        inner.description = DataDescription::DenseArray {
            data: None,
            dense_indexes: vec![element, node],
        };
    }
    let parameter = add_evaluator(&mut session, region, "params", parameter);

    let delegates = direct_delegates(&session, parameter);
    assert_eq!(delegates, [element, node].into_iter().collect());
}

#[test]
fn delegate_closure_is_transitive() {
    let (mut session, region, real) = fixture();

    let constant = add_evaluator(&mut session, region, "k", Evaluator::constant(real, "1"));
    let inner = add_evaluator(&mut session, region, "inner", Evaluator::reference(real, constant));
    let outer = add_evaluator(&mut session, region, "outer", Evaluator::reference(real, inner));

    let closure = session.delegate_evaluators(Some(outer)).unwrap();
    assert_eq!(closure, [inner, constant].into_iter().collect());
}

#[test]
fn unset_start_handle_is_a_no_op() {
    let (mut session, ..) = fixture();
    assert!(session.delegate_evaluators(None).unwrap().is_empty());
    assert_eq!(session.last_error_code(), 0);
}

#[test]
fn non_evaluator_start_contributes_nothing() {
    let (mut session, _, real) = fixture();
    assert!(session.delegate_evaluators(Some(real)).unwrap().is_empty());
}

#[test]
fn cyclic_delegates_fail_outright() {
    let (mut session, region, real) = fixture();

    let constant = add_evaluator(&mut session, region, "k", Evaluator::constant(real, "1"));
    let first = add_evaluator(&mut session, region, "first", Evaluator::reference(real, constant));
    let second = add_evaluator(&mut session, region, "second", Evaluator::reference(real, first));

    // close the loop: first now delegates to second
    if let EvaluatorKind::Reference(inner) =
        &mut session.store_mut().evaluator_mut(first).unwrap().kind
    {
        inner.source = second;
    }

    let result = session.delegate_evaluators(Some(first));
    assert!(matches!(result, Err(CoreError::CyclicDelegates(_))));
    assert_eq!(session.last_error_code(), 101);
    assert!(session.error_log().iter().any(|m| m.contains("first")));

    session.clear_errors();
    assert_eq!(session.last_error_code(), 0);
    assert!(session.error_log().is_empty());
}

#[test]
fn diamond_sharing_is_not_a_cycle() {
    let (mut session, region, real) = fixture();

    let elements = session
        .add_object(
            region,
            FieldmlObject::new("elements", ObjectPayload::EnsembleType(EnsembleType::range(1, 2, 1))),
        )
        .unwrap();
    let index = add_evaluator(&mut session, region, "element", Evaluator::argument(elements));

    let shared = add_evaluator(&mut session, region, "shared", Evaluator::constant(real, "1"));
    let left = add_evaluator(&mut session, region, "left", Evaluator::reference(real, shared));
    let right = add_evaluator(&mut session, region, "right", Evaluator::reference(real, shared));

    let mut top = Evaluator::piecewise(real, index);
    if let EvaluatorKind::Piecewise(inner) = &mut top.kind {
        inner.evaluators.set(1, Some(left));
        inner.evaluators.set(2, Some(right));
    }
    let top = add_evaluator(&mut session, region, "top", top);

    // `shared` is reached along both branches; ancestor-only detection
    // accepts the reuse
    let closure = session.delegate_evaluators(Some(top)).unwrap();
    assert_eq!(closure, [left, right, shared, index].into_iter().collect());
}

#[test]
fn bound_argument_is_consumed_and_its_supplier_propagates() {
    let (mut session, region, real) = fixture();

    let x = add_evaluator(&mut session, region, "x", Evaluator::argument(real));
    let y = add_evaluator(&mut session, region, "y", Evaluator::argument(real));

    let mut source = Evaluator::external(real);
    if let EvaluatorKind::External(inner) = &mut source.kind {
        inner.arguments.insert(x);
    }
    let source = add_evaluator(&mut session, region, "source", source);

    let mut reference = Evaluator::reference(real, source);
    reference.bind(x, Some(y));
    let reference = add_evaluator(&mut session, region, "ref", reference);

    let arguments = session.arguments(reference, true).unwrap();
    assert_eq!(arguments.used, [y].into_iter().collect());
    assert_eq!(arguments.unbound, [y].into_iter().collect());
}

#[test]
fn argument_reports_itself_and_its_nested_placeholders() {
    let (mut session, region, real) = fixture();

    let nested = add_evaluator(&mut session, region, "nested", Evaluator::argument(real));
    let mut argument = Evaluator::argument(real);
    if let EvaluatorKind::Argument(inner) = &mut argument.kind {
        inner.arguments.insert(nested);
    }
    let argument = add_evaluator(&mut session, region, "arg", argument);

    let with_self = session.arguments(argument, true).unwrap();
    assert_eq!(with_self.used, [argument, nested].into_iter().collect());
    assert_eq!(with_self.unbound, with_self.used);

    let without_self = session.arguments(argument, false).unwrap();
    assert_eq!(without_self.used, [nested].into_iter().collect());
}

#[test]
fn binding_an_argument_satisfies_its_nested_placeholders() {
    let (mut session, region, real) = fixture();

    let nested = add_evaluator(&mut session, region, "nested", Evaluator::argument(real));
    let mut x = Evaluator::argument(real);
    if let EvaluatorKind::Argument(inner) = &mut x.kind {
        inner.arguments.insert(nested);
    }
    let x = add_evaluator(&mut session, region, "x", x);

    let supplied = add_evaluator(&mut session, region, "supplied", Evaluator::constant(real, "4"));

    let mut reference = Evaluator::reference(real, x);
    reference.bind(x, Some(supplied));
    let reference = add_evaluator(&mut session, region, "ref", reference);

    let arguments = session.arguments(reference, true).unwrap();
    assert!(arguments.unbound.is_empty());
    assert_eq!(arguments.used, [nested].into_iter().collect());
}

#[test]
fn aggregate_index_is_bound_by_the_iteration_itself() {
    let (mut session, region, real) = fixture();

    let components = session
        .add_object(
            region,
            FieldmlObject::new("components", ObjectPayload::EnsembleType(EnsembleType::range(1, 3, 1))),
        )
        .unwrap();
    let component = add_evaluator(&mut session, region, "component", Evaluator::argument(components));
    let value = add_evaluator(&mut session, region, "value", Evaluator::constant(real, "1"));

    let mut aggregate = Evaluator::aggregate(real, component);
    if let EvaluatorKind::Aggregate(inner) = &mut aggregate.kind {
        inner.evaluators.set(1, Some(value));
    }
    let aggregate = add_evaluator(&mut session, region, "agg", aggregate);

    let arguments = session.arguments(aggregate, true).unwrap();
    assert!(arguments.used.contains(&component));
    assert!(!arguments.unbound.contains(&component));
}

#[test]
fn piecewise_index_stays_unbound() {
    let (mut session, region, real) = fixture();

    let elements = session
        .add_object(
            region,
            FieldmlObject::new("elements", ObjectPayload::EnsembleType(EnsembleType::range(1, 4, 1))),
        )
        .unwrap();
    let element = add_evaluator(&mut session, region, "element", Evaluator::argument(elements));
    let value = add_evaluator(&mut session, region, "value", Evaluator::constant(real, "1"));

    let mut piecewise = Evaluator::piecewise(real, element);
    if let EvaluatorKind::Piecewise(inner) = &mut piecewise.kind {
        inner.evaluators.set(1, Some(value));
    }
    let piecewise = add_evaluator(&mut session, region, "pw", piecewise);

    let arguments = session.arguments(piecewise, true).unwrap();
    assert!(arguments.used.contains(&element));
    assert!(arguments.unbound.contains(&element));
}

#[test]
fn parameter_arguments_come_from_its_indexes() {
    let (mut session, region, real) = fixture();

    let elements = session
        .add_object(
            region,
            FieldmlObject::new("elements", ObjectPayload::EnsembleType(EnsembleType::range(1, 8, 1))),
        )
        .unwrap();
    let element = add_evaluator(&mut session, region, "element", Evaluator::argument(elements));

    let mut parameter = Evaluator::parameter(real);
    if let EvaluatorKind::Parameter(inner) = &mut parameter.kind {
        inner.description = DataDescription::DenseArray {
            data: None,
            dense_indexes: vec![element],
        };
    }
    let parameter = add_evaluator(&mut session, region, "params", parameter);

    let arguments = session.arguments(parameter, true).unwrap();
    assert_eq!(arguments.used, [element].into_iter().collect());
    assert_eq!(arguments.unbound, arguments.used);
}

#[test]
fn top_level_validation_flags_unbound_arguments() {
    let (mut session, region, real) = fixture();

    let x = add_evaluator(&mut session, region, "x", Evaluator::argument(real));
    let mut source = Evaluator::external(real);
    if let EvaluatorKind::External(inner) = &mut source.kind {
        inner.arguments.insert(x);
    }
    let source = add_evaluator(&mut session, region, "source", source);

    let unbound_field = add_evaluator(&mut session, region, "unbound", Evaluator::reference(real, source));
    let result = session.validate_top_level(unbound_field);
    assert!(matches!(result, Err(CoreError::UnboundArguments(_))));
    assert_eq!(session.last_error_code(), 102);
    assert!(session.error_log().iter().any(|m| m.contains("x")));

    let supplied = add_evaluator(&mut session, region, "supplied", Evaluator::constant(real, "2"));
    let mut bound = Evaluator::reference(real, source);
    bound.bind(x, Some(supplied));
    let bound_field = add_evaluator(&mut session, region, "bound", bound);
    assert!(session.validate_top_level(bound_field).is_ok());
}

#[test]
fn validation_requires_an_evaluator() {
    let (mut session, _, real) = fixture();
    let result = session.validate_top_level(real);
    assert!(matches!(result, Err(CoreError::WrongObjectKind(_))));
}
