//! Dynamic Invocation Tests
//!
//! End-to-end tests for the invocation protocol over a small geometry
//! model. Tests validate:
//! - Instance construction through generative and factory constructors
//! - Method calls with positional, named, and defaulted arguments
//! - Property reads and writes through implicit and explicit accessors
//! - Tear-offs, invokers, and invocation replay via delegate
//! - Static and top-level scope dispatch
//! - Error classification for unresolved members and thrown values
//!
//! # Running Tests
//! ```bash
//! cargo test --test invocation_tests
//! ```

use mirra_mirrors::{
    DeclarationMirror, Invocation, ObjectMirror, ObjectRef, ReflectError, Reflector,
    SessionBuilder, Value,
};
use mirra_model::{
    ClassEntity, Const, ConstructorKind, Entity, EntityId, LibraryEntity, MethodEntity,
    MethodKind, ParameterEntity, ProgramModelBuilder, TypeRef, VariableEntity,
};
use rustc_hash::FxHashMap;

struct Fixture {
    reflector: Reflector,
    point: EntityId,
    shape: EntityId,
}

fn no_named() -> FxHashMap<String, Value> {
    FxHashMap::default()
}

/// Library `geometry` with an abstract `Shape`, a `Point` subclass carrying
/// fields, accessors, a constructor pair, and top-level declarations.
fn fixture() -> Fixture {
    let mut builder = ProgramModelBuilder::new();
    let lib = builder.add_library(LibraryEntity::new("geometry", "lib:geometry"));

    let mut shape_class = ClassEntity::new("Shape");
    shape_class.is_abstract = true;
    let shape = builder.add_class(shape_class);
    builder.declare(lib, shape).unwrap();

    let mut point_class = ClassEntity::new("Point");
    point_class.superclass = Some(shape);
    let point = builder.add_class(point_class);
    builder.declare(lib, point).unwrap();

    let x = builder.add(Entity::Variable(VariableEntity::new("x", TypeRef::Dynamic)));
    builder.declare(point, x).unwrap();
    let y = builder.add(Entity::Variable(VariableEntity::new("y", TypeRef::Dynamic)));
    builder.declare(point, y).unwrap();

    let mut counter_var = VariableEntity::new("counter", TypeRef::Dynamic);
    counter_var.is_static = true;
    let counter = builder.add(Entity::Variable(counter_var));
    builder.declare(point, counter).unwrap();

    let ctor = builder.add_method(MethodEntity::new(
        "Point",
        MethodKind::Constructor(ConstructorKind::Generative {
            is_redirecting: false,
            is_const: false,
        }),
        TypeRef::Entity(point),
    ));
    builder.declare(point, ctor).unwrap();
    builder
        .add_parameter(ctor, ParameterEntity::new("x", TypeRef::Dynamic))
        .unwrap();
    builder
        .add_parameter(ctor, ParameterEntity::new("y", TypeRef::Dynamic))
        .unwrap();

    let mut origin_ctor = MethodEntity::new(
        "Point.origin",
        MethodKind::Constructor(ConstructorKind::Factory {
            is_redirecting: false,
            is_const: false,
        }),
        TypeRef::Entity(point),
    );
    origin_ctor.constructor_name = "origin".to_string();
    let origin = builder.add_method(origin_ctor);
    builder.declare(point, origin).unwrap();

    let scale = builder.add_method(MethodEntity::new(
        "scale",
        MethodKind::Regular { is_operator: false },
        TypeRef::Dynamic,
    ));
    builder.declare(point, scale).unwrap();
    builder
        .add_parameter(scale, ParameterEntity::new("factor", TypeRef::Dynamic))
        .unwrap();
    let mut offset = ParameterEntity::new("offset", TypeRef::Dynamic);
    offset.is_named = true;
    offset.is_optional = true;
    offset.has_default_value = true;
    offset.default_value = Some(Const::Int(0));
    builder.add_parameter(scale, offset).unwrap();

    let magnitude = builder.add_method(MethodEntity::new(
        "magnitude",
        MethodKind::Getter,
        TypeRef::Dynamic,
    ));
    builder.declare(point, magnitude).unwrap();

    let explode = builder.add_method(MethodEntity::new(
        "explode",
        MethodKind::Regular { is_operator: false },
        TypeRef::Dynamic,
    ));
    builder.declare(point, explode).unwrap();

    let describe = builder.add_method(MethodEntity::new(
        "describe",
        MethodKind::Regular { is_operator: false },
        TypeRef::Dynamic,
    ));
    builder.declare(lib, describe).unwrap();
    builder
        .add_parameter(describe, ParameterEntity::new("subject", TypeRef::Dynamic))
        .unwrap();

    let mut version_var = VariableEntity::new("version", TypeRef::Dynamic);
    version_var.is_static = true;
    let version = builder.add(Entity::Variable(version_var));
    builder.declare(lib, version).unwrap();

    let model = builder.build().unwrap();

    let reflector = SessionBuilder::new(model)
        .cover_all()
        .set_static(version, Value::Int(3))
        .set_static(counter, Value::Int(0))
        .implement(ctor, |_cx, args| {
            let object = args.receiver_object().expect("constructor receiver");
            object.set_field("x", args.arg(0)).unwrap();
            object.set_field("y", args.arg(1)).unwrap();
            Ok(Value::Null)
        })
        .implement(origin, move |_cx, _args| {
            let object = ObjectRef::new(point, ["x".to_string(), "y".to_string()]);
            object.set_field("x", Value::Int(0)).unwrap();
            object.set_field("y", Value::Int(0)).unwrap();
            Ok(Value::Object(object))
        })
        .implement(scale, |_cx, args| {
            let object = args.receiver_object().expect("scale receiver");
            let x = object.get_field("x").unwrap().as_int().unwrap();
            let factor = args.arg(0).as_int().unwrap();
            let offset = args.named_arg("offset").as_int().unwrap();
            Ok(Value::Int(x * factor + offset))
        })
        .implement(magnitude, |_cx, args| {
            let object = args.receiver_object().expect("magnitude receiver");
            let x = object.get_field("x").unwrap().as_int().unwrap();
            let y = object.get_field("y").unwrap().as_int().unwrap();
            Ok(Value::Int(x + y))
        })
        .implement(explode, |_cx, _args| {
            Err(ReflectError::Thrown(Value::Str("boom".to_string())))
        })
        .implement(describe, |_cx, args| {
            Ok(Value::Str(format!("subject: {}", args.arg(0))))
        })
        .build();

    Fixture {
        reflector,
        point,
        shape,
    }
}

fn new_point(fx: &Fixture, x: i64, y: i64) -> Value {
    fx.reflector
        .class_mirror(fx.point)
        .unwrap()
        .new_instance("", vec![Value::Int(x), Value::Int(y)], no_named())
        .unwrap()
}

// ===== Construction =====

#[test]
fn test_new_instance_initializes_fields() {
    let fx = fixture();
    let p = new_point(&fx, 3, 4);
    let mirror = fx.reflector.reflect(p);
    assert_eq!(mirror.invoke_getter("x").unwrap(), Value::Int(3));
    assert_eq!(mirror.invoke_getter("y").unwrap(), Value::Int(4));
}

#[test]
fn test_new_instance_unknown_constructor() {
    let fx = fixture();
    let err = fx
        .reflector
        .class_mirror(fx.point)
        .unwrap()
        .new_instance("missing", Vec::new(), no_named())
        .unwrap_err();
    assert!(matches!(err, ReflectError::NoSuchConstructor { .. }));
}

#[test]
fn test_new_instance_abstract_class() {
    let fx = fixture();
    let err = fx
        .reflector
        .class_mirror(fx.shape)
        .unwrap()
        .new_instance("", Vec::new(), no_named())
        .unwrap_err();
    assert!(matches!(err, ReflectError::AbstractInstantiation { .. }));
}

#[test]
fn test_factory_constructor_returns_impl_result() {
    let fx = fixture();
    let origin = fx
        .reflector
        .class_mirror(fx.point)
        .unwrap()
        .new_instance("origin", Vec::new(), no_named())
        .unwrap();
    let mirror = fx.reflector.reflect(origin);
    assert_eq!(mirror.invoke_getter("x").unwrap(), Value::Int(0));
}

#[test]
fn test_constructor_arity_checked() {
    let fx = fixture();
    let err = fx
        .reflector
        .class_mirror(fx.point)
        .unwrap()
        .new_instance("", vec![Value::Int(1)], no_named())
        .unwrap_err();
    assert!(matches!(err, ReflectError::NoSuchMember { .. }));
}

// ===== Method Invocation =====

#[test]
fn test_invoke_with_positional_arguments() {
    let fx = fixture();
    let p = new_point(&fx, 5, 0);
    let result = fx
        .reflector
        .reflect(p)
        .invoke("scale", vec![Value::Int(2)], no_named())
        .unwrap();
    assert_eq!(result, Value::Int(10));
}

#[test]
fn test_invoke_with_named_argument() {
    let fx = fixture();
    let p = new_point(&fx, 5, 0);
    let mut named = no_named();
    named.insert("offset".to_string(), Value::Int(7));
    let result = fx
        .reflector
        .reflect(p)
        .invoke("scale", vec![Value::Int(2)], named)
        .unwrap();
    assert_eq!(result, Value::Int(17));
}

#[test]
fn test_omitted_named_argument_gets_default() {
    let fx = fixture();
    let p = new_point(&fx, 4, 0);
    let result = fx
        .reflector
        .reflect(p)
        .invoke("scale", vec![Value::Int(3)], no_named())
        .unwrap();
    assert_eq!(result, Value::Int(12));
}

#[test]
fn test_invoke_arity_mismatch() {
    let fx = fixture();
    let p = new_point(&fx, 1, 2);
    let err = fx
        .reflector
        .reflect(p)
        .invoke("scale", Vec::new(), no_named())
        .unwrap_err();
    assert!(matches!(
        err,
        ReflectError::NoSuchMember { kind: "method", .. }
    ));
}

#[test]
fn test_invoke_unknown_named_argument() {
    let fx = fixture();
    let p = new_point(&fx, 1, 2);
    let mut named = no_named();
    named.insert("stride".to_string(), Value::Int(1));
    let err = fx
        .reflector
        .reflect(p)
        .invoke("scale", vec![Value::Int(2)], named)
        .unwrap_err();
    assert!(matches!(err, ReflectError::NoSuchMember { .. }));
}

#[test]
fn test_invoke_unknown_member() {
    let fx = fixture();
    let p = new_point(&fx, 1, 2);
    let err = fx
        .reflector
        .reflect(p)
        .invoke("translate", Vec::new(), no_named())
        .unwrap_err();
    match err {
        ReflectError::NoSuchMember { target, member, .. } => {
            assert_eq!(target, "geometry.Point");
            assert_eq!(member, "translate");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_invoke_on_getter_name_reads_value() {
    let fx = fixture();
    let p = new_point(&fx, 3, 4);
    let result = fx
        .reflector
        .reflect(p)
        .invoke("magnitude", Vec::new(), no_named())
        .unwrap();
    assert_eq!(result, Value::Int(7));
}

#[test]
fn test_invoke_on_getter_with_args_requires_callable_value() {
    let fx = fixture();
    let p = new_point(&fx, 3, 4);
    let err = fx
        .reflector
        .reflect(p)
        .invoke("magnitude", vec![Value::Int(1)], no_named())
        .unwrap_err();
    assert!(matches!(err, ReflectError::NoSuchMember { .. }));
}

#[test]
fn test_thrown_value_propagates_unchanged() {
    let fx = fixture();
    let p = new_point(&fx, 0, 0);
    let err = fx
        .reflector
        .reflect(p)
        .invoke("explode", Vec::new(), no_named())
        .unwrap_err();
    match err {
        ReflectError::Thrown(value) => assert_eq!(value, Value::Str("boom".to_string())),
        other => panic!("unexpected error: {other:?}"),
    }
}

// ===== Accessors =====

#[test]
fn test_setter_then_getter_observes_write() {
    let fx = fixture();
    let p = new_point(&fx, 1, 2);
    let mirror = fx.reflector.reflect(p);
    let assigned = mirror.invoke_setter("x", Value::Int(42)).unwrap();
    assert_eq!(assigned, Value::Int(42));
    assert_eq!(mirror.invoke_getter("x").unwrap(), Value::Int(42));
}

#[test]
fn test_setter_accepts_trailing_equals_form() {
    let fx = fixture();
    let p = new_point(&fx, 1, 2);
    let mirror = fx.reflector.reflect(p);
    mirror.invoke_setter("y=", Value::Int(9)).unwrap();
    assert_eq!(mirror.invoke_getter("y").unwrap(), Value::Int(9));
}

#[test]
fn test_explicit_getter_runs_registered_impl() {
    let fx = fixture();
    let p = new_point(&fx, 3, 4);
    assert_eq!(
        fx.reflector.reflect(p).invoke_getter("magnitude").unwrap(),
        Value::Int(7)
    );
}

#[test]
fn test_getter_on_unknown_name() {
    let fx = fixture();
    let p = new_point(&fx, 0, 0);
    let err = fx.reflector.reflect(p).invoke_getter("z").unwrap_err();
    assert!(matches!(
        err,
        ReflectError::NoSuchMember { kind: "getter", .. }
    ));
}

#[test]
fn test_writes_are_per_object() {
    let fx = fixture();
    let a = new_point(&fx, 1, 1);
    let b = new_point(&fx, 2, 2);
    fx.reflector
        .reflect(a.clone())
        .invoke_setter("x", Value::Int(100))
        .unwrap();
    assert_eq!(
        fx.reflector.reflect(b).invoke_getter("x").unwrap(),
        Value::Int(2)
    );
    assert_eq!(
        fx.reflector.reflect(a).invoke_getter("x").unwrap(),
        Value::Int(100)
    );
}

// ===== Tear-offs =====

#[test]
fn test_tear_off_binds_receiver() {
    let fx = fixture();
    let p = new_point(&fx, 5, 0);
    let torn = fx.reflector.reflect(p).invoke_getter("scale").unwrap();
    let function = torn.as_function().expect("tear-off is callable").clone();
    assert_eq!(function.name(), "scale");
    let result = function.call(vec![Value::Int(2)], no_named()).unwrap();
    assert_eq!(result, Value::Int(10));
}

#[test]
fn test_tear_off_reports_declaration() {
    let fx = fixture();
    let p = new_point(&fx, 5, 0);
    let torn = fx.reflector.reflect(p).invoke_getter("scale").unwrap();
    let closure = fx.reflector.reflect_closure(torn).unwrap();
    let method = closure.function().unwrap().expect("tear-off declaration");
    assert_eq!(method.simple_name(), "scale");
    assert!(method.is_regular_method());
}

#[test]
fn test_closure_apply_matches_direct_call() {
    let fx = fixture();
    let p = new_point(&fx, 4, 0);
    let direct = fx
        .reflector
        .reflect(p.clone())
        .invoke("scale", vec![Value::Int(3)], no_named())
        .unwrap();
    let torn = fx.reflector.reflect(p).invoke_getter("scale").unwrap();
    let closure = fx.reflector.reflect_closure(torn).unwrap();
    let applied = closure.apply(vec![Value::Int(3)], no_named()).unwrap();
    assert_eq!(direct, applied);
}

// ===== Invokers =====

#[test]
fn test_invoker_matches_invoke_for_methods() {
    let fx = fixture();
    let class = fx.reflector.class_mirror(fx.point).unwrap();
    let invoker = class.invoker("scale").unwrap();
    let p = new_point(&fx, 6, 0);
    let via_invoker = invoker
        .bind(p.clone())
        .call(vec![Value::Int(2)], no_named())
        .unwrap();
    let via_invoke = fx
        .reflector
        .reflect(p)
        .invoke("scale", vec![Value::Int(2)], no_named())
        .unwrap();
    assert_eq!(via_invoker, via_invoke);
}

#[test]
fn test_invoker_matches_invoke_for_getter_like_members() {
    let fx = fixture();
    let class = fx.reflector.class_mirror(fx.point).unwrap();
    let invoker = class.invoker("magnitude").unwrap();
    let p = new_point(&fx, 3, 4);
    let via_get = invoker.bind(p.clone()).get().unwrap();
    let via_call = invoker.bind(p.clone()).call(Vec::new(), no_named()).unwrap();
    let via_invoke = fx
        .reflector
        .reflect(p)
        .invoke("magnitude", Vec::new(), no_named())
        .unwrap();
    assert_eq!(via_get, via_invoke);
    assert_eq!(via_call, via_invoke);
}

#[test]
fn test_invoker_matches_invoke_for_named_arguments() {
    let fx = fixture();
    let class = fx.reflector.class_mirror(fx.point).unwrap();
    let invoker = class.invoker("scale").unwrap();
    let p = new_point(&fx, 6, 0);
    let mut named = no_named();
    named.insert("offset".to_string(), Value::Int(7));
    let via_invoker = invoker
        .bind(p.clone())
        .call(vec![Value::Int(2)], named.clone())
        .unwrap();
    let via_invoke = fx
        .reflector
        .reflect(p)
        .invoke("scale", vec![Value::Int(2)], named)
        .unwrap();
    assert_eq!(via_invoker, via_invoke);
    assert_eq!(via_invoker, Value::Int(19));
}

#[test]
fn test_invoker_unknown_member() {
    let fx = fixture();
    let class = fx.reflector.class_mirror(fx.point).unwrap();
    let err = class.invoker("translate").unwrap_err();
    assert!(matches!(err, ReflectError::NoSuchMember { .. }));
}

// ===== Delegate =====

#[test]
fn test_delegate_replays_method_invocation() {
    let fx = fixture();
    let invocation = Invocation::method("scale", vec![Value::Int(2)], no_named());
    let a = new_point(&fx, 1, 0);
    let b = new_point(&fx, 10, 0);
    assert_eq!(
        fx.reflector.reflect(a).delegate(&invocation).unwrap(),
        Value::Int(2)
    );
    assert_eq!(
        fx.reflector.reflect(b).delegate(&invocation).unwrap(),
        Value::Int(20)
    );
}

#[test]
fn test_delegate_replays_reads_and_writes() {
    let fx = fixture();
    let p = new_point(&fx, 1, 2);
    let mirror = fx.reflector.reflect(p);
    mirror
        .delegate(&Invocation::setter("x", Value::Int(8)))
        .unwrap();
    assert_eq!(
        mirror.delegate(&Invocation::getter("x")).unwrap(),
        Value::Int(8)
    );
}

// ===== Static and Top-Level Scope =====

#[test]
fn test_static_field_access_through_class_mirror() {
    let fx = fixture();
    let class = fx.reflector.class_mirror(fx.point).unwrap();
    assert_eq!(class.invoke_getter("counter").unwrap(), Value::Int(0));
    class.invoke_setter("counter", Value::Int(5)).unwrap();
    assert_eq!(class.invoke_getter("counter").unwrap(), Value::Int(5));
}

#[test]
fn test_top_level_function_invocation() {
    let fx = fixture();
    let library = fx.reflector.library("geometry").unwrap();
    let result = library
        .invoke("describe", vec![Value::Str("point".to_string())], no_named())
        .unwrap();
    assert_eq!(result, Value::Str("subject: point".to_string()));
}

#[test]
fn test_top_level_variable_read_and_write() {
    let fx = fixture();
    let library = fx.reflector.library("geometry").unwrap();
    assert_eq!(library.invoke_getter("version").unwrap(), Value::Int(3));
    library.invoke_setter("version", Value::Int(4)).unwrap();
    assert_eq!(library.invoke_getter("version").unwrap(), Value::Int(4));
}

#[test]
fn test_instance_member_not_visible_in_static_scope() {
    let fx = fixture();
    let class = fx.reflector.class_mirror(fx.point).unwrap();
    let err = class.invoke("scale", vec![Value::Int(2)], no_named()).unwrap_err();
    assert!(matches!(err, ReflectError::NoSuchMember { .. }));
}
