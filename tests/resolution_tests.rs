//! Rule resolution: hierarchy precedence, qualifiers, caching and user types.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use typeconv::prelude::*;
use typeconv::{ConvertiblePair, MemoryPressure, ObjectValue, ServiceConfig};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `Shape` (abstract) <- `Circle`, with `Circle` also `Drawable`.
struct Shapes {
    shape: TypeHash,
    drawable: TypeHash,
    circle: TypeHash,
}

fn register_shapes(service: &ConversionService) -> Shapes {
    let types = service.types();
    let shape = types.register(TypeEntry::abstract_class("Shape")).unwrap();
    let drawable = types.register(TypeEntry::interface("Drawable")).unwrap();
    let circle = types
        .register(TypeEntry::class("Circle").with_base(shape).with_interface(drawable))
        .unwrap();
    Shapes {
        shape,
        drawable,
        circle,
    }
}

#[derive(Debug, PartialEq)]
struct Circle {
    radius: f64,
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "circle(r={})", self.radius)
    }
}

impl ObjectValue for Circle {
    fn type_hash(&self) -> TypeHash {
        TypeHash::from_name("Circle")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_object(&self, other: &dyn ObjectValue) -> bool {
        other.as_any().downcast_ref::<Circle>() == Some(self)
    }
}

fn tag(label: &'static str) -> impl Fn(&ConversionService, &Value, TypeHash, &ConversionContext) -> Option<Value> {
    move |_, _, _, _| Some(Value::from(label))
}

// ============================================================================
// Hierarchy precedence
// ============================================================================

#[test]
fn test_exact_source_beats_supertype() {
    init_tracing();
    let service = ConversionService::new();
    let shapes = register_shapes(&service);
    service
        .add_converter(shapes.shape, types::STRING, tag("shape"))
        .add_converter(shapes.circle, types::STRING, tag("circle"));

    let circle = Value::object(Circle { radius: 1.0 });
    assert_eq!(service.convert_to(&circle, types::STRING), Some(Value::from("circle")));
}

#[test]
fn test_capability_beats_superclass() {
    let service = ConversionService::new();
    let shapes = register_shapes(&service);
    service
        .add_converter(shapes.shape, types::STRING, tag("shape"))
        .add_converter(shapes.drawable, types::STRING, tag("drawable"));

    assert_eq!(
        service.types().hierarchy(shapes.circle).to_vec(),
        vec![shapes.circle, shapes.drawable, shapes.shape, types::ANY]
    );
    let circle = Value::object(Circle { radius: 1.0 });
    assert_eq!(service.convert_to(&circle, types::STRING), Some(Value::from("drawable")));
}

#[test]
fn test_source_specificity_dominates_target_specificity() {
    let service = ConversionService::without_rules(ServiceConfig::default());
    let shapes = register_shapes(&service);
    service
        .add_converter(shapes.circle, types::TEXT, tag("circle->text"))
        .add_converter(shapes.shape, types::STRING, tag("shape->string"));

    let circle = Value::object(Circle { radius: 2.0 });
    assert_eq!(service.convert_to(&circle, types::STRING), Some(Value::from("circle->text")));
}

#[test]
fn test_user_object_falls_back_to_display() {
    let service = ConversionService::new();
    register_shapes(&service);
    let circle = Value::object(Circle { radius: 0.5 });
    assert_eq!(service.convert_to(&circle, types::STRING), Some(Value::from("circle(r=0.5)")));
}

#[test]
fn test_object_identity_shortcut() {
    let service = ConversionService::new();
    let shapes = register_shapes(&service);
    let circle = Value::object(Circle { radius: 3.0 });
    assert_eq!(service.convert_to(&circle, shapes.shape), Some(circle.clone()));
    assert_eq!(
        service
            .convert_to(&circle, shapes.drawable)
            .and_then(|v| v.downcast_ref::<Circle>().map(|c| c.radius)),
        Some(3.0)
    );
}

// ============================================================================
// Qualifiers
// ============================================================================

#[test]
fn test_qualified_rule_only_applies_with_qualifier() {
    let service = ConversionService::without_rules(ServiceConfig::default());
    service
        .add_converter(types::TEXT, types::INT32, tag("plain"))
        .add_formatting_converter(types::TEXT, types::INT32, qualifiers::FORMAT, tag("formatted"));

    let plain = service.context();
    let formatted = service
        .context()
        .with_annotation(Annotation::with_value(qualifiers::FORMAT, "#,###"));

    assert_eq!(service.convert(&Value::from("1"), types::INT32, &plain), Some(Value::from("plain")));
    assert_eq!(
        service.convert(&Value::from("1"), types::INT32, &formatted),
        Some(Value::from("formatted"))
    );
}

#[test]
fn test_qualified_rule_on_supertype_beats_exact_plain_rule() {
    let service = ConversionService::without_rules(ServiceConfig::default());
    service
        .add_converter(types::STRING, types::INT32, tag("exact plain"))
        .add_formatting_converter(types::ANY, types::NUMBER, qualifiers::FORMAT, tag("broad formatted"));

    let ctx = service
        .context()
        .with_annotation(Annotation::with_value(qualifiers::FORMAT, "x"));
    assert_eq!(
        service.convert(&Value::from("1"), types::INT32, &ctx),
        Some(Value::from("broad formatted"))
    );
}

#[test]
fn test_missing_qualified_rule_falls_back() {
    let service = ConversionService::new();
    let ctx = service
        .context()
        .with_annotation(Annotation::with_value(qualifiers::FORMAT, "ignored"));
    assert_eq!(service.convert(&Value::from("9"), types::INT32, &ctx), Some(Value::Int32(9)));
}

#[test]
fn test_find_type_converter_matches_registered_pairs() {
    let service = ConversionService::without_rules(ServiceConfig::default());
    let rule: typeconv::ConverterRef = Arc::new(tag("x"));
    service.add_type_converter(
        ConvertiblePair::formatted(types::STRING, types::UUID, qualifiers::FORMAT),
        Arc::clone(&rule),
    );

    assert!(service
        .find_type_converter(types::STRING, types::UUID, Some(qualifiers::FORMAT))
        .is_some_and(|found| Arc::ptr_eq(&found, &rule)));
    assert!(service.find_type_converter(types::STRING, types::UUID, None).is_none());
}

// ============================================================================
// Caching
// ============================================================================

#[test]
fn test_cache_never_changes_outcomes() {
    let cached = ConversionService::new();
    let uncached = ConversionService::with_config(ServiceConfig::default().with_cache_capacity(0));
    let inputs = [
        (Value::from("12"), types::INT16),
        (Value::from("twelve"), types::INT16),
        (Value::from("a,b"), types::SET),
        (Value::Int64(1 << 40), types::INT32),
        (Value::from("Tue, 3 Jun 2008 11:05:30 GMT"), types::LOCAL_DATE),
        (Value::from("nope"), types::DATE),
    ];

    for round in 0..2 {
        let warm = cached.context();
        let cold = uncached.context();
        for (value, target) in &inputs {
            assert_eq!(
                cached.convert(value, *target, &warm),
                uncached.convert(value, *target, &cold),
                "round {round}: {value}"
            );
        }
        assert_eq!(warm.errors(), cold.errors());
    }
    assert!(cached.cached_resolutions() > 0);
    assert_eq!(uncached.cached_resolutions(), 0);
}

#[test]
fn test_new_rule_is_not_shadowed_by_cached_resolution() {
    let service = ConversionService::new();
    let shapes = register_shapes(&service);
    let circle = Value::object(Circle { radius: 1.0 });

    assert_eq!(service.convert_to(&circle, types::STRING), Some(Value::from("circle(r=1)")));
    service.add_converter(shapes.circle, types::STRING, tag("specific"));
    assert_eq!(service.convert_to(&circle, types::STRING), Some(Value::from("specific")));
}

#[derive(Debug)]
struct Dog;

impl fmt::Display for Dog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dog")
    }
}

impl ObjectValue for Dog {
    fn type_hash(&self) -> TypeHash {
        TypeHash::from_name("Dog")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn test_type_registration_is_not_shadowed_by_cached_resolution() {
    let animal = TypeHash::from_name("Animal");
    let outcomes = |capacity: usize| {
        let service = ConversionService::with_config(ServiceConfig::default().with_cache_capacity(capacity));
        service.add_converter(animal, types::STRING, tag("animal rule"));
        let dog = Value::object(Dog);

        let before = service.convert_to(&dog, types::STRING);
        service.types().register(TypeEntry::class("Animal")).unwrap();
        service
            .types()
            .register(TypeEntry::class("Dog").with_base(animal))
            .unwrap();
        let after = service.convert_to(&dog, types::STRING);
        (before, after)
    };

    let warm = outcomes(60);
    assert_eq!(warm, outcomes(0));
    assert_eq!(warm, (Some(Value::from("dog")), Some(Value::from("animal rule"))));
}

#[test]
fn test_alias_registered_after_use_applies() {
    let service = ConversionService::without_rules(ServiceConfig::default());
    let count = TypeHash::from_name("count");
    service.add_converter(types::STRING, types::INT32, tag("int32 rule"));

    assert_eq!(service.convert_to(&Value::from("1"), count), None);
    service.types().register_alias("count", types::INT32).unwrap();
    assert_eq!(service.convert_to(&Value::from("1"), count), Some(Value::from("int32 rule")));
}

#[test]
fn test_memory_pressure_levels() {
    let service = ConversionService::new();
    for target in [types::INT8, types::INT16, types::INT32, types::INT64] {
        service.convert_to(&Value::from("1"), target);
    }
    assert_eq!(service.cached_resolutions(), 4);
    assert_eq!(service.relieve_memory_pressure(MemoryPressure::Low), 0);
    assert_eq!(service.relieve_memory_pressure(MemoryPressure::Medium), 2);
    assert_eq!(service.relieve_memory_pressure(MemoryPressure::High), 2);
    assert_eq!(service.cached_resolutions(), 0);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_shared_service_across_threads() {
    init_tracing();
    let service = Arc::new(ConversionService::new());

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let ctx = service.context();
                let ids = service.convert_argument(
                    &Value::from(format!("{i},{}", i + 1)),
                    &Argument::list_of(types::INT64),
                    &ctx,
                );
                if i == 0 {
                    service.add_converter(types::BOOL, types::INT32, |_, v, _, _| {
                        v.as_bool().map(|b| Value::Int32(i32::from(b)))
                    });
                }
                (i, ids)
            })
        })
        .collect();

    for worker in workers {
        let (i, ids) = worker.join().unwrap();
        assert_eq!(ids, Some(Value::list([Value::Int64(i), Value::Int64(i + 1)])));
    }
    assert_eq!(service.convert_to(&Value::Bool(true), types::INT32), Some(Value::Int32(1)));
}
