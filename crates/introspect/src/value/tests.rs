// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tests for value handles: navigation, mutation, calls and rendering.

use crate::config::{RenderOptions, INVALID_SENTINEL};
use crate::{
    bind, bind_addressable, make_stub, type_of, AnyValue, Func, Kind, MethodSpec, Ptr, Reflect,
    ReflectError, ReflectMethods, Type, Value, ValueHandle, Var,
};

#[derive(Reflect)]
#[reflect(name = "value.Point", methods)]
pub struct Point {
    pub x: i64,
    pub label: String,
    pub weight: f32,
    secret: u8,
}

impl ReflectMethods for Point {
    fn method_specs() -> Vec<MethodSpec> {
        vec![
            MethodSpec::value("Norm", |p: &Point| p.x * p.x),
            MethodSpec::pointer("Shift", |p: &mut Point, dx: i64| {
                p.x += dx;
            }),
        ]
    }
}

fn point() -> Point {
    Point {
        x: 3,
        label: "p".into(),
        weight: 0.5,
        secret: 9,
    }
}

#[derive(Reflect)]
#[reflect(name = "value.Holder")]
pub struct Holder {
    pub items: Vec<i32>,
    pub grid: [u8; 3],
    pub any: AnyValue,
    pub callback: Option<fn(i64) -> i64>,
    pub hook: Func<fn(i64) -> i64>,
}

fn no_addresses() -> RenderOptions {
    RenderOptions {
        show_addresses: false,
        ..RenderOptions::default()
    }
}

// =======================================================================
// Binding and flags
// =======================================================================

#[test]
fn test_bind_is_read_only_snapshot() {
    let h = bind(&point());
    assert!(h.is_valid());
    assert_eq!(h.kind(), Kind::Struct);
    assert!(!h.can_addr());
    assert!(!h.can_set());
    assert!(!h.field("x").can_set());
    assert_eq!(
        h.field("x").set_int(1),
        Err(ReflectError::Unsettable("set_int".into()))
    );
}

#[test]
fn test_addressable_flags_propagate() {
    let var = Var::new(point());
    let h = bind_addressable(&var);
    assert!(h.can_addr() && h.can_set());
    assert!(h.field("label").can_set());

    let secret = h.field("secret");
    assert!(secret.can_addr());
    assert!(!secret.can_set());
    assert_eq!(secret.uint().unwrap(), 9);
    assert!(matches!(secret.set_uint(1), Err(ReflectError::Unsettable(_))));
}

#[test]
fn test_invalid_handle() {
    let h = ValueHandle::default();
    assert!(!h.is_valid());
    assert_eq!(h.kind(), Kind::Invalid);
    assert_eq!(h.type_of(), Err(ReflectError::NoType));
    assert_eq!(h.render(), INVALID_SENTINEL);
    assert_eq!(h.render_debug(), INVALID_SENTINEL);
    assert_eq!(h.render_type(), Err(ReflectError::NoType));
    assert!(h.int().is_err());
    assert!(!h.field("x").is_valid());
}

// =======================================================================
// Navigation
// =======================================================================

#[test]
fn test_field_navigation() {
    let h = bind(&point());
    assert_eq!(h.num_field(), Ok(4));
    assert_eq!(h.field("x").int(), Ok(3));
    assert_eq!(h.field_by_index(1).string(), Ok("p".to_string()));
    assert_eq!(h.field("weight").kind(), Kind::Float32);

    let missing = h.field("nope");
    assert!(!missing.is_valid());
    assert_eq!(missing.int(), Err(ReflectError::UnknownField("nope".into())));

    let not_struct = h.field("x").field("y");
    assert!(matches!(
        not_struct.error(),
        Some(ReflectError::InvalidOperation(_))
    ));
}

#[test]
fn test_deref_pointer_aliases_storage() {
    let p = Ptr::new(point());
    let h = bind(&p);
    assert_eq!(h.kind(), Kind::Ptr);
    assert!(!h.can_set());

    let target = h.deref();
    assert!(target.can_addr() && target.can_set());
    target.field("x").set_int(42).unwrap();
    assert_eq!(p.get().unwrap().x, 42);
}

#[test]
fn test_deref_nil_and_non_pointer() {
    let nil: Ptr<Point> = Ptr::nil();
    let h = bind(&nil);
    assert_eq!(h.is_nil(), Ok(true));
    let d = h.deref();
    assert!(!d.is_valid());
    assert!(matches!(d.error(), Some(ReflectError::InvalidOperation(_))));

    assert!(!bind(&5i64).deref().is_valid());
}

#[test]
fn test_index_and_len() {
    let holder = Holder {
        items: vec![10, 20, 30],
        grid: [1, 2, 3],
        any: AnyValue::nil(),
        callback: None,
        hook: Func::nil(),
    };
    let var = Var::new(holder);
    let h = bind_addressable(&var);

    let items = h.field("items");
    assert_eq!(items.len(), Ok(3));
    assert_eq!(items.index(1).int(), Ok(20));
    assert_eq!(
        items.index(3).int(),
        Err(ReflectError::IndexOutOfBounds {
            index: 3,
            length: 3
        })
    );

    h.field("grid").index(2).set_uint(300).unwrap();
    assert_eq!(var.get().unwrap().grid, [1, 2, 44]);
    assert!(!h.field("callback").index(0).is_valid());
}

// =======================================================================
// Mutation
// =======================================================================

#[test]
fn test_set_requires_exact_type() {
    let var = Var::new(5i64);
    let h = bind_addressable(&var);
    h.set(&bind(&9i64)).unwrap();
    assert_eq!(var.get().unwrap(), 9);
    assert!(matches!(
        h.set(&bind(&9i32)),
        Err(ReflectError::TypeMismatch { .. })
    ));
}

#[test]
fn test_relaxed_numeric_setters() {
    let var = Var::new(0i8);
    let h = bind_addressable(&var);
    h.set_int(300).unwrap();
    assert_eq!(var.get().unwrap(), 44);
    assert!(matches!(h.set_uint(1), Err(ReflectError::TypeMismatch { .. })));
    assert!(matches!(h.set_float(1.0), Err(ReflectError::TypeMismatch { .. })));

    let f = Var::new(0f32);
    bind_addressable(&f).set_float(0.1).unwrap();
    assert_eq!(f.get().unwrap(), 0.1f32);

    let s = Var::new(String::new());
    bind_addressable(&s).set_string("hi").unwrap();
    assert_eq!(s.get().unwrap(), "hi");
}

#[test]
fn test_overflow_checks() {
    let h = bind(&0i8);
    assert_eq!(h.overflows_int(127), Ok(false));
    assert_eq!(h.overflows_int(128), Ok(true));
    assert_eq!(h.overflows_int(-129), Ok(true));
    assert_eq!(bind(&0u16).overflows_uint(65_536), Ok(true));
    assert_eq!(bind(&0f32).overflows_float(1e39), Ok(true));
    assert_eq!(bind(&0f32).overflows_float(f64::INFINITY), Ok(false));
    assert_eq!(bind(&0f64).overflows_float(1e300), Ok(false));
    assert!(bind(&0u8).overflows_int(1).is_err());
}

#[test]
fn test_interface_slot_boxes_any_value() {
    let holder = Holder {
        items: Vec::new(),
        grid: [0; 3],
        any: AnyValue::nil(),
        callback: None,
        hook: Func::nil(),
    };
    let var = Var::new(holder);
    let any = bind_addressable(&var).field("any");
    assert_eq!(any.is_nil(), Ok(true));
    any.set(&bind(&"boxed".to_string())).unwrap();

    let content = any.deref();
    assert_eq!(content.type_of().unwrap(), String::type_of());
    assert_eq!(content.string().unwrap(), "boxed");
    assert_eq!(
        var.get().unwrap().any.downcast::<String>().unwrap(),
        "boxed"
    );
}

#[test]
fn test_zero_and_new_pointer() {
    let zero = ValueHandle::zero(&Point::type_of());
    assert_eq!(zero.field("x").int(), Ok(0));
    assert_eq!(zero.field("label").string(), Ok(String::new()));

    let p = ValueHandle::new_pointer::<Point>();
    assert_eq!(p.type_of().unwrap(), Ptr::<Point>::type_of());
    p.deref().field("x").set_int(7).unwrap();
    assert_eq!(p.get::<Ptr<Point>>().unwrap().get().unwrap().x, 7);
}

// =======================================================================
// Conversion and equality
// =======================================================================

#[test]
fn test_convert_numeric_and_interface() {
    let h = bind(&300i64);
    let narrowed = h.convert(&type_of::<u8>()).unwrap();
    assert_eq!(narrowed.uint(), Ok(44));
    let widened = bind(&2u8).convert(&type_of::<f64>()).unwrap();
    assert_eq!(widened.float(), Ok(2.0));

    let boxed = h.convert(&AnyValue::type_of()).unwrap();
    assert_eq!(boxed.kind(), Kind::Interface);
    assert_eq!(boxed.deref().int(), Ok(300));

    assert!(bind(&"s".to_string()).convert(&type_of::<i64>()).is_err());
}

#[test]
fn test_equality() {
    assert_eq!(bind(&5i64), bind(&5i64));
    assert_ne!(bind(&5i64), bind(&5i32));
    assert_eq!(ValueHandle::default(), ValueHandle::default());
    assert_ne!(ValueHandle::default(), bind(&0i64));

    let p = Ptr::new(1i64);
    assert_eq!(bind(&p), bind(&p.clone()));
    assert_ne!(bind(&p), bind(&Ptr::new(1i64)));

    let f = (|x: i64| x) as fn(i64) -> i64;
    assert_ne!(bind(&f), bind(&f));
    assert_eq!(bind(&f).code_pointer(), bind(&f).code_pointer());
}

// =======================================================================
// Methods and calls
// =======================================================================

#[test]
fn test_method_by_name_on_value() {
    let h = bind(&point());
    assert_eq!(h.num_method(), 1);
    let norm = h.method_by_name("Norm");
    assert_eq!(norm.type_of().unwrap(), type_of::<fn() -> i64>());
    let out = norm.call(&[]).unwrap();
    assert_eq!(out[0].int(), Ok(9));

    let missing = h.method_by_name("Shift");
    assert_eq!(
        missing.error(),
        Some(&ReflectError::UnknownMethod("Shift".into()))
    );
    assert!(!h.method(5).is_valid());
}

#[test]
fn test_pointer_method_mutates_through_pointer() {
    let p = Ptr::new(point());
    let h = bind(&p);
    assert_eq!(h.num_method(), 2);

    let shift = h.method_by_name("Shift");
    assert_eq!(shift.type_of().unwrap(), type_of::<fn(i64)>());
    shift.call(&[bind(&4i64)]).unwrap();
    assert_eq!(p.get().unwrap().x, 7);

    // Value-receiver methods are reachable through the pointer too.
    let norm = h.method(0).call(&[]).unwrap();
    assert_eq!(norm[0].int(), Ok(49));
}

#[test]
fn test_raw_method_takes_receiver() {
    let ty = Point::type_of();
    let raw = ty.method_by_name("Norm").unwrap().func().clone();
    let out = raw.call(&[bind(&point())]).unwrap();
    assert_eq!(out[0].int(), Ok(9));
}

#[test]
fn test_call_contract_violations() {
    let f = (|a: i64, b: i64| a - b) as fn(i64, i64) -> i64;
    let h = bind(&f);
    assert_eq!(
        h.call(&[bind(&1i64)]),
        Err(ReflectError::ArityMismatch {
            expected: 2,
            got: 1
        })
    );
    assert!(matches!(
        h.call(&[bind(&1i64), bind(&"x".to_string())]),
        Err(ReflectError::TypeMismatch { .. })
    ));
    assert_eq!(h.call(&[bind(&5i64), bind(&2i64)]).unwrap()[0].int(), Ok(3));

    let nil: Option<fn(i64, i64) -> i64> = None;
    let nil_h = bind(&nil);
    assert_eq!(nil_h.is_nil(), Ok(true));
    assert!(matches!(
        nil_h.call(&[bind(&1i64), bind(&2i64)]),
        Err(ReflectError::InvalidOperation(_))
    ));
    assert!(matches!(
        bind(&1i64).call(&[]),
        Err(ReflectError::InvalidOperation(_))
    ));
}

#[test]
fn test_stub_installed_into_func_field() {
    let holder = Holder {
        items: Vec::new(),
        grid: [0; 3],
        any: AnyValue::nil(),
        callback: None,
        hook: Func::nil(),
    };
    let var = Var::new(holder);
    let field = bind_addressable(&var).field("hook");
    let sig: Type = field.type_of().unwrap();
    assert_eq!(sig, type_of::<fn(i64) -> i64>());
    let stub = make_stub(&sig, |args| {
        let x = args[0].int().unwrap_or_default();
        vec![bind(&(x + 1))]
    })
    .unwrap();
    field.set(&stub).unwrap();

    let out = field.call(&[bind(&41i64)]).unwrap();
    assert_eq!(out[0].int(), Ok(42));

    // The host value still decodes and the stub survives the round trip.
    let hook = var.get().unwrap().hook;
    assert!(hook.host().is_none());
    assert_eq!(hook.code_pointer(), stub.code_pointer().unwrap());
    assert_eq!(hook.call(&[bind(&1i64)]).unwrap()[0].int(), Ok(2));
}

#[test]
fn test_stub_rejected_by_host_fn_field() {
    let holder = Holder {
        items: vec![5],
        grid: [0; 3],
        any: AnyValue::nil(),
        callback: None,
        hook: Func::nil(),
    };
    let var = Var::new(holder);
    let field = bind_addressable(&var).field("callback");
    let stub = make_stub(&field.type_of().unwrap(), |args| args.to_vec()).unwrap();

    assert!(matches!(
        field.set(&stub),
        Err(ReflectError::TypeMismatch { .. })
    ));
    assert_eq!(field.is_nil(), Ok(true));
    let back = var.get().unwrap();
    assert!(back.callback.is_none());
    assert_eq!(back.items, vec![5]);

    // Host functions still go in.
    fn triple(x: i64) -> i64 {
        x * 3
    }
    field.set(&bind(&(triple as fn(i64) -> i64))).unwrap();
    assert_eq!(var.get().unwrap().callback.map(|f| f(2)), Some(6));
}

#[test]
fn test_stub_in_pointee_keeps_methods_working() {
    #[derive(Reflect)]
    #[reflect(name = "value.Relay", methods)]
    pub struct Relay {
        pub hits: i64,
        pub on_hit: Func<fn(i64) -> i64>,
    }

    impl ReflectMethods for Relay {
        fn method_specs() -> Vec<MethodSpec> {
            vec![
                MethodSpec::value("Peek", |r: &Relay| r.hits),
                MethodSpec::pointer("Hit", |r: &mut Relay, n: i64| {
                    let bonus = r
                        .on_hit
                        .call(&[bind(&n)])
                        .ok()
                        .and_then(|out| out.first().and_then(|v| v.int().ok()))
                        .unwrap_or(0);
                    r.hits += n + bonus;
                    r.hits
                }),
            ]
        }
    }

    let p = Ptr::new(Relay {
        hits: 0,
        on_hit: Func::nil(),
    });
    let pointee = bind(&p).deref();
    let slot = pointee.field("on_hit");
    let stub = make_stub(&slot.type_of().unwrap(), |args| {
        vec![bind(&(args[0].int().unwrap_or_default() * 10))]
    })
    .unwrap();
    slot.set(&stub).unwrap();

    assert!(p.get().unwrap().on_hit.host().is_none());
    let hit = bind(&p).method_by_name("Hit");
    assert_eq!(hit.call(&[bind(&2i64)]).unwrap()[0].int(), Ok(22));
    assert_eq!(
        bind(&p).method_by_name("Peek").call(&[]).unwrap()[0].int(),
        Ok(22)
    );
    assert_eq!(p.get().unwrap().hits, 22);
}

// =======================================================================
// Rendering
// =======================================================================

#[test]
fn test_render_scalars_and_aggregates() {
    assert_eq!(bind(&true).render(), "true");
    assert_eq!(bind(&-7i16).render(), "-7");
    assert_eq!(bind(&0.1f32).render(), "0.1");
    assert_eq!(bind(&"bee".to_string()).render(), "bee");
    assert_eq!(bind(&point()).render(), "{3 p 0.5 9}");
    assert_eq!(bind(&vec![1u8, 2, 3]).render(), "[1 2 3]");
}

#[test]
fn test_render_floats() {
    assert_eq!(bind(&3.14f64).render(), "3.14");
    assert_eq!(bind(&-0.5f64).render(), "-0.5");
    assert_eq!(bind(&1e20f64).render(), "100000000000000000000");
    assert_eq!(bind(&1e21f64).render(), "1e+21");
    assert_eq!(bind(&1.5e300f64).render(), "1.5e+300");
    assert_eq!(bind(&0.0001f64).render(), "0.0001");
    assert_eq!(bind(&0.00001f64).render(), "1e-05");
    assert_eq!(bind(&-2.5e-7f64).render(), "-2.5e-07");
    assert_eq!(bind(&0.0f64).render(), "0");
    assert_eq!(bind(&f64::INFINITY).render(), "+Inf");
    assert_eq!(bind(&f64::NEG_INFINITY).render(), "-Inf");
    assert_eq!(bind(&f64::NAN).render(), "NaN");
    assert_eq!(bind(&1e30f32).render(), "1e+30");
    assert_eq!(bind(&f32::INFINITY).render(), "+Inf");
}

#[test]
fn test_render_pointers() {
    let p = Ptr::new(point());
    assert_eq!(bind(&p).render(), "&{3 p 0.5 9}");

    let scalar = Ptr::new(1i64);
    let opts = no_addresses();
    assert_eq!(bind(&scalar).render_with(&opts), "0x0");
    let addr = bind(&scalar).address().unwrap();
    assert_eq!(bind(&scalar).render(), format!("{:#x}", addr));

    assert_eq!(bind(&Ptr::<i64>::nil()).render(), "<nil>");
}

#[test]
fn test_render_nested_pointer_prints_address() {
    #[derive(Reflect)]
    pub struct Outer {
        pub inner: Ptr<Point>,
    }
    let outer = Outer {
        inner: Ptr::new(point()),
    };
    assert_eq!(bind(&outer).render_with(&no_addresses()), "{0x0}");
    assert_eq!(bind(&Ptr::new(outer)).render_with(&no_addresses()), "&{0x0}");
}

#[test]
fn test_render_funcs_and_interfaces() {
    let nil: Option<fn()> = None;
    assert_eq!(bind(&nil).render(), "<nil>");
    let f = (|| {}) as fn();
    assert_eq!(bind(&f).render_with(&no_addresses()), "0x0");
    assert_ne!(bind(&f).render(), "<nil>");

    assert_eq!(bind(&AnyValue::nil()).render(), "<nil>");
    assert_eq!(bind(&AnyValue::new(&12u8)).render(), "12");
}

#[test]
fn test_render_depth_limit() {
    let nested = vec![vec![vec![1i64]]];
    let opts = RenderOptions {
        max_depth: 1,
        ..RenderOptions::default()
    };
    assert_eq!(bind(&nested).render_with(&opts), "[[...]]");
}

#[test]
fn test_render_type_and_debug() {
    assert_eq!(bind(&point()).render_type(), Ok("value.Point".to_string()));
    assert_eq!(bind(&Ptr::new(point())).render_type(), Ok("*value.Point".to_string()));
    assert_eq!(bind(&point()).render_debug(), "<value.Point Value>");
    assert_eq!(bind(&"raw".to_string()).render_debug(), "raw");
    assert_eq!(format!("{}", bind(&1u64)), "1");
}

#[test]
fn test_value_debug_is_shallow() {
    let p = Ptr::new(1i64);
    let dbg = format!("{:?}", p.to_value());
    assert!(dbg.starts_with("Ptr(0x"), "{}", dbg);
    assert_eq!(format!("{:?}", Value::Func(None)), "Func(nil)");
}
