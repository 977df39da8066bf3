// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tests for type descriptors and method tables.

use crate::{
    func_of, type_of, FieldDescriptor, Kind, MethodSpec, Ptr, Receiver, Reflect,
    ReflectMethods, Shape, TypeDescriptor,
};

#[derive(Reflect)]
#[reflect(name = "types.Sample", methods)]
pub struct Sample {
    pub a: i64,
    pub b: String,
    pub c: f64,
    hidden: bool,
}

impl ReflectMethods for Sample {
    fn method_specs() -> Vec<MethodSpec> {
        vec![
            MethodSpec::value("Foo", |s: &Sample| s.a * 2),
            MethodSpec::pointer("Bar", |s: &mut Sample, n: i64| {
                s.a += n;
                s.a
            }),
            MethodSpec::value("Apple", |s: &Sample, suffix: String| {
                format!("{}{}", s.b, suffix)
            }),
        ]
    }
}

#[derive(Reflect)]
#[reflect(name = "types.Celsius")]
pub struct Celsius(f64);

#[derive(Reflect)]
#[reflect(name = "types.Node")]
pub struct Node {
    pub value: i32,
    pub next: Ptr<Node>,
    pub children: Vec<Node>,
}

#[derive(Reflect)]
pub struct Unnamed {
    pub x: u8,
}

#[test]
fn test_struct_descriptor() {
    let ty = Sample::type_of();
    assert_eq!(ty.kind(), Kind::Struct);
    assert_eq!(ty.name(), Some("types.Sample"));
    assert_eq!(ty.to_string(), "types.Sample");
    assert_eq!(ty.size(), std::mem::size_of::<Sample>());
    assert_eq!(ty.num_field(), 4);

    let b = ty.field("b").unwrap();
    assert_eq!(b.index, 1);
    assert_eq!(b.ty, String::type_of());
    assert_eq!(b.offset, std::mem::offset_of!(Sample, b));
    assert!(b.exported);
    assert!(!ty.field("hidden").unwrap().exported);
    assert!(ty.field("missing").is_none());
    assert_eq!(ty.field_by_index(2).unwrap().name, "c");
}

#[test]
fn test_default_name_uses_module_path() {
    let name = Unnamed::type_of().to_string();
    assert!(name.ends_with("::Unnamed"), "{}", name);
    assert!(name.starts_with("introspect::"), "{}", name);
}

#[test]
fn test_newtype_keeps_name_and_kind() {
    let ty = Celsius::type_of();
    assert_eq!(ty.kind(), Kind::Float64);
    assert_eq!(ty.to_string(), "types.Celsius");
    assert_ne!(ty, f64::type_of());
    assert!(ty.same_underlying(&f64::type_of()));
}

#[test]
fn test_self_referential_type() {
    let node = Node::type_of();
    let next = &node.field("next").unwrap().ty;
    assert_eq!(next.kind(), Kind::Ptr);
    assert_eq!(next.elem(), Some(&node));
    assert_eq!(next.to_string(), "*types.Node");

    let children = &node.field("children").unwrap().ty;
    assert_eq!(children.elem(), Some(&node));
    assert_eq!(children.to_string(), "[]types.Node");
}

#[test]
fn test_method_sets_sorted_by_name() {
    let value_ty = Sample::type_of();
    let value_set: Vec<&str> = value_ty.methods().iter().map(|m| m.name()).collect();
    assert_eq!(value_set, ["Apple", "Foo"]);

    let ptr_ty = Ptr::<Sample>::type_of();
    let ptr_set: Vec<&str> = ptr_ty.methods().iter().map(|m| m.name()).collect();
    assert_eq!(ptr_set, ["Apple", "Bar", "Foo"]);
    assert_eq!(ptr_ty.method_by_name("Bar").unwrap().receiver(), Receiver::Pointer);
    assert_eq!(ptr_ty.method(2).unwrap().index(), 2);
    assert!(Sample::type_of().method_by_name("Bar").is_none());
}

#[test]
fn test_raw_signature_has_receiver_first() {
    let ptr_ty = Ptr::<Sample>::type_of();
    let bar = ptr_ty.method_by_name("Bar").unwrap();
    let sig = bar.signature();
    assert_eq!(sig.kind(), Kind::Func);
    assert_eq!(sig.num_in(), 2);
    assert_eq!(sig.params()[0], ptr_ty);
    assert_eq!(sig.params()[1], i64::type_of());
    assert_eq!(sig.results(), &[i64::type_of()]);
    assert_eq!(sig.to_string(), "fn(*types.Sample, i64) -> i64");
    assert_eq!(*sig, func_of(vec![ptr_ty.clone(), i64::type_of()], vec![i64::type_of()]));
}

#[test]
fn test_method_descriptor_lookup_stable() {
    let ty = Sample::type_of();
    let by_index = ty.method(1).unwrap();
    let by_name = ty.method_by_name("Foo").unwrap();
    assert_eq!(by_index, by_name);
    assert_eq!(by_index.func().code_pointer(), by_name.func().code_pointer());
    assert_ne!(ty.method(0).unwrap(), by_name);
}

#[test]
fn test_method_table_identical_across_calls() {
    let first = Ptr::<Sample>::type_of().methods().as_ptr();
    let second = Ptr::<Sample>::type_of().methods().as_ptr();
    assert_eq!(first, second);
}

#[test]
fn test_anonymous_struct_display() {
    let d = TypeDescriptor::new(
        None,
        Kind::Struct,
        16,
        Shape::Struct(vec![
            FieldDescriptor::new("a", i64::type_of()),
            FieldDescriptor::new("b", Vec::<u8>::type_of()),
        ]),
    );
    assert!(!d.is_named());
    assert_eq!(d.to_string(), "struct { a: i64, b: []u8 }");
}

#[test]
fn test_sequence_and_fn_identity() {
    assert_eq!(type_of::<Vec<i64>>(), type_of::<Vec<i64>>());
    assert_ne!(type_of::<Vec<i64>>(), type_of::<Vec<i32>>());
    assert_ne!(type_of::<[i64; 2]>(), type_of::<[i64; 3]>());
    assert_eq!(
        type_of::<fn(i64, String) -> bool>().params(),
        &[i64::type_of(), String::type_of()]
    );
    assert!(type_of::<fn()>().results().is_empty());
}

#[test]
fn test_concurrent_first_resolution_publishes_once() {
    #[derive(Reflect)]
    pub struct Racer {
        pub a: u32,
    }

    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(Racer::type_of))
        .collect();
    let types: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(types.windows(2).all(|w| w[0] == w[1]));
}
