// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # introspect - runtime type and value introspection
//!
//! Ask any reflected value what it is (its [`Type`] and [`Kind`]), walk
//! into its fields, elements and pointees, read and write through
//! addressable handles, look up and invoke methods by name or ordinal,
//! synthesize functions of arbitrary signature, and render values as text.
//!
//! ## Quick Start
//!
//! ```rust
//! use introspect::{bind, bind_addressable, Reflect, Var};
//!
//! #[derive(Reflect)]
//! pub struct Sample {
//!     pub a: i64,
//!     pub b: String,
//!     pub c: f64,
//! }
//!
//! let s = Sample { a: 1, b: "bee".into(), c: 3.14 };
//! assert_eq!(bind(&s).to_string(), "{1 bee 3.14}");
//! assert_eq!(bind(&s).field("b").string().unwrap(), "bee");
//!
//! let var = Var::new(s);
//! let handle = bind_addressable(&var);
//! handle.field("a").set_int(7).unwrap();
//! assert_eq!(var.get().unwrap().a, 7);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------+
//! |  host        Reflect trait, Ptr<T>, Var<T>, AnyValue, fn ptrs  |
//! +---------------------------------------------------------------+
//! |  types       TypeDescriptor, registry (interning), methods     |
//! +---------------------------------------------------------------+
//! |  value       Value, ValueHandle (navigate/set/call/render)     |
//! +---------------------------------------------------------------+
//! |  stub        make_stub: functions from generic handlers        |
//! +---------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Type`] | Interned type descriptor; equality is identity |
//! | [`ValueHandle`] | Typed view of a value with addressable/settable flags |
//! | [`MethodDescriptor`] | Entry of a type's name-ordered method set |
//! | [`Ptr`] | Nullable shared pointer; clones alias |
//! | [`Var`] | Addressable host variable |

// Allow the derive macro to work inside this crate's tests
extern crate self as introspect;

/// Runtime configuration and rendering constants.
pub mod config;
/// Error taxonomy.
pub mod error;
/// Host type bindings (`Reflect` and built-in impls).
pub mod host;
/// Structural categories.
pub mod kind;
/// Function synthesis from generic handlers.
pub mod stub;
/// Type descriptors, registry and method tables.
pub mod types;
/// Dynamic values and value handles.
pub mod value;

pub use error::{ReflectError, Result};
pub use host::{AnyValue, FnPointer, Func, Ptr, Reflect, Var};
pub use kind::Kind;
pub use stub::{make_stub, make_stub_fallible};
pub use types::{
    func_of, registry_stats, type_of, FieldDescriptor, IntoResults, LookupStats,
    MethodDescriptor, MethodSpec, Receiver, ReflectMethods, Shape, Signature, Type,
    TypeDescriptor,
};
pub use value::{bind, bind_addressable, Boxed, Callable, FuncValue, Value, ValueHandle};

/// `#[derive(Reflect)]` for structs with named fields and tuple newtypes.
pub use introspect_derive::Reflect;
