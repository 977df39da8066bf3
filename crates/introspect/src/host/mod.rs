// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host type bindings.
//!
//! [`Reflect`] connects a Rust type to its descriptor and to the dynamic
//! [`Value`] representation. Implementations are provided here for
//! primitives, `String`, `Vec<T>`, `[T; N]`, function pointers of arity 0
//! to 3, [`Func<S>`], [`Ptr<T>`] and [`AnyValue`]. User structs use `#[derive(Reflect)]`.

mod any;
mod func;
mod pointer;
mod primitives;

pub use any::AnyValue;
pub use func::{FnPointer, Func};
pub use pointer::{Ptr, Var};

use crate::error::Result;
use crate::types::descriptor::{Type, TypeDescriptor};
use crate::types::method::MethodSpec;
use crate::types::registry;
use crate::value::Value;

/// A host type with a runtime descriptor.
pub trait Reflect: Sized + 'static {
    /// Canonical interned descriptor.
    fn type_of() -> Type {
        registry::global().resolve::<Self>()
    }

    /// Build a fresh, unpublished descriptor. Called once per type by the
    /// registry; use [`Reflect::type_of`] everywhere else.
    fn describe() -> TypeDescriptor;

    /// Declared methods (both receiver forms).
    fn method_specs() -> Vec<MethodSpec> {
        Vec::new()
    }

    /// Snapshot into the dynamic representation.
    fn to_value(&self) -> Value;

    /// Rebuild from the dynamic representation.
    fn from_value(value: &Value) -> Result<Self>;
}
