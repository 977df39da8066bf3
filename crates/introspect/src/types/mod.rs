// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type information.
//!
//! # Architecture
//!
//! ```text
//! TypeDescriptor (name, kind, size, shape, lazy method table)
//!   |
//!   +-- Shape::Struct([FieldDescriptor])
//!   +-- Shape::Ptr / Shape::Slice (lazily resolved element)
//!   +-- Shape::Array { elem, len }
//!   +-- Shape::Func(Signature)
//!   |
//!   v
//! TypeRegistry (TypeId -> Type, signature -> Type)
//! ```

pub mod descriptor;
pub mod method;
pub mod registry;

#[cfg(test)]
mod tests;

pub use descriptor::{FieldDescriptor, LazyType, Shape, Signature, Type, TypeDescriptor};
pub use method::{
    IntoResults, MethodBody, MethodDescriptor, MethodSpec, PointerMethod, Receiver,
    ReflectMethods, ValueMethod,
};
pub use registry::{func_of, registry_stats, type_of, LookupStats, TypeRegistry};
