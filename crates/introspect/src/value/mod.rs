// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic values and value handles.
//!
//! # Architecture
//!
//! ```text
//! Value (tree of dynamic data)
//!   |
//!   +-- Slot = Arc<RwLock<Value>>   (storage shared by pointers and Vars)
//!   |
//!   +-- ValueHandle
//!         +-- Owned(Value)          (snapshot, never settable)
//!         +-- Place { slot, path }  (location inside a slot, addressable)
//!         +-- Invalid(error)        (deferred navigation failure)
//! ```
//!
//! Every write goes through `Place::store`, which rewrites one node inside a
//! slot under its write lock. Readers clone what they need under the read
//! lock, so no guard outlives a single operation.

mod call;
mod handle;
mod place;
mod render;

#[cfg(test)]
mod tests;

pub use handle::ValueHandle;

use crate::error::Result;
use crate::kind::Kind;
use crate::types::descriptor::{Shape, Type};
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared mutable storage cell.
pub type Slot = Arc<RwLock<Value>>;

/// Checks that a value still decodes as the host type owning a slot.
pub(crate) type DecodeCheck = fn(&Value) -> Result<()>;

pub(crate) fn decodes<T: crate::Reflect>(value: &Value) -> Result<()> {
    T::from_value(value).map(drop)
}

/// Type-erased callable body of a function value.
pub type Callable = Arc<dyn Fn(&[ValueHandle]) -> Result<Vec<ValueHandle>> + Send + Sync>;

/// A non-nil function value.
#[derive(Clone)]
pub struct FuncValue {
    callable: Callable,
    code: usize,
    host: Option<Arc<dyn Any + Send + Sync>>,
}

impl FuncValue {
    /// Wrap a synthesized callable. Its code pointer is the callable's address.
    pub fn new(callable: Callable) -> Self {
        let code = Arc::as_ptr(&callable) as *const () as usize;
        Self {
            callable,
            code,
            host: None,
        }
    }

    /// Wrap a host function; `code` is the host function address.
    pub(crate) fn host(callable: Callable, code: usize, host: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            callable,
            code,
            host: Some(host),
        }
    }

    pub fn callable(&self) -> &Callable {
        &self.callable
    }

    /// Identity of the underlying code.
    pub fn code_pointer(&self) -> usize {
        self.code
    }

    pub(crate) fn host_ref(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.host.as_deref()
    }

    /// True for stubs and bound methods: no host function pointer behind it.
    pub fn is_synthesized(&self) -> bool {
        self.host.is_none()
    }
}

impl fmt::Debug for FuncValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FuncValue({:#x})", self.code)
    }
}

/// Interface content: dynamic type plus value.
#[derive(Debug, Clone, PartialEq)]
pub struct Boxed {
    pub ty: Type,
    pub value: Value,
}

impl Boxed {
    pub fn new(ty: Type, value: Value) -> Self {
        Self { ty, value }
    }
}

/// Dynamic representation of a reflected value.
///
/// Integers are held widened (`i64`/`u64`) and floats as `f64`; stores
/// through a [`ValueHandle`] truncate to the width of the target kind.
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    /// `None` is the nil pointer.
    Ptr(Option<Slot>),
    /// Field values in declaration order.
    Struct(Vec<Value>),
    /// Slice or array elements.
    List(Vec<Value>),
    /// `None` is the nil function.
    Func(Option<FuncValue>),
    /// `None` is the empty interface.
    Interface(Option<Box<Boxed>>),
}

impl Value {
    /// Zero value of a type (false, 0, "", nil, empty or zeroed aggregates).
    pub fn zero(ty: &Type) -> Value {
        match ty.kind() {
            Kind::Bool => Value::Bool(false),
            k if k.is_signed() => Value::Int(0),
            k if k.is_unsigned() => Value::Uint(0),
            k if k.is_float() => Value::Float(0.0),
            Kind::String => Value::Str(String::new()),
            Kind::Ptr => Value::Ptr(None),
            Kind::Func => Value::Func(None),
            Kind::Interface => Value::Interface(None),
            Kind::Slice => Value::List(Vec::new()),
            _ => match ty.shape() {
                Shape::Struct(fields) => {
                    Value::Struct(fields.iter().map(|f| Value::zero(&f.ty)).collect())
                }
                Shape::Array { elem, len } => {
                    Value::List((0..*len).map(|_| Value::zero(elem)).collect())
                }
                _ => Value::Struct(Vec::new()),
            },
        }
    }

    /// Short variant name for diagnostics.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "signed integer",
            Value::Uint(_) => "unsigned integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Ptr(_) => "pointer",
            Value::Struct(_) => "struct",
            Value::List(_) => "list",
            Value::Func(_) => "func",
            Value::Interface(_) => "interface",
        }
    }

    /// True when a synthesized function value appears anywhere inside.
    pub(crate) fn holds_synthesized_func(&self) -> bool {
        match self {
            Value::Func(Some(func)) => func.is_synthesized(),
            Value::Struct(items) | Value::List(items) => {
                items.iter().any(Value::holds_synthesized_func)
            }
            Value::Interface(Some(boxed)) => boxed.value.holds_synthesized_func(),
            _ => false,
        }
    }

    /// Address of the pointee storage, 0 for nil.
    pub(crate) fn slot_address(slot: &Option<Slot>) -> usize {
        slot.as_ref().map_or(0, addr_of)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Ptr(a), Value::Ptr(b)) => match (a, b) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            },
            (Value::Struct(a), Value::Struct(b)) | (Value::List(a), Value::List(b)) => a == b,
            // Function values are never comparable.
            (Value::Func(_), Value::Func(_)) => false,
            (Value::Interface(a), Value::Interface(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Int(v) => write!(f, "Int({})", v),
            Value::Uint(v) => write!(f, "Uint({})", v),
            Value::Float(v) => write!(f, "Float({})", v),
            Value::Str(v) => write!(f, "Str({:?})", v),
            Value::Ptr(None) => f.write_str("Ptr(nil)"),
            // Pointee is not printed: pointers may form cycles.
            Value::Ptr(slot) => write!(f, "Ptr({:#x})", Value::slot_address(slot)),
            Value::Struct(fields) => f.debug_tuple("Struct").field(fields).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Func(None) => f.write_str("Func(nil)"),
            Value::Func(Some(func)) => write!(f, "Func({:#x})", func.code_pointer()),
            Value::Interface(None) => f.write_str("Interface(nil)"),
            Value::Interface(Some(boxed)) => {
                write!(f, "Interface({}: {:?})", boxed.ty, boxed.value)
            }
        }
    }
}

pub(crate) fn addr_of(slot: &Slot) -> usize {
    Arc::as_ptr(slot) as *const () as usize
}

/// Bind a host value as a read-only snapshot.
pub fn bind<T: crate::Reflect>(value: &T) -> ValueHandle {
    ValueHandle::of(value)
}

/// Bind a host variable as an addressable, settable handle.
pub fn bind_addressable<T: crate::Reflect>(var: &crate::Var<T>) -> ValueHandle {
    ValueHandle::addressable(var)
}
