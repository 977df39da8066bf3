// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reflect impls for scalars and sequences.

use super::Reflect;
use crate::error::{ReflectError, Result};
use crate::kind::Kind;
use crate::types::descriptor::{Type, TypeDescriptor};
use crate::value::Value;
use std::mem::size_of;

macro_rules! impl_reflect_int {
    ($($ty:ty => $kind:ident, $variant:ident, $repr:ty;)*) => {
        $(
            impl Reflect for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::primitive(stringify!($ty), Kind::$kind, size_of::<$ty>())
                }

                fn to_value(&self) -> Value {
                    Value::$variant(*self as $repr)
                }

                fn from_value(value: &Value) -> Result<Self> {
                    match value {
                        Value::$variant(v) => Ok(*v as $ty),
                        other => Err(ReflectError::mismatch(stringify!($ty), other.variant_name())),
                    }
                }
            }
        )*
    };
}

impl_reflect_int! {
    i8 => Int8, Int, i64;
    i16 => Int16, Int, i64;
    i32 => Int32, Int, i64;
    i64 => Int64, Int, i64;
    isize => Int, Int, i64;
    u8 => Uint8, Uint, u64;
    u16 => Uint16, Uint, u64;
    u32 => Uint32, Uint, u64;
    u64 => Uint64, Uint, u64;
    usize => Uint, Uint, u64;
}

impl Reflect for f32 {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::primitive("f32", Kind::Float32, size_of::<f32>())
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Float(v) => Ok(*v as f32),
            other => Err(ReflectError::mismatch("f32", other.variant_name())),
        }
    }
}

impl Reflect for f64 {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::primitive("f64", Kind::Float64, size_of::<f64>())
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Float(v) => Ok(*v),
            other => Err(ReflectError::mismatch("f64", other.variant_name())),
        }
    }
}

impl Reflect for bool {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::primitive("bool", Kind::Bool, size_of::<bool>())
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(v) => Ok(*v),
            other => Err(ReflectError::mismatch("bool", other.variant_name())),
        }
    }
}

impl Reflect for String {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::primitive("String", Kind::String, size_of::<String>())
    }

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Str(v) => Ok(v.clone()),
            other => Err(ReflectError::mismatch("String", other.variant_name())),
        }
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::slice(<T as Reflect>::type_of as fn() -> Type, size_of::<Vec<T>>())
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Reflect::to_value).collect())
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            other => Err(ReflectError::mismatch("slice", other.variant_name())),
        }
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::array(T::type_of(), N, size_of::<[T; N]>())
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Reflect::to_value).collect())
    }

    fn from_value(value: &Value) -> Result<Self> {
        let items = match value {
            Value::List(items) => items,
            other => return Err(ReflectError::mismatch("array", other.variant_name())),
        };
        let elems = items.iter().map(T::from_value).collect::<Result<Vec<T>>>()?;
        <[T; N]>::try_from(elems).map_err(|rest| ReflectError::ArityMismatch {
            expected: N,
            got: rest.len(),
        })
    }
}
