// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamically typed box (`any`).

use super::Reflect;
use crate::config::ANY_TYPE_NAME;
use crate::error::{ReflectError, Result};
use crate::types::descriptor::{Type, TypeDescriptor};
use crate::value::{Boxed, Value, ValueHandle};
use std::fmt;

/// Holds a value of any reflected type together with its type, or nothing.
#[derive(Clone, Default)]
pub struct AnyValue(Option<Boxed>);

impl AnyValue {
    pub fn new<T: Reflect>(value: &T) -> Self {
        Self(Some(Boxed::new(T::type_of(), value.to_value())))
    }

    pub fn nil() -> Self {
        Self(None)
    }

    /// Box the current value of a handle.
    pub fn from_handle(handle: &ValueHandle) -> Result<Self> {
        let ty = handle.type_of()?;
        Ok(Self(Some(Boxed::new(ty, handle.load()?))))
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_none()
    }

    /// Dynamic type of the content.
    pub fn content_type(&self) -> Option<&Type> {
        self.0.as_ref().map(|b| &b.ty)
    }

    /// Extract the content as `T`; fails unless the dynamic type is `T`.
    pub fn downcast<T: Reflect>(&self) -> Result<T> {
        let boxed = self
            .0
            .as_ref()
            .ok_or_else(|| ReflectError::invalid("downcast of nil interface"))?;
        let want = T::type_of();
        if boxed.ty != want {
            return Err(ReflectError::mismatch(&want, &boxed.ty));
        }
        T::from_value(&boxed.value)
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(boxed) => write!(f, "AnyValue({})", boxed.ty),
            None => f.write_str("AnyValue(nil)"),
        }
    }
}

impl Reflect for AnyValue {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::interface(None, std::mem::size_of::<AnyValue>())
    }

    fn to_value(&self) -> Value {
        Value::Interface(self.0.clone().map(Box::new))
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Interface(content) => Ok(Self(content.as_deref().cloned())),
            other => Err(ReflectError::mismatch(ANY_TYPE_NAME, other.variant_name())),
        }
    }
}
