// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared storage: reflected pointers and addressable variables.

use super::Reflect;
use crate::error::{ReflectError, Result};
use crate::types::descriptor::{Type, TypeDescriptor};
use crate::types::method::pointer_method_set;
use crate::value::{decodes, Slot, Value};
use parking_lot::RwLock;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Nullable shared pointer to a reflected value.
///
/// Clones alias the same storage, so a mutation through one clone (or
/// through a [`ValueHandle`](crate::ValueHandle) obtained by dereferencing
/// it) is observed by every other.
pub struct Ptr<T> {
    slot: Option<Slot>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Reflect> Ptr<T> {
    /// Allocate fresh storage holding `value`.
    pub fn new(value: T) -> Self {
        Self::from_slot(Arc::new(RwLock::new(value.to_value())))
    }

    pub fn nil() -> Self {
        Self {
            slot: None,
            _marker: PhantomData,
        }
    }

    pub(crate) fn from_slot(slot: Slot) -> Self {
        Self {
            slot: Some(slot),
            _marker: PhantomData,
        }
    }

    pub fn is_nil(&self) -> bool {
        self.slot.is_none()
    }

    /// Copy of the pointee.
    pub fn get(&self) -> Result<T> {
        let slot = self.live_slot("get")?;
        let value = slot.read().clone();
        T::from_value(&value)
    }

    /// Overwrite the pointee.
    pub fn set(&self, value: T) -> Result<()> {
        let slot = self.live_slot("set")?;
        *slot.write() = value.to_value();
        Ok(())
    }

    /// Storage address, `None` when nil.
    pub fn address(&self) -> Option<usize> {
        self.slot.as_ref().map(|s| Arc::as_ptr(s) as usize)
    }

    /// True when both pointers refer to the same storage (or are both nil).
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.slot, &other.slot) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    fn live_slot(&self, op: &str) -> Result<&Slot> {
        self.slot
            .as_ref()
            .ok_or_else(|| ReflectError::invalid(format!("{} through nil pointer", op)))
    }
}

impl<T> Clone for Ptr<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Reflect> Default for Ptr<T> {
    fn default() -> Self {
        Self::nil()
    }
}

impl<T: Reflect> fmt::Debug for Ptr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address() {
            Some(addr) => write!(f, "Ptr({:#x})", addr),
            None => f.write_str("Ptr(nil)"),
        }
    }
}

impl<T: Reflect> Reflect for Ptr<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::pointer(<T as Reflect>::type_of as fn() -> Type)
            .with_methods(pointer_method_set::<T>)
            .with_pointee_check(decodes::<T>)
    }

    fn to_value(&self) -> Value {
        Value::Ptr(self.slot.clone())
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Ptr(Some(slot)) => Ok(Self::from_slot(slot.clone())),
            Value::Ptr(None) => Ok(Self::nil()),
            other => Err(ReflectError::mismatch("pointer", other.variant_name())),
        }
    }
}

/// Addressable host variable.
///
/// Binding a `Var` with [`bind_addressable`](crate::bind_addressable) yields
/// a settable handle; writes through it are visible via [`Var::get`].
pub struct Var<T> {
    slot: Slot,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Reflect> Var<T> {
    pub fn new(value: T) -> Self {
        Self {
            slot: Arc::new(RwLock::new(value.to_value())),
            _marker: PhantomData,
        }
    }

    /// Current value.
    pub fn get(&self) -> Result<T> {
        let value = self.slot.read().clone();
        T::from_value(&value)
    }

    /// Replace the value, returning the previous one.
    pub fn replace(&self, value: T) -> Result<T> {
        let previous = std::mem::replace(&mut *self.slot.write(), value.to_value());
        T::from_value(&previous)
    }

    /// Pointer aliasing this variable (`&x`).
    pub fn ptr(&self) -> Ptr<T> {
        Ptr::from_slot(self.slot.clone())
    }

    pub(crate) fn slot(&self) -> &Slot {
        &self.slot
    }
}

impl<T: Reflect> fmt::Debug for Var<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Var({:#x})", Arc::as_ptr(&self.slot) as usize)
    }
}
