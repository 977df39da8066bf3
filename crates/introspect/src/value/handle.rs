// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `ValueHandle`: a typed view of one value.

use super::place::{Place, Step};
use super::{decodes, Boxed, FuncValue, Value};
use crate::error::{ReflectError, Result};
use crate::host::{Reflect, Var};
use crate::kind::Kind;
use crate::types::descriptor::Type;
use crate::types::method::MethodDescriptor;
use crate::types::registry::func_of;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Clone)]
enum Storage {
    Invalid(ReflectError),
    Owned(Value),
    Place(Place),
}

/// A view of a value with its static type and access flags.
///
/// - Bound from a plain host value: a snapshot, neither addressable nor
///   settable.
/// - Bound from a [`Var`], or reached by dereferencing a pointer:
///   addressable and settable. Fields and elements inherit both flags;
///   non-`pub` fields stay addressable but are never settable.
/// - Navigation failures produce an invalid handle that carries the error
///   until an operation needs the value.
#[derive(Clone)]
pub struct ValueHandle {
    ty: Option<Type>,
    storage: Storage,
    addressable: bool,
    settable: bool,
}

impl Default for ValueHandle {
    fn default() -> Self {
        Self::invalid(ReflectError::invalid("zero value handle"))
    }
}

impl ValueHandle {
    // ===================================================================
    // Construction
    // ===================================================================

    /// Snapshot of a host value.
    pub fn of<T: Reflect>(value: &T) -> Self {
        Self::owned(T::type_of(), value.to_value())
    }

    /// Addressable, settable view of a host variable.
    pub fn addressable<T: Reflect>(var: &Var<T>) -> Self {
        Self::place(T::type_of(), Place::root(var.slot().clone(), Some(decodes::<T>)), true)
    }

    /// Handle that fails every operation except validity checks and rendering.
    pub fn invalid(err: ReflectError) -> Self {
        Self {
            ty: None,
            storage: Storage::Invalid(err),
            addressable: false,
            settable: false,
        }
    }

    /// Owned handle of an explicit type.
    pub fn owned(ty: Type, value: Value) -> Self {
        Self {
            ty: Some(ty),
            storage: Storage::Owned(value),
            addressable: false,
            settable: false,
        }
    }

    /// Zero value of `ty` (not settable).
    pub fn zero(ty: &Type) -> Self {
        Self::owned(ty.clone(), Value::zero(ty))
    }

    /// Pointer to freshly allocated zero storage of type `T` (`new(T)`).
    ///
    /// Returns the pointer handle; its `deref` is settable.
    pub fn new_pointer<T: Reflect>() -> Self {
        let elem_ty = T::type_of();
        let slot = Arc::new(RwLock::new(Value::zero(&elem_ty)));
        Self::owned(crate::Ptr::<T>::type_of(), Value::Ptr(Some(slot)))
    }

    fn place(ty: Type, place: Place, settable: bool) -> Self {
        Self {
            ty: Some(ty),
            storage: Storage::Place(place),
            addressable: true,
            settable,
        }
    }

    // ===================================================================
    // Flags and type
    // ===================================================================

    pub fn is_valid(&self) -> bool {
        !matches!(self.storage, Storage::Invalid(_))
    }

    /// Error carried by an invalid handle.
    pub fn error(&self) -> Option<&ReflectError> {
        match &self.storage {
            Storage::Invalid(err) => Some(err),
            _ => None,
        }
    }

    /// Kind of the static type; [`Kind::Invalid`] for invalid handles.
    pub fn kind(&self) -> Kind {
        self.ty.as_ref().map_or(Kind::Invalid, |t| t.kind())
    }

    /// Static type; fails with [`ReflectError::NoType`] on invalid handles.
    pub fn type_of(&self) -> Result<Type> {
        self.ty.clone().ok_or(ReflectError::NoType)
    }

    pub(crate) fn ty(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    pub fn can_addr(&self) -> bool {
        self.addressable
    }

    pub fn can_set(&self) -> bool {
        self.settable
    }

    // ===================================================================
    // Raw access
    // ===================================================================

    /// Current dynamic value (cloned out of storage).
    pub fn load(&self) -> Result<Value> {
        match &self.storage {
            Storage::Invalid(err) => Err(err.clone()),
            Storage::Owned(value) => Ok(value.clone()),
            Storage::Place(place) => place.load(),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&Value) -> R) -> Result<R> {
        match &self.storage {
            Storage::Invalid(err) => Err(err.clone()),
            Storage::Owned(value) => Ok(f(value)),
            Storage::Place(place) => place.read(f),
        }
    }

    fn live_type(&self) -> Result<&Type> {
        match &self.storage {
            Storage::Invalid(err) => Err(err.clone()),
            _ => self.ty.as_ref().ok_or(ReflectError::NoType),
        }
    }

    /// Location to write through, or `Unsettable`.
    fn writable(&self, op: &str) -> Result<&Place> {
        match &self.storage {
            Storage::Invalid(err) => Err(err.clone()),
            Storage::Place(place) if self.settable => Ok(place),
            _ => {
                log::debug!("[value] rejected {} on read-only {}", op, self.kind());
                Err(ReflectError::Unsettable(op.to_string()))
            }
        }
    }

    /// Store a value already checked against the slot type.
    pub(crate) fn store_value(&self, value: Value) -> Result<()> {
        self.writable("set")?.store(value)
    }

    /// Receiver for a value-receiver method: `T` itself or `Ptr<T>`.
    pub(crate) fn receiver<T: Reflect>(&self) -> Result<T> {
        if self.kind() == Kind::Ptr && self.live_type()? != &T::type_of() {
            self.deref().get::<T>()
        } else {
            self.get::<T>()
        }
    }

    pub(crate) fn func_value(&self) -> Result<FuncValue> {
        match self.load()? {
            Value::Func(Some(func)) => Ok(func),
            Value::Func(None) => Err(ReflectError::invalid("call of nil function")),
            other => Err(ReflectError::mismatch("func", other.variant_name())),
        }
    }

    // ===================================================================
    // Navigation
    // ===================================================================

    /// Pointee of a pointer, or content of an interface.
    ///
    /// Nil pointers and empty interfaces yield an invalid handle.
    pub fn deref(&self) -> ValueHandle {
        let ty = match self.live_type() {
            Ok(ty) => ty,
            Err(err) => return Self::invalid(err),
        };
        match ty.kind() {
            Kind::Ptr => {
                let Some(elem) = ty.elem().cloned() else {
                    return Self::invalid(ReflectError::NoType);
                };
                match self.load() {
                    Ok(Value::Ptr(Some(slot))) => {
                        Self::place(elem, Place::root(slot, ty.pointee_check), true)
                    }
                    Ok(Value::Ptr(None)) => {
                        Self::invalid(ReflectError::invalid("deref of nil pointer"))
                    }
                    Ok(other) => Self::invalid(ReflectError::mismatch("pointer", other.variant_name())),
                    Err(err) => Self::invalid(err),
                }
            }
            Kind::Interface => match self.load() {
                Ok(Value::Interface(Some(boxed))) => Self::owned(boxed.ty, boxed.value),
                Ok(_) => Self::invalid(ReflectError::invalid("deref of nil interface")),
                Err(err) => Self::invalid(err),
            },
            other => Self::invalid(ReflectError::invalid(format!(
                "deref of non-pointer {} value",
                other
            ))),
        }
    }

    fn child(&self, ty: Type, step: Step, writable: bool) -> ValueHandle {
        match &self.storage {
            Storage::Invalid(err) => Self::invalid(err.clone()),
            Storage::Place(place) => {
                Self::place(ty, place.child(step), self.settable && writable)
            }
            Storage::Owned(value) => {
                let picked = match (value, step) {
                    (Value::Struct(fields), Step::Field(i)) => fields.get(i).cloned(),
                    (Value::List(items), Step::Index(i)) => items.get(i).cloned(),
                    _ => None,
                };
                match picked {
                    Some(v) => Self::owned(ty, v),
                    None => Self::invalid(ReflectError::invalid("malformed aggregate value")),
                }
            }
        }
    }

    /// Field by name.
    pub fn field(&self, name: &str) -> ValueHandle {
        let ty = match self.struct_type("field") {
            Ok(ty) => ty,
            Err(err) => return Self::invalid(err),
        };
        match ty.field(name) {
            Some(fd) => self.child(fd.ty.clone(), Step::Field(fd.index), fd.exported),
            None => Self::invalid(ReflectError::UnknownField(name.to_string())),
        }
    }

    /// Field by declaration index.
    pub fn field_by_index(&self, index: usize) -> ValueHandle {
        let ty = match self.struct_type("field") {
            Ok(ty) => ty,
            Err(err) => return Self::invalid(err),
        };
        match ty.field_by_index(index) {
            Some(fd) => self.child(fd.ty.clone(), Step::Field(index), fd.exported),
            None => Self::invalid(ReflectError::IndexOutOfBounds {
                index,
                length: ty.num_field(),
            }),
        }
    }

    pub fn num_field(&self) -> Result<usize> {
        Ok(self.struct_type("num_field")?.num_field())
    }

    fn struct_type(&self, op: &str) -> Result<&Type> {
        let ty = self.live_type()?;
        if ty.kind() != Kind::Struct {
            return Err(ReflectError::invalid(format!(
                "{} of non-struct {} value",
                op,
                ty.kind()
            )));
        }
        Ok(ty)
    }

    /// Element of a slice or array.
    pub fn index(&self, index: usize) -> ValueHandle {
        let elem = match self.live_type() {
            Ok(ty) if matches!(ty.kind(), Kind::Slice | Kind::Array) => ty.elem().cloned(),
            Ok(ty) => {
                return Self::invalid(ReflectError::invalid(format!(
                    "index of non-sequence {} value",
                    ty.kind()
                )))
            }
            Err(err) => return Self::invalid(err),
        };
        let Some(elem) = elem else {
            return Self::invalid(ReflectError::NoType);
        };
        match self.len() {
            Ok(length) if index < length => self.child(elem, Step::Index(index), true),
            Ok(length) => Self::invalid(ReflectError::IndexOutOfBounds { index, length }),
            Err(err) => Self::invalid(err),
        }
    }

    /// Element count of slices and arrays, byte length of strings.
    pub fn len(&self) -> Result<usize> {
        let kind = self.live_type()?.kind();
        self.read(|v| match v {
            Value::List(items) => Ok(items.len()),
            Value::Str(s) => Ok(s.len()),
            _ => Err(ReflectError::invalid(format!("len of {} value", kind))),
        })?
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Nil test for pointers, functions and interfaces.
    pub fn is_nil(&self) -> Result<bool> {
        let kind = self.live_type()?.kind();
        self.read(|v| match v {
            Value::Ptr(p) => Ok(p.is_none()),
            Value::Func(f) => Ok(f.is_none()),
            Value::Interface(b) => Ok(b.is_none()),
            _ => Err(ReflectError::invalid(format!("is_nil of {} value", kind))),
        })?
    }

    // ===================================================================
    // Extraction
    // ===================================================================

    pub fn bool(&self) -> Result<bool> {
        match self.load()? {
            Value::Bool(v) => Ok(v),
            _ => Err(ReflectError::mismatch("bool", self.kind())),
        }
    }

    /// Any signed integer kind, widened.
    pub fn int(&self) -> Result<i64> {
        match self.load()? {
            Value::Int(v) => Ok(v),
            _ => Err(ReflectError::mismatch("signed integer", self.kind())),
        }
    }

    /// Any unsigned integer kind, widened.
    pub fn uint(&self) -> Result<u64> {
        match self.load()? {
            Value::Uint(v) => Ok(v),
            _ => Err(ReflectError::mismatch("unsigned integer", self.kind())),
        }
    }

    pub fn float(&self) -> Result<f64> {
        match self.load()? {
            Value::Float(v) => Ok(v),
            _ => Err(ReflectError::mismatch("float", self.kind())),
        }
    }

    pub fn string(&self) -> Result<String> {
        match self.load()? {
            Value::Str(v) => Ok(v),
            _ => Err(ReflectError::mismatch("string", self.kind())),
        }
    }

    /// Extract as host type `T`; the static type must be exactly `T`.
    pub fn get<T: Reflect>(&self) -> Result<T> {
        let ty = self.live_type()?;
        let want = T::type_of();
        if *ty != want {
            return Err(ReflectError::mismatch(&want, ty));
        }
        T::from_value(&self.load()?)
    }

    /// Storage address of a pointer (0 when nil), or of this location when
    /// addressable.
    pub fn address(&self) -> Result<usize> {
        let kind = self.live_type()?.kind();
        match &self.storage {
            _ if kind == Kind::Ptr => self.read(|v| match v {
                Value::Ptr(slot) => Value::slot_address(slot),
                _ => 0,
            }),
            Storage::Place(place) => Ok(place.address()),
            _ => Err(ReflectError::invalid(format!(
                "address of unaddressable {} value",
                kind
            ))),
        }
    }

    /// Code identity of a function value (0 when nil).
    pub fn code_pointer(&self) -> Result<usize> {
        let kind = self.live_type()?.kind();
        if kind != Kind::Func {
            return Err(ReflectError::invalid(format!("code pointer of {} value", kind)));
        }
        self.read(|v| match v {
            Value::Func(Some(func)) => func.code_pointer(),
            _ => 0,
        })
    }

    // ===================================================================
    // Mutation
    // ===================================================================

    /// Assign `value`; its type must equal this handle's type. Interface
    /// slots accept any value and box it.
    pub fn set(&self, value: &ValueHandle) -> Result<()> {
        let place = self.writable("set")?;
        let ty = self.live_type()?;
        let new_ty = value
            .type_of()
            .map_err(|_| ReflectError::invalid("set using invalid value"))?;
        let new_value = value.load()?;
        let stored = if new_ty == *ty {
            new_value
        } else if ty.kind() == Kind::Interface {
            Value::Interface(Some(Box::new(Boxed::new(new_ty, new_value))))
        } else {
            return Err(ReflectError::mismatch(ty, &new_ty));
        };
        place.store(stored)
    }

    pub fn set_bool(&self, v: bool) -> Result<()> {
        let place = self.writable("set_bool")?;
        self.require_kind(|k| k == Kind::Bool, "bool")?;
        place.store(Value::Bool(v))
    }

    /// Store into any signed integer kind, truncating to its width.
    pub fn set_int(&self, v: i64) -> Result<()> {
        let place = self.writable("set_int")?;
        let kind = self.require_kind(Kind::is_signed, "signed integer")?;
        place.store(Value::Int(wrap_signed(v, kind)))
    }

    /// Store into any unsigned integer kind, truncating to its width.
    pub fn set_uint(&self, v: u64) -> Result<()> {
        let place = self.writable("set_uint")?;
        let kind = self.require_kind(Kind::is_unsigned, "unsigned integer")?;
        place.store(Value::Uint(wrap_unsigned(v, kind)))
    }

    /// Store into any float kind; `f32` slots round to single precision.
    pub fn set_float(&self, v: f64) -> Result<()> {
        let place = self.writable("set_float")?;
        let kind = self.require_kind(Kind::is_float, "float")?;
        place.store(Value::Float(round_float(v, kind)))
    }

    pub fn set_string(&self, v: &str) -> Result<()> {
        let place = self.writable("set_string")?;
        self.require_kind(|k| k == Kind::String, "string")?;
        place.store(Value::Str(v.to_string()))
    }

    fn require_kind(&self, accept: impl Fn(Kind) -> bool, what: &str) -> Result<Kind> {
        let ty = self.live_type()?;
        if accept(ty.kind()) {
            Ok(ty.kind())
        } else {
            Err(ReflectError::mismatch(ty, what))
        }
    }

    /// True when `x` does not fit the signed kind of this handle.
    pub fn overflows_int(&self, x: i64) -> Result<bool> {
        let kind = self.require_kind(Kind::is_signed, "signed integer")?;
        Ok(wrap_signed(x, kind) != x)
    }

    /// True when `x` does not fit the unsigned kind of this handle.
    pub fn overflows_uint(&self, x: u64) -> Result<bool> {
        let kind = self.require_kind(Kind::is_unsigned, "unsigned integer")?;
        Ok(wrap_unsigned(x, kind) != x)
    }

    /// True when finite `x` exceeds the range of the float kind.
    pub fn overflows_float(&self, x: f64) -> Result<bool> {
        let kind = self.require_kind(Kind::is_float, "float")?;
        Ok(kind == Kind::Float32 && x.is_finite() && x.abs() > f64::from(f32::MAX))
    }

    // ===================================================================
    // Conversion
    // ===================================================================

    /// Convert to `target`: identical types, boxing into interfaces,
    /// numeric kind changes (with truncation), and retyping between types
    /// that share an underlying structure. The result is an owned snapshot.
    pub fn convert(&self, target: &Type) -> Result<ValueHandle> {
        let from = self.live_type()?;
        let value = self.load()?;
        if from == target || target.same_underlying(from) {
            return Ok(Self::owned(target.clone(), value));
        }
        if target.kind() == Kind::Interface {
            let boxed = if from.kind() == Kind::Interface {
                value
            } else {
                Value::Interface(Some(Box::new(Boxed::new(from.clone(), value))))
            };
            return Ok(Self::owned(target.clone(), boxed));
        }
        if from.kind().is_numeric() && target.kind().is_numeric() {
            return Ok(Self::owned(
                target.clone(),
                convert_numeric(&value, target.kind()),
            ));
        }
        Err(ReflectError::mismatch(target, from))
    }

    // ===================================================================
    // Methods
    // ===================================================================

    pub fn num_method(&self) -> usize {
        self.ty.as_ref().map_or(0, |t| t.num_method())
    }

    /// Method `index` of this value's method set, bound to this receiver.
    pub fn method(&self, index: usize) -> ValueHandle {
        let ty = match self.live_type() {
            Ok(ty) => ty,
            Err(err) => return Self::invalid(err),
        };
        match ty.method(index) {
            Some(md) => self.bind_method(md),
            None => Self::invalid(ReflectError::IndexOutOfBounds {
                index,
                length: ty.num_method(),
            }),
        }
    }

    /// Method by name, bound to this receiver.
    pub fn method_by_name(&self, name: &str) -> ValueHandle {
        let ty = match self.live_type() {
            Ok(ty) => ty,
            Err(err) => return Self::invalid(err),
        };
        match ty.method_by_name(name) {
            Some(md) => self.bind_method(md),
            None => Self::invalid(ReflectError::UnknownMethod(name.to_string())),
        }
    }

    /// Pointers are captured by reference; values are snapshotted.
    fn bind_method(&self, md: &MethodDescriptor) -> ValueHandle {
        let raw = match md.callable() {
            Ok(raw) => raw,
            Err(err) => return Self::invalid(err),
        };
        let recv = match (&self.storage, self.kind()) {
            (_, Kind::Ptr) => self.clone(),
            (Storage::Owned(_), _) => self.clone(),
            _ => match (self.load(), self.ty.clone()) {
                (Ok(value), Some(ty)) => Self::owned(ty, value),
                (Err(err), _) => return Self::invalid(err),
                (_, None) => return Self::invalid(ReflectError::NoType),
            },
        };
        let sig = md.signature();
        let params = sig.params().get(1..).unwrap_or_default().to_vec();
        let bound_ty = func_of(params, sig.results().to_vec());
        let callable: super::Callable = Arc::new(move |args: &[ValueHandle]| {
            let mut full = Vec::with_capacity(args.len() + 1);
            full.push(recv.clone());
            full.extend_from_slice(args);
            raw(&full)
        });
        Self::owned(bound_ty, Value::Func(Some(FuncValue::new(callable))))
    }

    pub(crate) fn same_location(&self, other: &ValueHandle) -> bool {
        match (&self.storage, &other.storage) {
            (Storage::Place(a), Storage::Place(b)) => a.same_location(b),
            _ => false,
        }
    }
}

impl PartialEq for ValueHandle {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => return true,
            (true, true) => {}
            _ => return false,
        }
        if self.ty != other.ty {
            return false;
        }
        if self.kind() == Kind::Func {
            return false;
        }
        if self.same_location(other) {
            return true;
        }
        match (self.load(), other.load()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Debug for ValueHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.ty {
            None => f.write_str("ValueHandle(<invalid>)"),
            Some(ty) => write!(
                f,
                "ValueHandle({}, addressable={}, settable={})",
                ty, self.addressable, self.settable
            ),
        }
    }
}

// =======================================================================
// Numeric helpers
// =======================================================================

pub(crate) fn wrap_signed(v: i64, kind: Kind) -> i64 {
    match kind {
        Kind::Int8 => i64::from(v as i8),
        Kind::Int16 => i64::from(v as i16),
        Kind::Int32 => i64::from(v as i32),
        Kind::Int => v as isize as i64,
        _ => v,
    }
}

pub(crate) fn wrap_unsigned(v: u64, kind: Kind) -> u64 {
    match kind {
        Kind::Uint8 => u64::from(v as u8),
        Kind::Uint16 => u64::from(v as u16),
        Kind::Uint32 => u64::from(v as u32),
        Kind::Uint => v as usize as u64,
        _ => v,
    }
}

pub(crate) fn round_float(v: f64, kind: Kind) -> f64 {
    if kind == Kind::Float32 {
        f64::from(v as f32)
    } else {
        v
    }
}

fn convert_numeric(value: &Value, target: Kind) -> Value {
    if target.is_signed() {
        let raw = match value {
            Value::Int(v) => *v,
            Value::Uint(v) => *v as i64,
            Value::Float(v) => *v as i64,
            _ => 0,
        };
        Value::Int(wrap_signed(raw, target))
    } else if target.is_unsigned() {
        let raw = match value {
            Value::Int(v) => *v as u64,
            Value::Uint(v) => *v,
            Value::Float(v) => *v as u64,
            _ => 0,
        };
        Value::Uint(wrap_unsigned(raw, target))
    } else {
        let raw = match value {
            Value::Int(v) => *v as f64,
            Value::Uint(v) => *v as f64,
            Value::Float(v) => *v,
            _ => 0.0,
        };
        Value::Float(round_float(raw, target))
    }
}
