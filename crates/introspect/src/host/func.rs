// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reflect impls for function pointers.
//!
//! `fn(A, B) -> R` reflects as an anonymous function type whose identity is
//! structural: it is the same [`Type`] as any other function (including a
//! stub or a method's raw signature) with identical parameter and result
//! types. `Option<fn(..)>` shares that type and maps `None` to a nil
//! function value.
//!
//! A plain `fn` pointer can only hold host code. Storage that must accept
//! synthesized functions (stubs) uses [`Func<S>`], which has the same type
//! as `S` but keeps any function value.

use super::Reflect;
use crate::error::{ReflectError, Result};
use crate::types::descriptor::{Signature, Type, TypeDescriptor};
use crate::types::method::{take_arg, IntoResults};
use crate::types::registry::func_of;
use crate::value::{Callable, FuncValue, Value, ValueHandle};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Host function pointer types with a reflected signature.
pub trait FnPointer: Reflect + Copy {
    /// Parameter and result types, in declaration order.
    fn signature() -> (Vec<Type>, Vec<Type>);
}

macro_rules! impl_reflect_fn {
    ($count:expr; $($arg:ident),*) => {
        impl<R: IntoResults, $($arg: Reflect,)*> FnPointer for fn($($arg),*) -> R {
            fn signature() -> (Vec<Type>, Vec<Type>) {
                (vec![$($arg::type_of()),*], R::result_types())
            }
        }

        impl<R: IntoResults, $($arg: Reflect,)*> Reflect for fn($($arg),*) -> R {
            // Interned by shape, not by TypeId.
            fn type_of() -> Type {
                let (params, results) = <Self as FnPointer>::signature();
                func_of(params, results)
            }

            // Not reached through the registry; kept consistent with
            // `type_of` for callers that build a standalone descriptor.
            fn describe() -> TypeDescriptor {
                let (params, results) = <Self as FnPointer>::signature();
                TypeDescriptor::func(Signature::new(params, results))
            }

            fn to_value(&self) -> Value {
                let f = *self;
                #[allow(non_snake_case, unused_mut, unused_variables)]
                let callable: Callable = Arc::new(move |args: &[ValueHandle]| {
                    let mut iter = args.iter();
                    $(let $arg: $arg = take_arg(&mut iter, $count, args.len())?.get::<$arg>()?;)*
                    Ok(f($($arg),*).into_results())
                });
                Value::Func(Some(FuncValue::host(callable, f as usize, Arc::new(f))))
            }

            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::Func(Some(func)) => func
                        .host_ref()
                        .and_then(|h| h.downcast_ref::<Self>())
                        .copied()
                        .ok_or_else(|| {
                            ReflectError::mismatch("host function pointer", "synthesized function")
                        }),
                    Value::Func(None) => Err(ReflectError::invalid("nil function")),
                    other => Err(ReflectError::mismatch("func", other.variant_name())),
                }
            }
        }

        impl<R: IntoResults, $($arg: Reflect,)*> Reflect for Option<fn($($arg),*) -> R> {
            fn type_of() -> Type {
                <fn($($arg),*) -> R as Reflect>::type_of()
            }

            fn describe() -> TypeDescriptor {
                <fn($($arg),*) -> R as Reflect>::describe()
            }

            fn to_value(&self) -> Value {
                match self {
                    Some(f) => f.to_value(),
                    None => Value::Func(None),
                }
            }

            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::Func(None) => Ok(None),
                    other => <fn($($arg),*) -> R as Reflect>::from_value(other).map(Some),
                }
            }
        }
    };
}

impl_reflect_fn!(0;);
impl_reflect_fn!(1; A1);
impl_reflect_fn!(2; A1, A2);
impl_reflect_fn!(3; A1, A2, A3);

/// Function slot of signature `S` that holds host functions and stubs alike.
///
/// Reflects as the same type as `S`, so a stub made for that type can be
/// `set` into a `Func<S>` field and read back with `get`.
pub struct Func<S: FnPointer> {
    inner: Option<FuncValue>,
    _marker: PhantomData<fn() -> S>,
}

impl<S: FnPointer> Func<S> {
    pub fn nil() -> Self {
        Self {
            inner: None,
            _marker: PhantomData,
        }
    }

    pub fn from_fn(f: S) -> Self {
        match f.to_value() {
            Value::Func(inner) => Self {
                inner,
                _marker: PhantomData,
            },
            _ => Self::nil(),
        }
    }

    /// Take the function value of a handle of type `S`.
    pub fn from_handle(handle: &ValueHandle) -> Result<Self> {
        handle.get::<Self>()
    }

    pub fn is_nil(&self) -> bool {
        self.inner.is_none()
    }

    /// The host pointer, when this holds host code.
    pub fn host(&self) -> Option<S> {
        self.inner
            .as_ref()
            .and_then(|func| func.host_ref())
            .and_then(|h| h.downcast_ref::<S>())
            .copied()
    }

    pub fn code_pointer(&self) -> usize {
        self.inner.as_ref().map_or(0, FuncValue::code_pointer)
    }

    pub fn handle(&self) -> ValueHandle {
        ValueHandle::of(self)
    }

    /// Call with argument checking against `S`.
    pub fn call(&self, args: &[ValueHandle]) -> Result<Vec<ValueHandle>> {
        self.handle().call(args)
    }
}

impl<S: FnPointer> Clone for Func<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S: FnPointer> Default for Func<S> {
    fn default() -> Self {
        Self::nil()
    }
}

impl<S: FnPointer> fmt::Debug for Func<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(func) if func.is_synthesized() => write!(f, "Func({}, stub)", S::type_of()),
            Some(_) => write!(f, "Func({})", S::type_of()),
            None => write!(f, "Func({}, nil)", S::type_of()),
        }
    }
}

impl<S: FnPointer> Reflect for Func<S> {
    fn type_of() -> Type {
        S::type_of()
    }

    fn describe() -> TypeDescriptor {
        S::describe()
    }

    fn to_value(&self) -> Value {
        Value::Func(self.inner.clone())
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Func(inner) => Ok(Self {
                inner: inner.clone(),
                _marker: PhantomData,
            }),
            other => Err(ReflectError::mismatch("func", other.variant_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kind;

    fn double(x: i64) -> i64 {
        x * 2
    }

    fn split(x: i64) -> (i64, bool) {
        (x / 2, x % 2 == 0)
    }

    #[test]
    fn test_fn_type_display() {
        assert_eq!(<fn(i64) -> i64>::type_of().to_string(), "fn(i64) -> i64");
        assert_eq!(<fn(i64, String)>::type_of().to_string(), "fn(i64, String)");
        assert_eq!(
            <fn(i64) -> (i64, bool)>::type_of().to_string(),
            "fn(i64) -> (i64, bool)"
        );
        assert_eq!(<fn()>::type_of().kind(), Kind::Func);
    }

    #[test]
    fn test_option_fn_shares_type() {
        assert_eq!(
            <Option<fn(i64) -> i64>>::type_of(),
            <fn(i64) -> i64>::type_of()
        );
        assert!(matches!(
            <Option<fn(i64) -> i64>>::None.to_value(),
            Value::Func(None)
        ));
    }

    #[test]
    fn test_fn_round_trip_and_call() {
        let f = double as fn(i64) -> i64;
        let value = f.to_value();
        let back = <fn(i64) -> i64>::from_value(&value).unwrap();
        assert_eq!(back(4), 8);

        let g = split as fn(i64) -> (i64, bool);
        let out = ValueHandle::of(&g).call(&[ValueHandle::of(&7i64)]).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].int().unwrap(), 3);
        assert!(!out[1].bool().unwrap());
    }

    #[test]
    fn test_describe_matches_interned_type() {
        assert_eq!(
            <fn(i64, String) -> bool>::describe().to_string(),
            <fn(i64, String) -> bool>::type_of().to_string()
        );
        assert_eq!(
            <Option<fn(i64) -> (i64, bool)>>::describe().to_string(),
            <fn(i64) -> (i64, bool)>::type_of().to_string()
        );
        let standalone = <fn(i64) -> i64>::describe();
        assert_eq!(standalone.kind(), Kind::Func);
        assert_eq!(standalone.num_in(), 1);
        assert_eq!(standalone.num_out(), 1);
    }

    #[test]
    fn test_fn_rejects_synthesized_value() {
        let stub = crate::make_stub(&<fn(i64) -> i64>::type_of(), |args| args.to_vec()).unwrap();
        let value = stub.load().unwrap();
        assert!(matches!(
            <fn(i64) -> i64>::from_value(&value),
            Err(ReflectError::TypeMismatch { .. })
        ));
        assert!(matches!(
            <Option<fn(i64) -> i64>>::from_value(&value),
            Err(ReflectError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_func_holds_host_and_stub() {
        assert_eq!(Func::<fn(i64) -> i64>::type_of(), <fn(i64) -> i64>::type_of());

        let host = Func::from_fn(double as fn(i64) -> i64);
        assert!(!host.is_nil());
        assert_eq!(host.host().map(|f| f(3)), Some(6));
        assert_eq!(host.code_pointer(), (double as fn(i64) -> i64) as usize);
        assert_eq!(host.call(&[ValueHandle::of(&5i64)]).unwrap()[0].int().unwrap(), 10);

        let stub = crate::make_stub(&<fn(i64) -> i64>::type_of(), |args| {
            vec![ValueHandle::of(&(args[0].int().unwrap_or(0) + 1))]
        })
        .unwrap();
        let synthesized = Func::<fn(i64) -> i64>::from_handle(&stub).unwrap();
        assert!(synthesized.host().is_none());
        assert_eq!(synthesized.code_pointer(), stub.code_pointer().unwrap());
        assert_eq!(
            synthesized.call(&[ValueHandle::of(&5i64)]).unwrap()[0].int().unwrap(),
            6
        );

        let nil = Func::<fn(i64) -> i64>::nil();
        assert!(nil.is_nil());
        assert_eq!(nil.code_pointer(), 0);
        assert!(nil.handle().is_nil().unwrap());
        assert_eq!(format!("{:?}", nil), "Func(fn(i64) -> i64, nil)");
    }
}
