// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Method tables.
//!
//! Host types declare methods as [`MethodSpec`]s (through
//! [`Reflect::method_specs`] or `#[reflect(methods)]`). The registry turns
//! them into two method sets per type:
//!
//! - `T` exposes value-receiver methods only.
//! - `Ptr<T>` exposes value- and pointer-receiver methods.
//!
//! Both sets are ordered by name, and every [`MethodDescriptor`] carries the
//! raw signature (receiver first) plus a callable handle implementing it.

use crate::error::{ReflectError, Result};
use crate::host::{Ptr, Reflect};
use crate::types::descriptor::Type;
use crate::types::registry::func_of;
use crate::value::{Callable, FuncValue, Value, ValueHandle};
use std::fmt;
use std::sync::Arc;

/// Receiver form a method is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// `&self`; callable on `T` and `Ptr<T>`.
    Value,
    /// `&mut self`; callable on `Ptr<T>` only.
    Pointer,
}

/// Type-erased method body: receiver handle plus explicit arguments.
pub type MethodBody =
    Arc<dyn Fn(&ValueHandle, &[ValueHandle]) -> Result<Vec<ValueHandle>> + Send + Sync>;

/// Declaration of one host method.
#[derive(Clone)]
pub struct MethodSpec {
    name: String,
    receiver: Receiver,
    params: Vec<Type>,
    results: Vec<Type>,
    body: MethodBody,
}

impl MethodSpec {
    /// Method taking `&T`.
    ///
    /// ```
    /// use introspect::{MethodSpec, Reflect, ReflectMethods};
    ///
    /// #[derive(Reflect)]
    /// #[reflect(methods)]
    /// pub struct Counter {
    ///     pub n: i64,
    /// }
    ///
    /// impl ReflectMethods for Counter {
    ///     fn method_specs() -> Vec<MethodSpec> {
    ///         vec![MethodSpec::value("Get", |c: &Counter| c.n)]
    ///     }
    /// }
    ///
    /// assert_eq!(Counter::type_of().num_method(), 1);
    /// ```
    pub fn value<T, Args, F>(name: impl Into<String>, f: F) -> Self
    where
        T: Reflect,
        F: ValueMethod<T, Args>,
    {
        let f = Arc::new(f);
        Self {
            name: name.into(),
            receiver: Receiver::Value,
            params: F::param_types(),
            results: F::result_types(),
            body: Arc::new(move |recv, args| {
                let this = recv.receiver::<T>()?;
                f.invoke(&this, args)
            }),
        }
    }

    /// Method taking `&mut T`; only present on `Ptr<T>`.
    ///
    /// The receiver is copied out of its slot, mutated, then stored back.
    /// No lock is held while the body runs.
    pub fn pointer<T, Args, F>(name: impl Into<String>, f: F) -> Self
    where
        T: Reflect,
        F: PointerMethod<T, Args>,
    {
        let f = Arc::new(f);
        Self {
            name: name.into(),
            receiver: Receiver::Pointer,
            params: F::param_types(),
            results: F::result_types(),
            body: Arc::new(move |recv, args| {
                let target = recv.deref();
                let mut this = target.get::<T>()?;
                let out = f.invoke(&mut this, args)?;
                target.store_value(this.to_value())?;
                Ok(out)
            }),
        }
    }

    /// Untyped method with an explicit signature (excluding the receiver).
    pub fn raw(
        name: impl Into<String>,
        receiver: Receiver,
        params: Vec<Type>,
        results: Vec<Type>,
        body: MethodBody,
    ) -> Self {
        Self {
            name: name.into(),
            receiver,
            params,
            results,
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn receiver(&self) -> Receiver {
        self.receiver
    }
}

impl fmt::Debug for MethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSpec")
            .field("name", &self.name)
            .field("receiver", &self.receiver)
            .finish_non_exhaustive()
    }
}

/// Method set declaration used by `#[reflect(methods)]`.
pub trait ReflectMethods {
    fn method_specs() -> Vec<MethodSpec>;
}

/// One entry of a type's method set.
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    index: usize,
    receiver: Receiver,
    signature: Type,
    func: ValueHandle,
}

impl MethodDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position in the owning method set.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn receiver(&self) -> Receiver {
        self.receiver
    }

    /// Raw function type; the receiver is the first parameter.
    pub fn signature(&self) -> &Type {
        &self.signature
    }

    /// Callable handle taking the receiver as first argument.
    pub fn func(&self) -> &ValueHandle {
        &self.func
    }

    pub(crate) fn callable(&self) -> Result<Callable> {
        self.func.func_value().map(|f| f.callable().clone())
    }
}

impl PartialEq for MethodDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.index == other.index
            && self.signature == other.signature
            && self.func.code_pointer().ok() == other.func.code_pointer().ok()
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("receiver", &self.receiver)
            .field("signature", &self.signature)
            .finish()
    }
}

/// Value-receiver method set of `T`.
#[doc(hidden)]
pub fn value_method_set<T: Reflect>() -> Vec<MethodDescriptor> {
    build_method_set(T::type_of(), T::method_specs(), false)
}

/// Full method set of `Ptr<T>`.
#[doc(hidden)]
pub fn pointer_method_set<T: Reflect>() -> Vec<MethodDescriptor> {
    build_method_set(Ptr::<T>::type_of(), T::method_specs(), true)
}

fn build_method_set(
    receiver_ty: Type,
    specs: Vec<MethodSpec>,
    include_pointer: bool,
) -> Vec<MethodDescriptor> {
    let mut specs: Vec<MethodSpec> = specs
        .into_iter()
        .filter(|s| include_pointer || s.receiver == Receiver::Value)
        .collect();
    specs.sort_by(|a, b| a.name.cmp(&b.name));

    log::debug!(
        "[methods] built {} method(s) for {}",
        specs.len(),
        receiver_ty
    );

    specs
        .into_iter()
        .enumerate()
        .map(|(index, spec)| {
            let mut params = Vec::with_capacity(spec.params.len() + 1);
            params.push(receiver_ty.clone());
            params.extend(spec.params);
            let signature = func_of(params, spec.results);

            let body = spec.body;
            let callable: Callable = Arc::new(move |args: &[ValueHandle]| {
                let (recv, rest) = args.split_first().ok_or(ReflectError::ArityMismatch {
                    expected: 1,
                    got: 0,
                })?;
                body(recv, rest)
            });
            let func = ValueHandle::owned(
                signature.clone(),
                Value::Func(Some(FuncValue::new(callable))),
            );

            MethodDescriptor {
                name: spec.name,
                index,
                receiver: spec.receiver,
                signature,
                func,
            }
        })
        .collect()
}

// =======================================================================
// Typed adapters
// =======================================================================

/// Results produced by a typed host function or method.
pub trait IntoResults: 'static {
    fn result_types() -> Vec<Type>;
    fn into_results(self) -> Vec<ValueHandle>;
}

impl IntoResults for () {
    fn result_types() -> Vec<Type> {
        Vec::new()
    }

    fn into_results(self) -> Vec<ValueHandle> {
        Vec::new()
    }
}

impl<T: Reflect> IntoResults for T {
    fn result_types() -> Vec<Type> {
        vec![T::type_of()]
    }

    fn into_results(self) -> Vec<ValueHandle> {
        vec![ValueHandle::of(&self)]
    }
}

impl<A: Reflect, B: Reflect> IntoResults for (A, B) {
    fn result_types() -> Vec<Type> {
        vec![A::type_of(), B::type_of()]
    }

    fn into_results(self) -> Vec<ValueHandle> {
        vec![ValueHandle::of(&self.0), ValueHandle::of(&self.1)]
    }
}

/// Next positional argument, or an arity error.
pub(crate) fn take_arg<'a>(
    args: &mut std::slice::Iter<'a, ValueHandle>,
    expected: usize,
    got: usize,
) -> Result<&'a ValueHandle> {
    args.next()
        .ok_or(ReflectError::ArityMismatch { expected, got })
}

/// Host closure usable as a value-receiver method.
pub trait ValueMethod<T, Args>: Send + Sync + 'static {
    fn param_types() -> Vec<Type>;
    fn result_types() -> Vec<Type>;
    fn invoke(&self, recv: &T, args: &[ValueHandle]) -> Result<Vec<ValueHandle>>;
}

/// Host closure usable as a pointer-receiver method.
pub trait PointerMethod<T, Args>: Send + Sync + 'static {
    fn param_types() -> Vec<Type>;
    fn result_types() -> Vec<Type>;
    fn invoke(&self, recv: &mut T, args: &[ValueHandle]) -> Result<Vec<ValueHandle>>;
}

macro_rules! impl_method_adapters {
    ($count:expr; $($arg:ident),*) => {
        impl<T, F, R, $($arg,)*> ValueMethod<T, ($($arg,)*)> for F
        where
            T: Reflect,
            F: Fn(&T, $($arg),*) -> R + Send + Sync + 'static,
            R: IntoResults,
            $($arg: Reflect,)*
        {
            fn param_types() -> Vec<Type> {
                vec![$($arg::type_of()),*]
            }

            fn result_types() -> Vec<Type> {
                R::result_types()
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn invoke(&self, recv: &T, args: &[ValueHandle]) -> Result<Vec<ValueHandle>> {
                let mut iter = args.iter();
                $(let $arg: $arg = take_arg(&mut iter, $count, args.len())?.get::<$arg>()?;)*
                Ok(self(recv, $($arg),*).into_results())
            }
        }

        impl<T, F, R, $($arg,)*> PointerMethod<T, ($($arg,)*)> for F
        where
            T: Reflect,
            F: Fn(&mut T, $($arg),*) -> R + Send + Sync + 'static,
            R: IntoResults,
            $($arg: Reflect,)*
        {
            fn param_types() -> Vec<Type> {
                vec![$($arg::type_of()),*]
            }

            fn result_types() -> Vec<Type> {
                R::result_types()
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn invoke(&self, recv: &mut T, args: &[ValueHandle]) -> Result<Vec<ValueHandle>> {
                let mut iter = args.iter();
                $(let $arg: $arg = take_arg(&mut iter, $count, args.len())?.get::<$arg>()?;)*
                Ok(self(recv, $($arg),*).into_results())
            }
        }
    };
}

impl_method_adapters!(0;);
impl_method_adapters!(1; A1);
impl_method_adapters!(2; A1, A2);
impl_method_adapters!(3; A1, A2, A3);
