// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic function stubs.
//!
//! A stub is a function value of an arbitrary signature whose body is a
//! generic handler over argument handles. Calls through the stub are checked
//! against the signature like any other call, and the handler's results are
//! converted to the declared result types.
//!
//! ```
//! use introspect::{make_stub, type_of, ValueHandle};
//!
//! let sig = type_of::<fn(i64, i64) -> i64>();
//! let add = make_stub(&sig, |args| {
//!     let sum = args[0].int().unwrap_or(0) + args[1].int().unwrap_or(0);
//!     vec![ValueHandle::of(&sum)]
//! })
//! .unwrap();
//!
//! let out = add.call(&[ValueHandle::of(&2i64), ValueHandle::of(&3i64)]).unwrap();
//! assert_eq!(out[0].int().unwrap(), 5);
//! ```

use crate::error::{ReflectError, Result};
use crate::kind::Kind;
use crate::types::descriptor::Type;
use crate::value::{Callable, FuncValue, Value, ValueHandle};
use std::sync::Arc;

/// Synthesize a function value of type `signature` that runs `handler`.
///
/// The returned handle is owned and not settable; its type is exactly
/// `signature`.
pub fn make_stub<F>(signature: &Type, handler: F) -> Result<ValueHandle>
where
    F: Fn(&[ValueHandle]) -> Vec<ValueHandle> + Send + Sync + 'static,
{
    make_stub_fallible(signature, move |args| Ok(handler(args)))
}

/// Like [`make_stub`], for handlers that can fail; the error is returned
/// from [`ValueHandle::call`].
pub fn make_stub_fallible<F>(signature: &Type, handler: F) -> Result<ValueHandle>
where
    F: Fn(&[ValueHandle]) -> Result<Vec<ValueHandle>> + Send + Sync + 'static,
{
    if signature.kind() != Kind::Func {
        return Err(ReflectError::invalid(format!(
            "stub signature must be a function type, got {}",
            signature
        )));
    }
    log::debug!("[stub] synthesized {}", signature);
    let callable: Callable = Arc::new(handler);
    Ok(ValueHandle::owned(
        signature.clone(),
        Value::Func(Some(FuncValue::new(callable))),
    ))
}
