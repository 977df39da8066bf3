// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic invocation of function values.

use super::ValueHandle;
use crate::error::{ReflectError, Result};
use crate::kind::Kind;
use crate::types::descriptor::Type;

impl ValueHandle {
    /// Invoke a function value.
    ///
    /// Arguments must match the parameter types exactly (interface
    /// parameters accept any value). Results are converted to the declared
    /// result types, so a stub handler may return any convertible value.
    pub fn call(&self, args: &[ValueHandle]) -> Result<Vec<ValueHandle>> {
        let ty = self.type_of().map_err(|_| match self.error() {
            Some(err) => err.clone(),
            None => ReflectError::NoType,
        })?;
        if ty.kind() != Kind::Func {
            return Err(ReflectError::invalid(format!(
                "call of non-function {} value",
                ty.kind()
            )));
        }
        let func = self.func_value()?;

        let params = ty.params();
        if args.len() != params.len() {
            return Err(ReflectError::ArityMismatch {
                expected: params.len(),
                got: args.len(),
            });
        }
        let args = args
            .iter()
            .zip(params)
            .map(|(arg, param)| check_arg(arg, param))
            .collect::<Result<Vec<_>>>()?;

        log::trace!("[call] {} with {} arg(s)", ty, args.len());
        let results = (func.callable())(&args)?;

        let declared = ty.results();
        if results.len() != declared.len() {
            return Err(ReflectError::ArityMismatch {
                expected: declared.len(),
                got: results.len(),
            });
        }
        results
            .iter()
            .zip(declared)
            .map(|(result, want)| result.convert(want))
            .collect()
    }
}

fn check_arg(arg: &ValueHandle, param: &Type) -> Result<ValueHandle> {
    let got = arg.type_of()?;
    if got == *param {
        Ok(arg.clone())
    } else if param.kind() == Kind::Interface {
        arg.convert(param)
    } else {
        Err(ReflectError::mismatch(param, &got))
    }
}
