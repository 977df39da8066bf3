// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for introspection operations.

use std::fmt;

/// Errors returned by type and value introspection.
///
/// Navigation (`deref`, `field`, `index`, `method`) never returns these
/// directly: it yields an invalid [`ValueHandle`](crate::ValueHandle) that
/// carries the error, and the first operation that needs the value reports
/// it. Mutation and call contract violations are reported at the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectError {
    /// Operation not valid for the handle (nil pointer, wrong kind, nil call).
    InvalidOperation(String),
    /// Mutation attempted through a handle that is not settable.
    Unsettable(String),
    /// Value type does not match the slot type.
    TypeMismatch { expected: String, got: String },
    /// Wrong number of arguments or results.
    ArityMismatch { expected: usize, got: usize },
    /// Type requested from an invalid handle.
    NoType,
    /// Struct has no field with this name.
    UnknownField(String),
    /// Type has no method with this name.
    UnknownMethod(String),
    /// Element or method index out of range.
    IndexOutOfBounds { index: usize, length: usize },
}

impl fmt::Display for ReflectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
            Self::Unsettable(op) => write!(f, "{} using unaddressable or read-only value", op),
            Self::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)
            }
            Self::ArityMismatch { expected, got } => {
                write!(f, "Arity mismatch: expected {} values, got {}", expected, got)
            }
            Self::NoType => write!(f, "Type of invalid value"),
            Self::UnknownField(name) => write!(f, "Field not found: {}", name),
            Self::UnknownMethod(name) => write!(f, "Method not found: {}", name),
            Self::IndexOutOfBounds { index, length } => {
                write!(f, "Index out of bounds: {} >= {}", index, length)
            }
        }
    }
}

impl std::error::Error for ReflectError {}

/// Convenient alias for introspection results.
pub type Result<T> = core::result::Result<T, ReflectError>;

impl ReflectError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub(crate) fn mismatch(expected: impl fmt::Display, got: impl fmt::Display) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }
}
