// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural categories of reflected types.

use std::fmt;

/// Structural category of a type.
///
/// A named type reports the category of its underlying type: a newtype
/// `struct Celsius(f64)` has kind [`Kind::Float64`] even though its name is
/// preserved on the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Absence of a value (zero handle).
    Invalid,
    Bool,
    /// Pointer-sized signed integer (`isize`).
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    /// Pointer-sized unsigned integer (`usize`).
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    Ptr,
    Struct,
    Func,
    Slice,
    Array,
    Interface,
}

impl Kind {
    /// Signed integer kinds.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Int | Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64
        )
    }

    /// Unsigned integer kinds.
    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Self::Uint | Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64
        )
    }

    pub fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Kinds whose zero value is nil.
    pub fn is_nillable(self) -> bool {
        matches!(self, Self::Ptr | Self::Func | Self::Interface)
    }

    /// Storage width in bits for numeric kinds.
    pub fn bits(self) -> Option<u32> {
        match self {
            Self::Int8 | Self::Uint8 => Some(8),
            Self::Int16 | Self::Uint16 => Some(16),
            Self::Int32 | Self::Uint32 | Self::Float32 => Some(32),
            Self::Int64 | Self::Uint64 | Self::Float64 => Some(64),
            Self::Int | Self::Uint => Some(usize::BITS),
            _ => None,
        }
    }

    /// Lowercase name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::Ptr => "ptr",
            Self::Struct => "struct",
            Self::Func => "func",
            Self::Slice => "slice",
            Self::Array => "array",
            Self::Interface => "interface",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
