// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Textual rendering of values.
//!
//! | Value                          | Rendering            |
//! |--------------------------------|----------------------|
//! | invalid handle                 | `<invalid Value>`    |
//! | nil pointer/func/interface     | `<nil>`              |
//! | top-level pointer to aggregate | `&{1 bee 3.14}`      |
//! | other pointers, functions      | `0xc0ffee` (address) |
//! | struct                         | `{1 bee 3.14}`       |
//! | slice, array                   | `[1 2 3]`            |
//! | interface                      | its content          |

use super::{addr_of, Value, ValueHandle};
use crate::config::{
    self, RenderOptions, ELLIPSIS, INVALID_SENTINEL, NIL_SENTINEL, POINTER_MARKER,
};
use crate::error::Result;
use crate::kind::Kind;
use crate::types::descriptor::Type;
use std::fmt::{self, Write};

impl ValueHandle {
    /// Default rendering using the global [`RenderOptions`].
    pub fn render(&self) -> String {
        self.render_with(&config::global().render_options())
    }

    /// Default rendering with explicit options.
    pub fn render_with(&self, opts: &RenderOptions) -> String {
        let (Some(ty), Ok(value)) = (self.ty(), self.load()) else {
            return INVALID_SENTINEL.to_string();
        };
        let mut out = String::new();
        write_value(&mut out, ty, &value, 0, opts);
        out
    }

    /// Name of the static type; fails on invalid handles.
    pub fn render_type(&self) -> Result<String> {
        Ok(self.type_of()?.to_string())
    }

    /// Debug rendering: strings print as themselves, everything else as
    /// `<T Value>`.
    pub fn render_debug(&self) -> String {
        match self.ty() {
            None => INVALID_SENTINEL.to_string(),
            Some(ty) if ty.kind() == Kind::String => match self.load() {
                Ok(Value::Str(s)) => s,
                _ => INVALID_SENTINEL.to_string(),
            },
            Some(ty) => format!("<{} Value>", ty),
        }
    }
}

impl fmt::Display for ValueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn write_address(out: &mut String, addr: usize, opts: &RenderOptions) {
    let shown = if opts.show_addresses { addr } else { 0 };
    let _ = write!(out, "{:#x}", shown);
}

/// Shortest round-trip digits; exponent form outside `1e-4 <= |v| < 1e21`,
/// written `1e+21`/`1.5e-07`. Infinities render as `+Inf`/`-Inf`.
fn write_float(out: &mut String, v: f64, single: bool) {
    if v.is_nan() {
        out.push_str("NaN");
        return;
    }
    if v.is_infinite() {
        out.push_str(if v > 0.0 { "+Inf" } else { "-Inf" });
        return;
    }
    let sci = if single {
        format!("{:e}", v as f32)
    } else {
        format!("{:e}", v)
    };
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    let _ = if v != 0.0 && !(FLOAT_MIN_EXP..FLOAT_MAX_EXP).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        write!(out, "{}e{}{:02}", mantissa, sign, exp.unsigned_abs())
    } else if single {
        write!(out, "{}", v as f32)
    } else {
        write!(out, "{}", v)
    };
}

const FLOAT_MIN_EXP: i32 = -4;
const FLOAT_MAX_EXP: i32 = 21;

fn write_value(out: &mut String, ty: &Type, value: &Value, depth: usize, opts: &RenderOptions) {
    if depth > opts.max_depth {
        out.push_str(ELLIPSIS);
        return;
    }
    match value {
        Value::Bool(v) => {
            let _ = write!(out, "{}", v);
        }
        Value::Int(v) => {
            let _ = write!(out, "{}", v);
        }
        Value::Uint(v) => {
            let _ = write!(out, "{}", v);
        }
        Value::Float(v) => write_float(out, *v, ty.kind() == Kind::Float32),
        Value::Str(s) => out.push_str(s),
        Value::Ptr(None) | Value::Func(None) | Value::Interface(None) => {
            out.push_str(NIL_SENTINEL)
        }
        Value::Ptr(Some(slot)) => {
            let elem = ty.elem();
            match elem {
                Some(elem)
                    if depth == 0
                        && matches!(elem.kind(), Kind::Struct | Kind::Slice | Kind::Array) =>
                {
                    let pointee = slot.read().clone();
                    out.push_str(POINTER_MARKER);
                    write_value(out, elem, &pointee, depth + 1, opts);
                }
                _ => write_address(out, addr_of(slot), opts),
            }
        }
        Value::Func(Some(func)) => write_address(out, func.code_pointer(), opts),
        Value::Interface(Some(boxed)) => write_value(out, &boxed.ty, &boxed.value, depth, opts),
        Value::Struct(fields) => {
            out.push('{');
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                let field_ty = ty.fields().get(i).map_or(ty, |f| &f.ty);
                write_value(out, field_ty, field, depth + 1, opts);
            }
            out.push('}');
        }
        Value::List(items) => {
            out.push('[');
            let elem_ty = ty.elem().unwrap_or(ty);
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_value(out, elem_ty, item, depth + 1, opts);
            }
            out.push(']');
        }
    }
}
