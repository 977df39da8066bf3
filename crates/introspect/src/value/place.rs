// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Storage locations inside a slot.

use super::{addr_of, DecodeCheck, Slot, Value};
use crate::error::{ReflectError, Result};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Field(usize),
    Index(usize),
}

/// A slot plus the path from its root value to one node.
///
/// `check` is the decoder of the host type owning the slot, when known.
#[derive(Clone)]
pub(crate) struct Place {
    root: Slot,
    path: Vec<Step>,
    check: Option<DecodeCheck>,
}

impl Place {
    pub(crate) fn root(slot: Slot, check: Option<DecodeCheck>) -> Self {
        Self {
            root: slot,
            path: Vec::new(),
            check,
        }
    }

    pub(crate) fn child(&self, step: Step) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(step);
        Self {
            root: self.root.clone(),
            path,
            check: self.check,
        }
    }

    /// Run `f` on the node under the read lock.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&Value) -> R) -> Result<R> {
        let guard = self.root.read();
        let mut node = &*guard;
        for step in &self.path {
            node = walk(node, *step)?;
        }
        Ok(f(node))
    }

    pub(crate) fn load(&self) -> Result<Value> {
        self.read(Value::clone)
    }

    /// Replace the node under the write lock.
    ///
    /// A synthesized function can only live in host storage that holds
    /// function values (`Func<S>`, `AnyValue`). When the owning host type is
    /// known, the updated root is decoded before it is committed, so a
    /// rejected store leaves the slot untouched.
    pub(crate) fn store(&self, value: Value) -> Result<()> {
        let mut guard = self.root.write();
        match self.check {
            Some(check) if value.holds_synthesized_func() => {
                let mut candidate = guard.clone();
                *node_mut(&mut candidate, &self.path)? = value;
                check(&candidate)?;
                *guard = candidate;
            }
            _ => *node_mut(&mut *guard, &self.path)? = value,
        }
        Ok(())
    }

    /// Address of the root storage.
    pub(crate) fn address(&self) -> usize {
        addr_of(&self.root)
    }

    pub(crate) fn same_location(&self, other: &Place) -> bool {
        Arc::ptr_eq(&self.root, &other.root) && self.path == other.path
    }
}

fn walk(node: &Value, step: Step) -> Result<&Value> {
    match (node, step) {
        (Value::Struct(fields), Step::Field(i)) => fields.get(i).ok_or(ReflectError::IndexOutOfBounds {
            index: i,
            length: fields.len(),
        }),
        (Value::List(items), Step::Index(i)) => items.get(i).ok_or(ReflectError::IndexOutOfBounds {
            index: i,
            length: items.len(),
        }),
        (other, _) => Err(ReflectError::invalid(format!(
            "stale location into {} value",
            other.variant_name()
        ))),
    }
}

fn node_mut<'a>(root: &'a mut Value, path: &[Step]) -> Result<&'a mut Value> {
    let mut node = root;
    for step in path {
        node = walk_mut(node, *step)?;
    }
    Ok(node)
}

fn walk_mut(node: &mut Value, step: Step) -> Result<&mut Value> {
    match (node, step) {
        (Value::Struct(fields), Step::Field(i)) => {
            let length = fields.len();
            fields
                .get_mut(i)
                .ok_or(ReflectError::IndexOutOfBounds { index: i, length })
        }
        (Value::List(items), Step::Index(i)) => {
            let length = items.len();
            items
                .get_mut(i)
                .ok_or(ReflectError::IndexOutOfBounds { index: i, length })
        }
        (other, _) => Err(ReflectError::invalid(format!(
            "stale location into {} value",
            other.variant_name()
        ))),
    }
}
