// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for runtime type information.

use crate::config::ANY_TYPE_NAME;
use crate::kind::Kind;
use crate::types::method::MethodDescriptor;
use crate::value::DecodeCheck;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

/// Interned handle to a [`TypeDescriptor`].
///
/// Every `Type` is obtained from the process-wide registry, so equality is
/// reference identity: two handles are equal iff they denote the same static
/// type. Named types are never equal to their underlying type.
#[derive(Clone)]
pub struct Type(pub(crate) Arc<TypeDescriptor>);

impl Type {
    /// Resolve the descriptor of a host type (alias of [`crate::type_of`]).
    pub fn of<T: crate::Reflect>() -> Type {
        T::type_of()
    }

    /// Underlying descriptor.
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.0
    }
}

impl Deref for Type {
    type Target = TypeDescriptor;

    fn deref(&self) -> &TypeDescriptor {
        &self.0
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

// Debug stays shallow: pointer types may be self-referential.
impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self)
    }
}

/// Lazily resolved type reference (pointer and slice element types).
///
/// Resolution is deferred until first use so that `struct Node { next:
/// Ptr<Node>, children: Vec<Node> }` can be described while `Node` itself is
/// being resolved.
pub struct LazyType {
    init: fn() -> Type,
    cell: OnceLock<Type>,
}

impl LazyType {
    pub fn new(init: fn() -> Type) -> Self {
        Self {
            init,
            cell: OnceLock::new(),
        }
    }

    /// Resolve (once) and return the type.
    pub fn get(&self) -> &Type {
        self.cell.get_or_init(self.init)
    }
}

impl Clone for LazyType {
    fn clone(&self) -> Self {
        let cell = OnceLock::new();
        if let Some(ty) = self.cell.get() {
            let _ = cell.set(ty.clone());
        }
        Self {
            init: self.init,
            cell,
        }
    }
}

impl fmt::Debug for LazyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(ty) => write!(f, "LazyType({})", ty),
            None => f.write_str("LazyType(<unresolved>)"),
        }
    }
}

/// Function signature: ordered parameter and result types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Type>,
    pub results: Vec<Type>,
}

impl Signature {
    pub fn new(params: Vec<Type>, results: Vec<Type>) -> Self {
        Self { params, results }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        f.write_str(")")?;
        match self.results.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " -> {}", single),
            many => {
                f.write_str(" -> (")?;
                for (i, result) in many.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", result)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Structural shape of a type.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Bool, numbers and strings.
    Scalar,
    /// Struct with declared fields.
    Struct(Vec<FieldDescriptor>),
    /// Pointer to a lazily resolved element.
    Ptr(LazyType),
    /// Dynamic-length sequence.
    Slice(LazyType),
    /// Fixed-length sequence.
    Array { elem: Type, len: usize },
    /// Function signature.
    Func(Signature),
    /// Boxed value of any dynamic type.
    Interface,
}

/// Field descriptor for struct members.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Field type.
    pub ty: Type,
    /// Byte offset inside the host struct.
    pub offset: usize,
    /// Position in declaration order.
    pub index: usize,
    /// Writable through an addressable handle (`pub` in the host type).
    pub exported: bool,
}

impl FieldDescriptor {
    /// Create a new exported field descriptor at offset 0.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            offset: 0,
            index: 0,
            exported: true,
        }
    }

    /// Set byte offset.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Set exported flag.
    pub fn exported(mut self, exported: bool) -> Self {
        self.exported = exported;
        self
    }
}

/// Lazily built method table.
pub(crate) struct MethodTable {
    init: Option<fn() -> Vec<MethodDescriptor>>,
    cell: OnceLock<Vec<MethodDescriptor>>,
}

impl MethodTable {
    fn empty() -> Self {
        Self {
            init: None,
            cell: OnceLock::new(),
        }
    }

    fn get(&self) -> &[MethodDescriptor] {
        self.cell
            .get_or_init(|| self.init.map(|init| init()).unwrap_or_default())
    }
}

/// A complete type descriptor.
///
/// Built by [`Reflect::describe`](crate::Reflect::describe), then published
/// once by the registry and never mutated afterwards.
pub struct TypeDescriptor {
    pub(crate) id: u64,
    name: Option<String>,
    kind: Kind,
    size: usize,
    shape: Shape,
    pub(crate) methods: MethodTable,
    /// Decoder of the host pointee, for pointers whose element is a host type.
    pub(crate) pointee_check: Option<DecodeCheck>,
}

impl TypeDescriptor {
    /// Create a new type descriptor.
    pub fn new(name: Option<String>, kind: Kind, size: usize, shape: Shape) -> Self {
        Self {
            id: 0,
            name,
            kind,
            size,
            shape,
            methods: MethodTable::empty(),
            pointee_check: None,
        }
    }

    /// Create a named scalar descriptor (bool, numbers, strings).
    pub fn primitive(name: impl Into<String>, kind: Kind, size: usize) -> Self {
        Self::new(Some(name.into()), kind, size, Shape::Scalar)
    }

    /// Create a named struct descriptor. Field indices follow `fields` order.
    pub fn struct_type(name: impl Into<String>, size: usize, fields: Vec<FieldDescriptor>) -> Self {
        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(index, mut field)| {
                field.index = index;
                field
            })
            .collect();
        Self::new(Some(name.into()), Kind::Struct, size, Shape::Struct(fields))
    }

    /// Create an anonymous pointer descriptor.
    pub fn pointer(elem: fn() -> Type) -> Self {
        Self::new(
            None,
            Kind::Ptr,
            std::mem::size_of::<usize>(),
            Shape::Ptr(LazyType::new(elem)),
        )
    }

    /// Create an anonymous slice descriptor.
    pub fn slice(elem: fn() -> Type, size: usize) -> Self {
        Self::new(None, Kind::Slice, size, Shape::Slice(LazyType::new(elem)))
    }

    /// Create an anonymous array descriptor.
    pub fn array(elem: Type, len: usize, size: usize) -> Self {
        Self::new(None, Kind::Array, size, Shape::Array { elem, len })
    }

    /// Create an anonymous function descriptor.
    pub fn func(signature: Signature) -> Self {
        Self::new(
            None,
            Kind::Func,
            std::mem::size_of::<usize>(),
            Shape::Func(signature),
        )
    }

    /// Create an interface descriptor.
    pub fn interface(name: Option<String>, size: usize) -> Self {
        Self::new(name, Kind::Interface, size, Shape::Interface)
    }

    /// Create a named type sharing the structure of `underlying`.
    pub fn named(name: impl Into<String>, underlying: &Type, size: usize) -> Self {
        Self::new(
            Some(name.into()),
            underlying.kind,
            size,
            underlying.shape.clone(),
        )
    }

    /// Attach a lazily built method table.
    pub fn with_methods(mut self, init: fn() -> Vec<MethodDescriptor>) -> Self {
        self.methods = MethodTable {
            init: Some(init),
            cell: OnceLock::new(),
        };
        self
    }

    pub(crate) fn with_pointee_check(mut self, check: DecodeCheck) -> Self {
        self.pointee_check = Some(check);
        self
    }

    pub(crate) fn has_method_table(&self) -> bool {
        self.methods.init.is_some()
    }

    /// Registry-assigned identity.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Declared name; `None` for anonymous composite types.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Structural category.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Size in bytes of the host representation.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Check if this is a named type.
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }

    /// Get fields if this is a struct.
    pub fn fields(&self) -> &[FieldDescriptor] {
        match &self.shape {
            Shape::Struct(fields) => fields,
            _ => &[],
        }
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Get field by declaration index.
    pub fn field_by_index(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields().get(index)
    }

    pub fn num_field(&self) -> usize {
        self.fields().len()
    }

    /// Element type of pointers, slices and arrays.
    pub fn elem(&self) -> Option<&Type> {
        match &self.shape {
            Shape::Ptr(lazy) | Shape::Slice(lazy) => Some(lazy.get()),
            Shape::Array { elem, .. } => Some(elem),
            _ => None,
        }
    }

    /// Length of array types.
    pub fn len(&self) -> Option<usize> {
        match &self.shape {
            Shape::Array { len, .. } => Some(*len),
            _ => None,
        }
    }

    /// Signature of function types.
    pub fn signature(&self) -> Option<&Signature> {
        match &self.shape {
            Shape::Func(sig) => Some(sig),
            _ => None,
        }
    }

    /// Parameter types of function types (empty otherwise).
    pub fn params(&self) -> &[Type] {
        self.signature().map_or(&[], |s| s.params.as_slice())
    }

    /// Result types of function types (empty otherwise).
    pub fn results(&self) -> &[Type] {
        self.signature().map_or(&[], |s| s.results.as_slice())
    }

    pub fn num_in(&self) -> usize {
        self.params().len()
    }

    pub fn num_out(&self) -> usize {
        self.results().len()
    }

    /// Method set, ordered by name. Stable across calls.
    pub fn methods(&self) -> &[MethodDescriptor] {
        self.methods.get()
    }

    /// Method by ordinal.
    pub fn method(&self, index: usize) -> Option<&MethodDescriptor> {
        self.methods().get(index)
    }

    /// Method by name.
    pub fn method_by_name(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods().iter().find(|m| m.name() == name)
    }

    pub fn num_method(&self) -> usize {
        self.methods().len()
    }

    /// Structural identity ignoring declared names.
    ///
    /// `struct Celsius(f64)` and `f64` share an underlying type; two structs
    /// share one when their field names and field types match pairwise.
    pub fn same_underlying(&self, other: &TypeDescriptor) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match (&self.shape, &other.shape) {
            (Shape::Scalar, Shape::Scalar) | (Shape::Interface, Shape::Interface) => true,
            (Shape::Ptr(a), Shape::Ptr(b)) | (Shape::Slice(a), Shape::Slice(b)) => {
                a.get() == b.get()
            }
            (Shape::Array { elem: a, len: n }, Shape::Array { elem: b, len: m }) => {
                a == b && n == m
            }
            (Shape::Func(a), Shape::Func(b)) => a == b,
            (Shape::Struct(a), Shape::Struct(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|(x, y)| x.name == y.name && x.ty == y.ty)
            }
            _ => false,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            return f.write_str(name);
        }
        match &self.shape {
            Shape::Scalar => f.write_str(self.kind.as_str()),
            Shape::Ptr(lazy) => write!(f, "*{}", lazy.get()),
            Shape::Slice(lazy) => write!(f, "[]{}", lazy.get()),
            Shape::Array { elem, len } => write!(f, "[{}]{}", len, elem),
            Shape::Func(sig) => write!(f, "{}", sig),
            Shape::Interface => f.write_str(ANY_TYPE_NAME),
            Shape::Struct(fields) => {
                f.write_str("struct {")?;
                for (i, field) in fields.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{}{}: {}", sep, field.name, field.ty)?;
                }
                f.write_str(" }")
            }
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
