//! Canonical structural description of a type.
//!
//! A [`TypeShape`] is the hash-cons key of the registry. Children are
//! referenced by [`TypeId`], so hashing a shape is shallow: two shapes are
//! equal exactly when their children were interned to the same nodes. Named
//! types are keyed by their declaration only and never by their underlying
//! type, which is what stops the recursion on types like
//! `type T struct{ next *T }`. Interfaces are keyed by their complete method
//! set with embedded interfaces flattened in, so `interface{ io.Reader }` and
//! `interface{ Read([]byte) (int, error) }` are one node.

use crate::types::{ChanDir, CompactString, ObjectId, PackageId, TypeId, TypeNameId, is_exported};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    Basic(CompactString),
    Named {
        type_name: TypeNameId,
        args: Vec<TypeId>,
    },
    Pointer(TypeId),
    Array {
        len: u64,
        elem: TypeId,
    },
    Slice(TypeId),
    Map {
        key: TypeId,
        value: TypeId,
    },
    Chan {
        dir: ChanDir,
        elem: TypeId,
    },
    /// The receiver is never part of a signature shape.
    Signature {
        params: Vec<TypeId>,
        results: Vec<TypeId>,
        variadic: bool,
    },
    Struct(Vec<FieldShape>),
    /// Every method of the interface, embedded ones included
    Interface {
        methods: Vec<MethodShape>,
    },
    Tuple(Vec<TypeId>),
    TypeParam {
        name: CompactString,
        object: Option<ObjectId>,
        constraint: Option<TypeId>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldShape {
    pub name: CompactString,
    /// Declaring package, kept only for unexported names
    pub package: Option<PackageId>,
    pub ty: TypeId,
    pub embedded: bool,
    pub tag: Option<CompactString>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodShape {
    pub name: CompactString,
    /// Declaring package, kept only for unexported names
    pub package: Option<PackageId>,
    pub signature: TypeId,
}

/// How the first declaration of an interface literal was written. Not part of
/// the interning key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceSpelling {
    pub methods: Vec<MethodShape>,
    pub embeds: Vec<TypeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Basic,
    Pointer,
    Array,
    Slice,
    Map,
    Chan,
    Signature,
    Struct,
    Interface,
    Named,
    Tuple,
    TypeParam,
}

impl TypeKind {
    pub const ALL: [TypeKind; 12] = [
        TypeKind::Basic,
        TypeKind::Pointer,
        TypeKind::Array,
        TypeKind::Slice,
        TypeKind::Map,
        TypeKind::Chan,
        TypeKind::Signature,
        TypeKind::Struct,
        TypeKind::Interface,
        TypeKind::Named,
        TypeKind::Tuple,
        TypeKind::TypeParam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Basic => "basic",
            TypeKind::Pointer => "pointer",
            TypeKind::Array => "array",
            TypeKind::Slice => "slice",
            TypeKind::Map => "map",
            TypeKind::Chan => "chan",
            TypeKind::Signature => "signature",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            TypeKind::Named => "named",
            TypeKind::Tuple => "tuple",
            TypeKind::TypeParam => "typeparam",
        }
    }
}

impl FieldShape {
    pub fn new(name: &str, package: PackageId, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            package: identity_package(name, package),
            ty,
            embedded: false,
            tag: None,
        }
    }
}

impl MethodShape {
    pub fn new(name: &str, package: PackageId, signature: TypeId) -> Self {
        Self {
            name: name.into(),
            package: identity_package(name, package),
            signature,
        }
    }
}

/// Unexported names are only identical within their declaring package.
pub fn identity_package(name: &str, package: PackageId) -> Option<PackageId> {
    if is_exported(name) {
        None
    } else {
        Some(package)
    }
}

impl TypeShape {
    pub fn kind(&self) -> TypeKind {
        match self {
            TypeShape::Basic(_) => TypeKind::Basic,
            TypeShape::Named { .. } => TypeKind::Named,
            TypeShape::Pointer(_) => TypeKind::Pointer,
            TypeShape::Array { .. } => TypeKind::Array,
            TypeShape::Slice(_) => TypeKind::Slice,
            TypeShape::Map { .. } => TypeKind::Map,
            TypeShape::Chan { .. } => TypeKind::Chan,
            TypeShape::Signature { .. } => TypeKind::Signature,
            TypeShape::Struct(_) => TypeKind::Struct,
            TypeShape::Interface { .. } => TypeKind::Interface,
            TypeShape::Tuple(_) => TypeKind::Tuple,
            TypeShape::TypeParam { .. } => TypeKind::TypeParam,
        }
    }

    /// Bring the shape into canonical form. Interface method order carries no
    /// meaning, and a method reached twice through embedding counts once.
    pub fn normalize(&mut self) {
        if let TypeShape::Interface { methods } = self {
            methods.sort_by(|a, b| {
                a.name
                    .cmp(&b.name)
                    .then_with(|| a.package.cmp(&b.package))
                    .then_with(|| a.signature.cmp(&b.signature))
            });
            methods.dedup();
        }
    }

    /// Child type ids in declaration order.
    pub fn children(&self) -> Vec<TypeId> {
        match self {
            TypeShape::Basic(_) => Vec::new(),
            TypeShape::Named { args, .. } => args.clone(),
            TypeShape::Pointer(elem) | TypeShape::Slice(elem) => vec![*elem],
            TypeShape::Array { elem, .. } | TypeShape::Chan { elem, .. } => vec![*elem],
            TypeShape::Map { key, value } => vec![*key, *value],
            TypeShape::Signature {
                params, results, ..
            } => params.iter().chain(results).copied().collect(),
            TypeShape::Struct(fields) => fields.iter().map(|f| f.ty).collect(),
            TypeShape::Interface { methods } => methods.iter().map(|m| m.signature).collect(),
            TypeShape::Tuple(elems) => elems.clone(),
            TypeShape::TypeParam { constraint, .. } => constraint.iter().copied().collect(),
        }
    }
}
