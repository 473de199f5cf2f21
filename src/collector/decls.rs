//! Declared entities: type names and package-level values.

use crate::types::{CompactString, MemberId, ObjectId, PackageId, Position, TypeId, TypeNameId, ValueId};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TypeName {
    pub id: TypeNameId,
    pub name: CompactString,
    pub package: PackageId,
    pub position: Option<Position>,
    pub object: Option<ObjectId>,
    /// The type the name denotes: the named type, or the alias target
    pub ty: TypeId,
    /// Resolved type of the declaration's type expression
    pub spec: TypeId,
    pub alias: bool,
}

impl TypeName {
    pub fn is_exported(&self) -> bool {
        crate::types::is_exported(&self.name)
    }

    pub fn alias_target(&self) -> Option<TypeId> {
        self.alias.then_some(self.ty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Constant,
    Variable,
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Receiver {
    /// The receiver's base named type
    pub base: TypeId,
    pub pointer: bool,
    pub member: MemberId,
}

/// A package-level constant, variable or function. Methods are functions
/// with a receiver.
#[derive(Debug, Clone, Serialize)]
pub struct ValueResource {
    pub id: ValueId,
    pub name: CompactString,
    pub package: PackageId,
    pub position: Option<Position>,
    pub object: Option<ObjectId>,
    pub kind: ValueKind,
    /// Declared type; untyped constants carry their default type
    pub ty: TypeId,
    pub receiver: Option<Receiver>,
}

impl ValueResource {
    pub fn is_exported(&self) -> bool {
        crate::types::is_exported(&self.name)
    }

    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }
}

/// What a type-checker object denotes inside the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Resource {
    TypeName(TypeNameId),
    Value(ValueId),
    /// Field, interface method or method
    Member(MemberId),
    Package(PackageId),
}
