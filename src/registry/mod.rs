//! Identity registry: interns structural types so that equal types share one node.
//!
//! The registry owns every [`TypeInfo`] and every [`Member`] (struct fields,
//! interface methods, embedded interfaces and concrete methods). Interning is
//! a hash-cons over [`TypeShape`]: a shape whose children have already been
//! interned is looked up in a map and either the existing node is returned or
//! a new one is appended. Each new non-pointer type eagerly gets its pointer
//! form registered too, since pointer receivers need that node.

pub mod builtin;
pub mod shape;

pub use shape::{
    FieldShape, InterfaceSpelling, MethodShape, TypeKind, TypeShape, identity_package,
};

use crate::selectors::Selector;
use crate::types::{
    CompactString, MemberId, ObjectId, PackageId, Position, TypeId, TypeNameId, ValueId,
    is_exported,
};
use serde::Serialize;
use std::collections::HashMap;

/// A canonical interned type node.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub id: TypeId,
    pub shape: TypeShape,
    /// Declared name of a named type
    pub name: Option<CompactString>,
    /// For named types the resolved underlying type, otherwise the type itself
    pub underlying: TypeId,
    /// The interned `*T` node, once one has been interned
    pub pointer_to: Option<TypeId>,
    /// Directly declared members in declaration order
    pub members: Vec<MemberId>,
    /// Source form of an interface literal, from the first declaration interned
    pub spelling: Option<InterfaceSpelling>,
    /// All fields, promoted ones included, in presentation order
    pub fields: Vec<Selector>,
    /// All methods, promoted ones included, in presentation order
    pub methods: Vec<Selector>,
    pub implemented_bys: Vec<Implementer>,
    /// Cleaned list: interfaces made redundant by embedding are dropped
    pub implements: Vec<TypeId>,
    /// Package-level values declared with this type
    pub as_types_of: Vec<ValueId>,
    pub as_inputs_of: Vec<ValueUse>,
    pub as_outputs_of: Vec<ValueUse>,
}

impl TypeInfo {
    fn new(id: TypeId, shape: TypeShape) -> Self {
        Self {
            id,
            shape,
            name: None,
            underlying: id,
            pointer_to: None,
            members: Vec::new(),
            spelling: None,
            fields: Vec::new(),
            methods: Vec::new(),
            implemented_bys: Vec::new(),
            implements: Vec::new(),
            as_types_of: Vec::new(),
            as_inputs_of: Vec::new(),
            as_outputs_of: Vec::new(),
        }
    }

    pub fn kind(&self) -> TypeKind {
        self.shape.kind()
    }

    pub fn is_named(&self) -> bool {
        matches!(self.shape, TypeShape::Named { .. })
    }

    pub fn type_name(&self) -> Option<TypeNameId> {
        match &self.shape {
            TypeShape::Named { type_name, .. } => Some(*type_name),
            _ => None,
        }
    }

    pub fn pointer_elem(&self) -> Option<TypeId> {
        match self.shape {
            TypeShape::Pointer(elem) => Some(elem),
            _ => None,
        }
    }
}

/// A type that implements an interface, possibly only through its pointer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Implementer {
    pub type_id: TypeId,
    /// True when only `*T` has the required method set
    pub pointer: bool,
}

/// A function or value referring to a type, possibly through a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ValueUse {
    pub value: ValueId,
    pub via_pointer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    Field {
        embedded: bool,
        tag: Option<CompactString>,
    },
    InterfaceMethod,
    EmbeddedInterface,
    Method {
        function: ValueId,
        pointer_receiver: bool,
    },
}

/// A field or method declared directly on a type.
#[derive(Debug, Clone)]
pub struct Member {
    pub id: MemberId,
    pub name: CompactString,
    /// Declaring package when known
    pub package: Option<PackageId>,
    pub owner: TypeId,
    /// Field type, method signature or embedded interface type
    pub ty: TypeId,
    pub kind: MemberKind,
    pub object: Option<ObjectId>,
    pub position: Option<Position>,
}

impl Member {
    pub fn is_field(&self) -> bool {
        matches!(self.kind, MemberKind::Field { .. })
    }

    pub fn is_method(&self) -> bool {
        matches!(
            self.kind,
            MemberKind::InterfaceMethod | MemberKind::Method { .. }
        )
    }

    /// Embedded fields and embedded interfaces: the members promotion walks through.
    pub fn is_embedding(&self) -> bool {
        matches!(
            self.kind,
            MemberKind::Field { embedded: true, .. } | MemberKind::EmbeddedInterface
        )
    }

    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }

    pub fn pointer_receiver(&self) -> bool {
        matches!(
            self.kind,
            MemberKind::Method {
                pointer_receiver: true,
                ..
            }
        )
    }

    /// Name plus declaring package for unexported names.
    pub fn selector_key(&self) -> (CompactString, Option<PackageId>) {
        let package = if self.is_exported() {
            None
        } else {
            self.package
        };
        (self.name.clone(), package)
    }
}

/// Parameters of a member about to be registered.
#[derive(Debug, Clone)]
pub struct MemberDraft {
    pub name: CompactString,
    pub package: Option<PackageId>,
    pub owner: TypeId,
    pub ty: TypeId,
    pub kind: MemberKind,
    pub object: Option<ObjectId>,
    pub position: Option<Position>,
}

#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: Vec<TypeInfo>,
    members: Vec<Member>,
    by_shape: HashMap<TypeShape, TypeId>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry with the basic types of the universe already interned.
    pub fn new() -> Self {
        let mut registry = Self {
            types: Vec::new(),
            members: Vec::new(),
            by_shape: HashMap::new(),
        };
        for name in builtin::BASIC_TYPES.iter().chain(builtin::UNTYPED_KINDS) {
            registry.intern(TypeShape::Basic((*name).into()));
        }
        registry
    }

    /// Intern a shape and return its canonical node.
    pub fn intern(&mut self, shape: TypeShape) -> TypeId {
        self.intern_fresh(shape).0
    }

    /// Intern a shape; the flag tells whether the node was created by this call.
    pub fn intern_fresh(&mut self, mut shape: TypeShape) -> (TypeId, bool) {
        shape.normalize();
        if let Some(&id) = self.by_shape.get(&shape) {
            return (id, false);
        }

        let id = TypeId::new(self.types.len());
        let is_pointer = matches!(shape, TypeShape::Pointer(_));
        self.by_shape.insert(shape.clone(), id);
        self.types.push(TypeInfo::new(id, shape));
        self.create_shape_members(id);

        if !is_pointer {
            let pointer = self.intern(TypeShape::Pointer(id));
            self.types[id.index()].pointer_to = Some(pointer);
        }

        (id, true)
    }

    /// Intern an interface by its flattened method set, recording how this
    /// declaration spelled it when the node is new.
    pub fn intern_interface(
        &mut self,
        methods: Vec<MethodShape>,
        spelling: InterfaceSpelling,
    ) -> (TypeId, bool) {
        let (id, fresh) = self.intern_fresh(TypeShape::Interface { methods });
        if fresh {
            self.types[id.index()].spelling = Some(spelling);
        }
        (id, fresh)
    }

    /// Register the named type declared by `type_name`.
    pub fn intern_named(
        &mut self,
        type_name: TypeNameId,
        name: &str,
        args: Vec<TypeId>,
    ) -> TypeId {
        let (id, fresh) = self.intern_fresh(TypeShape::Named { type_name, args });
        if fresh {
            self.types[id.index()].name = Some(name.into());
        }
        id
    }

    pub fn lookup(&self, shape: &TypeShape) -> Option<TypeId> {
        let mut shape = shape.clone();
        shape.normalize();
        self.by_shape.get(&shape).copied()
    }

    pub fn basic(&self, name: &str) -> Option<TypeId> {
        self.by_shape.get(&TypeShape::Basic(name.into())).copied()
    }

    /// The `*T` node for `id`, interning it if needed.
    pub fn pointer_to(&mut self, id: TypeId) -> TypeId {
        if let Some(pointer) = self.types[id.index()].pointer_to {
            return pointer;
        }
        let pointer = self.intern(TypeShape::Pointer(id));
        self.types[id.index()].pointer_to = Some(pointer);
        pointer
    }

    pub fn get(&self, id: TypeId) -> &TypeInfo {
        &self.types[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: TypeId) -> &mut TypeInfo {
        &mut self.types[id.index()]
    }

    pub fn member(&self, id: MemberId) -> &Member {
        &self.members[id.index()]
    }

    pub(crate) fn member_mut(&mut self, id: MemberId) -> &mut Member {
        &mut self.members[id.index()]
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Attach a member to its owner.
    pub fn add_member(&mut self, draft: MemberDraft) -> MemberId {
        let id = MemberId::new(self.members.len());
        let owner = draft.owner;
        self.members.push(Member {
            id,
            name: draft.name,
            package: draft.package,
            owner,
            ty: draft.ty,
            kind: draft.kind,
            object: draft.object,
            position: draft.position,
        });
        self.types[owner.index()].members.push(id);
        id
    }

    pub(crate) fn set_underlying(&mut self, named: TypeId, underlying: TypeId) {
        self.types[named.index()].underlying = underlying;
    }

    pub fn underlying(&self, id: TypeId) -> TypeId {
        self.types[id.index()].underlying
    }

    /// Follow one level of pointer.
    pub fn deref(&self, id: TypeId) -> (TypeId, bool) {
        match self.types[id.index()].pointer_elem() {
            Some(elem) => (elem, true),
            None => (id, false),
        }
    }

    pub fn is_interface(&self, id: TypeId) -> bool {
        matches!(
            self.types[self.underlying(id).index()].shape,
            TypeShape::Interface { .. }
        )
    }

    pub fn is_struct(&self, id: TypeId) -> bool {
        matches!(
            self.types[self.underlying(id).index()].shape,
            TypeShape::Struct(_)
        )
    }

    /// Display name of a named type, following one pointer level.
    pub fn base_name(&self, id: TypeId) -> Option<&str> {
        let (base, _) = self.deref(id);
        self.types[base.index()].name.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Members of unnamed struct and interface types come straight from the
    /// shape. An interface literal gets one member per method of its flattened set.
    fn create_shape_members(&mut self, id: TypeId) {
        let drafts: Vec<MemberDraft> = match &self.types[id.index()].shape {
            TypeShape::Struct(fields) => fields
                .iter()
                .map(|field| MemberDraft {
                    name: field.name.clone(),
                    package: field.package,
                    owner: id,
                    ty: field.ty,
                    kind: MemberKind::Field {
                        embedded: field.embedded,
                        tag: field.tag.clone(),
                    },
                    object: None,
                    position: None,
                })
                .collect(),
            TypeShape::Interface { methods } => methods
                .iter()
                .map(|method| MemberDraft {
                    name: method.name.clone(),
                    package: method.package,
                    owner: id,
                    ty: method.signature,
                    kind: MemberKind::InterfaceMethod,
                    object: None,
                    position: None,
                })
                .collect(),
            _ => Vec::new(),
        };

        for draft in drafts {
            self.add_member(draft);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_idempotent() {
        let mut registry = TypeRegistry::new();
        let int = registry.basic("int").unwrap();
        let a = registry.intern(TypeShape::Slice(int));
        let b = registry.intern(TypeShape::Slice(int));
        assert_eq!(a, b);
        assert_eq!(registry.lookup(&TypeShape::Slice(int)), Some(a));
    }

    #[test]
    fn test_pointer_form_registered_eagerly() {
        let mut registry = TypeRegistry::new();
        let int = registry.basic("int").unwrap();
        let before = registry.len();
        let slice = registry.intern(TypeShape::Slice(int));
        let pointer = registry.get(slice).pointer_to.unwrap();
        assert_eq!(registry.get(pointer).pointer_elem(), Some(slice));
        // the pointer node does not register a pointer-to-pointer
        assert_eq!(registry.len(), before + 2);
        assert_eq!(registry.pointer_to(slice), pointer);
    }

    #[test]
    fn test_structurally_equal_structs_collapse() {
        let mut registry = TypeRegistry::new();
        let int = registry.basic("int").unwrap();
        let pkg = PackageId(1);
        let a = registry.intern(TypeShape::Struct(vec![FieldShape::new("X", pkg, int)]));
        let b = registry.intern(TypeShape::Struct(vec![FieldShape::new(
            "X",
            PackageId(7),
            int,
        )]));
        assert_eq!(a, b);
        assert_eq!(registry.get(a).members.len(), 1);

        // unexported fields from different packages are distinct
        let c = registry.intern(TypeShape::Struct(vec![FieldShape::new("x", pkg, int)]));
        let d = registry.intern(TypeShape::Struct(vec![FieldShape::new(
            "x",
            PackageId(7),
            int,
        )]));
        assert_ne!(c, d);
    }

    #[test]
    fn test_named_types_are_identity_anchors() {
        let mut registry = TypeRegistry::new();
        let a = registry.intern_named(TypeNameId(0), "A", Vec::new());
        let b = registry.intern_named(TypeNameId(1), "B", Vec::new());
        assert_ne!(a, b);
        assert_eq!(registry.intern_named(TypeNameId(0), "A", Vec::new()), a);
        assert_eq!(registry.get(a).name.as_deref(), Some("A"));
        // recursive struct through a named pointer terminates
        let ptr = registry.pointer_to(a);
        let pkg = PackageId(1);
        let body = registry.intern(TypeShape::Struct(vec![FieldShape::new("next", pkg, ptr)]));
        registry.set_underlying(a, body);
        assert!(registry.is_struct(a));
        assert_eq!(registry.base_name(ptr), Some("A"));
    }

    #[test]
    fn test_interface_spellings_share_one_node() {
        let mut registry = TypeRegistry::new();
        let reader = registry.intern_named(TypeNameId(0), "Reader", Vec::new());
        let sig = registry.intern(TypeShape::Signature {
            params: Vec::new(),
            results: Vec::new(),
            variadic: false,
        });
        let pkg = PackageId(1);
        let flattened = vec![
            MethodShape::new("Read", pkg, sig),
            MethodShape::new("Close", pkg, sig),
        ];

        let (embedding, fresh) = registry.intern_interface(
            flattened.clone(),
            InterfaceSpelling {
                methods: vec![MethodShape::new("Close", pkg, sig)],
                embeds: vec![reader],
            },
        );
        assert!(fresh);
        let (spelled_out, fresh) = registry.intern_interface(
            flattened.into_iter().rev().collect(),
            InterfaceSpelling {
                methods: Vec::new(),
                embeds: Vec::new(),
            },
        );
        assert!(!fresh);
        assert_eq!(embedding, spelled_out);

        // the first spelling is kept for display
        let spelling = registry.get(embedding).spelling.as_ref().unwrap();
        assert_eq!(spelling.embeds, vec![reader]);

        let members: Vec<&Member> = registry
            .get(embedding)
            .members
            .iter()
            .map(|id| registry.member(*id))
            .collect();
        assert_eq!(members.len(), 2);
        assert_eq!(&*members[0].name, "Close");
        assert!(members.iter().all(|m| m.is_method() && !m.is_embedding()));
    }
}
