//! The sealed index: every arena produced by the build phase.
//!
//! An [`Index`] is immutable once [`IndexBuilder::build`] returns it and is
//! shared between request handlers behind an `Arc`.

mod builder;
mod query;
pub mod views;

pub use builder::IndexBuilder;
pub use views::TypePrinter;

use crate::collector::{Declarations, Resource, TypeName, ValueResource};
use crate::corpus::ObjectInput;
use crate::packages::{Package, PackageGraph};
use crate::references::ReferenceIndex;
use crate::registry::{Member, TypeInfo, TypeRegistry};
use crate::source::{FileTable, RuntimeAnchors, SourceContext, SourceFile};
use crate::stats::Stats;
use crate::types::{FileId, MemberId, ObjectId, PackageId, TypeId, TypeNameId, ValueId};

#[derive(Debug)]
pub struct Index {
    graph: PackageGraph,
    files: FileTable,
    decls: Declarations,
    objects: Vec<ObjectInput>,
    references: ReferenceIndex,
    stats: Stats,
    anchors: RuntimeAnchors,
}

impl Index {
    pub fn graph(&self) -> &PackageGraph {
        &self.graph
    }

    pub fn files(&self) -> &FileTable {
        &self.files
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.decls.registry
    }

    pub fn reference_index(&self) -> &ReferenceIndex {
        &self.references
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn package(&self, id: PackageId) -> &Package {
        self.graph.get(id)
    }

    pub fn file(&self, id: FileId) -> &SourceFile {
        self.files.get(id)
    }

    pub fn type_info(&self, id: TypeId) -> &TypeInfo {
        self.decls.registry.get(id)
    }

    pub fn type_name(&self, id: TypeNameId) -> &TypeName {
        &self.decls.type_names[id.index()]
    }

    pub fn type_names(&self) -> &[TypeName] {
        &self.decls.type_names
    }

    pub fn value(&self, id: ValueId) -> &ValueResource {
        &self.decls.values[id.index()]
    }

    pub fn member(&self, id: MemberId) -> &Member {
        self.decls.registry.member(id)
    }

    pub fn object(&self, id: ObjectId) -> Option<&ObjectInput> {
        self.objects.get(id.index())
    }

    /// What an object denotes, when it is a package-level entity or member.
    pub fn resource_of(&self, object: ObjectId) -> Option<Resource> {
        self.decls.resources.get(&object).copied()
    }

    pub fn type_name_in(&self, package: PackageId, name: &str) -> Option<TypeNameId> {
        self.decls.type_name_in(package, name)
    }

    pub fn value_in(&self, package: PackageId, name: &str) -> Option<ValueId> {
        self.decls.value_in(package, name)
    }

    pub fn printer(&self) -> TypePrinter<'_> {
        TypePrinter::new(&self.decls.registry, &self.decls.type_names, &self.graph)
    }

    pub(crate) fn source_context(&self) -> SourceContext<'_> {
        SourceContext {
            resources: &self.decls.resources,
            objects: &self.objects,
            anchors: self.anchors,
        }
    }
}
