//! Page models returned by the query API and a Go-flavoured type printer.
//!
//! Every view is plain data with owned strings so it can be serialized after
//! the index lock has been released.

use crate::collector::{TypeName, ValueKind};
use crate::packages::PackageGraph;
use crate::registry::{TypeKind, TypeRegistry, TypeShape};
use crate::source::Annotation;
use crate::types::{ChanDir, ObjectId, PackageId, TypeId};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSummary {
    pub path: String,
    pub name: String,
    pub imports: usize,
    pub importers: usize,
    pub deps: usize,
    pub depth: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionView {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeNameView {
    pub name: String,
    pub kind: TypeKind,
    pub alias: bool,
    pub exported: bool,
    /// Printed type expression of the declaration
    pub spec: String,
    pub fields: usize,
    pub methods: usize,
    pub position: Option<PositionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValueView {
    pub name: String,
    pub kind: ValueKind,
    pub exported: bool,
    #[serde(rename = "type")]
    pub type_string: String,
    /// Printed receiver type of a method
    pub receiver: Option<String>,
    pub position: Option<PositionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileView {
    pub name: String,
    pub lines: usize,
    pub generated_from: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageDetail {
    pub summary: PackageSummary,
    pub module: Option<String>,
    pub imports: Vec<String>,
    pub importers: Vec<String>,
    pub files: Vec<FileView>,
    pub type_names: Vec<TypeNameView>,
    pub functions: Vec<ValueView>,
    pub variables: Vec<ValueView>,
    pub constants: Vec<ValueView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DependencyView {
    pub package: PackageSummary,
    /// Transitive dependencies in dependency order
    pub deps: Vec<PackageSummary>,
    /// Transitive dependents in dependency order
    pub deped_bys: Vec<PackageSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    pub package: String,
    pub name: String,
    /// Printed type, qualified by package name
    pub display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectorView {
    pub name: String,
    #[serde(rename = "type")]
    pub type_string: String,
    /// Names of the embedded fields traversed, outermost first
    pub chain: Vec<String>,
    pub pointer_receiver_only: bool,
    pub duplicate_prefix: u32,
    pub exported: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImplementerView {
    #[serde(flatten)]
    pub ty: TypeRef,
    /// Only the pointer type implements the interface
    pub pointer: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValueRef {
    pub package: String,
    pub name: String,
    pub via_pointer: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeDetail {
    pub ty: TypeRef,
    pub kind: TypeKind,
    pub alias: bool,
    pub underlying: String,
    pub fields: Vec<SelectorView>,
    pub methods: Vec<SelectorView>,
    pub value_method_set: Vec<String>,
    pub pointer_method_set: Vec<String>,
    pub implements: Vec<TypeRef>,
    pub implemented_bys: Vec<ImplementerView>,
    pub as_types_of: Vec<ValueRef>,
    pub as_inputs_of: Vec<ValueRef>,
    pub as_outputs_of: Vec<ValueRef>,
    pub position: Option<PositionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImplementationsView {
    pub ty: TypeRef,
    pub interface: bool,
    pub implemented_bys: Vec<ImplementerView>,
    pub implements: Vec<TypeRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OccurrenceView {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub offset: u32,
    pub declaration: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferenceGroup {
    pub package: String,
    pub occurrences: Vec<OccurrenceView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferencesView {
    pub package: String,
    pub target: String,
    pub object: ObjectId,
    pub total: usize,
    pub groups: Vec<ReferenceGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceView {
    pub package: String,
    pub file: String,
    pub generated_from: Option<String>,
    pub lines: usize,
    /// Link into the module repository when one can be synthesized
    pub external_link: Option<String>,
    pub content: String,
    pub annotations: Vec<Annotation>,
}

/// Prints interned types the way they are written in Go source.
///
/// Named types from packages other than `relative_to` are qualified with
/// their package name. Predeclared types are never qualified.
pub struct TypePrinter<'a> {
    registry: &'a TypeRegistry,
    type_names: &'a [TypeName],
    graph: &'a PackageGraph,
    relative_to: Option<PackageId>,
}

impl<'a> TypePrinter<'a> {
    pub fn new(
        registry: &'a TypeRegistry,
        type_names: &'a [TypeName],
        graph: &'a PackageGraph,
    ) -> Self {
        Self {
            registry,
            type_names,
            graph,
            relative_to: None,
        }
    }

    pub fn relative_to(mut self, package: PackageId) -> Self {
        self.relative_to = Some(package);
        self
    }

    pub fn print(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty);
        out
    }

    /// A signature without its `func` keyword, as in interface method lists.
    pub fn print_signature(&self, ty: TypeId) -> String {
        let mut out = String::new();
        match &self.registry.get(ty).shape {
            TypeShape::Signature {
                params,
                results,
                variadic,
            } => self.write_signature(&mut out, params, results, *variadic),
            _ => self.write_type(&mut out, ty),
        }
        out
    }

    fn write_type(&self, out: &mut String, ty: TypeId) {
        let info = self.registry.get(ty);
        match &info.shape {
            TypeShape::Basic(name) => out.push_str(name),
            TypeShape::Named { type_name, args } => {
                let decl = &self.type_names[type_name.index()];
                let package = self.graph.get(decl.package);
                if !package.is_builtin() && Some(decl.package) != self.relative_to {
                    out.push_str(&package.name);
                    out.push('.');
                }
                out.push_str(&decl.name);
                if !args.is_empty() {
                    out.push('[');
                    self.write_list(out, args);
                    out.push(']');
                }
            }
            TypeShape::Pointer(elem) => {
                out.push('*');
                self.write_type(out, *elem);
            }
            TypeShape::Array { len, elem } => {
                let _ = write!(out, "[{len}]");
                self.write_type(out, *elem);
            }
            TypeShape::Slice(elem) => {
                out.push_str("[]");
                self.write_type(out, *elem);
            }
            TypeShape::Map { key, value } => {
                out.push_str("map[");
                self.write_type(out, *key);
                out.push(']');
                self.write_type(out, *value);
            }
            TypeShape::Chan { dir, elem } => {
                out.push_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.write_type(out, *elem);
            }
            TypeShape::Signature {
                params,
                results,
                variadic,
            } => {
                out.push_str("func");
                self.write_signature(out, params, results, *variadic);
            }
            TypeShape::Struct(fields) => {
                if fields.is_empty() {
                    out.push_str("struct{}");
                    return;
                }
                out.push_str("struct{ ");
                for (index, field) in fields.iter().enumerate() {
                    if index > 0 {
                        out.push_str("; ");
                    }
                    if !field.embedded {
                        out.push_str(&field.name);
                        out.push(' ');
                    }
                    self.write_type(out, field.ty);
                }
                out.push_str(" }");
            }
            TypeShape::Interface { methods } => {
                let (methods, embeds) = match &info.spelling {
                    Some(spelling) => (&spelling.methods, spelling.embeds.as_slice()),
                    None => (methods, &[][..]),
                };
                if methods.is_empty() && embeds.is_empty() {
                    out.push_str("interface{}");
                    return;
                }
                out.push_str("interface{ ");
                let mut first = true;
                for embed in embeds {
                    if !first {
                        out.push_str("; ");
                    }
                    first = false;
                    self.write_type(out, *embed);
                }
                for method in methods {
                    if !first {
                        out.push_str("; ");
                    }
                    first = false;
                    out.push_str(&method.name);
                    out.push_str(&self.print_signature(method.signature));
                }
                out.push_str(" }");
            }
            TypeShape::Tuple(items) => {
                out.push('(');
                self.write_list(out, items);
                out.push(')');
            }
            TypeShape::TypeParam { name, .. } => out.push_str(name),
        }
    }

    fn write_signature(&self, out: &mut String, params: &[TypeId], results: &[TypeId], variadic: bool) {
        out.push('(');
        for (index, param) in params.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            let last = index + 1 == params.len();
            match self.registry.get(*param).shape {
                TypeShape::Slice(elem) if variadic && last => {
                    out.push_str("...");
                    self.write_type(out, elem);
                }
                _ => self.write_type(out, *param),
            }
        }
        out.push(')');
        match results {
            [] => {}
            [single] => {
                out.push(' ');
                self.write_type(out, *single);
            }
            _ => {
                out.push_str(" (");
                self.write_list(out, results);
                out.push(')');
            }
        }
    }

    fn write_list(&self, out: &mut String, items: &[TypeId]) {
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            self.write_type(out, *item);
        }
    }
}
