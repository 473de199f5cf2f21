//! Query API over the sealed index.
//!
//! Lookups by path and name return the not-found variants of [`IndexError`];
//! listings honour `show_unexported`.

use super::Index;
use super::views::*;
use crate::collector::{Resource, ValueResource};
use crate::packages::PackageOrder;
use crate::references::ReferenceIndex;
use crate::registry::{Implementer, ValueUse};
use crate::selectors::{Selector, method_set_of};
use crate::source::SourceAnnotator;
use crate::types::{FileId, ObjectId, PackageId, Position, TypeId, TypeNameId, is_exported};
use crate::{IndexError, IndexResult};

impl Index {
    pub fn package_id(&self, path: &str) -> IndexResult<PackageId> {
        self.graph
            .id_of(path)
            .ok_or_else(|| IndexError::PackageNotFound {
                path: path.to_string(),
            })
    }

    pub fn package_summary(&self, id: PackageId) -> PackageSummary {
        let package = self.graph.get(id);
        PackageSummary {
            path: package.path.clone(),
            name: package.name.clone(),
            imports: package.imports.len(),
            importers: package.importers.len(),
            deps: package.deps.len(),
            depth: package.depth,
            height: package.height,
        }
    }

    /// Every package in one of the three overview orders.
    pub fn packages(&self, order: PackageOrder) -> Vec<PackageSummary> {
        self.graph
            .ordered(order)
            .into_iter()
            .map(|id| self.package_summary(id))
            .collect()
    }

    pub fn package_detail(&self, path: &str, show_unexported: bool) -> IndexResult<PackageDetail> {
        let id = self.package_id(path)?;
        let package = self.graph.get(id);
        let printer = self.printer().relative_to(id);

        let type_names = package
            .type_names
            .iter()
            .map(|&tn| self.type_name(tn))
            .filter(|tn| show_unexported || tn.is_exported())
            .map(|tn| {
                let info = self.type_info(tn.ty);
                TypeNameView {
                    name: tn.name.to_string(),
                    kind: self.type_info(info.underlying).kind(),
                    alias: tn.alias,
                    exported: tn.is_exported(),
                    spec: printer.print(tn.spec),
                    fields: info.fields.len(),
                    methods: info.methods.len(),
                    position: self.position_view(tn.position),
                }
            })
            .collect();

        let values = |ids: &[crate::types::ValueId]| -> Vec<ValueView> {
            ids.iter()
                .map(|&v| self.value(v))
                .filter(|v| show_unexported || v.is_exported())
                .map(|v| self.value_view(v, id))
                .collect()
        };

        Ok(PackageDetail {
            summary: self.package_summary(id),
            module: package.module.map(|m| self.graph.module(m).path.clone()),
            imports: self.paths(&package.imports),
            importers: self.paths(&package.importers),
            files: package
                .files
                .iter()
                .map(|&f| {
                    let file = self.file(f);
                    FileView {
                        name: file.name.to_string(),
                        lines: file.line_count(),
                        generated_from: file
                            .generated_from
                            .as_ref()
                            .map(|p| p.display().to_string()),
                    }
                })
                .collect(),
            type_names,
            functions: values(&package.functions),
            variables: values(&package.variables),
            constants: values(&package.constants),
        })
    }

    pub fn dependencies(&self, path: &str) -> IndexResult<DependencyView> {
        let id = self.package_id(path)?;
        let package = self.graph.get(id);
        Ok(DependencyView {
            package: self.package_summary(id),
            deps: package.deps.iter().map(|&d| self.package_summary(d)).collect(),
            deped_bys: package
                .deped_bys
                .iter()
                .map(|&d| self.package_summary(d))
                .collect(),
        })
    }

    pub fn lookup_type(&self, path: &str, name: &str) -> IndexResult<TypeNameId> {
        let package = self.package_id(path)?;
        self.type_name_in(package, name)
            .ok_or_else(|| IndexError::TypeNotFound {
                package: path.to_string(),
                name: name.to_string(),
            })
    }

    pub fn type_detail(
        &self,
        path: &str,
        name: &str,
        show_unexported: bool,
    ) -> IndexResult<TypeDetail> {
        let tn = self.type_name(self.lookup_type(path, name)?);
        let ty = tn.ty;
        let info = self.type_info(ty);
        let printer = self.printer().relative_to(tn.package);

        let selectors = |list: &[Selector]| -> Vec<SelectorView> {
            list.iter()
                .filter(|s| show_unexported || is_exported(&s.name))
                .map(|s| self.selector_view(s, tn.package))
                .collect()
        };
        let method_names = |pointer: bool| -> Vec<String> {
            method_set_of(self.registry(), ty, pointer)
                .into_iter()
                .filter(|s| show_unexported || is_exported(&s.name))
                .map(|s| s.name.to_string())
                .collect()
        };

        Ok(TypeDetail {
            ty: self.type_ref(ty),
            kind: self.type_info(info.underlying).kind(),
            alias: tn.alias,
            underlying: printer.print(info.underlying),
            fields: selectors(&info.fields),
            methods: selectors(&info.methods),
            value_method_set: method_names(false),
            pointer_method_set: method_names(true),
            implements: info.implements.iter().map(|&i| self.type_ref(i)).collect(),
            implemented_bys: self.implementer_views(&info.implemented_bys, show_unexported),
            as_types_of: info
                .as_types_of
                .iter()
                .map(|&v| ValueUse {
                    value: v,
                    via_pointer: false,
                })
                .filter_map(|u| self.value_ref(u, show_unexported))
                .collect(),
            as_inputs_of: self.value_refs(&info.as_inputs_of, show_unexported),
            as_outputs_of: self.value_refs(&info.as_outputs_of, show_unexported),
            position: self.position_view(tn.position),
        })
    }

    pub fn implementations(&self, path: &str, name: &str) -> IndexResult<ImplementationsView> {
        let tn = self.type_name(self.lookup_type(path, name)?);
        let info = self.type_info(tn.ty);
        Ok(ImplementationsView {
            ty: self.type_ref(tn.ty),
            interface: self.registry().is_interface(tn.ty),
            implemented_bys: self.implementer_views(&info.implemented_bys, true),
            implements: info.implements.iter().map(|&i| self.type_ref(i)).collect(),
        })
    }

    /// Resolve the identifier part of a `use:` path: `Name` names a
    /// package-level declaration, `Type.selector` a field or method reachable
    /// on a type, promoted ones included.
    pub fn resolve_use_path(&self, path: &str, identifier: &str) -> IndexResult<ObjectId> {
        let package = self.package_id(path)?;
        let not_found = || IndexError::IdentifierNotFound {
            package: path.to_string(),
            name: identifier.to_string(),
        };

        let object = match identifier.split_once('.') {
            None => self
                .type_name_in(package, identifier)
                .and_then(|tn| self.type_name(tn).object)
                .or_else(|| {
                    self.value_in(package, identifier)
                        .and_then(|v| self.value(v).object)
                }),
            Some((type_name, selector)) => {
                let tn = self.type_name_in(package, type_name).ok_or_else(not_found)?;
                let base = self.registry().deref(self.type_name(tn).ty).0;
                let info = self.type_info(base);
                info.fields
                    .iter()
                    .chain(&info.methods)
                    .find(|s| &*s.name == selector)
                    .and_then(|s| self.member(s.member).object)
            }
        };
        object.ok_or_else(not_found)
    }

    pub fn references(&self, path: &str, identifier: &str) -> IndexResult<ReferencesView> {
        let object = self.resolve_use_path(path, identifier)?;
        let groups: Vec<ReferenceGroup> = self
            .references
            .grouped_by_package(object)
            .into_iter()
            .map(|(package, occurrences)| ReferenceGroup {
                package: self.graph.get(package).path.clone(),
                occurrences: occurrences
                    .iter()
                    .map(|o| OccurrenceView {
                        file: self.file(o.file).name.to_string(),
                        line: o.line,
                        column: o.column,
                        offset: o.offset,
                        declaration: o.declaration,
                    })
                    .collect(),
            })
            .collect();

        Ok(ReferencesView {
            package: path.to_string(),
            target: identifier.to_string(),
            object,
            total: self.references.references_to(object).len(),
            groups,
        })
    }

    pub fn source(&self, path: &str, file_name: &str) -> IndexResult<SourceView> {
        let package = self.package_id(path)?;
        let id = self
            .files
            .find(package, file_name)
            .ok_or_else(|| IndexError::FileNotFound {
                package: path.to_string(),
                name: file_name.to_string(),
            })?;
        let file = self.file(id);

        Ok(SourceView {
            package: path.to_string(),
            file: file.name.to_string(),
            generated_from: file.generated_from.as_ref().map(|p| p.display().to_string()),
            lines: file.line_count(),
            external_link: self.source_link(package, &file.name, 0),
            content: file.content.clone(),
            annotations: SourceAnnotator::new(file, self.source_context()).collect(),
        })
    }

    /// The object declared or referenced at `offset` of `file`.
    pub fn declaration_at(&self, file: FileId, offset: u32) -> Option<ObjectId> {
        ReferenceIndex::declaration_at(&self.files, file, offset)
    }

    /// Link to a line of a package file in its module repository.
    pub fn source_link(&self, package: PackageId, file: &str, line: u32) -> Option<String> {
        let package = self.graph.get(package);
        let module = self.graph.module(package.module?);
        module.source_link(&package.path, file, line)
    }

    /// Where a resource is declared.
    pub fn resource_position(&self, resource: Resource) -> Option<Position> {
        match resource {
            Resource::TypeName(id) => self.type_name(id).position,
            Resource::Value(id) => self.value(id).position,
            Resource::Member(id) => self.member(id).position,
            Resource::Package(_) => None,
        }
    }

    fn paths(&self, ids: &[PackageId]) -> Vec<String> {
        ids.iter().map(|&id| self.graph.get(id).path.clone()).collect()
    }

    fn position_view(&self, position: Option<Position>) -> Option<PositionView> {
        let position = position?;
        Some(PositionView {
            file: self.file(position.file).name.to_string(),
            line: position.line,
            column: position.column,
        })
    }

    fn type_ref(&self, ty: TypeId) -> TypeRef {
        let (base, _) = self.registry().deref(ty);
        let display = self.printer().print(ty);
        match self.type_info(base).type_name() {
            Some(tn) => {
                let tn = self.type_name(tn);
                TypeRef {
                    package: self.graph.get(tn.package).path.clone(),
                    name: tn.name.to_string(),
                    display,
                }
            }
            None => TypeRef {
                package: String::new(),
                name: display.clone(),
                display,
            },
        }
    }

    fn implementer_views(
        &self,
        implementers: &[Implementer],
        show_unexported: bool,
    ) -> Vec<ImplementerView> {
        implementers
            .iter()
            .map(|imp| ImplementerView {
                ty: self.type_ref(imp.type_id),
                pointer: imp.pointer,
            })
            .filter(|view| show_unexported || is_exported(&view.ty.name))
            .collect()
    }

    fn value_ref(&self, value_use: ValueUse, show_unexported: bool) -> Option<ValueRef> {
        let value = self.value(value_use.value);
        if !show_unexported && !value.is_exported() {
            return None;
        }
        let name = match value.receiver {
            Some(receiver) => {
                let base = self.type_info(receiver.base).name.as_deref().unwrap_or("?");
                format!("{base}.{}", value.name)
            }
            None => value.name.to_string(),
        };
        Some(ValueRef {
            package: self.graph.get(value.package).path.clone(),
            name,
            via_pointer: value_use.via_pointer,
        })
    }

    fn value_refs(&self, uses: &[ValueUse], show_unexported: bool) -> Vec<ValueRef> {
        uses.iter()
            .filter_map(|&u| self.value_ref(u, show_unexported))
            .collect()
    }

    fn value_view(&self, value: &ValueResource, package: PackageId) -> ValueView {
        let printer = self.printer().relative_to(package);
        ValueView {
            name: value.name.to_string(),
            kind: value.kind,
            exported: value.is_exported(),
            type_string: printer.print(value.ty),
            receiver: value.receiver.map(|r| {
                let ty = if r.pointer {
                    self.type_info(r.base).pointer_to.unwrap_or(r.base)
                } else {
                    r.base
                };
                printer.print(ty)
            }),
            position: self.position_view(value.position),
        }
    }

    fn selector_view(&self, selector: &Selector, package: PackageId) -> SelectorView {
        let member = self.member(selector.member);
        let printer = self.printer().relative_to(package);
        let type_string = if member.is_method() || !member.is_field() {
            printer.print_signature(member.ty)
        } else {
            printer.print(member.ty)
        };
        SelectorView {
            name: selector.name.to_string(),
            type_string,
            chain: selector
                .chain
                .iter()
                .map(|&m| self.member(m).name.to_string())
                .collect(),
            pointer_receiver_only: selector.pointer_receiver_only,
            duplicate_prefix: selector.duplicate_prefix,
            exported: is_exported(&selector.name),
        }
    }
}
