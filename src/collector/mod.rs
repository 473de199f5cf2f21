//! Declaration collector: turns a package's declarations into type names,
//! values and members, and fills the inverse lists of the types they use.

pub mod decls;
mod resolve;

pub use decls::{Receiver, Resource, TypeName, ValueKind, ValueResource};

use crate::corpus::{PackageInput, SourcePos, TypeExpr, TypeNameInput, ValueInput};
use crate::packages::PackageGraph;
use crate::registry::builtin::{default_type, is_untyped};
use crate::registry::{MemberDraft, MemberKind, TypeRegistry, TypeShape, ValueUse};
use crate::source::FileTable;
use crate::types::{CompactString, ObjectId, PackageId, Position, TypeId, TypeNameId, ValueId};
use crate::{IndexError, IndexResult};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Everything the collector produces, shared across packages.
#[derive(Debug, Default)]
pub struct Declarations {
    pub registry: TypeRegistry,
    pub type_names: Vec<TypeName>,
    pub values: Vec<ValueResource>,
    /// Type-checker objects that denote an entity of the index
    pub resources: HashMap<ObjectId, Resource>,
    by_name: HashMap<(PackageId, CompactString), TypeNameId>,
    values_by_name: HashMap<(PackageId, CompactString), ValueId>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_name_in(&self, package: PackageId, name: &str) -> Option<TypeNameId> {
        self.by_name.get(&(package, name.into())).copied()
    }

    /// Package-level value by name; methods are not addressable this way.
    pub fn value_in(&self, package: PackageId, name: &str) -> Option<ValueId> {
        self.values_by_name.get(&(package, name.into())).copied()
    }
}

/// A declaration whose type expression is resolved on first demand.
#[derive(Debug, Clone)]
pub(crate) enum PendingSpec {
    Pending(TypeExpr),
    Resolving,
}

/// Collects the declarations of one package.
pub struct Collector<'a> {
    decls: &'a mut Declarations,
    graph: &'a mut PackageGraph,
    files: &'a FileTable,
    package: PackageId,
    aliases: HashMap<TypeNameId, PendingSpec>,
    /// Specs of this package's defined types not resolved yet
    specs: HashMap<TypeNameId, PendingSpec>,
    type_params: HashSet<(String, Option<ObjectId>)>,
}

impl<'a> Collector<'a> {
    pub fn new(
        decls: &'a mut Declarations,
        graph: &'a mut PackageGraph,
        files: &'a FileTable,
        package: PackageId,
    ) -> Self {
        Self {
            decls,
            graph,
            files,
            package,
            aliases: HashMap::new(),
            specs: HashMap::new(),
            type_params: HashSet::new(),
        }
    }

    /// Run every pass over `input`.
    pub fn collect(mut self, input: &PackageInput) -> IndexResult<()> {
        let first_type = self.decls.registry.len();

        let type_names = self.declare_type_names(&input.type_names);
        for (id, decl) in type_names.iter().zip(&input.type_names) {
            self.resolve_spec(*id, decl)?;
        }
        self.settle_underlyings(first_type);

        for function in &input.functions {
            self.collect_function(function)?;
        }
        for constant in &input.constants {
            self.collect_value(constant, ValueKind::Constant)?;
        }
        for variable in &input.variables {
            self.collect_value(variable, ValueKind::Variable)?;
        }

        // generic instances created by signatures and values
        self.settle_underlyings(first_type);

        let package = self.graph.get(self.package);
        debug!(
            package = %package.path,
            type_names = package.type_names.len(),
            functions = package.functions.len(),
            "collected declarations"
        );
        Ok(())
    }

    fn position(&self, pos: Option<&SourcePos>) -> Option<Position> {
        self.files.position(self.package, pos?)
    }

    /// Pass 1: make every type name of the package visible before any
    /// expression is resolved, so declarations may refer to each other.
    fn declare_type_names(&mut self, inputs: &[TypeNameInput]) -> Vec<TypeNameId> {
        let mut ids = Vec::with_capacity(inputs.len());
        for decl in inputs {
            let id = TypeNameId::new(self.decls.type_names.len());
            let ty = if decl.alias {
                self.aliases.insert(id, PendingSpec::Pending(decl.ty.clone()));
                TypeId(0)
            } else if let Some(basic) = self.predeclared_basic(decl) {
                basic
            } else {
                self.specs.insert(id, PendingSpec::Pending(decl.ty.clone()));
                self.decls.registry.intern_named(id, &decl.name, Vec::new())
            };

            self.decls.type_names.push(TypeName {
                id,
                name: decl.name.as_str().into(),
                package: self.package,
                position: self.position(decl.position.as_ref()),
                object: decl.object,
                ty,
                spec: ty,
                alias: decl.alias,
            });
            self.decls
                .by_name
                .insert((self.package, decl.name.as_str().into()), id);
            if let Some(object) = decl.object {
                self.decls.resources.insert(object, Resource::TypeName(id));
            }
            self.graph.get_mut(self.package).type_names.push(id);
            ids.push(id);
        }
        ids
    }

    /// `type int int` in the builtin package binds the basic type itself.
    fn predeclared_basic(&self, decl: &TypeNameInput) -> Option<TypeId> {
        if !self.graph.get(self.package).is_builtin() {
            return None;
        }
        match &decl.ty {
            TypeExpr::Basic { name } if *name == decl.name => self.decls.registry.basic(name),
            _ => None,
        }
    }

    /// Pass 2: resolve declaration specs and attach the members declared in
    /// struct and interface literals to the named type.
    fn resolve_spec(&mut self, id: TypeNameId, decl: &TypeNameInput) -> IndexResult<()> {
        if decl.alias {
            if self.aliases.contains_key(&id) {
                let name = decl.name.clone();
                let package = self.graph.get(self.package).path.clone();
                let target = TypeExpr::Named {
                    package,
                    name,
                    args: Vec::new(),
                };
                self.resolve(&target)?;
            }
            return Ok(());
        }

        let named = self.decls.type_names[id.index()].ty;
        if !self.decls.registry.get(named).is_named() {
            return Ok(());
        }

        let spec = self.spec_of(id)?;

        match &decl.ty {
            TypeExpr::Struct { fields } => {
                let shapes = match &self.decls.registry.get(spec).shape {
                    TypeShape::Struct(shapes) => shapes.clone(),
                    _ => Vec::new(),
                };
                for (shape, field) in shapes.into_iter().zip(fields) {
                    let position = self.position(field.position.as_ref());
                    self.add_spec_member(
                        named,
                        &field.name,
                        shape.ty,
                        MemberKind::Field {
                            embedded: field.embedded,
                            tag: shape.tag,
                        },
                        field.object,
                        position,
                    );
                }
            }
            TypeExpr::Interface { methods, embeds } => {
                let shapes = match &self.decls.registry.get(spec).shape {
                    TypeShape::Interface { methods, .. } => methods.clone(),
                    _ => Vec::new(),
                };
                for method in methods {
                    let Some(shape) = shapes.iter().find(|s| *s.name == *method.name) else {
                        continue;
                    };
                    let position = self.position(method.position.as_ref());
                    self.add_spec_member(
                        named,
                        &method.name,
                        shape.signature,
                        MemberKind::InterfaceMethod,
                        method.object,
                        position,
                    );
                }
                for embed in embeds {
                    let ty = self.resolve(embed)?;
                    let name: CompactString =
                        self.decls.registry.base_name(ty).unwrap_or_default().into();
                    self.add_spec_member(
                        named,
                        &name,
                        ty,
                        MemberKind::EmbeddedInterface,
                        None,
                        None,
                    );
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// The resolved spec of a type name, resolving a pending one of this
    /// package now. Embedded interfaces need this before their turn comes.
    pub(crate) fn spec_of(&mut self, id: TypeNameId) -> IndexResult<TypeId> {
        match self.specs.get(&id).cloned() {
            Some(PendingSpec::Pending(expr)) => {
                self.specs.insert(id, PendingSpec::Resolving);
                let spec = self.resolve(&expr)?;
                self.specs.remove(&id);
                self.decls.type_names[id.index()].spec = spec;
                Ok(spec)
            }
            // embedded in itself: the named node stands in for its spec
            Some(PendingSpec::Resolving) => {
                debug!(
                    name = %self.decls.type_names[id.index()].name,
                    "recursive interface embedding"
                );
                Ok(self.decls.type_names[id.index()].ty)
            }
            None => Ok(self.decls.type_names[id.index()].spec),
        }
    }

    fn add_spec_member(
        &mut self,
        owner: TypeId,
        name: &str,
        ty: TypeId,
        kind: MemberKind,
        object: Option<ObjectId>,
        position: Option<Position>,
    ) {
        let member = self.decls.registry.add_member(MemberDraft {
            name: name.into(),
            package: Some(self.package),
            owner,
            ty,
            kind,
            object,
            position,
        });
        if let Some(object) = object {
            self.decls.resources.insert(object, Resource::Member(member));
        }
    }

    /// Pass 3: follow spec chains down to the first non-named type.
    fn settle_underlyings(&mut self, first_type: usize) {
        let last = self.decls.registry.len();
        for index in first_type..last {
            let id = TypeId::new(index);
            if self.decls.registry.get(id).is_named() {
                let underlying = self.underlying_of(id);
                self.decls.registry.set_underlying(id, underlying);
            }
        }
    }

    fn underlying_of(&self, ty: TypeId) -> TypeId {
        let mut current = ty;
        // a valid program has no cycles; the bound stops malformed ones
        for _ in 0..=self.decls.type_names.len() {
            let Some(type_name) = self.decls.registry.get(current).type_name() else {
                return current;
            };
            let spec = self.decls.type_names[type_name.index()].spec;
            if spec == current {
                return current;
            }
            current = spec;
        }
        current
    }

    /// Pass 4: functions and methods.
    fn collect_function(&mut self, input: &crate::corpus::FunctionInput) -> IndexResult<()> {
        let signature = self.resolve(&input.signature)?;
        let id = ValueId::new(self.decls.values.len());

        let receiver = match &input.receiver {
            Some(receiver) => {
                let type_name = self
                    .decls
                    .type_name_in(self.package, &receiver.type_name)
                    .ok_or_else(|| IndexError::TypeNotFound {
                        package: self.graph.get(self.package).path.clone(),
                        name: receiver.type_name.clone(),
                    })?;
                let base = self.decls.type_names[type_name.index()].ty;
                let member = self.decls.registry.add_member(MemberDraft {
                    name: input.name.as_str().into(),
                    package: Some(self.package),
                    owner: base,
                    ty: signature,
                    kind: MemberKind::Method {
                        function: id,
                        pointer_receiver: receiver.pointer,
                    },
                    object: input.object,
                    position: self.position(input.position.as_ref()),
                });
                Some(Receiver {
                    base,
                    pointer: receiver.pointer,
                    member,
                })
            }
            None => None,
        };

        self.push_value(
            id,
            &input.name,
            input.object,
            input.position.as_ref(),
            ValueKind::Function,
            signature,
            receiver,
        );

        if let TypeShape::Signature {
            params, results, ..
        } = self.decls.registry.get(signature).shape.clone()
        {
            for param in params {
                self.record_use(param, id, |info| &mut info.as_inputs_of);
            }
            for result in results {
                self.record_use(result, id, |info| &mut info.as_outputs_of);
            }
        }
        self.graph.get_mut(self.package).functions.push(id);
        Ok(())
    }

    /// Record `value` against `ty`, and against `T` when `ty` is `*T` with `T` named.
    fn record_use(
        &mut self,
        ty: TypeId,
        value: ValueId,
        list: fn(&mut crate::registry::TypeInfo) -> &mut Vec<ValueUse>,
    ) {
        let push = |registry: &mut TypeRegistry, target: TypeId, via_pointer: bool| {
            let uses = list(registry.get_mut(target));
            let entry = ValueUse { value, via_pointer };
            if !uses.contains(&entry) {
                uses.push(entry);
            }
        };

        push(&mut self.decls.registry, ty, false);
        let (base, is_pointer) = self.decls.registry.deref(ty);
        if is_pointer && self.decls.registry.get(base).is_named() {
            push(&mut self.decls.registry, base, true);
        }
    }

    /// Pass 5: constants and variables.
    fn collect_value(&mut self, input: &ValueInput, kind: ValueKind) -> IndexResult<()> {
        let mut ty = self.resolve(&input.ty)?;
        let mut typed = true;
        if let TypeShape::Basic(name) = &self.decls.registry.get(ty).shape {
            if is_untyped(name) {
                match default_type(name).and_then(|d| self.decls.registry.basic(d)) {
                    Some(default) => ty = default,
                    None => typed = false,
                }
            }
        }

        let id = ValueId::new(self.decls.values.len());
        self.push_value(
            id,
            &input.name,
            input.object,
            input.position.as_ref(),
            kind,
            ty,
            None,
        );
        if typed {
            self.decls.registry.get_mut(ty).as_types_of.push(id);
        }

        let package = self.graph.get_mut(self.package);
        match kind {
            ValueKind::Constant => package.constants.push(id),
            _ => package.variables.push(id),
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn push_value(
        &mut self,
        id: ValueId,
        name: &str,
        object: Option<ObjectId>,
        position: Option<&SourcePos>,
        kind: ValueKind,
        ty: TypeId,
        receiver: Option<Receiver>,
    ) {
        let position = self.position(position);
        self.decls.values.push(ValueResource {
            id,
            name: name.into(),
            package: self.package,
            position,
            object,
            kind,
            ty,
            receiver,
        });
        if receiver.is_none() {
            self.decls
                .values_by_name
                .insert((self.package, name.into()), id);
        }
        if let Some(object) = object {
            self.decls.resources.insert(object, Resource::Value(id));
        }
    }
}
