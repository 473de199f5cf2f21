//! Translation of parser type expressions into interned registry types.

use super::{Collector, PendingSpec};
use crate::corpus::{FieldInput, MethodSpecInput, TypeExpr};
use crate::registry::{FieldShape, InterfaceSpelling, MethodShape, TypeShape, identity_package};
use crate::types::{MemberId, ObjectId, Position, TypeId, TypeNameId};
use crate::{IndexError, IndexResult};

impl Collector<'_> {
    /// Resolve an expression to its canonical type.
    pub(crate) fn resolve(&mut self, expr: &TypeExpr) -> IndexResult<TypeId> {
        let shape = match expr {
            TypeExpr::Basic { name } => {
                return Ok(match self.decls.registry.basic(name) {
                    Some(id) => id,
                    None => self.decls.registry.intern(TypeShape::Basic(name.as_str().into())),
                });
            }
            TypeExpr::Named {
                package,
                name,
                args,
            } => return self.resolve_named(package, name, args),
            TypeExpr::Pointer { elem } => TypeShape::Pointer(self.resolve(elem)?),
            TypeExpr::Array { len, elem } => TypeShape::Array {
                len: *len,
                elem: self.resolve(elem)?,
            },
            TypeExpr::Slice { elem } => TypeShape::Slice(self.resolve(elem)?),
            TypeExpr::Map { key, value } => TypeShape::Map {
                key: self.resolve(key)?,
                value: self.resolve(value)?,
            },
            TypeExpr::Chan { dir, elem } => TypeShape::Chan {
                dir: *dir,
                elem: self.resolve(elem)?,
            },
            TypeExpr::Signature {
                params,
                results,
                variadic,
            } => TypeShape::Signature {
                params: self.resolve_all(params.iter().map(|p| &p.ty))?,
                results: self.resolve_all(results.iter().map(|p| &p.ty))?,
                variadic: *variadic,
            },
            TypeExpr::Struct { fields } => return self.resolve_struct(fields),
            TypeExpr::Interface { methods, embeds } => {
                return self.resolve_interface(methods, embeds);
            }
            TypeExpr::Tuple { elems } => TypeShape::Tuple(self.resolve_all(elems.iter())?),
            TypeExpr::TypeParam {
                name,
                object,
                constraint,
            } => {
                let key = (name.clone(), *object);
                let constraint = match constraint {
                    Some(constraint) if self.type_params.insert(key.clone()) => {
                        let resolved = self.resolve(constraint);
                        self.type_params.remove(&key);
                        Some(resolved?)
                    }
                    _ => None,
                };
                TypeShape::TypeParam {
                    name: name.as_str().into(),
                    object: *object,
                    constraint,
                }
            }
        };

        Ok(self.decls.registry.intern(shape))
    }

    fn resolve_all<'e>(
        &mut self,
        exprs: impl Iterator<Item = &'e TypeExpr>,
    ) -> IndexResult<Vec<TypeId>> {
        exprs.map(|expr| self.resolve(expr)).collect()
    }

    fn resolve_named(
        &mut self,
        package: &str,
        name: &str,
        args: &[TypeExpr],
    ) -> IndexResult<TypeId> {
        let id = self.lookup_type_name(package, name)?;

        if let Some(slot) = self.aliases.get(&id).cloned() {
            match slot {
                PendingSpec::Resolving => {
                    return Err(IndexError::InvalidCorpus {
                        reason: format!("alias '{package}.{name}' refers to itself"),
                    });
                }
                PendingSpec::Pending(expr) => {
                    self.aliases.insert(id, PendingSpec::Resolving);
                    let target = self.resolve(&expr)?;
                    self.aliases.remove(&id);
                    let type_name = &mut self.decls.type_names[id.index()];
                    type_name.ty = target;
                    type_name.spec = target;
                    return Ok(target);
                }
            }
        }

        let type_name = &self.decls.type_names[id.index()];
        if args.is_empty() || type_name.alias {
            return Ok(type_name.ty);
        }

        let label = type_name.name.clone();
        let args = self.resolve_all(args.iter())?;
        Ok(self.decls.registry.intern_named(id, &label, args))
    }

    fn lookup_type_name(&self, package: &str, name: &str) -> IndexResult<TypeNameId> {
        let not_found = || IndexError::TypeNotFound {
            package: package.to_string(),
            name: name.to_string(),
        };
        let package_id = self.graph.id_of(package).ok_or_else(not_found)?;
        self.decls
            .type_name_in(package_id, name)
            .ok_or_else(not_found)
    }

    fn resolve_struct(&mut self, fields: &[FieldInput]) -> IndexResult<TypeId> {
        let mut shapes = Vec::with_capacity(fields.len());
        for field in fields {
            shapes.push(FieldShape {
                name: field.name.as_str().into(),
                package: identity_package(&field.name, self.package),
                ty: self.resolve(&field.ty)?,
                embedded: field.embedded,
                tag: field.tag.as_deref().map(Into::into),
            });
        }

        let (id, fresh) = self.decls.registry.intern_fresh(TypeShape::Struct(shapes));
        let members = self.decls.registry.get(id).members.clone();
        for (member, field) in members.into_iter().zip(fields) {
            let position = self.position(field.position.as_ref());
            self.annotate_member(member, field.object, position, fresh);
        }
        Ok(id)
    }

    fn resolve_interface(
        &mut self,
        methods: &[MethodSpecInput],
        embeds: &[TypeExpr],
    ) -> IndexResult<TypeId> {
        let mut declared = Vec::with_capacity(methods.len());
        for method in methods {
            declared.push(MethodShape {
                name: method.name.as_str().into(),
                package: identity_package(&method.name, self.package),
                signature: self.resolve(&method.signature)?,
            });
        }
        let embeds = self.resolve_all(embeds.iter())?;

        let mut flattened = declared.clone();
        for &embed in &embeds {
            flattened.extend(self.embedded_methods(embed)?);
        }

        let (id, fresh) = self.decls.registry.intern_interface(
            flattened,
            InterfaceSpelling {
                methods: declared.clone(),
                embeds,
            },
        );
        let members = self.decls.registry.get(id).members.clone();
        for (shape, method) in declared.iter().zip(methods) {
            let member = members.iter().copied().find(|&member| {
                let member = self.decls.registry.member(member);
                member.name == shape.name && member.ty == shape.signature
            });
            if let Some(member) = member {
                let position = self.position(method.position.as_ref());
                self.annotate_member(member, method.object, position, fresh);
            }
        }
        Ok(id)
    }

    /// The full method set an embedded interface contributes.
    fn embedded_methods(&mut self, embed: TypeId) -> IndexResult<Vec<MethodShape>> {
        let mut current = embed;
        // a valid program has no cycles; the bound stops malformed ones
        for _ in 0..=self.decls.type_names.len() {
            let type_name = match &self.decls.registry.get(current).shape {
                TypeShape::Interface { methods } => return Ok(methods.clone()),
                TypeShape::Named { type_name, .. } => *type_name,
                _ => break,
            };
            let spec = self.spec_of(type_name)?;
            if spec == current {
                break;
            }
            current = spec;
        }
        Ok(Vec::new())
    }

    /// Map a declaration's field or method object to the interned member.
    /// Only the first declaration of a shape supplies the member's own
    /// object and position.
    fn annotate_member(
        &mut self,
        member: MemberId,
        object: Option<ObjectId>,
        position: Option<Position>,
        fresh: bool,
    ) {
        if fresh {
            let entry = self.decls.registry.member_mut(member);
            entry.object = object;
            entry.position = position;
            if entry.package.is_none() {
                entry.package = Some(self.package);
            }
        }
        if let Some(object) = object {
            self.decls
                .resources
                .insert(object, super::Resource::Member(member));
        }
    }
}
