//! Selector resolution: the fields and methods reachable on a type,
//! promotions through embedding included.
//!
//! Resolution is a breadth-first walk over embedding levels. A name is
//! accepted at the shallowest depth it appears and shadows every deeper
//! occurrence. Two different declarations of a name at that depth make it
//! ambiguous, so it is left out and also blocks deeper occurrences.

pub mod order;

use crate::collector::TypeName;
use crate::registry::{MemberKind, TypeRegistry, TypeShape};
use crate::types::{CompactString, MemberId, PackageId, TypeId};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A resolved field or method access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selector {
    pub member: MemberId,
    pub name: CompactString,
    /// Embedded fields traversed from the receiver, outermost first
    pub chain: Vec<MemberId>,
    /// A pointer-receiver method not reachable through a pointer embedding
    pub pointer_receiver_only: bool,
    /// Leading chain names shared with the previous selector in the list
    pub duplicate_prefix: u32,
}

impl Selector {
    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    pub fn is_promoted(&self) -> bool {
        !self.chain.is_empty()
    }
}

type SelectorKey = (CompactString, Option<PackageId>);

#[derive(Debug, Clone)]
struct Candidate {
    member: MemberId,
    chain: Vec<MemberId>,
    via_pointer: bool,
}

#[derive(Debug)]
enum Decision {
    Accepted(Candidate),
    Blocked,
}

#[derive(Debug, Clone)]
struct Frontier {
    ty: TypeId,
    chain: Vec<MemberId>,
    via_pointer: bool,
}

pub struct SelectorResolver<'a> {
    registry: &'a TypeRegistry,
    type_names: &'a [TypeName],
}

impl<'a> SelectorResolver<'a> {
    pub fn new(registry: &'a TypeRegistry, type_names: &'a [TypeName]) -> Self {
        Self {
            registry,
            type_names,
        }
    }

    /// Members declared directly on `ty`, methods included.
    pub fn declared_members(&self, ty: TypeId) -> Vec<MemberId> {
        let info = self.registry.get(ty);
        match &info.shape {
            TypeShape::Named { type_name, args } => {
                let origin = self.type_names[type_name.index()].ty;
                if !args.is_empty() && origin != ty {
                    return self.declared_members(origin);
                }
                let mut members = self.structural_members(ty);
                members.extend(
                    info.members
                        .iter()
                        .copied()
                        .filter(|m| matches!(self.registry.member(*m).kind, MemberKind::Method { .. })),
                );
                members
            }
            TypeShape::Struct(_) | TypeShape::Interface { .. } => info.members.clone(),
            _ => Vec::new(),
        }
    }

    /// Fields and interface methods of a named type, taken from its own
    /// declaration or from the type it is defined over.
    fn structural_members(&self, ty: TypeId) -> Vec<MemberId> {
        let mut current = ty;
        for _ in 0..=self.type_names.len() {
            let info = self.registry.get(current);
            let own: Vec<MemberId> = info
                .members
                .iter()
                .copied()
                .filter(|m| !matches!(self.registry.member(*m).kind, MemberKind::Method { .. }))
                .collect();
            if !own.is_empty() {
                return own;
            }
            let Some(type_name) = info.type_name() else {
                return own;
            };
            let spec = self.type_names[type_name.index()].spec;
            if spec == current {
                return Vec::new();
            }
            current = spec;
        }
        Vec::new()
    }

    /// Compute the field and method selectors of `ty`, both in presentation order.
    pub fn resolve(&self, ty: TypeId) -> (Vec<Selector>, Vec<Selector>) {
        let (base, via_pointer) = self.registry.deref(ty);
        let mut frontier = vec![Frontier {
            ty: base,
            chain: Vec::new(),
            via_pointer,
        }];
        let mut seen: HashSet<TypeId> = HashSet::new();
        let mut decided: HashMap<SelectorKey, Decision> = HashMap::new();
        let mut order: Vec<SelectorKey> = Vec::new();

        while !frontier.is_empty() {
            let mut level: HashMap<SelectorKey, Vec<Candidate>> = HashMap::new();
            let mut level_order: Vec<SelectorKey> = Vec::new();
            let mut next: Vec<Frontier> = Vec::new();

            for entry in &frontier {
                for member_id in self.declared_members(entry.ty) {
                    let member = self.registry.member(member_id);

                    if member.is_embedding() {
                        let (embedded, pointer) = self.registry.deref(member.ty);
                        let mut chain = entry.chain.clone();
                        chain.push(member_id);
                        next.push(Frontier {
                            ty: embedded,
                            chain,
                            via_pointer: entry.via_pointer || pointer,
                        });
                    }
                    if matches!(member.kind, MemberKind::EmbeddedInterface) {
                        continue;
                    }

                    let key = member.selector_key();
                    if decided.contains_key(&key) {
                        continue;
                    }
                    let candidates = level.entry(key.clone()).or_default();
                    if candidates.is_empty() {
                        level_order.push(key);
                    }
                    candidates.push(Candidate {
                        member: member_id,
                        chain: entry.chain.clone(),
                        via_pointer: entry.via_pointer,
                    });
                }
            }

            for key in level_order {
                let Some(candidates) = level.remove(&key) else {
                    continue;
                };
                let decision = if self.unambiguous(&candidates) {
                    let mut candidates = candidates;
                    Decision::Accepted(candidates.swap_remove(0))
                } else {
                    Decision::Blocked
                };
                order.push(key.clone());
                decided.insert(key, decision);
            }

            seen.extend(frontier.iter().map(|entry| entry.ty));
            frontier = next
                .into_iter()
                .filter(|entry| !seen.contains(&entry.ty))
                .collect();
        }

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        for key in order {
            let Some(Decision::Accepted(candidate)) = decided.remove(&key) else {
                continue;
            };
            let member = self.registry.member(candidate.member);
            let selector = Selector {
                member: candidate.member,
                name: member.name.clone(),
                pointer_receiver_only: member.pointer_receiver() && !candidate.via_pointer,
                chain: candidate.chain,
                duplicate_prefix: 0,
            };
            if member.is_field() {
                fields.push(selector);
            } else {
                methods.push(selector);
            }
        }

        order::sort_fields(self.registry, &mut fields);
        order::sort_methods(self.registry, &mut methods);
        (fields, methods)
    }

    /// Same declaration reached twice, or interface methods that agree on
    /// their signature.
    fn unambiguous(&self, candidates: &[Candidate]) -> bool {
        let first = self.registry.member(candidates[0].member);
        candidates[1..].iter().all(|other| {
            if other.member == candidates[0].member {
                return true;
            }
            let other = self.registry.member(other.member);
            matches!(first.kind, MemberKind::InterfaceMethod)
                && matches!(other.kind, MemberKind::InterfaceMethod)
                && first.ty == other.ty
        })
    }
}

/// Resolve selectors for every struct, interface and named type of the registry.
pub fn resolve_all(registry: &mut TypeRegistry, type_names: &[TypeName]) -> usize {
    let targets: Vec<TypeId> = registry
        .iter()
        .filter(|info| {
            matches!(
                info.shape,
                TypeShape::Named { .. } | TypeShape::Struct(_) | TypeShape::Interface { .. }
            )
        })
        .map(|info| info.id)
        .collect();

    let mut resolved = Vec::with_capacity(targets.len());
    {
        let resolver = SelectorResolver::new(registry, type_names);
        for ty in targets {
            resolved.push((ty, resolver.resolve(ty)));
        }
    }

    let mut count = 0;
    for (ty, (fields, methods)) in resolved {
        count += fields.len() + methods.len();
        let info = registry.get_mut(ty);
        info.fields = fields;
        info.methods = methods;
    }
    count
}

/// The method set of `ty`: pointer-receiver methods only count for pointers
/// and interfaces. A pointer to an interface has no methods.
pub fn method_set(registry: &TypeRegistry, ty: TypeId) -> Vec<&Selector> {
    let (base, pointer) = registry.deref(ty);
    method_set_of(registry, base, pointer)
}

/// The method set of `base`, or of `*base` when `pointer` is set, without
/// requiring the pointer type to be interned.
pub fn method_set_of(registry: &TypeRegistry, base: TypeId, pointer: bool) -> Vec<&Selector> {
    let interface = registry.is_interface(base);
    if pointer && interface {
        return Vec::new();
    }
    let all_methods = pointer || interface;
    registry
        .get(base)
        .methods
        .iter()
        .filter(|selector| all_methods || !selector.pointer_receiver_only)
        .collect()
}
