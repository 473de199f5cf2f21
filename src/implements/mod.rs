//! Implementation solver: which named types satisfy which named interfaces.

use crate::collector::TypeName;
use crate::registry::{Implementer, MemberKind, TypeRegistry};
use crate::selectors::{Selector, SelectorResolver};
use crate::types::{CompactString, PackageId, TypeId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Identity of a method inside a method set: name, package for unexported
/// names, and the interned signature.
pub type MethodKey = (CompactString, Option<PackageId>, TypeId);

fn method_keys<'s>(
    registry: &TypeRegistry,
    selectors: impl Iterator<Item = &'s Selector>,
) -> Vec<MethodKey> {
    let mut keys: Vec<MethodKey> = selectors
        .map(|selector| {
            let member = registry.member(selector.member);
            let (name, package) = member.selector_key();
            (name, package, member.ty)
        })
        .collect();
    keys.sort();
    keys
}

/// Two-pointer subset test over sorted key lists.
pub fn is_subset(needle: &[MethodKey], haystack: &[MethodKey]) -> bool {
    let mut rest = haystack.iter();
    'outer: for key in needle {
        for candidate in rest.by_ref() {
            match candidate.cmp(key) {
                std::cmp::Ordering::Less => continue,
                std::cmp::Ordering::Equal => continue 'outer,
                std::cmp::Ordering::Greater => return false,
            }
        }
        return false;
    }
    true
}

/// Interfaces sharing one method set.
struct InterfaceClass {
    keys: Vec<MethodKey>,
    interfaces: Vec<TypeId>,
}

pub struct ImplementationSolver<'a> {
    registry: &'a mut TypeRegistry,
    type_names: &'a [TypeName],
}

impl<'a> ImplementationSolver<'a> {
    pub fn new(registry: &'a mut TypeRegistry, type_names: &'a [TypeName]) -> Self {
        Self {
            registry,
            type_names,
        }
    }

    /// Fill `implemented_bys` and `implements` of every named type.
    /// Returns the number of implementation pairs found.
    pub fn solve(self) -> usize {
        let classes = self.interface_classes();
        let mut pairs: Vec<(TypeId, Implementer)> = Vec::new();

        for info in self.registry.iter() {
            if !info.is_named() || info.methods.is_empty() {
                continue;
            }
            let all = method_keys(self.registry, info.methods.iter());

            if self.registry.is_interface(info.id) {
                for class in &classes {
                    if is_subset(&class.keys, &all) {
                        for &interface in &class.interfaces {
                            if interface != info.id {
                                pairs.push((interface, Implementer {
                                    type_id: info.id,
                                    pointer: false,
                                }));
                            }
                        }
                    }
                }
                continue;
            }

            let values = method_keys(
                self.registry,
                info.methods.iter().filter(|s| !s.pointer_receiver_only),
            );
            for class in &classes {
                let pointer = if is_subset(&class.keys, &values) {
                    false
                } else if is_subset(&class.keys, &all) {
                    true
                } else {
                    continue;
                };
                for &interface in &class.interfaces {
                    pairs.push((interface, Implementer {
                        type_id: info.id,
                        pointer,
                    }));
                }
            }
        }

        let count = pairs.len();
        let embeds = self.embedded_interfaces(&classes);
        for (interface, implementer) in pairs {
            self.registry
                .get_mut(interface)
                .implemented_bys
                .push(implementer);
            self.registry
                .get_mut(implementer.type_id)
                .implements
                .push(interface);
        }

        let registry = self.registry;
        for index in 0..registry.len() {
            let info = registry.get_mut(TypeId::new(index));
            info.implemented_bys.sort();
            info.implemented_bys.dedup();
            info.implements.sort();
            info.implements.dedup();
            if info.implements.len() > 1 {
                info.implements = clean(&info.implements, &embeds);
            }
        }

        debug!(classes = classes.len(), pairs = count, "solved implementations");
        count
    }

    /// Named interfaces with at least one method, grouped by method set.
    fn interface_classes(&self) -> Vec<InterfaceClass> {
        let mut classes: Vec<InterfaceClass> = Vec::new();
        let mut by_keys: HashMap<Vec<MethodKey>, usize> = HashMap::new();

        for info in self.registry.iter() {
            if !info.is_named() || !self.registry.is_interface(info.id) || info.methods.is_empty()
            {
                continue;
            }
            let keys = method_keys(self.registry, info.methods.iter());
            match by_keys.get(&keys) {
                Some(&index) => classes[index].interfaces.push(info.id),
                None => {
                    by_keys.insert(keys.clone(), classes.len());
                    classes.push(InterfaceClass {
                        keys,
                        interfaces: vec![info.id],
                    });
                }
            }
        }
        classes
    }

    /// Named interfaces each interface embeds, transitively.
    fn embedded_interfaces(&self, classes: &[InterfaceClass]) -> HashMap<TypeId, HashSet<TypeId>> {
        let resolver = SelectorResolver::new(self.registry, self.type_names);
        let mut result = HashMap::new();

        for interface in classes.iter().flat_map(|c| c.interfaces.iter().copied()) {
            let mut reached = HashSet::new();
            let mut stack = vec![interface];
            while let Some(current) = stack.pop() {
                for member in resolver.declared_members(current) {
                    let member = self.registry.member(member);
                    if matches!(member.kind, MemberKind::EmbeddedInterface)
                        && reached.insert(member.ty)
                    {
                        stack.push(member.ty);
                    }
                }
            }
            result.insert(interface, reached);
        }
        result
    }
}

/// Drop every interface that another listed interface embeds.
fn clean(implements: &[TypeId], embeds: &HashMap<TypeId, HashSet<TypeId>>) -> Vec<TypeId> {
    implements
        .iter()
        .copied()
        .filter(|candidate| {
            !implements.iter().any(|other| {
                other != candidate
                    && embeds
                        .get(other)
                        .is_some_and(|reached| reached.contains(candidate))
            })
        })
        .collect()
}
