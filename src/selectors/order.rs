//! Presentation order of selectors.

use super::Selector;
use crate::registry::TypeRegistry;
use crate::types::is_exported;
use std::cmp::Ordering;

/// Exported names first, then case-insensitive, then exact case.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    is_exported(b)
        .cmp(&is_exported(a))
        .then_with(|| {
            a.chars()
                .flat_map(char::to_lowercase)
                .cmp(b.chars().flat_map(char::to_lowercase))
        })
        .then_with(|| a.cmp(b))
}

fn compare_chains(registry: &TypeRegistry, a: &Selector, b: &Selector) -> Ordering {
    for (x, y) in a.chain.iter().zip(&b.chain) {
        let ordering = compare_names(&registry.member(*x).name, &registry.member(*y).name);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.chain.len().cmp(&b.chain.len())
}

/// Fields: embedding chain names first, then the field name.
pub fn sort_fields(registry: &TypeRegistry, selectors: &mut [Selector]) {
    selectors.sort_by(|a, b| {
        compare_chains(registry, a, b).then_with(|| compare_names(&a.name, &b.name))
    });
    mark_duplicate_prefixes(registry, selectors);
}

/// Methods: names are unique in a method set, so the name decides.
pub fn sort_methods(registry: &TypeRegistry, selectors: &mut [Selector]) {
    selectors.sort_by(|a, b| {
        compare_names(&a.name, &b.name).then_with(|| compare_chains(registry, a, b))
    });
    mark_duplicate_prefixes(registry, selectors);
}

/// Record on each selector how many leading chain names it shares with its predecessor.
fn mark_duplicate_prefixes(registry: &TypeRegistry, selectors: &mut [Selector]) {
    for index in 1..selectors.len() {
        let (before, after) = selectors.split_at_mut(index);
        let previous = &before[index - 1];
        let current = &mut after[0];
        let shared = previous
            .chain
            .iter()
            .zip(&current.chain)
            .take_while(|(x, y)| registry.member(**x).name == registry.member(**y).name)
            .count();
        current.duplicate_prefix = shared as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exported_first_then_case_insensitive() {
        let mut names = vec!["zeta", "Beta", "alpha", "Alpha", "beta"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, ["Alpha", "Beta", "alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_case_insensitive_before_exact() {
        assert_eq!(compare_names("ReadAt", "Reader"), Ordering::Less);
        assert_eq!(compare_names("URL", "Url"), Ordering::Less);
        assert_eq!(compare_names("X", "X"), Ordering::Equal);
    }
}
