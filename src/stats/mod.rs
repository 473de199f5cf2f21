//! Statistics over the sealed graph.

use crate::collector::{Declarations, ValueKind};
use crate::packages::PackageGraph;
use crate::registry::{TypeKind, TypeShape};
use crate::source::FileTable;
use crate::types::is_exported;
use serde::Serialize;

pub const IMPORT_COUNT_CAP: usize = 20;
pub const DEP_COUNT_CAP: usize = 50;
pub const FIELD_COUNT_CAP: usize = 20;
pub const PARAM_COUNT_CAP: usize = 10;
pub const IDENT_LENGTH_CAP: usize = 32;

/// Bucketed counts with an overflow bucket for values at or past the cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Histogram {
    pub buckets: Vec<u64>,
    pub overflow: u64,
}

impl Histogram {
    pub fn new(cap: usize) -> Self {
        Self {
            buckets: vec![0; cap],
            overflow: 0,
        }
    }

    pub fn add(&mut self, value: usize) {
        match self.buckets.get_mut(value) {
            Some(bucket) => *bucket += 1,
            None => self.overflow += 1,
        }
    }

    pub fn cap(&self) -> usize {
        self.buckets.len()
    }

    pub fn total(&self) -> u64 {
        self.buckets.iter().sum::<u64>() + self.overflow
    }

    /// Weighted mean of the recorded values, overflow counted at the cap.
    pub fn mean(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let sum: u64 = self
            .buckets
            .iter()
            .enumerate()
            .map(|(value, count)| value as u64 * count)
            .sum::<u64>()
            + self.overflow * self.cap() as u64;
        sum as f64 / total as f64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub packages: usize,
    pub files: usize,
    pub lines: usize,
    pub type_names: usize,
    pub exported_type_names: usize,
    pub aliases: usize,
    pub constants: usize,
    pub variables: usize,
    pub functions: usize,
    pub methods: usize,
    pub interned_types: usize,
    pub types_by_kind: Vec<(TypeKind, u64)>,
    pub files_by_import_count: Histogram,
    pub packages_by_dep_count: Histogram,
    pub structs_by_field_count: Histogram,
    pub functions_by_param_count: Histogram,
    pub functions_by_result_count: Histogram,
    pub identifiers_by_length: Histogram,
}

impl Stats {
    pub fn compute(graph: &PackageGraph, files: &FileTable, decls: &Declarations) -> Self {
        let mut files_by_import_count = Histogram::new(IMPORT_COUNT_CAP);
        let mut lines = 0;
        for file in files.iter() {
            files_by_import_count.add(file.imports.len());
            lines += file.line_count();
        }

        let mut packages_by_dep_count = Histogram::new(DEP_COUNT_CAP);
        for package in graph.in_dependency_order().iter().filter(|p| !p.is_builtin()) {
            packages_by_dep_count.add(package.deps.len());
        }

        let mut by_kind = vec![0u64; TypeKind::ALL.len()];
        for info in decls.registry.iter() {
            by_kind[info.kind() as usize] += 1;
        }
        let types_by_kind = TypeKind::ALL
            .iter()
            .map(|kind| (*kind, by_kind[*kind as usize]))
            .collect();

        let mut identifiers_by_length = Histogram::new(IDENT_LENGTH_CAP);
        let mut structs_by_field_count = Histogram::new(FIELD_COUNT_CAP);
        let mut exported_type_names = 0;
        let mut aliases = 0;
        for type_name in &decls.type_names {
            if type_name.is_exported() {
                exported_type_names += 1;
                identifiers_by_length.add(type_name.name.chars().count());
            }
            if type_name.alias {
                aliases += 1;
                continue;
            }
            let info = decls.registry.get(type_name.ty);
            if info.is_named() && decls.registry.is_struct(type_name.ty) {
                structs_by_field_count.add(info.fields.len());
            }
        }

        let mut functions_by_param_count = Histogram::new(PARAM_COUNT_CAP);
        let mut functions_by_result_count = Histogram::new(PARAM_COUNT_CAP);
        let (mut constants, mut variables, mut functions, mut methods) = (0, 0, 0, 0);
        for value in &decls.values {
            if is_exported(&value.name) {
                identifiers_by_length.add(value.name.chars().count());
            }
            match value.kind {
                ValueKind::Constant => constants += 1,
                ValueKind::Variable => variables += 1,
                ValueKind::Function => {
                    if value.is_method() {
                        methods += 1;
                    } else {
                        functions += 1;
                    }
                    if let TypeShape::Signature {
                        params, results, ..
                    } = &decls.registry.get(value.ty).shape
                    {
                        functions_by_param_count.add(params.len());
                        functions_by_result_count.add(results.len());
                    }
                }
            }
        }

        Self {
            packages: graph.len().saturating_sub(1),
            files: files.len(),
            lines,
            type_names: decls.type_names.len(),
            exported_type_names,
            aliases,
            constants,
            variables,
            functions,
            methods,
            interned_types: decls.registry.len(),
            types_by_kind,
            files_by_import_count,
            packages_by_dep_count,
            structs_by_field_count,
            functions_by_param_count,
            functions_by_result_count,
            identifiers_by_length,
        }
    }
}
