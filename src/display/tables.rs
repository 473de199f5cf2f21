//! Table formatting utilities for structured output.

use crate::index::views::{PackageSummary, SelectorView};
use crate::stats::{Histogram, Stats};
use comfy_table::{
    Attribute, Cell, CellAlignment, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};

/// Builder for creating formatted tables.
pub struct TableBuilder {
    table: Table,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { table: new_table() }
    }

    pub fn set_headers(mut self, headers: Vec<&str>) -> Self {
        self.table.set_header(bold_cells(&headers));
        self
    }

    pub fn add_row(mut self, row: Vec<String>) -> Self {
        self.table.add_row(row);
        self
    }

    pub fn build(self) -> String {
        self.table.to_string()
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table
}

fn bold_cells(headers: &[&str]) -> Vec<Cell> {
    headers
        .iter()
        .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
        .collect()
}

/// Summary of a build: entity counts and the mean of every histogram.
pub fn create_stats_table(stats: &Stats) -> String {
    let mut table = new_table();
    table.set_header(bold_cells(&["Metric", "Value"]));

    let counts = [
        ("Packages", stats.packages),
        ("Files", stats.files),
        ("Lines", stats.lines),
        ("Type names", stats.type_names),
        ("Exported type names", stats.exported_type_names),
        ("Aliases", stats.aliases),
        ("Constants", stats.constants),
        ("Variables", stats.variables),
        ("Functions", stats.functions),
        ("Methods", stats.methods),
        ("Interned types", stats.interned_types),
    ];
    for (name, value) in counts {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }

    let means: [(&str, &Histogram); 6] = [
        ("Imports per file", &stats.files_by_import_count),
        ("Dependencies per package", &stats.packages_by_dep_count),
        ("Fields per struct", &stats.structs_by_field_count),
        ("Parameters per function", &stats.functions_by_param_count),
        ("Results per function", &stats.functions_by_result_count),
        ("Identifier length", &stats.identifiers_by_length),
    ];
    for (name, histogram) in means {
        table.add_row(vec![
            Cell::new(format!("{name} (mean)")),
            Cell::new(format!("{:.2}", histogram.mean())).set_alignment(CellAlignment::Right),
        ]);
    }

    table.to_string()
}

/// Type counts per kind.
pub fn create_kind_table(stats: &Stats) -> String {
    let mut table = new_table();
    table.set_header(bold_cells(&["Kind", "Types"]));
    for (kind, count) in &stats.types_by_kind {
        table.add_row(vec![
            Cell::new(kind.as_str()),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}

pub fn create_packages_table(packages: &[PackageSummary]) -> String {
    let mut table = new_table();
    table.set_header(bold_cells(&["Package", "Imports", "Importers", "Deps", "Depth"]));
    for package in packages {
        table.add_row(vec![
            package.path.clone(),
            package.imports.to_string(),
            package.importers.to_string(),
            package.deps.to_string(),
            package.depth.to_string(),
        ]);
    }
    table.to_string()
}

/// Fields or methods of a type, promotion chains included.
pub fn create_selector_table(title: &str, selectors: &[SelectorView]) -> String {
    let mut table = new_table();
    table.set_header(bold_cells(&[title, "Type", "Via"]));
    for selector in selectors {
        let mut name = selector.name.clone();
        if selector.pointer_receiver_only {
            name.push_str(" (*)");
        }
        table.add_row(vec![
            name,
            selector.type_string.clone(),
            selector.chain.join("."),
        ]);
    }
    table.to_string()
}
