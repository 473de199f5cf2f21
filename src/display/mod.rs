//! Terminal tables for CLI output.

pub mod tables;

pub use tables::{
    TableBuilder, create_kind_table, create_packages_table, create_selector_table,
    create_stats_table,
};
