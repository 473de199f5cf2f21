//! Semantic index and cross-reference engine for Go source corpora.
//!
//! A corpus produced by a Go front end (packages, files, type-checked
//! declarations and identifier occurrences) is turned into a sealed
//! [`Index`]: interned types, resolved selectors, interface
//! implementations and a reference index, served read-only afterwards.

pub mod collector;
pub mod config;
pub mod corpus;
pub mod display;
pub mod error;
pub mod implements;
pub mod index;
pub mod io;
pub mod packages;
pub mod references;
pub mod registry;
pub mod selectors;
pub mod server;
pub mod source;
pub mod stats;
pub mod types;

pub use collector::{Resource, TypeName, ValueKind, ValueResource};
pub use config::{PageOptions, Settings};
pub use corpus::Corpus;
pub use error::{IndexError, IndexResult, ResourceError, ResourceResult};
pub use index::{Index, IndexBuilder};
pub use packages::{PackageGraph, PackageOrder};
pub use registry::{TypeInfo, TypeRegistry};
pub use selectors::Selector;
pub use types::{
    CompactString, FileId, MemberId, ModuleId, ObjectId, PackageId, Position, TypeId, TypeNameId,
    ValueId, compact_string,
};
