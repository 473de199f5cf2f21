//! Identifier and position types shared by every phase of the engine.
//!
//! All cross links inside the sealed graph are typed indices into the
//! arenas owned by [`crate::Index`]. An id is only meaningful for the index
//! that produced it.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Create an id from an arena index.
            ///
            /// # Panics
            /// Panics if the arena grew past `u32::MAX` entries.
            pub fn new(index: usize) -> Self {
                Self(u32::try_from(index).expect(concat!(stringify!($name), " overflow")))
            }

            /// Position of the entry in its arena.
            pub fn index(self) -> usize {
                self.0 as usize
            }

            pub fn value(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }
    };
}

define_id!(
    /// A package, numbered in dependency order: every import of a package
    /// has a smaller id than the package itself.
    PackageId,
    "pkg"
);
define_id!(
    /// A source file in the global file arena.
    FileId,
    "file"
);
define_id!(
    /// A module (versioned group of packages).
    ModuleId,
    "mod"
);
define_id!(
    /// An interned structural type.
    TypeId,
    "type"
);
define_id!(
    /// A declared type name (defined type or alias).
    TypeNameId,
    "tn"
);
define_id!(
    /// A package-level constant, variable or function (methods included).
    ValueId,
    "val"
);
define_id!(
    /// A field, interface method or concrete method attached to a type.
    MemberId,
    "mem"
);
define_id!(
    /// An object from the type checker's object table.
    ObjectId,
    "obj"
);

/// An exact source location inside a file of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub file: FileId,
    pub line: u32,
    pub column: u32,
    pub offset: u32,
}

impl Position {
    pub fn new(file: FileId, line: u32, column: u32, offset: u32) -> Self {
        Self {
            file,
            line,
            column,
            offset,
        }
    }
}

/// Inclusive line range, used for file documentation blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, line: u32) -> bool {
        line >= self.start && line <= self.end
    }
}

/// Channel direction of a `chan` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// Whether an identifier is exported: its first character is an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

pub type CompactString = Box<str>;

pub fn compact_string(s: &str) -> CompactString {
    s.into()
}
