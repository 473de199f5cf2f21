//! Serde model of the document emitted by the front-end parser.
//!
//! A corpus is the sealed output of parsing and type checking: packages in
//! dependency order, their files with every identifier linked to a
//! type-checker object, and the declarations of each package expressed with
//! structural type expressions.

use crate::types::{ChanDir, LineRange, ObjectId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub modules: Vec<ModuleInput>,

    /// Packages, topologically sorted: every import precedes its importer.
    pub packages: Vec<PackageInput>,

    /// The type checker's object table. The position of an entry is its [`ObjectId`].
    #[serde(default)]
    pub objects: Vec<ObjectInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleInput {
    pub path: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Repository URL used to synthesize source links
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub commit: Option<String>,
    /// Directory of the module inside its repository
    #[serde(default)]
    pub extra_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    PackageName,
    Const,
    Var,
    Func,
    TypeName,
    Field,
    Method,
    Label,
    Builtin,
    Nil,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectInput {
    pub kind: ObjectKind,
    pub name: String,
    /// Import path of the declaring package; absent for universe objects
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub position: Option<SourcePos>,
}

/// A position as emitted by the parser. `file` is the bare file name inside
/// the declaring package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePos {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageInput {
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub dir: PathBuf,
    /// Path of the owning module
    #[serde(default)]
    pub module: Option<String>,
    /// Import paths of the packages this package imports directly
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub files: Vec<FileInput>,
    #[serde(default)]
    pub type_names: Vec<TypeNameInput>,
    #[serde(default)]
    pub constants: Vec<ValueInput>,
    #[serde(default)]
    pub variables: Vec<ValueInput>,
    #[serde(default)]
    pub functions: Vec<FunctionInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileInput {
    /// Bare file name
    pub name: String,
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default)]
    pub generated_from: Option<PathBuf>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub doc: Option<LineRange>,
    #[serde(default)]
    pub imports: Vec<ImportInput>,
    /// Every identifier occurrence in the file with the type checker's resolution
    #[serde(default)]
    pub identifiers: Vec<IdentInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportInput {
    pub path: String,
    #[serde(default)]
    pub alias: Option<String>,
    /// The package-name object introduced by the import
    #[serde(default)]
    pub object: Option<ObjectId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentInput {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
    pub name: String,
    #[serde(default)]
    pub object: Option<ObjectId>,
    /// True when this occurrence declares `object`
    #[serde(default)]
    pub declaration: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeNameInput {
    pub name: String,
    #[serde(default)]
    pub object: Option<ObjectId>,
    #[serde(default)]
    pub position: Option<SourcePos>,
    /// `type A = B` rather than `type A B`
    #[serde(default)]
    pub alias: bool,
    /// The type literal of the declaration, or the alias target
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueInput {
    pub name: String,
    #[serde(default)]
    pub object: Option<ObjectId>,
    #[serde(default)]
    pub position: Option<SourcePos>,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionInput {
    pub name: String,
    #[serde(default)]
    pub object: Option<ObjectId>,
    #[serde(default)]
    pub position: Option<SourcePos>,
    #[serde(default)]
    pub receiver: Option<ReceiverInput>,
    pub signature: TypeExpr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverInput {
    /// Name of the receiver's base type, declared in the same package
    pub type_name: String,
    #[serde(default)]
    pub pointer: bool,
}

/// Structural type expression as resolved by the type checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeExpr {
    Basic {
        name: String,
    },
    Named {
        package: String,
        name: String,
        #[serde(default)]
        args: Vec<TypeExpr>,
    },
    Pointer {
        elem: Box<TypeExpr>,
    },
    Array {
        len: u64,
        elem: Box<TypeExpr>,
    },
    Slice {
        elem: Box<TypeExpr>,
    },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan {
        dir: ChanDir,
        elem: Box<TypeExpr>,
    },
    Signature {
        #[serde(default)]
        params: Vec<ParamInput>,
        #[serde(default)]
        results: Vec<ParamInput>,
        #[serde(default)]
        variadic: bool,
    },
    Struct {
        #[serde(default)]
        fields: Vec<FieldInput>,
    },
    Interface {
        #[serde(default)]
        methods: Vec<MethodSpecInput>,
        #[serde(default)]
        embeds: Vec<TypeExpr>,
    },
    Tuple {
        elems: Vec<TypeExpr>,
    },
    TypeParam {
        name: String,
        #[serde(default)]
        object: Option<ObjectId>,
        #[serde(default)]
        constraint: Option<Box<TypeExpr>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInput {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub embedded: bool,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub object: Option<ObjectId>,
    #[serde(default)]
    pub position: Option<SourcePos>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSpecInput {
    pub name: String,
    pub signature: TypeExpr,
    #[serde(default)]
    pub object: Option<ObjectId>,
    #[serde(default)]
    pub position: Option<SourcePos>,
}

impl TypeExpr {
    pub fn basic(name: &str) -> Self {
        TypeExpr::Basic {
            name: name.to_string(),
        }
    }

    pub fn named(package: &str, name: &str) -> Self {
        TypeExpr::Named {
            package: package.to_string(),
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    pub fn pointer(elem: TypeExpr) -> Self {
        TypeExpr::Pointer {
            elem: Box::new(elem),
        }
    }

    pub fn slice(elem: TypeExpr) -> Self {
        TypeExpr::Slice {
            elem: Box::new(elem),
        }
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn signature(params: Vec<TypeExpr>, results: Vec<TypeExpr>) -> Self {
        TypeExpr::Signature {
            params: params.into_iter().map(ParamInput::unnamed).collect(),
            results: results.into_iter().map(ParamInput::unnamed).collect(),
            variadic: false,
        }
    }

    pub fn structure(fields: Vec<FieldInput>) -> Self {
        TypeExpr::Struct { fields }
    }

    pub fn interface(methods: Vec<MethodSpecInput>, embeds: Vec<TypeExpr>) -> Self {
        TypeExpr::Interface { methods, embeds }
    }

    /// The `error` type of the universe scope.
    pub fn error() -> Self {
        TypeExpr::named("builtin", "error")
    }

    /// Short label used in logs and diagnostics.
    pub fn kind_label(&self) -> &'static str {
        match self {
            TypeExpr::Basic { .. } => "basic",
            TypeExpr::Named { .. } => "named",
            TypeExpr::Pointer { .. } => "pointer",
            TypeExpr::Array { .. } => "array",
            TypeExpr::Slice { .. } => "slice",
            TypeExpr::Map { .. } => "map",
            TypeExpr::Chan { .. } => "chan",
            TypeExpr::Signature { .. } => "signature",
            TypeExpr::Struct { .. } => "struct",
            TypeExpr::Interface { .. } => "interface",
            TypeExpr::Tuple { .. } => "tuple",
            TypeExpr::TypeParam { .. } => "typeparam",
        }
    }
}

impl ParamInput {
    pub fn unnamed(ty: TypeExpr) -> Self {
        Self { name: None, ty }
    }
}

impl FieldInput {
    pub fn new(name: &str, ty: TypeExpr) -> Self {
        Self {
            name: name.to_string(),
            ty,
            embedded: false,
            tag: None,
            object: None,
            position: None,
        }
    }

    /// An embedded field; its name is the base type name of `ty`.
    pub fn embedded(name: &str, ty: TypeExpr) -> Self {
        Self {
            embedded: true,
            ..Self::new(name, ty)
        }
    }
}

impl MethodSpecInput {
    pub fn new(name: &str, signature: TypeExpr) -> Self {
        Self {
            name: name.to_string(),
            signature,
            object: None,
            position: None,
        }
    }
}
