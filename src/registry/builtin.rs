//! Predeclared identifiers of the universe scope.
//!
//! They are exposed through a synthetic `builtin` package that is built
//! before any corpus package and goes through the regular collector.

use crate::corpus::{
    FunctionInput, MethodSpecInput, PackageInput, ParamInput, TypeExpr, TypeNameInput, ValueInput,
};
use crate::packages::BUILTIN_PACKAGE;

/// Basic types interned when the registry is created.
pub const BASIC_TYPES: &[&str] = &[
    "bool",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    "float32",
    "float64",
    "complex64",
    "complex128",
    "string",
    "unsafe.Pointer",
];

pub const UNTYPED_KINDS: &[&str] = &[
    "untyped bool",
    "untyped int",
    "untyped rune",
    "untyped float",
    "untyped complex",
    "untyped string",
    "untyped nil",
];

const BUILTIN_FUNCTIONS: &[&str] = &[
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max",
    "min", "new", "panic", "print", "println", "real", "recover",
];

/// The type an untyped constant takes when it needs one. `untyped nil` has none.
pub fn default_type(basic: &str) -> Option<&'static str> {
    match basic {
        "untyped bool" => Some("bool"),
        "untyped int" => Some("int"),
        "untyped rune" => Some("int32"),
        "untyped float" => Some("float64"),
        "untyped complex" => Some("complex128"),
        "untyped string" => Some("string"),
        _ => None,
    }
}

pub fn is_untyped(basic: &str) -> bool {
    basic.starts_with("untyped ")
}

/// Build the `builtin` package declarations.
///
/// A non-alias type name whose expression is the basic type of the same name
/// binds the predeclared type directly instead of defining a new one.
pub fn builtin_package() -> PackageInput {
    let mut type_names: Vec<TypeNameInput> = BASIC_TYPES
        .iter()
        .filter(|name| !name.contains('.'))
        .map(|name| type_name(name, false, TypeExpr::basic(name)))
        .collect();

    type_names.push(type_name("byte", true, TypeExpr::basic("uint8")));
    type_names.push(type_name("rune", true, TypeExpr::basic("int32")));
    type_names.push(type_name(
        "any",
        true,
        TypeExpr::interface(Vec::new(), Vec::new()),
    ));
    type_names.push(type_name(
        "comparable",
        false,
        TypeExpr::interface(Vec::new(), Vec::new()),
    ));
    type_names.push(type_name(
        "error",
        false,
        TypeExpr::interface(
            vec![MethodSpecInput::new(
                "Error",
                TypeExpr::signature(Vec::new(), vec![TypeExpr::basic("string")]),
            )],
            Vec::new(),
        ),
    ));

    let constants = vec![
        value("true", TypeExpr::basic("untyped bool")),
        value("false", TypeExpr::basic("untyped bool")),
        value("iota", TypeExpr::basic("untyped int")),
    ];

    let functions = BUILTIN_FUNCTIONS
        .iter()
        .map(|name| FunctionInput {
            name: name.to_string(),
            object: None,
            position: None,
            receiver: None,
            signature: TypeExpr::Signature {
                params: Vec::<ParamInput>::new(),
                results: Vec::new(),
                variadic: false,
            },
        })
        .collect();

    PackageInput {
        path: BUILTIN_PACKAGE.to_string(),
        name: BUILTIN_PACKAGE.to_string(),
        type_names,
        constants,
        functions,
        ..Default::default()
    }
}

fn type_name(name: &str, alias: bool, ty: TypeExpr) -> TypeNameInput {
    TypeNameInput {
        name: name.to_string(),
        object: None,
        position: None,
        alias,
        ty,
    }
}

fn value(name: &str, ty: TypeExpr) -> ValueInput {
    ValueInput {
        name: name.to_string(),
        object: None,
        position: None,
        ty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_types() {
        assert_eq!(default_type("untyped rune"), Some("int32"));
        assert_eq!(default_type("untyped float"), Some("float64"));
        assert_eq!(default_type("untyped nil"), None);
        assert_eq!(default_type("int"), None);
        assert!(is_untyped("untyped string"));
    }

    #[test]
    fn test_builtin_package_declares_error_and_aliases() {
        let package = builtin_package();
        assert_eq!(package.path, "builtin");
        let error = package
            .type_names
            .iter()
            .find(|t| t.name == "error")
            .unwrap();
        assert!(!error.alias);
        assert!(matches!(error.ty, TypeExpr::Interface { .. }));

        let byte = package.type_names.iter().find(|t| t.name == "byte").unwrap();
        assert!(byte.alias);
        assert_eq!(byte.ty, TypeExpr::basic("uint8"));
        assert!(package.functions.iter().any(|f| f.name == "len"));
        assert!(package.files.is_empty());
    }
}
