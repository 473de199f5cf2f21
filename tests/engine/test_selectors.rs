//! Field and method promotion through embedding.

use crate::common::*;
use pkgdex::corpus::TypeExpr;

#[test]
fn test_own_field_shadows_promoted_field() {
    let mut p = package("example.com/p", &[]);
    p.type_names = vec![
        type_decl(
            "A",
            TypeExpr::structure(vec![field("X", TypeExpr::basic("int"))]),
        ),
        type_decl(
            "B",
            TypeExpr::structure(vec![
                embed("example.com/p", "A"),
                field("X", TypeExpr::basic("string")),
            ]),
        ),
    ];
    let index = CorpusBuilder::new().package(p).index();

    let b = index.type_detail("example.com/p", "B", true).unwrap();
    let xs: Vec<_> = b.fields.iter().filter(|f| f.name == "X").collect();
    assert_eq!(xs.len(), 1);
    assert!(xs[0].chain.is_empty());
    assert_eq!(xs[0].type_string, "string");
    assert!(b.fields.iter().any(|f| f.name == "A"));
}

#[test]
fn test_ambiguous_field_is_dropped() {
    let mut p = package("example.com/p", &[]);
    p.type_names = vec![
        type_decl(
            "A",
            TypeExpr::structure(vec![field("X", TypeExpr::basic("int"))]),
        ),
        type_decl(
            "B",
            TypeExpr::structure(vec![field("X", TypeExpr::basic("int"))]),
        ),
        type_decl(
            "C",
            TypeExpr::structure(vec![
                embed("example.com/p", "A"),
                embed("example.com/p", "B"),
            ]),
        ),
    ];
    let index = CorpusBuilder::new().package(p).index();

    let c = index.type_detail("example.com/p", "C", true).unwrap();
    let names: Vec<&str> = c.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn test_pointer_receiver_method_only_in_pointer_method_set() {
    let mut p = package("example.com/p", &[]);
    p.type_names = vec![type_decl("T", TypeExpr::structure(Vec::new()))];
    p.functions = vec![method("T", true, "M", no_args())];
    let index = CorpusBuilder::new().package(p).index();

    let t = index.type_detail("example.com/p", "T", true).unwrap();
    assert!(t.value_method_set.is_empty());
    assert_eq!(t.pointer_method_set, vec!["M".to_string()]);
    assert_eq!(t.methods.len(), 1);
    assert!(t.methods[0].pointer_receiver_only);
}

#[test]
fn test_embedded_interface_methods_are_listed_with_chain() {
    let mut p = package("example.com/p", &[]);
    p.type_names = vec![
        type_decl(
            "R",
            TypeExpr::interface(vec![interface_method("Read", read_signature())], Vec::new()),
        ),
        type_decl(
            "S",
            TypeExpr::interface(
                vec![interface_method("Close", close_signature())],
                vec![TypeExpr::named("example.com/p", "R")],
            ),
        ),
    ];
    let index = CorpusBuilder::new().package(p).index();

    let s = index.type_detail("example.com/p", "S", true).unwrap();
    let names: Vec<&str> = s.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Close", "Read"]);
    assert_eq!(s.methods[1].chain, vec!["R".to_string()]);
    assert!(s.methods[0].chain.is_empty());
    assert_eq!(s.methods[1].type_string, "([]byte) (int, error)");
}

#[test]
fn test_methods_promote_through_pointer_embedding() {
    let mut p = package("example.com/p", &[]);
    p.type_names = vec![
        type_decl("Inner", TypeExpr::structure(Vec::new())),
        type_decl(
            "Outer",
            TypeExpr::structure(vec![embed_pointer("example.com/p", "Inner")]),
        ),
    ];
    p.functions = vec![method("Inner", true, "Reset", no_args())];
    let index = CorpusBuilder::new().package(p).index();

    let outer = index.type_detail("example.com/p", "Outer", true).unwrap();
    assert_eq!(outer.value_method_set, vec!["Reset".to_string()]);
    assert!(!outer.methods[0].pointer_receiver_only);
    assert_eq!(outer.methods[0].chain, vec!["Inner".to_string()]);
}

#[test]
fn test_unexported_selectors_are_filtered() {
    let mut p = package("example.com/p", &[]);
    p.type_names = vec![type_decl(
        "T",
        TypeExpr::structure(vec![
            field("Public", TypeExpr::basic("int")),
            field("private", TypeExpr::basic("int")),
        ]),
    )];
    let index = CorpusBuilder::new().package(p).index();

    let shown = index.type_detail("example.com/p", "T", false).unwrap();
    assert_eq!(shown.fields.len(), 1);
    let all = index.type_detail("example.com/p", "T", true).unwrap();
    assert_eq!(all.fields.len(), 2);
    // exported names sort first
    assert_eq!(all.fields[0].name, "Public");
}

/// `D` declares `X` and `M`; `A` embeds `D` by value and `B` embeds `*D`.
fn diamond(b_embeds_pointer: bool) -> pkgdex::Index {
    let mut p = package("example.com/p", &[]);
    let d = if b_embeds_pointer {
        embed_pointer("example.com/p", "D")
    } else {
        embed("example.com/p", "D")
    };
    p.type_names = vec![
        type_decl(
            "D",
            TypeExpr::structure(vec![field("X", TypeExpr::basic("int"))]),
        ),
        type_decl("A", TypeExpr::structure(vec![embed("example.com/p", "D")])),
        type_decl("B", TypeExpr::structure(vec![d])),
        type_decl(
            "C",
            TypeExpr::structure(vec![
                embed("example.com/p", "A"),
                embed("example.com/p", "B"),
            ]),
        ),
    ];
    p.functions = vec![method("D", false, "M", no_args())];
    CorpusBuilder::new().package(p).index()
}

#[test]
fn test_diamond_reaches_one_declaration() {
    let index = diamond(false);

    let c = index.type_detail("example.com/p", "C", true).unwrap();
    let x = c.fields.iter().find(|f| f.name == "X").expect("X is promoted");
    assert_eq!(x.chain.len(), 2);
    assert_eq!(x.type_string, "int");
    let m = c.methods.iter().find(|m| m.name == "M").expect("M is promoted");
    assert_eq!(m.chain.len(), 2);
    assert_eq!(c.value_method_set, vec!["M".to_string()]);
}

#[test]
fn test_value_and_pointer_chains_to_one_declaration() {
    let index = diamond(true);

    let c = index.type_detail("example.com/p", "C", true).unwrap();
    assert!(c.fields.iter().any(|f| f.name == "X"));
    assert!(c.methods.iter().any(|m| m.name == "M"));
}

#[test]
fn test_value_and_pointer_chains_to_different_declarations() {
    let mut p = package("example.com/p", &[]);
    p.type_names = vec![
        type_decl(
            "A",
            TypeExpr::structure(vec![field("X", TypeExpr::basic("int"))]),
        ),
        type_decl(
            "B",
            TypeExpr::structure(vec![field("X", TypeExpr::basic("int"))]),
        ),
        type_decl(
            "C",
            TypeExpr::structure(vec![
                embed("example.com/p", "A"),
                embed_pointer("example.com/p", "B"),
            ]),
        ),
    ];
    p.functions = vec![
        method("A", false, "M", no_args()),
        method("B", true, "M", no_args()),
    ];
    let index = CorpusBuilder::new().package(p).index();

    let c = index.type_detail("example.com/p", "C", true).unwrap();
    let fields: Vec<&str> = c.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(fields, vec!["A", "B"]);
    assert!(c.methods.is_empty());
    assert!(c.pointer_method_set.is_empty());
}
