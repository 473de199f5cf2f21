use crate::common::*;
use pkgdex::corpus::TypeExpr;
use pkgdex::registry::TypeShape;

const P: &str = "example.com/p";

fn reader() -> pkgdex::corpus::TypeNameInput {
    type_decl(
        "R",
        TypeExpr::interface(vec![interface_method("Read", read_signature())], Vec::new()),
    )
}

fn read_closer() -> pkgdex::corpus::TypeNameInput {
    type_decl(
        "RC",
        TypeExpr::interface(
            vec![interface_method("Close", close_signature())],
            vec![TypeExpr::named(P, "R")],
        ),
    )
}

#[test]
fn test_value_receiver_implements_interface() {
    let mut p = package(P, &[]);
    p.type_names = vec![reader(), type_decl("F", TypeExpr::structure(Vec::new()))];
    p.functions = vec![method("F", false, "Read", read_signature())];
    let index = CorpusBuilder::new().package(p).index();

    let r = index.implementations(P, "R").unwrap();
    assert!(r.interface);
    assert_eq!(r.implemented_bys.len(), 1);
    assert_eq!(r.implemented_bys[0].ty.name, "F");
    assert!(!r.implemented_bys[0].pointer);

    let f = index.implementations(P, "F").unwrap();
    assert!(!f.interface);
    let names: Vec<&str> = f.implements.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["R"]);
}

#[test]
fn test_pointer_receiver_implements_through_pointer() {
    let mut p = package(P, &[]);
    p.type_names = vec![reader(), type_decl("G", TypeExpr::structure(Vec::new()))];
    p.functions = vec![method("G", true, "Read", read_signature())];
    let index = CorpusBuilder::new().package(p).index();

    let r = index.implementations(P, "R").unwrap();
    assert_eq!(r.implemented_bys.len(), 1);
    assert!(r.implemented_bys[0].pointer);
}

#[test]
fn test_signature_mismatch_does_not_implement() {
    let mut p = package(P, &[]);
    p.type_names = vec![reader(), type_decl("H", TypeExpr::structure(Vec::new()))];
    p.functions = vec![method("H", false, "Read", close_signature())];
    let index = CorpusBuilder::new().package(p).index();

    assert!(index.implementations(P, "R").unwrap().implemented_bys.is_empty());
    assert!(index.implementations(P, "H").unwrap().implements.is_empty());
}

#[test]
fn test_implements_list_drops_embedded_interfaces() {
    let mut p = package(P, &[]);
    p.type_names = vec![
        reader(),
        read_closer(),
        type_decl("File", TypeExpr::structure(Vec::new())),
    ];
    p.functions = vec![
        method("File", true, "Read", read_signature()),
        method("File", true, "Close", close_signature()),
    ];
    let index = CorpusBuilder::new().package(p).index();

    let file = index.implementations(P, "File").unwrap();
    let names: Vec<&str> = file.implements.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["RC"]);

    // R still lists File as an implementer
    let r = index.implementations(P, "R").unwrap();
    assert!(r.implemented_bys.iter().any(|i| i.ty.name == "File"));

    // an interface implements the interfaces it embeds, never itself
    let rc = index.implementations(P, "RC").unwrap();
    let names: Vec<&str> = rc.implements.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["R"]);
}

#[test]
fn test_error_interface_from_builtin() {
    let mut p = package(P, &[]);
    p.type_names = vec![type_decl("Failure", TypeExpr::structure(Vec::new()))];
    p.functions = vec![method(
        "Failure",
        false,
        "Error",
        TypeExpr::signature(Vec::new(), vec![TypeExpr::basic("string")]),
    )];
    let index = CorpusBuilder::new().package(p).index();

    let failure = index.implementations(P, "Failure").unwrap();
    assert!(
        failure
            .implements
            .iter()
            .any(|t| t.package == "builtin" && t.name == "error")
    );
    assert_eq!(
        failure.implements.iter().find(|t| t.name == "error").unwrap().display,
        "error"
    );
}

#[test]
fn test_embedded_and_spelled_out_interfaces_are_identical() {
    // I.Use takes interface{ R }, T.Use takes interface{ Read(...) }
    let mut p = package(P, &[]);
    p.type_names = vec![
        reader(),
        type_decl(
            "I",
            TypeExpr::interface(
                vec![interface_method(
                    "Use",
                    TypeExpr::signature(
                        vec![TypeExpr::interface(Vec::new(), vec![TypeExpr::named(P, "R")])],
                        Vec::new(),
                    ),
                )],
                Vec::new(),
            ),
        ),
        type_decl("T", TypeExpr::structure(Vec::new())),
    ];
    p.functions = vec![method(
        "T",
        false,
        "Use",
        TypeExpr::signature(
            vec![TypeExpr::interface(
                vec![interface_method("Read", read_signature())],
                Vec::new(),
            )],
            Vec::new(),
        ),
    )];
    let index = CorpusBuilder::new().package(p).index();

    let i = index.implementations(P, "I").unwrap();
    assert_eq!(i.implemented_bys.len(), 1);
    assert_eq!(i.implemented_bys[0].ty.name, "T");

    // both literals intern to R's underlying, so the two signatures are one node
    let r = index.type_name(index.lookup_type(P, "R").unwrap()).ty;
    let r = index.registry().underlying(r);
    let use_of = |name: &str| {
        let ty = index.type_name(index.lookup_type(P, name).unwrap()).ty;
        index
            .type_info(ty)
            .members
            .iter()
            .map(|&m| index.member(m))
            .find(|m| &*m.name == "Use")
            .unwrap()
            .ty
    };
    assert_eq!(use_of("I"), use_of("T"));
    match &index.type_info(use_of("T")).shape {
        TypeShape::Signature { params, .. } => assert_eq!(params, &vec![r]),
        other => panic!("unexpected shape {other:?}"),
    }
}

#[test]
fn test_interface_may_embed_a_later_declaration() {
    let mut p = package(P, &[]);
    p.type_names = vec![
        read_closer(),
        reader(),
        type_decl("File", TypeExpr::structure(Vec::new())),
    ];
    p.functions = vec![
        method("File", false, "Read", read_signature()),
        method("File", false, "Close", close_signature()),
    ];
    let index = CorpusBuilder::new().package(p).index();

    let rc = index.implementations(P, "RC").unwrap();
    let names: Vec<&str> = rc.implemented_bys.iter().map(|i| i.ty.name.as_str()).collect();
    assert_eq!(names, vec!["File"]);

    let detail = index.type_detail(P, "RC", true).unwrap();
    assert_eq!(detail.value_method_set, vec!["Close", "Read"]);
}

#[test]
fn test_pointer_to_interface_has_no_methods() {
    let mut p = package(P, &[]);
    p.type_names = vec![reader()];
    let index = CorpusBuilder::new().package(p).index();

    let detail = index.type_detail(P, "R", true).unwrap();
    assert_eq!(detail.value_method_set, vec!["Read"]);
    assert!(detail.pointer_method_set.is_empty());
}
