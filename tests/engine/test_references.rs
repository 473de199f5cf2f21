use crate::common::*;
use pkgdex::corpus::{ObjectKind, TypeExpr, ValueInput};
use pkgdex::{IndexError, Resource};

const A: &str = "example.com/a";
const B: &str = "example.com/b";
const P: &str = "example.com/p";

const A_GO: &str = "package a\n\nfunc F() {}\n";
const B_GO: &str = "package b\n\nimport \"example.com/a\"\n\nfunc G() { a.F() }\n";

fn two_packages() -> pkgdex::Index {
    let mut builder = CorpusBuilder::new();
    let pkg_a = builder.object(ObjectKind::PackageName, "a", Some(B));
    let f = builder.object(ObjectKind::Func, "F", Some(A));
    let g = builder.object(ObjectKind::Func, "G", Some(B));

    let mut a = package(A, &[]);
    let a_file = FileFixture::new("a.go", A_GO).ident("F", 0, f, true);
    let mut f_decl = function("F", no_args());
    f_decl.object = Some(f);
    f_decl.position = Some(a_file.position_of("F", 0));
    a.functions = vec![f_decl];
    a.files = vec![a_file.into_input()];

    let mut b = package(B, &[A]);
    let b_file = FileFixture::new("b.go", B_GO)
        .import(A, pkg_a)
        .ident("G", 0, g, true)
        .ident_within("a.F", "a", pkg_a, false)
        .ident("F", 0, f, false);
    let mut g_decl = function("G", no_args());
    g_decl.object = Some(g);
    b.functions = vec![g_decl];
    b.files = vec![b_file.into_input()];

    builder.package(a).package(b).index()
}

#[test]
fn test_references_grouped_declaring_package_first() {
    let index = two_packages();
    let refs = index.references(A, "F").unwrap();

    assert_eq!(refs.total, 2);
    let packages: Vec<&str> = refs.groups.iter().map(|g| g.package.as_str()).collect();
    assert_eq!(packages, vec![A, B]);
    assert!(refs.groups[0].occurrences[0].declaration);
    assert!(!refs.groups[1].occurrences[0].declaration);
    assert_eq!(refs.groups[1].occurrences[0].file, "b.go");
    assert_eq!(refs.groups[1].occurrences[0].line, 5);
}

#[test]
fn test_source_annotation_links_to_declaration() {
    let index = two_packages();
    let source = index.source(B, "b.go").unwrap();
    let offset = B_GO.rfind('F').unwrap() as u32;

    let f = source
        .annotations
        .iter()
        .find(|a| a.start == offset)
        .expect("F is annotated");
    let f_value = index
        .value_in(index.package_id(A).unwrap(), "F")
        .unwrap();
    assert_eq!(f.link, Some(Resource::Value(f_value)));
    assert_eq!(f.end, offset + 1);
}

#[test]
fn test_import_name_links_to_package() {
    let index = two_packages();
    let source = index.source(B, "b.go").unwrap();
    let offset = B_GO.find("a.F").unwrap() as u32;

    let a = source
        .annotations
        .iter()
        .find(|a| a.start == offset)
        .expect("package name is annotated");
    assert_eq!(a.link, Some(Resource::Package(index.package_id(A).unwrap())));
}

#[test]
fn test_unknown_identifier_is_not_found() {
    let index = two_packages();
    let err = index.references(A, "Missing").unwrap_err();
    assert!(matches!(err, IndexError::IdentifierNotFound { .. }));
    assert!(err.is_not_found());

    let err = index.source(A, "missing.go").unwrap_err();
    assert!(matches!(err, IndexError::FileNotFound { .. }));
}

#[test]
fn test_declaration_position_recorded() {
    let index = two_packages();
    let f = index.value(index.value_in(index.package_id(A).unwrap(), "F").unwrap());
    let position = f.position.expect("F has a position");
    assert_eq!(position.line, 3);
    assert_eq!(position.column, 6);
}

const RUNTIME: &str = "runtime";
const LOOP_GO: &str = "package p\n\nfunc Drain(ch chan int, m map[int]int) {\n\tfor k := range m {\n\t\tch <- k\n\t}\n\tif len(m) > 0 {\n\t} else {\n\t\t<-ch\n\t}\n}\n";

#[test]
fn test_keywords_and_arrows_link_to_runtime_primitives() {
    let mut runtime = package(RUNTIME, &[]);
    runtime.functions = ["chansend1", "chanrecv1", "mapiterinit", "selectnbrecv"]
        .into_iter()
        .map(|name| function(name, no_args()))
        .collect();
    let mut p = package(P, &[RUNTIME]);
    p.files = vec![FileFixture::new("loop.go", LOOP_GO).into_input()];
    let index = CorpusBuilder::new().package(runtime).package(p).index();

    let runtime = index.package_id(RUNTIME).unwrap();
    let primitive = |name: &str| Some(Resource::Value(index.value_in(runtime, name).unwrap()));
    let source = index.source(P, "loop.go").unwrap();
    let link = |needle: &str| {
        let offset = LOOP_GO.find(needle).unwrap() as u32;
        source
            .annotations
            .iter()
            .find(|a| a.start == offset)
            .unwrap_or_else(|| panic!("{needle} is annotated"))
            .link
    };

    assert_eq!(link("range"), primitive("mapiterinit"));
    assert_eq!(link("else"), primitive("selectnbrecv"));
    assert_eq!(link("<- k"), primitive("chansend1"));
    assert_eq!(link("<-ch"), primitive("chanrecv1"));
    assert_eq!(link("for"), None);
}

#[test]
fn test_equal_anonymous_structs_link_every_field_declaration() {
    const VARS_GO: &str = "package p\n\nvar first struct{ X int }\nvar second struct{ X int }\n";
    let mut builder = CorpusBuilder::new();
    let x1 = builder.object(ObjectKind::Field, "X", Some(P));
    let x2 = builder.object(ObjectKind::Field, "X", Some(P));

    let var = |name: &str, object| {
        let mut x = field("X", TypeExpr::basic("int"));
        x.object = Some(object);
        ValueInput {
            name: name.to_string(),
            object: None,
            position: None,
            ty: TypeExpr::structure(vec![x]),
        }
    };
    let mut p = package(P, &[]);
    p.variables = vec![var("first", x1), var("second", x2)];
    p.files = vec![
        FileFixture::new("vars.go", VARS_GO)
            .ident("X", 0, x1, true)
            .ident("X", 1, x2, true)
            .into_input(),
    ];
    let index = builder.package(p).index();

    let first = index.resource_of(x1);
    assert!(matches!(first, Some(Resource::Member(_))));
    assert_eq!(index.resource_of(x2), first);

    let source = index.source(P, "vars.go").unwrap();
    let second = VARS_GO.rfind('X').unwrap() as u32;
    let annotation = source.annotations.iter().find(|a| a.start == second).unwrap();
    assert_eq!(annotation.link, first);
    assert_eq!(index.reference_index().references_to(x2).len(), 1);
}
