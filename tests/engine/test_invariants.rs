//! Properties every built index holds, checked on a small multi-package corpus.

use crate::common::*;
use pkgdex::corpus::{Corpus, ObjectKind, TypeExpr, ValueInput};
use pkgdex::selectors::order::compare_names;
use pkgdex::selectors::{method_set, method_set_of};
use pkgdex::{Index, PackageId, PackageOrder};
use std::cmp::Ordering;

const IO: &str = "example.com/io";
const BUFIO: &str = "example.com/bufio";
const NET: &str = "example.com/net";
const APP: &str = "example.com/app";

fn buffer_var(name: &str) -> ValueInput {
    ValueInput {
        name: name.to_string(),
        object: None,
        position: None,
        ty: TypeExpr::slice(TypeExpr::basic("byte")),
    }
}

fn corpus() -> Corpus {
    let mut builder = CorpusBuilder::new();
    let read = builder.object(ObjectKind::Func, "ReadAll", Some(IO));

    let mut io = package(IO, &[]);
    io.type_names = vec![
        type_decl(
            "Reader",
            TypeExpr::interface(vec![interface_method("Read", read_signature())], Vec::new()),
        ),
        type_decl(
            "Closer",
            TypeExpr::interface(vec![interface_method("Close", close_signature())], Vec::new()),
        ),
        type_decl(
            "ReadCloser",
            TypeExpr::interface(
                Vec::new(),
                vec![TypeExpr::named(IO, "Reader"), TypeExpr::named(IO, "Closer")],
            ),
        ),
    ];
    let mut read_all = function(
        "ReadAll",
        TypeExpr::signature(
            vec![TypeExpr::named(IO, "Reader")],
            vec![TypeExpr::slice(TypeExpr::basic("byte")), TypeExpr::error()],
        ),
    );
    read_all.object = Some(read);
    io.functions = vec![read_all];
    io.variables = vec![buffer_var("scratch")];
    io.files = vec![
        FileFixture::new("io.go", "package io\n\nfunc ReadAll() {}\n")
            .ident("ReadAll", 0, read, true)
            .into_input(),
    ];

    let mut bufio = package(BUFIO, &[IO]);
    bufio.type_names = vec![type_decl(
        "Reader",
        TypeExpr::structure(vec![
            field("rd", TypeExpr::named(IO, "Reader")),
            field("buf", TypeExpr::slice(TypeExpr::basic("byte"))),
        ]),
    )];
    bufio.functions = vec![method("Reader", true, "Read", read_signature())];
    bufio.variables = vec![buffer_var("pool")];

    let mut net = package(NET, &[IO]);
    net.type_names = vec![
        type_decl(
            "Conn",
            TypeExpr::structure(vec![embed_pointer(BUFIO, "Reader")]),
        ),
        type_decl("Addr", TypeExpr::basic("string")),
    ];
    net.imports.insert(0, BUFIO.to_string());
    net.functions = vec![
        method("Conn", false, "Close", close_signature()),
        method("Conn", false, "close", close_signature()),
        method("Conn", true, "LocalAddr", TypeExpr::signature(
            Vec::new(),
            vec![TypeExpr::named(NET, "Addr")],
        )),
    ];

    let mut app = package(APP, &[NET, BUFIO]);
    app.type_names = vec![type_decl(
        "Server",
        TypeExpr::structure(vec![embed(NET, "Conn"), field("Name", TypeExpr::basic("string"))]),
    )];

    builder.package(io).package(bufio).package(net).package(app);
    builder.build()
}

fn ids(index: &Index) -> impl Iterator<Item = PackageId> + '_ {
    (0..index.graph().len()).map(PackageId::new)
}

#[test]
fn test_depth_exceeds_every_dependency() {
    let index = build(corpus());
    for id in ids(&index) {
        let package = index.graph().get(id);
        for &dep in &package.deps {
            assert!(
                package.depth > index.graph().get(dep).depth,
                "{} should be deeper than {}",
                package.path,
                index.graph().get(dep).path
            );
        }
    }
    let app = index.package_summary(index.package_id(APP).unwrap());
    assert_eq!(app.depth, 3);
    assert_eq!(app.deps, 3);
}

#[test]
fn test_deps_and_dependents_are_symmetric() {
    let index = build(corpus());
    for id in ids(&index) {
        let package = index.graph().get(id);
        for &dep in &package.deps {
            assert!(index.graph().get(dep).deped_bys.contains(&id));
        }
        for &user in &package.deped_bys {
            assert!(index.graph().get(user).deps.contains(&id));
        }
    }

    let view = index.dependencies(IO).unwrap();
    assert!(view.deps.is_empty());
    let users: Vec<&str> = view.deped_bys.iter().map(|p| p.path.as_str()).collect();
    assert_eq!(users.len(), 3);
    assert!(users.contains(&APP));
}

#[test]
fn test_structurally_equal_types_are_interned_once() {
    let index = build(corpus());
    let io = index.package_id(IO).unwrap();
    let bufio = index.package_id(BUFIO).unwrap();
    let scratch = index.value(index.value_in(io, "scratch").unwrap());
    let pool = index.value(index.value_in(bufio, "pool").unwrap());
    assert_eq!(scratch.ty, pool.ty);
}

#[test]
fn test_method_lists_sorted_and_unique() {
    let index = build(corpus());
    for info in index.registry().iter() {
        for list in [&info.methods, &info.fields] {
            let names: Vec<&str> = list.iter().map(|s| &*s.name).collect();
            for pair in names.windows(2) {
                assert_ne!(pair[0], pair[1], "duplicate selector in {:?}", info.name);
            }
        }
        for pair in info.methods.windows(2) {
            assert_ne!(
                compare_names(&pair[0].name, &pair[1].name),
                Ordering::Greater,
                "methods out of order in {:?}",
                info.name
            );
        }
    }

    let conn = index.type_detail(NET, "Conn", true).unwrap();
    let names: Vec<&str> = conn.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Close", "LocalAddr", "Read", "close"]);
}

#[test]
fn test_implementers_carry_every_interface_method() {
    let index = build(corpus());
    let registry = index.registry();
    let mut checked = 0;

    for info in registry.iter() {
        for implementer in &info.implemented_bys {
            let set = method_set_of(registry, implementer.type_id, implementer.pointer);
            for required in method_set(registry, info.id) {
                let required = registry.member(required.member);
                let found = set
                    .iter()
                    .map(|s| registry.member(s.member))
                    .find(|m| m.name == required.name)
                    .expect("implementer has the method");
                assert_eq!(found.ty, required.ty);
            }
            checked += 1;
        }
    }
    assert!(checked > 0);

    let conn = index.implementations(NET, "Conn").unwrap();
    let names: Vec<&str> = conn.implements.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["ReadCloser"]);
}

#[test]
fn test_declaration_occurrences_resolve_back() {
    let index = build(corpus());
    let refs = index.references(IO, "ReadAll").unwrap();
    let declaration = &refs.groups[0].occurrences[0];
    assert!(declaration.declaration);

    let io = index.package_id(IO).unwrap();
    let file = index.files().find(io, "io.go").unwrap();
    assert_eq!(index.declaration_at(file, declaration.offset), Some(refs.object));
    assert_eq!(index.declaration_at(file, 0), None);
}

#[test]
fn test_build_is_deterministic() {
    let first = build(corpus());
    let second = build(corpus());

    let json = |index: &Index| {
        let mut out = vec![serde_json::to_value(index.stats()).unwrap()];
        out.push(serde_json::to_value(index.packages(PackageOrder::Depth)).unwrap());
        for (path, name) in [(IO, "Reader"), (BUFIO, "Reader"), (NET, "Conn"), (APP, "Server")] {
            out.push(serde_json::to_value(index.type_detail(path, name, true).unwrap()).unwrap());
        }
        out.push(serde_json::to_value(index.package_detail(NET, true).unwrap()).unwrap());
        out
    };
    assert_eq!(json(&first), json(&second));
}

#[test]
fn test_package_orders() {
    let index = build(corpus());
    let alphabet: Vec<String> = index
        .packages(PackageOrder::Alphabet)
        .into_iter()
        .map(|p| p.path)
        .collect();
    let mut sorted = alphabet.clone();
    sorted.sort();
    assert_eq!(alphabet, sorted);

    let by_depth = index.packages(PackageOrder::Depth);
    assert_eq!(by_depth[0].path, APP);

    // bufio and io both have two importers; ties fall back to the path
    let by_importers = index.packages(PackageOrder::ImportedBys);
    assert_eq!(by_importers[0].path, BUFIO);
    assert_eq!(by_importers[1].path, IO);
}
