use crate::common::*;
use pkgdex::corpus::{ObjectKind, TypeExpr};
use pkgdex::server::{Dispatcher, ResourceId, ResourceKind};
use pkgdex::{Index, PageOptions, Settings};
use serde_json::Value;

const P: &str = "example.com/p";
const P_GO: &str = "package p\n\nfunc (F) Read(b []byte) (int, error) { return 0, nil }\n";

fn index() -> Index {
    let mut p = package(P, &[]);
    p.type_names = vec![
        type_decl(
            "R",
            TypeExpr::interface(vec![interface_method("Read", read_signature())], Vec::new()),
        ),
        type_decl(
            "F",
            TypeExpr::structure(vec![field("n", TypeExpr::basic("int"))]),
        ),
    ];
    let mut builder = CorpusBuilder::new();
    let read = builder.object(ObjectKind::Method, "Read", Some(P));
    let mut read_method = method("F", false, "Read", read_signature());
    read_method.object = Some(read);
    p.functions = vec![read_method];
    p.files = vec![
        FileFixture::new("p.go", P_GO)
            .ident("Read", 0, read, true)
            .into_input(),
    ];
    builder.package(p).index()
}

fn body(response: &pkgdex::server::Response) -> Value {
    serde_json::from_slice(&response.body).expect("page is JSON")
}

#[test]
fn test_requests_before_install_get_loading_page() {
    let dispatcher = Dispatcher::new(&Settings::default());
    assert!(!dispatcher.is_ready());

    let response = dispatcher.dispatch("pkg:example.com/p");
    assert_eq!(response.status, 425);
    assert_eq!(body(&response)["status"], "loading");

    dispatcher.install(index());
    assert!(dispatcher.is_ready());
    let response = dispatcher.dispatch("/pkg:example.com/p");
    assert_eq!(response.status, 200);
    assert_eq!(body(&response)["summary"]["path"], P);
}

#[test]
fn test_repeated_request_hits_cache() {
    let dispatcher = Dispatcher::new(&Settings::default());
    dispatcher.install(index());

    let first = dispatcher.dispatch("imp:example.com/p.R");
    let second = dispatcher.dispatch("imp:example.com/p.R");
    assert_eq!(first.status, 200);
    assert_eq!(first.body, second.body);

    let stats = dispatcher.cache().stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);

    let page = body(&first);
    assert_eq!(page["interface"], true);
    assert_eq!(page["implemented_bys"][0]["name"], "F");
}

#[test]
fn test_changing_options_drops_old_pages() {
    let dispatcher = Dispatcher::new(&Settings::default());
    dispatcher.install(index());
    dispatcher.dispatch("pkg:example.com/p");
    assert_eq!(dispatcher.cache().len(), 1);

    let mut options: PageOptions = dispatcher.options();
    options.show_unexported = !options.show_unexported;
    dispatcher.set_options(options);
    assert!(dispatcher.cache().is_empty());
}

#[test]
fn test_missing_resources_are_404() {
    let dispatcher = Dispatcher::new(&Settings::default());
    dispatcher.install(index());

    assert_eq!(dispatcher.dispatch("pkg:example.com/missing").status, 404);
    assert_eq!(dispatcher.dispatch("imp:example.com/p.Missing").status, 404);
    assert_eq!(dispatcher.dispatch("src:example.com/p/missing.go").status, 404);
    assert_eq!(dispatcher.dispatch("bogus:thing").status, 404);
    assert_eq!(dispatcher.dispatch("no-such-static-name").status, 404);
    assert_eq!(dispatcher.dispatch("svg:logo").status, 404);
}

#[test]
fn test_use_and_source_pages() {
    let dispatcher = Dispatcher::new(&Settings::default());
    dispatcher.install(index());

    let response = dispatcher.dispatch("use:example.com/p..F.Read");
    assert_eq!(response.status, 200);
    let page = body(&response);
    assert_eq!(page["total"], 1);
    assert_eq!(page["groups"][0]["occurrences"][0]["declaration"], true);

    let response = dispatcher.dispatch("src:example.com/p/p.go");
    assert_eq!(response.status, 200);
    assert_eq!(body(&response)["content"], P_GO);
}

#[test]
fn test_api_and_assets() {
    let dispatcher = Dispatcher::new(&Settings::default());

    // assets do not wait for the index
    let css = dispatcher.dispatch("css:default");
    assert_eq!(css.status, 200);
    assert_eq!(css.content_type, ResourceKind::Css.content_type());

    dispatcher.install(index());
    let packages = body(&dispatcher.dispatch(""));
    assert!(
        packages
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p["path"] == P)
    );
    assert_eq!(dispatcher.dispatch("api:packages/depth").status, 200);
    assert_eq!(dispatcher.dispatch("api:packages/sideways").status, 404);
    assert!(body(&dispatcher.dispatch("api:stats"))["type_names"].is_u64());
}

#[test]
fn test_static_names_resolve_to_registered_resources() {
    let dispatcher = Dispatcher::new(&Settings::default());
    dispatcher.install(index());

    let id = ResourceId::dependencies(P);
    let name = dispatcher.register_static(id.clone());
    assert!(name.starts_with("dep/"));

    let response = dispatcher.dispatch(&name);
    assert_eq!(response.status, 200);
    assert_eq!(body(&response)["package"]["path"], P);

    assert_eq!(ResourceId::decode(&id.encode()).unwrap(), id);
}
