use std::str::FromStr;

use crate::{
    error::LinkError,
    module::{CreateModule, ImportRecord, ModuleGraph, ModuleKind, NamedReExport},
    util::testing::{cjs, esm, graph, must},
};

#[test]
fn test_kind_from_str() {
    assert_eq!(ModuleKind::from_str("esm"), Ok(ModuleKind::EsModule));
    assert_eq!(ModuleKind::from_str("cjs"), Ok(ModuleKind::CommonJs));
    assert_eq!(ModuleKind::from_str("external"), Ok(ModuleKind::External));
    assert_eq!(ModuleKind::from_str("empty"), Ok(ModuleKind::Empty));
    assert!(ModuleKind::from_str("amd").is_err());
    assert_eq!(ModuleKind::CommonJs.to_string(), "cjs");
}

#[test]
fn test_kind_is_static() {
    assert!(ModuleKind::EsModule.is_static());
    assert!(ModuleKind::CommonJs.has_interop_default());
    assert!(ModuleKind::External.has_interop_default());
    assert!(ModuleKind::Empty.has_interop_default());
}

#[test]
fn test_add_and_resolve() {
    let mut g = ModuleGraph::new();
    let mut m = CreateModule::new("foo/bar.mjs", ModuleKind::EsModule);
    m.has_default_export = true;
    let id = must(g.add(m)).id;

    assert_eq!(id, 0);
    assert_eq!(g.len(), 1);
    let m = g.resolve("foo/bar.mjs").expect("resolved");
    assert_eq!(m.id, id);
    assert_eq!(m.stem(), "bar");
    assert_eq!(m.local_exports.get("default").map(|s| s.as_str()), Some("default"));
    assert_eq!(m.to_string(), "foo/bar.mjs (esm)");
    assert!(g.resolve("bar.mjs").is_none());
}

#[test]
fn test_add_duplicate_path() {
    let mut g = ModuleGraph::new();
    must(g.add(CreateModule::new("a.js", ModuleKind::EsModule)));
    match g.add(CreateModule::new("a.js", ModuleKind::CommonJs)) {
        Ok(_) => panic!("expected error"),
        Err(e) => assert_eq!(e.to_string(), "invalid module graph: module 'a.js' already declared"),
    }
}

#[test]
fn test_validate_unknown_reference() {
    let mut g = ModuleGraph::new();
    let mut m = CreateModule::new("a.js", ModuleKind::EsModule);
    m.named_re_exports.push(NamedReExport::new("x", 7, "x"));
    must(g.add(m));
    match g.validate() {
        Ok(_) => panic!("expected error"),
        Err(e) => assert!(matches!(
            e,
            LinkError::InvalidGraph(ref msg) if msg == "module 'a.js' references unknown module id 7"
        )),
    }

    let mut g = ModuleGraph::new();
    let mut m = CreateModule::new("a.js", ModuleKind::EsModule);
    m.imports.push(ImportRecord::new(3).named("y"));
    must(g.add(m));
    assert!(g.validate().is_err());
}

#[test]
fn test_has_no_exports() {
    let g = graph(vec![
        esm("none.js"),
        esm("star.js").star("none.js"),
        cjs("cjs.js"),
        cjs("dyn.js").dynamic_exports(),
        esm("def.js").default_export(),
    ]);
    assert!(g.module(0).has_no_exports());
    assert!(!g.module(1).has_no_exports());
    assert!(g.module(2).has_no_exports());
    assert!(!g.module(3).has_no_exports());
    assert!(!g.module(4).has_no_exports());
}

#[test]
fn test_export_deps() {
    let g = graph(vec![
        esm("a.js")
            .star("b.js")
            .re_export("x", "c.js", "y")
            .re_export_ns("ns", "d.js")
            .import_named("e.js", &["z"]),
        esm("b.js"),
        esm("c.js"),
        esm("d.js"),
        esm("e.js"),
    ]);
    let deps: Vec<usize> = g.module(0).export_deps().collect();
    assert_eq!(deps, vec![1, 2, 3]);
}

#[test]
fn test_import_specifier_display() {
    let record = ImportRecord::new(0)
        .default("def")
        .named("x")
        .namespace("ns", &["a"]);
    let printed: Vec<String> = record.specifiers.iter().map(|s| s.to_string()).collect();
    assert_eq!(printed, vec!["default as def", "x", "* as ns"]);
}
