use crate::{
    codegen::{
        ReExportIns, ReExportPlan, RuntimeHelper, RuntimeHelpers, apply_export_mode,
        emit_re_exports, resolve_export_mode,
    },
    config::{ExportMode, Mode, OutputFormat},
    error::LinkError,
    module::ModuleGraph,
    resolve::ExportResolver,
    util::testing::{cjs, compare_string_lines_or_panic, esm, external, graph, init_logger},
};

fn plan(g: &ModuleGraph, path: &str, format: OutputFormat, mode: Mode) -> ReExportPlan {
    init_logger();
    let id = g.resolve(path).expect("module in graph").id;
    let table = ExportResolver::new(g).resolve(id);
    emit_re_exports(g, &table, format, mode)
}

#[test]
fn test_bundle_alias() {
    let g = graph(vec![
        esm("entry.js").re_export("y", "b.js", "x"),
        esm("b.js").export("x"),
    ]);
    let p = plan(&g, "entry.js", OutputFormat::Esm, Mode::Bundle);
    assert_eq!(
        p.ins,
        vec![ReExportIns::Alias {
            exported: "y".into(),
            module: 1,
            local: "x".into(),
        }]
    );
    assert!(p.helpers.is_empty());
    assert_eq!(p.render(&g), "export { x as y };\n");
}

#[test]
fn test_bundle_skips_locals() {
    let g = graph(vec![esm("entry.js").exports(&["a", "b"]).default_export()]);
    let p = plan(&g, "entry.js", OutputFormat::Cjs, Mode::Bundle);
    assert!(p.is_empty());
    assert!(p.helpers.is_empty());
}

#[test]
fn test_cjs_named_re_export_is_runtime_property() {
    let g = graph(vec![
        esm("entry.js").re_export("x", "lib.cjs", "x"),
        cjs("lib.cjs").export("x"),
    ]);
    let p = plan(&g, "entry.js", OutputFormat::Esm, Mode::Bundle);
    assert_eq!(
        p.ins,
        vec![ReExportIns::RuntimeProperty {
            exported: "x".into(),
            source: 1,
            name: "x".into(),
        }]
    );
    assert_eq!(p.render(&g), "export var x = require_lib().x;\n");
}

#[test]
fn test_external_star_passthrough_in_esm() {
    let g = graph(vec![
        esm("entry.js").star("ext").export("a"),
        external("ext"),
    ]);
    let p = plan(&g, "entry.js", OutputFormat::Esm, Mode::Bundle);
    assert_eq!(p.ins, vec![ReExportIns::ExportStarFrom { source: 1 }]);
    assert!(p.helpers.is_empty());
    assert_eq!(p.render(&g), "export * from \"ext\";\n");
}

#[test]
fn test_external_star_merged_in_cjs() {
    let g = graph(vec![
        esm("entry.js").star("ext").exports(&["a", "default"]),
        external("ext"),
    ]);
    let p = plan(&g, "entry.js", OutputFormat::Cjs, Mode::Bundle);
    assert_eq!(
        p.ins,
        vec![ReExportIns::RuntimeMerge {
            source: 1,
            skip: vec!["a".into()],
            helper: RuntimeHelper::ReExport,
        }]
    );
    assert_eq!(p.helpers.names(), vec!["__reExport"]);
    assert_eq!(p.render(&g), "__reExport(exports, require(\"ext\"), [\"a\"]);\n");
}

#[test]
fn test_cjs_star_merged_in_esm() {
    let g = graph(vec![
        esm("entry.js").star("lib.cjs").star("b.js"),
        cjs("lib.cjs").export("z"),
        esm("b.js").export("y"),
    ]);
    let p = plan(&g, "entry.js", OutputFormat::Esm, Mode::Bundle);
    assert_eq!(
        p.ins,
        vec![
            ReExportIns::Alias {
                exported: "y".into(),
                module: 2,
                local: "y".into(),
            },
            ReExportIns::RuntimeMerge {
                source: 1,
                skip: vec!["y".into()],
                helper: RuntimeHelper::MergeNamespaces,
            },
        ]
    );
    assert_eq!(p.helpers.names(), vec!["__mergeNamespaces"]);
    compare_string_lines_or_panic(
        p.render(&g),
        "export { y };\n__mergeNamespaces(entry_exports, [require_lib()], [\"y\"]);\n".to_owned(),
    );
    assert!(!p.render(&g).contains("(exports,"));
}

#[test]
fn test_external_named_re_export() {
    let g = graph(vec![
        esm("entry.js").re_export("b", "ext", "a"),
        external("ext"),
    ]);
    let esm_plan = plan(&g, "entry.js", OutputFormat::Esm, Mode::Bundle);
    assert_eq!(esm_plan.render(&g), "export { a as b } from \"ext\";\n");

    let iife_plan = plan(&g, "entry.js", OutputFormat::Iife, Mode::Bundle);
    assert_eq!(
        iife_plan.render(&g),
        "__export(exports, { b: () => require(\"ext\").a });\n"
    );
    assert_eq!(iife_plan.helpers.names(), vec!["__export"]);
}

#[test]
fn test_namespace_binding() {
    let g = graph(vec![
        esm("entry.js")
            .re_export_ns("ns", "b.js")
            .re_export_ns("lib", "lib.cjs"),
        esm("b.js").export("x"),
        cjs("lib.cjs").export("y"),
    ]);

    let p = plan(&g, "entry.js", OutputFormat::Esm, Mode::Bundle);
    assert_eq!(
        p.ins,
        vec![
            ReExportIns::NamespaceBinding {
                exported: "lib".into(),
                source: 2,
            },
            ReExportIns::NamespaceBinding {
                exported: "ns".into(),
                source: 1,
            },
        ]
    );
    compare_string_lines_or_panic(
        p.render(&g),
        "export var lib = __toESM(require_lib());\nexport { b_exports as ns };\n".to_owned(),
    );
    assert_eq!(p.helpers.names(), vec!["__export", "__reExport", "__toESM"]);

    let p = plan(&g, "entry.js", OutputFormat::Cjs, Mode::Bundle);
    compare_string_lines_or_panic(
        p.render(&g),
        "__export(exports, { lib: () => __toESM(require_lib()) });\n\
         __export(exports, { ns: () => b_exports });\n"
            .to_owned(),
    );
}

#[test]
fn test_unresolved_is_undefined() {
    let g = graph(vec![
        esm("entry.js").re_export("nope", "b.js", "nope"),
        esm("b.js").export("x"),
    ]);
    let p = plan(&g, "entry.js", OutputFormat::Esm, Mode::Bundle);
    assert_eq!(
        p.ins,
        vec![ReExportIns::Undefined {
            exported: "nope".into()
        }]
    );
    assert_eq!(p.render(&g), "export var nope = void 0;\n");
}

#[test]
fn test_ambiguous_not_re_exported() {
    let g = graph(vec![
        esm("entry.js").star("a.js").star("b.js"),
        esm("a.js").export("x"),
        esm("b.js").export("x"),
    ]);
    let p = plan(&g, "entry.js", OutputFormat::Esm, Mode::Bundle);
    assert!(p.is_empty());
}

#[test]
fn test_convert_mode() {
    let g = graph(vec![
        esm("entry.js")
            .re_export("a", "b.js", "x")
            .re_export_ns("ns", "b.js")
            .star("c.js"),
        esm("b.js").export("x"),
        esm("c.js").export("y"),
    ]);

    let p = plan(&g, "entry.js", OutputFormat::Esm, Mode::Convert);
    compare_string_lines_or_panic(
        p.render(&g),
        "export { x as a } from \"b.js\";\n\
         export * as ns from \"b.js\";\n\
         export * from \"c.js\";\n"
            .to_owned(),
    );
    assert!(p.helpers.is_empty());

    let p = plan(&g, "entry.js", OutputFormat::Cjs, Mode::Convert);
    compare_string_lines_or_panic(
        p.render(&g),
        "__export(exports, { a: () => require(\"b.js\").x });\n\
         __export(exports, { ns: () => __toESM(require(\"b.js\")) });\n\
         __reExport(exports, require(\"c.js\"), []);\n"
            .to_owned(),
    );
    assert_eq!(p.helpers.names(), vec!["__export", "__reExport", "__toESM"]);
}

#[test]
fn test_helper_dependencies() {
    let mut helpers = RuntimeHelpers::new();
    helpers.use_helper(RuntimeHelper::ToEsm);
    assert!(helpers.contains(RuntimeHelper::ReExport));
    assert_eq!(helpers.names(), vec!["__reExport", "__toESM"]);

    let rendered = helpers.render();
    let re_export = rendered.find("var __reExport").expect("declared");
    let to_esm = rendered.find("var __toESM").expect("declared");
    assert!(re_export < to_esm);

    let mut all = RuntimeHelpers::new();
    all.use_helper(RuntimeHelper::Export);
    all.extend_from(&helpers);
    assert_eq!(all.names(), vec!["__export", "__reExport", "__toESM"]);
}

#[test]
fn test_export_mode_auto() {
    let auto = |names: &[&str]| {
        resolve_export_mode(ExportMode::Auto, OutputFormat::Cjs, "entry.js", names)
            .expect("compatible")
    };
    assert_eq!(auto(&[]), Some(ExportMode::None));
    assert_eq!(auto(&["default"]), Some(ExportMode::Default));
    assert_eq!(auto(&["default", "a"]), Some(ExportMode::Named));
    assert_eq!(auto(&["a"]), Some(ExportMode::Named));

    let esm = resolve_export_mode(ExportMode::Default, OutputFormat::Esm, "entry.js", &["a"]);
    assert_eq!(esm.expect("no export mode for esm"), None);
}

#[test]
fn test_export_mode_incompatible() {
    let err = resolve_export_mode(
        ExportMode::Default,
        OutputFormat::Iife,
        "entry.js",
        &["foo", "bar", "default"],
    )
    .expect_err("incompatible");
    assert!(matches!(
        &err,
        LinkError::IncompatibleExportOptionValue { option_value, exported_keys, .. }
            if *option_value == "default" && exported_keys == "\"bar\", \"default\" and \"foo\""
    ));

    let err = resolve_export_mode(ExportMode::None, OutputFormat::Cjs, "entry.js", &["a"])
        .expect_err("incompatible");
    assert!(matches!(
        err,
        LinkError::IncompatibleExportOptionValue { option_value: "none", .. }
    ));

    let named = resolve_export_mode(ExportMode::Named, OutputFormat::Cjs, "entry.js", &[]);
    assert_eq!(named.expect("named always fits"), Some(ExportMode::Named));
}

#[test]
fn test_default_export_shim() {
    let g = graph(vec![esm("entry.js").default_export()]);
    let mut p = plan(&g, "entry.js", OutputFormat::Cjs, Mode::Bundle);
    let mode = resolve_export_mode(ExportMode::Auto, OutputFormat::Cjs, "entry.js", &["default"])
        .expect("compatible");
    apply_export_mode(&mut p, mode);
    assert_eq!(p.export_mode, Some(ExportMode::Default));
    assert_eq!(p.ins, vec![ReExportIns::DefaultExportShim]);
    assert_eq!(p.render(&g), "module.exports = exports.default;\n");
}
