use std::{fmt::Display, sync::Once};

use tracing_subscriber::EnvFilter;

use crate::module::{ImportEntry, Manifest, ModuleEntry, ModuleGraph, ReExportEntry};

static INIT: Once = Once::new();

/// Install a compact subscriber once per test binary. Silent unless RUST_LOG
/// says otherwise.
pub fn init_logger() {
    INIT.call_once(|| {
        let env_filter = EnvFilter::builder()
            .with_default_directive(tracing_subscriber::filter::LevelFilter::OFF.into())
            .from_env_lossy();

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .without_time()
            .with_test_writer()
            .compact()
            .init();
    });
}

pub fn must<T, V: Display>(res: Result<T, V>) -> T {
    res.unwrap_or_else(|err| panic!("unexpected error: {}", err))
}

pub fn compare_string_lines_or_panic(ina: String, inb: String) {
    let a: Vec<&str> = ina.trim().split('\n').collect();
    let b: Vec<&str> = inb.trim().split('\n').collect();
    assert_eq!(
        a.len(),
        b.len(),
        "number of lines must be equal, got\n{}\nand\n{}",
        ina,
        inb,
    );

    for (i, line) in a.iter().enumerate() {
        assert_eq!(line.trim(), b[i].trim());
    }
}

/// Module under construction. Module references are paths, resolved when
/// the graph is built.
pub struct TestModule {
    entry: ModuleEntry,
}

fn new_module(path: &str, kind: &str) -> TestModule {
    TestModule {
        entry: ModuleEntry {
            path: path.to_owned(),
            kind: kind.to_owned(),
            exports: Vec::new(),
            default_export: false,
            star: Vec::new(),
            re_exports: Vec::new(),
            imports: Vec::new(),
            side_effects: true,
            dynamic_exports: false,
        },
    }
}

pub fn esm(path: &str) -> TestModule {
    new_module(path, "esm")
}

pub fn cjs(path: &str) -> TestModule {
    new_module(path, "cjs")
}

pub fn external(path: &str) -> TestModule {
    new_module(path, "external")
}

pub fn empty(path: &str) -> TestModule {
    new_module(path, "empty")
}

impl TestModule {
    pub fn export(mut self, name: &str) -> Self {
        self.entry.exports.push(name.to_owned());
        self
    }

    pub fn exports(mut self, names: &[&str]) -> Self {
        self.entry.exports.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn default_export(mut self) -> Self {
        self.entry.default_export = true;
        self
    }

    pub fn star(mut self, from: &str) -> Self {
        self.entry.star.push(from.to_owned());
        self
    }

    /// `export { imported as name } from "from"`
    pub fn re_export(mut self, name: &str, from: &str, imported: &str) -> Self {
        self.entry.re_exports.push(ReExportEntry {
            name: name.to_owned(),
            from: from.to_owned(),
            imported: Some(imported.to_owned()),
        });
        self
    }

    /// `export * as name from "from"`
    pub fn re_export_ns(self, name: &str, from: &str) -> Self {
        self.re_export(name, from, "*")
    }

    pub fn import_named(mut self, from: &str, names: &[&str]) -> Self {
        self.entry.imports.push(ImportEntry {
            from: from.to_owned(),
            named: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        });
        self
    }

    pub fn import_default(mut self, from: &str, local: &str) -> Self {
        self.entry.imports.push(ImportEntry {
            from: from.to_owned(),
            default: Some(local.to_owned()),
            ..Default::default()
        });
        self
    }

    pub fn import_ns(mut self, from: &str, local: &str, accesses: &[&str]) -> Self {
        self.entry.imports.push(ImportEntry {
            from: from.to_owned(),
            namespace: Some(local.to_owned()),
            accesses: accesses.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        });
        self
    }

    pub fn side_effect_free(mut self) -> Self {
        self.entry.side_effects = false;
        self
    }

    pub fn dynamic_exports(mut self) -> Self {
        self.entry.dynamic_exports = true;
        self
    }
}

/// Builds a module graph the same way a loaded manifest does.
#[derive(Default)]
pub struct GraphBuilder {
    manifest: Manifest,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(mut self, m: TestModule) -> Self {
        self.manifest.modules.push(m.entry);
        self
    }

    pub fn build(self) -> ModuleGraph {
        must(self.manifest.into_graph())
    }
}

/// Shorthand for a graph from a list of modules.
pub fn graph(modules: Vec<TestModule>) -> ModuleGraph {
    modules
        .into_iter()
        .fold(GraphBuilder::new(), |b, m| b.module(m))
        .build()
}
