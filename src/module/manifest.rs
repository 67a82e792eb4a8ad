use std::{collections::HashMap, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{LinkError, Res},
    module::{
        CreateModule, ImportRecord, ImportSpecifier, ModuleGraph, ModuleId, ModuleKind,
        NamedReExport, NamespaceReExport,
    },
    util::read_file,
};

/// The graph manifest handed over by the parsing and path resolution stages:
/// every module with its declarations, module references given by path.
///
/// ```toml
/// [[module]]
/// path = "entry.js"
/// exports = ["foo"]
/// star = ["foo.js"]
///
/// [[module.import]]
/// from = "foo.js"
/// namespace = "ns"
/// accesses = ["bar"]
/// ```
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleEntry {
    pub path: String,
    /// esm | cjs | external | empty
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Local exports. Exporting "default" implies an explicit default export.
    #[serde(default)]
    pub exports: Vec<String>,
    #[serde(default)]
    pub default_export: bool,
    /// Targets of `export * from`.
    #[serde(default)]
    pub star: Vec<String>,
    #[serde(default, rename = "re-export")]
    pub re_exports: Vec<ReExportEntry>,
    #[serde(default, rename = "import")]
    pub imports: Vec<ImportEntry>,
    #[serde(default = "default_true")]
    pub side_effects: bool,
    #[serde(default)]
    pub dynamic_exports: bool,
}

/// `export { imported as name } from "from"`. An imported name of "*" is
/// `export * as name from "from"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReExportEntry {
    pub name: String,
    pub from: String,
    #[serde(default)]
    pub imported: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportEntry {
    pub from: String,
    /// Local name of a default import.
    #[serde(default)]
    pub default: Option<String>,
    /// Local name of a namespace import.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Properties read off the namespace, in source order.
    #[serde(default)]
    pub accesses: Vec<String>,
    #[serde(default)]
    pub named: Vec<String>,
}

fn default_kind() -> String {
    ModuleKind::EsModule.to_string()
}

fn default_true() -> bool {
    true
}

/// Module references may be written relative ("./foo.js") or rooted
/// ("/foo.js"); both name the same module as "foo.js".
pub fn normalize_path(path: &str) -> &str {
    path.trim_start_matches("./").trim_start_matches('/')
}

impl Manifest {
    pub fn parse(src: &str, filepath: &str) -> Res<Manifest> {
        toml::from_str(src).map_err(|e| LinkError::toml(filepath, e))
    }

    pub fn load(filepath: &str) -> Res<Manifest> {
        debug!("Loading manifest: {}", filepath);
        Self::parse(&read_file(filepath)?, filepath)
    }

    /// Turn the manifest into a module graph. Module ids follow manifest
    /// order.
    pub fn into_graph(self) -> Res<ModuleGraph> {
        let mut index: HashMap<String, ModuleId> = HashMap::new();
        for (id, entry) in self.modules.iter().enumerate() {
            let path = normalize_path(&entry.path).to_owned();
            if index.insert(path.clone(), id).is_some() {
                return Err(LinkError::InvalidGraph(format!(
                    "module '{}' is declared more than once",
                    path
                )));
            }
        }

        let mut graph = ModuleGraph::new();
        for entry in self.modules {
            let module = create_module(entry, &index)?;
            graph.add(module)?;
        }

        graph.validate()?;
        info!("Loaded module graph with {} modules", graph.len());
        Ok(graph)
    }
}

fn create_module(entry: ModuleEntry, index: &HashMap<String, ModuleId>) -> Res<CreateModule> {
    let path = normalize_path(&entry.path).to_owned();
    let kind = ModuleKind::from_str(&entry.kind).map_err(|_| LinkError::InvalidOption {
        option: "kind",
        value: entry.kind.clone(),
    })?;

    let lookup = |target: &str| -> Res<ModuleId> {
        index
            .get(normalize_path(target))
            .copied()
            .ok_or_else(|| LinkError::UnknownModule {
                importer: path.clone(),
                path: target.to_owned(),
            })
    };

    let mut m = CreateModule::new(&path, kind);
    m.has_default_export = entry.default_export || entry.exports.iter().any(|e| e == "default");
    m.side_effect_free = !entry.side_effects;
    m.has_dynamic_exports = entry.dynamic_exports;

    for name in &entry.exports {
        m.local_exports.insert(name.clone(), name.clone());
    }

    for target in &entry.star {
        m.star_exports.push(lookup(target)?);
    }

    for r in &entry.re_exports {
        let source = lookup(&r.from)?;
        match r.imported.as_deref() {
            Some("*") => m.namespace_re_exports.push(NamespaceReExport {
                name: r.name.clone(),
                source,
            }),
            imported => m.named_re_exports.push(NamedReExport::new(
                &r.name,
                source,
                imported.unwrap_or(&r.name),
            )),
        }
    }

    for i in &entry.imports {
        let mut record = ImportRecord::new(lookup(&i.from)?);
        if let Some(local) = &i.default {
            record = record.default(local);
        }
        if let Some(local) = &i.namespace {
            record.specifiers.push(ImportSpecifier::Namespace {
                local: local.clone(),
                accesses: i.accesses.clone(),
            });
        }
        for name in &i.named {
            record = record.named(name);
        }
        m.imports.push(record);
    }

    Ok(m)
}
