use std::{collections::BTreeMap, sync::Arc};

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::{
    module::{ModuleGraph, ModuleId, ModuleKind},
    resolve::{Origin, ResolvedExportTable},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NamespaceProperty {
    /// Statically resolved export of an ES module.
    Export(Origin),
    /// Property of a non-ES module's exports object, eg. `exports.name`.
    Runtime(String),
    /// `default` aliasing the whole exports object of a non-ES module.
    SyntheticDefault,
}

/// The `import * as ns` view of one module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceObject {
    pub module: ModuleId,
    pub kind: ModuleKind,
    pub properties: BTreeMap<String, NamespaceProperty>,
    pub has_synthetic_default: bool,
    /// Properties beyond the static ones may exist at runtime.
    pub is_open: bool,
    /// Modules whose exports are merged into the namespace at runtime.
    pub dynamic_sources: Vec<ModuleId>,
    pub side_effect_free: bool,
}

impl NamespaceObject {
    pub fn get(&self, name: &str) -> Option<&NamespaceProperty> {
        self.properties.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.properties.keys()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn dump(&self, graph: &ModuleGraph) -> String {
        let path = |id: ModuleId| graph.get(id).map_or("?", |m| m.path.as_str()).to_owned();
        let mut s = String::new();
        s += &format!("| Namespace of {}\n", path(self.module));
        s += &format!("| ----------------------\n");
        for (name, prop) in &self.properties {
            let desc = match prop {
                NamespaceProperty::Export(Origin::Binding(b)) => {
                    format!("{} in {}", b.local, path(b.module))
                }
                NamespaceProperty::Export(Origin::Namespace(m)) => {
                    format!("namespace of {}", path(*m))
                }
                NamespaceProperty::Export(Origin::Dynamic { module, name }) => {
                    format!("runtime {}.{}", path(*module), name)
                }
                NamespaceProperty::Runtime(name) => format!("exports.{}", name),
                NamespaceProperty::SyntheticDefault => "module.exports".to_owned(),
            };
            s += &format!("| {:<10} {}\n", name, desc);
        }
        for source in &self.dynamic_sources {
            s += &format!("| {:<10} runtime merge of {}\n", "*", path(*source));
        }
        s
    }
}

/// Build the namespace object of a module from its resolved table.
pub fn synthesize_namespace(graph: &ModuleGraph, table: &ResolvedExportTable) -> NamespaceObject {
    let m = graph.module(table.module);
    let mut ns = NamespaceObject {
        module: m.id,
        kind: m.kind,
        properties: BTreeMap::new(),
        has_synthetic_default: false,
        is_open: table.has_dynamic_names(),
        dynamic_sources: Vec::new(),
        side_effect_free: m.side_effect_free,
    };

    match m.kind {
        ModuleKind::EsModule => {
            for (name, entry) in &table.entries {
                // Ambiguous names have no origin and are left out.
                if let Some(origin) = entry.origin() {
                    ns.properties
                        .insert(name.clone(), NamespaceProperty::Export(origin));
                }
            }
            ns.dynamic_sources = table.dynamic_star_sources.clone();
        }
        ModuleKind::CommonJs | ModuleKind::External | ModuleKind::Empty => {
            for name in m.local_exports.keys() {
                ns.properties
                    .insert(name.clone(), NamespaceProperty::Runtime(name.clone()));
            }
            if m.kind.has_interop_default() && !ns.has("default") {
                ns.properties
                    .insert("default".to_owned(), NamespaceProperty::SyntheticDefault);
                ns.has_synthetic_default = true;
            }
        }
    }

    ns
}

/// Lazily builds and caches the namespace object of each module for one
/// link pass. Safe to share between threads.
pub struct NamespaceSynthesizer<'a> {
    graph: &'a ModuleGraph,
    tables: &'a [Arc<ResolvedExportTable>],
    cells: Vec<OnceCell<Arc<NamespaceObject>>>,
}

impl<'a> NamespaceSynthesizer<'a> {
    /// Tables must be indexed by module id, as returned by resolve_all.
    pub fn new(graph: &'a ModuleGraph, tables: &'a [Arc<ResolvedExportTable>]) -> Self {
        assert_eq!(graph.len(), tables.len(), "one table per module");
        Self {
            graph,
            tables,
            cells: (0..graph.len()).map(|_| OnceCell::new()).collect(),
        }
    }

    pub fn synthesize(&self, id: ModuleId) -> Arc<NamespaceObject> {
        self.cells[id]
            .get_or_init(|| {
                debug!("Synthesizing namespace of {}", self.graph.module(id).path);
                Arc::new(synthesize_namespace(self.graph, &self.tables[id]))
            })
            .clone()
    }

    /// Namespace object if it has been requested before.
    pub fn get(&self, id: ModuleId) -> Option<Arc<NamespaceObject>> {
        self.cells.get(id).and_then(|c| c.get().cloned())
    }

    /// All namespace objects requested so far, by module id.
    pub fn synthesized(&self) -> Vec<Arc<NamespaceObject>> {
        self.cells.iter().filter_map(|c| c.get().cloned()).collect()
    }
}
