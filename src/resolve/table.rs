use core::fmt;
use std::collections::BTreeMap;

use crate::module::{ModuleGraph, ModuleId, ModuleKind};

/// A local binding of some module.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Binding {
    pub module: ModuleId,
    pub local: String,
}

/// The value an export ultimately refers to. Two exports are the same export
/// exactly when their origins are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Origin {
    Binding(Binding),
    /// The namespace object of a module.
    Namespace(ModuleId),
    /// A property only known once the module has run.
    Dynamic { module: ModuleId, name: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportEntry {
    /// Declared by the module itself.
    Local(Binding),
    /// Re-exported from `module` under `name` there, by name or through a
    /// star. `origin` is where the chain ends.
    ReExport {
        module: ModuleId,
        name: String,
        origin: Origin,
    },
    /// `export * as name from module`
    Namespace(ModuleId),
    /// Two or more star sources disagree. Excluded from further re-export.
    Ambiguous(Vec<ModuleId>),
    /// Property of a CommonJS, external or empty module's exports object.
    CommonJsDynamic { module: ModuleId, name: String },
}

impl ExportEntry {
    /// Underlying value, None for ambiguous entries.
    pub fn origin(&self) -> Option<Origin> {
        match self {
            ExportEntry::Local(binding) => Some(Origin::Binding(binding.clone())),
            ExportEntry::ReExport { origin, .. } => Some(origin.clone()),
            ExportEntry::Namespace(module) => Some(Origin::Namespace(*module)),
            ExportEntry::Ambiguous(_) => None,
            ExportEntry::CommonJsDynamic { module, name } => Some(Origin::Dynamic {
                module: *module,
                name: name.clone(),
            }),
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, ExportEntry::Ambiguous(_))
    }

    /// Reports whether the value can only be read at runtime.
    pub fn is_dynamic(&self) -> bool {
        matches!(self.origin(), Some(Origin::Dynamic { .. }))
    }
}

/// `export { imported as name } from source` where source has no such name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedReExport {
    pub name: String,
    pub source: ModuleId,
    pub imported: String,
}

/// The fully resolved export surface of one module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedExportTable {
    pub module: ModuleId,
    pub kind: ModuleKind,
    /// Sorted by name so two passes print identically.
    pub entries: BTreeMap<String, ExportEntry>,
    /// CommonJS and external modules reached through `export *`, merged at
    /// runtime. Transitive through ES star targets, first seen first.
    pub dynamic_star_sources: Vec<ModuleId>,
    /// Named re-exports whose source lacks the name. Never in entries.
    pub unresolved: Vec<UnresolvedReExport>,
}

impl ResolvedExportTable {
    pub fn new(module: ModuleId, kind: ModuleKind) -> Self {
        Self {
            module,
            kind,
            entries: BTreeMap::new(),
            dynamic_star_sources: Vec::new(),
            unresolved: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ExportEntry> {
        self.entries.get(name)
    }

    /// Names that resolve to a value, ambiguous names excluded.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.entries
            .iter()
            .filter(|(_, e)| !e.is_ambiguous())
            .map(|(name, _)| name)
    }

    pub fn is_ambiguous(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|e| e.is_ambiguous())
    }

    pub fn unresolved(&self, name: &str) -> Option<&UnresolvedReExport> {
        self.unresolved.iter().find(|u| u.name == name)
    }

    /// Reports whether names beyond the static entries may show up at
    /// runtime, either because the module itself is not ES or because it
    /// star-exports from one that isn't.
    pub fn has_dynamic_names(&self) -> bool {
        match self.kind {
            ModuleKind::EsModule => !self.dynamic_star_sources.is_empty(),
            ModuleKind::CommonJs | ModuleKind::External => true,
            ModuleKind::Empty => false,
        }
    }

    /// Create a string dump of the table, one export per line.
    pub fn dump(&self, graph: &ModuleGraph) -> String {
        let path = |id: ModuleId| graph.get(id).map_or("?", |m| m.path.as_str()).to_owned();
        let mut s = String::new();
        s += &format!("| Exports of {}\n", path(self.module));
        s += &format!("| ----------------------\n");
        for (name, entry) in &self.entries {
            let desc = match entry {
                ExportEntry::Local(b) => format!("local {}", b.local),
                ExportEntry::ReExport { module, name, .. } => {
                    format!("re-export {} from {}", name, path(*module))
                }
                ExportEntry::Namespace(module) => format!("namespace of {}", path(*module)),
                ExportEntry::Ambiguous(sources) => format!(
                    "ambiguous ({})",
                    sources.iter().map(|m| path(*m)).collect::<Vec<_>>().join(", ")
                ),
                ExportEntry::CommonJsDynamic { module, name } => {
                    format!("runtime {}.{}", path(*module), name)
                }
            };
            s += &format!("| {:<10} {}\n", name, desc);
        }
        for source in &self.dynamic_star_sources {
            s += &format!("| {:<10} runtime merge of {}\n", "*", path(*source));
        }
        for u in &self.unresolved {
            s += &format!("| {:<10} missing {} in {}\n", u.name, u.imported, path(u.source));
        }
        s
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Binding(b) => write!(f, "binding({}:{})", b.module, b.local),
            Origin::Namespace(m) => write!(f, "namespace({})", m),
            Origin::Dynamic { module, name } => write!(f, "dynamic({}.{})", module, name),
        }
    }
}
