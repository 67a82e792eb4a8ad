use std::{collections::HashMap, fmt::Display};

use indexmap::IndexMap;
use strum_macros::{Display as StrumDisplay, EnumString};

use crate::{
    error::{LinkError, Res},
    module::{ImportRecord, NamedReExport, NamespaceReExport},
};

pub type ModuleId = usize;

pub fn invalid_mod_id() -> ModuleId {
    return usize::MAX;
}

/// How a module exposes its exports. Every resolver branch matches on this
/// exhaustively, so a new kind is a compile-time checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumString)]
pub enum ModuleKind {
    /// Static, declarative import/export syntax. Export names are knowable
    /// without running the module.
    #[strum(serialize = "esm")]
    EsModule,

    /// Exports live on a runtime `exports`/`module.exports` object.
    #[strum(serialize = "cjs")]
    CommonJs,

    /// Left unresolved and kept as a runtime import. Its shape is unknown
    /// until consumer runtime.
    #[strum(serialize = "external")]
    External,

    /// A module with zero statements.
    #[strum(serialize = "empty")]
    Empty,
}

impl ModuleKind {
    /// Reports whether the export names of this kind are statically knowable.
    pub fn is_static(&self) -> bool {
        match self {
            ModuleKind::EsModule => true,
            ModuleKind::CommonJs | ModuleKind::External | ModuleKind::Empty => false,
        }
    }

    /// Non-ES kinds get a synthetic `default` aliasing the exports object.
    pub fn has_interop_default(&self) -> bool {
        !self.is_static()
    }
}

/// A ModuleRecord is the parsed declaration list of one module as handed to
/// the linker by upstream collaborators. It is never mutated after it has
/// been added to the graph.
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    pub id: ModuleId,
    /// Display path used in every diagnostic, eg. foo/index.js
    pub path: String,
    pub kind: ModuleKind,
    /// Exported name to local binding name, in declaration order.
    /// For CommonJS modules these are the detected `exports.name = ...`
    /// assignments.
    pub local_exports: IndexMap<String, String>,
    /// Targets of `export * from`, in declaration order.
    pub star_exports: Vec<ModuleId>,
    /// `export { a as b } from`, in declaration order.
    pub named_re_exports: Vec<NamedReExport>,
    /// `export * as ns from`, in declaration order.
    pub namespace_re_exports: Vec<NamespaceReExport>,
    /// Import statements in source order.
    pub imports: Vec<ImportRecord>,
    /// True only for an explicit `export default`.
    pub has_default_export: bool,
    /// Supplied from package metadata (`sideEffects: false`).
    pub side_effect_free: bool,
    /// CommonJS module whose exports object cannot be enumerated statically,
    /// eg. `module.exports = factory()`.
    pub has_dynamic_exports: bool,
}

impl ModuleRecord {
    /// Reports whether the module declares nothing at all that could end up
    /// on its namespace. This is the "has no exports" case, not merely a
    /// missing name.
    pub fn has_no_exports(&self) -> bool {
        self.local_exports.is_empty()
            && self.star_exports.is_empty()
            && self.named_re_exports.is_empty()
            && self.namespace_re_exports.is_empty()
            && !self.has_dynamic_exports
    }

    /// Every module this one depends on for its export surface.
    pub fn export_deps(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.star_exports
            .iter()
            .copied()
            .chain(self.named_re_exports.iter().map(|r| r.source))
            .chain(self.namespace_re_exports.iter().map(|r| r.source))
    }

    /// Name of the module as used for generated identifiers, eg. foo/bar.js
    /// becomes bar.
    pub fn stem(&self) -> &str {
        let file = self.path.rsplit('/').next().unwrap_or(&self.path);
        file.split('.').next().unwrap_or(file)
    }
}

impl Display for ModuleRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.path, self.kind)
    }
}

pub struct CreateModule {
    pub path: String,
    pub kind: ModuleKind,
    pub local_exports: IndexMap<String, String>,
    pub star_exports: Vec<ModuleId>,
    pub named_re_exports: Vec<NamedReExport>,
    pub namespace_re_exports: Vec<NamespaceReExport>,
    pub imports: Vec<ImportRecord>,
    pub has_default_export: bool,
    pub side_effect_free: bool,
    pub has_dynamic_exports: bool,
}

impl CreateModule {
    pub fn new(path: &str, kind: ModuleKind) -> Self {
        Self {
            path: path.to_owned(),
            kind,
            local_exports: IndexMap::new(),
            star_exports: Vec::new(),
            named_re_exports: Vec::new(),
            namespace_re_exports: Vec::new(),
            imports: Vec::new(),
            has_default_export: false,
            side_effect_free: false,
            has_dynamic_exports: false,
        }
    }
}

/// The ModuleGraph is the record store: one record per module identity,
/// addressable by id or by path.
pub struct ModuleGraph {
    modules: Vec<ModuleRecord>,
    /// Indecies in modules vec
    cache: HashMap<String, ModuleId>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        ModuleGraph {
            modules: Vec::new(),
            cache: HashMap::new(),
        }
    }

    /// Create a new module and add it to the graph.
    pub fn add(&mut self, m: CreateModule) -> Res<&ModuleRecord> {
        if self.cache.contains_key(&m.path) {
            return Err(LinkError::InvalidGraph(format!(
                "module '{}' already declared",
                m.path
            )));
        }

        let id = self.modules.len();
        let mut local_exports = m.local_exports;
        if m.has_default_export && !local_exports.contains_key("default") {
            local_exports.insert("default".to_owned(), "default".to_owned());
        }

        self.modules.push(ModuleRecord {
            id,
            path: m.path,
            kind: m.kind,
            local_exports,
            star_exports: m.star_exports,
            named_re_exports: m.named_re_exports,
            namespace_re_exports: m.namespace_re_exports,
            imports: m.imports,
            has_default_export: m.has_default_export,
            side_effect_free: m.side_effect_free,
            has_dynamic_exports: m.has_dynamic_exports,
        });

        let module = &self.modules[id];
        self.cache.insert(module.path.clone(), id);
        Ok(module)
    }

    pub fn get(&self, id: ModuleId) -> Option<&ModuleRecord> {
        assert!(id != invalid_mod_id(), "invalid mod id");
        self.modules.get(id)
    }

    /// Like get but for ids that came out of this graph. Panics on foreign ids.
    pub fn module(&self, id: ModuleId) -> &ModuleRecord {
        self.get(id)
            .unwrap_or_else(|| panic!("module id {} not in graph", id))
    }

    /// Resolve a module path to its record.
    pub fn resolve(&self, path: &str) -> Option<&ModuleRecord> {
        self.cache.get(path).map(|id| &self.modules[*id])
    }

    pub fn modules(&self) -> &Vec<ModuleRecord> {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Check that every module id referenced by a record exists.
    pub fn validate(&self) -> Res<()> {
        for m in &self.modules {
            let imported = m.imports.iter().map(|i| i.source);
            for dep in m.export_deps().chain(imported) {
                if dep >= self.modules.len() {
                    return Err(LinkError::InvalidGraph(format!(
                        "module '{}' references unknown module id {}",
                        m.path, dep
                    )));
                }
            }
        }
        Ok(())
    }
}
