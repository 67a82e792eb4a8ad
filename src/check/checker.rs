use std::{collections::HashSet, sync::Arc};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    error::{DiagnosticKind, Diagnostics, Report},
    module::{ImportRecord, ImportSpecifier, ModuleGraph, ModuleId, ModuleKind, ModuleRecord},
    resolve::{ExportEntry, ResolvedExportTable},
};

/// Check every module of a resolved graph, in parallel, and merge the
/// per-module buffers into one ordered report.
pub fn check_graph(
    graph: &ModuleGraph,
    tables: &[Arc<ResolvedExportTable>],
    verbose: bool,
) -> Report {
    let checker = Checker::new(graph, tables);
    let buffers: Vec<Diagnostics> = (0..graph.len())
        .into_par_iter()
        .map(|id| checker.check_module(id))
        .collect();

    let report = Report::merge(buffers, verbose);
    info!(
        "Checked {} modules: {} errors, {} diagnostics",
        graph.len(),
        report.num_errors(),
        report.len()
    );
    report
}

/// The Checker classifies the resolution outcome of every import and
/// re-export of a module. It only reads finished tables.
pub struct Checker<'a> {
    graph: &'a ModuleGraph,
    tables: &'a [Arc<ResolvedExportTable>],
}

impl<'a> Checker<'a> {
    pub fn new(graph: &'a ModuleGraph, tables: &'a [Arc<ResolvedExportTable>]) -> Self {
        assert_eq!(graph.len(), tables.len(), "one table per module");
        Self { graph, tables }
    }

    /// Diagnostics produced by one module: its own named re-exports in
    /// declaration order, then its imports in source order.
    pub fn check_module(&self, id: ModuleId) -> Diagnostics {
        let m = self.graph.module(id);
        let mut diag = Diagnostics::new(id);

        if m.kind == ModuleKind::EsModule {
            self.check_re_exports(m, &mut diag);
        }

        for import in &m.imports {
            self.check_import(m, import, &mut diag);
        }

        if !diag.is_empty() {
            debug!("{} diagnostics from {}", diag.len(), m.path);
        }
        diag
    }

    fn check_re_exports(&self, m: &ModuleRecord, diag: &mut Diagnostics) {
        let table = &self.tables[m.id];
        let mut seen = HashSet::new();

        for r in &m.named_re_exports {
            if !seen.insert(r.name.as_str()) || m.local_exports.contains_key(&r.name) {
                continue;
            }

            if let Some(u) = table.unresolved(&r.name) {
                let kind = if self.is_circular(m.id, &r.name) {
                    DiagnosticKind::CircularReExport {
                        name: r.name.clone(),
                        exporter: m.path.clone(),
                    }
                } else {
                    DiagnosticKind::MissingExport {
                        source: self.path(u.source),
                        name: u.imported.clone(),
                    }
                };
                diag.add(m, kind, Some(u.source));
            } else if table.is_ambiguous(&r.name) {
                diag.add(
                    m,
                    DiagnosticKind::AmbiguousImport {
                        name: r.imported.clone(),
                    },
                    Some(r.source),
                );
            }
        }
    }

    fn check_import(&self, m: &ModuleRecord, import: &ImportRecord, diag: &mut Diagnostics) {
        for spec in &import.specifiers {
            match spec {
                ImportSpecifier::Named { imported, .. } => {
                    self.check_named_import(m, import.source, imported, diag)
                }
                ImportSpecifier::Namespace { accesses, .. } => {
                    for name in accesses {
                        self.check_namespace_access(m, import.source, name, diag);
                    }
                }
            }
        }
    }

    /// `import { name } from source`
    fn check_named_import(
        &self,
        m: &ModuleRecord,
        source: ModuleId,
        name: &str,
        diag: &mut Diagnostics,
    ) {
        let src = self.graph.module(source);
        let table = &self.tables[source];

        match src.kind {
            ModuleKind::EsModule => match table.get(name) {
                Some(ExportEntry::Ambiguous(_)) => diag.add(
                    m,
                    DiagnosticKind::AmbiguousImport {
                        name: name.to_owned(),
                    },
                    Some(source),
                ),
                Some(_) => {}
                None if table.unresolved(name).is_some() => self.trace(source, name, diag),
                None if !table.dynamic_star_sources.is_empty() => {
                    // Looked up at runtime on the first external namespace.
                    let sources = &table.dynamic_star_sources;
                    if sources.len() > 1 {
                        diag.add(
                            m,
                            DiagnosticKind::AmbiguousExternalNamespaces {
                                reexporter: src.path.clone(),
                                binding: name.to_owned(),
                                sources: sources.iter().map(|&s| self.path(s)).collect(),
                                used: self.path(sources[0]),
                            },
                            Some(source),
                        );
                    }
                }
                None => diag.add(
                    m,
                    DiagnosticKind::MissingExport {
                        source: src.path.clone(),
                        name: name.to_owned(),
                    },
                    Some(source),
                ),
            },
            ModuleKind::CommonJs | ModuleKind::Empty => {
                if table.get(name).is_none() && !src.has_dynamic_exports {
                    diag.add(
                        m,
                        DiagnosticKind::UndefinedImport {
                            source: src.path.clone(),
                            name: name.to_owned(),
                        },
                        Some(source),
                    );
                }
            }
            // Bound at runtime by the host.
            ModuleKind::External => {}
        }
    }

    /// `ns.name` where `import * as ns from source`
    fn check_namespace_access(
        &self,
        m: &ModuleRecord,
        source: ModuleId,
        name: &str,
        diag: &mut Diagnostics,
    ) {
        let src = self.graph.module(source);
        let table = &self.tables[source];

        if src.kind == ModuleKind::External {
            return;
        }

        if src.kind == ModuleKind::EsModule && table.unresolved(name).is_some() {
            self.trace(source, name, diag);
            return;
        }

        let undefined = DiagnosticKind::UndefinedImport {
            source: src.path.clone(),
            name: name.to_owned(),
        };

        if name == "default" {
            // An ES module can also get its default through a re-export.
            let has_default = match src.kind {
                ModuleKind::EsModule => table.get("default").is_some_and(|e| !e.is_ambiguous()),
                _ => src.has_default_export,
            };
            if !has_default {
                diag.add(m, undefined, Some(source));
            }
            return;
        }

        let defined = match src.kind {
            ModuleKind::EsModule => table.get(name).is_some_and(|e| !e.is_ambiguous()),
            _ => src.local_exports.contains_key(name),
        };
        if defined {
            return;
        }

        // Names beyond the static ones may exist at runtime.
        let open = match src.kind {
            ModuleKind::EsModule => table.has_dynamic_names(),
            _ => src.has_dynamic_exports,
        };

        if src.has_no_exports() {
            diag.add(
                m,
                DiagnosticKind::NoExports {
                    source: src.path.clone(),
                    name: name.to_owned(),
                },
                Some(source),
            );
        } else if !open {
            diag.add(m, undefined, Some(source));
        }
    }

    /// Emit an error at every failing hop of a named re-export chain,
    /// starting at `name` in module `id`. Each error is attributed to the
    /// module owning the hop.
    fn trace(&self, id: ModuleId, name: &str, diag: &mut Diagnostics) {
        let (mut id, mut name) = (id, name.to_owned());

        while let Some(u) = self.tables[id].unresolved(&name) {
            let hop = self.graph.module(id);
            if self.is_circular(id, &name) {
                diag.add(
                    hop,
                    DiagnosticKind::CircularReExport {
                        name: name.clone(),
                        exporter: hop.path.clone(),
                    },
                    Some(u.source),
                );
                return;
            }

            diag.add(
                hop,
                DiagnosticKind::MissingExport {
                    source: self.path(u.source),
                    name: u.imported.clone(),
                },
                Some(u.source),
            );

            if self.graph.module(u.source).kind != ModuleKind::EsModule {
                return;
            }
            (id, name) = (u.source, u.imported.clone());
        }
    }

    /// Reports whether following the named re-export of `name` in module
    /// `id` leads back to where it started without reaching a binding.
    fn is_circular(&self, id: ModuleId, name: &str) -> bool {
        let start = (id, name.to_owned());
        let mut visited = HashSet::new();
        let mut at = start.clone();

        while let Some(u) = self.tables[at.0].unresolved(&at.1) {
            if !visited.insert(at.clone()) {
                return false;
            }
            at = (u.source, u.imported.clone());
            if at == start {
                return true;
            }
        }
        false
    }

    fn path(&self, id: ModuleId) -> String {
        self.graph.module(id).path.clone()
    }
}
