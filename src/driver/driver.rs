use std::{collections::BTreeSet, sync::Arc};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    check::check_graph,
    codegen::{ReExportPlan, RuntimeHelpers, apply_export_mode, emit_re_exports, resolve_export_mode},
    config::{Config, Mode},
    error::{LinkError, Report, Res},
    module::{ImportSpecifier, ModuleGraph, ModuleId, normalize_path},
    namespace::{NamespaceObject, NamespaceSynthesizer},
    resolve::{ExportResolver, ResolvedExportTable},
};

/// Everything one link pass produces. Tables and plans are indexed by module
/// id.
pub struct LinkOutput {
    pub tables: Vec<Arc<ResolvedExportTable>>,
    /// Namespace objects of every module something reads as a namespace.
    pub namespaces: Vec<Arc<NamespaceObject>>,
    pub report: Report,
    pub plans: Vec<ReExportPlan>,
    /// Runtime helpers needed by all plans together.
    pub helpers: RuntimeHelpers,
}

impl LinkOutput {
    pub fn table(&self, id: ModuleId) -> &ResolvedExportTable {
        &self.tables[id]
    }

    pub fn namespace(&self, id: ModuleId) -> Option<&Arc<NamespaceObject>> {
        self.namespaces.iter().find(|ns| ns.module == id)
    }

    pub fn plan(&self, id: ModuleId) -> &ReExportPlan {
        &self.plans[id]
    }

    /// Every table dump, one block per module.
    pub fn dump_tables(&self, graph: &ModuleGraph) -> String {
        let mut s = String::new();
        for table in &self.tables {
            s += &format!("{}\n", graph.module(table.module));
            s += &table.dump(graph);
        }
        s
    }

    /// Every non-empty plan, preceded by the helpers they need.
    pub fn render_plans(&self, graph: &ModuleGraph) -> String {
        let mut s = self.helpers.render();
        for plan in self.plans.iter().filter(|p| !p.is_empty()) {
            s += &format!("// {}\n", graph.module(plan.module).path);
            s += &plan.render(graph);
        }
        s
    }
}

/// Link a module graph: resolve every export table, synthesize the
/// namespaces in use, check every module and emit re-export plans.
pub fn link(graph: &ModuleGraph, config: &Config) -> Res<LinkOutput> {
    info!(
        "Linking {} modules ({}, {})",
        graph.len(),
        config.format,
        config.mode
    );

    let tables = resolve_tables(graph, config);
    let namespaces = synthesize_namespaces(graph, &tables);

    // Conversion never looks across module boundaries, so there is
    // nothing to check.
    let report = match config.mode {
        Mode::Bundle => check_graph(graph, &tables, config.verbose),
        Mode::Convert => Report::default(),
    };

    let mut plans: Vec<ReExportPlan> = tables
        .iter()
        .map(|t| emit_re_exports(graph, t, config.format, config.mode))
        .collect();

    if let Some(entry) = &config.entry {
        let m = graph
            .resolve(normalize_path(entry))
            .ok_or_else(|| LinkError::UnknownEntry(entry.clone()))?;
        let exported: Vec<&str> = tables[m.id].names().map(|n| n.as_str()).collect();
        let mode = resolve_export_mode(config.export_mode, config.format, &m.path, &exported)?;
        apply_export_mode(&mut plans[m.id], mode);
    }

    let mut helpers = RuntimeHelpers::new();
    for plan in &plans {
        helpers.extend_from(&plan.helpers);
    }

    info!(
        "Link done: {} errors, {} namespaces, helpers [{}]",
        report.num_errors(),
        namespaces.len(),
        helpers.names().join(", ")
    );

    Ok(LinkOutput {
        tables,
        namespaces,
        report,
        plans,
        helpers,
    })
}

fn resolve_tables(graph: &ModuleGraph, config: &Config) -> Vec<Arc<ResolvedExportTable>> {
    let mut resolver = ExportResolver::with_max_iterations(graph, config.max_iterations);
    let tables = resolver.resolve_all();

    if config.print_tables {
        for table in &tables {
            println!("{}", graph.module(table.module));
            print!("{}", table.dump(graph));
        }
    }

    tables
}

/// Namespaces are only built for modules read through `import * as` or
/// re-exported with `export * as`.
fn synthesize_namespaces(
    graph: &ModuleGraph,
    tables: &[Arc<ResolvedExportTable>],
) -> Vec<Arc<NamespaceObject>> {
    let mut wanted = BTreeSet::new();
    for m in graph.modules() {
        for r in &m.namespace_re_exports {
            wanted.insert(r.source);
        }
        for import in &m.imports {
            let star = import
                .specifiers
                .iter()
                .any(|s| matches!(s, ImportSpecifier::Namespace { .. }));
            if star {
                wanted.insert(import.source);
            }
        }
    }

    debug!("{} modules read as namespace", wanted.len());
    let synthesizer = NamespaceSynthesizer::new(graph, tables);
    wanted.into_par_iter().for_each(|id| {
        synthesizer.synthesize(id);
    });
    synthesizer.synthesized()
}
