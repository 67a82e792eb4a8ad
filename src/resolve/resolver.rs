use std::{collections::BTreeMap, sync::Arc};

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::{
    module::{ModuleGraph, ModuleId, ModuleKind, ModuleRecord},
    resolve::{Binding, Components, ExportEntry, Origin, ResolvedExportTable, UnresolvedReExport},
};

pub const DEFAULT_MAX_ITERATIONS: usize = 64;

/// Memo slot of one module.
enum Slot {
    NotStarted,
    /// The module's component is being iterated. Holds the table of the
    /// latest iteration, which starts out empty: a module asking for its own
    /// table mid-resolution sees this pending marker instead of recursing.
    InProgress(ResolvedExportTable),
    Done(Arc<ResolvedExportTable>),
}

/// The ExportResolver computes the resolved export table of every module,
/// at most once per module per link pass.
pub struct ExportResolver<'g> {
    graph: &'g ModuleGraph,
    components: Components,
    slots: Vec<Slot>,
    max_iterations: usize,
}

impl<'g> ExportResolver<'g> {
    pub fn new(graph: &'g ModuleGraph) -> Self {
        Self::with_max_iterations(graph, DEFAULT_MAX_ITERATIONS)
    }

    pub fn with_max_iterations(graph: &'g ModuleGraph, max_iterations: usize) -> Self {
        Self {
            graph,
            components: Components::build(graph),
            slots: (0..graph.len()).map(|_| Slot::NotStarted).collect(),
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn graph(&self) -> &'g ModuleGraph {
        self.graph
    }

    /// Resolve the export table of a module, resolving the components it
    /// depends on first. Uses an explicit work stack so the depth of an
    /// `export *` chain never turns into call depth.
    pub fn resolve(&mut self, id: ModuleId) -> Arc<ResolvedExportTable> {
        if let Slot::Done(table) = &self.slots[id] {
            return table.clone();
        }

        let mut stack = vec![(self.components.component_of(id), false)];
        while let Some((component, expanded)) = stack.pop() {
            if self.is_component_done(component) {
                continue;
            }

            if expanded {
                self.resolve_component(component);
                continue;
            }

            stack.push((component, true));
            for &dep in self.components.deps(component).iter().rev() {
                if !self.is_component_done(dep) {
                    stack.push((dep, false));
                }
            }
        }

        match &self.slots[id] {
            Slot::Done(table) => table.clone(),
            _ => unreachable!("component of module {} left unresolved", id),
        }
    }

    /// Resolve every module in the graph, returning the tables in id order.
    pub fn resolve_all(&mut self) -> Vec<Arc<ResolvedExportTable>> {
        for component in 0..self.components.len() {
            if !self.is_component_done(component) {
                self.resolve_component(component);
            }
        }
        (0..self.graph.len()).map(|id| self.resolve(id)).collect()
    }

    fn is_component_done(&self, component: usize) -> bool {
        let first = self.components.members(component)[0];
        matches!(self.slots[first], Slot::Done(_))
    }

    /// Iterate the tables of one component to a fixed point. Every table
    /// outside the component is already done.
    fn resolve_component(&mut self, component: usize) {
        let members = self.components.members(component).clone();
        for &id in &members {
            let m = self.graph.module(id);
            self.slots[id] = Slot::InProgress(ResolvedExportTable::new(id, m.kind));
        }

        let cyclic = members.len() > 1 || self.components.is_cyclic(self.graph, members[0]);
        let mut iterations = 0;

        loop {
            iterations += 1;
            let mut changed = false;

            for &id in &members {
                let table = build_table(self.graph, self.graph.module(id), &|dep| self.peek(dep));
                if let Slot::InProgress(prev) = &self.slots[id] {
                    if *prev != table {
                        changed = true;
                    }
                }
                self.slots[id] = Slot::InProgress(table);
            }

            // Acyclic components are final after one pass.
            if !cyclic || !changed {
                break;
            }

            if iterations >= self.max_iterations {
                warn!(
                    "Export cycle through {} did not settle after {} iterations",
                    self.graph.module(members[0]).path,
                    iterations
                );
                break;
            }
        }

        if cyclic {
            debug!(
                "Resolved export cycle of {} modules in {} iterations",
                members.len(),
                iterations
            );
        }

        for &id in &members {
            let slot = std::mem::replace(&mut self.slots[id], Slot::NotStarted);
            self.slots[id] = match slot {
                Slot::InProgress(table) => Slot::Done(Arc::new(table)),
                other => other,
            };
        }
    }

    /// Table of a module as far as it is known right now.
    fn peek(&self, id: ModuleId) -> Option<&ResolvedExportTable> {
        match &self.slots[id] {
            Slot::Done(table) => Some(table),
            Slot::InProgress(table) => Some(table),
            Slot::NotStarted => {
                trace!("Read of unresolved module {}", id);
                None
            }
        }
    }
}

/// Compute the table of one module from the tables of its dependencies.
/// Precedence: local exports, then named re-exports in declaration order,
/// then star exports in declaration order.
pub fn build_table<'a>(
    graph: &ModuleGraph,
    m: &ModuleRecord,
    tables: &dyn Fn(ModuleId) -> Option<&'a ResolvedExportTable>,
) -> ResolvedExportTable {
    let mut table = ResolvedExportTable::new(m.id, m.kind);

    match m.kind {
        ModuleKind::EsModule => {}
        ModuleKind::CommonJs => {
            for name in m.local_exports.keys() {
                table.entries.insert(name.clone(), dynamic(m.id, name));
            }
            table
                .entries
                .entry("default".to_owned())
                .or_insert_with(|| dynamic(m.id, "default"));
            return table;
        }
        ModuleKind::External | ModuleKind::Empty => {
            table
                .entries
                .insert("default".to_owned(), dynamic(m.id, "default"));
            return table;
        }
    }

    for (name, local) in &m.local_exports {
        table.entries.insert(
            name.clone(),
            ExportEntry::Local(Binding {
                module: m.id,
                local: local.clone(),
            }),
        );
    }

    for r in &m.named_re_exports {
        // First declaration of a name wins.
        if table.entries.contains_key(&r.name) || table.unresolved(&r.name).is_some() {
            continue;
        }

        match lookup_named(graph, r.source, &r.imported, tables) {
            Some(entry) => {
                table.entries.insert(r.name.clone(), entry);
            }
            None => table.unresolved.push(UnresolvedReExport {
                name: r.name.clone(),
                source: r.source,
                imported: r.imported.clone(),
            }),
        }
    }

    for r in &m.namespace_re_exports {
        if table.entries.contains_key(&r.name) || table.unresolved(&r.name).is_some() {
            continue;
        }
        table
            .entries
            .insert(r.name.clone(), ExportEntry::Namespace(r.source));
    }

    merge_star_exports(graph, m, &mut table, tables);
    table
}

/// Look up a name requested by `export { name } from source`.
fn lookup_named<'a>(
    graph: &ModuleGraph,
    source: ModuleId,
    name: &str,
    tables: &dyn Fn(ModuleId) -> Option<&'a ResolvedExportTable>,
) -> Option<ExportEntry> {
    let src = graph.module(source);

    match src.kind {
        ModuleKind::EsModule => {
            let table = tables(source)?;
            match table.get(name) {
                Some(ExportEntry::Ambiguous(sources)) => {
                    Some(ExportEntry::Ambiguous(sources.clone()))
                }
                Some(entry) => Some(ExportEntry::ReExport {
                    module: source,
                    name: name.to_owned(),
                    origin: entry.origin()?,
                }),
                // Might be provided by a star source that is only known at
                // runtime. The first one is assumed, like a runtime lookup.
                None => table.dynamic_star_sources.first().map(|&ext| ExportEntry::ReExport {
                    module: source,
                    name: name.to_owned(),
                    origin: Origin::Dynamic {
                        module: ext,
                        name: name.to_owned(),
                    },
                }),
            }
        }
        ModuleKind::CommonJs | ModuleKind::External | ModuleKind::Empty => {
            Some(dynamic(source, name))
        }
    }
}

/// Merge the names of every `export *` target into the table. Names already
/// claimed explicitly are skipped, `default` is never re-exported, and a
/// name two targets disagree on becomes ambiguous.
fn merge_star_exports<'a>(
    graph: &ModuleGraph,
    m: &ModuleRecord,
    table: &mut ResolvedExportTable,
    tables: &dyn Fn(ModuleId) -> Option<&'a ResolvedExportTable>,
) {
    let mut contributions: BTreeMap<String, IndexMap<Origin, ModuleId>> = BTreeMap::new();

    for &target in &m.star_exports {
        // Re-exporting all of itself adds nothing.
        if target == m.id {
            continue;
        }

        match graph.module(target).kind {
            ModuleKind::EsModule => {
                let Some(t) = tables(target) else {
                    continue; // pending, next iteration
                };

                for (name, entry) in &t.entries {
                    if name == "default" || entry.is_ambiguous() {
                        continue;
                    }
                    if table.entries.contains_key(name) || table.unresolved(name).is_some() {
                        continue;
                    }
                    if let Some(origin) = entry.origin() {
                        contributions
                            .entry(name.clone())
                            .or_default()
                            .entry(origin)
                            .or_insert(target);
                    }
                }

                for &source in &t.dynamic_star_sources {
                    if source != m.id && !table.dynamic_star_sources.contains(&source) {
                        table.dynamic_star_sources.push(source);
                    }
                }
            }
            ModuleKind::CommonJs | ModuleKind::External => {
                if !table.dynamic_star_sources.contains(&target) {
                    table.dynamic_star_sources.push(target);
                }
            }
            // Nothing to offer.
            ModuleKind::Empty => {}
        }
    }

    for (name, origins) in contributions {
        let entry = if origins.len() > 1 {
            let mut sources: Vec<ModuleId> = origins.into_values().collect();
            sources.sort_unstable();
            sources.dedup();
            ExportEntry::Ambiguous(sources)
        } else if let Some((origin, target)) = origins.into_iter().next() {
            ExportEntry::ReExport {
                module: target,
                name: name.clone(),
                origin,
            }
        } else {
            continue;
        };
        table.entries.insert(name, entry);
    }
}

fn dynamic(module: ModuleId, name: &str) -> ExportEntry {
    ExportEntry::CommonJsDynamic {
        module,
        name: name.to_owned(),
    }
}
