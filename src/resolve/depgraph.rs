use petgraph::{algo::tarjan_scc, prelude::DiGraphMap};
use tracing::{debug, info};

use crate::module::{ModuleGraph, ModuleId};

/// Strongly connected components of the export dependency graph. An edge
/// goes from a module to every module whose export table it needs, that is
/// its `export *` and `export {..} from` sources.
pub struct Components {
    /// Members of each component, sorted by module id.
    components: Vec<Vec<ModuleId>>,
    /// Component index of each module.
    component_of: Vec<usize>,
    /// Components each component depends on, excluding itself.
    deps: Vec<Vec<usize>>,
}

impl Components {
    /// Condense the export graph. Components come out dependencies first, so
    /// resolving them in index order never reads an unfinished table from
    /// another component.
    pub fn build(graph: &ModuleGraph) -> Self {
        let mut dag: DiGraphMap<ModuleId, ()> = DiGraphMap::new();

        for m in graph.modules() {
            dag.add_node(m.id);
        }

        for m in graph.modules() {
            let targets = m
                .star_exports
                .iter()
                .copied()
                .chain(m.named_re_exports.iter().map(|r| r.source));

            for dep in targets {
                dag.add_edge(m.id, dep, ());
            }
        }

        let mut components: Vec<Vec<ModuleId>> = tarjan_scc(&dag);
        for c in components.iter_mut() {
            c.sort_unstable();
        }

        let mut component_of = vec![0; graph.len()];
        for (idx, members) in components.iter().enumerate() {
            for &id in members {
                component_of[id] = idx;
            }
        }

        let deps = components
            .iter()
            .enumerate()
            .map(|(idx, members)| {
                let mut deps: Vec<usize> = members
                    .iter()
                    .flat_map(|&id| dag.neighbors(id))
                    .map(|dep| component_of[dep])
                    .filter(|&c| c != idx)
                    .collect();
                deps.sort_unstable();
                deps.dedup();
                deps
            })
            .collect();

        let cyclic = components.iter().filter(|c| c.len() > 1).count();
        info!(
            "Export graph: {} modules, {} components, {} cyclic",
            graph.len(),
            components.len(),
            cyclic
        );

        for c in components.iter().filter(|c| c.len() > 1) {
            debug!(
                "Export cycle: {}",
                c.iter()
                    .map(|id| graph.module(*id).path.as_str())
                    .collect::<Vec<_>>()
                    .join(" -> ")
            );
        }

        Self {
            components,
            component_of,
            deps,
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn members(&self, component: usize) -> &Vec<ModuleId> {
        &self.components[component]
    }

    pub fn component_of(&self, id: ModuleId) -> usize {
        self.component_of[id]
    }

    pub fn deps(&self, component: usize) -> &Vec<usize> {
        &self.deps[component]
    }

    /// Reports whether the module is part of an `export` cycle, including a
    /// module that re-exports itself.
    pub fn is_cyclic(&self, graph: &ModuleGraph, id: ModuleId) -> bool {
        let m = graph.module(id);
        self.members(self.component_of(id)).len() > 1 || m.export_deps().any(|dep| dep == id)
    }
}
