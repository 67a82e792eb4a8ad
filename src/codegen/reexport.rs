use tracing::{debug, trace};

use crate::{
    codegen::{RuntimeHelper, RuntimeHelpers, plan_to_string},
    config::{ExportMode, Mode, OutputFormat},
    module::{ModuleGraph, ModuleId, ModuleKind, ModuleRecord},
    resolve::{ExportEntry, Origin, ResolvedExportTable},
};

/// One construct realizing a re-export in the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReExportIns {
    /// Statically resolved. The exported name aliases the binding directly.
    Alias {
        exported: String,
        module: ModuleId,
        local: String,
    },
    /// `export * from "source"` kept as native syntax.
    ExportStarFrom { source: ModuleId },
    /// `export { imported as exported } from "source"` kept as native syntax.
    ExportNamedFrom {
        source: ModuleId,
        imported: String,
        exported: String,
    },
    /// Copy every enumerable own property of source at runtime, except
    /// `default` and the names in skip.
    RuntimeMerge {
        source: ModuleId,
        skip: Vec<String>,
        helper: RuntimeHelper,
    },
    /// Property read off a runtime exports object.
    RuntimeProperty {
        exported: String,
        source: ModuleId,
        name: String,
    },
    /// `export * as exported from "source"`
    NamespaceBinding { exported: String, source: ModuleId },
    /// Named re-export of a name the source lacks.
    Undefined { exported: String },
    /// `module.exports = exports.default`
    DefaultExportShim,
}

/// Re-export instructions of one module for one output format and mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReExportPlan {
    pub module: ModuleId,
    pub format: OutputFormat,
    pub mode: Mode,
    /// Set for the entry module of CommonJS and IIFE output.
    pub export_mode: Option<ExportMode>,
    pub ins: Vec<ReExportIns>,
    pub helpers: RuntimeHelpers,
}

impl ReExportPlan {
    fn new(module: ModuleId, format: OutputFormat, mode: Mode) -> Self {
        Self {
            module,
            format,
            mode,
            export_mode: None,
            ins: Vec::new(),
            helpers: RuntimeHelpers::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ins.is_empty()
    }

    fn push(&mut self, ins: ReExportIns) {
        trace!("Emit {:?}", ins);
        self.ins.push(ins);
    }

    /// Mark the helpers every instruction needs in this plan's format.
    fn collect_helpers(&mut self, graph: &ModuleGraph) {
        let getters = self.format.needs_runtime_merge();
        let mut helpers = RuntimeHelpers::new();

        for ins in &self.ins {
            match ins {
                ReExportIns::RuntimeMerge { helper, .. } => helpers.use_helper(*helper),
                ReExportIns::NamespaceBinding { source, .. } => {
                    if getters {
                        helpers.use_helper(RuntimeHelper::Export);
                    }
                    let es = graph.module(*source).kind == ModuleKind::EsModule;
                    match self.mode {
                        Mode::Convert if getters => helpers.use_helper(RuntimeHelper::ToEsm),
                        Mode::Convert => {}
                        Mode::Bundle if es => helpers.use_helper(RuntimeHelper::Export),
                        Mode::Bundle => helpers.use_helper(RuntimeHelper::ToEsm),
                    }
                }
                ReExportIns::Alias { .. }
                | ReExportIns::RuntimeProperty { .. }
                | ReExportIns::Undefined { .. } => {
                    if getters {
                        helpers.use_helper(RuntimeHelper::Export);
                    }
                }
                ReExportIns::ExportStarFrom { .. }
                | ReExportIns::ExportNamedFrom { .. }
                | ReExportIns::DefaultExportShim => {}
            }
        }

        self.helpers = helpers;
    }

    pub fn render(&self, graph: &ModuleGraph) -> String {
        plan_to_string(self, graph)
    }
}

/// Decide the constructs that realize every re-export of a module.
pub fn emit_re_exports(
    graph: &ModuleGraph,
    table: &ResolvedExportTable,
    format: OutputFormat,
    mode: Mode,
) -> ReExportPlan {
    let m = graph.module(table.module);
    let mut plan = ReExportPlan::new(m.id, format, mode);

    match mode {
        Mode::Convert => emit_converted(m, &mut plan),
        Mode::Bundle => emit_bundled(graph, table, &mut plan),
    }
    plan.collect_helpers(graph);

    debug!(
        "{} re-export instructions for {} ({}, {})",
        plan.ins.len(),
        m.path,
        format,
        mode
    );
    plan
}

/// Conversion rewrites each declaration on its own without looking at any
/// other module.
fn emit_converted(m: &ModuleRecord, plan: &mut ReExportPlan) {
    let native = !plan.format.needs_runtime_merge();

    for r in &m.named_re_exports {
        plan.push(if native {
            ReExportIns::ExportNamedFrom {
                source: r.source,
                imported: r.imported.clone(),
                exported: r.name.clone(),
            }
        } else {
            ReExportIns::RuntimeProperty {
                exported: r.name.clone(),
                source: r.source,
                name: r.imported.clone(),
            }
        });
    }

    for r in &m.namespace_re_exports {
        plan.push(ReExportIns::NamespaceBinding {
            exported: r.name.clone(),
            source: r.source,
        });
    }

    for &source in &m.star_exports {
        plan.push(if native {
            ReExportIns::ExportStarFrom { source }
        } else {
            ReExportIns::RuntimeMerge {
                source,
                skip: Vec::new(),
                helper: RuntimeHelper::ReExport,
            }
        });
    }
}

fn emit_bundled(graph: &ModuleGraph, table: &ResolvedExportTable, plan: &mut ReExportPlan) {
    let native = !plan.format.needs_runtime_merge();

    for (name, entry) in &table.entries {
        let ins = match entry {
            // Own bindings and ambiguous names need no re-export.
            ExportEntry::Local(_) | ExportEntry::Ambiguous(_) => continue,
            ExportEntry::Namespace(source) => ReExportIns::NamespaceBinding {
                exported: name.clone(),
                source: *source,
            },
            ExportEntry::ReExport { origin, .. } => match origin {
                Origin::Binding(b) => ReExportIns::Alias {
                    exported: name.clone(),
                    module: b.module,
                    local: b.local.clone(),
                },
                Origin::Namespace(source) => ReExportIns::NamespaceBinding {
                    exported: name.clone(),
                    source: *source,
                },
                Origin::Dynamic { module, name: prop } => {
                    runtime_property(graph, native, name, *module, prop)
                }
            },
            // The module's own CommonJS exports need no re-export either.
            ExportEntry::CommonJsDynamic { module, .. } if *module == table.module => continue,
            ExportEntry::CommonJsDynamic { module, name: prop } => {
                runtime_property(graph, native, name, *module, prop)
            }
        };
        plan.push(ins);
    }

    for u in &table.unresolved {
        plan.push(ReExportIns::Undefined {
            exported: u.name.clone(),
        });
    }

    // Names defined statically win over anything merged at runtime.
    let skip: Vec<String> = table.names().filter(|n| *n != "default").cloned().collect();
    for &source in &table.dynamic_star_sources {
        let external = graph.module(source).kind == ModuleKind::External;
        plan.push(if external && native {
            ReExportIns::ExportStarFrom { source }
        } else {
            ReExportIns::RuntimeMerge {
                source,
                skip: skip.clone(),
                helper: if native {
                    RuntimeHelper::MergeNamespaces
                } else {
                    RuntimeHelper::ReExport
                },
            }
        });
    }
}

fn runtime_property(
    graph: &ModuleGraph,
    native: bool,
    exported: &str,
    source: ModuleId,
    name: &str,
) -> ReExportIns {
    if native && graph.module(source).kind == ModuleKind::External {
        ReExportIns::ExportNamedFrom {
            source,
            imported: name.to_owned(),
            exported: exported.to_owned(),
        }
    } else {
        ReExportIns::RuntimeProperty {
            exported: exported.to_owned(),
            source,
            name: name.to_owned(),
        }
    }
}
