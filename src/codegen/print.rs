use crate::{
    codegen::{ReExportIns, ReExportPlan},
    config::Mode,
    module::{ModuleGraph, ModuleId, ModuleKind},
};

/// Render a plan as output code, one statement per line.
pub fn plan_to_string(plan: &ReExportPlan, graph: &ModuleGraph) -> String {
    let printer = Printer { plan, graph };
    let mut s = String::new();
    for ins in &plan.ins {
        s += &printer.ins(ins);
        s += "\n";
    }
    s
}

struct Printer<'a> {
    plan: &'a ReExportPlan,
    graph: &'a ModuleGraph,
}

impl<'a> Printer<'a> {
    fn native(&self) -> bool {
        !self.plan.format.needs_runtime_merge()
    }

    fn ins(&self, ins: &ReExportIns) -> String {
        match ins {
            ReExportIns::Alias {
                exported, local, ..
            } => self.export(exported, local),
            ReExportIns::ExportStarFrom { source } => {
                format!("export * from \"{}\";", self.path(*source))
            }
            ReExportIns::ExportNamedFrom {
                source,
                imported,
                exported,
            } => format!(
                "export {{ {} }} from \"{}\";",
                specifier(imported, exported),
                self.path(*source)
            ),
            ReExportIns::RuntimeMerge {
                source,
                skip,
                helper,
            } => {
                let skip = skip
                    .iter()
                    .map(|n| format!("\"{}\"", n))
                    .collect::<Vec<_>>()
                    .join(", ");
                if self.native() {
                    format!(
                        "{}({}, [{}], [{}]);",
                        helper,
                        self.namespace(self.plan.module),
                        self.require(*source),
                        skip
                    )
                } else {
                    format!("{}(exports, {}, [{}]);", helper, self.require(*source), skip)
                }
            }
            ReExportIns::RuntimeProperty {
                exported,
                source,
                name,
            } => self.export(exported, &format!("{}.{}", self.require(*source), name)),
            ReExportIns::NamespaceBinding { exported, source } => {
                if self.plan.mode == Mode::Convert {
                    if self.native() {
                        format!("export * as {} from \"{}\";", exported, self.path(*source))
                    } else {
                        self.export(exported, &format!("__toESM({})", self.require(*source)))
                    }
                } else {
                    self.export(exported, &self.namespace(*source))
                }
            }
            ReExportIns::Undefined { exported } => self.export(exported, "void 0"),
            ReExportIns::DefaultExportShim => "module.exports = exports.default;".to_owned(),
        }
    }

    /// Export `value` under `exported` in the plan's format.
    fn export(&self, exported: &str, value: &str) -> String {
        if !self.native() {
            format!("__export(exports, {{ {}: () => {} }});", exported, value)
        } else if is_identifier(value) {
            format!("export {{ {} }};", specifier(value, exported))
        } else {
            format!("export var {} = {};", exported, value)
        }
    }

    fn path(&self, id: ModuleId) -> &str {
        &self.graph.module(id).path
    }

    /// Expression evaluating to the exports object of a module.
    fn require(&self, id: ModuleId) -> String {
        let m = self.graph.module(id);
        match (self.plan.mode, m.kind) {
            (Mode::Bundle, ModuleKind::CommonJs) => format!("require_{}()", ident(m.stem())),
            _ => format!("require(\"{}\")", m.path),
        }
    }

    /// Identifier of a bundled module's namespace object.
    fn namespace(&self, id: ModuleId) -> String {
        let m = self.graph.module(id);
        match m.kind {
            ModuleKind::EsModule => format!("{}_exports", ident(m.stem())),
            ModuleKind::CommonJs | ModuleKind::External | ModuleKind::Empty => {
                format!("__toESM({})", self.require(id))
            }
        }
    }
}

fn specifier(local: &str, exported: &str) -> String {
    if local == exported {
        local.to_owned()
    } else {
        format!("{} as {}", local, exported)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Turn a file stem into a valid identifier, eg. foo-bar becomes foo_bar.
fn ident(stem: &str) -> String {
    stem.chars()
        .map(|c| if c.is_alphanumeric() || c == '$' { c } else { '_' })
        .collect()
}
