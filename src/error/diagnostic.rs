use core::fmt;

use strum_macros::Display as StrumDisplay;

use crate::{
    error::format_quoted_strings,
    module::{ModuleId, ModuleRecord},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, StrumDisplay)]
pub enum Severity {
    #[strum(serialize = "ERROR")]
    Error,
    #[strum(serialize = "WARNING")]
    Warning,
    /// Only surfaced when verbose diagnostics are requested.
    #[strum(serialize = "DEBUG")]
    Debug,
}

/// What went wrong. The Display impl is the user facing text and must stay
/// byte-for-byte stable across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Explicit named import or re-export of a name the ES source lacks.
    MissingExport { source: String, name: String },
    /// Explicit named import of a name two star sources disagree on.
    AmbiguousImport { name: String },
    /// Named re-export chain that loops back without reaching a binding.
    CircularReExport { name: String, exporter: String },
    /// Namespace property (or CommonJS named import) that is not in the
    /// table of a module that does have some exports.
    UndefinedImport { source: String, name: String },
    /// Namespace property read off a module with nothing to offer.
    NoExports { source: String, name: String },
    /// Name that can only come from one of several external star sources.
    AmbiguousExternalNamespaces {
        reexporter: String,
        binding: String,
        sources: Vec<String>,
        used: String,
    },
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::MissingExport { .. }
            | DiagnosticKind::AmbiguousImport { .. }
            | DiagnosticKind::CircularReExport { .. } => Severity::Error,
            DiagnosticKind::NoExports { .. } | DiagnosticKind::AmbiguousExternalNamespaces { .. } => {
                Severity::Warning
            }
            DiagnosticKind::UndefinedImport { .. } => Severity::Debug,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::MissingExport { source, name } => {
                write!(f, "No matching export in \"{}\" for import \"{}\"", source, name)
            }
            DiagnosticKind::AmbiguousImport { name } => {
                write!(f, "Ambiguous import \"{}\" has multiple matching exports", name)
            }
            DiagnosticKind::CircularReExport { name, exporter } => write!(
                f,
                "\"{}\" cannot be exported from \"{}\" as it is a reexport that references itself.",
                name, exporter
            ),
            DiagnosticKind::UndefinedImport { source, name } => write!(
                f,
                "Import \"{}\" will always be undefined because there is no matching export in \"{}\"",
                name, source
            ),
            DiagnosticKind::NoExports { source, name } => write!(
                f,
                "Import \"{}\" will always be undefined because the file \"{}\" has no exports",
                name, source
            ),
            DiagnosticKind::AmbiguousExternalNamespaces {
                reexporter,
                binding,
                sources,
                used,
            } => write!(
                f,
                "Ambiguous external namespace resolution: \"{}\" re-exports \"{}\" from one of the external modules {}, guessing \"{}\".",
                reexporter,
                binding,
                format_quoted_strings(sources),
                used
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The module the diagnostic is attached to.
    pub subject: ModuleId,
    /// Display path of the subject module.
    pub file: String,
    pub kind: DiagnosticKind,
    /// The module that caused the condition, if any.
    pub related: Option<ModuleId>,
    /// Emission order key: (producing module, sequence within producer).
    order: (ModuleId, usize),
}

impl Diagnostic {
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.file, self.severity, self.kind)
    }
}

/// Per-module buffer of diagnostics. Each module gets its own so modules can
/// be checked concurrently and merged afterwards.
pub struct Diagnostics {
    producer: ModuleId,
    reports: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(producer: ModuleId) -> Self {
        Self {
            producer,
            reports: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn add(&mut self, subject: &ModuleRecord, kind: DiagnosticKind, related: Option<ModuleId>) {
        let order = (self.producer, self.reports.len());
        self.reports.push(Diagnostic {
            severity: kind.severity(),
            subject: subject.id,
            file: subject.path.clone(),
            kind,
            related,
            order,
        });
    }

    pub fn reports(&self) -> &Vec<Diagnostic> {
        &self.reports
    }
}

/// The ordered diagnostics of one link pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Merge per-module buffers into one report sorted by subject path, then
    /// emission order. Debug entries are dropped unless verbose.
    pub fn merge(buffers: Vec<Diagnostics>, verbose: bool) -> Self {
        let mut diagnostics: Vec<Diagnostic> = buffers
            .into_iter()
            .flat_map(|b| b.reports)
            .filter(|d| verbose || d.severity != Severity::Debug)
            .collect();

        diagnostics.sort_by(|a, b| a.file.cmp(&b.file).then(a.order.cmp(&b.order)));
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &Vec<Diagnostic> {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn num_errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.num_errors() > 0
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// One line per diagnostic, "<file>: <SEVERITY>: <description>".
    pub fn render(&self) -> String {
        let mut s = String::new();
        for d in &self.diagnostics {
            s += &format!("{}\n", d);
        }
        s
    }
}
