use core::fmt;

use crate::module::ModuleId;

/// `export { imported as name } from "source"`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedReExport {
    /// Name as exported from the re-exporting module.
    pub name: String,
    pub source: ModuleId,
    /// Name looked up in the source module.
    pub imported: String,
}

impl NamedReExport {
    pub fn new(name: &str, source: ModuleId, imported: &str) -> Self {
        Self {
            name: name.to_owned(),
            source,
            imported: imported.to_owned(),
        }
    }
}

/// `export * as name from "source"`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceReExport {
    pub name: String,
    pub source: ModuleId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportSpecifier {
    /// `import { imported as local }`. A default import is a named import of
    /// `default`.
    Named { imported: String, local: String },
    /// `import * as local`, with every property read off the namespace in
    /// source order.
    Namespace { local: String, accesses: Vec<String> },
}

/// One import statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportRecord {
    pub source: ModuleId,
    pub specifiers: Vec<ImportSpecifier>,
}

impl ImportRecord {
    pub fn new(source: ModuleId) -> Self {
        Self {
            source,
            specifiers: Vec::new(),
        }
    }

    pub fn named(mut self, imported: &str) -> Self {
        self.specifiers.push(ImportSpecifier::Named {
            imported: imported.to_owned(),
            local: imported.to_owned(),
        });
        self
    }

    pub fn default(mut self, local: &str) -> Self {
        self.specifiers.push(ImportSpecifier::Named {
            imported: "default".to_owned(),
            local: local.to_owned(),
        });
        self
    }

    pub fn namespace(mut self, local: &str, accesses: &[&str]) -> Self {
        self.specifiers.push(ImportSpecifier::Namespace {
            local: local.to_owned(),
            accesses: accesses.iter().map(|s| s.to_string()).collect(),
        });
        self
    }
}

impl fmt::Display for ImportSpecifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportSpecifier::Named { imported, local } if imported == local => {
                write!(f, "{}", imported)
            }
            ImportSpecifier::Named { imported, local } => write!(f, "{} as {}", imported, local),
            ImportSpecifier::Namespace { local, .. } => write!(f, "* as {}", local),
        }
    }
}
