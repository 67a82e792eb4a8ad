use thiserror::Error;

pub type Res<T> = Result<T, LinkError>;

/// Failures outside of the link pass itself. Resolution problems inside a
/// pass are never errors in this sense, they are diagnostics in the report.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("failed to read file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("module '{importer}' references unknown module '{path}'")]
    UnknownModule { importer: String, path: String },

    #[error("invalid module graph: {0}")]
    InvalidGraph(String),

    #[error("invalid value '{value}' for option '{option}'")]
    InvalidOption { option: &'static str, value: String },

    #[error(
        r#""output.exports" must be "default", "named", "none", "auto", or left unspecified (defaults to "auto"), received "{0}"."#
    )]
    InvalidExportOptionValue(String),

    #[error(
        r#""{option_value}" was specified for "output.exports", but entry module "{entry_module}" has the following exports: {exported_keys}"#
    )]
    IncompatibleExportOptionValue {
        option_value: &'static str,
        exported_keys: String,
        entry_module: String,
    },

    #[error("entry module '{0}' not found in graph")]
    UnknownEntry(String),
}

impl LinkError {
    pub fn io(path: &str, source: std::io::Error) -> Self {
        LinkError::Io {
            path: path.to_owned(),
            source,
        }
    }

    pub fn toml(path: &str, source: toml::de::Error) -> Self {
        LinkError::Toml {
            path: path.to_owned(),
            source,
        }
    }
}

/// Quote and join names the way messages list them:
/// "a", "b" and "c"
pub fn format_quoted_strings(list: &[impl AsRef<str>]) -> String {
    let mut quoted = list
        .iter()
        .map(|item| format!("\"{}\"", item.as_ref()))
        .collect::<Vec<_>>();

    match quoted.len() {
        0 => String::new(),
        1 => quoted.remove(0),
        _ => {
            let last = quoted.pop().unwrap_or_default();
            format!("{} and {}", quoted.join(", "), last)
        }
    }
}
