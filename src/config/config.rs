use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};
use tracing::debug;

use crate::{
    error::{LinkError, Res},
    resolve::DEFAULT_MAX_ITERATIONS,
    util::read_file,
};

pub const CONFIG_FILE: &str = "modlink.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumString)]
pub enum OutputFormat {
    /// Everything wrapped in one function scope.
    #[strum(serialize = "iife")]
    Iife,
    #[strum(serialize = "esm")]
    Esm,
    #[strum(serialize = "cjs")]
    Cjs,
}

impl OutputFormat {
    /// Formats without native re-export syntax.
    pub fn needs_runtime_merge(&self) -> bool {
        match self {
            OutputFormat::Esm => false,
            OutputFormat::Iife | OutputFormat::Cjs => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumString)]
pub enum Mode {
    /// Link the whole graph into one output.
    #[strum(serialize = "bundle")]
    Bundle,
    /// Rewrite each module to the output format on its own, no linking.
    #[strum(serialize = "convert")]
    Convert,
}

/// How the entry module's exports are exposed by CommonJS and IIFE output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
pub enum ExportMode {
    #[strum(serialize = "auto")]
    Auto,
    #[strum(serialize = "named")]
    Named,
    #[strum(serialize = "default")]
    Default,
    #[strum(serialize = "none")]
    None,
}

impl FromStr for ExportMode {
    type Err = LinkError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "auto" => Ok(ExportMode::Auto),
            "named" => Ok(ExportMode::Named),
            "default" => Ok(ExportMode::Default),
            "none" => Ok(ExportMode::None),
            _ => Err(LinkError::InvalidExportOptionValue(value.to_owned())),
        }
    }
}

pub struct Config {
    pub format: OutputFormat,
    pub mode: Mode,
    pub export_mode: ExportMode,
    /// Path of the entry module. Export mode only applies to the entry.
    pub entry: Option<String>,
    /// Keep debug diagnostics in the report.
    pub verbose: bool,
    /// Ceiling for fixed point iteration inside an export cycle.
    pub max_iterations: usize,
    /// If true, every resolved export table is printed after linking.
    pub print_tables: bool,
}

impl Config {
    pub fn default() -> Self {
        Self {
            format: OutputFormat::Esm,
            mode: Mode::Bundle,
            export_mode: ExportMode::Auto,
            entry: None,
            verbose: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            print_tables: false,
        }
    }

    pub fn test() -> Self {
        Self {
            verbose: true,
            ..Self::default()
        }
    }

    pub fn debug() -> Self {
        Self {
            verbose: true,
            print_tables: true,
            ..Self::default()
        }
    }

    /// Parse a modlink.toml source. Missing sections and keys keep their
    /// default values.
    pub fn parse(src: &str, filepath: &str) -> Res<Config> {
        let file: ConfigFile = toml::from_str(src).map_err(|e| LinkError::toml(filepath, e))?;
        let mut config = Config::default();

        if let Some(format) = file.output.format {
            config.format = OutputFormat::from_str(&format).map_err(|_| LinkError::InvalidOption {
                option: "output.format",
                value: format,
            })?;
        }

        if let Some(mode) = file.output.mode {
            config.mode = Mode::from_str(&mode).map_err(|_| LinkError::InvalidOption {
                option: "output.mode",
                value: mode,
            })?;
        }

        if let Some(exports) = file.output.exports {
            config.export_mode = ExportMode::from_str(&exports)?;
        }

        config.entry = file.output.entry;
        config.verbose = file.options.verbose;
        if let Some(max) = file.options.max_fixed_point_iterations {
            config.max_iterations = max;
        }

        Ok(config)
    }
}

/// Load modlink.toml from the given path.
pub fn load_config_file(filepath: &str) -> Res<Config> {
    debug!("Loading config: {}", filepath);
    Config::parse(&read_file(filepath)?, filepath)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    output: OutputSection,
    #[serde(default)]
    options: OptionsSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OutputSection {
    format: Option<String>,
    mode: Option<String>,
    exports: Option<String>,
    entry: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct OptionsSection {
    #[serde(default)]
    verbose: bool,
    max_fixed_point_iterations: Option<usize>,
}
