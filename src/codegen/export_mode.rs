use tracing::debug;

use crate::{
    codegen::{ReExportIns, ReExportPlan},
    config::{ExportMode, OutputFormat},
    error::{LinkError, Res, format_quoted_strings},
};

/// Settle the configured export mode against the names the entry module
/// exports. Only CommonJS and IIFE output have an export mode.
pub fn resolve_export_mode(
    configured: ExportMode,
    format: OutputFormat,
    entry: &str,
    exported: &[&str],
) -> Res<Option<ExportMode>> {
    if format == OutputFormat::Esm {
        return Ok(None);
    }

    let incompatible = |option_value: &'static str| {
        let mut keys = exported.to_vec();
        keys.sort_unstable();
        LinkError::IncompatibleExportOptionValue {
            option_value,
            exported_keys: format_quoted_strings(&keys),
            entry_module: entry.to_owned(),
        }
    };

    let only_default = exported.len() == 1 && exported[0] == "default";
    let mode = match configured {
        ExportMode::Default if !only_default => return Err(incompatible("default")),
        ExportMode::None if !exported.is_empty() => return Err(incompatible("none")),
        ExportMode::Auto if exported.is_empty() => ExportMode::None,
        ExportMode::Auto if only_default => ExportMode::Default,
        ExportMode::Auto => ExportMode::Named,
        mode => mode,
    };

    debug!("Export mode of {} resolved to {}", entry, mode);
    Ok(Some(mode))
}

/// Record the export mode on the entry's plan. Default mode hands the
/// default export to `module.exports` itself.
pub fn apply_export_mode(plan: &mut ReExportPlan, mode: Option<ExportMode>) {
    plan.export_mode = mode;
    if mode == Some(ExportMode::Default) {
        plan.ins.push(ReExportIns::DefaultExportShim);
    }
}
