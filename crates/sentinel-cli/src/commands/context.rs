//! `context lint`, `context list`, `context limits`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sentinel_context::{
    ContextLinter, IncludeFilter, LintReport, SchemaCache, SchemaSource, discover_allowed_context,
};
use sentinel_settings::SentinelSettings;
use serde_json::json;

use crate::output::{Outcome, OutputFormat, pretty};
use crate::{LimitsArgs, LimitsLocation, LintArgs, ListArgs};

/// Flags win over settings; a missing schema means the embedded one.
fn load_linter(
    root: &Path,
    settings: &SentinelSettings,
    location: LimitsLocation,
) -> Result<ContextLinter> {
    let config_path = location
        .config
        .unwrap_or_else(|| PathBuf::from(&settings.limits.config_path));
    let schema = SchemaSource::from_option(
        location
            .schema
            .or_else(|| settings.limits.schema_path.as_ref().map(PathBuf::from)),
    );
    ContextLinter::load(root, &config_path, &schema, &SchemaCache::new())
        .with_context(|| format!("limits config {}", config_path.display()))
}

pub(crate) fn lint(
    root: &Path,
    settings: &SentinelSettings,
    args: LintArgs,
    format: OutputFormat,
) -> Result<Outcome> {
    let linter = load_linter(root, settings, args.limits)?;
    let filter = if args.capsules.is_empty() {
        None
    } else {
        Some(IncludeFilter::new(root, &args.capsules)?)
    };
    let report = linter.run(filter.as_ref(), args.strict);

    let stdout = match format {
        OutputFormat::Json => pretty(&report.to_json()),
        OutputFormat::Text => render_report(&report),
    };
    Ok(Outcome {
        stdout,
        ok: !report.should_fail(),
    })
}

fn render_report(report: &LintReport) -> String {
    if report.issues.is_empty() {
        return format!("context lint OK scanned {} file(s)\n", report.checked_files);
    }
    let mut out = String::new();
    for issue in &report.issues {
        let _ = writeln!(out, "{issue}");
    }
    let _ = writeln!(
        out,
        "context lint summary: {} error(s), {} warning(s)",
        report.errors(),
        report.warnings()
    );
    out
}

pub(crate) fn list(root: &Path, args: ListArgs, format: OutputFormat) -> Result<Outcome> {
    let entries = discover_allowed_context(root, &args.seeds)?;
    Ok(match format {
        OutputFormat::Json => Outcome::json(json!({ "entries": entries })),
        OutputFormat::Text => {
            let mut out = String::new();
            for entry in &entries {
                if entry.is_glob {
                    let _ = writeln!(out, "{} (glob)", entry.path);
                } else {
                    let _ = writeln!(out, "{} ({} lines)", entry.path, entry.line_count);
                }
            }
            Outcome::ok(out)
        }
    })
}

pub(crate) fn limits(
    root: &Path,
    settings: &SentinelSettings,
    args: LimitsArgs,
    format: OutputFormat,
) -> Result<Outcome> {
    let linter = load_linter(root, settings, args.limits)?;
    let value =
        serde_json::to_value(linter.engine().config()).context("serializing limits config")?;
    Ok(match format {
        OutputFormat::Json => Outcome::json(json!({ "limits": value })),
        OutputFormat::Text => Outcome::ok(pretty(&value)),
    })
}
