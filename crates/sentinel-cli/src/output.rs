//! Result rendering and the fatal-error envelope.

use clap::ValueEnum;
use sentinel_capsule::CapsuleError;
use sentinel_context::{ContextError, LimitsError, ReferenceError};
use sentinel_settings::SettingsError;
use serde_json::{Value, json};

/// How command results are printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON document on stdout.
    Json,
}

/// What a command produced: stdout text and whether the run passed.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub(crate) stdout: String,
    pub(crate) ok: bool,
}

impl Outcome {
    /// A passing outcome.
    pub(crate) fn ok(stdout: String) -> Self {
        Self { stdout, ok: true }
    }

    /// Successful JSON payload wrapped with `"ok": true`.
    pub(crate) fn json(mut payload: Value) -> Self {
        if let Value::Object(map) = &mut payload {
            let _ = map.insert("ok".into(), Value::Bool(true));
        }
        Self::ok(pretty(&payload))
    }
}

/// Pretty JSON with a trailing newline.
pub(crate) fn pretty(value: &Value) -> String {
    let mut out = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    out.push('\n');
    out
}

/// First recognized error code along the cause chain.
pub(crate) fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<CapsuleError>() {
            return e.code();
        }
        if let Some(e) = cause.downcast_ref::<ContextError>() {
            return e.code();
        }
        if let Some(e) = cause.downcast_ref::<LimitsError>() {
            return e.code();
        }
        if let Some(e) = cause.downcast_ref::<ReferenceError>() {
            return e.code();
        }
        if let Some(e) = cause.downcast_ref::<SettingsError>() {
            return e.code();
        }
    }
    "INTERNAL"
}

/// JSON body for a failed command.
pub(crate) fn error_envelope(err: &anyhow::Error) -> Value {
    json!({
        "ok": false,
        "error": {
            "code": error_code(err),
            "message": format!("{err:#}"),
        }
    })
}

/// Print a fatal error: the JSON envelope on stdout, or a line on stderr.
pub(crate) fn report_failure(label: &str, err: &anyhow::Error, format: OutputFormat) {
    tracing::debug!(command = label, error = ?err, "command failed");
    match format {
        OutputFormat::Json => print!("{}", pretty(&error_envelope(err))),
        OutputFormat::Text => eprintln!("{label} failed -> {err:#}"),
    }
}
