//! `capsule generate`.

use std::path::Path;

use anyhow::{Context, Result};
use sentinel_capsule::{CapsuleBuilder, CapsuleRequest};
use sentinel_settings::SentinelSettings;
use serde_json::json;

use crate::GenerateArgs;
use crate::output::{Outcome, OutputFormat};

pub(crate) async fn generate(
    root: &Path,
    settings: &SentinelSettings,
    args: GenerateArgs,
    format: OutputFormat,
) -> Result<Outcome> {
    let builder = CapsuleBuilder::new(root)
        .with_template_path(&settings.capsule.template_path)
        .with_default_agent(&settings.capsule.default_agent);

    let mut request = CapsuleRequest::new(&args.spec_dir, args.decision);
    if let Some(agent) = args.agent {
        request = request.with_agent(agent);
    }
    if let Some(rules_hash) = args.rules_hash {
        request = request.with_rules_hash(rules_hash);
    }
    if args.dry_run {
        request = request.dry_run();
    }

    let capsule = builder
        .generate(&request)
        .await
        .with_context(|| format!("spec directory {}", args.spec_dir.display()))?;

    Ok(match format {
        OutputFormat::Json => Outcome::json(json!({ "capsule": capsule })),
        OutputFormat::Text if capsule.written => Outcome::ok(format!(
            "capsule:generate -> {} ({})\n",
            capsule.path.display(),
            capsule.id
        )),
        OutputFormat::Text => Outcome::ok(capsule.content),
    })
}
