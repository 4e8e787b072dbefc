//! Capsule generation.
//!
//! Pipeline per request: validate the spec directory, read the three source
//! documents concurrently, extract required sections, resolve Allowed
//! Context (fail-fast), render, enforce the line ceiling, write.

use std::path::{Path, PathBuf};

use sentinel_context::build_allowed_context;
use sentinel_context::markdown::{extract_list_from_heading, extract_section};
use sentinel_context::paths::{absolute_root, lexical_normalize, to_posix};
use sentinel_core::constants::{
    CAPSULE_FILENAME, CAPSULE_MAX_LINES, CAPSULE_TEMPLATE_PATH, PLAN_FILENAME, SPEC_FILENAME,
    TASKS_FILENAME,
};
use sentinel_core::count_lines;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::{CapsuleError, Result};
use crate::identity::capsule_id;
use crate::template::{self, EMBEDDED_TEMPLATE, TemplateValues};

/// Agent recorded in the header when none is given.
pub const DEFAULT_AGENT: &str = "ROUTER";

/// One generation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapsuleRequest {
    /// Spec directory, absolute or relative to the root.
    pub spec_dir: PathBuf,
    /// Decision identifier recorded in the header.
    pub decision: String,
    /// Producing agent; the builder default when `None`.
    pub agent: Option<String>,
    /// Rules hash; `<agent>@1.0` when `None`.
    pub rules_hash: Option<String>,
    /// Write `capsule.md` beside the sources. `false` is a dry run.
    pub write: bool,
}

impl CapsuleRequest {
    /// A writing request with default agent and rules hash.
    pub fn new(spec_dir: impl Into<PathBuf>, decision: impl Into<String>) -> Self {
        Self {
            spec_dir: spec_dir.into(),
            decision: decision.into(),
            agent: None,
            rules_hash: None,
            write: true,
        }
    }

    /// Set the producing agent.
    #[must_use]
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Set the rules hash.
    #[must_use]
    pub fn with_rules_hash(mut self, rules_hash: impl Into<String>) -> Self {
        self.rules_hash = Some(rules_hash.into());
        self
    }

    /// Render without writing.
    #[must_use]
    pub fn dry_run(mut self) -> Self {
        self.write = false;
        self
    }
}

/// A rendered capsule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capsule {
    /// `slug@hash8`.
    pub id: String,
    /// Rendered markdown.
    pub content: String,
    /// Where the capsule lives (or would live, on a dry run).
    pub path: PathBuf,
    /// Rendered line count.
    pub line_count: usize,
    /// The resolved Allowed Context list.
    pub allowed_context: Vec<String>,
    /// Whether `content` was written to `path`.
    pub written: bool,
}

/// Sections pulled from the source triple.
#[derive(Debug)]
struct Sections {
    goal: String,
    required_outputs: Vec<String>,
    acceptance_criteria: Vec<String>,
    router_notes: Vec<String>,
    seeds: Vec<String>,
}

fn required_list(
    markdown: &str,
    document: &'static str,
    section: &'static str,
) -> Result<Vec<String>> {
    let items = extract_list_from_heading(markdown, section);
    if items.is_empty() {
        return Err(CapsuleError::MissingRequiredSection { document, section });
    }
    Ok(items)
}

fn extract_sections(spec: &str, plan: &str, tasks: &str) -> Result<Sections> {
    let goal = template::paragraph(&extract_section(spec, "Goal"));
    if goal.is_empty() {
        return Err(CapsuleError::MissingRequiredSection {
            document: SPEC_FILENAME,
            section: "Goal",
        });
    }
    let required_outputs = required_list(tasks, TASKS_FILENAME, "Required Outputs")?;
    let acceptance_criteria = required_list(tasks, TASKS_FILENAME, "Acceptance Criteria")?;
    let router_notes = required_list(plan, PLAN_FILENAME, "Router Notes")?;
    let seeds = extract_list_from_heading(plan, "Allowed Context Seeds")
        .into_iter()
        .map(|seed| seed.trim().to_string())
        .filter(|seed| !seed.is_empty() && !seed.starts_with('#'))
        .collect();

    Ok(Sections {
        goal,
        required_outputs,
        acceptance_criteria,
        router_notes,
        seeds,
    })
}

/// Generates capsules for spec directories under one repository root.
#[derive(Clone, Debug)]
pub struct CapsuleBuilder {
    root: PathBuf,
    template_path: PathBuf,
    default_agent: String,
}

impl CapsuleBuilder {
    /// Builder for `root` with the default template location and agent.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            template_path: PathBuf::from(CAPSULE_TEMPLATE_PATH),
            default_agent: DEFAULT_AGENT.to_string(),
        }
    }

    /// Repository template location, relative to the root unless absolute.
    #[must_use]
    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = path.into();
        self
    }

    /// Agent used when a request names none.
    #[must_use]
    pub fn with_default_agent(mut self, agent: impl Into<String>) -> Self {
        self.default_agent = agent.into();
        self
    }

    /// Repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Render (and unless dry-running, write) the capsule for a spec directory.
    pub async fn generate(&self, request: &CapsuleRequest) -> Result<Capsule> {
        let decision = request.decision.trim();
        if decision.is_empty() {
            return Err(CapsuleError::MissingDecision);
        }

        let root = absolute_root(&self.root).map_err(|e| CapsuleError::io(&self.root, e))?;
        let spec_dir = self.resolve_spec_dir(&root, &request.spec_dir).await?;
        let slug = spec_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let read = |name: &str| {
            let path = spec_dir.join(name);
            async move {
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| CapsuleError::io(path, e))
            }
        };
        let (spec, plan, tasks) = tokio::try_join!(
            read(SPEC_FILENAME),
            read(PLAN_FILENAME),
            read(TASKS_FILENAME)
        )?;

        let sections = extract_sections(&spec, &plan, &tasks)?;
        let id = capsule_id(&slug, &spec, &plan, &tasks);

        let mut seeds: Vec<String> = [SPEC_FILENAME, PLAN_FILENAME, TASKS_FILENAME]
            .iter()
            .map(|name| relative_to(&root, &spec_dir.join(name)))
            .collect();
        seeds.extend(sections.seeds.iter().cloned());
        let allowed_context = build_allowed_context(&root, &seeds)?;
        debug!(capsule = %id, entries = allowed_context.len(), "allowed context resolved");

        let agent = request.agent.as_deref().unwrap_or(&self.default_agent);
        let rules_hash = request
            .rules_hash
            .clone()
            .unwrap_or_else(|| format!("{agent}@1.0"));
        let values = TemplateValues {
            produced_by: template::header(agent, &rules_hash, decision),
            capsule_id: id.clone(),
            goal: sections.goal,
            required_outputs: template::bullet_list(&sections.required_outputs),
            acceptance_criteria: template::bullet_list(&sections.acceptance_criteria),
            allowed_context: template::bullet_list(&allowed_context),
            router_notes: template::bullet_list(&sections.router_notes),
        };
        let content = template::render(&self.load_template(&root).await?, &values)?;

        let line_count = count_lines(&content);
        if line_count > CAPSULE_MAX_LINES {
            return Err(CapsuleError::CapsuleTooLarge {
                lines: line_count,
                max: CAPSULE_MAX_LINES,
            });
        }

        let path = spec_dir.join(CAPSULE_FILENAME);
        if request.write {
            tokio::fs::write(&path, &content)
                .await
                .map_err(|e| CapsuleError::io(&path, e))?;
        }
        info!(
            capsule = %id,
            path = %path.display(),
            lines = line_count,
            written = request.write,
            "capsule generated"
        );

        Ok(Capsule {
            id,
            content,
            path,
            line_count,
            allowed_context,
            written: request.write,
        })
    }

    async fn resolve_spec_dir(&self, root: &Path, spec_dir: &Path) -> Result<PathBuf> {
        let spec_dir = lexical_normalize(&root.join(spec_dir));
        let is_dir = tokio::fs::metadata(&spec_dir)
            .await
            .is_ok_and(|meta| meta.is_dir());
        if !is_dir {
            return Err(CapsuleError::MissingSpecDir(spec_dir));
        }

        let mut missing = Vec::new();
        for name in [SPEC_FILENAME, PLAN_FILENAME, TASKS_FILENAME] {
            let present = tokio::fs::metadata(spec_dir.join(name))
                .await
                .is_ok_and(|meta| meta.is_file());
            if !present {
                missing.push(name.to_string());
            }
        }
        if !missing.is_empty() {
            return Err(CapsuleError::MissingSourceDocuments(missing));
        }
        Ok(spec_dir)
    }

    async fn load_template(&self, root: &Path) -> Result<String> {
        let path = root.join(&self.template_path);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                debug!(template = %path.display(), "using repository template");
                Ok(text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(EMBEDDED_TEMPLATE.to_string()),
            Err(e) => Err(CapsuleError::io(path, e)),
        }
    }
}

/// Root-relative posix form of `path`, or its display form when outside.
fn relative_to(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .map_or_else(|_| path.display().to_string(), to_posix)
}
