//! Capsule template rendering.
//!
//! Substitution is a single pass over the template: known tokens are
//! replaced, unknown ones are collected. Substituted values are never
//! rescanned, so document text that happens to look like a token is safe.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::errors::CapsuleError;

/// Template compiled into the binary, used when the repository has none.
pub const EMBEDDED_TEMPLATE: &str = include_str!("../templates/capsule.md");

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{([A-Z_]+)\}\}").unwrap());

/// Values for every token a capsule template may use.
#[derive(Clone, Debug, Default)]
pub struct TemplateValues {
    /// Header comment (`{{PRODUCED_BY}}`).
    pub produced_by: String,
    /// `slug@hash8` (`{{CAPSULE_ID}}`).
    pub capsule_id: String,
    /// Goal paragraph (`{{GOAL}}`).
    pub goal: String,
    /// Rendered list (`{{REQUIRED_OUTPUTS}}`).
    pub required_outputs: String,
    /// Rendered list (`{{ACCEPTANCE_CRITERIA}}`).
    pub acceptance_criteria: String,
    /// Rendered list (`{{ALLOWED_CONTEXT}}`).
    pub allowed_context: String,
    /// Rendered list (`{{ROUTER_NOTES}}`).
    pub router_notes: String,
}

impl TemplateValues {
    fn lookup(&self, token: &str) -> Option<&str> {
        let value = match token {
            "PRODUCED_BY" => &self.produced_by,
            "CAPSULE_ID" => &self.capsule_id,
            "GOAL" => &self.goal,
            "REQUIRED_OUTPUTS" => &self.required_outputs,
            "ACCEPTANCE_CRITERIA" => &self.acceptance_criteria,
            "ALLOWED_CONTEXT" => &self.allowed_context,
            "ROUTER_NOTES" => &self.router_notes,
            _ => return None,
        };
        Some(value)
    }
}

/// Drop a leading `<!-- ... -->` block (maintainer notes) from a template.
pub fn strip_leading_comment(template: &str) -> &str {
    let trimmed = template.trim_start();
    if let Some(body) = trimmed.strip_prefix("<!--") {
        if let Some(end) = body.find("-->") {
            return body[end + 3..].trim_start_matches(['\r', '\n']);
        }
    }
    template
}

/// Producer/decision header comment.
pub fn header(agent: &str, rules_hash: &str, decision: &str) -> String {
    format!("<!-- ProducedBy={agent} RulesHash={rules_hash} Decision={decision} -->")
}

/// Non-blank lines, each trimmed.
pub fn paragraph(section: &str) -> String {
    section
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `- item` per line.
pub fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Substitute tokens; the result is right-trimmed and ends with one newline.
pub fn render(template: &str, values: &TemplateValues) -> Result<String, CapsuleError> {
    let body = strip_leading_comment(template);
    let mut unresolved = BTreeSet::new();
    let rendered = TOKEN.replace_all(body, |caps: &Captures<'_>| {
        if let Some(value) = values.lookup(&caps[1]) {
            value.to_string()
        } else {
            let _ = unresolved.insert(caps[0].to_string());
            caps[0].to_string()
        }
    });
    if !unresolved.is_empty() {
        return Err(CapsuleError::TemplateIncomplete {
            tokens: unresolved.into_iter().collect(),
        });
    }
    let mut out = rendered.trim_end().to_string();
    out.push('\n');
    Ok(out)
}
