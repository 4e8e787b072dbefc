#![allow(missing_docs, unused_results)]

use std::path::Path;

use sentinel_context::{
    ContextLinter, IncludeFilter, IssueCode, LimitsError, SchemaCache, SchemaSource, Severity,
    load_limits,
};

const CONFIG_PATH: &str = ".sentinel/context/limits/context-limits.json";

fn setup() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

fn lines(n: usize) -> String {
    (1..=n).map(|i| format!("line {i}\n")).collect()
}

fn lint(root: &Path, capsules: &[&str], strict: bool) -> sentinel_context::LintReport {
    let config = load_limits(
        root,
        Path::new(CONFIG_PATH),
        &SchemaSource::Embedded,
        &SchemaCache::new(),
    )
    .unwrap();
    let linter = ContextLinter::from_config(root, config).unwrap();
    let filter = if capsules.is_empty() {
        None
    } else {
        Some(IncludeFilter::new(root, capsules).unwrap())
    };
    linter.run(filter.as_ref(), strict)
}

#[test]
fn twelve_lines_over_default_of_ten() {
    let tmp = setup();
    write(
        tmp.path(),
        CONFIG_PATH,
        r#"{"defaultMaxLines": 10, "forbiddenPaths": [], "artifacts": [{"name": "docs", "globs": ["docs/*.md"]}]}"#,
    );
    write(tmp.path(), "docs/long.md", &lines(12));

    let report = lint(tmp.path(), &[], false);
    assert_eq!(report.checked_files, 1);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].code, IssueCode::MaxLines);
    assert_eq!(report.issues[0].file, "docs/long.md");
    assert!(report.should_fail());
}

#[test]
fn forbidden_include_reported_once_beside_line_issue() {
    let tmp = setup();
    write(
        tmp.path(),
        CONFIG_PATH,
        r#"{"defaultMaxLines": 5, "forbiddenPaths": [".git"], "artifacts": [{"name": "capsules", "globs": ["specs/*/capsule.md"], "enforceAllowedContext": true}]}"#,
    );
    std::fs::create_dir_all(tmp.path().join(".git")).unwrap();
    let body = format!("## Allowed Context\n- .git\n\n## Notes\n{}", lines(8));
    write(tmp.path(), "specs/one/capsule.md", &body);

    let report = lint(tmp.path(), &[], false);
    let forbidden: Vec<_> = report
        .issues
        .iter()
        .filter(|i| i.code == IssueCode::ForbiddenInclude)
        .collect();
    assert_eq!(forbidden.len(), 1);
    assert_eq!(forbidden[0].message, ".git is listed in forbiddenPaths");
    assert!(report.issues.iter().any(|i| i.code == IssueCode::MaxLines));
}

#[test]
fn override_tightens_rule_budget() {
    let tmp = setup();
    write(
        tmp.path(),
        CONFIG_PATH,
        r#"{
            "defaultMaxLines": 100,
            "forbiddenPaths": [],
            "artifacts": [{"name": "docs", "globs": ["docs/*.md"], "maxLines": 50}],
            "overrides": [{"pattern": "docs/tight.md", "maxLines": 10, "reason": "must stay short"}]
        }"#,
    );
    write(tmp.path(), "docs/tight.md", &lines(20));
    write(tmp.path(), "docs/roomy.md", &lines(20));

    let report = lint(tmp.path(), &[], false);
    assert_eq!(report.checked_files, 2);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].file, "docs/tight.md");
    assert_eq!(report.issues[0].message, "exceeds 10 line budget (20 lines)");
}

#[test]
fn near_limit_boundary_and_strict_mode() {
    let tmp = setup();
    write(
        tmp.path(),
        CONFIG_PATH,
        r#"{"defaultMaxLines": 8, "warningThreshold": 0.75, "forbiddenPaths": [], "artifacts": [{"name": "docs", "globs": ["docs/*.md"]}]}"#,
    );
    write(tmp.path(), "docs/edge.md", &lines(6));
    write(tmp.path(), "docs/under.md", &lines(5));

    let relaxed = lint(tmp.path(), &[], false);
    assert_eq!(relaxed.issues.len(), 1);
    assert_eq!(relaxed.issues[0].code, IssueCode::NearLimit);
    assert_eq!(relaxed.issues[0].severity, Severity::Warning);
    assert!(!relaxed.should_fail());

    let strict = lint(tmp.path(), &[], true);
    assert!(strict.should_fail());
}

#[test]
fn exact_budget_is_not_an_error() {
    let tmp = setup();
    write(
        tmp.path(),
        CONFIG_PATH,
        r#"{"defaultMaxLines": 10, "forbiddenPaths": [], "artifacts": [{"name": "docs", "globs": ["docs/*.md"]}]}"#,
    );
    write(tmp.path(), "docs/exact.md", &lines(10));

    let report = lint(tmp.path(), &[], false);
    assert!(report.issues.iter().all(|i| i.code != IssueCode::MaxLines));
    assert!(!report.should_fail());
}

#[test]
fn capsule_filter_restricts_to_one_file() {
    let tmp = setup();
    write(
        tmp.path(),
        CONFIG_PATH,
        r#"{"defaultMaxLines": 3, "forbiddenPaths": [], "artifacts": [{"name": "capsules", "globs": ["specs/*/capsule.md"]}]}"#,
    );
    write(tmp.path(), "specs/a/capsule.md", &lines(9));
    write(tmp.path(), "specs/b/capsule.md", &lines(1));

    let report = lint(tmp.path(), &["specs/b/capsule.md"], false);
    assert_eq!(report.checked_files, 1);
    assert!(report.issues.is_empty());
}

#[test]
fn missing_optional_artifact_is_not_an_issue() {
    let tmp = setup();
    write(
        tmp.path(),
        CONFIG_PATH,
        r#"{"defaultMaxLines": 3, "forbiddenPaths": [], "artifacts": [{"name": "readme", "globs": ["README.md"]}]}"#,
    );

    let report = lint(tmp.path(), &[], false);
    assert_eq!(report.checked_files, 0);
    assert!(report.issues.is_empty());
}

#[test]
fn yaml_config_with_schema_violation() {
    let tmp = setup();
    write(
        tmp.path(),
        "limits.yaml",
        "defaultMaxLines: ten\nforbiddenPaths: []\nartifacts: []\n",
    );
    let err = load_limits(
        tmp.path(),
        Path::new("limits.yaml"),
        &SchemaSource::Embedded,
        &SchemaCache::new(),
    )
    .unwrap_err();
    assert!(matches!(err, LimitsError::Validation { .. }));
    assert!(err.to_string().contains("$/defaultMaxLines -> "));
}

#[test]
fn one_bad_file_does_not_hide_others() {
    let tmp = setup();
    write(
        tmp.path(),
        CONFIG_PATH,
        r#"{"defaultMaxLines": 50, "forbiddenPaths": [], "artifacts": [{"name": "capsules", "globs": ["specs/*/capsule.md"], "enforceAllowedContext": true}]}"#,
    );
    write(tmp.path(), "docs/a.md", "a\n");
    write(tmp.path(), "specs/a/capsule.md", "## Allowed Context\n- docs/missing.md\n");
    write(tmp.path(), "specs/b/capsule.md", "## Goal\nnothing listed\n");
    write(tmp.path(), "specs/c/capsule.md", "## Allowed Context\n- docs/a.md\n");
    std::fs::create_dir_all(tmp.path().join("specs/d")).unwrap();
    std::fs::write(tmp.path().join("specs/d/capsule.md"), [0xff, 0xfe, 0x00]).unwrap();

    let report = lint(tmp.path(), &[], false);
    assert_eq!(report.checked_files, 4);
    let summary: Vec<(&str, IssueCode)> = report
        .issues
        .iter()
        .map(|i| (i.file.as_str(), i.code))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("specs/a/capsule.md", IssueCode::MissingInclude),
            ("specs/b/capsule.md", IssueCode::MissingAllowedContext),
            ("specs/d/capsule.md", IssueCode::ReadError),
        ]
    );
}

#[test]
fn markdown_links_are_not_wildcards() {
    let tmp = setup();
    write(
        tmp.path(),
        CONFIG_PATH,
        r#"{"defaultMaxLines": 50, "forbiddenPaths": [".git"], "artifacts": [{"name": "capsules", "globs": ["specs/*/capsule.md"], "enforceAllowedContext": true}]}"#,
    );
    std::fs::create_dir_all(tmp.path().join(".git")).unwrap();
    write(tmp.path(), ".git/config", "[core]\n");
    write(
        tmp.path(),
        "specs/a/capsule.md",
        "## Allowed Context\n- [guide](docs/missing.md)\n- docs/missing.md\n- [x](.git/config)\n",
    );

    let report = lint(tmp.path(), &[], false);
    let codes: Vec<IssueCode> = report.issues.iter().map(|i| i.code).collect();
    assert_eq!(codes, vec![IssueCode::MissingInclude; 3]);
    assert!(report.should_fail());
}

#[test]
fn intro_prose_in_allowed_context_is_ignored() {
    let tmp = setup();
    write(
        tmp.path(),
        CONFIG_PATH,
        r#"{"defaultMaxLines": 50, "forbiddenPaths": [], "artifacts": [{"name": "capsules", "globs": ["specs/*/capsule.md"], "enforceAllowedContext": true}]}"#,
    );
    write(tmp.path(), "docs/a.md", "a\n");
    write(
        tmp.path(),
        "specs/a/capsule.md",
        "## Allowed Context\nThe following files:\n- docs/a.md\n",
    );

    let report = lint(tmp.path(), &[], false);
    assert!(report.issues.is_empty());
}
