//! Allowed Context resolution.
//!
//! Combines every shared background document under the context directory
//! with caller seeds into one sorted, deduplicated list. Seeds are
//! fail-fast: the first invalid or missing seed aborts the build.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sentinel_core::constants::{CONTEXT_DIR, EXCLUDED_CONTEXT_DIRS};
use sentinel_core::count_lines;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::ReferenceError;
use crate::paths::{assert_exists, has_glob, normalize_reference, to_posix};

/// One resolved Allowed Context path with display metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedContextEntry {
    /// Canonical root-relative reference.
    pub path: String,
    /// `root` joined with [`Self::path`].
    pub absolute: PathBuf,
    /// Lines in the file; 0 for globs, directories, and unreadable files.
    pub line_count: usize,
    /// Whether the reference is a glob.
    pub is_glob: bool,
}

/// Every file under the shared context directory, root-relative and sorted.
///
/// Top-level subdirectories named in [`EXCLUDED_CONTEXT_DIRS`] are skipped.
/// A missing context directory yields an empty list.
pub fn list_context_files(root: &Path) -> Vec<String> {
    let context_root = root.join(CONTEXT_DIR);
    if !context_root.is_dir() {
        debug!(dir = %context_root.display(), "no shared context directory");
        return Vec::new();
    }

    let walker = walkdir::WalkDir::new(&context_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !(e.depth() == 1
                && e.file_type().is_dir()
                && EXCLUDED_CONTEXT_DIRS.contains(&e.file_name().to_string_lossy().as_ref()))
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable context entry");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(to_posix(relative));
        }
    }
    files.sort();
    files
}

/// Merge context files and seeds into a sorted map of `path → is_glob`.
fn resolve<S: AsRef<str>>(
    root: &Path,
    seeds: &[S],
) -> Result<BTreeMap<String, bool>, ReferenceError> {
    let mut merged: BTreeMap<String, bool> = list_context_files(root)
        .into_iter()
        .map(|path| (path, false))
        .collect();

    for raw in seeds {
        let raw = raw.as_ref();
        let canonical = normalize_reference(root, raw)?;
        assert_exists(root, &canonical)?;
        debug!(seed = raw, canonical = %canonical, "resolved seed");
        let is_glob = has_glob(&canonical);
        let _ = merged.entry(canonical).or_insert(is_glob);
    }
    Ok(merged)
}

/// Sorted, deduplicated Allowed Context paths for `root` plus `seeds`.
///
/// Ordering is byte-wise on the canonical paths.
pub fn build_allowed_context<S: AsRef<str>>(
    root: &Path,
    seeds: &[S],
) -> Result<Vec<String>, ReferenceError> {
    Ok(resolve(root, seeds)?.into_keys().collect())
}

/// Same as [`build_allowed_context`], with line counts and glob flags.
pub fn discover_allowed_context<S: AsRef<str>>(
    root: &Path,
    seeds: &[S],
) -> Result<Vec<AllowedContextEntry>, ReferenceError> {
    let merged = resolve(root, seeds)?;
    Ok(merged
        .into_iter()
        .map(|(path, is_glob)| {
            let absolute = root.join(&path);
            let line_count = if is_glob { 0 } else { file_lines(&absolute) };
            AllowedContextEntry {
                path,
                absolute,
                line_count,
                is_glob,
            }
        })
        .collect())
}

fn file_lines(path: &Path) -> usize {
    if !path.is_file() {
        return 0;
    }
    match std::fs::read(path) {
        Ok(bytes) => count_lines(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "line count unavailable");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".sentinel/context/guide.md", "one\ntwo\n");
        write(dir.path(), ".sentinel/context/nested/style.md", "s\n");
        write(dir.path(), ".sentinel/context/limits/context-limits.json", "{}");
        write(dir.path(), "docs/a.md", "a\n");
        write(dir.path(), "specs/x/spec.md", "## Goal\nx\n");
        dir
    }

    // ── list_context_files ──────────────────────────────────────────

    #[test]
    fn lists_context_excluding_limits() {
        let dir = repo();
        assert_eq!(
            list_context_files(dir.path()),
            vec![".sentinel/context/guide.md", ".sentinel/context/nested/style.md"]
        );
    }

    #[test]
    fn nested_limits_dir_is_not_excluded() {
        let dir = repo();
        write(dir.path(), ".sentinel/context/nested/limits/keep.md", "k\n");
        let files = list_context_files(dir.path());
        assert!(files.contains(&".sentinel/context/nested/limits/keep.md".to_string()));
    }

    #[test]
    fn missing_context_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list_context_files(dir.path()).is_empty());
    }

    // ── build_allowed_context ───────────────────────────────────────

    #[test]
    fn merges_seeds_sorted_and_deduplicated() {
        let dir = repo();
        let seeds = ["./specs/x/spec.md", "docs/a.md", "docs\\a.md"];
        let got = build_allowed_context(dir.path(), &seeds).unwrap();
        assert_eq!(
            got,
            vec![
                ".sentinel/context/guide.md",
                ".sentinel/context/nested/style.md",
                "docs/a.md",
                "specs/x/spec.md",
            ]
        );
    }

    #[test]
    fn ordering_is_bytewise_not_case_folded() {
        let dir = repo();
        write(dir.path(), "B.md", "b\n");
        write(dir.path(), "a.md", "a\n");
        let got = build_allowed_context(dir.path(), &["a.md", "B.md"]).unwrap();
        let tail: Vec<&str> = got
            .iter()
            .map(String::as_str)
            .filter(|p| !p.starts_with('.'))
            .collect();
        assert_eq!(tail, vec!["B.md", "a.md"]);
    }

    #[test]
    fn missing_seed_fails_fast() {
        let dir = repo();
        let err = build_allowed_context(dir.path(), &["docs/a.md", "docs/gone.md"]).unwrap_err();
        assert_matches!(err, ReferenceError::MissingReference { path } if path == "docs/gone.md");
    }

    #[test]
    fn escaping_seed_fails_fast() {
        let dir = repo();
        let err = build_allowed_context(dir.path(), &["../secret.md"]).unwrap_err();
        assert_matches!(err, ReferenceError::InvalidReference { .. });
    }

    #[test]
    fn glob_seed_is_kept_verbatim() {
        let dir = repo();
        let got = build_allowed_context(dir.path(), &["docs/*.md"]).unwrap();
        assert!(got.contains(&"docs/*.md".to_string()));
    }

    #[test]
    fn no_seeds_is_context_only() {
        let dir = repo();
        let seeds: [&str; 0] = [];
        assert_eq!(build_allowed_context(dir.path(), &seeds).unwrap().len(), 2);
    }

    // ── discover_allowed_context ────────────────────────────────────

    #[test]
    fn discover_reports_metadata() {
        let dir = repo();
        let entries = discover_allowed_context(dir.path(), &["docs/*.md", "docs"]).unwrap();
        let guide = entries.iter().find(|e| e.path == ".sentinel/context/guide.md").unwrap();
        assert_eq!(guide.line_count, 2);
        assert!(!guide.is_glob);
        assert_eq!(guide.absolute, dir.path().join(".sentinel/context/guide.md"));

        let glob = entries.iter().find(|e| e.path == "docs/*.md").unwrap();
        assert!(glob.is_glob);
        assert_eq!(glob.line_count, 0);

        let docs = entries.iter().find(|e| e.path == "docs").unwrap();
        assert_eq!(docs.line_count, 0);
    }

    #[test]
    fn discover_order_matches_build() {
        let dir = repo();
        let seeds = ["specs/x/spec.md", "docs/a.md"];
        let paths: Vec<String> = discover_allowed_context(dir.path(), &seeds)
            .unwrap()
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(paths, build_allowed_context(dir.path(), &seeds).unwrap());
    }

    #[test]
    fn entry_serializes_camel_case() {
        let entry = AllowedContextEntry {
            path: "a.md".into(),
            absolute: PathBuf::from("/r/a.md"),
            line_count: 3,
            is_glob: false,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["lineCount"], 3);
        assert_eq!(json["isGlob"], false);
        assert_eq!(json["path"], "a.md");
    }
}
