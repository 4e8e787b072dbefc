//! Reference normalization.
//!
//! A reference is a root-relative path, possibly carrying wildcards. Only the
//! literal prefix before the first wildcard is resolved against the root, so
//! the escape check never depends on what a glob might later match.

use std::path::{Component, Path, PathBuf};

use crate::errors::ReferenceError;

/// The only wildcard. `?`, `[` and `]` are literal path characters, so a
/// markdown link such as `[guide](docs/a.md)` is a plain (missing) path.
pub const GLOB_MARKER: char = '*';

/// Whether `reference` contains a wildcard.
pub fn has_glob(reference: &str) -> bool {
    reference.contains(GLOB_MARKER)
}

/// Split at the first wildcard: `(literal, rest)`.
///
/// For non-glob references `rest` is empty.
pub fn split_glob(reference: &str) -> (&str, &str) {
    match reference.find(GLOB_MARKER) {
        Some(idx) => reference.split_at(idx),
        None => (reference, ""),
    }
}

/// Literal base: text before the first wildcard, trailing `/` removed, `.` when empty.
pub fn glob_base(reference: &str) -> &str {
    let (literal, _) = split_glob(reference);
    let base = literal.trim_end_matches('/');
    if base.is_empty() { "." } else { base }
}

/// Directory to walk when discovering matches for `reference`.
///
/// For globs, the literal prefix cut back to its last complete directory
/// (`docs/cap*.md` → `docs`). For plain references, the reference itself.
pub fn scan_base(reference: &str) -> &str {
    if !has_glob(reference) {
        return if reference.is_empty() { "." } else { reference };
    }
    let (literal, _) = split_glob(reference);
    match literal.rfind('/') {
        Some(0) => "/",
        Some(idx) => &literal[..idx],
        None => ".",
    }
}

/// Textual cleanup shared by references and config entries.
///
/// Trims, converts `\` to `/`, collapses repeated slashes, then strips any
/// leading `./`. Returns an empty string for blank input.
pub fn clean_reference(raw: &str) -> String {
    let mut text = raw.trim().replace('\\', "/");
    while text.contains("//") {
        text = text.replace("//", "/");
    }
    let mut view = text.as_str();
    while let Some(rest) = view.strip_prefix("./") {
        view = rest;
    }
    view.to_string()
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// `..` at the top of an absolute path stays at the root; at the top of a
/// relative path it is kept.
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    let _ = out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Join path components with `/`.
pub fn to_posix(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Absolute, lexically normalized form of `root`.
pub fn absolute_root(root: &Path) -> std::io::Result<PathBuf> {
    Ok(lexical_normalize(&std::path::absolute(root)?))
}

/// Normalize `raw` into a canonical root-relative reference.
///
/// Fails with [`ReferenceError::InvalidReference`] for blank input, for a
/// literal base that resolves outside `root`, and for a `..` segment after a
/// wildcard. Absolute references inside the root come back relative.
pub fn normalize_reference(root: &Path, raw: &str) -> Result<String, ReferenceError> {
    if raw.trim().is_empty() {
        return Err(ReferenceError::invalid(raw, "reference is empty"));
    }
    let cleaned = clean_reference(raw);
    let cleaned = if cleaned.is_empty() { ".".to_string() } else { cleaned };

    let (literal, rest) = split_glob(&cleaned);
    if rest.split('/').any(|segment| segment == "..") {
        return Err(ReferenceError::invalid(
            raw,
            "'..' is not allowed after a wildcard",
        ));
    }

    let root_abs = absolute_root(root)
        .map_err(|e| ReferenceError::invalid(raw, format!("cannot resolve root: {e}")))?;
    let resolved = lexical_normalize(&root_abs.join(glob_base(&cleaned)));
    let Ok(relative) = resolved.strip_prefix(&root_abs) else {
        return Err(ReferenceError::invalid(raw, "escapes repository root"));
    };
    let relative = to_posix(relative);

    if rest.is_empty() {
        return Ok(if relative.is_empty() { ".".into() } else { relative });
    }
    let sep = if literal.ends_with('/') && !relative.is_empty() { "/" } else { "" };
    Ok(format!("{relative}{sep}{rest}"))
}

/// Check that a canonical reference exists under `root`.
///
/// Plain references must exist as-is. Globs need their literal base to exist:
/// `docs/cap*.md` requires `docs/cap`, `docs/*.md` requires `docs`. `.` always
/// exists.
pub fn assert_exists(root: &Path, canonical: &str) -> Result<(), ReferenceError> {
    if canonical == "." {
        return Ok(());
    }
    let target = glob_base(canonical);
    if target == "." || root.join(target).exists() {
        Ok(())
    } else {
        Err(ReferenceError::MissingReference {
            path: canonical.to_string(),
        })
    }
}
