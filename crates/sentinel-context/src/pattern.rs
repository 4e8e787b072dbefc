//! Reference patterns compiled once.
//!
//! A [`RefPattern`] carries the literal base used for escape checks, the
//! directory to walk, and (for globs) a compiled matcher. Discovery and
//! override matching reuse the same value instead of re-deriving the base
//! per file.

use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::errors::ReferenceError;
use crate::paths::{glob_base, has_glob, scan_base, to_posix};

/// Directories never descended into while discovering glob matches.
const SKIP_DIRS: &[&str] = &[".git", "node_modules", "target"];

/// A normalized reference, possibly a glob.
#[derive(Clone, Debug)]
pub struct RefPattern {
    raw: String,
    literal_base: String,
    scan_base: String,
    matcher: Option<GlobMatcher>,
}

impl RefPattern {
    /// Compile an already-normalized reference.
    ///
    /// `*` stays within one path segment, `**` crosses segments, and dotfiles
    /// match wildcards. Every other glob metacharacter matches itself.
    pub fn new(pattern: &str) -> Result<Self, ReferenceError> {
        let matcher = if has_glob(pattern) {
            let glob = GlobBuilder::new(&escape_literals(pattern))
                .literal_separator(true)
                .backslash_escape(true)
                .build()
                .map_err(|e| ReferenceError::invalid(pattern, e.kind().to_string()))?;
            Some(glob.compile_matcher())
        } else {
            None
        };
        Ok(Self {
            raw: pattern.to_string(),
            literal_base: glob_base(pattern).to_string(),
            scan_base: scan_base(pattern).to_string(),
            matcher,
        })
    }

    /// The pattern text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Text before the first wildcard, trailing `/` removed.
    pub fn literal_base(&self) -> &str {
        &self.literal_base
    }

    /// Directory walked during discovery.
    pub fn scan_base(&self) -> &str {
        &self.scan_base
    }

    /// Whether this pattern carries a wildcard.
    pub fn is_glob(&self) -> bool {
        self.matcher.is_some()
    }

    /// Whether a root-relative posix path matches.
    pub fn matches(&self, relative: &str) -> bool {
        match &self.matcher {
            Some(matcher) => matcher.is_match(relative),
            None => relative == self.raw,
        }
    }

    /// Root-relative paths of the files this pattern selects, sorted.
    ///
    /// A plain pattern yields its file when it exists, else nothing. A glob
    /// walks the scan base; a missing scan base yields nothing.
    pub fn discover(&self, root: &Path) -> Vec<String> {
        let Some(matcher) = &self.matcher else {
            return if root.join(&self.raw).is_file() {
                vec![self.raw.clone()]
            } else {
                Vec::new()
            };
        };

        let base = root.join(&self.scan_base);
        if !base.is_dir() {
            debug!(pattern = %self.raw, base = %base.display(), "scan base missing");
            return Vec::new();
        }

        let walker = walkdir::WalkDir::new(&base).sort_by_file_name();
        let mut found = Vec::new();
        for entry in walker.into_iter().filter_entry(|e| {
            !(e.depth() > 0
                && e.file_type().is_dir()
                && SKIP_DIRS.contains(&e.file_name().to_string_lossy().as_ref()))
        }) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(pattern = %self.raw, error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let relative = to_posix(relative);
            if matcher.is_match(&relative) {
                found.push(relative);
            }
        }
        found.sort();
        found
    }
}

/// Backslash-escape glob syntax other than `*`.
fn escape_literals(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '?' | '[' | ']' | '{' | '}' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
