//! Text helpers shared across crates.

/// Count lines the way editors report them.
///
/// A trailing newline terminates the last line rather than opening a new one,
/// so `"a\nb\n"` and `"a\nb"` are both two lines. Empty text has zero lines.
pub fn count_lines(content: &str) -> usize {
    if content.is_empty() {
        return 0;
    }
    let newlines = content.matches('\n').count();
    if content.ends_with('\n') {
        newlines
    } else {
        newlines + 1
    }
}
