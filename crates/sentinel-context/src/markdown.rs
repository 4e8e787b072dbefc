//! Heading-scoped markdown extraction.
//!
//! A single forward scan over lines with two states: seeking the target
//! heading, or capturing under it at a recorded depth. Capture stops at the
//! next heading of equal or shallower depth; deeper headings are content.
//! No document tree is built.

/// Scanner state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scan {
    Seeking,
    Capturing { depth: usize },
}

/// Parse an ATX heading line into `(depth, title)`.
///
/// Requires 1–6 `#` followed by whitespace; the title is trimmed.
fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let depth = line.bytes().take_while(|&b| b == b'#').count();
    if depth == 0 || depth > 6 {
        return None;
    }
    let rest = &line[depth..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((depth, rest.trim()))
}

fn titles_match(title: &str, heading: &str) -> bool {
    title == heading || title.to_lowercase() == heading.to_lowercase()
}

/// Return the text under `heading`, up to the next heading of equal or
/// shallower depth.
///
/// Matching is case-insensitive on the trimmed heading text, at any depth.
/// Only the first matching heading is used. Leading and trailing blank lines
/// are dropped; everything else is returned verbatim. A missing heading
/// yields an empty string.
pub fn extract_section(markdown: &str, heading: &str) -> String {
    let heading = heading.trim();
    let mut state = Scan::Seeking;
    let mut bucket: Vec<&str> = Vec::new();

    for line in markdown.lines() {
        if let Some((depth, title)) = parse_heading(line) {
            match state {
                Scan::Seeking if titles_match(title, heading) => {
                    state = Scan::Capturing { depth };
                    continue;
                }
                Scan::Capturing { depth: captured } if depth <= captured => break,
                _ => {}
            }
        }
        if matches!(state, Scan::Capturing { .. }) {
            bucket.push(line);
        }
    }

    let start = bucket
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(bucket.len());
    let end = bucket
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(start, |idx| idx + 1);

    bucket[start..end].join("\n")
}

/// Strip a `-`, `*`, or `N.` bullet marker, returning the item text.
fn strip_bullet(line: &str) -> Option<&str> {
    let rest = if let Some(rest) = line.strip_prefix(['-', '*']) {
        rest
    } else {
        let digits = line.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        line[digits..].strip_prefix('.')?
    };
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let item = rest.trim();
    (!item.is_empty()).then_some(item)
}

/// Split a section into list items.
///
/// Bullet lines start a new item; other non-blank lines are appended to the
/// current item with a single space, so wrapped bullets stay whole. A
/// non-bullet line before any bullet starts an item of its own.
pub fn extract_list(section: &str) -> Vec<String> {
    collect_items(section, true)
}

/// Like [`extract_list`], but prose before the first bullet is dropped.
///
/// Used where every item must be a path, so an introductory sentence such
/// as `The following files:` is not mistaken for one.
pub fn extract_bullets(section: &str) -> Vec<String> {
    collect_items(section, false)
}

fn collect_items(section: &str, keep_leading_prose: bool) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut seen_bullet = false;

    for raw in section.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(item) = strip_bullet(line) {
            seen_bullet = true;
            if !current.is_empty() {
                items.push(std::mem::take(&mut current));
            }
            current.push_str(item);
        } else if seen_bullet || keep_leading_prose {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        items.push(current);
    }
    items
}

/// [`extract_section`] followed by [`extract_list`].
pub fn extract_list_from_heading(markdown: &str, heading: &str) -> Vec<String> {
    let section = extract_section(markdown, heading);
    if section.is_empty() {
        return Vec::new();
    }
    extract_list(&section)
}

/// [`extract_section`] followed by [`extract_bullets`].
pub fn extract_bullets_from_heading(markdown: &str, heading: &str) -> Vec<String> {
    extract_bullets(&extract_section(markdown, heading))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── extract_section ─────────────────────────────────────────────

    #[test]
    fn captures_until_next_sibling() {
        let md = "# Title\n\n## Goal\nShip X.\n\n## Next\nignored";
        assert_eq!(extract_section(md, "Goal"), "Ship X.");
    }

    #[test]
    fn heading_match_is_case_insensitive() {
        let md = "## required outputs\n- a.md\n";
        assert_eq!(extract_section(md, "Required Outputs"), "- a.md");
    }

    #[test]
    fn trailing_whitespace_on_heading_still_matches() {
        let md = "## Goal   \t\nShip X.\n";
        assert_eq!(extract_section(md, "Goal"), "Ship X.");
    }

    #[test]
    fn heading_argument_is_trimmed() {
        let md = "## Goal\nShip X.\n";
        assert_eq!(extract_section(md, "  Goal "), "Ship X.");
    }

    #[test]
    fn deeper_headings_are_content() {
        let md = "## Goal\nintro\n### Detail\nmore\n#### Deeper\nmost\n## Other\nno";
        assert_eq!(
            extract_section(md, "Goal"),
            "intro\n### Detail\nmore\n#### Deeper\nmost"
        );
    }

    #[test]
    fn shallower_heading_terminates() {
        let md = "### Goal\nbody\n# Top\nafter";
        assert_eq!(extract_section(md, "Goal"), "body");
    }

    #[test]
    fn only_first_occurrence_is_captured() {
        let md = "## Goal\nfirst\n## Goal\nsecond\n";
        assert_eq!(extract_section(md, "Goal"), "first");
    }

    #[test]
    fn missing_heading_yields_empty() {
        assert_eq!(extract_section("# Title\nbody", "Goal"), "");
        assert_eq!(extract_section("", "Goal"), "");
    }

    #[test]
    fn blank_lines_trimmed_but_inner_kept() {
        let md = "## Goal\n\n\n  line one\n\nline two\n\n\n## Next";
        assert_eq!(extract_section(md, "Goal"), "  line one\n\nline two");
    }

    #[test]
    fn hash_without_space_is_not_a_heading() {
        let md = "## Goal\n#hashtag\nbody\n## End";
        assert_eq!(extract_section(md, "Goal"), "#hashtag\nbody");
    }

    #[test]
    fn seven_hashes_is_not_a_heading() {
        let md = "# Goal\n####### not a heading\n# End";
        assert_eq!(extract_section(md, "Goal"), "####### not a heading");
    }

    #[test]
    fn crlf_line_endings() {
        let md = "## Goal\r\nShip X.\r\n## Next\r\n";
        assert_eq!(extract_section(md, "Goal"), "Ship X.");
    }

    #[test]
    fn heading_text_must_match_fully() {
        let md = "## Goals and more\nnope\n";
        assert_eq!(extract_section(md, "Goal"), "");
    }

    // ── extract_list ────────────────────────────────────────────────

    #[test]
    fn mixed_bullet_styles() {
        let section = "- dash\n* star\n1. one\n12. twelve";
        assert_eq!(extract_list(section), vec!["dash", "star", "one", "twelve"]);
    }

    #[test]
    fn continuation_lines_are_space_joined() {
        let section = "- first line\n  continues here\n\n- second";
        assert_eq!(
            extract_list(section),
            vec!["first line continues here", "second"]
        );
    }

    #[test]
    fn empty_section_yields_no_items() {
        assert!(extract_list("").is_empty());
        assert!(extract_list("\n  \n").is_empty());
    }

    #[test]
    fn bare_marker_is_not_a_bullet() {
        assert_eq!(extract_list("- a\n-\n"), vec!["a -"]);
    }

    #[test]
    fn emphasis_is_not_a_bullet() {
        assert_eq!(extract_list("**bold** intro\n- item"), vec!["**bold** intro", "item"]);
    }

    #[test]
    fn leading_prose_forms_its_own_item() {
        assert_eq!(extract_list("Paths:\n- a.md"), vec!["Paths:", "a.md"]);
    }

    #[test]
    fn bullets_drop_leading_prose_only() {
        let section = "The following files:\nread first.\n- a.md\n  continued\n- b.md";
        assert_eq!(extract_bullets(section), vec!["a.md continued", "b.md"]);
        assert!(extract_bullets("Nothing listed yet.").is_empty());
    }

    #[test]
    fn bullets_from_heading() {
        let md = "## Allowed Context\nThe following files:\n- docs/a.md\n## Next\n- no";
        assert_eq!(extract_bullets_from_heading(md, "Allowed Context"), vec!["docs/a.md"]);
        assert!(extract_bullets_from_heading(md, "Missing").is_empty());
    }

    #[test]
    fn list_from_heading() {
        let md = "## Router Notes\n- use capsule\n- keep it short\n## Other\n- nope";
        assert_eq!(
            extract_list_from_heading(md, "Router Notes"),
            vec!["use capsule", "keep it short"]
        );
        assert!(extract_list_from_heading(md, "Missing").is_empty());
    }
}
