//! Content-addressed capsule identifiers.

use sha2::{Digest, Sha256};

/// Hex characters kept from the digest.
pub const HASH_LEN: usize = 8;

/// `slug@hash8` over the raw source documents.
///
/// The digest covers the slug, then `spec`, `plan`, and `tasks` joined by
/// newlines. Rendering never feeds into it, so template edits alone keep the
/// identifier stable.
pub fn capsule_id(slug: &str, spec: &str, plan: &str, tasks: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(slug.as_bytes());
    hasher.update(spec.as_bytes());
    hasher.update(b"\n");
    hasher.update(plan.as_bytes());
    hasher.update(b"\n");
    hasher.update(tasks.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("{slug}@{}", &digest[..HASH_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_slug_at_eight_hex() {
        let id = capsule_id("001-demo", "s", "p", "t");
        let (slug, hash) = id.split_once('@').unwrap();
        assert_eq!(slug, "001-demo");
        assert_eq!(hash.len(), HASH_LEN);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn identical_inputs_identical_id() {
        assert_eq!(capsule_id("x", "a", "b", "c"), capsule_id("x", "a", "b", "c"));
    }

    #[test]
    fn any_document_edit_changes_id() {
        let base = capsule_id("x", "spec", "plan", "tasks");
        assert_ne!(base, capsule_id("x", "spec!", "plan", "tasks"));
        assert_ne!(base, capsule_id("x", "spec", "plan!", "tasks"));
        assert_ne!(base, capsule_id("x", "spec", "plan", "tasks!"));
    }

    #[test]
    fn slug_is_part_of_digest() {
        let a = capsule_id("one", "s", "p", "t");
        let b = capsule_id("two", "s", "p", "t");
        assert_ne!(a.split_once('@').unwrap().1, b.split_once('@').unwrap().1);
    }

    #[test]
    fn document_boundaries_matter() {
        assert_ne!(capsule_id("x", "ab", "c", ""), capsule_id("x", "a", "bc", ""));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn deterministic(slug in "[a-z0-9-]{1,12}", spec in ".*", plan in ".*", tasks in ".*") {
                prop_assert_eq!(
                    capsule_id(&slug, &spec, &plan, &tasks),
                    capsule_id(&slug, &spec, &plan, &tasks)
                );
            }
        }
    }
}
