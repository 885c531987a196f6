//! Textual purge of dangerous tag markers
//!
//! Runs on serialized markup and knows nothing about the tree it came from.
//! It strips any opening, closing or self-closing marker of a dangerous tag
//! that a parser/serializer mismatch might have let through.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::policy::DANGEROUS_TAGS;

static DANGEROUS_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    let names = DANGEROUS_TAGS.join("|");
    let pattern = format!(r"(?i)<\s*/?\s*(?:{names})(?:[\s/][^>]*)?(?:>|$)");
    Regex::new(&pattern).expect("invalid dangerous marker regex")
});

/// Strip dangerous tag markers, returning the cleaned markup and the number
/// of markers removed
pub fn purge_dangerous_markers(html: &str) -> (String, usize) {
    let mut removed = 0;
    let purged = DANGEROUS_MARKER
        .replace_all(html, |_caps: &Captures| {
            removed += 1;
            ""
        })
        .into_owned();
    (purged, removed)
}
