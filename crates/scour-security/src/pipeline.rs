//! Sanitization pipeline
//!
//! parse → tag filter → attribute/URL filter → link hardening → serialize →
//! marker purge. Every tree walk is iterative.

use scour_dom::{DomTree, Namespace, Node, NodeData, NodeId};
use scour_html::ParseError;
use serde::Serialize;

use crate::policy::{Mode, Policy, TagDecision};
use crate::purge::purge_dangerous_markers;
use crate::url_policy;

/// What a single sanitization removed or rewrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeStats {
    /// Elements removed together with their content
    pub discarded_elements: usize,
    /// Elements replaced by their children
    pub unwrapped_elements: usize,
    /// Attributes outside the allow-list (or forbidden)
    pub removed_attributes: usize,
    /// URL attributes that failed the URL policy
    pub rejected_urls: usize,
    /// Anchors given `target`/`rel`
    pub hardened_links: usize,
    /// Markers stripped by the textual purge
    pub purged_markers: usize,
    /// Comments, doctypes and processing instructions
    pub dropped_nodes: usize,
}

/// Sanitized markup plus what it took to get there
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sanitized {
    pub html: String,
    pub stats: SanitizeStats,
}

/// Sanitize `raw` under `policy`.
///
/// Never fails: if the parser aborts, the result is the empty string.
pub fn sanitize(policy: &Policy, raw: &str, mode: Mode) -> String {
    match sanitize_with_stats(policy, raw, mode) {
        Ok(sanitized) => sanitized.html,
        Err(err) => {
            tracing::warn!("Sanitization aborted, returning empty output: {}", err);
            String::new()
        }
    }
}

/// Sanitize `raw` under `policy`, reporting what was removed
pub fn sanitize_with_stats(
    policy: &Policy,
    raw: &str,
    mode: Mode,
) -> Result<Sanitized, ParseError> {
    if raw.trim().is_empty() {
        return Ok(Sanitized {
            html: raw.to_string(),
            stats: SanitizeStats::default(),
        });
    }

    let mut stats = SanitizeStats::default();

    let mut tree = scour_html::parse(raw)?;
    if mode == Mode::Svg && !has_svg_root(&tree) {
        tracing::debug!("No <svg> element in diagram input, wrapping it");
        tree = scour_html::parse(&format!("<svg>{raw}</svg>"))?;
    }

    filter_tags(policy, mode, &mut tree, &mut stats);
    filter_attributes(policy, mode, &mut tree, &mut stats);

    let serialized = scour_html::serialize(&tree);
    let (html, purged) = purge_dangerous_markers(&serialized);
    stats.purged_markers = purged;
    if purged > 0 {
        tracing::warn!("Purged {} dangerous markers after serialization", purged);
    }

    tracing::debug!(
        "Sanitized {} bytes into {} bytes ({:?} mode): {:?}",
        raw.len(),
        html.len(),
        mode,
        stats
    );

    Ok(Sanitized { html, stats })
}

/// Whether the tree holds an `svg` element in the SVG namespace
fn has_svg_root(tree: &DomTree) -> bool {
    let mut current = tree.next_in_preorder(tree.root());
    while current.is_valid() {
        let is_svg = tree
            .get(current)
            .and_then(Node::as_element)
            .is_some_and(|elem| elem.namespace == Namespace::Svg && elem.tag_name() == "svg");
        if is_svg {
            return true;
        }
        current = tree.next_in_preorder(current);
    }
    false
}

/// What the tag walk does with a node
enum Visit {
    Descend,
    Unwrap,
    Discard,
    Drop,
}

fn visit(policy: &Policy, mode: Mode, node: &Node) -> Visit {
    match &node.data {
        NodeData::Document | NodeData::Text(_) => Visit::Descend,
        NodeData::Comment(_)
        | NodeData::Doctype { .. }
        | NodeData::ProcessingInstruction { .. } => Visit::Drop,
        NodeData::Element(elem) => match policy.decide(mode, elem.namespace, &elem.name) {
            TagDecision::Keep(_) => Visit::Descend,
            TagDecision::Unwrap => {
                tracing::trace!("Unwrapping <{}>", elem.name);
                Visit::Unwrap
            }
            TagDecision::Discard => {
                tracing::trace!("Discarding <{}> and its content", elem.name);
                Visit::Discard
            }
        },
    }
}

/// Apply the tag decisions in place, in document order.
///
/// Children spliced out of an unwrapped element are visited next, so each
/// one is judged on its own.
fn filter_tags(policy: &Policy, mode: Mode, tree: &mut DomTree, stats: &mut SanitizeStats) {
    let mut current = tree.next_in_preorder(tree.root());

    while current.is_valid() {
        let Some(node) = tree.get(current) else {
            break;
        };

        current = match visit(policy, mode, node) {
            Visit::Descend => tree.next_in_preorder(current),
            Visit::Unwrap => {
                stats.unwrapped_elements += 1;
                let after = tree.next_after_subtree(current);
                let first = tree.unwrap(current);
                if first.is_valid() { first } else { after }
            }
            Visit::Discard => {
                stats.discarded_elements += 1;
                remove_subtree(tree, current)
            }
            Visit::Drop => {
                stats.dropped_nodes += 1;
                remove_subtree(tree, current)
            }
        };
    }
}

/// Detach a subtree, returning the node the walk continues with
fn remove_subtree(tree: &mut DomTree, id: NodeId) -> NodeId {
    let after = tree.next_after_subtree(id);
    tree.detach(id);
    after
}

/// Strip attributes, validate URLs and harden links on every surviving element
fn filter_attributes(
    policy: &Policy,
    mode: Mode,
    tree: &mut DomTree,
    stats: &mut SanitizeStats,
) {
    let mut current = tree.next_in_preorder(tree.root());

    while current.is_valid() {
        let next = tree.next_in_preorder(current);
        let Some(elem) = tree.get_mut(current).and_then(Node::as_element_mut) else {
            current = next;
            continue;
        };
        let Some(profile) = Policy::profile_for(mode, elem.namespace) else {
            current = next;
            continue;
        };

        let tag = elem.tag_name();
        let allowed = policy.allowed_attributes(profile, &tag);

        elem.attrs.retain(|attr| {
            let name = attr.name.to_ascii_lowercase();
            if !allowed.contains(name.as_str()) {
                tracing::trace!("Removing attribute {} from <{}>", attr.name, tag);
                stats.removed_attributes += 1;
                return false;
            }
            if !url_policy::is_safe_url(&name, &attr.value) {
                tracing::trace!("Rejecting URL in {} on <{}>", attr.name, tag);
                stats.rejected_urls += 1;
                return false;
            }
            true
        });

        match (elem.namespace, tag.as_str()) {
            (Namespace::Html, "a") => {
                elem.set_attr("target", "_blank");
                elem.set_attr("rel", "noopener noreferrer");
                stats.hardened_links += 1;
            }
            (Namespace::Svg, "svg") if mode == Mode::Svg => {
                elem.set_attr("xmlns", Namespace::SVG_URI);
            }
            _ => {}
        }

        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(raw: &str, mode: Mode) -> Sanitized {
        sanitize_with_stats(&Policy::standard(), raw, mode).unwrap()
    }

    #[test]
    fn test_allowed_markup_unchanged() {
        let out = clean("<p>Hello <em>there</em></p>", Mode::Html);
        assert_eq!(out.html, "<p>Hello <em>there</em></p>");
        assert_eq!(out.stats.discarded_elements, 0);
        assert_eq!(out.stats.removed_attributes, 0);
    }

    #[test]
    fn test_unknown_tags_unwrap_recursively() {
        let out = clean("<my-card><font><b>bold</b></font> tail</my-card>", Mode::Html);
        assert_eq!(out.html, "<b>bold</b> tail");
        // html, head, body, my-card, font
        assert_eq!(out.stats.unwrapped_elements, 5);
    }

    #[test]
    fn test_discard_removes_content() {
        let out = clean("<p>a<script>alert(1)</script>b</p>", Mode::Html);
        assert_eq!(out.html, "<p>ab</p>");
        assert_eq!(out.stats.discarded_elements, 1);
    }

    #[test]
    fn test_comments_dropped() {
        let out = clean("<!--[if IE]><script>x</script><![endif]--><p>x</p>", Mode::Html);
        assert_eq!(out.html, "<p>x</p>");
        assert_eq!(out.stats.dropped_nodes, 1);
    }

    #[test]
    fn test_attribute_and_url_stats() {
        let out = clean(
            "<img src=\"javascript:x\" alt=\"a\" onerror=\"x\" style=\"color:red\">",
            Mode::Html,
        );
        assert_eq!(out.html, "<img alt=\"a\">");
        assert_eq!(out.stats.removed_attributes, 2);
        assert_eq!(out.stats.rejected_urls, 1);
    }

    #[test]
    fn test_links_hardened_in_place() {
        let out = clean(
            "<a href=\"https://example.com\" target=\"_self\" rel=\"opener\">x</a>",
            Mode::Html,
        );
        assert_eq!(
            out.html,
            "<a href=\"https://example.com\" target=\"_blank\" rel=\"noopener noreferrer\">x</a>"
        );
        assert_eq!(out.stats.hardened_links, 1);
    }

    #[test]
    fn test_svg_in_html_mode_is_unwrapped() {
        let out = clean("<svg><rect width=\"1\"/><text>label</text></svg>", Mode::Html);
        assert_eq!(out.html, "label");
    }

    #[test]
    fn test_svg_in_mixed_mode_is_kept() {
        let out = clean(
            "<p>chart</p><svg viewBox=\"0 0 1 1\"><rect width=\"1\"/></svg>",
            Mode::Mixed,
        );
        assert_eq!(
            out.html,
            "<p>chart</p><svg viewBox=\"0 0 1 1\"><rect width=\"1\"></rect></svg>"
        );
    }

    #[test]
    fn test_svg_mode_wraps_bare_fragments() {
        let out = clean("<circle cx=\"1\" cy=\"1\" r=\"1\"/>", Mode::Svg);
        assert_eq!(
            out.html,
            "<svg xmlns=\"http://www.w3.org/2000/svg\">\
             <circle cx=\"1\" cy=\"1\" r=\"1\"></circle></svg>"
        );
    }

    #[test]
    fn test_svg_mode_wraps_when_svg_only_appears_as_text() {
        let out = clean("<!-- exported <svg> --><rect width=\"1\"/>", Mode::Svg);
        assert_eq!(
            out.html,
            "<svg xmlns=\"http://www.w3.org/2000/svg\"><rect width=\"1\"></rect></svg>"
        );

        let out = clean("<p title=\"<svg>\"><rect/></p>", Mode::Svg);
        assert!(out.html.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\">"));
    }

    #[test]
    fn test_svg_mode_overrides_namespace_attribute() {
        let out = clean("<svg xmlns=\"http://evil.example\"><g></g></svg>", Mode::Svg);
        assert_eq!(out.html, "<svg xmlns=\"http://www.w3.org/2000/svg\"><g></g></svg>");
    }

    #[test]
    fn test_whitespace_input_returned_unchanged() {
        let out = clean("  \n\t ", Mode::Html);
        assert_eq!(out.html, "  \n\t ");
        assert_eq!(out.stats, SanitizeStats::default());
    }

    #[test]
    fn test_template_content_is_dropped() {
        let out = clean("<template><p>hidden</p></template><p>shown</p>", Mode::Html);
        assert_eq!(out.html, "<p>shown</p>");
    }
}
