//! Comprehensive tests for scour-html
//!
//! Parse/serialize behaviour on realistic and hostile markup.

use scour_dom::{NodeData, NodeId};
use scour_html::{HtmlParser, HtmlSerializer, parse, serialize};

fn body_html(html: &str) -> String {
    let tree = parse(html).expect("parse");
    let mut current = tree.next_in_preorder(tree.root());
    while current.is_valid() {
        if let Some(elem) = tree.get(current).and_then(|n| n.as_element()) {
            if elem.name == "body" {
                return HtmlSerializer::new().serialize_inner(&tree, current);
            }
        }
        current = tree.next_in_preorder(current);
    }
    String::new()
}

// ============================================================================
// PARSING
// ============================================================================

#[test]
fn test_parse_empty_input() {
    let tree = HtmlParser::new().parse("").expect("parse");
    assert!(tree.len() >= 1, "Even empty HTML should have root");
}

#[test]
fn test_parse_text_only() {
    assert_eq!(body_html("Hello World"), "Hello World");
}

#[test]
fn test_parse_malformed_html() {
    let html = "<div><p>Unclosed paragraph<span>Unclosed span</div><p>Another";
    let out = body_html(html);
    assert!(out.contains("Unclosed paragraph"));
    assert!(out.contains("Another"));
}

#[test]
fn test_parse_comments_are_nodes() {
    let tree = parse("<!-- note --><p>x</p>").expect("parse");
    let mut comments = 0;
    let mut current = tree.next_in_preorder(tree.root());
    while current.is_valid() {
        if matches!(tree.get(current).map(|n| &n.data), Some(NodeData::Comment(_))) {
            comments += 1;
        }
        current = tree.next_in_preorder(current);
    }
    assert_eq!(comments, 1);
}

#[test]
fn test_parse_script_content_is_text() {
    let tree = parse("<script>if (a < b) { x() }</script>").expect("parse");
    assert!(tree.text_content(NodeId::ROOT).contains("a < b"));
}

// ============================================================================
// SERIALIZATION
// ============================================================================

#[test]
fn test_round_trip_simple_markup() {
    let html = "<p>Hello <strong>world</strong>!</p>";
    assert_eq!(body_html(html), html);
}

#[test]
fn test_round_trip_entities() {
    let out = body_html("<p>&lt;tag&gt; &amp; &quot;quotes&quot;</p>");
    assert_eq!(out, "<p>&lt;tag&gt; &amp; \"quotes\"</p>");
}

#[test]
fn test_round_trip_unicode() {
    let html = "<p>Hello 世界! 🚀 Ñoño</p>";
    assert_eq!(body_html(html), html);
}

#[test]
fn test_attribute_values_are_requoted() {
    let out = body_html("<a href=/x title='say \"hi\"'>x</a>");
    assert_eq!(out, "<a href=\"/x\" title=\"say &quot;hi&quot;\">x</a>");
}

#[test]
fn test_serialize_whole_document() {
    let tree = parse("<p>x</p>").expect("parse");
    assert_eq!(serialize(&tree), "<html><head></head><body><p>x</p></body></html>");
}

#[test]
fn test_reserialize_is_stable() {
    let inputs = [
        "<table><tr><td>1</td></tr></table>",
        "<pre>\n\nindented</pre>",
        "<ul><li>a<li>b</ul>",
        "<svg><rect width=\"1\"/></svg>",
    ];
    for input in inputs {
        let once = serialize(&parse(input).expect("parse"));
        let twice = serialize(&parse(&once).expect("parse"));
        assert_eq!(once, twice, "unstable serialization for {input}");
    }
}

// ============================================================================
// DEEP NESTING
// ============================================================================

#[test]
fn test_deep_nesting_does_not_overflow() {
    let depth = 20_000;
    let mut html = String::new();
    for _ in 0..depth {
        html.push_str("<span>");
    }
    html.push_str("core");

    let tree = parse(&html).expect("parse");
    let out = serialize(&tree);
    assert!(out.contains("core"));
    assert_eq!(out.matches("<span>").count(), depth);
}
