//! Deciding which nodes carry text a reader would see.

use crate::model::{NodeId, Tree};

use super::cleanup::normalize_whitespace;
use super::TextOptions;

/// A node judged visible, with the text it contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleText {
    /// The contributing element
    pub node: NodeId,

    /// Trimmed, non-empty text
    pub text: String,
}

/// Check whether an element's own text may be shown at all.
///
/// Comments, the document root and elements with a disallowed tag are
/// never visible. Descendants of a disallowed element are judged on their
/// own.
pub fn is_visible(tree: &Tree, id: NodeId, options: &TextOptions) -> bool {
    match tree.tag(id) {
        Some(tag) => !options.disallowed_tags.contains(tag),
        None => false,
    }
}

/// Text an element contributes, if any.
///
/// Direct text is used as is (trimmed), which keeps pre-rendered table
/// grids intact; otherwise the whole subtree's text is whitespace
/// normalized.
pub fn node_text(tree: &Tree, id: NodeId, options: &TextOptions) -> Option<String> {
    if is_opaque(tree, id, options) {
        return None;
    }
    let text = match direct_text(tree, id, options) {
        Some(direct) => direct.trim().to_string(),
        None => normalize_whitespace(&tree.text_content(id, &options.opaque_tags)),
    };
    (!text.is_empty()).then_some(text)
}

/// Direct text, unless it sits inside an opaque element.
fn direct_text<'t>(tree: &'t Tree, id: NodeId, options: &TextOptions) -> Option<&'t str> {
    let text = tree.direct_text(id)?;
    let hidden = tree
        .traverse(id)
        .skip(1)
        .any(|node| is_opaque(tree, node, options));
    (!hidden).then_some(text)
}

fn is_opaque(tree: &Tree, id: NodeId, options: &TextOptions) -> bool {
    tree.tag(id)
        .is_some_and(|tag| options.opaque_tags.contains(tag))
}

/// All visible elements with their text, in document order.
///
/// An element and its descendants may both appear; see
/// [`TextOptions::dedupe_nested`] for collapsing them during assembly.
pub fn visible_texts(tree: &Tree, options: &TextOptions) -> Vec<VisibleText> {
    tree.elements()
        .filter(|&id| is_visible(tree, id, options))
        .filter_map(|id| node_text(tree, id, options).map(|text| VisibleText { node: id, text }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;

    fn texts(html: &str) -> Vec<String> {
        let tree = parse_html(html);
        visible_texts(&tree, &TextOptions::default())
            .into_iter()
            .map(|v| v.text)
            .collect()
    }

    #[test]
    fn test_script_hidden() {
        let result = texts("<script>alert(1)</script><p>Visible</p>");
        assert_eq!(result, vec!["Visible"]);
    }

    #[test]
    fn test_head_content_hidden() {
        let result = texts(
            "<html><head><title>T</title><style>p{}</style><meta charset=utf-8></head>\
             <body><p>Body</p></body></html>",
        );
        assert_eq!(result, vec!["Body"]);
    }

    #[test]
    fn test_body_text_suppressed_but_children_evaluated() {
        let result = texts("<body>loose <div>boxed</div></body>");
        assert_eq!(result, vec!["boxed"]);
    }

    #[test]
    fn test_inline_script_excluded_from_subtree_text() {
        let result = texts("<div>before<script>var x = 1;</script>after</div>");
        assert_eq!(result, vec!["beforeafter"]);
    }

    #[test]
    fn test_lone_script_child_hidden() {
        let result = texts("<div><script>var x = 1;</script></div><p>after</p>");
        assert_eq!(result, vec!["after"]);
    }

    #[test]
    fn test_comment_text_never_visible() {
        let result = texts("<div><!-- secret --><p>shown</p> tail</div>");
        assert_eq!(result, vec!["shown tail", "shown"]);
    }

    #[test]
    fn test_nested_duplication() {
        let result = texts("<div><p>a</p><p>b</p></div>");
        // Block boundaries add no separator to subtree text
        assert_eq!(result, vec!["ab", "a", "b"]);
    }

    #[test]
    fn test_direct_text_keeps_newlines() {
        let result = texts("<div>  line one\nline two  </div>");
        assert_eq!(result, vec!["line one\nline two"]);
    }

    #[test]
    fn test_empty_nodes_dropped() {
        let result = texts("<div>   </div><p></p><p>x</p>");
        assert_eq!(result, vec!["x"]);
    }

    #[test]
    fn test_does_not_mutate() {
        let tree = parse_html("<div><p>a</p></div>");
        let before = tree.len();
        let _ = visible_texts(&tree, &TextOptions::default());
        assert_eq!(tree.len(), before);
    }

    #[test]
    fn test_custom_disallowed_set() {
        let tree = parse_html("<nav>menu</nav><p>content</p>");
        let options = TextOptions::default().with_disallowed_tags(["nav", "html", "head", "body"]);
        let result: Vec<_> = visible_texts(&tree, &options)
            .into_iter()
            .map(|v| v.text)
            .collect();
        assert_eq!(result, vec!["content"]);
    }
}
