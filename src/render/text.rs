//! Plain text rendering of a parsed tree.
//!
//! Rendering runs three stages over the tree: tables become ASCII grids,
//! inline elements are unwrapped, then the text of every visible element
//! is assembled in document order.

use std::collections::HashSet;

use crate::model::{NodeId, Tree};

use super::cleanup::normalize_unicode;
use super::inline::flatten_inlines;
use super::table::TableTranscoder;
use super::visibility::{visible_texts, VisibleText};
use super::{ExtractionStats, RenderResult, TextOptions};

/// Render a tree to plain text.
pub fn to_text(tree: Tree, options: &TextOptions) -> String {
    TextRenderer::new(options.clone()).render(tree)
}

/// Render a tree to plain text with statistics.
pub fn to_text_with_stats(tree: Tree, options: &TextOptions) -> RenderResult {
    TextRenderer::new(options.clone()).render_with_stats(tree)
}

/// Plain text renderer.
pub struct TextRenderer {
    options: TextOptions,
    stats: ExtractionStats,
}

impl TextRenderer {
    /// Create a new text renderer.
    pub fn new(options: TextOptions) -> Self {
        Self {
            options,
            stats: ExtractionStats::new(),
        }
    }

    /// Render a tree to plain text.
    pub fn render(mut self, tree: Tree) -> String {
        self.render_internal(tree)
    }

    /// Render a tree to plain text with extraction statistics.
    pub fn render_with_stats(mut self, tree: Tree) -> RenderResult {
        let content = self.render_internal(tree);
        self.stats.count_text(&content);
        RenderResult::new(content, self.stats)
    }

    fn render_internal(&mut self, mut tree: Tree) -> String {
        let tables = TableTranscoder::new(&self.options).transcode(&mut tree);
        let inlines = flatten_inlines(&mut tree, &self.options);

        let blocks = select_blocks(&tree, &self.options);
        self.stats.table_count += tables as u32;
        self.stats.inline_count += inlines as u32;
        self.stats.block_count += blocks.len() as u32;

        join_blocks(&blocks, &self.options)
    }
}

/// Concatenate the text of visible nodes in document order.
///
/// Each contribution is written as a line break, the text, and another
/// line break.
pub fn assemble(tree: &Tree, options: &TextOptions) -> String {
    join_blocks(&select_blocks(tree, options), options)
}

fn join_blocks(blocks: &[VisibleText], options: &TextOptions) -> String {
    let mut output = String::new();
    for block in blocks {
        output.push('\n');
        output.push_str(&block.text);
        output.push('\n');
    }

    if options.normalize_unicode {
        output = normalize_unicode(&output);
    }
    output
}

/// Visible blocks that make it into the output.
pub(crate) fn select_blocks(tree: &Tree, options: &TextOptions) -> Vec<VisibleText> {
    let visible = visible_texts(tree, options);
    if !options.dedupe_nested {
        return visible;
    }

    // A contribution already covers its whole subtree
    let mut emitted: HashSet<NodeId> = HashSet::new();
    visible
        .into_iter()
        .filter(|block| {
            let covered = tree.ancestors(block.node).any(|a| emitted.contains(&a));
            if !covered {
                emitted.insert(block.node);
            }
            !covered
        })
        .collect()
}
