//! ASCII rendering of HTML tables.
//!
//! Every `<table>` is measured into a [`TableModel`] and swapped for a
//! single `<div>` holding a fixed-width grid. Inner tables are handled
//! before the tables containing them, so an inner grid ends up as plain
//! text inside the outer cell.

use crate::model::{Element, NodeId, TableModel, TableRow, Tree};

use super::cleanup::normalize_whitespace;
use super::TextOptions;

/// Replaces tables in a tree with pre-rendered ASCII grids.
pub struct TableTranscoder<'a> {
    options: &'a TextOptions,
}

impl<'a> TableTranscoder<'a> {
    /// Create a transcoder using the given separators.
    pub fn new(options: &'a TextOptions) -> Self {
        Self { options }
    }

    /// Replace every table reachable from the root.
    ///
    /// Tables without rows are left in place. Returns the number of tables
    /// replaced.
    pub fn transcode(&self, tree: &mut Tree) -> usize {
        let mut tables: Vec<NodeId> = tree.elements_by_tag("table").collect();
        // Deepest first; among equals, document order
        let depth = |id: NodeId| tree.ancestors(id).count();
        tables.sort_by_key(|&id| std::cmp::Reverse(depth(id)));

        let mut replaced = 0;
        for table in tables {
            let Some(model) = self.measure(tree, table) else {
                log::debug!("Leaving table without rows in place");
                continue;
            };
            let grid = self.render(&model);
            let text = tree.create_text(grid);
            let block = tree.create_element(Element::new("div"));
            tree.append(block, text);
            if tree.replace(table, block) {
                replaced += 1;
            }
        }

        log::debug!("Rendered {} tables as ASCII", replaced);
        replaced
    }

    /// Build the layout model of one table, or `None` if it has no rows.
    pub fn measure(&self, tree: &Tree, table: NodeId) -> Option<TableModel> {
        let rows = descendants_within(tree, table, &["tr"]);
        if rows.is_empty() {
            return None;
        }

        let mut model = TableModel::new();
        for row in rows {
            let cells: Vec<(String, usize)> = descendants_within(tree, row, &["td", "th"])
                .into_iter()
                .map(|cell| {
                    let text = normalize_whitespace(
                        &tree.text_content(cell, &self.options.opaque_tags),
                    );
                    (text, colspan(tree, cell))
                })
                .collect();
            if !cells.is_empty() {
                model.add_row(TableRow::new(cells));
            }
        }
        Some(model)
    }

    /// Render a table model as text: border, one line per row, border.
    pub fn render(&self, model: &TableModel) -> String {
        let separator = self.options.column_separator.as_str();
        let separator_width = separator.chars().count();
        let left = separator.trim_start();

        let border_len = 1 + separator_width * model.column_count() + model.width();
        let border = self.options.border_fill.repeat(border_len);

        let mut output = String::new();
        output.push_str(&border);
        output.push('\n');

        for row in &model.rows {
            output.push_str(left);
            for cell in &row.cells {
                let mut field = model.column_width(cell.column).unwrap_or(0) + separator_width;
                // Spans past the last tracked column add nothing
                let spanned = cell.column + 1..cell.column.saturating_add(cell.colspan.max(1));
                for width in model.column_widths.range(spanned).map(|(_, w)| w) {
                    field += width + separator_width;
                }
                let content = format!("{}{}", cell.text, separator);
                output.push_str(&format!("{:>width$}", content, width = field));
            }
            output.push('\n');
        }

        output.push_str(&border);
        output.push('\n');
        output
    }
}

/// Descendants of `scope` whose tag is in `tags`, in document order,
/// without entering tables nested inside `scope`.
fn descendants_within(tree: &Tree, scope: NodeId, tags: &[&str]) -> Vec<NodeId> {
    let mut found = Vec::new();
    let mut stack: Vec<NodeId> = tree.get(scope).children().iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        match tree.tag(id) {
            Some("table") => continue,
            Some(tag) if tags.contains(&tag) => found.push(id),
            _ => {}
        }
        stack.extend(tree.get(id).children().iter().rev().copied());
    }
    found
}

/// A cell's `colspan`; missing, unparseable and non-positive values are 1.
fn colspan(tree: &Tree, cell: NodeId) -> usize {
    let Some(raw) = tree.get(cell).element().and_then(|e| e.attr("colspan")) else {
        return 1;
    };
    match raw.trim().parse::<i64>() {
        Ok(span) if span > 0 => usize::try_from(span).unwrap_or(1),
        _ => {
            log::debug!("Treating colspan {:?} as 1", raw);
            1
        }
    }
}
