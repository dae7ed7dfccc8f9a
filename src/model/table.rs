//! Table types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Layout model of one physical table, built from its rows and cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableModel {
    /// Rows with at least one cell, in document order
    pub rows: Vec<TableRow>,

    /// Column index to the longest cell text seen at that index (in chars)
    pub column_widths: BTreeMap<usize, usize>,
}

impl TableModel {
    /// Create a new empty table model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row, widening columns as needed.
    ///
    /// Cells are measured at their ordinal position within this row. Spans
    /// in earlier rows do not shift that position.
    pub fn add_row(&mut self, row: TableRow) {
        for cell in &row.cells {
            let width = cell.width();
            self.column_widths
                .entry(cell.column)
                .and_modify(|w| *w = (*w).max(width))
                .or_insert(width);
        }
        self.rows.push(row);
    }

    /// Number of tracked columns.
    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }

    /// Width recorded for a column, if it is tracked.
    pub fn column_width(&self, column: usize) -> Option<usize> {
        self.column_widths.get(&column).copied()
    }

    /// Sum of all column widths.
    pub fn width(&self) -> usize {
        self.column_widths.values().sum()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if any cell spans more than one column.
    pub fn has_merged_cells(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .any(|c| c.colspan > 1)
    }
}

/// A table row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<Cell>,
}

impl TableRow {
    /// Create a row, numbering cells by their position.
    pub fn new(cells: impl IntoIterator<Item = (String, usize)>) -> Self {
        Self {
            cells: cells
                .into_iter()
                .enumerate()
                .map(|(column, (text, colspan))| Cell::new(text, colspan, column))
                .collect(),
        }
    }

    /// Create a row from text values, each spanning one column.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(|v| (v.into(), 1)))
    }
}

/// A table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Normalized cell text
    pub text: String,

    /// Number of columns this cell spans (at least 1)
    pub colspan: usize,

    /// Column index the cell starts at
    pub column: usize,
}

impl Cell {
    /// Create a cell. A zero colspan is raised to 1.
    pub fn new(text: impl Into<String>, colspan: usize, column: usize) -> Self {
        Self {
            text: text.into(),
            colspan: colspan.max(1),
            column,
        }
    }

    /// Display width of the text in chars.
    pub fn width(&self) -> usize {
        self.text.chars().count()
    }
}
