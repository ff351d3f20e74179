//! Positional table row

/// One row of a table.
///
/// Cells are stored positionally: cell `i` belongs to the table's header `i`.
/// The owning [`Table`](super::Table) keeps every row exactly as wide as its
/// header list, so a row can never carry a stray or missing column key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub(crate) cells: Vec<String>,
}

impl Row {
    /// Creates a row of `width` empty cells.
    pub fn blank(width: usize) -> Self {
        Self {
            cells: vec![String::new(); width],
        }
    }

    /// Creates a row from its cell values.
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the cell at a column position.
    pub fn get(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(|s| s.as_str())
    }

    /// Returns all cells in column order.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Returns the number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
