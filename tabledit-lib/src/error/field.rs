//! CellError for positional table access

/// Error type for row/column addressing on a table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CellError {
    /// The row index is past the end of the table.
    #[error("Row {index} out of range (table has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    /// The column index is past the end of the header list.
    #[error("Column {index} out of range (table has {len} columns)")]
    ColumnOutOfRange { index: usize, len: usize },

    /// The header is not one of the table's current headers.
    #[error("Column '{header}' not found in table")]
    UnknownHeader { header: String },

    /// A replacement row does not have one cell per header.
    #[error("Row {index} has {actual} cells, expected {expected}")]
    WidthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

impl CellError {
    /// Creates a new unknown header error.
    pub fn unknown_header(header: impl Into<String>) -> Self {
        Self::UnknownHeader {
            header: header.into(),
        }
    }
}
