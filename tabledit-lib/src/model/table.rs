//! In-memory table snapshot

use super::Row;
use crate::error::CellError;
use crate::error::InvariantViolation;

/// A loaded table: an ordered header list and rows aligned to it.
///
/// Every structural operation (adding, renaming or removing a column) updates
/// the headers and all rows in one step.
///
/// # Example
///
/// ```
/// use tabledit_lib::model::Table;
///
/// let mut table = Table::new(vec!["name".to_string(), "age".to_string()]);
/// table.push_blank_row();
/// table.set_cell(0, 0, "Ada").unwrap();
///
/// assert_eq!(table.cell(0, "name"), Some("Ada"));
/// assert_eq!(table.cell(0, "age"), Some(""));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub(crate) headers: Vec<String>,
    pub(crate) rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table with the given headers.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Creates a table from headers and rows, checking the row widths.
    pub fn with_rows(headers: Vec<String>, rows: Vec<Row>) -> Result<Self, CellError> {
        ensure_width(headers.len(), &rows)?;
        Ok(Self { headers, rows })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the canonical headers in column order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Returns the rows in order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns a row by index.
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Returns the position of the first column with the given header.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Returns `true` if some column has the given header.
    pub fn has_header(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }

    /// Returns a cell by row index and header name.
    pub fn cell(&self, row: usize, header: &str) -> Option<&str> {
        let column = self.column_index(header)?;
        self.rows.get(row)?.get(column)
    }

    // =========================================================================
    // Cell and row edits
    // =========================================================================

    /// Replaces one cell.
    pub fn set_cell(
        &mut self,
        row: usize,
        column: usize,
        value: impl Into<String>,
    ) -> Result<(), CellError> {
        let width = self.headers.len();
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(row)
            .ok_or(CellError::RowOutOfRange { index: row, len })?;
        let cell = row
            .cells
            .get_mut(column)
            .ok_or(CellError::ColumnOutOfRange {
                index: column,
                len: width,
            })?;
        *cell = value.into();
        Ok(())
    }

    /// Appends a row with an empty cell under every current header.
    pub fn push_blank_row(&mut self) {
        self.rows.push(Row::blank(self.headers.len()));
    }

    /// Removes a row and returns it.
    pub fn remove_row(&mut self, index: usize) -> Result<Row, CellError> {
        if index >= self.rows.len() {
            return Err(CellError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(self.rows.remove(index))
    }

    /// Replaces every row at once.
    ///
    /// Each row must have exactly one cell per header.
    pub fn replace_rows(&mut self, rows: Vec<Row>) -> Result<(), CellError> {
        ensure_width(self.headers.len(), &rows)?;
        self.rows = rows;
        Ok(())
    }

    // =========================================================================
    // Column edits
    // =========================================================================

    /// Appends a column, back-filling every row with an empty cell.
    pub fn push_column(&mut self, header: impl Into<String>) {
        self.headers.push(header.into());
        for row in &mut self.rows {
            row.cells.push(String::new());
        }
    }

    /// Renames the column at `column`.
    ///
    /// Cells stay where they are, so the values under the old name are now
    /// found under the new one.
    pub fn rename_column(&mut self, column: usize, header: impl Into<String>) -> Result<String, CellError> {
        let len = self.headers.len();
        let slot = self
            .headers
            .get_mut(column)
            .ok_or(CellError::ColumnOutOfRange { index: column, len })?;
        Ok(std::mem::replace(slot, header.into()))
    }

    /// Removes the column at `column` from the headers and every row.
    ///
    /// Returns the removed header.
    pub fn remove_column(&mut self, column: usize) -> Result<String, CellError> {
        if column >= self.headers.len() {
            return Err(CellError::ColumnOutOfRange {
                index: column,
                len: self.headers.len(),
            });
        }
        for row in &mut self.rows {
            row.cells.remove(column);
        }
        Ok(self.headers.remove(column))
    }

    /// Verifies every row is exactly as wide as the header list.
    pub fn check_widths(&self) -> Result<(), InvariantViolation> {
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.headers.len() {
                return Err(InvariantViolation::RowWidth {
                    row: i,
                    cells: row.len(),
                    headers: self.headers.len(),
                });
            }
        }
        Ok(())
    }
}

fn ensure_width(width: usize, rows: &[Row]) -> Result<(), CellError> {
    match rows.iter().position(|r| r.len() != width) {
        Some(index) => Err(CellError::WidthMismatch {
            index,
            expected: width,
            actual: rows[index].len(),
        }),
        None => Ok(()),
    }
}
