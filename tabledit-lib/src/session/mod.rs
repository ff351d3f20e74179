//! Table editing session.
//!
//! [`TableSession`] owns the snapshot of the loaded table together with the
//! state needed to edit it safely:
//!
//! - the canonical headers (the keys rows are stored under),
//! - the header text the user is typing, which may be blank or clash with
//!   another column while it is being edited,
//! - the per-column validation result,
//! - the columns removed since the last save,
//! - the dirty flag.
//!
//! Every mutator either applies completely or returns an error and leaves the
//! session untouched.

mod exit_guard;
mod request;
mod validate;

pub use exit_guard::*;
pub use request::*;
pub use validate::*;

use chrono::DateTime;
use chrono::Utc;

use crate::error::CellError;
use crate::error::Error;
use crate::error::HeaderError;
use crate::error::HeaderErrors;
use crate::error::InvariantViolation;
use crate::model::Row;
use crate::model::Table;
use crate::save::PersistRequest;

/// The editable state of one loaded table.
#[derive(Debug, Clone, Default)]
pub struct TableSession {
    selected_table: Option<String>,
    table: Table,
    editable_headers: Vec<String>,
    header_errors: Vec<Option<HeaderError>>,
    columns_to_delete: Vec<String>,
    dirty: bool,
    revision: u64,
    loaded_at: Option<DateTime<Utc>>,
}

impl TableSession {
    /// Creates an empty session with no table selected.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replaces the whole session with a freshly loaded table.
    pub fn replace(&mut self, table_name: impl Into<String>, table: Table) {
        let table_name = table_name.into();
        log::info!(
            "loaded table '{}' ({} columns, {} rows)",
            table_name,
            table.column_count(),
            table.row_count()
        );

        self.editable_headers = table.headers().to_vec();
        self.header_errors = vec![None; table.column_count()];
        self.table = table;
        self.selected_table = Some(table_name);
        self.columns_to_delete.clear();
        self.dirty = false;
        self.revision += 1;
        self.loaded_at = Some(Utc::now());
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the name of the loaded table.
    pub fn selected_table(&self) -> Option<&str> {
        self.selected_table.as_deref()
    }

    /// Returns the table snapshot.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Returns the canonical headers.
    pub fn headers(&self) -> &[String] {
        self.table.headers()
    }

    /// Returns the header text as typed, aligned with [`headers`](Self::headers).
    pub fn editable_headers(&self) -> &[String] {
        &self.editable_headers
    }

    /// Returns the per-column validation results (`None` = valid).
    pub fn header_errors(&self) -> &[Option<HeaderError>] {
        &self.header_errors
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[Row] {
        self.table.rows()
    }

    /// Returns a cell by row index and header name.
    pub fn cell(&self, row: usize, header: &str) -> Option<&str> {
        self.table.cell(row, header)
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.table.column_count()
    }

    /// Returns every column removed since the last load or save.
    pub fn columns_to_delete(&self) -> &[String] {
        &self.columns_to_delete
    }

    /// Returns the removed columns that should be dropped by the store.
    ///
    /// A name that has since been given to a live column again is left out.
    pub fn pending_column_drops(&self) -> Vec<String> {
        self.columns_to_delete
            .iter()
            .filter(|name| !self.table.has_header(name))
            .cloned()
            .collect()
    }

    /// Returns `true` if there are unsaved edits.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the edit counter; it changes on every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns when the current snapshot was loaded.
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    // =========================================================================
    // Cell and row edits
    // =========================================================================

    /// Replaces the cell under `header` in row `row`.
    pub fn set_cell(&mut self, row: usize, header: &str, value: impl Into<String>) -> Result<(), CellError> {
        let column = self
            .table
            .column_index(header)
            .ok_or_else(|| CellError::unknown_header(header))?;
        self.set_cell_at(row, column, value)
    }

    /// Replaces the cell at a row/column position.
    pub fn set_cell_at(&mut self, row: usize, column: usize, value: impl Into<String>) -> Result<(), CellError> {
        self.table.set_cell(row, column, value)?;
        log::debug!("set cell ({}, {})", row, column);
        self.touch();
        Ok(())
    }

    /// Appends a row with an empty value under every current header.
    pub fn add_row(&mut self) {
        self.table.push_blank_row();
        log::debug!("added row {}", self.table.row_count() - 1);
        self.touch();
    }

    /// Removes a row.
    pub fn remove_row(&mut self, index: usize) -> Result<Row, CellError> {
        let row = self.table.remove_row(index)?;
        log::debug!("removed row {}", index);
        self.touch();
        Ok(row)
    }

    /// Replaces all rows at once; each row must match the current header count.
    pub fn replace_rows(&mut self, rows: Vec<Row>) -> Result<(), CellError> {
        self.table.replace_rows(rows)?;
        log::debug!("replaced rows ({} rows)", self.table.row_count());
        self.touch();
        Ok(())
    }

    // =========================================================================
    // Column edits
    // =========================================================================

    /// Appends a new column and returns its generated name.
    ///
    /// The name is `column_N` with `N` starting at the new column count and
    /// moving up until the name is free. The typed header starts out blank,
    /// so the column must be named before the table can be saved.
    pub fn add_column(&mut self) -> String {
        let mut n = self.table.column_count() + 1;
        let mut name = format!("column_{}", n);
        while self.table.has_header(&name) {
            n += 1;
            name = format!("column_{}", n);
        }

        self.table.push_column(name.clone());
        self.editable_headers.push(String::new());
        self.header_errors.push(None);
        log::debug!("added column '{}'", name);
        self.touch();
        name
    }

    /// Records new header text typed for column `index`.
    ///
    /// The typed text is always kept. Non-empty text also becomes the
    /// column's canonical header, carrying the column's values with it; empty
    /// text leaves the canonical header as it was. Returns the column's new
    /// validation result.
    pub fn rename_header_input(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<Option<HeaderError>, CellError> {
        let text = text.into();
        if index >= self.editable_headers.len() {
            return Err(CellError::ColumnOutOfRange {
                index,
                len: self.editable_headers.len(),
            });
        }

        let mut typed = self.editable_headers.clone();
        typed[index] = text.clone();
        let error = validate_header(index, self.table.headers(), &typed);

        if !text.is_empty() {
            let old = self.table.rename_column(index, text.clone())?;
            log::debug!("renamed column {} '{}' -> '{}'", index, old, text);
        }
        self.editable_headers = typed;
        self.header_errors[index] = error;
        self.touch();
        Ok(error)
    }

    /// Removes column `index` and remembers it for removal on the next save.
    ///
    /// Returns the removed header.
    pub fn delete_column(&mut self, index: usize) -> Result<String, CellError> {
        let header = self.table.remove_column(index)?;
        self.editable_headers.remove(index);
        self.header_errors.remove(index);

        if !self.columns_to_delete.contains(&header) {
            self.columns_to_delete.push(header.clone());
        }
        log::debug!("deleted column {} '{}'", index, header);
        self.touch();
        Ok(header)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Revalidates every header and stores the result.
    pub fn validate_all(&mut self) -> HeaderErrors {
        let errors = validate_headers(self.table.headers(), &self.editable_headers);
        self.header_errors = errors.0.clone();
        errors
    }

    /// Checks the structural invariants of the session.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let headers = self.table.column_count();
        if self.editable_headers.len() != headers || self.header_errors.len() != headers {
            return Err(InvariantViolation::HeaderLengths {
                headers,
                editable: self.editable_headers.len(),
                errors: self.header_errors.len(),
            });
        }
        self.table.check_widths()
    }

    // =========================================================================
    // Saving
    // =========================================================================

    /// Builds the payload for persisting the current state.
    pub fn persist_request(&self) -> Result<PersistRequest, Error> {
        let table = self.selected_table.clone().ok_or(Error::NoTableSelected)?;
        Ok(PersistRequest {
            table,
            data: self.table.clone(),
            columns_to_delete: self.pending_column_drops(),
        })
    }

    /// Marks the state captured at `revision` as saved.
    ///
    /// The dropped columns are forgotten. The session only becomes clean if
    /// nothing was edited after the payload was built.
    pub fn mark_saved(&mut self, revision: u64, dropped: &[String]) {
        self.columns_to_delete.retain(|c| !dropped.contains(c));
        if revision == self.revision {
            self.dirty = false;
            self.columns_to_delete.clear();
        } else {
            log::debug!(
                "session edited during save (revision {} -> {}); staying dirty",
                revision,
                self.revision
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(headers: &[&str], rows: &[&[&str]]) -> TableSession {
        let table = Table::with_rows(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter().map(|r| Row::from_cells(r.iter().copied())).collect(),
        )
        .unwrap();
        let mut session = TableSession::new();
        session.replace("t", table);
        session
    }

    fn assert_consistent(session: &TableSession) {
        session.check_invariants().unwrap();
    }

    #[test]
    fn test_replace_is_clean() {
        let session = loaded(&["a", "b"], &[&["1", "2"]]);

        assert!(!session.is_dirty());
        assert_eq!(session.selected_table(), Some("t"));
        assert_eq!(session.editable_headers(), ["a", "b"]);
        assert_eq!(session.header_errors().len(), 2);
        assert!(session.header_errors().iter().all(Option::is_none));
        assert!(session.loaded_at().is_some());
        assert_consistent(&session);
    }

    #[test]
    fn test_every_mutator_dirties() {
        let mutators: [fn(&mut TableSession); 6] = [
            |s| s.set_cell(0, "a", "x").unwrap(),
            |s| s.add_row(),
            |s| {
                s.add_column();
            },
            |s| {
                s.rename_header_input(0, "z").unwrap();
            },
            |s| {
                s.delete_column(0).unwrap();
            },
            |s| {
                s.remove_row(0).unwrap();
            },
        ];

        for mutate in mutators {
            let mut session = loaded(&["a", "b"], &[&["1", "2"]]);
            mutate(&mut session);
            assert!(session.is_dirty());
            assert_consistent(&session);
        }
    }

    #[test]
    fn test_failed_mutator_leaves_session_clean() {
        let mut session = loaded(&["a"], &[&["1"]]);
        let revision = session.revision();

        assert!(session.set_cell(3, "a", "x").is_err());
        assert!(session.set_cell(0, "nope", "x").is_err());
        assert!(session.delete_column(4).is_err());
        assert!(session.rename_header_input(4, "x").is_err());

        assert!(!session.is_dirty());
        assert_eq!(session.revision(), revision);
    }

    #[test]
    fn test_add_row_uses_current_headers() {
        let mut session = loaded(&["a", "b"], &[]);
        session.add_column();
        session.add_row();

        assert_eq!(session.rows()[0].cells(), ["", "", ""]);
    }

    #[test]
    fn test_add_column() {
        let mut session = loaded(&["a", "b"], &[&["1", "2"]]);
        let name = session.add_column();

        assert_eq!(name, "column_3");
        assert_eq!(session.headers(), ["a", "b", "column_3"]);
        assert_eq!(session.editable_headers(), ["a", "b", ""]);
        assert_eq!(session.header_errors().len(), 3);
        assert_eq!(session.cell(0, "column_3"), Some(""));
        assert_consistent(&session);
    }

    #[test]
    fn test_add_column_skips_taken_names() {
        let mut session = loaded(&["column_2", "b"], &[]);
        session.delete_column(1).unwrap();
        // One column left, so the first candidate is "column_2", which exists.
        let name = session.add_column();

        assert_eq!(name, "column_3");
    }

    #[test]
    fn test_rename_moves_values() {
        let mut session = loaded(&["a", "b"], &[&["1", "2"]]);
        let error = session.rename_header_input(0, "x").unwrap();

        assert_eq!(error, None);
        assert_eq!(session.headers(), ["x", "b"]);
        assert_eq!(session.cell(0, "x"), Some("1"));
        assert_eq!(session.cell(0, "a"), None);
    }

    #[test]
    fn test_rename_to_blank_keeps_header() {
        let mut session = loaded(&["a", "b"], &[&["1", "2"]]);
        let error = session.rename_header_input(1, "").unwrap();

        assert_eq!(error, Some(HeaderError::TitleRequired));
        assert_eq!(session.headers(), ["a", "b"]);
        assert_eq!(session.editable_headers(), ["a", ""]);
        assert_eq!(session.cell(0, "b"), Some("2"));
        assert!(session.is_dirty());
    }

    #[test]
    fn test_rename_onto_existing_is_flagged_not_merged() {
        let mut session = loaded(&["a", "b"], &[&["1", "2"]]);
        let error = session.rename_header_input(0, "b").unwrap();

        assert_eq!(error, Some(HeaderError::DuplicateTitle));
        // Both columns keep their data.
        assert_eq!(session.rows()[0].cells(), ["1", "2"]);
        assert_consistent(&session);
        assert!(!session.validate_all().all_valid());
    }

    #[test]
    fn test_delete_column() {
        let mut session = loaded(&["a", "b", "c"], &[&["1", "2", "3"]]);
        session.rename_header_input(0, "c").unwrap();
        let removed = session.delete_column(2).unwrap();

        assert_eq!(removed, "c");
        assert_eq!(session.headers(), ["c", "b"]);
        assert_eq!(session.rows()[0].cells(), ["1", "2"]);
        assert_eq!(session.columns_to_delete(), ["c"]);
        assert!(session.validate_all().all_valid());
        assert_consistent(&session);
    }

    #[test]
    fn test_columns_to_delete_has_no_duplicates() {
        let mut session = loaded(&["a", "b"], &[]);
        session.delete_column(0).unwrap();
        session.add_column();
        session.rename_header_input(1, "a").unwrap();
        session.delete_column(1).unwrap();

        assert_eq!(session.columns_to_delete(), ["a"]);
    }

    #[test]
    fn test_recreated_column_is_not_dropped() {
        let mut session = loaded(&["a", "b"], &[]);
        session.delete_column(0).unwrap();
        session.add_column();
        session.rename_header_input(1, "a").unwrap();

        assert_eq!(session.columns_to_delete(), ["a"]);
        assert!(session.pending_column_drops().is_empty());
    }

    #[test]
    fn test_mark_saved() {
        let mut session = loaded(&["a", "b"], &[]);
        session.delete_column(0).unwrap();
        let request = session.persist_request().unwrap();

        session.mark_saved(session.revision(), &request.columns_to_delete);
        assert!(!session.is_dirty());
        assert!(session.columns_to_delete().is_empty());
    }

    #[test]
    fn test_mark_saved_after_concurrent_edit_stays_dirty() {
        let mut session = loaded(&["a", "b"], &[]);
        session.delete_column(0).unwrap();
        let revision = session.revision();
        let request = session.persist_request().unwrap();

        session.add_row();
        session.mark_saved(revision, &request.columns_to_delete);

        assert!(session.is_dirty());
        assert!(session.columns_to_delete().is_empty());
    }

    #[test]
    fn test_persist_request_needs_table() {
        let session = TableSession::new();
        assert!(matches!(session.persist_request(), Err(Error::NoTableSelected)));
    }
}
