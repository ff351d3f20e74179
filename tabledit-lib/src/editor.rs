//! The table editor.
//!
//! [`TableEditor`] ties the editing session, the navigation guard and the save
//! workflow to a [`TableStore`]. A host drives it from its event loop: user
//! actions map to method calls, and the editor decides what may happen.
//!
//! Store calls come in two shapes:
//!
//! - `async` convenience methods ([`select_table`](TableEditor::select_table),
//!   [`confirm_navigate`](TableEditor::confirm_navigate),
//!   [`confirm_save`](TableEditor::confirm_save)) that call the store and apply
//!   the answer in one step;
//! - split `begin_*` / `finish_*` pairs for hosts that run store calls as
//!   background tasks. Every call carries a [`RequestId`]; an answer to a
//!   superseded load is rejected with [`Error::Stale`] and never touches the
//!   session.
//!
//! # Example
//!
//! ```ignore
//! use tabledit_lib::TableEditor;
//! use tabledit_lib::store::HttpTableStore;
//!
//! let mut editor = TableEditor::new(HttpTableStore::from_config(&config)?);
//! editor.select_table("people").await?;
//!
//! editor.add_column();
//! editor.rename_header_input(2, "email")?;
//!
//! editor.request_save()?;
//! editor.confirm_save().await?;
//! ```

use crate::error::ApiError;
use crate::error::Error;
use crate::error::HeaderError;
use crate::error::HeaderErrors;
use crate::model::RawRow;
use crate::model::Row;
use crate::model::Table;
use crate::navigation::NavigationGuard;
use crate::navigation::SwitchDecision;
use crate::save;
use crate::save::SaveTicket;
use crate::save::SaveWorkflow;
use crate::session::ExitGuard;
use crate::session::RequestId;
use crate::session::RequestTracker;
use crate::session::TableSession;
use crate::store::PersistResponse;
use crate::store::TableStore;

/// A load that has been handed to the store and not yet answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    id: RequestId,
    table: String,
    revision: u64,
}

impl LoadTicket {
    /// Returns the request id.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Returns the table being fetched.
    pub fn table(&self) -> &str {
        &self.table
    }
}

/// Result of asking to switch tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The table was loaded.
    Switched,
    /// Unsaved edits hold the switch until the user confirms it.
    Held,
}

/// Table editor driving a [`TableStore`].
pub struct TableEditor<S> {
    store: S,
    session: TableSession,
    navigation: NavigationGuard,
    save: SaveWorkflow,
    requests: RequestTracker,
    exit_guard: ExitGuard,
}

impl<S: TableStore> TableEditor<S> {
    /// Creates an editor with an empty session.
    pub fn new(store: S) -> Self {
        Self {
            store,
            session: TableSession::new(),
            navigation: NavigationGuard::new(),
            save: SaveWorkflow::new(),
            requests: RequestTracker::new(),
            exit_guard: ExitGuard::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the editing session.
    pub fn session(&self) -> &TableSession {
        &self.session
    }

    /// Returns the navigation guard.
    pub fn navigation(&self) -> &NavigationGuard {
        &self.navigation
    }

    /// Returns the save workflow.
    pub fn save_workflow(&self) -> &SaveWorkflow {
        &self.save
    }

    /// Returns the request tracker.
    pub fn requests(&self) -> &RequestTracker {
        &self.requests
    }

    /// Returns a handle to the exit guard for the host's quit hook.
    pub fn exit_guard(&self) -> ExitGuard {
        self.exit_guard.clone()
    }

    /// Returns `true` if leaving the application must be confirmed.
    pub fn should_confirm_exit(&self) -> bool {
        self.session.is_dirty()
    }

    fn sync(&self) {
        self.exit_guard.set_armed(self.session.is_dirty());
        let checked = self.session.check_invariants();
        if let Err(e) = &checked {
            log::error!("session invariant broken: {}", e);
        }
        debug_assert!(checked.is_ok());
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Replaces the cell under `header` in row `row`.
    pub fn set_cell(&mut self, row: usize, header: &str, value: impl Into<String>) -> Result<(), Error> {
        self.session.set_cell(row, header, value)?;
        self.sync();
        Ok(())
    }

    /// Replaces the cell at a row/column position.
    pub fn set_cell_at(&mut self, row: usize, column: usize, value: impl Into<String>) -> Result<(), Error> {
        self.session.set_cell_at(row, column, value)?;
        self.sync();
        Ok(())
    }

    /// Appends an empty row.
    pub fn add_row(&mut self) {
        self.session.add_row();
        self.sync();
    }

    /// Removes a row.
    pub fn remove_row(&mut self, index: usize) -> Result<Row, Error> {
        let row = self.session.remove_row(index)?;
        self.sync();
        Ok(row)
    }

    /// Replaces all rows at once.
    pub fn replace_rows(&mut self, rows: Vec<Row>) -> Result<(), Error> {
        self.session.replace_rows(rows)?;
        self.sync();
        Ok(())
    }

    /// Appends a new, not yet named, column and returns its generated name.
    pub fn add_column(&mut self) -> String {
        let name = self.session.add_column();
        self.sync();
        name
    }

    /// Records header text typed for column `index`.
    pub fn rename_header_input(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<Option<HeaderError>, Error> {
        let error = self.session.rename_header_input(index, text)?;
        self.sync();
        Ok(error)
    }

    /// Removes column `index`, to be dropped on the next save.
    pub fn delete_column(&mut self, index: usize) -> Result<String, Error> {
        let header = self.session.delete_column(index)?;
        self.sync();
        Ok(header)
    }

    /// Revalidates every header.
    pub fn validate_all(&mut self) -> HeaderErrors {
        self.session.validate_all()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Registers a load of `table` and returns its ticket.
    ///
    /// A load already in flight is superseded.
    pub fn begin_load(&mut self, table: impl Into<String>) -> Result<LoadTicket, Error> {
        let table = table.into();
        let id = self.requests.begin_load()?;
        log::debug!("load {} of '{}'", id, table);
        Ok(LoadTicket {
            id,
            table,
            revision: self.session.revision(),
        })
    }

    /// Applies the store's answer to a load.
    ///
    /// A stale answer is dropped with [`Error::Stale`]. A failed fetch leaves
    /// the session as it was and is returned as [`Error::Api`]. If the
    /// session was edited while the load was in flight, the answer is not
    /// applied: the table is held for confirmation and
    /// [`Error::EditsPending`] is returned.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<RawRow>, ApiError>,
    ) -> Result<(), Error> {
        if let Err(e) = self.requests.finish_load(ticket.id) {
            log::warn!("dropping stale response for '{}' ({})", ticket.table, ticket.id);
            return Err(e);
        }

        match result {
            Ok(_) if self.session.is_dirty() && self.session.revision() != ticket.revision => {
                log::warn!("load of '{}' held: session edited while loading", ticket.table);
                self.navigation.request_switch(true, ticket.table.clone());
                Err(Error::EditsPending(ticket.table))
            }
            Ok(raw) => {
                self.session.replace(ticket.table, Table::from_raw_rows(&raw));
                self.sync();
                Ok(())
            }
            Err(e) => {
                log::warn!("failed to load table '{}': {}", ticket.table, e);
                Err(Error::Api(e))
            }
        }
    }

    /// Loads `table`, discarding the current session on success.
    pub async fn load(&mut self, table: impl Into<String>) -> Result<(), Error> {
        let ticket = self.begin_load(table)?;
        let result = self.store.fetch_table(&ticket.table).await;
        self.finish_load(ticket, result)
    }

    /// Reloads the selected table.
    pub async fn reload(&mut self) -> Result<(), Error> {
        let table = self
            .session
            .selected_table()
            .ok_or(Error::NoTableSelected)?
            .to_string();
        self.load(table).await
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Asks to switch to `table`.
    ///
    /// Returns a ticket when the load may start right away, or `None` when the
    /// switch is held for confirmation.
    pub fn request_switch(&mut self, table: impl Into<String>) -> Result<Option<LoadTicket>, Error> {
        match self.navigation.request_switch(self.session.is_dirty(), table) {
            SwitchDecision::Proceed(table) => self.begin_load(table).map(Some),
            SwitchDecision::Intercepted => Ok(None),
        }
    }

    /// Switches to `table`, or holds the switch if there are unsaved edits.
    pub async fn select_table(&mut self, table: impl Into<String>) -> Result<SwitchOutcome, Error> {
        match self.request_switch(table)? {
            Some(ticket) => {
                let result = self.store.fetch_table(&ticket.table).await;
                self.finish_load(ticket, result)?;
                Ok(SwitchOutcome::Switched)
            }
            None => Ok(SwitchOutcome::Held),
        }
    }

    /// Confirms the held switch and returns the load ticket for it.
    ///
    /// The prompt closes once the load has started. If the load cannot start,
    /// the switch stays pending and the prompt stays open.
    pub fn begin_confirm_navigate(&mut self) -> Result<LoadTicket, Error> {
        let table = self
            .navigation
            .pending_table()
            .ok_or(Error::NoPendingNavigation)?
            .to_string();
        let ticket = self.begin_load(table)?;
        self.navigation.confirm();
        Ok(ticket)
    }

    /// Confirms the held switch and loads the pending table.
    ///
    /// Unsaved edits are discarded once the new table arrives.
    pub async fn confirm_navigate(&mut self) -> Result<(), Error> {
        let ticket = self.begin_confirm_navigate()?;
        let result = self.store.fetch_table(&ticket.table).await;
        self.finish_load(ticket, result)
    }

    /// Drops the held switch; the session is untouched.
    pub fn cancel_navigate(&mut self) {
        self.navigation.cancel();
    }

    // =========================================================================
    // Saving
    // =========================================================================

    /// Validates the headers and opens the save prompt.
    pub fn request_save(&mut self) -> Result<(), Error> {
        self.save.request_save(&mut self.session)
    }

    /// Closes the save prompt without saving.
    pub fn cancel_save(&mut self) {
        self.save.cancel_save();
    }

    /// Confirms the save prompt and returns the ticket for the persist call.
    ///
    /// The prompt closes either way.
    pub fn begin_save(&mut self) -> Result<SaveTicket, Error> {
        self.save.take_confirmation()?;
        save::begin_save(&mut self.session, &mut self.requests)
    }

    /// Applies the store's answer to a save.
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<PersistResponse, ApiError>,
    ) -> Result<PersistResponse, Error> {
        let outcome = save::finish_save(&mut self.session, &mut self.requests, ticket, result);
        self.sync();
        outcome
    }

    /// Confirms the save prompt and persists the table.
    pub async fn confirm_save(&mut self) -> Result<PersistResponse, Error> {
        let ticket = self.begin_save()?;
        let result = self.store.persist_table(ticket.request()).await;
        self.finish_save(ticket, result)
    }
}

impl<S> std::fmt::Debug for TableEditor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableEditor")
            .field("session", &self.session)
            .field("navigation", &self.navigation)
            .field("save", &self.save)
            .field("requests", &self.requests)
            .finish_non_exhaustive()
    }
}
