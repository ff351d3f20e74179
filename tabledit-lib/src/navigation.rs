//! Navigation guard.
//!
//! Switching tables discards the loaded snapshot, so a switch away from a
//! dirty session is held back until the user confirms it.

/// What to do with a table switch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchDecision {
    /// The session is clean; load the table now.
    Proceed(String),
    /// The session is dirty; the confirmation prompt was opened instead.
    Intercepted,
}

/// Holds a table switch that is waiting for user confirmation.
#[derive(Debug, Default)]
pub struct NavigationGuard {
    pending: Option<String>,
    prompt_open: bool,
}

impl NavigationGuard {
    /// Creates a guard with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether switching to `table` may happen immediately.
    pub fn request_switch(&mut self, dirty: bool, table: impl Into<String>) -> SwitchDecision {
        let table = table.into();
        if !dirty {
            return SwitchDecision::Proceed(table);
        }

        log::debug!("switch to '{}' held: unsaved changes", table);
        self.pending = Some(table);
        self.prompt_open = true;
        SwitchDecision::Intercepted
    }

    /// Confirms the pending switch, closing the prompt.
    ///
    /// Returns the table to load, if one was pending.
    pub fn confirm(&mut self) -> Option<String> {
        self.prompt_open = false;
        self.pending.take()
    }

    /// Drops the pending switch and closes the prompt.
    pub fn cancel(&mut self) {
        if let Some(table) = self.pending.take() {
            log::debug!("switch to '{}' cancelled", table);
        }
        self.prompt_open = false;
    }

    /// Returns the table waiting for confirmation.
    pub fn pending_table(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Returns `true` while the navigation prompt is shown.
    pub fn is_prompt_open(&self) -> bool {
        self.prompt_open
    }
}
