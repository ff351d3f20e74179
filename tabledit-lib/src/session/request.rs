//! Ordering of in-flight store calls.

use std::fmt;

use crate::error::Error;

/// Identifies one load or save call.
///
/// Ids grow monotonically, so a later request always has a larger id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Returns the raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tracks which load and save calls are still in flight.
///
/// - A new load supersedes an older one; the older response is then stale.
/// - A save cannot start while a load or another save is in flight.
/// - A load cannot start while a save is in flight.
#[derive(Debug, Default)]
pub struct RequestTracker {
    next: u64,
    load: Option<RequestId>,
    save: Option<RequestId>,
}

impl RequestTracker {
    /// Creates an idle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> RequestId {
        self.next += 1;
        RequestId(self.next)
    }

    /// Starts a load, superseding any load already in flight.
    pub fn begin_load(&mut self) -> Result<RequestId, Error> {
        if self.save.is_some() {
            return Err(Error::Busy("save"));
        }
        let id = self.next_id();
        if let Some(previous) = self.load.replace(id) {
            log::debug!("load {} superseded by {}", previous, id);
        }
        Ok(id)
    }

    /// Completes a load. Fails with [`Error::Stale`] if it was superseded.
    pub fn finish_load(&mut self, id: RequestId) -> Result<(), Error> {
        if self.load == Some(id) {
            self.load = None;
            Ok(())
        } else {
            Err(Error::Stale(id))
        }
    }

    /// Starts a save.
    pub fn begin_save(&mut self) -> Result<RequestId, Error> {
        if self.save.is_some() {
            return Err(Error::Busy("save"));
        }
        if self.load.is_some() {
            return Err(Error::Busy("load"));
        }
        let id = self.next_id();
        self.save = Some(id);
        Ok(id)
    }

    /// Completes a save.
    pub fn finish_save(&mut self, id: RequestId) -> Result<(), Error> {
        if self.save == Some(id) {
            self.save = None;
            Ok(())
        } else {
            Err(Error::Stale(id))
        }
    }

    /// Returns `true` if a load is in flight.
    pub fn is_loading(&self) -> bool {
        self.load.is_some()
    }

    /// Returns `true` if a save is in flight.
    pub fn is_saving(&self) -> bool {
        self.save.is_some()
    }
}
