//! Error types

mod api;
mod field;
mod invariant;
mod validation;

pub use api::*;
pub use field::*;
pub use invariant::*;
pub use validation::*;

use crate::session::RequestId;

/// Top-level error for editor operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote store call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// One or more headers are invalid; save is blocked.
    #[error("invalid headers: {0}")]
    Validation(HeaderErrors),

    /// A row or column address was out of range.
    #[error("cell error: {0}")]
    Cell(#[from] CellError),

    /// The session's structural invariants were broken.
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    /// Another call is in flight and this one cannot start.
    #[error("busy: {0} in flight")]
    Busy(&'static str),

    /// A response arrived for a request that has since been superseded.
    #[error("stale response for request {0}")]
    Stale(RequestId),

    /// A load answered after the session was edited; the switch now waits
    /// for confirmation.
    #[error("unsaved edits hold the switch to '{0}'")]
    EditsPending(String),

    /// No table is loaded.
    #[error("no table selected")]
    NoTableSelected,

    /// Confirm was called with no table switch pending.
    #[error("no pending navigation")]
    NoPendingNavigation,

    /// Confirm was called while the prompt was closed.
    #[error("{0} prompt is not open")]
    PromptNotOpen(&'static str),

    /// The persist payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` for errors the user can recover from by retrying the action.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Api(_))
    }
}
