//! Save workflow.
//!
//! Saving is a two-step exchange with the user:
//!
//! 1. [`SaveWorkflow::request_save`] validates every header. Any invalid
//!    header aborts the save and the per-column errors are returned for
//!    display. Otherwise the confirmation prompt opens.
//! 2. Confirming builds a [`PersistRequest`] from the session and hands it to
//!    the store. Success marks the session clean; failure leaves it dirty so
//!    the user can simply save again. There is no automatic retry.

use serde::Deserialize;
use serde::Serialize;

use crate::error::ApiError;
use crate::error::Error;
use crate::model::Table;
use crate::session::RequestId;
use crate::session::RequestTracker;
use crate::session::TableSession;
use crate::store::PersistResponse;

/// The payload sent to the store on save.
///
/// Serializes as:
///
/// ```json
/// {"table": "people", "data": [{"name": "Ada"}], "columnsToDelete": ["age"]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistRequest {
    /// Name of the table being saved.
    pub table: String,
    /// Every row, keyed by the current headers.
    pub data: Table,
    /// Columns the store should drop.
    pub columns_to_delete: Vec<String>,
}

impl PersistRequest {
    /// Serializes the payload to its JSON body.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A save that has been handed to the store and not yet answered.
#[derive(Debug, Clone)]
pub struct SaveTicket {
    id: RequestId,
    revision: u64,
    request: PersistRequest,
}

impl SaveTicket {
    /// Returns the request id.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Returns the payload to send.
    pub fn request(&self) -> &PersistRequest {
        &self.request
    }
}

/// Prompt state of the save workflow.
#[derive(Debug, Default)]
pub struct SaveWorkflow {
    prompt_open: bool,
}

impl SaveWorkflow {
    /// Creates a workflow with the prompt closed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while the save confirmation prompt is shown.
    pub fn is_prompt_open(&self) -> bool {
        self.prompt_open
    }

    /// Validates the session and opens the confirmation prompt.
    ///
    /// Fails with [`Error::Validation`] if any header is invalid; nothing else
    /// about the session changes.
    pub fn request_save(&mut self, session: &mut TableSession) -> Result<(), Error> {
        if session.selected_table().is_none() {
            return Err(Error::NoTableSelected);
        }

        let errors = session.validate_all();
        if !errors.all_valid() {
            log::debug!("save blocked: {}", errors);
            return Err(Error::Validation(errors));
        }

        self.prompt_open = true;
        Ok(())
    }

    /// Closes the prompt without saving.
    pub fn cancel_save(&mut self) {
        self.prompt_open = false;
    }

    /// Closes the prompt as confirmed.
    pub(crate) fn take_confirmation(&mut self) -> Result<(), Error> {
        if !self.prompt_open {
            return Err(Error::PromptNotOpen("save"));
        }
        self.prompt_open = false;
        Ok(())
    }
}

/// Builds the payload for a save and registers it as in flight.
pub(crate) fn begin_save(session: &mut TableSession, requests: &mut RequestTracker) -> Result<SaveTicket, Error> {
    let errors = session.validate_all();
    if !errors.all_valid() {
        return Err(Error::Validation(errors));
    }

    let request = session.persist_request()?;
    let id = requests.begin_save()?;
    log::debug!(
        "save {} of '{}': {} rows, dropping {:?}",
        id,
        request.table,
        request.data.row_count(),
        request.columns_to_delete
    );

    Ok(SaveTicket {
        id,
        revision: session.revision(),
        request,
    })
}

/// Applies the store's answer to a save.
pub(crate) fn finish_save(
    session: &mut TableSession,
    requests: &mut RequestTracker,
    ticket: SaveTicket,
    result: Result<PersistResponse, ApiError>,
) -> Result<PersistResponse, Error> {
    requests.finish_save(ticket.id)?;

    match result {
        Ok(response) => {
            log::info!("table '{}' saved: {}", ticket.request.table, response.body);
            session.mark_saved(ticket.revision, &ticket.request.columns_to_delete);
            Ok(response)
        }
        Err(e) => {
            log::warn!("failed to save table '{}': {}", ticket.request.table, e);
            if let Some(body) = e.request_body() {
                log::warn!("rejected payload: {}", body);
            }
            Err(Error::Api(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;

    fn session() -> TableSession {
        let table = Table::with_rows(vec!["x".into()], vec![Row::from_cells(["1"])]).unwrap();
        let mut session = TableSession::new();
        session.replace("t", table);
        session
    }

    #[test]
    fn test_payload_shape() {
        let session = session();
        let json = session.persist_request().unwrap().to_json().unwrap();

        assert_eq!(
            json,
            r#"{"table":"t","data":[{"x":"1"}],"columnsToDelete":[]}"#
        );
    }

    #[test]
    fn test_payload_round_trips() {
        let request = session().persist_request().unwrap();
        let json = request.to_json().unwrap();
        let parsed: PersistRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, request);
    }

    #[test]
    fn test_invalid_header_blocks_prompt() {
        let mut session = session();
        session.add_column();
        let mut workflow = SaveWorkflow::new();

        let err = workflow.request_save(&mut session).unwrap_err();
        match err {
            Error::Validation(errors) => assert_eq!(errors.messages(), vec!["", "title required"]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!workflow.is_prompt_open());
        assert_eq!(session.header_errors()[1], Some(crate::error::HeaderError::TitleRequired));
    }

    #[test]
    fn test_confirmation_requires_open_prompt() {
        let mut session = session();
        let mut workflow = SaveWorkflow::new();

        assert!(matches!(workflow.take_confirmation(), Err(Error::PromptNotOpen("save"))));
        workflow.request_save(&mut session).unwrap();
        assert!(workflow.take_confirmation().is_ok());
        assert!(!workflow.is_prompt_open());
    }

    #[test]
    fn test_failed_save_keeps_state() {
        let mut session = session();
        session.delete_column(0).unwrap();
        let mut requests = RequestTracker::new();

        let ticket = begin_save(&mut session, &mut requests).unwrap();
        let result = finish_save(
            &mut session,
            &mut requests,
            ticket,
            Err(ApiError::persist_rejected(500, "{}", "boom")),
        );

        assert!(matches!(result, Err(Error::Api(_))));
        assert!(session.is_dirty());
        assert_eq!(session.columns_to_delete(), ["x"]);
        assert!(!requests.is_saving());
    }
}
