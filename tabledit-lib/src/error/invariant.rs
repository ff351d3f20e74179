//! Session invariant violations

/// A broken structural invariant of the editing session.
///
/// Mutators keep these invariants by construction, so seeing one means a
/// programming defect, not a user error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// Header, editable header and error lists differ in length.
    #[error("header lists out of step: {headers} headers, {editable} editable, {errors} errors")]
    HeaderLengths {
        headers: usize,
        editable: usize,
        errors: usize,
    },

    /// A row has a different number of cells than there are headers.
    #[error("row {row} has {cells} cells for {headers} headers")]
    RowWidth {
        row: usize,
        cells: usize,
        headers: usize,
    },
}
