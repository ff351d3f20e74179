//! Header validation.

use crate::error::HeaderError;
use crate::error::HeaderErrors;

/// Validates the header text typed at `index`.
///
/// A header is invalid when its text is blank, or when it equals the name of
/// another column: either that column's canonical header or the text currently
/// typed for it. Out-of-range positions are reported as valid.
///
/// # Example
///
/// ```
/// use tabledit_lib::error::HeaderError;
/// use tabledit_lib::session::validate_header;
///
/// let headers = vec!["a".to_string(), "b".to_string()];
/// let typed = vec!["b".to_string(), "b".to_string()];
///
/// assert_eq!(validate_header(0, &headers, &typed), Some(HeaderError::DuplicateTitle));
/// ```
pub fn validate_header(index: usize, headers: &[String], editable: &[String]) -> Option<HeaderError> {
    let candidate = editable.get(index)?;

    if candidate.trim().is_empty() {
        return Some(HeaderError::TitleRequired);
    }

    let taken = |names: &[String]| {
        names
            .iter()
            .enumerate()
            .any(|(j, name)| j != index && name == candidate)
    };

    if taken(headers) || taken(editable) {
        Some(HeaderError::DuplicateTitle)
    } else {
        None
    }
}

/// Validates every typed header.
pub fn validate_headers(headers: &[String], editable: &[String]) -> HeaderErrors {
    HeaderErrors(
        (0..editable.len())
            .map(|i| validate_header(i, headers, editable))
            .collect(),
    )
}
