//! Header validation error types

use std::fmt;

const TITLE_REQUIRED: &str = "title required";
const DUPLICATE_TITLE: &str = "duplicate title";

/// Why a column header cannot be committed.
///
/// Per-position results are kept as `Option<HeaderError>`, `None` meaning the
/// header at that position is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum HeaderError {
    /// The header text is empty or whitespace.
    #[error("{}", TITLE_REQUIRED)]
    TitleRequired,

    /// The header text collides with another column's name.
    #[error("{}", DUPLICATE_TITLE)]
    DuplicateTitle,
}

impl HeaderError {
    /// Returns the message shown next to the offending column.
    pub fn message(&self) -> &'static str {
        match self {
            Self::TitleRequired => TITLE_REQUIRED,
            Self::DuplicateTitle => DUPLICATE_TITLE,
        }
    }
}

/// Returns the display message for a per-position result (empty when valid).
pub fn header_message(error: Option<HeaderError>) -> &'static str {
    error.map(|e| e.message()).unwrap_or("")
}

/// The full per-column error list produced by a failed save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderErrors(pub Vec<Option<HeaderError>>);

impl HeaderErrors {
    /// Returns `true` if every position is valid.
    pub fn all_valid(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// Iterates over `(index, error)` for the invalid positions.
    pub fn invalid(&self) -> impl Iterator<Item = (usize, HeaderError)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.map(|e| (i, e)))
    }

    /// Returns the messages aligned by column index (empty string = valid).
    pub fn messages(&self) -> Vec<&'static str> {
        self.0.iter().map(|e| header_message(*e)).collect()
    }
}

impl fmt::Display for HeaderErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .invalid()
            .map(|(i, e)| format!("column {}: {}", i, e))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_matches_display() {
        for error in [HeaderError::TitleRequired, HeaderError::DuplicateTitle] {
            assert_eq!(error.message(), error.to_string());
        }
        assert_eq!(header_message(Some(HeaderError::TitleRequired)), "title required");
        assert_eq!(header_message(None), "");
    }

    #[test]
    fn test_messages_align_with_columns() {
        let errors = HeaderErrors(vec![None, Some(HeaderError::DuplicateTitle)]);
        assert!(!errors.all_valid());
        assert_eq!(errors.messages(), ["", "duplicate title"]);
        assert_eq!(errors.to_string(), "column 1: duplicate title");
    }
}
