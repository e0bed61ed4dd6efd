//! Error types for reading muddle problems, with error codes and helpful messages.
//!
//! # Error Codes
//!
//! Each error variant has a unique code (E001-E008) for documentation lookup:
//!
//! - E001: `EmptyInput` (Nothing to parse)
//! - E002: `WrongRowCount` (A grid does not have five rows)
//! - E003: `WrongRowLength` (A grid row does not have five cells)
//! - E004: `InvalidRackLetter` (A rack cell is not a letter)
//! - E005: `InvalidPatternChar` (A pattern cell is neither a letter nor '-')
//! - E006: `WrongLetterCount` (A flat letter list does not hold 25 letters)
//! - E007: `InvalidNotation` (Compact `row/row/...` notation could not be read)
//! - E008: `NomError` (Low-level nom parser error)
//!
//! # Examples
//!
//! ```
//! use muddle::errors::ParseError;
//! use muddle::problem::Problem;
//!
//! match Problem::from_notation("heart/ember", "-----/-----/-----/-----/-----") {
//!     Err(e) => {
//!         assert_eq!(e.code(), "E002");
//!         println!("{}", e.display_detailed());
//!     }
//!     Ok(_) => unreachable!(),
//! }
//! ```

use nom::error::{ErrorKind, ParseError as NomParseError};
use std::io;

/// Which of the two problem grids an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    Rack,
    Pattern,
}

impl std::fmt::Display for GridKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridKind::Rack => write!(f, "rack"),
            GridKind::Pattern => write!(f, "pattern"),
        }
    }
}

/// Malformed problem input, rejected before any search starts.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Empty problem input")]
    EmptyInput,

    #[error("The {grid} has {found} rows; expected {expected}")]
    WrongRowCount { grid: GridKind, expected: usize, found: usize },

    #[error("Row {row} of the {grid} has {found} cells; expected {expected}")]
    WrongRowLength { grid: GridKind, row: usize, expected: usize, found: usize },

    #[error("Invalid rack letter '{invalid_char}' at row {row}, column {col} (only a-z allowed)")]
    InvalidRackLetter { row: usize, col: usize, invalid_char: char },

    #[error("Invalid pattern cell '{invalid_char}' at row {row}, column {col} (only a-z or '-' allowed)")]
    InvalidPatternChar { row: usize, col: usize, invalid_char: char },

    #[error("Expected {expected} letters, found {found}")]
    WrongLetterCount { expected: usize, found: usize },

    #[error("Could not read grid notation \"{input}\"")]
    InvalidNotation { input: String },

    // nom parser error (lowest level)
    #[error("nom parser error: {0:?}")]
    NomError(ErrorKind),
}

impl From<ParseError> for io::Error {
    fn from(pe: ParseError) -> Self {
        // String version is the least fragile (no Send/Sync bounds issues)
        io::Error::new(io::ErrorKind::InvalidInput, pe.to_string())
    }
}

impl From<Box<ParseError>> for io::Error {
    fn from(pe: Box<ParseError>) -> Self {
        io::Error::from(*pe)
    }
}

impl<'a> NomParseError<&'a str> for Box<ParseError> {
    fn from_error_kind(_input: &'a str, kind: ErrorKind) -> Self {
        Box::new(ParseError::NomError(kind))
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl ParseError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::EmptyInput => "E001",
            ParseError::WrongRowCount { .. } => "E002",
            ParseError::WrongRowLength { .. } => "E003",
            ParseError::InvalidRackLetter { .. } => "E004",
            ParseError::InvalidPatternChar { .. } => "E005",
            ParseError::WrongLetterCount { .. } => "E006",
            ParseError::InvalidNotation { .. } => "E007",
            ParseError::NomError(_) => "E008",
        }
    }

    /// Returns a short description of this error type (for documentation)
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ParseError::EmptyInput => "Empty problem input",
            ParseError::WrongRowCount { .. } => "Grid does not have five rows",
            ParseError::WrongRowLength { .. } => "Grid row does not have five cells",
            ParseError::InvalidRackLetter { .. } => "Rack cell is not a letter",
            ParseError::InvalidPatternChar { .. } => "Pattern cell is not a letter or wildcard",
            ParseError::WrongLetterCount { .. } => "Letter list does not fill the grid",
            ParseError::InvalidNotation { .. } => "Compact grid notation is malformed",
            ParseError::NomError(_) => "Low-level parser error",
        }
    }

    /// Returns detailed explanation of this error type (for documentation)
    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            ParseError::EmptyInput => "No rack or pattern was supplied.",
            ParseError::WrongRowCount { .. } => "Both the rack and the starting pattern are 5x5 grids, so each needs exactly five rows.",
            ParseError::WrongRowLength { .. } => "Every row of the rack and of the starting pattern needs exactly five cells.",
            ParseError::InvalidRackLetter { .. } => "The rack lists the 25 letters that fill the grid; every cell must be a letter (case is ignored).",
            ParseError::InvalidPatternChar { .. } => "Pattern cells are either a known letter or '-' for an unknown cell.",
            ParseError::WrongLetterCount { .. } => "A muddle uses exactly one letter per cell, 25 in total.",
            ParseError::InvalidNotation { .. } => "Compact notation writes the five rows separated by '/', for example 'heart/ember/abuse/resin/trend'.",
            ParseError::NomError(_) => "The underlying parser rejected the input before any grid-level check could run.",
        }
    }

    /// Returns a helpful suggestion or example for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            ParseError::EmptyInput => Some("Example: --letters heart/ember/abuse/resin/trend --pattern -----/-----/-----/-----/-----"),
            ParseError::WrongRowCount { .. } | ParseError::WrongRowLength { .. } => Some("Write five rows of five cells each"),
            ParseError::InvalidRackLetter { .. } => Some("Only letters a-z are allowed in the rack"),
            ParseError::InvalidPatternChar { .. } => Some("Use '-' for cells that are not yet known"),
            ParseError::WrongLetterCount { .. } => Some("Supply exactly 25 letters, one for each cell"),
            ParseError::InvalidNotation { .. } => Some("Separate the five rows with '/' and use no other punctuation"),
            ParseError::NomError(_) => None,
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}

/// Helper function to format error messages with code and optional help text
pub(crate) fn format_error_with_code_and_help(base_msg: &str, code: &str, help: Option<&str>) -> String {
    if let Some(help_text) = help {
        format!("{base_msg} ({code})\n{help_text}")
    } else {
        format!("{base_msg} ({code})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<ParseError> {
        vec![
            ParseError::EmptyInput,
            ParseError::WrongRowCount { grid: GridKind::Rack, expected: 5, found: 4 },
            ParseError::WrongRowLength { grid: GridKind::Pattern, row: 2, expected: 5, found: 6 },
            ParseError::InvalidRackLetter { row: 0, col: 1, invalid_char: '-' },
            ParseError::InvalidPatternChar { row: 3, col: 4, invalid_char: '*' },
            ParseError::WrongLetterCount { expected: 25, found: 24 },
            ParseError::InvalidNotation { input: "ab//cd".to_string() },
            ParseError::NomError(ErrorKind::Tag),
        ]
    }

    #[test]
    fn test_error_codes_and_help() {
        let err = ParseError::EmptyInput;
        assert_eq!(err.code(), "E001");
        let detailed = err.display_detailed();
        assert!(detailed.contains("E001"));
        assert!(detailed.contains("Example"));
    }

    /// Test that all `ParseError` variants have unique error codes
    #[test]
    fn test_all_error_codes_are_unique() {
        let mut codes = std::collections::HashSet::new();
        for err in all_variants() {
            let code = err.code();
            assert!(code.starts_with("E0"), "Error code '{code}' should start with 'E0'");
            assert_eq!(code.len(), 4);
            assert!(codes.insert(code), "Duplicate error code found: {code}");
        }
        assert_eq!(codes.len(), 8);
    }

    #[test]
    fn test_display_detailed_includes_code_and_help() {
        for err in all_variants() {
            let detailed = err.display_detailed();
            assert!(detailed.contains(err.code()));
            assert!(detailed.contains(&err.to_string()));
            if let Some(help) = err.help() {
                assert!(detailed.contains(help));
                assert_ne!(help, err.to_string());
            }
        }
    }

    #[test]
    fn test_messages_name_the_grid_and_position() {
        let err = ParseError::WrongRowLength { grid: GridKind::Pattern, row: 2, expected: 5, found: 6 };
        let msg = err.to_string();
        assert!(msg.contains("pattern"));
        assert!(msg.contains('2') && msg.contains('6'));
    }

    #[test]
    fn test_converts_to_invalid_input_io_error() {
        let io_err: io::Error = ParseError::EmptyInput.into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidInput);
    }
}
