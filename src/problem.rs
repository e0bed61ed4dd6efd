//! `Problem`: the 25 letters of a muddle plus its starting pattern.
//!
//! Problems arrive in three shapes, all validated the same way before a search
//! can start:
//!
//! - a flat letter string and five pattern rows (`Problem::new`)
//! - compact notation, five rows joined by `'/'` (`Problem::from_notation`)
//! - a problem file: five rack rows, then five pattern rows, one per line
//!   (`Problem::parse_file_str`, `load_from_path`, `save_to_path`)

use crate::errors::{GridKind, ParseError};
use crate::grid::{Cells, Grid};
use crate::letter::{MuddleChar, CELL_COUNT, GRID_SIZE, WILDCARD};
use nom::{
    bytes::complete::take_while1,
    character::complete::char as nom_char,
    combinator::all_consuming,
    multi::separated_list1,
    IResult,
    Parser,
};

/// Parser result type: input, output, with our custom `ParseError`
type PResult<'a, O> = IResult<&'a str, O, Box<ParseError>>;

const ROW_SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    /// Rack letters, lowercase, in the order given.
    letters: Vec<char>,
    pattern: Grid,
}

impl Problem {
    /// Build a problem from a flat letter string and five pattern rows.
    ///
    /// Whitespace and `'/'` in `letters` are ignored, so `"heart ember ..."` and
    /// `"heart/ember/..."` both work.
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] describing the first malformed part.
    pub fn new<S: AsRef<str>>(letters: &str, pattern_rows: &[S]) -> Result<Self, Box<ParseError>> {
        let cells: Vec<char> = letters
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ROW_SEPARATOR)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if cells.is_empty() {
            return Err(Box::new(ParseError::EmptyInput));
        }
        if let Some((i, &invalid_char)) = cells.iter().enumerate().find(|(_, c)| !c.is_letter()) {
            return Err(Box::new(ParseError::InvalidRackLetter {
                row: i / GRID_SIZE,
                col: i % GRID_SIZE,
                invalid_char,
            }));
        }
        if cells.len() != CELL_COUNT {
            return Err(Box::new(ParseError::WrongLetterCount { expected: CELL_COUNT, found: cells.len() }));
        }
        let pattern = parse_pattern(pattern_rows)?;
        Ok(Self { letters: cells, pattern })
    }

    /// Build a problem from five rack rows and five pattern rows.
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] describing the first malformed row or cell.
    pub fn from_rows<S: AsRef<str>, T: AsRef<str>>(rack_rows: &[S], pattern_rows: &[T]) -> Result<Self, Box<ParseError>> {
        let rack = parse_cells(rack_rows, GridKind::Rack)?;
        let letters = rack.iter().flatten().copied().collect();
        let pattern = parse_pattern(pattern_rows)?;
        Ok(Self { letters, pattern })
    }

    /// Build a problem from compact notation, e.g. `"heart/ember/abuse/resin/trend"`
    /// and `"h----/-----/--u--/-----/-----"`.
    ///
    /// # Errors
    ///
    /// [`ParseError::InvalidNotation`] if either string is not five `'/'`-separated
    /// rows, otherwise as [`Problem::from_rows`].
    pub fn from_notation(rack: &str, pattern: &str) -> Result<Self, Box<ParseError>> {
        let rack_rows = parse_notation(rack)?;
        let pattern_rows = parse_notation(pattern)?;
        Self::from_rows(&rack_rows, &pattern_rows)
    }

    /// Parse the contents of a problem file: five rack rows, then five pattern rows.
    ///
    /// # Errors
    ///
    /// [`ParseError::EmptyInput`] for an empty file, otherwise as [`Problem::from_rows`].
    pub fn parse_file_str(contents: &str) -> Result<Self, Box<ParseError>> {
        let mut lines: Vec<&str> = contents.lines().collect();
        while lines.last().is_some_and(|line| line.trim().is_empty()) {
            lines.pop();
        }
        if lines.is_empty() {
            return Err(Box::new(ParseError::EmptyInput));
        }
        let (rack_rows, pattern_rows) = lines.split_at(GRID_SIZE.min(lines.len()));
        Self::from_rows(rack_rows, pattern_rows)
    }

    /// Native-only convenience method: read a problem file.
    ///
    /// # Errors
    ///
    /// Will return an `Error` if the file cannot be read, or `InvalidInput` if it
    /// does not hold a well-formed problem.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<Problem> {
        let path_ref = path.as_ref();
        let data = std::fs::read_to_string(path_ref).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("failed to read problem from '{}': {}", path_ref.display(), e),
            )
        })?;
        Ok(Self::parse_file_str(&data)?)
    }

    /// Native-only convenience method: write a problem file. An existing file is
    /// never overwritten.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if `path` exists, or any other error from creating or writing it.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_path<P: AsRef<std::path::Path>>(&self, path: P) -> std::io::Result<()> {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new().write(true).create_new(true).open(path.as_ref())?;
        file.write_all(self.to_file_string().as_bytes())
    }

    /// The problem in file form, letters uppercase.
    #[must_use]
    pub fn to_file_string(&self) -> String {
        let mut out = String::new();
        for row in self.rack_rows().iter().chain(self.pattern.rows().iter()) {
            out.push_str(&row.to_ascii_uppercase());
            out.push('\n');
        }
        out
    }

    #[must_use]
    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    #[must_use]
    pub fn pattern(&self) -> &Grid {
        &self.pattern
    }

    /// The rack laid out as five rows of five.
    #[must_use]
    pub fn rack_rows(&self) -> Vec<String> {
        self.letters.chunks(GRID_SIZE).map(|chunk| chunk.iter().collect()).collect()
    }
}

fn parse_pattern<S: AsRef<str>>(rows: &[S]) -> Result<Grid, Box<ParseError>> {
    Ok(Grid::from_cells(parse_cells(rows, GridKind::Pattern)?))
}

/// Check row count, row lengths and every cell of one 5×5 grid.
fn parse_cells<S: AsRef<str>>(rows: &[S], grid: GridKind) -> Result<Cells, Box<ParseError>> {
    if rows.len() != GRID_SIZE {
        return Err(Box::new(ParseError::WrongRowCount { grid, expected: GRID_SIZE, found: rows.len() }));
    }
    let mut cells: Cells = [[WILDCARD; GRID_SIZE]; GRID_SIZE];
    for (row, text) in rows.iter().enumerate() {
        let chars: Vec<char> = text.as_ref().chars().map(|c| c.to_ascii_lowercase()).collect();
        if chars.len() != GRID_SIZE {
            return Err(Box::new(ParseError::WrongRowLength { grid, row, expected: GRID_SIZE, found: chars.len() }));
        }
        for (col, &cell) in chars.iter().enumerate() {
            let valid = match grid {
                GridKind::Rack => cell.is_letter(),
                GridKind::Pattern => cell.is_letter() || cell.is_wildcard(),
            };
            if !valid {
                return Err(Box::new(match grid {
                    GridKind::Rack => ParseError::InvalidRackLetter { row, col, invalid_char: cell },
                    GridKind::Pattern => ParseError::InvalidPatternChar { row, col, invalid_char: cell },
                }));
            }
            cells[row][col] = cell;
        }
    }
    Ok(cells)
}

fn notation_row(input: &str) -> PResult<'_, &str> {
    take_while1(|c: char| c != ROW_SEPARATOR && !c.is_whitespace()).parse(input)
}

fn notation_rows(input: &str) -> PResult<'_, Vec<&str>> {
    separated_list1(nom_char(ROW_SEPARATOR), notation_row).parse(input)
}

/// Split compact notation into rows. Cell contents are checked later, so the error
/// names the offending cell rather than the whole string.
fn parse_notation(input: &str) -> Result<Vec<String>, Box<ParseError>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Box::new(ParseError::EmptyInput));
    }
    match all_consuming(notation_rows).parse(trimmed) {
        Ok((_, rows)) => Ok(rows.into_iter().map(str::to_string).collect()),
        Err(_) => Err(Box::new(ParseError::InvalidNotation { input: trimmed.to_string() })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RACK: [&str; 5] = ["heart", "ember", "abuse", "resin", "trend"];
    const OPEN: [&str; 5] = ["-----", "-----", "-----", "-----", "-----"];

    #[test]
    fn test_from_rows() {
        let problem = Problem::from_rows(&RACK, &OPEN).unwrap();
        assert_eq!(problem.letters().len(), 25);
        assert_eq!(problem.letters()[..5], ['h', 'e', 'a', 'r', 't']);
        assert_eq!(*problem.pattern(), Grid::empty());
        assert_eq!(problem.rack_rows(), RACK);
    }

    #[test]
    fn test_new_accepts_flat_letters_any_case() {
        let problem = Problem::new("HEART ember Abuse resin trend", &OPEN).unwrap();
        assert_eq!(problem, Problem::from_rows(&RACK, &OPEN).unwrap());
    }

    #[test]
    fn test_new_rejects_wrong_letter_count() {
        let err = Problem::new("heartember", &OPEN).unwrap_err();
        assert!(matches!(*err, ParseError::WrongLetterCount { expected: 25, found: 10 }));
    }

    #[test]
    fn test_new_rejects_non_letters() {
        let err = Problem::new("heart-ember", &OPEN).unwrap_err();
        assert!(matches!(*err, ParseError::InvalidRackLetter { row: 1, col: 0, invalid_char: '-' }));
        let err = Problem::new("   ", &OPEN).unwrap_err();
        assert!(matches!(*err, ParseError::EmptyInput));
    }

    #[test]
    fn test_pattern_validation() {
        let err = Problem::from_rows(&RACK, &["-----", "-----"]).unwrap_err();
        assert!(matches!(*err, ParseError::WrongRowCount { grid: GridKind::Pattern, found: 2, .. }));

        let err = Problem::from_rows(&RACK, &["-----", "----", "-----", "-----", "-----"]).unwrap_err();
        assert!(matches!(*err, ParseError::WrongRowLength { grid: GridKind::Pattern, row: 1, found: 4, .. }));

        let err = Problem::from_rows(&RACK, &["-----", "-----", "--*--", "-----", "-----"]).unwrap_err();
        assert!(matches!(*err, ParseError::InvalidPatternChar { row: 2, col: 2, invalid_char: '*' }));
    }

    #[test]
    fn test_rack_validation() {
        let err = Problem::from_rows(&["heart", "ember", "ab se", "resin", "trend"], &OPEN).unwrap_err();
        assert!(matches!(*err, ParseError::InvalidRackLetter { row: 2, col: 2, invalid_char: ' ' }));
        let err = Problem::from_rows(&["heart"], &OPEN).unwrap_err();
        assert!(matches!(*err, ParseError::WrongRowCount { grid: GridKind::Rack, found: 1, .. }));
    }

    #[test]
    fn test_pattern_letters_are_lowercased() {
        let problem = Problem::from_rows(&RACK, &["H----", "-----", "-----", "-----", "-----"]).unwrap();
        assert_eq!(problem.pattern().get(0, 0), 'h');
    }

    #[test]
    fn test_from_notation() {
        let problem = Problem::from_notation("heart/ember/abuse/resin/trend", "h----/-----/--u--/-----/-----").unwrap();
        assert_eq!(problem.pattern().get(2, 2), 'u');
        assert_eq!(problem.rack_rows(), RACK);
    }

    #[test]
    fn test_from_notation_rejects_malformed() {
        let err = Problem::from_notation("heart//ember", "-----/-----/-----/-----/-----").unwrap_err();
        assert!(matches!(*err, ParseError::InvalidNotation { .. }));
        let err = Problem::from_notation("heart ember", "-----/-----/-----/-----/-----").unwrap_err();
        assert!(matches!(*err, ParseError::InvalidNotation { .. }));
        let err = Problem::from_notation("", "-----").unwrap_err();
        assert!(matches!(*err, ParseError::EmptyInput));
    }

    #[test]
    fn test_file_format_round_trip() {
        let problem = Problem::from_rows(&RACK, &["h----", "-----", "-----", "-----", "----d"]).unwrap();
        let text = problem.to_file_string();
        assert_eq!(text.lines().count(), 10);
        assert!(text.starts_with("HEART\n"));
        assert!(text.ends_with("----D\n"));
        assert_eq!(Problem::parse_file_str(&text).unwrap(), problem);
    }

    #[test]
    fn test_file_parsing_tolerates_trailing_blank_lines_and_crlf() {
        let text = "HEART\r\nEMBER\r\nABUSE\r\nRESIN\r\nTREND\r\n-----\r\n-----\r\n-----\r\n-----\r\n-----\r\n\r\n\n";
        let problem = Problem::parse_file_str(text).unwrap();
        assert_eq!(problem.rack_rows(), RACK);
    }

    #[test]
    fn test_file_with_missing_rows() {
        let err = Problem::parse_file_str("HEART\nEMBER\nABUSE\nRESIN\nTREND\n-----\n").unwrap_err();
        assert!(matches!(*err, ParseError::WrongRowCount { grid: GridKind::Pattern, found: 1, .. }));
        assert!(matches!(*Problem::parse_file_str("\n\n").unwrap_err(), ParseError::EmptyInput));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_save_refuses_to_overwrite() {
        let path = std::env::temp_dir().join(format!("muddle-problem-{}.txt", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let problem = Problem::from_rows(&RACK, &OPEN).unwrap();
        problem.save_to_path(&path).unwrap();
        let err = problem.save_to_path(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
        let loaded = Problem::load_from_path(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.unwrap(), problem);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_load_malformed_file_is_invalid_input() {
        let path = std::env::temp_dir().join(format!("muddle-bad-problem-{}.txt", std::process::id()));
        std::fs::write(&path, "HEART\n").unwrap();
        let err = Problem::load_from_path(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
