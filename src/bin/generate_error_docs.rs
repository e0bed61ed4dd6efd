//! Generate error code documentation from the source of truth (error enums).
//!
//! This binary reads the error codes, descriptions, details, and help text
//! directly from the `ParseError`, `LexiconError` and `SolverError` implementations
//! via their `code()`, `description()`, `details()`, and `help()` methods.
//!
//! Run with:
//! ```bash
//! cargo run --bin generate_error_docs > docs/ERROR_CODES.md
//! ```

use muddle::errors::{GridKind, ParseError};
use muddle::lexicon::LexiconError;
use muddle::solver::SolverError;

/// Macro to generate error documentation for any error type
/// with `code()`, `description()`, `details()`, `help()`, and `display_detailed()` methods
macro_rules! generate_error_docs {
    ($errors:expr) => {
        for error in $errors {
            println!("### {}: {}\n", error.code(), error.description());
            println!("**Details:** {}\n", error.details());

            if let Some(help_text) = error.help() {
                println!("**How to fix:**");
                println!("```");
                println!("{help_text}");
                println!("```\n");
            }

            println!("**Example error message:**");
            println!("```");
            println!("{error}");
            println!("```\n");

            println!("**Detailed format:**");
            println!("```");
            println!("{}", error.display_detailed());
            println!("```\n");

            println!("---\n");
        }
    };
}

/// Helper to create all `ParseError` variants for documentation
fn all_parse_error_variants() -> Vec<ParseError> {
    vec![
        ParseError::EmptyInput,
        ParseError::WrongRowCount { grid: GridKind::Rack, expected: 5, found: 4 },
        ParseError::WrongRowLength { grid: GridKind::Pattern, row: 2, expected: 5, found: 6 },
        ParseError::InvalidRackLetter { row: 0, col: 3, invalid_char: '7' },
        ParseError::InvalidPatternChar { row: 1, col: 1, invalid_char: '*' },
        ParseError::WrongLetterCount { expected: 25, found: 24 },
        ParseError::InvalidNotation { input: "heart//ember".to_string() },
        // NomError--use a common error kind
        ParseError::NomError(nom::error::ErrorKind::TakeWhile1),
    ]
}

/// Helper to create all `LexiconError` variants for documentation
fn all_lexicon_error_variants() -> Vec<LexiconError> {
    vec![
        LexiconError::StructuralInconsistency { word: "plane".to_string(), label: 'e', split: 2 },
        LexiconError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "lexicon.mdlx: No such file or directory")),
        LexiconError::BadMagic,
        LexiconError::UnsupportedVersion { found: 9, expected: 1 },
        LexiconError::ChecksumMismatch { expected: 0x1234_5678, found: 0x9abc_def0 },
        LexiconError::Undecodable("unknown variant index 7".to_string()),
        LexiconError::UnexpectedRecord { index: 4, expected: "edge map", found: "node" },
        LexiconError::DanglingReference { index: 3, target: 120 },
        LexiconError::InvalidEdgeLabel { index: 5, label: '#' },
        LexiconError::Cyclic { node: 2 },
        LexiconError::EmptySnapshot,
        LexiconError::TooManyNodes { nodes: 3_000_000_000, limit: muddle::lexicon::snapshot::MAX_SNAPSHOT_NODES },
    ]
}

/// Helper to create all `SolverError` variants for documentation
fn all_solver_error_variants() -> Vec<SolverError> {
    vec![
        SolverError::InvalidProblem(Box::new(ParseError::EmptyInput)),
        SolverError::NoProblem,
        SolverError::CandidateMismatch { row: 1, word: "emberz".to_string(), pattern: "e----".to_string() },
    ]
}

fn main() {
    println!("# Error Code Reference\n");
    println!("**⚠️ This document is auto-generated from the source code. Do not edit manually.**\n");

    println!("## Table of Contents\n");
    println!("- [Solver Errors (S001–S003)](#solver-errors)");
    println!("- [Lexicon Errors (L001–L012)](#lexicon-errors)");
    println!("- [Parse Errors (E001–E008)](#parse-errors)");
    println!("- [How to Use Error Codes](#how-to-use-error-codes)\n");

    println!("## Solver Errors\n");
    println!("Top-level errors from the solver. These wrap problem parse errors or indicate solver-specific issues.\n");
    generate_error_docs!(all_solver_error_variants());

    println!("## Lexicon Errors\n");
    println!("Errors while building the word index or reading and writing snapshots.\n");
    generate_error_docs!(all_lexicon_error_variants());

    println!("## Parse Errors\n");
    println!("Errors in the rack or starting pattern of a problem.\n");
    generate_error_docs!(all_parse_error_variants());

    println!("\n## How to Use Error Codes\n");
    println!("When you see an error like:\n");
    println!("```");
    println!("{}", ParseError::WrongLetterCount { expected: 25, found: 24 }.display_detailed());
    println!("```\n");
    println!("1. Note the error code (e.g., `E006`)");
    println!("2. Look it up in this document for detailed explanation");
    println!("3. Follow the suggested resolution steps\n");
}
