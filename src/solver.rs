//! The muddle solver: fill a symmetric 5×5 word square from a fixed set of letters.
//!
//! A search runs in two phases:
//!
//! 1. *Diagonal normalization.* Every pre-filled cell whose mirror is still unknown
//!    is copied across, spending one more copy of that letter. If the letters run
//!    out, or two mirrored cells disagree, the problem is unsolvable.
//! 2. *Row-by-row backtracking.* Row `r` is read as a pattern (letters already
//!    placed by earlier rows or the start grid, `'-'` elsewhere) and every lexicon
//!    word matching it is tried, written into both row `r` and column `r`.
//!
//! Two cheap filters run before a candidate is placed. A letter that occurs exactly
//! once in the whole puzzle can only sit on the diagonal, since every other cell is
//! paired with its mirror. And each free cell consumes one copy of its letter on the
//! diagonal, two copies anywhere else; a candidate whose letters the pool cannot
//! cover is dropped.
//!
//! # Error Handling
//!
//! The solver uses [`SolverError`] with three variants:
//!
//! - S001: `InvalidProblem` (Problem input is malformed (wraps [`ParseError`]))
//! - S002: `NoProblem` (`solve` called before `set_problem`)
//! - S003: `CandidateMismatch` (Internal error: a lexicon candidate does not fit its row)
//!
//! Unsolvable input and "no solutions" are not errors; they are reported through
//! [`SolveStatus`].
//!
//! # Examples
//!
//! ```
//! use muddle::lexicon::LexiconIndex;
//! use muddle::problem::Problem;
//! use muddle::solver::{self, SolveStatus};
//!
//! let index = LexiconIndex::from_words(["heart", "ember", "abuse", "resin", "trend"])?;
//! let problem = Problem::from_notation(
//!     "heart/ember/abuse/resin/trend",
//!     "-----/-----/-----/-----/-----",
//! )?;
//! let result = solver::solve_muddle(&index, &problem)?;
//!
//! assert_eq!(result.status, SolveStatus::Exhausted);
//! assert_eq!(result.solutions.len(), 1);
//! println!("{}", result.solutions[0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::errors::ParseError;
use crate::grid::Grid;
use crate::letter::{MuddleChar, GRID_SIZE};
use crate::lexicon::LexiconIndex;
use crate::problem::Problem;
use crate::rack::Rack;
use instant::Instant;
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

/// Why a problem cannot have any solution, detected before the search starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsolvableReason {
    /// Mirroring a pre-filled cell into `(row, col)` needs a copy of `letter`
    /// that the rack no longer has.
    LetterExhausted { letter: char, row: usize, col: usize },

    /// Mirrored cells `(row, col)` and `(col, row)` hold different letters.
    AsymmetricCells { row: usize, col: usize, first: char, second: char },
}

impl fmt::Display for UnsolvableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsolvableReason::LetterExhausted { letter, row, col } => write!(
                f,
                "no '{}' left to mirror into row {row}, column {col}",
                letter.to_ascii_uppercase()
            ),
            UnsolvableReason::AsymmetricCells { row, col, first, second } => write!(
                f,
                "cells ({row}, {col}) and ({col}, {row}) hold different letters ('{}' and '{}')",
                first.to_ascii_uppercase(),
                second.to_ascii_uppercase()
            ),
        }
    }
}

/// Status of the solver run.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveStatus {
    /// Every branch was explored; `solutions` holds every completion (possibly none).
    Exhausted,

    /// The letters cannot fill the start grid. No search was run.
    Unsolvable(UnsolvableReason),

    /// Solver stopped because the time budget expired. Contains the elapsed time.
    TimedOut { elapsed: Duration },
}

/// Counters collected during one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Rows whose candidate list was fetched from the lexicon
    pub rows_expanded: usize,
    pub candidates_considered: usize,
    /// Candidates dropped for placing a single-occurrence letter off the diagonal
    pub pruned_singles: usize,
    /// Candidates dropped because the pool could not cover their letters
    pub pruned_letters: usize,
    /// Candidates placed and recursed into
    pub branches: usize,
}

/// Result of a solver run (even if it stopped early).
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// Completed grids in discovery order.
    pub solutions: Vec<Grid>,
    pub status: SolveStatus,
    pub stats: SearchStats,
    pub elapsed: Duration,
}

impl SolveResult {
    #[must_use]
    pub fn is_unsolvable(&self) -> bool {
        matches!(self.status, SolveStatus::Unsolvable(_))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }
}

impl IntoIterator for SolveResult {
    type Item = Grid;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.into_iter()
    }
}

/// Unified error type for the solver pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// The problem could not be read.
    #[error("invalid problem: {0}")]
    InvalidProblem(#[from] Box<ParseError>),

    /// `solve` was called on a solver that has no problem set.
    #[error("no problem set")]
    NoProblem,

    /// The lexicon returned a word that does not fit the row it was asked for.
    #[error("candidate \"{word}\" does not fit row {row} pattern \"{pattern}\"")]
    CandidateMismatch { row: usize, word: String, pattern: String },
}

impl SolverError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::InvalidProblem(_) => "S001",
            SolverError::NoProblem => "S002",
            SolverError::CandidateMismatch { .. } => "S003",
        }
    }

    /// Returns a short description of this error type (for documentation)
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            SolverError::InvalidProblem(_) => "Problem input is malformed",
            SolverError::NoProblem => "Solve called before a problem was set",
            SolverError::CandidateMismatch { .. } => "Internal error: lexicon candidate does not fit its row",
        }
    }

    /// Returns detailed explanation of this error type (for documentation)
    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            SolverError::InvalidProblem(_) => "The rack or starting pattern could not be read. This wraps an underlying ParseError (see Parse Errors section for specific error codes).",
            SolverError::NoProblem => "A PuzzleSolver needs letters and a starting pattern before it can search.",
            SolverError::CandidateMismatch { .. } => "A word returned by the fixed-pattern lexicon query does not have the pattern's length. This indicates a damaged lexicon or a bug in the query.",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            SolverError::NoProblem => Some("Call set_problem before solve, or use solver::solve_muddle"),
            SolverError::CandidateMismatch { .. } => Some("Rebuild the lexicon from the word list"),
            SolverError::InvalidProblem(_) => None, // ParseError has its own help
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        match self {
            SolverError::InvalidProblem(pe) => {
                // delegate to ParseError's detailed display
                format!("{}\n  caused by: {}", self.code(), pe.display_detailed())
            }
            _ => crate::errors::format_error_with_code_and_help(&self.to_string(), self.code(), self.help()),
        }
    }
}

/// How often each letter occurs in the puzzle, and the resulting buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LetterProfile {
    /// All rack letters, lowercase and sorted.
    pub sorted: Vec<char>,
    pub occurrences: BTreeMap<char, usize>,
    /// Letters occurring exactly once
    pub singles: BTreeSet<char>,
    /// Letters occurring an even number of times
    pub even: BTreeSet<char>,
    /// Letters occurring an odd number of times, more than once
    pub odd: BTreeSet<char>,
}

impl LetterProfile {
    #[must_use]
    pub fn from_letters(letters: &[char]) -> Self {
        let mut sorted: Vec<char> = letters.iter().map(char::to_ascii_lowercase).collect();
        sorted.sort_unstable();

        let mut occurrences = BTreeMap::new();
        for &letter in &sorted {
            *occurrences.entry(letter).or_insert(0) += 1;
        }

        let mut profile = Self { sorted, ..Self::default() };
        for (&letter, &count) in &occurrences {
            match count {
                1 => profile.singles.insert(letter),
                n if n % 2 == 0 => profile.even.insert(letter),
                _ => profile.odd.insert(letter),
            };
        }
        profile.occurrences = occurrences;
        profile
    }

    #[must_use]
    pub fn is_single(&self, letter: char) -> bool {
        self.singles.contains(&letter)
    }
}

/// Simple helper to enforce a wall-clock time limit.
#[derive(Debug)]
struct TimeBudget {
    start: Instant,   // when the budget began
    limit: Duration,  // maximum allowed elapsed time
}

impl TimeBudget {
    fn new(limit: Duration) -> Self {
        Self { start: Instant::now(), limit }
    }

    fn expired(&self) -> bool {
        self.start.elapsed() >= self.limit
    }
}

macro_rules! timed_stop {
    // For traversal steps that return Result<(), E>
    ($search:expr) => {
        if $search.out_of_time() {
            return Ok(());
        }
    };
}

/// A problem after `set_problem`: start grid, letter profile and remaining pool.
#[derive(Debug, Clone)]
struct Setup {
    start: Grid,
    profile: LetterProfile,
    pool: Rack,
}

/// Solves muddles against one lexicon.
///
/// The solver borrows the lexicon, so one index can serve many solvers, on as many
/// threads as needed.
#[derive(Debug)]
pub struct PuzzleSolver<'a> {
    index: &'a LexiconIndex,
    setup: Option<Setup>,
    time_budget: Option<Duration>,
}

impl<'a> PuzzleSolver<'a> {
    #[must_use]
    pub fn new(index: &'a LexiconIndex) -> Self {
        Self { index, setup: None, time_budget: None }
    }

    /// Stop searching after `limit`; the result is then [`SolveStatus::TimedOut`].
    #[must_use]
    pub fn with_time_budget(mut self, limit: Duration) -> Self {
        self.time_budget = Some(limit);
        self
    }

    /// Load a problem: profile its letters and spend the ones already in the pattern.
    pub fn set_problem(&mut self, problem: &Problem) {
        let profile = LetterProfile::from_letters(problem.letters());
        let mut pool: Rack = profile.sorted.iter().copied().collect();
        let start = *problem.pattern();
        for r in 0..GRID_SIZE {
            for c in 0..GRID_SIZE {
                let cell = start.get(r, c);
                if cell.is_letter() && !pool.remove(cell) {
                    debug!("pattern letter '{cell}' at ({r}, {c}) is not in the rack");
                }
            }
        }
        debug!(
            "problem set: letters {}, singles {:?}, pool {pool}",
            profile.sorted.iter().collect::<String>(),
            profile.singles
        );
        self.setup = Some(Setup { start, profile, pool });
    }

    /// Parse and load a problem given as a flat letter string and five pattern rows.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvalidProblem`] if the input is malformed.
    pub fn set_problem_rows<S: AsRef<str>>(&mut self, letters: &str, pattern_rows: &[S]) -> Result<(), SolverError> {
        let problem = Problem::new(letters, pattern_rows)?;
        self.set_problem(&problem);
        Ok(())
    }

    /// The letter profile of the current problem.
    #[must_use]
    pub fn profile(&self) -> Option<&LetterProfile> {
        self.setup.as_ref().map(|setup| &setup.profile)
    }

    /// Letters left after the pattern's letters were spent.
    #[must_use]
    pub fn pool(&self) -> Option<&Rack> {
        self.setup.as_ref().map(|setup| &setup.pool)
    }

    /// Find every symmetric completion of the current problem.
    ///
    /// # Errors
    ///
    /// [`SolverError::NoProblem`] if no problem is set; [`SolverError::CandidateMismatch`]
    /// if the lexicon returns a word of the wrong length.
    pub fn solve(&self) -> Result<SolveResult, SolverError> {
        let setup = self.setup.as_ref().ok_or(SolverError::NoProblem)?;
        let started = Instant::now();
        let mut pool = setup.pool;

        let start = match normalize_diagonal(&setup.start, &mut pool) {
            Ok(grid) => grid,
            Err(reason) => {
                info!("problem is unsolvable: {reason}");
                return Ok(SolveResult {
                    solutions: Vec::new(),
                    status: SolveStatus::Unsolvable(reason),
                    stats: SearchStats::default(),
                    elapsed: started.elapsed(),
                });
            }
        };

        if start.is_complete() {
            debug!("start grid is already complete");
            return Ok(SolveResult {
                solutions: vec![start],
                status: SolveStatus::Exhausted,
                stats: SearchStats::default(),
                elapsed: started.elapsed(),
            });
        }

        let mut search = Search {
            index: self.index,
            start,
            profile: &setup.profile,
            budget: self.time_budget.map(TimeBudget::new),
            solutions: Vec::new(),
            stats: SearchStats::default(),
            timed_out: false,
        };
        let mut grid = start;
        search.traverse(0, pool, &mut grid)?;

        let elapsed = started.elapsed();
        let status = if search.timed_out {
            SolveStatus::TimedOut { elapsed }
        } else {
            SolveStatus::Exhausted
        };
        debug!(
            "search finished: {} solutions, {} branches, {:?} ({status:?})",
            search.solutions.len(),
            search.stats.branches,
            elapsed
        );
        Ok(SolveResult { solutions: search.solutions, status, stats: search.stats, elapsed })
    }
}

/// Solve one problem with a fresh solver and no time limit.
///
/// # Errors
///
/// See [`PuzzleSolver::solve`].
pub fn solve_muddle(index: &LexiconIndex, problem: &Problem) -> Result<SolveResult, SolverError> {
    let mut solver = PuzzleSolver::new(index);
    solver.set_problem(problem);
    solver.solve()
}

/// Copy every pre-filled cell into its empty mirror, spending a letter for each copy.
fn normalize_diagonal(pattern: &Grid, pool: &mut Rack) -> Result<Grid, UnsolvableReason> {
    let mut grid = *pattern;
    for r in 0..GRID_SIZE {
        for c in 0..GRID_SIZE {
            let (here, mirror) = (grid.get(r, c), grid.get(c, r));
            if !here.is_letter() {
                continue;
            }
            if mirror.is_wildcard() {
                grid.set(c, r, here);
                if !pool.remove(here) {
                    return Err(UnsolvableReason::LetterExhausted { letter: here, row: c, col: r });
                }
            } else if mirror != here {
                return Err(UnsolvableReason::AsymmetricCells { row: r, col: c, first: here, second: mirror });
            }
        }
    }
    Ok(grid)
}

/// State of one backtracking search.
struct Search<'s> {
    index: &'s LexiconIndex,
    /// Normalized start grid every reset returns to
    start: Grid,
    profile: &'s LetterProfile,
    budget: Option<TimeBudget>,
    solutions: Vec<Grid>,
    stats: SearchStats,
    timed_out: bool,
}

impl Search<'_> {
    fn out_of_time(&mut self) -> bool {
        if !self.timed_out && self.budget.as_ref().is_some_and(TimeBudget::expired) {
            self.timed_out = true;
        }
        self.timed_out
    }

    fn traverse(&mut self, row: usize, pool: Rack, grid: &mut Grid) -> Result<(), SolverError> {
        if row >= GRID_SIZE {
            if grid.is_complete() && grid.is_symmetric() {
                self.solutions.push(*grid);
            }
            return Ok(());
        }
        timed_stop!(self);

        grid.reset_from(row, &self.start);
        let pattern = grid.row_pattern(row);
        let fixed: Vec<char> = pattern.chars().collect();
        self.stats.rows_expanded += 1;

        let candidates: Vec<String> = self.index.find_pattern_with_letters(&pool, &pattern).collect();
        for word in candidates {
            timed_stop!(self);
            self.stats.candidates_considered += 1;

            let letters: Vec<char> = word.chars().collect();
            if letters.len() != GRID_SIZE {
                return Err(SolverError::CandidateMismatch { row, word, pattern });
            }
            if !self.singles_on_diagonal(row, &letters) {
                self.stats.pruned_singles += 1;
                continue;
            }
            let Some(next) = pool.minus(&demand(row, &letters, &fixed)) else {
                self.stats.pruned_letters += 1;
                continue;
            };

            self.stats.branches += 1;
            grid.place_mirrored(row, &letters);
            self.traverse(row + 1, next, grid)?;
        }
        Ok(())
    }

    /// A letter occurring once in the puzzle may only sit on the diagonal.
    fn singles_on_diagonal(&self, row: usize, letters: &[char]) -> bool {
        letters
            .iter()
            .enumerate()
            .all(|(pos, &letter)| pos == row || !self.profile.is_single(letter))
    }
}

/// Letters a candidate takes from the pool: one per free diagonal cell, two per
/// free cell elsewhere (the cell and its mirror).
fn demand(row: usize, letters: &[char], fixed: &[char]) -> Rack {
    let mut needed = Rack::new();
    for (pos, (&letter, &cell)) in letters.iter().zip(fixed).enumerate() {
        if !cell.is_wildcard() {
            continue;
        }
        needed.add(letter);
        if pos != row {
            needed.add(letter);
        }
    }
    needed
}
