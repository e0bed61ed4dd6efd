//! Integration tests for the muddle solver.
//!
//! These tests run the whole pipeline: word list file to lexicon, lexicon to
//! snapshot and back, problem parsing, and solving, using the fixtures in
//! `tests/fixtures/`.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use muddle::lexicon::{AnchoredMatch, LexiconError, LexiconIndex};
use muddle::problem::Problem;
use muddle::rack::Rack;
use muddle::solver::{self, PuzzleSolver, SolveStatus, UnsolvableReason};
use muddle::word_list::WordList;

const SQUARE: [&str; 5] = ["heart", "ember", "abuse", "resin", "trend"];
const HEART_RACK: &str = "heart/ember/abuse/resin/trend";
const SWAPPED: [&str; 5] = ["meber", "ehart", "bause", "ersin", "rtend"];
const OPEN: &str = "-----/-----/-----/-----/-----";

/// Build the lexicon from the fixture word list
fn load_test_lexicon() -> LexiconIndex {
    let word_list = WordList::load_from_path("tests/fixtures/test_lexicon.txt").expect("Failed to read test lexicon");
    LexiconIndex::from_word_list(&word_list).expect("fixture words index cleanly")
}

fn sorted<I: Iterator<Item = String>>(words: I) -> Vec<String> {
    let mut words: Vec<String> = words.collect();
    words.sort();
    words
}

/// Two squares over the same rack, plus decoys that only fail a few rows down
fn load_swapped_lexicon() -> LexiconIndex {
    let word_list = WordList::load_from_path("tests/fixtures/swapped_squares.txt").expect("Failed to read fixture");
    LexiconIndex::from_word_list(&word_list).expect("fixture words index cleanly")
}

/// A fresh path in the temp dir that does not exist yet
fn scratch_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("muddle-{}-{name}", std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

#[cfg(test)]
mod lexicon_queries {
    use super::*;

    #[test]
    fn test_fixture_skips_malformed_and_duplicate_lines() {
        let index = load_test_lexicon();
        assert_eq!(index.len(), 20);
        assert!(index.contains("resin"));
        assert!(!index.contains("a"));
        assert!(!index.contains("co-op"));
        assert!(!index.contains("coop"));
    }

    #[test]
    fn test_words_lists_every_member_once() {
        let index = load_test_lexicon();
        let words = sorted(index.words());
        let unique: HashSet<&String> = words.iter().collect();
        assert_eq!(words.len(), 20);
        assert_eq!(unique.len(), 20);
        assert_eq!(words.first().map(String::as_str), Some("abuse"));
        assert_eq!(words.last().map(String::as_str), Some("trend"));
    }

    #[test]
    fn test_substring_prefix_and_suffix() {
        let index = load_test_lexicon();
        assert_eq!(sorted(index.contains_substring("ana")), vec!["banana", "bandana", "cabana"]);
        assert_eq!(sorted(index.starts_with("heart")), vec!["heart", "hearts"]);
        assert_eq!(sorted(index.ends_with("ane")), vec!["lane", "plane"]);
        assert_eq!(sorted(index.starts_with_len("pla", 5)), vec!["plane", "plant"]);
        assert_eq!(sorted(index.ends_with_len("ana", 7)), vec!["bandana"]);
    }

    #[test]
    fn test_query_miss_is_empty() {
        let index = load_test_lexicon();
        assert_eq!(index.contains_substring("qz").count(), 0);
        assert_eq!(index.starts_with("zz").count(), 0);
        assert_eq!(index.ends_with("xq").count(), 0);
    }

    #[test]
    fn test_rack_constrained_substring_with_blank() {
        let index = load_test_lexicon();
        let rack = Rack::from("ca?");
        let mut found: Vec<AnchoredMatch> = index.contains_lett("ban", &rack).collect();
        found.sort();
        assert_eq!(
            found,
            vec![
                AnchoredMatch { offset: 0, word: "ban".to_string() },
                AnchoredMatch { offset: 2, word: "cabana".to_string() },
            ]
        );
    }

    #[test]
    fn test_fixed_pattern_pays_free_cells_from_rack() {
        let index = load_test_lexicon();
        let found = sorted(index.find_pattern_with_letters(&Rack::from("hrt"), "-ea--"));
        assert_eq!(found, vec!["heart"]);
        assert_eq!(index.find_pattern_with_letters(&Rack::from("hr"), "-ea--").count(), 0);
    }

    #[test]
    fn test_required_positions_after_anchor() {
        let index = load_test_lexicon();
        // "ban" qualifies too: nothing follows its "an"
        let required = BTreeMap::from([(0, 'd')]);
        let found = sorted(index.contains_lett_patt("an", None, &required).map(|m| m.word));
        assert_eq!(found, vec!["ban", "bandana"]);
    }
}

#[cfg(test)]
mod snapshots {
    use super::*;

    #[test]
    fn test_snapshot_file_round_trip() {
        let index = load_test_lexicon();
        let path = scratch_path("round-trip.mdlx");
        index.save_snapshot(&path).unwrap();
        let restored = LexiconIndex::load_snapshot(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(restored, index);
        assert_eq!(restored.len(), index.len());
        assert_eq!(sorted(restored.contains_substring("ear")), sorted(index.contains_substring("ear")));
    }

    #[test]
    fn test_truncated_snapshot_is_rejected() {
        let bytes = load_test_lexicon().to_snapshot_bytes().unwrap();
        let err = LexiconIndex::from_snapshot_bytes(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, LexiconError::ChecksumMismatch { .. } | LexiconError::Undecodable(_)));
    }

    #[test]
    fn test_word_list_is_not_a_snapshot() {
        let err = LexiconIndex::load_snapshot("tests/fixtures/test_lexicon.txt").unwrap_err();
        assert!(matches!(err, LexiconError::BadMagic));
        assert_eq!(err.code(), "L003");
    }
}

#[cfg(test)]
mod problems {
    use super::*;

    #[test]
    fn test_problem_file_fixture() {
        let problem = Problem::load_from_path("tests/fixtures/heart.txt").unwrap();
        assert_eq!(problem.rack_rows(), SQUARE);
        assert_eq!(problem.pattern().row_pattern(0), "h----");
        assert_eq!(problem.pattern().row_pattern(2), "--u--");
    }

    #[test]
    fn test_problem_save_then_load() {
        let problem = Problem::from_notation(HEART_RACK, "h----/-----/--u--/-----/-----").unwrap();
        let path = scratch_path("problem.txt");
        problem.save_to_path(&path).unwrap();
        let loaded = Problem::load_from_path(&path);
        let second_save = problem.save_to_path(&path);
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.unwrap(), problem);
        assert_eq!(second_save.unwrap_err().kind(), std::io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_malformed_notation_codes() {
        let short = Problem::from_notation("heart/ember/abuse/resin", OPEN).unwrap_err();
        assert_eq!(short.code(), "E002");
        let bad_cell = Problem::from_notation(HEART_RACK, "-----/--*--/-----/-----/-----").unwrap_err();
        assert_eq!(bad_cell.code(), "E005");
    }
}

#[cfg(test)]
mod solving {
    use super::*;

    #[test]
    fn test_unique_square_from_open_pattern() {
        let index = load_test_lexicon();
        let problem = Problem::from_notation(HEART_RACK, OPEN).unwrap();
        let result = solver::solve_muddle(&index, &problem).unwrap();

        assert_eq!(result.status, SolveStatus::Exhausted);
        assert_eq!(result.len(), 1);
        assert_eq!(result.solutions[0].rows(), SQUARE);
    }

    #[test]
    fn test_problem_file_solves_to_same_square() {
        let index = load_test_lexicon();
        let problem = Problem::load_from_path("tests/fixtures/heart.txt").unwrap();
        let solutions: Vec<_> = solver::solve_muddle(&index, &problem).unwrap().into_iter().collect();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].to_string(), "HEART\nEMBER\nABUSE\nRESIN\nTREND");
    }

    #[test]
    fn test_solutions_are_deterministic() {
        let index = load_test_lexicon();
        let problem = Problem::from_notation(HEART_RACK, OPEN).unwrap();
        let first = solver::solve_muddle(&index, &problem).unwrap();
        let second = solver::solve_muddle(&index, &problem).unwrap();
        assert_eq!(first.solutions, second.solutions);
        assert_eq!(first.stats, second.stats);
    }

    #[test]
    fn test_solutions_respect_grid_invariants() {
        let index = load_test_lexicon();
        let problem = Problem::from_notation(HEART_RACK, OPEN).unwrap();
        let mut rack_letters: Vec<char> = problem.letters().to_vec();
        rack_letters.sort_unstable();

        for grid in solver::solve_muddle(&index, &problem).unwrap() {
            assert!(grid.is_complete());
            assert!(grid.is_symmetric());
            let mut used: Vec<char> = grid.letters().collect();
            used.sort_unstable();
            assert_eq!(used, rack_letters);
            for row in grid.rows() {
                assert!(index.contains(&row), "{row} is not a word");
            }
        }
    }

    #[test]
    fn test_missing_mirror_letter_is_unsolvable_not_empty() {
        let index = load_test_lexicon();
        let problem = Problem::from_notation("heart/ember/zbuse/resin/trend", "--a--/-----/-----/-----/-----").unwrap();
        let result = solver::solve_muddle(&index, &problem).unwrap();
        assert!(result.is_unsolvable());
        assert!(matches!(
            result.status,
            SolveStatus::Unsolvable(UnsolvableReason::LetterExhausted { letter: 'a', .. })
        ));
    }

    #[test]
    fn test_rack_without_a_square_exhausts_with_no_solutions() {
        let index = load_test_lexicon();
        let problem = Problem::from_notation("plane/learn/apply/nines/lanes", OPEN).unwrap();
        let result = solver::solve_muddle(&index, &problem).unwrap();
        assert_eq!(result.status, SolveStatus::Exhausted);
        assert!(result.is_empty());
    }

    #[test]
    fn test_every_square_is_returned_once() {
        let index = load_swapped_lexicon();
        let problem = Problem::from_notation(HEART_RACK, OPEN).unwrap();
        let result = solver::solve_muddle(&index, &problem).unwrap();

        assert_eq!(result.status, SolveStatus::Exhausted);
        let found: Vec<Vec<String>> = result.solutions.iter().map(|grid| grid.rows()).collect();
        assert_eq!(found, vec![SQUARE.to_vec(), SWAPPED.to_vec()]);
        let distinct: HashSet<_> = result.solutions.iter().collect();
        assert_eq!(distinct.len(), 2);
        assert!(result.stats.branches > 10, "decoys should open extra branches: {:?}", result.stats);
    }

    #[test]
    fn test_prefilled_cell_survives_failed_branches() {
        let index = load_swapped_lexicon();
        // both squares end in 'd'; the corner must be restored after every dead end
        let problem = Problem::from_notation(HEART_RACK, "-----/-----/-----/-----/----d").unwrap();
        let result = solver::solve_muddle(&index, &problem).unwrap();
        let found: Vec<Vec<String>> = result.solutions.iter().map(|grid| grid.rows()).collect();
        assert_eq!(found, vec![SQUARE.to_vec(), SWAPPED.to_vec()]);
    }

    #[test]
    fn test_prefill_picks_between_squares() {
        let index = load_swapped_lexicon();
        let problem = Problem::from_notation(HEART_RACK, "m----/-----/-----/-----/-----").unwrap();
        let result = solver::solve_muddle(&index, &problem).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.solutions[0].rows(), SWAPPED);
    }

    #[test]
    fn test_solver_from_snapshot_matches_solver_from_words() {
        let index = load_test_lexicon();
        let restored = LexiconIndex::from_snapshot_bytes(&index.to_snapshot_bytes().unwrap()).unwrap();
        let problem = Problem::from_notation(HEART_RACK, "-e---/-----/-----/-----/-----").unwrap();

        let mut from_words = PuzzleSolver::new(&index);
        from_words.set_problem(&problem);
        let mut from_snapshot = PuzzleSolver::new(&restored);
        from_snapshot.set_problem(&problem);

        assert_eq!(from_words.solve().unwrap().solutions, from_snapshot.solve().unwrap().solutions);
    }

    #[test]
    fn test_one_index_serves_parallel_solves() {
        let index = load_test_lexicon();
        let problem = Problem::from_notation(HEART_RACK, OPEN).unwrap();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| solver::solve_muddle(&index, &problem).unwrap().len()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), 1);
            }
        });
    }
}
