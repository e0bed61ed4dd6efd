//! `word_list`: loading the lexicon's source word list.
//!
//! A word list is plain text with one word per line. Lines are trimmed and
//! lowercased; anything that is not at least two letters a-z (hyphenated or
//! accented entries, numbers, stray punctuation) is skipped. The result is sorted
//! and deduplicated so the same list always builds the same index.
//!
//! `parse_from_str` works everywhere, including WASM where the caller fetches the
//! text itself. `load_from_path` is a native-only convenience wrapper.

use fancy_regex::Regex;
use log::debug;
use std::sync::LazyLock;

// How often (in lines) parsing reports progress
const PROGRESS_INTERVAL: usize = 10_000;

/// Words that can be indexed: two or more lowercase letters.
pub(crate) static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2,}$").expect("word pattern is a valid regex"));

/// A processed, ready-to-index word list, sorted alphabetically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    pub words: Vec<String>,
}

impl WordList {
    /// Parse a word list from an in-memory string.
    #[must_use]
    pub fn parse_from_str(contents: &str) -> WordList {
        let mut skipped = 0usize;
        let mut words: Vec<String> = Vec::new();
        for (line_no, raw_line) in contents.lines().enumerate() {
            let word = raw_line.trim().to_lowercase();
            if word.is_empty() {
                continue;
            }
            // a regex engine error counts as "not a word"
            if WORD_RE.is_match(&word).unwrap_or(false) {
                words.push(word);
            } else {
                skipped += 1;
            }
            if (line_no + 1) % PROGRESS_INTERVAL == 0 {
                debug!("read {} lines, {} words so far", line_no + 1, words.len());
            }
        }

        // dedup() only removes adjacent duplicates
        words.sort();
        words.dedup();

        debug!("word list: {} words kept, {skipped} lines skipped", words.len());
        WordList { words }
    }

    /// Native-only convenience method: read from a file path and parse.
    ///
    /// # Errors
    ///
    /// Will return an `Error` if unable to read a file at `path`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<WordList> {
        let path_ref = path.as_ref();
        let data = std::fs::read_to_string(path_ref).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("failed to read word list from '{}': {}", path_ref.display(), e),
            )
        })?;
        Ok(Self::parse_from_str(&data))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
