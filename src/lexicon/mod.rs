//! GADDAG-style lexicon index.
//!
//! Every word `w` of length `n` is stored once per split position `i` as the path
//! `reverse(w[0..=i])`, then [`SPLIT_MARKER`], then `w[i+1..n]`, ending on a terminal
//! node. A query anchored anywhere inside a word can therefore grow leftwards by
//! following reversed-prefix edges and rightwards after crossing the split edge.
//!
//! The forward part of every path is shared: the node reached by
//! `reverse(p) + '+'` stands for "prefix `p` read so far", and its edge `c` leads to
//! the node for `p + c`. Insertion reuses those nodes instead of allocating copies,
//! which turns the trie into a DAG.
//!
//! # Error Handling
//!
//! Construction and snapshot faults are reported as [`LexiconError`]:
//!
//! - L001: `StructuralInconsistency` (a shared suffix edge points at the wrong node)
//! - L002: `Io` (reading or writing a snapshot failed)
//! - L003: `BadMagic` (not a lexicon snapshot)
//! - L004: `UnsupportedVersion` (snapshot written by an incompatible format version)
//! - L005: `ChecksumMismatch` (payload corrupted)
//! - L006: `Undecodable` (payload could not be decoded into known records)
//! - L007: `UnexpectedRecord` (a record of the wrong shape at a referenced position)
//! - L008: `DanglingReference` (a reference past the end of the snapshot)
//! - L009: `InvalidEdgeLabel` (an edge label that is neither a letter nor the split marker)
//! - L010: `Cyclic` (the snapshot graph contains a cycle)
//! - L011: `EmptySnapshot` (no root node)
//! - L012: `TooManyNodes` (the graph outgrew 32-bit node or record ids)
//!
//! A query that walks off the graph is not an error: it simply yields nothing.
//!
//! # Examples
//!
//! ```
//! use muddle::lexicon::LexiconIndex;
//!
//! let index = LexiconIndex::from_words(["plane", "plant", "lane"])?;
//! assert!(index.contains("PLANE"));
//! assert!(!index.contains("plan"));
//!
//! let mut found: Vec<String> = index.contains_substring("lan").collect();
//! found.sort();
//! assert_eq!(found, vec!["lane", "plane", "plant"]);
//! # Ok::<(), muddle::lexicon::LexiconError>(())
//! ```

mod node;
pub mod query;
pub mod snapshot;

pub use node::{LexNode, NodeId, ROOT};
pub use query::AnchoredMatch;

use crate::letter::{MuddleChar, SPLIT_MARKER};
use crate::word_list::WordList;
use log::{debug, info};
use once_cell::sync::OnceCell;
use std::io;

/// Words shorter than this are never indexed.
pub const MIN_WORD_LEN: usize = 2;

/// Largest arena a [`LexiconIndex`] can hold, one past the last [`NodeId`].
pub const MAX_NODES: u64 = NodeId::MAX as u64 + 1;

// How often (in words) bulk insertion reports progress
const PROGRESS_INTERVAL: usize = 10_000;

/// Errors raised while building, loading or saving a [`LexiconIndex`].
#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("structural inconsistency inserting \"{word}\": edge '{label}' after split {split} points at a different continuation")]
    StructuralInconsistency { word: String, label: char, split: usize },

    #[error("snapshot I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("not a lexicon snapshot (bad magic bytes)")]
    BadMagic,

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },

    #[error("snapshot checksum mismatch: header says {expected:#010x}, payload hashes to {found:#010x}")]
    ChecksumMismatch { expected: u32, found: u32 },

    #[error("snapshot payload could not be decoded: {0}")]
    Undecodable(String),

    #[error("snapshot record {index} should be a {expected} but is a {found}")]
    UnexpectedRecord { index: usize, expected: &'static str, found: &'static str },

    #[error("snapshot record {index} refers to {target}, which does not exist")]
    DanglingReference { index: usize, target: usize },

    #[error("snapshot record {index} has invalid edge label {label:?}")]
    InvalidEdgeLabel { index: usize, label: char },

    #[error("snapshot graph contains a cycle through node {node}")]
    Cyclic { node: usize },

    #[error("snapshot contains no root node")]
    EmptySnapshot,

    #[error("lexicon needs {nodes} nodes but at most {limit} can be addressed")]
    TooManyNodes { nodes: usize, limit: u64 },
}

impl LexiconError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            LexiconError::StructuralInconsistency { .. } => "L001",
            LexiconError::Io(_) => "L002",
            LexiconError::BadMagic => "L003",
            LexiconError::UnsupportedVersion { .. } => "L004",
            LexiconError::ChecksumMismatch { .. } => "L005",
            LexiconError::Undecodable(_) => "L006",
            LexiconError::UnexpectedRecord { .. } => "L007",
            LexiconError::DanglingReference { .. } => "L008",
            LexiconError::InvalidEdgeLabel { .. } => "L009",
            LexiconError::Cyclic { .. } => "L010",
            LexiconError::EmptySnapshot => "L011",
            LexiconError::TooManyNodes { .. } => "L012",
        }
    }

    /// Returns a short description of this error type (for documentation)
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            LexiconError::StructuralInconsistency { .. } => "Shared suffix edge points at the wrong node",
            LexiconError::Io(_) => "Snapshot file could not be read or written",
            LexiconError::BadMagic => "File is not a lexicon snapshot",
            LexiconError::UnsupportedVersion { .. } => "Snapshot format version is not supported",
            LexiconError::ChecksumMismatch { .. } => "Snapshot payload is corrupted",
            LexiconError::Undecodable(_) => "Snapshot payload could not be decoded",
            LexiconError::UnexpectedRecord { .. } => "Snapshot record has the wrong shape",
            LexiconError::DanglingReference { .. } => "Snapshot record refers to a missing record",
            LexiconError::InvalidEdgeLabel { .. } => "Snapshot edge label is not a letter or split marker",
            LexiconError::Cyclic { .. } => "Snapshot graph is not acyclic",
            LexiconError::EmptySnapshot => "Snapshot has no root node",
            LexiconError::TooManyNodes { .. } => "Lexicon graph is too large to address",
        }
    }

    /// Returns detailed explanation of this error type (for documentation)
    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            LexiconError::StructuralInconsistency { .. } => "While inserting a word, an existing edge that should continue a shared suffix leads to a node other than the one built for the neighbouring split point. The insertion is refused and the index is left unchanged.",
            LexiconError::Io(_) => "The operating system reported an error while reading or writing the snapshot file.",
            LexiconError::BadMagic => "The first bytes of the file do not identify a lexicon snapshot.",
            LexiconError::UnsupportedVersion { .. } => "The snapshot was written by a different format version and cannot be read safely.",
            LexiconError::ChecksumMismatch { .. } => "The CRC32 recorded in the snapshot header does not match the payload, so the file was truncated or altered.",
            LexiconError::Undecodable(_) => "The compressed payload is not a sequence of node and edge-map records. Unknown record types are rejected here.",
            LexiconError::UnexpectedRecord { .. } => "A node record must refer to an edge-map record; anything else is rejected before the graph is built.",
            LexiconError::DanglingReference { .. } => "A node or edge-map record points past the end of the snapshot.",
            LexiconError::InvalidEdgeLabel { .. } => "Edge labels must be lowercase letters a-z or the split marker '+'.",
            LexiconError::Cyclic { .. } => "Lexicon graphs are acyclic by construction; a cycle would make queries run forever.",
            LexiconError::EmptySnapshot => "A snapshot must contain at least the root node.",
            LexiconError::TooManyNodes { .. } => "Node ids are 32-bit, and a snapshot stores two records per node under 32-bit positions. A word list that needs more nodes than that cannot be indexed or saved.",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            LexiconError::StructuralInconsistency { .. } => Some("Rebuild the index from the word list; the existing graph was not produced by this crate"),
            LexiconError::BadMagic | LexiconError::UnsupportedVersion { .. } => Some("Rebuild the snapshot with `muddle build-snapshot`"),
            LexiconError::ChecksumMismatch { .. } | LexiconError::Undecodable(_) => Some("The snapshot is damaged; rebuild it from the word list"),
            LexiconError::UnexpectedRecord { .. }
            | LexiconError::DanglingReference { .. }
            | LexiconError::InvalidEdgeLabel { .. }
            | LexiconError::Cyclic { .. }
            | LexiconError::EmptySnapshot => Some("Only load snapshots written by `muddle build-snapshot`"),
            LexiconError::TooManyNodes { .. } => Some("Split the word list, or drop rarely used long words"),
            LexiconError::Io(_) => None,
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        crate::errors::format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}

/// The lexicon graph: an append-only arena of [`LexNode`]s rooted at [`ROOT`].
///
/// Once built (or loaded) the index is only read, so it can be shared freely
/// between threads.
#[derive(Debug)]
pub struct LexiconIndex {
    nodes: Vec<LexNode>,
    // Number of words; cleared whenever a word is inserted
    cached_size: OnceCell<usize>,
}

impl Default for LexiconIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for LexiconIndex {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl Eq for LexiconIndex {}

impl LexiconIndex {
    /// An empty index holding only the root.
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: vec![LexNode::default()], cached_size: OnceCell::new() }
    }

    /// Build an index from words, skipping malformed entries and duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`LexiconError::StructuralInconsistency`] if an insertion finds a
    /// shared suffix edge in an unexpected state, or [`LexiconError::TooManyNodes`]
    /// if the words need more nodes than a [`NodeId`] can number.
    pub fn from_words<I, S>(words: I) -> Result<Self, LexiconError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::new();
        index.add_words(words)?;
        Ok(index)
    }

    /// Build an index from a loaded [`WordList`].
    ///
    /// # Errors
    ///
    /// See [`LexiconIndex::from_words`].
    pub fn from_word_list(word_list: &WordList) -> Result<Self, LexiconError> {
        let index = Self::from_words(&word_list.words)?;
        info!("Indexed {} words into {} nodes", index.len(), index.node_count());
        Ok(index)
    }

    /// Rebuild an index from a checked arena (snapshot loading only).
    pub(crate) fn from_nodes(nodes: Vec<LexNode>) -> Self {
        debug_assert!(!nodes.is_empty(), "an arena always holds the root");
        Self { nodes, cached_size: OnceCell::new() }
    }

    pub(crate) fn nodes(&self) -> &[LexNode] {
        &self.nodes
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &LexNode {
        &self.nodes[id as usize]
    }

    #[must_use]
    pub fn root(&self) -> &LexNode {
        self.node(ROOT)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct words in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        *self.cached_size.get_or_init(|| self.words().count())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root().edge_count() == 0
    }

    /// Walk `labels` from `start`; `None` as soon as an edge is missing.
    pub fn follow<I>(&self, start: NodeId, labels: I) -> Option<NodeId>
    where
        I: IntoIterator<Item = char>,
    {
        labels.into_iter().try_fold(start, |node, label| self.node(node).edge(label))
    }

    /// Is `word` a member? Letters are case-normalized first.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        let lowered = word.to_lowercase();
        let Some(reversed_end) = self.follow(ROOT, lowered.chars().rev()) else {
            return false;
        };
        self.node(reversed_end)
            .edge(SPLIT_MARKER)
            .is_some_and(|after_split| self.node(after_split).is_terminal())
    }

    /// Add many words, returning how many were new.
    ///
    /// # Errors
    ///
    /// Stops at the first [`LexiconError`]; words inserted before it stay in the index.
    pub fn add_words<I, S>(&mut self, words: I) -> Result<usize, LexiconError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for word in words {
            if self.add_word(word.as_ref())? {
                added += 1;
                if added % PROGRESS_INTERVAL == 0 {
                    debug!("indexed {added} words ({} nodes)", self.node_count());
                }
            }
        }
        Ok(added)
    }

    /// Insert one word at every split position.
    ///
    /// Returns `Ok(false)` without touching the graph when the word is malformed
    /// (shorter than [`MIN_WORD_LEN`] or not purely alphabetic) or already present.
    ///
    /// # Errors
    ///
    /// Returns [`LexiconError::StructuralInconsistency`] if an existing suffix edge
    /// would have to be redirected; the index is left unchanged in that case.
    /// Returns [`LexiconError::TooManyNodes`] once the arena has used every
    /// [`NodeId`]; the word is then not a member, though some of its nodes may remain.
    pub fn add_word(&mut self, word: &str) -> Result<bool, LexiconError> {
        let Some(letters) = normalize_word(word) else {
            return Ok(false);
        };
        let normalized: String = letters.iter().collect();
        if self.contains(&normalized) {
            return Ok(false);
        }
        self.check_shared_suffixes(&letters, &normalized)?;

        // Split positions run right to left so that each forward suffix can point at
        // the node built one step earlier.
        let mut continuation: Option<NodeId> = None;
        for split in (0..letters.len()).rev() {
            let reversed_prefix = self.add_path(letters[..=split].iter().rev().copied())?;
            let after_split = self.add_edge(reversed_prefix, SPLIT_MARKER)?;
            match continuation {
                None => self.nodes[after_split as usize].mark_terminal(),
                Some(next) => {
                    let label = letters[split + 1];
                    match self.node(after_split).edge(label) {
                        None => self.nodes[after_split as usize].set_edge(label, next),
                        Some(existing) if existing == next => {}
                        Some(_) => {
                            return Err(LexiconError::StructuralInconsistency {
                                word: normalized,
                                label,
                                split,
                            })
                        }
                    }
                }
            }
            continuation = Some(after_split);
        }

        self.cached_size = OnceCell::new();
        Ok(true)
    }

    /// Verify, before anything is written, that every suffix edge this word would
    /// reuse already points at the node that stands for the longer prefix.
    fn check_shared_suffixes(&self, letters: &[char], word: &str) -> Result<(), LexiconError> {
        for split in 0..letters.len() - 1 {
            let label = letters[split + 1];
            let Some(existing) = self
                .after_split(&letters[..=split])
                .and_then(|here| self.node(here).edge(label))
            else {
                continue;
            };
            if self.after_split(&letters[..=split + 1]) != Some(existing) {
                return Err(LexiconError::StructuralInconsistency {
                    word: word.to_string(),
                    label,
                    split,
                });
            }
        }
        Ok(())
    }

    /// The node standing for `prefix` read in full, i.e. `reverse(prefix) + '+'`.
    fn after_split(&self, prefix: &[char]) -> Option<NodeId> {
        self.follow(ROOT, prefix.iter().rev().copied().chain(std::iter::once(SPLIT_MARKER)))
    }

    fn add_path<I: IntoIterator<Item = char>>(&mut self, labels: I) -> Result<NodeId, LexiconError> {
        labels.into_iter().try_fold(ROOT, |node, label| self.add_edge(node, label))
    }

    /// Follow `label` from `node`, allocating a fresh child if the edge is missing.
    fn add_edge(&mut self, node: NodeId, label: char) -> Result<NodeId, LexiconError> {
        if let Some(child) = self.node(node).edge(label) {
            return Ok(child);
        }
        let child = next_node_id(self.nodes.len())?;
        self.nodes.push(LexNode::default());
        self.nodes[node as usize].set_edge(label, child);
        Ok(child)
    }
}

/// Id for the node appended to an arena of `len` nodes.
fn next_node_id(len: usize) -> Result<NodeId, LexiconError> {
    NodeId::try_from(len).map_err(|_| LexiconError::TooManyNodes { nodes: len.saturating_add(1), limit: MAX_NODES })
}

/// Lowercase a candidate word, or `None` if it cannot be indexed.
fn normalize_word(word: &str) -> Option<Vec<char>> {
    let letters: Vec<char> = word.trim().chars().map(|c| c.to_ascii_lowercase()).collect();
    if letters.len() < MIN_WORD_LEN || !letters.iter().all(MuddleChar::is_letter) {
        return None;
    }
    Some(letters)
}
