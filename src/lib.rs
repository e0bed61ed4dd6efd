//! Muddle: a GADDAG word index and a solver for symmetric 5×5 word squares.
//!
//! - [`lexicon`] stores a word list as a GADDAG and answers substring, prefix,
//!   suffix and rack-constrained queries. It can be saved to and loaded from a
//!   compact snapshot.
//! - [`solver`] fills a muddle: 25 letters arranged so every row reads as a word
//!   and row `r` equals column `r`.
//! - [`problem`] reads and writes muddle problems; [`word_list`] reads the
//!   lexicon's source word list.

// Reusable library API, visible to both CLI and WASM builds
pub mod errors;
pub mod grid;
pub mod letter;
pub mod lexicon;
pub mod log;
pub mod problem;
pub mod rack;
pub mod solver;
pub mod word_list;

// Compile the wasm glue only when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub mod wasm;
