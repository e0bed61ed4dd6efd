//! `Rack`: a multiset of letters available to a query or a search branch.
//!
//! A rack is small and `Copy`, so every recursive branch receives its own reduced
//! copy (`without`, `minus`) instead of mutating counts shared with its siblings.
//! The in-place `add` / `remove` methods exist for building a rack up front.

use crate::letter::{index_to_letter, MuddleChar, ALPHABET_SIZE, BLANK};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rack {
    counts: [u8; ALPHABET_SIZE],
    blanks: u8,
}

impl Rack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a rack from loose characters.
    ///
    /// Letters are case-normalized, `'?'` and `' '` become blanks, and anything
    /// else is ignored.
    pub fn from_chars<I: IntoIterator<Item = char>>(chars: I) -> Self {
        let mut rack = Self::new();
        for c in chars {
            let c = c.to_ascii_lowercase();
            if c.is_letter() || c.is_blank() {
                rack.add(c);
            }
        }
        rack
    }

    /// How many copies of `letter` are available (blanks not included).
    #[must_use]
    pub fn count(&self, letter: char) -> usize {
        letter.letter_index().map_or(0, |i| usize::from(self.counts[i]))
    }

    #[must_use]
    pub fn blanks(&self) -> usize {
        usize::from(self.blanks)
    }

    /// Total number of tiles, blanks included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.iter().map(|&n| usize::from(n)).sum::<usize>() + self.blanks()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add(&mut self, c: char) {
        if let Some(i) = c.letter_index() {
            self.counts[i] = self.counts[i].saturating_add(1);
        } else if c.is_blank() {
            self.blanks = self.blanks.saturating_add(1);
        }
    }

    /// Remove one exact copy of `letter`; blanks are never spent here.
    /// Returns `false` if the letter was not present.
    pub fn remove(&mut self, letter: char) -> bool {
        match letter.letter_index() {
            Some(i) if self.counts[i] > 0 => {
                self.counts[i] -= 1;
                true
            }
            _ => false,
        }
    }

    /// Can `letter` be played, either as itself or through a blank?
    #[must_use]
    pub fn can_supply(&self, letter: char) -> bool {
        self.count(letter) > 0 || (letter.is_letter() && self.blanks > 0)
    }

    /// A copy of this rack with one `letter` spent, falling back to a blank.
    /// `None` if neither is available.
    #[must_use]
    pub fn without(&self, letter: char) -> Option<Rack> {
        let i = letter.letter_index()?;
        let mut next = *self;
        if next.counts[i] > 0 {
            next.counts[i] -= 1;
        } else if next.blanks > 0 {
            next.blanks -= 1;
        } else {
            return None;
        }
        Some(next)
    }

    /// Does this rack hold at least as many of every letter as `other`?
    #[must_use]
    pub fn covers(&self, other: &Rack) -> bool {
        self.counts.iter().zip(other.counts.iter()).all(|(have, need)| have >= need)
            && self.blanks >= other.blanks
    }

    /// A copy of this rack with every tile of `other` removed, or `None` if
    /// `other` is not a sub-multiset.
    #[must_use]
    pub fn minus(&self, other: &Rack) -> Option<Rack> {
        if !self.covers(other) {
            return None;
        }
        let mut next = *self;
        for (have, need) in next.counts.iter_mut().zip(other.counts.iter()) {
            *have -= *need;
        }
        next.blanks -= other.blanks;
        Some(next)
    }

    /// Letters in alphabetical order, one entry per copy (blanks excluded).
    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        self.counts
            .iter()
            .enumerate()
            .flat_map(|(i, &n)| std::iter::repeat(index_to_letter(i)).take(usize::from(n)))
    }
}

impl From<&str> for Rack {
    fn from(s: &str) -> Self {
        Rack::from_chars(s.chars())
    }
}

impl FromIterator<char> for Rack {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Rack::from_chars(iter)
    }
}

impl fmt::Display for Rack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.letters() {
            write!(f, "{c}")?;
        }
        for _ in 0..self.blanks {
            write!(f, "{BLANK}")?;
        }
        Ok(())
    }
}
