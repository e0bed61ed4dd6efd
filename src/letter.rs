use std::ops::RangeInclusive;

// Character-set constants
pub(crate) const ALPHABET_SIZE: usize = 26;
pub(crate) const LOWERCASE_ALPHABET: RangeInclusive<char> = 'a'..='z';

/// Edge label separating the reversed prefix of an indexed path from its forward suffix.
pub const SPLIT_MARKER: char = '+';
/// An unfilled grid cell, or a "match anything" position in a fixed-length pattern.
pub const WILDCARD: char = '-';
/// Rack blank as it appears in files and on the command line.
pub const BLANK: char = '?';
/// Legacy spelling of a rack blank.
pub(crate) const BLANK_SPACE: char = ' ';

/// Side length of a muddle grid.
pub const GRID_SIZE: usize = 5;
/// Number of cells (and therefore rack letters) in a muddle.
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

pub(crate) trait MuddleChar {
    fn is_letter(&self) -> bool;
    fn is_wildcard(&self) -> bool;
    fn is_split(&self) -> bool;
    fn is_blank(&self) -> bool;
    fn is_edge_label(&self) -> bool;
    fn letter_index(&self) -> Option<usize>;
}

impl MuddleChar for char {
    fn is_letter(&self) -> bool {
        LOWERCASE_ALPHABET.contains(self)
    }
    fn is_wildcard(&self) -> bool {
        *self == WILDCARD
    }
    fn is_split(&self) -> bool {
        *self == SPLIT_MARKER
    }
    fn is_blank(&self) -> bool {
        *self == BLANK || *self == BLANK_SPACE
    }
    fn is_edge_label(&self) -> bool {
        self.is_letter() || self.is_split()
    }
    fn letter_index(&self) -> Option<usize> {
        if self.is_letter() {
            Some(*self as usize - 'a' as usize)
        } else {
            None
        }
    }
}

/// 0 -> 'a', 1 -> 'b', ..., 25 -> 'z'
pub(crate) fn index_to_letter(i: usize) -> char {
    debug_assert!(i < ALPHABET_SIZE, "letter index {i} out of range");
    (b'a' + i as u8) as char
}
