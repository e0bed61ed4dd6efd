//! Query families over a [`LexiconIndex`].
//!
//! Every query is a walk from an anchor node with an explicit stack, driven by a
//! [`Rule`] that decides which edges may be taken and which visited states are
//! results. Walks are lazy: nothing beyond the next match is computed until the
//! caller asks for it. The same word can be reached along several split paths, so
//! each walk remembers what it has already yielded.

use super::{LexiconIndex, NodeId, ROOT};
use crate::letter::{MuddleChar, SPLIT_MARKER};
use crate::rack::Rack;
use std::collections::{BTreeMap, HashSet, VecDeque};

/// A word found by an anchored query, with how many letters precede the anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchoredMatch {
    pub offset: usize,
    pub word: String,
}

/// Walk state carried down one branch.
#[derive(Debug, Clone)]
struct Partial {
    letters: VecDeque<char>,
    /// Has the split edge been crossed (letters now go on the right)?
    wrapped: bool,
    /// `None` means letters are unconstrained.
    rack: Option<Rack>,
    /// Letters added to the left of the anchor
    prepended: usize,
    /// Letters added to the right of the anchor
    appended: usize,
}

impl Partial {
    fn new(letters: VecDeque<char>, rack: Option<Rack>) -> Self {
        Self { letters, wrapped: false, rack, prepended: 0, appended: 0 }
    }

    fn len(&self) -> usize {
        self.letters.len()
    }

    /// The state after crossing `label`, rack untouched.
    fn step(&self, label: char) -> Partial {
        let mut next = self.clone();
        if label.is_split() {
            next.wrapped = true;
        } else if self.wrapped {
            next.letters.push_back(label);
            next.appended += 1;
        } else {
            next.letters.push_front(label);
            next.prepended += 1;
        }
        next
    }

    /// The state after crossing `label` and paying for it from the rack.
    fn step_spending(&self, label: char) -> Option<Partial> {
        let rack = match self.rack {
            Some(rack) => Some(rack.without(label)?),
            None => None,
        };
        let mut next = self.step(label);
        next.rack = rack;
        Some(next)
    }

    fn can_supply(&self, label: char) -> bool {
        self.rack.map_or(true, |rack| rack.can_supply(label))
    }
}

trait Rule {
    /// The state after taking the edge `label`, or `None` to prune that branch.
    fn follow(&self, state: &Partial, label: char) -> Option<Partial>;

    /// Is `state` at `node` a complete result?
    fn accepts(&self, index: &LexiconIndex, node: NodeId, state: &Partial) -> bool;
}

/// Substring, prefix and suffix walks, optionally paying for letters from a rack.
#[derive(Debug, Clone, Copy, Default)]
struct Shape {
    /// Never cross the split edge; results are words ending at the anchor.
    stop_at_split: bool,
    /// Only cross the split edge after exactly this many prepended letters.
    split_after: Option<usize>,
    exact_len: Option<usize>,
}

impl Rule for Shape {
    fn follow(&self, state: &Partial, label: char) -> Option<Partial> {
        if label.is_split() {
            let allowed = !state.wrapped
                && !self.stop_at_split
                && self.split_after.map_or(true, |k| state.prepended == k);
            return allowed.then(|| state.step(label));
        }
        if !state.wrapped && self.split_after.is_some_and(|k| state.prepended >= k) {
            return None;
        }
        if self.exact_len.is_some_and(|n| state.len() >= n) {
            return None;
        }
        state.step_spending(label)
    }

    fn accepts(&self, index: &LexiconIndex, node: NodeId, state: &Partial) -> bool {
        let complete = if self.stop_at_split {
            index
                .node(node)
                .edge(SPLIT_MARKER)
                .is_some_and(|after| index.node(after).is_terminal())
        } else {
            state.wrapped && index.node(node).is_terminal()
        };
        complete && self.exact_len.map_or(true, |n| state.len() == n)
    }
}

/// Substring walk with letters required at given offsets to the right of the anchor.
///
/// A letter forced by the pattern is not paid for from the rack; every other
/// letter is.
#[derive(Debug, Clone)]
struct RackPattern {
    required: BTreeMap<usize, char>,
}

impl Rule for RackPattern {
    fn follow(&self, state: &Partial, label: char) -> Option<Partial> {
        if label.is_split() {
            return (!state.wrapped).then(|| state.step(label));
        }
        if !state.wrapped {
            return state.step_spending(label);
        }
        match self.required.get(&state.appended) {
            Some(&forced) if forced == label => Some(state.step(label)),
            Some(_) => None,
            None if state.can_supply(label) => state.step_spending(label),
            None => None,
        }
    }

    fn accepts(&self, index: &LexiconIndex, node: NodeId, state: &Partial) -> bool {
        state.wrapped && index.node(node).is_terminal()
    }
}

/// Whole-lexicon walk for words of exactly the pattern's length that agree with it
/// at every non-wildcard position.
///
/// Each word is read as its first letter, the split edge, then the rest, so every
/// position is known as soon as its edge is taken and mismatches are pruned early.
#[derive(Debug, Clone)]
struct FixedPattern {
    pattern: Vec<char>,
}

impl FixedPattern {
    fn fits(&self, position: usize, letter: char) -> bool {
        self.pattern
            .get(position)
            .is_some_and(|&p| p.is_wildcard() || p == letter)
    }
}

impl Rule for FixedPattern {
    fn follow(&self, state: &Partial, label: char) -> Option<Partial> {
        if label.is_split() {
            return (!state.wrapped && state.prepended == 1).then(|| state.step(label));
        }
        if !state.wrapped && state.prepended >= 1 {
            return None;
        }
        if !self.fits(state.len(), label) {
            return None;
        }
        state.step_spending(label)
    }

    fn accepts(&self, index: &LexiconIndex, node: NodeId, state: &Partial) -> bool {
        state.wrapped
            && index.node(node).is_terminal()
            && state.len() == self.pattern.len()
            && state.letters.iter().enumerate().all(|(i, &c)| self.fits(i, c))
    }
}

struct Found {
    word: String,
    offset: usize,
}

/// Pre-order walk over the graph under a [`Rule`], yielding each word once.
struct Crawl<'a, R> {
    index: &'a LexiconIndex,
    rule: R,
    stack: Vec<(NodeId, Partial)>,
    seen: HashSet<String>,
}

impl<'a, R: Rule> Crawl<'a, R> {
    fn new(index: &'a LexiconIndex, rule: R, start: Option<(NodeId, Partial)>) -> Self {
        Self { index, rule, stack: start.into_iter().collect(), seen: HashSet::new() }
    }
}

impl<R: Rule> Iterator for Crawl<'_, R> {
    type Item = Found;

    fn next(&mut self) -> Option<Found> {
        let index = self.index;
        while let Some((node, state)) = self.stack.pop() {
            // Reversed so the smallest label is popped first
            for (label, child) in index.node(node).edges().rev() {
                if let Some(next) = self.rule.follow(&state, label) {
                    self.stack.push((child, next));
                }
            }
            if self.rule.accepts(index, node, &state) {
                let word: String = state.letters.iter().collect();
                if self.seen.insert(word.clone()) {
                    return Some(Found { word, offset: state.prepended });
                }
            }
        }
        None
    }
}

impl LexiconIndex {
    /// Every word in the index, each exactly once.
    pub fn words(&self) -> impl Iterator<Item = String> + '_ {
        self.crawl_prefix("", None, None).map(|found| found.word)
    }

    /// Words containing `sub` anywhere.
    pub fn contains_substring(&self, sub: &str) -> impl Iterator<Item = String> + '_ {
        let start = self.anchor(sub).map(|(node, letters)| (node, Partial::new(letters, None)));
        Crawl::new(self, Shape::default(), start).map(|found| found.word)
    }

    /// Words beginning with `prefix`.
    pub fn starts_with(&self, prefix: &str) -> impl Iterator<Item = String> + '_ {
        self.crawl_prefix(prefix, None, None).map(|found| found.word)
    }

    /// Words ending with `suffix`.
    pub fn ends_with(&self, suffix: &str) -> impl Iterator<Item = String> + '_ {
        self.crawl_suffix(suffix, None, None).map(|found| found.word)
    }

    /// Words of exactly `len` letters beginning with `prefix`.
    pub fn starts_with_len(&self, prefix: &str, len: usize) -> impl Iterator<Item = String> + '_ {
        self.crawl_prefix(prefix, None, Some(len)).map(|found| found.word)
    }

    /// Words of exactly `len` letters ending with `suffix`.
    pub fn ends_with_len(&self, suffix: &str, len: usize) -> impl Iterator<Item = String> + '_ {
        self.crawl_suffix(suffix, None, Some(len)).map(|found| found.word)
    }

    /// Words containing `sub` whose other letters can all be paid for from `rack`.
    pub fn contains_lett(&self, sub: &str, rack: &Rack) -> impl Iterator<Item = AnchoredMatch> + '_ {
        let start = self
            .anchor(sub)
            .map(|(node, letters)| (node, Partial::new(letters, Some(*rack))));
        Crawl::new(self, Shape::default(), start).map(AnchoredMatch::from)
    }

    /// Words beginning with `prefix` whose other letters come from `rack`.
    pub fn starts_with_lett(&self, prefix: &str, rack: &Rack) -> impl Iterator<Item = String> + '_ {
        self.crawl_prefix(prefix, Some(*rack), None).map(|found| found.word)
    }

    /// Words ending with `suffix` whose other letters come from `rack`.
    pub fn ends_with_lett(&self, suffix: &str, rack: &Rack) -> impl Iterator<Item = String> + '_ {
        self.crawl_suffix(suffix, Some(*rack), None).map(|found| found.word)
    }

    /// Words containing `sub`, with `required[k]` fixing the letter `k` places to the
    /// right of the anchor (0 is immediately after it).
    ///
    /// Free letters are paid for from `rack` when one is given; required letters
    /// never are.
    pub fn contains_lett_patt(
        &self,
        sub: &str,
        rack: Option<&Rack>,
        required: &BTreeMap<usize, char>,
    ) -> impl Iterator<Item = AnchoredMatch> + '_ {
        let start = self
            .anchor(sub)
            .map(|(node, letters)| (node, Partial::new(letters, rack.copied())));
        let rule = RackPattern { required: required.clone() };
        Crawl::new(self, rule, start).map(AnchoredMatch::from)
    }

    /// Words matching a fixed-length `pattern` (`'-'` matches any letter), built from
    /// `rack` plus the letters already fixed in the pattern.
    ///
    /// A pattern containing anything other than letters and wildcards matches nothing.
    pub fn find_pattern_with_letters(&self, rack: &Rack, pattern: &str) -> impl Iterator<Item = String> + '_ {
        let pattern: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();
        let start = if pattern.iter().all(|c| c.is_letter() || c.is_wildcard()) {
            let mut letters = *rack;
            pattern.iter().filter(|c| c.is_letter()).for_each(|&c| letters.add(c));
            Some((ROOT, Partial::new(VecDeque::new(), Some(letters))))
        } else {
            None
        };
        Crawl::new(self, FixedPattern { pattern }, start).map(|found| found.word)
    }

    /// The node reached by the reversed anchor, with the anchor's letters.
    fn anchor(&self, sub: &str) -> Option<(NodeId, VecDeque<char>)> {
        let letters: VecDeque<char> = sub.chars().map(|c| c.to_ascii_lowercase()).collect();
        if !letters.iter().all(MuddleChar::is_letter) {
            return None;
        }
        let node = self.follow(ROOT, letters.iter().rev().copied())?;
        Some((node, letters))
    }

    fn crawl_prefix(&self, prefix: &str, rack: Option<Rack>, exact_len: Option<usize>) -> Crawl<'_, Shape> {
        // An empty prefix reads each word once, as first letter, split, rest.
        let shape = Shape { split_after: Some(1), exact_len, ..Shape::default() };
        let start = self.anchor(prefix).and_then(|(node, letters)| {
            if letters.is_empty() {
                return Some((node, Partial::new(letters, rack)));
            }
            let after_split = self.node(node).edge(SPLIT_MARKER)?;
            Some((after_split, Partial { wrapped: true, ..Partial::new(letters, rack) }))
        });
        Crawl::new(self, shape, start)
    }

    fn crawl_suffix(&self, suffix: &str, rack: Option<Rack>, exact_len: Option<usize>) -> Crawl<'_, Shape> {
        let shape = Shape { stop_at_split: true, exact_len, ..Shape::default() };
        let start = self
            .anchor(suffix)
            .map(|(node, letters)| (node, Partial::new(letters, rack)));
        Crawl::new(self, shape, start)
    }
}

impl From<Found> for AnchoredMatch {
    fn from(found: Found) -> Self {
        AnchoredMatch { offset: found.offset, word: found.word }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> LexiconIndex {
        LexiconIndex::from_words(["banana", "bandana", "cabana", "nab", "ban"]).unwrap()
    }

    fn sorted<I: IntoIterator<Item = String>>(words: I) -> Vec<String> {
        let mut words: Vec<String> = words.into_iter().collect();
        words.sort();
        words
    }

    fn words_of<I: IntoIterator<Item = AnchoredMatch>>(matches: I) -> Vec<String> {
        sorted(matches.into_iter().map(|m| m.word))
    }

    #[test]
    fn test_words_yields_every_member_once() {
        let index = index();
        let all: Vec<String> = index.words().collect();
        assert_eq!(all.len(), 5);
        assert_eq!(sorted(all), vec!["ban", "banana", "bandana", "cabana", "nab"]);
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_contains_substring_yields_each_word_once() {
        let index = index();
        // "an" occurs twice in banana and bandana
        let found: Vec<String> = index.contains_substring("an").collect();
        assert_eq!(found.len(), 4);
        assert_eq!(sorted(found), vec!["ban", "banana", "bandana", "cabana"]);
    }

    #[test]
    fn test_contains_substring_whole_word() {
        let index = index();
        assert_eq!(sorted(index.contains_substring("bandana")), vec!["bandana"]);
    }

    #[test]
    fn test_starts_with() {
        let index = index();
        assert_eq!(sorted(index.starts_with("ban")), vec!["ban", "banana", "bandana"]);
        assert_eq!(sorted(index.starts_with("BA")), vec!["ban", "banana", "bandana"]);
        assert_eq!(sorted(index.starts_with("c")), vec!["cabana"]);
        assert_eq!(index.starts_with("").count(), 5);
    }

    #[test]
    fn test_ends_with() {
        let index = index();
        assert_eq!(sorted(index.ends_with("ana")), vec!["banana", "bandana", "cabana"]);
        assert_eq!(sorted(index.ends_with("b")), vec!["nab"]);
        assert_eq!(index.ends_with("").count(), 5);
    }

    #[test]
    fn test_length_limited_queries() {
        let index = index();
        assert_eq!(sorted(index.starts_with_len("ban", 6)), vec!["banana"]);
        assert_eq!(sorted(index.starts_with_len("ban", 3)), vec!["ban"]);
        assert_eq!(sorted(index.ends_with_len("ana", 6)), vec!["banana", "cabana"]);
        assert_eq!(index.ends_with_len("ana", 5).count(), 0);
    }

    #[test]
    fn test_misses_are_empty_not_errors() {
        let index = index();
        assert_eq!(index.contains_substring("xyz").count(), 0);
        assert_eq!(index.contains_substring("a+").count(), 0);
        assert_eq!(index.starts_with("nan").count(), 0);
        assert_eq!(index.ends_with("q").count(), 0);
        assert_eq!(LexiconIndex::new().words().count(), 0);
    }

    #[test]
    fn test_contains_lett_reports_anchor_offset() {
        let index = index();
        let found: Vec<AnchoredMatch> = index.contains_lett("an", &Rack::from("b")).collect();
        assert_eq!(found, vec![AnchoredMatch { offset: 1, word: "ban".to_string() }]);
    }

    #[test]
    fn test_contains_lett_respects_rack_counts() {
        let index = index();
        assert_eq!(words_of(index.contains_lett("an", &Rack::from("bnaa"))), vec!["ban", "banana"]);
        assert_eq!(words_of(index.contains_lett("an", &Rack::from("bna"))), vec!["ban"]);
    }

    #[test]
    fn test_rack_letters_cover_free_positions() {
        let index = index();
        let rack = Rack::from("bnaadc");
        for found in index.contains_lett("an", &rack) {
            let mut free: Vec<char> = found.word.chars().collect();
            free.drain(found.offset..found.offset + 2);
            let used: Rack = free.into_iter().collect();
            assert!(rack.covers(&used), "{} uses more than the rack", found.word);
        }
    }

    #[test]
    fn test_empty_rack_still_matches_the_anchor_alone() {
        let index = index();
        assert_eq!(words_of(index.contains_lett("ban", &Rack::new())), vec!["ban"]);
        assert_eq!(index.starts_with_lett("ba", &Rack::new()).count(), 0);
    }

    #[test]
    fn test_starts_and_ends_with_lett() {
        let index = index();
        assert_eq!(sorted(index.starts_with_lett("ba", &Rack::from("n"))), vec!["ban"]);
        assert_eq!(sorted(index.starts_with_lett("ba", &Rack::from("nana"))), vec!["ban", "banana"]);
        assert_eq!(sorted(index.ends_with_lett("na", &Rack::from("aabn"))), vec!["banana"]);
    }

    #[test]
    fn test_blanks_stand_for_any_letter() {
        let index = index();
        assert_eq!(sorted(index.starts_with_lett("ba", &Rack::from("?"))), vec!["ban"]);
        assert_eq!(sorted(index.ends_with_lett("ana", &Rack::from("c??"))), vec!["cabana"]);
    }

    #[test]
    fn test_contains_lett_patt_offsets_right_of_anchor() {
        let index = index();
        let required = BTreeMap::from([(1, 'a')]);
        // cabana has 'n' one place after its "ba"
        assert_eq!(words_of(index.contains_lett_patt("ba", None, &required)), vec!["ban", "banana"]);
        let required = BTreeMap::from([(0, 'n'), (1, 'd')]);
        assert_eq!(words_of(index.contains_lett_patt("ba", None, &required)), vec!["ban", "bandana"]);
    }

    #[test]
    fn test_contains_lett_patt_forced_letters_are_free() {
        let index = index();
        let required = BTreeMap::from([(0, 'a'), (1, 'n'), (2, 'a')]);
        let empty = Rack::new();
        assert_eq!(
            words_of(index.contains_lett_patt("ban", Some(&empty), &required)),
            vec!["ban", "banana"]
        );
    }

    #[test]
    fn test_contains_lett_patt_without_constraints_matches_substring() {
        let index = index();
        let found = words_of(index.contains_lett_patt("an", None, &BTreeMap::new()));
        assert_eq!(found, sorted(index.contains_substring("an")));
    }

    #[test]
    fn test_find_pattern_with_letters() {
        let index = index();
        assert_eq!(sorted(index.find_pattern_with_letters(&Rack::from("bnn"), "-a-a-a")), vec!["banana"]);
        assert_eq!(index.find_pattern_with_letters(&Rack::from("bn"), "-a-a-a").count(), 0);
        assert_eq!(sorted(index.find_pattern_with_letters(&Rack::from("abn"), "---")), vec!["ban", "nab"]);
        assert_eq!(sorted(index.find_pattern_with_letters(&Rack::from("ab"), "n--")), vec!["nab"]);
    }

    #[test]
    fn test_find_pattern_with_letters_rejects_bad_patterns() {
        let index = index();
        assert_eq!(index.find_pattern_with_letters(&Rack::from("abn"), "b+n").count(), 0);
        assert_eq!(index.find_pattern_with_letters(&Rack::from("abn"), "").count(), 0);
    }

    #[test]
    fn test_find_pattern_with_letters_fully_fixed() {
        let index = index();
        assert_eq!(sorted(index.find_pattern_with_letters(&Rack::new(), "nab")), vec!["nab"]);
        assert_eq!(index.find_pattern_with_letters(&Rack::new(), "nib").count(), 0);
    }

    #[test]
    fn test_results_are_lazy() {
        let index = index();
        let mut iter = index.contains_substring("a");
        assert!(iter.next().is_some());
    }
}
