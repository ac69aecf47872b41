//! An automaton whose goto function is resolved on demand.
#[cfg(feature = "pattern-iter")]
pub mod iter;

use alloc::vec::Vec;
use core::cell::RefCell;

use crate::builder::Builder;
use crate::errors::Result;
use crate::frozen::FrozenAutomaton;
use crate::mapper::CodeMapper;
use crate::{Node, State, Statistics, Transition};

use crate::{INVALID_IDX, ROOT_IDX};

/// An Aho-Corasick automaton whose goto function and suffix links are resolved lazily.
///
/// Each `(node, byte)` transition is computed at most once, on first demand, and
/// memoized. The transition rows live in a shared edge table that grows row by row,
/// so memory is proportional to the states that are actually visited.
///
/// Queries take `&self` but update internal caches, so [`Automaton`] is not `Sync`.
/// Wrap it in a `Mutex`, or call [`Automaton::freeze`] to share it between threads.
pub struct Automaton {
    pub(crate) mapper: CodeMapper,
    pub(crate) nodes: Vec<Node>,
    pub(crate) trie_edges: Vec<u32>,
    pub(crate) goto_edges: RefCell<Vec<u32>>,
}

#[derive(Clone, Copy, Debug)]
enum Task {
    Link(u32),
    Goto(u32, u32),
}

impl Automaton {
    /// Creates a new [`Automaton`] from input patterns.
    ///
    /// The value `i` is associated with `patterns[i]`.
    ///
    /// # Arguments
    ///
    /// - `patterns`: List of byte patterns. Duplicates are allowed; the last one wins.
    ///
    /// # Errors
    ///
    /// [`LazyAcError`](crate::errors::LazyAcError) will be returned when
    ///
    /// - `patterns` contains empty patterns, or
    /// - the scale of the resulting automaton exceeds the expected one.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazyac::{Automaton, Statistics};
    ///
    /// let patterns = vec!["abcd", "bcde", "cdef"];
    /// let pma = Automaton::from_patterns(&patterns).unwrap();
    ///
    /// assert_eq!(pma.num_elems(), 13);
    /// assert_eq!(pma.num_resolved(), 0);
    /// ```
    pub fn from_patterns<I, P>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        Ok(Builder::new()
            .build_from_patterns(patterns)?
            .release_automaton())
    }

    /// Creates a new [`Automaton`] from input records.
    ///
    /// # Arguments
    ///
    /// - `records`: List of pairs of a byte pattern and an associated value
    ///   no greater than [`MAX_VALUE`](crate::MAX_VALUE).
    ///
    /// # Errors
    ///
    /// [`LazyAcError`](crate::errors::LazyAcError) will be returned when
    ///
    /// - `records` contains empty patterns,
    /// - `records` contains values greater than [`MAX_VALUE`](crate::MAX_VALUE), or
    /// - the scale of the resulting automaton exceeds the expected one.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazyac::{Automaton, Transition};
    ///
    /// let records = vec![("abcd", 2), ("bcde", 3), ("cdef", 5)];
    /// let pma = Automaton::from_records(records).unwrap();
    ///
    /// assert_eq!(pma.exact_match("cdef"), Some(5));
    /// ```
    pub fn from_records<I, P>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, u32)>,
        P: AsRef<[u8]>,
    {
        Ok(Builder::new()
            .build_from_records(records)?
            .release_automaton())
    }

    /// Resolves every suffix link and every goto transition.
    ///
    /// After this, queries never allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazyac::{Automaton, Statistics};
    ///
    /// let pma = Automaton::from_patterns(["ab", "b"]).unwrap();
    /// pma.resolve_all();
    ///
    /// assert_eq!(pma.num_resolved(), pma.num_elems() * 2);
    /// ```
    pub fn resolve_all(&self) {
        for node_idx in 0..self.num_nodes() {
            for code in 0..self.mapper.alphabet_size() {
                self.goto_idx(node_idx, code);
            }
            self.suffix_link_idx(node_idx);
            self.output_link_idx(node_idx);
        }
    }

    /// Resolves all transitions and converts the automaton into a [`FrozenAutomaton`].
    ///
    /// # Examples
    ///
    /// ```
    /// use lazyac::{Automaton, Transition};
    ///
    /// let pma = Automaton::from_patterns(["abcd", "bcde"]).unwrap();
    /// let frozen = pma.freeze();
    ///
    /// assert!(frozen.has_exact_match("bcde"));
    /// ```
    pub fn freeze(self) -> FrozenAutomaton {
        FrozenAutomaton::from_automaton(self)
    }

    /// Returns the number of distinct bytes in the dictionary.
    #[inline(always)]
    pub const fn alphabet_size(&self) -> usize {
        self.mapper.alphabet_size() as usize
    }

    #[inline(always)]
    pub(crate) fn num_nodes(&self) -> u32 {
        self.nodes.len() as u32
    }

    #[inline(always)]
    pub(crate) fn state(&self, node_idx: u32) -> State {
        self.nodes[node_idx as usize].state(node_idx)
    }

    #[inline(always)]
    fn trie_child(&self, node_idx: u32, code: u32) -> Option<u32> {
        let offset = self.nodes[node_idx as usize].trie_offset;
        if offset == INVALID_IDX {
            return None;
        }
        let child_idx = self.trie_edges[(offset + code) as usize];
        if child_idx == INVALID_IDX {
            None
        } else {
            Some(child_idx)
        }
    }

    #[inline(always)]
    fn cached_goto(&self, node_idx: u32, code: u32) -> Option<u32> {
        let offset = self.nodes[node_idx as usize].goto_offset.get();
        if offset == INVALID_IDX {
            return None;
        }
        let target = self.goto_edges.borrow()[(offset + code) as usize];
        if target == INVALID_IDX {
            None
        } else {
            Some(target)
        }
    }

    fn store_goto(&self, node_idx: u32, code: u32, target: u32) {
        let node = &self.nodes[node_idx as usize];
        let mut goto_edges = self.goto_edges.borrow_mut();
        let mut offset = node.goto_offset.get();
        if offset == INVALID_IDX {
            let len = goto_edges.len();
            debug_assert!(len + self.alphabet_size() <= self.nodes.len() * self.alphabet_size());
            offset = len as u32;
            goto_edges.resize(len + self.alphabet_size(), INVALID_IDX);
            node.goto_offset.set(offset);
        }
        goto_edges[(offset + code) as usize] = target;
    }

    /// Resolves the transition if it needs no fallback through a suffix link.
    #[inline(always)]
    fn try_goto(&self, node_idx: u32, code: u32) -> Option<u32> {
        if let Some(target) = self.cached_goto(node_idx, code) {
            return Some(target);
        }
        let target = if let Some(child_idx) = self.trie_child(node_idx, code) {
            child_idx
        } else if node_idx == ROOT_IDX {
            ROOT_IDX
        } else {
            return None;
        };
        self.store_goto(node_idx, code, target);
        Some(target)
    }

    /// Resolves the suffix link if it does not depend on another transition.
    #[inline(always)]
    fn try_suffix_link(&self, node_idx: u32) -> Option<u32> {
        let node = &self.nodes[node_idx as usize];
        let link = node.suffix_link.get();
        if link != INVALID_IDX {
            return Some(link);
        }
        if node.parent == ROOT_IDX {
            node.suffix_link.set(ROOT_IDX);
            return Some(ROOT_IDX);
        }
        None
    }

    #[inline(always)]
    pub(crate) fn goto_idx(&self, node_idx: u32, code: u32) -> u32 {
        if let Some(target) = self.try_goto(node_idx, code) {
            target
        } else {
            self.resolve(Task::Goto(node_idx, code))
        }
    }

    #[inline(always)]
    pub(crate) fn suffix_link_idx(&self, node_idx: u32) -> u32 {
        if let Some(link) = self.try_suffix_link(node_idx) {
            link
        } else {
            self.resolve(Task::Link(node_idx))
        }
    }

    /// Resolves suffix links and goto transitions, which are defined by each other,
    /// with an explicit work stack instead of recursion.
    ///
    /// Every pushed task is on a node strictly shallower than the task below it,
    /// or is the suffix link of the same node, so the stack never exceeds twice
    /// the depth of the deepest node.
    fn resolve(&self, task: Task) -> u32 {
        let mut stack = vec![task];
        let mut resolved = ROOT_IDX;
        while let Some(&top) = stack.last() {
            match top {
                Task::Link(node_idx) => {
                    if let Some(link) = self.try_suffix_link(node_idx) {
                        resolved = link;
                        stack.pop();
                        continue;
                    }
                    let node = &self.nodes[node_idx as usize];
                    if let Some(parent_link) = self.try_suffix_link(node.parent) {
                        if let Some(link) = self.try_goto(parent_link, node.parent_code) {
                            node.suffix_link.set(link);
                            resolved = link;
                            stack.pop();
                        } else {
                            stack.push(Task::Goto(parent_link, node.parent_code));
                        }
                    } else {
                        stack.push(Task::Link(node.parent));
                    }
                }
                Task::Goto(node_idx, code) => {
                    if let Some(target) = self.try_goto(node_idx, code) {
                        resolved = target;
                        stack.pop();
                        continue;
                    }
                    if let Some(link) = self.try_suffix_link(node_idx) {
                        if let Some(target) = self.try_goto(link, code) {
                            self.store_goto(node_idx, code, target);
                            resolved = target;
                            stack.pop();
                        } else {
                            stack.push(Task::Goto(link, code));
                        }
                    } else {
                        stack.push(Task::Link(node_idx));
                    }
                }
            }
        }
        resolved
    }

    /// Returns the nearest terminal node strictly along the suffix-link chain,
    /// or the root if there is none.
    pub(crate) fn output_link_idx(&self, node_idx: u32) -> u32 {
        let cached = self.nodes[node_idx as usize].output_link.get();
        if cached != INVALID_IDX {
            return cached;
        }
        let mut path = vec![];
        let mut cur_idx = node_idx;
        let found = loop {
            let output = self.nodes[cur_idx as usize].output_link.get();
            if output != INVALID_IDX {
                break output;
            }
            path.push(cur_idx);
            let link = self.suffix_link_idx(cur_idx);
            if self.nodes[link as usize].is_terminal() {
                break link;
            }
            cur_idx = link;
        };
        for idx in path {
            self.nodes[idx as usize].output_link.set(found);
        }
        found
    }
}

impl Transition for Automaton {
    /// Returns the state reached from `state` by consuming `b`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazyac::{Automaton, Transition};
    ///
    /// let pma = Automaton::from_patterns(["abcd", "bcde"]).unwrap();
    ///
    /// let mut state = pma.root_state();
    /// for &b in b"abcde" {
    ///     state = pma.step_state(b, state);
    /// }
    /// assert_eq!(state.value(), Some(1));
    /// assert_eq!(state.depth(), 4);
    /// ```
    #[inline(always)]
    fn step_state(&self, b: u8, state: State) -> State {
        if let Some(code) = self.mapper.get(b) {
            self.state(self.goto_idx(state.node_idx(), code))
        } else {
            State::ROOT
        }
    }

    #[inline(always)]
    fn suffix_link(&self, state: State) -> State {
        self.state(self.suffix_link_idx(state.node_idx()))
    }

    #[inline(always)]
    fn next_output(&self, state: State) -> Option<State> {
        let output_idx = self.output_link_idx(state.node_idx());
        if output_idx == ROOT_IDX {
            None
        } else {
            Some(self.state(output_idx))
        }
    }
}

impl Statistics for Automaton {
    fn heap_bytes(&self) -> usize {
        self.nodes.len() * core::mem::size_of::<Node>()
            + self.trie_edges.len() * core::mem::size_of::<u32>()
            + self.goto_edges.borrow().len() * core::mem::size_of::<u32>()
    }

    fn num_elems(&self) -> usize {
        self.nodes.len()
    }

    fn num_resolved(&self) -> usize {
        self.goto_edges
            .borrow()
            .iter()
            .filter(|&&target| target != INVALID_IDX)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use alloc::vec::Vec;

    use crate::Match;

    fn matches(pma: &Automaton, text: &str) -> Vec<(usize, u32)> {
        pma.find_iter(text).map(|m| (m.end(), m.value())).collect()
    }

    #[test]
    fn test_exact_match() {
        let patterns = vec!["abcd", "bcde", "cdef"];
        let pma = Automaton::from_patterns(&patterns).unwrap();
        for (i, pattern) in patterns.iter().enumerate() {
            assert!(pma.has_exact_match(pattern));
            assert_eq!(pma.exact_match(pattern), Some(u32::try_from(i).unwrap()));
        }
        for key in [
            "aabcd", "abcdd", "abcda", "abc", "bcd", "cde", "def", "abcdA", "bcdeB", "cdefC",
            "Aabcd", "Bbcde", "Ccdef", "", "a",
        ] {
            assert!(!pma.has_exact_match(key), "{}", key);
        }
    }

    #[test]
    fn test_has_prefix() {
        let pma = Automaton::from_patterns(["abcd", "bcde", "cdef"]).unwrap();
        for key in ["abc", "bcd", "cde", "a", "cdef", ""] {
            assert!(pma.has_prefix(key), "{}", key);
        }
        for key in ["abcdd", "bd", "def", "Z", "abZ"] {
            assert!(!pma.has_prefix(key), "{}", key);
        }
    }

    #[test]
    fn test_prefix_rejects_fallback() {
        // "abce" reaches "ce" through a suffix link, which is not a trie descent.
        let pma = Automaton::from_patterns(["abcd", "ce"]).unwrap();
        assert!(!pma.has_prefix("abce"));
        assert!(!pma.has_exact_match("abce"));
        let mut state = pma.root_state();
        for &b in b"abce" {
            state = pma.step_state(b, state);
        }
        assert_eq!(state.value(), Some(1));
    }

    #[test]
    fn test_scan_for_matches() {
        let pma = Automaton::from_patterns(["abcd", "bcde", "cdef"]).unwrap();
        assert_eq!(matches(&pma, "ZZZZZZZZZZZZZZZZZZZZZabcd"), vec![(25, 0)]);
        assert_eq!(matches(&pma, "bcdeXXXXXXXXXXXXXXXXXX"), vec![(4, 1)]);
        assert_eq!(matches(&pma, "ZZZZZZcdefXXXXXXXX"), vec![(10, 2)]);
        assert_eq!(matches(&pma, "ZZZZZZbcdefXXXXXXXX"), vec![(10, 1), (11, 2)]);
        assert_eq!(matches(&pma, "ZZZZZZabcdefXXXXXXXX"), vec![(10, 0), (11, 1), (12, 2)]);
        assert_eq!(
            pma.scan_for_matches("ZZcdefXX"),
            vec![Match {
                start: 2,
                end: 6,
                value: 2
            }]
        );
        assert!(pma.scan_for_matches("").is_empty());
    }

    #[test]
    fn test_scan_current_node_only() {
        let pma = Automaton::from_patterns(["cdef", "ef"]).unwrap();
        assert_eq!(matches(&pma, "cdef"), vec![(4, 0)]);
        assert_eq!(matches(&pma, "xef"), vec![(3, 1)]);

        let overlapping: Vec<_> = pma
            .find_overlapping_iter("cdef")
            .map(|m| (m.start(), m.end(), m.value()))
            .collect();
        assert_eq!(overlapping, vec![(0, 4, 0), (2, 4, 1)]);
    }

    #[test]
    fn test_find_overlapping() {
        let pma = Automaton::from_patterns(["he", "she", "his", "hers"]).unwrap();
        let found: Vec<_> = pma
            .find_overlapping_iter("ushers")
            .map(|m| (m.start(), m.end(), m.value()))
            .collect();
        assert_eq!(found, vec![(1, 4, 1), (2, 4, 0), (2, 6, 3)]);
    }

    #[test]
    fn test_suffix_link() {
        let pma = Automaton::from_patterns(["abcd", "bcde", "cdef"]).unwrap();
        let mut state = pma.root_state();
        assert_eq!(pma.suffix_link(state), pma.root_state());
        for &b in b"abc" {
            state = pma.step_state(b, state);
        }
        // "abc" -> "bc"
        let link = pma.suffix_link(state);
        assert_eq!(link.depth(), 2);
        assert!(!link.is_terminal());
        // "bc" -> "c"
        let link = pma.suffix_link(link);
        assert_eq!(link.depth(), 1);
        assert_eq!(pma.suffix_link(link), pma.root_state());
    }

    #[test]
    fn test_unknown_byte_returns_to_root() {
        let pma = Automaton::from_patterns(["abcd"]).unwrap();
        let state = pma.state_from_byte(b'a');
        assert!(!state.is_root());
        assert!(pma.step_state(b'Z', state).is_root());
        assert!(pma.state_from_byte(b'Z').is_root());
        assert!(pma.state_from_byte(b'b').is_root());
        assert_eq!(pma.num_resolved(), 2);
    }

    #[test]
    fn test_lazy_rows() {
        let pma = Automaton::from_patterns(["abcd", "bcde", "cdef"]).unwrap();
        assert_eq!(pma.goto_edges.borrow().len(), 0);
        pma.state_from_byte(b'a');
        assert_eq!(pma.goto_edges.borrow().len(), pma.alphabet_size());
        assert_eq!(pma.num_resolved(), 1);
        pma.resolve_all();
        assert_eq!(
            pma.goto_edges.borrow().len(),
            pma.num_elems() * pma.alphabet_size()
        );
        assert_eq!(pma.num_resolved(), pma.num_elems() * pma.alphabet_size());
    }

    #[test]
    fn test_goto_rows_in_visit_order() {
        let pma = Automaton::from_patterns(["abcd", "bcde", "cdef"]).unwrap();
        let width = pma.alphabet_size();

        let a = pma.state_from_byte(b'a');
        let ab = pma.step_state(b'b', a);
        assert_eq!(pma.goto_edges.borrow().len(), 2 * width);
        assert_eq!(pma.nodes[0].goto_offset.get(), 0);
        assert_eq!(pma.nodes[a.node_idx() as usize].goto_offset.get(), width as u32);

        // Fallback from "abf" allocates rows for "ab" and its suffix link "b".
        let state = pma.step_state(b'f', ab);
        assert!(state.is_root());
        assert_eq!(pma.goto_edges.borrow().len(), 4 * width);
        assert_eq!(pma.step_state(b'f', ab), state);
        assert_eq!(pma.goto_edges.borrow().len(), 4 * width);
    }

    #[test]
    fn test_goto_depth_invariant() {
        let pma = Automaton::from_patterns(["abab", "babb", "bba", "a"]).unwrap();
        pma.resolve_all();
        for node_idx in 0..pma.num_nodes() {
            let depth = pma.nodes[node_idx as usize].depth;
            for code in 0..pma.mapper.alphabet_size() {
                let target = pma.goto_idx(node_idx, code);
                let target_depth = pma.nodes[target as usize].depth;
                if pma.trie_child(node_idx, code).is_some() {
                    assert_eq!(target_depth, depth + 1);
                } else {
                    assert!(target_depth <= depth);
                }
            }
            let link = pma.suffix_link_idx(node_idx);
            if node_idx != ROOT_IDX {
                assert!(pma.nodes[link as usize].depth < depth);
            }
        }
    }

    #[test]
    fn test_long_pattern() {
        let long: Vec<u8> = b"ab".iter().copied().cycle().take(200_000).collect();
        let pma = Automaton::from_patterns([&long[..], &b"bab"[..]]).unwrap();
        assert!(pma.has_exact_match(&long));
        let deep = pma.descend(&long).unwrap();
        let link = pma.suffix_link(deep);
        assert_eq!(link.depth(), long.len() - 2);
    }

    #[test]
    fn test_duplicates() {
        let pma = Automaton::from_patterns(["abc", "bc", "abc"]).unwrap();
        assert_eq!(pma.exact_match("abc"), Some(2));
        assert_eq!(pma.exact_match("bc"), Some(1));
    }

    #[test]
    fn test_empty_dictionary() {
        let patterns: [&str; 0] = [];
        let pma = Automaton::from_patterns(patterns).unwrap();
        assert_eq!(pma.alphabet_size(), 0);
        assert!(pma.has_prefix(""));
        assert!(!pma.has_prefix("a"));
        assert!(!pma.has_exact_match(""));
        assert!(pma.scan_for_matches("abc").is_empty());
    }

    #[test]
    fn test_determinism() {
        let patterns = ["abcd", "bcde", "cdef", "de", "f"];
        let pma1 = Automaton::from_patterns(patterns).unwrap();
        let pma2 = Automaton::from_patterns(patterns).unwrap();
        pma2.resolve_all();
        for text in ["abcdefg", "ZZdefZZ", "fffff", "bcdcdef"] {
            assert_eq!(pma1.scan_for_matches(text), pma2.scan_for_matches(text));
            let o1: Vec<_> = pma1.find_overlapping_iter(text).collect();
            let o2: Vec<_> = pma2.find_overlapping_iter(text).collect();
            assert_eq!(o1, o2);
        }
    }
}
