//! Lazyac: a lazy Aho-Corasick automaton for multiple byte patterns
//!
//! Lazyac builds a trie over a fixed dictionary of byte strings and answers
//! exact-match, prefix and scanning queries through the Aho-Corasick goto function.
//! Unlike the classic construction, the goto function and the suffix (failure) links
//! are not computed breadth-first up front. Each transition row is materialized on the
//! first query that needs it and memoized for the rest of the automaton's lifetime.
//!
//! # Data structures
//!
//! Lazyac contains the two automaton implementations:
//!
//! - [`Automaton`] resolves transitions on demand and caches them internally.
//!   It cannot be shared between threads without external synchronization.
//! - [`FrozenAutomaton`] is a fully resolved transition table that is `Sync`.
//!
//! Both implement [`Transition`], which provides the query operations.
//!
//! # Examples
//!
//! ## Looking up an input key
//!
//! ```
//! use lazyac::{Automaton, Transition};
//!
//! let patterns = vec!["abcd", "bcde", "cdef"];
//! let pma = Automaton::from_patterns(&patterns).unwrap();
//!
//! assert!(pma.has_exact_match("abcd"));
//! assert!(!pma.has_exact_match("abc"));
//! assert!(pma.has_prefix("abc"));
//! assert_eq!(pma.exact_match("cdef"), Some(2));
//! ```
//!
//! ## Scanning a text
//!
//! ```
//! use lazyac::{Automaton, Transition};
//!
//! let patterns = vec!["abcd", "bcde", "cdef"];
//! let pma = Automaton::from_patterns(&patterns).unwrap();
//!
//! let matches: Vec<_> = pma
//!     .find_iter("ZZcdefXX")
//!     .map(|m| (m.start(), m.end(), m.value()))
//!     .collect();
//! assert_eq!(matches, vec![(2, 6, 2)]);
//! ```
#![deny(missing_docs)]
#![no_std]

#[cfg(target_pointer_width = "16")]
compile_error!("`target_pointer_width` must be larger than or equal to 32");

#[cfg(not(feature = "alloc"))]
compile_error!("`alloc` feature is currently required to build this crate");

#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod automaton;
pub mod builder;
pub mod errors;
pub mod frozen;
mod mapper;

use alloc::vec::Vec;
use core::cell::Cell;

pub(crate) const INVALID_IDX: u32 = u32::MAX;
pub(crate) const ROOT_IDX: u32 = 0;

/// The maximum value that can be associated with a pattern.
pub const MAX_VALUE: u32 = INVALID_IDX - 1;

pub use automaton::Automaton;
pub use builder::Builder;
pub use frozen::FrozenAutomaton;

/// Opaque automaton state produced by the query operations of [`Transition`].
///
/// A state is only meaningful for the automaton that produced it.
///
/// # Panics
///
/// Passing a state to an automaton other than the one that produced it may panic
/// with an out-of-bounds node index, or silently yield an unrelated state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct State {
    node_idx: u32,
    depth: u32,
    value: u32,
}

impl State {
    pub(crate) const ROOT: Self = Self {
        node_idx: ROOT_IDX,
        depth: 0,
        value: INVALID_IDX,
    };

    #[inline(always)]
    pub(crate) const fn new(node_idx: u32, depth: u32, value: u32) -> Self {
        Self {
            node_idx,
            depth,
            value,
        }
    }

    #[inline(always)]
    pub(crate) const fn node_idx(&self) -> u32 {
        self.node_idx
    }

    /// Checks if the state is the initial one.
    #[inline(always)]
    pub const fn is_root(&self) -> bool {
        self.node_idx == ROOT_IDX
    }

    /// Checks if the state is reached from `prev` along a trie edge,
    /// i.e., its depth is exactly one greater than `prev`'s.
    ///
    /// A transition that falls back through a suffix link never satisfies this.
    #[inline(always)]
    pub const fn is_next_to(&self, prev: &Self) -> bool {
        self.depth == prev.depth + 1
    }

    /// Checks if a pattern ends at the state.
    #[inline(always)]
    pub const fn is_terminal(&self) -> bool {
        self.value != INVALID_IDX
    }

    /// Value of the pattern ending at the state, if any.
    #[inline(always)]
    pub const fn value(&self) -> Option<u32> {
        if self.is_terminal() {
            Some(self.value)
        } else {
            None
        }
    }

    /// Length of the path from the root to the state.
    #[inline(always)]
    pub const fn depth(&self) -> usize {
        self.depth as usize
    }
}

/// Match result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Match {
    start: usize,
    end: usize,
    value: u32,
}

impl Match {
    #[inline(always)]
    pub(crate) const fn from_state(state: State, end: usize) -> Self {
        Self {
            start: end - state.depth(),
            end,
            value: state.value,
        }
    }

    /// Starting position of the match in bytes.
    #[inline(always)]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Ending position of the match in bytes.
    #[inline(always)]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Value associated with the matched pattern.
    #[inline(always)]
    pub const fn value(&self) -> u32 {
        self.value
    }
}

/// Query operations built on the goto function of an automaton.
///
/// Implementors provide the transition itself; exact-match, prefix and scanning
/// queries are derived from it.
pub trait Transition {
    /// Returns the state reached from `state` by consuming `b`.
    ///
    /// A byte that does not occur in the dictionary always leads back to the root.
    fn step_state(&self, b: u8, state: State) -> State;

    /// Returns the state reached by the longest proper suffix of `state`'s path
    /// that is also a path in the trie.
    ///
    /// The suffix link of the root is the root itself.
    fn suffix_link(&self, state: State) -> State;

    /// Returns the nearest terminal state strictly along the suffix-link chain of `state`.
    fn next_output(&self, state: State) -> Option<State>;

    /// Returns the initial state.
    #[inline(always)]
    fn root_state(&self) -> State {
        State::ROOT
    }

    /// Returns the state reached from the root by consuming `b`.
    #[inline(always)]
    fn state_from_byte(&self, b: u8) -> State {
        self.step_state(b, State::ROOT)
    }

    /// Walks down the trie along `key` without falling back through suffix links.
    ///
    /// Returns [`None`] as soon as a step is not a direct trie descent.
    #[inline(always)]
    fn descend<K>(&self, key: K) -> Option<State>
    where
        K: AsRef<[u8]>,
        Self: Sized,
    {
        let mut state = State::ROOT;
        for &b in key.as_ref() {
            let next = self.step_state(b, state);
            if !next.is_next_to(&state) {
                return None;
            }
            state = next;
        }
        Some(state)
    }

    /// Returns the value associated with `key` if it is a pattern in the dictionary.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazyac::{Automaton, Transition};
    ///
    /// let pma = Automaton::from_records(vec![("abcd", 10), ("bcde", 20)]).unwrap();
    ///
    /// assert_eq!(pma.exact_match("bcde"), Some(20));
    /// assert_eq!(pma.exact_match("bcd"), None);
    /// ```
    #[inline(always)]
    fn exact_match<K>(&self, key: K) -> Option<u32>
    where
        K: AsRef<[u8]>,
        Self: Sized,
    {
        self.descend(key).and_then(|state| state.value())
    }

    /// Checks if `key` is a pattern in the dictionary.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazyac::{Automaton, Transition};
    ///
    /// let pma = Automaton::from_patterns(["abcd", "bcde", "cdef"]).unwrap();
    ///
    /// assert!(pma.has_exact_match("abcd"));
    /// assert!(!pma.has_exact_match("abcdd"));
    /// assert!(!pma.has_exact_match("bcd"));
    /// ```
    #[inline(always)]
    fn has_exact_match<K>(&self, key: K) -> bool
    where
        K: AsRef<[u8]>,
        Self: Sized,
    {
        self.exact_match(key).is_some()
    }

    /// Checks if `key` is a path in the trie, i.e., a prefix of some pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazyac::{Automaton, Transition};
    ///
    /// let pma = Automaton::from_patterns(["abcd", "bcde", "cdef"]).unwrap();
    ///
    /// assert!(pma.has_prefix("abc"));
    /// assert!(pma.has_prefix("cdef"));
    /// assert!(!pma.has_prefix("bd"));
    /// ```
    #[inline(always)]
    fn has_prefix<K>(&self, key: K) -> bool
    where
        K: AsRef<[u8]>,
        Self: Sized,
    {
        self.descend(key).is_some()
    }

    /// Returns an iterator of matches ending at terminal states of the scan.
    ///
    /// Only the pattern ending at the current state is reported at each position;
    /// shorter patterns that are suffixes of it are not. Use
    /// [`Transition::find_overlapping_iter`] to report them too.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazyac::{Automaton, Transition};
    ///
    /// let pma = Automaton::from_patterns(["abcd", "bcd"]).unwrap();
    ///
    /// let ends: Vec<_> = pma.find_iter("xabcd").map(|m| (m.end(), m.value())).collect();
    /// assert_eq!(ends, vec![(5, 0)]);
    /// ```
    fn find_iter<P>(&self, haystack: P) -> FindIterator<'_, Self, P>
    where
        P: AsRef<[u8]>,
        Self: Sized,
    {
        FindIterator {
            pma: self,
            haystack,
            pos: 0,
            state: State::ROOT,
        }
    }

    /// Returns an iterator of all occurrences of patterns, including overlapping ones.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazyac::{Automaton, Transition};
    ///
    /// let pma = Automaton::from_patterns(["abcd", "bcd", "cd"]).unwrap();
    ///
    /// let matches: Vec<_> = pma
    ///     .find_overlapping_iter("xabcd")
    ///     .map(|m| (m.start(), m.end(), m.value()))
    ///     .collect();
    /// assert_eq!(matches, vec![(1, 5, 0), (2, 5, 1), (3, 5, 2)]);
    /// ```
    fn find_overlapping_iter<P>(&self, haystack: P) -> FindOverlappingIterator<'_, Self, P>
    where
        P: AsRef<[u8]>,
        Self: Sized,
    {
        FindOverlappingIterator {
            pma: self,
            haystack,
            pos: 0,
            state: State::ROOT,
            pending: None,
        }
    }

    /// Collects the matches of [`Transition::find_iter`].
    #[inline]
    fn scan_for_matches<P>(&self, haystack: P) -> Vec<Match>
    where
        P: AsRef<[u8]>,
        Self: Sized,
    {
        self.find_iter(haystack).collect()
    }
}

/// Iterator created by [`Transition::find_iter`].
pub struct FindIterator<'a, A, P> {
    pma: &'a A,
    haystack: P,
    pos: usize,
    state: State,
}

impl<A, P> Iterator for FindIterator<'_, A, P>
where
    A: Transition,
    P: AsRef<[u8]>,
{
    type Item = Match;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        let haystack = self.haystack.as_ref();
        while self.pos < haystack.len() {
            self.state = self.pma.step_state(haystack[self.pos], self.state);
            self.pos += 1;
            if self.state.is_terminal() {
                return Some(Match::from_state(self.state, self.pos));
            }
        }
        None
    }
}

/// Iterator created by [`Transition::find_overlapping_iter`].
pub struct FindOverlappingIterator<'a, A, P> {
    pma: &'a A,
    haystack: P,
    pos: usize,
    state: State,
    pending: Option<State>,
}

impl<A, P> Iterator for FindOverlappingIterator<'_, A, P>
where
    A: Transition,
    P: AsRef<[u8]>,
{
    type Item = Match;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(out) = self.pending {
                self.pending = self.pma.next_output(out);
                return Some(Match::from_state(out, self.pos));
            }
            let haystack = self.haystack.as_ref();
            if self.pos >= haystack.len() {
                return None;
            }
            self.state = self.pma.step_state(haystack[self.pos], self.state);
            self.pos += 1;
            self.pending = if self.state.is_terminal() {
                Some(self.state)
            } else {
                self.pma.next_output(self.state)
            };
        }
    }
}

/// Trait for statistics of the data structure.
pub trait Statistics {
    /// Returns the total amount of heap used by internal data structures in bytes.
    fn heap_bytes(&self) -> usize;

    /// Returns the number of trie nodes.
    fn num_elems(&self) -> usize;

    /// Returns the number of goto transitions resolved so far.
    fn num_resolved(&self) -> usize;
}

/// Trie node. Fields held in [`Cell`]s are resolved lazily during queries.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) depth: u32,
    pub(crate) parent: u32,
    pub(crate) parent_code: u32,
    pub(crate) value: u32,
    pub(crate) trie_offset: u32,
    pub(crate) goto_offset: Cell<u32>,
    pub(crate) suffix_link: Cell<u32>,
    pub(crate) output_link: Cell<u32>,
}

impl Node {
    pub(crate) const fn root() -> Self {
        Self {
            depth: 0,
            parent: INVALID_IDX,
            parent_code: INVALID_IDX,
            value: INVALID_IDX,
            trie_offset: INVALID_IDX,
            goto_offset: Cell::new(INVALID_IDX),
            suffix_link: Cell::new(ROOT_IDX),
            output_link: Cell::new(ROOT_IDX),
        }
    }

    pub(crate) const fn child(parent: u32, parent_code: u32, depth: u32) -> Self {
        Self {
            depth,
            parent,
            parent_code,
            value: INVALID_IDX,
            trie_offset: INVALID_IDX,
            goto_offset: Cell::new(INVALID_IDX),
            suffix_link: Cell::new(INVALID_IDX),
            output_link: Cell::new(INVALID_IDX),
        }
    }

    #[inline(always)]
    pub(crate) const fn is_terminal(&self) -> bool {
        self.value != INVALID_IDX
    }

    #[inline(always)]
    pub(crate) const fn state(&self, node_idx: u32) -> State {
        State::new(node_idx, self.depth, self.value)
    }
}
