//! A fully resolved automaton that can be shared between threads.
use alloc::vec::Vec;

use crate::errors::Result;
use crate::mapper::CodeMapper;
use crate::{Automaton, Builder, State, Statistics, Transition};
use crate::{INVALID_IDX, ROOT_IDX};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FrozenNode {
    depth: u32,
    value: u32,
    suffix_link: u32,
    output_link: u32,
}

impl FrozenNode {
    #[inline(always)]
    const fn state(&self, node_idx: u32) -> State {
        State::new(node_idx, self.depth, self.value)
    }
}

/// An Aho-Corasick automaton whose goto function is a dense, fully resolved table.
///
/// It costs `num_elems * alphabet_size` table cells up front, but queries are
/// read-only, so [`FrozenAutomaton`] is `Send + Sync`.
pub struct FrozenAutomaton {
    mapper: CodeMapper,
    nodes: Vec<FrozenNode>,
    table: Vec<u32>,
}

impl FrozenAutomaton {
    /// Creates a new [`FrozenAutomaton`] from input patterns.
    ///
    /// The value `i` is associated with `patterns[i]`.
    ///
    /// # Errors
    ///
    /// The same as [`Automaton::from_patterns`].
    ///
    /// # Examples
    ///
    /// ```
    /// use lazyac::{FrozenAutomaton, Statistics, Transition};
    ///
    /// let pma = FrozenAutomaton::from_patterns(["abcd", "bcde", "cdef"]).unwrap();
    ///
    /// assert_eq!(pma.num_resolved(), 13 * 6);
    /// assert_eq!(pma.exact_match("bcde"), Some(1));
    /// ```
    pub fn from_patterns<I, P>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        Ok(Builder::new()
            .build_from_patterns(patterns)?
            .release_frozen())
    }

    /// Creates a new [`FrozenAutomaton`] from input records.
    ///
    /// # Errors
    ///
    /// The same as [`Automaton::from_records`].
    pub fn from_records<I, P>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, u32)>,
        P: AsRef<[u8]>,
    {
        Ok(Builder::new()
            .build_from_records(records)?
            .release_frozen())
    }

    pub(crate) fn from_automaton(pma: Automaton) -> Self {
        pma.resolve_all();

        let alphabet_size = pma.mapper.alphabet_size();
        let mut table = Vec::with_capacity(pma.nodes.len() * alphabet_size as usize);
        let mut nodes = Vec::with_capacity(pma.nodes.len());
        for (node_idx, node) in pma.nodes.iter().enumerate() {
            let node_idx = node_idx as u32;
            for code in 0..alphabet_size {
                table.push(pma.goto_idx(node_idx, code));
            }
            nodes.push(FrozenNode {
                depth: node.depth,
                value: node.value,
                suffix_link: pma.suffix_link_idx(node_idx),
                output_link: pma.output_link_idx(node_idx),
            });
        }
        debug_assert!(table.iter().all(|&target| target != INVALID_IDX));

        Self {
            mapper: pma.mapper,
            nodes,
            table,
        }
    }

    /// Returns the number of distinct bytes in the dictionary.
    #[inline(always)]
    pub const fn alphabet_size(&self) -> usize {
        self.mapper.alphabet_size() as usize
    }

    #[inline(always)]
    fn state(&self, node_idx: u32) -> State {
        self.nodes[node_idx as usize].state(node_idx)
    }
}

impl Transition for FrozenAutomaton {
    #[inline(always)]
    fn step_state(&self, b: u8, state: State) -> State {
        if let Some(code) = self.mapper.get(b) {
            let cell = state.node_idx() as usize * self.alphabet_size() + code as usize;
            self.state(self.table[cell])
        } else {
            State::ROOT
        }
    }

    #[inline(always)]
    fn suffix_link(&self, state: State) -> State {
        self.state(self.nodes[state.node_idx() as usize].suffix_link)
    }

    #[inline(always)]
    fn next_output(&self, state: State) -> Option<State> {
        let output_idx = self.nodes[state.node_idx() as usize].output_link;
        if output_idx == ROOT_IDX {
            None
        } else {
            Some(self.state(output_idx))
        }
    }
}

impl Statistics for FrozenAutomaton {
    fn heap_bytes(&self) -> usize {
        self.nodes.len() * core::mem::size_of::<FrozenNode>()
            + self.table.len() * core::mem::size_of::<u32>()
    }

    fn num_elems(&self) -> usize {
        self.nodes.len()
    }

    fn num_resolved(&self) -> usize {
        self.table.len()
    }
}
