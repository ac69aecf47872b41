//! Builder of automata.
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::errors::{LazyAcError, Result};
use crate::mapper::CodeMapper;
use crate::{Automaton, FrozenAutomaton, Node};
use crate::{INVALID_IDX, MAX_VALUE, ROOT_IDX};

/// Builder of [`Automaton`] and [`FrozenAutomaton`].
///
/// # Examples
///
/// ```
/// use lazyac::{Builder, Statistics, Transition};
///
/// let pma = Builder::new()
///     .resolve_eagerly()
///     .build_from_patterns(["abcd", "bcde", "cdef"])
///     .unwrap()
///     .release_automaton();
///
/// assert_eq!(pma.num_resolved(), pma.num_elems() * pma.alphabet_size());
/// assert!(pma.has_prefix("bcd"));
/// ```
#[derive(Default)]
pub struct Builder {
    mapper: CodeMapper,
    nodes: Vec<Node>,
    trie_edges: Vec<u32>,
    eager: bool,
}

impl Builder {
    /// Creates a new [`Builder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves every transition before the automaton is released.
    #[allow(clippy::missing_const_for_fn)]
    pub fn resolve_eagerly(mut self) -> Self {
        self.eager = true;
        self
    }

    /// Builds the trie from input patterns, associating the value `i` with `patterns[i]`.
    ///
    /// # Errors
    ///
    /// See [`Builder::build_from_records`].
    pub fn build_from_patterns<I, P>(self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        self.build_from_records(
            patterns
                .into_iter()
                .enumerate()
                .map(|(i, p)| (p, u32::try_from(i).unwrap_or(INVALID_IDX))),
        )
    }

    /// Builds the trie from pairs of a pattern and a value.
    ///
    /// # Errors
    ///
    /// [`LazyAcError`] will be returned when
    ///
    /// - `records` contains empty patterns,
    /// - `records` contains values greater than [`MAX_VALUE`], or
    /// - the number of nodes times the alphabet size exceeds `u32` offsets.
    pub fn build_from_records<I, P>(mut self, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, u32)>,
        P: AsRef<[u8]>,
    {
        let records: Vec<(P, u32)> = records.into_iter().collect();

        for (pattern, value) in &records {
            if pattern.as_ref().is_empty() {
                return Err(LazyAcError::input(
                    "records must not contain an empty pattern.",
                ));
            }
            if MAX_VALUE < *value {
                return Err(LazyAcError::scale("input value", MAX_VALUE));
            }
        }

        // Codes must be fixed before any row is allocated because they define the row width.
        self.mapper = CodeMapper::new(records.iter().map(|(p, _)| p));

        self.nodes.clear();
        self.nodes.push(Node::root());
        self.trie_edges.clear();

        for (pattern, value) in &records {
            self.insert(pattern.as_ref(), *value)?;
        }

        let num_cells = self.nodes.len() as u64 * u64::from(self.mapper.alphabet_size());
        if u64::from(MAX_VALUE) < num_cells {
            return Err(LazyAcError::scale(
                "num_nodes * alphabet_size",
                MAX_VALUE,
            ));
        }

        Ok(self)
    }

    /// Releases the lazily resolved [`Automaton`].
    pub fn release_automaton(self) -> Automaton {
        let Builder {
            mapper,
            mut nodes,
            trie_edges,
            eager,
        } = self;
        if nodes.is_empty() {
            nodes.push(Node::root());
        }
        let pma = Automaton {
            mapper,
            nodes,
            trie_edges,
            goto_edges: RefCell::new(vec![]),
        };
        if eager {
            pma.resolve_all();
        }
        pma
    }

    /// Releases the fully resolved [`FrozenAutomaton`].
    pub fn release_frozen(self) -> FrozenAutomaton {
        self.release_automaton().freeze()
    }

    fn insert(&mut self, pattern: &[u8], value: u32) -> Result<()> {
        let mut node_idx = ROOT_IDX;
        for &b in pattern {
            // Every byte was registered in the pre-pass.
            let code = self.mapper.get(b).ok_or(LazyAcError::input(
                "pattern bytes must be registered before insertion.",
            ))?;
            node_idx = if let Some(child_idx) = self.get_child_idx(node_idx, code) {
                child_idx
            } else {
                self.add_child(node_idx, code)?
            };
        }
        self.nodes[node_idx as usize].value = value;
        Ok(())
    }

    #[inline(always)]
    fn get_child_idx(&self, node_idx: u32, code: u32) -> Option<u32> {
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

    fn add_child(&mut self, node_idx: u32, code: u32) -> Result<u32> {
        let child_idx = self.nodes.len() as u32;
        if MAX_VALUE < child_idx {
            return Err(LazyAcError::scale("num_nodes", MAX_VALUE));
        }

        let alphabet_size = self.mapper.alphabet_size() as usize;
        let mut offset = self.nodes[node_idx as usize].trie_offset;
        if offset == INVALID_IDX {
            if MAX_VALUE as usize - alphabet_size < self.trie_edges.len() {
                return Err(LazyAcError::scale("num_trie_edges", MAX_VALUE));
            }
            offset = self.trie_edges.len() as u32;
            self.trie_edges
                .resize(self.trie_edges.len() + alphabet_size, INVALID_IDX);
            self.nodes[node_idx as usize].trie_offset = offset;
        }
        self.trie_edges[(offset + code) as usize] = child_idx;

        let depth = self.nodes[node_idx as usize].depth + 1;
        self.nodes.push(Node::child(node_idx, code, depth));
        Ok(child_idx)
    }
}
