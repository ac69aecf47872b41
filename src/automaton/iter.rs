//! Iterator of patterns in Automaton.
#![cfg(feature = "pattern-iter")]

use alloc::vec::Vec;

use super::Automaton;
use crate::ROOT_IDX;

/// Iterator of patterns stored in [`Automaton`], created by [`Automaton::pattern_iter`].
pub struct PatternIter<'a> {
    pma: &'a Automaton,
    node_idx: u32,
}

impl Iterator for PatternIter<'_> {
    type Item = (Vec<u8>, u32);

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        while self.node_idx < self.pma.num_nodes() {
            let record = self.pma.extract_pattern(self.node_idx);
            self.node_idx += 1;
            if record.is_some() {
                return record;
            }
        }
        None
    }
}

impl Automaton {
    /// Creates an iterator of pairs of a pattern and its value, in the order of
    /// first insertion of their terminal nodes.
    ///
    /// Duplicate patterns are reported once, with the value that won.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazyac::Automaton;
    ///
    /// let pma = Automaton::from_patterns(["ab", "b"]).unwrap();
    /// let patterns: Vec<_> = pma.pattern_iter().collect();
    ///
    /// assert_eq!(patterns, vec![(b"ab".to_vec(), 0), (b"b".to_vec(), 1)]);
    /// ```
    #[inline(always)]
    pub fn pattern_iter(&self) -> PatternIter<'_> {
        PatternIter {
            pma: self,
            node_idx: ROOT_IDX,
        }
    }

    fn extract_pattern(&self, mut node_idx: u32) -> Option<(Vec<u8>, u32)> {
        let value = self.nodes[node_idx as usize].state(node_idx).value()?;
        let mut pattern = Vec::with_capacity(self.nodes[node_idx as usize].depth as usize);
        while node_idx != ROOT_IDX {
            let node = &self.nodes[node_idx as usize];
            pattern.push(self.mapper.get_inv(node.parent_code));
            node_idx = node.parent;
        }
        pattern.reverse();
        Some((pattern, value))
    }
}
