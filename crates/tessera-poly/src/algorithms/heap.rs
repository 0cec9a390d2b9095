//! Max-heap of packed exponents with chained entries.
//!
//! Each heap entry holds one exponent and the head of a chain of nodes
//! that all produce that exponent. Nodes live in a caller-owned arena
//! indexed by `u32`; a node is either in exactly one chain or idle.

use std::cmp::Ordering;

use crate::monomial::{ExpLayout, Packed};

/// A node of a heap chain.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChainNode {
    /// Column index into the second operand.
    pub j: u32,
    /// Next node with the same exponent.
    pub next: Option<u32>,
}

#[derive(Debug)]
struct HeapEntry {
    exp: Packed,
    head: u32,
}

/// A binary max-heap keyed by packed exponents under a layout's ordering.
#[derive(Debug)]
pub struct ChainHeap<'a> {
    layout: &'a ExpLayout,
    entries: Vec<HeapEntry>,
}

impl<'a> ChainHeap<'a> {
    /// Creates an empty heap.
    #[must_use]
    pub fn new(layout: &'a ExpLayout, capacity: usize) -> Self {
        Self {
            layout,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Number of distinct entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the heap is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The largest exponent.
    #[must_use]
    pub fn peek(&self) -> Option<&[u64]> {
        self.entries.first().map(|e| e.exp.as_slice())
    }

    /// Inserts `node` under `exp`.
    ///
    /// If an entry with the same exponent is met on the way up, the node is
    /// chained onto it instead of taking a new slot.
    pub fn push(&mut self, exp: Packed, node: u32, nodes: &mut [ChainNode]) {
        let mut idx = self.entries.len();
        while idx > 0 {
            let parent = (idx - 1) / 2;
            match self.layout.compare(&exp, &self.entries[parent].exp) {
                Ordering::Equal => {
                    nodes[node as usize].next = Some(self.entries[parent].head);
                    self.entries[parent].head = node;
                    return;
                }
                Ordering::Greater => idx = parent,
                Ordering::Less => break,
            }
        }

        nodes[node as usize].next = None;
        let mut pos = self.entries.len();
        self.entries.push(HeapEntry { exp, head: node });
        while pos > idx {
            let parent = (pos - 1) / 2;
            self.entries.swap(pos, parent);
            pos = parent;
        }
    }

    /// Removes the largest entry, returning its exponent and chain head.
    pub fn pop(&mut self) -> Option<(Packed, u32)> {
        let last = self.entries.pop()?;
        if self.entries.is_empty() {
            return Some((last.exp, last.head));
        }
        let top = std::mem::replace(&mut self.entries[0], last);
        self.sift_down(0);
        Some((top.exp, top.head))
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * idx + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len
                && self.layout.compare(&self.entries[right].exp, &self.entries[left].exp) == Ordering::Greater
            {
                right
            } else {
                left
            };
            if self.layout.compare(&self.entries[child].exp, &self.entries[idx].exp) != Ordering::Greater {
                break;
            }
            self.entries.swap(idx, child);
            idx = child;
        }
    }

    /// Collects the chain at `head`, just popped under `exp`, together with
    /// every remaining entry equal to `exp`.
    pub fn drain_equal(&mut self, exp: &[u64], head: u32, nodes: &[ChainNode], out: &mut Vec<u32>) {
        collect_chain(head, nodes, out);
        self.drain_matching(exp, nodes, out);
    }

    /// Pops every entry equal to `exp` and appends their chain nodes.
    pub fn drain_matching(&mut self, exp: &[u64], nodes: &[ChainNode], out: &mut Vec<u32>) {
        while self.peek().is_some_and(|top| top == exp) {
            if let Some((_, head)) = self.pop() {
                collect_chain(head, nodes, out);
            }
        }
    }
}

fn collect_chain(head: u32, nodes: &[ChainNode], out: &mut Vec<u32>) {
    let mut cur = Some(head);
    while let Some(n) = cur {
        out.push(n);
        cur = nodes[n as usize].next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::MonomialOrder;

    #[test]
    fn test_pops_in_order_and_chains() {
        let layout = ExpLayout::new(2, MonomialOrder::Lex, 8);
        let mut nodes = vec![ChainNode::default(); 6];
        let mut heap = ChainHeap::new(&layout, 6);
        let exps = [[1, 0], [3, 2], [1, 0], [0, 5], [3, 2], [2, 2]];
        for (n, e) in exps.iter().enumerate() {
            heap.push(layout.pack(e).unwrap(), n as u32, &mut nodes);
        }
        assert!(heap.len() <= 5);

        let mut seen = Vec::new();
        let mut chain = Vec::new();
        while let Some((exp, head)) = heap.pop() {
            chain.clear();
            heap.drain_equal(&exp, head, &nodes, &mut chain);
            chain.sort_unstable();
            seen.push((layout.unpack(&exp).to_vec(), chain.clone()));
        }
        assert_eq!(
            seen,
            vec![
                (vec![3, 2], vec![1, 4]),
                (vec![2, 2], vec![5]),
                (vec![1, 0], vec![0, 2]),
                (vec![0, 5], vec![3]),
            ]
        );
    }
}
