//! Huffman tree construction, code assignment and bit-by-bit decoding.
//!
//! Nodes live in an arena and refer to their children by index. Leaves are
//! allocated first, in frequency-table order, and every merge appends one
//! internal node, so a node's index doubles as its insertion order. The
//! build queue is keyed by `(weight, index)`, which makes equal-weight ties
//! resolve the same way on every run and on both sides of the wire.
//!
//! Bit convention: `0` walks to the left child, `1` to the right child. The
//! first node popped in a merge becomes the left child.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;

use crate::bitbuf::BitCursor;
use crate::error::{CodecError, Result};
use crate::frequency::FrequencyTable;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Leaf(u8),
    /// Unreachable sibling for a single-symbol alphabet.
    Placeholder,
    Internal { left: NodeId, right: NodeId },
}

#[derive(Debug, Clone, Copy)]
struct Node {
    weight: u64,
    kind: NodeKind,
}

/// Root-to-leaf bit path for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Code {
    bits: Vec<bool>,
}

impl Code {
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(&self.bits)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: NodeId,
    codes: Vec<Option<Code>>,
    table: FrequencyTable,
}

impl HuffmanTree {
    /// Builds the tree for `table`.
    ///
    /// A single-symbol table gets a placeholder right sibling so the real
    /// symbol is coded as `0`.
    pub fn build(table: &FrequencyTable) -> Result<Self> {
        if table.is_empty() {
            return Err(CodecError::EmptyInput);
        }

        let mut nodes: Vec<Node> = table
            .entries()
            .iter()
            .map(|&(symbol, count)| Node {
                weight: count as u64,
                kind: NodeKind::Leaf(symbol),
            })
            .collect();

        let root = if nodes.len() == 1 {
            let real = nodes[0];
            nodes.push(Node {
                weight: 0,
                kind: NodeKind::Placeholder,
            });
            nodes.push(Node {
                weight: real.weight,
                kind: NodeKind::Internal { left: 0, right: 1 },
            });
            2
        } else {
            let mut queue: BinaryHeap<Reverse<(u64, NodeId)>> = nodes
                .iter()
                .enumerate()
                .map(|(id, node)| Reverse((node.weight, id)))
                .collect();

            loop {
                let Some(Reverse((left_weight, left))) = queue.pop() else {
                    return Err(CodecError::EmptyInput);
                };
                let Some(Reverse((right_weight, right))) = queue.pop() else {
                    break left;
                };
                let id = nodes.len();
                let weight = left_weight + right_weight;
                nodes.push(Node {
                    weight,
                    kind: NodeKind::Internal { left, right },
                });
                queue.push(Reverse((weight, id)));
            }
        };

        let codes = assign_codes(&nodes, root);
        Ok(Self {
            nodes,
            root,
            codes,
            table: table.clone(),
        })
    }

    /// Code for `symbol`, or `None` when the symbol is not in the tree.
    pub fn code_of(&self, symbol: u8) -> Option<&Code> {
        self.codes[symbol as usize].as_ref()
    }

    /// Walks from the root, one bit per edge, until a leaf is reached.
    pub fn decode(&self, bits: &mut BitCursor<'_>) -> Result<u8> {
        let mut id = self.root;
        loop {
            match self.nodes[id].kind {
                NodeKind::Leaf(symbol) => return Ok(symbol),
                NodeKind::Placeholder => {
                    return Err(CodecError::corrupt("code path leads to no symbol"))
                }
                NodeKind::Internal { left, right } => {
                    id = if bits.read_bit()? { right } else { left };
                }
            }
        }
    }

    /// The table this tree was built from; this is what gets serialized.
    pub fn frequencies(&self) -> &FrequencyTable {
        &self.table
    }

    pub fn root_weight(&self) -> u64 {
        self.nodes[self.root].weight
    }

    /// `(symbol, code length)` pairs in frequency-table order.
    pub fn code_lengths(&self) -> Vec<(u8, usize)> {
        self.table
            .entries()
            .iter()
            .filter_map(|&(symbol, _)| self.code_of(symbol).map(|c| (symbol, c.len())))
            .collect()
    }

    pub fn max_code_len(&self) -> usize {
        self.codes.iter().flatten().map(Code::len).max().unwrap_or(0)
    }
}

fn assign_codes(nodes: &[Node], root: NodeId) -> Vec<Option<Code>> {
    let mut codes: Vec<Option<Code>> = vec![None; 256];
    let mut stack = vec![(root, Vec::new())];
    while let Some((id, path)) = stack.pop() {
        match nodes[id].kind {
            NodeKind::Leaf(symbol) => codes[symbol as usize] = Some(Code::from_bits(path)),
            NodeKind::Placeholder => {}
            NodeKind::Internal { left, right } => {
                let mut right_path = path.clone();
                right_path.push(true);
                let mut left_path = path;
                left_path.push(false);
                stack.push((right, right_path));
                stack.push((left, left_path));
            }
        }
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitbuf::BitBuffer;

    fn code_str(tree: &HuffmanTree, symbol: u8) -> String {
        tree.code_of(symbol).unwrap().to_string()
    }

    #[test]
    fn test_empty_table_rejected() {
        let table = FrequencyTable::build(&[]);
        assert!(matches!(HuffmanTree::build(&table), Err(CodecError::EmptyInput)));
    }

    #[test]
    fn test_aaab_shorter_code_for_frequent_symbol() {
        let table = FrequencyTable::build(&[0x41, 0x41, 0x41, 0x42]);
        let tree = HuffmanTree::build(&table).unwrap();
        let a = tree.code_of(0x41).unwrap();
        let b = tree.code_of(0x42).unwrap();
        assert!(a.len() <= b.len());
        assert_eq!(a.len(), 1);
        assert_eq!(tree.root_weight(), 4);
    }

    #[test]
    fn test_singleton_gets_one_bit_code() {
        let table = FrequencyTable::build(&[0x41; 1000]);
        let tree = HuffmanTree::build(&table).unwrap();
        assert_eq!(code_str(&tree, 0x41), "0");
        assert_eq!(tree.max_code_len(), 1);
    }

    #[test]
    fn test_singleton_placeholder_path_is_corrupt() {
        let table = FrequencyTable::build(b"zz");
        let tree = HuffmanTree::build(&table).unwrap();
        let mut buf = BitBuffer::new();
        buf.append(true);
        let mut cursor = buf.reader();
        assert!(matches!(tree.decode(&mut cursor), Err(CodecError::CorruptStream(_))));
    }

    #[test]
    fn test_equal_weights_follow_insertion_order() {
        let table = FrequencyTable::build(b"abcd");
        let tree = HuffmanTree::build(&table).unwrap();
        assert_eq!(code_str(&tree, b'a'), "00");
        assert_eq!(code_str(&tree, b'b'), "01");
        assert_eq!(code_str(&tree, b'c'), "10");
        assert_eq!(code_str(&tree, b'd'), "11");
    }

    #[test]
    fn test_tie_break_depends_only_on_table_order() {
        let yx = FrequencyTable::from_entries(vec![(b'y', 1), (b'x', 1), (b'z', 2)]).unwrap();
        let tree = HuffmanTree::build(&yx).unwrap();
        assert_eq!(code_str(&tree, b'z'), "0");
        assert_eq!(code_str(&tree, b'y'), "10");
        assert_eq!(code_str(&tree, b'x'), "11");

        let xy = FrequencyTable::from_entries(vec![(b'x', 1), (b'y', 1), (b'z', 2)]).unwrap();
        let tree = HuffmanTree::build(&xy).unwrap();
        assert_eq!(code_str(&tree, b'x'), "10");
        assert_eq!(code_str(&tree, b'y'), "11");
    }

    #[test]
    fn test_rebuild_is_identical() {
        let data = b"mississippi river banks, many many ties";
        let table = FrequencyTable::build(data);
        let first = HuffmanTree::build(&table).unwrap();
        let second = HuffmanTree::build(&table).unwrap();
        for &(symbol, _) in table.entries() {
            assert_eq!(first.code_of(symbol), second.code_of(symbol));
        }
    }

    #[test]
    fn test_codes_are_prefix_free() {
        let data: Vec<u8> = (0..=255u8)
            .flat_map(|b| std::iter::repeat(b).take(1 + (b as usize * 7) % 31))
            .collect();
        let table = FrequencyTable::build(&data);
        let tree = HuffmanTree::build(&table).unwrap();
        let codes: Vec<&Code> = (0..=255u8).map(|s| tree.code_of(s).unwrap()).collect();
        for (i, a) in codes.iter().enumerate() {
            assert!(!a.is_empty());
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!a.is_prefix_of(b), "{} is a prefix of {}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_decode_walks_to_leaf() {
        let table = FrequencyTable::build(b"abcd");
        let tree = HuffmanTree::build(&table).unwrap();
        let mut buf = BitBuffer::new();
        buf.append_code(tree.code_of(b'c').unwrap());
        buf.append_code(tree.code_of(b'a').unwrap());
        let mut cursor = buf.reader();
        assert_eq!(tree.decode(&mut cursor).unwrap(), b'c');
        assert_eq!(tree.decode(&mut cursor).unwrap(), b'a');
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_decode_runs_out_mid_symbol() {
        let table = FrequencyTable::build(b"abcd");
        let tree = HuffmanTree::build(&table).unwrap();
        let mut buf = BitBuffer::new();
        buf.append(true);
        let mut cursor = buf.reader();
        assert!(matches!(tree.decode(&mut cursor), Err(CodecError::CorruptStream(_))));
    }

    #[test]
    fn test_code_lengths_in_table_order() {
        let table = FrequencyTable::build(b"aaab");
        let tree = HuffmanTree::build(&table).unwrap();
        assert_eq!(tree.code_lengths(), vec![(b'a', 1), (b'b', 1)]);
    }
}
