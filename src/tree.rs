//! Huffman tree construction and prefix code assignment.
//!
//! Both tree shapes in this module keep their nodes in a flat arena and
//! refer to children by index, so tree depth never turns into call-stack
//! or pointer-chasing depth. The encoder tree is built bottom-up from a
//! frequency table; the decoder tree is grown top-down from parsed
//! (code, symbol) pairs and carries no counts.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::freq::FrequencyTable;

/// Handle of a node within a tree arena.
pub type NodeId = usize;

/// A node of the encoder's Huffman tree.
#[derive(Debug, Clone)]
pub enum Node {
    /// Terminal node holding one distinct input symbol.
    Leaf { symbol: u8, count: u64 },
    /// Merge of exactly two subtrees; its count is the sum of theirs.
    Internal {
        count: u64,
        left: NodeId,
        right: NodeId,
    },
}

impl Node {
    /// Occurrence count carried by the node.
    pub fn count(&self) -> u64 {
        match self {
            Node::Leaf { count, .. } => *count,
            Node::Internal { count, .. } => *count,
        }
    }
}

/// Priority-queue entry. Ordering is reversed so the max-heap behaves as
/// a min-queue, and ties in count fall back to the insertion stamp so
/// equal-count nodes leave the queue in the order they entered it.
#[derive(Debug, PartialEq, Eq)]
struct Pending {
    count: u64,
    stamp: u32,
    node: NodeId,
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.count, other.stamp).cmp(&(self.count, self.stamp))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The encoder's Huffman tree: a strict binary tree over every distinct
/// input symbol, owned as a single arena.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl HuffmanTree {
    /// Builds the tree from a frequency table by repeatedly merging the
    /// two lowest-count nodes.
    ///
    /// Returns `None` for an empty table. Leaves enter the queue in
    /// ascending symbol order and every entry carries an insertion stamp,
    /// so the tree shape is fully deterministic: for the input "ab", 'a'
    /// is extracted first and ends up as the left child (code "0").
    pub fn from_frequencies(freq: &FrequencyTable) -> Option<Self> {
        if freq.is_empty() {
            return None;
        }

        let distinct = freq.distinct();
        let mut nodes = Vec::with_capacity(distinct * 2 - 1);
        let mut queue = BinaryHeap::with_capacity(distinct);
        let mut stamp = 0u32;

        for (symbol, count) in freq.iter() {
            let node = nodes.len();
            nodes.push(Node::Leaf { symbol, count });
            queue.push(Pending { count, stamp, node });
            stamp += 1;
        }

        while queue.len() > 1 {
            let first = queue.pop().unwrap();
            let second = queue.pop().unwrap();
            let count = first.count + second.count;
            let node = nodes.len();
            nodes.push(Node::Internal {
                count,
                left: first.node,
                right: second.node,
            });
            queue.push(Pending { count, stamp, node });
            stamp += 1;
        }

        let root = queue.pop().unwrap().node;
        Some(HuffmanTree { nodes, root })
    }

    /// Handle of the root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Borrows a node by handle.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Assigns a prefix-free code to every leaf.
    ///
    /// Walks the arena with an explicit stack: descending left appends
    /// '0', descending right appends '1'. A root that is itself a leaf
    /// (single distinct symbol) receives the one-bit code "0".
    pub fn assign_codes(&self) -> CodeTable {
        let mut table = CodeTable::new();
        let mut stack = vec![(self.root, String::new())];
        while let Some((id, prefix)) = stack.pop() {
            match &self.nodes[id] {
                Node::Leaf { symbol, .. } => {
                    let code = if prefix.is_empty() {
                        "0".to_string()
                    } else {
                        prefix
                    };
                    table.set(*symbol, code);
                }
                Node::Internal { left, right, .. } => {
                    let mut left_prefix = prefix.clone();
                    left_prefix.push('0');
                    let mut right_prefix = prefix;
                    right_prefix.push('1');
                    stack.push((*right, right_prefix));
                    stack.push((*left, left_prefix));
                }
            }
        }
        table
    }
}

/// Codes for all 256 symbols; symbols absent from the input have none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Option<String>>,
}

impl CodeTable {
    fn new() -> Self {
        CodeTable {
            codes: vec![None; 256],
        }
    }

    fn set(&mut self, symbol: u8, code: String) {
        self.codes[symbol as usize] = Some(code);
    }

    /// Code assigned to a symbol, if any.
    pub fn get(&self, symbol: u8) -> Option<&str> {
        self.codes[symbol as usize].as_deref()
    }

    /// Iterates over `(symbol, code)` pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.as_deref().map(|c| (symbol as u8, c)))
    }
}

/// A node of the decoder tree; children materialize as codes are inserted.
#[derive(Debug, Clone, Default)]
struct DecodeNode {
    symbol: Option<u8>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// Decoder-side tree, rebuilt purely from (code, symbol) pairs.
///
/// Inserting a code walks (and where necessary creates) the path from the
/// root and marks the final node with the symbol. The result decodes the
/// same language as the encoder tree without sharing its representation.
#[derive(Debug, Clone)]
pub struct DecodeTree {
    nodes: Vec<DecodeNode>,
}

impl DecodeTree {
    /// Creates a tree holding only an empty root.
    pub fn new() -> Self {
        DecodeTree {
            nodes: vec![DecodeNode::default()],
        }
    }

    /// Handle of the root node.
    pub fn root(&self) -> NodeId {
        0
    }

    /// Inserts one codeword as a root-to-leaf path, creating interior
    /// nodes on demand. The last insertion to reach a node wins its
    /// symbol. Characters other than '0'/'1' are ignored.
    pub fn insert(&mut self, code: &str, symbol: u8) {
        let mut current = self.root();
        for bit in code.bytes() {
            let next = match bit {
                b'0' => self.nodes[current].left,
                b'1' => self.nodes[current].right,
                _ => continue,
            };
            current = match next {
                Some(id) => id,
                None => {
                    let id = self.nodes.len();
                    self.nodes.push(DecodeNode::default());
                    if bit == b'0' {
                        self.nodes[current].left = Some(id);
                    } else {
                        self.nodes[current].right = Some(id);
                    }
                    id
                }
            };
        }
        self.nodes[current].symbol = Some(symbol);
    }

    /// Child handle one bit away from `from`; `true` steps right.
    pub fn step(&self, from: NodeId, bit: bool) -> Option<NodeId> {
        let node = &self.nodes[from];
        if bit {
            node.right
        } else {
            node.left
        }
    }

    /// Symbol carried by the node, if the node terminates a codeword.
    pub fn symbol(&self, id: NodeId) -> Option<u8> {
        self.nodes[id].symbol
    }
}

impl Default for DecodeTree {
    fn default() -> Self {
        Self::new()
    }
}
