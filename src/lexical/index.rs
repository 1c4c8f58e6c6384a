//! Arena-backed multi-way trie mapping normalized keys to entry references.
//!
//! Nodes live in a single `Vec` and refer to their children by index, so the
//! whole tree is released by dropping (or clearing) one vector. Node 0 is the
//! root. Every node is reachable from exactly one parent; there are no back
//! references.
//!
//! A key is a sequence of Unicode scalar values. Children are kept sorted by
//! unit, which makes traversal order, key iteration order and the persisted
//! layout independent of insertion order.

use std::io::{Read, Write};

use serde::Serialize;

use crate::error::{LexidxError, Result};
use crate::lexical::codec::{self, IndexHeader};
use crate::lexical::entry::EntryRef;

/// Index of a node inside the arena.
pub type NodeId = u32;

/// Id of the root node.
pub const ROOT: NodeId = 0;

/// One discriminating unit of a key plus whatever hangs off it.
#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    pub(crate) unit: char,
    /// `(unit, child)` pairs, strictly ascending by unit.
    pub(crate) children: Vec<(char, NodeId)>,
    /// Non-empty exactly when a complete key ends here.
    pub(crate) values: Vec<EntryRef>,
}

impl Node {
    fn new(unit: char) -> Self {
        Self {
            unit,
            children: Vec::new(),
            values: Vec::new(),
        }
    }

    fn child(&self, unit: char) -> Option<NodeId> {
        self.children
            .binary_search_by_key(&unit, |&(u, _)| u)
            .ok()
            .map(|pos| self.children[pos].1)
    }

    pub(crate) fn is_terminal(&self) -> bool {
        !self.values.is_empty()
    }
}

/// Size figures for a [`LexicalIndex`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Nodes including the root.
    pub nodes: usize,
    /// Distinct keys.
    pub keys: usize,
    /// Entry references across all keys.
    pub entries: usize,
}

/// The lexical index: normalized key → ordered list of [`EntryRef`]s.
#[derive(Debug, Clone)]
pub struct LexicalIndex {
    nodes: Vec<Node>,
    key_count: usize,
    entry_count: usize,
}

impl Default for LexicalIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalIndex {
    /// Create an empty index holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new('\0')],
            key_count: 0,
            entry_count: 0,
        }
    }

    /// Append `entry` to the values stored under `key`, creating nodes as needed.
    ///
    /// Fails only when the arena cannot address another node.
    pub fn insert(&mut self, key: &str, entry: EntryRef) -> Result<()> {
        let mut current = ROOT;
        for unit in key.chars() {
            current = match self.nodes[current as usize].child(unit) {
                Some(child) => child,
                None => self.add_child(current, unit)?,
            };
        }

        let node = &mut self.nodes[current as usize];
        if node.values.is_empty() {
            self.key_count += 1;
        }
        node.values.push(entry);
        self.entry_count += 1;
        Ok(())
    }

    /// Exact-match lookup.
    ///
    /// Returns `None` unless `key` ends on a node that carries values; a
    /// returned slice is never empty.
    pub fn lookup(&self, key: &str) -> Option<&[EntryRef]> {
        let node = &self.nodes[self.find_node(key)? as usize];
        if node.is_terminal() {
            Some(&node.values)
        } else {
            None
        }
    }

    /// Whether `key` was inserted at least once.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Release every node except a fresh root.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.shrink_to_fit();
        self.nodes.push(Node::new('\0'));
        self.key_count = 0;
        self.entry_count = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.key_count == 0
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.key_count
    }

    /// Number of entry references across all keys.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            nodes: self.node_count(),
            keys: self.key_count,
            entries: self.entry_count,
        }
    }

    /// Iterate over `(key, values)` pairs in code point order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            index: self,
            stack: vec![(ROOT, 0)],
            key: Vec::new(),
        }
    }

    /// Write the index in the persisted binary format.
    ///
    /// `profile` identifies the normalization the keys were produced with
    /// (see [`Normalizer::profile`](crate::analysis::normalizer::Normalizer::profile)).
    /// It is stored in the header and handed back by
    /// [`deserialize`](Self::deserialize).
    pub fn serialize<W: Write>(&self, sink: &mut W, profile: u64) -> Result<()> {
        codec::write_index(self, sink, profile)
    }

    /// Replace the contents of this index with a previously serialized one.
    ///
    /// On any format error the index is left empty.
    pub fn deserialize<R: Read>(&mut self, source: &mut R) -> Result<IndexHeader> {
        self.clear();
        let (index, header) = codec::read_index(source)?;
        *self = index;
        Ok(header)
    }

    fn find_node(&self, key: &str) -> Option<NodeId> {
        let mut current = ROOT;
        for unit in key.chars() {
            current = self.nodes[current as usize].child(unit)?;
        }
        Some(current)
    }

    fn add_child(&mut self, parent: NodeId, unit: char) -> Result<NodeId> {
        let id = self.next_id()?;
        let siblings = &mut self.nodes[parent as usize].children;
        let pos = match siblings.binary_search_by_key(&unit, |&(u, _)| u) {
            Ok(pos) => return Ok(siblings[pos].1),
            Err(pos) => pos,
        };
        siblings.insert(pos, (unit, id));
        self.nodes.push(Node::new(unit));
        Ok(id)
    }

    fn next_id(&self) -> Result<NodeId> {
        NodeId::try_from(self.nodes.len())
            .map_err(|_| LexidxError::index_full(format!("{} nodes", self.nodes.len())))
    }

    // ── codec support ────────────────────────────────────────────────

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    /// Attach values to the root; used while decoding.
    pub(crate) fn set_root_values(&mut self, values: Vec<EntryRef>) {
        self.account(&values);
        self.nodes[ROOT as usize].values = values;
    }

    /// Append a child that sorts after every existing child of `parent`.
    pub(crate) fn push_last_child(
        &mut self,
        parent: NodeId,
        unit: char,
        values: Vec<EntryRef>,
    ) -> Result<NodeId> {
        let id = self.next_id()?;
        let siblings = &mut self.nodes[parent as usize].children;
        if let Some(&(last, _)) = siblings.last() {
            if last >= unit {
                return Err(LexidxError::index_format(format!(
                    "child units out of order: {:?} after {:?}",
                    unit, last
                )));
            }
        }
        siblings.push((unit, id));
        self.account(&values);
        self.nodes.push(Node {
            unit,
            children: Vec::new(),
            values,
        });
        Ok(id)
    }

    fn account(&mut self, values: &[EntryRef]) {
        if !values.is_empty() {
            self.key_count += 1;
            self.entry_count += values.len();
        }
    }
}

/// Iterator over the keys of a [`LexicalIndex`]; see [`LexicalIndex::iter`].
pub struct Iter<'a> {
    index: &'a LexicalIndex,
    /// `(node, depth)`; the root has depth 0.
    stack: Vec<(NodeId, usize)>,
    key: Vec<char>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (String, &'a [EntryRef]);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.stack.pop() {
            let node = self.index.node(id);
            if depth > 0 {
                self.key.truncate(depth - 1);
                self.key.push(node.unit);
            }
            for &(_, child) in node.children.iter().rev() {
                self.stack.push((child, depth + 1));
            }
            if node.is_terminal() {
                return Some((self.key.iter().collect(), node.values.as_slice()));
            }
        }
        None
    }
}
