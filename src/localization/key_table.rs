//! The key table (`Cmn.dat`): a prefix-compressed trie mapping variable
//! names such as `AircraftShort_Name_a10a` to string ids.
//!
//! Each node stores the fragment it contributes relative to its parent.
//! Siblings are kept in ordinal order and never share a leading character,
//! so at most one sibling can continue any given key.
//!
//! # Payload layout
//!
//! ```text
//! root  := int32 count, count × entry
//! entry := int32 fragment_len, fragment bytes,
//!          int32 string_id (-1 for branch nodes),
//!          int32 child_count, child_count × entry
//! ```
//!
//! Entries are written depth-first in pre-order; the root itself has no entry.

use std::cmp::Ordering;
use std::path::Path;

use log::{debug, info, trace, warn};

use super::codec::crypto;
use super::format::binary::{BinaryReader, BinaryWriter};
use super::format::container;
use super::types::error::{LocalizationError, Result};
use super::types::models::{IdRemap, WriteOptions, BRANCH_ID};

/// Index of a node inside its [`KeyTable`]. Only valid for the table that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

/// A single trie node.
#[derive(Debug, Clone)]
pub struct TrieNode {
    fragment: String,
    key: String,
    string_id: i32,
    children: Vec<NodeHandle>,
    parent: Option<NodeHandle>,
}

impl TrieNode {
    /// The part of the key this node contributes.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// The full key from the root down to this node.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw stored id, `-1` for branch nodes.
    pub fn string_id(&self) -> i32 {
        self.string_id
    }

    /// The string id, or `None` for a branch node.
    pub fn id(&self) -> Option<i32> {
        (self.string_id != BRANCH_ID).then_some(self.string_id)
    }

    pub fn is_branch(&self) -> bool {
        self.string_id == BRANCH_ID
    }

    /// Children in ordinal order of their fragments.
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }
}

/// Key → string id dictionary backing every language's string list.
///
/// Nodes live in an arena owned by the table; children and parents refer to
/// each other through [`NodeHandle`]s. Nodes are never removed.
#[derive(Debug, Clone, Default)]
pub struct KeyTable {
    nodes: Vec<TrieNode>,
    roots: Vec<NodeHandle>,
    /// Highest id handed out or seen on disk. The next insert gets `watermark + 1`.
    watermark: i32,
}

impl KeyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a `Cmn.dat` container: keystream (seeded by the file length), zlib, trie.
    pub fn from_container(data: &[u8]) -> Result<Self> {
        let seed = crypto::key_table_seed(data.len());
        let payload = container::unseal(data.to_vec(), seed)?;
        Self::from_payload(&payload)
    }

    /// Encodes the table as a `Cmn.dat` container.
    pub fn to_container(&self, options: &WriteOptions) -> Result<Vec<u8>> {
        let payload = self.to_payload()?;
        container::seal(&payload, options, crypto::key_table_seed)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let data = container::read_file(path.as_ref())?;
        Self::from_container(&data)
    }

    pub fn write(&self, path: impl AsRef<Path>, options: &WriteOptions) -> Result<()> {
        let data = self.to_container(options)?;
        container::write_file(path.as_ref(), &data, options)
    }

    /// Builds a table from a decompressed payload.
    ///
    /// The watermark ends up at the highest id found, so later inserts never
    /// collide with ids already on disk. Siblings are attached in ordinal order;
    /// a repeated sibling fragment is folded into the first one, and siblings
    /// sharing a leading run reject the whole table.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(payload);
        let mut table = Self::new();

        let root_count = reader.read_len("root entry count")?;
        // (parent, children still to read)
        let mut pending: Vec<(Option<NodeHandle>, usize)> = vec![(None, root_count)];
        while let Some((parent, remaining)) = pending.last_mut() {
            if *remaining == 0 {
                pending.pop();
                continue;
            }
            *remaining -= 1;
            let parent = *parent;

            let fragment_len = reader.read_len("fragment length")?;
            let fragment = reader.read_string(fragment_len, "fragment")?;
            let string_id = reader.read_i32("string id")?;
            let child_count = reader.read_len("child count")?;

            if string_id < BRANCH_ID {
                return Err(LocalizationError::MalformedContainer(format!(
                    "invalid string id {} for fragment {:?} at offset {}",
                    string_id,
                    fragment,
                    reader.position()
                )));
            }
            if fragment.is_empty() {
                warn!("Empty fragment under {:?} (id {})", table.prefix_key(parent), string_id);
            }
            table.watermark = table.watermark.max(string_id);

            let node = table.attach_loaded(parent, fragment, string_id)?;
            pending.push((Some(node), child_count));
        }

        if !reader.is_empty() {
            warn!("Ignoring {} trailing bytes after the key table", reader.remaining());
        }
        info!(
            "Key table loaded: {} nodes, {} keys, watermark {}",
            table.nodes.len(),
            table.len(),
            table.watermark
        );
        Ok(table)
    }

    /// Serializes the trie, depth-first pre-order.
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        let mut writer = BinaryWriter::new();
        writer.write_len(self.roots.len())?;

        let mut stack: Vec<NodeHandle> = self.roots.iter().rev().copied().collect();
        while let Some(handle) = stack.pop() {
            let node = &self.nodes[handle.0];
            writer.write_len(node.fragment.len())?;
            writer.write_str(&node.fragment);
            writer.write_i32(node.string_id);
            writer.write_len(node.children.len())?;
            stack.extend(node.children.iter().rev());
        }

        debug!("Key table serialized: {} nodes, {} bytes", self.nodes.len(), writer.len());
        Ok(writer.into_inner())
    }

    /// Returns the string id of `key`, or `None` when the key is absent or
    /// ends on a branch node.
    pub fn lookup(&self, key: &str) -> Option<i32> {
        self.find(key).and_then(|handle| self.nodes[handle.0].id())
    }

    /// Returns the node whose full key is exactly `key`, branch nodes included.
    pub fn find(&self, key: &str) -> Option<NodeHandle> {
        match self.descend(key) {
            (node, "") => node,
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Adds `key`, returning `(inserted, id)`.
    ///
    /// An existing key is left alone and reported as `(false, existing_id)`.
    /// A key ending on a branch node gives that node the next id. Otherwise
    /// a new leaf is created, splitting a sibling when the two share a
    /// leading run. The empty key cannot be stored and yields `(false, -1)`,
    /// as does any new key once the watermark has reached `i32::MAX`.
    pub fn insert(&mut self, key: &str) -> (bool, i32) {
        let (parent, rest) = self.descend(key);

        if rest.is_empty() {
            return match parent {
                None => {
                    warn!("Ignoring insert of the empty key");
                    (false, BRANCH_ID)
                }
                Some(handle) if self.nodes[handle.0].is_branch() => {
                    let Some(id) = self.next_id(key) else {
                        return (false, BRANCH_ID);
                    };
                    self.nodes[handle.0].string_id = id;
                    debug!("Branch {:?} now carries id {}", key, id);
                    (true, id)
                }
                Some(handle) => (false, self.nodes[handle.0].string_id),
            };
        }

        let shared = self
            .siblings(parent)
            .iter()
            .enumerate()
            .find_map(|(position, &sibling)| {
                let len = common_prefix_len(&self.nodes[sibling.0].fragment, rest);
                (len > 0).then_some((position, sibling, len))
            });

        let Some(id) = self.next_id(key) else {
            return (false, BRANCH_ID);
        };
        match shared {
            Some((position, sibling, shared_len)) => {
                self.split(parent, position, sibling, shared_len, rest, id)
            }
            None => self.insert_leaf(parent, rest, id),
        }
        debug!("Inserted {:?} with id {}", key, id);
        (true, id)
    }

    /// Inserts every keyed entry of `other` (pre-order) and reports the keys
    /// that were new to this table together with their old and new ids.
    pub fn merge_from(&mut self, other: &KeyTable) -> Vec<IdRemap> {
        let mut remaps = Vec::new();
        for (key, source_id) in other.entries() {
            let (inserted, target_id) = self.insert(key);
            if inserted {
                remaps.push(IdRemap {
                    key: key.to_owned(),
                    source_id,
                    target_id,
                });
            }
        }
        info!("Merged {} new keys into the key table", remaps.len());
        remaps
    }

    /// Number of nodes carrying a string id.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|node| !node.is_branch()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of nodes, branch nodes included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The highest id assigned or loaded so far.
    pub fn watermark(&self) -> i32 {
        self.watermark
    }

    /// Top-level nodes in ordinal order.
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    /// # Panics
    /// If `handle` did not come from this table.
    pub fn node(&self, handle: NodeHandle) -> &TrieNode {
        &self.nodes[handle.0]
    }

    /// Rebuilds the full key of `handle` by walking parent links.
    pub fn full_key(&self, handle: NodeHandle) -> String {
        let mut fragments = Vec::new();
        let mut current = Some(handle);
        while let Some(h) = current {
            let node = &self.nodes[h.0];
            fragments.push(node.fragment.as_str());
            current = node.parent;
        }
        fragments.iter().rev().copied().collect()
    }

    /// `(key, id)` for every keyed node, depth-first pre-order.
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            table: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    fn next_id(&mut self, key: &str) -> Option<i32> {
        let Some(id) = self.watermark.checked_add(1) else {
            warn!("No string ids left for {:?}; watermark is {}", key, self.watermark);
            return None;
        };
        self.watermark = id;
        Some(id)
    }

    fn siblings(&self, parent: Option<NodeHandle>) -> &[NodeHandle] {
        match parent {
            Some(handle) => &self.nodes[handle.0].children,
            None => &self.roots,
        }
    }

    fn siblings_mut(&mut self, parent: Option<NodeHandle>) -> &mut Vec<NodeHandle> {
        match parent {
            Some(handle) => &mut self.nodes[handle.0].children,
            None => &mut self.roots,
        }
    }

    fn prefix_key(&self, parent: Option<NodeHandle>) -> &str {
        parent.map_or("", |handle| self.nodes[handle.0].key.as_str())
    }

    fn alloc(&mut self, node: TrieNode) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len());
        self.nodes.push(node);
        handle
    }

    fn new_node(&self, parent: Option<NodeHandle>, fragment: &str, string_id: i32) -> TrieNode {
        TrieNode {
            key: format!("{}{}", self.prefix_key(parent), fragment),
            fragment: fragment.to_owned(),
            string_id,
            children: Vec::new(),
            parent,
        }
    }

    /// Walks down through children whose fragment is a leading part of the
    /// remaining key. Returns the last node reached and the unconsumed suffix.
    fn descend<'k>(&self, key: &'k str) -> (Option<NodeHandle>, &'k str) {
        let mut parent = None;
        let mut rest = key;
        loop {
            let next = self.siblings(parent).iter().copied().find(|&handle| {
                let fragment = self.nodes[handle.0].fragment.as_str();
                !fragment.is_empty() && rest.starts_with(fragment)
            });
            let Some(child) = next else { break };
            rest = &rest[self.nodes[child.0].fragment.len()..];
            parent = Some(child);
            trace!("Descended to {:?}, {:?} left", self.nodes[child.0].key, rest);
        }
        (parent, rest)
    }

    /// Replaces `sibling` with a branch holding the shared leading run, the
    /// demoted sibling and (unless the key ends at the branch) a new leaf.
    fn split(
        &mut self,
        parent: Option<NodeHandle>,
        position: usize,
        sibling: NodeHandle,
        shared_len: usize,
        rest: &str,
        id: i32,
    ) {
        let (shared, tail) = rest.split_at(shared_len);
        let branch_id = if tail.is_empty() { id } else { BRANCH_ID };
        let branch = self.new_node(parent, shared, branch_id);
        let branch = self.alloc(branch);

        let demoted = &mut self.nodes[sibling.0];
        demoted.fragment.drain(..shared_len);
        demoted.parent = Some(branch);
        trace!(
            "Split {:?}: branch {:?}, demoted {:?}",
            demoted.key,
            shared,
            demoted.fragment
        );

        let mut children = vec![sibling];
        if !tail.is_empty() {
            let leaf = self.new_node(Some(branch), tail, id);
            let leaf = self.alloc(leaf);
            match tail.cmp(self.nodes[sibling.0].fragment.as_str()) {
                Ordering::Less => children.insert(0, leaf),
                _ => children.push(leaf),
            }
        }
        self.nodes[branch.0].children = children;
        self.siblings_mut(parent)[position] = branch;
    }

    fn insert_leaf(&mut self, parent: Option<NodeHandle>, fragment: &str, id: i32) {
        let leaf = self.new_node(parent, fragment, id);
        let leaf = self.alloc(leaf);
        let siblings = self.siblings(parent);
        let at = siblings
            .iter()
            .position(|&handle| self.nodes[handle.0].fragment.as_str() > fragment)
            .unwrap_or(siblings.len());
        self.siblings_mut(parent).insert(at, leaf);
    }

    /// Attaches a node read from disk at its ordinal position. A duplicate
    /// fragment returns the existing sibling so the children merge into it.
    /// A fragment sharing a leading run with a neighbour is malformed.
    fn attach_loaded(
        &mut self,
        parent: Option<NodeHandle>,
        fragment: String,
        string_id: i32,
    ) -> Result<NodeHandle> {
        let search = self
            .siblings(parent)
            .binary_search_by(|&handle| self.nodes[handle.0].fragment.cmp(&fragment));
        match search {
            Ok(index) => {
                let existing = self.siblings(parent)[index];
                warn!(
                    "Duplicate fragment {:?} under {:?}; keeping id {} and dropping id {}",
                    fragment,
                    self.prefix_key(parent),
                    self.nodes[existing.0].string_id,
                    string_id
                );
                Ok(existing)
            }
            Err(index) => {
                let siblings = self.siblings(parent);
                let neighbours = &siblings[index.saturating_sub(1)..(index + 1).min(siblings.len())];
                if let Some(&clash) = neighbours
                    .iter()
                    .find(|&&handle| common_prefix_len(&self.nodes[handle.0].fragment, &fragment) > 0)
                {
                    return Err(LocalizationError::MalformedContainer(format!(
                        "fragment {:?} overlaps sibling {:?} under {:?}",
                        fragment,
                        self.nodes[clash.0].fragment,
                        self.prefix_key(parent)
                    )));
                }
                let node = self.new_node(parent, &fragment, string_id);
                let handle = self.alloc(node);
                self.siblings_mut(parent).insert(index, handle);
                Ok(handle)
            }
        }
    }
}

/// Iterator returned by [`KeyTable::entries`].
pub struct Entries<'a> {
    table: &'a KeyTable,
    stack: Vec<NodeHandle>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = (&'a str, i32);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(handle) = self.stack.pop() {
            let node = &self.table.nodes[handle.0];
            self.stack.extend(node.children.iter().rev());
            if let Some(id) = node.id() {
                return Some((node.key.as_str(), id));
            }
        }
        None
    }
}

/// Byte length of the longest common leading run of `a` and `b`, on char boundaries.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .take_while(|((_, ca), cb)| ca == cb)
        .last()
        .map_or(0, |((i, c), _)| i + c.len_utf8())
}


#[cfg(test)]
mod proptests;
