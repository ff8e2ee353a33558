//! Ordered, name-unique node maps.

use std::collections::HashMap;
use std::fmt;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{true_index, NodeCollection};
use crate::error::{Error, Result};
use crate::name::Name;
use crate::node::{describe, same_node, NodeRef};

/// Default capacity of an empty map
pub const DEFAULT_CAPACITY: usize = 8;

/// An insertion-ordered map of nodes keyed by case-insensitive name.
///
/// The name index always maps every key onto its position in `pairs`.
#[derive(Clone)]
pub struct NodeMap {
    index: HashMap<String, usize>,
    pairs: Vec<(Name, NodeRef)>,
}

impl NodeMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty map with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            pairs: Vec::with_capacity(capacity),
        }
    }

    /// Add a node, replacing a same-named entry in place when `overwrite`
    /// is set.
    pub fn add(&mut self, node: NodeRef, overwrite: bool) -> Result<()> {
        let name = node.name().clone();
        match self.index.get(name.key()) {
            Some(&position) if overwrite => {
                self.pairs[position] = (name, node);
            }
            Some(_) => {
                return Err(Error::DuplicateName {
                    name: name.to_string(),
                });
            }
            None => {
                self.index.insert(name.key().to_string(), self.pairs.len());
                self.pairs.push((name, node));
            }
        }
        Ok(())
    }

    /// Whether the entry under `node`'s name is exactly `node`
    pub fn contains(&self, node: &NodeRef) -> bool {
        self.index
            .get(node.name().key())
            .is_some_and(|&position| same_node(&self.pairs[position].1, node))
    }

    /// Get a node by case-insensitive name
    pub fn get_by_name(&self, name: &str) -> Result<&NodeRef> {
        self.position(name)
            .map(|position| &self.pairs[position].1)
            .ok_or_else(|| not_found(name))
    }

    /// Get a node by signed position
    pub fn get_by_index(&self, index: isize) -> Result<&NodeRef> {
        let position = self.true_index(index)?;
        Ok(&self.pairs[position].1)
    }

    /// Remove the node stored under `name`
    pub fn remove_by_name(&mut self, name: &str) -> Result<NodeRef> {
        let position = self.position(name).ok_or_else(|| not_found(name))?;
        Ok(self.remove_at(position))
    }

    /// Remove the node at a signed position
    pub fn remove_by_index(&mut self, index: isize) -> Result<NodeRef> {
        let position = self.true_index(index)?;
        Ok(self.remove_at(position))
    }

    /// Remove exactly `node`
    pub fn remove(&mut self, node: &NodeRef) -> Result<()> {
        let name = node.name();
        let position = self
            .position(name.as_str())
            .ok_or_else(|| not_found(name.as_str()))?;

        let stored = &self.pairs[position].1;
        if !same_node(stored, node) {
            return Err(Error::IdentityMismatch {
                name: name.to_string(),
                expected: describe(node),
                actual: describe(stored),
            });
        }

        self.remove_at(position);
        Ok(())
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate the nodes in order
    pub fn iter(&self) -> impl Iterator<Item = &NodeRef> + '_ {
        self.pairs.iter().map(|(_, node)| node)
    }

    /// Iterate the names in order
    pub fn names(&self) -> impl Iterator<Item = &Name> + '_ {
        self.pairs.iter().map(|(name, _)| name)
    }

    /// Snapshot of the nodes in order
    pub fn nodes(&self) -> Vec<NodeRef> {
        self.iter().cloned().collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_lowercase()).copied()
    }

    fn true_index(&self, index: isize) -> Result<usize> {
        true_index(self.len(), index).ok_or(Error::IndexOutOfRange {
            index,
            length: self.len(),
        })
    }

    fn remove_at(&mut self, position: usize) -> NodeRef {
        let (name, node) = self.pairs.remove(position);
        self.index.remove(name.key());
        for (shifted, (name, _)) in self.pairs.iter().enumerate().skip(position) {
            self.index.insert(name.key().to_string(), shifted);
        }
        node
    }
}

fn not_found(name: &str) -> Error {
    Error::NodeNotFound {
        parent: None,
        name: name.to_string(),
    }
}

impl Default for NodeMap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, name) in self.names().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{i}: {name}")?;
        }
        write!(f, "]")
    }
}

impl fmt::Debug for NodeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// A [`NodeMap`] behind a read/write lock, usable through `&self`.
#[derive(Default)]
pub struct SharedNodeMap {
    inner: RwLock<NodeMap>,
}

impl SharedNodeMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty map with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(NodeMap::with_capacity(capacity)),
        }
    }

    /// Lock the map for reading
    pub fn read(&self) -> RwLockReadGuard<'_, NodeMap> {
        self.inner.read()
    }

    /// Lock the map for writing
    pub fn write(&self) -> RwLockWriteGuard<'_, NodeMap> {
        self.inner.write()
    }
}

impl From<NodeMap> for SharedNodeMap {
    fn from(map: NodeMap) -> Self {
        Self {
            inner: RwLock::new(map),
        }
    }
}

impl fmt::Debug for SharedNodeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner.read(), f)
    }
}

impl NodeCollection for SharedNodeMap {
    fn add(&self, node: NodeRef, overwrite: bool) -> Result<()> {
        self.write().add(node, overwrite)
    }

    fn contains(&self, node: &NodeRef) -> bool {
        self.read().contains(node)
    }

    fn get_by_name(&self, name: &str) -> Result<NodeRef> {
        self.read().get_by_name(name).cloned()
    }

    fn get_by_index(&self, index: isize) -> Result<NodeRef> {
        self.read().get_by_index(index).cloned()
    }

    fn len(&self) -> usize {
        self.read().len()
    }

    fn nodes(&self) -> Vec<NodeRef> {
        self.read().nodes()
    }

    fn remove_by_name(&self, name: &str) -> Result<NodeRef> {
        self.write().remove_by_name(name)
    }

    fn remove_by_index(&self, index: isize) -> Result<NodeRef> {
        self.write().remove_by_index(index)
    }

    fn remove(&self, node: &NodeRef) -> Result<()> {
        self.write().remove(node)
    }
}
