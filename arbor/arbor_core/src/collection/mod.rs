//! Node collections.
//!
//! A node's children live in a [`NodeCollection`]: an ordered container
//! addressable by case-insensitive name and by signed position. Two
//! implementations are provided:
//!
//! - [`SharedNodeMap`], a lock-wrapped [`NodeMap`] used by ordinary nodes
//! - [`NodeAttrMap`], a projection of a fixed attribute schema over a node's
//!   typed state, falling back to a dynamic map for unknown names

pub mod attr;
pub mod map;

use std::fmt;

use crate::error::Result;
use crate::node::NodeRef;

pub use attr::{AttrSchema, NodeAttrMap, TypeAttr};
pub use map::{NodeMap, SharedNodeMap};

/// Uniform interface over a node's children.
///
/// Collections are populated by the factory before a tree is handed to the
/// lifecycle phases; afterwards they are only read.
pub trait NodeCollection: Send + Sync + fmt::Debug {
    /// Add a node. A same-named entry is replaced in place when `overwrite`
    /// is set, otherwise the call fails with `DuplicateName`.
    fn add(&self, node: NodeRef, overwrite: bool) -> Result<()>;

    /// Whether the entry under `node`'s name is exactly `node`
    fn contains(&self, node: &NodeRef) -> bool;

    /// Get a node by case-insensitive name
    fn get_by_name(&self, name: &str) -> Result<NodeRef>;

    /// Get a node by position; negative indexes count from the end
    fn get_by_index(&self, index: isize) -> Result<NodeRef>;

    /// Number of entries
    fn len(&self) -> usize;

    /// Whether there are no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the entries in order
    fn nodes(&self) -> Vec<NodeRef>;

    /// Remove and return the node stored under `name`
    fn remove_by_name(&self, name: &str) -> Result<NodeRef>;

    /// Remove and return the node at `index`, shifting later entries down
    fn remove_by_index(&self, index: isize) -> Result<NodeRef>;

    /// Remove `node`, failing if a different instance is stored under its name
    fn remove(&self, node: &NodeRef) -> Result<()>;
}

/// Normalize a signed index against a collection length.
///
/// Negative indexes address from the end. Returns `None` unless the
/// resulting index is within `0..len`.
pub fn true_index(len: usize, index: isize) -> Option<usize> {
    let len = isize::try_from(len).ok()?;
    let index = if index < 0 { len + index } else { index };
    if index >= 0 && index < len {
        usize::try_from(index).ok()
    } else {
        None
    }
}
