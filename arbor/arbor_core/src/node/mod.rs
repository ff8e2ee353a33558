//! The node model.
//!
//! Every node exposes an identity (its name), a non-owning reference to its
//! parent, its class and, unless it is a leaf, an ordered child collection.
//! The child collection owns the children; parents are held weakly.
//!
//! Optional behaviors are queried rather than inherited: [`Node::as_init`],
//! [`Node::as_start`] and [`Node::as_value`] return `None` unless the node
//! type opts in.

pub mod basic;
pub mod property;
pub mod string;
pub mod walk;

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::class::ClassRef;
use crate::collection::NodeCollection;
use crate::error::{Error, Result};
use crate::lifecycle::{InitNode, StartNode};
use crate::name::Name;
use crate::value::NodeValue;

/// Owning, shared handle to a node.
pub type NodeRef = Arc<dyn Node>;

/// Non-owning handle to a node, used for parent back-references.
pub type WeakNodeRef = Weak<dyn Node>;

/// The interface implemented by every node in an Arbor tree.
pub trait Node: Any + Send + Sync + fmt::Debug {
    /// The case-insensitive name of the node
    fn name(&self) -> &Name;

    /// The parent node; `None` for a root or once the parent is dropped
    fn parent(&self) -> Option<NodeRef>;

    /// The class the node was created as; `None` before initialization
    fn class(&self) -> Option<&ClassRef>;

    /// The node's children; `None` for leaf nodes that cannot have any
    fn children(&self) -> Option<&dyn NodeCollection>;

    /// Upcast for downcasting to the concrete node type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast used by class initializers
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Value accessor capability
    fn as_value(&self) -> Option<&dyn ValueNode> {
        None
    }

    /// Post-children initializer capability
    fn as_init(&self) -> Option<&dyn InitNode> {
        None
    }

    /// Concurrent starter capability
    fn as_start(&self) -> Option<&dyn StartNode> {
        None
    }
}

/// A node that can represent itself as a plain value.
pub trait ValueNode: Send + Sync {
    /// The node's value
    fn value(&self) -> NodeValue;
}

/// Whether two handles refer to the same node instance.
pub fn same_node(a: &NodeRef, b: &NodeRef) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// A stable identity for a live node, usable as a map key.
pub fn node_key(node: &NodeRef) -> usize {
    Arc::as_ptr(node) as *const () as usize
}

/// Short human-readable description of a node instance.
pub fn describe(node: &NodeRef) -> String {
    let class = node
        .class()
        .map(|c| c.name().to_string())
        .unwrap_or_else(|| "?".to_string());
    format!("{} ({class} @ {:#x})", walk::path(node), node_key(node))
}

/// Downcast an allocated node for its initializer.
pub fn downcast_mut<T: Node>(node: &mut dyn Node) -> Result<&mut T> {
    let name = node.name().to_string();
    node.as_any_mut()
        .downcast_mut::<T>()
        .ok_or(Error::TypeMismatch {
            expected: std::any::type_name::<T>(),
            node: name,
        })
}

/// Downcast a shared node to its concrete type.
pub fn downcast_ref<T: Node>(node: &NodeRef) -> Option<&T> {
    node.as_any().downcast_ref::<T>()
}
