//! Basic node types.
//!
//! [`LeafNode`] bundles the parts every node needs (name, class, parent)
//! and has no children. [`BasicNode`] embeds a `LeafNode` and adds an
//! ordered child collection; it is the node type of the root class.

use std::any::Any;
use std::sync::Arc;

use super::{downcast_mut, Node, NodeRef, WeakNodeRef};
use crate::class::{ClassRef, InitArgs};
use crate::collection::{NodeCollection, SharedNodeMap};
use crate::definition::NodeDef;
use crate::error::Result;
use crate::name::Name;

/// A node that cannot have children.
#[derive(Debug, Default)]
pub struct LeafNode {
    name: Name,
    class: Option<ClassRef>,
    parent: Option<WeakNodeRef>,
}

impl LeafNode {
    /// Populate the identity parts from the initializer arguments.
    pub fn init(&mut self, args: &InitArgs<'_>) {
        self.name = args.def.name().clone();
        self.class = Some(Arc::clone(args.class));
        self.parent = args.parent.map(Arc::downgrade);
    }

    /// The node name
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The node class
    pub fn class(&self) -> Option<&ClassRef> {
        self.class.as_ref()
    }

    /// The parent, if it is still alive
    pub fn parent(&self) -> Option<NodeRef> {
        self.parent.as_ref().and_then(|p| p.upgrade())
    }
}

impl Node for LeafNode {
    fn name(&self) -> &Name {
        &self.name
    }

    fn parent(&self) -> Option<NodeRef> {
        LeafNode::parent(self)
    }

    fn class(&self) -> Option<&ClassRef> {
        self.class.as_ref()
    }

    fn children(&self) -> Option<&dyn NodeCollection> {
        None
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A node with an ordered, name-unique child collection.
#[derive(Debug, Default)]
pub struct BasicNode {
    leaf: LeafNode,
    children: SharedNodeMap,
}

impl BasicNode {
    /// The embedded leaf part
    pub fn leaf(&self) -> &LeafNode {
        &self.leaf
    }

    /// The child collection
    pub fn child_map(&self) -> &SharedNodeMap {
        &self.children
    }
}

impl Node for BasicNode {
    fn name(&self) -> &Name {
        self.leaf.name()
    }

    fn parent(&self) -> Option<NodeRef> {
        self.leaf.parent()
    }

    fn class(&self) -> Option<&ClassRef> {
        self.leaf.class()
    }

    fn children(&self) -> Option<&dyn NodeCollection> {
        Some(&self.children)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Allocate an empty [`LeafNode`].
pub fn alloc_leaf_node(_def: NodeDef<'_>) -> Result<Box<dyn Node>> {
    Ok(Box::new(LeafNode::default()))
}

/// Initialize a [`LeafNode`].
pub fn init_leaf_node(node: &mut dyn Node, args: &InitArgs<'_>) -> Result<()> {
    downcast_mut::<LeafNode>(node)?.init(args);
    Ok(())
}

/// Allocate an empty [`BasicNode`].
pub fn alloc_basic_node(_def: NodeDef<'_>) -> Result<Box<dyn Node>> {
    Ok(Box::new(BasicNode::default()))
}

/// Initialize a [`BasicNode`]: the leaf part first, then a child collection
/// sized for the definition's children.
pub fn init_basic_node(node: &mut dyn Node, args: &InitArgs<'_>) -> Result<()> {
    let node = downcast_mut::<BasicNode>(node)?;
    node.leaf.init(args);
    node.children = SharedNodeMap::with_capacity(args.def.child_count());
    Ok(())
}
