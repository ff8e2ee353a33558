//! Scalar string nodes.

use std::any::Any;

use super::basic::LeafNode;
use super::{downcast_mut, Node, NodeRef, ValueNode};
use crate::class::{ClassRef, InitArgs};
use crate::collection::NodeCollection;
use crate::definition::NodeDef;
use crate::error::Result;
use crate::name::Name;
use crate::value::NodeValue;

/// A leaf node holding the raw scalar value of its definition.
#[derive(Debug, Default)]
pub struct StringNode {
    leaf: LeafNode,
    value: String,
}

impl StringNode {
    /// The raw string value
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl Node for StringNode {
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
        None
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_value(&self) -> Option<&dyn ValueNode> {
        Some(self)
    }
}

impl ValueNode for StringNode {
    fn value(&self) -> NodeValue {
        NodeValue::String(self.value.clone())
    }
}

/// Allocate an empty [`StringNode`].
pub fn alloc_string_node(_def: NodeDef<'_>) -> Result<Box<dyn Node>> {
    Ok(Box::new(StringNode::default()))
}

/// Initialize a [`StringNode`] from the definition's raw value.
pub fn init_string_node(node: &mut dyn Node, args: &InitArgs<'_>) -> Result<()> {
    let node = downcast_mut::<StringNode>(node)?;
    node.leaf.init(args);
    node.value = args.def.value().to_string();
    Ok(())
}
