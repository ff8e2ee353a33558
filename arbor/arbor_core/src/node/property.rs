//! Property nodes.
//!
//! A property's children are projected through an attribute schema with a
//! single permanent `Value` attribute. Any other child lands in the dynamic
//! fallback collection.

use std::any::Any;
use std::sync::Arc;

use once_cell::sync::Lazy;

use super::basic::LeafNode;
use super::{downcast_mut, Node, NodeRef, ValueNode};
use crate::class::{ClassRef, InitArgs};
use crate::collection::{AttrSchema, NodeAttrMap, NodeCollection};
use crate::definition::NodeDef;
use crate::error::{Error, Result};
use crate::name::Name;
use crate::value::NodeValue;

/// Name of the schema attribute holding the property value.
pub const VALUE_ATTR: &str = "Value";

static PROPERTY_SCHEMA: Lazy<Arc<AttrSchema<PropertyState>>> = Lazy::new(|| {
    Arc::new(AttrSchema::new().with(VALUE_ATTR, get_value, set_value))
});

/// Typed state behind a property's schema attributes.
#[derive(Debug, Default)]
pub struct PropertyState {
    value: Option<NodeRef>,
}

fn get_value(state: &PropertyState) -> Result<NodeRef> {
    state.value.clone().ok_or_else(|| Error::NodeNotFound {
        parent: None,
        name: VALUE_ATTR.to_string(),
    })
}

fn set_value(state: &mut PropertyState, value: NodeRef) -> Result<()> {
    state.value = Some(value);
    Ok(())
}

/// A node whose `Value` child is a schema attribute.
#[derive(Debug)]
pub struct PropertyNode {
    leaf: LeafNode,
    attrs: NodeAttrMap<PropertyState>,
}

impl PropertyNode {
    /// The `Value` child, if one has been attached
    pub fn value_node(&self) -> Option<NodeRef> {
        self.attrs.state().value.clone()
    }

    /// The attribute projection over this property
    pub fn attrs(&self) -> &NodeAttrMap<PropertyState> {
        &self.attrs
    }
}

impl Default for PropertyNode {
    fn default() -> Self {
        Self {
            leaf: LeafNode::default(),
            attrs: NodeAttrMap::new(Arc::clone(&PROPERTY_SCHEMA), PropertyState::default()),
        }
    }
}

impl Node for PropertyNode {
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
        Some(&self.attrs)
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

impl ValueNode for PropertyNode {
    fn value(&self) -> NodeValue {
        self.value_node()
            .and_then(|node| node.as_value().map(|v| v.value()))
            .unwrap_or(NodeValue::Null)
    }
}

/// Allocate an empty [`PropertyNode`].
pub fn alloc_property_node(_def: NodeDef<'_>) -> Result<Box<dyn Node>> {
    Ok(Box::new(PropertyNode::default()))
}

/// Initialize a [`PropertyNode`].
pub fn init_property_node(node: &mut dyn Node, args: &InitArgs<'_>) -> Result<()> {
    downcast_mut::<PropertyNode>(node)?.leaf.init(args);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::registry::{ClassRegistry, PROPERTY_CLASS_URI, STRING_CLASS_URI};
    use crate::definition::DefinitionTree;
    use crate::node::same_node;
    use crate::uri::ClassUri;

    fn build(registry: &ClassRegistry, def: NodeDef<'_>, parent: Option<&NodeRef>) -> NodeRef {
        let class = registry.resolve(def.class_uri()).unwrap();
        let mut node = class.alloc(def).unwrap();
        class
            .init(
                node.as_mut(),
                &InitArgs {
                    class: &class,
                    parent,
                    def,
                },
            )
            .unwrap();
        let node: NodeRef = Arc::from(node);
        for child in def.children() {
            let built = build(registry, child, Some(&node));
            node.children().unwrap().add(built, false).unwrap();
        }
        node
    }

    #[test]
    fn test_property_value_forwards_to_value_child() {
        let registry = ClassRegistry::with_builtins();
        let mut tree = DefinitionTree::new("Port", ClassUri::parse(PROPERTY_CLASS_URI).unwrap());
        let root = tree.root_id();
        let string = ClassUri::parse(STRING_CLASS_URI).unwrap();
        let value = tree.add_child(root, "Value", string.clone());
        tree.set_value(value, "8080");
        tree.add_child(root, "Comment", string);

        let node = build(&registry, tree.root(), None);
        let children = node.children().unwrap();

        assert_eq!(children.len(), 2);
        assert_eq!(node.as_value().unwrap().value().as_str(), Some("8080"));

        let property = crate::node::downcast_ref::<PropertyNode>(&node).unwrap();
        let value_node = property.value_node().unwrap();
        assert!(same_node(&children.get_by_index(0).unwrap(), &value_node));
        assert_eq!(children.get_by_index(1).unwrap().name().as_str(), "Comment");
        assert!(same_node(&value_node.parent().unwrap(), &node));
    }

    #[test]
    fn test_unset_property_value_is_null() {
        let property = PropertyNode::default();
        assert!(property.value().is_null());
        assert_eq!(property.attrs().len(), 1);
    }
}
