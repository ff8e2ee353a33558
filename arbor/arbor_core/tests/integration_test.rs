//! Integration tests for the Arbor core library.
//!
//! These tests drive the class registry, the built-in node classes and the
//! node collections together through the public API.

use std::sync::Arc;

use arbor_core::class::registry::{ClassRegistry, PROPERTY_CLASS_URI, STRING_CLASS_URI};
use arbor_core::node::property::PropertyNode;
use arbor_core::node::{downcast_ref, same_node, walk};
use arbor_core::{
    Class, ClassUri, DefinitionDoc, DefinitionTree, Error, InitArgs, NodeCollection, NodeDef,
    NodeRef, NodeValue, Result,
};

fn uri(s: &str) -> ClassUri {
    ClassUri::parse(s).unwrap()
}

/// Minimal recursive builder over the public class operations.
fn build(registry: &ClassRegistry, def: NodeDef<'_>, parent: Option<&NodeRef>) -> Result<NodeRef> {
    let class = registry.resolve_or_create(def.class_uri())?;
    let mut node = class.alloc(def)?;
    class.init(
        node.as_mut(),
        &InitArgs {
            class: &class,
            parent,
            def,
        },
    )?;
    let node: NodeRef = Arc::from(node);
    for child in def.children() {
        let built = build(registry, child, Some(&node))?;
        node.children()
            .ok_or_else(|| Error::ChildrenUnsupported {
                name: node.name().to_string(),
            })?
            .add(built, false)?;
    }
    Ok(node)
}

fn tree_with_children(names: &[&str]) -> NodeRef {
    let mut doc = DefinitionDoc::new("Root");
    for name in names {
        doc = doc.with_child(DefinitionDoc::new(*name));
    }
    let tree = DefinitionTree::from_doc(&doc).unwrap();
    build(&ClassRegistry::new(), tree.root(), None).unwrap()
}

#[test]
fn test_add_then_get_any_case() {
    let root = tree_with_children(&[]);
    let leaf = tree_with_children(&[]);
    let children = root.children().unwrap();

    children.add(leaf.clone(), false).unwrap();
    assert!(same_node(&children.get_by_name("root").unwrap(), &leaf));
    assert!(same_node(&children.get_by_name("ROOT").unwrap(), &leaf));

    let other = tree_with_children(&["x"]);
    let before = children.nodes();
    let err = children.add(other, false).unwrap_err();
    assert!(matches!(err, Error::DuplicateName { .. }));

    let after = children.nodes();
    assert_eq!(before.len(), after.len());
    assert!(before.iter().zip(&after).all(|(a, b)| same_node(a, b)));
}

#[test]
fn test_signed_index_bounds() {
    let root = tree_with_children(&["a", "b", "c", "d"]);
    let children = root.children().unwrap();
    let n = children.len() as isize;

    assert!(same_node(
        &children.get_by_index(-1).unwrap(),
        &children.get_by_index(n - 1).unwrap()
    ));
    assert!(matches!(
        children.get_by_index(n),
        Err(Error::IndexOutOfRange { .. })
    ));
    assert!(matches!(
        children.get_by_index(-n - 1),
        Err(Error::IndexOutOfRange { .. })
    ));
}

#[test]
fn test_remove_by_index_shifts() {
    let root = tree_with_children(&["a", "b", "c", "d", "e"]);
    let children = root.children().unwrap();

    for i in [0isize, 2, 1] {
        let before = children.nodes();
        children.remove_by_index(i).unwrap();
        assert_eq!(children.len(), before.len() - 1);
        for j in (i as usize)..children.len() {
            assert!(same_node(
                &children.get_by_index(j as isize).unwrap(),
                &before[j + 1]
            ));
        }
        for node in children.nodes() {
            assert!(same_node(
                &children.get_by_name(node.name().as_str()).unwrap(),
                &node
            ));
        }
    }
}

#[test]
fn test_property_projection() {
    let doc = DefinitionDoc::new("Port")
        .with_class(PROPERTY_CLASS_URI)
        .with_child(
            DefinitionDoc::new("Value")
                .with_class(STRING_CLASS_URI)
                .with_value(8080i64),
        );
    let tree = DefinitionTree::from_doc(&doc).unwrap();
    let registry = ClassRegistry::with_builtins();
    let port = build(&registry, tree.root(), None).unwrap();
    let attrs = port.children().unwrap();

    let value = attrs.get_by_name("value").unwrap();
    assert_eq!(value.as_value().unwrap().value(), NodeValue::from("8080"));
    assert!(matches!(
        attrs.remove_by_name("value"),
        Err(Error::SchemaAttribute { .. })
    ));

    let extra_doc = DefinitionDoc::new("Holder").with_child(DefinitionDoc::new("Extra"));
    let extra_tree = DefinitionTree::from_doc(&extra_doc).unwrap();
    let holder = build(&registry, extra_tree.root(), None).unwrap();
    let extra = holder.children().unwrap().get_by_name("extra").unwrap();

    attrs.add(extra.clone(), false).unwrap();
    let schema_count = downcast_ref::<PropertyNode>(&port).unwrap().attrs().schema().len();
    assert!(same_node(
        &attrs.get_by_index(schema_count as isize).unwrap(),
        &extra
    ));
}

#[test]
fn test_dynamic_subclass_scenario() {
    let registry = ClassRegistry::new();
    let a = Arc::new(Class::derive("A", registry.root()));
    registry.register(&uri("app:shapes#Node"), a.clone()).unwrap();

    let ab = registry.create_dynamic(&uri("app:shapes#A.B")).unwrap();
    assert!(Arc::ptr_eq(ab.base().unwrap(), &a));

    let again = registry.resolve(&uri("app:shapes#A.B")).unwrap();
    assert!(Arc::ptr_eq(&again, &ab));

    assert!(matches!(
        registry.create_dynamic(&uri("app:shapes#A.B")),
        Err(Error::DuplicateClass { .. })
    ));
}

#[test]
fn test_dynamic_classes_build_like_their_base() {
    let doc = DefinitionDoc::new("Servers")
        .with_class("app:servers#Pool")
        .with_child(DefinitionDoc::new("Primary").with_class("app:servers#Http"));
    let tree = DefinitionTree::from_doc(&doc).unwrap();
    let registry = ClassRegistry::with_builtins();

    let root = build(&registry, tree.root(), None).unwrap();
    let primary = walk::child_by_path(&root, "primary").unwrap();

    assert_eq!(root.class().unwrap().name().as_str(), "Pool");
    assert!(root.class().unwrap().is_subclass_of(registry.root()));
    assert!(same_node(&primary.parent().unwrap(), &root));
    assert_eq!(walk::descendants(&root).count(), 2);
}

#[test]
fn test_string_node_rejects_children() {
    let doc = DefinitionDoc::new("Text")
        .with_class(STRING_CLASS_URI)
        .with_child(DefinitionDoc::new("Nested"));
    let tree = DefinitionTree::from_doc(&doc).unwrap();

    let err = build(&ClassRegistry::with_builtins(), tree.root(), None).unwrap_err();
    assert!(matches!(err, Error::ChildrenUnsupported { .. }));
}
