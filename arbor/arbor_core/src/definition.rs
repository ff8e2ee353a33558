//! Definition trees.
//!
//! Loaders translate configuration into a [`DefinitionTree`], the standard
//! form the node factory consumes. A tree is an arena of definitions; each
//! one has a name, a class URI, a raw scalar value, its parent and its
//! ordered children. [`NodeDef`] is a cheap borrowed view of one entry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::class::registry::ROOT_CLASS_URI;
use crate::error::Result;
use crate::name::Name;
use crate::uri::ClassUri;
use crate::value::NodeValue;

/// Identifies a definition within its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefId(usize);

#[derive(Debug, Clone)]
struct DefEntry {
    name: Name,
    class_uri: ClassUri,
    value: String,
    parent: Option<DefId>,
    children: Vec<DefId>,
}

/// An immutable-once-loaded tree of node definitions.
///
/// Builder methods panic when handed a [`DefId`] from another tree.
#[derive(Debug, Clone)]
pub struct DefinitionTree {
    entries: Vec<DefEntry>,
}

impl DefinitionTree {
    /// Create a tree with a single root definition
    pub fn new(root_name: impl Into<Name>, class_uri: ClassUri) -> Self {
        Self {
            entries: vec![DefEntry {
                name: root_name.into(),
                class_uri,
                value: String::new(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Build a tree from its document form.
    pub fn from_doc(doc: &DefinitionDoc) -> Result<Self> {
        let mut tree = Self::new(doc.name.as_str(), ClassUri::parse(&doc.class)?);
        let root = tree.root_id();
        tree.fill_from_doc(root, doc)?;
        Ok(tree)
    }

    fn fill_from_doc(&mut self, id: DefId, doc: &DefinitionDoc) -> Result<()> {
        if let Some(value) = &doc.value {
            self.set_value(id, value.to_raw());
        }
        for child in &doc.children {
            let name = self.unique_child_name(id, &child.name);
            let child_id = self.add_child(id, name, ClassUri::parse(&child.class)?);
            self.fill_from_doc(child_id, child)?;
        }
        Ok(())
    }

    /// The root's id
    pub fn root_id(&self) -> DefId {
        DefId(0)
    }

    /// View of the root definition
    pub fn root(&self) -> NodeDef<'_> {
        NodeDef {
            tree: self,
            id: self.root_id(),
        }
    }

    /// View of the definition `id`, if it belongs to this tree
    pub fn get(&self, id: DefId) -> Option<NodeDef<'_>> {
        (id.0 < self.entries.len()).then_some(NodeDef { tree: self, id })
    }

    /// Number of definitions in the tree
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a tree has at least its root
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a child definition under `parent`
    pub fn add_child(&mut self, parent: DefId, name: impl Into<Name>, class_uri: ClassUri) -> DefId {
        let id = DefId(self.entries.len());
        self.entries.push(DefEntry {
            name: name.into(),
            class_uri,
            value: String::new(),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.entries[parent.0].children.push(id);
        id
    }

    /// Replace the raw value of `id`
    pub fn set_value(&mut self, id: DefId, value: impl Into<String>) {
        self.entries[id.0].value = value.into();
    }

    /// Append text to the raw value of `id`
    pub fn append_value(&mut self, id: DefId, text: &str) {
        self.entries[id.0].value.push_str(text);
    }

    /// Find a direct child of `parent` by case-insensitive name. Linear.
    pub fn find_child(&self, parent: DefId, name: &str) -> Option<DefId> {
        self.entries[parent.0]
            .children
            .iter()
            .copied()
            .find(|child| self.entries[child.0].name == *name)
    }

    /// A name for a new child of `parent` that no sibling uses yet: `name`
    /// itself, else `name2`, `name3`, ...
    pub fn unique_child_name(&self, parent: DefId, name: &str) -> Name {
        if self.find_child(parent, name).is_none() {
            return Name::new(name);
        }
        (2usize..)
            .map(|n| format!("{name}{n}"))
            .find(|candidate| self.find_child(parent, candidate).is_none())
            .map(Name::new)
            .unwrap_or_else(|| Name::new(name))
    }

    /// Iterate every definition, parents before children
    pub fn iter(&self) -> impl Iterator<Item = NodeDef<'_>> + '_ {
        (0..self.entries.len()).map(move |i| NodeDef {
            tree: self,
            id: DefId(i),
        })
    }
}

impl TryFrom<&DefinitionDoc> for DefinitionTree {
    type Error = crate::error::Error;

    fn try_from(doc: &DefinitionDoc) -> Result<Self> {
        Self::from_doc(doc)
    }
}

/// A borrowed view of one definition.
#[derive(Clone, Copy)]
pub struct NodeDef<'a> {
    tree: &'a DefinitionTree,
    id: DefId,
}

impl<'a> NodeDef<'a> {
    fn entry(&self) -> &'a DefEntry {
        &self.tree.entries[self.id.0]
    }

    /// The definition's id
    pub fn id(&self) -> DefId {
        self.id
    }

    /// The tree the definition belongs to
    pub fn tree(&self) -> &'a DefinitionTree {
        self.tree
    }

    /// The node name
    pub fn name(&self) -> &'a Name {
        &self.entry().name
    }

    /// The class URI
    pub fn class_uri(&self) -> &'a ClassUri {
        &self.entry().class_uri
    }

    /// The raw scalar value
    pub fn value(&self) -> &'a str {
        &self.entry().value
    }

    /// The parent definition
    pub fn parent(&self) -> Option<NodeDef<'a>> {
        self.entry().parent.map(|id| NodeDef {
            tree: self.tree,
            id,
        })
    }

    /// Names from the root definition down to this one, joined with `.`
    pub fn path(&self) -> String {
        let mut names: Vec<&str> = std::iter::successors(Some(*self), NodeDef::parent)
            .map(|def| def.name().as_str())
            .collect();
        names.reverse();
        names.join(".")
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.entry().children.len()
    }

    /// The direct children, in order
    pub fn children(&self) -> impl Iterator<Item = NodeDef<'a>> + 'a {
        let tree = self.tree;
        self.entry()
            .children
            .iter()
            .map(move |&id| NodeDef { tree, id })
    }
}

impl fmt::Debug for NodeDef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeDef")
            .field("name", self.name())
            .field("class", self.class_uri())
            .field("value", &self.value())
            .field("children", &self.child_count())
            .finish()
    }
}

fn default_class() -> String {
    ROOT_CLASS_URI.to_string()
}

/// The serialized form of a definition tree.
///
/// ```
/// use arbor_core::definition::{DefinitionDoc, DefinitionTree};
///
/// let doc = DefinitionDoc::new("Server")
///     .with_child(DefinitionDoc::new("Host").with_class("import:nodes#String").with_value("localhost"));
/// let tree = DefinitionTree::from_doc(&doc).unwrap();
/// assert_eq!(tree.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionDoc {
    /// Node name
    pub name: String,

    /// Class URI
    #[serde(default = "default_class")]
    pub class: String,

    /// Scalar value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<NodeValue>,

    /// Child definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DefinitionDoc>,
}

impl DefinitionDoc {
    /// A document of the root class with no value or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: default_class(),
            value: None,
            children: Vec::new(),
        }
    }

    /// Set the class URI
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    /// Set the scalar value
    pub fn with_value(mut self, value: impl Into<NodeValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Append a child document
    pub fn with_child(mut self, child: DefinitionDoc) -> Self {
        self.children.push(child);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn node_uri() -> ClassUri {
        ClassUri::parse(ROOT_CLASS_URI).unwrap()
    }

    #[test]
    fn test_build_tree() {
        let mut tree = DefinitionTree::new("Root", node_uri());
        let root = tree.root_id();
        let a = tree.add_child(root, "A", node_uri());
        tree.add_child(a, "B", node_uri());
        tree.set_value(a, "one");
        tree.append_value(a, "two");

        let a_def = tree.get(a).unwrap();
        assert_eq!(a_def.value(), "onetwo");
        assert_eq!(a_def.parent().unwrap().name().as_str(), "Root");
        assert_eq!(a_def.child_count(), 1);
        assert_eq!(a_def.children().next().unwrap().path(), "Root.A.B");
        assert_eq!(tree.find_child(root, "a"), Some(a));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_unique_child_name() {
        let mut tree = DefinitionTree::new("Root", node_uri());
        let root = tree.root_id();
        assert_eq!(tree.unique_child_name(root, "Item").as_str(), "Item");

        tree.add_child(root, "Item", node_uri());
        tree.add_child(root, "item2", node_uri());
        assert_eq!(tree.unique_child_name(root, "Item").as_str(), "Item3");
    }

    #[test]
    fn test_from_doc_numbers_repeated_names() {
        let doc: DefinitionDoc = serde_json::from_str(
            r#"{
                "name": "Servers",
                "children": [
                    {"name": "Server", "class": "app:servers#Http", "value": 80},
                    {"name": "Server", "class": "app:servers#Http", "value": "443"}
                ]
            }"#,
        )
        .unwrap();

        let tree = DefinitionTree::from_doc(&doc).unwrap();
        let names: Vec<&str> = tree.root().children().map(|c| c.name().as_str()).collect();
        assert_eq!(names, vec!["Server", "Server2"]);

        let values: Vec<&str> = tree.root().children().map(|c| c.value()).collect();
        assert_eq!(values, vec!["80", "443"]);
        assert_eq!(tree.root().class_uri().as_str(), ROOT_CLASS_URI);
    }

    #[test]
    fn test_from_doc_rejects_bad_uri() {
        let doc = DefinitionDoc::new("Root").with_class("not a uri");
        assert!(matches!(
            DefinitionTree::from_doc(&doc),
            Err(Error::InvalidUri { .. })
        ));
    }
}
