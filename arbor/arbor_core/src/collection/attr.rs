//! Attribute projections.
//!
//! An [`AttrSchema`] is a fixed, ordered list of typed attributes defined
//! once per node type. Each attribute knows how to read its value out of the
//! node's typed state record and how to write a value back. A
//! [`NodeAttrMap`] binds a schema to one state record and adds a dynamic
//! [`NodeMap`](super::NodeMap) for names the schema does not define, giving
//! a single view where schema attributes come first and dynamic entries
//! follow.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{true_index, NodeCollection, SharedNodeMap};
use crate::error::{Error, Result};
use crate::name::Name;
use crate::node::{same_node, NodeRef};

/// Reads an attribute out of a state record.
pub type AttrGetter<S> = fn(&S) -> Result<NodeRef>;

/// Applies an attribute value onto a state record.
pub type AttrSetter<S> = fn(&mut S, NodeRef) -> Result<()>;

/// A typed attribute definition.
pub struct TypeAttr<S> {
    name: Name,
    get: AttrGetter<S>,
    set: AttrSetter<S>,
}

impl<S> TypeAttr<S> {
    /// Define an attribute
    pub fn new(name: impl Into<Name>, get: AttrGetter<S>, set: AttrSetter<S>) -> Self {
        Self {
            name: name.into(),
            get,
            set,
        }
    }

    /// The attribute name
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Read the attribute from `state`
    pub fn get(&self, state: &S) -> Result<NodeRef> {
        (self.get)(state)
    }

    /// Write `value` onto `state`
    pub fn set(&self, state: &mut S, value: NodeRef) -> Result<()> {
        (self.set)(state, value)
    }
}

impl<S> fmt::Debug for TypeAttr<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeAttr").field("name", &self.name).finish()
    }
}

/// An ordered set of typed attributes for one state type.
pub struct AttrSchema<S> {
    index: HashMap<String, usize>,
    attrs: Vec<TypeAttr<S>>,
}

impl<S> AttrSchema<S> {
    /// Create an empty schema
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            attrs: Vec::new(),
        }
    }

    /// Define an attribute. An existing definition with the same name is
    /// replaced in place when `overwrite` is set.
    pub fn add(&mut self, attr: TypeAttr<S>, overwrite: bool) -> Result<()> {
        match self.index.get(attr.name.key()) {
            Some(&position) if overwrite => self.attrs[position] = attr,
            Some(_) => {
                return Err(Error::DuplicateName {
                    name: attr.name.to_string(),
                });
            }
            None => {
                self.index.insert(attr.name.key().to_string(), self.attrs.len());
                self.attrs.push(attr);
            }
        }
        Ok(())
    }

    /// Builder form of [`AttrSchema::add`] for static schema definitions.
    ///
    /// # Panics
    ///
    /// Panics if an attribute with the same name is already defined.
    pub fn with(mut self, name: &str, get: AttrGetter<S>, set: AttrSetter<S>) -> Self {
        if let Err(err) = self.add(TypeAttr::new(name, get, set), false) {
            panic!("invalid attribute schema: {err}");
        }
        self
    }

    /// Look up an attribute by case-insensitive name
    pub fn get(&self, name: &str) -> Option<&TypeAttr<S>> {
        self.index
            .get(&name.to_lowercase())
            .map(|&position| &self.attrs[position])
    }

    /// Whether an attribute is defined under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_lowercase())
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether the schema defines no attributes
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Iterate the attributes in definition order
    pub fn iter(&self) -> impl Iterator<Item = &TypeAttr<S>> + '_ {
        self.attrs.iter()
    }
}

impl<S> Default for AttrSchema<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for AttrSchema<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.attrs.iter().map(|a| &a.name))
            .finish()
    }
}

/// A schema bound to a state record, with a dynamic fallback collection.
pub struct NodeAttrMap<S> {
    schema: Arc<AttrSchema<S>>,
    state: RwLock<S>,
    dynamic: SharedNodeMap,
}

impl<S> NodeAttrMap<S> {
    /// Bind `schema` to `state`
    pub fn new(schema: Arc<AttrSchema<S>>, state: S) -> Self {
        Self {
            schema,
            state: RwLock::new(state),
            dynamic: SharedNodeMap::new(),
        }
    }

    /// The bound schema
    pub fn schema(&self) -> &AttrSchema<S> {
        &self.schema
    }

    /// Read access to the bound state
    pub fn state(&self) -> RwLockReadGuard<'_, S> {
        self.state.read()
    }

    /// Write access to the bound state
    pub fn state_mut(&self) -> RwLockWriteGuard<'_, S> {
        self.state.write()
    }

    /// The dynamic fallback collection
    pub fn dynamic(&self) -> &SharedNodeMap {
        &self.dynamic
    }
}

impl<S: Default> Default for NodeAttrMap<S> {
    fn default() -> Self {
        Self::new(Arc::new(AttrSchema::new()), S::default())
    }
}

impl<S> fmt::Debug for NodeAttrMap<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeAttrMap")
            .field("schema", &self.schema)
            .field("dynamic", &self.dynamic)
            .finish()
    }
}

impl<S> NodeCollection for NodeAttrMap<S>
where
    S: Send + Sync + 'static,
{
    fn add(&self, node: NodeRef, overwrite: bool) -> Result<()> {
        match self.schema.get(node.name().as_str()) {
            Some(attr) => attr.set(&mut self.state.write(), node),
            None => self.dynamic.add(node, overwrite),
        }
    }

    fn contains(&self, node: &NodeRef) -> bool {
        match self.schema.get(node.name().as_str()) {
            Some(attr) => attr
                .get(&self.state.read())
                .is_ok_and(|stored| same_node(&stored, node)),
            None => self.dynamic.contains(node),
        }
    }

    fn get_by_name(&self, name: &str) -> Result<NodeRef> {
        match self.schema.get(name) {
            Some(attr) => attr.get(&self.state.read()),
            None => self.dynamic.get_by_name(name),
        }
    }

    fn get_by_index(&self, index: isize) -> Result<NodeRef> {
        let length = self.len();
        let position = true_index(length, index).ok_or(Error::IndexOutOfRange { index, length })?;

        let schema_len = self.schema.len();
        if position < schema_len {
            self.schema.attrs[position].get(&self.state.read())
        } else {
            self.dynamic.get_by_index(dynamic_index(position - schema_len))
        }
    }

    fn len(&self) -> usize {
        self.schema.len() + self.dynamic.len()
    }

    /// Schema attributes without a value are skipped.
    fn nodes(&self) -> Vec<NodeRef> {
        let mut nodes: Vec<NodeRef> = {
            let state = self.state.read();
            self.schema
                .iter()
                .filter_map(|attr| attr.get(&state).ok())
                .collect()
        };
        nodes.extend(self.dynamic.nodes());
        nodes
    }

    fn remove_by_name(&self, name: &str) -> Result<NodeRef> {
        if self.schema.contains(name) {
            return Err(Error::SchemaAttribute {
                name: name.to_string(),
            });
        }
        self.dynamic.remove_by_name(name)
    }

    fn remove_by_index(&self, index: isize) -> Result<NodeRef> {
        let length = self.len();
        let position = true_index(length, index).ok_or(Error::IndexOutOfRange { index, length })?;

        let schema_len = self.schema.len();
        if position < schema_len {
            return Err(Error::SchemaAttribute {
                name: self.schema.attrs[position].name.to_string(),
            });
        }
        self.dynamic.remove_by_index(dynamic_index(position - schema_len))
    }

    fn remove(&self, node: &NodeRef) -> Result<()> {
        if self.schema.contains(node.name().as_str()) {
            return Err(Error::SchemaAttribute {
                name: node.name().to_string(),
            });
        }
        self.dynamic.remove(node)
    }
}

// Positions past the schema always fit: they index an existing collection.
fn dynamic_index(position: usize) -> isize {
    isize::try_from(position).unwrap_or(isize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::NodeCollection;
    use crate::node::Node;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Named(Name);

    impl Node for Named {
        fn name(&self) -> &Name {
            &self.0
        }

        fn parent(&self) -> Option<NodeRef> {
            None
        }

        fn class(&self) -> Option<&crate::class::ClassRef> {
            None
        }

        fn children(&self) -> Option<&dyn NodeCollection> {
            None
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    fn node(name: &str) -> NodeRef {
        Arc::new(Named(Name::new(name)))
    }

    static GETS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Default)]
    struct State {
        value: Option<NodeRef>,
    }

    fn get_value(state: &State) -> Result<NodeRef> {
        GETS.fetch_add(1, Ordering::SeqCst);
        state.value.clone().ok_or(Error::NodeNotFound {
            parent: None,
            name: "Value".to_string(),
        })
    }

    fn set_value(state: &mut State, value: NodeRef) -> Result<()> {
        state.value = Some(value);
        Ok(())
    }

    fn attr_map() -> NodeAttrMap<State> {
        let schema = AttrSchema::new().with("Value", get_value, set_value);
        NodeAttrMap::new(Arc::new(schema), State::default())
    }

    #[test]
    fn test_schema_add_routes_to_setter() {
        let map = attr_map();
        let value = node("VALUE");
        map.add(value.clone(), false).unwrap();

        assert!(same_node(map.state().value.as_ref().unwrap(), &value));
        assert!(map.dynamic().is_empty());
        assert!(map.contains(&value));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_schema_get_uses_getter() {
        let map = attr_map();
        map.add(node("Value"), false).unwrap();
        map.dynamic().add(node("value2"), false).unwrap();

        let before = GETS.load(Ordering::SeqCst);
        let found = map.get_by_name("value").unwrap();
        assert!(GETS.load(Ordering::SeqCst) > before);
        assert_eq!(found.name().as_str(), "Value");
    }

    #[test]
    fn test_unset_schema_attribute_is_not_found() {
        let map = attr_map();
        assert!(matches!(
            map.get_by_name("value"),
            Err(Error::NodeNotFound { .. })
        ));
        assert!(map.nodes().is_empty());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_schema_attributes_are_permanent() {
        let map = attr_map();
        map.add(node("Value"), false).unwrap();

        assert!(matches!(
            map.remove_by_name("value"),
            Err(Error::SchemaAttribute { .. })
        ));
        assert!(matches!(
            map.remove_by_index(0),
            Err(Error::SchemaAttribute { .. })
        ));
        let value = map.get_by_name("Value").unwrap();
        assert!(matches!(
            map.remove(&value),
            Err(Error::SchemaAttribute { .. })
        ));
    }

    #[test]
    fn test_dynamic_entries_follow_schema() {
        let map = attr_map();
        let extra = node("Extra");
        map.add(extra.clone(), false).unwrap();

        assert_eq!(map.len(), 2);
        assert!(same_node(&map.get_by_index(1).unwrap(), &extra));
        assert!(same_node(&map.get_by_index(-1).unwrap(), &extra));
        assert!(matches!(
            map.get_by_index(2),
            Err(Error::IndexOutOfRange { index: 2, length: 2 })
        ));

        assert!(same_node(&map.remove_by_index(1).unwrap(), &extra));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_duplicate_schema_attribute_rejected() {
        let mut schema = AttrSchema::new().with("Value", get_value, set_value);
        let err = schema
            .add(TypeAttr::new("value", get_value, set_value), false)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateName { .. }));
        schema
            .add(TypeAttr::new("value", get_value, set_value), true)
            .unwrap();
        assert_eq!(schema.len(), 1);
    }
}
