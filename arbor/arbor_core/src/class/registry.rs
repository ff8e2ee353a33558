//! Class Registry
//!
//! Maps case-insensitive class URIs to classes. Entries are only ever added.
//! Lookups take a shared lock and may run concurrently; registrations,
//! including dynamic class creation, take the exclusive lock.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::{Class, ClassRef};
use crate::error::{Error, Result};
use crate::node::basic::{alloc_basic_node, init_basic_node};
use crate::node::property::{alloc_property_node, init_property_node};
use crate::node::string::{alloc_string_node, init_string_node};
use crate::uri::ClassUri;

/// URI of the root class every other class derives from.
pub const ROOT_CLASS_URI: &str = "import:nodes#Node";

/// URI of the built-in scalar string class.
pub const STRING_CLASS_URI: &str = "import:nodes#String";

/// URI of the built-in property class.
pub const PROPERTY_CLASS_URI: &str = "import:nodes#Property";

static GLOBAL: Lazy<Arc<ClassRegistry>> = Lazy::new(|| Arc::new(ClassRegistry::with_builtins()));

/// The process-wide registry, populated with the built-in classes on first
/// use.
pub fn global() -> Arc<ClassRegistry> {
    Arc::clone(&GLOBAL)
}

/// The class registry manages class registration and resolution
pub struct ClassRegistry {
    /// Map of lower-cased URIs to classes
    classes: RwLock<HashMap<String, ClassRef>>,

    /// Fallback base for dynamic classes
    root: ClassRef,
}

impl ClassRegistry {
    /// Create a registry holding only the root class.
    pub fn new() -> Self {
        let root = Arc::new(Class::new(
            "Node",
            None,
            alloc_basic_node,
            init_basic_node,
        ));
        let mut classes = HashMap::new();
        classes.insert(ROOT_CLASS_URI.to_lowercase(), Arc::clone(&root));

        Self {
            classes: RwLock::new(classes),
            root,
        }
    }

    /// Create a registry holding the root class and the built-in node
    /// classes.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        let root = Arc::clone(registry.root());

        registry.must_register(
            STRING_CLASS_URI,
            Arc::new(Class::new(
                "String",
                Some(Arc::clone(&root)),
                alloc_string_node,
                init_string_node,
            )),
        );
        registry.must_register(
            PROPERTY_CLASS_URI,
            Arc::new(Class::new(
                "Property",
                Some(root),
                alloc_property_node,
                init_property_node,
            )),
        );

        registry
    }

    /// The root class
    pub fn root(&self) -> &ClassRef {
        &self.root
    }

    /// Register a class under `uri`.
    pub fn register(&self, uri: &ClassUri, class: ClassRef) -> Result<()> {
        let mut classes = self.classes.write();
        Self::insert(&mut classes, uri, class)
    }

    /// Register a class under a URI given as a string.
    pub fn register_str(&self, uri: &str, class: ClassRef) -> Result<ClassRef> {
        let parsed = ClassUri::parse(uri)?;
        self.register(&parsed, Arc::clone(&class))?;
        Ok(class)
    }

    /// Register a class at a call site that must succeed at startup.
    ///
    /// # Panics
    ///
    /// Panics if the URI does not parse or is already registered.
    pub fn must_register(&self, uri: &str, class: ClassRef) -> ClassRef {
        match self.register_str(uri, class) {
            Ok(class) => class,
            Err(err) => panic!("failed to register built-in class {uri}: {err}"),
        }
    }

    /// Resolve the class registered under `uri`.
    pub fn resolve(&self, uri: &ClassUri) -> Result<ClassRef> {
        self.classes
            .read()
            .get(uri.key())
            .cloned()
            .ok_or_else(|| Error::ClassNotFound {
                uri: uri.to_string(),
            })
    }

    /// Check whether a class is registered under `uri`
    pub fn contains(&self, uri: &ClassUri) -> bool {
        self.classes.read().contains_key(uri.key())
    }

    /// Number of registered URIs
    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    /// Whether the registry is empty (never true: the root is always present)
    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }

    /// The class registered at `uri` with its fragment replaced by `Node`,
    /// or the root class if there is none.
    pub fn base_class_for(&self, uri: &ClassUri) -> ClassRef {
        let classes = self.classes.read();
        self.base_in(&classes, uri)
    }

    /// Create, register and return a dynamic class for `uri`.
    ///
    /// The class is named after the URI fragment and inherits the allocate
    /// and initialize operations of its base unchanged.
    pub fn create_dynamic(&self, uri: &ClassUri) -> Result<ClassRef> {
        let mut classes = self.classes.write();
        if classes.contains_key(uri.key()) {
            return Err(Error::DuplicateClass {
                uri: uri.to_string(),
            });
        }

        debug!("Creating dynamic class for URI: {}", uri);
        let base = self.base_in(&classes, uri);
        let class = Arc::new(Class::derive(uri.fragment(), &base));
        Self::insert(&mut classes, uri, Arc::clone(&class))?;

        Ok(class)
    }

    /// Resolve `uri`, creating a dynamic class when nothing is registered.
    pub fn resolve_or_create(&self, uri: &ClassUri) -> Result<ClassRef> {
        match self.resolve(uri) {
            Ok(class) => Ok(class),
            Err(err) if err.is_class_not_found() => match self.create_dynamic(uri) {
                Ok(class) => Ok(class),
                // Lost a race against another creator of the same class
                Err(Error::DuplicateClass { .. }) => self.resolve(uri),
                Err(err) => Err(err),
            },
            Err(err) => Err(err),
        }
    }

    fn base_in(&self, classes: &HashMap<String, ClassRef>, uri: &ClassUri) -> ClassRef {
        let base_uri = uri.base_uri();
        match classes.get(base_uri.key()) {
            Some(base) => Arc::clone(base),
            None => {
                info!(
                    "No base class registered at {}, falling back to {}",
                    base_uri,
                    self.root.name()
                );
                Arc::clone(&self.root)
            }
        }
    }

    fn insert(
        classes: &mut HashMap<String, ClassRef>,
        uri: &ClassUri,
        class: ClassRef,
    ) -> Result<()> {
        if classes.contains_key(uri.key()) {
            return Err(Error::DuplicateClass {
                uri: uri.to_string(),
            });
        }

        debug!("Registered class {} under URI {}", class.name(), uri);
        classes.insert(uri.key().to_string(), class);

        Ok(())
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}
