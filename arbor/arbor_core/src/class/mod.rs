//! Class descriptors.
//!
//! A [`Class`] describes a node type: its name, its optional base class and
//! the two operations used to materialize instances. `alloc` produces an
//! empty instance shape for a definition; `init` populates it given the
//! parent node and the definition.
//!
//! There is no language-level inheritance between node types. A derived
//! class's initializer runs its base initializer against the embedded base
//! part of the node (see [`crate::node::basic::init_basic_node`]), so the
//! chain of initializers is always explicit.

pub mod registry;

use std::fmt;
use std::sync::Arc;

use crate::definition::NodeDef;
use crate::error::Result;
use crate::name::Name;
use crate::node::{Node, NodeRef};

/// Shared handle to a registered class.
pub type ClassRef = Arc<Class>;

/// Allocates an empty node for a definition.
pub type AllocFn = Arc<dyn Fn(NodeDef<'_>) -> Result<Box<dyn Node>> + Send + Sync>;

/// Populates an allocated node.
pub type InitFn = Arc<dyn Fn(&mut dyn Node, &InitArgs<'_>) -> Result<()> + Send + Sync>;

/// Arguments handed to a class initializer.
#[derive(Clone, Copy)]
pub struct InitArgs<'a> {
    /// The class the node is being created as
    pub class: &'a ClassRef,

    /// The node the new node will be attached under, `None` for a root
    pub parent: Option<&'a NodeRef>,

    /// The definition the node is created from
    pub def: NodeDef<'a>,
}

/// A named node type with an optional base.
pub struct Class {
    name: Name,
    base: Option<ClassRef>,
    alloc: AllocFn,
    init: InitFn,
}

impl Class {
    /// Create a class from its allocate and initialize operations.
    pub fn new<A, I>(name: impl Into<Name>, base: Option<ClassRef>, alloc: A, init: I) -> Self
    where
        A: Fn(NodeDef<'_>) -> Result<Box<dyn Node>> + Send + Sync + 'static,
        I: Fn(&mut dyn Node, &InitArgs<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            base,
            alloc: Arc::new(alloc),
            init: Arc::new(init),
        }
    }

    /// Create a class that reuses `base`'s allocate and initialize
    /// operations unchanged.
    pub fn derive(name: impl Into<Name>, base: &ClassRef) -> Self {
        Self {
            name: name.into(),
            base: Some(Arc::clone(base)),
            alloc: Arc::clone(&base.alloc),
            init: Arc::clone(&base.init),
        }
    }

    /// The class name
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The direct base class. Only the root class has none.
    pub fn base(&self) -> Option<&ClassRef> {
        self.base.as_ref()
    }

    /// Whether this is a root class
    pub fn is_root(&self) -> bool {
        self.base.is_none()
    }

    /// Allocate an empty node for `def`.
    pub fn alloc(&self, def: NodeDef<'_>) -> Result<Box<dyn Node>> {
        (self.alloc)(def)
    }

    /// Populate an allocated node.
    pub fn init(&self, node: &mut dyn Node, args: &InitArgs<'_>) -> Result<()> {
        (self.init)(node, args)
    }

    /// Iterate the base chain, starting at the direct base.
    pub fn ancestors(&self) -> impl Iterator<Item = &ClassRef> + '_ {
        std::iter::successors(self.base.as_ref(), |class| class.base.as_ref())
    }

    /// Whether `other` is this class or one of its ancestors.
    pub fn is_subclass_of(&self, other: &ClassRef) -> bool {
        std::ptr::eq(self, Arc::as_ptr(other)) || self.ancestors().any(|c| Arc::ptr_eq(c, other))
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("base", &self.base.as_ref().map(|b| b.name().clone()))
            .finish()
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
