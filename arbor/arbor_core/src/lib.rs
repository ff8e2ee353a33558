//! # Arbor Core
//!
//! `arbor_core` provides the object model of the Arbor runtime: a typed tree
//! of nodes materialized from declarative configuration.
//!
//! ## Core Principles
//!
//! 1. **Classes without inheritance**: every node type is described by a
//!    [`Class`] holding an allocate and an initialize operation plus an
//!    optional base class. Derived behavior is obtained by composition: a
//!    derived initializer explicitly runs its base initializer on the embedded
//!    base part before populating its own fields.
//!
//! 2. **URI-keyed registry**: classes are registered in a [`ClassRegistry`]
//!    under case-insensitive class URIs (`<scheme>:<path>#<Fragment>`).
//!    Unknown URIs can be turned into dynamic classes that inherit the
//!    behavior of the class registered at the same URI with the reserved
//!    fragment `Node`.
//!
//! 3. **Capability queries**: optional node behaviors (post-children
//!    initialization, concurrent start, value access) are exposed through
//!    capability accessors on [`Node`] returning trait objects. A missing capability
//!    is a silent no-op.
//!
//! 4. **Ordered, name-unique children**: child collections are addressable
//!    both by case-insensitive name and by signed position.
//!
//! ## Crate Structure
//!
//! - **error**: the error taxonomy and the aggregate error type
//! - **name** / **uri**: case-insensitive names and class URIs
//! - **class**: class descriptors and the class registry
//! - **node**: the node trait, built-in node types and tree helpers
//! - **collection**: ordered node maps and attribute projections
//! - **definition**: the intermediate definition tree consumed by factories
//! - **lifecycle**: lifecycle states and the optional node capabilities
//! - **value**: self-describing node values

pub mod class;
pub mod collection;
pub mod definition;
pub mod error;
pub mod lifecycle;
pub mod name;
pub mod node;
pub mod uri;
pub mod value;

pub use class::registry::ClassRegistry;
pub use class::{Class, ClassRef, InitArgs};
pub use collection::{NodeAttrMap, NodeCollection, NodeMap, SharedNodeMap};
pub use definition::{DefId, DefinitionDoc, DefinitionTree, NodeDef};
pub use error::{AggregateError, Error, Result};
pub use lifecycle::{InitNode, LifecycleContext, NodeState, StartNode};
pub use name::Name;
pub use node::{Node, NodeRef, ValueNode, WeakNodeRef};
pub use uri::ClassUri;
pub use value::NodeValue;
