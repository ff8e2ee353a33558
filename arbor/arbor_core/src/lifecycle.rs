//! Lifecycle states and optional node capabilities.
//!
//! A node reaches the lifecycle phases already built and attached. During
//! Init, a node exposing [`InitNode`] is called once all of its children
//! have initialized. During Start, every node exposing [`StartNode`] is
//! called concurrently with every other.

use std::fmt;

use async_trait::async_trait;

use crate::class::registry::ClassRegistry;
use crate::error::Result;
use crate::node::NodeRef;

/// Lifecycle state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeState {
    /// Not yet allocated
    #[default]
    Unallocated,

    /// Allocated, class-initialized and attached
    Allocated,

    /// Children and own post-children initializer completed
    Initialized,

    /// Starter completed
    Started,

    /// Initialization or start failed
    Failed,
}

impl NodeState {
    /// Whether the node can make no further progress
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeState::Started | NodeState::Failed)
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            NodeState::Unallocated => "unallocated",
            NodeState::Allocated => "allocated",
            NodeState::Initialized => "initialized",
            NodeState::Started => "started",
            NodeState::Failed => "failed",
        };
        f.write_str(state)
    }
}

/// What the orchestrator hands to node capabilities.
pub trait LifecycleContext: Send + Sync {
    /// Name of the package the tree runs under
    fn package(&self) -> &str;

    /// Class registry the tree was built from
    fn registry(&self) -> &ClassRegistry;

    /// Lifecycle state of a node as tracked by the orchestrator
    fn state_of(&self, node: &NodeRef) -> NodeState;
}

/// A post-children initializer.
#[async_trait]
pub trait InitNode: Send + Sync {
    /// Initialize the node. All children have initialized successfully.
    async fn init_node(&self, ctx: &dyn LifecycleContext) -> Result<()>;
}

/// A concurrent starter.
#[async_trait]
pub trait StartNode: Send + Sync {
    /// Start the node. No ordering relative to other nodes is given.
    async fn start_node(&self, ctx: &dyn LifecycleContext, root: &NodeRef) -> Result<()>;
}
