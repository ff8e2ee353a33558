//! Lifecycle Orchestration
//!
//! Drives a built node tree through its two phases.
//!
//! - **Init** runs bottom-up. Every child subtree is initialized as its own
//!   task; a node's post-children initializer runs only after all of its
//!   children's tasks have completed successfully.
//! - **Start** runs flat. Every node exposing a starter is started in its
//!   own task, with no ordering between any two nodes.
//!
//! Both phases let every dispatched task run to completion and report all
//! failures of a level together as one aggregate.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use arbor_core::node::{node_key, walk};
use arbor_core::{
    ClassRegistry, Error, LifecycleContext, NodeRef, NodeState, Result, WeakNodeRef,
};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::aggregate::{ErrorCollector, Unit};

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// A tracked node and its recorded state.
///
/// The weak handle pins the node's allocation, so its address cannot be
/// handed to a different node while the entry exists.
#[derive(Debug)]
struct Tracked {
    node: WeakNodeRef,
    state: NodeState,
}

impl Tracked {
    fn is_live(&self) -> bool {
        self.node.strong_count() > 0
    }
}

/// Lifecycle state of every tracked node, keyed by node identity.
#[derive(Debug, Default)]
pub struct StateTable {
    states: DashMap<usize, Tracked>,
}

impl StateTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the state of `node`
    pub fn set(&self, node: &NodeRef, state: NodeState) {
        self.states.insert(
            node_key(node),
            Tracked {
                node: Arc::downgrade(node),
                state,
            },
        );
    }

    /// The recorded state of `node`. A live node that was never recorded
    /// is reported as [`NodeState::Allocated`].
    pub fn get(&self, node: &NodeRef) -> NodeState {
        self.states
            .get(&node_key(node))
            .filter(|entry| entry.is_live())
            .map(|entry| entry.state)
            .unwrap_or(NodeState::Allocated)
    }

    /// Drop the entries of nodes that no longer exist. Returns how many
    /// were removed.
    pub fn prune(&self) -> usize {
        let before = self.states.len();
        self.states.retain(|_, entry| entry.is_live());
        before - self.states.len()
    }

    /// Number of tracked live nodes
    pub fn len(&self) -> usize {
        self.states.iter().filter(|entry| entry.is_live()).count()
    }

    /// Whether no live node is tracked
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of tracked live nodes in `state`
    pub fn count(&self, state: NodeState) -> usize {
        self.states
            .iter()
            .filter(|entry| entry.is_live() && entry.state == state)
            .count()
    }
}

/// The context handed to node capabilities.
pub struct Context {
    package: String,
    registry: Arc<ClassRegistry>,
    states: Arc<StateTable>,
}

impl Context {
    /// Create a context
    pub fn new(
        package: impl Into<String>,
        registry: Arc<ClassRegistry>,
        states: Arc<StateTable>,
    ) -> Self {
        Self {
            package: package.into(),
            registry,
            states,
        }
    }

    /// The state table shared with the factory
    pub fn states(&self) -> &Arc<StateTable> {
        &self.states
    }
}

impl LifecycleContext for Context {
    fn package(&self) -> &str {
        &self.package
    }

    fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    fn state_of(&self, node: &NodeRef) -> NodeState {
        self.states.get(node)
    }
}

/// Runs the Init and Start phases over a node tree.
pub struct Orchestrator {
    ctx: Arc<Context>,
}

impl Orchestrator {
    /// Create an orchestrator over `ctx`
    pub fn new(ctx: Arc<Context>) -> Self {
        Self { ctx }
    }

    /// The context handed to node capabilities
    pub fn context(&self) -> &Arc<Context> {
        &self.ctx
    }

    /// Lifecycle state of `node`
    pub fn state_of(&self, node: &NodeRef) -> NodeState {
        self.ctx.states.get(node)
    }

    /// Initialize the tree under `root`, bottom-up.
    pub async fn init(&self, root: &NodeRef) -> Result<()> {
        info!("Initializing node tree {}", root.name());

        let pruned = self.ctx.states.prune();
        if pruned > 0 {
            debug!("Pruned {} state entries of dropped nodes", pruned);
        }

        let result = init_subtree(Arc::clone(&self.ctx), Arc::clone(root)).await;
        match &result {
            Ok(()) => info!("Node tree {} initialized", root.name()),
            Err(err) => warn!("Initialization of node tree {} failed: {}", root.name(), err),
        }

        result
    }

    /// Start every node under `root` that exposes a starter, concurrently.
    pub async fn start(&self, root: &NodeRef) -> Result<()> {
        info!("Starting node tree {}", root.name());

        let units: Vec<Unit<()>> = walk::descendants(root)
            .filter(|node| node.as_start().is_some())
            .map(|node| {
                let label = walk::path(&node);
                let handle = tokio::spawn(start_node(
                    Arc::clone(&self.ctx),
                    node,
                    Arc::clone(root),
                ));
                (label, handle)
            })
            .collect();

        debug!("Dispatched {} starters", units.len());

        let mut collector = ErrorCollector::new();
        collector.join(units).await;
        let result = collector.finish();

        match &result {
            Ok(()) => info!("Node tree {} started", root.name()),
            Err(err) => warn!("Start of node tree {} failed: {}", root.name(), err),
        }

        result
    }

    /// Initialize, then start. Start does not begin when Init failed.
    pub async fn run(&self, root: &NodeRef) -> Result<()> {
        self.init(root).await?;
        self.start(root).await
    }
}

fn init_subtree(ctx: Arc<Context>, node: NodeRef) -> BoxFuture<Result<()>> {
    Box::pin(async move {
        let children = node.children().map(|c| c.nodes()).unwrap_or_default();

        let units: Vec<Unit<()>> = children
            .into_iter()
            .map(|child| {
                let label = walk::path(&child);
                (label, tokio::spawn(init_subtree(Arc::clone(&ctx), child)))
            })
            .collect();

        let mut collector = ErrorCollector::new();
        collector.join(units).await;
        if let Err(err) = collector.finish() {
            ctx.states.set(&node, NodeState::Failed);
            return Err(err);
        }

        if let Some(initializer) = node.as_init() {
            debug!("Running initializer of {}", walk::path(&node));
            if let Err(cause) = initializer.init_node(ctx.as_ref()).await {
                ctx.states.set(&node, NodeState::Failed);
                return Err(Error::initialization(walk::path(&node), cause));
            }
        }

        ctx.states.set(&node, NodeState::Initialized);
        Ok(())
    })
}

async fn start_node(ctx: Arc<Context>, node: NodeRef, root: NodeRef) -> Result<()> {
    let result = match node.as_start() {
        Some(starter) => starter.start_node(ctx.as_ref(), &root).await,
        None => Ok(()),
    };

    let state = if result.is_ok() {
        NodeState::Started
    } else {
        NodeState::Failed
    };
    ctx.states.set(&node, state);

    result
}
