//! Arbor Runtime - builds and runs Arbor node trees
//!
//! This crate turns definition documents into live node trees and drives
//! them through their lifecycle: loader dispatch, node construction and the
//! concurrent Init and Start phases.

pub mod aggregate;
pub mod config;
pub mod factory;
pub mod lifecycle;
pub mod loader;
pub mod logging;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use arbor_core::{ClassRegistry, DefinitionTree, NodeRef};
use tracing::info;

use crate::config::RuntimeConfig;
use crate::factory::NodeFactory;
use crate::lifecycle::{Context, Orchestrator, StateTable};
use crate::loader::{parse_location, LoaderRegistry};

/// Runtime facade that provides a unified interface to the Arbor runtime.
pub struct Runtime {
    /// Runtime configuration
    config: RuntimeConfig,

    /// Loader dispatch for definition documents
    loaders: Arc<LoaderRegistry>,

    /// Factory materializing definition trees
    factory: NodeFactory,

    /// Lifecycle orchestrator
    orchestrator: Orchestrator,
}

impl Runtime {
    /// Create a runtime with its own registry holding the built-in classes
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        Self::with_registry(config, Arc::new(ClassRegistry::with_builtins()))
    }

    /// Create a runtime resolving classes through `registry`
    pub fn with_registry(config: RuntimeConfig, registry: Arc<ClassRegistry>) -> Result<Self> {
        info!("Initializing Arbor Runtime for package {}", config.package);

        config.validate()?;

        let loaders = Arc::new(LoaderRegistry::with_file_loaders(
            config.loaders.json,
            config.loaders.toml,
        ));
        let states = Arc::new(StateTable::new());
        let factory = NodeFactory::new(Arc::clone(&registry), Arc::clone(&states));
        let ctx = Arc::new(Context::new(config.package.clone(), registry, states));
        let orchestrator = Orchestrator::new(ctx);

        Ok(Self {
            config,
            loaders,
            factory,
            orchestrator,
        })
    }

    /// The runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The class registry
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        self.factory.registry()
    }

    /// The loader registry; custom loaders can be registered here
    pub fn loaders(&self) -> &Arc<LoaderRegistry> {
        &self.loaders
    }

    /// The lifecycle orchestrator
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Load the definition tree at `location`, a URI or a filesystem path
    pub async fn load(&self, location: &str) -> Result<DefinitionTree> {
        let uri = parse_location(location)
            .with_context(|| format!("Invalid definition location: {}", location))?;
        info!("Loading definitions from {}", uri);

        self.loaders
            .load(&uri)
            .await
            .with_context(|| format!("Failed to load definitions from {}", uri))
    }

    /// Build the node tree for `tree`
    pub fn build(&self, tree: &DefinitionTree) -> Result<NodeRef> {
        let root = self
            .factory
            .build_tree(tree)
            .with_context(|| format!("Failed to build node tree {}", tree.root().name()))?;
        info!("Built node tree {} ({} definitions)", root.name(), tree.len());
        Ok(root)
    }

    /// Initialize and start the tree under `root`
    pub async fn run(&self, root: &NodeRef) -> Result<()> {
        self.orchestrator
            .run(root)
            .await
            .with_context(|| format!("Failed to run node tree {}", root.name()))
    }

    /// Load, build and run the definitions at `location`
    pub async fn load_and_run(&self, location: &str) -> Result<NodeRef> {
        let tree = self.load(location).await?;
        let root = self.build(&tree)?;
        self.run(&root).await?;
        Ok(root)
    }
}
