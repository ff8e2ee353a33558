//! The `run` command

use anyhow::Result;
use arbor_core::node::walk;
use arbor_core::NodeState;
use arbor_runtime::Runtime;
use clap::Args;
use tracing::info;

use super::describe_node;

/// Arguments for the run command
#[derive(Args)]
pub struct RunArgs {
    /// Definition document, as a path or a URI
    pub definition: String,

    /// List every node with its lifecycle state once the tree is running
    #[clap(long)]
    pub verbose: bool,
}

/// Load, build, initialize and start a node tree
pub async fn execute_run(runtime: &Runtime, args: &RunArgs) -> Result<()> {
    let root = runtime.load_and_run(&args.definition).await?;

    let orchestrator = runtime.orchestrator();
    let nodes: Vec<_> = walk::descendants(&root).collect();
    let started = nodes
        .iter()
        .filter(|node| orchestrator.state_of(node) == NodeState::Started)
        .count();
    info!("{} nodes running, {} started", nodes.len(), started);

    if args.verbose {
        for node in &nodes {
            println!("{} ({})", describe_node(node), orchestrator.state_of(node));
        }
    }
    println!("{}: running ({} nodes)", root.name(), nodes.len());

    Ok(())
}
