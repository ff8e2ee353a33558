//! The `tree` command

use anyhow::Result;
use arbor_core::node::walk;
use arbor_runtime::Runtime;
use clap::Args;

use super::describe_node;

/// Arguments for the tree command
#[derive(Args)]
pub struct TreeArgs {
    /// Definition document, as a path or a URI
    pub definition: String,
}

/// Build the tree without running it and list every node, breadth first
pub async fn execute_tree(runtime: &Runtime, args: &TreeArgs) -> Result<()> {
    let definitions = runtime.load(&args.definition).await?;
    let root = runtime.build(&definitions)?;

    for node in walk::descendants(&root) {
        println!("{}", describe_node(&node));
    }

    Ok(())
}
