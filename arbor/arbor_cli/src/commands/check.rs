//! The `check` command

use std::collections::BTreeMap;

use anyhow::Result;
use arbor_core::node::walk;
use arbor_runtime::Runtime;
use clap::Args;
use serde::Serialize;

/// Arguments for the check command
#[derive(Args)]
pub struct CheckArgs {
    /// Definition document, as a path or a URI
    pub definition: String,

    /// Print the summary as JSON
    #[clap(long)]
    pub json: bool,
}

/// What a successful check found
#[derive(Debug, Serialize)]
pub struct CheckSummary {
    pub root: String,
    pub definitions: usize,
    pub nodes: usize,
    /// Node count per class name
    pub classes: BTreeMap<String, usize>,
}

/// Load and build the tree, reporting what was built. No lifecycle phase
/// runs.
pub async fn execute_check(runtime: &Runtime, args: &CheckArgs) -> Result<()> {
    let definitions = runtime.load(&args.definition).await?;
    let root = runtime.build(&definitions)?;

    let mut summary = CheckSummary {
        root: root.name().to_string(),
        definitions: definitions.len(),
        nodes: 0,
        classes: BTreeMap::new(),
    };
    for node in walk::descendants(&root) {
        summary.nodes += 1;
        if let Some(class) = node.class() {
            *summary.classes.entry(class.name().to_string()).or_default() += 1;
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{}: OK ({} nodes from {} definitions)",
            summary.root, summary.nodes, summary.definitions
        );
        for (class, count) in &summary.classes {
            println!("  {}: {}", class, count);
        }
    }

    Ok(())
}
