//! Subcommands of the Arbor CLI
//!
//! Each command loads a definition document through the runtime's loader
//! dispatch and then goes as far through the pipeline as it needs to.

pub mod check;
pub mod run;
pub mod tree;

use arbor_core::node::walk;
use arbor_core::NodeRef;

/// One line of a node listing: path, class and value when there is one.
pub fn describe_node(node: &NodeRef) -> String {
    let class = node
        .class()
        .map(|class| class.name().to_string())
        .unwrap_or_else(|| "?".to_string());
    let mut line = format!("{} [{}]", walk::path(node), class);

    if let Some(value) = node.as_value().map(|v| v.value()) {
        if !value.is_null() {
            line.push_str(&format!(" = {}", value.to_raw()));
        }
    }

    line
}
