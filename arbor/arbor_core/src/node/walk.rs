//! Tree walking helpers.

use std::collections::VecDeque;

use super::NodeRef;
use crate::error::{Error, Result};

/// Breadth-first iterator over a node and all of its descendants.
pub struct Descendants {
    queue: VecDeque<NodeRef>,
}

impl Iterator for Descendants {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let node = self.queue.pop_front()?;
        if let Some(children) = node.children() {
            self.queue.extend(children.nodes());
        }
        Some(node)
    }
}

/// Iterate `root` and every node below it, breadth first.
pub fn descendants(root: &NodeRef) -> Descendants {
    Descendants {
        queue: VecDeque::from([root.clone()]),
    }
}

/// The first node, breadth first, that satisfies `pred`.
pub fn find_node<P>(root: &NodeRef, mut pred: P) -> Option<NodeRef>
where
    P: FnMut(&NodeRef) -> bool,
{
    descendants(root).find(|node| pred(node))
}

/// Iterate the parents of `node`, nearest first.
pub fn ancestors(node: &NodeRef) -> impl Iterator<Item = NodeRef> {
    std::iter::successors(node.parent(), |parent| parent.parent())
}

/// Names from the root down to `node`, joined with `.`.
pub fn path(node: &NodeRef) -> String {
    let mut names: Vec<String> = ancestors(node).map(|n| n.name().to_string()).collect();
    names.reverse();
    names.push(node.name().to_string());
    names.join(".")
}

/// Follow a `.`-separated path of child names down from `node`.
pub fn child_by_path(node: &NodeRef, child_path: &str) -> Result<NodeRef> {
    let mut current = node.clone();
    for name in child_path.split('.').filter(|s| !s.is_empty()) {
        let not_found = || Error::NodeNotFound {
            parent: Some(path(&current)),
            name: name.to_string(),
        };
        let next = current
            .children()
            .ok_or_else(not_found)?
            .get_by_name(name)
            .map_err(|_| not_found())?;
        current = next;
    }
    Ok(current)
}
