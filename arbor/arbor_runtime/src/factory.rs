//! Node Factory
//!
//! Materializes a node tree from a definition tree. Construction is
//! sequential and fails fast: the first error aborts the whole build and no
//! partial tree is returned.

use std::sync::Arc;

use arbor_core::{
    ClassRef, ClassRegistry, DefinitionTree, Error, InitArgs, NodeDef, NodeRef, NodeState, Result,
};
use tracing::debug;

use crate::lifecycle::StateTable;

/// Builds nodes from definitions, resolving classes through a registry.
pub struct NodeFactory {
    registry: Arc<ClassRegistry>,
    states: Arc<StateTable>,
}

impl NodeFactory {
    /// Create a factory recording built nodes in `states`
    pub fn new(registry: Arc<ClassRegistry>, states: Arc<StateTable>) -> Self {
        Self { registry, states }
    }

    /// The registry classes are resolved from
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    /// Allocate and initialize a single node of `class`.
    ///
    /// On failure the allocated instance is dropped and never returned.
    pub fn instantiate(
        &self,
        class: &ClassRef,
        parent: Option<&NodeRef>,
        def: NodeDef<'_>,
    ) -> Result<NodeRef> {
        let mut node = class
            .alloc(def)
            .map_err(|cause| Error::initialization(def.path(), cause))?;

        class
            .init(node.as_mut(), &InitArgs { class, parent, def })
            .map_err(|cause| Error::initialization(def.path(), cause))?;

        let node: NodeRef = Arc::from(node);
        self.states.set(&node, NodeState::Allocated);
        Ok(node)
    }

    /// Build the node for `def` and, recursively, all of its children.
    ///
    /// Classes that are not registered are created dynamically. Children are
    /// attached in definition order and never overwrite one another.
    pub fn build(&self, parent: Option<&NodeRef>, def: NodeDef<'_>) -> Result<NodeRef> {
        let class = self.registry.resolve_or_create(def.class_uri())?;
        debug!("Building {} as {}", def.path(), class.name());

        let node = self.instantiate(&class, parent, def)?;

        if def.child_count() > 0 {
            let children = node.children().ok_or_else(|| Error::ChildrenUnsupported {
                name: def.path(),
            })?;
            for child_def in def.children() {
                let child = self.build(Some(&node), child_def)?;
                children.add(child, false)?;
            }
        }

        Ok(node)
    }

    /// Build the whole tree from its root definition.
    pub fn build_tree(&self, tree: &DefinitionTree) -> Result<NodeRef> {
        self.build(None, tree.root())
    }
}
