//! The configuration tree store.
//!
//! [`ConfigTree`] owns the canonical forest and is the only way to mutate it.
//! Every mutation is a complete transformation of the forest: a caller holding
//! an earlier [`ConfigTree::snapshot`] keeps seeing the forest as it was, since
//! the root is copied on write whenever a snapshot is outstanding.

use crate::validate::check_shape;
use crate::{ConfigNode, Forest, NodeType, TreeError};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct ConfigTree {
    forest: Arc<Forest>,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing forest after checking its invariants.
    pub fn from_forest(forest: Forest) -> Result<Self, TreeError> {
        forest.check_invariants()?;
        Ok(Self {
            forest: Arc::new(forest),
        })
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// A shared, immutable view of the current forest.
    pub fn snapshot(&self) -> Arc<Forest> {
        Arc::clone(&self.forest)
    }

    fn forest_mut(&mut self) -> &mut Forest {
        Arc::make_mut(&mut self.forest)
    }

    // --- Systems ---

    /// Append an empty system to the end of the top level.
    ///
    /// Id uniqueness and the name are the caller's responsibility
    /// (see [`crate::validate::new_node`]); only the shape is checked here.
    pub fn add_system(&mut self, mut node: ConfigNode) -> Result<(), TreeError> {
        check_shape(&node, NodeType::System)?;
        if !node.children.is_empty() {
            warn!(id = %node.id, "rejected system created with subsystems");
            return Err(TreeError::ValidationFailed(format!(
                "new system '{}' must not carry subsystems",
                node.id
            )));
        }
        node.parent_id = None;
        debug!(id = %node.id, name = %node.name, "add system");
        self.forest_mut().systems.push(node);
        Ok(())
    }

    /// Replace a system's own fields in place. Its current subsystems are
    /// kept; whatever `children` the payload carries is discarded.
    pub fn update_system(&mut self, node: ConfigNode) -> Result<(), TreeError> {
        check_shape(&node, NodeType::System)?;
        let Some(idx) = self.forest.system_index(&node.id) else {
            warn!(id = %node.id, "update of unknown system");
            return Err(TreeError::system_not_found(node.id));
        };
        debug!(id = %node.id, "update system");
        let slot = &mut self.forest_mut().systems[idx];
        let children = std::mem::take(&mut slot.children);
        *slot = ConfigNode {
            parent_id: None,
            children,
            ..node
        };
        Ok(())
    }

    /// Remove a system together with all of its subsystems.
    ///
    /// Returns the removed system, or `None` if no system had this id.
    pub fn delete_system(&mut self, id: &str) -> Option<ConfigNode> {
        let idx = self.forest.system_index(id)?;
        let removed = self.forest_mut().systems.remove(idx);
        debug!(id, subsystems = removed.children.len(), "delete system");
        Some(removed)
    }

    // --- Subsystems ---

    /// Append a subsystem to the children of `parent_id`.
    pub fn add_subsystem(&mut self, mut node: ConfigNode, parent_id: &str) -> Result<(), TreeError> {
        check_shape(&node, NodeType::Subsystem)?;
        let Some(idx) = self.forest.system_index(parent_id) else {
            warn!(id = %node.id, parent_id, "add subsystem to unknown system");
            return Err(TreeError::parent_not_found(parent_id));
        };
        debug!(id = %node.id, parent_id, "add subsystem");
        node.parent_id = Some(parent_id.to_string());
        self.forest_mut().systems[idx].children.push(node);
        Ok(())
    }

    /// Update a subsystem and move it under `new_parent_id`.
    ///
    /// Every copy of the subsystem is removed from every system before the
    /// updated node is appended to the target, so afterwards it is held by
    /// exactly one system. Fails without touching the forest when the target
    /// system or the subsystem does not exist. Returns the id of the system
    /// that held it before.
    pub fn update_subsystem(
        &mut self,
        mut node: ConfigNode,
        new_parent_id: &str,
    ) -> Result<String, TreeError> {
        check_shape(&node, NodeType::Subsystem)?;
        let Some(target) = self.forest.system_index(new_parent_id) else {
            warn!(id = %node.id, new_parent_id, "re-parent to unknown system");
            return Err(TreeError::parent_not_found(new_parent_id));
        };
        let Some(previous) = self.forest.locate(&node.id).map(|s| s.id.clone()) else {
            warn!(id = %node.id, "update of unknown subsystem");
            return Err(TreeError::subsystem_not_found(node.id));
        };

        debug!(id = %node.id, from = %previous, to = new_parent_id, "update subsystem");
        node.parent_id = Some(new_parent_id.to_string());
        let forest = self.forest_mut();
        for sys in &mut forest.systems {
            sys.children.retain(|sub| sub.id != node.id);
        }
        forest.systems[target].children.push(node);
        Ok(previous)
    }

    /// Remove the subsystem with this id from every system.
    ///
    /// Returns the removed node, or `None` when nothing matched, so calling
    /// it twice is harmless.
    pub fn delete_subsystem(&mut self, id: &str) -> Option<ConfigNode> {
        self.forest.locate(id)?;
        let mut removed = None;
        for sys in &mut self.forest_mut().systems {
            if let Some(pos) = sys.children.iter().position(|sub| sub.id == id) {
                let sub = sys.children.remove(pos);
                sys.children.retain(|sub| sub.id != id);
                removed.get_or_insert(sub);
            }
        }
        debug!(id, "delete subsystem");
        removed
    }
}
