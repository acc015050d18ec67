//! Read side of the configuration tree.

use crate::{ConfigNode, TreeError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// All top-level systems with their nested subsystems, in insertion order.
///
/// Serializes as a plain JSON array of systems, the same shape the
/// configuration front-end keeps in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Forest {
    pub(crate) systems: Vec<ConfigNode>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForestStats {
    pub systems: usize,
    pub subsystems: usize,
}

impl Forest {
    /// Build a forest from systems, checking every structural invariant.
    pub fn from_systems(systems: Vec<ConfigNode>) -> Result<Self, TreeError> {
        let forest = Self { systems };
        forest.check_invariants()?;
        Ok(forest)
    }

    pub fn systems(&self) -> &[ConfigNode] {
        &self.systems
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn system(&self, id: &str) -> Option<&ConfigNode> {
        self.systems.iter().find(|s| s.id == id)
    }

    pub(crate) fn system_index(&self, id: &str) -> Option<usize> {
        self.systems.iter().position(|s| s.id == id)
    }

    /// Every subsystem paired with the system holding it.
    pub fn subsystems(&self) -> impl Iterator<Item = (&ConfigNode, &ConfigNode)> {
        self.systems
            .iter()
            .flat_map(|sys| sys.children.iter().map(move |sub| (sys, sub)))
    }

    pub fn subsystem(&self, id: &str) -> Option<&ConfigNode> {
        self.subsystems()
            .find(|(_, sub)| sub.id == id)
            .map(|(_, sub)| sub)
    }

    /// The system currently holding subsystem `id`.
    pub fn locate(&self, id: &str) -> Option<&ConfigNode> {
        self.subsystems()
            .find(|(_, sub)| sub.id == id)
            .map(|(sys, _)| sys)
    }

    /// Whether `id` is used by any node, at either level.
    pub fn contains_id(&self, id: &str) -> bool {
        self.system(id).is_some() || self.subsystem(id).is_some()
    }

    pub fn stats(&self) -> ForestStats {
        ForestStats {
            systems: self.systems.len(),
            subsystems: self.systems.iter().map(|s| s.children.len()).sum(),
        }
    }

    pub fn top_level_ids(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.id.as_str()).collect()
    }

    /// Verify the two-level shape: systems at the top with no parent,
    /// subsystems only as their children pointing back at them, ids unique
    /// across both levels and no empty names.
    pub fn check_invariants(&self) -> Result<(), TreeError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for sys in &self.systems {
            if !sys.is_system() {
                return Err(TreeError::Corrupt(format!(
                    "top-level node '{}' is not a system",
                    sys.id
                )));
            }
            if let Some(pid) = &sys.parent_id {
                return Err(TreeError::Corrupt(format!(
                    "system '{}' has parent '{}'",
                    sys.id, pid
                )));
            }
            check_node(sys, &mut seen)?;
            for sub in &sys.children {
                if !sub.is_subsystem() {
                    return Err(TreeError::Corrupt(format!(
                        "node '{}' under system '{}' is not a subsystem",
                        sub.id, sys.id
                    )));
                }
                if sub.parent_id.as_deref() != Some(sys.id.as_str()) {
                    return Err(TreeError::Corrupt(format!(
                        "subsystem '{}' is held by '{}' but points at {:?}",
                        sub.id, sys.id, sub.parent_id
                    )));
                }
                if !sub.children.is_empty() {
                    return Err(TreeError::Corrupt(format!(
                        "subsystem '{}' has children",
                        sub.id
                    )));
                }
                check_node(sub, &mut seen)?;
            }
        }
        Ok(())
    }
}

fn check_node<'a>(node: &'a ConfigNode, seen: &mut HashSet<&'a str>) -> Result<(), TreeError> {
    if node.name.trim().is_empty() {
        return Err(TreeError::Corrupt(format!("{} '{}' has no name", node.node_type, node.id)));
    }
    if !seen.insert(node.id.as_str()) {
        return Err(TreeError::Corrupt(format!("duplicate id '{}'", node.id)));
    }
    Ok(())
}
