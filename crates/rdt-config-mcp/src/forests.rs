//! Tool operations over named forests on disk.
//!
//! Each operation loads the forest, applies one store operation and writes it
//! back, so a tool call is a single complete transformation of the file.
//! Tool calls run concurrently; the load-mutate-write cycle is serialized by
//! one lock shared by every clone of [`Forests`].

use crate::requests::{
    non_empty, AddSubsystemRequest, AddSystemRequest, DeleteForestRequest, ForestRequest,
    ListSubsystemsRequest, ListSystemsRequest, NodeRequest, SeedRequest, UpdateSubsystemRequest,
    UpdateSystemRequest,
};
use rdt_config_core::query::{self, ListQuery, SubsystemRow};
use rdt_config_core::{
    next_subsystem_id, next_system_id, seed, validate, ConfigNode, ConfigTree, Forest, NodeType,
    Settings, Storage, TreeError,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Forests {
    storage: Storage,
    settings: Settings,
    lock: Arc<Mutex<()>>,
}

impl Forests {
    pub fn new(storage: Storage, settings: Settings) -> Self {
        Self {
            storage,
            settings,
            lock: Arc::default(),
        }
    }

    /// Held for the whole of an operation that loads or writes a forest.
    /// The guarded data is `()`, so a panic in another holder leaves nothing
    /// half-updated and a poisoned lock is simply taken over.
    fn exclusive(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    fn forest_name(&self, requested: Option<String>) -> String {
        requested
            .and_then(non_empty)
            .unwrap_or_else(|| self.settings.default_forest.clone())
    }

    /// Load a forest, creating it on first use.
    fn load(&self, name: &str) -> Result<ConfigTree, TreeError> {
        if self.storage.exists(name) {
            return ConfigTree::from_forest(self.storage.read_forest(name)?);
        }
        let forest = if self.settings.seed_demo_data {
            seed::demo_forest()
        } else {
            Forest::default()
        };
        self.storage.write_forest(name, &forest)?;
        info!(forest = name, seeded = self.settings.seed_demo_data, "created forest");
        ConfigTree::from_forest(forest)
    }

    fn save(&self, name: &str, tree: &ConfigTree) -> Result<(), TreeError> {
        self.storage.write_forest(name, tree.forest())
    }

    // --- Reads ---

    pub fn list_forests(&self) -> Result<Value, TreeError> {
        let names = self.storage.list_forests()?;
        Ok(json!({ "forests": names }))
    }

    pub fn get_forest(&self, req: ForestRequest) -> Result<Value, TreeError> {
        let _guard = self.exclusive();
        let name = self.forest_name(req.forest);
        let tree = self.load(&name)?;
        Ok(json!({
            "forest": name,
            "stats": tree.forest().stats(),
            "systems": tree.forest(),
        }))
    }

    pub fn check_forest(&self, req: ForestRequest) -> Result<Value, TreeError> {
        let name = self.forest_name(req.forest);
        let forest = self.storage.read_forest(&name)?;
        Ok(json!({ "forest": name, "ok": true, "stats": forest.stats() }))
    }

    pub fn get_system(&self, req: NodeRequest) -> Result<Value, TreeError> {
        let _guard = self.exclusive();
        let tree = self.load(&self.forest_name(req.forest))?;
        let sys = tree
            .forest()
            .system(&req.id)
            .ok_or_else(|| TreeError::system_not_found(&req.id))?;
        Ok(serde_json::to_value(sys)?)
    }

    pub fn get_subsystem(&self, req: NodeRequest) -> Result<Value, TreeError> {
        let _guard = self.exclusive();
        let tree = self.load(&self.forest_name(req.forest))?;
        Ok(serde_json::to_value(subsystem_row(tree.forest(), &req.id)?)?)
    }

    pub fn list_systems(&self, req: ListSystemsRequest) -> Result<Value, TreeError> {
        let _guard = self.exclusive();
        let tree = self.load(&self.forest_name(req.forest))?;
        let q = list_query(req.keyword, req.page, req.size);
        Ok(serde_json::to_value(query::list_systems(tree.forest(), &q))?)
    }

    pub fn list_subsystems(&self, req: ListSubsystemsRequest) -> Result<Value, TreeError> {
        let _guard = self.exclusive();
        let tree = self.load(&self.forest_name(req.forest))?;
        let q = list_query(req.keyword, req.page, req.size);
        let page = query::list_subsystems(tree.forest(), req.system_id.as_deref(), &q)?;
        Ok(serde_json::to_value(page)?)
    }

    // --- Systems ---

    pub fn add_system(&self, req: AddSystemRequest) -> Result<Value, TreeError> {
        let _guard = self.exclusive();
        let name = self.forest_name(req.forest);
        let mut tree = self.load(&name)?;
        let id = req
            .id
            .and_then(non_empty)
            .unwrap_or_else(|| next_system_id(tree.forest()));
        let mut node = ConfigNode::system(id, req.name);
        node.description = req.description.and_then(non_empty);
        let node = validate::new_node(tree.forest(), node, NodeType::System)?;
        let id = node.id.clone();
        tree.add_system(node)?;
        self.save(&name, &tree)?;
        info!(forest = %name, id = %id, "added system");
        Ok(serde_json::to_value(tree.forest().system(&id))?)
    }

    pub fn update_system(&self, req: UpdateSystemRequest) -> Result<Value, TreeError> {
        let _guard = self.exclusive();
        let name = self.forest_name(req.forest);
        let mut tree = self.load(&name)?;
        let mut node = tree
            .forest()
            .system(&req.id)
            .cloned()
            .ok_or_else(|| TreeError::system_not_found(&req.id))?;
        node.children.clear();
        if let Some(new_name) = req.name {
            node.name = new_name;
        }
        if let Some(desc) = req.description {
            node.description = non_empty(desc);
        }
        let node = validate::edited_node(node, NodeType::System)?;
        tree.update_system(node)?;
        self.save(&name, &tree)?;
        info!(forest = %name, id = %req.id, "updated system");
        Ok(serde_json::to_value(tree.forest().system(&req.id))?)
    }

    pub fn delete_system(&self, req: NodeRequest) -> Result<Value, TreeError> {
        let _guard = self.exclusive();
        let name = self.forest_name(req.forest);
        let mut tree = self.load(&name)?;
        let removed = tree.delete_system(&req.id);
        if removed.is_some() {
            self.save(&name, &tree)?;
            info!(forest = %name, id = %req.id, "deleted system");
        }
        Ok(json!({
            "id": req.id,
            "deleted": removed.is_some(),
            "subsystemsRemoved": removed.map_or(0, |s| s.children.len()),
        }))
    }

    // --- Subsystems ---

    pub fn add_subsystem(&self, req: AddSubsystemRequest) -> Result<Value, TreeError> {
        let _guard = self.exclusive();
        let name = self.forest_name(req.forest);
        let mut tree = self.load(&name)?;
        let id = req
            .id
            .and_then(non_empty)
            .unwrap_or_else(|| next_subsystem_id(tree.forest()));
        let mut node = ConfigNode::subsystem(id, req.parent_id.clone(), req.name);
        req.fields.apply(&mut node);
        let node = validate::new_node(tree.forest(), node, NodeType::Subsystem)?;
        let id = node.id.clone();
        tree.add_subsystem(node, &req.parent_id)?;
        self.save(&name, &tree)?;
        info!(forest = %name, id = %id, parent_id = %req.parent_id, "added subsystem");
        Ok(serde_json::to_value(subsystem_row(tree.forest(), &id)?)?)
    }

    pub fn update_subsystem(&self, req: UpdateSubsystemRequest) -> Result<Value, TreeError> {
        let _guard = self.exclusive();
        let name = self.forest_name(req.forest);
        let mut tree = self.load(&name)?;
        let mut node = tree
            .forest()
            .subsystem(&req.id)
            .cloned()
            .ok_or_else(|| TreeError::subsystem_not_found(&req.id))?;
        let target = match req.parent_id.and_then(non_empty) {
            Some(target) => target,
            None => node.parent_id.clone().ok_or_else(|| {
                TreeError::Corrupt(format!("subsystem '{}' has no parent", req.id))
            })?,
        };
        if let Some(new_name) = req.name {
            node.name = new_name;
        }
        req.fields.apply(&mut node);
        let node = validate::edited_node(node, NodeType::Subsystem)?;
        let previous = tree.update_subsystem(node, &target)?;
        self.save(&name, &tree)?;
        info!(forest = %name, id = %req.id, from = %previous, to = %target, "updated subsystem");
        Ok(json!({
            "previousParentId": previous,
            "subsystem": subsystem_row(tree.forest(), &req.id)?,
        }))
    }

    pub fn delete_subsystem(&self, req: NodeRequest) -> Result<Value, TreeError> {
        let _guard = self.exclusive();
        let name = self.forest_name(req.forest);
        let mut tree = self.load(&name)?;
        let removed = tree.delete_subsystem(&req.id);
        if let Some(sub) = &removed {
            self.save(&name, &tree)?;
            info!(forest = %name, id = %req.id, parent_id = ?sub.parent_id, "deleted subsystem");
        }
        Ok(json!({ "id": req.id, "deleted": removed.is_some() }))
    }

    // --- Maintenance ---

    pub fn seed_forest(&self, req: SeedRequest) -> Result<Value, TreeError> {
        let _guard = self.exclusive();
        let name = self.forest_name(req.forest);
        if self.storage.exists(&name) && !req.overwrite.unwrap_or(false) {
            return Err(TreeError::ValidationFailed(format!(
                "forest '{}' already exists; pass overwrite to replace it",
                name
            )));
        }
        let forest = seed::demo_forest();
        self.storage.write_forest(&name, &forest)?;
        info!(forest = %name, "seeded forest");
        Ok(json!({ "forest": name, "stats": forest.stats() }))
    }

    pub fn delete_forest(&self, req: DeleteForestRequest) -> Result<Value, TreeError> {
        let _guard = self.exclusive();
        let deleted = self.storage.delete_forest(&req.forest)?;
        if deleted {
            info!(forest = %req.forest, "deleted forest");
        }
        Ok(json!({ "forest": req.forest, "deleted": deleted }))
    }
}

fn list_query(keyword: Option<String>, page: Option<usize>, size: Option<usize>) -> ListQuery {
    ListQuery {
        keyword,
        page: page.unwrap_or(1),
        size: size.unwrap_or(0),
    }
}

fn subsystem_row(forest: &Forest, id: &str) -> Result<SubsystemRow, TreeError> {
    forest
        .subsystems()
        .find(|(_, sub)| sub.id == id)
        .map(|(sys, sub)| SubsystemRow {
            node: sub.clone(),
            parent_name: sys.name.clone(),
        })
        .ok_or_else(|| TreeError::subsystem_not_found(id))
}
