//! Environment store
//!
//! Environments and the active-environment selection persist together in
//! one document, matching the shape other tools export.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::models::types::Environment;
use crate::storage::{load_or_default, read_lock, save_json, write_lock};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvironmentData {
    #[serde(default)]
    environments: Vec<Environment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    active_environment_id: Option<String>,
}

pub struct EnvironmentStore {
    data: RwLock<EnvironmentData>,
    path: PathBuf,
}

impl EnvironmentStore {
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join("environments.json");
        let data = load_or_default(&path)?;
        Ok(Self {
            data: RwLock::new(data),
            path,
        })
    }

    pub fn list(&self) -> Vec<Environment> {
        read_lock(&self.data).environments.clone()
    }

    pub fn get(&self, id: &str) -> Option<Environment> {
        read_lock(&self.data)
            .environments
            .iter()
            .find(|e| e.id == id)
            .cloned()
    }

    /// Insert or replace by id.
    pub fn save(&self, environment: Environment) -> Result<()> {
        let mut data = write_lock(&self.data);
        if let Some(existing) = data
            .environments
            .iter_mut()
            .find(|e| e.id == environment.id)
        {
            *existing = environment;
        } else {
            data.environments.push(environment);
        }
        save_json(&self.path, &*data)
    }

    /// Delete by id; clears the active selection when it pointed at the
    /// deleted environment.
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut data = write_lock(&self.data);
        if let Some(pos) = data.environments.iter().position(|e| e.id == id) {
            data.environments.remove(pos);
            if data.active_environment_id.as_deref() == Some(id) {
                data.active_environment_id = None;
            }
            return save_json(&self.path, &*data);
        }
        Ok(())
    }

    pub fn active_id(&self) -> Option<String> {
        read_lock(&self.data).active_environment_id.clone()
    }

    /// Set the active environment; `None` clears the selection.
    pub fn set_active(&self, id: Option<&str>) -> Result<()> {
        let mut data = write_lock(&self.data);
        data.active_environment_id = id.map(str::to_string);
        save_json(&self.path, &*data)
    }

    /// The currently selected environment, if the selection still resolves.
    pub fn active_environment(&self) -> Option<Environment> {
        let data = read_lock(&self.data);
        let id = data.active_environment_id.as_deref()?;
        data.environments.iter().find(|e| e.id == id).cloned()
    }
}
