//! Saved request store

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::errors::{ReqlabError, Result};
use crate::models::types::HttpRequest;
use crate::storage::{load_or_default, read_lock, save_json, write_lock};

pub struct RequestStore {
    requests: RwLock<Vec<HttpRequest>>,
    path: PathBuf,
}

impl RequestStore {
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join("requests.json");
        let requests = load_or_default(&path)?;
        Ok(Self {
            requests: RwLock::new(requests),
            path,
        })
    }

    /// Replace the request with the same id, or append it.
    pub fn upsert(&self, request: HttpRequest) -> Result<()> {
        let mut requests = write_lock(&self.requests);
        upsert_in(&mut requests, request);
        save_json(&self.path, &*requests)
    }

    pub fn upsert_many(&self, batch: Vec<HttpRequest>) -> Result<()> {
        let mut requests = write_lock(&self.requests);
        for request in batch {
            upsert_in(&mut requests, request);
        }
        save_json(&self.path, &*requests)
    }

    pub fn list(&self) -> Vec<HttpRequest> {
        read_lock(&self.requests).clone()
    }

    pub fn get(&self, id: &str) -> Option<HttpRequest> {
        read_lock(&self.requests).iter().find(|r| r.id == id).cloned()
    }

    /// Requests belonging to a project, in storage order
    pub fn for_project(&self, project_id: &str) -> Vec<HttpRequest> {
        read_lock(&self.requests)
            .iter()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect()
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut requests = write_lock(&self.requests);
        if let Some(pos) = requests.iter().position(|r| r.id == id) {
            requests.remove(pos);
            return save_json(&self.path, &*requests);
        }
        Ok(())
    }

    /// Serialize a project's requests as a pretty JSON array.
    pub fn export_project(&self, project_id: &str) -> Result<String> {
        let requests = self.for_project(project_id);
        serde_json::to_string_pretty(&requests).map_err(Into::into)
    }

    /// Import a JSON array of requests into a project. Every request is
    /// re-tagged with the target project id before storing.
    pub fn import_project(&self, project_id: &str, content: &str) -> Result<usize> {
        let mut imported: Vec<HttpRequest> = serde_json::from_str(content)
            .map_err(|e| ReqlabError::Parse(format!("invalid request export: {e}")))?;
        for request in &mut imported {
            request.project_id = project_id.to_string();
        }
        let count = imported.len();
        self.upsert_many(imported)?;
        Ok(count)
    }
}

fn upsert_in(requests: &mut Vec<HttpRequest>, request: HttpRequest) {
    if let Some(existing) = requests.iter_mut().find(|r| r.id == request.id) {
        *existing = request;
    } else {
        requests.push(request);
    }
}
