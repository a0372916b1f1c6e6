//! Project store

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::Utc;

use crate::errors::Result;
use crate::models::types::Project;
use crate::storage::{load_or_default, read_lock, save_json, write_lock};

pub struct ProjectStore {
    projects: RwLock<Vec<Project>>,
    path: PathBuf,
}

impl ProjectStore {
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join("projects.json");
        let projects = load_or_default(&path)?;
        Ok(Self {
            projects: RwLock::new(projects),
            path,
        })
    }

    pub fn create(&self, mut project: Project) -> Result<()> {
        let mut projects = write_lock(&self.projects);
        let now = Utc::now();
        project.created_at = now;
        project.updated_at = now;
        projects.push(project);
        save_json(&self.path, &*projects)
    }

    /// All projects, most recently updated first
    pub fn list(&self) -> Vec<Project> {
        let projects = read_lock(&self.projects);
        let mut result = projects.clone();
        result.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        result
    }

    pub fn get(&self, id: &str) -> Option<Project> {
        read_lock(&self.projects).iter().find(|p| p.id == id).cloned()
    }

    /// Update in place, preserving the original creation time. Updating an
    /// unknown id is not an error.
    pub fn update(&self, mut project: Project) -> Result<()> {
        let mut projects = write_lock(&self.projects);
        if let Some(existing) = projects.iter_mut().find(|p| p.id == project.id) {
            project.created_at = existing.created_at;
            project.updated_at = Utc::now();
            *existing = project;
            return save_json(&self.path, &*projects);
        }
        Ok(())
    }

    /// Update the project if its id exists, otherwise create it.
    pub fn upsert(&self, project: Project) -> Result<()> {
        let exists = read_lock(&self.projects).iter().any(|p| p.id == project.id);
        if exists {
            self.update(project)
        } else {
            self.create(project)
        }
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut projects = write_lock(&self.projects);
        if let Some(pos) = projects.iter().position(|p| p.id == id) {
            projects.remove(pos);
            return save_json(&self.path, &*projects);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn project(id: &str, name: &str) -> Project {
        Project {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            base_url: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn create_get_update_delete() {
        let dir = tempdir().unwrap();
        let store = ProjectStore::open(dir.path()).unwrap();

        store.create(project("p1", "First")).unwrap();
        let created = store.get("p1").unwrap();

        let mut changed = created.clone();
        changed.name = "Renamed".into();
        store.update(changed).unwrap();

        let updated = store.get("p1").unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        store.delete("p1").unwrap();
        assert!(store.get("p1").is_none());
    }

    #[test]
    fn list_orders_by_most_recently_updated() {
        let dir = tempdir().unwrap();
        let store = ProjectStore::open(dir.path()).unwrap();

        store.create(project("p1", "First")).unwrap();
        store.create(project("p2", "Second")).unwrap();
        let mut first = store.get("p1").unwrap();
        first.description = "touched".into();
        store.update(first).unwrap();

        let names: Vec<_> = store.list().into_iter().map(|p| p.id).collect();
        assert_eq!(names, vec!["p1", "p2"]);
    }
}
