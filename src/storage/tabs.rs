//! Editor tab state store

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::errors::Result;
use crate::models::types::TabState;
use crate::storage::{load_or_default, read_lock, save_json, write_lock};

pub struct TabStore {
    tabs: RwLock<Vec<TabState>>,
    path: PathBuf,
}

impl TabStore {
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join("tabs.json");
        let tabs = load_or_default(&path)?;
        Ok(Self {
            tabs: RwLock::new(tabs),
            path,
        })
    }

    pub fn list(&self) -> Vec<TabState> {
        read_lock(&self.tabs).clone()
    }

    /// Replace the whole tab set.
    pub fn replace(&self, tabs: Vec<TabState>) -> Result<()> {
        let mut current = write_lock(&self.tabs);
        *current = tabs;
        save_json(&self.path, &*current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn replace_overwrites_previous_set() {
        let dir = tempdir().unwrap();
        let store = TabStore::open(dir.path()).unwrap();

        store
            .replace(vec![TabState {
                id: "t1".into(),
                title: "First".into(),
                is_active: true,
                ..Default::default()
            }])
            .unwrap();
        store
            .replace(vec![
                TabState {
                    id: "t2".into(),
                    title: "Second".into(),
                    ..Default::default()
                },
                TabState {
                    id: "t3".into(),
                    title: "Third".into(),
                    is_active: true,
                    ..Default::default()
                },
            ])
            .unwrap();

        let tabs = store.list();
        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs[0].id, "t2");
        assert!(tabs[1].is_active);
    }
}
