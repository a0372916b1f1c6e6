//! Execution history with content-based deduplication
//!
//! Holds at most one entry per distinct request shape (method + URL +
//! enabled headers + enabled params + body), most recent first, capped at
//! [`HISTORY_CAP`] entries.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::Utc;

use crate::errors::Result;
use crate::models::types::HistoryRecord;
use crate::storage::{load_or_default, read_lock, save_json, write_lock};

pub const HISTORY_CAP: usize = 100;

pub struct HistoryStore {
    records: RwLock<Vec<HistoryRecord>>,
    path: PathBuf,
}

impl HistoryStore {
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join("history.json");
        let records = load_or_default(&path)?;
        Ok(Self {
            records: RwLock::new(records),
            path,
        })
    }

    /// Insert a record: stamps the timestamp, drops any existing entry with
    /// content-equal request, prepends, and truncates to the cap.
    pub fn add(&self, mut record: HistoryRecord) -> Result<()> {
        let mut records = write_lock(&self.records);
        if let Some(pos) = records
            .iter()
            .position(|existing| existing.request.content_eq(&record.request))
        {
            records.remove(pos);
        }
        record.timestamp = Utc::now();
        records.insert(0, record);
        records.truncate(HISTORY_CAP);
        save_json(&self.path, &*records)
    }

    /// Most recent `limit` records; zero means all.
    pub fn list(&self, limit: usize) -> Vec<HistoryRecord> {
        let records = read_lock(&self.records);
        let limit = if limit == 0 || limit > records.len() {
            records.len()
        } else {
            limit
        };
        records[..limit].to_vec()
    }

    /// Case-insensitive substring match over URL, name, and method.
    pub fn search(&self, query: &str) -> Vec<HistoryRecord> {
        if query.is_empty() {
            return self.list(HISTORY_CAP);
        }
        let needle = query.to_lowercase();
        let records = read_lock(&self.records);
        records
            .iter()
            .filter(|record| {
                record.request.url.to_lowercase().contains(&needle)
                    || record.request.name.to_lowercase().contains(&needle)
                    || record.request.method.as_str().to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Delete by id; deleting an unknown id is not an error.
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut records = write_lock(&self.records);
        if let Some(pos) = records.iter().position(|record| record.id == id) {
            records.remove(pos);
            return save_json(&self.path, &*records);
        }
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        let mut records = write_lock(&self.records);
        records.clear();
        save_json(&self.path, &*records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::{HttpMethod, HttpRequest, HttpResponse, KeyValue};
    use tempfile::tempdir;

    fn record(url: &str, status: u16) -> HistoryRecord {
        HistoryRecord {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            request: HttpRequest {
                method: HttpMethod::GET,
                url: url.into(),
                ..Default::default()
            },
            response: HttpResponse {
                status,
                ..Default::default()
            },
        }
    }

    #[test]
    fn dedup_keeps_one_entry_with_newer_response() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path()).unwrap();

        store.add(record("https://example.com/a", 200)).unwrap();
        store.add(record("https://example.com/b", 200)).unwrap();
        store.add(record("https://example.com/a", 404)).unwrap();

        let records = store.list(0);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].request.url, "https://example.com/a");
        assert_eq!(records[0].response.status, 404);
        assert_eq!(records[1].request.url, "https://example.com/b");
    }

    #[test]
    fn dedup_respects_enabled_entries_only() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path()).unwrap();

        let mut first = record("https://example.com/a", 200);
        first.request.headers.push(KeyValue::new("X-Trace", "1", false));
        let second = record("https://example.com/a", 201);

        store.add(first).unwrap();
        store.add(second).unwrap();
        assert_eq!(store.list(0).len(), 1);
    }

    #[test]
    fn retention_caps_at_one_hundred_newest_first() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path()).unwrap();

        for i in 0..105 {
            store.add(record(&format!("https://example.com/{i}"), 200)).unwrap();
        }

        let records = store.list(0);
        assert_eq!(records.len(), HISTORY_CAP);
        assert_eq!(records[0].request.url, "https://example.com/104");
        assert_eq!(records[99].request.url, "https://example.com/5");
    }

    #[test]
    fn survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = HistoryStore::open(dir.path()).unwrap();
            store.add(record("https://example.com/persisted", 200)).unwrap();
        }
        let store = HistoryStore::open(dir.path()).unwrap();
        assert_eq!(store.list(0).len(), 1);
    }

    #[test]
    fn search_matches_url_name_and_method() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path()).unwrap();

        let mut named = record("https://example.com/users", 200);
        named.request.name = "List Users".into();
        store.add(named).unwrap();
        store.add(record("https://example.com/orders", 200)).unwrap();

        assert_eq!(store.search("USERS").len(), 1);
        assert_eq!(store.search("list").len(), 1);
        assert_eq!(store.search("get").len(), 2);
        assert_eq!(store.search("nothing").len(), 0);
    }

    #[test]
    fn delete_and_clear() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path()).unwrap();

        store.add(record("https://example.com/a", 200)).unwrap();
        let id = store.list(0)[0].id.clone();
        store.delete(&id).unwrap();
        assert!(store.list(0).is_empty());

        store.delete("missing").unwrap();

        store.add(record("https://example.com/b", 200)).unwrap();
        store.clear().unwrap();
        assert!(store.list(0).is_empty());
    }
}
