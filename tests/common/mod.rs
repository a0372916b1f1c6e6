//! Shared helpers for integration tests
#![allow(dead_code)]

use chrono::Utc;
use reqlab::models::types::{HttpMethod, HttpRequest, Project};
use reqlab::workspace::Workspace;
use tempfile::TempDir;

pub fn workspace() -> (TempDir, Workspace) {
    let dir = TempDir::new().unwrap();
    let ws = Workspace::open(dir.path()).unwrap();
    (dir, ws)
}

pub fn get_request(id: &str, url: &str) -> HttpRequest {
    HttpRequest {
        id: id.into(),
        name: id.to_uppercase(),
        method: HttpMethod::GET,
        url: url.into(),
        ..Default::default()
    }
}

pub fn project(id: &str, name: &str) -> Project {
    Project {
        id: id.into(),
        name: name.into(),
        description: String::new(),
        base_url: String::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
