//! Workspace backup and restore
//!
//! A backup is one JSON document holding every persisted collection.
//! Import merges into the existing workspace by id instead of wiping it;
//! history records replay oldest-first through the normal insert path so
//! deduplication and the retention cap still apply.

use serde::{Deserialize, Serialize};

use crate::errors::{ReqlabError, Result};
use crate::models::types::{
    Environment, HistoryRecord, HttpRequest, Project, TabState, Token,
};
use crate::workspace::Workspace;

const EXPORT_HISTORY_LIMIT: usize = 10_000;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub requests: Vec<HttpRequest>,
    #[serde(default)]
    pub environments: Vec<Environment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_environment_id: Option<String>,
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
    #[serde(default)]
    pub tabs: Vec<TabState>,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub projects: usize,
    pub requests: usize,
    pub environments: usize,
    pub tokens: usize,
    pub history: usize,
    pub tabs: usize,
    pub warnings: Vec<String>,
}

pub fn export(workspace: &Workspace) -> Result<String> {
    let data = BackupData {
        projects: workspace.projects.list(),
        requests: workspace.requests.list(),
        environments: workspace.environments.list(),
        active_environment_id: workspace.environments.active_id(),
        tokens: workspace.tokens.list(),
        history: workspace.history.list(EXPORT_HISTORY_LIMIT),
        tabs: workspace.tabs.list(),
    };
    serde_json::to_string_pretty(&data).map_err(Into::into)
}

pub fn import(workspace: &Workspace, content: &str) -> Result<ImportReport> {
    let data: BackupData = serde_json::from_str(content)
        .map_err(|e| ReqlabError::Parse(format!("invalid backup: {e}")))?;

    let mut report = ImportReport::default();

    for project in data.projects {
        let id = project.id.clone();
        match workspace.projects.upsert(project) {
            Ok(()) => report.projects += 1,
            Err(e) => report.warnings.push(format!("skipped project {id}: {e}")),
        }
    }

    for request in data.requests {
        let id = request.id.clone();
        match workspace.requests.upsert(request) {
            Ok(()) => report.requests += 1,
            Err(e) => report.warnings.push(format!("skipped request {id}: {e}")),
        }
    }

    for environment in data.environments {
        let id = environment.id.clone();
        match workspace.environments.save(environment) {
            Ok(()) => report.environments += 1,
            Err(e) => report
                .warnings
                .push(format!("skipped environment {id}: {e}")),
        }
    }
    if let Some(active) = data.active_environment_id {
        if let Err(e) = workspace.environments.set_active(Some(&active)) {
            report
                .warnings
                .push(format!("failed to restore active environment: {e}"));
        }
    }

    for token in data.tokens {
        let id = token.id.clone();
        match workspace.tokens.save(token) {
            Ok(()) => report.tokens += 1,
            Err(e) => report.warnings.push(format!("skipped token {id}: {e}")),
        }
    }

    for record in data.history.into_iter().rev() {
        match workspace.history.add(record) {
            Ok(()) => report.history += 1,
            Err(e) => report
                .warnings
                .push(format!("skipped history record: {e}")),
        }
    }

    if !data.tabs.is_empty() {
        let count = data.tabs.len();
        match workspace.tabs.replace(data.tabs) {
            Ok(()) => report.tabs = count,
            Err(e) => report.warnings.push(format!("skipped tabs: {e}")),
        }
    }

    Ok(report)
}
