//! Request execution pipeline
//!
//! One execution walks five stages in order: pre-request script, variable
//! resolution, dispatch, post-response script, history recording. Only a
//! dispatch failure aborts the run; every other stage degrades to a
//! warning so a flaky script or a full disk never hides the response.

pub mod collection;

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use crate::client::HttpClient;
use crate::errors::Result;
use crate::models::types::{HistoryRecord, HttpRequest, HttpResponse};
use crate::scripting::ScriptRunner;
use crate::storage::environments::EnvironmentStore;
use crate::storage::history::HistoryStore;
use crate::vars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PreScript,
    Resolve,
    Dispatch,
    PostScript,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    Advisory,
}

impl Stage {
    pub fn severity(self) -> Severity {
        match self {
            Stage::Dispatch => Severity::Fatal,
            Stage::PreScript | Stage::Resolve | Stage::PostScript | Stage::History => {
                Severity::Advisory
            }
        }
    }
}

pub struct Executor<'a> {
    client: &'a HttpClient,
    environments: &'a EnvironmentStore,
    history: &'a HistoryStore,
}

impl<'a> Executor<'a> {
    pub fn new(
        client: &'a HttpClient,
        environments: &'a EnvironmentStore,
        history: &'a HistoryStore,
    ) -> Self {
        Self {
            client,
            environments,
            history,
        }
    }

    /// Execute one request through the full pipeline. The stored request is
    /// never mutated; scripts and substitution work on a private copy.
    pub async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut prepared = request.clone();
        let runner = ScriptRunner::new(self.environments);

        let pre_result = runner.run_pre(&mut prepared);
        if let Some(error) = pre_result.as_ref().and_then(|r| r.error.as_deref()) {
            warn!(request = %prepared.name, error, "pre-request script failed");
        }

        vars::resolve_request(&mut prepared, self.environments.active_environment().as_ref());

        let mut response = self.client.send(&prepared).await?;

        let post_result = runner.run_post(&prepared, &response);
        if let Some(error) = post_result.as_ref().and_then(|r| r.error.as_deref()) {
            warn!(request = %prepared.name, error, "post-response script failed");
        }
        // Only the post-response result travels with the response; the
        // pre-request result is logged above and dropped.
        response.script_result = post_result;

        let record = HistoryRecord {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            request: prepared.clone(),
            response: response.clone(),
        };
        if let Err(e) = self.history.add(record) {
            warn!(request = %prepared.name, error = %e, "failed to record history");
        }

        Ok(response)
    }
}
