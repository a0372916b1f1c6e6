//! The assembled application: every store plus the HTTP client
//!
//! Opening a workspace loads all six JSON documents under one data
//! directory. Operations that span components (execute, collection run,
//! OpenAPI import) live here so callers hold a single handle.

use std::path::Path;

use tracing::info;

use crate::client::HttpClient;
use crate::errors::Result;
use crate::exec::collection::CollectionRunner;
use crate::exec::Executor;
use crate::models::types::{CollectionRunResult, HttpRequest, HttpResponse};
use crate::openapi;
use crate::storage::environments::EnvironmentStore;
use crate::storage::history::HistoryStore;
use crate::storage::projects::ProjectStore;
use crate::storage::requests::RequestStore;
use crate::storage::tabs::TabStore;
use crate::storage::tokens::TokenStore;

pub struct Workspace {
    pub history: HistoryStore,
    pub projects: ProjectStore,
    pub requests: RequestStore,
    pub tokens: TokenStore,
    pub environments: EnvironmentStore,
    pub tabs: TabStore,
    pub client: HttpClient,
}

impl Workspace {
    pub fn open(dir: &Path) -> Result<Self> {
        info!(dir = %dir.display(), "opening workspace");
        Ok(Self {
            history: HistoryStore::open(dir)?,
            projects: ProjectStore::open(dir)?,
            requests: RequestStore::open(dir)?,
            tokens: TokenStore::open(dir)?,
            environments: EnvironmentStore::open(dir)?,
            tabs: TabStore::open(dir)?,
            client: HttpClient::new()?,
        })
    }

    pub fn open_default() -> Result<Self> {
        let dir = crate::storage::default_data_dir()?;
        Self::open(&dir)
    }

    fn executor(&self) -> Executor<'_> {
        Executor::new(&self.client, &self.environments, &self.history)
    }

    /// Run one request through the full pipeline.
    pub async fn execute_request(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.executor().execute(request).await
    }

    /// Run every request in a project sequentially.
    pub async fn run_collection(&self, project_id: &str) -> Result<CollectionRunResult> {
        let executor = self.executor();
        let runner = CollectionRunner::new(&executor, &self.projects, &self.requests);
        runner.run(project_id).await
    }

    /// Parse an OpenAPI document and store one request per operation under
    /// the given project. Returns the stored requests.
    pub fn import_openapi(
        &self,
        content: &str,
        format: openapi::SpecFormat,
        project_id: &str,
    ) -> Result<Vec<HttpRequest>> {
        let document = openapi::parse(content, format)?;
        let requests = openapi::to_requests(&document, project_id);
        self.requests.upsert_many(requests.clone())?;
        info!(count = requests.len(), project = project_id, "imported OpenAPI operations");
        Ok(requests)
    }
}
