//! Sequential collection runner
//!
//! Runs every request in a project in storage order, one at a time. A
//! failing request contributes an error entry to the aggregate instead of
//! stopping the run.

use std::time::Instant;

use chrono::Utc;
use tracing::info;

use crate::errors::{ReqlabError, Result};
use crate::exec::Executor;
use crate::models::types::{CollectionRunResult, HttpRequest, RequestRunResult};
use crate::storage::projects::ProjectStore;
use crate::storage::requests::RequestStore;

pub struct CollectionRunner<'a> {
    executor: &'a Executor<'a>,
    projects: &'a ProjectStore,
    requests: &'a RequestStore,
}

impl<'a> CollectionRunner<'a> {
    pub fn new(
        executor: &'a Executor<'a>,
        projects: &'a ProjectStore,
        requests: &'a RequestStore,
    ) -> Self {
        Self {
            executor,
            projects,
            requests,
        }
    }

    pub async fn run(&self, project_id: &str) -> Result<CollectionRunResult> {
        let project = self
            .projects
            .get(project_id)
            .ok_or_else(|| ReqlabError::ProjectNotFound(project_id.to_string()))?;
        let requests = self.requests.for_project(project_id);
        if requests.is_empty() {
            return Err(ReqlabError::EmptyCollection(project.name));
        }

        info!(project = %project.name, count = requests.len(), "starting collection run");
        let start_time = Utc::now();
        let started = Instant::now();

        let mut results = Vec::with_capacity(requests.len());
        for request in &requests {
            results.push(self.run_single(request).await);
        }

        let end_time = Utc::now();
        let total_tests: usize = results.iter().map(|r| r.tests.len()).sum();
        let passed_tests: usize = results.iter().map(|r| r.passed_tests).sum();
        let failed_tests: usize = results.iter().map(|r| r.failed_tests).sum();

        Ok(CollectionRunResult {
            project_id: project.id,
            project_name: project.name,
            start_time,
            end_time,
            duration: started.elapsed().as_millis() as i64,
            total_tests,
            passed_tests,
            failed_tests,
            request_results: results,
        })
    }

    async fn run_single(&self, request: &HttpRequest) -> RequestRunResult {
        let started = Instant::now();
        let mut result = RequestRunResult {
            request_id: request.id.clone(),
            request_name: request.name.clone(),
            method: request.method.as_str().to_string(),
            url: request.url.clone(),
            ..Default::default()
        };

        match self.executor.execute(request).await {
            Ok(response) => {
                result.status = response.status;
                result.status_text = response.status_text.clone();
                result.success = (200..300).contains(&response.status);
                if let Some(script) = response.script_result {
                    result.passed_tests = script.tests.iter().filter(|t| t.passed).count();
                    result.failed_tests = script.tests.len() - result.passed_tests;
                    result.tests = script.tests;
                }
            }
            Err(e) => {
                result.error = Some(e.to_string());
            }
        }
        result.duration = started.elapsed().as_millis() as i64;
        result
    }
}
