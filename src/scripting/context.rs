//! Shared state between the host and one script execution

use std::collections::HashMap;

use serde_json::Value as JsonValue;

use crate::models::types::{Environment, HttpRequest, HttpResponse, ScriptResult, TestResult};

/// Read-only view of the request exposed to scripts
#[derive(Debug, Clone, Default)]
pub struct RequestSnapshot {
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
}

impl RequestSnapshot {
    pub fn of(request: &HttpRequest) -> Self {
        Self {
            url: request.url.clone(),
            method: request.method.as_str().to_string(),
            headers: request.enabled_headers(),
        }
    }
}

/// Everything a script can observe or mutate. The sandbox bindings hold a
/// shared handle to this; the runner reads it back after evaluation.
#[derive(Debug, Default)]
pub struct ScriptContext {
    pub request: RequestSnapshot,
    pub response: Option<HttpResponse>,
    pub environment: Option<Environment>,
    pub console: Vec<String>,
    pub tests: Vec<TestResult>,
    pub variables: HashMap<String, JsonValue>,
}

impl ScriptContext {
    pub fn for_request(request: &HttpRequest, environment: Option<Environment>) -> Self {
        Self {
            request: RequestSnapshot::of(request),
            environment,
            ..Default::default()
        }
    }

    pub fn for_response(
        request: &HttpRequest,
        response: HttpResponse,
        environment: Option<Environment>,
    ) -> Self {
        Self {
            request: RequestSnapshot::of(request),
            response: Some(response),
            environment,
            ..Default::default()
        }
    }

    pub fn result(&self) -> ScriptResult {
        ScriptResult {
            console_output: self.console.clone(),
            tests: self.tests.clone(),
            error: None,
        }
    }
}
