//! Pre/post request script execution
//!
//! The runner owns the policy around the sandbox: which script text to
//! run, what state it sees, and what happens to its side effects. Script
//! failures never abort the surrounding pipeline; they surface as the
//! `error` field of the returned [`ScriptResult`].

pub mod context;
pub mod js;

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::errors::ReqlabError;
use crate::models::types::{HttpRequest, HttpResponse, ScriptResult};
use crate::storage::environments::EnvironmentStore;

use context::ScriptContext;
use js::JsSandbox;

pub struct ScriptRunner<'a> {
    environments: &'a EnvironmentStore,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(environments: &'a EnvironmentStore) -> Self {
        Self { environments }
    }

    /// Run the pre-request script, if any. A script may rewrite the request
    /// URL through `pm.variables.set('url', ...)` and mutate the active
    /// environment; both are applied here.
    pub fn run_pre(&self, request: &mut HttpRequest) -> Option<ScriptResult> {
        let source = script_text(request, |s| &s.pre_request)?;
        debug!(request = %request.name, "running pre-request script");

        let state = ScriptContext::for_request(request, self.environments.active_environment());
        let (mut result, state) = self.execute(&source, state, "Pre-request");

        if let Some(JsonValue::String(url)) = state.variables.get("url") {
            request.url = url.clone();
        }
        self.persist_environment(&state, &mut result);
        Some(result)
    }

    /// Run the post-response script, if any.
    pub fn run_post(
        &self,
        request: &HttpRequest,
        response: &HttpResponse,
    ) -> Option<ScriptResult> {
        let source = script_text(request, |s| &s.post_request)?;
        debug!(request = %request.name, "running post-response script");

        let state = ScriptContext::for_response(
            request,
            response.clone(),
            self.environments.active_environment(),
        );
        let (mut result, state) = self.execute(&source, state, "Post-response");
        self.persist_environment(&state, &mut result);
        Some(result)
    }

    fn execute(
        &self,
        source: &str,
        state: ScriptContext,
        kind: &str,
    ) -> (ScriptResult, ScriptContext) {
        let shared = Rc::new(RefCell::new(state));
        let outcome = match JsSandbox::new() {
            Ok(sandbox) => sandbox.execute(source, shared.clone()),
            Err(e) => Err(e),
        };
        let state = shared.replace(ScriptContext::default());
        let mut result = state.result();
        if let Err(e) = outcome {
            let message = match e {
                ReqlabError::Script(m) => m,
                other => other.to_string(),
            };
            result.error = Some(format!("{kind} script error: {message}"));
        }
        (result, state)
    }

    // Saves whenever an environment was bound, mutated or not.
    fn persist_environment(&self, state: &ScriptContext, result: &mut ScriptResult) {
        if let Some(env) = state.environment.clone() {
            if let Err(e) = self.environments.save(env) {
                result
                    .console_output
                    .push(format!("Warning: Failed to save environment: {e}"));
            }
        }
    }
}

fn script_text(request: &HttpRequest, pick: impl Fn(&crate::models::types::Scripts) -> &String) -> Option<String> {
    let text = request.scripts.as_ref().map(pick)?;
    if text.trim().is_empty() {
        return None;
    }
    Some(text.clone())
}
