//! JavaScript sandbox using QuickJS via rquickjs
//!
//! Each execution gets a fresh context with the `pm` bindings installed.
//! The runtime carries a 64MB memory limit and a 1MB stack limit so a
//! runaway script cannot take the process down with it.

use std::cell::RefCell;
use std::rc::Rc;

use rquickjs::{Context, Runtime, Value};

use crate::errors::{ReqlabError, Result};
use crate::scripting::context::ScriptContext;

use super::bindings;

pub struct JsSandbox {
    runtime: Runtime,
}

impl JsSandbox {
    pub fn new() -> Result<Self> {
        let runtime = Runtime::new()
            .map_err(|e| ReqlabError::Script(format!("failed to create JS runtime: {e}")))?;
        runtime.set_memory_limit(64 * 1024 * 1024);
        runtime.set_max_stack_size(1024 * 1024);
        Ok(Self { runtime })
    }

    /// Evaluate `source` against the shared state. Side effects (console
    /// lines, test results, variable and environment writes) land in the
    /// state regardless of whether evaluation succeeds.
    pub fn execute(&self, source: &str, state: Rc<RefCell<ScriptContext>>) -> Result<()> {
        let context = Context::full(&self.runtime)
            .map_err(|e| ReqlabError::Script(format!("failed to create JS context: {e}")))?;

        context.with(|ctx| {
            bindings::install(&ctx, state.clone())?;
            match ctx.eval::<(), _>(source.as_bytes()) {
                Ok(()) => Ok(()),
                Err(rquickjs::Error::Exception) => {
                    let caught = ctx.catch();
                    Err(ReqlabError::Script(exception_text(&caught)))
                }
                Err(e) => Err(ReqlabError::Script(e.to_string())),
            }
        })
    }
}

/// Human-readable text of a caught JS exception
pub(crate) fn exception_text(caught: &Value<'_>) -> String {
    if let Some(exception) = caught.as_exception() {
        if let Some(message) = exception.message() {
            return message;
        }
    }
    if let Some(text) = caught.as_string().and_then(|s| s.to_string().ok()) {
        return text;
    }
    format!("{caught:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::{HttpRequest, HttpResponse, KeyValue};
    use serde_json::json;
    use std::collections::HashMap;

    fn run(source: &str, state: ScriptContext) -> (Result<()>, ScriptContext) {
        let sandbox = JsSandbox::new().unwrap();
        let shared = Rc::new(RefCell::new(state));
        let outcome = sandbox.execute(source, shared.clone());
        let state = shared.replace(ScriptContext::default());
        (outcome, state)
    }

    fn pre_state() -> ScriptContext {
        let request = HttpRequest {
            method: crate::models::types::HttpMethod::POST,
            url: "https://api.example.com/items".into(),
            headers: vec![
                KeyValue::new("X-Api-Key", "secret", true),
                KeyValue::new("X-Disabled", "skip", false),
            ],
            ..Default::default()
        };
        ScriptContext::for_request(&request, None)
    }

    fn post_state(body: &str, status: u16) -> ScriptContext {
        let request = HttpRequest::default();
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let response = HttpResponse {
            status,
            status_text: format!("{status} OK"),
            headers,
            body: body.into(),
            size: body.len() as u64,
            time_ms: 12,
            script_result: None,
        };
        ScriptContext::for_response(&request, response, None)
    }

    #[test]
    fn console_log_joins_arguments_in_order() {
        let (outcome, state) = run(
            "console.log('a', 1, true); console.log({k: 'v'});",
            pre_state(),
        );
        outcome.unwrap();
        assert_eq!(state.console, vec!["a 1 true", r#"{"k":"v"}"#]);
    }

    #[test]
    fn pm_test_records_pass_and_fail_in_order() {
        let source = r#"
            pm.test('passes', function() {});
            pm.test('fails', function() { throw new Error('boom'); });
            pm.test('also passes', function() {});
        "#;
        let (outcome, state) = run(source, post_state("{}", 200));
        outcome.unwrap();
        assert_eq!(state.tests.len(), 3);
        assert!(state.tests[0].passed);
        assert!(!state.tests[1].passed);
        assert_eq!(state.tests[1].error.as_deref(), Some("boom"));
        assert!(state.tests[2].passed);
    }

    #[test]
    fn script_error_preserves_partial_results() {
        let source = r#"
            console.log('before');
            pm.test('ran', function() {});
            undefinedFunction();
            console.log('after');
        "#;
        let (outcome, state) = run(source, post_state("{}", 200));
        assert!(outcome.is_err());
        assert_eq!(state.console, vec!["before"]);
        assert_eq!(state.tests.len(), 1);
    }

    #[test]
    fn pm_request_exposes_enabled_headers_only() {
        let source = r#"
            console.log(pm.request.method, pm.request.url);
            console.log(pm.request.headers['X-Api-Key']);
            console.log(pm.request.headers['X-Disabled']);
        "#;
        let (outcome, state) = run(source, pre_state());
        outcome.unwrap();
        assert_eq!(
            state.console,
            vec!["POST https://api.example.com/items", "secret", "undefined"]
        );
    }

    #[test]
    fn pm_environment_get_returns_null_without_environment() {
        let (outcome, state) = run("console.log(pm.environment.get('host'));", pre_state());
        outcome.unwrap();
        assert_eq!(state.console, vec!["null"]);
    }

    #[test]
    fn pm_environment_set_updates_bound_environment() {
        let mut state = pre_state();
        let mut env = crate::models::types::Environment {
            id: "e1".into(),
            name: "Dev".into(),
            ..Default::default()
        };
        env.variables.insert("host".into(), "old".into());
        state.environment = Some(env);

        let source = r#"
            pm.environment.set('host', 'new');
            pm.environment.set('count', 42);
            console.log(pm.environment.get('host'));
        "#;
        let (outcome, state) = run(source, state);
        outcome.unwrap();
        let env = state.environment.unwrap();
        assert_eq!(env.variables.get("host").map(String::as_str), Some("new"));
        assert_eq!(env.variables.get("count").map(String::as_str), Some("42"));
        assert_eq!(state.console, vec!["new"]);
    }

    #[test]
    fn pm_variables_roundtrip_json_values() {
        let source = r#"
            pm.variables.set('url', 'https://override.example.com');
            pm.variables.set('flags', {a: 1});
            console.log(pm.variables.get('flags').a);
        "#;
        let (outcome, state) = run(source, pre_state());
        outcome.unwrap();
        assert_eq!(
            state.variables.get("url"),
            Some(&json!("https://override.example.com"))
        );
        assert_eq!(state.variables.get("flags"), Some(&json!({"a": 1})));
        assert_eq!(state.console, vec!["1"]);
    }

    #[test]
    fn pm_response_exposes_body_and_metadata() {
        let source = r#"
            console.log(pm.response.code, pm.response.status);
            console.log(pm.response.headers['Content-Type']);
            console.log(pm.response.text());
            console.log(pm.response.json().ok);
        "#;
        let (outcome, state) = run(source, post_state(r#"{"ok":true}"#, 201));
        outcome.unwrap();
        assert_eq!(
            state.console,
            vec![
                "201 201 OK",
                "application/json",
                r#"{"ok":true}"#,
                "true"
            ]
        );
    }

    #[test]
    fn pm_response_json_rejects_non_json_body() {
        let (outcome, _) = run("pm.response.json();", post_state("<html></html>", 200));
        let err = outcome.unwrap_err().to_string();
        assert!(err.contains("failed to parse"), "{err}");
    }

    #[test]
    fn pm_response_is_absent_before_dispatch() {
        let (outcome, state) = run("console.log(typeof pm.response);", pre_state());
        outcome.unwrap();
        assert_eq!(state.console, vec!["undefined"]);
    }

    #[test]
    fn expect_status_throws_on_mismatch_inside_test() {
        let source = r#"
            pm.test('status check', function() {
                expect(pm.response).to.have.status(200);
            });
        "#;
        let (outcome, state) = run(source, post_state("{}", 404));
        outcome.unwrap();
        assert!(!state.tests[0].passed);
        assert_eq!(
            state.tests[0].error.as_deref(),
            Some("Expected status 200 but got 404")
        );
    }

    #[test]
    fn expect_equality_chains_are_no_ops() {
        let source = r#"
            expect(1).to.equal(2);
            expect('a').to.eql('b');
            expect(pm.response).to.have.status(200);
        "#;
        let (outcome, _) = run(source, post_state("{}", 200));
        outcome.unwrap();
    }
}
