//! `{{key}}` placeholder substitution from the active environment
//!
//! Substitution applies to the URL, enabled header values, enabled
//! parameter values, and body content. Keys, disabled entries, and auth
//! fields are never touched. Unmatched placeholders stay verbatim.

use crate::models::types::{Environment, HttpRequest};

/// Replace every `{{key}}` occurrence with the environment's value for
/// `key`. Keys absent from the mapping are left as-is.
pub fn resolve_text(text: &str, env: &Environment) -> String {
    let mut result = text.to_string();
    for (key, value) in &env.variables {
        let placeholder = format!("{{{{{key}}}}}");
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, value);
        }
    }
    result
}

/// Apply substitution to every substitutable field of a request, in place.
/// With no environment the request is left unchanged.
pub fn resolve_request(request: &mut HttpRequest, env: Option<&Environment>) {
    let Some(env) = env else { return };

    request.url = resolve_text(&request.url, env);
    for header in request.headers.iter_mut().filter(|h| h.enabled) {
        header.value = resolve_text(&header.value, env);
    }
    for param in request.params.iter_mut().filter(|p| p.enabled) {
        param.value = resolve_text(&param.value, env);
    }
    if let Some(body) = request.body.as_mut() {
        body.content = resolve_text(&body.content, env);
    }
}
