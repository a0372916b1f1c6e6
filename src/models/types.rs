//! Core data types
//!
//! Field names serialize as camelCase so the JSON documents on disk stay
//! readable alongside exported backups and project files.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// HTTP methods a request may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A header, query parameter, or form field. Disabled entries are kept in
/// storage but skipped during substitution, dispatch, and equality checks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
    pub enabled: bool,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>, enabled: bool) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled,
        }
    }
}

/// How the request body content is interpreted when building the wire body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    #[default]
    #[serde(alias = "")]
    None,
    Json,
    #[serde(rename = "form-data")]
    FormData,
    #[serde(rename = "x-www-form-urlencoded")]
    UrlEncoded,
    Raw,
    Xml,
    Binary,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(rename = "type", default)]
    pub body_type: BodyType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub form_data: Vec<KeyValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    None,
    Basic,
    Bearer,
    #[serde(rename = "oauth2")]
    OAuth2,
}

/// Auth descriptor attached to a request. Only the fields relevant to the
/// type tag are populated; the rest stay empty strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auth {
    #[serde(rename = "type", default)]
    pub auth_type: AuthType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    // OAuth 2.0 fields
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub oauth2_grant_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub oauth2_auth_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub oauth2_token_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub oauth2_client_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub oauth2_client_secret: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub oauth2_scope: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub oauth2_redirect_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub oauth2_access_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub oauth2_refresh_token: String,
}

/// Optional pre/post execution script pair, each arbitrary script text
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scripts {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pre_request: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub post_request: String,
}

/// A declarative HTTP request description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    #[serde(default)]
    pub params: Vec<KeyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scripts: Option<Scripts>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project_id: String,
}

impl HttpRequest {
    /// Enabled headers as a flat map (later duplicates win)
    pub fn enabled_headers(&self) -> HashMap<String, String> {
        self.headers
            .iter()
            .filter(|h| h.enabled)
            .map(|h| (h.key.clone(), h.value.clone()))
            .collect()
    }

    /// Content equality used for history deduplication: method, URL,
    /// enabled headers, enabled params, and body. Disabled entries and
    /// identity fields are ignored.
    pub fn content_eq(&self, other: &HttpRequest) -> bool {
        self.method == other.method
            && self.url == other.url
            && enabled_map(&self.headers) == enabled_map(&other.headers)
            && enabled_map(&self.params) == enabled_map(&other.params)
            && bodies_eq(self.body.as_ref(), other.body.as_ref())
    }
}

fn enabled_map(entries: &[KeyValue]) -> HashMap<&str, &str> {
    entries
        .iter()
        .filter(|e| e.enabled)
        .map(|e| (e.key.as_str(), e.value.as_str()))
        .collect()
}

fn bodies_eq(a: Option<&RequestBody>, b: Option<&RequestBody>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.body_type == b.body_type
                && a.content == b.content
                && enabled_map(&a.form_data) == enabled_map(&b.form_data)
        }
        _ => false,
    }
}

/// Outcome of one `pm.test(...)` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything one script execution produced, in emission order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptResult {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub console_output: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tests: Vec<TestResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub size: u64,
    /// Elapsed milliseconds, measured from request construction to receipt
    #[serde(rename = "time")]
    pub time_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_result: Option<ScriptResult>,
}

/// One executed (request, response) pair. The timestamp is assigned by the
/// history store at insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub request: HttpRequest,
    pub response: HttpResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    pub name: String,
    pub value: String,
    pub header_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named key/value mapping used for `{{key}}` substitution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub variables: IndexMap<String, String>,
}

/// Persisted editor tab state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabState {
    pub id: String,
    pub title: String,
    pub request: HttpRequest,
    pub is_active: bool,
}

/// Per-request outcome within a collection run. Transient, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRunResult {
    pub request_id: String,
    pub request_name: String,
    pub method: String,
    pub url: String,
    /// Zero when the dispatch failed before a status was received
    pub status: u16,
    pub status_text: String,
    pub duration: i64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tests: Vec<TestResult>,
    pub passed_tests: usize,
    pub failed_tests: usize,
}

/// Aggregated outcome of running every request in a project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRunResult {
    pub project_id: String,
    pub project_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration: i64,
    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
    pub request_results: Vec<RequestRunResult>,
}
