//! HTTP request building and sending
//!
//! Turns a fully resolved [`HttpRequest`] into a reqwest call: query
//! application with set semantics, body encoding by declared type, auth
//! injection, header overlay, and transport-failure classification.

use std::collections::{BTreeMap, HashMap};
use std::error::Error as _;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart;
use tracing::debug;
use url::Url;

use crate::errors::{ReqlabError, Result};
use crate::models::types::{Auth, AuthType, BodyType, HttpMethod, HttpRequest, HttpResponse, KeyValue, RequestBody};

/// Fixed deadline for the whole exchange; no caller-level override exists.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ReqlabError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Dispatch a resolved request. Elapsed time covers URL/body
    /// construction through response receipt.
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let start = Instant::now();

        let url = build_url(&request.url, &request.params)?;
        let host = url.host_str().unwrap_or_default().to_string();
        debug!(method = %request.method, url = %url, "dispatching request");

        let mut builder = self.client.request(to_method(request.method), url);
        let mut headers = HeaderMap::new();

        match body_plan(request.body.as_ref()) {
            BodyPlan::Empty => {}
            BodyPlan::Text { content, content_type } => {
                if let Some(content_type) = content_type {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
                }
                builder = builder.body(content);
            }
            BodyPlan::UrlEncoded(fields) => {
                builder = builder.form(&fields);
            }
            BodyPlan::Multipart(fields) => {
                let mut form = multipart::Form::new();
                for (key, value) in fields {
                    form = form.text(key, value);
                }
                builder = builder.multipart(form);
            }
        }

        // Auth goes in before the user's headers; headers use insert
        // semantics, so an explicit Authorization header wins.
        if let Some(auth) = request.auth.as_ref() {
            apply_auth(&mut headers, auth)?;
        }
        for header in request.headers.iter().filter(|h| h.enabled) {
            let name = HeaderName::from_bytes(header.key.as_bytes())
                .map_err(|e| ReqlabError::Parse(format!("invalid header name {:?}: {e}", header.key)))?;
            let value = HeaderValue::from_str(&header.value)
                .map_err(|e| ReqlabError::Parse(format!("invalid value for header {:?}: {e}", header.key)))?;
            headers.insert(name, value);
        }
        builder = builder.headers(headers);

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return Err(classify_transport_error(e, &host)),
        };

        let status = response.status();
        let mut flat_headers = HashMap::new();
        for name in response.headers().keys() {
            let joined = response
                .headers()
                .get_all(name)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .collect::<Vec<_>>()
                .join(", ");
            flat_headers.insert(name.to_string(), joined);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ReqlabError::Request(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: format!("{} {}", status.as_u16(), status.canonical_reason().unwrap_or("")),
            headers: flat_headers,
            size: body.len() as u64,
            time_ms: start.elapsed().as_millis() as i64,
            body,
            script_result: None,
        })
    }
}

fn to_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::GET => reqwest::Method::GET,
        HttpMethod::POST => reqwest::Method::POST,
        HttpMethod::PUT => reqwest::Method::PUT,
        HttpMethod::DELETE => reqwest::Method::DELETE,
        HttpMethod::PATCH => reqwest::Method::PATCH,
        HttpMethod::HEAD => reqwest::Method::HEAD,
        HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
    }
}

/// Parse the URL and apply each enabled parameter with set semantics: the
/// last enabled occurrence of a key wins and replaces any value already in
/// the query string. Keys re-encode in sorted order.
fn build_url(raw: &str, params: &[KeyValue]) -> Result<Url> {
    let mut url =
        Url::parse(raw).map_err(|e| ReqlabError::Parse(format!("invalid URL {raw:?}: {e}")))?;
    if params.is_empty() {
        return Ok(url);
    }

    let mut query: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in url.query_pairs() {
        query.entry(key.into_owned()).or_default().push(value.into_owned());
    }
    for param in params.iter().filter(|p| p.enabled) {
        query.insert(param.key.clone(), vec![param.value.clone()]);
    }

    if query.is_empty() {
        url.set_query(None);
    } else {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, values) in &query {
            for value in values {
                pairs.append_pair(key, value);
            }
        }
    }
    Ok(url)
}

enum BodyPlan {
    Empty,
    Text {
        content: String,
        content_type: Option<&'static str>,
    },
    UrlEncoded(Vec<(String, String)>),
    Multipart(Vec<(String, String)>),
}

fn enabled_fields(fields: &[KeyValue]) -> Vec<(String, String)> {
    fields
        .iter()
        .filter(|f| f.enabled)
        .map(|f| (f.key.clone(), f.value.clone()))
        .collect()
}

fn body_plan(body: Option<&RequestBody>) -> BodyPlan {
    let Some(body) = body else { return BodyPlan::Empty };
    match body.body_type {
        BodyType::None => BodyPlan::Empty,
        BodyType::Json | BodyType::Xml | BodyType::Raw if body.content.is_empty() => BodyPlan::Empty,
        BodyType::Json => BodyPlan::Text {
            content: body.content.clone(),
            content_type: Some("application/json"),
        },
        BodyType::Xml => BodyPlan::Text {
            content: body.content.clone(),
            content_type: Some("application/xml"),
        },
        BodyType::Raw => BodyPlan::Text {
            content: body.content.clone(),
            content_type: Some("text/plain"),
        },
        BodyType::UrlEncoded => {
            let fields = enabled_fields(&body.form_data);
            if fields.is_empty() {
                BodyPlan::Empty
            } else {
                BodyPlan::UrlEncoded(fields)
            }
        }
        BodyType::FormData => {
            let fields = enabled_fields(&body.form_data);
            if fields.is_empty() {
                BodyPlan::Empty
            } else {
                BodyPlan::Multipart(fields)
            }
        }
        // Binary and anything unrecognized: send content verbatim with no
        // declared content type.
        BodyType::Binary => {
            if body.content.is_empty() {
                BodyPlan::Empty
            } else {
                BodyPlan::Text {
                    content: body.content.clone(),
                    content_type: None,
                }
            }
        }
    }
}

fn apply_auth(headers: &mut HeaderMap, auth: &Auth) -> Result<()> {
    let value = match auth.auth_type {
        AuthType::Basic => {
            if auth.username.is_empty() && auth.password.is_empty() {
                None
            } else {
                let credentials = format!("{}:{}", auth.username, auth.password);
                Some(format!("Basic {}", BASE64.encode(credentials)))
            }
        }
        AuthType::Bearer => {
            (!auth.token.is_empty()).then(|| format!("Bearer {}", auth.token))
        }
        AuthType::OAuth2 => (!auth.oauth2_access_token.is_empty())
            .then(|| format!("Bearer {}", auth.oauth2_access_token)),
        AuthType::None => None,
    };

    if let Some(value) = value {
        let value = HeaderValue::from_str(&value)
            .map_err(|e| ReqlabError::Auth(format!("invalid authorization value: {e}")))?;
        headers.insert(AUTHORIZATION, value);
    }
    Ok(())
}

/// Map a transport failure onto the user-facing categories: timeout,
/// connection refused, host resolution, or a generic request failure.
fn classify_transport_error(err: reqwest::Error, host: &str) -> ReqlabError {
    if err.is_timeout() {
        return ReqlabError::Timeout(REQUEST_TIMEOUT_SECS);
    }

    let mut source: Option<&(dyn std::error::Error + 'static)> = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionRefused {
                return ReqlabError::ConnectionRefused(host.to_string());
            }
        }
        let text = cause.to_string();
        if text.contains("dns error") || text.contains("failed to lookup address") {
            return ReqlabError::HostResolution(host.to_string());
        }
        source = cause.source();
    }
    ReqlabError::Request(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_sets_enabled_params() {
        let url = build_url(
            "https://example.com/items",
            &[
                KeyValue::new("page", "2", true),
                KeyValue::new("debug", "1", false),
            ],
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://example.com/items?page=2");
    }

    #[test]
    fn build_url_last_enabled_duplicate_wins() {
        let url = build_url(
            "https://example.com/items",
            &[
                KeyValue::new("page", "1", true),
                KeyValue::new("page", "3", true),
            ],
        )
        .unwrap();
        let pairs: Vec<_> = url.query_pairs().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0], ("page".into(), "3".into()));
    }

    #[test]
    fn build_url_replaces_existing_query_value() {
        let url = build_url(
            "https://example.com/items?page=1&sort=asc",
            &[KeyValue::new("page", "9", true)],
        )
        .unwrap();
        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["page"], "9");
        assert_eq!(pairs["sort"], "asc");
    }

    #[test]
    fn build_url_without_params_is_untouched() {
        let url = build_url("https://example.com/items?a=%20b", &[]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/items?a=%20b");
    }

    #[test]
    fn json_body_sends_content_verbatim() {
        let body = RequestBody {
            body_type: BodyType::Json,
            content: r#"{"a":1}"#.into(),
            form_data: vec![],
        };
        match body_plan(Some(&body)) {
            BodyPlan::Text { content, content_type } => {
                assert_eq!(content, r#"{"a":1}"#);
                assert_eq!(content_type, Some("application/json"));
            }
            _ => panic!("expected a text body"),
        }
    }

    #[test]
    fn empty_json_body_sends_nothing() {
        let body = RequestBody {
            body_type: BodyType::Json,
            ..Default::default()
        };
        assert!(matches!(body_plan(Some(&body)), BodyPlan::Empty));
        assert!(matches!(body_plan(None), BodyPlan::Empty));
    }

    #[test]
    fn url_encoded_body_keeps_enabled_fields_only() {
        let body = RequestBody {
            body_type: BodyType::UrlEncoded,
            content: String::new(),
            form_data: vec![
                KeyValue::new("user", "amy", true),
                KeyValue::new("debug", "1", false),
            ],
        };
        match body_plan(Some(&body)) {
            BodyPlan::UrlEncoded(fields) => {
                assert_eq!(fields, vec![("user".to_string(), "amy".to_string())]);
            }
            _ => panic!("expected a url-encoded body"),
        }
    }

    #[test]
    fn form_body_with_only_disabled_fields_sends_nothing() {
        for body_type in [BodyType::UrlEncoded, BodyType::FormData] {
            let body = RequestBody {
                body_type,
                content: String::new(),
                form_data: vec![
                    KeyValue::new("user", "amy", false),
                    KeyValue::new("debug", "1", false),
                ],
            };
            assert!(matches!(body_plan(Some(&body)), BodyPlan::Empty));
        }
    }

    #[test]
    fn basic_auth_encodes_credentials() {
        let mut headers = HeaderMap::new();
        let auth = Auth {
            auth_type: AuthType::Basic,
            username: "user".into(),
            password: "pass".into(),
            ..Default::default()
        };
        apply_auth(&mut headers, &auth).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn empty_bearer_token_sets_no_header() {
        let mut headers = HeaderMap::new();
        let auth = Auth {
            auth_type: AuthType::Bearer,
            ..Default::default()
        };
        apply_auth(&mut headers, &auth).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn explicit_authorization_header_overrides_auth() {
        // Mirrors the overlay order in send(): auth first, then enabled
        // headers with insert semantics.
        let mut headers = HeaderMap::new();
        let auth = Auth {
            auth_type: AuthType::Bearer,
            token: "computed".into(),
            ..Default::default()
        };
        apply_auth(&mut headers, &auth).unwrap();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer explicit"));
        assert_eq!(headers[AUTHORIZATION], "Bearer explicit");
        assert_eq!(headers.get_all(AUTHORIZATION).iter().count(), 1);
    }

    #[test]
    fn oauth2_auth_uses_stored_access_token() {
        let mut headers = HeaderMap::new();
        let auth = Auth {
            auth_type: AuthType::OAuth2,
            oauth2_access_token: "stored-token".into(),
            ..Default::default()
        };
        apply_auth(&mut headers, &auth).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer stored-token");
    }
}
