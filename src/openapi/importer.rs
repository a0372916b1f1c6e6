//! Convert a parsed OpenAPI document into saved requests
//!
//! One request per (path, method) pair. Methods within a path are emitted
//! in a fixed GET-to-OPTIONS order; paths follow the document's sorted
//! order, so repeated imports of the same document produce requests in the
//! same sequence.

use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::models::types::{
    BodyType, HttpMethod, HttpRequest, KeyValue, RequestBody,
};

use super::parser::{OpenApiDocument, Operation, RequestBodySpec, Schema};

pub fn to_requests(document: &OpenApiDocument, project_id: &str) -> Vec<HttpRequest> {
    let mut requests = Vec::new();
    for (path, item) in &document.paths {
        let operations = [
            (HttpMethod::GET, item.get.as_ref()),
            (HttpMethod::POST, item.post.as_ref()),
            (HttpMethod::PUT, item.put.as_ref()),
            (HttpMethod::DELETE, item.delete.as_ref()),
            (HttpMethod::PATCH, item.patch.as_ref()),
            (HttpMethod::HEAD, item.head.as_ref()),
            (HttpMethod::OPTIONS, item.options.as_ref()),
        ];
        for (method, operation) in operations {
            if let Some(operation) = operation {
                requests.push(build_request(path, method, operation, project_id));
            }
        }
    }
    requests
}

fn build_request(
    path: &str,
    method: HttpMethod,
    operation: &Operation,
    project_id: &str,
) -> HttpRequest {
    let name = if !operation.summary.is_empty() {
        operation.summary.clone()
    } else if !operation.description.is_empty() {
        operation.description.clone()
    } else {
        format!("{method} {path}")
    };

    let mut headers = Vec::new();
    let mut params = Vec::new();
    for parameter in &operation.parameters {
        // Required parameters import disabled: their values are empty
        // placeholders until the user fills them in.
        let entry = KeyValue::new(&parameter.name, "", !parameter.required);
        match parameter.location.as_str() {
            "query" => params.push(entry),
            "header" => headers.push(entry),
            _ => {}
        }
    }

    let body = operation.request_body.as_ref().and_then(body_of);
    if matches!(body.as_ref().map(|b| b.body_type), Some(BodyType::Json)) {
        headers.push(KeyValue::new("Content-Type", "application/json", true));
    }

    HttpRequest {
        id: Uuid::new_v4().to_string(),
        name,
        method,
        url: path.to_string(),
        headers,
        params,
        body,
        auth: None,
        scripts: None,
        project_id: project_id.to_string(),
    }
}

fn body_of(spec: &RequestBodySpec) -> Option<RequestBody> {
    for (content_type, media) in &spec.content {
        if content_type.starts_with("application/json") {
            return Some(RequestBody {
                body_type: BodyType::Json,
                content: json_skeleton(media.schema.as_ref()),
                form_data: vec![],
            });
        }
        if content_type.starts_with("application/x-www-form-urlencoded")
            || content_type.starts_with("multipart/form-data")
        {
            let form_data = media
                .schema
                .as_ref()
                .map(|schema| {
                    schema
                        .properties
                        .keys()
                        .map(|key| KeyValue::new(key, "", true))
                        .collect()
                })
                .unwrap_or_default();
            let body_type = if content_type.starts_with("multipart/form-data") {
                BodyType::FormData
            } else {
                BodyType::UrlEncoded
            };
            return Some(RequestBody {
                body_type,
                content: String::new(),
                form_data,
            });
        }
    }
    None
}

/// A JSON object template from a schema: the example when one is given,
/// otherwise every declared property mapped to an empty string.
fn json_skeleton(schema: Option<&Schema>) -> String {
    let Some(schema) = schema else {
        return "{}".to_string();
    };
    if let Some(example) = &schema.example {
        return serde_json::to_string_pretty(example).unwrap_or_else(|_| "{}".to_string());
    }
    let mut object = Map::new();
    for key in schema.properties.keys() {
        object.insert(key.clone(), JsonValue::String(String::new()));
    }
    serde_json::to_string_pretty(&JsonValue::Object(object)).unwrap_or_else(|_| "{}".to_string())
}
