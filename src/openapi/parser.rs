//! Minimal OpenAPI 3.x document model
//!
//! Only the parts the importer consumes are modeled; everything else in a
//! document is ignored during deserialization.

use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::errors::{ReqlabError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct OpenApiDocument {
    #[serde(default)]
    pub openapi: String,
    #[serde(default)]
    pub info: Info,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    pub get: Option<Operation>,
    pub post: Option<Operation>,
    pub put: Option<Operation>,
    pub delete: Option<Operation>,
    pub patch: Option<Operation>,
    pub head: Option<Operation>,
    pub options: Option<Operation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBodySpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "in", default)]
    pub location: String,
    #[serde(default)]
    pub required: bool,
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBodySpec {
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", default)]
    pub schema_type: String,
    #[serde(default)]
    pub properties: IndexMap<String, JsonValue>,
    #[serde(default)]
    pub example: Option<JsonValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Yaml,
}

impl SpecFormat {
    /// Guess the format from a file extension; `.json` is JSON, anything
    /// else is treated as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SpecFormat::Json,
            _ => SpecFormat::Yaml,
        }
    }
}

pub fn parse(content: &str, format: SpecFormat) -> Result<OpenApiDocument> {
    let document: OpenApiDocument = match format {
        SpecFormat::Json => serde_json::from_str(content)
            .map_err(|e| ReqlabError::Parse(format!("invalid OpenAPI JSON: {e}")))?,
        SpecFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| ReqlabError::Parse(format!("invalid OpenAPI YAML: {e}")))?,
    };
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_document() {
        let content = r#"{
            "openapi": "3.0.0",
            "info": {"title": "Pets", "version": "1.0"},
            "paths": {
                "/pets": {
                    "get": {"summary": "List pets"},
                    "post": {"summary": "Create a pet"}
                }
            }
        }"#;
        let doc = parse(content, SpecFormat::Json).unwrap();
        assert_eq!(doc.info.title, "Pets");
        let pets = &doc.paths["/pets"];
        assert!(pets.get.is_some());
        assert!(pets.post.is_some());
        assert!(pets.delete.is_none());
    }

    #[test]
    fn parses_yaml_document() {
        let content = r#"
openapi: "3.0.0"
info:
  title: Pets
  version: "1.0"
paths:
  /pets/{id}:
    get:
      summary: Get a pet
      parameters:
        - name: id
          in: path
          required: true
"#;
        let doc = parse(content, SpecFormat::Yaml).unwrap();
        let op = doc.paths["/pets/{id}"].get.as_ref().unwrap();
        assert_eq!(op.parameters[0].name, "id");
        assert_eq!(op.parameters[0].location, "path");
        assert!(op.parameters[0].required);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse("{not json", SpecFormat::Json).is_err());
        assert!(parse(":\n  - bad", SpecFormat::Yaml).is_err());
    }

    #[test]
    fn format_guessed_from_extension() {
        assert_eq!(SpecFormat::from_path(Path::new("api.json")), SpecFormat::Json);
        assert_eq!(SpecFormat::from_path(Path::new("api.yaml")), SpecFormat::Yaml);
        assert_eq!(SpecFormat::from_path(Path::new("api.yml")), SpecFormat::Yaml);
    }
}
