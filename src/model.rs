use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::Result;

/// A path object: arbitrary fields plus one field per HTTP verb present.
pub type PathItem = Map<String, Value>;

/// A Swagger / OpenAPI 2.0 shaped API description.
///
/// Only `definitions` and `paths` are interpreted. Every other top-level field
/// is kept as-is so templates can still reach it through `model`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwaggerModel {
    #[serde(default)]
    pub definitions: IndexMap<String, Value>,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl SwaggerModel {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Loads a model from disk. `.json` files are parsed as JSON, anything
    /// else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let model = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };
        debug!(
            "Loaded {:?}: {} definitions, {} paths",
            path,
            model.definitions.len(),
            model.paths.len()
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const PETSTORE: &str = r#"
swagger: "2.0"
info:
  title: Petstore
definitions:
  Pet:
    type: object
  Error:
    type: object
paths:
  /pets:
    x-swagger-router-controller: pets
    get:
      operationId: listPets
    post:
      operationId: createPet
"#;

    #[test]
    fn test_from_yaml_preserves_source_order() {
        let model = SwaggerModel::from_yaml_str(PETSTORE).unwrap();
        let names: Vec<_> = model.definitions.keys().cloned().collect();
        assert_eq!(names, vec!["Pet", "Error"]);
        let fields: Vec<_> = model.paths["/pets"].keys().cloned().collect();
        assert_eq!(fields, vec!["x-swagger-router-controller", "get", "post"]);
    }

    #[test]
    fn test_extra_fields_are_kept() {
        let model = SwaggerModel::from_yaml_str(PETSTORE).unwrap();
        assert_eq!(model.extra["swagger"], Value::from("2.0"));
        assert_eq!(model.extra["info"]["title"], Value::from("Petstore"));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let model = SwaggerModel::from_json_str(r#"{"swagger": "2.0"}"#).unwrap();
        assert!(model.definitions.is_empty());
        assert!(model.paths.is_empty());
    }

    #[test]
    fn test_load_picks_parser_from_extension() {
        let dir = tempdir().unwrap();
        let json_path = dir.path().join("api.json");
        fs::write(&json_path, r#"{"definitions": {"User": {"type": "object"}}}"#).unwrap();
        let model = SwaggerModel::load(&json_path).unwrap();
        assert!(model.definitions.contains_key("User"));

        let yaml_path = dir.path().join("api.yaml");
        fs::write(&yaml_path, PETSTORE).unwrap();
        let model = SwaggerModel::load(&yaml_path).unwrap();
        assert_eq!(model.paths.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let result = SwaggerModel::load(Path::new("does-not-exist.yaml"));
        assert!(result.is_err());
    }
}
