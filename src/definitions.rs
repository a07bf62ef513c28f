use indexmap::IndexMap;
use log::debug;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::model::SwaggerModel;

const REFERENCE_PREFIX: &str = "#/definitions/";

/// Builds the canonical reference path for a definition name.
pub fn reference_path(name: &str) -> String {
    format!("{}{}", REFERENCE_PREFIX, name)
}

/// One schema from `definitions`, paired with its name and reference path.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionEntry {
    pub name: String,
    pub reference_path: String,
    pub schema: Value,
}

impl Serialize for DefinitionEntry {
    // Templates see the schema's own fields next to the derived ones.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match &self.schema {
            Value::Object(fields) => {
                for (key, value) in fields {
                    if key != "definitionName" && key != "referencePath" {
                        map.serialize_entry(key, value)?;
                    }
                }
            }
            other => map.serialize_entry("schema", other)?,
        }
        map.serialize_entry("definitionName", &self.name)?;
        map.serialize_entry("referencePath", &self.reference_path)?;
        map.end()
    }
}

/// Reference path to definition, in model order.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct DefinitionRegistry {
    entries: IndexMap<String, DefinitionEntry>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: DefinitionEntry) {
        self.entries.insert(entry.reference_path.clone(), entry);
    }

    pub fn get(&self, reference_path: &str) -> Option<&DefinitionEntry> {
        self.entries.get(reference_path)
    }

    pub fn by_name(&self, name: &str) -> Option<&DefinitionEntry> {
        self.get(&reference_path(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DefinitionEntry> {
        self.entries.values()
    }
}

/// Builds the definition registry for a generation run.
pub trait DefinitionMapper {
    fn map(&self, model: &SwaggerModel) -> DefinitionRegistry;
}

/// Maps every entry of `model.definitions` under `#/definitions/<name>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDefinitionMapper;

impl DefinitionMapper for DefaultDefinitionMapper {
    fn map(&self, model: &SwaggerModel) -> DefinitionRegistry {
        map_definitions(model)
    }
}

pub fn map_definitions(model: &SwaggerModel) -> DefinitionRegistry {
    debug!("Parsing {} definitions", model.definitions.len());
    let mut registry = DefinitionRegistry::new();
    for (name, schema) in &model.definitions {
        debug!("  Reading definition for {}", name);
        registry.insert(DefinitionEntry {
            name: name.clone(),
            reference_path: reference_path(name),
            schema: schema.clone(),
        });
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> SwaggerModel {
        SwaggerModel::from_json_str(
            r#"{
                "definitions": {
                    "User": {"type": "object", "properties": {"id": {"type": "integer"}}},
                    "Pet": {"type": "object"},
                    "Flag": true
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_every_definition_is_keyed_by_reference_path() {
        let registry = map_definitions(&model());
        assert_eq!(registry.len(), 3);
        let keys: Vec<_> = registry.iter().map(|e| e.reference_path.clone()).collect();
        assert_eq!(
            keys,
            vec!["#/definitions/User", "#/definitions/Pet", "#/definitions/Flag"]
        );
        assert_eq!(registry.get("#/definitions/Pet").unwrap().name, "Pet");
        assert_eq!(registry.by_name("User").unwrap().schema["type"], "object");
    }

    #[test]
    fn test_empty_model_gives_empty_registry() {
        let registry = map_definitions(&SwaggerModel::default());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_source_model_is_not_mutated() {
        let model = model();
        let before = model.clone();
        let _ = DefaultDefinitionMapper.map(&model);
        assert_eq!(model, before);
        assert!(model.definitions["User"].get("definitionName").is_none());
    }

    #[test]
    fn test_entry_serializes_schema_fields_and_identity() {
        let registry = map_definitions(&model());
        let user = serde_json::to_value(registry.by_name("User").unwrap()).unwrap();
        assert_eq!(user["type"], "object");
        assert_eq!(user["definitionName"], "User");
        assert_eq!(user["referencePath"], "#/definitions/User");

        let flag = serde_json::to_value(registry.by_name("Flag").unwrap()).unwrap();
        assert_eq!(flag["schema"], json!(true));
        assert_eq!(flag["definitionName"], "Flag");
    }

    #[test]
    fn test_registry_serializes_as_map() {
        let registry = map_definitions(&model());
        let value = serde_json::to_value(&registry).unwrap();
        assert_eq!(value["#/definitions/Pet"]["definitionName"], "Pet");
    }
}
