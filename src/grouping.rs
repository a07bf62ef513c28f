use indexmap::IndexMap;
use log::debug;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{PathItem, SwaggerModel};

/// Parameters controlling how operations are bucketed.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupOptions {
    /// Field read on operation objects, then on path objects.
    pub group_by: String,
    /// Allow-listed verbs; also fixes the processing order within a path.
    pub operations: Vec<String>,
}

/// One operation together with its verb and owning path.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationContext {
    pub verb: String,
    pub path: String,
    pub path_item: PathItem,
    pub operation: Value,
}

impl Serialize for OperationContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Value::Object(fields) = &self.operation {
            for (key, value) in fields {
                if !matches!(key.as_str(), "verb" | "path" | "pathItem") {
                    map.serialize_entry(key, value)?;
                }
            }
        }
        map.serialize_entry("verb", &self.verb)?;
        map.serialize_entry("path", &self.path)?;
        map.serialize_entry("pathItem", &self.path_item)?;
        map.end()
    }
}

pub type OperationGroup = Vec<OperationContext>;

/// Group key to members, in first-seen order.
pub type OperationGroups = IndexMap<String, OperationGroup>;

/// Partitions the model's operations by `options.group_by`.
///
/// The operation-level value wins over the path-level one. An operation that
/// resolves to no key at either level aborts the whole call.
pub fn group_operations(model: &SwaggerModel, options: &GroupOptions) -> Result<OperationGroups> {
    debug!(
        "Iterating paths, grouping operations by {}",
        options.group_by
    );
    let mut groups = OperationGroups::new();

    for (path, path_item) in &model.paths {
        debug!("  Path: {}", path);
        let path_key = defined(path_item.get(&options.group_by));

        for verb in options
            .operations
            .iter()
            .filter(|verb| path_item.contains_key(verb.as_str()))
        {
            let operation = &path_item[verb.as_str()];
            let operation_key = defined(operation.get(&options.group_by));
            let key = match operation_key.or(path_key) {
                Some(value) => group_key(value).ok_or_else(|| Error::InvalidGroupKey {
                    path: path.clone(),
                    verb: verb.clone(),
                    group_by: options.group_by.clone(),
                })?,
                None => {
                    return Err(Error::MissingGroupKey {
                        path: path.clone(),
                        verb: verb.clone(),
                        group_by: options.group_by.clone(),
                    })
                }
            };
            debug!("    {} assigned to output group: {}", verb, key);

            groups.entry(key).or_default().push(OperationContext {
                verb: verb.clone(),
                path: path.clone(),
                path_item: path_item.clone(),
                operation: operation.clone(),
            });
        }
    }

    Ok(groups)
}

fn defined(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn group_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
