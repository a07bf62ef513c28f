//! The values handed to a compiled template.

use minijinja::Value;
use serde::Serialize;

use crate::config::ResolvedOptions;
use crate::definitions::{DefinitionEntry, DefinitionRegistry};
use crate::grouping::OperationContext;
use crate::model::SwaggerModel;

/// The model and definition registry of a run, converted to template values.
///
/// Built once per run. Every render context refers to these values, which
/// are passed to templates as they are instead of being serialized again.
#[derive(Debug, Clone)]
pub struct SharedValues {
    pub model: Value,
    pub definition_map: Value,
}

impl SharedValues {
    pub fn new(model: &SwaggerModel, registry: &DefinitionRegistry) -> Self {
        Self {
            model: Value::from_serialize(model),
            definition_map: Value::from_serialize(registry),
        }
    }
}

/// Context for one definition of a per-definition job.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionContext<'a> {
    pub model: &'a Value,
    pub definition: &'a DefinitionEntry,
    pub definition_map: &'a Value,
    pub options: &'a ResolvedOptions,
}

/// Context for one operation group of a per-path job.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathContext<'a> {
    pub file_name: String,
    pub group_key: &'a str,
    pub members: &'a [OperationContext],
    pub definition_map: &'a Value,
    pub model: &'a Value,
    pub options: &'a ResolvedOptions,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RenderContext<'a> {
    Definition(DefinitionContext<'a>),
    Path(PathContext<'a>),
}

impl<'a> RenderContext<'a> {
    /// A short label for log lines and error messages.
    pub fn unit(&self) -> String {
        match self {
            RenderContext::Definition(ctx) => format!("definition {}", ctx.definition.name),
            RenderContext::Path(ctx) => format!("group {}", ctx.group_key),
        }
    }
}

/// Output file stem for a group key: trimmed and lower-cased.
pub fn group_file_name(group_key: &str) -> String {
    group_key.trim().to_lowercase()
}
