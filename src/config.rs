use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::grouping::GroupOptions;
use crate::loader::TextEncoding;

/// Output file suffix used when neither the job nor `defaults` sets one.
pub const DEFAULT_EXTENSION: &str = ".js";

/// Verbs considered when neither the job nor `defaults` sets `operations`.
pub const DEFAULT_OPERATIONS: [&str; 4] = ["get", "put", "post", "delete"];

/// A generation run description, usually loaded from YAML.
///
/// ```yaml
/// swagger: api.yaml
/// defaults:
///   extension: .ts
/// per_definition:
///   templates/model.j2:
///     target: out/models
/// per_path:
///   templates/controller.j2:
///     target: out/controllers
///     group_by: x-swagger-router-controller
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodegenConfig {
    /// API description to process. Only read by the command line front end.
    #[serde(default)]
    pub swagger: Option<PathBuf>,

    #[serde(default, alias = "textEncoding")]
    pub text_encoding: TextEncoding,

    /// Job option fallbacks shared by every job.
    #[serde(default)]
    pub defaults: JobDefaults,

    /// Template source to options, rendered once per definition.
    #[serde(default, alias = "perDefinition")]
    pub per_definition: IndexMap<String, JobOptions>,

    /// Template source to options, rendered once per operation group.
    #[serde(default, alias = "perPath")]
    pub per_path: IndexMap<String, JobOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobDefaults {
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub operations: Option<Vec<String>>,
}

/// Options of a single template job as written by the user.
///
/// Unknown fields are kept in `extra` and reach templates through `options`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobOptions {
    pub target: PathBuf,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub operations: Option<Vec<String>>,
    #[serde(default, alias = "groupBy")]
    pub group_by: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Job options after defaults were applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOptions {
    pub target: PathBuf,
    pub extension: String,
    pub operations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateJob {
    pub template: String,
    pub options: ResolvedOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathJob {
    pub job: TemplateJob,
    pub grouping: GroupOptions,
}

/// Everything the generator needs, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub text_encoding: TextEncoding,
    pub definition_jobs: Vec<TemplateJob>,
    pub path_jobs: Vec<PathJob>,
}

impl CodegenConfig {
    /// Creates an empty configuration with no jobs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parses a YAML configuration.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Adds a job rendered once per definition.
    pub fn per_definition(mut self, template: impl Into<String>, options: JobOptions) -> Self {
        self.per_definition.insert(template.into(), options);
        self
    }

    /// Adds a job rendered once per operation group.
    pub fn per_path(mut self, template: impl Into<String>, options: JobOptions) -> Self {
        self.per_path.insert(template.into(), options);
        self
    }

    /// Sets the fallbacks shared by every job.
    pub fn defaults(mut self, defaults: JobDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Applies defaults to every job and validates the result.
    ///
    /// Each field resolves as: job value, then `defaults`, then the built-in
    /// default. Lists are taken whole from the first level that sets them.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        debug!("Processing configuration");
        let mut definition_jobs = Vec::with_capacity(self.per_definition.len());
        for (template, options) in &self.per_definition {
            let job = self.resolve_job(template, options)?;
            definition_jobs.push(job);
        }

        let mut path_jobs = Vec::with_capacity(self.per_path.len());
        for (template, options) in &self.per_path {
            let job = self.resolve_job(template, options)?;
            let group_by = match job.options.group_by.as_deref() {
                Some(field) if !field.trim().is_empty() => field.to_string(),
                _ => {
                    return Err(Error::config(format!(
                        "per-path template {} has no group_by field",
                        template
                    )))
                }
            };
            let grouping = GroupOptions {
                group_by,
                operations: job.options.operations.clone(),
            };
            path_jobs.push(PathJob { job, grouping });
        }

        Ok(ResolvedConfig {
            text_encoding: self.text_encoding,
            definition_jobs,
            path_jobs,
        })
    }

    fn resolve_job(&self, template: &str, options: &JobOptions) -> Result<TemplateJob> {
        if options.target.as_os_str().is_empty() {
            return Err(Error::config(format!(
                "template {} has an empty target",
                template
            )));
        }
        Ok(TemplateJob {
            template: template.to_string(),
            options: options.resolve(&self.defaults),
        })
    }
}

impl JobOptions {
    /// Creates options writing to `target`, everything else unset.
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Sets the output file suffix, including the dot.
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Sets the verbs considered for grouping, in visit order.
    pub fn operations<I, S>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operations = Some(operations.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the field whose value groups operations.
    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by = Some(field.into());
        self
    }

    /// Applies `defaults` and the built-in fallbacks.
    pub fn resolve(&self, defaults: &JobDefaults) -> ResolvedOptions {
        let extension = self
            .extension
            .clone()
            .or_else(|| defaults.extension.clone())
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
        let operations = self
            .operations
            .clone()
            .or_else(|| defaults.operations.clone())
            .unwrap_or_else(|| DEFAULT_OPERATIONS.iter().map(|s| s.to_string()).collect());
        ResolvedOptions {
            target: self.target.clone(),
            extension,
            operations,
            group_by: self.group_by.clone(),
            extra: self.extra.clone(),
        }
    }
}

impl ResolvedOptions {
    /// `target/<stem><extension>`.
    pub fn output_path(&self, stem: &str) -> PathBuf {
        self.target.join(format!("{}{}", stem, self.extension))
    }
}
