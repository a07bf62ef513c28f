use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the generator.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No group key at path or operation level for {path}/{verb} [{group_by}]")]
    MissingGroupKey {
        path: String,
        verb: String,
        group_by: String,
    },
    #[error("Group key for {path}/{verb} [{group_by}] must be a string, number or boolean")]
    InvalidGroupKey {
        path: String,
        verb: String,
        group_by: String,
    },
    #[error("Failed to load template {template}: {message}")]
    TemplateLoad { template: String, message: String },
    #[error("Failed to render template {template} for {unit}: {message}")]
    Render {
        template: String,
        unit: String,
        message: String,
    },
    #[error("Failed to write output file {path:?}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
