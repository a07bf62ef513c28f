use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::engine::{RenderFn, TemplateEngine};
use crate::error::{Error, Result};

/// Encoding used when reading template source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Latin1,
}

impl TextEncoding {
    pub fn decode(self, bytes: Vec<u8>) -> std::result::Result<String, String> {
        match self {
            TextEncoding::Utf8 => String::from_utf8(bytes).map_err(|e| e.to_string()),
            TextEncoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            other => Err(format!("unsupported text encoding: {}", other)),
        }
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => f.write_str("utf-8"),
            TextEncoding::Latin1 => f.write_str("latin1"),
        }
    }
}

/// Fetches template source and compiles it through an engine.
pub trait TemplateLoader {
    fn load(
        &self,
        engine: &dyn TemplateEngine,
        source: &str,
        encoding: TextEncoding,
    ) -> Result<RenderFn>;
}

/// Reads templates from the filesystem. Relative sources resolve against
/// `base_dir` when one is set.
#[derive(Debug, Clone, Default)]
pub struct FileTemplateLoader {
    base_dir: Option<PathBuf>,
}

impl FileTemplateLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, source: &str) -> PathBuf {
        match &self.base_dir {
            Some(base) => base.join(source),
            None => Path::new(source).to_path_buf(),
        }
    }
}

impl TemplateLoader for FileTemplateLoader {
    fn load(
        &self,
        engine: &dyn TemplateEngine,
        source: &str,
        encoding: TextEncoding,
    ) -> Result<RenderFn> {
        let path = self.resolve(source);
        debug!("Loading text file template from {:?}", path);
        let load_error = |message: String| Error::TemplateLoad {
            template: source.to_string(),
            message,
        };

        debug!("    Reading file content as {}", encoding);
        let bytes = std::fs::read(&path)
            .map_err(|e| load_error(format!("{:?}: {}", path, e)))?;
        let content = encoding.decode(bytes).map_err(load_error)?;

        debug!("    Parsing with templating engine");
        let template = engine.compile(source, content).map_err(load_error)?;
        debug!("    Compiled successfully.");
        Ok(template)
    }
}

/// Serves templates from memory, keyed by source name.
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplateLoader {
    templates: IndexMap<String, String>,
}

impl MemoryTemplateLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(name.into(), source.into());
    }
}

impl TemplateLoader for MemoryTemplateLoader {
    fn load(
        &self,
        engine: &dyn TemplateEngine,
        source: &str,
        _encoding: TextEncoding,
    ) -> Result<RenderFn> {
        debug!("Loading in-memory template {}", source);
        let content = self
            .templates
            .get(source)
            .ok_or_else(|| Error::TemplateLoad {
                template: source.to_string(),
                message: "no such template".to_string(),
            })?;
        engine
            .compile(source, content.clone())
            .map_err(|message| Error::TemplateLoad {
                template: source.to_string(),
                message,
            })
    }
}
