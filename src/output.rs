use indexmap::IndexMap;
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Receives every rendered unit.
pub trait OutputSink {
    fn write(&mut self, path: &Path, content: &str) -> Result<()>;
}

/// Writes files to disk, creating parent directories as needed.
///
/// Relative paths are placed under `root`.
#[derive(Debug, Clone, Default)]
pub struct FileSystemSink {
    root: PathBuf,
    dry_run: bool,
}

impl FileSystemSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Ensures that the specified directory exists, creating it if necessary.
    fn ensure_dir_exists(path: &Path) -> std::io::Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }
}

impl OutputSink for FileSystemSink {
    fn write(&mut self, path: &Path, content: &str) -> Result<()> {
        let output_path = self.root.join(path);
        if output_path.file_name().is_none() {
            error!("Output path must have a filename: {:?}", output_path);
            return Err(Error::OutputWrite {
                path: output_path,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "output path must have a filename",
                ),
            });
        }

        if self.dry_run {
            info!("[DRY RUN] Would write: {:?}", output_path);
            return Ok(());
        }

        let written = match output_path.parent() {
            Some(parent) => Self::ensure_dir_exists(parent),
            None => Ok(()),
        }
        .and_then(|_| fs::write(&output_path, content));

        match written {
            Ok(()) => {
                info!("{:?}", output_path);
                Ok(())
            }
            Err(source) => {
                error!("Failed to write rendered content to file: {:?}", output_path);
                Err(Error::OutputWrite {
                    path: output_path,
                    source,
                })
            }
        }
    }
}

/// Collects rendered files in memory, in emission order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: IndexMap<PathBuf, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, path: &Path, content: &str) -> Result<()> {
        self.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }
}
