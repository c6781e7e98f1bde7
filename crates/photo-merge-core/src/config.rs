use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Configuration for a merge run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories to collect photos from, scanned in this order
    pub source_roots: Vec<PathBuf>,

    /// Directory receiving the deduplicated copies
    pub destination_root: PathBuf,

    /// Extension purged from the source roots before copying (`None` disables the purge)
    pub excluded_extension: Option<String>,

    /// Extensions collected into the destination
    pub target_extensions: Vec<String>,

    /// Whether to run without making changes
    pub dry_run: bool,

    /// Log level
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_roots: Vec::new(),
            destination_root: PathBuf::from("merged"),
            excluded_extension: Some("mov".to_string()),
            target_extensions: vec!["jpg".to_string(), "heic".to_string()],
            dry_run: false,
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config.normalized())
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| Error::Configuration(format!("Failed to create config file: {}", e)))?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Strip leading dots from extensions so `.jpg` and `jpg` mean the same thing
    pub fn normalized(mut self) -> Self {
        self.excluded_extension = self
            .excluded_extension
            .map(|ext| normalize_extension(&ext))
            .filter(|ext| !ext.is_empty());
        self.target_extensions = self
            .target_extensions
            .iter()
            .map(|ext| normalize_extension(ext))
            .collect();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.source_roots.is_empty() {
            return Err(Error::Configuration(
                "At least one source directory is required".to_string(),
            ));
        }

        if self.destination_root.as_os_str().is_empty() {
            return Err(Error::Configuration(
                "Destination directory must not be empty".to_string(),
            ));
        }

        if self.target_extensions.is_empty() {
            return Err(Error::Configuration(
                "At least one target extension is required".to_string(),
            ));
        }

        if let Some(ext) = self
            .target_extensions
            .iter()
            .find(|ext| normalize_extension(ext).is_empty())
        {
            return Err(Error::Configuration(format!(
                "Invalid target extension: {:?}",
                ext
            )));
        }

        // Purging a target category would delete the photos we are about to copy
        if let Some(excluded) = &self.excluded_extension {
            let excluded = normalize_extension(excluded);
            if self
                .target_extensions
                .iter()
                .any(|ext| normalize_extension(ext).eq_ignore_ascii_case(&excluded))
            {
                return Err(Error::Configuration(format!(
                    "Excluded extension '{}' is also a target extension",
                    excluded
                )));
            }
        }

        Ok(())
    }
}

/// Drop any leading dots and surrounding whitespace from an extension
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_string()
}
