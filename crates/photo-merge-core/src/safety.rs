use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};

/// Guards against configurations that would make a run feed on its own output
pub struct SafetyManager {
    source_roots: Vec<PathBuf>,
    destination_root: PathBuf,
}

impl SafetyManager {
    /// Create a new SafetyManager with the provided configuration
    pub fn new(config: &Config) -> Self {
        Self {
            source_roots: config.source_roots.iter().map(|p| absolute(p)).collect(),
            destination_root: absolute(&config.destination_root),
        }
    }

    /// Reject a destination that overlaps any source root.
    ///
    /// A destination inside a source would be rescanned by the next run, and
    /// a source inside the destination would be mixed with its copies.
    pub fn check(&self) -> Result<()> {
        for source in &self.source_roots {
            if self.destination_root.starts_with(source) {
                return Err(Error::SafetyCheck(format!(
                    "destination {} is inside source {}",
                    self.destination_root.display(),
                    source.display()
                )));
            }
            if source.starts_with(&self.destination_root) {
                return Err(Error::SafetyCheck(format!(
                    "source {} is inside destination {}",
                    source.display(),
                    self.destination_root.display()
                )));
            }
        }

        Ok(())
    }
}

/// Resolve symlinks when the path exists, otherwise make it absolute lexically
fn absolute(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    // A destination that does not exist yet: resolve its closest existing ancestor
    let mut existing = path;
    let mut rest = Vec::new();
    while let Some(parent) = existing.parent() {
        if let Some(name) = existing.file_name() {
            rest.push(name.to_os_string());
        }
        existing = parent;
        if let Ok(canonical) = existing.canonicalize() {
            return rest.iter().rev().fold(canonical, |acc, name| acc.join(name));
        }
    }

    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
