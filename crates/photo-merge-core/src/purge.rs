//! Removal of an excluded file category from the source roots.
//!
//! The extension match is case-sensitive: only files whose extension is
//! exactly the excluded one are removed. Deletion is permanent.

use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::discovery::walk_files;
use crate::error::{Error, Result};
use crate::logging::{log_file_error, log_fs_modification};

/// Find every file under the roots whose extension is exactly `extension`.
///
/// Symlinks count as files; purging one removes the link, not its target.
pub fn find_excluded<P: AsRef<Path>>(directories: &[P], extension: &str) -> Result<Vec<PathBuf>> {
    let mut matches = Vec::new();
    for dir in directories {
        matches.extend(
            walk_files(dir.as_ref())?
                .into_iter()
                .filter(|path| has_excluded_extension(path, extension)),
        );
    }

    Ok(matches)
}

/// Delete every excluded file under the roots and return what was removed.
///
/// Every root is walked before the first unlink, so a bad root deletes nothing.
/// The first failing unlink aborts the purge; files removed before it stay removed.
/// With `dry_run` nothing is deleted and the matches are returned as-is.
pub fn purge_excluded<P: AsRef<Path>>(
    directories: &[P],
    extension: &str,
    dry_run: bool,
) -> Result<Vec<PathBuf>> {
    let matches = find_excluded(directories, extension)?;
    info!("Found {} .{} files to purge", matches.len(), extension);

    if dry_run {
        for path in &matches {
            debug!("Would delete {}", path.display());
        }
        return Ok(matches);
    }

    let mut deleted = Vec::with_capacity(matches.len());
    for path in matches {
        if let Err(source) = std::fs::remove_file(&path) {
            log_file_error(&path, "delete", &source);
            return Err(Error::Deletion { path, source });
        }
        log_fs_modification("delete", &path, None);
        deleted.push(path);
    }

    Ok(deleted)
}

fn has_excluded_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(extension)
}
