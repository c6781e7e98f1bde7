//! Writing planned copies into the destination directory.
//!
//! Each copy is streamed into a temporary file next to its target, gets the
//! source's permissions and timestamps, and is then renamed into place
//! without clobbering. A target name that already exists is left alone,
//! whatever its content.

use filetime::FileTime;
use indicatif::ProgressBar;
use log::debug;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::logging::{log_file_error, log_fs_modification};
use crate::types::{ActionResult, ActionType, DestinationEntry};

/// Outcome of executing a copy plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyOutcome {
    pub copied: Vec<ActionResult>,
    pub skipped_existing: Vec<ActionResult>,
}

/// Copy every entry whose name is free in `destination`.
///
/// Creates `destination` (and its parents) first. Stops at the first failed
/// copy; earlier copies stay in place. With `dry_run` nothing is written and
/// the returned outcome describes what would happen.
pub fn execute_plan(
    entries: &[DestinationEntry],
    destination: &Path,
    dry_run: bool,
    progress: &ProgressBar,
) -> Result<CopyOutcome> {
    if !dry_run {
        fs::create_dir_all(destination)?;
    }

    let mut outcome = CopyOutcome::default();

    for entry in entries {
        let target = destination.join(&entry.name);
        let mut result = ActionResult {
            action_type: ActionType::Copy,
            source_path: entry.source.clone(),
            destination_path: Some(target.clone()),
        };

        if target.exists() {
            debug!("{} already exists, skipping", target.display());
            result.action_type = ActionType::SkipExisting;
            outcome.skipped_existing.push(result);
        } else if dry_run {
            debug!("Would copy {} -> {}", entry.source.display(), target.display());
            outcome.copied.push(result);
        } else if copy_no_clobber(&entry.source, &target)? {
            let from = entry.source.to_string_lossy();
            log_fs_modification("copy", &target, Some(&*from));
            outcome.copied.push(result);
        } else {
            // Appeared between the existence check and the rename
            result.action_type = ActionType::SkipExisting;
            outcome.skipped_existing.push(result);
        }

        progress.inc(1);
    }

    Ok(outcome)
}

/// Copy `from` to `to` with permissions and timestamps, never replacing an existing `to`.
///
/// Returns `Ok(false)` when `to` already exists.
pub fn copy_no_clobber(from: &Path, to: &Path) -> Result<bool> {
    let copy_error = |source: io::Error| {
        log_file_error(from, "copy", &source);
        Error::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }
    };

    let dir = to.parent().unwrap_or_else(|| Path::new("."));
    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(copy_error)?;

    let metadata = {
        let mut source = File::open(from).map_err(copy_error)?;
        io::copy(&mut source, temp_file.as_file_mut()).map_err(copy_error)?;
        source.metadata().map_err(copy_error)?
    };
    temp_file.flush().map_err(copy_error)?;

    fs::set_permissions(temp_file.path(), metadata.permissions()).map_err(copy_error)?;
    filetime::set_file_times(
        temp_file.path(),
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )
    .map_err(copy_error)?;

    // The temp file is removed on drop if the rename does not happen
    match temp_file.persist_noclobber(to) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(copy_error(e.error)),
    }
}
