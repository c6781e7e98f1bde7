//! Core functionality for merging photo folders without duplicates.
//!
//! A run has two stages over the same source roots:
//! - purge: delete every file of the excluded extension (`.mov` by default)
//! - dedup-copy: collect the target extensions (`.jpg`, `.heic` by default),
//!   group them by name and content, and copy one file per distinct content
//!   into the destination, numbering same-named variants `_1`, `_2`, ...
//!
//! Any error aborts the run. Work done before the error stays done.

// -- External Dependencies --
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

// -- Standard Library --
use std::path::{Path, PathBuf};

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::*;
pub use error::{Error, Result};
pub use types::*;

// -- Public Modules --
pub mod action;
pub mod config;
pub mod deduplication;
pub mod discovery;
pub mod hashing;
pub mod logging;
pub mod purge;
pub mod safety;
pub mod types;

/// Main entry point for a merge run
pub struct PhotoMerger {
    config: Config,
    safety_manager: safety::SafetyManager,
    show_progress: bool,
}

impl PhotoMerger {
    /// Create a new PhotoMerger with the provided configuration
    pub fn new(config: Config) -> Result<Self> {
        let config = config.normalized();
        config.validate()?;
        let safety_manager = safety::SafetyManager::new(&config);

        Ok(Self {
            config,
            safety_manager,
            show_progress: false,
        })
    }

    /// Draw progress bars on stderr while hashing and copying
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the purge stage followed by the dedup-copy stage
    pub fn run(&self) -> Result<RunReport> {
        // Nothing is touched unless every root is usable
        discovery::check_source_roots(&self.config.source_roots)?;
        self.safety_manager.check()?;

        let purged = self.purge_stage()?;
        let mut report = self.dedup_copy_stage()?;
        report.purged = purged;

        Ok(report)
    }

    /// Delete every excluded file under the source roots
    pub fn purge(&self) -> Result<Vec<PathBuf>> {
        discovery::check_source_roots(&self.config.source_roots)?;
        self.purge_stage()
    }

    /// Discover, hash, group and copy the target files
    pub fn dedup_copy(&self) -> Result<RunReport> {
        discovery::check_source_roots(&self.config.source_roots)?;
        self.safety_manager.check()?;
        self.dedup_copy_stage()
    }

    fn purge_stage(&self) -> Result<Vec<PathBuf>> {
        let Some(extension) = &self.config.excluded_extension else {
            info!("No excluded extension configured, skipping purge");
            return Ok(Vec::new());
        };

        info!("Purging .{} files...", extension);
        let purged =
            purge::purge_excluded(&self.config.source_roots, extension, self.config.dry_run)?;
        info!("Purged {} files", purged.len());

        Ok(purged)
    }

    fn dedup_copy_stage(&self) -> Result<RunReport> {
        info!("Discovering photos...");
        let discovered = discovery::discover_sources(
            &self.config.source_roots,
            &self.config.target_extensions,
        )?;
        info!("Found {} photos", discovered.len());

        // Every file is hashed before any naming decision
        let progress = self.progress_bar(discovered.len(), "Hashing");
        let files = hashing::hash_files(discovered, &progress)?;
        progress.finish_and_clear();

        let plan = deduplication::build_plan(&files);
        info!(
            "{} distinct photos, {} duplicates, {} name conflicts",
            plan.entries.len(),
            plan.duplicates,
            plan.conflicts.len()
        );

        self.execute(&plan, &self.config.destination_root)
    }

    fn execute(&self, plan: &deduplication::CopyPlan, destination: &Path) -> Result<RunReport> {
        info!("Copying into {}...", destination.display());
        let progress = self.progress_bar(plan.entries.len(), "Copying");
        let outcome =
            action::execute_plan(&plan.entries, destination, self.config.dry_run, &progress)?;
        progress.finish_and_clear();

        info!(
            "Copied {} files, {} names already present",
            outcome.copied.len(),
            outcome.skipped_existing.len()
        );

        let name_conflicts = plan
            .conflicts
            .iter()
            .map(|entry| ActionResult {
                action_type: ActionType::NameConflict,
                source_path: entry.source.clone(),
                destination_path: Some(destination.join(&entry.name)),
            })
            .collect();

        Ok(RunReport {
            dry_run: self.config.dry_run,
            purged: Vec::new(),
            copied: outcome.copied,
            skipped_existing: outcome.skipped_existing,
            name_conflicts,
            duplicates: plan.duplicates,
            planned: plan.entries.len(),
        })
    }

    fn progress_bar(&self, len: usize, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{eta}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
        {
            progress_bar.set_style(style.progress_chars("##-"));
        }
        progress_bar.set_message(message);
        progress_bar
    }
}
