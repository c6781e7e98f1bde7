use clap::{Args, Parser, Subcommand};
use log::{info, LevelFilter};
use photo_merge_core::{logging, Config, LogLevel, PhotoMerger, RunReport};
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photo-merge")]
#[command(about = "Merge photo folders into one directory without duplicates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Purge excluded files, then copy one file per distinct photo into the destination
    Run {
        #[command(flatten)]
        common: CommonArgs,

        /// Destination directory for the merged photos
        #[arg(short, long)]
        dest: Option<PathBuf>,

        /// Extension to collect (repeatable, replaces the configured list)
        #[arg(long = "ext", value_name = "EXT")]
        extensions: Vec<String>,

        /// Skip the purge stage
        #[arg(long)]
        no_purge: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Only delete excluded files from the source directories
    Purge {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "photo-merge.json")]
        path: PathBuf,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Source directories, in priority order
    sources: Vec<PathBuf>,

    /// Extension to delete from the sources (case-sensitive)
    #[arg(long, value_name = "EXT")]
    exclude: Option<String>,

    /// Run without making changes
    #[arg(long)]
    dry_run: bool,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write logs to a rotating file in this directory instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Hide progress bars
    #[arg(short, long)]
    quiet: bool,
}

impl CommonArgs {
    /// Load the config file (or defaults) and apply command line overrides
    fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if !self.sources.is_empty() {
            config.source_roots = self.sources.clone();
        }
        if let Some(exclude) = &self.exclude {
            config.excluded_extension = Some(exclude.clone());
        }
        if self.dry_run {
            config.dry_run = true;
        }

        config.log_level = match self.verbose {
            0 => config.log_level,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        };

        Ok(config.normalized())
    }

    fn init_logging(&self, level: LogLevel) -> anyhow::Result<()> {
        let level = LevelFilter::from(level);
        match &self.log_dir {
            Some(dir) => logging::init_logger(dir, level).map_err(|e| anyhow::anyhow!("{}", e)),
            None => {
                env_logger::Builder::new()
                    .filter_level(level)
                    .parse_default_env()
                    .init();
                Ok(())
            }
        }
    }

    fn show_progress(&self) -> bool {
        !self.quiet && std::io::stderr().is_terminal()
    }
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            common,
            dest,
            extensions,
            no_purge,
            json,
        } => {
            let mut config = common.load_config()?;
            if let Some(dest) = dest {
                config.destination_root = dest;
            }
            if !extensions.is_empty() {
                config.target_extensions = extensions;
            }
            if no_purge {
                config.excluded_extension = None;
            }
            common.init_logging(config.log_level)?;

            let merger = PhotoMerger::new(config)?.with_progress(common.show_progress());

            info!("Starting photo merge...");
            let report = merger.run()?;
            info!("Merge complete");

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_summary(&report);
            }

            Ok(())
        }

        Commands::Purge { common } => {
            let config = common.load_config()?;
            common.init_logging(config.log_level)?;

            let dry_run = config.dry_run;
            let extension = config.excluded_extension.clone().unwrap_or_default();
            let purged = purge_sources(config)?;

            let verb = if dry_run { "Would delete" } else { "Deleted" };
            println!("{} {} .{} files", verb, purged.len(), extension);

            Ok(())
        }

        Commands::GenerateConfig { path } => {
            let config = Config::default();
            config.save_to_file(&path)?;
            println!("Configuration file generated at: {}", path.display());
            Ok(())
        }
    }
}

/// Purge with the same validation and root checks as a full run
fn purge_sources(config: Config) -> anyhow::Result<Vec<PathBuf>> {
    if config.excluded_extension.is_none() {
        anyhow::bail!("No excluded extension configured");
    }

    let merger = PhotoMerger::new(config)?;
    Ok(merger.purge()?)
}

fn print_summary(report: &RunReport) {
    let prefix = if report.dry_run { "[dry run] " } else { "" };
    println!("{}Purged:            {}", prefix, report.purged.len());
    println!("{}Copied:            {}", prefix, report.copied.len());
    println!("{}Already present:   {}", prefix, report.skipped_existing.len());
    println!("{}Duplicates merged: {}", prefix, report.duplicates);

    if !report.name_conflicts.is_empty() {
        println!(
            "{}Name conflicts:    {} (not copied)",
            prefix,
            report.name_conflicts.len()
        );
        for conflict in &report.name_conflicts {
            println!("  {}", conflict.source_path.display());
        }
    }

    if !report.skipped_existing.is_empty() {
        println!(
            "Note: existing destination files are never overwritten or compared; \
             a file left by an earlier run under the same name hides the new one."
        );
    }
}
