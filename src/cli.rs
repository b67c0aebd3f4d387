use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "simple-extract")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A small command line utility to download and extract compressed archives")]
#[command(
    long_about = "simple-extract recognises archives by their file extension and extracts them \
                  with the tools already installed on your system (tar, unzip, 7z, gzip, xz, ...). \
                  Remote archives given as URLs are downloaded first with curl, wget or fetch."
)]
#[command(after_help = "EXAMPLES:\n  \
    simple-extract release.tar.gz\n  \
    simple-extract --no-clobber *.zip *.7z\n  \
    simple-extract --silent-download https://example.com/files/data.tar.xz\n  \
    simple-extract -C /tmp/out package.rpm")]
pub struct Cli {
    /// Archive paths or URLs to extract
    #[arg(value_name = "ARCHIVES")]
    pub archives: Vec<String>,

    /// Don't overwrite existing files
    #[arg(long, alias = "no_clobber")]
    pub no_clobber: bool,

    /// Always download remote archives, even when a local copy has the same size
    #[arg(long, alias = "force_download")]
    pub force_download: bool,

    /// Don't show archive download progress
    #[arg(long, alias = "silent_download")]
    pub silent_download: bool,

    /// Directory to extract into (defaults to the current directory)
    #[arg(short = 'C', long = "directory", value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Directory to download remote archives into (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show how each archive would be extracted without downloading or extracting
    #[arg(long)]
    pub dry_run: bool,

    /// Print the recognised archive patterns and the commands used for them
    #[arg(long)]
    pub list_formats: bool,

    /// Generate a sample configuration file
    #[arg(long)]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        config.merge_with_cli_args(&self.create_cli_overrides());
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_no_clobber(self.no_clobber)
            .with_force_download(self.force_download)
            .with_silent_download(self.silent_download)
            .with_extract_dir(self.directory.clone())
            .with_download_dir(self.download_dir.clone())
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            // Informational lines are on by default; -v adds debug detail.
            self.verbose.saturating_add(1)
        }
    }
}
