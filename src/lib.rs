pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod format;
pub mod probe;
pub mod process;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, DownloadConfig, ExtractConfig};
pub use error::{Result, SimpleExtractError, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{Executor, ExtractOutcome};
pub use fetcher::{ArchiveFetcher, Downloader, FetchDecision, FetchOutcome, RemoteReference};
pub use format::{classify, classify_path, ArchiveCommand, ArchiveFormat, FORMAT_TABLE};
pub use probe::{HttpProbe, RemoteSizeProbe, SpawnProbe, StaticProbe, ToolProbe};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// What happened to one archive in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArchiveStatus {
    Extracted { target: PathBuf },
    Skipped { target: PathBuf, reason: String },
    Failed { error: String },
    Unclassified,
    ToolMissing { tool: String },
}

impl ArchiveStatus {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ArchiveStatus::Failed { .. } | ArchiveStatus::ToolMissing { .. }
        )
    }
}

impl fmt::Display for ArchiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveStatus::Extracted { target } => write!(f, "extracted to {}", target.display()),
            ArchiveStatus::Skipped { reason, .. } => write!(f, "skipped ({})", reason),
            ArchiveStatus::Failed { error } => write!(f, "failed: {}", error),
            ArchiveStatus::Unclassified => write!(f, "no known archive format"),
            ArchiveStatus::ToolMissing { tool } => write!(f, "{} is not installed", tool),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveEntry {
    pub archive: PathBuf,
    pub format: Option<ArchiveFormat>,
    #[serde(flatten)]
    pub status: ArchiveStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadStatus {
    Downloaded { path: PathBuf },
    Skipped { path: PathBuf, reason: String },
    Dropped { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadEntry {
    pub url: String,
    #[serde(flatten)]
    pub status: DownloadStatus,
}

/// Outcome of one invocation. Per-archive failures live here rather than
/// in the `Result` returned by [`SimpleExtract::run`].
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub archives: Vec<ArchiveEntry>,
    pub downloads: Vec<DownloadEntry>,
    /// The archive set was empty after collecting inputs and fetching.
    pub nothing_to_do: bool,
    #[serde(skip)]
    started: Option<Instant>,
    #[serde(skip)]
    finished: Option<Duration>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self {
            archives: Vec::new(),
            downloads: Vec::new(),
            nothing_to_do: false,
            started: Some(Instant::now()),
            finished: None,
        }
    }

    pub fn extracted_count(&self) -> usize {
        self.count(|status| matches!(status, ArchiveStatus::Extracted { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|status| {
            matches!(
                status,
                ArchiveStatus::Skipped { .. } | ArchiveStatus::Unclassified
            )
        })
    }

    pub fn failed_count(&self) -> usize {
        self.count(ArchiveStatus::is_failure)
    }

    pub fn elapsed(&self) -> Duration {
        match (self.finished, self.started) {
            (Some(duration), _) => duration,
            (None, Some(started)) => started.elapsed(),
            (None, None) => Duration::ZERO,
        }
    }

    fn count(&self, predicate: impl Fn(&ArchiveStatus) -> bool) -> usize {
        self.archives
            .iter()
            .filter(|entry| predicate(&entry.status))
            .count()
    }

    fn record(&mut self, archive: &Path, format: Option<ArchiveFormat>, status: ArchiveStatus) {
        self.archives.push(ArchiveEntry {
            archive: archive.to_path_buf(),
            format,
            status,
        });
    }

    fn record_download(&mut self, reference: &RemoteReference, status: DownloadStatus) {
        self.downloads.push(DownloadEntry {
            url: reference.to_string(),
            status,
        });
    }

    fn finish(mut self) -> Self {
        self.finished = Some(self.elapsed());
        self
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}

/// An archive paired with the plan that extracts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveJob {
    pub archive: PathBuf,
    pub format: ArchiveFormat,
    pub command: ArchiveCommand,
}

/// What `--dry-run` would do, without fetching or extracting anything.
#[derive(Debug, Clone, Serialize)]
pub struct DryRunPlan {
    pub archives: Vec<PlannedArchive>,
    pub unclassified: Vec<PathBuf>,
    pub remotes: Vec<PlannedDownload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedArchive {
    pub archive: PathBuf,
    pub format: ArchiveFormat,
    pub command: ArchiveCommand,
    pub target: PathBuf,
    pub tool_available: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedDownload {
    pub url: String,
    pub destination: PathBuf,
}

/// Main library interface: downloads remote archives and extracts everything
/// with the system's tools.
pub struct SimpleExtract {
    config: Config,
    extract_dir: PathBuf,
    download_dir: PathBuf,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
    tools: Box<dyn ToolProbe>,
    /// Built on first use so local-only batches never start an HTTP client.
    remote: Option<Box<dyn RemoteSizeProbe>>,
}

impl SimpleExtract {
    /// Create a new SimpleExtract instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let shutdown = GracefulShutdown::new()?;
        Self::with_shutdown(config, output_mode, verbose, quiet, shutdown)
    }

    /// Create a new SimpleExtract instance for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self::with_shutdown(
            config,
            output_mode,
            verbose,
            quiet,
            GracefulShutdown::new_for_test(),
        )
        .unwrap_or_else(|e| panic!("test instance: {}", e))
    }

    fn with_shutdown(
        config: Config,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        shutdown: GracefulShutdown,
    ) -> Result<Self> {
        let extract_dir = config.extract_dir()?;
        let download_dir = config.download_dir()?;
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Ok(Self {
            config,
            extract_dir,
            download_dir,
            output_formatter,
            progress_manager,
            shutdown,
            tools: Box::new(SpawnProbe::new()),
            remote: None,
        })
    }

    /// Create SimpleExtract instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(
            config,
            output_mode,
            cli_args.verbosity_level(),
            cli_args.quiet,
        )
    }

    pub fn with_tool_probe(mut self, probe: impl ToolProbe + 'static) -> Self {
        self.tools = Box::new(probe);
        self
    }

    pub fn with_remote_probe(mut self, probe: impl RemoteSizeProbe + 'static) -> Self {
        self.remote = Some(Box::new(probe));
        self
    }

    /// Runs one batch over the raw command line inputs.
    ///
    /// Only cancellation and unexpected I/O escape as errors. Fetch and
    /// extraction failures are recorded in the returned report.
    pub fn run(&self, inputs: &[String]) -> Result<BatchReport> {
        let mut report = BatchReport::new();

        let (mut archives, remotes) = self.collect_inputs(inputs);
        archives.extend(self.resolve_remotes(&remotes, &mut report)?);

        if archives.is_empty() {
            self.output_formatter.info("Nothing to do.");
            self.output_formatter
                .info("Try passing --help for usage information.");
            report.nothing_to_do = true;
            return Ok(report.finish());
        }

        self.output_formatter.debug(&format!(
            "Archives: {}",
            archives
                .iter()
                .map(|archive| archive.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));

        let (jobs, unclassified) = self.classify_archives(&archives);
        for archive in unclassified {
            self.output_formatter.info(&format!(
                "No known archive format for {}, skipping",
                archive.display()
            ));
            report.record(&archive, None, ArchiveStatus::Unclassified);
        }

        let jobs = self.verify_tools(jobs, &mut report);
        self.extract_all(&jobs, &mut report)?;

        Ok(report.finish())
    }

    /// Splits raw inputs into existing local paths and fetchable references.
    /// Anything else is not a candidate and is dropped.
    fn collect_inputs(&self, inputs: &[String]) -> (Vec<PathBuf>, Vec<RemoteReference>) {
        let mut archives = Vec::new();
        let mut remotes = Vec::new();

        for input in inputs {
            let path = Path::new(input);
            if path.exists() {
                match std::fs::canonicalize(path) {
                    Ok(absolute) => archives.push(absolute),
                    Err(e) => self
                        .output_formatter
                        .debug(&format!("Ignoring {}: {}", input, e)),
                }
            } else if let Some(reference) = RemoteReference::parse(input) {
                remotes.push(reference);
            } else {
                self.output_formatter
                    .debug(&format!("Ignoring {}: not a file or URL", input));
            }
        }

        (archives, remotes)
    }

    fn resolve_remotes(
        &self,
        remotes: &[RemoteReference],
        report: &mut BatchReport,
    ) -> Result<Vec<PathBuf>> {
        let mut fetched = Vec::new();
        if remotes.is_empty() {
            return Ok(fetched);
        }

        let http;
        let remote: &dyn RemoteSizeProbe = match &self.remote {
            Some(remote) => remote.as_ref(),
            None => match HttpProbe::new() {
                Ok(probe) => {
                    http = probe;
                    &http
                }
                Err(e) => {
                    self.output_formatter.print_user_friendly_error(&e);
                    for reference in remotes {
                        report.record_download(
                            reference,
                            DownloadStatus::Dropped {
                                reason: e.user_message(),
                            },
                        );
                    }
                    return Ok(fetched);
                }
            },
        };

        let probe = ui::SpinnerProbe::new(remote, &self.progress_manager);
        let fetcher = ArchiveFetcher::new(self.tools.as_ref(), &probe, &self.download_dir);

        for reference in remotes {
            self.shutdown.check_shutdown()?;
            self.output_formatter
                .start_operation(&format!("Fetching {}", reference));

            match fetcher.fetch(
                reference,
                self.config.download.silent,
                self.config.download.force,
            ) {
                Ok(FetchOutcome::Downloaded { path, decision }) => {
                    self.log_decision(&decision);
                    self.output_formatter
                        .success(&format!("Downloaded {}", path.display()));
                    report.record_download(
                        reference,
                        DownloadStatus::Downloaded { path: path.clone() },
                    );
                    fetched.push(path);
                }
                Ok(FetchOutcome::Skipped { path, decision }) => {
                    self.log_decision(&decision);
                    self.output_formatter.info(&format!(
                        "Remote archive {} is the same size as local file {}. Skipping download...",
                        reference,
                        path.display()
                    ));
                    report.record_download(
                        reference,
                        DownloadStatus::Skipped {
                            path,
                            reason: "local copy has the same size".to_string(),
                        },
                    );
                }
                Err(e) => {
                    self.output_formatter.print_user_friendly_error(&e);
                    report.record_download(
                        reference,
                        DownloadStatus::Dropped {
                            reason: e.user_message(),
                        },
                    );
                }
            }
        }

        Ok(fetched)
    }

    fn log_decision(&self, decision: &FetchDecision) {
        match decision {
            FetchDecision::Forced => self.output_formatter.debug("Forced download"),
            FetchDecision::Missing => self
                .output_formatter
                .debug("No local copy, downloading"),
            FetchDecision::SameSize { size } => self.output_formatter.debug(&format!(
                "Remote and local sizes match: {} ({} bytes)",
                ui::format_bytes(*size),
                size
            )),
            FetchDecision::SizeDiffers { remote, local } => {
                self.output_formatter.info(&format!(
                    "Remote size {} ({} bytes) differs from local size {} ({} bytes)",
                    ui::format_bytes(*remote),
                    remote,
                    ui::format_bytes(*local),
                    local
                ))
            }
        }
    }

    /// Pairs archives with their plans in input order. Repeated paths are
    /// planned once.
    fn classify_archives(&self, archives: &[PathBuf]) -> (Vec<ArchiveJob>, Vec<PathBuf>) {
        let mut seen = HashSet::new();
        let mut jobs = Vec::new();
        let mut unclassified = Vec::new();

        for archive in archives {
            if !seen.insert(archive.clone()) {
                self.output_formatter
                    .debug(&format!("Already planned: {}", archive.display()));
                continue;
            }

            match classify_path(archive) {
                Some(format) => jobs.push(ArchiveJob {
                    archive: archive.clone(),
                    format,
                    command: format.command(),
                }),
                None => unclassified.push(archive.clone()),
            }
        }

        (jobs, unclassified)
    }

    fn verify_tools(&self, jobs: Vec<ArchiveJob>, report: &mut BatchReport) -> Vec<ArchiveJob> {
        let mut ready = Vec::with_capacity(jobs.len());

        for job in jobs {
            let tool = job.command.program();
            if self.tools.exists(tool) {
                ready.push(job);
                continue;
            }

            let missing = SimpleExtractError::NotFound {
                name: tool.to_string(),
            };
            self.output_formatter.warning(&format!(
                "{}, not extracting {}",
                missing.user_message(),
                job.archive.display()
            ));
            if let Some(suggestion) = missing.suggestion() {
                self.output_formatter.debug(&suggestion);
            }
            report.record(
                &job.archive,
                Some(job.format),
                ArchiveStatus::ToolMissing {
                    tool: tool.to_string(),
                },
            );
        }

        ready
    }

    fn extract_all(&self, jobs: &[ArchiveJob], report: &mut BatchReport) -> Result<()> {
        let executor = Executor::new(&self.extract_dir)
            .with_no_clobber(self.config.extract.no_clobber)
            .with_chatter_to_stderr(self.output_formatter.mode() == OutputMode::Json);

        for job in jobs {
            self.shutdown.check_shutdown()?;

            self.output_formatter
                .start_operation(&format!("Extracting {}", job.archive.display()));
            self.output_formatter.info(&format!(
                "Target: {}",
                executor.target_for(&job.archive).display()
            ));
            self.output_formatter
                .debug(&format!("{} via {}", job.format, job.command));

            let outcome = self
                .progress_manager
                .suspend(|| executor.extract(&job.archive, &job.command));

            let status = match outcome {
                Ok(ExtractOutcome::Extracted { target }) => {
                    self.output_formatter
                        .success(&format!("Extracted {}", job.archive.display()));
                    ArchiveStatus::Extracted { target }
                }
                Ok(ExtractOutcome::Skipped { target }) => {
                    self.output_formatter.warning(&format!(
                        "Target {} already exists, not overwriting",
                        target.display()
                    ));
                    ArchiveStatus::Skipped {
                        target,
                        reason: "target already exists".to_string(),
                    }
                }
                Err(e) => {
                    self.output_formatter.print_user_friendly_error(&e);
                    ArchiveStatus::Failed {
                        error: e.user_message(),
                    }
                }
            };

            report.record(&job.archive, Some(job.format), status);
        }

        Ok(())
    }

    /// Resolves what a batch would do without touching the network or disk.
    pub fn plan(&self, inputs: &[String]) -> DryRunPlan {
        let (archives, remotes) = self.collect_inputs(inputs);
        let (jobs, unclassified) = self.classify_archives(&archives);

        let executor = Executor::new(&self.extract_dir);
        let archives = jobs
            .into_iter()
            .map(|job| PlannedArchive {
                target: executor.target_for(&job.archive),
                tool_available: self.tools.exists(job.command.program()),
                archive: job.archive,
                format: job.format,
                command: job.command,
            })
            .collect();

        let remotes = remotes
            .iter()
            .map(|reference| PlannedDownload {
                url: reference.to_string(),
                destination: self.download_dir.join(reference.file_name()),
            })
            .collect();

        DryRunPlan {
            archives,
            unclassified,
            remotes,
        }
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn extract_dir(&self) -> &Path {
        &self.extract_dir
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Request graceful shutdown
    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &SimpleExtractError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
