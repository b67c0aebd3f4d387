use crate::error::{SimpleExtractError, UserFriendlyError};
use crate::{ArchiveStatus, BatchReport};
use console::{style, Emoji, Term};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static PACKAGE: Emoji = Emoji("📦 ", "> ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn success(&self, message: &str) {
        self.emit(Level::Success, message);
    }

    /// Errors ignore `--quiet` and go to stderr outside JSON mode.
    pub fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }

    pub fn warning(&self, message: &str) {
        self.emit(Level::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.emit(Level::Debug, message);
    }

    pub fn start_operation(&self, operation: &str) {
        self.emit(Level::Operation, operation);
    }

    fn emit(&self, level: Level, message: &str) {
        if level != Level::Error && !self.should_show_message(level.min_verbosity()) {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_message(level, message),
            OutputMode::Json => self.print_json_message(level.json_name(), message),
            OutputMode::Plain if level == Level::Error => {
                eprintln!("{}: {}", level.plain_prefix(), message)
            }
            OutputMode::Plain => println!("{}: {}", level.plain_prefix(), message),
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &SimpleExtractError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    pub fn print_batch_summary(&self, report: &BatchReport) {
        match self.mode {
            OutputMode::Json => self.print_json_summary(report),
            _ if self.quiet || report.nothing_to_do => {}
            OutputMode::Human => self.print_human_summary(report),
            OutputMode::Plain => self.print_plain_summary(report),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    /// Emits an arbitrary JSON document in JSON mode; other modes ignore it.
    pub fn print_json_document(&self, value: &serde_json::Value) {
        if self.mode == OutputMode::Json {
            self.print_json_object(value);
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, level: Level, message: &str) {
        let line = if self.use_colors {
            let styled = match level {
                Level::Success => style(message).green().bold(),
                Level::Error => style(message).red().bold(),
                Level::Warning => style(message).yellow().bold(),
                Level::Info => style(message).cyan(),
                Level::Debug => style(message).dim(),
                Level::Operation => style(message).bold(),
            };
            format!("{}{}", level.emoji(), styled)
        } else {
            format!("{} {}", level.text_marker(), message)
        };

        match level {
            Level::Error => eprintln!("{}", line),
            Level::Debug => println!("  {}", line),
            _ => println!("{}", line),
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, report: &BatchReport) {
        self.print_separator();

        let headline = if report.failed_count() == 0 {
            "Extraction completed!"
        } else {
            "Extraction completed with errors"
        };
        if self.use_colors {
            let styled = if report.failed_count() == 0 {
                style(headline).green().bold()
            } else {
                style(headline).yellow().bold()
            };
            println!("{}{}", PACKAGE, styled);
        } else {
            println!("> {}", headline);
        }

        let count = |n: usize| {
            if self.use_colors {
                style(n).cyan().bold().to_string()
            } else {
                n.to_string()
            }
        };

        println!("  Extracted:  {}", count(report.extracted_count()));
        println!("  Skipped:    {}", count(report.skipped_count()));
        println!("  Failed:     {}", count(report.failed_count()));
        println!("  Time taken: {}", format_duration(report.elapsed()));

        let problems: Vec<_> = report
            .archives
            .iter()
            .filter(|entry| entry.status.is_failure())
            .collect();
        if !problems.is_empty() {
            println!();
            println!("Issues encountered:");
            for entry in problems {
                println!("  - {}: {}", entry.archive.display(), entry.status);
            }
        }

        self.print_separator();
    }

    fn print_json_summary(&self, report: &BatchReport) {
        let summary = serde_json::json!({
            "type": "summary",
            "nothing_to_do": report.nothing_to_do,
            "extracted": report.extracted_count(),
            "skipped": report.skipped_count(),
            "failed": report.failed_count(),
            "archives": report.archives,
            "downloads": report.downloads,
            "duration_ms": report.elapsed().as_millis() as u64,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        self.print_json_object(&summary);
    }

    fn print_plain_summary(&self, report: &BatchReport) {
        println!("COMPLETED: Extraction");
        println!("Extracted: {}", report.extracted_count());
        println!("Skipped: {}", report.skipped_count());
        println!("Failed: {}", report.failed_count());
        println!("Duration: {}", format_duration(report.elapsed()));
        for entry in &report.archives {
            if let ArchiveStatus::Failed { .. } | ArchiveStatus::ToolMissing { .. } = entry.status
            {
                println!("ERROR: {}: {}", entry.archive.display(), entry.status);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Success,
    Error,
    Warning,
    Info,
    Debug,
    Operation,
}

impl Level {
    fn min_verbosity(self) -> u8 {
        match self {
            Level::Debug => 2,
            _ => 1,
        }
    }

    fn json_name(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Operation => "operation_start",
        }
    }

    fn plain_prefix(self) -> &'static str {
        match self {
            Level::Success => "SUCCESS",
            Level::Error => "ERROR",
            Level::Warning => "WARNING",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Operation => "STARTING",
        }
    }

    fn emoji(self) -> &'static Emoji<'static, 'static> {
        match self {
            Level::Success => &CHECKMARK,
            Level::Error => &CROSS,
            Level::Warning => &WARNING,
            Level::Info | Level::Debug => &INFO,
            Level::Operation => &PACKAGE,
        }
    }

    /// Marker used when colours are off.
    fn text_marker(self) -> &'static str {
        match self {
            Level::Success => "✓",
            Level::Error => "✗",
            Level::Warning => "!",
            Level::Info => "i",
            Level::Debug => "DEBUG:",
            Level::Operation => ">",
        }
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(formatter.quiet);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
    }

    #[test]
    fn test_level_gating() {
        assert_eq!(Level::Debug.min_verbosity(), 2);
        assert_eq!(Level::Info.min_verbosity(), 1);
        assert_eq!(Level::Operation.plain_prefix(), "STARTING");
        assert_eq!(Level::Warning.json_name(), "warning");
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert!(formatter.should_show_message(1));
        assert!(!formatter.should_show_message(2));

        let quiet_formatter = OutputFormatter::new(OutputMode::Plain, 2, true);
        assert!(!quiet_formatter.should_show_message(0));
    }
}
