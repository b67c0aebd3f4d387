use clap::Parser;
use simple_extract::ui::signals::INTERRUPTED_EXIT_CODE;
use simple_extract::{
    Cli, DryRunPlan, OutputFormatter, OutputMode, SimpleExtract, SimpleExtractError,
    UserFriendlyError, FORMAT_TABLE,
};
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    if cli.list_formats {
        return handle_list_formats();
    }

    let extract = match SimpleExtract::from_cli(&cli) {
        Ok(extract) => extract,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    if cli.dry_run {
        return handle_dry_run(&cli, &extract);
    }

    match extract.run(&cli.archives) {
        Ok(report) => {
            extract.output_formatter().print_batch_summary(&report);
            // Per-archive failures are reported, not reflected in the exit code.
            0
        }
        Err(e) => {
            extract.handle_error(&e);

            match e {
                SimpleExtractError::Cancelled => INTERRUPTED_EXIT_CODE,
                _ => 1,
            }
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "simple-extract.toml".to_string());

    match SimpleExtract::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  simple-extract --config {} <archives>", config_path);
            0
        }
        Err(e) => {
            eprintln!(
                "Failed to generate configuration file: {}",
                e.user_message()
            );
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_list_formats() -> i32 {
    println!("{:<12} {:<10} {:<22} {:<12} FLAGS", "PATTERN", "FORMAT", "COMMAND", "PIPE");
    for (pattern, format) in FORMAT_TABLE {
        let command = format.command();
        println!(
            "{:<12} {:<10} {:<22} {:<12} {}",
            pattern,
            format.as_str(),
            command.primary_command,
            command.pipe_command,
            flags(command.reads_stdin, command.writes_stdout)
        );
    }
    0
}

fn handle_dry_run(cli: &Cli, extract: &SimpleExtract) -> i32 {
    let formatter = extract.output_formatter();
    let plan = extract.plan(&cli.archives);

    if formatter.mode() == OutputMode::Json {
        match serde_json::to_value(&plan) {
            Ok(value) => formatter.print_json_document(&value),
            Err(e) => {
                formatter.error(&format!("Failed to serialize plan: {}", e));
                return 1;
            }
        }
        return 0;
    }

    formatter.info("DRY RUN MODE - Nothing will be downloaded or extracted");
    formatter.print_separator();
    print_plan(&plan, extract);
    formatter.print_separator();
    formatter.info("Run without --dry-run to perform the extraction");

    0
}

fn print_plan(plan: &DryRunPlan, extract: &SimpleExtract) {
    let config = extract.config();
    println!("  Extract directory:  {}", extract.extract_dir().display());
    println!("  Download directory: {}", extract.download_dir().display());
    println!("  No clobber:         {}", config.extract.no_clobber);
    println!("  Force download:     {}", config.download.force);

    if plan.archives.is_empty() && plan.remotes.is_empty() {
        println!();
        println!("Nothing to do.");
        return;
    }

    for remote in &plan.remotes {
        println!();
        println!("{}", remote.url);
        println!("  Download to: {}", remote.destination.display());
    }

    for archive in &plan.archives {
        println!();
        println!("{}", archive.archive.display());
        println!("  Format:  {}", archive.format);
        println!("  Command: {}", archive.command.primary_command);
        if archive.command.has_pipe() {
            println!("  Pipe:    {}", archive.command.pipe_command);
        }
        println!(
            "  Flags:   {}",
            flags(archive.command.reads_stdin, archive.command.writes_stdout)
        );
        println!("  Target:  {}", archive.target.display());
        println!(
            "  Tool:    {} ({})",
            archive.command.program(),
            if archive.tool_available {
                "available"
            } else {
                "missing"
            }
        );
    }

    for archive in &plan.unclassified {
        println!();
        println!("{}", archive.display());
        println!("  No known archive format, would be skipped");
    }
}

fn flags(reads_stdin: bool, writes_stdout: bool) -> &'static str {
    match (reads_stdin, writes_stdout) {
        (true, true) => "stdin,stdout",
        (true, false) => "stdin",
        (false, true) => "stdout",
        (false, false) => "-",
    }
}

fn print_startup_error(error: &SimpleExtractError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let cli = Cli::parse_from([
            "simple-extract",
            "--generate-config",
            "--config",
            config_path.to_str().unwrap(),
        ]);

        let exit_code = handle_generate_config(&cli);
        assert_eq!(exit_code, 0);

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[extract]"));
    }

    #[test]
    fn test_flags_column() {
        assert_eq!(flags(true, true), "stdin,stdout");
        assert_eq!(flags(true, false), "stdin");
        assert_eq!(flags(false, false), "-");
    }

    #[test]
    fn test_list_formats_succeeds() {
        assert_eq!(handle_list_formats(), 0);
    }
}
