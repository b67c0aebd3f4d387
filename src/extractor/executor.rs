use crate::error::{Result, SimpleExtractError};
use crate::format::{strip_known_suffixes, ArchiveCommand};
use crate::process::describe_status;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractOutcome {
    Extracted { target: PathBuf },
    /// `no_clobber` was set and the target already existed.
    Skipped { target: PathBuf },
}

/// Runs extraction plans one archive at a time.
///
/// Tools run with `output_dir` as their working directory, and stdout
/// targets are created inside it. The process working directory is never
/// changed.
pub struct Executor {
    output_dir: PathBuf,
    no_clobber: bool,
    chatter_to_stderr: bool,
}

impl Executor {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            no_clobber: false,
            chatter_to_stderr: false,
        }
    }

    pub fn with_no_clobber(mut self, no_clobber: bool) -> Self {
        self.no_clobber = no_clobber;
        self
    }

    /// Send the tools' own stdout (file listings and the like) to stderr,
    /// keeping stdout for machine-readable output. Stream targets are
    /// unaffected.
    pub fn with_chatter_to_stderr(mut self, chatter_to_stderr: bool) -> Self {
        self.chatter_to_stderr = chatter_to_stderr;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path expected on disk once `archive` has been extracted.
    pub fn target_for(&self, archive: &Path) -> PathBuf {
        self.output_dir.join(strip_known_suffixes(archive))
    }

    pub fn extract(&self, archive: &Path, plan: &ArchiveCommand) -> Result<ExtractOutcome> {
        let target = self.target_for(archive);

        if self.no_clobber && target.exists() {
            return Ok(ExtractOutcome::Skipped { target });
        }

        // Dropped on every return path below, which closes the archive.
        let input = File::open(archive)?;

        match (plan.reads_stdin, plan.writes_stdout, plan.has_pipe()) {
            (_, _, true) => self.run_piped(plan, input)?,
            (true, false, false) => self.run_with_stdin(plan, input)?,
            (true, true, false) => self.run_to_target(plan, input, &target)?,
            (false, _, false) => {
                drop(input);
                self.run_with_path(plan, archive)?
            }
        }

        Ok(ExtractOutcome::Extracted { target })
    }

    fn primary(&self, plan: &ArchiveCommand) -> Command {
        let mut command = Command::new(plan.program());
        command.args(plan.primary_args()).current_dir(&self.output_dir);
        command
    }

    fn chatter(&self) -> Stdio {
        if self.chatter_to_stderr {
            Stdio::from(std::io::stderr())
        } else {
            Stdio::inherit()
        }
    }

    /// Container formats: the archive goes in on stdin and the tool writes files.
    fn run_with_stdin(&self, plan: &ArchiveCommand, input: File) -> Result<()> {
        let status = self
            .primary(plan)
            .stdin(Stdio::from(input))
            .stdout(self.chatter())
            .status();
        check(plan.program(), status)
    }

    /// Single stream decompressors: stdin to a freshly truncated target file.
    fn run_to_target(&self, plan: &ArchiveCommand, input: File, target: &Path) -> Result<()> {
        let output = File::create(target).map_err(|e| SimpleExtractError::ExtractionFailed {
            tool: plan.program().to_string(),
            reason: format!("could not create {}: {}", target.display(), e),
        })?;

        let status = self
            .primary(plan)
            .stdin(Stdio::from(input))
            .stdout(Stdio::from(output))
            .status();

        let result = check(plan.program(), status);
        if result.is_err() {
            let _ = fs::remove_file(target);
        }
        result
    }

    fn run_with_path(&self, plan: &ArchiveCommand, archive: &Path) -> Result<()> {
        let status = self
            .primary(plan)
            .arg(archive)
            .stdout(self.chatter())
            .status();
        check(plan.program(), status)
    }

    /// `primary < archive | pipe`. The pipe stage's exit status decides the outcome.
    fn run_piped(&self, plan: &ArchiveCommand, input: File) -> Result<()> {
        let pipe_program = plan.pipe_program().unwrap_or_default();

        let mut primary = self
            .primary(plan)
            .stdin(Stdio::from(input))
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| launch_failed(plan.program(), e))?;

        let Some(primary_stdout) = primary.stdout.take() else {
            reap(&mut primary);
            return Err(SimpleExtractError::ExtractionFailed {
                tool: plan.program().to_string(),
                reason: "standard output was not captured".to_string(),
            });
        };

        let status = Command::new(pipe_program)
            .args(plan.pipe_args())
            .current_dir(&self.output_dir)
            .stdin(Stdio::from(primary_stdout))
            .stdout(self.chatter())
            .status();

        if status.is_err() {
            // Nothing reads the primary's output any more.
            let _ = primary.kill();
        }
        let _ = primary.wait();

        check(pipe_program, status)
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn launch_failed(tool: &str, error: std::io::Error) -> SimpleExtractError {
    SimpleExtractError::ExtractionFailed {
        tool: tool.to_string(),
        reason: format!("could not run {}: {}", tool, error),
    }
}

fn check(tool: &str, status: std::io::Result<ExitStatus>) -> Result<()> {
    match status {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(SimpleExtractError::ExtractionFailed {
            tool: tool.to_string(),
            reason: describe_status(status),
        }),
        Err(e) => Err(launch_failed(tool, e)),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::format::{classify_path, ArchiveFormat};
    use crate::probe::{SpawnProbe, ToolProbe};
    use std::process::Command;
    use tempfile::TempDir;

    fn have(tools: &[&str]) -> bool {
        let probe = SpawnProbe::new();
        tools.iter().all(|tool| probe.exists(tool))
    }

    fn make_tar_gz(dir: &Path) -> PathBuf {
        let staging = dir.join("staging");
        fs::create_dir_all(staging.join("data")).unwrap();
        fs::write(staging.join("data").join("hello.txt"), "hello from tar").unwrap();

        let archive = dir.join("data.tar.gz");
        let status = Command::new("tar")
            .arg("-czf")
            .arg(&archive)
            .arg("-C")
            .arg(&staging)
            .arg("data")
            .status()
            .unwrap();
        assert!(status.success());
        archive
    }

    fn make_gz(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let plain = dir.join(name);
        fs::write(&plain, contents).unwrap();
        let status = Command::new("gzip").arg("-f").arg(&plain).status().unwrap();
        assert!(status.success());
        dir.join(format!("{}.gz", name))
    }

    #[test]
    fn test_tar_gz_extracts_through_stdin() {
        if !have(&["tar", "gzip"]) {
            return;
        }
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let archive = make_tar_gz(source.path());

        let format = classify_path(&archive).unwrap();
        assert_eq!(format, ArchiveFormat::TarGzip);
        let plan = format.command();
        assert_eq!(plan.primary_command, "tar -xvzf -");
        assert!(plan.reads_stdin);

        let executor = Executor::new(output.path());
        let outcome = executor.extract(&archive, &plan).unwrap();

        assert_eq!(
            outcome,
            ExtractOutcome::Extracted {
                target: output.path().join("data")
            }
        );
        let extracted = fs::read_to_string(output.path().join("data").join("hello.txt")).unwrap();
        assert_eq!(extracted, "hello from tar");
    }

    #[test]
    fn test_gz_stream_creates_target() {
        if !have(&["gzip"]) {
            return;
        }
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let archive = make_gz(source.path(), "data", "stream contents");

        let plan = classify_path(&archive).unwrap().command();
        assert_eq!(plan.primary_command, "gzip -d -c -");
        assert!(plan.reads_stdin && plan.writes_stdout);

        // Stale content must be truncated away.
        fs::write(output.path().join("data"), "stale content that is much longer").unwrap();

        let executor = Executor::new(output.path());
        executor.extract(&archive, &plan).unwrap();

        let data = fs::read_to_string(output.path().join("data")).unwrap();
        assert_eq!(data, "stream contents");
    }

    #[test]
    fn test_failed_stream_removes_target() {
        if !have(&["gzip"]) {
            return;
        }
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let archive = source.path().join("bad.gz");
        fs::write(&archive, "this is not gzip data").unwrap();

        let plan = ArchiveFormat::Gzip.command();
        let executor = Executor::new(output.path());
        let result = executor.extract(&archive, &plan);

        match result {
            Err(SimpleExtractError::ExtractionFailed { tool, reason }) => {
                assert_eq!(tool, "gzip");
                assert!(reason.contains("Return Code"));
            }
            other => panic!("expected extraction failure, got {:?}", other),
        }
        assert!(!output.path().join("bad").exists());
    }

    #[test]
    fn test_second_no_clobber_run_writes_nothing() {
        if !have(&["gzip"]) {
            return;
        }
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let archive = make_gz(source.path(), "data", "first extraction");
        let plan = ArchiveFormat::Gzip.command();
        let target = output.path().join("data");

        let executor = Executor::new(output.path()).with_no_clobber(true);
        assert_eq!(
            executor.extract(&archive, &plan).unwrap(),
            ExtractOutcome::Extracted {
                target: target.clone()
            }
        );
        let modified = fs::metadata(&target).unwrap().modified().unwrap();

        for _ in 0..2 {
            assert_eq!(
                executor.extract(&archive, &plan).unwrap(),
                ExtractOutcome::Skipped {
                    target: target.clone()
                }
            );
        }

        assert_eq!(fs::metadata(&target).unwrap().modified().unwrap(), modified);
        assert_eq!(fs::read_to_string(&target).unwrap(), "first extraction");
    }

    #[test]
    fn test_uncreatable_target_is_extraction_failure() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let archive = source.path().join("data.gz");
        fs::write(&archive, "gz").unwrap();
        fs::create_dir(output.path().join("data")).unwrap();

        let executor = Executor::new(output.path());
        let result = executor.extract(&archive, &ArchiveFormat::Gzip.command());

        match result {
            Err(SimpleExtractError::ExtractionFailed { tool, reason }) => {
                assert_eq!(tool, "gzip");
                assert!(reason.contains("could not create"));
            }
            other => panic!("expected extraction failure, got {:?}", other),
        }
        assert!(output.path().join("data").is_dir());
    }

    #[test]
    fn test_chatter_redirect_keeps_extraction_working() {
        if !have(&["tar", "gzip"]) {
            return;
        }
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let archive = make_tar_gz(source.path());

        let executor = Executor::new(output.path()).with_chatter_to_stderr(true);
        executor
            .extract(&archive, &ArchiveFormat::TarGzip.command())
            .unwrap();

        assert!(output.path().join("data").join("hello.txt").exists());
    }

    #[test]
    fn test_pipe_stage_receives_primary_output() {
        if !have(&["cat", "tee"]) {
            return;
        }
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let archive = source.path().join("package.rpm");
        fs::write(&archive, "payload bytes").unwrap();

        let plan = ArchiveCommand::piped("cat -", "tee copy.bin");
        let executor = Executor::new(output.path());
        executor.extract(&archive, &plan).unwrap();

        let copied = fs::read_to_string(output.path().join("copy.bin")).unwrap();
        assert_eq!(copied, "payload bytes");
    }

    #[test]
    fn test_pipe_stage_status_is_authoritative() {
        if !have(&["cat", "false"]) {
            return;
        }
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let archive = source.path().join("package.rpm");
        fs::write(&archive, "payload bytes").unwrap();

        let plan = ArchiveCommand::piped("cat -", "false");
        let executor = Executor::new(output.path());
        let result = executor.extract(&archive, &plan);

        match result {
            Err(SimpleExtractError::ExtractionFailed { tool, .. }) => assert_eq!(tool, "false"),
            other => panic!("expected pipe failure, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_tool_is_extraction_failure() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let archive = source.path().join("thing.zip");
        fs::write(&archive, "zip?").unwrap();

        let plan = ArchiveCommand::path_arg("simple-extract-no-such-unzip");
        let executor = Executor::new(output.path());
        let result = executor.extract(&archive, &plan);

        assert!(matches!(
            result,
            Err(SimpleExtractError::ExtractionFailed { .. })
        ));
    }

    #[test]
    fn test_path_argument_is_appended() {
        if !have(&["tar"]) {
            return;
        }
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let archive = source.path().join("thing.zip");
        fs::write(&archive, "zip bytes").unwrap();

        // Only succeeds if the archive path arrives as the last argument.
        let plan = ArchiveCommand::path_arg("tar -cf copy.tar");
        let executor = Executor::new(output.path());
        executor.extract(&archive, &plan).unwrap();

        assert!(output.path().join("copy.tar").exists());
    }
}
