use serde::Serialize;
use std::fmt;

/// How to invoke external tools for one archive format.
///
/// Templates are whitespace separated argument lists; they never need
/// quoting. A plan with a pipe stage always reads the archive on stdin and
/// sends its stdout into the pipe stage, which the constructors enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArchiveCommand {
    pub primary_command: &'static str,
    pub pipe_command: &'static str,
    pub reads_stdin: bool,
    pub writes_stdout: bool,
}

impl ArchiveCommand {
    /// Container formats that read the archive from stdin and write files themselves.
    pub const fn stdin(primary_command: &'static str) -> Self {
        Self {
            primary_command,
            pipe_command: "",
            reads_stdin: true,
            writes_stdout: false,
        }
    }

    /// Single compressed streams decompressed from stdin to stdout.
    pub const fn stream(primary_command: &'static str) -> Self {
        Self {
            primary_command,
            pipe_command: "",
            reads_stdin: true,
            writes_stdout: true,
        }
    }

    /// Tools that take the archive path as their final argument.
    pub const fn path_arg(primary_command: &'static str) -> Self {
        Self {
            primary_command,
            pipe_command: "",
            reads_stdin: false,
            writes_stdout: false,
        }
    }

    pub const fn piped(primary_command: &'static str, pipe_command: &'static str) -> Self {
        Self {
            primary_command,
            pipe_command,
            reads_stdin: true,
            writes_stdout: false,
        }
    }

    pub fn has_pipe(&self) -> bool {
        !self.pipe_command.trim().is_empty()
    }

    /// Program name of the primary command, the one probed before extracting.
    pub fn program(&self) -> &'static str {
        self.primary_command
            .split_whitespace()
            .next()
            .unwrap_or_default()
    }

    pub fn primary_args(&self) -> Vec<&'static str> {
        self.primary_command.split_whitespace().skip(1).collect()
    }

    pub fn pipe_program(&self) -> Option<&'static str> {
        self.pipe_command.split_whitespace().next()
    }

    pub fn pipe_args(&self) -> Vec<&'static str> {
        self.pipe_command.split_whitespace().skip(1).collect()
    }
}

impl fmt::Display for ArchiveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_pipe() {
            write!(f, "{} | {}", self.primary_command, self.pipe_command)
        } else {
            write!(f, "{}", self.primary_command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_splitting() {
        let cmd = ArchiveCommand::stdin("tar --zstd -xvf -");
        assert_eq!(cmd.program(), "tar");
        assert_eq!(cmd.primary_args(), vec!["--zstd", "-xvf", "-"]);
        assert!(!cmd.has_pipe());
        assert_eq!(cmd.pipe_program(), None);
    }

    #[test]
    fn test_piped_plan_reads_stdin() {
        let cmd = ArchiveCommand::piped("rpm2cpio -", "cpio -idvm");
        assert!(cmd.has_pipe());
        assert!(cmd.reads_stdin);
        assert!(!cmd.writes_stdout);
        assert_eq!(cmd.pipe_program(), Some("cpio"));
        assert_eq!(cmd.pipe_args(), vec!["-idvm"]);
        assert_eq!(cmd.to_string(), "rpm2cpio - | cpio -idvm");
    }

    #[test]
    fn test_path_arg_plan() {
        let cmd = ArchiveCommand::path_arg("unzip");
        assert_eq!(cmd.program(), "unzip");
        assert!(cmd.primary_args().is_empty());
        assert!(!cmd.reads_stdin && !cmd.writes_stdout);
    }
}
