use std::io::ErrorKind;
use std::process::{Command, Stdio};

/// Answers "can this program be launched on this host".
pub trait ToolProbe {
    fn exists(&self, program: &str) -> bool;
}

/// Probes by actually spawning the program with no arguments.
///
/// Only a launch failure of kind `NotFound` means the tool is missing; any
/// other failure counts as present. The spawned child is killed and reaped
/// straight away, so the probe never waits on the tool itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpawnProbe;

impl SpawnProbe {
    pub fn new() -> Self {
        Self
    }
}

impl ToolProbe for SpawnProbe {
    fn exists(&self, program: &str) -> bool {
        let spawned = Command::new(program)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                let _ = child.kill();
                let _ = child.wait();
                true
            }
            Err(e) => e.kind() != ErrorKind::NotFound,
        }
    }
}

/// Fixed availability answers, for dry runs against a known toolset and for tests.
#[derive(Debug, Default, Clone)]
pub struct StaticProbe {
    available: Vec<String>,
}

impl StaticProbe {
    pub fn new<I, S>(available: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            available: available.into_iter().map(Into::into).collect(),
        }
    }
}

impl ToolProbe for StaticProbe {
    fn exists(&self, program: &str) -> bool {
        self.available.iter().any(|p| p == program)
    }
}
