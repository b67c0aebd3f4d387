use crate::error::Result;
use crate::probe::RemoteSizeProbe;
use serde::Serialize;
use std::path::Path;

/// Why a remote archive is or is not (re-)downloaded.
///
/// Sizes are the only thing compared: two different payloads with the same
/// byte length are indistinguishable here. Detecting that would need the
/// full body rather than a HEAD request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum FetchDecision {
    Forced,
    Missing,
    SameSize { size: u64 },
    SizeDiffers { remote: u64, local: u64 },
}

impl FetchDecision {
    pub fn should_fetch(&self) -> bool {
        !matches!(self, FetchDecision::SameSize { .. })
    }
}

/// Compares the remote content length with the local copy.
///
/// The remote is only queried when a local file exists. Probe failures are
/// returned as errors, which callers treat as "do not fetch".
pub fn decide(probe: &dyn RemoteSizeProbe, url: &str, local: &Path) -> Result<FetchDecision> {
    let local_size = match std::fs::metadata(local) {
        Ok(metadata) => metadata.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FetchDecision::Missing),
        Err(e) => return Err(e.into()),
    };

    let remote_size = probe.remote_size(url)?;

    if remote_size == local_size {
        Ok(FetchDecision::SameSize { size: local_size })
    } else {
        Ok(FetchDecision::SizeDiffers {
            remote: remote_size,
            local: local_size,
        })
    }
}

pub fn should_fetch(probe: &dyn RemoteSizeProbe, url: &str, local: &Path) -> Result<bool> {
    decide(probe, url, local).map(|decision| decision.should_fetch())
}
