use crate::error::{Result, SimpleExtractError};
use crate::fetcher::decision::{decide, FetchDecision};
use crate::probe::{RemoteSizeProbe, ToolProbe};
use crate::process::describe_status;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use url::Url;

/// A URL with scheme, host and a file name in its path.
///
/// Query strings and fragments are dropped, leaving `scheme://host/path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteReference {
    url: Url,
    file_name: String,
}

impl RemoteReference {
    /// Returns `None` for anything that is not a fetchable reference. That is
    /// not an error: the input simply is not a candidate.
    pub fn parse(input: &str) -> Option<Self> {
        let mut url = Url::parse(input).ok()?;

        if url.scheme().is_empty() || url.host_str().map_or(true, str::is_empty) {
            return None;
        }

        let file_name = url
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .last()?
            .to_string();

        url.set_query(None);
        url.set_fragment(None);

        Some(Self { url, file_name })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl fmt::Display for RemoteReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Download programs in probing priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Downloader {
    Curl,
    Wget,
    Fetch,
}

impl Downloader {
    pub const PRIORITY: [Downloader; 3] = [Downloader::Curl, Downloader::Wget, Downloader::Fetch];

    pub fn program(&self) -> &'static str {
        match self {
            Downloader::Curl => "curl",
            Downloader::Wget => "wget",
            Downloader::Fetch => "fetch",
        }
    }

    /// Arguments that follow redirects and write the body to stdout.
    pub fn args(&self, silent: bool, url: &str) -> Vec<String> {
        let mut args: Vec<&str> = match self {
            Downloader::Curl => vec!["-L"],
            Downloader::Wget | Downloader::Fetch => vec![],
        };

        if silent {
            args.push(match self {
                Downloader::Curl => "-s",
                Downloader::Wget | Downloader::Fetch => "-q",
            });
        }

        args.extend(match self {
            Downloader::Curl | Downloader::Fetch => ["-o", "-"],
            Downloader::Wget => ["-O", "-"],
        });

        args.into_iter()
            .map(str::to_string)
            .chain(std::iter::once(url.to_string()))
            .collect()
    }

    pub fn select(probe: &dyn ToolProbe) -> Result<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|downloader| probe.exists(downloader.program()))
            .ok_or(SimpleExtractError::NoDownloaderAvailable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    Downloaded { path: PathBuf, decision: FetchDecision },
    /// The local copy already matches the remote. Not an error, and not an
    /// archive to extract either.
    Skipped { path: PathBuf, decision: FetchDecision },
}

pub struct ArchiveFetcher<'a> {
    tools: &'a dyn ToolProbe,
    remote: &'a dyn RemoteSizeProbe,
    download_dir: PathBuf,
}

impl<'a> ArchiveFetcher<'a> {
    pub fn new(
        tools: &'a dyn ToolProbe,
        remote: &'a dyn RemoteSizeProbe,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tools,
            remote,
            download_dir: download_dir.into(),
        }
    }

    pub fn destination(&self, reference: &RemoteReference) -> PathBuf {
        self.download_dir.join(reference.file_name())
    }

    pub fn fetch(
        &self,
        reference: &RemoteReference,
        silent: bool,
        force: bool,
    ) -> Result<FetchOutcome> {
        let destination = self.destination(reference);
        let downloader = Downloader::select(self.tools)?;

        let decision = if force {
            FetchDecision::Forced
        } else {
            decide(self.remote, reference.as_str(), &destination)?
        };

        if !decision.should_fetch() {
            return Ok(FetchOutcome::Skipped {
                path: destination,
                decision,
            });
        }

        self.download(downloader, reference, silent, &destination)?;

        Ok(FetchOutcome::Downloaded {
            path: destination,
            decision,
        })
    }

    fn download(
        &self,
        downloader: Downloader,
        reference: &RemoteReference,
        silent: bool,
        destination: &Path,
    ) -> Result<()> {
        let outfile = fs::File::create(destination)?;

        let status = Command::new(downloader.program())
            .args(downloader.args(silent, reference.as_str()))
            .stdin(Stdio::null())
            .stdout(Stdio::from(outfile))
            .status();

        let reason = match status {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => describe_status(status),
            Err(e) => format!("could not run {}: {}", downloader.program(), e),
        };

        let _ = fs::remove_file(destination);

        Err(SimpleExtractError::DownloadFailed {
            url: reference.to_string(),
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::decision::tests::FixedSize;
    use crate::probe::StaticProbe;
    use tempfile::TempDir;

    #[test]
    fn test_parse_remote_references() {
        let reference = RemoteReference::parse("https://example.com/files/data.tar.gz").unwrap();
        assert_eq!(reference.file_name(), "data.tar.gz");
        assert_eq!(reference.as_str(), "https://example.com/files/data.tar.gz");

        let reference =
            RemoteReference::parse("http://example.com:8080/a/b.zip?token=1#frag").unwrap();
        assert_eq!(reference.as_str(), "http://example.com:8080/a/b.zip");
        assert_eq!(reference.file_name(), "b.zip");
    }

    #[test]
    fn test_reject_non_candidates() {
        let rejected = [
            "data.tar.gz",
            "/tmp/data.tar.gz",
            "https://example.com",
            "https://example.com/",
            "file:///tmp/data.tar.gz",
            "mailto:someone@example.com",
            "",
        ];

        for input in &rejected {
            assert!(RemoteReference::parse(input).is_none(), "should reject {:?}", input);
        }
    }

    #[test]
    fn test_downloader_priority() {
        let probe = StaticProbe::new(["fetch", "wget", "curl"]);
        assert_eq!(Downloader::select(&probe).unwrap(), Downloader::Curl);

        let probe = StaticProbe::new(["fetch", "wget"]);
        assert_eq!(Downloader::select(&probe).unwrap(), Downloader::Wget);

        let probe = StaticProbe::new(["fetch"]);
        assert_eq!(Downloader::select(&probe).unwrap(), Downloader::Fetch);

        let probe = StaticProbe::default();
        assert!(matches!(
            Downloader::select(&probe),
            Err(SimpleExtractError::NoDownloaderAvailable)
        ));
    }

    #[test]
    fn test_downloader_arguments() {
        let url = "https://example.com/x.tgz";
        assert_eq!(Downloader::Curl.args(false, url), ["-L", "-o", "-", url]);
        assert_eq!(Downloader::Curl.args(true, url), ["-L", "-s", "-o", "-", url]);
        assert_eq!(Downloader::Wget.args(false, url), ["-O", "-", url]);
        assert_eq!(Downloader::Wget.args(true, url), ["-q", "-O", "-", url]);
        assert_eq!(Downloader::Fetch.args(true, url), ["-q", "-o", "-", url]);
    }

    #[test]
    fn test_same_size_is_skipped_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join("data.tar.gz");
        std::fs::write(&local, b"12345").unwrap();

        let tools = StaticProbe::new(["curl"]);
        let remote = FixedSize::new(Some(5));
        let fetcher = ArchiveFetcher::new(&tools, &remote, temp_dir.path());
        let reference = RemoteReference::parse("https://example.com/data.tar.gz").unwrap();

        let outcome = fetcher.fetch(&reference, true, false).unwrap();
        assert_eq!(
            outcome,
            FetchOutcome::Skipped {
                path: local.clone(),
                decision: FetchDecision::SameSize { size: 5 },
            }
        );
        assert_eq!(std::fs::read(&local).unwrap(), b"12345");
    }

    #[test]
    fn test_no_downloader_fails_before_probing() {
        let temp_dir = TempDir::new().unwrap();
        let tools = StaticProbe::default();
        let remote = FixedSize::new(Some(5));
        let fetcher = ArchiveFetcher::new(&tools, &remote, temp_dir.path());
        let reference = RemoteReference::parse("https://example.com/data.tar.gz").unwrap();

        let result = fetcher.fetch(&reference, true, false);
        assert!(matches!(result, Err(SimpleExtractError::NoDownloaderAvailable)));
        assert_eq!(remote.calls.get(), 0);
    }

    #[test]
    fn test_probe_failure_keeps_local_copy() {
        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join("data.tar.gz");
        std::fs::write(&local, b"good copy").unwrap();

        let tools = StaticProbe::new(["curl"]);
        let remote = FixedSize::new(None);
        let fetcher = ArchiveFetcher::new(&tools, &remote, temp_dir.path());
        let reference = RemoteReference::parse("https://example.com/data.tar.gz").unwrap();

        let result = fetcher.fetch(&reference, true, false);
        assert!(matches!(result, Err(SimpleExtractError::NetworkError { .. })));
        assert_eq!(std::fs::read(&local).unwrap(), b"good copy");
    }

    #[test]
    fn test_failed_download_leaves_no_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        // Whether or not curl is installed, the port is closed and the download fails.
        let tools = StaticProbe::new(["curl"]);
        let remote = FixedSize::new(Some(5));
        let fetcher = ArchiveFetcher::new(&tools, &remote, temp_dir.path());
        let reference = RemoteReference::parse("http://127.0.0.1:1/data.tar.gz").unwrap();

        let result = fetcher.fetch(&reference, true, true);
        assert!(matches!(result, Err(SimpleExtractError::DownloadFailed { .. })));
        assert!(!temp_dir.path().join("data.tar.gz").exists());
        assert_eq!(remote.calls.get(), 0);
    }
}
