pub mod archive_fetcher;
pub mod decision;

pub use archive_fetcher::{ArchiveFetcher, Downloader, FetchOutcome, RemoteReference};
pub use decision::{decide, should_fetch, FetchDecision};
