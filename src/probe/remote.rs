use crate::error::{Result, SimpleExtractError};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_LENGTH;

/// Metadata-only lookup of a remote resource's byte length.
pub trait RemoteSizeProbe {
    fn remote_size(&self, url: &str) -> Result<u64>;
}

/// Issues a HEAD request and reads `Content-Length`.
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("simple-extract/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl RemoteSizeProbe for HttpProbe {
    fn remote_size(&self, url: &str) -> Result<u64> {
        let response = self.client.head(url).send()?.error_for_status()?;

        // Read the header itself: the body of a HEAD response is always empty.
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .ok_or_else(|| SimpleExtractError::NetworkError {
                url: url.to_string(),
                message: "missing or invalid content-length".to_string(),
            })
    }
}
