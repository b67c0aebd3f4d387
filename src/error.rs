use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimpleExtractError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {name}")]
    NotFound { name: String },

    #[error("Network error for {url}: {message}")]
    NetworkError { url: String, message: String },

    #[error("Download of {url} failed: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("No suitable download program found")]
    NoDownloaderAvailable,

    #[error("Extraction with {tool} failed: {reason}")]
    ExtractionFailed { tool: String, reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for SimpleExtractError {
    fn user_message(&self) -> String {
        match self {
            SimpleExtractError::NotFound { name } => {
                format!("{} does not exist", name)
            }
            SimpleExtractError::NetworkError { url, message } => {
                format!("Failed to reach {}: {}", url, message)
            }
            SimpleExtractError::DownloadFailed { url, reason } => {
                format!("Could not download {}: {}", url, reason)
            }
            SimpleExtractError::NoDownloaderAvailable => {
                "No suitable download program found".to_string()
            }
            SimpleExtractError::ExtractionFailed { tool, reason } => {
                format!("{} failed: {}", tool, reason)
            }
            SimpleExtractError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            SimpleExtractError::NotFound { .. } => Some(
                "Install the missing program or check that it is on your PATH.".to_string()
            ),
            SimpleExtractError::NetworkError { .. } => Some(
                "Check your internet connection and the URL, then try again. Use --force-download to skip the size check.".to_string()
            ),
            SimpleExtractError::NoDownloaderAvailable => Some(
                "Install curl, wget or fetch to download remote archives.".to_string()
            ),
            SimpleExtractError::Config { .. } => Some(
                "Check your configuration file syntax and that configured directories exist.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for SimpleExtractError {
    fn from(error: toml::de::Error) -> Self {
        SimpleExtractError::Config {
            message: error.to_string(),
        }
    }
}

impl From<reqwest::Error> for SimpleExtractError {
    fn from(error: reqwest::Error) -> Self {
        let url = error
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "remote".to_string());

        let message = match error.status() {
            Some(status) => format!("server returned {}", status),
            None if error.is_connect() => "failed to reach the server".to_string(),
            None => error.to_string(),
        };

        SimpleExtractError::NetworkError { url, message }
    }
}

pub type Result<T> = std::result::Result<T, SimpleExtractError>;
