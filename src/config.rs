use crate::error::{Result, SimpleExtractError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub extract: ExtractConfig,
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Never overwrite an extraction target that already exists.
    pub no_clobber: bool,
    /// Directory tools run in. Defaults to the current directory.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Always re-download, skipping the remote/local size comparison.
    pub force: bool,
    /// Hide the download tool's progress output.
    pub silent: bool,
    /// Directory fetched archives are written to. Defaults to the current directory.
    pub directory: Option<PathBuf>,
}

pub const DEFAULT_CONFIG_FILES: &[&str] = &["simple-extract.toml", ".simple-extract.toml"];

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SimpleExtractError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SimpleExtractError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| SimpleExtractError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                for default_path in DEFAULT_CONFIG_FILES {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        // Flags can only switch behaviour on; an absent flag keeps the file's value.
        self.extract.no_clobber |= cli_args.no_clobber;
        self.download.force |= cli_args.force_download;
        self.download.silent |= cli_args.silent_download;

        if let Some(ref directory) = cli_args.extract_dir {
            self.extract.directory = Some(directory.clone());
        }

        if let Some(ref directory) = cli_args.download_dir {
            self.download.directory = Some(directory.clone());
        }
    }

    pub fn validate(&self) -> Result<()> {
        let directories = [
            ("extract.directory", &self.extract.directory),
            ("download.directory", &self.download.directory),
        ];

        for (key, directory) in directories {
            if let Some(directory) = directory {
                if !directory.is_dir() {
                    return Err(SimpleExtractError::Config {
                        message: format!("{} is not a directory: {}", key, directory.display()),
                    });
                }
            }
        }

        Ok(())
    }

    /// Absolute extraction directory, resolved once at startup.
    pub fn extract_dir(&self) -> Result<PathBuf> {
        resolve_dir(self.extract.directory.as_deref())
    }

    /// Absolute download directory, resolved once at startup.
    pub fn download_dir(&self) -> Result<PathBuf> {
        resolve_dir(self.download.directory.as_deref())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self {
            extract: ExtractConfig {
                no_clobber: false,
                directory: Some(PathBuf::from(".")),
            },
            download: DownloadConfig {
                force: false,
                silent: false,
                directory: Some(PathBuf::from(".")),
            },
        };
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

fn resolve_dir(directory: Option<&Path>) -> Result<PathBuf> {
    let directory = match directory {
        Some(directory) => directory.to_path_buf(),
        None => std::env::current_dir()?,
    };
    Ok(std::fs::canonicalize(directory)?)
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub no_clobber: bool,
    pub force_download: bool,
    pub silent_download: bool,
    pub extract_dir: Option<PathBuf>,
    pub download_dir: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_no_clobber(mut self, no_clobber: bool) -> Self {
        self.no_clobber = no_clobber;
        self
    }

    pub fn with_force_download(mut self, force: bool) -> Self {
        self.force_download = force;
        self
    }

    pub fn with_silent_download(mut self, silent: bool) -> Self {
        self.silent_download = silent;
        self
    }

    pub fn with_extract_dir(mut self, directory: Option<PathBuf>) -> Self {
        self.extract_dir = directory;
        self
    }

    pub fn with_download_dir(mut self, directory: Option<PathBuf>) -> Self {
        self.download_dir = directory;
        self
    }
}
