use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Application-wide error type for the compose-dump CLI.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No such directory: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("No compose file found in {}", .0.display())]
    NoComposeFile(PathBuf),

    #[error("Failed to parse compose file {}: {source}", .path.display())]
    ComposeParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unknown services: {0}")]
    UnknownServices(String),

    #[error("Docker command failed: {0}")]
    Docker(String),

    #[error("Restoring is not implemented yet")]
    RestoreUnimplemented,

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to encode manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Invalid exclude pattern: {0}")]
    Glob(#[from] globset::Error),
}

impl AppError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        AppError::Config(msg.into())
    }
}
