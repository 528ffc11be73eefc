use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("cannot load config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("cannot open list file {path}: {source}; check `{field}` in the config")]
    ListFile {
        field: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot read input root {path}: {source}; check `input_root` in the config")]
    InputRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot read API key file {path}: {source}")]
    ApiKey {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot read sub-job manifests in {path}: {source}")]
    Manifest {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed sub-job descriptor {path}: {source}")]
    Descriptor {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("execution service request failed: {0}")]
    Service(#[from] reqwest::Error),

    #[error("malformed service response for sub-job {id}: {reason}")]
    ServiceResponse { id: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WatchError>;
