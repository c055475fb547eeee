//! Core error types

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors raised while loading `kustomization-helm.yaml`
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value in environment variable {var}: {message}")]
    InvalidEnv { var: String, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Schema(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Errors raised while converting a chart into a kustomization
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse values file {}: {source}", path.display())]
    ValuesParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid values: {0}")]
    InvalidValues(String),

    #[error("Failed to start `{binary}`: {source}")]
    HelmSpawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`helm template` failed ({status}): {stderr}")]
    HelmFailed { status: ExitStatus, stderr: String },

    #[error("`helm template` produced output that is not valid UTF-8: {0}")]
    HelmOutput(#[source] std::string::FromUtf8Error),

    #[error("Invalid manifest #{index}: {message}")]
    InvalidManifest { index: usize, message: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
