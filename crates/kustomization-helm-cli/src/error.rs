//! CLI error types with exit code handling
//!
//! Every failure is tagged with the phase it happened in. The phase prefix
//! is part of the message so it survives any rendering.

use kustomization_helm_core::{ConfigError, ConvertError};
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Working directory or configuration source could not be set up
    #[error("unable to initialize: {message}")]
    #[diagnostic(code(kustomization_helm::initialize))]
    Initialize { message: String },

    /// `kustomization-helm.yaml` missing, unreadable or invalid
    #[error("unable to load configuration: {message}")]
    #[diagnostic(code(kustomization_helm::config))]
    LoadConfig {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Rendering or writing the kustomization failed
    #[error("unable to run: {message}")]
    #[diagnostic(code(kustomization_helm::run))]
    Run {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Initialize { .. } | CliError::LoadConfig { .. } | CliError::Run { .. } => {
                exit_codes::ERROR
            }
        }
    }

    pub fn initialize(err: std::io::Error) -> Self {
        Self::Initialize {
            message: err.to_string(),
        }
    }

    pub fn load_config(err: ConfigError) -> Self {
        let help = match &err {
            ConfigError::NotFound(_) => Some(
                "Create kustomization-helm.yaml in the working directory or point --dir at it"
                    .to_string(),
            ),
            ConfigError::InvalidEnv { var, .. } => {
                Some(format!("Fix or unset the {} environment variable", var))
            }
            _ => None,
        };
        Self::LoadConfig {
            message: err.to_string(),
            help,
        }
    }

    pub fn run(err: ConvertError) -> Self {
        let help = match &err {
            ConvertError::HelmSpawn { binary, .. } => Some(format!(
                "Install helm or set helm-binary (HELM_KUSTOMIZE_HELM_BINARY); tried `{}`",
                binary
            )),
            _ => None,
        };
        Self::Run {
            message: err.to_string(),
            help,
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
