//! kustomization-helm core - Helm chart to Kustomize overlay conversion
//!
//! This crate holds everything behind the command line:
//! - `ConfigSource`: directory-scoped configuration lookup with `HELM_KUSTOMIZE_*`
//!   environment overrides
//! - `Config`: the typed `kustomization-helm.yaml`
//! - `Values`: chart values with deep merge support
//! - `ChartRenderer`: the `helm template` seam
//! - `run`: render, split into one file per object, write `kustomization.yaml`

pub mod config;
pub mod convert;
pub mod error;
pub mod helm;
pub mod kustomization;
pub mod manifest;
pub mod source;
pub mod values;

pub use config::{CONFIG_FILE_NAME, ChartConfig, Config, ReleaseConfig, load_config};
pub use convert::{ConversionReport, collect_values, run, run_with};
pub use error::{ConfigError, ConvertError};
pub use helm::{ChartRenderer, HelmCli, RenderRequest};
pub use kustomization::{KUSTOMIZATION_FILE_NAME, Kustomization};
pub use manifest::{Manifest, assign_file_names, split_manifests};
pub use source::{ConfigSource, ENV_PREFIX, env_key};
pub use values::Values;
