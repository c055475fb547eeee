//! `kustomization-helm.yaml` loading
//!
//! The file is parsed into a raw tree, every known key is then overlaid with
//! its environment override (if any) and the result is deserialized into
//! [`Config`]. Overrides apply even when the file does not mention the key.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::source::ConfigSource;
use crate::values::Values;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "kustomization-helm.yaml";

/// Shape of an environment override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    String,
    Bool,
    /// Comma separated
    List,
}

/// Keys that can be overridden from the environment
const ENV_KEYS: &[(&str, KeyKind)] = &[
    ("output-dir", KeyKind::String),
    ("helm-binary", KeyKind::String),
    ("chart.name", KeyKind::String),
    ("chart.repo-url", KeyKind::String),
    ("chart.version", KeyKind::String),
    ("release.name", KeyKind::String),
    ("release.namespace", KeyKind::String),
    ("release.include-crds", KeyKind::Bool),
    ("release.api-versions", KeyKind::List),
    ("release.values-files", KeyKind::List),
];

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Where the kustomization is written, relative to the working directory
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Helm executable (name on PATH or path)
    #[serde(default = "default_helm_binary")]
    pub helm_binary: String,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub release: ReleaseConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_helm_binary() -> String {
    "helm".to_string()
}

/// Chart to render
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ChartConfig {
    /// Chart name, local chart path or `oci://` reference
    #[serde(default)]
    pub name: String,

    /// Chart repository URL
    #[serde(default)]
    pub repo_url: Option<String>,

    /// Chart version constraint
    #[serde(default)]
    pub version: Option<String>,
}

/// Release parameters passed to `helm template`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ReleaseConfig {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub namespace: Option<String>,

    #[serde(default)]
    pub include_crds: bool,

    #[serde(default)]
    pub api_versions: Vec<String>,

    /// Values files, relative to the working directory, merged in order
    #[serde(default)]
    pub values_files: Vec<PathBuf>,

    /// Inline values, merged after the values files
    #[serde(default)]
    pub values: Values,
}

impl Config {
    /// Path of the configuration file inside `dir`
    pub fn file_path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE_NAME)
    }

    /// Release name, falling back to the last segment of the chart name
    pub fn release_name(&self) -> &str {
        match &self.release.name {
            Some(name) => name.as_str(),
            None => self
                .chart
                .name
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or(&self.chart.name),
        }
    }

    fn validate(mut self) -> Result<Self, ConfigError> {
        clear_empty(&mut self.chart.repo_url);
        clear_empty(&mut self.chart.version);
        clear_empty(&mut self.release.name);
        clear_empty(&mut self.release.namespace);
        if self.release.values.inner().is_null() {
            self.release.values = Values::new();
        }

        if self.chart.name.trim().is_empty() {
            return Err(ConfigError::MissingField("chart.name".to_string()));
        }
        if self.helm_binary.trim().is_empty() {
            return Err(ConfigError::MissingField("helm-binary".to_string()));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("output-dir".to_string()));
        }
        if !self.release.values.is_mapping() {
            return Err(ConfigError::Schema(
                "release.values must be a mapping".to_string(),
            ));
        }
        Ok(self)
    }
}

fn clear_empty(field: &mut Option<String>) {
    if field.as_deref().is_some_and(|s| s.trim().is_empty()) {
        *field = None;
    }
}

/// Load the configuration file at `path`, overlaying environment overrides
pub fn load_config(source: &ConfigSource, path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let mut tree = Values::from_yaml(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    if !tree.is_mapping() {
        return Err(ConfigError::Schema(format!(
            "{} must contain a mapping at the top level",
            path.display()
        )));
    }

    apply_env(source, &mut tree)?;
    normalize(&mut tree);

    let config: Config = serde_json::from_value(tree.into_inner())?;
    let config = config.validate()?;
    tracing::debug!(
        path = %path.display(),
        chart = %config.chart.name,
        release = %config.release_name(),
        "loaded configuration"
    );
    Ok(config)
}

fn apply_env(source: &ConfigSource, tree: &mut Values) -> Result<(), ConfigError> {
    for (key, kind) in ENV_KEYS {
        let Some((var, raw)) = source.lookup(key) else {
            continue;
        };
        // Set but empty counts as unset
        if raw.is_empty() {
            continue;
        }

        let value = parse_env_value(*kind, raw).map_err(|message| ConfigError::InvalidEnv {
            var: var.clone(),
            message,
        })?;
        tracing::debug!(key, var = %var, "applying environment override");
        tree.set(key, value);
    }
    Ok(())
}

/// Loosen the raw tree the way YAML authors expect
///
/// Empty entries (`release:`) fall back to their defaults, and plain
/// scalars under string keys (`version: 1.2`) are read as strings.
/// Chart values under `release.values` are left alone.
fn normalize(tree: &mut Values) {
    if let JsonValue::Object(root) = &mut tree.0 {
        root.retain(|_, v| !v.is_null());
        for section in ["chart", "release"] {
            if let Some(JsonValue::Object(map)) = root.get_mut(section) {
                map.retain(|_, v| !v.is_null());
            }
        }
    }

    for (key, kind) in ENV_KEYS {
        if *kind != KeyKind::String {
            continue;
        }
        let text = match tree.get(key) {
            Some(JsonValue::Number(n)) => n.to_string(),
            Some(JsonValue::Bool(b)) => b.to_string(),
            _ => continue,
        };
        tree.set(key, JsonValue::String(text));
    }
}

fn parse_env_value(kind: KeyKind, raw: &str) -> Result<JsonValue, String> {
    match kind {
        KeyKind::String => Ok(JsonValue::String(raw.to_string())),
        KeyKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(JsonValue::Bool(true)),
            "false" | "0" => Ok(JsonValue::Bool(false)),
            _ => Err(format!("expected true or false, got '{}'", raw)),
        },
        KeyKind::List => Ok(JsonValue::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| JsonValue::String(s.to_string()))
                .collect(),
        )),
    }
}
