//! `kustomization.yaml` generation and pruning of stale resources

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::error::ConvertError;

/// File name of the generated kustomization
pub const KUSTOMIZATION_FILE_NAME: &str = "kustomization.yaml";

const API_VERSION: &str = "kustomize.config.k8s.io/v1beta1";
const KIND: &str = "Kustomization";

/// The subset of a Kustomization this tool writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kustomization {
    pub api_version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl Kustomization {
    pub fn new(namespace: Option<String>, resources: Vec<String>) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            namespace,
            resources,
        }
    }

    /// Read a previously generated kustomization, if there is a usable one
    pub fn load(path: &Path) -> Option<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Cannot read {}, skipping prune: {}", path.display(), e);
                return None;
            }
        };
        match serde_yaml::from_str(&content) {
            Ok(kustomization) => Some(kustomization),
            Err(e) => {
                tracing::warn!("Cannot parse {}, skipping prune: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConvertError> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|e| ConvertError::io(path, e))
    }

    /// Delete resources listed here but absent from `current`
    ///
    /// Only plain relative files inside `output_dir` are touched; remote
    /// references, directories and paths escaping `output_dir` are left alone.
    pub fn prune(
        &self,
        output_dir: &Path,
        current: &HashSet<&str>,
    ) -> Result<Vec<PathBuf>, ConvertError> {
        let mut pruned = Vec::new();

        for resource in &self.resources {
            if current.contains(resource.as_str()) || !is_local_file_ref(resource) {
                continue;
            }
            let path = output_dir.join(resource);
            if !path.is_file() {
                continue;
            }
            std::fs::remove_file(&path).map_err(|e| ConvertError::io(&path, e))?;
            tracing::debug!(path = %path.display(), "pruned stale resource");
            pruned.push(path);
        }

        Ok(pruned)
    }
}

fn is_local_file_ref(resource: &str) -> bool {
    if resource.contains("://") {
        return false;
    }
    Path::new(resource)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
