//! Layered configuration source
//!
//! A [`ConfigSource`] binds configuration lookup to a directory and to a
//! snapshot of the process environment. Keys are dotted paths in the
//! configuration file (`chart.repo-url`); their environment counterpart is
//! the prefixed, upper-cased key with `.` and `-` replaced by `_`
//! (`HELM_KUSTOMIZE_CHART_REPO_URL`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Prefix shared by every environment override
pub const ENV_PREFIX: &str = "HELM_KUSTOMIZE";

/// Configuration lookup scoped to a directory with environment overrides
#[derive(Debug, Clone)]
pub struct ConfigSource {
    dir: PathBuf,
    prefix: String,
    env: HashMap<String, String>,
}

impl ConfigSource {
    /// Bind a source to `dir`, capturing the current process environment
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        Self::with_env(dir, vars)
    }

    /// Bind a source to `dir` using an explicit set of environment variables
    pub fn with_env<I, K, V>(dir: impl Into<PathBuf>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let prefix = format!("{}_", ENV_PREFIX);
        let env = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(&prefix))
            .collect();

        Self {
            dir: dir.into(),
            prefix: ENV_PREFIX.to_string(),
            env,
        }
    }

    /// Directory the configuration is resolved against
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Environment variable name for a configuration key
    pub fn env_key(&self, key: &str) -> String {
        env_key(&self.prefix, key)
    }

    /// Look up the environment override for `key`
    pub fn lookup(&self, key: &str) -> Option<(String, &str)> {
        let var = self.env_key(key);
        let value = self.env.get(&var)?;
        Some((var, value.as_str()))
    }
}

/// Translate a dotted configuration key into its environment variable name
pub fn env_key(prefix: &str, key: &str) -> String {
    let translated: String = key
        .chars()
        .map(|c| match c {
            '.' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect();
    format!("{}_{}", prefix, translated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_key_plain() {
        assert_eq!(env_key(ENV_PREFIX, "helm"), "HELM_KUSTOMIZE_HELM");
    }

    #[test]
    fn test_env_key_replaces_separators() {
        assert_eq!(env_key(ENV_PREFIX, "output-dir"), "HELM_KUSTOMIZE_OUTPUT_DIR");
        assert_eq!(
            env_key(ENV_PREFIX, "chart.repo-url"),
            "HELM_KUSTOMIZE_CHART_REPO_URL"
        );
        assert_eq!(
            env_key(ENV_PREFIX, "release.api-versions"),
            "HELM_KUSTOMIZE_RELEASE_API_VERSIONS"
        );
    }

    #[test]
    fn test_env_key_every_separator() {
        let key = "a.b-c..d--e";
        let var = env_key(ENV_PREFIX, key);
        assert_eq!(var, "HELM_KUSTOMIZE_A_B_C__D__E");
        assert!(!var.contains('.'));
        assert!(!var.contains('-'));
    }

    #[test]
    fn test_with_env_keeps_only_prefixed() {
        let source = ConfigSource::with_env(
            "/tmp/proj",
            [
                ("HELM_KUSTOMIZE_OUTPUT_DIR", "/tmp/out"),
                ("HOME", "/root"),
                ("HELM_KUSTOMIZEX", "ignored"),
            ],
        );

        assert_eq!(source.dir(), Path::new("/tmp/proj"));
        assert_eq!(
            source.lookup("output-dir"),
            Some(("HELM_KUSTOMIZE_OUTPUT_DIR".to_string(), "/tmp/out"))
        );
        assert!(source.env.get("HOME").is_none());
        assert!(source.env.get("HELM_KUSTOMIZEX").is_none());
    }

    #[test]
    fn test_lookup_missing() {
        let source = ConfigSource::with_env("/tmp", Vec::<(String, String)>::new());
        assert!(source.lookup("chart.name").is_none());
    }
}
