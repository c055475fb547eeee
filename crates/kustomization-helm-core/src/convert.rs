//! Chart to kustomization conversion

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::ConvertError;
use crate::helm::{ChartRenderer, HelmCli, RenderRequest};
use crate::kustomization::{KUSTOMIZATION_FILE_NAME, Kustomization};
use crate::manifest::{assign_file_names, split_manifests};
use crate::values::Values;

/// Files touched by a conversion run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionReport {
    pub output_dir: PathBuf,
    /// Manifest files, in render order
    pub written: Vec<PathBuf>,
    /// Files from the previous run that are no longer produced
    pub pruned: Vec<PathBuf>,
    pub kustomization: PathBuf,
}

/// Render the configured chart with `helm` and write the kustomization
pub fn run(dir: &Path, config: &Config) -> Result<ConversionReport, ConvertError> {
    let helm = HelmCli::new(config.helm_binary.clone());
    run_with(&helm, dir, config)
}

/// Same as [`run`] with a caller-supplied renderer
pub fn run_with<R>(renderer: &R, dir: &Path, config: &Config) -> Result<ConversionReport, ConvertError>
where
    R: ChartRenderer + ?Sized,
{
    let values = collect_values(dir, config)?;
    let request = RenderRequest::new(dir, config, &values);
    let stream = renderer.render(&request)?;

    let manifests = split_manifests(&stream)?;
    let files = assign_file_names(&manifests);
    tracing::debug!(count = files.len(), "rendered manifests");

    let output_dir = dir.join(&config.output_dir);
    fs::create_dir_all(&output_dir).map_err(|e| ConvertError::io(&output_dir, e))?;

    let kustomization_path = output_dir.join(KUSTOMIZATION_FILE_NAME);
    let previous = Kustomization::load(&kustomization_path);

    let mut written = Vec::with_capacity(files.len());
    for (file, manifest) in &files {
        let path = output_dir.join(file);
        let content = serde_yaml::to_string(&manifest.document)?;
        fs::write(&path, content).map_err(|e| ConvertError::io(&path, e))?;
        written.push(path);
    }

    let current: HashSet<&str> = files.keys().map(String::as_str).collect();
    let pruned = match previous {
        Some(previous) => previous.prune(&output_dir, &current)?,
        None => Vec::new(),
    };

    let kustomization = Kustomization::new(
        config.release.namespace.clone(),
        files.keys().cloned().collect(),
    );
    kustomization.save(&kustomization_path)?;

    Ok(ConversionReport {
        output_dir,
        written,
        pruned,
        kustomization: kustomization_path,
    })
}

/// Merge values files (in order) and then inline values
pub fn collect_values(dir: &Path, config: &Config) -> Result<Values, ConvertError> {
    let mut values = Values::new();

    for file in &config.release.values_files {
        let path = dir.join(file);
        let file_values = Values::from_file(&path)?;
        values.merge(&file_values);
        tracing::debug!(path = %path.display(), "merged values file");
    }
    values.merge(&config.release.values);

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChartConfig, ReleaseConfig};
    use std::cell::RefCell;

    /// Returns a canned stream and remembers the values it was given
    struct StaticRenderer {
        stream: String,
        seen_values: RefCell<Option<Values>>,
    }

    impl StaticRenderer {
        fn new(stream: &str) -> Self {
            Self {
                stream: stream.to_string(),
                seen_values: RefCell::new(None),
            }
        }
    }

    impl ChartRenderer for StaticRenderer {
        fn render(&self, request: &RenderRequest<'_>) -> Result<String, ConvertError> {
            *self.seen_values.borrow_mut() = Some(request.values.clone());
            Ok(self.stream.clone())
        }
    }

    struct FailingRenderer;

    impl ChartRenderer for FailingRenderer {
        fn render(&self, _request: &RenderRequest<'_>) -> Result<String, ConvertError> {
            Err(ConvertError::InvalidValues("boom".to_string()))
        }
    }

    const TWO_OBJECTS: &str = r#"
apiVersion: v1
kind: Service
metadata:
  name: web
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
"#;

    fn config(output_dir: &str) -> Config {
        Config {
            output_dir: PathBuf::from(output_dir),
            helm_binary: "helm".to_string(),
            chart: ChartConfig {
                name: "nginx".to_string(),
                ..Default::default()
            },
            release: ReleaseConfig {
                namespace: Some("frontend".to_string()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_run_writes_manifests_and_kustomization() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = StaticRenderer::new(TWO_OBJECTS);

        let report = run_with(&renderer, dir.path(), &config("out")).unwrap();

        let out = dir.path().join("out");
        assert_eq!(report.output_dir, out);
        assert_eq!(
            report.written,
            vec![out.join("service-web.yaml"), out.join("deployment-web.yaml")]
        );
        assert!(report.pruned.is_empty());
        assert_eq!(report.kustomization, out.join(KUSTOMIZATION_FILE_NAME));

        let kustomization = Kustomization::load(&report.kustomization).unwrap();
        assert_eq!(kustomization.namespace.as_deref(), Some("frontend"));
        assert_eq!(
            kustomization.resources,
            vec!["service-web.yaml", "deployment-web.yaml"]
        );

        let service: serde_yaml::Value =
            serde_yaml::from_str(&fs::read_to_string(out.join("service-web.yaml")).unwrap())
                .unwrap();
        assert_eq!(service["kind"], "Service");
    }

    #[test]
    fn test_run_prunes_previous_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(".");

        let first = StaticRenderer::new(TWO_OBJECTS);
        run_with(&first, dir.path(), &config).unwrap();
        assert!(dir.path().join("deployment-web.yaml").exists());

        let second = StaticRenderer::new("kind: Service\nmetadata:\n  name: web\n");
        let report = run_with(&second, dir.path(), &config).unwrap();

        assert_eq!(report.pruned, vec![dir.path().join("deployment-web.yaml")]);
        assert!(!dir.path().join("deployment-web.yaml").exists());
        assert!(dir.path().join("service-web.yaml").exists());
    }

    #[test]
    fn test_run_absolute_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let renderer = StaticRenderer::new(TWO_OBJECTS);

        let report = run_with(
            &renderer,
            dir.path(),
            &config(out.path().to_str().unwrap()),
        )
        .unwrap();

        assert_eq!(report.output_dir, out.path());
        assert!(out.path().join(KUSTOMIZATION_FILE_NAME).exists());
    }

    #[test]
    fn test_run_renderer_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();

        let err = run_with(&FailingRenderer, dir.path(), &config("out")).unwrap_err();

        assert!(matches!(err, ConvertError::InvalidValues(_)));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_values_files_then_inline() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.yaml"), "replicas: 1\nimage:\n  tag: a\n").unwrap();
        fs::write(dir.path().join("prod.yaml"), "replicas: 3\n").unwrap();

        let mut config = config(".");
        config.release.values_files = vec![PathBuf::from("base.yaml"), PathBuf::from("prod.yaml")];
        config.release.values = Values::from_yaml("image:\n  tag: b\n").unwrap();

        let renderer = StaticRenderer::new("");
        run_with(&renderer, dir.path(), &config).unwrap();

        let seen = renderer.seen_values.borrow().clone().unwrap();
        assert_eq!(seen.get("replicas").unwrap(), 3);
        assert_eq!(seen.get("image.tag").unwrap(), "b");
    }

    #[test]
    fn test_missing_values_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(".");
        config.release.values_files = vec![PathBuf::from("nope.yaml")];

        let err = collect_values(dir.path(), &config).unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_helm_script() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-helm");
        fs::write(
            &script,
            "#!/bin/sh\nprintf 'kind: ConfigMap\\nmetadata:\\n  name: %s\\n' \"$2\"\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let mut config = config(".");
        config.helm_binary = "./fake-helm".to_string();
        config.release.name = Some("demo".to_string());

        let report = run(dir.path(), &config).unwrap();

        assert_eq!(report.written, vec![dir.path().join("configmap-demo.yaml")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_failing_helm() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-helm");
        fs::write(&script, "#!/bin/sh\necho 'chart not found' >&2\nexit 1\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let mut config = config(".");
        config.helm_binary = "./fake-helm".to_string();

        let err = run(dir.path(), &config).unwrap_err();
        assert!(
            matches!(err, ConvertError::HelmFailed { ref stderr, .. } if stderr == "chart not found")
        );
    }
}
