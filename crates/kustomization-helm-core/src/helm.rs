//! Chart rendering through the `helm` executable

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::Config;
use crate::error::ConvertError;
use crate::values::Values;

/// Everything needed to render one release of a chart
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    pub release_name: &'a str,
    pub chart: &'a str,
    pub repo_url: Option<&'a str>,
    pub version: Option<&'a str>,
    pub namespace: Option<&'a str>,
    pub include_crds: bool,
    pub api_versions: &'a [String],
    pub values: &'a Values,
    /// Directory relative chart paths are resolved against
    pub working_dir: &'a Path,
}

impl<'a> RenderRequest<'a> {
    pub fn new(dir: &'a Path, config: &'a Config, values: &'a Values) -> Self {
        Self {
            release_name: config.release_name(),
            chart: &config.chart.name,
            repo_url: config.chart.repo_url.as_deref(),
            version: config.chart.version.as_deref(),
            namespace: config.release.namespace.as_deref(),
            include_crds: config.release.include_crds,
            api_versions: &config.release.api_versions,
            values,
            working_dir: dir,
        }
    }
}

/// Turns a chart into a multi-document YAML manifest stream
pub trait ChartRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<String, ConvertError>;
}

/// Renders charts by running `helm template`
#[derive(Debug, Clone)]
pub struct HelmCli {
    binary: String,
}

impl HelmCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Executable to spawn, with relative paths anchored at `working_dir`
    fn program(&self, working_dir: &Path) -> PathBuf {
        let binary = Path::new(&self.binary);
        if binary.is_relative() && binary.components().count() > 1 {
            working_dir.join(binary)
        } else {
            binary.to_path_buf()
        }
    }

    /// Arguments for `helm template`
    pub fn args(&self, request: &RenderRequest<'_>, values_file: Option<&Path>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "template".into(),
            request.release_name.into(),
            request.chart.into(),
        ];

        if let Some(repo) = request.repo_url {
            args.push("--repo".into());
            args.push(repo.into());
        }
        if let Some(version) = request.version {
            args.push("--version".into());
            args.push(version.into());
        }
        if let Some(namespace) = request.namespace {
            args.push("--namespace".into());
            args.push(namespace.into());
        }
        if request.include_crds {
            args.push("--include-crds".into());
        }
        for api_version in request.api_versions {
            args.push("--api-versions".into());
            args.push(api_version.into());
        }
        if let Some(path) = values_file {
            args.push("--values".into());
            args.push(path.into());
        }

        args
    }
}

impl ChartRenderer for HelmCli {
    fn render(&self, request: &RenderRequest<'_>) -> Result<String, ConvertError> {
        // Kept alive until helm has exited
        let values_file = if request.values.is_empty() {
            None
        } else {
            let mut file = tempfile::Builder::new()
                .prefix("kustomization-helm-values")
                .suffix(".yaml")
                .tempfile()
                .map_err(|e| ConvertError::io(std::env::temp_dir(), e))?;
            let yaml = serde_yaml::to_string(request.values)?;
            file.write_all(yaml.as_bytes())
                .map_err(|e| ConvertError::io(file.path(), e))?;
            Some(file)
        };

        let program = self.program(request.working_dir);
        let args = self.args(request, values_file.as_ref().map(|f| f.path()));
        tracing::debug!(
            program = %program.display(),
            ?args,
            dir = %request.working_dir.display(),
            "running helm"
        );

        let output = Command::new(&program)
            .args(&args)
            .current_dir(request.working_dir)
            .output()
            .map_err(|source| ConvertError::HelmSpawn {
                binary: self.binary.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(ConvertError::HelmFailed {
                status: output.status,
                stderr: stderr.trim().to_string(),
            });
        }
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            tracing::warn!("helm: {}", line);
        }

        String::from_utf8(output.stdout).map_err(ConvertError::HelmOutput)
    }
}
