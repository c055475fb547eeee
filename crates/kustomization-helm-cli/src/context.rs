//! Execution context resolved once at startup

use kustomization_helm_core::ConfigSource;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Working directory and configuration source for one invocation
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    dir: PathBuf,
    source: ConfigSource,
}

impl ExecutionContext {
    /// Resolve `--dir` and snapshot the environment
    pub fn init(dir_flag: &Path) -> io::Result<Self> {
        let dir = resolve_directory(dir_flag)?;
        let source = ConfigSource::new(&dir);
        tracing::debug!(dir = %dir.display(), "resolved working directory");
        Ok(Self { dir, source })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }
}

/// Absolute directory for a `--dir` value
///
/// Fails if the current working directory cannot be determined, even for
/// an absolute value. Absolute values are then returned unchanged and
/// relative values are joined onto the working directory.
pub fn resolve_directory(flag_value: &Path) -> io::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(resolve_directory_from(&cwd, flag_value))
}

/// Same as [`resolve_directory`] with an explicit working directory
pub fn resolve_directory_from(cwd: &Path, flag_value: &Path) -> PathBuf {
    if flag_value.is_absolute() {
        flag_value.to_path_buf()
    } else {
        clean(&cwd.join(flag_value))
    }
}

/// Lexically drop `.` components and fold `..` into their parent
fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `/..` stays `/`
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}
