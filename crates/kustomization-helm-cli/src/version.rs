//! Build metadata for `--version`
//!
//! Release builds inject the values through environment variables at
//! compile time:
//! `KUSTOMIZATION_HELM_COMMIT`, `KUSTOMIZATION_HELM_DATE`,
//! `KUSTOMIZATION_HELM_BUILT_BY` and `KUSTOMIZATION_HELM_CHECKSUM`.

use std::fmt;

/// Version of the package plus the checksum of the built artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleInfo {
    pub version: &'static str,
    pub checksum: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VersionInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub date: &'static str,
    pub built_by: &'static str,
    pub module: Option<ModuleInfo>,
}

const fn or_empty(value: Option<&'static str>) -> &'static str {
    match value {
        Some(v) => v,
        None => "",
    }
}

impl VersionInfo {
    /// Metadata baked into this binary
    pub const fn current() -> Self {
        let module = match option_env!("KUSTOMIZATION_HELM_CHECKSUM") {
            Some(checksum) => Some(ModuleInfo {
                version: env!("CARGO_PKG_VERSION"),
                checksum,
            }),
            None => None,
        };

        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: or_empty(option_env!("KUSTOMIZATION_HELM_COMMIT")),
            date: or_empty(option_env!("KUSTOMIZATION_HELM_DATE")),
            built_by: or_empty(option_env!("KUSTOMIZATION_HELM_BUILT_BY")),
            module,
        }
    }

    /// Multi-line report: version, then each available detail on its own line
    pub fn render(&self) -> String {
        let mut result = self.version.to_string();
        if !self.commit.is_empty() {
            result.push_str(&format!("\ncommit: {}", self.commit));
        }
        if !self.date.is_empty() {
            result.push_str(&format!("\nbuilt at: {}", self.date));
        }
        if !self.built_by.is_empty() {
            result.push_str(&format!("\nbuilt by: {}", self.built_by));
        }
        if let Some(module) = self.module.filter(|m| !m.checksum.is_empty()) {
            result.push_str(&format!(
                "\nmodule version: {}, checksum: {}",
                module.version, module.checksum
            ));
        }
        result
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> VersionInfo {
        VersionInfo {
            version: "1.2.3",
            commit: "abc123",
            date: "2026-01-02T03:04:05Z",
            built_by: "ci",
            module: Some(ModuleInfo {
                version: "v1.2.3",
                checksum: "h1:deadbeef",
            }),
        }
    }

    #[test]
    fn test_version_only() {
        let info = VersionInfo {
            version: "1.2.3",
            ..Default::default()
        };
        assert_eq!(info.render(), "1.2.3");
    }

    #[test]
    fn test_all_fields_in_order() {
        assert_eq!(
            full().render(),
            "1.2.3\n\
             commit: abc123\n\
             built at: 2026-01-02T03:04:05Z\n\
             built by: ci\n\
             module version: v1.2.3, checksum: h1:deadbeef"
        );
    }

    #[test]
    fn test_empty_fields_omitted() {
        let info = VersionInfo {
            commit: "",
            built_by: "",
            ..full()
        };
        assert_eq!(
            info.render(),
            "1.2.3\nbuilt at: 2026-01-02T03:04:05Z\nmodule version: v1.2.3, checksum: h1:deadbeef"
        );
    }

    #[test]
    fn test_module_without_checksum_omitted() {
        let info = VersionInfo {
            module: Some(ModuleInfo {
                version: "v1.2.3",
                checksum: "",
            }),
            ..full()
        };
        assert_eq!(info.render().lines().count(), 4);
        assert!(!info.render().contains("module version"));
    }

    #[test]
    fn test_current_uses_package_version() {
        let info = VersionInfo::current();
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert!(info.render().starts_with(env!("CARGO_PKG_VERSION")));
        assert_eq!(info.to_string(), info.render());
    }
}
