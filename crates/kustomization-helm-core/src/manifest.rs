//! Splitting rendered manifest streams into individual objects

use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;

use crate::config::CONFIG_FILE_NAME;
use crate::error::ConvertError;

/// One Kubernetes object from the rendered stream
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
    pub document: YamlValue,
}

impl Manifest {
    fn from_document(index: usize, document: YamlValue) -> Result<Self, ConvertError> {
        let invalid = |message: &str| ConvertError::InvalidManifest {
            index,
            message: message.to_string(),
        };

        if !document.is_mapping() {
            return Err(invalid("document is not a mapping"));
        }
        let kind = document
            .get("kind")
            .and_then(YamlValue::as_str)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| invalid("missing kind"))?
            .to_string();
        let metadata = document.get("metadata");
        let name = metadata
            .and_then(|m| m.get("name"))
            .and_then(YamlValue::as_str)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| invalid(&format!("{} is missing metadata.name", kind)))?
            .to_string();
        let namespace = metadata
            .and_then(|m| m.get("namespace"))
            .and_then(YamlValue::as_str)
            .map(str::to_string);

        Ok(Self {
            kind,
            name,
            namespace,
            document,
        })
    }

    /// Base file name for this object, `<kind>-<name>.yaml`
    pub fn file_stem(&self) -> String {
        sanitize(&format!("{}-{}", self.kind, self.name))
    }
}

/// Parse a multi-document YAML stream
///
/// Empty documents (helm emits them for templates that render to nothing)
/// are skipped. `*List` objects are flattened into their items.
pub fn split_manifests(stream: &str) -> Result<Vec<Manifest>, ConvertError> {
    let mut manifests = Vec::new();

    for (i, de) in serde_yaml::Deserializer::from_str(stream).enumerate() {
        let index = i + 1;
        let document = YamlValue::deserialize(de)?;
        if document.is_null() {
            continue;
        }

        if let Some(items) = list_items(&document) {
            for item in items {
                manifests.push(Manifest::from_document(index, item.clone())?);
            }
            continue;
        }

        manifests.push(Manifest::from_document(index, document)?);
    }

    Ok(manifests)
}

fn list_items(document: &YamlValue) -> Option<&Vec<YamlValue>> {
    let kind = document.get("kind")?.as_str()?;
    if kind.ends_with("List") {
        document.get("items")?.as_sequence()
    } else {
        None
    }
}

/// Assign each manifest a unique file name, preserving render order
///
/// A colliding name is first qualified with the object's namespace
/// (`<kind>-<name>-<namespace>.yaml`), then with a numeric suffix (`-2`,
/// `-3`, ...). The configuration file name is never handed out.
pub fn assign_file_names(manifests: &[Manifest]) -> IndexMap<String, &Manifest> {
    let mut files = IndexMap::with_capacity(manifests.len());

    for manifest in manifests {
        let stem = manifest.file_stem();
        let mut file = format!("{}.yaml", stem);
        if is_taken(&files, &file) {
            if let Some(namespace) = manifest.namespace.as_deref().filter(|ns| !ns.is_empty()) {
                file = format!("{}-{}.yaml", stem, sanitize(namespace));
            }
        }
        let mut n = 2;
        while is_taken(&files, &file) {
            file = format!("{}-{}.yaml", stem, n);
            n += 1;
        }
        files.insert(file, manifest);
    }

    files
}

fn is_taken(files: &IndexMap<String, &Manifest>, file: &str) -> bool {
    files.contains_key(file) || file == CONFIG_FILE_NAME
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| match c.to_ascii_lowercase() {
            c @ ('a'..='z' | '0'..='9' | '.' | '-') => c,
            _ => '-',
        })
        .collect()
}
