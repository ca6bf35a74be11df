use super::NodeCatalog;
use crate::core::types::NodeKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Failure loading a catalog file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Catalog entries for one node kind.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KindCatalog {
    #[serde(rename = "discriminatorKey")]
    pub discriminator_key: String,
    /// Sub-kind name to the config keys it makes mandatory.
    #[serde(rename = "subKinds", default)]
    pub sub_kinds: HashMap<String, Vec<String>>,
}

/// In-memory [`NodeCatalog`] backed by a JSON description, used by the CLI
/// and tests. Production callers supply their own catalog implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticCatalog {
    pub trigger: KindCatalog,
    pub action: KindCatalog,
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self {
            trigger: KindCatalog {
                discriminator_key: "triggerKind".to_string(),
                sub_kinds: HashMap::new(),
            },
            action: KindCatalog {
                discriminator_key: "actionKind".to_string(),
                sub_kinds: HashMap::new(),
            },
        }
    }
}

impl StaticCatalog {
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Register a sub-kind and its mandatory config keys (builder style).
    pub fn with_sub_kind(mut self, kind: NodeKind, sub_kind: &str, required: &[&str]) -> Self {
        let entry = match kind {
            NodeKind::Trigger => &mut self.trigger,
            NodeKind::Action => &mut self.action,
        };
        entry.sub_kinds.insert(
            sub_kind.to_string(),
            required.iter().map(|key| key.to_string()).collect(),
        );
        self
    }

    fn entry(&self, kind: NodeKind) -> &KindCatalog {
        match kind {
            NodeKind::Trigger => &self.trigger,
            NodeKind::Action => &self.action,
        }
    }
}

impl NodeCatalog for StaticCatalog {
    fn discriminator_key(&self, kind: NodeKind) -> &str {
        &self.entry(kind).discriminator_key
    }

    fn required_keys(&self, kind: NodeKind, sub_kind: &str) -> Option<Vec<String>> {
        self.entry(kind).sub_kinds.get(sub_kind).cloned()
    }
}
