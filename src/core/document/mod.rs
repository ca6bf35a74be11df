pub mod config;
pub mod mutator;

pub use config::{merge_config, normalize_config};

use crate::core::types::{NodeKind, NodeStatus};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Root document assembled incrementally from decoded operations.
///
/// Node order is insertion order and is semantically meaningful. The
/// document is owned by exactly one decode session at a time; every change
/// goes through [`mutator::apply_operation`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Latest natural-language status line; may legitimately go blank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_message: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Ids of trigger nodes dropped by the single-trigger repair rule.
    /// Derived from the operation sequence, so origin and mirror rebuild
    /// the same set independently; never part of the wire format.
    #[serde(skip)]
    pub(crate) dropped_triggers: HashSet<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Duplicate of the owning node's kind, kept for consumers that only
    /// see the data payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
    #[serde(default)]
    pub config: IndexMap<String, Value>,
    #[serde(default)]
    pub status: NodeStatus,
}

impl NodeData {
    /// Apply a partial update: every present field overrides the existing
    /// one, except `config` which merges key-by-key.
    pub fn apply_patch(&mut self, patch: NodeDataPatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(kind) = patch.kind {
            self.kind = Some(kind);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(config) = patch.config {
            merge_config(&mut self.config, config);
        }
    }
}

/// Partial update for a node's `data`, carried by an updateNode operation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NodeDataPatch {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub kind: Option<NodeKind>,
    #[serde(default)]
    pub config: Option<IndexMap<String, Value>>,
    #[serde(default)]
    pub status: Option<NodeStatus>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default = "default_edge_kind")]
    pub kind: String,
}

fn default_edge_kind() -> String {
    "default".to_string()
}

impl WorkflowDocument {
    pub fn trigger_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.kind == NodeKind::Trigger)
            .count()
    }

    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }
}
