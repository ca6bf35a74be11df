use crate::core::document::{Edge, Node, NodeDataPatch, Position};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Discriminator tags this decoder version understands.
pub const KNOWN_OPS: &[&str] = &[
    "setName",
    "setDescription",
    "addNode",
    "addEdge",
    "removeNode",
    "removeEdge",
    "updateNode",
    "setAssistantMessage",
];

/// One graph mutation decoded from a model output line.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    SetName {
        #[serde(default)]
        name: Option<String>,
    },
    SetDescription {
        #[serde(default)]
        description: Option<String>,
    },
    AddNode {
        node: Node,
    },
    AddEdge {
        edge: Edge,
    },
    RemoveNode {
        #[serde(rename = "nodeId")]
        node_id: String,
    },
    RemoveEdge {
        #[serde(rename = "edgeId")]
        edge_id: String,
    },
    UpdateNode {
        #[serde(rename = "nodeId")]
        node_id: String,
        #[serde(default)]
        position: Option<Position>,
        #[serde(default)]
        data: Option<NodeDataPatch>,
    },
    SetAssistantMessage {
        #[serde(default)]
        message: Option<String>,
    },
}

/// Diagnostic counters accumulated over one decoding session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodeStats {
    pub decoded: u64,
    pub skipped_noise: u64,
    pub malformed_lines: u64,
    pub unknown_tags: u64,
}

/// Classifies and parses framed lines into typed operations.
///
/// Blank lines and code-fence markers are expected noise in generative
/// output and are skipped silently. A malformed line or an unrecognized
/// discriminator tag is counted and skipped; neither aborts the session.
#[derive(Debug, Default)]
pub struct OperationDecoder {
    stats: DecodeStats,
}

impl OperationDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Decode one framed line, or `None` when the line carries no operation.
    pub fn decode_line(&mut self, line: &str) -> Option<Operation> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("```") {
            self.stats.skipped_noise += 1;
            return None;
        }
        let value: Value = match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(err) => {
                self.stats.malformed_lines += 1;
                warn!(error = %err, "discarding malformed operation line");
                return None;
            }
        };
        self.decode_value(value)
    }

    /// Decode an operation record whose line framing already happened,
    /// checking the discriminator tag before attempting a typed parse.
    pub fn decode_value(&mut self, value: Value) -> Option<Operation> {
        let Some(tag) = value.get("op").and_then(Value::as_str).map(str::to_string) else {
            self.stats.malformed_lines += 1;
            warn!("discarding operation record without an op tag");
            return None;
        };
        if !KNOWN_OPS.contains(&tag.as_str()) {
            self.stats.unknown_tags += 1;
            debug!(tag = %tag, "ignoring operation with unrecognized tag");
            return None;
        }
        match serde_json::from_value::<Operation>(value) {
            Ok(operation) => {
                self.stats.decoded += 1;
                Some(operation)
            }
            Err(err) => {
                self.stats.malformed_lines += 1;
                warn!(tag = %tag, error = %err, "discarding operation with invalid payload");
                None
            }
        }
    }
}
