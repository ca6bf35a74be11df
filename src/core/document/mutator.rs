use crate::core::decode::Operation;
use crate::core::document::{config, WorkflowDocument};
use crate::core::types::NodeKind;
use tracing::{debug, warn};

/// Apply exactly one decoded operation to the document.
///
/// This is the sole mutation path for a [`WorkflowDocument`]; every failure
/// mode below is a deliberate no-op so a single bad operation never aborts
/// the session.
pub fn apply_operation(document: &mut WorkflowDocument, operation: Operation) {
    match operation {
        Operation::SetName { name } => {
            if let Some(name) = non_blank(name) {
                document.name = Some(name);
            }
        }
        Operation::SetDescription { description } => {
            if let Some(description) = non_blank(description) {
                document.description = Some(description);
            }
        }
        Operation::AddNode { mut node } => {
            config::normalize_config(&mut node.data.config);
            if node.data.kind.is_none() {
                node.data.kind = Some(node.kind);
            }
            document.nodes.push(node);
            repair_triggers(document);
        }
        Operation::AddEdge { edge } => {
            // Edges may reference nodes that decode later, so no referential
            // check here; the one exception is an endpoint the trigger-repair
            // rule already removed, which can never come back.
            if document.dropped_triggers.contains(&edge.source)
                || document.dropped_triggers.contains(&edge.target)
            {
                debug!(edge_id = %edge.id, "dropping edge that references a removed trigger");
            } else {
                document.edges.push(edge);
            }
        }
        Operation::RemoveNode { node_id } => {
            document.nodes.retain(|node| node.id != node_id);
            document
                .edges
                .retain(|edge| edge.source != node_id && edge.target != node_id);
        }
        Operation::RemoveEdge { edge_id } => {
            document.edges.retain(|edge| edge.id != edge_id);
        }
        Operation::UpdateNode {
            node_id,
            position,
            data,
        } => {
            let Some(node) = document.nodes.iter_mut().find(|node| node.id == node_id) else {
                debug!(node_id = %node_id, "updateNode references a node not decoded yet, skipping");
                return;
            };
            if let Some(position) = position {
                node.position = position;
            }
            if let Some(patch) = data {
                node.data.apply_patch(patch);
            }
        }
        Operation::SetAssistantMessage { message } => {
            // Unlike name/description, a present-but-empty message is applied:
            // the status line must be able to go blank.
            if let Some(message) = message {
                document.assistant_message = Some(message);
            }
        }
    }
}

/// Keep only the first trigger node in sequence order, dropping the rest and
/// every edge touching a dropped id.
///
/// Runs after every node addition because intermediate states are observed
/// live by remote mirrors; it is a pure function of the node sequence and
/// therefore safe to re-evaluate independently on each side.
pub fn repair_triggers(document: &mut WorkflowDocument) {
    let mut kept_first = false;
    let mut dropped: Vec<String> = Vec::new();
    document.nodes.retain(|node| {
        if node.kind != NodeKind::Trigger {
            return true;
        }
        if kept_first {
            dropped.push(node.id.clone());
            false
        } else {
            kept_first = true;
            true
        }
    });
    if dropped.is_empty() {
        return;
    }
    warn!(dropped = ?dropped, "removed duplicate trigger nodes");
    document
        .edges
        .retain(|edge| !dropped.contains(&edge.source) && !dropped.contains(&edge.target));
    document.dropped_triggers.extend(dropped);
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
