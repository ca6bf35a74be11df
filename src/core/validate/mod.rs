pub mod catalog;

pub use catalog::{CatalogError, StaticCatalog};

use crate::core::document::WorkflowDocument;
use crate::core::error::AppError;
use crate::core::types::{ErrorCategory, NodeKind};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Diagnostic severity levels emitted by finalization checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureSeverity {
    Error,
    Warning,
}

impl FailureSeverity {
    fn rank(&self) -> u8 {
        match self {
            FailureSeverity::Error => 2,
            FailureSeverity::Warning => 1,
        }
    }
}

impl fmt::Display for FailureSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureSeverity::Error => write!(f, "Error"),
            FailureSeverity::Warning => write!(f, "Warning"),
        }
    }
}

/// Individual completeness failure emitted by the finalization validator.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationFailure {
    pub code: String,
    pub severity: FailureSeverity,
    pub message: String,
    pub location: Option<String>,
    pub suggestion: Option<String>,
}

impl ValidationFailure {
    pub fn new(
        code: impl Into<String>,
        severity: FailureSeverity,
        message: impl Into<String>,
        location: Option<String>,
        suggestion: Option<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            location,
            suggestion,
        }
    }
}

/// External catalog describing the mandatory config keys per node sub-kind.
///
/// The mutator stays kind-agnostic; all per-sub-kind knowledge lives behind
/// this trait and is consulted only at finalization time.
pub trait NodeCatalog {
    /// Config key identifying the sub-kind for nodes of this kind.
    fn discriminator_key(&self, kind: NodeKind) -> &str;

    /// Mandatory config keys for a sub-kind, or `None` when the catalog does
    /// not know the sub-kind.
    fn required_keys(&self, kind: NodeKind, sub_kind: &str) -> Option<Vec<String>>;
}

/// Post-stream completeness check gating acceptance for persistence.
pub struct FinalizationValidator;

impl FinalizationValidator {
    /// Run every completeness check against the document.
    /// Results are sorted by `(severity desc, code asc, location asc)`.
    pub fn run(document: &WorkflowDocument, catalog: &dyn NodeCatalog) -> Vec<ValidationFailure> {
        let mut failures = Vec::new();
        for node in &document.nodes {
            let key = catalog.discriminator_key(node.kind);
            let Some(sub_kind) = node.data.config.get(key).and_then(Value::as_str) else {
                failures.push(ValidationFailure::new(
                    "WFD-FINAL-001",
                    FailureSeverity::Error,
                    format!(
                        "node '{}' is missing its {} discriminator '{}'",
                        node.id, node.kind, key
                    ),
                    Some(node.id.clone()),
                    Some(format!(
                        "set config.{} to a supported {} sub-kind",
                        key, node.kind
                    )),
                ));
                continue;
            };
            match catalog.required_keys(node.kind, sub_kind) {
                None => failures.push(ValidationFailure::new(
                    "WFD-FINAL-003",
                    FailureSeverity::Error,
                    format!(
                        "node '{}' uses unknown {} sub-kind '{}'",
                        node.id, node.kind, sub_kind
                    ),
                    Some(node.id.clone()),
                    Some("use a sub-kind listed in the node catalog".to_string()),
                )),
                Some(required) => {
                    for required_key in required {
                        if !node.data.config.contains_key(&required_key) {
                            failures.push(ValidationFailure::new(
                                "WFD-FINAL-002",
                                FailureSeverity::Error,
                                format!(
                                    "node '{}' ({}) is missing mandatory config key '{}'",
                                    node.id, sub_kind, required_key
                                ),
                                Some(node.id.clone()),
                                Some(format!("fill in config.{}", required_key)),
                            ));
                        }
                    }
                }
            }
            if let Some(data_kind) = node.data.kind {
                if data_kind != node.kind {
                    failures.push(ValidationFailure::new(
                        "WFD-FINAL-005",
                        FailureSeverity::Warning,
                        format!(
                            "node '{}' duplicates its kind as '{}' but is a {} node",
                            node.id, data_kind, node.kind
                        ),
                        Some(node.id.clone()),
                        None,
                    ));
                }
            }
        }

        let node_ids: HashSet<&str> = document.nodes.iter().map(|node| node.id.as_str()).collect();
        for edge in &document.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !node_ids.contains(endpoint.as_str()) {
                    failures.push(ValidationFailure::new(
                        "WFD-FINAL-004",
                        FailureSeverity::Error,
                        format!("edge '{}' references unknown node '{}'", edge.id, endpoint),
                        Some(edge.id.clone()),
                        Some("remove the edge or add the missing node".to_string()),
                    ));
                }
            }
        }

        failures.sort_by(|a, b| {
            let severity_cmp = b.severity.rank().cmp(&a.severity.rank());
            severity_cmp
                .then(a.code.cmp(&b.code))
                .then(a.location.cmp(&b.location))
        });
        failures
    }

    /// Accept the document unchanged, or reject it naming the count and
    /// identity of offending elements.
    pub fn accept(document: &WorkflowDocument, catalog: &dyn NodeCatalog) -> Result<(), AppError> {
        let failures = Self::run(document, catalog);
        let mut offending: Vec<String> = Vec::new();
        for failure in &failures {
            if failure.severity != FailureSeverity::Error {
                continue;
            }
            if let Some(location) = &failure.location {
                if !offending.contains(location) {
                    offending.push(location.clone());
                }
            }
        }
        if offending.is_empty() {
            return Ok(());
        }
        Err(AppError::new(
            ErrorCategory::ValidationError,
            format!(
                "document rejected: {} element(s) failed finalization: {}",
                offending.len(),
                offending.join(", ")
            ),
        )
        .with_code("WFD-FINAL-REJECT"))
    }
}
