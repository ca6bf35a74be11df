pub mod decode;
pub mod document;
pub mod error;
pub mod session;
pub mod types;
pub mod validate;

pub use decode::{DecodeStats, LineFramer, Operation, OperationDecoder};
pub use document::{Edge, Node, NodeData, NodeDataPatch, Position, WorkflowDocument};
pub use error::AppError;
pub use session::{DecodeSession, FragmentSource};
pub use types::*;
pub use validate::{FinalizationValidator, NodeCatalog, StaticCatalog, ValidationFailure};
