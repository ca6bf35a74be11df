pub mod framer;
pub mod operation;

pub use framer::LineFramer;
pub use operation::{DecodeStats, Operation, OperationDecoder, KNOWN_OPS};
