pub mod envelope;
pub mod remote;
pub mod server;
pub mod stream;

pub use envelope::Envelope;
pub use remote::{MirrorReport, RemoteReassembler, StreamSignal};
pub use stream::envelope_stream;
