use clap::Args;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Args)]
pub struct DecodeArgs {
    /// Model output to decode ("-" reads stdin)
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Seed the session from a prior document instead of starting empty
    #[arg(long, value_name = "FILE")]
    pub seed: Option<PathBuf>,

    /// Catalog used to finalize the document after decoding
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Feed the input in fragments of this many characters
    #[arg(long, default_value = "64", value_name = "CHARS")]
    pub chunk_size: usize,

    /// Pretty-print the resulting document
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address for the decode-stream listener
    #[arg(long, default_value = "127.0.0.1:8787", value_name = "ADDR")]
    pub bind: SocketAddr,

    /// Maximum request body size in bytes
    #[arg(long, default_value = "10485760", value_name = "BYTES")]
    pub max_body_bytes: usize,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Workflow document to check
    #[arg(value_name = "DOC")]
    pub document: PathBuf,

    /// Catalog describing mandatory config keys per node sub-kind
    #[arg(value_name = "CATALOG")]
    pub catalog: PathBuf,
}
