pub mod args;
pub mod commands;

pub use args::{DecodeArgs, ServeArgs, ValidateArgs};
use clap::{Parser, Subcommand};

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
STREAM COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "skein")]
#[command(version = crate::VERSION)]
#[command(about = "Streaming decoder for model-generated workflow graphs")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: decode a captured model stream locally, or serve it as a live envelope stream for a remote mirror, then validate before persisting."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Decode a model output stream into a workflow document",
        long_about = "Decode frames the input into lines, applies every recognized graph mutation in order, and prints the resulting document. Malformed lines are skipped and counted, never fatal.",
        after_help = "Example:\n    skein decode capture.ndjson --catalog catalog.json --pretty"
    )]
    Decode(DecodeArgs),
    #[command(
        about = "Serve decoded operations as a live envelope stream",
        long_about = "Serve accepts raw model text in the request body and answers with a held-open newline-delimited stream of operation envelopes, terminated by exactly one complete or error record.",
        after_help = "Example:\n    skein serve --bind 127.0.0.1:8787"
    )]
    Serve(ServeArgs),
    #[command(
        about = "Check a stored document for completeness",
        long_about = "Validate runs the finalization checks against a stored workflow document using the given node catalog and prints every failure.",
        after_help = "Example:\n    skein validate workflow.json catalog.json"
    )]
    Validate(ValidateArgs),
}
