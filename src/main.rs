use clap::Parser;
use skein::cli::{self, Args};
use skein::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    skein::logging::init()?;
    cli::commands::execute(args.command).await
}
