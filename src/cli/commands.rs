use crate::{
    cli::args::{DecodeArgs, ServeArgs, ValidateArgs},
    cli::Command,
    core::{
        session::DecodeSession,
        validate::{FinalizationValidator, StaticCatalog},
        WorkflowDocument,
    },
    transport::server,
    Result,
};
use anyhow::Context;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::info;

pub async fn execute(command: Command) -> Result<()> {
    match command {
        Command::Decode(args) => run_decode(args),
        Command::Serve(args) => run_serve(args).await,
        Command::Validate(args) => run_validate(args),
    }
}

fn run_decode(args: DecodeArgs) -> Result<()> {
    let text = read_input(&args.path)?;
    let mut session = match &args.seed {
        Some(path) => DecodeSession::with_document(load_document(path)?),
        None => DecodeSession::new(),
    };
    for chunk in chunk_text(&text, args.chunk_size) {
        session.feed(chunk);
    }
    session.finish();
    let stats = session.stats().clone();
    info!(
        decoded = stats.decoded,
        malformed = stats.malformed_lines,
        unknown = stats.unknown_tags,
        "decode session finished"
    );
    let document = session.into_document();
    if let Some(path) = &args.catalog {
        let catalog = StaticCatalog::load_from_file(path)?;
        FinalizationValidator::accept(&document, &catalog)?;
    }
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    println!("{}", rendered);
    Ok(())
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    server::serve_stream(args.bind, args.max_body_bytes).await?;
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<()> {
    let document = load_document(&args.document)?;
    let catalog = StaticCatalog::load_from_file(&args.catalog)?;
    let failures = FinalizationValidator::run(&document, &catalog);
    println!("{}", serde_json::to_string_pretty(&failures)?);
    FinalizationValidator::accept(&document, &catalog)?;
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read model output from stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_document(path: &Path) -> Result<WorkflowDocument> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Split input on character boundaries so the framer sees realistic
/// mid-record fragment breaks.
fn chunk_text(text: &str, chunk_size: usize) -> Vec<&str> {
    if chunk_size == 0 {
        return vec![text];
    }
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == chunk_size {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}
