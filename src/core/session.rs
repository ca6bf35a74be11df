use crate::core::decode::{DecodeStats, LineFramer, Operation, OperationDecoder};
use crate::core::document::{mutator, WorkflowDocument};
use crate::core::error::AppError;
use async_trait::async_trait;
use tracing::info;

/// Pull-based source of raw model output fragments.
///
/// `Ok(None)` signals end of input; `Err` signals a terminal stream fault.
#[async_trait]
pub trait FragmentSource {
    async fn next_fragment(&mut self) -> Result<Option<String>, AppError>;
}

/// One decode-apply run over one model output stream.
///
/// Owns the framer, the decoder, and the document being assembled. Fragments
/// are processed fully, one at a time, and operations are applied strictly in
/// line-completion order. Every mutation is atomic, so abandoning a session
/// mid-stream needs no rollback; the document reflects everything applied so
/// far.
#[derive(Debug, Default)]
pub struct DecodeSession {
    framer: LineFramer,
    decoder: OperationDecoder,
    document: WorkflowDocument,
}

impl DecodeSession {
    /// Start a session over an empty document (fresh authoring).
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session seeded from a prior document (editing).
    pub fn with_document(document: WorkflowDocument) -> Self {
        Self {
            framer: LineFramer::new(),
            decoder: OperationDecoder::new(),
            document,
        }
    }

    pub fn document(&self) -> &WorkflowDocument {
        &self.document
    }

    pub fn into_document(self) -> WorkflowDocument {
        self.document
    }

    pub fn stats(&self) -> &DecodeStats {
        self.decoder.stats()
    }

    /// Feed one fragment, returning the operations it completed and applied,
    /// in order.
    pub fn feed(&mut self, fragment: &str) -> Vec<Operation> {
        let mut applied = Vec::new();
        self.feed_with(fragment, |operation, _| applied.push(operation.clone()));
        applied
    }

    /// Feed one fragment, observing each applied operation together with the
    /// document state right after it.
    pub fn feed_with<F>(&mut self, fragment: &str, mut observe: F)
    where
        F: FnMut(&Operation, &WorkflowDocument),
    {
        for line in self.framer.push(fragment) {
            self.decode_and_apply(&line, &mut observe);
        }
    }

    /// Flush the residual buffer at end of input.
    pub fn finish(&mut self) -> Vec<Operation> {
        let mut applied = Vec::new();
        self.finish_with(|operation, _| applied.push(operation.clone()));
        applied
    }

    pub fn finish_with<F>(&mut self, mut observe: F)
    where
        F: FnMut(&Operation, &WorkflowDocument),
    {
        if let Some(line) = self.framer.finish() {
            self.decode_and_apply(&line, &mut observe);
        }
    }

    /// Drive a fragment source to completion, invoking the callback with the
    /// document-so-far after every applied operation.
    ///
    /// A source fault is returned as-is; everything applied before the fault
    /// stays applied.
    pub async fn run<S, F>(&mut self, source: &mut S, mut on_apply: F) -> Result<(), AppError>
    where
        S: FragmentSource + Send,
        F: FnMut(&WorkflowDocument) + Send,
    {
        loop {
            match source.next_fragment().await? {
                Some(fragment) => {
                    self.feed_with(&fragment, |_, document| on_apply(document));
                }
                None => {
                    self.finish_with(|_, document| on_apply(document));
                    let stats = self.decoder.stats();
                    info!(
                        decoded = stats.decoded,
                        malformed = stats.malformed_lines,
                        unknown = stats.unknown_tags,
                        "decode session reached end of input"
                    );
                    return Ok(());
                }
            }
        }
    }

    fn decode_and_apply<F>(&mut self, line: &str, observe: &mut F)
    where
        F: FnMut(&Operation, &WorkflowDocument),
    {
        if let Some(operation) = self.decoder.decode_line(line) {
            mutator::apply_operation(&mut self.document, operation.clone());
            observe(&operation, &self.document);
        }
    }
}
