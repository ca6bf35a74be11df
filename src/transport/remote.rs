use crate::core::decode::{DecodeStats, LineFramer, OperationDecoder};
use crate::core::document::{mutator, WorkflowDocument};
use crate::core::error::AppError;
use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::{debug, warn};

/// Terminal signal observed on the envelope stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSignal {
    Completed,
    Faulted(String),
}

/// Final state of a mirrored session.
#[derive(Debug, Clone)]
pub struct MirrorReport {
    pub document: WorkflowDocument,
    /// `None` when the stream ended without a terminal envelope.
    pub signal: Option<StreamSignal>,
    pub stats: DecodeStats,
    pub skipped_envelopes: u64,
}

/// Receiving-side mirror of the origin pipeline.
///
/// Reassembles envelope records out of arbitrarily-chunked bytes with the
/// same partial-fragment and malformed-line tolerance as the origin framer
/// and decoder, applies each carried operation to its own (possibly seeded)
/// document, and invokes the caller's callback with the document-so-far
/// after every applied operation.
pub struct RemoteReassembler<F: FnMut(&WorkflowDocument)> {
    framer: LineFramer,
    decoder: OperationDecoder,
    document: WorkflowDocument,
    signal: Option<StreamSignal>,
    skipped_envelopes: u64,
    on_apply: F,
}

impl<F: FnMut(&WorkflowDocument)> RemoteReassembler<F> {
    pub fn new(on_apply: F) -> Self {
        Self::with_document(WorkflowDocument::default(), on_apply)
    }

    pub fn with_document(document: WorkflowDocument, on_apply: F) -> Self {
        Self {
            framer: LineFramer::new(),
            decoder: OperationDecoder::new(),
            document,
            signal: None,
            skipped_envelopes: 0,
            on_apply,
        }
    }

    pub fn document(&self) -> &WorkflowDocument {
        &self.document
    }

    pub fn signal(&self) -> Option<&StreamSignal> {
        self.signal.as_ref()
    }

    /// Feed one chunk of the transport byte stream.
    pub fn feed_chunk(&mut self, chunk: &str) {
        for line in self.framer.push(chunk) {
            self.handle_line(&line);
        }
    }

    /// Flush the residual line and hand back the mirrored document.
    pub fn finish(mut self) -> MirrorReport {
        if let Some(line) = self.framer.finish() {
            self.handle_line(&line);
        }
        MirrorReport {
            stats: self.decoder.stats().clone(),
            document: self.document,
            signal: self.signal,
            skipped_envelopes: self.skipped_envelopes,
        }
    }

    /// Drive a chunk stream to completion. A transport-level read failure is
    /// recorded as a fault; everything applied before it stays applied.
    pub async fn run<St>(mut self, mut chunks: St) -> MirrorReport
    where
        St: Stream<Item = Result<String, AppError>> + Unpin,
    {
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(chunk) => self.feed_chunk(&chunk),
                Err(err) => {
                    if self.signal.is_none() {
                        self.signal = Some(StreamSignal::Faulted(err.to_string()));
                    }
                    break;
                }
            }
        }
        self.finish()
    }

    fn handle_line(&mut self, line: &str) {
        // Nothing follows a terminal envelope.
        if self.signal.is_some() {
            return;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("```") {
            return;
        }
        let value: Value = match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(err) => {
                self.skipped_envelopes += 1;
                warn!(error = %err, "discarding malformed envelope line");
                return;
            }
        };
        match value.get("type").and_then(Value::as_str) {
            Some("operation") => {
                let Some(inner) = value.get("operation").cloned() else {
                    self.skipped_envelopes += 1;
                    warn!("discarding operation envelope without a payload");
                    return;
                };
                if let Some(operation) = self.decoder.decode_value(inner) {
                    mutator::apply_operation(&mut self.document, operation);
                    (self.on_apply)(&self.document);
                }
            }
            Some("complete") => {
                self.signal = Some(StreamSignal::Completed);
            }
            Some("error") => {
                let message = value
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("upstream stream fault")
                    .to_string();
                self.signal = Some(StreamSignal::Faulted(message));
            }
            other => {
                self.skipped_envelopes += 1;
                debug!(envelope_type = ?other, "ignoring envelope with unrecognized type");
            }
        }
    }
}
