use async_trait::async_trait;
use futures::{pin_mut, StreamExt};
use skein::core::document::WorkflowDocument;
use skein::core::error::AppError;
use skein::core::session::{DecodeSession, FragmentSource};
use skein::core::types::ErrorCategory;
use skein::transport::{envelope_stream, Envelope, RemoteReassembler, StreamSignal};
use std::collections::VecDeque;

struct ScriptedSource {
    fragments: VecDeque<String>,
    fault: Option<String>,
}

impl ScriptedSource {
    fn new(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            fault: None,
        }
    }

    fn failing(fragments: &[&str], message: &str) -> Self {
        Self {
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            fault: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl FragmentSource for ScriptedSource {
    async fn next_fragment(&mut self) -> Result<Option<String>, AppError> {
        if let Some(fragment) = self.fragments.pop_front() {
            return Ok(Some(fragment));
        }
        match self.fault.take() {
            Some(message) => Err(AppError::new(ErrorCategory::StreamError, message)),
            None => Ok(None),
        }
    }
}

const MODEL_OUTPUT: &[&str] = &[
    "{\"op\":\"setName\",\"na",
    "me\":\"Demo\"}\n{\"op\":\"addNode\",\"node\":{\"id\":\"t1\",\"kind\":\"trigger\"}}\n",
    "{\"op\":\"addNode\",\"node\":{\"id\":\"a1\",\"kind\":\"action\"}}\n",
    "{\"op\":\"addEdge\",\"edge\":{\"id\":\"e1\",\"source\":\"t1\",\"target\":\"a1\"}}\n",
];

async fn collect_envelopes(source: ScriptedSource) -> Vec<Envelope> {
    let stream = envelope_stream(source, None);
    pin_mut!(stream);
    let mut envelopes = Vec::new();
    while let Some(envelope) = stream.next().await {
        envelopes.push(envelope);
    }
    envelopes
}

#[tokio::test]
async fn stream_ends_with_exactly_one_complete_envelope() {
    let envelopes = collect_envelopes(ScriptedSource::new(MODEL_OUTPUT)).await;
    assert_eq!(envelopes.len(), 5);
    assert!(matches!(envelopes.last(), Some(Envelope::Complete)));
    let operations = envelopes
        .iter()
        .filter(|envelope| matches!(envelope, Envelope::Operation { .. }))
        .count();
    assert_eq!(operations, 4);
}

#[tokio::test]
async fn source_fault_yields_one_terminal_error_envelope() {
    let envelopes = collect_envelopes(ScriptedSource::failing(
        &MODEL_OUTPUT[..2],
        "model stream interrupted",
    ))
    .await;
    match envelopes.last() {
        Some(Envelope::Error { message }) => {
            assert!(message.contains("model stream interrupted"));
        }
        other => panic!("expected terminal error envelope, got {:?}", other),
    }
    assert!(!envelopes
        .iter()
        .any(|envelope| matches!(envelope, Envelope::Complete)));
}

#[tokio::test]
async fn mirror_converges_to_the_origin_document() {
    let envelopes = collect_envelopes(ScriptedSource::new(MODEL_OUTPUT)).await;
    let mut wire = String::new();
    for envelope in &envelopes {
        wire.push_str(&envelope.to_line().expect("envelope line"));
    }

    let mut origin = DecodeSession::new();
    for fragment in MODEL_OUTPUT {
        origin.feed(fragment);
    }
    origin.finish();

    let mut applied = 0;
    let mut mirror = RemoteReassembler::new(|_| applied += 1);
    // Re-chunk the wire text at boundaries unrelated to record boundaries.
    let chars: Vec<char> = wire.chars().collect();
    for piece in chars.chunks(7) {
        let chunk: String = piece.iter().collect();
        mirror.feed_chunk(&chunk);
    }
    let report = mirror.finish();

    assert_eq!(report.document, *origin.document());
    assert_eq!(report.signal, Some(StreamSignal::Completed));
    assert_eq!(applied, 4);
    assert_eq!(report.skipped_envelopes, 0);
}

#[tokio::test]
async fn error_envelope_is_surfaced_as_a_fault_signal() {
    let envelopes = collect_envelopes(ScriptedSource::failing(
        &MODEL_OUTPUT[..2],
        "model stream interrupted",
    ))
    .await;
    let mut wire = String::new();
    for envelope in &envelopes {
        wire.push_str(&envelope.to_line().expect("envelope line"));
    }

    let mut mirror = RemoteReassembler::new(|_| {});
    mirror.feed_chunk(&wire);
    let report = mirror.finish();
    match report.signal {
        Some(StreamSignal::Faulted(message)) => {
            assert!(message.contains("model stream interrupted"));
        }
        other => panic!("expected fault signal, got {:?}", other),
    }
    // Operations decoded before the fault stay applied.
    assert_eq!(report.document.name.as_deref(), Some("Demo"));
}

#[test]
fn malformed_and_unknown_envelopes_are_skipped() {
    let mut mirror = RemoteReassembler::new(|_| {});
    mirror.feed_chunk(concat!(
        "{\"type\":\"operation\",\"operation\":{\"op\":\"setName\",\"name\":\"Demo\"}}\n",
        "{not json}\n",
        "{\"type\":\"heartbeat\"}\n",
        "{\"type\":\"operation\",\"operation\":{\"op\":\"futureOp\"}}\n",
        "{\"type\":\"complete\"}\n",
    ));
    let report = mirror.finish();
    assert_eq!(report.document.name.as_deref(), Some("Demo"));
    assert_eq!(report.signal, Some(StreamSignal::Completed));
    assert_eq!(report.skipped_envelopes, 2);
    assert_eq!(report.stats.unknown_tags, 1);
}

#[test]
fn seeded_mirror_edits_the_prior_document() {
    let mut seed = DecodeSession::new();
    seed.feed("{\"op\":\"addNode\",\"node\":{\"id\":\"t1\",\"kind\":\"trigger\"}}\n");
    seed.finish();

    let mut mirror = RemoteReassembler::with_document(seed.into_document(), |_| {});
    mirror.feed_chunk(concat!(
        "{\"type\":\"operation\",\"operation\":{\"op\":\"updateNode\",\"nodeId\":\"t1\",\"data\":{\"label\":\"Webhook\"}}}\n",
        "{\"type\":\"complete\"}\n",
    ));
    let report = mirror.finish();
    let node = report.document.find_node("t1").expect("node t1");
    assert_eq!(node.data.label, "Webhook");
}

#[tokio::test]
async fn run_records_a_transport_failure_as_a_fault() {
    let chunks: Vec<Result<String, AppError>> = vec![
        Ok("{\"type\":\"operation\",\"operation\":{\"op\":\"setName\",\"name\":\"Demo\"}}\n".to_string()),
        Err(AppError::new(
            ErrorCategory::StreamError,
            "connection reset",
        )),
    ];
    let mirror = RemoteReassembler::new(|_| {});
    let report = mirror.run(futures::stream::iter(chunks)).await;
    assert_eq!(report.document.name.as_deref(), Some("Demo"));
    match report.signal {
        Some(StreamSignal::Faulted(message)) => assert!(message.contains("connection reset")),
        other => panic!("expected fault signal, got {:?}", other),
    }
}
