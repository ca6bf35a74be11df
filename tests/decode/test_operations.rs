use skein::core::decode::{Operation, OperationDecoder};

#[test]
fn blank_and_fence_lines_are_never_counted_as_operations() {
    let mut decoder = OperationDecoder::new();
    assert!(decoder.decode_line("").is_none());
    assert!(decoder.decode_line("   ").is_none());
    assert!(decoder.decode_line("```json").is_none());
    assert!(decoder.decode_line("```").is_none());
    let stats = decoder.stats();
    assert_eq!(stats.decoded, 0);
    assert_eq!(stats.skipped_noise, 4);
    assert_eq!(stats.malformed_lines, 0);
}

#[test]
fn malformed_line_is_counted_and_decoding_continues() {
    let mut decoder = OperationDecoder::new();
    assert!(decoder.decode_line(r#"{"op":"setName","name":"#).is_none());
    let operation = decoder.decode_line(r#"{"op":"setName","name":"Demo"}"#);
    assert_eq!(
        operation,
        Some(Operation::SetName {
            name: Some("Demo".to_string())
        })
    );
    let stats = decoder.stats();
    assert_eq!(stats.malformed_lines, 1);
    assert_eq!(stats.decoded, 1);
}

#[test]
fn unrecognized_tag_is_ignored_for_forward_compatibility() {
    let mut decoder = OperationDecoder::new();
    assert!(decoder
        .decode_line(r#"{"op":"renameNode","nodeId":"n1","name":"x"}"#)
        .is_none());
    let stats = decoder.stats();
    assert_eq!(stats.unknown_tags, 1);
    assert_eq!(stats.malformed_lines, 0);
}

#[test]
fn record_without_an_op_tag_counts_as_malformed() {
    let mut decoder = OperationDecoder::new();
    assert!(decoder.decode_line(r#"{"name":"Demo"}"#).is_none());
    assert_eq!(decoder.stats().malformed_lines, 1);
}

#[test]
fn known_tag_with_invalid_payload_counts_as_malformed() {
    let mut decoder = OperationDecoder::new();
    assert!(decoder
        .decode_line(r#"{"op":"addNode","node":{"id":"n1"}}"#)
        .is_none());
    assert_eq!(decoder.stats().malformed_lines, 1);
}

#[test]
fn operations_decode_with_defaults_filled_in() {
    let mut decoder = OperationDecoder::new();
    let operation = decoder
        .decode_line(r#"{"op":"addEdge","edge":{"id":"e1","source":"a","target":"b"}}"#)
        .expect("edge operation");
    match operation {
        Operation::AddEdge { edge } => {
            assert_eq!(edge.kind, "default");
        }
        other => panic!("unexpected operation: {:?}", other),
    }
}
