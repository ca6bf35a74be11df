use crate::core::document::WorkflowDocument;
use crate::core::session::{DecodeSession, FragmentSource};
use crate::transport::envelope::Envelope;
use async_stream::stream;
use futures::Stream;
use tracing::error;

/// Decode a fragment source at the origin and yield transport envelopes,
/// strictly in decode order.
///
/// Every successfully decoded operation becomes one `operation` envelope;
/// end of input is followed by exactly one `complete`; a source fault yields
/// exactly one `error` envelope in its place and nothing after it. The
/// session mutates its own document copy so origin and mirror observe
/// identical intermediate states, trigger repair included.
pub fn envelope_stream<S>(
    mut source: S,
    seed: Option<WorkflowDocument>,
) -> impl Stream<Item = Envelope> + Send
where
    S: FragmentSource + Send + 'static,
{
    stream! {
        let mut session = match seed {
            Some(document) => DecodeSession::with_document(document),
            None => DecodeSession::new(),
        };
        loop {
            match source.next_fragment().await {
                Ok(Some(fragment)) => {
                    for operation in session.feed(&fragment) {
                        yield Envelope::operation(operation);
                    }
                }
                Ok(None) => {
                    for operation in session.finish() {
                        yield Envelope::operation(operation);
                    }
                    yield Envelope::Complete;
                    break;
                }
                Err(err) => {
                    error!(error = %err, "fragment source failed, terminating stream");
                    yield Envelope::error(err.to_string());
                    break;
                }
            }
        }
    }
}
