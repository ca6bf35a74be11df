use crate::core::error::AppError;
use crate::core::session::FragmentSource;
use crate::core::types::ErrorCategory;
use crate::transport::stream::envelope_stream;
use async_trait::async_trait;
use axum::{
    body::{Body, BodyDataStream, Bytes},
    http::{header, HeaderValue, Response},
    routing::post,
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_stream::StreamExt;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

/// Start the decode-stream listener and block until the service terminates.
pub async fn serve_stream(bind: SocketAddr, max_body_bytes: usize) -> Result<(), AppError> {
    serve_stream_internal(bind, max_body_bytes, None).await
}

/// Start the listener and notify once the bind address is known (test helper).
pub async fn serve_stream_with_ready_notifier(
    bind: SocketAddr,
    max_body_bytes: usize,
    ready_notifier: oneshot::Sender<SocketAddr>,
) -> Result<(), AppError> {
    serve_stream_internal(bind, max_body_bytes, Some(ready_notifier)).await
}

async fn serve_stream_internal(
    bind: SocketAddr,
    max_body_bytes: usize,
    ready_notifier: Option<oneshot::Sender<SocketAddr>>,
) -> Result<(), AppError> {
    let router = Router::new()
        .route("/v1/decode/stream", post(handle_decode_stream))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(CorsLayer::permissive());
    let listener = TcpListener::bind(bind).await.map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to bind decode-stream listener {}: {}", bind, err),
        )
    })?;
    let local_addr = listener.local_addr().map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to determine decode-stream listener address: {}", err),
        )
    })?;
    if let Some(tx) = ready_notifier {
        let _ = tx.send(local_addr);
    }
    info!("decode-stream server listening on {}", local_addr);
    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| {
            AppError::new(
                ErrorCategory::StreamError,
                format!("decode-stream server terminated: {}", err),
            )
        })
}

/// Decode the raw model text arriving in the request body and answer with a
/// held-open newline-delimited envelope stream. Caching is disabled so
/// intermediaries never buffer or replay partial sessions.
async fn handle_decode_stream(body: Body) -> Response<Body> {
    let source = BodyFragmentSource {
        inner: body.into_data_stream(),
        carry: Vec::new(),
    };
    let lines =
        envelope_stream(source, None).map(|envelope| envelope.to_line().map(Bytes::from));
    let mut response = Response::new(Body::from_stream(lines));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/x-ndjson"),
    );
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// Adapts the request body's chunk stream to the session's fragment source.
///
/// Transport chunks may split a multi-byte UTF-8 character, so decoding each
/// chunk in isolation would corrupt it. Incomplete trailing bytes stay in
/// `carry` until the next chunk completes them.
struct BodyFragmentSource {
    inner: BodyDataStream,
    carry: Vec<u8>,
}

impl BodyFragmentSource {
    /// Drain the longest decodable prefix of the byte buffer, leaving an
    /// incomplete trailing character sequence for the next chunk.
    fn drain_ready_text(&mut self) -> String {
        let ready_len = match std::str::from_utf8(&self.carry) {
            Ok(_) => self.carry.len(),
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            // Invalid bytes can never complete; hand the buffer to the lossy
            // decoder so the stream keeps moving.
            Err(_) => self.carry.len(),
        };
        let rest = self.carry.split_off(ready_len);
        let ready = std::mem::replace(&mut self.carry, rest);
        String::from_utf8_lossy(&ready).into_owned()
    }
}

#[async_trait]
impl FragmentSource for BodyFragmentSource {
    async fn next_fragment(&mut self) -> Result<Option<String>, AppError> {
        match self.inner.next().await {
            None => {
                if self.carry.is_empty() {
                    return Ok(None);
                }
                // Truncated final character at end of input.
                let residue = String::from_utf8_lossy(&self.carry).into_owned();
                self.carry.clear();
                Ok(Some(residue))
            }
            Some(Ok(bytes)) => {
                self.carry.extend_from_slice(&bytes);
                Ok(Some(self.drain_ready_text()))
            }
            Some(Err(err)) => Err(AppError::new(
                ErrorCategory::StreamError,
                format!("request body stream failed: {}", err),
            )),
        }
    }
}
