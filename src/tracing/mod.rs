use axum::http::Request;
use std::{cell::RefCell, fmt, future::Future};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, MakeSpan, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

/// Correlates the log lines and the response envelope of a single call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

impl Default for RequestId {
    /// A fresh v4 uuid.
    fn default() -> Self {
        Self::new(Uuid::new_v4().hyphenated().to_string())
    }
}

impl RequestId {
    pub fn new(value: impl Into<String>) -> Self {
        RequestId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Accepts a caller supplied id only when it is safe to echo back as a header.
    pub fn from_header(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let acceptable = !trimmed.is_empty()
            && trimmed.len() <= 128
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'));
        acceptable.then(|| RequestId::new(trimmed))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

tokio::task_local! {
    static CURRENT_REQUEST_ID: RefCell<Option<RequestId>>;
}

/// Runs `work` with `id` readable through [`current_request_id`].
pub async fn scope_request_id<R>(id: RequestId, work: impl Future<Output = R>) -> R {
    CURRENT_REQUEST_ID.scope(RefCell::new(Some(id)), work).await
}

/// `None` outside of a request, e.g. in startup code or background tasks.
pub fn current_request_id() -> Option<RequestId> {
    CURRENT_REQUEST_ID
        .try_with(|slot| slot.borrow().clone())
        .unwrap_or(None)
}

#[derive(Clone, Default)]
pub struct RequestSpanMaker;

impl<B> MakeSpan<B> for RequestSpanMaker {
    fn make_span(&mut self, request: &Request<B>) -> tracing::Span {
        let header = crate::middleware_helpers::request_id::REQUEST_ID_HEADER;
        let id = match request.extensions().get::<RequestId>() {
            Some(id) => id.clone(),
            None => request
                .headers()
                .get(header)
                .and_then(|raw| raw.to_str().ok())
                .and_then(RequestId::from_header)
                .unwrap_or_default(),
        };

        tracing::info_span!(
            "http.request",
            request_id = %id,
            method = %request.method(),
            uri = %request.uri(),
        )
    }
}

/// tower-http trace layer: per-request spans at DEBUG, 5xx responses at ERROR.
pub fn configure_http_tracing() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    RequestSpanMaker,
    DefaultOnRequest,
    DefaultOnResponse,
> {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpanMaker)
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG))
        .on_failure(DefaultOnFailure::new().level(Level::ERROR))
}
