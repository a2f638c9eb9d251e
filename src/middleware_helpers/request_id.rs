use crate::tracing::{scope_request_id, RequestId};
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn incoming_id(headers: &HeaderMap) -> Option<RequestId> {
    headers
        .get(REQUEST_ID_HEADER)?
        .to_str()
        .ok()
        .and_then(RequestId::from_header)
}

fn stamp(headers: &mut HeaderMap, value: &HeaderValue) {
    headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value.clone());
}

/// Honours an incoming `x-request-id` or mints one, then makes it visible to
/// handlers, error envelopes and the response headers.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let id = incoming_id(request.headers()).unwrap_or_default();
    // from_header only admits header-safe characters and minted ids are uuids
    let echoed = HeaderValue::from_str(id.as_str()).ok();

    if let Some(value) = &echoed {
        stamp(request.headers_mut(), value);
    }
    request.extensions_mut().insert(id.clone());

    let span = tracing::info_span!("ledger.request", request_id = %id);
    let mut response = scope_request_id(id, next.run(request).instrument(span)).await;

    if let Some(value) = &echoed {
        stamp(response.headers_mut(), value);
    }
    response
}
