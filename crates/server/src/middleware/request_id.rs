//! # Request Id Middleware
//!
//! Accepts a well-formed `x-request-id` from the caller or generates one,
//! runs the request inside a span carrying it and echoes it back. Error
//! envelopes also get the id as `requestId`.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use logging::{RequestId, REQUEST_ID_HEADER};
use tracing::Instrument;

/// Error envelopes are small; anything larger is passed through untouched.
const MAX_ERROR_BODY: usize = 64 * 1024;

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let id = RequestId::from_header_or_new(
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
    );
    request.extensions_mut().insert(id.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    let mut response = next.run(request).instrument(span).await;

    if is_json_error(&response) {
        response = stamp_error_body(response, &id).await;
    }
    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn is_json_error(response: &Response) -> bool {
    let status = response.status();
    (status.is_client_error() || status.is_server_error()) &&
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"))
}

async fn stamp_error_body(response: Response, id: &RequestId) -> Response {
    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ERROR_BODY).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "Could not buffer error body");
            return Response::from_parts(parts, Body::empty());
        },
    };

    let stamped = match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(serde_json::Value::Object(mut envelope)) if envelope.get("status").is_some_and(|s| s == "error") => {
            envelope.insert("requestId".to_string(), id.as_str().into());
            serde_json::to_vec(&envelope).ok()
        },
        _ => None,
    };

    match stamped {
        Some(body) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(body))
        },
        None => Response::from_parts(parts, Body::from(bytes)),
    }
}
