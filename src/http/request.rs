//! Request preparation for the engine.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Buffer the body up to the configured limit
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Declared `Content-Length` over the limit is rejected before reading
//! - A body that overruns the limit while streaming is `TooLarge` as well

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, HeaderValue, Request};
use http_body_util::LengthLimitError;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID generator for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Why a body could not be buffered.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Read(#[source] axum::Error),
}

/// Collect the body so the engine sees a complete request.
pub async fn buffer_request(request: Request<Body>, limit: usize) -> Result<Request<Bytes>, BodyError> {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(BodyError::TooLarge { limit });
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, limit).await.map_err(|e| {
        if exceeds_limit(&e) {
            BodyError::TooLarge { limit }
        } else {
            BodyError::Read(e)
        }
    })?;
    Ok(Request::from_parts(parts, bytes))
}

fn exceeds_limit(error: &axum::Error) -> bool {
    let mut cursor: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(e) = cursor {
        if e.is::<LengthLimitError>() {
            return true;
        }
        cursor = e.source();
    }
    false
}
