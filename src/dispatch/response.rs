//! Buffered response writer.
//!
//! # Responsibilities
//! - Collect status, headers and body written by handlers
//! - Commit the status on the first body write
//! - Convert into the transport's response type
//!
//! # Design Decisions
//! - The first write wins: once committed, status and header changes are
//!   ignored and logged
//! - Nothing written means `200 OK` with an empty body

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Response, StatusCode};

#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    committed: bool,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// True once the body has been written to.
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn set_status(&mut self, status: StatusCode) {
        if self.committed {
            tracing::warn!(
                current = %self.status,
                ignored = %status,
                "Status change after response was committed"
            );
            return;
        }
        self.status = status;
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        if self.committed {
            tracing::warn!(header = %name, "Header change after response was committed");
            return;
        }
        self.headers.insert(name, value);
    }

    /// Append to the body, committing status and headers.
    pub fn write(&mut self, data: &[u8]) {
        self.committed = true;
        self.body.extend_from_slice(data);
    }

    pub fn into_response(self) -> Response<Body> {
        let mut response = Response::new(Body::from(Bytes::from(self.body)));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn defaults_to_ok() {
        let w = ResponseWriter::new();
        assert_eq!(w.status(), StatusCode::OK);
        assert!(!w.is_committed());
        assert!(w.body().is_empty());
    }

    #[test]
    fn first_write_commits() {
        let mut w = ResponseWriter::new();
        w.set_status(StatusCode::CREATED);
        w.set_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        w.write(b"one");

        w.set_status(StatusCode::BAD_REQUEST);
        w.set_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        w.write(b"two");

        assert!(w.is_committed());
        assert_eq!(w.status(), StatusCode::CREATED);
        assert_eq!(w.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(w.body(), b"onetwo");

        let response = w.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
