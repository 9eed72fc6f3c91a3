//! Access logging middleware.

use std::time::Instant;

use crate::dispatch::{handler, HandlerFunc};
use crate::observability::metrics;

/// Log every request once the rest of the chain has finished.
pub fn logger() -> HandlerFunc {
    handler(|c| {
        let start = Instant::now();
        c.next();

        let status = c.writer().status();
        let route = c.full_path().unwrap_or("-").to_string();
        tracing::info!(
            request_id = c.request_id().unwrap_or("-"),
            method = %c.method(),
            path = %c.path(),
            route = %route,
            status = status.as_u16(),
            latency_us = start.elapsed().as_micros() as u64,
            "Request handled"
        );
        metrics::record_request(c.method().as_str(), &route, status.as_u16(), start);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Context;
    use crate::engine::Engine;
    use crate::routing::Routes;
    use axum::body::Bytes;
    use axum::http::{Request, StatusCode};

    #[test]
    fn passes_through_to_handler() {
        let mut engine = Engine::new();
        engine.use_middleware([logger()]);
        engine
            .get("/teapot", |c: &mut Context| c.string(StatusCode::IM_A_TEAPOT, "short and stout"))
            .unwrap();

        let request = Request::builder().uri("/teapot").body(Bytes::new()).unwrap();
        let response = engine.serve_request(request);
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }
}
