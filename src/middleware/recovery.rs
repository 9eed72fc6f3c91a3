//! Panic recovery middleware.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use axum::http::StatusCode;

use crate::dispatch::{handler, HandlerFunc};
use crate::observability::metrics;

/// Catch panics raised downstream and answer 500.
///
/// Install it early in the chain: only handlers that run inside its
/// `next()` call are covered.
pub fn recovery() -> HandlerFunc {
    handler(|c| {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| c.next()));
        if let Err(payload) = outcome {
            tracing::error!(
                request_id = c.request_id().unwrap_or("-"),
                method = %c.method(),
                path = %c.path(),
                panic = %panic_message(payload.as_ref()),
                "Handler panicked"
            );
            metrics::record_panic();
            c.abort(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
