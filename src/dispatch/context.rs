//! Per-request dispatch context.
//!
//! # Chain Protocol
//! ```text
//! engine calls next() once
//!     → handlers[0] runs; calling next() runs handlers[1] inside it
//!     → ... terminal handler writes the response
//!     → control unwinds back through each middleware's post-next() code
//!
//! abort(status, message)
//!     → cursor := chain length (every later next() is a no-op)
//!     → {"message": ...} written unless a response is already committed
//! ```

use axum::body::{Body, Bytes};
use axum::http::{header, Extensions, HeaderMap, HeaderName, HeaderValue, Method, Request, Response, StatusCode, Uri};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::dispatch::response::ResponseWriter;
use crate::dispatch::HandlersChain;
use crate::routing::{Params, Pattern};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// State for one request as it moves through its handler chain.
pub struct Context {
    request: Request<Bytes>,
    params: Params,
    full_path: Option<String>,
    handlers: HandlersChain,
    index: usize,
    writer: ResponseWriter,
}

impl Context {
    pub(crate) fn new(request: Request<Bytes>, handlers: HandlersChain) -> Self {
        Self {
            request,
            params: Params::default(),
            full_path: None,
            handlers,
            index: 0,
            writer: ResponseWriter::new(),
        }
    }

    pub(crate) fn with_route(mut self, pattern: &Pattern, params: Params) -> Self {
        self.full_path = Some(pattern.to_string());
        self.params = params;
        self
    }

    // Chain control

    /// Run the next handler in the chain, if any.
    ///
    /// Middleware call this to run everything downstream before continuing
    /// with their own code. A handler that never calls it ends the chain.
    pub fn next(&mut self) {
        let Some(handler) = self.handlers.get(self.index).cloned() else {
            return;
        };
        self.index += 1;
        handler(self);
    }

    /// Stop the chain and respond with `{"message": message}`.
    ///
    /// If a response body was already written, that response is kept and
    /// only the chain is stopped.
    pub fn abort(&mut self, status: StatusCode, message: impl Into<String>) {
        self.index = self.handlers.len();

        if self.writer.is_committed() {
            tracing::debug!(
                status = %status,
                committed = %self.writer.status(),
                "Abort after response was committed"
            );
            return;
        }

        let body = serde_json::json!({ "message": message.into() });
        self.json(status, &body);
    }

    /// Position of the cursor in the chain.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of handlers in this request's chain.
    pub fn chain_len(&self) -> usize {
        self.handlers.len()
    }

    // Request accessors

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    /// The pattern this request matched, e.g. `/user/:id`.
    pub fn full_path(&self) -> Option<&str> {
        self.full_path.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// A request header as text, if present and valid ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.headers().get(name).and_then(|v| v.to_str().ok())
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(crate::http::X_REQUEST_ID)
    }

    pub fn body(&self) -> &Bytes {
        self.request.body()
    }

    /// Deserialize the request body as JSON.
    pub fn bind_json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(self.request.body())
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// First query string value for `key`, form-urlencoded decoded.
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.request.uri().query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Per-request storage shared between middleware and handlers.
    pub fn extensions(&self) -> &Extensions {
        self.request.extensions()
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        self.request.extensions_mut()
    }

    // Response helpers

    pub fn writer(&self) -> &ResponseWriter {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut ResponseWriter {
        &mut self.writer
    }

    pub fn status(&mut self, status: StatusCode) {
        self.writer.set_status(status);
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.writer.set_header(name, value);
    }

    /// Write a plain-text body.
    pub fn string(&mut self, status: StatusCode, text: impl AsRef<str>) {
        self.data(status, TEXT_PLAIN, text.as_ref().as_bytes());
    }

    /// Write `value` as a JSON body.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(body) => self.data(status, APPLICATION_JSON, &body),
            Err(e) => {
                tracing::error!(error = %e, path = %self.path(), "Failed to serialize JSON response");
                self.string(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
            }
        }
    }

    /// Write raw bytes with the given content type.
    pub fn data(&mut self, status: StatusCode, content_type: &'static str, body: &[u8]) {
        self.writer
            .set_header(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        self.writer.set_status(status);
        self.writer.write(body);
    }

    pub(crate) fn into_response(self) -> Response<Body> {
        self.writer.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{handler, HandlerFunc};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    fn record(log: &Log, entry: &str) {
        log.lock().unwrap().push(entry.to_string());
    }

    fn context(handlers: Vec<HandlerFunc>) -> Context {
        let request = Request::builder()
            .uri("/items?sort=name&q=hello+world")
            .body(Bytes::from_static(br#"{"name":"jin"}"#))
            .unwrap();
        Context::new(request, Arc::from(handlers))
    }

    fn wrapping(log: &Log, name: &'static str) -> HandlerFunc {
        let log = log.clone();
        handler(move |c| {
            record(&log, &format!("{name}:before"));
            c.next();
            record(&log, &format!("{name}:after"));
        })
    }

    #[test]
    fn middleware_wraps_downstream() {
        let log: Log = Arc::default();
        let terminal = {
            let log = log.clone();
            handler(move |c| {
                record(&log, "handler");
                c.string(StatusCode::OK, "done");
            })
        };
        let mut c = context(vec![wrapping(&log, "a"), wrapping(&log, "b"), terminal]);
        c.next();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:before", "b:before", "handler", "b:after", "a:after"]
        );
        assert_eq!(c.writer().body(), b"done");
        assert_eq!(c.index(), 3);
    }

    #[test]
    fn handler_without_next_stops_chain() {
        let log: Log = Arc::default();
        let gate = {
            let log = log.clone();
            handler(move |_| record(&log, "gate"))
        };
        let terminal = {
            let log = log.clone();
            handler(move |_| record(&log, "handler"))
        };
        let mut c = context(vec![wrapping(&log, "a"), gate, terminal]);
        c.next();

        assert_eq!(*log.lock().unwrap(), vec!["a:before", "gate", "a:after"]);
    }

    #[test]
    fn next_past_end_is_noop() {
        let calls = Arc::new(Mutex::new(0));
        let h = {
            let calls = calls.clone();
            handler(move |c| {
                *calls.lock().unwrap() += 1;
                // Calling next twice from the last handler must not rerun it.
                c.next();
                c.next();
            })
        };
        let mut c = context(vec![h]);
        c.next();
        c.next();
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn abort_stops_outer_frames() {
        let log: Log = Arc::default();
        let double_next = {
            let log = log.clone();
            handler(move |c| {
                record(&log, "outer");
                c.next();
                c.next();
                c.next();
            })
        };
        let aborting = {
            let log = log.clone();
            handler(move |c| {
                record(&log, "auth");
                c.abort(StatusCode::UNAUTHORIZED, "unauthorized");
                c.next();
            })
        };
        let terminal = {
            let log = log.clone();
            handler(move |_| record(&log, "handler"))
        };
        let mut c = context(vec![double_next, aborting, terminal]);
        c.next();

        assert_eq!(*log.lock().unwrap(), vec!["outer", "auth"]);
        assert_eq!(c.index(), c.chain_len());
        assert_eq!(c.writer().status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = serde_json::from_slice(c.writer().body()).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "unauthorized" }));
    }

    #[test]
    fn repeated_abort_keeps_first_response() {
        let h = handler(|c| {
            c.abort(StatusCode::FORBIDDEN, "first");
            c.abort(StatusCode::BAD_REQUEST, "second");
        });
        let mut c = context(vec![h]);
        c.next();

        assert_eq!(c.writer().status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = serde_json::from_slice(c.writer().body()).unwrap();
        assert_eq!(body["message"], "first");
    }

    #[test]
    fn request_accessors() {
        let mut c = context(vec![]);
        assert_eq!(c.path(), "/items");
        assert_eq!(c.query("q").as_deref(), Some("hello world"));
        assert_eq!(c.query("sort").as_deref(), Some("name"));
        assert_eq!(c.query("missing"), None);

        #[derive(serde::Deserialize)]
        struct Item {
            name: String,
        }
        let item: Item = c.bind_json().unwrap();
        assert_eq!(item.name, "jin");

        c.extensions_mut().insert(7u32);
        assert_eq!(c.extensions().get::<u32>(), Some(&7));
    }

    #[test]
    fn json_sets_content_type() {
        let mut c = context(vec![]);
        c.json(StatusCode::CREATED, &serde_json::json!({ "ok": true }));
        let response = c.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], APPLICATION_JSON);
    }
}
