//! End-to-end resolution and chain execution through `Engine::serve_request`.

use axum::http::{Method, StatusCode};
use jin::routing::RouteMiss;
use jin::{handler, Context, Engine, Routes};

mod common;
use common::{body_text, request, CallLog};

fn echo_params(c: &mut Context) {
    let params: serde_json::Map<String, serde_json::Value> = c
        .params()
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
        .collect();
    c.json(StatusCode::OK, &params);
}

fn named(name: &'static str) -> impl Fn(&mut Context) + Send + Sync + 'static {
    move |c: &mut Context| c.string(StatusCode::OK, name)
}

#[tokio::test]
async fn parameter_binding() {
    let mut engine = Engine::new();
    engine.get("/user/:id", echo_params).unwrap();

    let response = engine.serve_request(request(Method::GET, "/user/42"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, r#"{"id":"42"}"#);
}

#[tokio::test]
async fn literal_wins_over_parameter() {
    let mut engine = Engine::new();
    engine
        .get("/user/:id", named("param"))
        .unwrap()
        .get("/user/me", named("literal"))
        .unwrap();

    let me = engine.serve_request(request(Method::GET, "/user/me"));
    assert_eq!(body_text(me).await, "literal");
    let other = engine.serve_request(request(Method::GET, "/user/you"));
    assert_eq!(body_text(other).await, "param");
}

#[tokio::test]
async fn wildcard_capture() {
    let mut engine = Engine::new();
    engine.get("/assets/*filepath", echo_params).unwrap();

    let deep = engine.serve_request(request(Method::GET, "/assets/js/app.js"));
    assert_eq!(body_text(deep).await, r#"{"filepath":"js/app.js"}"#);

    let empty = engine.serve_request(request(Method::GET, "/assets/"));
    assert_eq!(body_text(empty).await, r#"{"filepath":""}"#);

    let bare = engine.serve_request(request(Method::GET, "/assets"));
    assert_eq!(bare.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn not_found_body() {
    let engine = Engine::new();
    let response = engine.serve_request(request(Method::GET, "/anything"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "404 page not found");
}

#[test]
fn group_middleware_is_outermost_first() {
    let log = CallLog::default();
    let mut engine = Engine::new();
    engine.use_middleware([log.middleware("A")]);

    let h = {
        let log = log.clone();
        move |_: &mut Context| log.push("H")
    };
    engine
        .group("/child", [])
        .use_middleware([log.middleware("B")])
        .get("/h", h)
        .unwrap();

    engine.serve_request(request(Method::GET, "/child/h"));
    assert_eq!(log.entries(), vec!["A", "B", "H"]);
}

#[test]
fn root_routes_get_root_middleware() {
    let log = CallLog::default();
    let mut engine = Engine::new();
    engine.use_middleware([log.middleware("A"), log.middleware("B")]);
    let h = {
        let log = log.clone();
        move |_: &mut Context| log.push("H")
    };
    engine.get("/", h).unwrap();

    engine.serve_request(request(Method::GET, "/"));
    assert_eq!(log.entries(), vec!["A", "B", "H"]);
}

#[tokio::test]
async fn abort_counts_only_handlers_up_to_aborter() {
    let log = CallLog::default();
    let mut engine = Engine::new();

    let outer = {
        let log = log.clone();
        handler(move |c| {
            log.push("outer");
            c.next();
            c.next();
            log.push("outer:after");
        })
    };
    let guard = {
        let log = log.clone();
        handler(move |c| {
            log.push("guard");
            c.next();
        })
    };
    let aborter = {
        let log = log.clone();
        handler(move |c| {
            log.push("aborter");
            c.abort(StatusCode::FORBIDDEN, "forbidden");
            c.next();
        })
    };
    let h = {
        let log = log.clone();
        move |_: &mut Context| log.push("H")
    };

    engine.use_middleware([outer, guard, aborter]);
    engine.get("/secret", h).unwrap();

    let response = engine.serve_request(request(Method::GET, "/secret"));
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(response).await, r#"{"message":"forbidden"}"#);
    assert_eq!(log.entries(), vec!["outer", "guard", "aborter", "outer:after"]);
}

#[test]
fn unregistered_method_is_distinguished_by_router() {
    let mut engine = Engine::new();
    engine.get("/ping", named("pong")).unwrap();

    let miss = engine.router().resolve(&Method::PATCH, "/ping").unwrap_err();
    assert_eq!(miss, RouteMiss::UnknownMethod);
    let miss = engine.router().resolve(&Method::GET, "/pong").unwrap_err();
    assert_eq!(miss, RouteMiss::NoMatch);

    let response = engine.serve_request(request(Method::PATCH, "/ping"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn literal_patterns_round_trip() {
    let patterns = ["/", "/a", "/a/", "/a/b/c", "/x-y/z.json"];
    let mut engine = Engine::new();
    for p in patterns {
        engine.get(p, named("ok")).unwrap();
    }

    for p in patterns {
        let resolved = engine.router().resolve(&Method::GET, p).unwrap();
        assert_eq!(resolved.pattern.as_str(), p);
        assert!(resolved.params.is_empty());
    }
}

#[tokio::test]
async fn full_path_reports_matched_pattern() {
    let mut engine = Engine::new();
    engine
        .get("/files/:name", |c: &mut Context| {
            let pattern = c.full_path().unwrap_or_default().to_string();
            c.string(StatusCode::OK, pattern);
        })
        .unwrap();

    let response = engine.serve_request(request(Method::GET, "/files/readme"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "/files/:name");
}
