//! Demo server for the jin engine.
//!
//! ```text
//! GET  /                      welcome text
//! GET  /hello/:name           path parameter
//! GET  /assets/*filepath      wildcard capture
//! GET  /v1/hello?name=...     query parameter
//! POST /v1/login              JSON body echo
//! GET  /v2/hello/:name        guarded by X-Token
//! GET  /panic                 recovered by recovery()
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use clap::Parser;
use serde::Deserialize;

use jin::config::{load_config, ServerConfig};
use jin::lifecycle::{self, signals, Shutdown};
use jin::observability::logging;
use jin::{handler, Context, Engine, HandlerFunc, RouteError, Routes};

#[derive(Parser)]
#[command(name = "jin")]
#[command(about = "Demo HTTP server built on the jin routing engine", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[derive(Deserialize)]
struct Login {
    username: String,
    password: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("jin v{} starting", env!("CARGO_PKG_VERSION"));

    let engine = build_engine()?;

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_handler(Arc::clone(&shutdown));

    lifecycle::serve(engine, config, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_engine() -> Result<Engine, RouteError> {
    let mut engine = Engine::with_default_middleware();

    engine
        .get("/", |c: &mut Context| c.string(StatusCode::OK, "Hello from jin\n"))?
        .get("/hello/:name", |c: &mut Context| {
            let name = c.param("name").unwrap_or_default().to_string();
            c.string(StatusCode::OK, format!("hello {name}, you're at {}\n", c.path()));
        })?
        .get("/assets/*filepath", |c: &mut Context| {
            let filepath = c.param("filepath").unwrap_or_default().to_string();
            c.json(StatusCode::OK, &serde_json::json!({ "filepath": filepath }));
        })?
        .get("/panic", |_: &mut Context| {
            let names: Vec<&str> = Vec::new();
            // Out of bounds on purpose; recovery() turns it into a 500.
            let _ = names[10];
        })?;

    {
        let mut v1 = engine.group("/v1", []);
        v1.get("/hello", |c: &mut Context| {
            let name = c.query("name").unwrap_or_else(|| "stranger".to_string());
            c.string(StatusCode::OK, format!("hello {name}\n"));
        })?
        .post("/login", |c: &mut Context| match c.bind_json::<Login>() {
            Ok(login) if login.password.is_empty() => {
                c.abort(StatusCode::UNAUTHORIZED, "password required")
            }
            Ok(login) => c.json(StatusCode::OK, &serde_json::json!({ "username": login.username })),
            Err(e) => c.abort(StatusCode::BAD_REQUEST, e.to_string()),
        })?;
    }

    {
        let mut v2 = engine.group("/v2", [require_token()]);
        v2.get("/hello/:name", |c: &mut Context| {
            let name = c.param("name").unwrap_or_default().to_string();
            c.json(StatusCode::OK, &serde_json::json!({ "name": name, "path": c.path() }));
        })?;
    }

    Ok(engine)
}

/// Reject requests without an `X-Token` header.
fn require_token() -> HandlerFunc {
    handler(|c| {
        if c.header("x-token").is_none() {
            c.abort(StatusCode::UNAUTHORIZED, "missing X-Token header");
            return;
        }
        c.next();
    })
}
