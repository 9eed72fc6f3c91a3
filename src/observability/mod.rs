//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Engine, transport and middleware produce:
//!     → logging.rs (tracing subscriber, structured events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
