//! # Observability Module
//!
//! Structured logging for the node. HTTP requests are traced by the
//! `TraceLayer` installed in [`crate::api::create_router`].

mod logging;

pub use logging::{default_directive, init_logging, LogFormat};
