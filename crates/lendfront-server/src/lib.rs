//! lendfront HTTP server.
//!
//! Wires the settings store, admin gate, lead notifier and image resizer into
//! an Axum router. The JSON API lives under `/v1/*`; stored upload variants
//! are served from `/images/*`.

pub mod app;
pub mod config;
pub mod error;
pub mod notify;
pub mod resize;
pub mod routes;
pub mod state;
