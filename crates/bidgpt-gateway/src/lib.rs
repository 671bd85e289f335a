//! # BidGPT Gateway
//!
//! Axum HTTP surface: `/chat`, `/translate`, `/feedback`, `/health` and the
//! static front-end.

pub mod routes;
pub mod server;

pub use server::{AppState, Features, build_router, start};
