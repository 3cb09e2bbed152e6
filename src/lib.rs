//! Nestwell: back-office service for surrogacy agencies.
//!
//! The domain lives in `nestwell-core`; this crate adds the transports
//! (HTTP API, MCP over stdio) and runtime configuration.

pub mod api;
pub mod config;
pub mod mcp;

pub use nestwell_core::{db, models};
