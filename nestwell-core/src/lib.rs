//! Core library for Nestwell.
//!
//! This crate provides the domain models, the journey stage-progression model
//! and the database operations for Nestwell, independent of any transport
//! layer (HTTP, MCP, etc.).
//!
//! # Usage
//!
//! ```no_run
//! use nestwell_core::db::Database;
//! use nestwell_core::models::*;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let surrogates = db.list_participants(&ParticipantFilter {
//!     role: Some(ParticipantRole::Surrogate),
//!     status: None,
//! })?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod names;
pub mod progression;

// Re-export commonly used types at crate root
pub use db::Database;
pub use error::{ProgressionError, ValidationError};
pub use names::resolve_display_name;
pub use progression::StageTimeline;
