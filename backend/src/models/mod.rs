//! Database models for the Service Marketplace Platform
//!
//! Re-exports models from the shared crate; row structs live next to the
//! services that query them.

pub use shared::models::*;
