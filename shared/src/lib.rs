//! Shared types and models for the Service Marketplace Platform
//!
//! This crate contains the domain vocabulary (roles, tiers, order states),
//! request/response data shapes, and pure validation rules shared between
//! the backend and other components of the system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
