//! HTTP handlers for the Service Marketplace Platform

pub mod auth;
pub mod base_info;
pub mod health;
pub mod offer;
pub mod order;
pub mod profile;
pub mod review;

pub use auth::*;
pub use base_info::*;
pub use health::*;
pub use offer::*;
pub use order::*;
pub use profile::*;
pub use review::*;
