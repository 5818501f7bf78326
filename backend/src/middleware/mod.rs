//! HTTP middleware for the Service Marketplace Platform

pub mod auth;

pub use auth::{auth_middleware, optional_auth_middleware, AuthUser, CurrentUser};
