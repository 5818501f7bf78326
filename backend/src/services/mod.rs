//! Business logic services for the Service Marketplace Platform

pub mod auth;
pub mod base_info;
pub mod offer;
pub mod order;
pub mod profile;
pub mod review;

pub use auth::AuthService;
pub use base_info::BaseInfoService;
pub use offer::OfferService;
pub use order::OrderService;
pub use profile::ProfileService;
pub use review::ReviewService;
