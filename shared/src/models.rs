//! Data shapes shared between the backend and API consumers

use serde::{Deserialize, Serialize};

use crate::types::OfferType;

/// One pricing tier of an offer, as submitted on create/update and as
/// snapshotted into orders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OfferDetailData {
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: i32,
    pub features: Vec<String>,
    pub offer_type: OfferType,
}

/// Compact owner info embedded in offer list entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetails {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

/// Page envelope for paginated list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub count: i64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}
