//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Account role, fixed at registration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Business,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Business => "business",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(UserRole::Customer),
            "business" => Some(UserRole::Business),
            _ => None,
        }
    }
}

/// Pricing tier of an offer detail
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OfferType {
    Basic,
    Standard,
    Premium,
}

impl OfferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferType::Basic => "basic",
            OfferType::Standard => "standard",
            OfferType::Premium => "premium",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "basic" => Some(OfferType::Basic),
            "standard" => Some(OfferType::Standard),
            "premium" => Some(OfferType::Premium),
            _ => None,
        }
    }
}

/// Lifecycle state of an order
///
/// Any state may be set by the business user of the order; the transition
/// graph is deliberately unrestricted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in_progress" => Some(OrderStatus::InProgress),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}
