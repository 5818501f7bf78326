//! Order lifecycle service
//!
//! Orders are denormalized snapshots of one offer detail: all pricing
//! fields are copied at creation time and never re-derived, so later offer
//! edits do not touch existing orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use shared::{OfferType, OrderStatus, UserRole};

/// Order service for creating, listing, and transitioning orders
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Database row for an order
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    customer_user_id: i64,
    business_user_id: i64,
    title: String,
    revisions: i32,
    delivery_time_in_days: i32,
    price: i32,
    features: sqlx::types::Json<Vec<String>>,
    offer_type: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> AppResult<Order> {
        let offer_type = OfferType::from_str(&self.offer_type)
            .ok_or_else(|| AppError::Internal(format!("Unknown offer type: {}", self.offer_type)))?;
        let status = OrderStatus::from_str(&self.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown order status: {}", self.status)))?;

        Ok(Order {
            id: self.id,
            customer_user: self.customer_user_id,
            business_user: self.business_user_id,
            title: self.title,
            revisions: self.revisions,
            delivery_time_in_days: self.delivery_time_in_days,
            price: self.price,
            features: self.features.0,
            offer_type,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// An order as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: i64,
    pub customer_user: i64,
    pub business_user: i64,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: i32,
    pub features: Vec<String>,
    pub offer_type: OfferType,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an order
///
/// `offer_detail_id` is kept as a raw JSON value so that a missing or
/// non-integer id maps to a field-keyed 400 instead of a body rejection.
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub offer_detail_id: Option<serde_json::Value>,
}

/// Input for updating an order's status
#[derive(Debug, Deserialize)]
pub struct UpdateOrderInput {
    pub status: Option<String>,
}

/// Offer detail snapshot source, joined with its parent offer's owner
#[derive(Debug, sqlx::FromRow)]
struct SnapshotSourceRow {
    title: String,
    revisions: i32,
    delivery_time_in_days: i32,
    price: i32,
    features: sqlx::types::Json<Vec<String>>,
    offer_type: String,
    business_user_id: i64,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an order from an offer detail snapshot
    pub async fn create_order(&self, actor: &AuthUser, input: CreateOrderInput) -> AppResult<Order> {
        // Capability check runs before anything else
        match actor.role {
            UserRole::Customer => {}
            UserRole::Business => return Err(AppError::InsufficientPermissions),
        }

        let offer_detail_id = parse_offer_detail_id(input.offer_detail_id.as_ref())?;

        let source = sqlx::query_as::<_, SnapshotSourceRow>(
            r#"
            SELECT d.title, d.revisions, d.delivery_time_in_days, d.price,
                   d.features, d.offer_type, o.user_id AS business_user_id
            FROM offer_details d
            JOIN offers o ON o.id = d.offer_id
            WHERE d.id = $1
            "#,
        )
        .bind(offer_detail_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("OfferDetail".to_string()))?;

        // An account cannot order its own offer
        if actor.user_id == source.business_user_id {
            return Err(AppError::Forbidden(
                "Customer and provider must not be identical.".to_string(),
            ));
        }

        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (customer_user_id, business_user_id, title, revisions,
                                delivery_time_in_days, price, features, offer_type, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, customer_user_id, business_user_id, title, revisions,
                      delivery_time_in_days, price, features, offer_type, status,
                      created_at, updated_at
            "#,
        )
        .bind(actor.user_id)
        .bind(source.business_user_id)
        .bind(&source.title)
        .bind(source.revisions)
        .bind(source.delivery_time_in_days)
        .bind(source.price)
        .bind(&source.features)
        .bind(&source.offer_type)
        .bind(OrderStatus::InProgress.as_str())
        .fetch_one(&self.db)
        .await?;

        row.into_order()
    }

    /// Update the status of an order
    ///
    /// Only the business user named on the order may transition it. The
    /// transition graph is deliberately unrestricted.
    pub async fn update_status(
        &self,
        actor: &AuthUser,
        order_id: i64,
        input: UpdateOrderInput,
    ) -> AppResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_user_id, business_user_id, title, revisions,
                   delivery_time_in_days, price, features, offer_type, status,
                   created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        // Object-level check comes before status parsing: a foreign caller
        // gets 403 regardless of the requested value
        if actor.user_id != row.business_user_id {
            return Err(AppError::Forbidden(
                "Only the business user of the order may update its status.".to_string(),
            ));
        }

        let status = input
            .status
            .as_deref()
            .and_then(OrderStatus::from_str)
            .ok_or_else(|| AppError::Validation {
                field: "status".to_string(),
                message: "Invalid status.".to_string(),
            })?;

        let updated = sqlx::query_as::<_, OrderRow>(
            r#"
            UPDATE orders
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, customer_user_id, business_user_id, title, revisions,
                      delivery_time_in_days, price, features, offer_type, status,
                      created_at, updated_at
            "#,
        )
        .bind(status.as_str())
        .bind(order_id)
        .fetch_one(&self.db)
        .await?;

        updated.into_order()
    }

    /// List all orders where the actor is on either side of the
    /// relationship, newest first
    pub async fn list_orders(&self, actor: &AuthUser) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_user_id, business_user_id, title, revisions,
                   delivery_time_in_days, price, features, offer_type, status,
                   created_at, updated_at
            FROM orders
            WHERE customer_user_id = $1 OR business_user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(actor.user_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Count orders with the given status where the named account is the
    /// business user
    ///
    /// A missing account is a 404; an account without a business profile
    /// soft-falls-back to a count of 0.
    pub async fn count_orders_for_business(
        &self,
        user_id: i64,
        status: OrderStatus,
    ) -> AppResult<i64> {
        let user_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;

        if user_exists.is_none() {
            return Err(AppError::NotFound("User".to_string()));
        }

        let profile_type =
            sqlx::query_scalar::<_, String>("SELECT user_type FROM profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;

        match profile_type.as_deref().and_then(UserRole::from_str) {
            Some(UserRole::Business) => {}
            _ => return Ok(0),
        }

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE business_user_id = $1 AND status = $2",
        )
        .bind(user_id)
        .bind(status.as_str())
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// Hard-delete an order (staff only)
    pub async fn delete_order(&self, actor: &AuthUser, order_id: i64) -> AppResult<()> {
        if !actor.is_staff {
            return Err(AppError::InsufficientPermissions);
        }

        let deleted =
            sqlx::query_scalar::<_, i64>("DELETE FROM orders WHERE id = $1 RETURNING id")
                .bind(order_id)
                .fetch_optional(&self.db)
                .await?;

        if deleted.is_none() {
            return Err(AppError::NotFound("Order".to_string()));
        }

        Ok(())
    }
}

/// Parse the `offer_detail_id` field from the request body
///
/// Accepts a JSON integer or an integer-valued string; anything else is a
/// field-keyed validation failure.
fn parse_offer_detail_id(value: Option<&serde_json::Value>) -> AppResult<i64> {
    let value = match value {
        Some(v) if !v.is_null() => v,
        _ => {
            return Err(AppError::Validation {
                field: "offer_detail_id".to_string(),
                message: "offer_detail_id is required.".to_string(),
            })
        }
    };

    let parsed = match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| AppError::Validation {
        field: "offer_detail_id".to_string(),
        message: "offer_detail_id must be an integer.".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_offer_detail_id_is_rejected() {
        let err = parse_offer_detail_id(None).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "offer_detail_id"));
    }

    #[test]
    fn null_offer_detail_id_is_rejected() {
        let value = json!(null);
        assert!(parse_offer_detail_id(Some(&value)).is_err());
    }

    #[test]
    fn integer_offer_detail_id_is_accepted() {
        let value = json!(42);
        assert_eq!(parse_offer_detail_id(Some(&value)).unwrap(), 42);
    }

    #[test]
    fn numeric_string_offer_detail_id_is_accepted() {
        let value = json!("17");
        assert_eq!(parse_offer_detail_id(Some(&value)).unwrap(), 17);
    }

    #[test]
    fn fractional_offer_detail_id_is_rejected() {
        let value = json!(1.5);
        assert!(parse_offer_detail_id(Some(&value)).is_err());
    }

    #[test]
    fn non_numeric_offer_detail_id_is_rejected() {
        let value = json!("not-a-number");
        assert!(parse_offer_detail_id(Some(&value)).is_err());
    }
}
