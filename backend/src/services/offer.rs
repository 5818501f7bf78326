//! Offer and offer detail service
//!
//! Offers are published by business users and carry at least three pricing
//! tiers (basic/standard/premium). Listing supports filtering, search,
//! ordering, and pagination.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{OfferDetailData, PaginatedResponse, UserDetails};
use shared::{validate_offer_details, OfferType, UserRole};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Offer service for publishing and browsing service offers
#[derive(Clone)]
pub struct OfferService {
    db: PgPool,
}

/// Database row for an offer
#[derive(Debug, sqlx::FromRow)]
struct OfferRow {
    id: i64,
    user_id: i64,
    title: String,
    image: Option<String>,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Database row for an offer list entry, joined with owner info and tier
/// aggregates
#[derive(Debug, sqlx::FromRow)]
struct OfferListRow {
    id: i64,
    user_id: i64,
    title: String,
    image: Option<String>,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    username: String,
    first_name: String,
    last_name: String,
    min_price: Option<i32>,
    min_delivery_time: Option<i32>,
}

/// Database row for an offer detail
#[derive(Debug, sqlx::FromRow)]
struct DetailRow {
    id: i64,
    offer_id: i64,
    title: String,
    revisions: i32,
    delivery_time_in_days: i32,
    price: i32,
    features: sqlx::types::Json<Vec<String>>,
    offer_type: String,
}

impl DetailRow {
    fn into_detail(self) -> AppResult<OfferDetail> {
        let offer_type = OfferType::from_str(&self.offer_type)
            .ok_or_else(|| AppError::Internal(format!("Unknown offer type: {}", self.offer_type)))?;

        Ok(OfferDetail {
            id: self.id,
            title: self.title,
            revisions: self.revisions,
            delivery_time_in_days: self.delivery_time_in_days,
            price: self.price,
            features: self.features.0,
            offer_type,
        })
    }
}

/// A single pricing tier as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct OfferDetail {
    pub id: i64,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: i32,
    pub features: Vec<String>,
    pub offer_type: OfferType,
}

/// An offer with its tiers as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct Offer {
    pub id: i64,
    pub user: i64,
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub details: Vec<OfferDetail>,
    pub min_price: Option<i32>,
    pub min_delivery_time: Option<i32>,
}

/// An offer list entry, which additionally embeds owner info
#[derive(Debug, Clone, Serialize)]
pub struct OfferListItem {
    pub id: i64,
    pub user: i64,
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub details: Vec<OfferDetail>,
    pub min_price: Option<i32>,
    pub min_delivery_time: Option<i32>,
    pub user_details: UserDetails,
}

/// Input for creating an offer
#[derive(Debug, Deserialize)]
pub struct CreateOfferInput {
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub details: Vec<OfferDetailData>,
}

/// Partial update for an offer; detail patches are keyed by tier tag
#[derive(Debug, Deserialize)]
pub struct UpdateOfferInput {
    pub title: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub details: Option<Vec<OfferDetailPatch>>,
}

/// Partial update for one tier of an offer
#[derive(Debug, Deserialize)]
pub struct OfferDetailPatch {
    pub offer_type: String,
    pub title: Option<String>,
    pub revisions: Option<i32>,
    pub delivery_time_in_days: Option<i32>,
    pub price: Option<i32>,
    pub features: Option<Vec<String>>,
}

/// Raw query parameters of the offer list endpoint
///
/// Numeric filters arrive as strings so a malformed value maps to a
/// field-keyed 400 rather than a silent drop.
#[derive(Debug, Default, Deserialize)]
pub struct OfferListQuery {
    pub creator_id: Option<String>,
    pub min_price: Option<String>,
    pub max_delivery_time: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Parsed offer list filters
#[derive(Debug)]
struct OfferFilters {
    creator_id: Option<i64>,
    min_price: Option<f64>,
    max_delivery_time: Option<i32>,
    search: Option<String>,
    order_by: String,
    page: u32,
    page_size: u32,
}

impl OfferService {
    /// Create a new OfferService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Publish a new offer with its tier set (business users only)
    pub async fn create_offer(&self, actor: &AuthUser, input: CreateOfferInput) -> AppResult<Offer> {
        match actor.role {
            UserRole::Business => {}
            UserRole::Customer => return Err(AppError::InsufficientPermissions),
        }

        validate_offer_details(&input.details)?;

        let mut tx = self.db.begin().await?;

        let offer = sqlx::query_as::<_, OfferRow>(
            r#"
            INSERT INTO offers (user_id, title, image, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, image, description, created_at, updated_at
            "#,
        )
        .bind(actor.user_id)
        .bind(&input.title)
        .bind(&input.image)
        .bind(&input.description)
        .fetch_one(&mut *tx)
        .await?;

        let mut details = Vec::with_capacity(input.details.len());
        for data in &input.details {
            let row = sqlx::query_as::<_, DetailRow>(
                r#"
                INSERT INTO offer_details (offer_id, title, revisions, delivery_time_in_days,
                                           price, features, offer_type)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, offer_id, title, revisions, delivery_time_in_days, price,
                          features, offer_type
                "#,
            )
            .bind(offer.id)
            .bind(&data.title)
            .bind(data.revisions)
            .bind(data.delivery_time_in_days)
            .bind(data.price)
            .bind(sqlx::types::Json(&data.features))
            .bind(data.offer_type.as_str())
            .fetch_one(&mut *tx)
            .await?;
            details.push(row.into_detail()?);
        }

        tx.commit().await?;

        Ok(build_offer(offer, details))
    }

    /// List offers with filtering, search, ordering, and pagination
    pub async fn list_offers(
        &self,
        query: OfferListQuery,
    ) -> AppResult<PaginatedResponse<OfferListItem>> {
        let filters = parse_filters(query)?;

        let where_clause = r#"
            WHERE ($1::bigint IS NULL OR o.user_id = $1)
              AND ($2::float8 IS NULL OR EXISTS (
                    SELECT 1 FROM offer_details d
                    WHERE d.offer_id = o.id AND d.price >= $2))
              AND ($3::int IS NULL OR EXISTS (
                    SELECT 1 FROM offer_details d
                    WHERE d.offer_id = o.id AND d.delivery_time_in_days <= $3))
              AND ($4::text IS NULL
                   OR o.title ILIKE '%' || $4 || '%'
                   OR o.description ILIKE '%' || $4 || '%')
        "#;

        let count = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM offers o {}",
            where_clause
        ))
        .bind(filters.creator_id)
        .bind(filters.min_price)
        .bind(filters.max_delivery_time)
        .bind(filters.search.as_deref())
        .fetch_one(&self.db)
        .await?;

        let offset = (filters.page - 1) as i64 * filters.page_size as i64;
        let rows = sqlx::query_as::<_, OfferListRow>(&format!(
            r#"
            SELECT o.id, o.user_id, o.title, o.image, o.description,
                   o.created_at, o.updated_at,
                   u.username,
                   COALESCE(p.first_name, '') AS first_name,
                   COALESCE(p.last_name, '') AS last_name,
                   (SELECT MIN(d.price) FROM offer_details d
                    WHERE d.offer_id = o.id) AS min_price,
                   (SELECT MIN(d.delivery_time_in_days) FROM offer_details d
                    WHERE d.offer_id = o.id) AS min_delivery_time
            FROM offers o
            JOIN users u ON u.id = o.user_id
            LEFT JOIN profiles p ON p.user_id = o.user_id
            {}
            ORDER BY {}
            LIMIT $5 OFFSET $6
            "#,
            where_clause, filters.order_by
        ))
        .bind(filters.creator_id)
        .bind(filters.min_price)
        .bind(filters.max_delivery_time)
        .bind(filters.search.as_deref())
        .bind(filters.page_size as i64)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let offer_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut details_by_offer = self.fetch_details(&offer_ids).await?;

        let results = rows
            .into_iter()
            .map(|row| OfferListItem {
                id: row.id,
                user: row.user_id,
                title: row.title,
                image: row.image,
                description: row.description,
                created_at: row.created_at,
                updated_at: row.updated_at,
                details: details_by_offer.remove(&row.id).unwrap_or_default(),
                min_price: row.min_price,
                min_delivery_time: row.min_delivery_time,
                user_details: UserDetails {
                    first_name: row.first_name,
                    last_name: row.last_name,
                    username: row.username,
                },
            })
            .collect();

        let has_next = (filters.page as i64) * (filters.page_size as i64) < count;
        Ok(PaginatedResponse {
            count,
            next: has_next.then_some(filters.page + 1),
            previous: (filters.page > 1).then(|| filters.page - 1),
            results,
        })
    }

    /// Retrieve one offer with its tiers
    pub async fn get_offer(&self, offer_id: i64) -> AppResult<Offer> {
        let offer = self.load_offer(offer_id).await?;
        let details = self
            .fetch_details(&[offer_id])
            .await?
            .remove(&offer_id)
            .unwrap_or_default();
        Ok(build_offer(offer, details))
    }

    /// Apply a partial update to an offer and its tiers (owner only)
    ///
    /// Detail patches are validated against the existing tier set before
    /// anything is written, and all changes commit in one transaction, so a
    /// failing patch leaves the offer untouched.
    pub async fn update_offer(
        &self,
        actor: &AuthUser,
        offer_id: i64,
        input: UpdateOfferInput,
    ) -> AppResult<Offer> {
        let offer = self.load_offer(offer_id).await?;

        if offer.user_id != actor.user_id {
            return Err(AppError::Forbidden(
                "You do not have permission to edit this offer.".to_string(),
            ));
        }

        let existing = sqlx::query_as::<_, DetailRow>(
            r#"
            SELECT id, offer_id, title, revisions, delivery_time_in_days, price,
                   features, offer_type
            FROM offer_details
            WHERE offer_id = $1
            "#,
        )
        .bind(offer_id)
        .fetch_all(&self.db)
        .await?;

        // Resolve every patch to an existing tier before writing anything
        let patches = input.details.unwrap_or_default();
        let mut resolved = Vec::with_capacity(patches.len());
        for patch in patches {
            let tier = OfferType::from_str(&patch.offer_type).ok_or_else(|| {
                AppError::Validation {
                    field: "details".to_string(),
                    message: format!("Invalid offer_type '{}'.", patch.offer_type),
                }
            })?;
            let target = existing
                .iter()
                .find(|d| d.offer_type == tier.as_str())
                .ok_or_else(|| AppError::Validation {
                    field: "details".to_string(),
                    message: format!(
                        "Detail with offer_type '{}' not found.",
                        patch.offer_type
                    ),
                })?;
            resolved.push((target.id, patch));
        }

        let mut tx = self.db.begin().await?;

        let title = input.title.unwrap_or(offer.title);
        let image = input.image.or(offer.image);
        let description = input.description.unwrap_or(offer.description);

        sqlx::query(
            r#"
            UPDATE offers
            SET title = $1, image = $2, description = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&title)
        .bind(&image)
        .bind(&description)
        .bind(offer_id)
        .execute(&mut *tx)
        .await?;

        for (detail_id, patch) in resolved {
            let features = patch.features.map(sqlx::types::Json);
            sqlx::query(
                r#"
                UPDATE offer_details
                SET title = COALESCE($1, title),
                    revisions = COALESCE($2, revisions),
                    delivery_time_in_days = COALESCE($3, delivery_time_in_days),
                    price = COALESCE($4, price),
                    features = COALESCE($5, features)
                WHERE id = $6
                "#,
            )
            .bind(&patch.title)
            .bind(patch.revisions)
            .bind(patch.delivery_time_in_days)
            .bind(patch.price)
            .bind(features)
            .bind(detail_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_offer(offer_id).await
    }

    /// Delete an offer and its tiers (owner only)
    pub async fn delete_offer(&self, actor: &AuthUser, offer_id: i64) -> AppResult<()> {
        let offer = self.load_offer(offer_id).await?;

        if offer.user_id != actor.user_id {
            return Err(AppError::Forbidden(
                "You do not have permission to delete this offer.".to_string(),
            ));
        }

        sqlx::query("DELETE FROM offers WHERE id = $1")
            .bind(offer_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Retrieve a single offer detail
    pub async fn get_offer_detail(&self, detail_id: i64) -> AppResult<OfferDetail> {
        let row = sqlx::query_as::<_, DetailRow>(
            r#"
            SELECT id, offer_id, title, revisions, delivery_time_in_days, price,
                   features, offer_type
            FROM offer_details
            WHERE id = $1
            "#,
        )
        .bind(detail_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("OfferDetail".to_string()))?;

        row.into_detail()
    }

    async fn load_offer(&self, offer_id: i64) -> AppResult<OfferRow> {
        sqlx::query_as::<_, OfferRow>(
            r#"
            SELECT id, user_id, title, image, description, created_at, updated_at
            FROM offers
            WHERE id = $1
            "#,
        )
        .bind(offer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Offer".to_string()))
    }

    async fn fetch_details(&self, offer_ids: &[i64]) -> AppResult<HashMap<i64, Vec<OfferDetail>>> {
        if offer_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, DetailRow>(
            r#"
            SELECT id, offer_id, title, revisions, delivery_time_in_days, price,
                   features, offer_type
            FROM offer_details
            WHERE offer_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(offer_ids)
        .fetch_all(&self.db)
        .await?;

        let mut grouped: HashMap<i64, Vec<OfferDetail>> = HashMap::new();
        for row in rows {
            let offer_id = row.offer_id;
            grouped.entry(offer_id).or_default().push(row.into_detail()?);
        }
        Ok(grouped)
    }
}

fn build_offer(row: OfferRow, details: Vec<OfferDetail>) -> Offer {
    let min_price = details.iter().map(|d| d.price).min();
    let min_delivery_time = details.iter().map(|d| d.delivery_time_in_days).min();

    Offer {
        id: row.id,
        user: row.user_id,
        title: row.title,
        image: row.image,
        description: row.description,
        created_at: row.created_at,
        updated_at: row.updated_at,
        details,
        min_price,
        min_delivery_time,
    }
}

/// Parse and validate the raw list query parameters
fn parse_filters(query: OfferListQuery) -> AppResult<OfferFilters> {
    let creator_id = match non_empty(query.creator_id) {
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| AppError::Validation {
            field: "creator_id".to_string(),
            message: "Must be an integer.".to_string(),
        })?),
        None => None,
    };

    let min_price = match non_empty(query.min_price) {
        Some(raw) => Some(raw.parse::<f64>().map_err(|_| AppError::Validation {
            field: "min_price".to_string(),
            message: "Must be a number.".to_string(),
        })?),
        None => None,
    };

    let max_delivery_time = match non_empty(query.max_delivery_time) {
        Some(raw) => Some(raw.parse::<i32>().map_err(|_| AppError::Validation {
            field: "max_delivery_time".to_string(),
            message: "Must be an integer.".to_string(),
        })?),
        None => None,
    };

    let page = match non_empty(query.page) {
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| AppError::Validation {
                field: "page".to_string(),
                message: "Must be a positive integer.".to_string(),
            })?,
        None => 1,
    };

    let page_size = match non_empty(query.page_size) {
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| AppError::Validation {
                field: "page_size".to_string(),
                message: "Must be a positive integer.".to_string(),
            })?
            .min(MAX_PAGE_SIZE),
        None => DEFAULT_PAGE_SIZE,
    };

    Ok(OfferFilters {
        creator_id,
        min_price,
        max_delivery_time,
        search: non_empty(query.search),
        order_by: ordering_clause(query.ordering.as_deref()),
        page,
        page_size,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Map an `ordering` query value onto a whitelisted ORDER BY clause
///
/// Unknown fields fall back to the default ordering by id, matching the
/// tolerant behavior of the list endpoint.
fn ordering_clause(ordering: Option<&str>) -> String {
    let (field, descending) = match ordering {
        Some(raw) if raw.starts_with('-') => (&raw[1..], true),
        Some(raw) => (raw, false),
        None => ("id", false),
    };

    let column = match field {
        "id" => "o.id",
        "price" => "(SELECT MIN(d.price) FROM offer_details d WHERE d.offer_id = o.id)",
        "delivery_time" => {
            "(SELECT MIN(d.delivery_time_in_days) FROM offer_details d WHERE d.offer_id = o.id)"
        }
        "created_at" => "o.created_at",
        "updated_at" => "o.updated_at",
        _ => "o.id",
    };

    if descending {
        format!("{} DESC", column)
    } else {
        format!("{} ASC", column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_defaults_to_id_ascending() {
        assert_eq!(ordering_clause(None), "o.id ASC");
        assert_eq!(ordering_clause(Some("bogus")), "o.id ASC");
    }

    #[test]
    fn ordering_maps_price_to_min_tier_price() {
        let clause = ordering_clause(Some("-price"));
        assert!(clause.contains("MIN(d.price)"));
        assert!(clause.ends_with("DESC"));
    }

    #[test]
    fn ordering_handles_timestamps() {
        assert_eq!(ordering_clause(Some("updated_at")), "o.updated_at ASC");
        assert_eq!(ordering_clause(Some("-created_at")), "o.created_at DESC");
    }

    #[test]
    fn filters_reject_malformed_creator_id() {
        let query = OfferListQuery {
            creator_id: Some("abc".to_string()),
            ..Default::default()
        };
        let err = parse_filters(query).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "creator_id"));
    }

    #[test]
    fn filters_reject_malformed_min_price() {
        let query = OfferListQuery {
            min_price: Some("cheap".to_string()),
            ..Default::default()
        };
        let err = parse_filters(query).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "min_price"));
    }

    #[test]
    fn filters_accept_numeric_values_and_cap_page_size() {
        let query = OfferListQuery {
            creator_id: Some("7".to_string()),
            min_price: Some("99.5".to_string()),
            max_delivery_time: Some("14".to_string()),
            page_size: Some("100000".to_string()),
            ..Default::default()
        };
        let filters = parse_filters(query).unwrap();
        assert_eq!(filters.creator_id, Some(7));
        assert_eq!(filters.min_price, Some(99.5));
        assert_eq!(filters.max_delivery_time, Some(14));
        assert_eq!(filters.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn blank_filter_values_are_ignored() {
        let query = OfferListQuery {
            creator_id: Some("".to_string()),
            search: Some("   ".to_string()),
            ..Default::default()
        };
        let filters = parse_filters(query).unwrap();
        assert_eq!(filters.creator_id, None);
        assert_eq!(filters.search, None);
    }
}
