//! Review service
//!
//! Customers rate business users 1-5 with a text description. Each
//! (reviewer, business user) pair may carry at most one review; the
//! database enforces this with a unique constraint so the pre-insert check
//! cannot race.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use shared::{validate_rating, UserRole};

const DUPLICATE_REVIEW_MESSAGE: &str = "You have already reviewed this business user.";

/// Review service
#[derive(Clone)]
pub struct ReviewService {
    db: PgPool,
}

/// Database row for a review
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    business_user_id: i64,
    reviewer_id: i64,
    rating: i32,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            business_user: row.business_user_id,
            reviewer: row.reviewer_id,
            rating: row.rating,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A review as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: i64,
    pub business_user: i64,
    pub reviewer: i64,
    pub rating: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a review
#[derive(Debug, Deserialize)]
pub struct CreateReviewInput {
    pub business_user: Option<i64>,
    pub rating: Option<i32>,
    pub description: Option<String>,
}

/// Partial update for a review
#[derive(Debug, Deserialize)]
pub struct UpdateReviewInput {
    pub rating: Option<i32>,
    pub description: Option<String>,
}

/// Query parameters of the review list endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    pub business_user_id: Option<String>,
    pub reviewer_id: Option<String>,
    pub ordering: Option<String>,
}

impl ReviewService {
    /// Create a new ReviewService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a review (customers only, one per business user)
    pub async fn create_review(
        &self,
        actor: &AuthUser,
        input: CreateReviewInput,
    ) -> AppResult<Review> {
        match actor.role {
            UserRole::Customer => {}
            UserRole::Business => return Err(AppError::InsufficientPermissions),
        }

        let business_user = input.business_user.ok_or_else(|| AppError::Validation {
            field: "business_user".to_string(),
            message: "business_user is required.".to_string(),
        })?;

        let rating = input.rating.ok_or_else(|| AppError::Validation {
            field: "rating".to_string(),
            message: "rating is required.".to_string(),
        })?;
        validate_rating(rating)?;

        let description = input.description.ok_or_else(|| AppError::Validation {
            field: "description".to_string(),
            message: "description is required.".to_string(),
        })?;

        let target = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1")
            .bind(business_user)
            .fetch_optional(&self.db)
            .await?;

        if target.is_none() {
            return Err(AppError::Validation {
                field: "business_user".to_string(),
                message: "Invalid business_user.".to_string(),
            });
        }

        let already_reviewed = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE business_user_id = $1 AND reviewer_id = $2)",
        )
        .bind(business_user)
        .bind(actor.user_id)
        .fetch_one(&self.db)
        .await?;

        if already_reviewed {
            return Err(AppError::ValidationError(
                DUPLICATE_REVIEW_MESSAGE.to_string(),
            ));
        }

        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            INSERT INTO reviews (business_user_id, reviewer_id, rating, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, business_user_id, reviewer_id, rating, description,
                      created_at, updated_at
            "#,
        )
        .bind(business_user)
        .bind(actor.user_id)
        .bind(rating)
        .bind(&description)
        .fetch_one(&self.db)
        .await
        .map_err(map_duplicate_review)?;

        Ok(row.into())
    }

    /// List reviews, optionally filtered by business user or reviewer
    pub async fn list_reviews(&self, query: ReviewListQuery) -> AppResult<Vec<Review>> {
        let business_user_id = parse_id_filter(query.business_user_id, "business_user_id")?;
        let reviewer_id = parse_id_filter(query.reviewer_id, "reviewer_id")?;
        let order_by = review_ordering_clause(query.ordering.as_deref());

        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            r#"
            SELECT id, business_user_id, reviewer_id, rating, description,
                   created_at, updated_at
            FROM reviews
            WHERE ($1::bigint IS NULL OR business_user_id = $1)
              AND ($2::bigint IS NULL OR reviewer_id = $2)
            ORDER BY {}
            "#,
            order_by
        ))
        .bind(business_user_id)
        .bind(reviewer_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Apply a partial update to a review (reviewer only)
    pub async fn update_review(
        &self,
        actor: &AuthUser,
        review_id: i64,
        input: UpdateReviewInput,
    ) -> AppResult<Review> {
        let existing = self.load_review(review_id).await?;

        if existing.reviewer_id != actor.user_id {
            return Err(AppError::Forbidden(
                "You are only allowed to edit your own reviews.".to_string(),
            ));
        }

        if let Some(rating) = input.rating {
            validate_rating(rating)?;
        }

        let rating = input.rating.unwrap_or(existing.rating);
        let description = input.description.unwrap_or(existing.description);

        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            UPDATE reviews
            SET rating = $1, description = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, business_user_id, reviewer_id, rating, description,
                      created_at, updated_at
            "#,
        )
        .bind(rating)
        .bind(&description)
        .bind(review_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Delete a review (reviewer only)
    pub async fn delete_review(&self, actor: &AuthUser, review_id: i64) -> AppResult<()> {
        let existing = self.load_review(review_id).await?;

        if existing.reviewer_id != actor.user_id {
            return Err(AppError::Forbidden(
                "You are only allowed to delete your own reviews.".to_string(),
            ));
        }

        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn load_review(&self, review_id: i64) -> AppResult<ReviewRow> {
        sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, business_user_id, reviewer_id, rating, description,
                   created_at, updated_at
            FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(review_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Review".to_string()))
    }
}

/// Map a unique-constraint violation on insert to the duplicate-review 400
///
/// The pre-insert existence check already covers the common case; this
/// closes the race between check and insert.
fn map_duplicate_review(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return AppError::ValidationError(DUPLICATE_REVIEW_MESSAGE.to_string());
        }
    }
    AppError::DatabaseError(err)
}

fn parse_id_filter(value: Option<String>, field: &str) -> AppResult<Option<i64>> {
    match value.filter(|s| !s.trim().is_empty()) {
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::Validation {
                field: field.to_string(),
                message: "Must be an integer.".to_string(),
            }),
        None => Ok(None),
    }
}

/// Map an `ordering` query value onto a whitelisted ORDER BY clause
fn review_ordering_clause(ordering: Option<&str>) -> &'static str {
    match ordering {
        Some("updated_at") => "updated_at ASC",
        Some("-updated_at") => "updated_at DESC",
        Some("rating") => "rating ASC",
        Some("-rating") => "rating DESC",
        _ => "updated_at DESC",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ordering_is_newest_first() {
        assert_eq!(review_ordering_clause(None), "updated_at DESC");
        assert_eq!(review_ordering_clause(Some("bogus")), "updated_at DESC");
    }

    #[test]
    fn rating_ordering_is_whitelisted() {
        assert_eq!(review_ordering_clause(Some("rating")), "rating ASC");
        assert_eq!(review_ordering_clause(Some("-rating")), "rating DESC");
    }

    #[test]
    fn id_filter_rejects_garbage() {
        let err = parse_id_filter(Some("abc".to_string()), "reviewer_id").unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "reviewer_id"));
    }

    #[test]
    fn id_filter_passes_through_integers() {
        assert_eq!(
            parse_id_filter(Some("12".to_string()), "reviewer_id").unwrap(),
            Some(12)
        );
        assert_eq!(parse_id_filter(None, "reviewer_id").unwrap(), None);
    }
}
