//! Dashboard aggregates over reviews, profiles, and offers

use serde::Serialize;
use sqlx::PgPool;

use crate::error::AppResult;

/// Base info service
#[derive(Clone)]
pub struct BaseInfoService {
    db: PgPool,
}

/// Platform-wide aggregate counts
#[derive(Debug, Clone, Serialize)]
pub struct BaseInfo {
    pub review_count: i64,
    pub average_rating: f64,
    pub business_profile_count: i64,
    pub offer_count: i64,
}

impl BaseInfoService {
    /// Create a new BaseInfoService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Collect the dashboard aggregates
    pub async fn get_base_info(&self) -> AppResult<BaseInfo> {
        let review_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews")
            .fetch_one(&self.db)
            .await?;

        let average =
            sqlx::query_scalar::<_, Option<f64>>("SELECT AVG(rating)::float8 FROM reviews")
                .fetch_one(&self.db)
                .await?;

        let business_profile_count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM profiles p
            JOIN users u ON u.id = p.user_id
            WHERE u.user_type = 'business'
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let offer_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM offers")
            .fetch_one(&self.db)
            .await?;

        Ok(BaseInfo {
            review_count,
            average_rating: round_average(average),
            business_profile_count,
            offer_count,
        })
    }
}

/// Round the average rating to one decimal place, 0 when there are no
/// reviews
fn round_average(average: Option<f64>) -> f64 {
    match average {
        Some(avg) => (avg * 10.0).round() / 10.0,
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_averages_to_zero() {
        assert_eq!(round_average(None), 0.0);
    }

    #[test]
    fn average_is_rounded_to_one_decimal() {
        assert_eq!(round_average(Some(4.333333)), 4.3);
        assert_eq!(round_average(Some(4.35)), 4.4);
        assert_eq!(round_average(Some(5.0)), 5.0);
    }
}
