//! Profile service
//!
//! Every account owns exactly one profile, created at registration.
//! Nullable descriptive fields are normalized to empty strings on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use shared::UserRole;

/// Profile service
#[derive(Clone)]
pub struct ProfileService {
    db: PgPool,
}

/// Database row for a profile, with nullable fields already coalesced
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    user_id: i64,
    username: String,
    first_name: String,
    last_name: String,
    file: Option<String>,
    location: String,
    tel: String,
    description: String,
    working_hours: String,
    user_type: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            user: row.user_id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            file: row.file,
            location: row.location,
            tel: row.tel,
            description: row.description,
            working_hours: row.working_hours,
            user_type: row.user_type,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

/// A profile as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub file: Option<String>,
    pub location: String,
    pub tel: String,
    pub description: String,
    pub working_hours: String,
    #[serde(rename = "type")]
    pub user_type: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Partial update for a profile
#[derive(Debug, Deserialize)]
pub struct UpdateProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub file: Option<String>,
    pub location: Option<String>,
    pub tel: Option<String>,
    pub description: Option<String>,
    pub working_hours: Option<String>,
    pub email: Option<String>,
}

/// Compact account entry for the role-filtered listings; accounts without
/// a profile are included with empty descriptive fields
#[derive(Debug, Clone, Serialize)]
pub struct UserProfileEntry {
    pub user: NestedUser,
    pub file: Option<String>,
    pub location: String,
    pub tel: String,
    pub description: String,
    pub working_hours: String,
    #[serde(rename = "type")]
    pub user_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NestedUser {
    pub pk: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct UserProfileRow {
    id: i64,
    username: String,
    first_name: String,
    last_name: String,
    file: Option<String>,
    location: String,
    tel: String,
    description: String,
    working_hours: String,
    user_type: String,
}

const PROFILE_COLUMNS: &str = r#"
    user_id, username,
    COALESCE(first_name, '') AS first_name,
    COALESCE(last_name, '') AS last_name,
    file,
    COALESCE(location, '') AS location,
    COALESCE(tel, '') AS tel,
    COALESCE(description, '') AS description,
    COALESCE(working_hours, '') AS working_hours,
    user_type, email, created_at
"#;

impl ProfileService {
    /// Create a new ProfileService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Retrieve a profile by its owning account id
    pub async fn get_profile(&self, user_id: i64) -> AppResult<Profile> {
        let row = self.load_profile(user_id).await?;
        Ok(row.into())
    }

    /// Apply a partial update to a profile (owner only)
    pub async fn update_profile(
        &self,
        actor: &AuthUser,
        user_id: i64,
        input: UpdateProfileInput,
    ) -> AppResult<Profile> {
        let existing = self.load_profile(user_id).await?;

        if existing.user_id != actor.user_id {
            return Err(AppError::Forbidden(
                "You are only allowed to edit your own profile.".to_string(),
            ));
        }

        let first_name = input.first_name.unwrap_or(existing.first_name);
        let last_name = input.last_name.unwrap_or(existing.last_name);
        let file = input.file.or(existing.file);
        let location = input.location.unwrap_or(existing.location);
        let tel = input.tel.unwrap_or(existing.tel);
        let description = input.description.unwrap_or(existing.description);
        let working_hours = input.working_hours.unwrap_or(existing.working_hours);
        let email = input.email.unwrap_or(existing.email);

        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            UPDATE profiles
            SET first_name = $1, last_name = $2, file = $3, location = $4,
                tel = $5, description = $6, working_hours = $7, email = $8
            WHERE user_id = $9
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(&first_name)
        .bind(&last_name)
        .bind(&file)
        .bind(&location)
        .bind(&tel)
        .bind(&description)
        .bind(&working_hours)
        .bind(&email)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// List all accounts of a role, with profile data where present
    pub async fn list_by_role(&self, role: UserRole) -> AppResult<Vec<UserProfileEntry>> {
        let rows = sqlx::query_as::<_, UserProfileRow>(
            r#"
            SELECT u.id, u.username,
                   COALESCE(p.first_name, '') AS first_name,
                   COALESCE(p.last_name, '') AS last_name,
                   p.file,
                   COALESCE(p.location, '') AS location,
                   COALESCE(p.tel, '') AS tel,
                   COALESCE(p.description, '') AS description,
                   COALESCE(p.working_hours, '') AS working_hours,
                   u.user_type
            FROM users u
            LEFT JOIN profiles p ON p.user_id = u.id
            WHERE u.user_type = $1
            ORDER BY u.id
            "#,
        )
        .bind(role.as_str())
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| UserProfileEntry {
                user: NestedUser {
                    pk: row.id,
                    username: row.username,
                    first_name: row.first_name,
                    last_name: row.last_name,
                },
                file: row.file,
                location: row.location,
                tel: row.tel,
                description: row.description,
                working_hours: row.working_hours,
                user_type: row.user_type,
            })
            .collect())
    }

    async fn load_profile(&self, user_id: i64) -> AppResult<ProfileRow> {
        sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles WHERE user_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile".to_string()))
    }
}
