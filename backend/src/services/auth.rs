//! Authentication service for registration, login, and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use shared::{validate_registration, UserRole};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// Input for registering a new account
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    pub password: String,
    pub repeated_password: String,
    /// "customer" or "business"
    #[serde(rename = "type")]
    pub user_type: String,
}

/// Credentials for logging in
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Response after successful registration or login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub email: String,
    pub user_id: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub staff: bool,
    pub exp: i64,
    pub iat: i64,
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    user_type: String,
    is_staff: bool,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Register a new account with its profile
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthResponse> {
        input.validate().map_err(first_validator_error)?;

        validate_registration(&input.username, &input.password, &input.repeated_password)?;

        let role = UserRole::from_str(&input.user_type).ok_or_else(|| AppError::Validation {
            field: "type".to_string(),
            message: "Type must be 'customer' or 'business'.".to_string(),
        })?;

        // Check uniqueness of username and email
        let username_taken =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = $1")
                .bind(&input.username)
                .fetch_one(&self.db)
                .await?;

        if username_taken > 0 {
            return Err(AppError::Validation {
                field: "username".to_string(),
                message: "Username already taken.".to_string(),
            });
        }

        let email_taken =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
                .bind(&input.email)
                .fetch_one(&self.db)
                .await?;

        if email_taken > 0 {
            return Err(AppError::Validation {
                field: "email".to_string(),
                message: "Email already registered.".to_string(),
            });
        }

        // Hash password
        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        // Account and profile are created together
        let mut tx = self.db.begin().await?;

        let user_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, email, password_hash, user_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(role.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, username, user_type, email)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(&input.username)
        .bind(role.as_str())
        .bind(&input.email)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let token = self.generate_token(user_id, role, false)?;

        Ok(AuthResponse {
            token,
            username: input.username,
            email: input.email,
            user_id,
        })
    }

    /// Authenticate a user with username and password
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthResponse> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, user_type, is_staff
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(&input.username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(&input.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let role = UserRole::from_str(&user.user_type)
            .ok_or_else(|| AppError::Internal(format!("Unknown role: {}", user.user_type)))?;

        let token = self.generate_token(user.id, role, user.is_staff)?;

        Ok(AuthResponse {
            token,
            username: user.username,
            email: user.email,
            user_id: user.id,
        })
    }

    /// Generate a signed access token
    fn generate_token(&self, user_id: i64, role: UserRole, is_staff: bool) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_token_expiry);

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            staff: is_staff,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }
}

/// Reduce a validator error set to the first field-keyed message
fn first_validator_error(errors: validator::ValidationErrors) -> AppError {
    for (field, errs) in errors.field_errors() {
        if let Some(err) = errs.first() {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value for {}", field));
            return AppError::Validation {
                field: field.to_string(),
                message,
            };
        }
    }
    AppError::ValidationError("Invalid input".to_string())
}
