//! Authentication middleware
//!
//! JWT authentication and role extraction middleware

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use shared::UserRole;

use crate::error::ErrorResponse;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: UserRole,
    pub is_staff: bool,
}

/// Authentication middleware that validates JWT tokens
/// Note: This middleware extracts and validates the JWT token from the
/// Authorization header. The actual token validation is done inline to
/// avoid state dependency issues.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_user = match authenticate(&request) {
        Ok(user) => user,
        Err(msg) => return unauthorized_response(&msg),
    };

    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// Authentication middleware for routes that mix public reads with
/// protected writes (the offer list endpoint). A valid token populates the
/// request extensions; a missing or invalid one passes through, leaving
/// handlers that require `CurrentUser` to reject with 401.
pub async fn optional_auth_middleware(mut request: Request, next: Next) -> Response {
    if let Ok(auth_user) = authenticate(&request) {
        request.extensions_mut().insert(auth_user);
    }

    next.run(request).await
}

/// Extract and validate the bearer token on a request
fn authenticate(request: &Request) -> Result<AuthUser, String> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => return Err("Missing or invalid Authorization header".to_string()),
    };

    // Get JWT secret from environment (fallback for middleware without state)
    let jwt_secret = std::env::var("SMP__JWT__SECRET")
        .or_else(|_| std::env::var("SMP_JWT_SECRET"))
        .unwrap_or_else(|_| "development-secret-key".to_string());

    let claims = decode_jwt(token, &jwt_secret)?;

    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| "Invalid user ID in token".to_string())?;

    let role =
        UserRole::from_str(&claims.role).ok_or_else(|| "Invalid role in token".to_string())?;

    Ok(AuthUser {
        user_id,
        role,
        is_staff: claims.staff,
    })
}

/// JWT claims structure
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Claims {
    sub: String,
    role: String,
    staff: bool,
    exp: i64,
    iat: i64,
}

/// Decode and validate JWT token
fn decode_jwt(token: &str, secret: &str) -> Result<Claims, String> {
    use jsonwebtoken::{decode, DecodingKey, Validation};

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: crate::error::ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            field: None,
        },
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                let error = ErrorResponse {
                    error: crate::error::ErrorDetail {
                        code: "UNAUTHORIZED".to_string(),
                        message: "Authentication required".to_string(),
                        field: None,
                    },
                };
                (StatusCode::UNAUTHORIZED, Json(error))
            })
    }
}
