use crate::config::AppConfig;
use crate::entities::user::{Entity as UserEntity, Role};
use crate::middleware::logging::{to_response, ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{Redirect, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

pub const LOGIN_PATH: &str = "/login";
pub const TOKEN_COOKIE: &str = "token";

/// Guards a router. Anonymous or stale sessions are sent to the login entry
/// point; signed-in users without the required role get 403.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match session_token(req.headers()) {
        Some(token) => token,
        None => {
            return to_response(Redirect::to(LOGIN_PATH), Err(ApiError::Unauthenticated));
        }
    };

    let claims = match validate_token(&state.db, &state.config.secret, &token, state.role).await {
        Ok(claims) => claims,
        Err(AuthMiddlewareError::Forbidden) => {
            return to_response(
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({
                        "error": "You do not have access to this resource"
                    })),
                ),
                Err(ApiError::Forbidden(format!("{} role required", state.role))),
            );
        }
        Err(AuthMiddlewareError::InternalServerError(err)) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::DbError(err)),
            );
        }
        Err(_) => {
            return to_response(Redirect::to(LOGIN_PATH), Err(ApiError::Unauthenticated));
        }
    };

    req.extensions_mut().insert(claims);
    next.run(req).await
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub role: String,
    pub exp: usize,
}

#[derive(Clone, Debug)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub role: Role,
}

/// Bearer header first, then the `token` cookie set at login.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));
    if let Some(token) = bearer {
        return Some(token.to_owned());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == TOKEN_COOKIE && !value.is_empty()).then(|| value.to_owned())
        })
}

pub fn generate_token(
    user_id: i32,
    role: Role,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, AuthMiddlewareError> {
    let ttl = Duration::try_hours(ttl_hours).ok_or(AuthMiddlewareError::GenerationFail)?;
    let exp = Utc::now()
        .checked_add_signed(ttl)
        .ok_or(AuthMiddlewareError::GenerationFail)?
        .timestamp() as usize;

    let claims = Claims {
        user_id,
        role: role.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthMiddlewareError::GenerationFail)
}

/// Decodes the token and re-reads the user so deleted accounts or demoted
/// admins lose access immediately.
pub async fn validate_token(
    db: &DatabaseConnection,
    secret: &str,
    token: &str,
    req_role: Role,
) -> Result<Claims, AuthMiddlewareError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthMiddlewareError::ValidationFail)?;

    let claims = token_data.claims;

    match UserEntity::find_by_id(claims.user_id).one(db).await {
        Ok(Some(user)) if user.role.satisfies(req_role) => Ok(claims),
        Ok(Some(_)) => Err(AuthMiddlewareError::Forbidden),
        Ok(None) => Err(AuthMiddlewareError::InvalidUser),
        Err(err) => Err(AuthMiddlewareError::InternalServerError(err.to_string())),
    }
}

#[derive(Error, Debug)]
pub enum AuthMiddlewareError {
    #[error("Invalid user id")]
    InvalidUser,
    #[error("Insufficient role")]
    Forbidden,
    #[error("Failed to validate token")]
    ValidationFail,
    #[error("Failed to generate token")]
    GenerationFail,
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("token=xyz"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn token_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=xyz; lang=en"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn no_credentials_means_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token="));
        assert_eq!(session_token(&headers), None);
        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn oversized_ttl_fails_instead_of_panicking() {
        let result = generate_token(1, Role::User, "s", i64::MAX);
        assert!(matches!(result, Err(AuthMiddlewareError::GenerationFail)));
    }

    #[test]
    fn generated_token_decodes_with_same_secret() {
        let token = generate_token(7, Role::Admin, "test-secret", 1).unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.claims.user_id, 7);
        assert_eq!(data.claims.role, "admin");

        let wrong = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(wrong.is_err());
    }
}
