use argon2::{password_hash::PasswordHasher, password_hash::SaltString, Argon2};
use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use regex::Regex;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::api::responses::{
    db_write_error, error_response, internal_error, transaction_error, validation_error,
};
use crate::config::AppConfig;
use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::middleware::{
    auth::{generate_token, LOGIN_PATH, TOKEN_COOKIE},
    logging::{to_response, ApiError},
};

pub fn auth_router() -> Router {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout).post(logout))
}

// ROUTES
async fn register_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<RegisterUser>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return validation_error(errors);
    }

    let password = match hash_password(&payload.password1) {
        Ok(password) => password,
        Err(err) => return internal_error(ApiError::PasswordHashFailed(err.to_string())),
    };

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => return transaction_error(),
    };

    let username = payload.username.clone();
    let new_user = user::ActiveModel {
        username: Set(payload.username),
        password: Set(password),
        email: Set(payload.email),
        first_name: Set(payload.first_name),
        last_name: Set(payload.last_name),
        address: Set(payload.address),
        phone_number: Set(payload.phone_number),
        role: Set(Role::User),
        ..Default::default()
    };

    match UserEntity::insert(new_user).exec(&txn).await {
        Ok(_) => match txn.commit().await {
            Ok(_) => {
                info!(username = %username, "Registered user");
                to_response(
                    (
                        StatusCode::CREATED,
                        Json(json!({
                            "message": "User registered successfully"
                        })),
                    ),
                    Ok(()),
                )
            }
            Err(err) => internal_error(ApiError::DbError(err.to_string())),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            db_write_error(err, "Username already exists")
        }
    }
}

async fn login_page() -> Response {
    to_response(
        (
            StatusCode::OK,
            Json(json!({
                "message": "Authentication required",
                "login": {
                    "method": "POST",
                    "path": LOGIN_PATH,
                    "fields": ["username", "password"]
                }
            })),
        ),
        Ok(()),
    )
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<AppConfig>>,
    Json(payload): Json<UserLogin>,
) -> Response {
    let result = UserEntity::find()
        .filter(user::Column::Username.eq(&*payload.username))
        .one(&*db)
        .await;

    let model = match result {
        Ok(Some(model)) => model,
        Ok(None) => return invalid_credentials(),
        Err(err) => return internal_error(ApiError::DbError(err.to_string())),
    };

    if model.check_hash(&payload.password).is_err() {
        return invalid_credentials();
    }

    let Some(max_age) = session_max_age(config.token_ttl_hours) else {
        return internal_error(ApiError::TokenGenerationFailed(format!(
            "token lifetime of {} hours is out of range",
            config.token_ttl_hours
        )));
    };

    match generate_token(model.id, model.role, &config.secret, config.token_ttl_hours) {
        Ok(token) => {
            let cookie = format!(
                "{TOKEN_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}"
            );
            to_response(
                (
                    StatusCode::OK,
                    [(header::SET_COOKIE, cookie)],
                    Json(json!({
                        "token": token
                    })),
                ),
                Ok(()),
            )
        }
        Err(err) => internal_error(ApiError::TokenGenerationFailed(err.to_string())),
    }
}

async fn logout() -> Response {
    let cookie = format!("{TOKEN_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0");
    to_response(
        ([(header::SET_COOKIE, cookie)], Redirect::to(LOGIN_PATH)),
        Ok(()),
    )
}

//utilities
/// Cookie lifetime in seconds.
fn session_max_age(ttl_hours: i64) -> Option<i64> {
    ttl_hours.checked_mul(3600)
}

fn invalid_credentials() -> Response {
    error_response(
        StatusCode::UNAUTHORIZED,
        "Invalid username or password",
        ApiError::General("Invalid username or password".to_owned()),
    )
}

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(password_hash)
}

static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.@+-]{3,150}$").expect("username pattern is valid"));

//structs
#[derive(Deserialize, Validate)]
struct RegisterUser {
    #[validate(regex(
        path = *USERNAME_REGEX,
        message = "Username must be 3-150 letters, digits or @.+-_ characters."
    ))]
    username: String,
    #[validate(email(message = "Enter a valid email address."))]
    email: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    phone_number: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
    password1: String,
    #[validate(must_match(other = "password1", message = "Passwords do not match."))]
    password2: String,
}

#[derive(Debug, Deserialize)]
struct UserLogin {
    username: String,
    password: String,
}
