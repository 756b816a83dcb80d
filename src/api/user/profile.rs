use axum::{
    extract::Extension, http::StatusCode, response::Response, routing::get, Json, Router,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::api::responses::{
    internal_error, not_found, transaction_error, validation_error,
};
use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::middleware::{
    auth::Claims,
    logging::{to_response, ApiError},
};

pub fn profile_router() -> Router {
    Router::new().route("/profile", get(get_profile).patch(patch_profile))
}

async fn get_profile(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match UserEntity::find_by_id(claims.user_id).one(&*db).await {
        Ok(Some(model)) => to_response((StatusCode::OK, Json(ProfileResponse::new(model))), Ok(())),
        Ok(None) => not_found(format!("User {} not found", claims.user_id)),
        Err(err) => internal_error(ApiError::DbError(err.to_string())),
    }
}

/// Username, role and password are not editable here.
async fn patch_profile(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PatchProfile>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return validation_error(errors);
    }

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => return transaction_error(),
    };

    let model = match UserEntity::find_by_id(claims.user_id).one(&txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            let _ = txn.rollback().await;
            return not_found(format!("User {} not found", claims.user_id));
        }
        Err(err) => {
            let _ = txn.rollback().await;
            return internal_error(ApiError::DbError(err.to_string()));
        }
    };

    let mut model: user::ActiveModel = model.into();
    if let Some(email) = payload.email {
        model.email = Set(email);
    }
    if let Some(first_name) = payload.first_name {
        model.first_name = Set(first_name);
    }
    if let Some(last_name) = payload.last_name {
        model.last_name = Set(last_name);
    }
    if let Some(address) = payload.address {
        model.address = Set(address);
    }
    if let Some(phone_number) = payload.phone_number {
        model.phone_number = Set(phone_number);
    }

    let updated = match model.update(&txn).await {
        Ok(updated) => updated,
        Err(err) => {
            let _ = txn.rollback().await;
            return internal_error(ApiError::DbError(err.to_string()));
        }
    };

    match txn.commit().await {
        Ok(_) => to_response((StatusCode::OK, Json(ProfileResponse::new(updated))), Ok(())),
        Err(err) => internal_error(ApiError::DbError(err.to_string())),
    }
}

//structs
#[derive(Deserialize, Validate)]
struct PatchProfile {
    #[validate(email(message = "Enter a valid email address."))]
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    address: Option<String>,
    phone_number: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ProfileResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone_number: String,
    pub role: Role,
}

impl ProfileResponse {
    pub fn new(value: user::Model) -> ProfileResponse {
        ProfileResponse {
            id: value.id,
            username: value.username,
            email: value.email,
            first_name: value.first_name,
            last_name: value.last_name,
            address: value.address,
            phone_number: value.phone_number,
            role: value.role,
        }
    }
}
