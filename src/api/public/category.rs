use axum::{
    extract::Extension, http::StatusCode, response::Response, routing::get, Json, Router,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;

use crate::api::responses::internal_error;
use crate::entities::{brand, category};
use crate::middleware::logging::{to_response, ApiError};

pub fn category_router() -> Router {
    Router::new()
        .route("/products/categories", get(get_categories))
        .route("/products/brands", get(get_brands))
}

async fn get_categories(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    let result = category::Entity::find()
        .filter(category::Column::IsVisible.eq(true))
        .order_by_asc(category::Column::Title)
        .all(&*db)
        .await;

    match result {
        Ok(categories) => to_response((StatusCode::OK, Json(categories)), Ok(())),
        Err(err) => internal_error(ApiError::DbError(err.to_string())),
    }
}

async fn get_brands(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    let result = brand::Entity::find()
        .filter(brand::Column::IsVisible.eq(true))
        .order_by_asc(brand::Column::Name)
        .all(&*db)
        .await;

    match result {
        Ok(brands) => to_response((StatusCode::OK, Json(brands)), Ok(())),
        Err(err) => internal_error(ApiError::DbError(err.to_string())),
    }
}
