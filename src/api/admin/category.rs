use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{get, patch},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::responses::{
    bad_request, db_write_error, internal_error, not_found, transaction_error,
};
use crate::entities::{brand, category};
use crate::middleware::logging::{to_response, ApiError};

//ROUTERS
pub fn admin_category_router() -> Router {
    Router::new()
        .route(
            "/management/categories",
            get(list_categories).post(create_category),
        )
        .route("/management/categories/:id", patch(patch_category))
        .route("/management/brands", get(list_brands).post(create_brand))
        .route("/management/brands/:id", patch(patch_brand))
}

//ROUTES
async fn list_categories(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    let result = category::Entity::find()
        .order_by_asc(category::Column::Title)
        .all(&*db)
        .await;

    match result {
        Ok(categories) => to_response((StatusCode::OK, Json(categories)), Ok(())),
        Err(err) => internal_error(ApiError::DbError(err.to_string())),
    }
}

async fn create_category(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CategoryPayload>,
) -> Response {
    let title = match required_name(payload.title, "Category title") {
        Ok(title) => title,
        Err(response) => return response,
    };

    let new_category = category::ActiveModel {
        title: Set(title),
        is_visible: Set(payload.is_visible.unwrap_or(true)),
        ..Default::default()
    };

    match new_category.insert(&*db).await {
        Ok(created) => to_response((StatusCode::CREATED, Json(created)), Ok(())),
        Err(err) => db_write_error(err, "Category already exists"),
    }
}

async fn patch_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CategoryPayload>,
) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => return transaction_error(),
    };

    let existing = match category::Entity::find_by_id(id).one(&txn).await {
        Ok(Some(existing)) => existing,
        Ok(None) => return not_found(format!("Category {id} not found")),
        Err(err) => return internal_error(ApiError::DbError(err.to_string())),
    };

    let mut model: category::ActiveModel = existing.into();
    if let Some(title) = payload.title {
        match required_name(Some(title), "Category title") {
            Ok(title) => model.title = Set(title),
            Err(response) => return response,
        }
    }
    if let Some(is_visible) = payload.is_visible {
        model.is_visible = Set(is_visible);
    }

    match model.update(&txn).await {
        Ok(updated) => match txn.commit().await {
            Ok(_) => to_response((StatusCode::OK, Json(updated)), Ok(())),
            Err(err) => internal_error(ApiError::DbError(err.to_string())),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            db_write_error(err, "Category already exists")
        }
    }
}

async fn list_brands(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    let result = brand::Entity::find()
        .order_by_asc(brand::Column::Name)
        .all(&*db)
        .await;

    match result {
        Ok(brands) => to_response((StatusCode::OK, Json(brands)), Ok(())),
        Err(err) => internal_error(ApiError::DbError(err.to_string())),
    }
}

async fn create_brand(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<BrandPayload>,
) -> Response {
    let name = match required_name(payload.name, "Brand name") {
        Ok(name) => name,
        Err(response) => return response,
    };

    let new_brand = brand::ActiveModel {
        name: Set(name),
        is_visible: Set(payload.is_visible.unwrap_or(true)),
        ..Default::default()
    };

    match new_brand.insert(&*db).await {
        Ok(created) => to_response((StatusCode::CREATED, Json(created)), Ok(())),
        Err(err) => db_write_error(err, "Brand already exists"),
    }
}

async fn patch_brand(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<BrandPayload>,
) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => return transaction_error(),
    };

    let existing = match brand::Entity::find_by_id(id).one(&txn).await {
        Ok(Some(existing)) => existing,
        Ok(None) => return not_found(format!("Brand {id} not found")),
        Err(err) => return internal_error(ApiError::DbError(err.to_string())),
    };

    let mut model: brand::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        match required_name(Some(name), "Brand name") {
            Ok(name) => model.name = Set(name),
            Err(response) => return response,
        }
    }
    if let Some(is_visible) = payload.is_visible {
        model.is_visible = Set(is_visible);
    }

    match model.update(&txn).await {
        Ok(updated) => match txn.commit().await {
            Ok(_) => to_response((StatusCode::OK, Json(updated)), Ok(())),
            Err(err) => internal_error(ApiError::DbError(err.to_string())),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            db_write_error(err, "Brand already exists")
        }
    }
}

//utilities
fn required_name(value: Option<String>, what: &str) -> Result<String, Response> {
    match value.map(|value| value.trim().to_owned()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(bad_request(format!("{what} is required"))),
    }
}

//structs
#[derive(Deserialize, Debug)]
struct CategoryPayload {
    title: Option<String>,
    is_visible: Option<bool>,
}

#[derive(Deserialize, Debug)]
struct BrandPayload {
    name: Option<String>,
    is_visible: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_required() {
        assert_eq!(required_name(Some("  Phones ".into()), "Title").unwrap(), "Phones");
        let response = required_name(Some("   ".into()), "Title").unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(required_name(None, "Title").is_err());
    }
}
