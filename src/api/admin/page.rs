//! Static content pages (about, delivery terms and the like) edited from the
//! back office.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::responses::{
    bad_request, db_write_error, internal_error, not_found, transaction_error,
};
use crate::entities::page;
use crate::middleware::logging::{to_response, ApiError};

pub fn admin_page_router() -> Router {
    Router::new()
        .route("/management/pages", get(list_pages).post(create_page))
        .route(
            "/management/pages/update/:id",
            post(update_page).patch(update_page),
        )
}

async fn list_pages(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    let result = page::Entity::find()
        .order_by_asc(page::Column::Title)
        .all(&*db)
        .await;

    match result {
        Ok(pages) => to_response((StatusCode::OK, Json(pages)), Ok(())),
        Err(err) => internal_error(ApiError::DbError(err.to_string())),
    }
}

async fn create_page(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreatePage>,
) -> Response {
    if payload.title.trim().is_empty() {
        return bad_request("Page title is required".to_owned());
    }

    let new_page = page::ActiveModel {
        title: Set(payload.title),
        content: Set(payload.content),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_page.insert(&*db).await {
        Ok(created) => to_response((StatusCode::CREATED, Json(created)), Ok(())),
        Err(err) => db_write_error(err, "Page already exists"),
    }
}

async fn update_page(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchPage>,
) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => return transaction_error(),
    };

    let existing = match page::Entity::find_by_id(id).one(&txn).await {
        Ok(Some(existing)) => existing,
        Ok(None) => return not_found(format!("Page {id} not found")),
        Err(err) => return internal_error(ApiError::DbError(err.to_string())),
    };

    let mut model: page::ActiveModel = existing.into();
    if let Some(title) = payload.title {
        if title.trim().is_empty() {
            return bad_request("Page title is required".to_owned());
        }
        model.title = Set(title);
    }
    if let Some(content) = payload.content {
        model.content = Set(content);
    }
    model.updated_at = Set(Utc::now());

    match model.update(&txn).await {
        Ok(updated) => match txn.commit().await {
            Ok(_) => to_response((StatusCode::OK, Json(updated)), Ok(())),
            Err(err) => internal_error(ApiError::DbError(err.to_string())),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            db_write_error(err, "Page already exists")
        }
    }
}

#[derive(Deserialize, Debug)]
struct CreatePage {
    title: String,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize, Debug)]
struct PatchPage {
    title: Option<String>,
    content: Option<String>,
}
