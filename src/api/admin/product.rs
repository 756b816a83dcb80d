use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::api::responses::{
    bad_request, internal_error, not_found, store_error, transaction_error, ProductResponse,
};
use crate::entities::{
    brand, category, deal,
    product::{self, ProductStatus, Warranty},
};
use crate::middleware::logging::{to_response, ApiError};
use crate::store::catalog::{products_by_status, set_product_status};

pub const AVAILABLE_PATH: &str = "/management/products/available";
pub const DELETED_PATH: &str = "/management/products/deleted";

//ROUTERS
pub fn admin_product_router() -> Router {
    Router::new()
        .route(AVAILABLE_PATH, get(available_products))
        .route(DELETED_PATH, get(deleted_products))
        .route("/management/products/create", post(create_product))
        .route(
            "/management/products/update/:id",
            post(update_product).patch(update_product),
        )
        .route(
            "/management/products/:id/delete",
            get(delete_product).post(delete_product),
        )
        .route(
            "/management/products/:id/reactivate",
            get(reactivate_product).post(reactivate_product),
        )
}

//ROUTES
async fn available_products(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    list_products(&db, ProductStatus::Visible).await
}

async fn deleted_products(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    list_products(&db, ProductStatus::Hidden).await
}

async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateProduct>,
) -> Response {
    if payload.normal_price.is_sign_negative() {
        return bad_request("Price cannot be negative".to_owned());
    }

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => return transaction_error(),
    };

    let references = References {
        brand_id: Some(payload.brand_id),
        category_id: Some(payload.category_id),
        deal_id: payload.deal_id,
    };
    if let Some(response) = check_references(&txn, &references).await {
        let _ = txn.rollback().await;
        return response;
    }

    let now = Utc::now();
    let new_product = product::ActiveModel {
        title: Set(payload.title),
        brand_id: Set(payload.brand_id),
        category_id: Set(payload.category_id),
        deal_id: Set(payload.deal_id),
        normal_price: Set(payload.normal_price),
        stock: Set(payload.stock.unwrap_or_default()),
        warranty: Set(payload.warranty),
        is_featured: Set(payload.is_featured.unwrap_or_default()),
        status: Set(ProductStatus::Visible),
        description: Set(payload.description),
        specifications: Set(payload.specifications),
        image: Set(payload.image),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = match new_product.insert(&txn).await {
        Ok(created) => created,
        Err(err) => {
            let _ = txn.rollback().await;
            return internal_error(ApiError::DbError(err.to_string()));
        }
    };

    match txn.commit().await {
        Ok(_) => {
            info!(product_id = created.id, title = %created.title, "Created product");
            to_response(
                (
                    StatusCode::CREATED,
                    Json(json!({
                        "message": "Product created successfully",
                        "id": created.id
                    })),
                ),
                Ok(()),
            )
        }
        Err(err) => internal_error(ApiError::DbError(err.to_string())),
    }
}

async fn update_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchProduct>,
) -> Response {
    if payload
        .normal_price
        .is_some_and(|price| price.is_sign_negative())
    {
        return bad_request("Price cannot be negative".to_owned());
    }

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => return transaction_error(),
    };

    let existing = match product::Entity::find_by_id(id).one(&txn).await {
        Ok(Some(existing)) => existing,
        Ok(None) => {
            let _ = txn.rollback().await;
            return not_found(format!("Product {id} not found"));
        }
        Err(err) => {
            let _ = txn.rollback().await;
            return internal_error(ApiError::DbError(err.to_string()));
        }
    };

    let references = References {
        brand_id: payload.brand_id,
        category_id: payload.category_id,
        deal_id: payload.deal_id,
    };
    if let Some(response) = check_references(&txn, &references).await {
        let _ = txn.rollback().await;
        return response;
    }

    let mut model: product::ActiveModel = existing.into();
    if let Some(title) = payload.title {
        model.title = Set(title);
    }
    if let Some(brand_id) = payload.brand_id {
        model.brand_id = Set(brand_id);
    }
    if let Some(category_id) = payload.category_id {
        model.category_id = Set(category_id);
    }
    if payload.clear_deal.unwrap_or_default() {
        model.deal_id = Set(None);
    } else if let Some(deal_id) = payload.deal_id {
        model.deal_id = Set(Some(deal_id));
    }
    if let Some(normal_price) = payload.normal_price {
        model.normal_price = Set(normal_price);
    }
    if let Some(stock) = payload.stock {
        model.stock = Set(stock);
    }
    if let Some(warranty) = payload.warranty {
        model.warranty = Set(Some(warranty));
    }
    if let Some(is_featured) = payload.is_featured {
        model.is_featured = Set(is_featured);
    }
    if let Some(description) = payload.description {
        model.description = Set(Some(description));
    }
    if let Some(specifications) = payload.specifications {
        model.specifications = Set(Some(specifications));
    }
    if let Some(image) = payload.image {
        model.image = Set(Some(image));
    }
    model.updated_at = Set(Utc::now());

    let updated = match model.update(&txn).await {
        Ok(updated) => updated,
        Err(err) => {
            let _ = txn.rollback().await;
            return internal_error(ApiError::DbError(err.to_string()));
        }
    };

    let deal = match updated.deal_id {
        Some(deal_id) => match deal::Entity::find_by_id(deal_id).one(&txn).await {
            Ok(deal) => deal,
            Err(err) => {
                let _ = txn.rollback().await;
                return internal_error(ApiError::DbError(err.to_string()));
            }
        },
        None => None,
    };

    match txn.commit().await {
        Ok(_) => to_response(
            (
                StatusCode::OK,
                Json(ProductResponse::new(updated, deal.as_ref())),
            ),
            Ok(()),
        ),
        Err(err) => internal_error(ApiError::DbError(err.to_string())),
    }
}

async fn delete_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    toggle_status(&db, id, ProductStatus::Hidden, AVAILABLE_PATH).await
}

async fn reactivate_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    toggle_status(&db, id, ProductStatus::Visible, DELETED_PATH).await
}

//utilities
async fn list_products(db: &DatabaseConnection, status: ProductStatus) -> Response {
    match products_by_status(db, status).await {
        Ok(rows) => to_response(
            (StatusCode::OK, Json(ProductResponse::from_pairs(rows))),
            Ok(()),
        ),
        Err(err) => store_error(err),
    }
}

/// Sends the admin back to the listing the product was taken from.
async fn toggle_status(
    db: &DatabaseConnection,
    id: i32,
    status: ProductStatus,
    back_to: &'static str,
) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => return transaction_error(),
    };

    match set_product_status(&txn, id, status).await {
        Ok(product) => match txn.commit().await {
            Ok(_) => {
                info!(product_id = product.id, status = ?product.status, "Changed product status");
                to_response(Redirect::to(back_to), Ok(()))
            }
            Err(err) => internal_error(ApiError::DbError(err.to_string())),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            store_error(err)
        }
    }
}

struct References {
    brand_id: Option<i32>,
    category_id: Option<i32>,
    deal_id: Option<i32>,
}

/// `None` when every referenced row exists, otherwise the response to send.
async fn check_references(txn: &DatabaseTransaction, refs: &References) -> Option<Response> {
    if let Some(id) = refs.brand_id {
        if let Some(response) = require(txn, brand::Entity::find_by_id(id), "Brand", id).await {
            return Some(response);
        }
    }
    if let Some(id) = refs.category_id {
        if let Some(response) = require(txn, category::Entity::find_by_id(id), "Category", id).await
        {
            return Some(response);
        }
    }
    if let Some(id) = refs.deal_id {
        if let Some(response) = require(txn, deal::Entity::find_by_id(id), "Deal", id).await {
            return Some(response);
        }
    }
    None
}

async fn require<E, C>(
    db: &C,
    query: sea_orm::Select<E>,
    kind: &str,
    id: i32,
) -> Option<Response>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    match query.one(db).await {
        Ok(Some(_)) => None,
        Ok(None) => Some(not_found(format!("{kind} {id} not found"))),
        Err(err) => Some(internal_error(ApiError::DbError(err.to_string()))),
    }
}

//structs
#[derive(Deserialize, Debug)]
struct CreateProduct {
    title: String,
    brand_id: i32,
    category_id: i32,
    deal_id: Option<i32>,
    normal_price: Decimal,
    stock: Option<u32>,
    warranty: Option<Warranty>,
    is_featured: Option<bool>,
    description: Option<String>,
    specifications: Option<String>,
    image: Option<String>,
}

#[derive(Deserialize, Debug)]
struct PatchProduct {
    title: Option<String>,
    brand_id: Option<i32>,
    category_id: Option<i32>,
    deal_id: Option<i32>,
    clear_deal: Option<bool>,
    normal_price: Option<Decimal>,
    stock: Option<u32>,
    warranty: Option<Warranty>,
    is_featured: Option<bool>,
    description: Option<String>,
    specifications: Option<String>,
    image: Option<String>,
}
