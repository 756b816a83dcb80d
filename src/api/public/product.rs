use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::responses::{not_found, store_error, ProductResponse};
use crate::middleware::logging::to_response;
use crate::store::catalog::{self, ProductFilter};

const RECENT_PRODUCTS: u64 = 8;

pub fn product_router() -> Router {
    Router::new()
        .route("/products/", get(get_products))
        .route("/products/recent", get(get_recent_products))
        .route("/products/:id", get(get_product))
}

async fn get_products(
    Query(params): Query<GetProductsQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    let filter = ProductFilter {
        featured: params.featured,
        category_id: params.category,
        brand_id: params.brand,
        ..Default::default()
    };

    match catalog::visible_products(&*db, &filter).await {
        Ok(products) => to_response(
            (StatusCode::OK, Json(ProductResponse::from_pairs(products))),
            Ok(()),
        ),
        Err(err) => store_error(err),
    }
}

async fn get_recent_products(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    let filter = ProductFilter {
        limit: Some(RECENT_PRODUCTS),
        ..Default::default()
    };

    match catalog::visible_products(&*db, &filter).await {
        Ok(products) => to_response(
            (StatusCode::OK, Json(ProductResponse::from_pairs(products))),
            Ok(()),
        ),
        Err(err) => store_error(err),
    }
}

async fn get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match catalog::find_visible_product(&*db, id).await {
        Ok(Some((product, deal))) => to_response(
            (StatusCode::OK, Json(ProductResponse::new(product, deal.as_ref()))),
            Ok(()),
        ),
        Ok(None) => not_found(format!("No product with {} id was found.", id)),
        Err(err) => store_error(err),
    }
}

#[derive(Deserialize)]
struct GetProductsQuery {
    featured: Option<bool>,
    category: Option<i32>,
    brand: Option<i32>,
}
