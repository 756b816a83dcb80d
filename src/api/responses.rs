//! Response helpers and JSON views shared by the public, user and admin routers.

use axum::{http::StatusCode, response::Response, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use serde_json::json;
use validator::ValidationErrors;

use crate::entities::{
    deal,
    product::{self, ProductStatus, Warranty},
};
use crate::middleware::logging::{to_response, ApiError};
use crate::pricing::round_price;
use crate::store::StoreError;

pub fn error_response(status: StatusCode, message: impl Into<String>, err: ApiError) -> Response {
    to_response(
        (
            status,
            Json(json!({
                "error": message.into()
            })),
        ),
        Err(err),
    )
}

pub fn internal_error(err: ApiError) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", err)
}

pub fn transaction_error() -> Response {
    internal_error(ApiError::TransactionCreationFailed)
}

pub fn not_found(message: String) -> Response {
    error_response(StatusCode::NOT_FOUND, message.clone(), ApiError::NotFound(message))
}

pub fn bad_request(message: String) -> Response {
    error_response(StatusCode::BAD_REQUEST, message.clone(), ApiError::ValidationFail(message))
}

pub fn store_error(err: StoreError) -> Response {
    match err {
        StoreError::ProductNotFound(_) => not_found(err.to_string()),
        StoreError::Db(err) => internal_error(ApiError::DbError(err.to_string())),
    }
}

/// Unique violations become 409 with `conflict`; anything else is a 500.
pub fn db_write_error(err: DbErr, conflict: &str) -> Response {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => error_response(
            StatusCode::CONFLICT,
            conflict,
            ApiError::Conflict(err.to_string()),
        ),
        _ => internal_error(ApiError::DbError(err.to_string())),
    }
}

/// 400 with every failed rule. `error` carries the readable messages, `fields`
/// the per-field breakdown.
pub fn validation_error(errors: ValidationErrors) -> Response {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("Invalid value for {field}"),
            })
        })
        .collect();
    messages.sort();
    let message = messages.join(" ");

    to_response(
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": message,
                "fields": errors,
            })),
        ),
        Err(ApiError::ValidationFail(message.clone())),
    )
}

#[derive(Serialize, Debug)]
pub struct ProductResponse {
    pub id: i32,
    pub title: String,
    pub brand_id: i32,
    pub category_id: i32,
    pub deal_id: Option<i32>,
    pub price: Decimal,
    pub price_with_discount: Decimal,
    pub stock: u32,
    pub warranty: Option<Warranty>,
    pub is_featured: bool,
    pub status: ProductStatus,
    pub description: Option<String>,
    pub specifications: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    pub fn new(value: product::Model, deal: Option<&deal::Model>) -> ProductResponse {
        let discounted = value.price_with_discount(deal);
        ProductResponse {
            id: value.id,
            title: value.title,
            brand_id: value.brand_id,
            category_id: value.category_id,
            deal_id: value.deal_id,
            price: round_price(value.normal_price),
            price_with_discount: round_price(discounted),
            stock: value.stock,
            warranty: value.warranty,
            is_featured: value.is_featured,
            status: value.status,
            description: value.description,
            specifications: value.specifications,
            image: value.image,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }

    pub fn from_pairs(rows: Vec<(product::Model, Option<deal::Model>)>) -> Vec<ProductResponse> {
        rows.into_iter()
            .map(|(product, deal)| ProductResponse::new(product, deal.as_ref()))
            .collect()
    }
}
