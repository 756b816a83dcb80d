use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{get, patch},
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::responses::{
    bad_request, db_write_error, internal_error, not_found, transaction_error,
};
use crate::entities::deal;
use crate::middleware::logging::{to_response, ApiError};

//ROUTERS
pub fn admin_deal_router() -> Router {
    Router::new()
        .route("/management/deals", get(list_deals).post(create_deal))
        .route("/management/deals/:id", patch(patch_deal))
}

//ROUTES
async fn list_deals(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    let result = deal::Entity::find()
        .order_by_desc(deal::Column::StartDate)
        .order_by_asc(deal::Column::Name)
        .all(&*db)
        .await;

    match result {
        Ok(deals) => to_response((StatusCode::OK, Json(deals)), Ok(())),
        Err(err) => internal_error(ApiError::DbError(err.to_string())),
    }
}

async fn create_deal(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateDeal>,
) -> Response {
    if let Err(message) = check_deal(payload.discount, payload.start_date, payload.end_date) {
        return bad_request(message);
    }

    let new_deal = deal::ActiveModel {
        name: Set(payload.name),
        description: Set(payload.description.unwrap_or_default()),
        discount: Set(payload.discount),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        ..Default::default()
    };

    match new_deal.insert(&*db).await {
        Ok(created) => to_response((StatusCode::CREATED, Json(created)), Ok(())),
        Err(err) => db_write_error(err, "Deal already exists"),
    }
}

async fn patch_deal(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchDeal>,
) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => return transaction_error(),
    };

    let existing = match deal::Entity::find_by_id(id).one(&txn).await {
        Ok(Some(existing)) => existing,
        Ok(None) => return not_found(format!("Deal {id} not found")),
        Err(err) => return internal_error(ApiError::DbError(err.to_string())),
    };

    // Validate the merged result, not just the submitted fields.
    let discount = payload.discount.unwrap_or(existing.discount);
    let start_date = payload.start_date.unwrap_or(existing.start_date);
    let end_date = payload.end_date.unwrap_or(existing.end_date);
    if let Err(message) = check_deal(discount, start_date, end_date) {
        return bad_request(message);
    }

    let mut model: deal::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        model.name = Set(name);
    }
    if let Some(description) = payload.description {
        model.description = Set(description);
    }
    model.discount = Set(discount);
    model.start_date = Set(start_date);
    model.end_date = Set(end_date);

    match model.update(&txn).await {
        Ok(updated) => match txn.commit().await {
            Ok(_) => to_response((StatusCode::OK, Json(updated)), Ok(())),
            Err(err) => internal_error(ApiError::DbError(err.to_string())),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            db_write_error(err, "Deal already exists")
        }
    }
}

//utilities
fn check_deal(discount: Decimal, start: NaiveDate, end: NaiveDate) -> Result<(), String> {
    if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
        return Err("Discount must be between 0 and 100".to_owned());
    }
    if end < start {
        return Err("Deal cannot end before it starts".to_owned());
    }
    Ok(())
}

//structs
#[derive(Deserialize, Debug)]
struct CreateDeal {
    name: String,
    description: Option<String>,
    discount: Decimal,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Deserialize, Debug)]
struct PatchDeal {
    name: Option<String>,
    description: Option<String>,
    discount: Option<Decimal>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}
