use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde::Serialize;
use std::sync::Arc;

use crate::api::responses::{internal_error, not_found, store_error, ProductResponse};
use crate::entities::deal;
use crate::middleware::logging::{to_response, ApiError};
use crate::store::catalog::{self, ProductFilter};

pub fn deal_router() -> Router {
    Router::new()
        .route("/products/deals", get(get_deals))
        .route("/products/deals/:id", get(get_deal))
}

async fn get_deals(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    let today = Utc::now().date_naive();
    match deal::Entity::find()
        .order_by_asc(deal::Column::EndDate)
        .all(&*db)
        .await
    {
        Ok(deals) => {
            let deals: Vec<DealResponse> = deals
                .into_iter()
                .map(|deal| DealResponse::new(deal, today))
                .collect();
            to_response((StatusCode::OK, Json(deals)), Ok(()))
        }
        Err(err) => internal_error(ApiError::DbError(err.to_string())),
    }
}

async fn get_deal(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    let deal = match deal::Entity::find_by_id(id).one(&*db).await {
        Ok(Some(deal)) => deal,
        Ok(None) => return not_found(format!("No deal with {} id was found.", id)),
        Err(err) => return internal_error(ApiError::DbError(err.to_string())),
    };

    let filter = ProductFilter {
        deal_id: Some(deal.id),
        ..Default::default()
    };
    match catalog::visible_products(&*db, &filter).await {
        Ok(products) => to_response(
            (
                StatusCode::OK,
                Json(DealDetailResponse {
                    deal: DealResponse::new(deal, Utc::now().date_naive()),
                    products: ProductResponse::from_pairs(products),
                }),
            ),
            Ok(()),
        ),
        Err(err) => store_error(err),
    }
}

#[derive(Serialize)]
struct DealResponse {
    #[serde(flatten)]
    deal: deal::Model,
    is_active: bool,
}

impl DealResponse {
    fn new(deal: deal::Model, today: chrono::NaiveDate) -> DealResponse {
        let is_active = deal.is_active_on(today);
        DealResponse { deal, is_active }
    }
}

#[derive(Serialize)]
struct DealDetailResponse {
    deal: DealResponse,
    products: Vec<ProductResponse>,
}
