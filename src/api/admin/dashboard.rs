use axum::{
    extract::Extension, http::StatusCode, response::Response, routing::get, Json, Router,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
};
use serde::Serialize;
use std::sync::Arc;

use crate::api::responses::internal_error;
use crate::entities::{
    brand, category, deal, page,
    product::{self, ProductStatus},
    user,
};
use crate::middleware::logging::{to_response, ApiError};

pub fn admin_dashboard_router() -> Router {
    Router::new().route("/management/", get(dashboard))
}

async fn dashboard(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    match Dashboard::load(&db).await {
        Ok(dashboard) => to_response((StatusCode::OK, Json(dashboard)), Ok(())),
        Err(err) => internal_error(ApiError::DbError(err.to_string())),
    }
}

#[derive(Serialize, Debug, PartialEq)]
struct Dashboard {
    products_available: u64,
    products_deleted: u64,
    users: u64,
    categories: u64,
    brands: u64,
    deals: u64,
    pages: u64,
}

impl Dashboard {
    async fn load(db: &DatabaseConnection) -> Result<Dashboard, DbErr> {
        Ok(Dashboard {
            products_available: product::Entity::find()
                .filter(product::Column::Status.eq(ProductStatus::Visible))
                .count(db)
                .await?,
            products_deleted: product::Entity::find()
                .filter(product::Column::Status.eq(ProductStatus::Hidden))
                .count(db)
                .await?,
            users: user::Entity::find().count(db).await?,
            categories: category::Entity::find().count(db).await?,
            brands: brand::Entity::find().count(db).await?,
            deals: deal::Entity::find().count(db).await?,
            pages: page::Entity::find().count(db).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::catalog::set_product_status;
    use crate::test_utils::{insert_product, insert_user, setup_test_db, CatalogFixture};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn counts_split_products_by_status() {
        let db = setup_test_db().await;
        insert_user(&db, "shopper").await;
        let catalog = CatalogFixture::insert(&db).await;
        insert_product(&db, &catalog, "Kept", Decimal::new(100, 0), None).await;
        let hidden = insert_product(&db, &catalog, "Gone", Decimal::new(100, 0), None).await;
        set_product_status(&db, hidden, ProductStatus::Hidden).await.unwrap();

        let dashboard = Dashboard::load(&db).await.unwrap();
        assert_eq!(
            dashboard,
            Dashboard {
                products_available: 1,
                products_deleted: 1,
                users: 1,
                categories: 1,
                brands: 1,
                deals: 0,
                pages: 0,
            }
        );
    }
}
