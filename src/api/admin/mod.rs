pub mod category;
pub mod dashboard;
pub mod deal;
pub mod page;
pub mod product;
pub mod user;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use category::admin_category_router;
use dashboard::admin_dashboard_router;
use deal::admin_deal_router;
use page::admin_page_router;
use product::admin_product_router;
use user::admin_user_router;

use crate::config::AppConfig;
use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};

pub fn admin_api_router(db: Arc<DatabaseConnection>, config: Arc<AppConfig>) -> Router {
    Router::new()
        .merge(admin_dashboard_router())
        .merge(admin_category_router())
        .merge(admin_deal_router())
        .merge(admin_page_router())
        .merge(admin_product_router())
        .merge(admin_user_router())
        .route_layer(from_fn_with_state(
            AuthState {
                db,
                config,
                role: Role::Admin,
            },
            auth_middleware,
        ))
}
