pub mod auth;
pub mod category;
pub mod deal;
pub mod product;

use axum::Router;

use auth::auth_router;
use category::category_router;
use deal::deal_router;
use product::product_router;

pub fn public_api_router() -> Router {
    Router::new()
        .merge(auth_router())
        .merge(category_router())
        .merge(deal_router())
        .merge(product_router())
}
