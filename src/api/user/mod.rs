pub mod cart;
pub mod profile;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};
use cart::cart_router;
use profile::profile_router;

pub fn user_api_router(db: Arc<DatabaseConnection>, config: Arc<AppConfig>) -> Router {
    Router::new()
        .merge(cart_router())
        .merge(profile_router())
        .route_layer(from_fn_with_state(
            AuthState {
                db,
                config,
                role: Role::User,
            },
            auth_middleware,
        ))
}
