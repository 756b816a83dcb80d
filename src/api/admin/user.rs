use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::responses::internal_error;
use crate::api::user::profile::ProfileResponse;
use crate::entities::user::{self, Role};
use crate::middleware::logging::{to_response, ApiError};

pub fn admin_user_router() -> Router {
    Router::new().route("/management/users", get(list_users))
}

async fn list_users(
    Query(params): Query<UserQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    let mut query = user::Entity::find().order_by_asc(user::Column::Username);
    if let Some(role) = params.role {
        query = query.filter(user::Column::Role.eq(role));
    }

    match query.all(&*db).await {
        Ok(users) => {
            let users: Vec<ProfileResponse> = users.into_iter().map(ProfileResponse::new).collect();
            to_response((StatusCode::OK, Json(users)), Ok(()))
        }
        Err(err) => internal_error(ApiError::DbError(err.to_string())),
    }
}

#[derive(Deserialize)]
struct UserQuery {
    role: Option<Role>,
}
