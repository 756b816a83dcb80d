//! Database-side operations shared by the HTTP handlers.
//!
//! Every function takes any `ConnectionTrait` so handlers can run them inside
//! the request transaction.

pub mod cart;
pub mod catalog;

use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No product with {0} id was found")]
    ProductNotFound(i32),
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}
