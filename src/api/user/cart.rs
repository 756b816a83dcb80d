use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{Redirect, Response},
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::api::responses::{internal_error, store_error, transaction_error};
use crate::middleware::{
    auth::Claims,
    logging::{to_response, ApiError},
};
use crate::pricing::round_price;
use crate::store::{
    cart::{self, CartLine, CartOp},
    StoreError,
};

pub const CART_PATH: &str = "/cart/";

//ROUTERS
pub fn cart_router() -> Router {
    Router::new()
        .route(CART_PATH, get(get_cart))
        .route("/cart/add_product/:id/", get(add_product).post(add_product))
        .route("/cart/remove_product/:id/", get(remove_product).post(remove_product))
        .route("/cart/subtract_product/:id/", get(subtract_product).post(subtract_product))
        .route("/cart/clear_cart/", get(clear_cart).post(clear_cart))
}

//Routes
async fn get_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => return transaction_error(),
    };

    let (cart_id, lines) = match load_cart(&txn, claims.user_id).await {
        Ok(loaded) => loaded,
        Err(err) => {
            let _ = txn.rollback().await;
            return store_error(err);
        }
    };

    match txn.commit().await {
        Ok(_) => to_response((StatusCode::OK, Json(CartView::new(cart_id, lines))), Ok(())),
        Err(err) => internal_error(ApiError::DbError(err.to_string())),
    }
}

async fn add_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    mutate(&db, claims.user_id, id, CartOp::Add).await
}

async fn remove_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    mutate(&db, claims.user_id, id, CartOp::Remove).await
}

async fn subtract_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    mutate(&db, claims.user_id, id, CartOp::Subtract).await
}

async fn clear_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => return transaction_error(),
    };

    let result = match cart::get_or_create_cart(&txn, claims.user_id).await {
        Ok(entry) => cart::clear_cart(&txn, entry.id).await.map(|removed| {
            debug!(user_id = claims.user_id, removed, "Cleared cart");
        }),
        Err(err) => Err(err),
    };

    finish(txn, result).await
}

//utilities
async fn load_cart(
    txn: &DatabaseTransaction,
    user_id: i32,
) -> Result<(i32, Vec<CartLine>), StoreError> {
    let entry = cart::get_or_create_cart(txn, user_id).await?;
    let lines = cart::cart_lines(txn, entry.id).await?;
    Ok((entry.id, lines))
}

/// The cart upsert is the first statement so the transaction takes the write
/// lock up front. An unknown product rolls the whole transaction back.
async fn mutate(db: &DatabaseConnection, user_id: i32, product_id: i32, op: CartOp) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => return transaction_error(),
    };

    let result = apply(&txn, user_id, product_id, op).await;
    finish(txn, result).await
}

async fn apply(
    txn: &DatabaseTransaction,
    user_id: i32,
    product_id: i32,
    op: CartOp,
) -> Result<(), StoreError> {
    let entry = cart::get_or_create_cart(txn, user_id).await?;
    let product = cart::find_product(txn, product_id).await?;
    cart::apply(txn, entry.id, product.id, op).await?;
    debug!(user_id, product_id, ?op, "Applied cart operation");
    Ok(())
}

async fn finish(txn: DatabaseTransaction, result: Result<(), StoreError>) -> Response {
    match result {
        Ok(()) => match txn.commit().await {
            Ok(_) => to_response(Redirect::to(CART_PATH), Ok(())),
            Err(err) => internal_error(ApiError::DbError(err.to_string())),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            store_error(err)
        }
    }
}

//Structs
#[derive(Serialize, Debug)]
struct CartItemView {
    product_id: i32,
    title: String,
    image: Option<String>,
    quantity: u32,
    price: Decimal,
    price_with_discount: Decimal,
    line_total: Decimal,
}

#[derive(Serialize, Debug)]
struct CartView {
    cart_id: i32,
    items: Vec<CartItemView>,
    total_quantity: u32,
    total: Decimal,
}

impl CartView {
    fn new(cart_id: i32, lines: Vec<CartLine>) -> CartView {
        let items: Vec<CartItemView> = lines
            .into_iter()
            .map(|line| {
                let unit = line.product.price_with_discount(line.deal.as_ref());
                CartItemView {
                    product_id: line.product.id,
                    title: line.product.title,
                    image: line.product.image,
                    quantity: line.quantity,
                    price: round_price(line.product.normal_price),
                    price_with_discount: round_price(unit),
                    line_total: round_price(unit * Decimal::from(line.quantity)),
                }
            })
            .collect();

        let total_quantity = items.iter().map(|item| item.quantity).sum();
        let total = round_price(items.iter().map(|item| item.line_total).sum());

        CartView {
            cart_id,
            items,
            total_quantity,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{deal, product};
    use chrono::{NaiveDate, Utc};

    fn product(id: i32, price: Decimal, deal_id: Option<i32>) -> product::Model {
        product::Model {
            id,
            title: format!("Product {id}"),
            brand_id: 1,
            category_id: 1,
            deal_id,
            normal_price: price,
            stock: 10,
            warranty: None,
            is_featured: false,
            status: product::ProductStatus::Visible,
            description: None,
            specifications: None,
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn cart_view_totals_discounted_lines() {
        let ten_percent = deal::Model {
            id: 3,
            name: "Ten".to_owned(),
            description: String::new(),
            discount: Decimal::new(10, 0),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        };
        let lines = vec![
            CartLine {
                product: product(1, Decimal::new(5099, 2), Some(3)),
                deal: Some(ten_percent),
                quantity: 2,
            },
            CartLine {
                product: product(2, Decimal::new(2000, 2), None),
                deal: None,
                quantity: 1,
            },
        ];

        let view = CartView::new(9, lines);
        assert_eq!(view.total_quantity, 3);
        assert_eq!(view.items[0].price_with_discount.to_string(), "45.89");
        assert_eq!(view.items[0].line_total.to_string(), "91.78");
        assert_eq!(view.items[1].line_total.to_string(), "20.00");
        assert_eq!(view.total.to_string(), "111.78");
    }

    #[test]
    fn empty_cart_view_has_zero_total() {
        let view = CartView::new(1, Vec::new());
        assert!(view.items.is_empty());
        assert_eq!(view.total.to_string(), "0.00");
    }
}
