//! Per-user cart state.
//!
//! Each (cart, product) pair is either absent or present with quantity >= 1.
//! Every transition is a single conditional statement so two concurrent
//! requests for the same pair cannot lose an update.

use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;

use crate::entities::{cart, cart_item, deal, product};
use crate::store::StoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CartOp {
    Add,
    Subtract,
    Remove,
}

/// A cart row joined with its product and, when linked, the product's deal.
#[derive(Clone, Debug)]
pub struct CartLine {
    pub product: product::Model,
    pub deal: Option<deal::Model>,
    pub quantity: u32,
}

pub async fn get_or_create_cart<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<cart::Model, StoreError> {
    let new_cart = cart::ActiveModel {
        user_id: Set(user_id),
        ..Default::default()
    };
    cart::Entity::insert(new_cart)
        .on_conflict(OnConflict::column(cart::Column::UserId).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;

    cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("cart for user {user_id}")).into())
}

pub async fn find_product<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
) -> Result<product::Model, StoreError> {
    product::Entity::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(StoreError::ProductNotFound(product_id))
}

pub async fn apply<C: ConnectionTrait>(
    db: &C,
    cart_id: i32,
    product_id: i32,
    op: CartOp,
) -> Result<(), StoreError> {
    match op {
        CartOp::Add => add_product(db, cart_id, product_id).await,
        CartOp::Subtract => subtract_product(db, cart_id, product_id).await,
        CartOp::Remove => remove_product(db, cart_id, product_id).await,
    }
}

/// absent -> 1, q -> q + 1
pub async fn add_product<C: ConnectionTrait>(
    db: &C,
    cart_id: i32,
    product_id: i32,
) -> Result<(), StoreError> {
    let entry = cart_item::ActiveModel {
        cart_id: Set(cart_id),
        product_id: Set(product_id),
        quantity: Set(1),
        ..Default::default()
    };
    cart_item::Entity::insert(entry)
        .on_conflict(
            OnConflict::columns([cart_item::Column::CartId, cart_item::Column::ProductId])
                .value(
                    cart_item::Column::Quantity,
                    Expr::col((cart_item::Entity, cart_item::Column::Quantity)).add(1),
                )
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// q > 1 -> q - 1, 1 -> absent, absent stays absent
pub async fn subtract_product<C: ConnectionTrait>(
    db: &C,
    cart_id: i32,
    product_id: i32,
) -> Result<(), StoreError> {
    let decremented = cart_item::Entity::update_many()
        .col_expr(
            cart_item::Column::Quantity,
            Expr::col(cart_item::Column::Quantity).sub(1),
        )
        .filter(cart_item::Column::CartId.eq(cart_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .filter(cart_item::Column::Quantity.gt(1))
        .exec(db)
        .await?;

    if decremented.rows_affected == 0 {
        cart_item::Entity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .filter(cart_item::Column::Quantity.lte(1))
            .exec(db)
            .await?;
    }
    Ok(())
}

pub async fn remove_product<C: ConnectionTrait>(
    db: &C,
    cart_id: i32,
    product_id: i32,
) -> Result<(), StoreError> {
    cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn clear_cart<C: ConnectionTrait>(db: &C, cart_id: i32) -> Result<u64, StoreError> {
    let result = cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

pub async fn quantity_of<C: ConnectionTrait>(
    db: &C,
    cart_id: i32,
    product_id: i32,
) -> Result<Option<u32>, StoreError> {
    let entry = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(db)
        .await?;
    Ok(entry.map(|entry| entry.quantity))
}

/// Cart contents in the order the products were first added.
pub async fn cart_lines<C: ConnectionTrait>(db: &C, cart_id: i32) -> Result<Vec<CartLine>, StoreError> {
    let rows = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .order_by_asc(cart_item::Column::Id)
        .find_also_related(product::Entity)
        .all(db)
        .await?;

    let deal_ids: Vec<i32> = rows
        .iter()
        .filter_map(|(_, product)| product.as_ref().and_then(|product| product.deal_id))
        .collect();
    let deals: HashMap<i32, deal::Model> = if deal_ids.is_empty() {
        HashMap::new()
    } else {
        deal::Entity::find()
            .filter(deal::Column::Id.is_in(deal_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|deal| (deal.id, deal))
            .collect()
    };

    Ok(rows
        .into_iter()
        .filter_map(|(entry, product)| {
            let product = product?;
            let deal = product.deal_id.and_then(|id| deals.get(&id).cloned());
            Some(CartLine {
                product,
                deal,
                quantity: entry.quantity,
            })
        })
        .collect())
}
