pub mod brand;
pub mod cart;
pub mod cart_item;
pub mod category;
pub mod deal;
pub mod page;
pub mod product;
pub mod user;

use argon2::{password_hash::PasswordHasher, password_hash::SaltString, Argon2};
use rand::rngs::OsRng;
use sea_orm::{
    sea_query::Index, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Schema, Set,
};
use tracing::info;

use crate::entities::{
    brand::Entity as Brand, cart::Entity as Cart, cart_item::Entity as CartItem,
    category::Entity as Category, deal::Entity as Deal, page::Entity as Page,
    product::Entity as Product, user::Entity as User,
};

/// Creates every table (parents first) and the cart item pair index. Safe to rerun.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut tables = [
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Category),
        schema.create_table_from_entity(Brand),
        schema.create_table_from_entity(Deal),
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(Cart),
        schema.create_table_from_entity(CartItem),
        schema.create_table_from_entity(Page),
    ];
    for table in tables.iter_mut() {
        table.if_not_exists();
        db.execute(backend.build(&*table)).await?;
    }

    let cart_item_pair = Index::create()
        .name("idx_cart_item_cart_product")
        .table(CartItem)
        .col(cart_item::Column::CartId)
        .col(cart_item::Column::ProductId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&cart_item_pair)).await?;

    Ok(())
}

/// Inserts the configured admin account unless that username already exists.
pub async fn seed_admin(db: &DatabaseConnection, username: &str, password: &str) -> Result<(), DbErr> {
    let existing = User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| DbErr::Custom(format!("Failed to hash admin password: {err}")))?
        .to_string();

    let new_admin = user::ActiveModel {
        username: Set(username.to_owned()),
        password: Set(password_hash),
        email: Set(String::new()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        address: Set(String::new()),
        phone_number: Set(String::new()),
        role: Set(user::Role::Admin),
        ..Default::default()
    };
    User::insert(new_admin).exec(db).await?;
    info!(username, "Seeded admin account");

    Ok(())
}
