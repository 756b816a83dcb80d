#![allow(dead_code)]
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use tracing_subscriber::EnvFilter;

use crate::entities::{brand, category, deal, product, setup_schema, user};

pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

// Fresh in-memory database with the full schema.
pub(crate) async fn setup_test_db() -> DatabaseConnection {
    init_test_tracing();
    let db = crate::connect("sqlite::memory:")
        .await
        .expect("Test DB: failed to open in-memory database");
    setup_schema(&db).await.expect("Test DB: failed to create schema");
    db
}

pub(crate) async fn insert_user(db: &DatabaseConnection, username: &str) -> i32 {
    let new_user = user::ActiveModel {
        username: Set(username.to_owned()),
        password: Set("not-a-real-hash".to_owned()),
        email: Set(format!("{username}@example.com")),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        address: Set(String::new()),
        phone_number: Set(String::new()),
        role: Set(user::Role::User),
        ..Default::default()
    };
    user::Entity::insert(new_user)
        .exec(db)
        .await
        .expect("Test DB: failed to insert user")
        .last_insert_id
}

pub(crate) struct CatalogFixture {
    pub(crate) category_id: i32,
    pub(crate) brand_id: i32,
}

impl CatalogFixture {
    pub(crate) async fn insert(db: &DatabaseConnection) -> Self {
        let category_id = category::Entity::insert(category::ActiveModel {
            title: Set("Peripherals".to_owned()),
            is_visible: Set(true),
            ..Default::default()
        })
        .exec(db)
        .await
        .expect("Test DB: failed to insert category")
        .last_insert_id;

        let brand_id = brand::Entity::insert(brand::ActiveModel {
            name: Set("Acme".to_owned()),
            is_visible: Set(true),
            ..Default::default()
        })
        .exec(db)
        .await
        .expect("Test DB: failed to insert brand")
        .last_insert_id;

        CatalogFixture {
            category_id,
            brand_id,
        }
    }
}

pub(crate) async fn insert_deal(db: &DatabaseConnection, name: &str, discount: Decimal) -> i32 {
    let new_deal = deal::ActiveModel {
        name: Set(name.to_owned()),
        description: Set(format!("{name} deal")),
        discount: Set(discount),
        start_date: Set(NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")),
        end_date: Set(NaiveDate::from_ymd_opt(2030, 12, 31).expect("valid date")),
        ..Default::default()
    };
    deal::Entity::insert(new_deal)
        .exec(db)
        .await
        .expect("Test DB: failed to insert deal")
        .last_insert_id
}

pub(crate) async fn insert_product(
    db: &DatabaseConnection,
    catalog: &CatalogFixture,
    title: &str,
    normal_price: Decimal,
    deal_id: Option<i32>,
) -> i32 {
    let now = Utc::now();
    let new_product = product::ActiveModel {
        title: Set(title.to_owned()),
        brand_id: Set(catalog.brand_id),
        category_id: Set(catalog.category_id),
        deal_id: Set(deal_id),
        normal_price: Set(normal_price),
        stock: Set(100),
        warranty: Set(Some(product::Warranty::default())),
        is_featured: Set(false),
        status: Set(product::ProductStatus::Visible),
        description: Set(None),
        specifications: Set(None),
        image: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product::Entity::insert(new_product)
        .exec(db)
        .await
        .expect("Test DB: failed to insert product")
        .last_insert_id
}
