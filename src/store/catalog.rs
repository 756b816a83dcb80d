use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};

use crate::entities::{
    brand, category, deal,
    product::{self, ProductStatus},
};
use crate::store::StoreError;

pub type ProductWithDeal = (product::Model, Option<deal::Model>);

#[derive(Clone, Debug, Default)]
pub struct ProductFilter {
    pub featured: Option<bool>,
    pub category_id: Option<i32>,
    pub brand_id: Option<i32>,
    pub deal_id: Option<i32>,
    pub limit: Option<u64>,
}

// Visible products in visible categories of visible brands, newest first.
fn visible_query() -> Select<product::Entity> {
    product::Entity::find()
        .inner_join(category::Entity)
        .inner_join(brand::Entity)
        .filter(product::Column::Status.eq(ProductStatus::Visible))
        .filter(category::Column::IsVisible.eq(true))
        .filter(brand::Column::IsVisible.eq(true))
        .order_by_desc(product::Column::CreatedAt)
        .order_by_asc(product::Column::Title)
}

pub async fn visible_products<C: ConnectionTrait>(
    db: &C,
    filter: &ProductFilter,
) -> Result<Vec<ProductWithDeal>, StoreError> {
    let mut query = visible_query();

    if let Some(featured) = filter.featured {
        query = query.filter(product::Column::IsFeatured.eq(featured));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(product::Column::CategoryId.eq(category_id));
    }
    if let Some(brand_id) = filter.brand_id {
        query = query.filter(product::Column::BrandId.eq(brand_id));
    }
    if let Some(deal_id) = filter.deal_id {
        query = query.filter(product::Column::DealId.eq(deal_id));
    }
    if let Some(limit) = filter.limit {
        query = query.limit(limit);
    }

    Ok(query.find_also_related(deal::Entity).all(db).await?)
}

pub async fn find_visible_product<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
) -> Result<Option<ProductWithDeal>, StoreError> {
    Ok(visible_query()
        .filter(product::Column::Id.eq(product_id))
        .find_also_related(deal::Entity)
        .one(db)
        .await?)
}

/// Back-office listing, including products whose category or brand is hidden.
pub async fn products_by_status<C: ConnectionTrait>(
    db: &C,
    status: ProductStatus,
) -> Result<Vec<ProductWithDeal>, StoreError> {
    Ok(product::Entity::find()
        .filter(product::Column::Status.eq(status))
        .order_by_desc(product::Column::CreatedAt)
        .order_by_asc(product::Column::Title)
        .find_also_related(deal::Entity)
        .all(db)
        .await?)
}

/// Moves a product between visible and hidden. The row itself is never deleted.
pub async fn set_product_status<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    status: ProductStatus,
) -> Result<product::Model, StoreError> {
    let product = product::Entity::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(StoreError::ProductNotFound(product_id))?;

    if product.status == status {
        return Ok(product);
    }

    let mut product: product::ActiveModel = product.into();
    product.status = Set(status);
    product.updated_at = Set(Utc::now());
    Ok(product.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{insert_deal, insert_product, setup_test_db, CatalogFixture};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn hidden_products_leave_the_public_listing() {
        let db = setup_test_db().await;
        let catalog = CatalogFixture::insert(&db).await;
        let kept = insert_product(&db, &catalog, "Kept", Decimal::new(1000, 2), None).await;
        let hidden = insert_product(&db, &catalog, "Hidden", Decimal::new(1000, 2), None).await;

        set_product_status(&db, hidden, ProductStatus::Hidden).await.unwrap();

        let listed: Vec<i32> = visible_products(&db, &ProductFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|(product, _)| product.id)
            .collect();
        assert_eq!(listed, vec![kept]);
        assert!(find_visible_product(&db, hidden).await.unwrap().is_none());

        let deleted = products_by_status(&db, ProductStatus::Hidden).await.unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].0.id, hidden);
    }

    #[tokio::test]
    async fn status_toggle_is_reversible_and_idempotent() {
        let db = setup_test_db().await;
        let catalog = CatalogFixture::insert(&db).await;
        let id = insert_product(&db, &catalog, "Toggle", Decimal::new(1000, 2), None).await;

        for _ in 0..2 {
            let product = set_product_status(&db, id, ProductStatus::Hidden).await.unwrap();
            assert_eq!(product.status, ProductStatus::Hidden);
        }
        let product = set_product_status(&db, id, ProductStatus::Visible).await.unwrap();
        assert_eq!(product.status, ProductStatus::Visible);
        assert!(find_visible_product(&db, id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn hidden_category_hides_its_products() {
        let db = setup_test_db().await;
        let catalog = CatalogFixture::insert(&db).await;
        insert_product(&db, &catalog, "Orphaned", Decimal::new(1000, 2), None).await;

        let mut hidden_category: category::ActiveModel = category::Entity::find_by_id(catalog.category_id)
            .one(&db)
            .await
            .unwrap()
            .unwrap()
            .into();
        hidden_category.is_visible = Set(false);
        hidden_category.update(&db).await.unwrap();

        assert!(visible_products(&db, &ProductFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deal_filter_returns_discounted_products() {
        let db = setup_test_db().await;
        let catalog = CatalogFixture::insert(&db).await;
        let deal_id = insert_deal(&db, "Summer", Decimal::new(25, 0)).await;
        let on_deal = insert_product(&db, &catalog, "On deal", Decimal::new(4000, 2), Some(deal_id)).await;
        insert_product(&db, &catalog, "Full price", Decimal::new(4000, 2), None).await;

        let filter = ProductFilter {
            deal_id: Some(deal_id),
            ..Default::default()
        };
        let products = visible_products(&db, &filter).await.unwrap();
        assert_eq!(products.len(), 1);
        let (product, deal) = &products[0];
        assert_eq!(product.id, on_deal);
        assert_eq!(product.price_with_discount(deal.as_ref()), Decimal::new(3000, 2));
    }

    #[tokio::test]
    async fn missing_product_cannot_change_status() {
        let db = setup_test_db().await;
        let err = set_product_status(&db, 9, ProductStatus::Hidden).await.unwrap_err();
        assert!(matches!(err, StoreError::ProductNotFound(9)));
    }
}
