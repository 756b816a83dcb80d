use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entities::{
    brand::Entity as Brand,
    category::Entity as Category,
    deal::{self, Entity as Deal},
};
use crate::pricing;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub brand_id: i32,
    pub category_id: i32,
    pub deal_id: Option<i32>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub normal_price: Decimal,
    pub stock: u32,
    pub warranty: Option<Warranty>,
    pub is_featured: bool,
    pub status: ProductStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub specifications: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Exact discounted price. `deal` should be the row behind `deal_id`.
    pub fn price_with_discount(&self, deal: Option<&deal::Model>) -> Decimal {
        pricing::price_with_discount(self.normal_price, deal.map(|deal| deal.discount))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Category",
        from = "crate::entities::product::Column::CategoryId",
        to = "crate::entities::category::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade",
    )]
    Category,
    #[sea_orm(
        belongs_to = "Brand",
        from = "crate::entities::product::Column::BrandId",
        to = "crate::entities::brand::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade",
    )]
    Brand,
    #[sea_orm(
        belongs_to = "Deal",
        from = "crate::entities::product::Column::DealId",
        to = "crate::entities::deal::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull",
    )]
    Deal,
}

impl Related<crate::entities::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<crate::entities::brand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl Related<crate::entities::deal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Soft-delete lifecycle. Admin "delete" hides, "reactivate" shows again.
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    enum_name = "product_status_enum",
    db_type = "String(StringLen::N(16))",
    rs_type = "String"
)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[sea_orm(string_value = "visible")]
    Visible,
    #[sea_orm(string_value = "hidden")]
    Hidden,
}

#[derive(
    Clone, Copy, Default, PartialEq, Eq, Debug, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(try_from = "i32", into = "i32")]
pub enum Warranty {
    #[sea_orm(num_value = 1)]
    OneMonth,
    #[sea_orm(num_value = 3)]
    ThreeMonths,
    #[sea_orm(num_value = 6)]
    SixMonths,
    #[default]
    #[sea_orm(num_value = 12)]
    OneYear,
    #[sea_orm(num_value = 24)]
    TwoYears,
    #[sea_orm(num_value = 36)]
    ThreeYears,
}

impl TryFrom<i32> for Warranty {
    type Error = String;

    fn try_from(months: i32) -> Result<Self, Self::Error> {
        match months {
            1 => Ok(Warranty::OneMonth),
            3 => Ok(Warranty::ThreeMonths),
            6 => Ok(Warranty::SixMonths),
            12 => Ok(Warranty::OneYear),
            24 => Ok(Warranty::TwoYears),
            36 => Ok(Warranty::ThreeYears),
            other => Err(format!("Unsupported warranty period: {} months", other)),
        }
    }
}

impl From<Warranty> for i32 {
    fn from(value: Warranty) -> Self {
        match value {
            Warranty::OneMonth => 1,
            Warranty::ThreeMonths => 3,
            Warranty::SixMonths => 6,
            Warranty::OneYear => 12,
            Warranty::TwoYears => 24,
            Warranty::ThreeYears => 36,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warranty_accepts_only_listed_month_counts() {
        assert_eq!(Warranty::try_from(24), Ok(Warranty::TwoYears));
        assert!(Warranty::try_from(2).is_err());
        assert_eq!(i32::from(Warranty::default()), 12);
    }

    #[test]
    fn warranty_serializes_as_months() {
        let json = serde_json::to_string(&Warranty::SixMonths).unwrap();
        assert_eq!(json, "6");
        let parsed: Warranty = serde_json::from_str("36").unwrap();
        assert_eq!(parsed, Warranty::ThreeYears);
        assert!(serde_json::from_str::<Warranty>("5").is_err());
    }
}
