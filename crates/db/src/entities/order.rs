//! Order entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub supplier_id: String,

    /// The consumer user who placed the order.
    pub consumer_id: String,

    pub status: OrderStatus,

    /// Order total in whole KZT. Always the sum of item totals.
    pub total_kzt: i64,

    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    /// When the supplier responded (accept/reject).
    #[sea_orm(nullable)]
    pub responded_at: Option<DateTimeWithTimeZone>,

    /// Supplier-side user who responded.
    #[sea_orm(nullable)]
    pub responded_by: Option<String>,

    #[sea_orm(default_value = false)]
    pub archived: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id",
        on_delete = "Cascade"
    )]
    Supplier,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ConsumerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Consumer,

    #[sea_orm(has_many = "super::order_item::Entity")]
    Items,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
