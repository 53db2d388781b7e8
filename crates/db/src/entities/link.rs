//! Consumer-supplier partnership link entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Link status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum LinkStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "declined")]
    Declined,
    #[sea_orm(string_value = "blocked")]
    Blocked,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "link")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub supplier_id: String,

    /// The consumer user who requested the link.
    pub consumer_id: String,

    pub status: LinkStatus,

    pub requested_at: DateTimeWithTimeZone,

    /// When the supplier responded (approve/decline/block).
    #[sea_orm(nullable)]
    pub responded_at: Option<DateTimeWithTimeZone>,

    /// Supplier-side user who responded.
    #[sea_orm(nullable)]
    pub responded_by: Option<String>,

    #[sea_orm(default_value = false)]
    pub archived: bool,
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
}

impl ActiveModelBehavior for ActiveModel {}
