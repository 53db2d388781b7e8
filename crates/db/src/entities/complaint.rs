//! Complaint entity.
//!
//! Escalation is a status variant, not a separate flag; `escalated_at` and
//! `escalated_by` record when and by whom the transition happened.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Complaint status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ComplaintStatus {
    #[sea_orm(string_value = "open")]
    #[default]
    Open,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "escalated")]
    Escalated,
    #[sea_orm(string_value = "closed")]
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "complaint")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The order this complaint is about.
    pub order_id: String,

    /// Chat thread of the underlying partnership, when one exists.
    #[sea_orm(nullable)]
    pub thread_id: Option<String>,

    /// The consumer user who filed the complaint.
    pub reported_by: String,

    /// Supplier company the complaint is against (denormalized from the order).
    pub supplier_id: String,

    pub subject: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub status: ComplaintStatus,

    /// Supplier-side user handling the complaint.
    #[sea_orm(nullable)]
    pub assigned_to: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub resolution: Option<String>,

    #[sea_orm(nullable)]
    pub escalated_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub escalated_by: Option<String>,

    #[sea_orm(nullable)]
    pub closed_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(default_value = false)]
    pub archived: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,

    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id",
        on_delete = "Cascade"
    )]
    Supplier,
}

impl ActiveModelBehavior for ActiveModel {}
