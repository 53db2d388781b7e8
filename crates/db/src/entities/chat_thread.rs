//! Chat thread entity (one conversation per consumer-supplier partnership).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_thread")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub supplier_id: String,

    /// The consumer user participating in this thread.
    pub consumer_id: String,

    /// Sales contact assigned to this conversation.
    #[sea_orm(nullable)]
    pub assigned_sales_id: Option<String>,

    /// Escalated threads are surfaced to supplier admins.
    #[sea_orm(default_value = false)]
    pub escalated: bool,

    #[sea_orm(nullable)]
    pub escalated_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub escalated_by: Option<String>,

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

    #[sea_orm(has_many = "super::chat_message::Entity")]
    Messages,
}

impl Related<super::chat_message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
