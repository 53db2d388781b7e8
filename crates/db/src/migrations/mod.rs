//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250901_000001_create_supplier_table;
mod m20250901_000002_create_user_table;
mod m20250901_000003_create_link_table;
mod m20250901_000004_create_product_table;
mod m20250901_000005_create_order_tables;
mod m20250901_000006_create_chat_tables;
mod m20250901_000007_create_complaint_table;
mod m20250901_000008_create_incident_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_supplier_table::Migration),
            Box::new(m20250901_000002_create_user_table::Migration),
            Box::new(m20250901_000003_create_link_table::Migration),
            Box::new(m20250901_000004_create_product_table::Migration),
            Box::new(m20250901_000005_create_order_tables::Migration),
            Box::new(m20250901_000006_create_chat_tables::Migration),
            Box::new(m20250901_000007_create_complaint_table::Migration),
            Box::new(m20250901_000008_create_incident_tables::Migration),
        ]
    }
}
