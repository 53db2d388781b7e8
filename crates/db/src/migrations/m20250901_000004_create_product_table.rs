//! Create `product` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Product::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Product::SupplierId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Product::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Product::Description).text())
                    .col(ColumnDef::new(Product::Unit).string_len(32).not_null())
                    .col(ColumnDef::new(Product::PriceKzt).big_integer().not_null())
                    .col(ColumnDef::new(Product::Stock).integer().not_null())
                    .col(ColumnDef::new(Product::Moq).integer().not_null())
                    .col(
                        ColumnDef::new(Product::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Product::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Product::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_supplier")
                            .from(Product::Table, Product::SupplierId)
                            .to(Supplier::Table, Supplier::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: supplier_id (for catalog listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_product_supplier_id")
                    .table(Product::Table)
                    .col(Product::SupplierId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Product::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Product {
    Table,
    Id,
    SupplierId,
    Name,
    Description,
    Unit,
    PriceKzt,
    Stock,
    Moq,
    Archived,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Supplier {
    Table,
    Id,
}
