//! Create `link` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Link::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Link::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Link::SupplierId).string_len(32).not_null())
                    .col(ColumnDef::new(Link::ConsumerId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Link::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Link::RequestedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Link::RespondedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Link::RespondedBy).string_len(32))
                    .col(
                        ColumnDef::new(Link::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_link_supplier")
                            .from(Link::Table, Link::SupplierId)
                            .to(Supplier::Table, Supplier::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_link_consumer")
                            .from(Link::Table, Link::ConsumerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: supplier_id (for supplier-side listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_link_supplier_id")
                    .table(Link::Table)
                    .col(Link::SupplierId)
                    .to_owned(),
            )
            .await?;

        // Index: consumer_id (for consumer-side listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_link_consumer_id")
                    .table(Link::Table)
                    .col(Link::ConsumerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Link::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Link {
    Table,
    Id,
    SupplierId,
    ConsumerId,
    Status,
    RequestedAt,
    RespondedAt,
    RespondedBy,
    Archived,
}

#[derive(Iden)]
enum Supplier {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
