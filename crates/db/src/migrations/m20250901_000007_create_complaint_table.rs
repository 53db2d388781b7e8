//! Create `complaint` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Complaint::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Complaint::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Complaint::OrderId).string_len(32).not_null())
                    .col(ColumnDef::new(Complaint::ThreadId).string_len(32))
                    .col(
                        ColumnDef::new(Complaint::ReportedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Complaint::SupplierId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Complaint::Subject).string_len(256).not_null())
                    .col(ColumnDef::new(Complaint::Description).text().not_null())
                    .col(
                        ColumnDef::new(Complaint::Status)
                            .string_len(16)
                            .not_null()
                            .default("open"),
                    )
                    .col(ColumnDef::new(Complaint::AssignedTo).string_len(32))
                    .col(ColumnDef::new(Complaint::Resolution).text())
                    .col(ColumnDef::new(Complaint::EscalatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Complaint::EscalatedBy).string_len(32))
                    .col(ColumnDef::new(Complaint::ClosedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Complaint::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Complaint::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Complaint::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaint_order")
                            .from(Complaint::Table, Complaint::OrderId)
                            .to(Order::Table, Order::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaint_supplier")
                            .from(Complaint::Table, Complaint::SupplierId)
                            .to(Supplier::Table, Supplier::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_supplier_id")
                    .table(Complaint::Table)
                    .col(Complaint::SupplierId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_reported_by")
                    .table(Complaint::Table)
                    .col(Complaint::ReportedBy)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Complaint::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Complaint {
    Table,
    Id,
    OrderId,
    ThreadId,
    ReportedBy,
    SupplierId,
    Subject,
    Description,
    Status,
    AssignedTo,
    Resolution,
    EscalatedAt,
    EscalatedBy,
    ClosedAt,
    Archived,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Order {
    Table,
    Id,
}

#[derive(Iden)]
enum Supplier {
    Table,
    Id,
}
