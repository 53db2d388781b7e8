//! Create `incident` and `incident_log` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Incident::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Incident::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Incident::SupplierId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Incident::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Incident::Description).text().not_null())
                    .col(
                        ColumnDef::new(Incident::Status)
                            .string_len(16)
                            .not_null()
                            .default("open"),
                    )
                    .col(
                        ColumnDef::new(Incident::Priority)
                            .string_len(16)
                            .not_null()
                            .default("medium"),
                    )
                    .col(
                        ColumnDef::new(Incident::ReportedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Incident::AssignedTo).string_len(32))
                    .col(ColumnDef::new(Incident::ResolvedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Incident::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Incident::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Incident::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_incident_supplier")
                            .from(Incident::Table, Incident::SupplierId)
                            .to(Supplier::Table, Supplier::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_incident_supplier_id")
                    .table(Incident::Table)
                    .col(Incident::SupplierId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IncidentLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IncidentLog::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IncidentLog::IncidentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(IncidentLog::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(IncidentLog::Action).string_len(32).not_null())
                    .col(ColumnDef::new(IncidentLog::OldValue).string_len(256))
                    .col(ColumnDef::new(IncidentLog::NewValue).string_len(256))
                    .col(ColumnDef::new(IncidentLog::Notes).text())
                    .col(
                        ColumnDef::new(IncidentLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_incident_log_incident")
                            .from(IncidentLog::Table, IncidentLog::IncidentId)
                            .to(Incident::Table, Incident::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_incident_log_incident_id")
                    .table(IncidentLog::Table)
                    .col(IncidentLog::IncidentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IncidentLog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Incident::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Incident {
    Table,
    Id,
    SupplierId,
    Title,
    Description,
    Status,
    Priority,
    ReportedBy,
    AssignedTo,
    ResolvedAt,
    Archived,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum IncidentLog {
    Table,
    Id,
    IncidentId,
    UserId,
    Action,
    OldValue,
    NewValue,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum Supplier {
    Table,
    Id,
}
