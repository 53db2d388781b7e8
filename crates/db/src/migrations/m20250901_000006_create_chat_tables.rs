//! Create `chat_thread` and `chat_message` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChatThread::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatThread::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ChatThread::SupplierId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatThread::ConsumerId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChatThread::AssignedSalesId).string_len(32))
                    .col(
                        ColumnDef::new(ChatThread::Escalated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ChatThread::EscalatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ChatThread::EscalatedBy).string_len(32))
                    .col(
                        ColumnDef::new(ChatThread::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ChatThread::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ChatThread::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_thread_supplier")
                            .from(ChatThread::Table, ChatThread::SupplierId)
                            .to(Supplier::Table, Supplier::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_thread_consumer")
                            .from(ChatThread::Table, ChatThread::ConsumerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one active thread per partnership
        manager
            .create_index(
                Index::create()
                    .name("idx_chat_thread_supplier_consumer")
                    .table(ChatThread::Table)
                    .col(ChatThread::SupplierId)
                    .col(ChatThread::ConsumerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChatMessage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatMessage::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ChatMessage::ThreadId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatMessage::SenderId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatMessage::Kind)
                            .string_len(16)
                            .not_null()
                            .default("text"),
                    )
                    .col(ColumnDef::new(ChatMessage::Content).text().not_null())
                    .col(ColumnDef::new(ChatMessage::AttachmentUrl).string_len(1024))
                    .col(
                        ColumnDef::new(ChatMessage::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ChatMessage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_message_thread")
                            .from(ChatMessage::Table, ChatMessage::ThreadId)
                            .to(ChatThread::Table, ChatThread::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_message_sender")
                            .from(ChatMessage::Table, ChatMessage::SenderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chat_message_thread_id")
                    .table(ChatMessage::Table)
                    .col(ChatMessage::ThreadId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChatMessage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChatThread::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ChatThread {
    Table,
    Id,
    SupplierId,
    ConsumerId,
    AssignedSalesId,
    Escalated,
    EscalatedAt,
    EscalatedBy,
    Archived,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ChatMessage {
    Table,
    Id,
    ThreadId,
    SenderId,
    Kind,
    Content,
    AttachmentUrl,
    IsRead,
    CreatedAt,
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
