use sea_orm_migration::{prelude::*, schema::*};

/// Longest description the application accepts, enforced again by the column type
const DESCRIPTION_MAX_LEN: u32 = 60;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TaskItems::Table)
                    .if_not_exists()
                    .col(pk_auto(TaskItems::Id))
                    .col(string(TaskItems::Title))
                    .col(string_len_null(TaskItems::Description, DESCRIPTION_MAX_LEN))
                    .col(boolean(TaskItems::CompletionStatus).default(false))
                    .col(timestamp_null(TaskItems::DueDate))
                    .to_owned(),
            )
            .await?;

        // Backs the statusFilter query
        manager
            .create_index(
                Index::create()
                    .name("idx_task_items_completion_status")
                    .table(TaskItems::Table)
                    .col(TaskItems::CompletionStatus)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaskItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TaskItems {
    Table,
    Id,
    Title,
    Description,
    CompletionStatus,
    DueDate,
}
