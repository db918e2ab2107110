use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TimeLogs::Table)
                    .if_not_exists()
                    .col(uuid(TimeLogs::Id).primary_key())
                    .col(uuid(TimeLogs::TaskId))
                    .col(uuid(TimeLogs::UserId))
                    .col(integer(TimeLogs::Minutes))
                    .col(date(TimeLogs::LogDate))
                    .col(text_null(TimeLogs::Description))
                    .col(timestamp_with_time_zone(TimeLogs::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_time_logs_task_id")
                            .from(TimeLogs::Table, TimeLogs::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_time_logs_user_id")
                            .from(TimeLogs::Table, TimeLogs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_time_logs_user_date")
                    .table(TimeLogs::Table)
                    .col(TimeLogs::UserId)
                    .col(TimeLogs::LogDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TimeLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TimeLogs {
    Table,
    Id,
    TaskId,
    UserId,
    Minutes,
    LogDate,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
