use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Milestones::Table)
                    .if_not_exists()
                    .col(uuid(Milestones::Id).primary_key())
                    .col(uuid(Milestones::ProjectId))
                    .col(string_len(Milestones::Name, 255))
                    .col(text_null(Milestones::Description))
                    .col(date_null(Milestones::DueDate))
                    .col(string_len(Milestones::Status, 16).default("open"))
                    .col(uuid(Milestones::CreatedBy))
                    .col(timestamp_with_time_zone(Milestones::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Milestones::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_milestones_project_id")
                            .from(Milestones::Table, Milestones::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_milestones_project_id")
                    .table(Milestones::Table)
                    .col(Milestones::ProjectId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Milestones::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Milestones {
    Table,
    Id,
    ProjectId,
    Name,
    Description,
    DueDate,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
}
