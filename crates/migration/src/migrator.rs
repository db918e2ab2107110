//! # Database Migrator

use sea_orm_migration::prelude::*;

use crate::{
    m20260101_000001_create_users_table,
    m20260101_000002_create_projects_table,
    m20260101_000003_create_project_members_table,
    m20260101_000004_create_milestones_table,
    m20260101_000005_create_tasks_table,
    m20260101_000006_create_comments_table,
    m20260101_000007_create_attachments_table,
    m20260101_000008_create_time_logs_table,
};

/// Runs the migrations in dependency order: referenced tables first.
#[derive(Debug)]
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_users_table::Migration),
            Box::new(m20260101_000002_create_projects_table::Migration),
            Box::new(m20260101_000003_create_project_members_table::Migration),
            Box::new(m20260101_000004_create_milestones_table::Migration),
            Box::new(m20260101_000005_create_tasks_table::Migration),
            Box::new(m20260101_000006_create_comments_table::Migration),
            Box::new(m20260101_000007_create_attachments_table::Migration),
            Box::new(m20260101_000008_create_time_logs_table::Migration),
        ]
    }
}
