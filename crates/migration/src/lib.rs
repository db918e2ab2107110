//! # Trellis Migrations
//!
//! Schema migrations for the Trellis database. The schema only uses column
//! types and inline foreign keys that PostgreSQL and SQLite both support.

pub use sea_orm_migration::prelude::*;

pub mod db;
pub mod migrator;

mod m20260101_000001_create_users_table;
mod m20260101_000002_create_projects_table;
mod m20260101_000003_create_project_members_table;
mod m20260101_000004_create_milestones_table;
mod m20260101_000005_create_tasks_table;
mod m20260101_000006_create_comments_table;
mod m20260101_000007_create_attachments_table;
mod m20260101_000008_create_time_logs_table;

pub use db::{connect_to_database, DatabaseConfig, SslMode};
pub use migrator::Migrator;
