//! Entity definitions for Trellis
//!
//! Sea-ORM entity definitions for the database models. Every protected
//! resource reaches exactly one project through its foreign keys.

pub mod sea_orm_active_enums;

pub mod attachments;
pub use attachments::Entity as Attachments;
pub mod comments;
pub use comments::Entity as Comments;
pub mod milestones;
pub use milestones::Entity as Milestones;
pub mod project_members;
pub use project_members::Entity as ProjectMembers;
pub mod projects;
pub use projects::Entity as Projects;
pub mod tasks;
pub use tasks::Entity as Tasks;
pub mod time_logs;
pub use time_logs::Entity as TimeLogs;
pub mod users;
pub use users::Entity as Users;
