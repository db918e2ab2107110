//! # CLI Migration Command
//!
//! Applies, rolls back or lists schema migrations.

use error::Result;
use migration::{DatabaseConfig, Migrator, MigratorTrait as _};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::commands::MigrateArgs;

/// Applied and pending migration names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStatus {
    pub applied: Vec<String>,
    pub pending: Vec<String>,
}

impl MigrationStatus {
    pub fn render(&self) -> String {
        let mut out = String::new();
        for name in &self.applied {
            out.push_str(&format!("[applied] {name}\n"));
        }
        for name in &self.pending {
            out.push_str(&format!("[pending] {name}\n"));
        }
        out
    }
}

pub async fn status(db: &DatabaseConnection) -> Result<MigrationStatus> {
    let applied = Migrator::get_applied_migrations(db)
        .await?
        .iter()
        .map(|m| m.name().to_string())
        .collect();
    let pending = Migrator::get_pending_migrations(db)
        .await?
        .iter()
        .map(|m| m.name().to_string())
        .collect();
    Ok(MigrationStatus {
        applied,
        pending,
    })
}

/// Run the migrate command against `db`.
pub async fn run(db: &DatabaseConnection, args: &MigrateArgs) -> Result<MigrationStatus> {
    if args.rollback {
        info!(target: "migrate", steps = args.steps, "Rolling back migrations");
        Migrator::down(db, Some(args.steps)).await?;
    }
    else if !args.status {
        info!(target: "migrate", "Applying pending migrations");
        Migrator::up(db, None).await?;
    }
    status(db).await
}

pub async fn migrate(config: &DatabaseConfig, args: &MigrateArgs) -> Result<()> {
    let db = config.connect().await?;
    let status = run(&db, args).await?;
    print!("{}", status.render());
    info!(
        target: "migrate",
        applied = status.applied.len(),
        pending = status.pending.len(),
        "Migration command completed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectOptions, Database};

    use super::*;

    async fn sqlite() -> DatabaseConnection {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        Database::connect(options).await.unwrap()
    }

    fn args(status: bool, rollback: bool, steps: u32) -> MigrateArgs {
        MigrateArgs {
            status,
            rollback,
            steps,
        }
    }

    #[tokio::test]
    async fn test_status_only_changes_nothing() {
        let db = sqlite().await;
        let status = run(&db, &args(true, false, 1)).await.unwrap();
        assert!(status.applied.is_empty());
        assert_eq!(status.pending.len(), 8);
        assert!(status.render().starts_with("[pending] "));
    }

    #[tokio::test]
    async fn test_apply_then_roll_back() {
        let db = sqlite().await;
        let status = run(&db, &args(false, false, 1)).await.unwrap();
        assert_eq!(status.applied.len(), 8);
        assert!(status.pending.is_empty());

        let status = run(&db, &args(false, true, 2)).await.unwrap();
        assert_eq!(status.applied.len(), 6);
        assert_eq!(status.pending.len(), 2);
    }
}
