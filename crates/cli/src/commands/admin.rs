//! # CLI Admin Command
//!
//! Bootstraps administrator accounts. Self-registration only ever creates
//! developers, so the first administrator comes from here.

use auth::{
    hash_password,
    normalize_login,
    secrecy::{ExposeSecret, SecretString},
    validate_password_strength,
    PasswordConfig,
};
use chrono::Utc;
use entity::{sea_orm_active_enums::GlobalRole, users};
use error::{AppError, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter, Set};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOutcome {
    Created(Uuid),
    /// An existing account was promoted and reactivated
    Promoted(Uuid),
    Unchanged(Uuid),
}

/// Create an administrator, or promote the account that holds `email`.
pub async fn create_admin(
    db: &DatabaseConnection,
    email: &str,
    full_name: &str,
    password: SecretString,
    password_config: Option<PasswordConfig>,
) -> Result<AdminOutcome> {
    let email = normalize_login(email);
    if email.is_empty() {
        return Err(AppError::validation("Email must not be empty"));
    }

    let existing = users::Entity::find()
        .filter(users::Column::Email.eq(&email))
        .one(db)
        .await?;
    if let Some(user) = existing {
        if user.role == GlobalRole::Administrator && user.is_active {
            return Ok(AdminOutcome::Unchanged(user.id));
        }
        let id = user.id;
        let mut active = user.into_active_model();
        active.role = Set(GlobalRole::Administrator);
        active.is_active = Set(true);
        active.updated_at = Set(Utc::now());
        active.update(db).await?;
        info!(target: "admin", user_id = %id, "Account promoted to administrator");
        return Ok(AdminOutcome::Promoted(id));
    }

    validate_password_strength(password.expose_secret()).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        AppError::validation(messages.join(", "))
    })?;
    let password_hash = hash_password(&password, password_config)?;
    let now = Utc::now();
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        full_name: Set(full_name.trim().to_string()),
        password_hash: Set(password_hash.expose_secret().to_string()),
        role: Set(GlobalRole::Administrator),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(target: "admin", user_id = %user.id, "Administrator created");
    Ok(AdminOutcome::Created(user.id))
}

#[cfg(test)]
mod tests {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    use super::*;

    async fn test_db() -> DatabaseConnection {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    fn secret(s: &str) -> SecretString { SecretString::from(s.to_string()) }

    fn fast() -> Option<PasswordConfig> { Some(PasswordConfig::insecure_fast()) }

    #[tokio::test]
    async fn test_create_then_unchanged() {
        let db = test_db().await;
        let outcome = create_admin(&db, " Root@Example.com", "Root", secret("bootstrap-pass-1"), fast())
            .await
            .unwrap();
        let AdminOutcome::Created(id) = outcome
        else {
            panic!("expected a new account, got {outcome:?}");
        };
        let user = users::Entity::find_by_id(id).one(&db).await.unwrap().unwrap();
        assert_eq!(user.email, "root@example.com");
        assert_eq!(user.role, GlobalRole::Administrator);

        let again = create_admin(&db, "root@example.com", "Root", secret("ignored-pass-2"), fast())
            .await
            .unwrap();
        assert_eq!(again, AdminOutcome::Unchanged(id));
    }

    #[tokio::test]
    async fn test_promotes_existing_account() {
        let db = test_db().await;
        let now = Utc::now();
        let dev = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set("dev@example.com".to_string()),
            full_name: Set("Dev".to_string()),
            password_hash: Set("unused".to_string()),
            role: Set(GlobalRole::Developer),
            is_active: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await
        .unwrap();

        let outcome = create_admin(&db, "dev@example.com", "Dev", secret("whatever"), fast())
            .await
            .unwrap();
        assert_eq!(outcome, AdminOutcome::Promoted(dev.id));
        let user = users::Entity::find_by_id(dev.id).one(&db).await.unwrap().unwrap();
        assert_eq!(user.role, GlobalRole::Administrator);
        assert!(user.is_active);
        assert_eq!(user.password_hash, "unused");
    }

    #[tokio::test]
    async fn test_weak_password_is_rejected() {
        let db = test_db().await;
        let err = create_admin(&db, "root@example.com", "Root", secret("short"), fast())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert!(users::Entity::find().one(&db).await.unwrap().is_none());
    }
}
