//! Access gate and membership store against a migrated in-memory database.

use auth::{
    access::AccessGate,
    membership::{self, ReconcileOutcome},
    resolve_principal,
    Principal,
};
use chrono::Utc;
use entity::{
    project_members,
    projects,
    sea_orm_active_enums::{GlobalRole, ProjectRole, ProjectStatus},
    users,
};
use error::AppError;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    ConnectOptions,
    Database,
    DatabaseConnection,
    EntityTrait,
    PaginatorTrait,
    QueryFilter,
    Set,
};
use uuid::Uuid;

async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

async fn create_user(db: &DatabaseConnection, email: &str, role: GlobalRole) -> Principal {
    let now = Utc::now();
    users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        full_name: Set(email.to_string()),
        password_hash: Set("unused".to_string()),
        role: Set(role),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
    .into()
}

async fn create_project(db: &DatabaseConnection, name: &str, creator: &Principal) -> Uuid {
    let now = Utc::now();
    let project = projects::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        status: Set(ProjectStatus::Active),
        start_date: Set(None),
        end_date: Set(None),
        created_by: Set(creator.id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap();
    membership::add_member(db, project.id, creator.id, ProjectRole::ProjectManager)
        .await
        .unwrap();
    project.id
}

async fn member_count(db: &DatabaseConnection, project_id: Uuid) -> u64 {
    project_members::Entity::find()
        .filter(project_members::Column::ProjectId.eq(project_id))
        .count(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn administrator_can_edit_any_project() {
    let db = test_db().await;
    let pm = create_user(&db, "pm@example.com", GlobalRole::ProjectManager).await;
    let admin = create_user(&db, "admin@example.com", GlobalRole::Administrator).await;
    let project = create_project(&db, "Apollo", &pm).await;
    let gate = AccessGate::new(db.clone());

    gate.ensure_can_view(&admin, project).await.unwrap();
    gate.ensure_can_edit_project(&admin, project).await.unwrap();
    gate.ensure_can_delete_project(&admin, project).await.unwrap();
}

#[tokio::test]
async fn non_member_cannot_view() {
    let db = test_db().await;
    let pm = create_user(&db, "pm@example.com", GlobalRole::ProjectManager).await;
    let other_pm = create_user(&db, "pm2@example.com", GlobalRole::ProjectManager).await;
    let project = create_project(&db, "Apollo", &pm).await;
    let gate = AccessGate::new(db.clone());

    let err = gate.ensure_can_view(&other_pm, project).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));
    gate.ensure_can_view(&pm, project).await.unwrap();
}

#[tokio::test]
async fn developer_gains_edit_after_team_lead_membership() {
    let db = test_db().await;
    let pm = create_user(&db, "pm@example.com", GlobalRole::ProjectManager).await;
    let dev = create_user(&db, "dev@example.com", GlobalRole::Developer).await;
    let project = create_project(&db, "Project 42", &pm).await;
    let gate = AccessGate::new(db.clone());

    let err = gate.ensure_can_edit_project(&dev, project).await.unwrap_err();
    assert_eq!(err.status().as_u16(), 403);

    membership::add_member(&db, project, dev.id, ProjectRole::TeamLead)
        .await
        .unwrap();
    gate.ensure_can_edit_project(&dev, project).await.unwrap();
}

#[tokio::test]
async fn duplicate_membership_is_conflict_and_row_unchanged() {
    let db = test_db().await;
    let pm = create_user(&db, "pm@example.com", GlobalRole::ProjectManager).await;
    let qa = create_user(&db, "qa@example.com", GlobalRole::Qa).await;
    let project = create_project(&db, "Apollo", &pm).await;

    let first = membership::add_member(&db, project, qa.id, ProjectRole::Qa)
        .await
        .unwrap();
    let err = membership::add_member(&db, project, qa.id, ProjectRole::TeamLead)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));

    let row = project_members::Entity::find_by_id(first.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row, first);
    assert_eq!(member_count(&db, project).await, 2);
}

#[tokio::test]
async fn unique_index_rejects_raw_duplicate_insert() {
    let db = test_db().await;
    let pm = create_user(&db, "pm@example.com", GlobalRole::ProjectManager).await;
    let project = create_project(&db, "Apollo", &pm).await;

    // Bypass the pre-check to hit the index directly, as a racing insert would.
    let err: AppError = project_members::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(project),
        user_id: Set(pm.id),
        role: Set(ProjectRole::Developer),
        joined_at: Set(Utc::now()),
    }
    .insert(&db)
    .await
    .unwrap_err()
    .into();
    assert!(matches!(err, AppError::Conflict { .. }), "got {err:?}");
}

#[tokio::test]
async fn reconcile_is_idempotent() {
    let db = test_db().await;
    let pm = create_user(&db, "pm@example.com", GlobalRole::ProjectManager).await;
    let dev = create_user(&db, "dev@example.com", GlobalRole::Developer).await;
    let qa = create_user(&db, "qa@example.com", GlobalRole::Qa).await;
    let lead = create_user(&db, "lead@example.com", GlobalRole::TeamLead).await;
    let project = create_project(&db, "Apollo", &pm).await;
    membership::add_member(&db, project, dev.id, ProjectRole::Developer)
        .await
        .unwrap();
    membership::add_member(&db, project, qa.id, ProjectRole::Qa)
        .await
        .unwrap();

    let desired = vec![
        (pm.id, ProjectRole::ProjectManager),
        (dev.id, ProjectRole::TeamLead),
        (lead.id, ProjectRole::TeamLead),
    ];
    let first = membership::reconcile_members(&db, project, &desired).await.unwrap();
    assert_eq!(first, ReconcileOutcome {
        created: 1,
        updated: 1,
        removed: 1,
    });

    let second = membership::reconcile_members(&db, project, &desired).await.unwrap();
    assert!(second.is_noop());

    assert_eq!(member_count(&db, project).await, 3);
    assert_eq!(
        membership::find_role(&db, project, dev.id).await.unwrap(),
        Some(ProjectRole::TeamLead)
    );
    assert_eq!(membership::find_role(&db, project, qa.id).await.unwrap(), None);
}

#[tokio::test]
async fn reconcile_rejects_duplicates_before_writing() {
    let db = test_db().await;
    let pm = create_user(&db, "pm@example.com", GlobalRole::ProjectManager).await;
    let dev = create_user(&db, "dev@example.com", GlobalRole::Developer).await;
    let project = create_project(&db, "Apollo", &pm).await;

    let err = membership::reconcile_members(&db, project, &[
        (dev.id, ProjectRole::Developer),
        (dev.id, ProjectRole::Qa),
    ])
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
    assert_eq!(member_count(&db, project).await, 1);
}

#[tokio::test]
async fn deleting_project_cascades_memberships() {
    let db = test_db().await;
    let pm = create_user(&db, "pm@example.com", GlobalRole::ProjectManager).await;
    let dev = create_user(&db, "dev@example.com", GlobalRole::Developer).await;
    let project = create_project(&db, "Apollo", &pm).await;
    membership::add_member(&db, project, dev.id, ProjectRole::Developer)
        .await
        .unwrap();

    projects::Entity::delete_by_id(project).exec(&db).await.unwrap();
    assert_eq!(member_count(&db, project).await, 0);
}

#[tokio::test]
async fn creator_can_delete_own_resource_without_elevation() {
    let db = test_db().await;
    let pm = create_user(&db, "pm@example.com", GlobalRole::ProjectManager).await;
    let dev = create_user(&db, "dev@example.com", GlobalRole::Developer).await;
    let other = create_user(&db, "other@example.com", GlobalRole::Developer).await;
    let project = create_project(&db, "Apollo", &pm).await;
    membership::add_member(&db, project, dev.id, ProjectRole::Developer)
        .await
        .unwrap();
    membership::add_member(&db, project, other.id, ProjectRole::Developer)
        .await
        .unwrap();
    let gate = AccessGate::new(db.clone());

    gate.ensure_can_delete_resource(&dev, project, dev.id).await.unwrap();
    let err = gate
        .ensure_can_delete_resource(&other, project, dev.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));
    gate.ensure_can_delete_resource(&pm, project, dev.id).await.unwrap();
}

#[tokio::test]
async fn removed_creator_cannot_delete_own_resource() {
    let db = test_db().await;
    let pm = create_user(&db, "pm@example.com", GlobalRole::ProjectManager).await;
    let dev = create_user(&db, "dev@example.com", GlobalRole::Developer).await;
    let admin = create_user(&db, "admin@example.com", GlobalRole::Administrator).await;
    let project = create_project(&db, "Apollo", &pm).await;
    membership::add_member(&db, project, dev.id, ProjectRole::Developer)
        .await
        .unwrap();
    membership::remove_member(&db, project, dev.id).await.unwrap();
    let gate = AccessGate::new(db.clone());

    let err = gate
        .ensure_can_delete_resource(&dev, project, dev.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));
    gate.ensure_can_delete_resource(&admin, project, dev.id).await.unwrap();
}

#[tokio::test]
async fn deactivated_principal_is_rejected() {
    let db = test_db().await;
    let dev = create_user(&db, "dev@example.com", GlobalRole::Developer).await;

    let resolved = resolve_principal(&db, " DEV@Example.com ").await.unwrap();
    assert_eq!(resolved.id, dev.id);

    let mut active: users::ActiveModel = users::Entity::find_by_id(dev.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap()
        .into();
    active.is_active = Set(false);
    active.update(&db).await.unwrap();

    let err = resolve_principal(&db, "dev@example.com").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized { .. }));
    let err = resolve_principal(&db, "nobody@example.com").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized { .. }));
}

#[tokio::test]
async fn assign_is_global_pm_tier() {
    let db = test_db().await;
    let pm = create_user(&db, "pm@example.com", GlobalRole::ProjectManager).await;
    let lead = create_user(&db, "lead@example.com", GlobalRole::TeamLead).await;
    let gate = AccessGate::new(db.clone());

    gate.ensure_can_assign_task(&pm).unwrap();
    assert!(gate.ensure_can_assign_task(&lead).is_err());
    assert!(gate.ensure_can_create_project(&lead).is_err());
    assert!(gate.ensure_administrator(&pm).is_err());
}
