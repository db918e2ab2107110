//! # Membership Lookup
//!
//! Reads and writes `project_members`. Lookups never special-case global
//! roles; the administrator bypass belongs to the caller.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use entity::{project_members, sea_orm_active_enums::ProjectRole, users};
use error::{AppError, Result};
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    EntityTrait,
    IntoActiveModel,
    QueryFilter,
    QueryOrder,
    QuerySelect,
    Set,
};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

/// Role of `user_id` in `project_id`, if any.
pub async fn find_role<C: ConnectionTrait>(db: &C, project_id: Uuid, user_id: Uuid) -> Result<Option<ProjectRole>> {
    let role = project_members::Entity::find()
        .select_only()
        .column(project_members::Column::Role)
        .filter(project_members::Column::ProjectId.eq(project_id))
        .filter(project_members::Column::UserId.eq(user_id))
        .into_tuple::<ProjectRole>()
        .one(db)
        .await?;
    Ok(role)
}

/// Whether `user_id` belongs to `project_id` under any role.
pub async fn has_membership<C: ConnectionTrait>(db: &C, project_id: Uuid, user_id: Uuid) -> Result<bool> {
    Ok(find_role(db, project_id, user_id).await?.is_some())
}

/// Ids of every project `user_id` is a member of.
pub async fn project_ids_for_user<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<Vec<Uuid>> {
    let ids = project_members::Entity::find()
        .select_only()
        .column(project_members::Column::ProjectId)
        .filter(project_members::Column::UserId.eq(user_id))
        .into_tuple::<Uuid>()
        .all(db)
        .await?;
    Ok(ids)
}

/// Members of a project with their accounts, oldest first.
pub async fn list_members<C: ConnectionTrait>(
    db: &C,
    project_id: Uuid,
) -> Result<Vec<(project_members::Model, Option<users::Model>)>> {
    let rows = project_members::Entity::find()
        .filter(project_members::Column::ProjectId.eq(project_id))
        .order_by_asc(project_members::Column::JoinedAt)
        .find_also_related(users::Entity)
        .all(db)
        .await?;
    Ok(rows)
}

async fn find_member<C: ConnectionTrait>(
    db: &C,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<Option<project_members::Model>> {
    let member = project_members::Entity::find()
        .filter(project_members::Column::ProjectId.eq(project_id))
        .filter(project_members::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    Ok(member)
}

async fn insert_member<C: ConnectionTrait>(
    db: &C,
    project_id: Uuid,
    user_id: Uuid,
    role: ProjectRole,
) -> Result<project_members::Model> {
    let member = project_members::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(project_id),
        user_id: Set(user_id),
        role: Set(role),
        joined_at: Set(Utc::now()),
    };
    // A concurrent insert of the same pair trips the unique index and
    // surfaces as Conflict through the DbErr conversion.
    Ok(member.insert(db).await?)
}

/// Add a membership.
///
/// # Errors
///
/// `Conflict` when the pair already exists; the existing row is untouched.
pub async fn add_member<C: ConnectionTrait>(
    db: &C,
    project_id: Uuid,
    user_id: Uuid,
    role: ProjectRole,
) -> Result<project_members::Model> {
    if find_member(db, project_id, user_id).await?.is_some() {
        return Err(AppError::conflict("User is already a member of this project"));
    }
    let member = insert_member(db, project_id, user_id, role).await?;
    info!(project_id = %project_id, user_id = %user_id, role = %role, "Project member added");
    Ok(member)
}

/// Change the role of an existing membership.
pub async fn update_member_role<C: ConnectionTrait>(
    db: &C,
    project_id: Uuid,
    user_id: Uuid,
    role: ProjectRole,
) -> Result<project_members::Model> {
    let member = find_member(db, project_id, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project member not found"))?;
    if member.role == role {
        return Ok(member);
    }
    let mut active = member.into_active_model();
    active.role = Set(role);
    let member = active.update(db).await?;
    info!(project_id = %project_id, user_id = %user_id, role = %role, "Project member role updated");
    Ok(member)
}

/// Remove a membership.
pub async fn remove_member<C: ConnectionTrait>(db: &C, project_id: Uuid, user_id: Uuid) -> Result<()> {
    let result = project_members::Entity::delete_many()
        .filter(project_members::Column::ProjectId.eq(project_id))
        .filter(project_members::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Project member not found"));
    }
    info!(project_id = %project_id, user_id = %user_id, "Project member removed");
    Ok(())
}

/// Row counts produced by [`reconcile_members`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub created: u64,
    pub updated: u64,
    pub removed: u64,
}

impl ReconcileOutcome {
    #[inline]
    pub fn is_noop(&self) -> bool { self.created == 0 && self.updated == 0 && self.removed == 0 }
}

/// Reject a member list naming the same user twice.
pub fn check_distinct_members(desired: &[(Uuid, ProjectRole)]) -> Result<()> {
    let mut seen = HashSet::with_capacity(desired.len());
    for (user_id, _) in desired {
        if !seen.insert(*user_id) {
            return Err(AppError::validation(format!("User {user_id} is listed more than once")));
        }
    }
    Ok(())
}

/// Make the memberships of `project_id` equal to `desired`.
///
/// Members missing from `desired` are removed, listed members get their
/// role updated or are inserted. Rows already matching are not written, so
/// applying the same list twice changes nothing the second time. Run it
/// inside a transaction.
pub async fn reconcile_members<C: ConnectionTrait>(
    db: &C,
    project_id: Uuid,
    desired: &[(Uuid, ProjectRole)],
) -> Result<ReconcileOutcome> {
    check_distinct_members(desired)?;

    let existing: HashMap<Uuid, project_members::Model> = project_members::Entity::find()
        .filter(project_members::Column::ProjectId.eq(project_id))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.user_id, m))
        .collect();
    let wanted: HashMap<Uuid, ProjectRole> = desired.iter().copied().collect();

    let mut outcome = ReconcileOutcome::default();

    let stale: Vec<Uuid> = existing
        .values()
        .filter(|m| !wanted.contains_key(&m.user_id))
        .map(|m| m.id)
        .collect();
    if !stale.is_empty() {
        outcome.removed = project_members::Entity::delete_many()
            .filter(project_members::Column::Id.is_in(stale))
            .exec(db)
            .await?
            .rows_affected;
    }

    for (user_id, role) in desired {
        match existing.get(user_id) {
            Some(member) if member.role == *role => {},
            Some(member) => {
                let mut active = member.clone().into_active_model();
                active.role = Set(*role);
                active.update(db).await?;
                outcome.updated += 1;
            },
            None => {
                insert_member(db, project_id, *user_id, *role).await?;
                outcome.created += 1;
            },
        }
    }

    if outcome.is_noop() {
        debug!(project_id = %project_id, "Member list unchanged");
    }
    else {
        info!(
            project_id = %project_id,
            created = outcome.created,
            updated = outcome.updated,
            removed = outcome.removed,
            "Project members reconciled"
        );
    }
    Ok(outcome)
}

/// Initial member list for a new project.
///
/// The creator always comes first as ProjectManager; any entry naming the
/// creator in `submitted` is dropped so exactly one membership results.
pub fn initial_members(creator_id: Uuid, submitted: &[(Uuid, ProjectRole)]) -> Vec<(Uuid, ProjectRole)> {
    let mut members = vec![(creator_id, ProjectRole::ProjectManager)];
    members.extend(
        submitted
            .iter()
            .copied()
            .filter(|(user_id, _)| *user_id != creator_id),
    );
    members
}
