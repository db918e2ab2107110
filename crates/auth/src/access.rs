//! # Access Decision
//!
//! Every permission check in the service goes through this module. The
//! `can_*` functions are pure decisions over a principal's roles and its
//! membership role in the project at hand; [`AccessGate`] looks the
//! membership up and turns a denial into [`AppError::Forbidden`].
//!
//! | operation                  | granted when                                           |
//! |----------------------------|--------------------------------------------------------|
//! | view project               | administrator, or any membership                       |
//! | edit project / members     | administrator, or ProjectManager / TeamLead membership |
//! | create project             | project-manager tier                                   |
//! | delete project             | administrator, or ProjectManager membership            |
//! | create/update resource     | team-member tier                                       |
//! | delete resource            | creator, administrator, or PM / TL membership          |
//! | assign task                | project-manager tier                                   |
//! | administer users           | administrator                                          |

use entity::sea_orm_active_enums::ProjectRole;
use error::{AppError, Result};
use sea_orm::DatabaseConnection;
use tracing::debug;
use uuid::Uuid;

use crate::{membership, principal::Principal, roles::RoleSet};

pub fn can_view(roles: &RoleSet, membership: Option<ProjectRole>) -> bool {
    roles.is_administrator() || (roles.is_team_member_tier() && membership.is_some())
}

pub fn can_edit_project(roles: &RoleSet, membership: Option<ProjectRole>) -> bool {
    roles.is_administrator() || (roles.is_team_member_tier() && membership.is_some_and(ProjectRole::is_elevated))
}

pub fn can_create_project(roles: &RoleSet) -> bool { roles.is_project_manager_tier() }

pub fn can_delete_project(roles: &RoleSet, membership: Option<ProjectRole>) -> bool {
    roles.is_administrator() || (roles.is_team_member_tier() && membership == Some(ProjectRole::ProjectManager))
}

pub fn can_create_or_update_resource(roles: &RoleSet) -> bool { roles.is_team_member_tier() }

/// The creator may always delete their own resource.
pub fn can_delete_resource(
    principal_id: Uuid,
    roles: &RoleSet,
    creator_id: Uuid,
    membership: Option<ProjectRole>,
) -> bool {
    if !roles.is_team_member_tier() {
        return false;
    }
    creator_id == principal_id || roles.is_administrator() || membership.is_some_and(ProjectRole::is_elevated)
}

/// Global check; project membership plays no part.
pub fn can_assign_task(roles: &RoleSet) -> bool { roles.is_project_manager_tier() }

pub fn can_administer(roles: &RoleSet) -> bool { roles.is_administrator() }

/// Operation categories, used in denial messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    View,
    EditProject,
    CreateProject,
    DeleteProject,
    ModifyResource,
    DeleteResource,
    AssignTask,
    Administer,
}

impl Operation {
    fn denial(self) -> &'static str {
        match self {
            Operation::View => "You are not a member of this project",
            Operation::EditProject => "Only project managers and team leads can modify this project",
            Operation::CreateProject => "Only project managers can create projects",
            Operation::DeleteProject => "Only project managers can delete this project",
            Operation::ModifyResource => "Your role does not allow changes to project resources",
            Operation::DeleteResource => "Only the creator or a project manager or team lead can delete this resource",
            Operation::AssignTask => "Only project managers can assign tasks",
            Operation::Administer => "Administrator role required",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Operation::View => "view",
            Operation::EditProject => "edit_project",
            Operation::CreateProject => "create_project",
            Operation::DeleteProject => "delete_project",
            Operation::ModifyResource => "modify_resource",
            Operation::DeleteResource => "delete_resource",
            Operation::AssignTask => "assign_task",
            Operation::Administer => "administer",
        }
    }
}

fn decide(allowed: bool, principal: &Principal, project_id: Option<Uuid>, op: Operation) -> Result<()> {
    if allowed {
        return Ok(());
    }
    match project_id {
        Some(project_id) => {
            debug!(user_id = %principal.id, project_id = %project_id, operation = op.as_str(), "Access denied")
        },
        None => debug!(user_id = %principal.id, operation = op.as_str(), "Access denied"),
    }
    Err(AppError::forbidden(op.denial()))
}

/// Evaluates access decisions against live membership data.
///
/// Nothing is cached: every call re-reads the membership table.
#[derive(Clone, Debug)]
pub struct AccessGate {
    db: DatabaseConnection,
}

impl AccessGate {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
        }
    }

    /// Membership role of `principal`, skipping the lookup for
    /// administrators and inactive accounts whose decision does not
    /// depend on it.
    pub async fn membership(&self, principal: &Principal, project_id: Uuid) -> Result<Option<ProjectRole>> {
        let roles = principal.roles();
        if roles.is_administrator() || !roles.is_team_member_tier() {
            return Ok(None);
        }
        membership::find_role(&self.db, project_id, principal.id).await
    }

    pub async fn ensure_can_view(&self, principal: &Principal, project_id: Uuid) -> Result<()> {
        let membership = self.membership(principal, project_id).await?;
        decide(
            can_view(&principal.roles(), membership),
            principal,
            Some(project_id),
            Operation::View,
        )
    }

    pub async fn ensure_can_edit_project(&self, principal: &Principal, project_id: Uuid) -> Result<()> {
        let membership = self.membership(principal, project_id).await?;
        decide(
            can_edit_project(&principal.roles(), membership),
            principal,
            Some(project_id),
            Operation::EditProject,
        )
    }

    pub fn ensure_can_create_project(&self, principal: &Principal) -> Result<()> {
        decide(
            can_create_project(&principal.roles()),
            principal,
            None,
            Operation::CreateProject,
        )
    }

    pub async fn ensure_can_delete_project(&self, principal: &Principal, project_id: Uuid) -> Result<()> {
        let membership = self.membership(principal, project_id).await?;
        decide(
            can_delete_project(&principal.roles(), membership),
            principal,
            Some(project_id),
            Operation::DeleteProject,
        )
    }

    /// Creating or updating a resource of a project: the principal must
    /// see the project and hold a team-member tier role.
    pub async fn ensure_can_modify_resource(&self, principal: &Principal, project_id: Uuid) -> Result<()> {
        self.ensure_can_view(principal, project_id).await?;
        decide(
            can_create_or_update_resource(&principal.roles()),
            principal,
            Some(project_id),
            Operation::ModifyResource,
        )
    }

    /// Deleting a resource of a project: the principal must see the
    /// project and be the creator or hold an elevated role.
    pub async fn ensure_can_delete_resource(
        &self,
        principal: &Principal,
        project_id: Uuid,
        creator_id: Uuid,
    ) -> Result<()> {
        self.ensure_can_view(principal, project_id).await?;
        let roles = principal.roles();
        // Creators and administrators need no further lookup.
        let membership = if creator_id == principal.id {
            None
        }
        else {
            self.membership(principal, project_id).await?
        };
        decide(
            can_delete_resource(principal.id, &roles, creator_id, membership),
            principal,
            Some(project_id),
            Operation::DeleteResource,
        )
    }

    pub fn ensure_can_assign_task(&self, principal: &Principal) -> Result<()> {
        decide(
            can_assign_task(&principal.roles()),
            principal,
            None,
            Operation::AssignTask,
        )
    }

    pub fn ensure_administrator(&self, principal: &Principal) -> Result<()> {
        decide(
            can_administer(&principal.roles()),
            principal,
            None,
            Operation::Administer,
        )
    }
}
