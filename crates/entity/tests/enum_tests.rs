//! Enum behaviour as seen from outside the crate.

use entity::sea_orm_active_enums::{GlobalRole, MilestoneStatus, ProjectRole, ProjectStatus, TaskPriority, TaskStatus};
use sea_orm::Iterable;

#[test]
fn test_display_uses_persisted_literal() {
    assert_eq!(GlobalRole::Administrator.to_string(), "ADMINISTRATOR");
    assert_eq!(ProjectRole::TeamLead.to_string(), "TEAM_LEAD");
    assert_eq!(ProjectStatus::OnHold.to_string(), "on_hold");
    assert_eq!(TaskStatus::Done.to_string(), "done");
    assert_eq!(TaskPriority::Critical.to_string(), "critical");
    assert_eq!(MilestoneStatus::Open.to_string(), "open");
}

#[test]
fn test_display_parse_agree() {
    for role in GlobalRole::iter() {
        assert_eq!(role.to_string().parse::<GlobalRole>(), Ok(role));
    }
    for role in ProjectRole::iter() {
        assert_eq!(role.to_string().parse::<ProjectRole>(), Ok(role));
    }
}

#[test]
fn test_role_sets_are_closed() {
    assert_eq!(GlobalRole::iter().count(), 5);
    assert_eq!(ProjectRole::iter().count(), 4);
    assert!("OWNER".parse::<ProjectRole>().is_err());
    assert!("ADMINISTRATOR".parse::<ProjectRole>().is_err());
}

#[test]
fn test_only_done_is_terminal() {
    let terminal: Vec<_> = TaskStatus::iter().filter(|s| s.is_done()).collect();
    assert_eq!(terminal, vec![TaskStatus::Done]);
}

#[test]
fn test_deserialize_rejects_unknown() {
    assert!(serde_json::from_str::<ProjectRole>("\"OWNER\"").is_err());
    assert_eq!(
        serde_json::from_str::<ProjectRole>("\"PROJECT_MANAGER\"").unwrap(),
        ProjectRole::ProjectManager
    );
}
