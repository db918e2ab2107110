//! # Role Classifier
//!
//! Maps granted-authority tags onto the closed set of global roles and
//! answers the coarse tier questions every access decision starts from.

use entity::sea_orm_active_enums::GlobalRole;
use sea_orm::Iterable;

/// The set of recognized global roles a principal holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleSet {
    bits: u8,
}

fn bit(role: GlobalRole) -> u8 {
    match role {
        GlobalRole::Administrator => 1,
        GlobalRole::ProjectManager => 1 << 1,
        GlobalRole::TeamLead => 1 << 2,
        GlobalRole::Developer => 1 << 3,
        GlobalRole::Qa => 1 << 4,
    }
}

/// Normalize a tag to `ROLE_<UPPER>` form.
pub fn normalize_tag(tag: &str) -> String {
    let upper = tag.trim().to_ascii_uppercase();
    if upper.starts_with(GlobalRole::TAG_PREFIX) {
        upper
    }
    else {
        format!("{}{}", GlobalRole::TAG_PREFIX, upper)
    }
}

impl RoleSet {
    /// A set with no roles; fails every tier predicate.
    #[inline]
    pub const fn empty() -> Self { Self { bits: 0 } }

    #[inline]
    pub fn single(role: GlobalRole) -> Self { Self { bits: bit(role) } }

    /// Build from granted-authority tags.
    ///
    /// Tags are normalized to the `ROLE_` form and matched exactly; unknown
    /// tags are ignored, never prefix-matched.
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::empty();
        for tag in tags {
            let tag = normalize_tag(tag.as_ref());
            if let Some(role) = GlobalRole::iter().find(|r| r.tag() == tag) {
                set.insert(role);
            }
        }
        set
    }

    #[inline]
    pub fn insert(&mut self, role: GlobalRole) { self.bits |= bit(role); }

    #[inline]
    pub fn contains(&self, role: GlobalRole) -> bool { self.bits & bit(role) != 0 }

    #[inline]
    pub fn is_empty(&self) -> bool { self.bits == 0 }

    pub fn iter(&self) -> impl Iterator<Item = GlobalRole> + '_ { GlobalRole::iter().filter(|r| self.contains(*r)) }

    /// Tags for every held role, e.g. for token claims.
    pub fn tags(&self) -> Vec<String> { self.iter().map(GlobalRole::tag).collect() }

    pub fn is_administrator(&self) -> bool { self.contains(GlobalRole::Administrator) }

    /// Administrator or ProjectManager.
    pub fn is_project_manager_tier(&self) -> bool {
        self.contains(GlobalRole::Administrator) || self.contains(GlobalRole::ProjectManager)
    }

    /// Any recognized role.
    pub fn is_team_member_tier(&self) -> bool { !self.is_empty() }
}

impl From<GlobalRole> for RoleSet {
    fn from(role: GlobalRole) -> Self { Self::single(role) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("team_lead"), "ROLE_TEAM_LEAD");
        assert_eq!(normalize_tag(" role_qa "), "ROLE_QA");
        assert_eq!(normalize_tag("ROLE_ADMINISTRATOR"), "ROLE_ADMINISTRATOR");
    }

    #[test]
    fn test_from_tags_exact_match_only() {
        let set = RoleSet::from_tags(["ROLE_ADMIN", "ROLE_ADMINISTRATORS", "ROLE_PROJECT"]);
        assert!(set.is_empty());

        let set = RoleSet::from_tags(["role_developer", "ROLE_UNKNOWN"]);
        assert!(set.contains(GlobalRole::Developer));
        assert_eq!(set.iter().count(), 1);
    }

    #[test]
    fn test_tiers_per_role() {
        let admin = RoleSet::single(GlobalRole::Administrator);
        assert!(admin.is_administrator());
        assert!(admin.is_project_manager_tier());
        assert!(admin.is_team_member_tier());

        let pm = RoleSet::single(GlobalRole::ProjectManager);
        assert!(!pm.is_administrator());
        assert!(pm.is_project_manager_tier());
        assert!(pm.is_team_member_tier());

        for role in [GlobalRole::TeamLead, GlobalRole::Developer, GlobalRole::Qa] {
            let set = RoleSet::single(role);
            assert!(!set.is_administrator());
            assert!(!set.is_project_manager_tier());
            assert!(set.is_team_member_tier());
        }
    }

    #[test]
    fn test_empty_set_fails_everything() {
        let set = RoleSet::empty();
        assert!(!set.is_administrator());
        assert!(!set.is_project_manager_tier());
        assert!(!set.is_team_member_tier());
    }

    #[test]
    fn test_tags_round_trip_through_classifier() {
        let mut set = RoleSet::single(GlobalRole::Qa);
        set.insert(GlobalRole::TeamLead);
        assert_eq!(RoleSet::from_tags(set.tags()), set);
    }
}
