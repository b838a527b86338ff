use serde::{Deserialize, Serialize};

use crate::ids::{DepartmentId, MemberId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
    Owner,
    Admin,
    RegionalManager,
    StoreManager,
    Manager,
    Evaluator,
    Member,
    #[serde(other)]
    Other,
}

impl OrgRole {
    /// Roles that may be put in charge of a region.
    pub const MANAGER_ROLES: [OrgRole; 5] = [
        OrgRole::Owner,
        OrgRole::Admin,
        OrgRole::RegionalManager,
        OrgRole::StoreManager,
        OrgRole::Manager,
    ];

    #[must_use]
    pub fn can_manage_region(self) -> bool {
        Self::MANAGER_ROLES.contains(&self)
    }
}

impl std::fmt::Display for OrgRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrgRole::Owner => "owner",
            OrgRole::Admin => "admin",
            OrgRole::RegionalManager => "regional_manager",
            OrgRole::StoreManager => "store_manager",
            OrgRole::Manager => "manager",
            OrgRole::Evaluator => "evaluator",
            OrgRole::Member => "member",
            OrgRole::Other => "other",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberUser {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Organization membership: a user plus their role in the org.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub user: MemberUser,
    pub role: OrgRole,
}

impl Member {
    /// Full name, falling back to the email when no name is on file.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.user.first_name.trim(), self.user.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.user.email.clone()
        } else {
            full.to_owned()
        }
    }
}

/// Members whose role allows them to manage a region, in input order.
#[must_use]
pub fn eligible_managers(members: &[Member]) -> Vec<&Member> {
    members
        .iter()
        .filter(|m| m.role.can_manage_region())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Departments that can be attached to a store.
#[must_use]
pub fn active_departments(departments: &[Department]) -> Vec<&Department> {
    departments.iter().filter(|d| d.is_active).collect()
}
