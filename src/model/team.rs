use serde::{Deserialize, Serialize};

use super::nullable;
use crate::client::Collection;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ExternalSecurityGroup {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub display_id_and_name: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Team {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub member_user_ids: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub external_security_groups: Vec<ExternalSecurityGroup>,
    #[serde(default)]
    pub can_be_deleted: bool,
    #[serde(default)]
    pub can_be_renamed: bool,
    #[serde(default)]
    pub can_change_members: bool,
    #[serde(default)]
    pub can_change_roles: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
}

impl Collection for Team {
    const PATH: &'static str = "teams";
}

/// A user role granted to a team, optionally limited to environments, projects,
/// project groups or tenants. System roles have no space.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ScopedUserRole {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub team_id: String,
    pub user_role_id: String,
    #[serde(default)]
    pub space_id: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub environment_ids: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub project_ids: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub project_group_ids: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tenant_ids: Vec<String>,
}

impl Collection for ScopedUserRole {
    const PATH: &'static str = "scopeduserroles";
    const SPACE_SCOPED: bool = false;
}

fn sorted(ids: &[String]) -> Vec<&str> {
    let mut ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

impl ScopedUserRole {
    /// Same role with the same scope. IDs and the owning team are ignored.
    pub fn same_grant(&self, other: &ScopedUserRole) -> bool {
        self.user_role_id == other.user_role_id
            && self.space_id.as_deref().unwrap_or_default() == other.space_id.as_deref().unwrap_or_default()
            && sorted(&self.environment_ids) == sorted(&other.environment_ids)
            && sorted(&self.project_ids) == sorted(&other.project_ids)
            && sorted(&self.project_group_ids) == sorted(&other.project_group_ids)
            && sorted(&self.tenant_ids) == sorted(&other.tenant_ids)
    }
}
