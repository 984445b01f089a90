use serde::{Deserialize, Serialize};

use super::nullable;
use crate::client::Collection;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
}

impl Collection for ProjectGroup {
    const PATH: &'static str = "projectgroups";
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub lifecycle_id: String,
    pub project_group_id: String,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub auto_create_release: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_guided_failure_mode: Option<String>,
    #[serde(default)]
    pub default_to_skip_if_already_installed: bool,
    #[serde(default, rename = "DiscreteChannelRelease")]
    pub is_discrete_channel_release: bool,
    #[serde(default)]
    pub is_version_controlled: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub included_library_variable_set_ids: Vec<String>,
    #[serde(default, rename = "TenantedDeploymentMode", skip_serializing_if = "Option::is_none")]
    pub tenanted_deployment_participation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_process_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_set_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloned_from_project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
}

impl Collection for Project {
    const PATH: &'static str = "projects";
}
