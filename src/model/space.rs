use serde::{Deserialize, Serialize};

use super::nullable;
use crate::client::Collection;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Space {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub task_queue_stopped: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub space_managers_teams: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub space_managers_team_members: Vec<String>,
}

impl Collection for Space {
    const PATH: &'static str = "spaces";
    const SPACE_SCOPED: bool = false;
}
