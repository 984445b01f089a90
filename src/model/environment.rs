use serde::{Deserialize, Serialize};

use crate::client::Collection;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Environment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub allow_dynamic_infrastructure: bool,
    #[serde(default)]
    pub use_guided_failure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
}

impl Collection for Environment {
    const PATH: &'static str = "environments";
}
