use serde::{Deserialize, Serialize};

use super::nullable;
use crate::client::Collection;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RetentionPeriod {
    pub unit: String,
    pub quantity_to_keep: i64,
    #[serde(default)]
    pub should_keep_forever: bool,
}

impl Default for RetentionPeriod {
    /// What the server applies when a lifecycle has no policy of its own.
    fn default() -> Self {
        Self {
            unit: RetentionPeriod::DAYS.to_string(),
            quantity_to_keep: 30,
            should_keep_forever: false,
        }
    }
}

impl RetentionPeriod {
    pub const DAYS: &'static str = "Days";
    pub const ITEMS: &'static str = "Items";
    pub const UNITS: [&'static str; 2] = [Self::DAYS, Self::ITEMS];
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Phase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub automatic_deployment_targets: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub optional_deployment_targets: Vec<String>,
    #[serde(default)]
    pub minimum_environments_before_promotion: i64,
    #[serde(default)]
    pub is_optional_phase: bool,
    #[serde(default)]
    pub release_retention_policy: Option<RetentionPeriod>,
    #[serde(default)]
    pub tentacle_retention_policy: Option<RetentionPeriod>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Lifecycle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub release_retention_policy: RetentionPeriod,
    #[serde(default)]
    pub tentacle_retention_policy: RetentionPeriod,
}

impl Collection for Lifecycle {
    const PATH: &'static str = "lifecycles";
}
