use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{nullable, SensitiveValue};
use crate::client::Collection;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Certificate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub certificate_data: SensitiveValue,
    #[serde(default)]
    pub password: SensitiveValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_data_format: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub environment_ids: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tenant_ids: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tenant_tags: Vec<String>,
    #[serde(default, rename = "TenantedDeploymentParticipation", skip_serializing_if = "Option::is_none")]
    pub tenanted_deployment_participation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_common_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_common_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_after: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub has_private_key: bool,
    #[serde(default)]
    pub self_signed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub version: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
}

impl Collection for Certificate {
    const PATH: &'static str = "certificates";
}

impl Certificate {
    pub const DATA_FORMATS: [&'static str; 4] = ["Der", "Pem", "Pkcs12", "Unknown"];
}
