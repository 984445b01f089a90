//! Octopus Deploy resources as they appear on the REST API.
use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Deserializer, Serialize};

pub mod account;
pub mod certificate;
pub mod channel;
pub mod environment;
pub mod feed;
pub mod git_credential;
pub mod library_variable_set;
pub mod lifecycle;
pub mod machine_policy;
pub mod project;
pub mod space;
pub mod tag_set;
pub mod team;
pub mod tenant;
pub mod trigger;
pub mod user;
pub mod worker;
pub mod worker_pool;

/// A write-only secret. The server only reports whether a value is set.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SensitiveValue {
    #[serde(default)]
    pub has_value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
}

impl SensitiveValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            has_value: true,
            new_value: Some(value.into()),
        }
    }

    /// A value to send only when a secret was configured.
    pub fn from_option(value: Option<String>) -> Self {
        value.map(Self::new).unwrap_or_default()
    }
}

impl Debug for SensitiveValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensitiveValue")
            .field("has_value", &self.has_value)
            .finish_non_exhaustive()
    }
}

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Some numeric settings are stored as strings by older servers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(value)) => Some(value),
        Some(serde_json::Value::Number(value)) => Some(value.to_string()),
        _ => None,
    })
}
