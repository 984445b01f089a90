use serde::{Deserialize, Serialize};

use super::SensitiveValue;
use crate::client::Collection;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GitCredential {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    pub details: GitCredentialDetails,
}

/// Git credentials are username/password pairs; the server tags them with `Type`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "Type")]
pub enum GitCredentialDetails {
    UsernamePassword {
        #[serde(rename = "Username")]
        username: String,
        #[serde(rename = "Password", default)]
        password: SensitiveValue,
    },
}

impl Default for GitCredentialDetails {
    fn default() -> Self {
        GitCredentialDetails::UsernamePassword {
            username: String::new(),
            password: SensitiveValue::default(),
        }
    }
}

impl Collection for GitCredential {
    const PATH: &'static str = "git-credentials";
}
