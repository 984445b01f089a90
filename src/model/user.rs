use serde::{Deserialize, Serialize};

use super::nullable;
use crate::client::Collection;

/// Users live outside spaces. The provider only reads them.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_service: bool,
    #[serde(default)]
    pub can_password_be_edited: bool,
}

impl Collection for User {
    const PATH: &'static str = "users";
    const SPACE_SCOPED: bool = false;
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct UserRole {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub can_be_deleted: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub granted_space_permissions: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub granted_system_permissions: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub supported_restrictions: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub space_permission_descriptions: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub system_permission_descriptions: Vec<String>,
}

impl Collection for UserRole {
    const PATH: &'static str = "userroles";
    const SPACE_SCOPED: bool = false;
}
