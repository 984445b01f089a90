use serde::{Deserialize, Serialize};

use crate::client::Collection;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LibraryVariableSet {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub variable_set_id: Option<String>,
    #[serde(default)]
    pub space_id: Option<String>,
}

impl Collection for LibraryVariableSet {
    const PATH: &'static str = "libraryvariablesets";
}

impl LibraryVariableSet {
    pub const CONTENT_TYPES: [&'static str; 2] = ["ScriptModule", "Variables"];
}
