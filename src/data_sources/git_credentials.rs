use serde::{Deserialize, Serialize};
use tf_provider::schema::AttributeType;

use super::{Listing, QueryFields};
use crate::framework::schema;
use crate::framework::value::TfBlocks;
use crate::model::git_credential::{GitCredential, GitCredentialDetails};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GitCredentialItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub username: String,
    pub space_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GitCredentialsState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub git_credentials: TfBlocks<GitCredentialItem>,
}

pub struct GitCredentials;

impl Listing for GitCredentials {
    type Model = GitCredential;
    type Item = GitCredentialItem;
    type State = GitCredentialsState;

    const NAME: &'static str = "octopusdeploy_git_credentials";
    const RESULTS: &'static str = "git_credentials";
    const SINGULAR: &'static str = "Git credential";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("description", schema::text()),
            ("username", schema::text()),
            ("space_id", schema::text()),
        ]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    fn item(_config: &Self::State, credential: &GitCredential) -> Option<GitCredentialItem> {
        let GitCredentialDetails::UsernamePassword { username, .. } = &credential.details;
        Some(GitCredentialItem {
            id: credential.id.clone().unwrap_or_default(),
            name: credential.name.clone(),
            description: credential.description.clone().unwrap_or_default(),
            username: username.clone(),
            space_id: credential.space_id.clone().unwrap_or_default(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<GitCredentialItem> {
        &mut state.git_credentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sources::ListingDataSource;
    use crate::framework::test::assert_schema_matches_state;
    use crate::framework::OctopusDataSource;

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<GitCredentialsState>(&ListingDataSource::<GitCredentials>::schema());
    }

    #[test]
    fn password_is_never_listed() {
        let credential: GitCredential = serde_json::from_value(serde_json::json!({
            "Id": "GitCredentials-1",
            "Name": "github",
            "Details": { "Type": "UsernamePassword", "Username": "bot", "Password": { "HasValue": true } }
        }))
        .unwrap();
        let item = GitCredentials::item(&GitCredentialsState::default(), &credential).unwrap();
        assert_eq!(item.username, "bot");
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("password").is_none());
    }
}
