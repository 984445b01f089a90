use serde::{Deserialize, Serialize};
use tf_provider::schema::AttributeType;

use super::{Listing, QueryFields};
use crate::framework::schema;
use crate::framework::value::TfBlocks;
use crate::model::user::UserRole;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserRoleItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub can_be_deleted: bool,
    pub granted_space_permissions: Vec<String>,
    pub granted_system_permissions: Vec<String>,
    pub supported_restrictions: Vec<String>,
    pub space_permission_descriptions: Vec<String>,
    pub system_permission_descriptions: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserRolesState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub user_roles: TfBlocks<UserRoleItem>,
}

pub struct UserRoles;

impl Listing for UserRoles {
    type Model = UserRole;
    type Item = UserRoleItem;
    type State = UserRolesState;

    const NAME: &'static str = "octopusdeploy_user_roles";
    const RESULTS: &'static str = "user_roles";
    const SINGULAR: &'static str = "user role";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("description", schema::text()),
            ("can_be_deleted", schema::flag()),
            ("granted_space_permissions", schema::text_list()),
            ("granted_system_permissions", schema::text_list()),
            ("supported_restrictions", schema::text_list()),
            ("space_permission_descriptions", schema::text_list()),
            ("system_permission_descriptions", schema::text_list()),
        ]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    fn item(_config: &Self::State, role: &UserRole) -> Option<UserRoleItem> {
        Some(UserRoleItem {
            id: role.id.clone().unwrap_or_default(),
            name: role.name.clone(),
            description: role.description.clone().unwrap_or_default(),
            can_be_deleted: role.can_be_deleted,
            granted_space_permissions: role.granted_space_permissions.clone(),
            granted_system_permissions: role.granted_system_permissions.clone(),
            supported_restrictions: role.supported_restrictions.clone(),
            space_permission_descriptions: role.space_permission_descriptions.clone(),
            system_permission_descriptions: role.system_permission_descriptions.clone(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<UserRoleItem> {
        &mut state.user_roles
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::test::client_for;
    use crate::data_sources::ListingDataSource;
    use crate::framework::test::assert_schema_matches_state;
    use crate::framework::value;
    use crate::framework::OctopusDataSource;

    type DataSource = ListingDataSource<UserRoles>;

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<UserRolesState>(&DataSource::schema());
    }

    #[tokio::test]
    async fn roles_keep_null_permission_lists_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/userroles"))
            .and(query_param("partialName", "Project"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": [{
                    "Id": "userroles-projectviewer",
                    "Name": "Project viewer",
                    "CanBeDeleted": false,
                    "GrantedSpacePermissions": ["ProjectView", "ReleaseView"],
                    "GrantedSystemPermissions": null
                }],
                "TotalResults": 1
            })))
            .mount(&server)
            .await;

        let mut config = UserRolesState::default();
        config.query.partial_name = tf_provider::value::Value::Value("Project".into());
        let client = client_for(&server, Some("Spaces-1"));
        let state = DataSource::read(&client, config).await.unwrap();
        let roles = value::blocks(&state.user_roles);
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].granted_space_permissions, vec!["ProjectView", "ReleaseView"]);
        assert!(roles[0].granted_system_permissions.is_empty());
    }
}
