use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, AttributeType};

use super::{Listing, QueryFields};
use crate::client::Query;
use crate::framework::schema;
use crate::framework::value::{self, TfBlocks, TfString};
use crate::model::user::User;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserItem {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub email_address: String,
    pub is_active: bool,
    pub is_service: bool,
    pub can_password_be_edited: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UsersState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub filter: TfString,
    pub users: TfBlocks<UserItem>,
}

pub struct Users;

impl Listing for Users {
    type Model = User;
    type Item = UserItem;
    type State = UsersState;

    const NAME: &'static str = "octopusdeploy_users";
    const RESULTS: &'static str = "users";
    const SINGULAR: &'static str = "user";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("username", schema::text()),
            ("display_name", schema::text()),
            ("email_address", schema::text()),
            ("is_active", schema::flag()),
            ("is_service", schema::flag()),
            ("can_password_be_edited", schema::flag()),
        ]
    }

    fn filter_attributes() -> Vec<(&'static str, Attribute)> {
        vec![(
            "filter",
            schema::optional(
                schema::text(),
                "A filter to search by username, display name or email address.",
            ),
        )]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    fn filter(config: &Self::State, query: Query) -> Query {
        match value::opt_string(&config.filter) {
            Some(filter) => query.with("filter", filter),
            None => query,
        }
    }

    fn item(_config: &Self::State, user: &User) -> Option<UserItem> {
        Some(UserItem {
            id: user.id.clone().unwrap_or_default(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            email_address: user.email_address.clone().unwrap_or_default(),
            is_active: user.is_active,
            is_service: user.is_service,
            can_password_be_edited: user.can_password_be_edited,
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<UserItem> {
        &mut state.users
    }
}

#[cfg(test)]
mod tests {
    use tf_provider::value::Value;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::test::client_for;
    use crate::data_sources::ListingDataSource;
    use crate::framework::test::assert_schema_matches_state;
    use crate::framework::OctopusDataSource;

    type DataSource = ListingDataSource<Users>;

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<UsersState>(&DataSource::schema());
    }

    #[tokio::test]
    async fn users_are_listed_outside_any_space() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .and(query_param("filter", "jane"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": [{
                    "Id": "Users-2",
                    "Username": "jane",
                    "DisplayName": "Jane Doe",
                    "EmailAddress": null,
                    "IsActive": true,
                    "IsService": false
                }],
                "TotalResults": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = UsersState {
            filter: Value::Value("jane".into()),
            ..Default::default()
        };
        let client = client_for(&server, Some("Spaces-1"));
        let state = DataSource::read(&client, config).await.unwrap();
        let users = value::blocks(&state.users);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].display_name, "Jane Doe");
        assert_eq!(users[0].email_address, "");
        assert!(users[0].is_active);
    }
}
