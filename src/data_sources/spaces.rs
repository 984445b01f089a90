use serde::{Deserialize, Serialize};
use tf_provider::schema::AttributeType;

use super::{Listing, QueryFields};
use crate::framework::schema;
use crate::framework::value::TfBlocks;
use crate::model::space::Space;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SpaceItem {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub is_default: bool,
    pub is_task_queue_stopped: bool,
    pub space_managers_teams: Vec<String>,
    pub space_managers_team_members: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SpacesState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub spaces: TfBlocks<SpaceItem>,
}

pub struct Spaces;

impl Listing for Spaces {
    type Model = Space;
    type Item = SpaceItem;
    type State = SpacesState;

    const NAME: &'static str = "octopusdeploy_spaces";
    const RESULTS: &'static str = "spaces";
    const SINGULAR: &'static str = "space";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("slug", schema::text()),
            ("description", schema::text()),
            ("is_default", schema::flag()),
            ("is_task_queue_stopped", schema::flag()),
            ("space_managers_teams", schema::text_list()),
            ("space_managers_team_members", schema::text_list()),
        ]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    fn item(_config: &Self::State, space: &Space) -> Option<SpaceItem> {
        Some(SpaceItem {
            id: space.id.clone().unwrap_or_default(),
            name: space.name.clone(),
            slug: space.slug.clone().unwrap_or_default(),
            description: space.description.clone().unwrap_or_default(),
            is_default: space.is_default,
            is_task_queue_stopped: space.task_queue_stopped,
            space_managers_teams: space.space_managers_teams.clone(),
            space_managers_team_members: space.space_managers_team_members.clone(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<SpaceItem> {
        &mut state.spaces
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::test::client_for;
    use crate::data_sources::ListingDataSource;
    use crate::framework::test::assert_schema_matches_state;
    use crate::framework::value;
    use crate::framework::OctopusDataSource;

    type DataSource = ListingDataSource<Spaces>;

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<SpacesState>(&DataSource::schema());
    }

    #[tokio::test]
    async fn spaces_are_listed_outside_any_space() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/spaces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": [{ "Id": "Spaces-1", "Name": "Default", "IsDefault": true, "SpaceManagersTeams": ["teams-managers"] }],
                "TotalResults": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let state = DataSource::read(&client, SpacesState::default()).await.unwrap();
        let spaces = value::blocks(&state.spaces);
        assert_eq!(spaces.len(), 1);
        assert!(spaces[0].is_default);
        assert_eq!(spaces[0].space_managers_teams, vec!["teams-managers"]);
    }
}
