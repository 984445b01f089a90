use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, AttributeType};

use super::{is_set, Listing, QueryFields};
use crate::client::Query;
use crate::framework::schema;
use crate::framework::value::{self, TfBlocks, TfBool, TfStrings};
use crate::model::team::Team;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TeamItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub users: Vec<String>,
    pub external_security_groups: Vec<String>,
    pub can_be_deleted: bool,
    pub can_be_renamed: bool,
    pub can_change_members: bool,
    pub can_change_roles: bool,
    pub space_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TeamsState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub include_system: TfBool,
    pub spaces: TfStrings,
    pub teams: TfBlocks<TeamItem>,
}

pub struct Teams;

impl Listing for Teams {
    type Model = Team;
    type Item = TeamItem;
    type State = TeamsState;

    const NAME: &'static str = "octopusdeploy_teams";
    const RESULTS: &'static str = "teams";
    const SINGULAR: &'static str = "team";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("description", schema::text()),
            ("users", schema::text_list()),
            ("external_security_groups", schema::text_list()),
            ("can_be_deleted", schema::flag()),
            ("can_be_renamed", schema::flag()),
            ("can_change_members", schema::flag()),
            ("can_change_roles", schema::flag()),
            ("space_id", schema::text()),
        ]
    }

    fn filter_attributes() -> Vec<(&'static str, Attribute)> {
        vec![
            (
                "include_system",
                schema::optional(schema::flag(), "A filter to include system teams."),
            ),
            (
                "spaces",
                schema::optional(schema::text_list(), "A filter to search by a list of space IDs."),
            ),
        ]
    }

    fn filter(config: &Self::State, query: Query) -> Query {
        let mut query = query;
        if is_set(&config.include_system) {
            query = query.with("includeSystem", "true");
        }
        if let Some(spaces) = value::slice_from_list(&config.spaces) {
            query = query.with("spaces", spaces.join(","));
        }
        query
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    fn item(_config: &Self::State, team: &Team) -> Option<TeamItem> {
        Some(TeamItem {
            id: team.id.clone().unwrap_or_default(),
            name: team.name.clone(),
            description: team.description.clone().unwrap_or_default(),
            users: team.member_user_ids.clone(),
            external_security_groups: team.external_security_groups.iter().map(|group| group.id.clone()).collect(),
            can_be_deleted: team.can_be_deleted,
            can_be_renamed: team.can_be_renamed,
            can_change_members: team.can_change_members,
            can_change_roles: team.can_change_roles,
            space_id: team.space_id.clone().unwrap_or_default(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<TeamItem> {
        &mut state.teams
    }
}
