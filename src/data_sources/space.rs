//! Looks up a single space by its exact name.
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use tf_provider::schema::Schema;

use crate::client::{Client, Query};
use crate::framework::value::{self, TfBool, TfString, TfStrings};
use crate::framework::{schema, Error, OctopusDataSource, Validation};
use crate::model::space::Space;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SpaceDataSourceState {
    pub id: TfString,
    pub name: TfString,
    pub slug: TfString,
    pub description: TfString,
    pub is_default: TfBool,
    pub is_task_queue_stopped: TfBool,
    pub space_managers_teams: TfStrings,
    pub space_managers_team_members: TfStrings,
}

pub struct SpaceDataSource;

#[async_trait]
impl OctopusDataSource for SpaceDataSource {
    type State = SpaceDataSourceState;

    const NAME: &'static str = "octopusdeploy_space";

    fn schema() -> Schema {
        schema::schema(schema::block(
            "Provides information about an existing space.",
            vec![
                ("id", schema::computed(schema::text(), "The unique ID for this resource.")),
                ("name", schema::required(schema::text(), "The name of the space to look up.")),
                ("slug", schema::computed(schema::text(), "The unique slug of this space.")),
                ("description", schema::computed(schema::text(), "The description of this space.")),
                (
                    "is_default",
                    schema::computed(schema::flag(), "Specifies if this space is the default space in Octopus."),
                ),
                (
                    "is_task_queue_stopped",
                    schema::computed(schema::flag(), "Specifies the status of the task queue for this space."),
                ),
                (
                    "space_managers_teams",
                    schema::computed(schema::text_set(), "A list of team IDs designated to be managers of this space."),
                ),
                (
                    "space_managers_team_members",
                    schema::computed(schema::text_set(), "A list of user IDs designated to be managers of this space."),
                ),
            ],
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("name", &config.name);
    }

    async fn read(client: &Client, config: Self::State) -> Result<Self::State, Error> {
        let name = value::string(&config.name);
        let query = Query {
            partial_name: Some(name.clone()),
            ..Default::default()
        };
        let page = client.query::<Space>(None, &query).await?;
        debug!("{} found {} spaces named like {name:?}", Self::NAME, page.items.len());
        let space = page
            .items
            .into_iter()
            .find(|space| space.name == name)
            .ok_or_else(|| Error::NoMatch(format!("space named {name:?}")))?;

        let mut state = config;
        value::set_string(&mut state.id, space.id.as_deref());
        value::set(&mut state.slug, space.slug.unwrap_or_default());
        value::set(&mut state.description, space.description.unwrap_or_default());
        value::set(&mut state.is_default, space.is_default);
        value::set(&mut state.is_task_queue_stopped, space.task_queue_stopped);
        state.space_managers_teams = value::list_from(&space.space_managers_teams);
        state.space_managers_team_members = value::list_from(&space.space_managers_team_members);
        Ok(state)
    }
}
