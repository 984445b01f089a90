use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use tf_provider::{schema::Schema, value::Value};

use crate::client::Client;
use crate::framework::value::{self, TfBool, TfString, TfStrings};
use crate::framework::{schema, Error, ManagedResource, Validation};
use crate::model::space::Space;

/// The server adds its own space managers team to every space.
const SPACE_MANAGERS_TEAM_PREFIX: &str = "teams-spacemanagers-";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SpaceState {
    pub id: TfString,
    pub name: TfString,
    pub description: TfString,
    pub slug: TfString,
    pub is_default: TfBool,
    pub is_task_queue_stopped: TfBool,
    pub space_managers_teams: TfStrings,
    pub space_managers_team_members: TfStrings,
}

fn expand(state: &SpaceState) -> Space {
    Space {
        id: value::opt_string(&state.id),
        name: value::string(&state.name),
        description: value::opt_string(&state.description),
        slug: value::opt_string(&state.slug),
        is_default: value::boolean(&state.is_default),
        task_queue_stopped: value::boolean(&state.is_task_queue_stopped),
        space_managers_teams: value::strings(&state.space_managers_teams),
        space_managers_team_members: value::strings(&state.space_managers_team_members),
    }
}

fn flatten(space: &Space, state: &mut SpaceState) {
    let teams: Vec<&str> = space
        .space_managers_teams
        .iter()
        .map(String::as_str)
        .filter(|team| !team.starts_with(SPACE_MANAGERS_TEAM_PREFIX))
        .collect();

    value::set_string(&mut state.id, space.id.as_deref());
    value::set(&mut state.name, space.name.clone());
    value::set_optional_string(&mut state.description, space.description.as_deref());
    value::set_string(&mut state.slug, space.slug.as_deref());
    value::set_optional(&mut state.is_default, space.is_default);
    value::set_optional(&mut state.is_task_queue_stopped, space.task_queue_stopped);
    value::set_optional_list(&mut state.space_managers_teams, &teams);
    value::set_optional_list(&mut state.space_managers_team_members, &space.space_managers_team_members);
}

pub struct SpaceResource;

#[async_trait]
impl ManagedResource for SpaceResource {
    type State = SpaceState;

    const NAME: &'static str = "octopusdeploy_space";

    fn schema() -> Schema {
        schema::schema(schema::block(
            "This resource manages spaces in Octopus Deploy.",
            vec![
                ("id", schema::id()),
                ("name", schema::name("space")),
                ("description", schema::description("space")),
                ("slug", schema::slug("space")),
                ("is_default", schema::optional(schema::flag(), "Specifies if this is the default space.")),
                ("is_task_queue_stopped", schema::optional(schema::flag(), "Specifies the status of the task queue for this space.")),
                (
                    "space_managers_teams",
                    schema::optional(schema::text_set(), "A list of team IDs designated to be managers of this space."),
                ),
                (
                    "space_managers_team_members",
                    schema::optional(schema::text_set(), "A list of user IDs designated to be managers of this space."),
                ),
            ],
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("name", &config.name);

        let unset = |list: &TfStrings| matches!(list, Value::Null) || matches!(list, Value::Value(items) if items.is_empty());
        if unset(&config.space_managers_teams) && unset(&config.space_managers_team_members) {
            validation.error(
                "space_managers_teams",
                "a space needs at least one manager",
                "set space_managers_teams or space_managers_team_members",
            );
        }
    }

    fn plan(state: &mut Self::State) {
        value::unknown_if_null(&mut state.id);
        value::unknown_if_null(&mut state.slug);
    }

    fn id(state: &Self::State) -> String {
        value::string(&state.id)
    }

    fn name(state: &Self::State) -> String {
        value::string(&state.name)
    }

    fn with_id(id: String) -> Self::State {
        SpaceState {
            id: Value::Value(id),
            ..Default::default()
        }
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let created = client.add(None, &expand(&planned)).await?;
        let mut state = planned;
        flatten(&created, &mut state);
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let Some(space) = client.find::<Space>(None, &value::string(&state.id)).await? else {
            return Ok(None);
        };
        let mut state = state;
        flatten(&space, &mut state);
        Ok(Some(state))
    }

    async fn update(client: &Client, _prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let id = value::string(&planned.id);
        let current: Space = client.get(None, &id).await?;
        let mut space = expand(&planned);
        // Keep the server managed team, it cannot be removed.
        space.space_managers_teams.extend(
            current
                .space_managers_teams
                .into_iter()
                .filter(|team| team.starts_with(SPACE_MANAGERS_TEAM_PREFIX)),
        );

        let updated = client.update(None, &id, &space).await?;
        let mut state = planned;
        flatten(&updated, &mut state);
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let id = value::string(&state.id);
        let Some(mut space) = client.find::<Space>(None, &id).await? else {
            return Ok(());
        };
        if !space.task_queue_stopped {
            debug!("stopping the task queue of space {id} before deleting it");
            space.task_queue_stopped = true;
            client.update(None, &id, &space).await?;
        }
        client.delete::<Space>(None, &id).await?;
        Ok(())
    }
}
