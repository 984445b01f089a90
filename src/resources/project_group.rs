use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::Schema, value::Value};

use super::space_replacement;
use crate::client::Client;
use crate::framework::value::{self, TfString};
use crate::framework::{schema, Error, ManagedResource, Validation};
use crate::model::project::ProjectGroup;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProjectGroupState {
    pub id: TfString,
    pub name: TfString,
    pub description: TfString,
    pub space_id: TfString,
}

fn expand(state: &ProjectGroupState) -> ProjectGroup {
    ProjectGroup {
        id: value::opt_string(&state.id),
        name: value::string(&state.name),
        description: value::opt_string(&state.description),
        space_id: value::opt_string(&state.space_id),
    }
}

fn flatten(group: &ProjectGroup, state: &mut ProjectGroupState) {
    value::set_string(&mut state.id, group.id.as_deref());
    value::set(&mut state.name, group.name.clone());
    value::set_optional_string(&mut state.description, group.description.as_deref());
    value::set_string(&mut state.space_id, group.space_id.as_deref());
}

pub struct ProjectGroupResource;

#[async_trait]
impl ManagedResource for ProjectGroupResource {
    type State = ProjectGroupState;

    const NAME: &'static str = "octopusdeploy_project_group";

    fn schema() -> Schema {
        schema::schema(schema::block(
            "This resource manages project groups in Octopus Deploy.",
            vec![
                ("id", schema::id()),
                ("name", schema::name("project group")),
                ("description", schema::description("project group")),
                ("space_id", schema::space_id("project group")),
            ],
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("name", &config.name);
    }

    fn plan(state: &mut Self::State) {
        value::unknown_if_null(&mut state.id);
        value::unknown_if_null(&mut state.space_id);
    }

    fn replace_on_change(prior: &Self::State, proposed: &Self::State) -> Vec<AttributePath> {
        space_replacement(&prior.space_id, &proposed.space_id)
    }

    fn id(state: &Self::State) -> String {
        value::string(&state.id)
    }

    fn name(state: &Self::State) -> String {
        value::string(&state.name)
    }

    fn with_id(id: String) -> Self::State {
        ProjectGroupState {
            id: Value::Value(id),
            ..Default::default()
        }
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let group = expand(&planned);
        let created = client.add(group.space_id.as_deref(), &group).await?;
        let mut state = planned;
        flatten(&created, &mut state);
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let space_id = value::opt_string(&state.space_id);
        let Some(group) = client
            .find::<ProjectGroup>(space_id.as_deref(), &value::string(&state.id))
            .await?
        else {
            return Ok(None);
        };
        let mut state = state;
        flatten(&group, &mut state);
        Ok(Some(state))
    }

    async fn update(client: &Client, _prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let group = expand(&planned);
        let updated = client
            .update(group.space_id.as_deref(), &value::string(&planned.id), &group)
            .await?;
        let mut state = planned;
        flatten(&updated, &mut state);
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let space_id = value::opt_string(&state.space_id);
        client
            .delete::<ProjectGroup>(space_id.as_deref(), &value::string(&state.id))
            .await?;
        Ok(())
    }
}
