use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::Schema, value::Value};

use super::space_replacement;
use crate::client::Client;
use crate::framework::value::{self, TfInt, TfString};
use crate::framework::{schema, Error, ManagedResource, Validation};
use crate::model::tag_set::TagSet;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TagSetState {
    pub id: TfString,
    pub name: TfString,
    pub description: TfString,
    pub sort_order: TfInt,
    pub space_id: TfString,
}

fn flatten(tag_set: &TagSet, state: &mut TagSetState) {
    value::set_string(&mut state.id, tag_set.id.as_deref());
    value::set(&mut state.name, tag_set.name.clone());
    value::set_optional_string(&mut state.description, tag_set.description.as_deref());
    value::set(&mut state.sort_order, tag_set.sort_order);
    value::set_string(&mut state.space_id, tag_set.space_id.as_deref());
}

/// Apply the configured fields onto a tag set. Tags are managed by `octopusdeploy_tag`
/// and are kept as they are.
fn apply(state: &TagSetState, tag_set: &mut TagSet) {
    tag_set.name = value::string(&state.name);
    tag_set.description = value::opt_string(&state.description);
    if let Some(sort_order) = value::opt_int(&state.sort_order) {
        tag_set.sort_order = sort_order;
    }
    if tag_set.space_id.is_none() {
        tag_set.space_id = value::opt_string(&state.space_id);
    }
}

pub struct TagSetResource;

#[async_trait]
impl ManagedResource for TagSetResource {
    type State = TagSetState;

    const NAME: &'static str = "octopusdeploy_tag_set";

    fn schema() -> Schema {
        schema::schema(schema::block(
            "This resource manages tag sets in Octopus Deploy.",
            vec![
                ("id", schema::id()),
                ("name", schema::name("tag set")),
                ("description", schema::description("tag set")),
                ("sort_order", schema::sort_order("tag set")),
                ("space_id", schema::space_id("tag set")),
            ],
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("name", &config.name);
    }

    fn plan(state: &mut Self::State) {
        value::unknown_if_null(&mut state.id);
        value::unknown_if_null(&mut state.sort_order);
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
        TagSetState {
            id: Value::Value(id),
            ..Default::default()
        }
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let mut tag_set = TagSet::default();
        apply(&planned, &mut tag_set);
        let created = client.add(tag_set.space_id.as_deref(), &tag_set).await?;
        let mut state = planned;
        flatten(&created, &mut state);
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let space_id = value::opt_string(&state.space_id);
        let Some(tag_set) = client
            .find::<TagSet>(space_id.as_deref(), &value::string(&state.id))
            .await?
        else {
            return Ok(None);
        };
        let mut state = state;
        flatten(&tag_set, &mut state);
        Ok(Some(state))
    }

    async fn update(client: &Client, _prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let id = value::string(&planned.id);
        let space_id = value::opt_string(&planned.space_id);
        // The tag set carries its tags; hold the lock so concurrent tag changes are not lost.
        let _guard = client.tag_set_locks().lock(&id).await;

        let mut tag_set: TagSet = client.get(space_id.as_deref(), &id).await?;
        apply(&planned, &mut tag_set);
        let updated = client.update(space_id.as_deref(), &id, &tag_set).await?;
        let mut state = planned;
        flatten(&updated, &mut state);
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let id = value::string(&state.id);
        let space_id = value::opt_string(&state.space_id);
        let _guard = client.tag_set_locks().lock(&id).await;
        client.delete::<TagSet>(space_id.as_deref(), &id).await?;
        Ok(())
    }
}
