use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::Schema, value::Value};

use crate::client::Client;
use crate::framework::value::{self, TfBool, TfString, TfStrings};
use crate::framework::{replace_if_changed, schema, Error, ManagedResource, Validation};
use crate::model::channel::Channel;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChannelState {
    pub id: TfString,
    pub name: TfString,
    pub project_id: TfString,
    pub description: TfString,
    pub is_default: TfBool,
    pub lifecycle_id: TfString,
    pub tenant_tags: TfStrings,
    pub space_id: TfString,
}

fn expand(state: &ChannelState) -> Channel {
    Channel {
        id: value::opt_string(&state.id),
        name: value::string(&state.name),
        project_id: value::string(&state.project_id),
        description: value::opt_string(&state.description),
        is_default: value::boolean(&state.is_default),
        lifecycle_id: value::opt_string(&state.lifecycle_id),
        tenant_tags: value::strings(&state.tenant_tags),
        space_id: value::opt_string(&state.space_id),
    }
}

fn flatten(channel: &Channel, state: &mut ChannelState) {
    value::set_string(&mut state.id, channel.id.as_deref());
    value::set(&mut state.name, channel.name.clone());
    value::set(&mut state.project_id, channel.project_id.clone());
    value::set_optional_string(&mut state.description, channel.description.as_deref());
    value::set_optional(&mut state.is_default, channel.is_default);
    value::set_optional_string(&mut state.lifecycle_id, channel.lifecycle_id.as_deref());
    value::set_optional_list(&mut state.tenant_tags, &channel.tenant_tags);
    value::set_string(&mut state.space_id, channel.space_id.as_deref());
}

pub struct ChannelResource;

#[async_trait]
impl ManagedResource for ChannelResource {
    type State = ChannelState;

    const NAME: &'static str = "octopusdeploy_channel";

    fn schema() -> Schema {
        schema::schema(schema::block(
            "This resource manages channels in Octopus Deploy.",
            vec![
                ("id", schema::id()),
                ("name", schema::name("channel")),
                ("project_id", schema::required(schema::text(), "The project ID associated with this channel.")),
                ("description", schema::description("channel")),
                ("is_default", schema::optional(schema::flag(), "Indicates whether this is the default channel for the associated project.")),
                ("lifecycle_id", schema::optional(schema::text(), "The lifecycle ID associated with this channel.")),
                ("tenant_tags", schema::tenant_tags()),
                ("space_id", schema::space_id("channel")),
            ],
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("name", &config.name);
        validation.not_empty("project_id", &config.project_id);
    }

    fn plan(state: &mut Self::State) {
        value::unknown_if_null(&mut state.id);
        value::unknown_if_null(&mut state.space_id);
    }

    fn replace_on_change(prior: &Self::State, proposed: &Self::State) -> Vec<AttributePath> {
        replace_if_changed(&[
            ("project_id", &prior.project_id, &proposed.project_id),
            ("space_id", &prior.space_id, &proposed.space_id),
        ])
    }

    fn id(state: &Self::State) -> String {
        value::string(&state.id)
    }

    fn name(state: &Self::State) -> String {
        value::string(&state.name)
    }

    fn with_id(id: String) -> Self::State {
        ChannelState {
            id: Value::Value(id),
            ..Default::default()
        }
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let channel = expand(&planned);
        let created = client.add(channel.space_id.as_deref(), &channel).await?;
        let mut state = planned;
        flatten(&created, &mut state);
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let space_id = value::opt_string(&state.space_id);
        let Some(channel) = client
            .find::<Channel>(space_id.as_deref(), &value::string(&state.id))
            .await?
        else {
            return Ok(None);
        };
        let mut state = state;
        flatten(&channel, &mut state);
        Ok(Some(state))
    }

    async fn update(client: &Client, _prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let channel = expand(&planned);
        let updated = client
            .update(channel.space_id.as_deref(), &value::string(&planned.id), &channel)
            .await?;
        let mut state = planned;
        flatten(&updated, &mut state);
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let space_id = value::opt_string(&state.space_id);
        client
            .delete::<Channel>(space_id.as_deref(), &value::string(&state.id))
            .await?;
        Ok(())
    }
}
