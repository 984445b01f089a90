use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, AttributeType};

use super::{Listing, QueryFields};
use crate::framework::schema;
use crate::framework::value::{self, TfBlocks, TfString};
use crate::model::channel::Channel;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChannelItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub project_id: String,
    pub lifecycle_id: String,
    pub is_default: bool,
    pub tenant_tags: Vec<String>,
    pub space_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChannelsState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub project_id: TfString,
    pub channels: TfBlocks<ChannelItem>,
}

pub struct Channels;

impl Listing for Channels {
    type Model = Channel;
    type Item = ChannelItem;
    type State = ChannelsState;

    const NAME: &'static str = "octopusdeploy_channels";
    const RESULTS: &'static str = "channels";
    const SINGULAR: &'static str = "channel";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("description", schema::text()),
            ("project_id", schema::text()),
            ("lifecycle_id", schema::text()),
            ("is_default", schema::flag()),
            ("tenant_tags", schema::text_list()),
            ("space_id", schema::text()),
        ]
    }

    fn filter_attributes() -> Vec<(&'static str, Attribute)> {
        vec![(
            "project_id",
            schema::optional(schema::text(), "A filter to search by the project the channels belong to."),
        )]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    // The channels endpoint has no project filter, so it is applied to each page.
    fn item(config: &Self::State, channel: &Channel) -> Option<ChannelItem> {
        if let Some(project_id) = value::opt_string(&config.project_id) {
            if channel.project_id != project_id {
                return None;
            }
        }
        Some(ChannelItem {
            id: channel.id.clone().unwrap_or_default(),
            name: channel.name.clone(),
            description: channel.description.clone().unwrap_or_default(),
            project_id: channel.project_id.clone(),
            lifecycle_id: channel.lifecycle_id.clone().unwrap_or_default(),
            is_default: channel.is_default,
            tenant_tags: channel.tenant_tags.clone(),
            space_id: channel.space_id.clone().unwrap_or_default(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<ChannelItem> {
        &mut state.channels
    }
}
