use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, AttributeType};

use super::{Listing, QueryFields};
use crate::client::Query;
use crate::framework::value::{self, TfBlocks, TfString};
use crate::framework::{schema, Validation};
use crate::model::feed::Feed;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FeedItem {
    pub id: String,
    pub name: String,
    pub feed_type: String,
    pub feed_uri: String,
    pub package_acquisition_location_options: Vec<String>,
    pub space_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FeedsState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub feed_type: TfString,
    pub feeds: TfBlocks<FeedItem>,
}

pub struct Feeds;

impl Listing for Feeds {
    type Model = Feed;
    type Item = FeedItem;
    type State = FeedsState;

    const NAME: &'static str = "octopusdeploy_feeds";
    const RESULTS: &'static str = "feeds";
    const SINGULAR: &'static str = "feed";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("feed_type", schema::text()),
            ("feed_uri", schema::text()),
            ("package_acquisition_location_options", schema::text_list()),
            ("space_id", schema::text()),
        ]
    }

    fn filter_attributes() -> Vec<(&'static str, Attribute)> {
        vec![(
            "feed_type",
            schema::optional(
                schema::text(),
                &format!(
                    "A filter to search by feed type. Valid feed types are {}.",
                    Feed::TYPES.map(|feed_type| format!("`{feed_type}`")).join(", ")
                ),
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
        match value::opt_string(&config.feed_type) {
            Some(feed_type) => query.with("feedType", feed_type),
            None => query,
        }
    }

    fn item(_config: &Self::State, feed: &Feed) -> Option<FeedItem> {
        let common = feed.common()?;
        Some(FeedItem {
            id: common.id.clone().unwrap_or_default(),
            name: common.name.clone(),
            feed_type: feed.feed_type().to_string(),
            feed_uri: feed.feed_uri().unwrap_or_default().to_string(),
            package_acquisition_location_options: common.package_acquisition_location_options.clone(),
            space_id: common.space_id.clone().unwrap_or_default(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<FeedItem> {
        &mut state.feeds
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.one_of("feed_type", &config.feed_type, &Feed::TYPES);
    }
}
