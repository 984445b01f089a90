use serde::{Deserialize, Serialize};
use tf_provider::schema::AttributeType;

use super::{Listing, QueryFields};
use crate::framework::schema;
use crate::framework::value::TfBlocks;
use crate::model::tag_set::TagSet;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TagSetItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub sort_order: i64,
    pub tags: Vec<String>,
    pub space_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TagSetsState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub tag_sets: TfBlocks<TagSetItem>,
}

pub struct TagSets;

impl Listing for TagSets {
    type Model = TagSet;
    type Item = TagSetItem;
    type State = TagSetsState;

    const NAME: &'static str = "octopusdeploy_tag_sets";
    const RESULTS: &'static str = "tag_sets";
    const SINGULAR: &'static str = "tag set";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("description", schema::text()),
            ("sort_order", schema::number()),
            ("tags", schema::text_list()),
            ("space_id", schema::text()),
        ]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    // Tags are listed by canonical name, the form tenants and accounts refer to them by.
    fn item(_config: &Self::State, tag_set: &TagSet) -> Option<TagSetItem> {
        Some(TagSetItem {
            id: tag_set.id.clone().unwrap_or_default(),
            name: tag_set.name.clone(),
            description: tag_set.description.clone().unwrap_or_default(),
            sort_order: tag_set.sort_order,
            tags: tag_set
                .tags
                .iter()
                .map(|tag| {
                    tag.canonical_tag_name
                        .clone()
                        .unwrap_or_else(|| format!("{}/{}", tag_set.name, tag.name))
                })
                .collect(),
            space_id: tag_set.space_id.clone().unwrap_or_default(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<TagSetItem> {
        &mut state.tag_sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sources::ListingDataSource;
    use crate::framework::test::assert_schema_matches_state;
    use crate::framework::OctopusDataSource;

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<TagSetsState>(&ListingDataSource::<TagSets>::schema());
    }

    #[test]
    fn tags_use_canonical_names() {
        let tag_set: TagSet = serde_json::from_value(serde_json::json!({
            "Id": "TagSets-1",
            "Name": "Region",
            "Tags": [
                { "Id": "TagSets-1-1", "Name": "EU", "Color": "#333333", "CanonicalTagName": "Region/EU" },
                { "Id": "TagSets-1-2", "Name": "US", "Color": "#333333" }
            ]
        }))
        .unwrap();
        let item = TagSets::item(&TagSetsState::default(), &tag_set).unwrap();
        assert_eq!(item.tags, vec!["Region/EU", "Region/US"]);
    }
}
