use serde::{Deserialize, Serialize};
use tf_provider::schema::AttributeType;

use super::{Listing, QueryFields};
use crate::framework::schema;
use crate::framework::value::TfBlocks;
use crate::model::lifecycle::Lifecycle;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LifecycleItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub phases: Vec<String>,
    pub space_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LifecyclesState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub lifecycles: TfBlocks<LifecycleItem>,
}

pub struct Lifecycles;

impl Listing for Lifecycles {
    type Model = Lifecycle;
    type Item = LifecycleItem;
    type State = LifecyclesState;

    const NAME: &'static str = "octopusdeploy_lifecycles";
    const RESULTS: &'static str = "lifecycles";
    const SINGULAR: &'static str = "lifecycle";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("description", schema::text()),
            ("phases", schema::text_list()),
            ("space_id", schema::text()),
        ]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    fn item(_config: &Self::State, lifecycle: &Lifecycle) -> Option<LifecycleItem> {
        Some(LifecycleItem {
            id: lifecycle.id.clone().unwrap_or_default(),
            name: lifecycle.name.clone(),
            description: lifecycle.description.clone().unwrap_or_default(),
            phases: lifecycle.phases.iter().map(|phase| phase.name.clone()).collect(),
            space_id: lifecycle.space_id.clone().unwrap_or_default(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<LifecycleItem> {
        &mut state.lifecycles
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
        assert_schema_matches_state::<LifecyclesState>(&ListingDataSource::<Lifecycles>::schema());
    }
}
