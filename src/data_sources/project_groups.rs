use serde::{Deserialize, Serialize};
use tf_provider::schema::AttributeType;

use super::{Listing, QueryFields};
use crate::framework::schema;
use crate::framework::value::TfBlocks;
use crate::model::project::ProjectGroup;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProjectGroupItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub space_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProjectGroupsState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub project_groups: TfBlocks<ProjectGroupItem>,
}

pub struct ProjectGroups;

impl Listing for ProjectGroups {
    type Model = ProjectGroup;
    type Item = ProjectGroupItem;
    type State = ProjectGroupsState;

    const NAME: &'static str = "octopusdeploy_project_groups";
    const RESULTS: &'static str = "project_groups";
    const SINGULAR: &'static str = "project group";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("description", schema::text()),
            ("space_id", schema::text()),
        ]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    fn item(_config: &Self::State, group: &ProjectGroup) -> Option<ProjectGroupItem> {
        Some(ProjectGroupItem {
            id: group.id.clone().unwrap_or_default(),
            name: group.name.clone(),
            description: group.description.clone().unwrap_or_default(),
            space_id: group.space_id.clone().unwrap_or_default(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<ProjectGroupItem> {
        &mut state.project_groups
    }
}
