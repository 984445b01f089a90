use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, AttributeType};

use super::{is_set, Listing, QueryFields};
use crate::client::Query;
use crate::framework::schema;
use crate::framework::value::{TfBlocks, TfBool};
use crate::model::project::Project;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProjectItem {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub lifecycle_id: String,
    pub project_group_id: String,
    pub is_disabled: bool,
    pub auto_create_release: bool,
    pub default_guided_failure_mode: String,
    pub default_to_skip_if_already_installed: bool,
    pub is_discrete_channel_release: bool,
    pub is_version_controlled: bool,
    pub included_library_variable_sets: Vec<String>,
    pub tenanted_deployment_participation: String,
    pub deployment_process_id: String,
    pub variable_set_id: String,
    pub cloned_from_project_id: String,
    pub space_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProjectsState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub is_clone: TfBool,
    pub projects: TfBlocks<ProjectItem>,
}

pub struct Projects;

impl Listing for Projects {
    type Model = Project;
    type Item = ProjectItem;
    type State = ProjectsState;

    const NAME: &'static str = "octopusdeploy_projects";
    const RESULTS: &'static str = "projects";
    const SINGULAR: &'static str = "project";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("slug", schema::text()),
            ("description", schema::text()),
            ("lifecycle_id", schema::text()),
            ("project_group_id", schema::text()),
            ("is_disabled", schema::flag()),
            ("auto_create_release", schema::flag()),
            ("default_guided_failure_mode", schema::text()),
            ("default_to_skip_if_already_installed", schema::flag()),
            ("is_discrete_channel_release", schema::flag()),
            ("is_version_controlled", schema::flag()),
            ("included_library_variable_sets", schema::text_list()),
            ("tenanted_deployment_participation", schema::text()),
            ("deployment_process_id", schema::text()),
            ("variable_set_id", schema::text()),
            ("cloned_from_project_id", schema::text()),
            ("space_id", schema::text()),
        ]
    }

    fn filter_attributes() -> Vec<(&'static str, Attribute)> {
        vec![(
            "is_clone",
            schema::optional(schema::flag(), "A filter to search for cloned resources."),
        )]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    fn filter(config: &Self::State, query: Query) -> Query {
        if is_set(&config.is_clone) {
            query.with("clone", "true")
        } else {
            query
        }
    }

    fn item(_config: &Self::State, project: &Project) -> Option<ProjectItem> {
        Some(ProjectItem {
            id: project.id.clone().unwrap_or_default(),
            name: project.name.clone(),
            slug: project.slug.clone().unwrap_or_default(),
            description: project.description.clone().unwrap_or_default(),
            lifecycle_id: project.lifecycle_id.clone(),
            project_group_id: project.project_group_id.clone(),
            is_disabled: project.is_disabled,
            auto_create_release: project.auto_create_release,
            default_guided_failure_mode: project.default_guided_failure_mode.clone().unwrap_or_default(),
            default_to_skip_if_already_installed: project.default_to_skip_if_already_installed,
            is_discrete_channel_release: project.is_discrete_channel_release,
            is_version_controlled: project.is_version_controlled,
            included_library_variable_sets: project.included_library_variable_set_ids.clone(),
            tenanted_deployment_participation: project.tenanted_deployment_participation.clone().unwrap_or_default(),
            deployment_process_id: project.deployment_process_id.clone().unwrap_or_default(),
            variable_set_id: project.variable_set_id.clone().unwrap_or_default(),
            cloned_from_project_id: project.cloned_from_project_id.clone().unwrap_or_default(),
            space_id: project.space_id.clone().unwrap_or_default(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<ProjectItem> {
        &mut state.projects
    }
}
