use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::Schema, value::Value};

use super::{space_replacement, GUIDED_FAILURE_MODES, TENANTED_DEPLOYMENT_MODES};
use crate::client::Client;
use crate::framework::value::{self, TfBool, TfString, TfStrings};
use crate::framework::{schema, Error, ManagedResource, Validation};
use crate::model::project::Project;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProjectState {
    pub id: TfString,
    pub name: TfString,
    pub description: TfString,
    pub slug: TfString,
    pub lifecycle_id: TfString,
    pub project_group_id: TfString,
    pub is_disabled: TfBool,
    pub auto_create_release: TfBool,
    pub default_guided_failure_mode: TfString,
    pub default_to_skip_if_already_installed: TfBool,
    pub is_discrete_channel_release: TfBool,
    pub is_version_controlled: TfBool,
    pub included_library_variable_sets: TfStrings,
    pub tenanted_deployment_participation: TfString,
    pub deployment_process_id: TfString,
    pub variable_set_id: TfString,
    pub space_id: TfString,
}

fn expand(state: &ProjectState) -> Project {
    Project {
        id: value::opt_string(&state.id),
        name: value::string(&state.name),
        description: value::opt_string(&state.description),
        slug: value::opt_string(&state.slug),
        lifecycle_id: value::string(&state.lifecycle_id),
        project_group_id: value::string(&state.project_group_id),
        is_disabled: value::boolean(&state.is_disabled),
        auto_create_release: value::boolean(&state.auto_create_release),
        default_guided_failure_mode: value::opt_string(&state.default_guided_failure_mode),
        default_to_skip_if_already_installed: value::boolean(&state.default_to_skip_if_already_installed),
        is_discrete_channel_release: value::boolean(&state.is_discrete_channel_release),
        is_version_controlled: value::boolean(&state.is_version_controlled),
        included_library_variable_set_ids: value::strings(&state.included_library_variable_sets),
        tenanted_deployment_participation: value::opt_string(&state.tenanted_deployment_participation),
        deployment_process_id: value::opt_string(&state.deployment_process_id),
        variable_set_id: value::opt_string(&state.variable_set_id),
        cloned_from_project_id: None,
        space_id: value::opt_string(&state.space_id),
    }
}

fn flatten(project: &Project, state: &mut ProjectState) {
    value::set_string(&mut state.id, project.id.as_deref());
    value::set(&mut state.name, project.name.clone());
    value::set_optional_string(&mut state.description, project.description.as_deref());
    value::set_string(&mut state.slug, project.slug.as_deref());
    value::set(&mut state.lifecycle_id, project.lifecycle_id.clone());
    value::set(&mut state.project_group_id, project.project_group_id.clone());
    value::set_optional(&mut state.is_disabled, project.is_disabled);
    value::set_optional(&mut state.auto_create_release, project.auto_create_release);
    value::set_string(&mut state.default_guided_failure_mode, project.default_guided_failure_mode.as_deref());
    value::set_optional(
        &mut state.default_to_skip_if_already_installed,
        project.default_to_skip_if_already_installed,
    );
    value::set_optional(&mut state.is_discrete_channel_release, project.is_discrete_channel_release);
    value::set_optional(&mut state.is_version_controlled, project.is_version_controlled);
    value::set_optional_list(
        &mut state.included_library_variable_sets,
        &project.included_library_variable_set_ids,
    );
    value::set_string(
        &mut state.tenanted_deployment_participation,
        project.tenanted_deployment_participation.as_deref(),
    );
    value::set_string(&mut state.deployment_process_id, project.deployment_process_id.as_deref());
    value::set_string(&mut state.variable_set_id, project.variable_set_id.as_deref());
    value::set_string(&mut state.space_id, project.space_id.as_deref());
}

pub struct ProjectResource;

#[async_trait]
impl ManagedResource for ProjectResource {
    type State = ProjectState;

    const NAME: &'static str = "octopusdeploy_project";

    fn schema() -> Schema {
        schema::schema(schema::block(
            "This resource manages projects in Octopus Deploy.",
            vec![
                ("id", schema::id()),
                ("name", schema::name("project")),
                ("description", schema::description("project")),
                ("slug", schema::slug("project")),
                ("lifecycle_id", schema::required(schema::text(), "The lifecycle ID associated with this project.")),
                ("project_group_id", schema::required(schema::text(), "The project group ID associated with this project.")),
                ("is_disabled", schema::optional(schema::flag(), "Whether deployments of this project are disabled.")),
                ("auto_create_release", schema::optional(schema::flag(), "Whether releases are created automatically when packages are pushed.")),
                (
                    "default_guided_failure_mode",
                    schema::optional_computed(
                        schema::text(),
                        "The default guided failure mode. Valid modes are `EnvironmentDefault`, `Off`, or `On`.",
                    ),
                ),
                (
                    "default_to_skip_if_already_installed",
                    schema::optional(schema::flag(), "Whether deployment steps skip packages that are already installed."),
                ),
                (
                    "is_discrete_channel_release",
                    schema::optional(schema::flag(), "Treats releases of different channels to the same environment as a separate deployment dimension."),
                ),
                ("is_version_controlled", schema::optional(schema::flag(), "Whether the project is stored in version control.")),
                (
                    "included_library_variable_sets",
                    schema::optional(schema::text_list(), "The library variable set IDs included in this project."),
                ),
                ("tenanted_deployment_participation", schema::tenanted_deployment_participation()),
                ("deployment_process_id", schema::computed(schema::text(), "The deployment process ID of this project.")),
                ("variable_set_id", schema::computed(schema::text(), "The variable set ID of this project.")),
                ("space_id", schema::space_id("project")),
            ],
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("name", &config.name);
        validation.one_of("default_guided_failure_mode", &config.default_guided_failure_mode, &GUIDED_FAILURE_MODES);
        validation.one_of(
            "tenanted_deployment_participation",
            &config.tenanted_deployment_participation,
            &TENANTED_DEPLOYMENT_MODES,
        );
    }

    fn plan(state: &mut Self::State) {
        value::unknown_if_null(&mut state.id);
        value::unknown_if_null(&mut state.slug);
        value::unknown_if_null(&mut state.default_guided_failure_mode);
        value::unknown_if_null(&mut state.tenanted_deployment_participation);
        value::unknown_if_null(&mut state.deployment_process_id);
        value::unknown_if_null(&mut state.variable_set_id);
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
        ProjectState {
            id: Value::Value(id),
            ..Default::default()
        }
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let project = expand(&planned);
        let created = client.add(project.space_id.as_deref(), &project).await?;
        let mut state = planned;
        flatten(&created, &mut state);
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let space_id = value::opt_string(&state.space_id);
        let Some(project) = client
            .find::<Project>(space_id.as_deref(), &value::string(&state.id))
            .await?
        else {
            return Ok(None);
        };
        let mut state = state;
        flatten(&project, &mut state);
        Ok(Some(state))
    }

    async fn update(client: &Client, prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let mut project = expand(&planned);
        // Computed IDs are not part of the configuration; keep what the server assigned.
        project.deployment_process_id = project
            .deployment_process_id
            .or_else(|| value::opt_string(&prior.deployment_process_id));
        project.variable_set_id = project
            .variable_set_id
            .or_else(|| value::opt_string(&prior.variable_set_id));

        let updated = client
            .update(project.space_id.as_deref(), &value::string(&planned.id), &project)
            .await?;
        let mut state = planned;
        flatten(&updated, &mut state);
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let space_id = value::opt_string(&state.space_id);
        client
            .delete::<Project>(space_id.as_deref(), &value::string(&state.id))
            .await?;
        Ok(())
    }
}
