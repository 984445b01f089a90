use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::{NestedBlock, Schema}, value::Value};

use super::space_replacement;
use crate::client::Client;
use crate::framework::value::{self, TfBlocks, TfString, TfStrings};
use crate::framework::{schema, Error, ManagedResource, Validation};
use crate::model::tenant::Tenant;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProjectEnvironmentState {
    pub project_id: TfString,
    pub environments: TfStrings,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TenantState {
    pub id: TfString,
    pub name: TfString,
    pub description: TfString,
    pub tenant_tags: TfStrings,
    pub project_environment: TfBlocks<ProjectEnvironmentState>,
    pub space_id: TfString,
}

/// Blocks naming the same project are merged.
fn expand_project_environments(blocks: &TfBlocks<ProjectEnvironmentState>) -> BTreeMap<String, Vec<String>> {
    let mut projects: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for block in value::blocks(blocks) {
        let environments = projects.entry(value::string(&block.project_id)).or_default();
        for environment in value::strings(&block.environments) {
            if !environments.contains(&environment) {
                environments.push(environment);
            }
        }
    }
    projects
}

fn expand(state: &TenantState) -> Tenant {
    Tenant {
        id: value::opt_string(&state.id),
        name: value::string(&state.name),
        description: value::opt_string(&state.description),
        tenant_tags: value::strings(&state.tenant_tags),
        project_environments: expand_project_environments(&state.project_environment),
        space_id: value::opt_string(&state.space_id),
    }
}

fn flatten(tenant: &Tenant, state: &mut TenantState) {
    value::set_string(&mut state.id, tenant.id.as_deref());
    value::set(&mut state.name, tenant.name.clone());
    value::set_optional_string(&mut state.description, tenant.description.as_deref());
    value::set_optional_list(&mut state.tenant_tags, &tenant.tenant_tags);
    state.project_environment = value::blocks_from(
        tenant
            .project_environments
            .iter()
            .map(|(project_id, environments)| ProjectEnvironmentState {
                project_id: Value::Value(project_id.clone()),
                environments: value::list_from(environments),
            })
            .collect(),
    );
    value::set_string(&mut state.space_id, tenant.space_id.as_deref());
}

pub struct TenantResource;

#[async_trait]
impl ManagedResource for TenantResource {
    type State = TenantState;

    const NAME: &'static str = "octopusdeploy_tenant";

    fn schema() -> Schema {
        let project_environment = schema::block(
            "A project this tenant is connected to, and the environments it deploys to.",
            vec![
                ("project_id", schema::required(schema::text(), "The project ID associated with this tenant.")),
                (
                    "environments",
                    schema::required(
                        schema::text_list(),
                        "A list of environment IDs associated with this tenant through a project.",
                    ),
                ),
            ],
        );

        schema::schema(schema::with_blocks(
            schema::block(
                "This resource manages tenants in Octopus Deploy.",
                vec![
                    ("id", schema::id()),
                    ("name", schema::name("tenant")),
                    ("description", schema::description("tenant")),
                    (
                        "tenant_tags",
                        schema::optional(
                            schema::text_set(),
                            "A list of tenant tags associated with this resource, in the form `tag set name/tag name`.",
                        ),
                    ),
                    ("space_id", schema::space_id("tenant")),
                ],
            ),
            vec![("project_environment", NestedBlock::Set(project_environment))],
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("name", &config.name);
        for (index, block) in value::blocks(&config.project_environment).into_iter().enumerate() {
            validation.within("project_environment", index, |validation| {
                validation.not_empty("project_id", &block.project_id);
            });
        }
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
        TenantState {
            id: Value::Value(id),
            ..Default::default()
        }
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let tenant = expand(&planned);
        let created = client.add(tenant.space_id.as_deref(), &tenant).await?;
        let mut state = planned;
        flatten(&created, &mut state);
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let space_id = value::opt_string(&state.space_id);
        let Some(tenant) = client
            .find::<Tenant>(space_id.as_deref(), &value::string(&state.id))
            .await?
        else {
            return Ok(None);
        };
        let mut state = state;
        flatten(&tenant, &mut state);
        Ok(Some(state))
    }

    async fn update(client: &Client, _prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let tenant = expand(&planned);
        let updated = client
            .update(tenant.space_id.as_deref(), &value::string(&planned.id), &tenant)
            .await?;
        let mut state = planned;
        flatten(&updated, &mut state);
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let space_id = value::opt_string(&state.space_id);
        client
            .delete::<Tenant>(space_id.as_deref(), &value::string(&state.id))
            .await?;
        Ok(())
    }
}
