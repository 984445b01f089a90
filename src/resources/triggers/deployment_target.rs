use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::Schema};

use super::{unexpected, TriggerFields};
use crate::client::Client;
use crate::framework::value::{self, TfBool, TfStrings};
use crate::framework::{schema, Error, ManagedResource, Validation};
use crate::model::trigger::{ProjectTrigger, TriggerAction, TriggerFilter};
use crate::resources::space_replacement;

pub const EVENT_GROUPS: [&str; 5] = [
    "Machine",
    "MachineCritical",
    "MachineAvailableForDeployment",
    "MachineUnavailableForDeployment",
    "MachineHealthChanged",
];

pub const EVENT_CATEGORIES: [&str; 9] = [
    "MachineCleanupFailed",
    "MachineAdded",
    "MachineDeploymentRelatedPropertyWasUpdated",
    "MachineDisabled",
    "MachineEnabled",
    "MachineHealthy",
    "MachineUnavailable",
    "MachineUnhealthy",
    "MachineHasWarnings",
];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DeploymentTargetTriggerState {
    #[serde(flatten)]
    pub trigger: TriggerFields,
    pub should_redeploy: TfBool,
    pub event_groups: TfStrings,
    pub event_categories: TfStrings,
    pub roles: TfStrings,
    pub environment_ids: TfStrings,
}

fn expand(state: &DeploymentTargetTriggerState) -> ProjectTrigger {
    state.trigger.expand(
        TriggerFilter::Machine {
            environment_ids: value::strings(&state.environment_ids),
            roles: value::strings(&state.roles),
            event_groups: value::strings(&state.event_groups),
            event_categories: value::strings(&state.event_categories),
        },
        TriggerAction::AutoDeploy {
            should_redeploy_when_machine_has_been_deployed_to: value::boolean(&state.should_redeploy),
        },
    )
}

fn flatten(trigger: &ProjectTrigger, state: &mut DeploymentTargetTriggerState) -> Result<(), Error> {
    let TriggerFilter::Machine {
        environment_ids,
        roles,
        event_groups,
        event_categories,
    } = &trigger.filter
    else {
        return Err(unexpected("MachineFilter", trigger.filter.filter_type()));
    };
    let TriggerAction::AutoDeploy {
        should_redeploy_when_machine_has_been_deployed_to,
    } = &trigger.action
    else {
        return Err(unexpected("AutoDeploy", trigger.action.action_type()));
    };

    state.trigger.flatten(trigger);
    value::set_optional(&mut state.should_redeploy, *should_redeploy_when_machine_has_been_deployed_to);
    value::set_optional_list(&mut state.event_groups, event_groups);
    value::set_optional_list(&mut state.event_categories, event_categories);
    value::set_optional_list(&mut state.roles, roles);
    value::set_optional_list(&mut state.environment_ids, environment_ids);
    Ok(())
}

fn list_of(values: &[&str]) -> String {
    values
        .iter()
        .map(|value| format!("`{value}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct DeploymentTargetTriggerResource;

#[async_trait]
impl ManagedResource for DeploymentTargetTriggerResource {
    type State = DeploymentTargetTriggerState;

    const NAME: &'static str = "octopusdeploy_project_deployment_target_trigger";

    fn schema() -> Schema {
        schema::schema(schema::block(
            "This resource manages a trigger that deploys to deployment targets when they change.",
            vec![
                ("id", schema::id()),
                ("name", schema::name("trigger")),
                ("project_id", schema::required(schema::text(), "The ID of the project to attach the trigger.")),
                ("is_disabled", schema::optional(schema::flag(), "Disables the trigger from being run when set.")),
                (
                    "should_redeploy",
                    schema::optional(
                        schema::flag(),
                        "Enable to re-deploy to the deployment targets even if they are already up-to-date with the current deployment.",
                    ),
                ),
                (
                    "event_groups",
                    schema::optional(
                        schema::text_list(),
                        &format!("Apply event group filters to restrict which deployment targets will actually cause the trigger to fire. Valid groups are {}.", list_of(&EVENT_GROUPS)),
                    ),
                ),
                (
                    "event_categories",
                    schema::optional(
                        schema::text_list(),
                        &format!("Apply event category filters to restrict which deployment targets will actually cause the trigger to fire. Valid categories are {}.", list_of(&EVENT_CATEGORIES)),
                    ),
                ),
                ("roles", schema::optional(schema::text_list(), "Apply deployment target role filters to the trigger.")),
                ("environment_ids", schema::optional(schema::text_list(), "Apply environment filters to the trigger.")),
                ("space_id", schema::space_id("trigger")),
            ],
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("name", &config.trigger.name);
        validation.not_empty("project_id", &config.trigger.project_id);
        validation.each_one_of("event_groups", &config.event_groups, &EVENT_GROUPS);
        validation.each_one_of("event_categories", &config.event_categories, &EVENT_CATEGORIES);
    }

    fn plan(state: &mut Self::State) {
        state.trigger.plan();
    }

    fn replace_on_change(prior: &Self::State, proposed: &Self::State) -> Vec<AttributePath> {
        space_replacement(&prior.trigger.space_id, &proposed.trigger.space_id)
    }

    fn id(state: &Self::State) -> String {
        value::string(&state.trigger.id)
    }

    fn name(state: &Self::State) -> String {
        value::string(&state.trigger.name)
    }

    fn with_id(id: String) -> Self::State {
        DeploymentTargetTriggerState {
            trigger: TriggerFields::with_id(id),
            ..Default::default()
        }
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let space_id = value::opt_string(&planned.trigger.space_id);
        let created = client.add(space_id.as_deref(), &expand(&planned)).await?;
        let mut state = planned;
        flatten(&created, &mut state)?;
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let space_id = value::opt_string(&state.trigger.space_id);
        let Some(trigger) = client
            .find::<ProjectTrigger>(space_id.as_deref(), &value::string(&state.trigger.id))
            .await?
        else {
            return Ok(None);
        };
        let mut state = state;
        flatten(&trigger, &mut state)?;
        Ok(Some(state))
    }

    async fn update(client: &Client, _prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let space_id = value::opt_string(&planned.trigger.space_id);
        let updated = client
            .update(space_id.as_deref(), &value::string(&planned.trigger.id), &expand(&planned))
            .await?;
        let mut state = planned;
        flatten(&updated, &mut state)?;
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let space_id = value::opt_string(&state.trigger.space_id);
        client
            .delete::<ProjectTrigger>(space_id.as_deref(), &value::string(&state.trigger.id))
            .await?;
        Ok(())
    }
}
