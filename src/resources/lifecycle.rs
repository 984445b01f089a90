//! Lifecycles and their phases.
//!
//! Retention policies are optional blocks. When a lifecycle-level policy is not configured the
//! server applies its default (30 days); that default is not written back, so an unset block
//! stays unset.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::{NestedBlock, Schema}, value::Value};

use super::space_replacement;
use crate::client::Client;
use crate::framework::value::{self, TfBlocks, TfBool, TfInt, TfString, TfStrings};
use crate::framework::{schema, Error, ManagedResource, Validation};
use crate::model::lifecycle::{Lifecycle, Phase, RetentionPeriod};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RetentionPolicyState {
    pub unit: TfString,
    pub quantity_to_keep: TfInt,
    pub should_keep_forever: TfBool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PhaseState {
    pub id: TfString,
    pub name: TfString,
    pub automatic_deployment_targets: TfStrings,
    pub optional_deployment_targets: TfStrings,
    pub minimum_environments_before_promotion: TfInt,
    pub is_optional_phase: TfBool,
    #[serde(with = "tf_provider::value::serde_as_vec")]
    pub release_retention_policy: Value<RetentionPolicyState>,
    #[serde(with = "tf_provider::value::serde_as_vec")]
    pub tentacle_retention_policy: Value<RetentionPolicyState>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LifecycleState {
    pub id: TfString,
    pub name: TfString,
    pub description: TfString,
    pub space_id: TfString,
    pub phase: TfBlocks<PhaseState>,
    #[serde(with = "tf_provider::value::serde_as_vec")]
    pub release_retention_policy: Value<RetentionPolicyState>,
    #[serde(with = "tf_provider::value::serde_as_vec")]
    pub tentacle_retention_policy: Value<RetentionPolicyState>,
}

fn expand_policy(policy: &Value<RetentionPolicyState>) -> Option<RetentionPeriod> {
    let Value::Value(policy) = policy else {
        return None;
    };
    let default = RetentionPeriod::default();
    Some(RetentionPeriod {
        unit: value::opt_string(&policy.unit).unwrap_or(default.unit),
        quantity_to_keep: value::opt_int(&policy.quantity_to_keep).unwrap_or(default.quantity_to_keep),
        should_keep_forever: value::boolean(&policy.should_keep_forever),
    })
}

fn flatten_policy(policy: &RetentionPeriod) -> RetentionPolicyState {
    RetentionPolicyState {
        unit: Value::Value(policy.unit.clone()),
        quantity_to_keep: Value::Value(policy.quantity_to_keep),
        should_keep_forever: Value::Value(policy.should_keep_forever),
    }
}

/// A lifecycle-level policy; the server default stands in for an unset block.
fn flatten_lifecycle_policy(policy: &RetentionPeriod, target: &mut Value<RetentionPolicyState>) {
    if matches!(target, Value::Null) && *policy == RetentionPeriod::default() {
        return;
    }
    *target = Value::Value(flatten_policy(policy));
}

fn expand_phase(phase: &PhaseState) -> Phase {
    Phase {
        id: value::opt_string(&phase.id),
        name: value::string(&phase.name),
        automatic_deployment_targets: value::strings(&phase.automatic_deployment_targets),
        optional_deployment_targets: value::strings(&phase.optional_deployment_targets),
        minimum_environments_before_promotion: value::int(&phase.minimum_environments_before_promotion),
        is_optional_phase: value::boolean(&phase.is_optional_phase),
        release_retention_policy: expand_policy(&phase.release_retention_policy),
        tentacle_retention_policy: expand_policy(&phase.tentacle_retention_policy),
    }
}

/// Phases are positional; each one is flattened over the configured phase at the same index.
fn flatten_phase(phase: &Phase, state: &mut PhaseState) {
    value::set_string(&mut state.id, phase.id.as_deref());
    value::set(&mut state.name, phase.name.clone());
    value::set_optional_list(&mut state.automatic_deployment_targets, &phase.automatic_deployment_targets);
    value::set_optional_list(&mut state.optional_deployment_targets, &phase.optional_deployment_targets);
    value::set(
        &mut state.minimum_environments_before_promotion,
        phase.minimum_environments_before_promotion,
    );
    value::set(&mut state.is_optional_phase, phase.is_optional_phase);
    state.release_retention_policy = phase
        .release_retention_policy
        .as_ref()
        .map_or(Value::Null, |policy| Value::Value(flatten_policy(policy)));
    state.tentacle_retention_policy = phase
        .tentacle_retention_policy
        .as_ref()
        .map_or(Value::Null, |policy| Value::Value(flatten_policy(policy)));
}

fn expand(state: &LifecycleState) -> Lifecycle {
    Lifecycle {
        id: value::opt_string(&state.id),
        name: value::string(&state.name),
        description: value::opt_string(&state.description),
        space_id: value::opt_string(&state.space_id),
        phases: value::blocks(&state.phase).into_iter().map(expand_phase).collect(),
        release_retention_policy: expand_policy(&state.release_retention_policy).unwrap_or_default(),
        tentacle_retention_policy: expand_policy(&state.tentacle_retention_policy).unwrap_or_default(),
    }
}

fn flatten(lifecycle: &Lifecycle, state: &mut LifecycleState) {
    value::set_string(&mut state.id, lifecycle.id.as_deref());
    value::set(&mut state.name, lifecycle.name.clone());
    value::set_optional_string(&mut state.description, lifecycle.description.as_deref());
    value::set_string(&mut state.space_id, lifecycle.space_id.as_deref());

    let configured: Vec<PhaseState> = value::blocks(&state.phase).into_iter().cloned().collect();
    let phases = lifecycle
        .phases
        .iter()
        .enumerate()
        .map(|(index, phase)| {
            let mut phase_state = configured.get(index).cloned().unwrap_or_default();
            flatten_phase(phase, &mut phase_state);
            phase_state
        })
        .collect();
    state.phase = value::blocks_from(phases);

    flatten_lifecycle_policy(&lifecycle.release_retention_policy, &mut state.release_retention_policy);
    flatten_lifecycle_policy(&lifecycle.tentacle_retention_policy, &mut state.tentacle_retention_policy);
}

fn retention_policy_block() -> NestedBlock {
    NestedBlock::Optional(schema::block(
        "Defines the retention policy for releases or tentacles.",
        vec![
            (
                "unit",
                schema::optional_computed(
                    schema::text(),
                    "The unit of quantity to keep. Valid units are `Days` or `Items`.",
                ),
            ),
            ("quantity_to_keep", schema::optional_computed(schema::number(), "The number of days or items to keep.")),
            ("should_keep_forever", schema::optional_computed(schema::flag(), "Indicates if items should never be deleted.")),
        ],
    ))
}

fn plan_policy(policy: &mut Value<RetentionPolicyState>) {
    if let Value::Value(policy) = policy {
        value::unknown_if_null(&mut policy.unit);
        value::unknown_if_null(&mut policy.quantity_to_keep);
        value::unknown_if_null(&mut policy.should_keep_forever);
    }
}

fn validate_policy(validation: &mut Validation, name: &str, policy: &Value<RetentionPolicyState>) {
    let Value::Value(policy) = policy else {
        return;
    };
    validation.within(name, 0, |validation| {
        validation.one_of("unit", &policy.unit, &RetentionPeriod::UNITS);
        validation.at_least("quantity_to_keep", &policy.quantity_to_keep, 0);
        if value::boolean(&policy.should_keep_forever) && value::int(&policy.quantity_to_keep) > 0 {
            validation.error(
                "quantity_to_keep",
                "conflicting retention policy",
                "quantity_to_keep must be 0 when should_keep_forever is true",
            );
        }
    });
}

pub struct LifecycleResource;

#[async_trait]
impl ManagedResource for LifecycleResource {
    type State = LifecycleState;

    const NAME: &'static str = "octopusdeploy_lifecycle";

    fn schema() -> Schema {
        let phase = schema::with_blocks(
            schema::block(
                "Defines a phase in the lifecycle.",
                vec![
                    ("id", schema::computed(schema::text(), "The unique ID for this phase.")),
                    ("name", schema::required(schema::text(), "The name of this phase.")),
                    (
                        "automatic_deployment_targets",
                        schema::optional(
                            schema::text_list(),
                            "Environment IDs in this phase that a release is automatically deployed to when it is eligible for this phase.",
                        ),
                    ),
                    (
                        "optional_deployment_targets",
                        schema::optional(
                            schema::text_list(),
                            "Environment IDs in this phase that a release can be deployed to, but is not automatically deployed to.",
                        ),
                    ),
                    (
                        "minimum_environments_before_promotion",
                        schema::optional_computed(
                            schema::number(),
                            "The number of environments a release must be deployed to before it can be promoted. 0 means all.",
                        ),
                    ),
                    (
                        "is_optional_phase",
                        schema::optional_computed(
                            schema::flag(),
                            "If false a release must be deployed to this phase before it can be deployed to the next phase.",
                        ),
                    ),
                ],
            ),
            vec![
                ("release_retention_policy", retention_policy_block()),
                ("tentacle_retention_policy", retention_policy_block()),
            ],
        );

        schema::schema(schema::with_blocks(
            schema::block(
                "This resource manages lifecycles in Octopus Deploy.",
                vec![
                    ("id", schema::id()),
                    ("name", schema::name("lifecycle")),
                    ("description", schema::description("lifecycle")),
                    ("space_id", schema::space_id("lifecycle")),
                ],
            ),
            vec![
                ("phase", NestedBlock::List(phase)),
                ("release_retention_policy", retention_policy_block()),
                ("tentacle_retention_policy", retention_policy_block()),
            ],
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("name", &config.name);
        validate_policy(validation, "release_retention_policy", &config.release_retention_policy);
        validate_policy(validation, "tentacle_retention_policy", &config.tentacle_retention_policy);

        for (index, phase) in value::blocks(&config.phase).into_iter().enumerate() {
            validation.within("phase", index, |validation| {
                validation.not_empty("name", &phase.name);
                validation.at_least(
                    "minimum_environments_before_promotion",
                    &phase.minimum_environments_before_promotion,
                    0,
                );
                validate_policy(validation, "release_retention_policy", &phase.release_retention_policy);
                validate_policy(validation, "tentacle_retention_policy", &phase.tentacle_retention_policy);
            });
        }
    }

    fn plan(state: &mut Self::State) {
        value::unknown_if_null(&mut state.id);
        value::unknown_if_null(&mut state.space_id);
        plan_policy(&mut state.release_retention_policy);
        plan_policy(&mut state.tentacle_retention_policy);

        if let Value::Value(phases) = &mut state.phase {
            for phase in phases.iter_mut() {
                if let Value::Value(phase) = phase {
                    value::unknown_if_null(&mut phase.id);
                    value::unknown_if_null(&mut phase.minimum_environments_before_promotion);
                    value::unknown_if_null(&mut phase.is_optional_phase);
                    plan_policy(&mut phase.release_retention_policy);
                    plan_policy(&mut phase.tentacle_retention_policy);
                }
            }
        }
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
        LifecycleState {
            id: Value::Value(id),
            ..Default::default()
        }
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let lifecycle = expand(&planned);
        let created = client.add(lifecycle.space_id.as_deref(), &lifecycle).await?;
        let mut state = planned;
        flatten(&created, &mut state);
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let space_id = value::opt_string(&state.space_id);
        let Some(lifecycle) = client
            .find::<Lifecycle>(space_id.as_deref(), &value::string(&state.id))
            .await?
        else {
            return Ok(None);
        };
        let mut state = state;
        flatten(&lifecycle, &mut state);
        Ok(Some(state))
    }

    async fn update(client: &Client, _prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let lifecycle = expand(&planned);
        let updated = client
            .update(lifecycle.space_id.as_deref(), &value::string(&planned.id), &lifecycle)
            .await?;
        let mut state = planned;
        flatten(&updated, &mut state);
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let space_id = value::opt_string(&state.space_id);
        client
            .delete::<Lifecycle>(space_id.as_deref(), &value::string(&state.id))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::test::client_for;
    use crate::framework::test::assert_schema_matches_state;

    fn policy(unit: &str, quantity: i64) -> Value<RetentionPolicyState> {
        Value::Value(RetentionPolicyState {
            unit: Value::Value(unit.into()),
            quantity_to_keep: Value::Value(quantity),
            should_keep_forever: Value::Value(false),
        })
    }

    fn phase(name: &str) -> PhaseState {
        PhaseState {
            name: Value::Value(name.into()),
            automatic_deployment_targets: value::list_from(&["Environments-1"]),
            ..Default::default()
        }
    }

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<LifecycleState>(&LifecycleResource::schema());
    }

    #[test]
    fn missing_policies_use_the_server_default() {
        let state = LifecycleState {
            name: Value::Value("Default".into()),
            ..Default::default()
        };
        let lifecycle = expand(&state);
        assert_eq!(lifecycle.release_retention_policy.unit, "Days");
        assert_eq!(lifecycle.release_retention_policy.quantity_to_keep, 30);

        let mut state = state;
        flatten(&lifecycle, &mut state);
        assert_eq!(state.release_retention_policy, Value::Null);
        assert_eq!(state.tentacle_retention_policy, Value::Null);
    }

    #[test]
    fn non_default_policies_are_reported() {
        let mut state = LifecycleState::default();
        let lifecycle = Lifecycle {
            release_retention_policy: RetentionPeriod {
                unit: "Items".into(),
                quantity_to_keep: 3,
                should_keep_forever: false,
            },
            ..Default::default()
        };
        flatten(&lifecycle, &mut state);
        assert_eq!(state.release_retention_policy, policy("Items", 3));
    }

    #[test]
    fn phase_policies_are_validated_with_their_path() {
        let mut bad = phase("Dev");
        bad.release_retention_policy = policy("Weeks", 1);
        let config = LifecycleState {
            name: Value::Value("Default".into()),
            phase: value::blocks_from(vec![phase("Test"), bad]),
            ..Default::default()
        };

        let mut validation = Validation::default();
        LifecycleResource::validate(&config, &mut validation);
        let issues = validation.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path.len(), 5);
    }

    #[test]
    fn keep_forever_conflicts_with_a_quantity() {
        let config = LifecycleState {
            name: Value::Value("Default".into()),
            release_retention_policy: Value::Value(RetentionPolicyState {
                unit: Value::Value("Days".into()),
                quantity_to_keep: Value::Value(5),
                should_keep_forever: Value::Value(true),
            }),
            ..Default::default()
        };
        let mut validation = Validation::default();
        LifecycleResource::validate(&config, &mut validation);
        assert!(!validation.is_valid());
    }

    #[tokio::test]
    async fn create_assigns_phase_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/Spaces-1/lifecycles"))
            .and(body_partial_json(serde_json::json!({
                "Name": "Default",
                "Phases": [{ "Name": "Dev", "AutomaticDeploymentTargets": ["Environments-1"] }],
                "ReleaseRetentionPolicy": { "Unit": "Items", "QuantityToKeep": 3 }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "Id": "Lifecycles-2",
                "Name": "Default",
                "SpaceId": "Spaces-1",
                "Phases": [{
                    "Id": "Phases-9",
                    "Name": "Dev",
                    "AutomaticDeploymentTargets": ["Environments-1"],
                    "OptionalDeploymentTargets": [],
                    "MinimumEnvironmentsBeforePromotion": 0,
                    "IsOptionalPhase": false,
                    "ReleaseRetentionPolicy": null,
                    "TentacleRetentionPolicy": null
                }],
                "ReleaseRetentionPolicy": { "Unit": "Items", "QuantityToKeep": 3, "ShouldKeepForever": false },
                "TentacleRetentionPolicy": { "Unit": "Days", "QuantityToKeep": 30, "ShouldKeepForever": false }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut planned = LifecycleState {
            name: Value::Value("Default".into()),
            phase: value::blocks_from(vec![phase("Dev")]),
            release_retention_policy: policy("Items", 3),
            ..Default::default()
        };
        LifecycleResource::plan(&mut planned);

        let client = client_for(&server, Some("Spaces-1"));
        let state = LifecycleResource::create(&client, planned).await.unwrap();
        let phases = value::blocks(&state.phase);
        assert_eq!(phases[0].id, Value::Value("Phases-9".into()));
        assert_eq!(phases[0].optional_deployment_targets, Value::Null);
        assert_eq!(phases[0].is_optional_phase, Value::Value(false));
        assert_eq!(state.release_retention_policy, policy("Items", 3));
        assert_eq!(state.tentacle_retention_policy, Value::Null);
    }

    #[test]
    fn flatten_restores_the_configured_lifecycle() {
        let planned = LifecycleState {
            id: Value::Value("Lifecycles-3".into()),
            name: Value::Value("Production".into()),
            description: Value::Value("Dev, then test, then production".into()),
            space_id: Value::Value("Spaces-1".into()),
            phase: value::blocks_from(vec![
                PhaseState {
                    id: Value::Value("6f1e2a9c-0d1b-4c55-9c0f-3b1a2d4e5f60".into()),
                    optional_deployment_targets: value::list_from(&["Environments-4"]),
                    minimum_environments_before_promotion: Value::Value(1),
                    is_optional_phase: Value::Value(false),
                    release_retention_policy: policy("Items", 5),
                    tentacle_retention_policy: policy("Days", 14),
                    ..phase("Development")
                },
                PhaseState {
                    id: Value::Value("0a2b4c6d-8e0f-4a1b-9c3d-5e7f9a1b3c5d".into()),
                    automatic_deployment_targets: value::list_from(&["Environments-2", "Environments-3"]),
                    optional_deployment_targets: value::list_from(&["Environments-5"]),
                    minimum_environments_before_promotion: Value::Value(2),
                    is_optional_phase: Value::Value(true),
                    release_retention_policy: Value::Value(RetentionPolicyState {
                        unit: Value::Value("Days".into()),
                        quantity_to_keep: Value::Value(0),
                        should_keep_forever: Value::Value(true),
                    }),
                    tentacle_retention_policy: policy("Items", 3),
                    ..phase("Production")
                },
            ]),
            release_retention_policy: policy("Items", 10),
            tentacle_retention_policy: policy("Days", 60),
        };

        let mut state = LifecycleState::default();
        flatten(&expand(&planned), &mut state);
        assert_eq!(state, planned);
    }
}
