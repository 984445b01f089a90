use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::{NestedBlock, Schema}, value::Value};

use super::deployment_action_slug_package::{self as package, DeploymentActionSlugPackageState};
use super::{unexpected, TriggerFields};
use crate::client::Client;
use crate::framework::value::{self, TfBlocks, TfString};
use crate::framework::{schema, Error, ManagedResource, Validation};
use crate::model::trigger::{DeploymentActionSlugPackage, ProjectTrigger, TriggerAction, TriggerFilter};
use crate::resources::space_replacement;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ExternalFeedTriggerState {
    #[serde(flatten)]
    pub trigger: TriggerFields,
    pub channel_id: TfString,
    pub package: TfBlocks<DeploymentActionSlugPackageState>,
    pub primary_package: TfBlocks<DeploymentActionSlugPackageState>,
}

fn expand(state: &ExternalFeedTriggerState) -> ProjectTrigger {
    let primary = value::blocks(&state.primary_package).into_iter().map(|primary| DeploymentActionSlugPackage {
        deployment_action_slug: value::string(&primary.deployment_action_slug),
        package_reference: String::new(),
    });
    let packages = value::blocks(&state.package)
        .into_iter()
        .map(package::expand)
        .chain(primary)
        .collect();

    state.trigger.expand(
        TriggerFilter::Feed { packages },
        TriggerAction::CreateRelease {
            channel_id: value::opt_string(&state.channel_id),
        },
    )
}

/// Primary packages are the ones without a package reference.
fn set_packages(target: &mut TfBlocks<DeploymentActionSlugPackageState>, packages: Vec<DeploymentActionSlugPackageState>) {
    if packages.is_empty() && matches!(target, Value::Null) {
        return;
    }
    *target = value::blocks_from(packages);
}

fn flatten(trigger: &ProjectTrigger, state: &mut ExternalFeedTriggerState) -> Result<(), Error> {
    let (TriggerFilter::Feed { packages }, TriggerAction::CreateRelease { channel_id }) = (&trigger.filter, &trigger.action)
    else {
        return Err(match trigger.filter {
            TriggerFilter::Feed { .. } => unexpected("CreateRelease", trigger.action.action_type()),
            _ => unexpected("FeedFilter", trigger.filter.filter_type()),
        });
    };

    state.trigger.flatten(trigger);
    value::set_string(&mut state.channel_id, channel_id.as_deref());

    let (primary, referenced): (Vec<_>, Vec<_>) = packages
        .iter()
        .partition(|package| package.package_reference.is_empty());
    set_packages(&mut state.package, referenced.into_iter().map(package::flatten).collect());
    set_packages(
        &mut state.primary_package,
        primary
            .into_iter()
            .map(|primary| DeploymentActionSlugPackageState {
                deployment_action_slug: Value::Value(primary.deployment_action_slug.clone()),
                package_reference: Value::Null,
            })
            .collect(),
    );
    Ok(())
}

pub struct ExternalFeedTriggerResource;

#[async_trait]
impl ManagedResource for ExternalFeedTriggerResource {
    type State = ExternalFeedTriggerState;

    const NAME: &'static str = "octopusdeploy_external_feed_create_release_trigger";

    fn schema() -> Schema {
        schema::schema(schema::with_blocks(
            schema::block(
                "This resource manages an external feed trigger that creates a release when a watched package changes.",
                vec![
                    ("id", schema::id()),
                    ("name", schema::name("trigger")),
                    ("project_id", schema::required(schema::text(), "The ID of the project to attach the trigger.")),
                    ("channel_id", schema::required(schema::text(), "The ID of the channel in which the release will be created.")),
                    ("is_disabled", schema::optional(schema::flag(), "Disables the trigger from being run when set.")),
                    ("space_id", schema::space_id("trigger")),
                ],
            ),
            vec![
                (
                    "package",
                    NestedBlock::List(package::block(
                        "A package referenced by a deployment step. A change to any of them creates a release.",
                        true,
                    )),
                ),
                (
                    "primary_package",
                    NestedBlock::List(package::block(
                        "The primary package of a deployment step. A change to any of them creates a release.",
                        false,
                    )),
                ),
            ],
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("name", &config.trigger.name);
        validation.not_empty("project_id", &config.trigger.project_id);
        validation.not_empty("channel_id", &config.channel_id);
        for (index, package) in value::blocks(&config.package).into_iter().enumerate() {
            validation.within("package", index, |validation| {
                validation.not_empty("deployment_action_slug", &package.deployment_action_slug);
                validation.not_empty("package_reference", &package.package_reference);
            });
        }
        for (index, primary) in value::blocks(&config.primary_package).into_iter().enumerate() {
            validation.within("primary_package", index, |validation| {
                validation.not_empty("deployment_action_slug", &primary.deployment_action_slug);
                if matches!(&primary.package_reference, Value::Value(reference) if !reference.is_empty()) {
                    validation.error(
                        "package_reference",
                        "package_reference is not allowed on a primary package",
                        "a primary package is identified by its step alone",
                    );
                }
            });
        }
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
        ExternalFeedTriggerState {
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

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::test::client_for;
    use crate::framework::test::assert_schema_matches_state;

    fn package_state(slug: &str, reference: Option<&str>) -> DeploymentActionSlugPackageState {
        DeploymentActionSlugPackageState {
            deployment_action_slug: Value::Value(slug.into()),
            package_reference: reference.map_or(Value::Null, |reference| Value::Value(reference.into())),
        }
    }

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<ExternalFeedTriggerState>(&ExternalFeedTriggerResource::schema());
    }

    #[test]
    fn primary_packages_are_sent_without_a_reference() {
        let mut state = ExternalFeedTriggerState {
            channel_id: Value::Value("Channels-1".into()),
            package: value::blocks_from(vec![package_state("deploy-web", Some("nginx"))]),
            primary_package: value::blocks_from(vec![package_state("deploy-api", None)]),
            ..Default::default()
        };
        state.trigger.name = Value::Value("on new image".into());
        state.trigger.project_id = Value::Value("Projects-1".into());

        let trigger = expand(&state);
        let TriggerFilter::Feed { packages } = &trigger.filter else {
            panic!("expected a feed filter");
        };
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[1].deployment_action_slug, "deploy-api");
        assert_eq!(packages[1].package_reference, "");

        let mut flattened = ExternalFeedTriggerState::default();
        flatten(&trigger, &mut flattened).unwrap();
        assert_eq!(flattened.package, state.package);
        assert_eq!(flattened.primary_package, state.primary_package);
    }

    #[test]
    fn reference_on_primary_package_is_rejected() {
        let config = ExternalFeedTriggerState {
            primary_package: value::blocks_from(vec![package_state("deploy-api", Some("api"))]),
            ..Default::default()
        };
        let mut validation = Validation::default();
        ExternalFeedTriggerResource::validate(&config, &mut validation);
        assert_eq!(validation.issues().len(), 1);
        assert_eq!(validation.issues()[0].path.len(), 3);
    }

    #[tokio::test]
    async fn machine_triggers_are_not_read_as_feed_triggers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/projecttriggers/ProjectTriggers-3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Id": "ProjectTriggers-3",
                "Name": "new targets",
                "ProjectId": "Projects-1",
                "Filter": { "FilterType": "MachineFilter", "Roles": ["web"] },
                "Action": { "ActionType": "AutoDeploy", "ShouldRedeployWhenMachineHasBeenDeployedTo": true }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let err = ExternalFeedTriggerResource::read(
            &client,
            ExternalFeedTriggerResource::with_id("ProjectTriggers-3".into()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::UnexpectedType { expected: "FeedFilter", .. }));
    }

    #[tokio::test]
    async fn create_posts_feed_filter_and_release_action() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/Spaces-1/projecttriggers"))
            .and(body_partial_json(serde_json::json!({
                "ProjectId": "Projects-1",
                "Filter": {
                    "FilterType": "FeedFilter",
                    "Packages": [{ "DeploymentActionSlug": "deploy-web", "PackageReference": "nginx" }]
                },
                "Action": { "ActionType": "CreateRelease", "ChannelId": "Channels-1" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "Id": "ProjectTriggers-9",
                "Name": "on new image",
                "ProjectId": "Projects-1",
                "IsDisabled": false,
                "SpaceId": "Spaces-1",
                "Filter": {
                    "FilterType": "FeedFilter",
                    "Packages": [{ "DeploymentActionSlug": "deploy-web", "PackageReference": "nginx" }]
                },
                "Action": { "ActionType": "CreateRelease", "ChannelId": "Channels-1" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut planned = ExternalFeedTriggerState {
            channel_id: Value::Value("Channels-1".into()),
            package: value::blocks_from(vec![package_state("deploy-web", Some("nginx"))]),
            ..Default::default()
        };
        planned.trigger.name = Value::Value("on new image".into());
        planned.trigger.project_id = Value::Value("Projects-1".into());
        ExternalFeedTriggerResource::plan(&mut planned);

        let client = client_for(&server, Some("Spaces-1"));
        let state = ExternalFeedTriggerResource::create(&client, planned).await.unwrap();
        assert_eq!(state.trigger.id, Value::Value("ProjectTriggers-9".into()));
        assert_eq!(state.trigger.is_disabled, Value::Null);
        assert_eq!(state.primary_package, Value::Null);
    }
}
