use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use super::{api_version, registry_path, FeedFields, FeedKind};
use crate::framework::value::{self, TfString};
use crate::framework::{schema, Validation};
use crate::model::feed::{AwsElasticContainerRegistry, Feed, FeedCommon};
use crate::model::SensitiveValue;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AwsEcrState {
    #[serde(flatten)]
    pub feed: FeedFields,
    pub region: TfString,
    pub access_key: TfString,
    pub secret_key: TfString,
    pub api_version: TfString,
    pub registry_path: TfString,
}

pub struct AwsEcr;

impl FeedKind for AwsEcr {
    type State = AwsEcrState;

    const NAME: &'static str = "octopusdeploy_aws_elastic_container_registry";
    const FEED_TYPE: &'static str = "AwsElasticContainerRegistry";
    const DESCRIPTION: &'static str = "This resource manages an AWS Elastic Container Registry in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        vec![
            ("region", schema::required(schema::text(), "The AWS region of the registry.")),
            ("access_key", schema::required(schema::text(), "The AWS access key used to read from the registry.")),
            (
                "secret_key",
                schema::sensitive(schema::required(schema::text(), "The AWS secret key used to read from the registry.")),
            ),
            ("api_version", api_version()),
            ("registry_path", registry_path()),
        ]
    }

    fn fields(state: &Self::State) -> &FeedFields {
        &state.feed
    }

    fn fields_mut(state: &mut Self::State) -> &mut FeedFields {
        &mut state.feed
    }

    fn with_fields(feed: FeedFields) -> Self::State {
        AwsEcrState {
            feed,
            ..Default::default()
        }
    }

    fn expand(state: &Self::State, common: FeedCommon) -> Feed {
        Feed::AwsElasticContainerRegistry(AwsElasticContainerRegistry {
            common,
            region: value::string(&state.region),
            access_key: value::string(&state.access_key),
            secret_key: SensitiveValue::from_option(value::opt_string(&state.secret_key)),
            api_version: value::opt_string(&state.api_version),
            registry_path: value::opt_string(&state.registry_path),
        })
    }

    fn flatten(feed: &Feed, state: &mut Self::State) -> bool {
        match feed {
            Feed::AwsElasticContainerRegistry(ecr) => {
                value::set(&mut state.region, ecr.region.clone());
                value::set(&mut state.access_key, ecr.access_key.clone());
                value::set_optional_string(&mut state.api_version, ecr.api_version.as_deref());
                value::set_optional_string(&mut state.registry_path, ecr.registry_path.as_deref());
                true
            }
            _ => false,
        }
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("region", &config.region);
        validation.not_empty("access_key", &config.access_key);
        validation.not_empty("secret_key", &config.secret_key);
    }
}

#[cfg(test)]
mod tests {
    use tf_provider::value::Value;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::test::client_for;
    use crate::framework::test::assert_schema_matches_state;
    use crate::framework::ManagedResource;
    use crate::resources::feeds::test::{full_fields, round_trip, text};
    use crate::resources::feeds::FeedResource;

    type Resource = FeedResource<AwsEcr>;

    #[test]
    fn schema_matches_state() {
        let schema = Resource::schema();
        assert_schema_matches_state::<AwsEcrState>(&schema);
        assert!(schema.block.attributes["secret_key"].sensitive);
    }

    #[tokio::test]
    async fn create_sends_the_secret_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/Spaces-1/feeds"))
            .and(body_partial_json(serde_json::json!({
                "FeedType": "AwsElasticContainerRegistry",
                "Region": "eu-west-1",
                "AccessKey": "AKIA",
                "SecretKey": { "HasValue": true, "NewValue": "shh" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "Id": "Feeds-30",
                "FeedType": "AwsElasticContainerRegistry",
                "Name": "ecr",
                "Region": "eu-west-1",
                "AccessKey": "AKIA",
                "SecretKey": { "HasValue": true },
                "SpaceId": "Spaces-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut planned = AwsEcrState {
            region: Value::Value("eu-west-1".into()),
            access_key: Value::Value("AKIA".into()),
            secret_key: Value::Value("shh".into()),
            ..Default::default()
        };
        planned.feed.name = Value::Value("ecr".into());
        Resource::plan(&mut planned);

        let client = client_for(&server, Some("Spaces-1"));
        let state = Resource::create(&client, planned).await.unwrap();
        assert_eq!(state.feed.id, Value::Value("Feeds-30".into()));
        assert_eq!(state.secret_key, Value::Value("shh".into()));
        assert_eq!(state.feed.package_acquisition_location_options, Value::Value(vec![]));
    }

    #[test]
    fn flatten_restores_the_configured_feed() {
        let planned = AwsEcrState {
            feed: full_fields(),
            region: text("eu-west-1"),
            access_key: text("AKIA123"),
            secret_key: text("s3cr3t"),
            api_version: text("v2"),
            registry_path: text("team"),
        };
        let blank = AwsEcrState {
            secret_key: planned.secret_key.clone(),
            ..Default::default()
        };
        assert_eq!(round_trip::<AwsEcr>(&planned, blank), planned);
    }
}
