use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use super::{api_version, feed_uri, registry_path, CredentialFields, FeedFields, FeedKind};
use crate::framework::value::{self, TfString};
use crate::framework::Validation;
use crate::model::feed::{DockerFeed, Feed, FeedCommon};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DockerRegistryState {
    #[serde(flatten)]
    pub feed: FeedFields,
    #[serde(flatten)]
    pub credentials: CredentialFields,
    pub feed_uri: TfString,
    pub api_version: TfString,
    pub registry_path: TfString,
}

pub struct DockerRegistry;

impl FeedKind for DockerRegistry {
    type State = DockerRegistryState;

    const NAME: &'static str = "octopusdeploy_docker_container_registry";
    const FEED_TYPE: &'static str = "Docker";
    const DESCRIPTION: &'static str = "This resource manages a Docker Container Registry in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        let mut attributes = vec![
            ("feed_uri", feed_uri()),
            ("api_version", api_version()),
            ("registry_path", registry_path()),
        ];
        attributes.extend(CredentialFields::attributes());
        attributes
    }

    fn fields(state: &Self::State) -> &FeedFields {
        &state.feed
    }

    fn fields_mut(state: &mut Self::State) -> &mut FeedFields {
        &mut state.feed
    }

    fn with_fields(feed: FeedFields) -> Self::State {
        DockerRegistryState {
            feed,
            ..Default::default()
        }
    }

    fn expand(state: &Self::State, common: FeedCommon) -> Feed {
        Feed::Docker(DockerFeed {
            common,
            credentials: state.credentials.expand(),
            feed_uri: value::string(&state.feed_uri),
            api_version: value::opt_string(&state.api_version),
            registry_path: value::opt_string(&state.registry_path),
        })
    }

    fn flatten(feed: &Feed, state: &mut Self::State) -> bool {
        match feed {
            Feed::Docker(docker) => {
                state.credentials.flatten(&docker.credentials);
                value::set(&mut state.feed_uri, docker.feed_uri.clone());
                value::set_optional_string(&mut state.api_version, docker.api_version.as_deref());
                value::set_optional_string(&mut state.registry_path, docker.registry_path.as_deref());
                true
            }
            _ => false,
        }
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.url("feed_uri", &config.feed_uri);
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
    use crate::resources::feeds::test::{credentials, full_fields, round_trip, text, write_only};
    use crate::resources::feeds::FeedResource;

    type Resource = FeedResource<DockerRegistry>;

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<DockerRegistryState>(&Resource::schema());
    }

    #[tokio::test]
    async fn create_sends_registry_settings() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/Spaces-1/feeds"))
            .and(body_partial_json(serde_json::json!({
                "FeedType": "Docker",
                "Name": "hub",
                "FeedUri": "https://index.docker.io",
                "ApiVersion": "v2",
                "Username": "puller",
                "Password": { "HasValue": true, "NewValue": "secret" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "Id": "Feeds-21",
                "FeedType": "Docker",
                "Name": "hub",
                "FeedUri": "https://index.docker.io",
                "ApiVersion": "v2",
                "RegistryPath": null,
                "Username": "puller",
                "Password": { "HasValue": true },
                "PackageAcquisitionLocationOptions": ["ExecutionTarget", "NotAcquired"],
                "SpaceId": "Spaces-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut planned = DockerRegistryState {
            feed_uri: Value::Value("https://index.docker.io".into()),
            api_version: Value::Value("v2".into()),
            credentials: CredentialFields {
                username: Value::Value("puller".into()),
                password: Value::Value("secret".into()),
            },
            ..Default::default()
        };
        planned.feed.name = Value::Value("hub".into());
        Resource::plan(&mut planned);

        let client = client_for(&server, Some("Spaces-1"));
        let state = Resource::create(&client, planned).await.unwrap();
        assert_eq!(state.feed.id, Value::Value("Feeds-21".into()));
        assert_eq!(
            state.feed.package_acquisition_location_options,
            value::list_from(&["ExecutionTarget", "NotAcquired"])
        );
        assert_eq!(state.registry_path, Value::Null);
        assert_eq!(state.credentials.password, Value::Value("secret".into()));
    }

    #[test]
    fn flatten_restores_the_configured_feed() {
        let planned = DockerRegistryState {
            feed: full_fields(),
            credentials: credentials(),
            feed_uri: text("https://index.docker.io"),
            api_version: text("v2"),
            registry_path: text("library"),
        };
        let blank = DockerRegistryState {
            credentials: write_only(&planned.credentials),
            ..Default::default()
        };
        assert_eq!(round_trip::<DockerRegistry>(&planned, blank), planned);
    }
}
