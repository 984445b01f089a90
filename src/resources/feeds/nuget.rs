use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use super::{feed_uri, CredentialFields, DownloadFields, FeedFields, FeedKind};
use crate::framework::value::{self, TfBool, TfString};
use crate::framework::{schema, Validation};
use crate::model::feed::{Feed, FeedCommon, NuGetFeed as NuGetModel};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NuGetFeedState {
    #[serde(flatten)]
    pub feed: FeedFields,
    #[serde(flatten)]
    pub credentials: CredentialFields,
    #[serde(flatten)]
    pub downloads: DownloadFields,
    pub feed_uri: TfString,
    pub is_enhanced_mode: TfBool,
}

pub struct NuGetFeed;

impl FeedKind for NuGetFeed {
    type State = NuGetFeedState;

    const NAME: &'static str = "octopusdeploy_nuget_feed";
    const FEED_TYPE: &'static str = "NuGet";
    const DESCRIPTION: &'static str = "This resource manages a NuGet feed in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        let mut attributes = vec![
            ("feed_uri", feed_uri()),
            (
                "is_enhanced_mode",
                schema::optional_computed(
                    schema::flag(),
                    "Whether the feed is queried with the enhanced mode API. Defaults to `false`.",
                ),
            ),
        ];
        attributes.extend(CredentialFields::attributes());
        attributes.extend(DownloadFields::attributes());
        attributes
    }

    fn fields(state: &Self::State) -> &FeedFields {
        &state.feed
    }

    fn fields_mut(state: &mut Self::State) -> &mut FeedFields {
        &mut state.feed
    }

    fn with_fields(feed: FeedFields) -> Self::State {
        NuGetFeedState {
            feed,
            ..Default::default()
        }
    }

    fn expand(state: &Self::State, common: FeedCommon) -> Feed {
        Feed::NuGet(NuGetModel {
            common,
            credentials: state.credentials.expand(),
            downloads: state.downloads.expand(),
            feed_uri: value::string(&state.feed_uri),
            enhanced_mode: value::boolean(&state.is_enhanced_mode),
        })
    }

    fn flatten(feed: &Feed, state: &mut Self::State) -> bool {
        match feed {
            Feed::NuGet(nuget) => {
                state.credentials.flatten(&nuget.credentials);
                state.downloads.flatten(&nuget.downloads);
                value::set(&mut state.feed_uri, nuget.feed_uri.clone());
                value::set(&mut state.is_enhanced_mode, nuget.enhanced_mode);
                true
            }
            _ => false,
        }
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.url("feed_uri", &config.feed_uri);
        config.downloads.validate(validation);
    }

    fn plan(state: &mut Self::State) {
        value::default_if_null(&mut state.is_enhanced_mode, false);
        state.downloads.plan();
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
    use crate::resources::feeds::test::{credentials, downloads, full_fields, round_trip, text, write_only};
    use crate::resources::feeds::FeedResource;

    type Resource = FeedResource<NuGetFeed>;

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<NuGetFeedState>(&Resource::schema());
    }

    #[test]
    fn feed_uri_must_be_http() {
        let config = NuGetFeedState {
            feed_uri: Value::Value("ftp://packages.example.com".into()),
            ..Default::default()
        };
        let mut validation = Validation::default();
        Resource::validate(&config, &mut validation);
        assert_eq!(validation.issues().len(), 1);
    }

    #[tokio::test]
    async fn update_sends_enhanced_mode_and_downloads() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/Spaces-1/feeds/Feeds-7"))
            .and(body_partial_json(serde_json::json!({
                "FeedType": "NuGet",
                "EnhancedMode": true,
                "DownloadAttempts": 5,
                "DownloadRetryBackoffSeconds": 30
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Id": "Feeds-7",
                "FeedType": "NuGet",
                "Name": "nuget.org",
                "FeedUri": "https://api.nuget.org/v3/index.json",
                "EnhancedMode": true,
                "DownloadAttempts": 5,
                "DownloadRetryBackoffSeconds": 30,
                "PackageAcquisitionLocationOptions": ["Server", "ExecutionTarget"],
                "SpaceId": "Spaces-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut planned = Resource::with_id("Feeds-7".into());
        planned.feed.name = Value::Value("nuget.org".into());
        planned.feed.space_id = Value::Value("Spaces-1".into());
        planned.feed_uri = Value::Value("https://api.nuget.org/v3/index.json".into());
        planned.is_enhanced_mode = Value::Value(true);
        planned.downloads.download_retry_backoff_seconds = Value::Value(30);
        Resource::plan(&mut planned);

        let client = client_for(&server, None);
        let state = Resource::update(&client, planned.clone(), planned).await.unwrap();
        assert_eq!(state.downloads.download_attempts, Value::Value(5));
        assert_eq!(state.credentials.username, Value::Null);
    }

    #[test]
    fn flatten_restores_the_configured_feed() {
        let planned = NuGetFeedState {
            feed: full_fields(),
            credentials: credentials(),
            downloads: downloads(),
            feed_uri: text("https://api.nuget.org/v3/index.json"),
            is_enhanced_mode: Value::Value(true),
        };
        let blank = NuGetFeedState {
            credentials: write_only(&planned.credentials),
            ..Default::default()
        };
        assert_eq!(round_trip::<NuGetFeed>(&planned, blank), planned);
    }
}
