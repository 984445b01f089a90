use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use super::{feed_uri, CredentialFields, FeedFields, FeedKind};
use crate::framework::value::{self, TfString};
use crate::framework::{schema, Validation};
use crate::model::feed::{ArtifactoryGenericFeed, Feed, FeedCommon};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ArtifactoryFeedState {
    #[serde(flatten)]
    pub feed: FeedFields,
    #[serde(flatten)]
    pub credentials: CredentialFields,
    pub feed_uri: TfString,
    pub repository: TfString,
    pub layout_regex: TfString,
}

pub struct ArtifactoryFeed;

impl FeedKind for ArtifactoryFeed {
    type State = ArtifactoryFeedState;

    const NAME: &'static str = "octopusdeploy_artifactory_generic_feed";
    const FEED_TYPE: &'static str = "ArtifactoryGeneric";
    const DESCRIPTION: &'static str = "This resource manages an Artifactory Generic feed in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        let mut attributes = vec![
            ("feed_uri", feed_uri()),
            ("repository", schema::required(schema::text(), "The Artifactory repository to read packages from.")),
            (
                "layout_regex",
                schema::optional(schema::text(), "The regular expression used to find package IDs and versions in the repository layout."),
            ),
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
        ArtifactoryFeedState {
            feed,
            ..Default::default()
        }
    }

    fn expand(state: &Self::State, common: FeedCommon) -> Feed {
        Feed::ArtifactoryGeneric(ArtifactoryGenericFeed {
            common,
            credentials: state.credentials.expand(),
            feed_uri: value::string(&state.feed_uri),
            repository: value::string(&state.repository),
            layout_regex: value::opt_string(&state.layout_regex),
        })
    }

    fn flatten(feed: &Feed, state: &mut Self::State) -> bool {
        match feed {
            Feed::ArtifactoryGeneric(artifactory) => {
                state.credentials.flatten(&artifactory.credentials);
                value::set(&mut state.feed_uri, artifactory.feed_uri.clone());
                value::set(&mut state.repository, artifactory.repository.clone());
                value::set_optional_string(&mut state.layout_regex, artifactory.layout_regex.as_deref());
                true
            }
            _ => false,
        }
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.url("feed_uri", &config.feed_uri);
        validation.not_empty("repository", &config.repository);
    }
}
