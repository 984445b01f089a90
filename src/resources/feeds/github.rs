use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use super::{feed_uri, CredentialFields, DownloadFields, FeedFields, FeedKind};
use crate::framework::value::{self, TfString};
use crate::framework::Validation;
use crate::model::feed::{Feed, FeedCommon, GitHubRepositoryFeed};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GitHubFeedState {
    #[serde(flatten)]
    pub feed: FeedFields,
    #[serde(flatten)]
    pub credentials: CredentialFields,
    #[serde(flatten)]
    pub downloads: DownloadFields,
    pub feed_uri: TfString,
}

pub struct GitHubFeed;

impl FeedKind for GitHubFeed {
    type State = GitHubFeedState;

    const NAME: &'static str = "octopusdeploy_github_repository_feed";
    const FEED_TYPE: &'static str = "GitHub";
    const DESCRIPTION: &'static str = "This resource manages a GitHub repository feed in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        let mut attributes = vec![("feed_uri", feed_uri())];
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
        GitHubFeedState {
            feed,
            ..Default::default()
        }
    }

    fn expand(state: &Self::State, common: FeedCommon) -> Feed {
        Feed::GitHub(GitHubRepositoryFeed {
            common,
            credentials: state.credentials.expand(),
            downloads: state.downloads.expand(),
            feed_uri: value::string(&state.feed_uri),
        })
    }

    fn flatten(feed: &Feed, state: &mut Self::State) -> bool {
        match feed {
            Feed::GitHub(github) => {
                state.credentials.flatten(&github.credentials);
                state.downloads.flatten(&github.downloads);
                value::set(&mut state.feed_uri, github.feed_uri.clone());
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
        state.downloads.plan();
    }
}
