use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use super::{feed_uri, CredentialFields, FeedFields, FeedKind};
use crate::framework::value::{self, TfString};
use crate::framework::Validation;
use crate::model::feed::{Feed, FeedCommon, HelmFeed as HelmModel};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct HelmFeedState {
    #[serde(flatten)]
    pub feed: FeedFields,
    #[serde(flatten)]
    pub credentials: CredentialFields,
    pub feed_uri: TfString,
}

pub struct HelmFeed;

impl FeedKind for HelmFeed {
    type State = HelmFeedState;

    const NAME: &'static str = "octopusdeploy_helm_feed";
    const FEED_TYPE: &'static str = "Helm";
    const DESCRIPTION: &'static str = "This resource manages a Helm Feed in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        let mut attributes = vec![("feed_uri", feed_uri())];
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
        HelmFeedState {
            feed,
            ..Default::default()
        }
    }

    fn expand(state: &Self::State, common: FeedCommon) -> Feed {
        Feed::Helm(HelmModel {
            common,
            credentials: state.credentials.expand(),
            feed_uri: value::string(&state.feed_uri),
        })
    }

    fn flatten(feed: &Feed, state: &mut Self::State) -> bool {
        match feed {
            Feed::Helm(helm) => {
                state.credentials.flatten(&helm.credentials);
                value::set(&mut state.feed_uri, helm.feed_uri.clone());
                true
            }
            _ => false,
        }
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.url("feed_uri", &config.feed_uri);
    }
}
