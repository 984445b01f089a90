//! External package feeds. Like accounts, every feed lives in the `feeds` collection and
//! is told apart by `FeedType`; a [FeedKind] adds the type specific attributes and
//! [FeedResource] does the rest.
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::{Attribute, Schema}, value::Value};

use super::space_replacement;
use crate::client::Client;
use crate::framework::value::{self, TfInt, TfString, TfStrings};
use crate::framework::{schema, Error, ManagedResource, TfState, Validation};
use crate::model::feed::{
    Feed, FeedCommon, FeedCredentials, FeedDownloads, DEFAULT_DOWNLOAD_ATTEMPTS,
    DEFAULT_DOWNLOAD_RETRY_BACKOFF_SECONDS,
};
use crate::model::SensitiveValue;

pub mod artifactory;
pub mod aws_ecr;
pub mod docker;
pub mod github;
pub mod helm;
pub mod maven;
pub mod nuget;

pub const PACKAGE_ACQUISITION_LOCATIONS: [&str; 3] = ["Server", "ExecutionTarget", "NotAcquired"];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FeedFields {
    pub id: TfString,
    pub name: TfString,
    pub package_acquisition_location_options: TfStrings,
    pub space_id: TfString,
}

impl FeedFields {
    fn expand(&self) -> FeedCommon {
        FeedCommon {
            id: value::opt_string(&self.id),
            name: value::string(&self.name),
            space_id: value::opt_string(&self.space_id),
            package_acquisition_location_options: value::strings(&self.package_acquisition_location_options),
        }
    }

    fn flatten(&mut self, feed: &FeedCommon) {
        value::set_string(&mut self.id, feed.id.as_deref());
        value::set(&mut self.name, feed.name.clone());
        self.package_acquisition_location_options = value::list_from(&feed.package_acquisition_location_options);
        value::set_string(&mut self.space_id, feed.space_id.as_deref());
    }

    fn plan(&mut self) {
        value::unknown_if_null(&mut self.id);
        value::unknown_if_null(&mut self.package_acquisition_location_options);
        value::unknown_if_null(&mut self.space_id);
    }

    fn validate(&self, validation: &mut Validation) {
        validation.not_empty("name", &self.name);
        validation.each_one_of(
            "package_acquisition_location_options",
            &self.package_acquisition_location_options,
            &PACKAGE_ACQUISITION_LOCATIONS,
        );
    }

    fn with_id(id: String) -> Self {
        Self {
            id: Value::Value(id),
            ..Default::default()
        }
    }
}

/// Optional basic-auth credentials. The password is write-only and never read back.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CredentialFields {
    pub username: TfString,
    pub password: TfString,
}

impl CredentialFields {
    pub fn expand(&self) -> FeedCredentials {
        FeedCredentials {
            username: value::opt_string(&self.username),
            password: SensitiveValue::from_option(value::opt_string(&self.password)),
        }
    }

    pub fn flatten(&mut self, credentials: &FeedCredentials) {
        value::set_optional_string(&mut self.username, credentials.username.as_deref());
    }

    pub fn attributes() -> Vec<(&'static str, Attribute)> {
        vec![("username", schema::username(false)), ("password", schema::password(false))]
    }
}

/// Download retry settings, defaulted to the server's values when unset.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DownloadFields {
    pub download_attempts: TfInt,
    pub download_retry_backoff_seconds: TfInt,
}

impl DownloadFields {
    pub fn expand(&self) -> FeedDownloads {
        FeedDownloads {
            download_attempts: value::opt_int(&self.download_attempts).unwrap_or(DEFAULT_DOWNLOAD_ATTEMPTS),
            download_retry_backoff_seconds: value::opt_int(&self.download_retry_backoff_seconds)
                .unwrap_or(DEFAULT_DOWNLOAD_RETRY_BACKOFF_SECONDS),
        }
    }

    pub fn flatten(&mut self, downloads: &FeedDownloads) {
        value::set(&mut self.download_attempts, downloads.download_attempts);
        value::set(&mut self.download_retry_backoff_seconds, downloads.download_retry_backoff_seconds);
    }

    pub fn plan(&mut self) {
        value::default_if_null(&mut self.download_attempts, DEFAULT_DOWNLOAD_ATTEMPTS);
        value::default_if_null(
            &mut self.download_retry_backoff_seconds,
            DEFAULT_DOWNLOAD_RETRY_BACKOFF_SECONDS,
        );
    }

    pub fn validate(&self, validation: &mut Validation) {
        validation.at_least("download_attempts", &self.download_attempts, 0);
        validation.at_least("download_retry_backoff_seconds", &self.download_retry_backoff_seconds, 0);
    }

    pub fn attributes() -> Vec<(&'static str, Attribute)> {
        vec![
            (
                "download_attempts",
                schema::optional_computed(
                    schema::number(),
                    &format!("The number of times a deployment should attempt to download a package from this feed before failing. Defaults to {DEFAULT_DOWNLOAD_ATTEMPTS}."),
                ),
            ),
            (
                "download_retry_backoff_seconds",
                schema::optional_computed(
                    schema::number(),
                    &format!("The number of seconds to apply as a linear back off between download attempts. Defaults to {DEFAULT_DOWNLOAD_RETRY_BACKOFF_SECONDS}."),
                ),
            ),
        ]
    }
}

pub fn feed_uri() -> Attribute {
    schema::required(schema::text(), "The URI of the feed.")
}

pub fn api_version() -> Attribute {
    schema::optional(schema::text(), "The API version of the registry.")
}

pub fn registry_path() -> Attribute {
    schema::optional(schema::text(), "The path of the registry, if it is not the root.")
}

fn common_attributes() -> Vec<(&'static str, Attribute)> {
    vec![
        ("id", schema::id()),
        ("name", schema::name("feed")),
        (
            "package_acquisition_location_options",
            schema::optional_computed(
                schema::text_list(),
                "Where packages from this feed are acquired. Valid options are `Server`, `ExecutionTarget`, or `NotAcquired`.",
            ),
        ),
        ("space_id", schema::space_id("feed")),
    ]
}

/// One feed type.
pub trait FeedKind: Send + Sync + 'static {
    type State: TfState;

    const NAME: &'static str;

    /// The `FeedType` the server reports for this kind.
    const FEED_TYPE: &'static str;

    const DESCRIPTION: &'static str;

    fn attributes() -> Vec<(&'static str, Attribute)>;

    fn fields(state: &Self::State) -> &FeedFields;

    fn fields_mut(state: &mut Self::State) -> &mut FeedFields;

    fn with_fields(fields: FeedFields) -> Self::State;

    fn expand(state: &Self::State, common: FeedCommon) -> Feed;

    /// Returns false for another feed type.
    fn flatten(feed: &Feed, state: &mut Self::State) -> bool;

    fn validate(_config: &Self::State, _validation: &mut Validation) {}

    fn plan(_state: &mut Self::State) {}
}

fn flatten<K: FeedKind>(feed: &Feed, state: &mut K::State) -> Result<(), Error> {
    match feed.common() {
        Some(common) if K::flatten(feed, state) => {
            K::fields_mut(state).flatten(common);
            Ok(())
        }
        _ => Err(Error::UnexpectedType {
            expected: K::FEED_TYPE,
            found: feed.feed_type().to_string(),
        }),
    }
}


pub struct FeedResource<K> {
    _kind: PhantomData<fn() -> K>,
}

#[async_trait]
impl<K: FeedKind> ManagedResource for FeedResource<K> {
    type State = K::State;

    const NAME: &'static str = K::NAME;

    fn schema() -> Schema {
        let mut attributes = common_attributes();
        attributes.extend(K::attributes());
        schema::schema(schema::block(K::DESCRIPTION, attributes))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        K::fields(config).validate(validation);
        K::validate(config, validation);
    }

    fn plan(state: &mut Self::State) {
        K::fields_mut(state).plan();
        K::plan(state);
    }

    fn replace_on_change(prior: &Self::State, proposed: &Self::State) -> Vec<AttributePath> {
        space_replacement(&K::fields(prior).space_id, &K::fields(proposed).space_id)
    }

    fn id(state: &Self::State) -> String {
        value::string(&K::fields(state).id)
    }

    fn name(state: &Self::State) -> String {
        value::string(&K::fields(state).name)
    }

    fn with_id(id: String) -> Self::State {
        K::with_fields(FeedFields::with_id(id))
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let common = K::fields(&planned).expand();
        let space_id = common.space_id.clone();
        let created = client.add(space_id.as_deref(), &K::expand(&planned, common)).await?;
        let mut state = planned;
        flatten::<K>(&created, &mut state)?;
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let fields = K::fields(&state);
        let space_id = value::opt_string(&fields.space_id);
        let Some(feed) = client
            .find::<Feed>(space_id.as_deref(), &value::string(&fields.id))
            .await?
        else {
            return Ok(None);
        };
        let mut state = state;
        flatten::<K>(&feed, &mut state)?;
        Ok(Some(state))
    }

    async fn update(client: &Client, _prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let common = K::fields(&planned).expand();
        let space_id = common.space_id.clone();
        let id = value::string(&K::fields(&planned).id);
        let updated = client
            .update(space_id.as_deref(), &id, &K::expand(&planned, common))
            .await?;
        let mut state = planned;
        flatten::<K>(&updated, &mut state)?;
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let fields = K::fields(&state);
        let space_id = value::opt_string(&fields.space_id);
        client
            .delete::<Feed>(space_id.as_deref(), &value::string(&fields.id))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::helm::{HelmFeed, HelmFeedState};
    use super::*;
    use crate::client::test::client_for;

    type HelmResource = FeedResource<HelmFeed>;

    #[test]
    fn acquisition_locations_are_validated() {
        let config = HelmFeedState {
            feed: FeedFields {
                name: Value::Value("charts".into()),
                package_acquisition_location_options: value::list_from(&["Server", "Everywhere"]),
                ..Default::default()
            },
            feed_uri: Value::Value("https://charts.example.com".into()),
            ..Default::default()
        };
        let mut validation = Validation::default();
        HelmResource::validate(&config, &mut validation);
        assert_eq!(validation.issues().len(), 1);
    }

    #[test]
    fn download_settings_default_when_unset() {
        let mut downloads = DownloadFields::default();
        downloads.plan();
        assert_eq!(downloads.download_attempts, Value::Value(5));
        assert_eq!(downloads.download_retry_backoff_seconds, Value::Value(10));

        let mut validation = Validation::default();
        DownloadFields {
            download_attempts: Value::Value(-1),
            ..downloads
        }
        .validate(&mut validation);
        assert_eq!(validation.issues().len(), 1);
    }

    #[test]
    fn username_is_read_back_but_password_is_not() {
        let mut credentials = CredentialFields {
            username: Value::Null,
            password: Value::Value("hunter2".into()),
        };
        credentials.flatten(&FeedCredentials {
            username: Some("reader".into()),
            password: SensitiveValue {
                has_value: true,
                new_value: None,
            },
        });
        assert_eq!(credentials.username, Value::Value("reader".into()));
        assert_eq!(credentials.password, Value::Value("hunter2".into()));
    }

    #[tokio::test]
    async fn reading_another_feed_type_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/feeds/Feeds-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Id": "Feeds-2",
                "FeedType": "NuGet",
                "Name": "nuget",
                "FeedUri": "https://api.nuget.org/v3/index.json"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let err = HelmResource::read(&client, HelmResource::with_id("Feeds-2".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedType { expected: "Helm", .. }));
    }

    #[tokio::test]
    async fn deleted_feeds_read_as_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/feeds/Feeds-2"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let state = HelmResource::read(&client, HelmResource::with_id("Feeds-2".into()))
            .await
            .unwrap();
        assert_eq!(state, None);
    }
}
