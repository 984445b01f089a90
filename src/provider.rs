//! The `octopusdeploy` provider: its configuration block and the registry of every
//! resource and data source type.
use std::collections::HashMap;

use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tf_provider::DynamicDataSource;
use tf_provider::DynamicResource;
use tf_provider::{Diagnostics, Provider, schema::Schema, value::ValueEmpty};

use crate::client::{self, Client};
use crate::config::file;
use crate::config::runtime::{self, Config, Settings};
use crate::data_sources::{self, ListingDataSource};
use crate::framework::value::{self, TfString};
use crate::framework::{schema, DataSourceAdapter, ManagedResource, OctopusDataSource, ResourceAdapter, Session, Validation};
use crate::model::space::Space;
use crate::resources::accounts::{self, AccountResource};
use crate::resources::feeds::{self, FeedResource};
use crate::resources::triggers::deployment_target::DeploymentTargetTriggerResource;
use crate::resources::triggers::external_feed::ExternalFeedTriggerResource;
use crate::resources::triggers::scheduled::ScheduledTriggerResource;
use crate::resources::worker_pools::dynamic_pool::DynamicWorkerPoolResource;
use crate::resources::worker_pools::static_pool::StaticWorkerPoolResource;
use crate::resources::workers::listening_tentacle::ListeningTentacle;
use crate::resources::workers::ssh_connection::SshConnection;
use crate::resources::workers::WorkerResource;
use crate::resources::{
    certificate, channel, environment, git_credential, lifecycle, project, project_group, space, tag, tag_set,
    team, tenant,
};

/// Name the plugin is served under. Type names carry it as a prefix.
pub const PROVIDER_NAME: &str = "octopusdeploy";

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] runtime::Error),

    #[error(transparent)]
    Client(#[from] client::Error),

    #[error("space {space_id} could not be read: {source}")]
    Space { space_id: String, source: client::Error },
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProviderConfig {
    pub address: TfString,
    pub api_key: TfString,
    pub access_token: TfString,
    pub space_id: TfString,
}

impl ProviderConfig {
    fn settings(&self) -> Settings {
        Settings {
            address: value::opt_string(&self.address),
            api_key: value::opt_string(&self.api_key),
            access_token: value::opt_string(&self.access_token),
            space_id: value::opt_string(&self.space_id),
        }
    }
}

pub struct OctopusDeployProvider {
    file: file::File,
    session: Session,
}

impl OctopusDeployProvider {
    pub fn new(file: file::File) -> Self {
        Self {
            file,
            session: Session::default(),
        }
    }

    fn resources(&self) -> Vec<(&'static str, Box<dyn DynamicResource>)> {
        let session = &self.session;
        vec![
            resource::<AccountResource<accounts::aws::AwsAccount>>(session),
            resource::<AccountResource<accounts::aws_oidc::AwsOidcAccount>>(session),
            resource::<AccountResource<accounts::azure_oidc::AzureOidc>>(session),
            resource::<AccountResource<accounts::azure_service_principal::AzureServicePrincipal>>(session),
            resource::<AccountResource<accounts::azure_subscription::AzureSubscription>>(session),
            resource::<AccountResource<accounts::gcp::GcpAccount>>(session),
            resource::<AccountResource<accounts::generic_oidc::GenericOidc>>(session),
            resource::<AccountResource<accounts::ssh_key::SshKey>>(session),
            resource::<AccountResource<accounts::token::Token>>(session),
            resource::<AccountResource<accounts::username_password::UsernamePassword>>(session),
            resource::<certificate::CertificateResource>(session),
            resource::<channel::ChannelResource>(session),
            resource::<environment::EnvironmentResource>(session),
            resource::<FeedResource<feeds::artifactory::ArtifactoryFeed>>(session),
            resource::<FeedResource<feeds::aws_ecr::AwsEcr>>(session),
            resource::<FeedResource<feeds::docker::DockerRegistry>>(session),
            resource::<FeedResource<feeds::github::GitHubFeed>>(session),
            resource::<FeedResource<feeds::helm::HelmFeed>>(session),
            resource::<FeedResource<feeds::maven::MavenFeed>>(session),
            resource::<FeedResource<feeds::nuget::NuGetFeed>>(session),
            resource::<git_credential::GitCredentialResource>(session),
            resource::<lifecycle::LifecycleResource>(session),
            resource::<project::ProjectResource>(session),
            resource::<project_group::ProjectGroupResource>(session),
            resource::<space::SpaceResource>(session),
            resource::<tag::TagResource>(session),
            resource::<tag_set::TagSetResource>(session),
            resource::<team::TeamResource>(session),
            resource::<tenant::TenantResource>(session),
            resource::<DeploymentTargetTriggerResource>(session),
            resource::<ExternalFeedTriggerResource>(session),
            resource::<ScheduledTriggerResource>(session),
            resource::<DynamicWorkerPoolResource>(session),
            resource::<StaticWorkerPoolResource>(session),
            resource::<WorkerResource<ListeningTentacle>>(session),
            resource::<WorkerResource<SshConnection>>(session),
        ]
    }

    fn data_sources(&self) -> Vec<(&'static str, Box<dyn DynamicDataSource>)> {
        let session = &self.session;
        vec![
            listing::<data_sources::accounts::Accounts>(session),
            listing::<data_sources::certificates::Certificates>(session),
            listing::<data_sources::channels::Channels>(session),
            listing::<data_sources::environments::Environments>(session),
            listing::<data_sources::feeds::Feeds>(session),
            listing::<data_sources::git_credentials::GitCredentials>(session),
            listing::<data_sources::library_variable_sets::LibraryVariableSets>(session),
            listing::<data_sources::lifecycles::Lifecycles>(session),
            listing::<data_sources::machine_policies::MachinePolicies>(session),
            listing::<data_sources::project_groups::ProjectGroups>(session),
            listing::<data_sources::projects::Projects>(session),
            data_source::<data_sources::space::SpaceDataSource>(session),
            listing::<data_sources::spaces::Spaces>(session),
            listing::<data_sources::tag_sets::TagSets>(session),
            listing::<data_sources::teams::Teams>(session),
            listing::<data_sources::tenants::Tenants>(session),
            listing::<data_sources::user_roles::UserRoles>(session),
            listing::<data_sources::users::Users>(session),
            listing::<data_sources::worker_pools::WorkerPools>(session),
            listing::<data_sources::workers::Workers>(session),
        ]
    }

    /// Type names of every resource and data source, in registration order.
    pub fn type_names(&self) -> (Vec<&'static str>, Vec<&'static str>) {
        let resources = self.resources().into_iter().map(|(name, _)| name).collect();
        let data_sources = self.data_sources().into_iter().map(|(name, _)| name).collect();
        (resources, data_sources)
    }
}

fn resource<R: ManagedResource>(session: &Session) -> (&'static str, Box<dyn DynamicResource>) {
    (R::NAME, Box::new(ResourceAdapter::<R>::new(session.clone())))
}

fn data_source<D: OctopusDataSource>(session: &Session) -> (&'static str, Box<dyn DynamicDataSource>) {
    (D::NAME, Box::new(DataSourceAdapter::<D>::new(session.clone())))
}

fn listing<L: data_sources::Listing>(session: &Session) -> (&'static str, Box<dyn DynamicDataSource>) {
    data_source::<ListingDataSource<L>>(session)
}

/// The host adds the provider prefix itself.
fn registry_key(type_name: &str) -> String {
    type_name
        .strip_prefix(PROVIDER_NAME)
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(type_name)
        .to_string()
}

/// Resolve the configuration, build a client and make sure the default space exists.
pub async fn connect<F>(file: &file::File, settings: Settings, env: F) -> Result<Client, Error>
where
    F: Fn(&str) -> Option<String>,
{
    let config = Config::resolve(file, settings, env)?;
    let client = Client::new(&config)?;

    if let Some(space_id) = &config.space_id {
        let space = client
            .get::<Space>(None, space_id)
            .await
            .map_err(|source| Error::Space {
                space_id: space_id.clone(),
                source,
            })?;
        info!("using space {} ({space_id})", space.name);
    }

    info!("connected to Octopus server at {}", config.address);
    Ok(client)
}

#[async_trait]
impl Provider for OctopusDeployProvider {
    type Config<'a> = ProviderConfig;
    type MetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(schema::schema(schema::block(
            "Manages Octopus Deploy spaces, projects, accounts, feeds and related configuration.",
            vec![
                (
                    "address",
                    schema::optional(
                        schema::text(),
                        "The endpoint of the Octopus REST API. Falls back to the `OCTOPUS_URL` environment variable.",
                    ),
                ),
                (
                    "api_key",
                    schema::sensitive(schema::optional(
                        schema::text(),
                        "The API key to use with the Octopus REST API. Falls back to `OCTOPUS_APIKEY`.",
                    )),
                ),
                (
                    "access_token",
                    schema::sensitive(schema::optional(
                        schema::text(),
                        "The OIDC access token to use with the Octopus REST API. Falls back to `OCTOPUS_ACCESS_TOKEN`.",
                    )),
                ),
                (
                    "space_id",
                    schema::optional(
                        schema::text(),
                        "The space ID to target when a resource does not set its own.",
                    ),
                ),
            ],
        )))
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::Config<'a>) -> Option<()> {
        let mut validation = Validation::default();
        validation.url("address", &config.address);
        validation.report(diags)
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        info!("configuring provider for Terraform {terraform_version}");

        let client = match connect(&self.file, config.settings(), |name| std::env::var(name).ok()).await {
            Ok(client) => client,
            Err(err) => {
                diags.root_error("failed to configure the Octopus Deploy provider", err.to_string());
                return None;
            }
        };

        if !self.session.configure(client) {
            warn!("provider was already configured, keeping the first configuration");
        }
        Some(())
    }

    fn get_resources(&self, _diags: &mut Diagnostics) -> Option<HashMap<String, Box<dyn DynamicResource>>> {
        Some(
            self.resources()
                .into_iter()
                .map(|(name, resource)| (registry_key(name), resource))
                .collect(),
        )
    }

    fn get_data_sources(&self, _diags: &mut Diagnostics) -> Option<HashMap<String, Box<dyn DynamicDataSource>>> {
        Some(
            self.data_sources()
                .into_iter()
                .map(|(name, data_source)| (registry_key(name), data_source))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use tf_provider::value::Value;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::framework::test::assert_schema_matches_state;

    fn provider() -> OctopusDeployProvider {
        OctopusDeployProvider::new(file::File::default())
    }

    #[test]
    fn schema_matches_config() {
        let schema = provider().schema(&mut Diagnostics::default()).unwrap();
        assert_schema_matches_state::<ProviderConfig>(&schema);
        assert!(schema.block.attributes["api_key"].sensitive);
        assert!(schema.block.attributes["access_token"].sensitive);
        assert!(!schema.block.attributes["address"].sensitive);
    }

    #[test]
    fn type_names_are_unique_and_prefixed() {
        let (resources, data_sources) = provider().type_names();
        assert_eq!(resources.len(), 36);
        assert_eq!(data_sources.len(), 20);

        let unique: BTreeSet<&str> = resources.iter().chain(data_sources.iter()).copied().collect();
        assert_eq!(unique.len(), resources.len() + data_sources.len());
        assert!(unique.iter().all(|name| name.starts_with("octopusdeploy_")));
        assert!(resources.contains(&"octopusdeploy_project_deployment_target_trigger"));
        assert!(data_sources.contains(&"octopusdeploy_worker_pools"));
        assert!(data_sources.contains(&"octopusdeploy_space"));
        assert!(resources.contains(&"octopusdeploy_ssh_connection_worker"));
    }

    #[test]
    fn registry_keys_drop_the_provider_prefix() {
        let provider = provider();
        let resources = provider.get_resources(&mut Diagnostics::default()).unwrap();
        assert!(resources.contains_key("environment"));
        assert!(resources.contains_key("aws_account"));
        assert!(!resources.contains_key("octopusdeploy_environment"));

        let data_sources = provider.get_data_sources(&mut Diagnostics::default()).unwrap();
        assert!(data_sources.contains_key("environments"));
        assert_eq!(data_sources.len(), 20);
    }

    #[tokio::test]
    async fn address_must_be_http() {
        let config = ProviderConfig {
            address: Value::Value("ftp://octopus.example.com".into()),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        assert_eq!(provider().validate(&mut diags, config).await, None);
        assert_eq!(diags.errors.len(), 1);
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        let settings = Settings {
            address: Some("https://octopus.example.com".into()),
            ..Default::default()
        };
        let err = connect(&file::File::default(), settings, |_| None).await.unwrap_err();
        assert_eq!(err.to_string(), "either an API key or an access token must be provided");
    }

    #[tokio::test]
    async fn configured_space_is_verified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/spaces/Spaces-2"))
            .and(header("X-Octopus-ApiKey", "API-FROM-ENV"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Id": "Spaces-2",
                "Name": "Platform"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let settings = Settings {
            address: Some(server.uri()),
            space_id: Some("Spaces-2".into()),
            ..Default::default()
        };
        let client = connect(&file::File::default(), settings, |name| {
            (name == "OCTOPUS_APIKEY").then(|| "API-FROM-ENV".to_string())
        })
        .await
        .unwrap();
        assert_eq!(client.space(None), Some("Spaces-2"));
    }

    #[tokio::test]
    async fn unknown_space_fails_configuration() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/spaces/Spaces-404"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "ErrorMessage": "The resource you requested was not found."
            })))
            .mount(&server)
            .await;

        let settings = Settings {
            address: Some(server.uri()),
            api_key: Some("API-TEST".into()),
            space_id: Some("Spaces-404".into()),
            ..Default::default()
        };
        let err = connect(&file::File::default(), settings, |_| None).await.unwrap_err();
        assert!(matches!(err, Error::Space { ref space_id, .. } if space_id == "Spaces-404"));
    }
}
