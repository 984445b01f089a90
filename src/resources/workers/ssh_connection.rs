use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use super::{WorkerFields, WorkerKind};
use crate::framework::value::{self, TfInt, TfString};
use crate::framework::{schema, Validation};
use crate::model::worker::{Worker, WorkerEndpoint};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SshConnectionWorkerState {
    #[serde(flatten)]
    pub worker: WorkerFields,
    pub account_id: TfString,
    pub host: TfString,
    pub port: TfInt,
    pub fingerprint: TfString,
    pub dotnet_platform: TfString,
}

pub struct SshConnection;

impl WorkerKind for SshConnection {
    type State = SshConnectionWorkerState;

    const NAME: &'static str = "octopusdeploy_ssh_connection_worker";
    const COMMUNICATION_STYLE: &'static str = "Ssh";
    const DESCRIPTION: &'static str = "This resource manages a SSH connection worker in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        vec![
            ("account_id", schema::required(schema::text(), "Connection account.")),
            (
                "host",
                schema::required(schema::text(), "The hostname or IP address of the deployment target to connect to."),
            ),
            ("port", schema::required(schema::number(), "The port number of the host to connect to (usually 22).")),
            ("fingerprint", schema::required(schema::text(), "The host fingerprint to be verified.")),
            (
                "dotnet_platform",
                schema::required(
                    schema::text(),
                    "NET Core platform of self-contained version of Calamari. Valid platforms are `linux-arm`, `linux-arm64`, `linux-x64`, or `osx-x64`.",
                ),
            ),
        ]
    }

    fn fields(state: &Self::State) -> &WorkerFields {
        &state.worker
    }

    fn fields_mut(state: &mut Self::State) -> &mut WorkerFields {
        &mut state.worker
    }

    fn endpoint(state: &Self::State) -> WorkerEndpoint {
        WorkerEndpoint::Ssh {
            account_id: value::string(&state.account_id),
            host: value::string(&state.host),
            port: value::int(&state.port),
            fingerprint: value::string(&state.fingerprint),
            dotnet_core_platform: value::string(&state.dotnet_platform),
            proxy_id: value::opt_string(&state.worker.proxy_id),
        }
    }

    fn flatten(endpoint: &WorkerEndpoint, state: &mut Self::State) -> bool {
        let WorkerEndpoint::Ssh {
            account_id,
            host,
            port,
            fingerprint,
            dotnet_core_platform,
            ..
        } = endpoint
        else {
            return false;
        };
        value::set(&mut state.account_id, account_id.clone());
        value::set(&mut state.host, host.clone());
        value::set(&mut state.port, *port);
        value::set(&mut state.fingerprint, fingerprint.clone());
        value::set(&mut state.dotnet_platform, dotnet_core_platform.clone());
        true
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("account_id", &config.account_id);
        validation.not_empty("host", &config.host);
        validation.at_least("port", &config.port, 1);
        validation.not_empty("fingerprint", &config.fingerprint);
        validation.one_of("dotnet_platform", &config.dotnet_platform, &Worker::DOTNET_PLATFORMS);
    }

    fn with_fields(worker: WorkerFields) -> Self::State {
        SshConnectionWorkerState {
            worker,
            ..Default::default()
        }
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
    use crate::resources::workers::{expand, flatten, WorkerResource};

    type Resource = WorkerResource<SshConnection>;

    fn configured() -> SshConnectionWorkerState {
        SshConnectionWorkerState {
            worker: WorkerFields {
                name: Value::Value("linux-1".into()),
                machine_policy_id: Value::Value("MachinePolicies-1".into()),
                worker_pool_ids: value::list_from(&["WorkerPools-1", "WorkerPools-2"]),
                ..Default::default()
            },
            account_id: Value::Value("Accounts-3".into()),
            host: Value::Value("linux-1.example.com".into()),
            port: Value::Value(22),
            fingerprint: Value::Value("SHA256:Xvj4Ry".into()),
            dotnet_platform: Value::Value("linux-x64".into()),
        }
    }

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<SshConnectionWorkerState>(&Resource::schema());
    }

    #[test]
    fn platform_and_port_are_validated() {
        let config = SshConnectionWorkerState {
            port: Value::Value(0),
            dotnet_platform: Value::Value("win-x64".into()),
            ..configured()
        };
        let mut validation = Validation::default();
        Resource::validate(&config, &mut validation);
        assert_eq!(validation.issues().len(), 2);
    }

    #[test]
    fn flatten_restores_the_configured_worker() {
        let mut planned = configured();
        planned.worker.id = Value::Value("Workers-2".into());
        planned.worker.is_disabled = Value::Value(false);
        planned.worker.proxy_id = Value::Value("Proxies-2".into());
        planned.worker.space_id = Value::Value("Spaces-1".into());

        let mut state = SshConnectionWorkerState::default();
        flatten::<SshConnection>(&expand::<SshConnection>(&planned), &mut state).unwrap();
        assert_eq!(state, planned);
    }

    #[tokio::test]
    async fn update_sends_the_ssh_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/Spaces-1/workers/Workers-2"))
            .and(body_partial_json(serde_json::json!({
                "Id": "Workers-2",
                "Endpoint": {
                    "CommunicationStyle": "Ssh",
                    "AccountId": "Accounts-3",
                    "Host": "linux-1.example.com",
                    "Port": 2222,
                    "DotNetCorePlatform": "linux-x64"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Id": "Workers-2",
                "Name": "linux-1",
                "IsDisabled": false,
                "MachinePolicyId": "MachinePolicies-1",
                "WorkerPoolIds": ["WorkerPools-1", "WorkerPools-2"],
                "SpaceId": "Spaces-1",
                "Endpoint": {
                    "CommunicationStyle": "Ssh",
                    "AccountId": "Accounts-3",
                    "Host": "linux-1.example.com",
                    "Port": 2222,
                    "Fingerprint": "SHA256:Xvj4Ry",
                    "DotNetCorePlatform": "linux-x64"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let prior = Resource::with_id("Workers-2".into());
        let mut planned = configured();
        planned.worker.id = Value::Value("Workers-2".into());
        planned.worker.space_id = Value::Value("Spaces-1".into());
        planned.port = Value::Value(2222);
        Resource::plan(&mut planned);

        let client = client_for(&server, None);
        let state = Resource::update(&client, prior, planned).await.unwrap();
        assert_eq!(state.port, Value::Value(2222));
        assert_eq!(state.worker.is_disabled, Value::Value(false));
    }

    #[tokio::test]
    async fn deleted_workers_read_as_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/workers/Workers-2"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let state = Resource::read(&client, Resource::with_id("Workers-2".into())).await.unwrap();
        assert_eq!(state, None);
    }
}
