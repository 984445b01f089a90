use serde::{Deserialize, Serialize};
use tf_provider::{schema::{Attribute, AttributeType}, value::Value};

use super::{Listing, QueryFields};
use crate::client::Query;
use crate::framework::value::{self, TfBlocks, TfBool, TfString, TfStrings};
use crate::framework::{schema, Validation};
use crate::model::worker::{Worker, WorkerEndpoint};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct WorkerItem {
    pub id: String,
    pub space_id: String,
    pub name: String,
    pub is_disabled: bool,
    pub machine_policy_id: String,
    pub worker_pool_ids: Vec<String>,
    pub communication_style: String,
    pub health_status: String,
    pub proxy_id: String,
    pub uri: String,
    pub thumbprint: String,
    pub account_id: String,
    pub host: String,
    pub port: i64,
    pub fingerprint: String,
    pub dotnet_platform: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct WorkersState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub name: TfString,
    pub communication_styles: TfStrings,
    pub health_statuses: TfStrings,
    pub is_disabled: TfBool,
    pub workers: TfBlocks<WorkerItem>,
}

pub struct Workers;

impl Listing for Workers {
    type Model = Worker;
    type Item = WorkerItem;
    type State = WorkersState;

    const NAME: &'static str = "octopusdeploy_workers";
    const RESULTS: &'static str = "workers";
    const SINGULAR: &'static str = "worker";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("space_id", schema::text()),
            ("name", schema::text()),
            ("is_disabled", schema::flag()),
            ("machine_policy_id", schema::text()),
            ("worker_pool_ids", schema::text_list()),
            ("communication_style", schema::text()),
            ("health_status", schema::text()),
            ("proxy_id", schema::text()),
            ("uri", schema::text()),
            ("thumbprint", schema::text()),
            ("account_id", schema::text()),
            ("host", schema::text()),
            ("port", schema::number()),
            ("fingerprint", schema::text()),
            ("dotnet_platform", schema::text()),
        ]
    }

    fn filter_attributes() -> Vec<(&'static str, Attribute)> {
        vec![
            ("name", schema::optional(schema::text(), "A filter to search by exact name.")),
            (
                "communication_styles",
                schema::optional(
                    schema::text_list(),
                    "A filter to search by a list of communication styles. Valid styles are `Ssh` or `TentaclePassive`.",
                ),
            ),
            (
                "health_statuses",
                schema::optional(
                    schema::text_list(),
                    "A filter to search by a list of health statuses. Valid statuses are `HasWarnings`, `Healthy`, `Unavailable`, `Unhealthy`, or `Unknown`.",
                ),
            ),
            (
                "is_disabled",
                schema::optional(schema::flag(), "A filter to search by the disabled status of a worker."),
            ),
        ]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    fn filter(config: &Self::State, query: Query) -> Query {
        let mut query = query;
        if let Some(name) = value::opt_string(&config.name) {
            query = query.with("name", name);
        }
        if let Some(styles) = value::slice_from_list(&config.communication_styles) {
            query = query.with("communicationStyles", styles.join(","));
        }
        if let Some(statuses) = value::slice_from_list(&config.health_statuses) {
            query = query.with("healthStatuses", statuses.join(","));
        }
        if let Value::Value(is_disabled) = config.is_disabled {
            query = query.with("isDisabled", is_disabled.to_string());
        }
        query
    }

    fn item(_config: &Self::State, worker: &Worker) -> Option<WorkerItem> {
        let mut item = WorkerItem {
            id: worker.id.clone().unwrap_or_default(),
            space_id: worker.space_id.clone().unwrap_or_default(),
            name: worker.name.clone(),
            is_disabled: worker.is_disabled,
            machine_policy_id: worker.machine_policy_id.clone(),
            worker_pool_ids: worker.worker_pool_ids.clone(),
            communication_style: worker.endpoint.communication_style().to_string(),
            health_status: worker.health_status.clone(),
            proxy_id: worker.endpoint.proxy_id().unwrap_or_default().to_string(),
            ..Default::default()
        };
        match &worker.endpoint {
            WorkerEndpoint::ListeningTentacle { uri, thumbprint, .. } => {
                item.uri = uri.clone();
                item.thumbprint = thumbprint.clone();
            }
            WorkerEndpoint::Ssh {
                account_id,
                host,
                port,
                fingerprint,
                dotnet_core_platform,
                ..
            } => {
                item.account_id = account_id.clone();
                item.host = host.clone();
                item.port = *port;
                item.fingerprint = fingerprint.clone();
                item.dotnet_platform = dotnet_core_platform.clone();
            }
            WorkerEndpoint::Unsupported => return None,
        }
        Some(item)
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<WorkerItem> {
        &mut state.workers
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.each_one_of("communication_styles", &config.communication_styles, &Worker::COMMUNICATION_STYLES);
        validation.each_one_of("health_statuses", &config.health_statuses, &Worker::HEALTH_STATUSES);
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::test::client_for;
    use crate::data_sources::ListingDataSource;
    use crate::framework::test::assert_schema_matches_state;
    use crate::framework::OctopusDataSource;

    type DataSource = ListingDataSource<Workers>;

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<WorkersState>(&DataSource::schema());
    }

    #[test]
    fn unknown_communication_styles_are_rejected() {
        let config = WorkersState {
            communication_styles: value::list_from(&["Ssh", "Kubernetes"]),
            ..Default::default()
        };
        let mut validation = Validation::default();
        DataSource::validate(&config, &mut validation);
        assert_eq!(validation.issues().len(), 1);
    }

    #[tokio::test]
    async fn filters_are_sent_and_endpoints_flattened() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/workers"))
            .and(query_param("communicationStyles", "Ssh,TentaclePassive"))
            .and(query_param("healthStatuses", "Healthy"))
            .and(query_param("isDisabled", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": [
                    {
                        "Id": "Workers-1",
                        "Name": "linux-1",
                        "MachinePolicyId": "MachinePolicies-1",
                        "WorkerPoolIds": ["WorkerPools-1"],
                        "HealthStatus": "Healthy",
                        "SpaceId": "Spaces-1",
                        "Endpoint": {
                            "CommunicationStyle": "Ssh",
                            "AccountId": "Accounts-1",
                            "Host": "linux-1",
                            "Port": 22,
                            "Fingerprint": "SHA256:abc",
                            "DotNetCorePlatform": "linux-x64"
                        }
                    },
                    {
                        "Id": "Workers-2",
                        "Name": "windows-1",
                        "WorkerPoolIds": ["WorkerPools-1"],
                        "HealthStatus": "Healthy",
                        "Endpoint": {
                            "CommunicationStyle": "TentaclePassive",
                            "Uri": "https://windows-1:10933",
                            "Thumbprint": "ABC",
                            "ProxyId": "Proxies-1"
                        }
                    },
                    {
                        "Id": "Workers-3",
                        "Name": "poller",
                        "HealthStatus": "Healthy",
                        "Endpoint": { "CommunicationStyle": "TentacleActive" }
                    }
                ],
                "TotalResults": 3
            })))
            .mount(&server)
            .await;

        let mut config = WorkersState {
            communication_styles: value::list_from(&["Ssh", "TentaclePassive"]),
            health_statuses: value::list_from(&["Healthy"]),
            is_disabled: Value::Value(false),
            ..Default::default()
        };
        config.query.take = Value::Value(10);

        let client = client_for(&server, Some("Spaces-1"));
        let state = DataSource::read(&client, config).await.unwrap();
        let workers = value::blocks(&state.workers);
        assert_eq!(workers.len(), 2);
        assert_eq!(workers[0].communication_style, "Ssh");
        assert_eq!(workers[0].port, 22);
        assert_eq!(workers[0].dotnet_platform, "linux-x64");
        assert_eq!(workers[1].uri, "https://windows-1:10933");
        assert_eq!(workers[1].proxy_id, "Proxies-1");
    }
}
