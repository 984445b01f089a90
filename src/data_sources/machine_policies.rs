use serde::{Deserialize, Serialize};
use tf_provider::schema::AttributeType;

use super::{Listing, QueryFields};
use crate::framework::schema;
use crate::framework::value::TfBlocks;
use crate::model::machine_policy::{timespan_nanos, MachinePolicy};

/// Durations are nanoseconds.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MachinePolicyItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_default: bool,
    pub connection_connect_timeout: i64,
    pub connection_retry_count_limit: i64,
    pub connection_retry_sleep_interval: i64,
    pub connection_retry_time_limit: i64,
    pub polling_request_queue_timeout: i64,
    pub polling_request_maximum_message_processing_timeout: i64,
    pub space_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MachinePoliciesState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub machine_policies: TfBlocks<MachinePolicyItem>,
}

pub struct MachinePolicies;

fn nanos(span: &Option<String>) -> i64 {
    span.as_deref().and_then(timespan_nanos).unwrap_or_default()
}

impl Listing for MachinePolicies {
    type Model = MachinePolicy;
    type Item = MachinePolicyItem;
    type State = MachinePoliciesState;

    const NAME: &'static str = "octopusdeploy_machine_policies";
    const RESULTS: &'static str = "machine_policies";
    const SINGULAR: &'static str = "machine policy";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("description", schema::text()),
            ("is_default", schema::flag()),
            ("connection_connect_timeout", schema::number()),
            ("connection_retry_count_limit", schema::number()),
            ("connection_retry_sleep_interval", schema::number()),
            ("connection_retry_time_limit", schema::number()),
            ("polling_request_queue_timeout", schema::number()),
            ("polling_request_maximum_message_processing_timeout", schema::number()),
            ("space_id", schema::text()),
        ]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    fn item(_config: &Self::State, policy: &MachinePolicy) -> Option<MachinePolicyItem> {
        Some(MachinePolicyItem {
            id: policy.id.clone().unwrap_or_default(),
            name: policy.name.clone(),
            description: policy.description.clone().unwrap_or_default(),
            is_default: policy.is_default,
            connection_connect_timeout: nanos(&policy.connection_connect_timeout),
            connection_retry_count_limit: policy.connection_retry_count_limit,
            connection_retry_sleep_interval: nanos(&policy.connection_retry_sleep_interval),
            connection_retry_time_limit: nanos(&policy.connection_retry_time_limit),
            polling_request_queue_timeout: nanos(&policy.polling_request_queue_timeout),
            polling_request_maximum_message_processing_timeout: nanos(
                &policy.polling_request_maximum_message_processing_timeout,
            ),
            space_id: policy.space_id.clone().unwrap_or_default(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<MachinePolicyItem> {
        &mut state.machine_policies
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::test::client_for;
    use crate::data_sources::ListingDataSource;
    use crate::framework::test::assert_schema_matches_state;
    use crate::framework::value;
    use crate::framework::OctopusDataSource;

    type DataSource = ListingDataSource<MachinePolicies>;

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<MachinePoliciesState>(&DataSource::schema());
    }

    #[tokio::test]
    async fn timeouts_are_reported_in_nanoseconds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/machinepolicies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": [{
                    "Id": "MachinePolicies-1",
                    "Name": "Default Machine Policy",
                    "IsDefault": true,
                    "ConnectionConnectTimeout": "00:01:00",
                    "ConnectionRetryCountLimit": 5,
                    "ConnectionRetrySleepInterval": "00:00:01",
                    "ConnectionRetryTimeLimit": "00:05:00",
                    "PollingRequestQueueTimeout": "00:02:00",
                    "SpaceId": "Spaces-1"
                }],
                "TotalResults": 1
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let state = DataSource::read(&client, MachinePoliciesState::default()).await.unwrap();
        let policies = value::blocks(&state.machine_policies);
        assert_eq!(policies.len(), 1);
        assert_eq!(policies[0].connection_connect_timeout, 60_000_000_000);
        assert_eq!(policies[0].connection_retry_count_limit, 5);
        assert_eq!(policies[0].polling_request_queue_timeout, 120_000_000_000);
        assert_eq!(policies[0].polling_request_maximum_message_processing_timeout, 0);
    }
}
