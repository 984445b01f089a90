use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, AttributeType};

use super::{Listing, QueryFields};
use crate::client::Query;
use crate::framework::schema;
use crate::framework::value::{self, TfBlocks, TfString};
use crate::model::environment::Environment;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EnvironmentItem {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub sort_order: i64,
    pub allow_dynamic_infrastructure: bool,
    pub use_guided_failure: bool,
    pub space_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EnvironmentsState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub name: TfString,
    pub environments: TfBlocks<EnvironmentItem>,
}

pub struct Environments;

impl Listing for Environments {
    type Model = Environment;
    type Item = EnvironmentItem;
    type State = EnvironmentsState;

    const NAME: &'static str = "octopusdeploy_environments";
    const RESULTS: &'static str = "environments";
    const SINGULAR: &'static str = "environment";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("slug", schema::text()),
            ("description", schema::text()),
            ("sort_order", schema::number()),
            ("allow_dynamic_infrastructure", schema::flag()),
            ("use_guided_failure", schema::flag()),
            ("space_id", schema::text()),
        ]
    }

    fn filter_attributes() -> Vec<(&'static str, Attribute)> {
        vec![("name", schema::optional(schema::text(), "A filter to search by name."))]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    fn filter(config: &Self::State, query: Query) -> Query {
        match value::opt_string(&config.name) {
            Some(name) => query.with("name", name),
            None => query,
        }
    }

    fn item(_config: &Self::State, environment: &Environment) -> Option<EnvironmentItem> {
        Some(EnvironmentItem {
            id: environment.id.clone().unwrap_or_default(),
            name: environment.name.clone(),
            slug: environment.slug.clone().unwrap_or_default(),
            description: environment.description.clone().unwrap_or_default(),
            sort_order: environment.sort_order,
            allow_dynamic_infrastructure: environment.allow_dynamic_infrastructure,
            use_guided_failure: environment.use_guided_failure,
            space_id: environment.space_id.clone().unwrap_or_default(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<EnvironmentItem> {
        &mut state.environments
    }
}

#[cfg(test)]
mod tests {
    use tf_provider::value::Value;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::test::client_for;
    use crate::data_sources::ListingDataSource;
    use crate::framework::test::assert_schema_matches_state;
    use crate::framework::OctopusDataSource;

    type DataSource = ListingDataSource<Environments>;

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<EnvironmentsState>(&DataSource::schema());
    }

    #[tokio::test]
    async fn read_lists_matching_environments() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/environments"))
            .and(query_param("name", "Production"))
            .and(query_param("skip", "0"))
            .and(query_param("take", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": [{
                    "Id": "Environments-3",
                    "Name": "Production",
                    "Slug": "production",
                    "SortOrder": 2,
                    "UseGuidedFailure": true,
                    "SpaceId": "Spaces-1"
                }],
                "TotalResults": 1,
                "ItemsPerPage": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = EnvironmentsState {
            name: Value::Value("Production".into()),
            ..Default::default()
        };
        let client = client_for(&server, Some("Spaces-1"));
        let state = DataSource::read(&client, config).await.unwrap();

        let environments = value::blocks(&state.environments);
        assert_eq!(environments.len(), 1);
        assert_eq!(environments[0].id, "Environments-3");
        assert_eq!(environments[0].description, "");
        assert!(environments[0].use_guided_failure);
        assert!(matches!(state.query.id, Value::Value(ref id) if !id.is_empty()));
    }

    #[tokio::test]
    async fn read_without_matches_returns_an_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/environments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": [],
                "TotalResults": 0
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let state = DataSource::read(&client, EnvironmentsState::default()).await.unwrap();
        assert_eq!(state.environments, Value::Value(vec![]));
    }
}
