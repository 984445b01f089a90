use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, AttributeType};

use super::{Listing, QueryFields};
use crate::client::Query;
use crate::framework::value::{self, TfBlocks, TfString};
use crate::framework::{schema, Validation};
use crate::model::library_variable_set::LibraryVariableSet;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LibraryVariableSetItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub space_id: String,
    pub variable_set_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LibraryVariableSetsState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub content_type: TfString,
    pub library_variable_sets: TfBlocks<LibraryVariableSetItem>,
}

pub struct LibraryVariableSets;

impl Listing for LibraryVariableSets {
    type Model = LibraryVariableSet;
    type Item = LibraryVariableSetItem;
    type State = LibraryVariableSetsState;

    const NAME: &'static str = "octopusdeploy_library_variable_sets";
    const RESULTS: &'static str = "library_variable_sets";
    const SINGULAR: &'static str = "library variable set";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("description", schema::text()),
            ("space_id", schema::text()),
            ("variable_set_id", schema::text()),
        ]
    }

    fn filter_attributes() -> Vec<(&'static str, Attribute)> {
        vec![(
            "content_type",
            schema::optional(
                schema::text(),
                "A filter to search by content type. Valid types are `ScriptModule` or `Variables`.",
            ),
        )]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    fn filter(config: &Self::State, query: Query) -> Query {
        match value::opt_string(&config.content_type) {
            Some(content_type) => query.with("contentType", content_type),
            None => query,
        }
    }

    fn item(_config: &Self::State, set: &LibraryVariableSet) -> Option<LibraryVariableSetItem> {
        Some(LibraryVariableSetItem {
            id: set.id.clone().unwrap_or_default(),
            name: set.name.clone(),
            description: set.description.clone().unwrap_or_default(),
            space_id: set.space_id.clone().unwrap_or_default(),
            variable_set_id: set.variable_set_id.clone().unwrap_or_default(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<LibraryVariableSetItem> {
        &mut state.library_variable_sets
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.one_of("content_type", &config.content_type, &LibraryVariableSet::CONTENT_TYPES);
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

    type DataSource = ListingDataSource<LibraryVariableSets>;

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<LibraryVariableSetsState>(&DataSource::schema());
    }

    #[test]
    fn content_type_is_validated() {
        let config = LibraryVariableSetsState {
            content_type: Value::Value("Scripts".into()),
            ..Default::default()
        };
        let mut validation = Validation::default();
        DataSource::validate(&config, &mut validation);
        assert_eq!(validation.issues().len(), 1);
    }

    #[tokio::test]
    async fn content_type_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/libraryvariablesets"))
            .and(query_param("contentType", "Variables"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": [{
                    "Id": "LibraryVariableSets-1",
                    "Name": "Shared",
                    "ContentType": "Variables",
                    "VariableSetId": "variableset-LibraryVariableSets-1",
                    "SpaceId": "Spaces-1"
                }],
                "TotalResults": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = LibraryVariableSetsState {
            content_type: Value::Value("Variables".into()),
            ..Default::default()
        };
        let client = client_for(&server, Some("Spaces-1"));
        let state = DataSource::read(&client, config).await.unwrap();
        let sets = value::blocks(&state.library_variable_sets);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].variable_set_id, "variableset-LibraryVariableSets-1");
    }
}
