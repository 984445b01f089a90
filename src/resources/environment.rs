use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::Schema, value::Value};

use super::space_replacement;
use crate::client::Client;
use crate::framework::value::{self, TfBool, TfInt, TfString};
use crate::framework::{schema, Error, ManagedResource, Validation};
use crate::model::environment::Environment;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EnvironmentState {
    pub id: TfString,
    pub name: TfString,
    pub description: TfString,
    pub slug: TfString,
    pub sort_order: TfInt,
    pub allow_dynamic_infrastructure: TfBool,
    pub use_guided_failure: TfBool,
    pub space_id: TfString,
}

fn expand(state: &EnvironmentState) -> Environment {
    Environment {
        id: value::opt_string(&state.id),
        name: value::string(&state.name),
        description: value::opt_string(&state.description),
        slug: value::opt_string(&state.slug),
        sort_order: value::int(&state.sort_order),
        allow_dynamic_infrastructure: value::boolean(&state.allow_dynamic_infrastructure),
        use_guided_failure: value::boolean(&state.use_guided_failure),
        space_id: value::opt_string(&state.space_id),
    }
}

fn flatten(environment: &Environment, state: &mut EnvironmentState) {
    value::set_string(&mut state.id, environment.id.as_deref());
    value::set(&mut state.name, environment.name.clone());
    value::set_optional_string(&mut state.description, environment.description.as_deref());
    value::set_string(&mut state.slug, environment.slug.as_deref());
    value::set(&mut state.sort_order, environment.sort_order);
    value::set_optional(&mut state.allow_dynamic_infrastructure, environment.allow_dynamic_infrastructure);
    value::set_optional(&mut state.use_guided_failure, environment.use_guided_failure);
    value::set_string(&mut state.space_id, environment.space_id.as_deref());
}

pub struct EnvironmentResource;

#[async_trait]
impl ManagedResource for EnvironmentResource {
    type State = EnvironmentState;

    const NAME: &'static str = "octopusdeploy_environment";

    fn schema() -> Schema {
        schema::schema(schema::block(
            "This resource manages environments in Octopus Deploy.",
            vec![
                ("id", schema::id()),
                ("name", schema::name("environment")),
                ("description", schema::description("environment")),
                ("slug", schema::slug("environment")),
                ("sort_order", schema::sort_order("environment")),
                (
                    "allow_dynamic_infrastructure",
                    schema::optional(schema::flag(), "Whether dynamic infrastructure may be created in this environment."),
                ),
                (
                    "use_guided_failure",
                    schema::optional(schema::flag(), "Whether guided failure mode is used by default for deployments to this environment."),
                ),
                ("space_id", schema::space_id("environment")),
            ],
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("name", &config.name);
    }

    fn plan(state: &mut Self::State) {
        value::unknown_if_null(&mut state.id);
        value::unknown_if_null(&mut state.slug);
        value::unknown_if_null(&mut state.sort_order);
        value::unknown_if_null(&mut state.space_id);
    }

    fn replace_on_change(prior: &Self::State, proposed: &Self::State) -> Vec<AttributePath> {
        space_replacement(&prior.space_id, &proposed.space_id)
    }

    fn id(state: &Self::State) -> String {
        value::string(&state.id)
    }

    fn name(state: &Self::State) -> String {
        value::string(&state.name)
    }

    fn with_id(id: String) -> Self::State {
        EnvironmentState {
            id: Value::Value(id),
            ..Default::default()
        }
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let environment = expand(&planned);
        let created = client.add(environment.space_id.as_deref(), &environment).await?;
        let mut state = planned;
        flatten(&created, &mut state);
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let space_id = value::opt_string(&state.space_id);
        let Some(environment) = client
            .find::<Environment>(space_id.as_deref(), &value::string(&state.id))
            .await?
        else {
            return Ok(None);
        };
        let mut state = state;
        flatten(&environment, &mut state);
        Ok(Some(state))
    }

    async fn update(client: &Client, _prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let environment = expand(&planned);
        let updated = client
            .update(environment.space_id.as_deref(), &value::string(&planned.id), &environment)
            .await?;
        let mut state = planned;
        flatten(&updated, &mut state);
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let space_id = value::opt_string(&state.space_id);
        client
            .delete::<Environment>(space_id.as_deref(), &value::string(&state.id))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use tf_provider::{Diagnostics, Resource};

    use super::*;
    use crate::client::test::client_for;
    use crate::framework::test::assert_schema_matches_state;
    use crate::framework::{ResourceAdapter, Session};

    fn planned() -> EnvironmentState {
        EnvironmentState {
            name: Value::Value("Production".into()),
            description: Value::Null,
            allow_dynamic_infrastructure: Value::Value(true),
            use_guided_failure: Value::Null,
            ..Default::default()
        }
    }

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<EnvironmentState>(&EnvironmentResource::schema());
    }

    #[test]
    fn flatten_restores_expanded_fields() {
        let mut state = planned();
        EnvironmentResource::plan(&mut state);
        assert_eq!(state.slug, Value::Unknown);

        let mut environment = expand(&state);
        assert_eq!(environment.id, None);
        assert_eq!(environment.description, None);
        environment.id = Some("Environments-1".into());
        environment.slug = Some("production".into());
        environment.space_id = Some("Spaces-1".into());

        flatten(&environment, &mut state);
        assert_eq!(state.id, Value::Value("Environments-1".into()));
        assert_eq!(state.description, Value::Null);
        assert_eq!(state.use_guided_failure, Value::Null);
        assert_eq!(state.allow_dynamic_infrastructure, Value::Value(true));
        assert_eq!(expand(&state).name, "Production");
    }

    #[tokio::test]
    async fn create_posts_to_the_default_space() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/Spaces-1/environments"))
            .and(body_partial_json(serde_json::json!({
                "Name": "Production",
                "AllowDynamicInfrastructure": true
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "Id": "Environments-7",
                "Name": "Production",
                "Slug": "production",
                "SortOrder": 3,
                "AllowDynamicInfrastructure": true,
                "UseGuidedFailure": false,
                "SpaceId": "Spaces-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let mut state = planned();
        EnvironmentResource::plan(&mut state);
        let state = EnvironmentResource::create(&client, state).await.unwrap();
        assert_eq!(state.id, Value::Value("Environments-7".into()));
        assert_eq!(state.sort_order, Value::Value(3));
        assert_eq!(state.space_id, Value::Value("Spaces-1".into()));
    }

    #[tokio::test]
    async fn read_of_deleted_environment_removes_it() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/environments/Environments-7"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let state = EnvironmentState {
            id: Value::Value("Environments-7".into()),
            space_id: Value::Value("Spaces-1".into()),
            ..planned()
        };
        assert_eq!(EnvironmentResource::read(&client, state).await.unwrap(), None);
    }

    #[tokio::test]
    async fn adapter_drops_missing_environment_without_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/environments/Environments-7"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let session = Session::default();
        assert!(session.configure(client_for(&server, Some("Spaces-1"))));
        let adapter = ResourceAdapter::<EnvironmentResource>::new(session);
        let state = EnvironmentState {
            id: Value::Value("Environments-7".into()),
            ..planned()
        };

        let mut diags = Diagnostics::default();
        let read = Resource::read(&adapter, &mut diags, state, Default::default(), Default::default()).await;
        assert!(read.is_none());
        assert!(diags.errors.is_empty());
    }
}
