use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::Schema, value::Value};

use super::space_replacement;
use crate::client::Client;
use crate::framework::value::{self, TfString};
use crate::framework::{schema, Error, ManagedResource, Validation};
use crate::model::git_credential::{GitCredential, GitCredentialDetails};
use crate::model::SensitiveValue;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GitCredentialState {
    pub id: TfString,
    pub name: TfString,
    pub description: TfString,
    pub username: TfString,
    pub password: TfString,
    pub space_id: TfString,
}

fn expand(state: &GitCredentialState) -> GitCredential {
    GitCredential {
        id: value::opt_string(&state.id),
        name: value::string(&state.name),
        description: value::opt_string(&state.description),
        space_id: value::opt_string(&state.space_id),
        details: GitCredentialDetails::UsernamePassword {
            username: value::string(&state.username),
            password: SensitiveValue::from_option(value::opt_string(&state.password)),
        },
    }
}

/// The password is write-only and keeps its configured value.
fn flatten(credential: &GitCredential, state: &mut GitCredentialState) {
    value::set_string(&mut state.id, credential.id.as_deref());
    value::set(&mut state.name, credential.name.clone());
    value::set_optional_string(&mut state.description, credential.description.as_deref());
    value::set_string(&mut state.space_id, credential.space_id.as_deref());
    match &credential.details {
        GitCredentialDetails::UsernamePassword { username, .. } => value::set(&mut state.username, username.clone()),
    }
}

pub struct GitCredentialResource;

#[async_trait]
impl ManagedResource for GitCredentialResource {
    type State = GitCredentialState;

    const NAME: &'static str = "octopusdeploy_git_credential";

    fn schema() -> Schema {
        schema::schema(schema::block(
            "Manages a Git credential in Octopus Deploy.",
            vec![
                ("id", schema::id()),
                ("name", schema::name("Git credential")),
                ("description", schema::description("Git credential")),
                ("username", schema::username(true)),
                ("password", schema::password(true)),
                ("space_id", schema::space_id("Git credential")),
            ],
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("name", &config.name);
        validation.not_empty("username", &config.username);
        validation.not_empty("password", &config.password);
    }

    fn plan(state: &mut Self::State) {
        value::unknown_if_null(&mut state.id);
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
        GitCredentialState {
            id: Value::Value(id),
            ..Default::default()
        }
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let credential = expand(&planned);
        let created = client.add(credential.space_id.as_deref(), &credential).await?;
        let mut state = planned;
        flatten(&created, &mut state);
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let space_id = value::opt_string(&state.space_id);
        let Some(credential) = client
            .find::<GitCredential>(space_id.as_deref(), &value::string(&state.id))
            .await?
        else {
            return Ok(None);
        };
        let mut state = state;
        flatten(&credential, &mut state);
        Ok(Some(state))
    }

    async fn update(client: &Client, _prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let credential = expand(&planned);
        let updated = client
            .update(credential.space_id.as_deref(), &value::string(&planned.id), &credential)
            .await?;
        let mut state = planned;
        flatten(&updated, &mut state);
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let space_id = value::opt_string(&state.space_id);
        client
            .delete::<GitCredential>(space_id.as_deref(), &value::string(&state.id))
            .await?;
        Ok(())
    }
}
