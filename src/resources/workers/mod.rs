//! Workers share the `workers` collection. Each worker resource manages one endpoint
//! communication style; [WorkerResource] handles the attributes every worker has.
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::{Attribute, Schema}, value::Value};

use super::space_replacement;
use crate::client::Client;
use crate::framework::value::{self, TfBool, TfString, TfStrings};
use crate::framework::{schema, Error, ManagedResource, TfState, Validation};
use crate::model::worker::{Worker, WorkerEndpoint};

pub mod listening_tentacle;
pub mod ssh_connection;

/// Attributes every worker has.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct WorkerFields {
    pub id: TfString,
    pub name: TfString,
    pub is_disabled: TfBool,
    pub machine_policy_id: TfString,
    pub worker_pool_ids: TfStrings,
    pub proxy_id: TfString,
    pub space_id: TfString,
}

impl WorkerFields {
    fn expand(&self, endpoint: WorkerEndpoint) -> Worker {
        Worker {
            id: value::opt_string(&self.id),
            name: value::string(&self.name),
            is_disabled: value::boolean(&self.is_disabled),
            machine_policy_id: value::string(&self.machine_policy_id),
            worker_pool_ids: value::strings(&self.worker_pool_ids),
            health_status: String::new(),
            space_id: value::opt_string(&self.space_id),
            endpoint,
        }
    }

    fn flatten(&mut self, worker: &Worker) {
        value::set_string(&mut self.id, worker.id.as_deref());
        value::set(&mut self.name, worker.name.clone());
        value::set(&mut self.is_disabled, worker.is_disabled);
        value::set(&mut self.machine_policy_id, worker.machine_policy_id.clone());
        self.worker_pool_ids = value::list_from(&worker.worker_pool_ids);
        value::set_optional_string(&mut self.proxy_id, worker.endpoint.proxy_id());
        value::set_string(&mut self.space_id, worker.space_id.as_deref());
    }

    fn plan(&mut self) {
        value::unknown_if_null(&mut self.id);
        value::default_if_null(&mut self.is_disabled, false);
        value::unknown_if_null(&mut self.space_id);
    }

    fn validate(&self, validation: &mut Validation) {
        validation.not_empty("name", &self.name);
        validation.not_empty("machine_policy_id", &self.machine_policy_id);
        if let Value::Value(pools) = &self.worker_pool_ids {
            if pools.is_empty() {
                validation.error(
                    "worker_pool_ids",
                    "worker_pool_ids must not be empty",
                    "select at least one worker pool for the worker",
                );
            }
        }
    }

    fn with_id(id: String) -> Self {
        Self {
            id: Value::Value(id),
            ..Default::default()
        }
    }
}

fn common_attributes() -> Vec<(&'static str, Attribute)> {
    vec![
        ("id", schema::id()),
        ("name", schema::name("worker")),
        (
            "is_disabled",
            schema::optional_computed(schema::flag(), "When disabled, worker will not be included in any deployments."),
        ),
        ("machine_policy_id", schema::required(schema::text(), "Select the machine policy.")),
        (
            "worker_pool_ids",
            schema::required(schema::text_set(), "Select at least one worker pool for the worker."),
        ),
        (
            "proxy_id",
            schema::optional(
                schema::text(),
                "Specify the connection type for the Tentacle: direct (when not set) or via a proxy server.",
            ),
        ),
        ("space_id", schema::space_id("worker")),
    ]
}

/// One worker endpoint type.
pub trait WorkerKind: Send + Sync + 'static {
    type State: TfState;

    const NAME: &'static str;

    const COMMUNICATION_STYLE: &'static str;

    const DESCRIPTION: &'static str;

    fn attributes() -> Vec<(&'static str, Attribute)>;

    fn fields(state: &Self::State) -> &WorkerFields;

    fn fields_mut(state: &mut Self::State) -> &mut WorkerFields;

    fn endpoint(state: &Self::State) -> WorkerEndpoint;

    /// Copy the endpoint into the state. Returns false for another communication style.
    fn flatten(endpoint: &WorkerEndpoint, state: &mut Self::State) -> bool;

    fn validate(_config: &Self::State, _validation: &mut Validation) {}

    fn with_fields(fields: WorkerFields) -> Self::State;
}

pub(crate) fn expand<K: WorkerKind>(state: &K::State) -> Worker {
    K::fields(state).expand(K::endpoint(state))
}

pub(crate) fn flatten<K: WorkerKind>(worker: &Worker, state: &mut K::State) -> Result<(), Error> {
    if !K::flatten(&worker.endpoint, state) {
        return Err(Error::UnexpectedType {
            expected: K::COMMUNICATION_STYLE,
            found: worker.endpoint.communication_style().to_string(),
        });
    }
    K::fields_mut(state).flatten(worker);
    Ok(())
}

pub struct WorkerResource<K> {
    _kind: PhantomData<fn() -> K>,
}

#[async_trait]
impl<K: WorkerKind> ManagedResource for WorkerResource<K> {
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
        K::with_fields(WorkerFields::with_id(id))
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let space_id = value::opt_string(&K::fields(&planned).space_id);
        let created = client.add(space_id.as_deref(), &expand::<K>(&planned)).await?;
        let mut state = planned;
        flatten::<K>(&created, &mut state)?;
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let fields = K::fields(&state);
        let space_id = value::opt_string(&fields.space_id);
        let Some(worker) = client
            .find::<Worker>(space_id.as_deref(), &value::string(&fields.id))
            .await?
        else {
            return Ok(None);
        };
        let mut state = state;
        flatten::<K>(&worker, &mut state)?;
        Ok(Some(state))
    }

    async fn update(client: &Client, prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let space_id = value::opt_string(&K::fields(&planned).space_id);
        let id = value::string(&K::fields(&prior).id);
        let mut worker = expand::<K>(&planned);
        worker.id = Some(id.clone());
        let updated = client.update(space_id.as_deref(), &id, &worker).await?;
        let mut state = planned;
        flatten::<K>(&updated, &mut state)?;
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let fields = K::fields(&state);
        let space_id = value::opt_string(&fields.space_id);
        client
            .delete::<Worker>(space_id.as_deref(), &value::string(&fields.id))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_worker_pool_is_required() {
        let fields = WorkerFields {
            name: Value::Value("linux-1".into()),
            machine_policy_id: Value::Value("MachinePolicies-1".into()),
            worker_pool_ids: Value::Value(vec![]),
            ..Default::default()
        };
        let mut validation = Validation::default();
        fields.validate(&mut validation);
        assert_eq!(validation.issues().len(), 1);
        assert_eq!(validation.issues()[0].summary, "worker_pool_ids must not be empty");
    }

    #[test]
    fn unset_proxy_stays_null() {
        let mut fields = WorkerFields::default();
        fields.flatten(&Worker {
            id: Some("Workers-1".into()),
            name: "linux-1".into(),
            is_disabled: false,
            machine_policy_id: "MachinePolicies-1".into(),
            worker_pool_ids: vec!["WorkerPools-1".into()],
            health_status: "Healthy".into(),
            space_id: Some("Spaces-1".into()),
            endpoint: WorkerEndpoint::Unsupported,
        });
        assert_eq!(fields.proxy_id, Value::Null);
        assert_eq!(fields.is_disabled, Value::Value(false));
        assert_eq!(fields.worker_pool_ids, value::list_from(&["WorkerPools-1"]));
    }
}
