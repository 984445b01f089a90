use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::Schema, value::Value};

use super::{common_attributes, unexpected, WorkerPoolFields};
use crate::client::Client;
use crate::framework::value::{self, TfString};
use crate::framework::{schema, Error, ManagedResource, Validation};
use crate::model::worker_pool::{DynamicWorkerPool, WorkerPool};
use crate::resources::space_replacement;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DynamicWorkerPoolState {
    #[serde(flatten)]
    pub pool: WorkerPoolFields,
    pub worker_type: TfString,
}

fn expand(state: &DynamicWorkerPoolState) -> WorkerPool {
    WorkerPool::Dynamic(DynamicWorkerPool {
        common: state.pool.expand(),
        worker_type: value::string(&state.worker_type),
    })
}

fn flatten(pool: &WorkerPool, state: &mut DynamicWorkerPoolState) -> Result<(), Error> {
    match pool {
        WorkerPool::Dynamic(dynamic) => {
            state.pool.flatten(&dynamic.common);
            value::set(&mut state.worker_type, dynamic.worker_type.clone());
            Ok(())
        }
        WorkerPool::Static(_) | WorkerPool::Unsupported => Err(unexpected("DynamicWorkerPool", pool)),
    }
}

pub struct DynamicWorkerPoolResource;

#[async_trait]
impl ManagedResource for DynamicWorkerPoolResource {
    type State = DynamicWorkerPoolState;

    const NAME: &'static str = "octopusdeploy_dynamic_worker_pool";

    fn schema() -> Schema {
        let mut attributes = common_attributes();
        attributes.push((
            "worker_type",
            schema::required(
                schema::text(),
                &format!(
                    "The type of worker in this pool. Valid types are {}.",
                    WorkerPool::WORKER_TYPES
                        .iter()
                        .map(|worker_type| format!("`{worker_type}`"))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            ),
        ));
        schema::schema(schema::block(
            "This resource manages dynamic worker pools in Octopus Deploy.",
            attributes,
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        config.pool.validate(validation);
        validation.one_of("worker_type", &config.worker_type, &WorkerPool::WORKER_TYPES);
    }

    fn plan(state: &mut Self::State) {
        state.pool.plan();
    }

    fn replace_on_change(prior: &Self::State, proposed: &Self::State) -> Vec<AttributePath> {
        space_replacement(&prior.pool.space_id, &proposed.pool.space_id)
    }

    fn id(state: &Self::State) -> String {
        value::string(&state.pool.id)
    }

    fn name(state: &Self::State) -> String {
        value::string(&state.pool.name)
    }

    fn with_id(id: String) -> Self::State {
        DynamicWorkerPoolState {
            pool: WorkerPoolFields {
                id: Value::Value(id),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let space_id = value::opt_string(&planned.pool.space_id);
        let created = client.add(space_id.as_deref(), &expand(&planned)).await?;
        let mut state = planned;
        flatten(&created, &mut state)?;
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let space_id = value::opt_string(&state.pool.space_id);
        let Some(pool) = client
            .find::<WorkerPool>(space_id.as_deref(), &value::string(&state.pool.id))
            .await?
        else {
            return Ok(None);
        };
        let mut state = state;
        flatten(&pool, &mut state)?;
        Ok(Some(state))
    }

    async fn update(client: &Client, _prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let space_id = value::opt_string(&planned.pool.space_id);
        let updated = client
            .update(space_id.as_deref(), &value::string(&planned.pool.id), &expand(&planned))
            .await?;
        let mut state = planned;
        flatten(&updated, &mut state)?;
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let space_id = value::opt_string(&state.pool.space_id);
        client
            .delete::<WorkerPool>(space_id.as_deref(), &value::string(&state.pool.id))
            .await?;
        Ok(())
    }
}
