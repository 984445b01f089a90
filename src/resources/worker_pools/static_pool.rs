use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::Schema, value::Value};

use super::{common_attributes, unexpected, WorkerPoolFields};
use crate::client::Client;
use crate::framework::value;
use crate::framework::{schema, Error, ManagedResource, Validation};
use crate::model::worker_pool::WorkerPool;
use crate::resources::space_replacement;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StaticWorkerPoolState {
    #[serde(flatten)]
    pub pool: WorkerPoolFields,
}

fn expand(state: &StaticWorkerPoolState) -> WorkerPool {
    WorkerPool::Static(state.pool.expand())
}

fn flatten(pool: &WorkerPool, state: &mut StaticWorkerPoolState) -> Result<(), Error> {
    match pool {
        WorkerPool::Static(common) => {
            state.pool.flatten(common);
            Ok(())
        }
        WorkerPool::Dynamic(_) | WorkerPool::Unsupported => Err(unexpected("StaticWorkerPool", pool)),
    }
}

pub struct StaticWorkerPoolResource;

#[async_trait]
impl ManagedResource for StaticWorkerPoolResource {
    type State = StaticWorkerPoolState;

    const NAME: &'static str = "octopusdeploy_static_worker_pool";

    fn schema() -> Schema {
        schema::schema(schema::block(
            "This resource manages static worker pools in Octopus Deploy.",
            common_attributes(),
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        config.pool.validate(validation);
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
        StaticWorkerPoolState {
            pool: WorkerPoolFields {
                id: Value::Value(id),
                ..Default::default()
            },
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
