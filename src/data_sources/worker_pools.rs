use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, AttributeType};

use super::{Listing, QueryFields};
use crate::framework::value::{self, TfBlocks, TfString};
use crate::framework::{schema, Validation};
use crate::model::worker_pool::WorkerPool;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct WorkerPoolItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub worker_pool_type: String,
    pub is_default: bool,
    pub sort_order: i64,
    pub can_add_workers: bool,
    pub space_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct WorkerPoolsState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub worker_pool_type: TfString,
    pub worker_pools: TfBlocks<WorkerPoolItem>,
}

pub struct WorkerPools;

impl Listing for WorkerPools {
    type Model = WorkerPool;
    type Item = WorkerPoolItem;
    type State = WorkerPoolsState;

    const NAME: &'static str = "octopusdeploy_worker_pools";
    const RESULTS: &'static str = "worker_pools";
    const SINGULAR: &'static str = "worker pool";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("description", schema::text()),
            ("worker_pool_type", schema::text()),
            ("is_default", schema::flag()),
            ("sort_order", schema::number()),
            ("can_add_workers", schema::flag()),
            ("space_id", schema::text()),
        ]
    }

    fn filter_attributes() -> Vec<(&'static str, Attribute)> {
        vec![(
            "worker_pool_type",
            schema::optional(
                schema::text(),
                "A filter to search by worker pool type. Valid types are `DynamicWorkerPool` or `StaticWorkerPool`.",
            ),
        )]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    // The worker pools endpoint has no type filter.
    fn item(config: &Self::State, pool: &WorkerPool) -> Option<WorkerPoolItem> {
        let common = pool.common()?;
        let worker_pool_type = pool.worker_pool_type();
        if let Some(wanted) = value::opt_string(&config.worker_pool_type) {
            if wanted != worker_pool_type {
                return None;
            }
        }
        Some(WorkerPoolItem {
            id: common.id.clone().unwrap_or_default(),
            name: common.name.clone(),
            description: common.description.clone().unwrap_or_default(),
            worker_pool_type: worker_pool_type.to_string(),
            is_default: common.is_default,
            sort_order: common.sort_order,
            can_add_workers: common.can_add_workers,
            space_id: common.space_id.clone().unwrap_or_default(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<WorkerPoolItem> {
        &mut state.worker_pools
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.one_of("worker_pool_type", &config.worker_pool_type, &WorkerPool::TYPES);
    }
}
