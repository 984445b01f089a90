use serde::{Deserialize, Serialize};

use crate::client::Collection;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct WorkerPoolCommon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub can_add_workers: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DynamicWorkerPool {
    #[serde(flatten)]
    pub common: WorkerPoolCommon,
    pub worker_type: String,
}

/// Keyed by `WorkerPoolType`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "WorkerPoolType")]
pub enum WorkerPool {
    #[serde(rename = "StaticWorkerPool")]
    Static(WorkerPoolCommon),
    #[serde(rename = "DynamicWorkerPool")]
    Dynamic(DynamicWorkerPool),
    #[serde(other)]
    Unsupported,
}

impl Collection for WorkerPool {
    const PATH: &'static str = "workerpools";
}

impl WorkerPool {
    pub const TYPES: [&'static str; 2] = ["DynamicWorkerPool", "StaticWorkerPool"];

    pub const WORKER_TYPES: [&'static str; 5] = [
        "Ubuntu1804",
        "UbuntuDefault",
        "Windows2016",
        "Windows2019",
        "WindowsDefault",
    ];

    pub fn worker_pool_type(&self) -> &'static str {
        match self {
            WorkerPool::Static(_) => "StaticWorkerPool",
            WorkerPool::Dynamic(_) => "DynamicWorkerPool",
            WorkerPool::Unsupported => "an unsupported worker pool type",
        }
    }

    pub fn common(&self) -> Option<&WorkerPoolCommon> {
        match self {
            WorkerPool::Static(common) => Some(common),
            WorkerPool::Dynamic(pool) => Some(&pool.common),
            WorkerPool::Unsupported => None,
        }
    }
}
