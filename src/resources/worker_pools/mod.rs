//! Static and dynamic worker pools share one collection; the `WorkerPoolType` discriminator
//! decides which resource owns a pool.
use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use crate::framework::value::{self, TfBool, TfInt, TfString};
use crate::framework::{schema, Error, Validation};
use crate::model::worker_pool::{WorkerPool, WorkerPoolCommon};

pub mod dynamic_pool;
pub mod static_pool;

/// Attributes common to both pool types.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct WorkerPoolFields {
    pub id: TfString,
    pub name: TfString,
    pub description: TfString,
    pub is_default: TfBool,
    pub sort_order: TfInt,
    pub can_add_workers: TfBool,
    pub space_id: TfString,
}

impl WorkerPoolFields {
    fn expand(&self) -> WorkerPoolCommon {
        WorkerPoolCommon {
            id: value::opt_string(&self.id),
            name: value::string(&self.name),
            description: value::opt_string(&self.description),
            is_default: value::boolean(&self.is_default),
            sort_order: value::int(&self.sort_order),
            can_add_workers: false,
            space_id: value::opt_string(&self.space_id),
        }
    }

    fn flatten(&mut self, pool: &WorkerPoolCommon) {
        value::set_string(&mut self.id, pool.id.as_deref());
        value::set(&mut self.name, pool.name.clone());
        value::set_optional_string(&mut self.description, pool.description.as_deref());
        value::set_optional(&mut self.is_default, pool.is_default);
        value::set(&mut self.sort_order, pool.sort_order);
        value::set(&mut self.can_add_workers, pool.can_add_workers);
        value::set_string(&mut self.space_id, pool.space_id.as_deref());
    }

    fn plan(&mut self) {
        value::unknown_if_null(&mut self.id);
        value::unknown_if_null(&mut self.sort_order);
        value::unknown_if_null(&mut self.can_add_workers);
        value::unknown_if_null(&mut self.space_id);
    }

    fn validate(&self, validation: &mut Validation) {
        validation.not_empty("name", &self.name);
    }
}

fn common_attributes() -> Vec<(&'static str, Attribute)> {
    vec![
        ("id", schema::id()),
        ("name", schema::name("worker pool")),
        ("description", schema::description("worker pool")),
        ("is_default", schema::optional(schema::flag(), "Whether this is the default worker pool.")),
        ("sort_order", schema::sort_order("worker pool")),
        ("can_add_workers", schema::computed(schema::flag(), "Whether workers can be added to this pool.")),
        ("space_id", schema::space_id("worker pool")),
    ]
}

fn unexpected(expected: &'static str, pool: &WorkerPool) -> Error {
    Error::UnexpectedType {
        expected,
        found: pool.worker_pool_type().to_string(),
    }
}
