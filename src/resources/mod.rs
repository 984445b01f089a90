//! Managed Terraform resources, one module per Octopus resource type.
use tf_provider::AttributePath;

use crate::framework::replace_if_changed;
use crate::framework::value::TfString;

pub mod accounts;
pub mod certificate;
pub mod channel;
pub mod environment;
pub mod feeds;
pub mod git_credential;
pub mod lifecycle;
pub mod project;
pub mod project_group;
pub mod space;
pub mod tag;
pub mod tag_set;
pub mod team;
pub mod tenant;
pub mod triggers;
pub mod worker_pools;
pub mod workers;

pub const TENANTED_DEPLOYMENT_MODES: [&str; 3] = ["Untenanted", "TenantedOrUntenanted", "Tenanted"];

pub const GUIDED_FAILURE_MODES: [&str; 3] = ["EnvironmentDefault", "Off", "On"];

/// Moving a resource to another space means creating it there.
pub fn space_replacement(prior: &TfString, proposed: &TfString) -> Vec<AttributePath> {
    replace_if_changed(&[("space_id", prior, proposed)])
}
