//! Terraform provider for Octopus Deploy.
//!
//! Each managed resource maps a Terraform state struct onto an Octopus REST document
//! (`expand`) and back (`flatten`). The [provider] module registers them with the
//! plugin host; [framework] adapts the plain async CRUD in [resources] and
//! [data_sources] to the plugin protocol.
pub mod client;
pub mod config;
pub mod data_sources;
pub mod framework;
pub mod model;
pub mod provider;
pub mod resources;
