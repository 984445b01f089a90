use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, AttributeType};

use super::{Listing, QueryFields};
use crate::client::Query;
use crate::framework::schema;
use crate::framework::value::{self, TfBlocks, TfString, TfStrings};
use crate::model::tenant::Tenant;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TenantItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tenant_tags: Vec<String>,
    pub projects: Vec<String>,
    pub space_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TenantsState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub project_id: TfString,
    pub tags: TfStrings,
    pub tenants: TfBlocks<TenantItem>,
}

pub struct Tenants;

impl Listing for Tenants {
    type Model = Tenant;
    type Item = TenantItem;
    type State = TenantsState;

    const NAME: &'static str = "octopusdeploy_tenants";
    const RESULTS: &'static str = "tenants";
    const SINGULAR: &'static str = "tenant";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("description", schema::text()),
            ("tenant_tags", schema::text_list()),
            ("projects", schema::text_list()),
            ("space_id", schema::text()),
        ]
    }

    fn filter_attributes() -> Vec<(&'static str, Attribute)> {
        vec![
            (
                "project_id",
                schema::optional(schema::text(), "A filter to search by a project ID."),
            ),
            (
                "tags",
                schema::optional(
                    schema::text_list(),
                    "A filter to search by a list of tenant tags, in the form `tag set name/tag name`.",
                ),
            ),
        ]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    fn filter(config: &Self::State, query: Query) -> Query {
        let mut query = query;
        if let Some(project_id) = value::opt_string(&config.project_id) {
            query = query.with("projectId", project_id);
        }
        if let Some(tags) = value::slice_from_list(&config.tags) {
            query = query.with("tags", tags.join(","));
        }
        query
    }

    fn item(_config: &Self::State, tenant: &Tenant) -> Option<TenantItem> {
        Some(TenantItem {
            id: tenant.id.clone().unwrap_or_default(),
            name: tenant.name.clone(),
            description: tenant.description.clone().unwrap_or_default(),
            tenant_tags: tenant.tenant_tags.clone(),
            projects: tenant.project_environments.keys().cloned().collect(),
            space_id: tenant.space_id.clone().unwrap_or_default(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<TenantItem> {
        &mut state.tenants
    }
}
