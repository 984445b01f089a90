//! Read-only listings of Octopus collections.
//!
//! Every data source takes the same paging filters, queries one collection and returns the
//! matches as a computed list of objects. A [Listing] describes one collection; the
//! [ListingDataSource] does the querying.
use std::fmt::Debug;
use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tf_provider::{schema::{Attribute, AttributeType, Schema}, value::Value};

use crate::client::{Client, Collection, Query};
use crate::framework::value::{self, TfBlocks, TfInt, TfString, TfStrings};
use crate::framework::{schema, Error, OctopusDataSource, TfState, Validation};

pub mod accounts;
pub mod certificates;
pub mod channels;
pub mod environments;
pub mod feeds;
pub mod git_credentials;
pub mod library_variable_sets;
pub mod lifecycles;
pub mod machine_policies;
pub mod project_groups;
pub mod projects;
pub mod space;
pub mod spaces;
pub mod tag_sets;
pub mod teams;
pub mod tenants;
pub mod user_roles;
pub mod users;
pub mod worker_pools;
pub mod workers;

pub const DEFAULT_SKIP: i64 = 0;
pub const DEFAULT_TAKE: i64 = 1;

/// Filters every data source accepts, plus the generated `id`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct QueryFields {
    pub id: TfString,
    pub ids: TfStrings,
    pub partial_name: TfString,
    pub skip: TfInt,
    pub take: TfInt,
    pub space_id: TfString,
}

impl QueryFields {
    pub fn query(&self) -> Query {
        Query {
            ids: value::strings(&self.ids),
            partial_name: value::opt_string(&self.partial_name),
            skip: Some(value::opt_int(&self.skip).unwrap_or(DEFAULT_SKIP)),
            take: Some(value::opt_int(&self.take).unwrap_or(DEFAULT_TAKE)),
            extra: Vec::new(),
        }
    }

    fn validate(&self, validation: &mut Validation) {
        validation.at_least("skip", &self.skip, 0);
        validation.at_least("take", &self.take, 0);
    }
}

/// One queryable collection.
pub trait Listing: Send + Sync + 'static {
    type Model: Collection;

    /// One element of the result list.
    type Item: Serialize + DeserializeOwned + Clone + Debug + Default + PartialEq + Send + Sync;

    type State: TfState;

    /// Terraform type name, e.g. `octopusdeploy_environments`.
    const NAME: &'static str;

    /// Name of the result attribute, e.g. `environments`.
    const RESULTS: &'static str;

    /// What one result is called in descriptions.
    const SINGULAR: &'static str;

    /// Object type of one result.
    fn item_type() -> Vec<(&'static str, AttributeType)>;

    /// Filters beyond the shared ones.
    fn filter_attributes() -> Vec<(&'static str, Attribute)> {
        Vec::new()
    }

    fn fields(state: &Self::State) -> &QueryFields;

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields;

    /// Add collection specific filters to the query.
    fn filter(_config: &Self::State, query: Query) -> Query {
        query
    }

    /// Filters the server does not apply. Returning `None` drops the model.
    fn item(config: &Self::State, model: &Self::Model) -> Option<Self::Item>;

    fn results(state: &mut Self::State) -> &mut TfBlocks<Self::Item>;

    fn validate(_config: &Self::State, _validation: &mut Validation) {}
}

pub struct ListingDataSource<L> {
    _listing: PhantomData<fn() -> L>,
}

#[async_trait]
impl<L: Listing> OctopusDataSource for ListingDataSource<L> {
    type State = L::State;

    const NAME: &'static str = L::NAME;

    fn schema() -> Schema {
        let mut attributes = schema::query_attributes(L::SINGULAR);
        attributes.extend(L::filter_attributes());
        attributes.push((
            L::RESULTS,
            schema::computed(
                schema::object_list(L::item_type()),
                &format!("A list of {} that match the filter(s).", L::RESULTS.replace('_', " ")),
            ),
        ));
        schema::schema(schema::block(
            &format!("Provides information about existing {}.", L::RESULTS.replace('_', " ")),
            attributes,
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        L::fields(config).validate(validation);
        L::validate(config, validation);
    }

    async fn read(client: &Client, config: Self::State) -> Result<Self::State, Error> {
        let fields = L::fields(&config);
        let space_id = value::opt_string(&fields.space_id);
        let query = L::filter(&config, fields.query());
        let page = client.query::<L::Model>(space_id.as_deref(), &query).await?;

        let items: Vec<L::Item> = page.items.iter().filter_map(|model| L::item(&config, model)).collect();
        debug!(
            "{} matched {} of {} {}",
            L::NAME,
            items.len(),
            page.total_results,
            L::RESULTS
        );

        let mut state = config;
        *L::results(&mut state) = value::blocks_from(items);
        value::set(&mut L::fields_mut(&mut state).id, Utc::now().to_rfc3339());
        Ok(state)
    }
}

/// Whether a filter flag is set to true.
pub fn is_set(flag: &Value<bool>) -> bool {
    matches!(flag, Value::Value(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_paging_uses_defaults() {
        let query = QueryFields::default().query();
        assert_eq!(query.skip, Some(0));
        assert_eq!(query.take, Some(1));
        assert!(query.ids.is_empty());
        assert_eq!(query.partial_name, None);
    }

    #[test]
    fn paging_must_not_be_negative() {
        let fields = QueryFields {
            skip: Value::Value(-1),
            take: Value::Value(10),
            ..Default::default()
        };
        let mut validation = Validation::default();
        fields.validate(&mut validation);
        assert_eq!(validation.issues().len(), 1);
    }

    #[test]
    fn empty_partial_name_is_not_sent() {
        let fields = QueryFields {
            partial_name: Value::Value(String::new()),
            ids: value::list_from(&["Environments-1"]),
            ..Default::default()
        };
        let query = fields.query();
        let pairs = query.pairs();
        assert!(pairs.iter().all(|(key, _)| *key != "partialName"));
        assert_eq!(pairs[0], ("ids", "Environments-1".to_string()));
    }
}
