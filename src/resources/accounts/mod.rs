//! Accounts share one collection and a common set of attributes; each account type adds
//! its own fields and is told apart by `AccountType`.
//!
//! An [AccountKind] describes one account type. [AccountResource] turns it into a managed
//! resource, handling the common attributes and the type check on every read.
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::{Attribute, Schema}, value::Value};

use super::{space_replacement, TENANTED_DEPLOYMENT_MODES};
use crate::client::Client;
use crate::framework::value::{self, TfString, TfStrings};
use crate::framework::{schema, Error, ManagedResource, TfState, Validation};
use crate::model::account::{Account, AccountCommon};

pub mod aws;
pub mod aws_oidc;
pub mod azure_oidc;
pub mod azure_service_principal;
pub mod azure_subscription;
pub mod gcp;
pub mod generic_oidc;
pub mod ssh_key;
pub mod token;
pub mod username_password;

pub const AZURE_ENVIRONMENTS: [&str; 4] = [
    "AzureCloud",
    "AzureChinaCloud",
    "AzureGermanCloud",
    "AzureUSGovernment",
];

/// Attributes every account has.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AccountFields {
    pub id: TfString,
    pub name: TfString,
    pub description: TfString,
    pub environments: TfStrings,
    pub tenants: TfStrings,
    pub tenant_tags: TfStrings,
    pub tenanted_deployment_participation: TfString,
    pub space_id: TfString,
}

impl AccountFields {
    pub fn expand(&self) -> AccountCommon {
        AccountCommon {
            id: value::opt_string(&self.id),
            name: value::string(&self.name),
            description: value::opt_string(&self.description),
            space_id: value::opt_string(&self.space_id),
            environment_ids: value::strings(&self.environments),
            tenant_ids: value::strings(&self.tenants),
            tenant_tags: value::strings(&self.tenant_tags),
            tenanted_deployment_participation: value::opt_string(&self.tenanted_deployment_participation),
        }
    }

    pub fn flatten(&mut self, account: &AccountCommon) {
        value::set_string(&mut self.id, account.id.as_deref());
        value::set(&mut self.name, account.name.clone());
        value::set_optional_string(&mut self.description, account.description.as_deref());
        value::set_optional_list(&mut self.environments, &account.environment_ids);
        value::set_optional_list(&mut self.tenants, &account.tenant_ids);
        value::set_optional_list(&mut self.tenant_tags, &account.tenant_tags);
        value::set_string(
            &mut self.tenanted_deployment_participation,
            account.tenanted_deployment_participation.as_deref(),
        );
        value::set_string(&mut self.space_id, account.space_id.as_deref());
    }

    fn plan(&mut self) {
        value::unknown_if_null(&mut self.id);
        value::unknown_if_null(&mut self.tenanted_deployment_participation);
        value::unknown_if_null(&mut self.space_id);
    }

    fn validate(&self, validation: &mut Validation) {
        validation.not_empty("name", &self.name);
        validation.one_of(
            "tenanted_deployment_participation",
            &self.tenanted_deployment_participation,
            &TENANTED_DEPLOYMENT_MODES,
        );
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
        ("name", schema::name("account")),
        ("description", schema::description("account")),
        ("environments", schema::environments()),
        ("tenants", schema::tenants()),
        ("tenant_tags", schema::tenant_tags()),
        ("tenanted_deployment_participation", schema::tenanted_deployment_participation()),
        ("space_id", schema::space_id("account")),
    ]
}

/// Attributes shared by the Azure account types.
fn azure_environment() -> Attribute {
    schema::optional(
        schema::text(),
        "The Azure environment associated with this resource. Valid Azure environments are `AzureCloud`, `AzureChinaCloud`, `AzureGermanCloud`, or `AzureUSGovernment`.",
    )
}

/// One account type.
pub trait AccountKind: Send + Sync + 'static {
    type State: TfState;

    /// Terraform type name.
    const NAME: &'static str;

    /// The `AccountType` the server reports for this kind.
    const ACCOUNT_TYPE: &'static str;

    const DESCRIPTION: &'static str;

    /// Attributes beyond the common ones.
    fn attributes() -> Vec<(&'static str, Attribute)>;

    fn fields(state: &Self::State) -> &AccountFields;

    fn fields_mut(state: &mut Self::State) -> &mut AccountFields;

    fn expand(state: &Self::State, common: AccountCommon) -> Account;

    /// Copy the type specific fields into the state. Returns false for another account type.
    fn flatten(account: &Account, state: &mut Self::State) -> bool;

    fn validate(_config: &Self::State, _validation: &mut Validation) {}

    fn plan(_state: &mut Self::State) {}

    fn with_fields(fields: AccountFields) -> Self::State;
}

fn flatten<K: AccountKind>(account: &Account, state: &mut K::State) -> Result<(), Error> {
    match account.common() {
        Some(common) if K::flatten(account, state) => {
            K::fields_mut(state).flatten(common);
            Ok(())
        }
        _ => Err(Error::UnexpectedType {
            expected: K::ACCOUNT_TYPE,
            found: account.account_type().to_string(),
        }),
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    pub fn text(value: &str) -> TfString {
        Value::Value(value.into())
    }

    /// Common attributes with every optional one set.
    pub fn full_fields() -> AccountFields {
        AccountFields {
            id: text("Accounts-7"),
            name: text("shared"),
            description: text("Used by the platform team"),
            environments: value::list_from(&["Environments-1", "Environments-2"]),
            tenants: value::list_from(&["Tenants-1"]),
            tenant_tags: value::list_from(&["Region/EU"]),
            tenanted_deployment_participation: text("TenantedOrUntenanted"),
            space_id: text("Spaces-1"),
        }
    }

    /// Expand `planned` and flatten it into `blank`, which holds only the write-only values.
    pub fn round_trip<K: AccountKind>(planned: &K::State, blank: K::State) -> K::State {
        let account = K::expand(planned, K::fields(planned).expand());
        let mut state = blank;
        flatten::<K>(&account, &mut state).unwrap();
        state
    }
}

pub struct AccountResource<K> {
    _kind: PhantomData<fn() -> K>,
}

#[async_trait]
impl<K: AccountKind> ManagedResource for AccountResource<K> {
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
        K::plan(state);
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
        K::with_fields(AccountFields::with_id(id))
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let common = K::fields(&planned).expand();
        let space_id = common.space_id.clone();
        let created = client.add(space_id.as_deref(), &K::expand(&planned, common)).await?;
        let mut state = planned;
        flatten::<K>(&created, &mut state)?;
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let fields = K::fields(&state);
        let space_id = value::opt_string(&fields.space_id);
        let Some(account) = client
            .find::<Account>(space_id.as_deref(), &value::string(&fields.id))
            .await?
        else {
            return Ok(None);
        };
        let mut state = state;
        flatten::<K>(&account, &mut state)?;
        Ok(Some(state))
    }

    async fn update(client: &Client, _prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let common = K::fields(&planned).expand();
        let space_id = common.space_id.clone();
        let id = value::string(&K::fields(&planned).id);
        let updated = client
            .update(space_id.as_deref(), &id, &K::expand(&planned, common))
            .await?;
        let mut state = planned;
        flatten::<K>(&updated, &mut state)?;
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let fields = K::fields(&state);
        let space_id = value::opt_string(&fields.space_id);
        client
            .delete::<Account>(space_id.as_deref(), &value::string(&fields.id))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::aws::{AwsAccount, AwsAccountState};
    use super::*;
    use crate::client::test::client_for;

    type AwsResource = AccountResource<AwsAccount>;

    #[test]
    fn common_attributes_are_validated() {
        let config = AwsAccountState {
            account: AccountFields {
                name: Value::Value(" ".into()),
                tenanted_deployment_participation: Value::Value("Sometimes".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let mut validation = Validation::default();
        AwsResource::validate(&config, &mut validation);
        assert_eq!(validation.issues().len(), 2);
    }

    #[test]
    fn empty_tenant_lists_stay_null() {
        let mut fields = AccountFields::default();
        fields.flatten(&AccountCommon {
            id: Some("Accounts-1".into()),
            name: "aws".into(),
            ..Default::default()
        });
        assert_eq!(fields.tenants, Value::Null);
        assert_eq!(fields.tenanted_deployment_participation, Value::Value(String::new()));
    }

    #[tokio::test]
    async fn reading_another_account_type_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/accounts/Accounts-4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Id": "Accounts-4",
                "AccountType": "Token",
                "Name": "token",
                "Token": { "HasValue": true }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let err = AwsResource::read(&client, AwsResource::with_id("Accounts-4".into()))
            .await
            .unwrap_err();
        match err {
            Error::UnexpectedType { expected, found } => {
                assert_eq!(expected, "AmazonWebServicesAccount");
                assert_eq!(found, "Token");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn deleted_accounts_read_as_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/accounts/Accounts-4"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let state = AwsResource::read(&client, AwsResource::with_id("Accounts-4".into()))
            .await
            .unwrap();
        assert_eq!(state, None);
    }
}
