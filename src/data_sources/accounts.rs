use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, AttributeType};

use super::{Listing, QueryFields};
use crate::client::Query;
use crate::framework::value::{self, TfBlocks, TfString};
use crate::framework::{schema, Validation};
use crate::model::account::Account;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AccountItem {
    pub id: String,
    pub name: String,
    pub account_type: String,
    pub description: String,
    pub environments: Vec<String>,
    pub tenants: Vec<String>,
    pub tenant_tags: Vec<String>,
    pub tenanted_deployment_participation: String,
    pub space_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AccountsState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub account_type: TfString,
    pub accounts: TfBlocks<AccountItem>,
}

pub struct Accounts;

impl Listing for Accounts {
    type Model = Account;
    type Item = AccountItem;
    type State = AccountsState;

    const NAME: &'static str = "octopusdeploy_accounts";
    const RESULTS: &'static str = "accounts";
    const SINGULAR: &'static str = "account";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("account_type", schema::text()),
            ("description", schema::text()),
            ("environments", schema::text_list()),
            ("tenants", schema::text_list()),
            ("tenant_tags", schema::text_list()),
            ("tenanted_deployment_participation", schema::text()),
            ("space_id", schema::text()),
        ]
    }

    fn filter_attributes() -> Vec<(&'static str, Attribute)> {
        vec![(
            "account_type",
            schema::optional(
                schema::text(),
                &format!(
                    "A filter to search by account type. Valid account types are {}.",
                    Account::TYPES.map(|account_type| format!("`{account_type}`")).join(", ")
                ),
            ),
        )]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    fn filter(config: &Self::State, query: Query) -> Query {
        match value::opt_string(&config.account_type) {
            Some(account_type) => query.with("accountType", account_type),
            None => query,
        }
    }

    fn item(_config: &Self::State, account: &Account) -> Option<AccountItem> {
        let common = account.common()?;
        Some(AccountItem {
            id: common.id.clone().unwrap_or_default(),
            name: common.name.clone(),
            account_type: account.account_type().to_string(),
            description: common.description.clone().unwrap_or_default(),
            environments: common.environment_ids.clone(),
            tenants: common.tenant_ids.clone(),
            tenant_tags: common.tenant_tags.clone(),
            tenanted_deployment_participation: common.tenanted_deployment_participation.clone().unwrap_or_default(),
            space_id: common.space_id.clone().unwrap_or_default(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<AccountItem> {
        &mut state.accounts
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.one_of("account_type", &config.account_type, &Account::TYPES);
    }
}

#[cfg(test)]
mod tests {
    use tf_provider::value::Value;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::test::client_for;
    use crate::data_sources::ListingDataSource;
    use crate::framework::test::assert_schema_matches_state;
    use crate::framework::OctopusDataSource;

    type DataSource = ListingDataSource<Accounts>;

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<AccountsState>(&DataSource::schema());
    }

    #[test]
    fn account_type_is_validated() {
        let config = AccountsState {
            account_type: Value::Value("Kerberos".into()),
            ..Default::default()
        };
        let mut validation = Validation::default();
        DataSource::validate(&config, &mut validation);
        assert_eq!(validation.issues().len(), 1);
    }

    #[tokio::test]
    async fn unsupported_account_types_are_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/accounts"))
            .and(query_param("accountType", "Token"))
            .and(query_param("take", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": [
                    { "Id": "Accounts-1", "AccountType": "Token", "Name": "ci", "Token": { "HasValue": true } },
                    { "Id": "Accounts-2", "AccountType": "AmazonWebServicesRoleAccount", "Name": "legacy" }
                ],
                "TotalResults": 2
            })))
            .mount(&server)
            .await;

        let mut config = AccountsState {
            account_type: Value::Value("Token".into()),
            ..Default::default()
        };
        config.query.take = Value::Value(10);

        let client = client_for(&server, Some("Spaces-1"));
        let state = DataSource::read(&client, config).await.unwrap();
        let accounts = value::blocks(&state.accounts);
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].account_type, "Token");
        assert_eq!(accounts[0].name, "ci");
    }
}
