use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use super::{AccountFields, AccountKind};
use crate::framework::value::{self, TfString};
use crate::framework::{schema, Validation};
use crate::model::account::{Account, AccountCommon, AmazonWebServicesAccount};
use crate::model::SensitiveValue;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AwsAccountState {
    #[serde(flatten)]
    pub account: AccountFields,
    pub access_key: TfString,
    pub secret_key: TfString,
}

pub struct AwsAccount;

impl AccountKind for AwsAccount {
    type State = AwsAccountState;

    const NAME: &'static str = "octopusdeploy_aws_account";
    const ACCOUNT_TYPE: &'static str = "AmazonWebServicesAccount";
    const DESCRIPTION: &'static str = "This resource manages AWS accounts in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        vec![
            ("access_key", schema::required(schema::text(), "The access key associated with this AWS account.")),
            (
                "secret_key",
                schema::sensitive(schema::required(
                    schema::text(),
                    "The secret key associated with this AWS account.",
                )),
            ),
        ]
    }

    fn fields(state: &Self::State) -> &AccountFields {
        &state.account
    }

    fn fields_mut(state: &mut Self::State) -> &mut AccountFields {
        &mut state.account
    }

    fn with_fields(account: AccountFields) -> Self::State {
        AwsAccountState {
            account,
            ..Default::default()
        }
    }

    fn expand(state: &Self::State, common: AccountCommon) -> Account {
        Account::AmazonWebServices(AmazonWebServicesAccount {
            common,
            access_key: value::string(&state.access_key),
            secret_key: SensitiveValue::from_option(value::opt_string(&state.secret_key)),
        })
    }

    fn flatten(account: &Account, state: &mut Self::State) -> bool {
        match account {
            Account::AmazonWebServices(aws) => {
                value::set(&mut state.access_key, aws.access_key.clone());
                true
            }
            _ => false,
        }
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("access_key", &config.access_key);
        validation.not_empty("secret_key", &config.secret_key);
    }
}

#[cfg(test)]
mod tests {
    use tf_provider::value::Value;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::test::client_for;
    use crate::framework::test::assert_schema_matches_state;
    use crate::framework::ManagedResource;
    use crate::resources::accounts::test::{full_fields, round_trip, text};
    use crate::resources::accounts::AccountResource;

    type Resource = AccountResource<AwsAccount>;

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<AwsAccountState>(&Resource::schema());
    }

    #[tokio::test]
    async fn create_sends_the_secret_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/Spaces-1/accounts"))
            .and(body_partial_json(serde_json::json!({
                "AccountType": "AmazonWebServicesAccount",
                "Name": "aws",
                "AccessKey": "AKIA123",
                "SecretKey": { "HasValue": true, "NewValue": "s3cr3t" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "Id": "Accounts-1",
                "AccountType": "AmazonWebServicesAccount",
                "Name": "aws",
                "AccessKey": "AKIA123",
                "SecretKey": { "HasValue": true },
                "TenantedDeploymentParticipation": "Untenanted",
                "SpaceId": "Spaces-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut planned = AwsAccountState {
            account: AccountFields {
                name: Value::Value("aws".into()),
                ..Default::default()
            },
            access_key: Value::Value("AKIA123".into()),
            secret_key: Value::Value("s3cr3t".into()),
        };
        Resource::plan(&mut planned);

        let client = client_for(&server, Some("Spaces-1"));
        let state = Resource::create(&client, planned).await.unwrap();
        assert_eq!(state.account.id, Value::Value("Accounts-1".into()));
        assert_eq!(state.account.tenanted_deployment_participation, Value::Value("Untenanted".into()));
        assert_eq!(state.secret_key, Value::Value("s3cr3t".into()));
    }

    #[test]
    fn flatten_restores_the_configured_account() {
        let planned = AwsAccountState {
            account: full_fields(),
            access_key: text("AKIA123"),
            secret_key: text("s3cr3t"),
        };
        let blank = AwsAccountState {
            secret_key: planned.secret_key.clone(),
            ..Default::default()
        };
        assert_eq!(round_trip::<AwsAccount>(&planned, blank), planned);
    }
}
