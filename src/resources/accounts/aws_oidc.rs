use serde::{Deserialize, Serialize};
use tf_provider::{schema::Attribute, value::Value};

use super::{AccountFields, AccountKind};
use crate::framework::value::{self, TfInt, TfString, TfStrings};
use crate::framework::{schema, Validation};
use crate::model::account::{Account, AccountCommon, AmazonWebServicesOidcAccount};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AwsOidcAccountState {
    #[serde(flatten)]
    pub account: AccountFields,
    pub role_arn: TfString,
    pub session_duration: TfInt,
    pub execution_subject_keys: TfStrings,
    pub health_subject_keys: TfStrings,
    pub account_test_subject_keys: TfStrings,
}

pub struct AwsOidcAccount;

impl AccountKind for AwsOidcAccount {
    type State = AwsOidcAccountState;

    const NAME: &'static str = "octopusdeploy_aws_openid_connect_account";
    const ACCOUNT_TYPE: &'static str = "AmazonWebServicesOidcAccount";
    const DESCRIPTION: &'static str = "This resource manages AWS OIDC accounts in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        vec![
            ("role_arn", schema::required(schema::text(), "The Amazon Resource Name (ARN) of the role that the caller is assuming.")),
            (
                "session_duration",
                schema::optional(schema::number(), "The duration, in seconds, of the role session."),
            ),
            (
                "execution_subject_keys",
                schema::subject_keys("Keys to include in a deployment or runbook. Valid options are `space`, `environment`, `project`, `tenant`, `runbook`, `account`, `type`."),
            ),
            (
                "health_subject_keys",
                schema::subject_keys("Keys to include in a health check. Valid options are `space`, `account`, `target`, `type`."),
            ),
            (
                "account_test_subject_keys",
                schema::subject_keys("Keys to include in an account test. Valid options are `space`, `account`, `type`."),
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
        AwsOidcAccountState {
            account,
            ..Default::default()
        }
    }

    fn expand(state: &Self::State, common: AccountCommon) -> Account {
        Account::AmazonWebServicesOidc(AmazonWebServicesOidcAccount {
            common,
            role_arn: value::string(&state.role_arn),
            session_duration: value::opt_int(&state.session_duration).map(|seconds| seconds.to_string()),
            deployment_subject_keys: value::strings(&state.execution_subject_keys),
            health_check_subject_keys: value::strings(&state.health_subject_keys),
            account_test_subject_keys: value::strings(&state.account_test_subject_keys),
        })
    }

    fn flatten(account: &Account, state: &mut Self::State) -> bool {
        match account {
            Account::AmazonWebServicesOidc(aws) => {
                value::set(&mut state.role_arn, aws.role_arn.clone());
                match aws.session_duration.as_deref().and_then(|seconds| seconds.parse().ok()) {
                    Some(seconds) => value::set_optional(&mut state.session_duration, seconds),
                    None => state.session_duration = Value::Null,
                }
                value::set_optional_list(&mut state.execution_subject_keys, &aws.deployment_subject_keys);
                value::set_optional_list(&mut state.health_subject_keys, &aws.health_check_subject_keys);
                value::set_optional_list(&mut state.account_test_subject_keys, &aws.account_test_subject_keys);
                true
            }
            _ => false,
        }
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("role_arn", &config.role_arn);
        validation.at_least("session_duration", &config.session_duration, 0);
    }
}
