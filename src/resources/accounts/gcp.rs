use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use super::{AccountFields, AccountKind};
use crate::framework::value::{self, TfString};
use crate::framework::{schema, Validation};
use crate::model::account::{Account, AccountCommon, GoogleCloudAccount};
use crate::model::SensitiveValue;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GcpAccountState {
    #[serde(flatten)]
    pub account: AccountFields,
    pub json_key: TfString,
}

pub struct GcpAccount;

impl AccountKind for GcpAccount {
    type State = GcpAccountState;

    const NAME: &'static str = "octopusdeploy_gcp_account";
    const ACCOUNT_TYPE: &'static str = "GoogleCloudAccount";
    const DESCRIPTION: &'static str = "This resource manages GCP accounts in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        vec![(
            "json_key",
            schema::sensitive(schema::required(schema::text(), "The JSON key associated with this GCP account.")),
        )]
    }

    fn fields(state: &Self::State) -> &AccountFields {
        &state.account
    }

    fn fields_mut(state: &mut Self::State) -> &mut AccountFields {
        &mut state.account
    }

    fn with_fields(account: AccountFields) -> Self::State {
        GcpAccountState {
            account,
            ..Default::default()
        }
    }

    fn expand(state: &Self::State, common: AccountCommon) -> Account {
        Account::GoogleCloud(GoogleCloudAccount {
            common,
            json_key: SensitiveValue::from_option(value::opt_string(&state.json_key)),
        })
    }

    fn flatten(account: &Account, _state: &mut Self::State) -> bool {
        matches!(account, Account::GoogleCloud(_))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("json_key", &config.json_key);
    }
}
