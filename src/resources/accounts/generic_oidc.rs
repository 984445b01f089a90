use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use super::{AccountFields, AccountKind};
use crate::framework::schema;
use crate::framework::value::{self, TfString, TfStrings};
use crate::model::account::{Account, AccountCommon, GenericOidcAccount};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GenericOidcAccountState {
    #[serde(flatten)]
    pub account: AccountFields,
    pub audience: TfString,
    pub execution_subject_keys: TfStrings,
}

pub struct GenericOidc;

impl AccountKind for GenericOidc {
    type State = GenericOidcAccountState;

    const NAME: &'static str = "octopusdeploy_generic_openid_connect_account";
    const ACCOUNT_TYPE: &'static str = "GenericOidcAccount";
    const DESCRIPTION: &'static str = "This resource manages generic OpenID Connect accounts in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        vec![
            ("audience", schema::optional(schema::text(), "The audience associated with this resource.")),
            (
                "execution_subject_keys",
                schema::subject_keys("Keys to include in a deployment or runbook. Valid options are `space`, `environment`, `project`, `tenant`, `runbook`, `account`, `type`."),
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
        GenericOidcAccountState {
            account,
            ..Default::default()
        }
    }

    fn expand(state: &Self::State, common: AccountCommon) -> Account {
        Account::GenericOidc(GenericOidcAccount {
            common,
            audience: value::opt_string(&state.audience),
            deployment_subject_keys: value::strings(&state.execution_subject_keys),
        })
    }

    fn flatten(account: &Account, state: &mut Self::State) -> bool {
        match account {
            Account::GenericOidc(oidc) => {
                value::set_optional_string(&mut state.audience, oidc.audience.as_deref());
                value::set_optional_list(&mut state.execution_subject_keys, &oidc.deployment_subject_keys);
                true
            }
            _ => false,
        }
    }
}
