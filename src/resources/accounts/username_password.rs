use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use super::{AccountFields, AccountKind};
use crate::framework::value::{self, TfString};
use crate::framework::{schema, Validation};
use crate::model::account::{Account, AccountCommon, UsernamePasswordAccount};
use crate::model::SensitiveValue;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UsernamePasswordAccountState {
    #[serde(flatten)]
    pub account: AccountFields,
    pub username: TfString,
    pub password: TfString,
}

pub struct UsernamePassword;

impl AccountKind for UsernamePassword {
    type State = UsernamePasswordAccountState;

    const NAME: &'static str = "octopusdeploy_username_password_account";
    const ACCOUNT_TYPE: &'static str = "UsernamePassword";
    const DESCRIPTION: &'static str = "This resource manages username-password accounts in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        vec![("username", schema::username(true)), ("password", schema::password(false))]
    }

    fn fields(state: &Self::State) -> &AccountFields {
        &state.account
    }

    fn fields_mut(state: &mut Self::State) -> &mut AccountFields {
        &mut state.account
    }

    fn with_fields(account: AccountFields) -> Self::State {
        UsernamePasswordAccountState {
            account,
            ..Default::default()
        }
    }

    fn expand(state: &Self::State, common: AccountCommon) -> Account {
        Account::UsernamePassword(UsernamePasswordAccount {
            common,
            username: value::opt_string(&state.username),
            password: SensitiveValue::from_option(value::opt_string(&state.password)),
        })
    }

    fn flatten(account: &Account, state: &mut Self::State) -> bool {
        match account {
            Account::UsernamePassword(account) => {
                value::set_string(&mut state.username, account.username.as_deref());
                true
            }
            _ => false,
        }
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("username", &config.username);
    }
}
