use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use super::{AccountFields, AccountKind};
use crate::framework::value::{self, TfString};
use crate::framework::{schema, Validation};
use crate::model::account::{Account, AccountCommon, TokenAccount};
use crate::model::SensitiveValue;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TokenAccountState {
    #[serde(flatten)]
    pub account: AccountFields,
    pub token: TfString,
}

pub struct Token;

impl AccountKind for Token {
    type State = TokenAccountState;

    const NAME: &'static str = "octopusdeploy_token_account";
    const ACCOUNT_TYPE: &'static str = "Token";
    const DESCRIPTION: &'static str = "This resource manages token accounts in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        vec![(
            "token",
            schema::sensitive(schema::required(schema::text(), "The secret token associated with this resource.")),
        )]
    }

    fn fields(state: &Self::State) -> &AccountFields {
        &state.account
    }

    fn fields_mut(state: &mut Self::State) -> &mut AccountFields {
        &mut state.account
    }

    fn with_fields(account: AccountFields) -> Self::State {
        TokenAccountState {
            account,
            ..Default::default()
        }
    }

    fn expand(state: &Self::State, common: AccountCommon) -> Account {
        Account::Token(TokenAccount {
            common,
            token: SensitiveValue::from_option(value::opt_string(&state.token)),
        })
    }

    fn flatten(account: &Account, _state: &mut Self::State) -> bool {
        matches!(account, Account::Token(_))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("token", &config.token);
    }
}
