use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use super::{azure_environment, AccountFields, AccountKind, AZURE_ENVIRONMENTS};
use crate::framework::value::{self, TfString};
use crate::framework::{schema, Validation};
use crate::model::account::{Account, AccountCommon, AzureSubscriptionAccount};
use crate::model::SensitiveValue;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AzureSubscriptionState {
    #[serde(flatten)]
    pub account: AccountFields,
    pub subscription_id: TfString,
    pub azure_environment: TfString,
    pub certificate: TfString,
    pub certificate_thumbprint: TfString,
    pub management_endpoint: TfString,
    pub storage_endpoint_suffix: TfString,
}

pub struct AzureSubscription;

impl AccountKind for AzureSubscription {
    type State = AzureSubscriptionState;

    const NAME: &'static str = "octopusdeploy_azure_subscription_account";
    const ACCOUNT_TYPE: &'static str = "AzureSubscription";
    const DESCRIPTION: &'static str = "This resource manages Azure subscription accounts in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        vec![
            ("subscription_id", schema::required(schema::text(), "The subscription ID of this resource.")),
            ("azure_environment", azure_environment()),
            (
                "certificate",
                schema::sensitive(schema::optional(
                    schema::text(),
                    "The management certificate, as a base64 encoded string.",
                )),
            ),
            (
                "certificate_thumbprint",
                schema::computed(schema::text(), "The thumbprint of the management certificate."),
            ),
            (
                "management_endpoint",
                schema::optional(schema::text(), "The service management endpoint of this resource."),
            ),
            (
                "storage_endpoint_suffix",
                schema::optional(schema::text(), "The storage endpoint suffix of this resource."),
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
        AzureSubscriptionState {
            account,
            ..Default::default()
        }
    }

    fn expand(state: &Self::State, common: AccountCommon) -> Account {
        Account::AzureSubscription(AzureSubscriptionAccount {
            common,
            subscription_id: value::string(&state.subscription_id),
            azure_environment: value::opt_string(&state.azure_environment),
            certificate: SensitiveValue::from_option(value::opt_string(&state.certificate)),
            certificate_thumbprint: value::opt_string(&state.certificate_thumbprint),
            management_endpoint: value::opt_string(&state.management_endpoint),
            storage_endpoint_suffix: value::opt_string(&state.storage_endpoint_suffix),
        })
    }

    fn flatten(account: &Account, state: &mut Self::State) -> bool {
        match account {
            Account::AzureSubscription(azure) => {
                value::set(&mut state.subscription_id, azure.subscription_id.clone());
                value::set_optional_string(&mut state.azure_environment, azure.azure_environment.as_deref());
                value::set_string(&mut state.certificate_thumbprint, azure.certificate_thumbprint.as_deref());
                value::set_optional_string(&mut state.management_endpoint, azure.management_endpoint.as_deref());
                value::set_optional_string(&mut state.storage_endpoint_suffix, azure.storage_endpoint_suffix.as_deref());
                true
            }
            _ => false,
        }
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.uuid("subscription_id", &config.subscription_id);
        validation.one_of("azure_environment", &config.azure_environment, &AZURE_ENVIRONMENTS);
        validation.url("management_endpoint", &config.management_endpoint);
    }

    fn plan(state: &mut Self::State) {
        value::unknown_if_null(&mut state.certificate_thumbprint);
    }
}

#[cfg(test)]
mod tests {
    use tf_provider::value::Value;

    use super::*;
    use crate::framework::test::assert_schema_matches_state;
    use crate::framework::ManagedResource;
    use crate::resources::accounts::test::{full_fields, round_trip, text};
    use crate::resources::accounts::AccountResource;

    type Resource = AccountResource<AzureSubscription>;

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<AzureSubscriptionState>(&Resource::schema());
    }

    #[test]
    fn thumbprint_is_computed() {
        let mut state = AzureSubscriptionState {
            subscription_id: Value::Value("9b1d2c4e-7f3a-4d8e-a2b1-5c6d7e8f9a0b".into()),
            certificate: Value::Value("MIIK...".into()),
            ..Default::default()
        };
        Resource::plan(&mut state);
        assert_eq!(state.certificate_thumbprint, Value::Unknown);

        let account = Account::AzureSubscription(AzureSubscriptionAccount {
            subscription_id: "9b1d2c4e-7f3a-4d8e-a2b1-5c6d7e8f9a0b".into(),
            certificate_thumbprint: Some("ABCDEF".into()),
            ..Default::default()
        });
        assert!(AzureSubscription::flatten(&account, &mut state));
        assert_eq!(state.certificate_thumbprint, Value::Value("ABCDEF".into()));
        assert_eq!(state.certificate, Value::Value("MIIK...".into()));
    }

    #[test]
    fn flatten_restores_the_configured_account() {
        let planned = AzureSubscriptionState {
            account: full_fields(),
            subscription_id: text("0b1c2d3e-4f5a-6b7c-8d9e-0f1a2b3c4d5e"),
            azure_environment: text("AzureGermanCloud"),
            certificate: text("MIIKPAIBAzCCCfg="),
            certificate_thumbprint: text("A1B2C3D4E5F6"),
            management_endpoint: text("https://management.core.cloudapi.de/"),
            storage_endpoint_suffix: text("core.cloudapi.de"),
        };
        let blank = AzureSubscriptionState {
            certificate: planned.certificate.clone(),
            ..Default::default()
        };
        assert_eq!(round_trip::<AzureSubscription>(&planned, blank), planned);
    }
}
