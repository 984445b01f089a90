use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use super::{azure_environment, AccountFields, AccountKind, AZURE_ENVIRONMENTS};
use crate::framework::value::{self, TfString};
use crate::framework::{schema, Validation};
use crate::model::account::{Account, AccountCommon, AzureServicePrincipalAccount};
use crate::model::SensitiveValue;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AzureServicePrincipalState {
    #[serde(flatten)]
    pub account: AccountFields,
    pub application_id: TfString,
    pub password: TfString,
    pub subscription_id: TfString,
    pub tenant_id: TfString,
    pub azure_environment: TfString,
    pub authentication_endpoint: TfString,
    pub resource_manager_endpoint: TfString,
}

pub struct AzureServicePrincipal;

impl AccountKind for AzureServicePrincipal {
    type State = AzureServicePrincipalState;

    const NAME: &'static str = "octopusdeploy_azure_service_principal";
    const ACCOUNT_TYPE: &'static str = "AzureServicePrincipal";
    const DESCRIPTION: &'static str = "This resource manages Azure service principal accounts in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        vec![
            ("application_id", schema::required(schema::text(), "The application ID of this resource.")),
            ("password", schema::password(true)),
            ("subscription_id", schema::required(schema::text(), "The subscription ID of this resource.")),
            ("tenant_id", schema::required(schema::text(), "The tenant ID of this resource.")),
            ("azure_environment", azure_environment()),
            (
                "authentication_endpoint",
                schema::optional(schema::text(), "The authentication endpoint URI for this resource."),
            ),
            (
                "resource_manager_endpoint",
                schema::optional(schema::text(), "The resource manager endpoint URI for this resource."),
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
        AzureServicePrincipalState {
            account,
            ..Default::default()
        }
    }

    fn expand(state: &Self::State, common: AccountCommon) -> Account {
        Account::AzureServicePrincipal(AzureServicePrincipalAccount {
            common,
            application_id: value::string(&state.application_id),
            tenant_id: value::string(&state.tenant_id),
            subscription_id: value::string(&state.subscription_id),
            azure_environment: value::opt_string(&state.azure_environment),
            authentication_endpoint: value::opt_string(&state.authentication_endpoint),
            resource_manager_endpoint: value::opt_string(&state.resource_manager_endpoint),
            password: SensitiveValue::from_option(value::opt_string(&state.password)),
        })
    }

    fn flatten(account: &Account, state: &mut Self::State) -> bool {
        match account {
            Account::AzureServicePrincipal(azure) => {
                value::set(&mut state.application_id, azure.application_id.clone());
                value::set(&mut state.tenant_id, azure.tenant_id.clone());
                value::set(&mut state.subscription_id, azure.subscription_id.clone());
                value::set_optional_string(&mut state.azure_environment, azure.azure_environment.as_deref());
                value::set_optional_string(&mut state.authentication_endpoint, azure.authentication_endpoint.as_deref());
                value::set_optional_string(
                    &mut state.resource_manager_endpoint,
                    azure.resource_manager_endpoint.as_deref(),
                );
                true
            }
            _ => false,
        }
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.uuid("application_id", &config.application_id);
        validation.uuid("subscription_id", &config.subscription_id);
        validation.uuid("tenant_id", &config.tenant_id);
        validation.not_empty("password", &config.password);
        validation.one_of("azure_environment", &config.azure_environment, &AZURE_ENVIRONMENTS);
        validation.url("authentication_endpoint", &config.authentication_endpoint);
        validation.url("resource_manager_endpoint", &config.resource_manager_endpoint);
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

    type Resource = AccountResource<AzureServicePrincipal>;

    fn configured() -> AzureServicePrincipalState {
        AzureServicePrincipalState {
            account: AccountFields {
                name: Value::Value("azure".into()),
                ..Default::default()
            },
            application_id: Value::Value("3c2a8d6e-2b0f-4b53-9d7a-0d2b0c5c1a11".into()),
            password: Value::Value("secret".into()),
            subscription_id: Value::Value("9b1d2c4e-7f3a-4d8e-a2b1-5c6d7e8f9a0b".into()),
            tenant_id: Value::Value("0f1e2d3c-4b5a-4968-8776-a5b4c3d2e1f0".into()),
            ..Default::default()
        }
    }

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<AzureServicePrincipalState>(&Resource::schema());
    }

    #[test]
    fn ids_must_be_uuids() {
        let mut validation = Validation::default();
        Resource::validate(&configured(), &mut validation);
        assert!(validation.is_valid());

        let config = AzureServicePrincipalState {
            tenant_id: Value::Value("contoso".into()),
            azure_environment: Value::Value("AzureMoonCloud".into()),
            ..configured()
        };
        let mut validation = Validation::default();
        Resource::validate(&config, &mut validation);
        assert_eq!(validation.issues().len(), 2);
    }

    #[test]
    fn password_is_never_read_back() {
        let state = configured();
        let account = AzureServicePrincipal::expand(&state, state.account.expand());
        let mut read = Resource::with_id("Accounts-2".into());
        assert!(AzureServicePrincipal::flatten(&account, &mut read));
        assert_eq!(read.password, Value::Null);
        assert_eq!(read.tenant_id, state.tenant_id);
    }

    #[test]
    fn flatten_restores_the_configured_account() {
        let planned = AzureServicePrincipalState {
            account: full_fields(),
            application_id: text("2a8b7a1e-5f2c-4b7e-9c1d-0f6e2d3c4b5a"),
            password: text("client-secret"),
            subscription_id: text("0b1c2d3e-4f5a-6b7c-8d9e-0f1a2b3c4d5e"),
            tenant_id: text("9f8e7d6c-5b4a-3c2d-1e0f-a9b8c7d6e5f4"),
            azure_environment: text("AzureChinaCloud"),
            authentication_endpoint: text("https://login.chinacloudapi.cn/"),
            resource_manager_endpoint: text("https://management.chinacloudapi.cn/"),
        };
        let blank = AzureServicePrincipalState {
            password: planned.password.clone(),
            ..Default::default()
        };
        assert_eq!(round_trip::<AzureServicePrincipal>(&planned, blank), planned);
    }
}
