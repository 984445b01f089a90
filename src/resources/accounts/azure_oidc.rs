use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use super::{azure_environment, AccountFields, AccountKind, AZURE_ENVIRONMENTS};
use crate::framework::value::{self, TfString, TfStrings};
use crate::framework::{schema, Validation};
use crate::model::account::{Account, AccountCommon, AzureOidcAccount};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AzureOidcState {
    #[serde(flatten)]
    pub account: AccountFields,
    pub application_id: TfString,
    pub subscription_id: TfString,
    pub tenant_id: TfString,
    pub azure_environment: TfString,
    pub authentication_endpoint: TfString,
    pub resource_manager_endpoint: TfString,
    pub audience: TfString,
    pub execution_subject_keys: TfStrings,
    pub health_subject_keys: TfStrings,
    pub account_test_subject_keys: TfStrings,
}

pub struct AzureOidc;

impl AccountKind for AzureOidc {
    type State = AzureOidcState;

    const NAME: &'static str = "octopusdeploy_azure_openid_connect";
    const ACCOUNT_TYPE: &'static str = "AzureOIDC";
    const DESCRIPTION: &'static str = "This resource manages Azure OpenID Connect accounts in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        vec![
            ("application_id", schema::required(schema::text(), "The application ID of this resource.")),
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
            ("audience", schema::optional(schema::text(), "The audience claim of the federated credential.")),
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
        AzureOidcState {
            account,
            ..Default::default()
        }
    }

    fn expand(state: &Self::State, common: AccountCommon) -> Account {
        Account::AzureOidc(AzureOidcAccount {
            common,
            application_id: value::string(&state.application_id),
            tenant_id: value::string(&state.tenant_id),
            subscription_id: value::string(&state.subscription_id),
            azure_environment: value::opt_string(&state.azure_environment),
            authentication_endpoint: value::opt_string(&state.authentication_endpoint),
            resource_manager_endpoint: value::opt_string(&state.resource_manager_endpoint),
            audience: value::opt_string(&state.audience),
            deployment_subject_keys: value::strings(&state.execution_subject_keys),
            health_check_subject_keys: value::strings(&state.health_subject_keys),
            account_test_subject_keys: value::strings(&state.account_test_subject_keys),
        })
    }

    fn flatten(account: &Account, state: &mut Self::State) -> bool {
        match account {
            Account::AzureOidc(azure) => {
                value::set(&mut state.application_id, azure.application_id.clone());
                value::set(&mut state.tenant_id, azure.tenant_id.clone());
                value::set(&mut state.subscription_id, azure.subscription_id.clone());
                value::set_optional_string(&mut state.azure_environment, azure.azure_environment.as_deref());
                value::set_optional_string(&mut state.authentication_endpoint, azure.authentication_endpoint.as_deref());
                value::set_optional_string(
                    &mut state.resource_manager_endpoint,
                    azure.resource_manager_endpoint.as_deref(),
                );
                value::set_optional_string(&mut state.audience, azure.audience.as_deref());
                value::set_optional_list(&mut state.execution_subject_keys, &azure.deployment_subject_keys);
                value::set_optional_list(&mut state.health_subject_keys, &azure.health_check_subject_keys);
                value::set_optional_list(&mut state.account_test_subject_keys, &azure.account_test_subject_keys);
                true
            }
            _ => false,
        }
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.uuid("application_id", &config.application_id);
        validation.uuid("subscription_id", &config.subscription_id);
        validation.uuid("tenant_id", &config.tenant_id);
        validation.one_of("azure_environment", &config.azure_environment, &AZURE_ENVIRONMENTS);
        validation.url("authentication_endpoint", &config.authentication_endpoint);
        validation.url("resource_manager_endpoint", &config.resource_manager_endpoint);
    }
}
