use serde::{Deserialize, Serialize};

use super::{nullable, string_or_number, SensitiveValue};
use crate::client::Collection;

/// Fields shared by every account type.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AccountCommon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub environment_ids: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tenant_ids: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tenant_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenanted_deployment_participation: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AmazonWebServicesAccount {
    #[serde(flatten)]
    pub common: AccountCommon,
    pub access_key: String,
    #[serde(default)]
    pub secret_key: SensitiveValue,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AmazonWebServicesOidcAccount {
    #[serde(flatten)]
    pub common: AccountCommon,
    pub role_arn: String,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub session_duration: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub deployment_subject_keys: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub health_check_subject_keys: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub account_test_subject_keys: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AzureServicePrincipalAccount {
    #[serde(flatten)]
    pub common: AccountCommon,
    #[serde(rename = "ClientId")]
    pub application_id: String,
    pub tenant_id: String,
    #[serde(rename = "SubscriptionNumber")]
    pub subscription_id: String,
    #[serde(default)]
    pub azure_environment: Option<String>,
    #[serde(default, rename = "ActiveDirectoryEndpointBaseUri")]
    pub authentication_endpoint: Option<String>,
    #[serde(default, rename = "ResourceManagementEndpointBaseUri")]
    pub resource_manager_endpoint: Option<String>,
    #[serde(default)]
    pub password: SensitiveValue,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AzureOidcAccount {
    #[serde(flatten)]
    pub common: AccountCommon,
    #[serde(rename = "ClientId")]
    pub application_id: String,
    pub tenant_id: String,
    #[serde(rename = "SubscriptionNumber")]
    pub subscription_id: String,
    #[serde(default)]
    pub azure_environment: Option<String>,
    #[serde(default, rename = "ActiveDirectoryEndpointBaseUri")]
    pub authentication_endpoint: Option<String>,
    #[serde(default, rename = "ResourceManagementEndpointBaseUri")]
    pub resource_manager_endpoint: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub deployment_subject_keys: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub health_check_subject_keys: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub account_test_subject_keys: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AzureSubscriptionAccount {
    #[serde(flatten)]
    pub common: AccountCommon,
    #[serde(rename = "SubscriptionNumber")]
    pub subscription_id: String,
    #[serde(default)]
    pub azure_environment: Option<String>,
    #[serde(default, rename = "CertificateBytes")]
    pub certificate: SensitiveValue,
    #[serde(default)]
    pub certificate_thumbprint: Option<String>,
    #[serde(default, rename = "ServiceManagementEndpointBaseUri")]
    pub management_endpoint: Option<String>,
    #[serde(default, rename = "ServiceManagementEndpointSuffix")]
    pub storage_endpoint_suffix: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GoogleCloudAccount {
    #[serde(flatten)]
    pub common: AccountCommon,
    #[serde(default)]
    pub json_key: SensitiveValue,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GenericOidcAccount {
    #[serde(flatten)]
    pub common: AccountCommon,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub deployment_subject_keys: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SshKeyAccount {
    #[serde(flatten)]
    pub common: AccountCommon,
    pub username: String,
    #[serde(default)]
    pub private_key_file: SensitiveValue,
    #[serde(default)]
    pub private_key_passphrase: SensitiveValue,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TokenAccount {
    #[serde(flatten)]
    pub common: AccountCommon,
    #[serde(default)]
    pub token: SensitiveValue,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct UsernamePasswordAccount {
    #[serde(flatten)]
    pub common: AccountCommon,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: SensitiveValue,
}

/// Every account type the provider understands, keyed by `AccountType`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "AccountType")]
pub enum Account {
    #[serde(rename = "AmazonWebServicesAccount")]
    AmazonWebServices(AmazonWebServicesAccount),
    #[serde(rename = "AmazonWebServicesOidcAccount")]
    AmazonWebServicesOidc(AmazonWebServicesOidcAccount),
    AzureServicePrincipal(AzureServicePrincipalAccount),
    #[serde(rename = "AzureOIDC")]
    AzureOidc(AzureOidcAccount),
    AzureSubscription(AzureSubscriptionAccount),
    #[serde(rename = "GoogleCloudAccount")]
    GoogleCloud(GoogleCloudAccount),
    #[serde(rename = "GenericOidcAccount")]
    GenericOidc(GenericOidcAccount),
    SshKeyPair(SshKeyAccount),
    Token(TokenAccount),
    UsernamePassword(UsernamePasswordAccount),
    /// An account type this provider does not manage.
    #[serde(other)]
    Unsupported,
}

impl Collection for Account {
    const PATH: &'static str = "accounts";
}

impl Account {
    /// Account type names as used by the API and the `account_type` filter.
    pub const TYPES: [&'static str; 10] = [
        "AmazonWebServicesAccount",
        "AmazonWebServicesOidcAccount",
        "AzureServicePrincipal",
        "AzureOIDC",
        "AzureSubscription",
        "GenericOidcAccount",
        "GoogleCloudAccount",
        "SshKeyPair",
        "Token",
        "UsernamePassword",
    ];

    pub fn account_type(&self) -> &'static str {
        match self {
            Account::AmazonWebServices(_) => "AmazonWebServicesAccount",
            Account::AmazonWebServicesOidc(_) => "AmazonWebServicesOidcAccount",
            Account::AzureServicePrincipal(_) => "AzureServicePrincipal",
            Account::AzureOidc(_) => "AzureOIDC",
            Account::AzureSubscription(_) => "AzureSubscription",
            Account::GoogleCloud(_) => "GoogleCloudAccount",
            Account::GenericOidc(_) => "GenericOidcAccount",
            Account::SshKeyPair(_) => "SshKeyPair",
            Account::Token(_) => "Token",
            Account::UsernamePassword(_) => "UsernamePassword",
            Account::Unsupported => "an unsupported account type",
        }
    }

    pub fn common(&self) -> Option<&AccountCommon> {
        match self {
            Account::AmazonWebServices(account) => Some(&account.common),
            Account::AmazonWebServicesOidc(account) => Some(&account.common),
            Account::AzureServicePrincipal(account) => Some(&account.common),
            Account::AzureOidc(account) => Some(&account.common),
            Account::AzureSubscription(account) => Some(&account.common),
            Account::GoogleCloud(account) => Some(&account.common),
            Account::GenericOidc(account) => Some(&account.common),
            Account::SshKeyPair(account) => Some(&account.common),
            Account::Token(account) => Some(&account.common),
            Account::UsernamePassword(account) => Some(&account.common),
            Account::Unsupported => None,
        }
    }
}
