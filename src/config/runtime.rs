use std::fmt::{Debug, Formatter};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::file;

const ENV_ADDRESS: &str = "OCTOPUS_URL";
const ENV_API_KEYS: [&str; 2] = ["OCTOPUS_APIKEY", "OCTOPUS_API_KEY"];
const ENV_ACCESS_TOKEN: &str = "OCTOPUS_ACCESS_TOKEN";

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("the Octopus server address must be set with `address` or OCTOPUS_URL")]
    MissingAddress,

    #[error("invalid Octopus server address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("either an API key or an access token must be provided")]
    MissingCredentials,
}

/// Values taken from the provider block. Empty strings count as unset.
#[derive(Debug, Default, Clone)]
pub struct Settings {
    pub address: Option<String>,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub space_id: Option<String>,
}

#[derive(Clone, PartialEq)]
pub enum Credential {
    ApiKey(String),
    AccessToken(String),
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Credential::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
        }
    }
}

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub address: Url,
    pub credential: Credential,
    pub space_id: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl Config {
    /// Merge the provider block, the process environment and the defaults file.
    pub fn from_env(file: &file::File, settings: Settings) -> Result<Self, Error> {
        Self::resolve(file, settings, |name| std::env::var(name).ok())
    }

    pub fn resolve<F>(file: &file::File, settings: Settings, env: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| env(name).filter(|value| !value.is_empty());

        let address = non_empty(settings.address)
            .or_else(|| lookup(ENV_ADDRESS))
            .or_else(|| non_empty(file.octopus.address.clone()))
            .ok_or(Error::MissingAddress)?;

        let api_key = non_empty(settings.api_key)
            .or_else(|| ENV_API_KEYS.into_iter().find_map(|name| lookup(name)));
        let access_token = non_empty(settings.access_token).or_else(|| lookup(ENV_ACCESS_TOKEN));

        // An API key wins when both are present.
        let credential = match (api_key, access_token) {
            (Some(api_key), _) => Credential::ApiKey(api_key),
            (None, Some(access_token)) => Credential::AccessToken(access_token),
            (None, None) => return Err(Error::MissingCredentials),
        };

        Ok(Self {
            address: parse_address(&address)?,
            credential,
            space_id: non_empty(settings.space_id).or_else(|| non_empty(file.octopus.space_id.clone())),
            user_agent: file.client.user_agent.clone(),
            timeout: Duration::from_secs(file.client.timeout_seconds),
            accept_invalid_certs: file.client.accept_invalid_certs,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

/// Parse the server address and make sure it can be used as a base for `api/...` paths.
fn parse_address(address: &str) -> Result<Url, Error> {
    let invalid = |reason: String| Error::InvalidAddress {
        address: address.to_string(),
        reason,
    };

    let mut url = Url::parse(address).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
