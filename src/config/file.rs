use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;
use thiserror::Error;

const DEFAULT_CONFIG: &str = include_str!("../../default.toml");

#[derive(Error, Debug)]
pub enum Error {
    #[error("read {path}: {err}")]
    ReadFile {
        err: std::io::Error,
        path: String,
    },

    #[error("parse: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// An octopusdeploy.toml file.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct File {
    pub description: Option<String>,
    #[serde(default = "Default::default")]
    pub client: Client,
    #[serde(default = "Default::default")]
    pub octopus: Octopus,
}

impl Default for File {
    fn default() -> Self {
        // The default config is compiled into the program, so
        // make sure to test default() to catch panics compile-time.
        toml::from_str(DEFAULT_CONFIG).unwrap()
    }
}

impl File {
    /// Read a user configuration file and layer it on top of the built-in defaults.
    /// Tables are merged key by key; any other value in the user file replaces the default.
    pub fn default_with_user_config_file(path: &str) -> Result<Self, Error> {
        let user_config = std::fs::read_to_string(path).map_err(|err| Error::ReadFile {
            err,
            path: path.to_string(),
        })?;
        Self::layered(DEFAULT_CONFIG, &user_config)
    }

    fn layered(defaults: &str, user_config: &str) -> Result<Self, Error> {
        let mut base: toml::Table = toml::from_str(defaults)?;
        let overlay: toml::Table = toml::from_str(user_config)?;
        merge_tables(&mut base, overlay);
        Ok(toml::Value::Table(base).try_into()?)
    }

    pub fn to_toml(&self) -> Result<String, Error> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(overlay) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, overlay);
                continue;
            }
            base.insert(key, toml::Value::Table(overlay));
        } else {
            base.insert(key, value);
        }
    }
}

/// HTTP client settings used for every call against the Octopus server.
#[serde_inline_default]
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Client {
    #[serde_inline_default("terraform-provider-octopusdeploy".to_string())]
    pub user_agent: String,
    #[serde_inline_default(60)]
    pub timeout_seconds: u64,
    #[serde_inline_default(false)]
    pub accept_invalid_certs: bool,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            user_agent: "terraform-provider-octopusdeploy".to_string(),
            timeout_seconds: 60,
            accept_invalid_certs: false,
        }
    }
}

/// Lowest-precedence fallbacks for the provider block.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Octopus {
    pub address: Option<String>,
    pub space_id: Option<String>,
}
