use serde::{Deserialize, Serialize};

use super::nullable;
use crate::client::Collection;

/// How the server talks to a worker, keyed by `CommunicationStyle`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "CommunicationStyle")]
pub enum WorkerEndpoint {
    #[serde(rename = "TentaclePassive", rename_all = "PascalCase")]
    ListeningTentacle {
        uri: String,
        thumbprint: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        proxy_id: Option<String>,
    },
    #[serde(rename = "Ssh", rename_all = "PascalCase")]
    Ssh {
        account_id: String,
        host: String,
        port: i64,
        fingerprint: String,
        #[serde(default, rename = "DotNetCorePlatform")]
        dotnet_core_platform: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        proxy_id: Option<String>,
    },
    /// Kubernetes agents, polling tentacles and other workers this provider does not manage.
    #[serde(other)]
    Unsupported,
}

impl WorkerEndpoint {
    pub fn communication_style(&self) -> &'static str {
        match self {
            WorkerEndpoint::ListeningTentacle { .. } => "TentaclePassive",
            WorkerEndpoint::Ssh { .. } => "Ssh",
            WorkerEndpoint::Unsupported => "an unsupported communication style",
        }
    }

    pub fn proxy_id(&self) -> Option<&str> {
        match self {
            WorkerEndpoint::ListeningTentacle { proxy_id, .. } | WorkerEndpoint::Ssh { proxy_id, .. } => {
                proxy_id.as_deref()
            }
            WorkerEndpoint::Unsupported => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Worker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub machine_policy_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub worker_pool_ids: Vec<String>,
    #[serde(default, skip_serializing)]
    pub health_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    pub endpoint: WorkerEndpoint,
}

impl Collection for Worker {
    const PATH: &'static str = "workers";
}

impl Worker {
    pub const COMMUNICATION_STYLES: [&'static str; 2] = ["Ssh", "TentaclePassive"];

    pub const HEALTH_STATUSES: [&'static str; 5] = ["HasWarnings", "Healthy", "Unavailable", "Unhealthy", "Unknown"];

    pub const DOTNET_PLATFORMS: [&'static str; 4] = ["linux-arm", "linux-arm64", "linux-x64", "osx-x64"];
}
