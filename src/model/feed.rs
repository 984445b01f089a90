use serde::{Deserialize, Serialize};

use super::{nullable, SensitiveValue};
use crate::client::Collection;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FeedCommon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub package_acquisition_location_options: Vec<String>,
}

/// Optional basic-auth credentials for feeds that support them.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FeedCredentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: SensitiveValue,
}

/// Download retry settings shared by the package repository feeds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FeedDownloads {
    #[serde(default = "default_download_attempts")]
    pub download_attempts: i64,
    #[serde(default = "default_download_retry_backoff_seconds")]
    pub download_retry_backoff_seconds: i64,
}

pub const DEFAULT_DOWNLOAD_ATTEMPTS: i64 = 5;
pub const DEFAULT_DOWNLOAD_RETRY_BACKOFF_SECONDS: i64 = 10;

fn default_download_attempts() -> i64 {
    DEFAULT_DOWNLOAD_ATTEMPTS
}

fn default_download_retry_backoff_seconds() -> i64 {
    DEFAULT_DOWNLOAD_RETRY_BACKOFF_SECONDS
}

impl Default for FeedDownloads {
    fn default() -> Self {
        Self {
            download_attempts: DEFAULT_DOWNLOAD_ATTEMPTS,
            download_retry_backoff_seconds: DEFAULT_DOWNLOAD_RETRY_BACKOFF_SECONDS,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DockerFeed {
    #[serde(flatten)]
    pub common: FeedCommon,
    #[serde(flatten)]
    pub credentials: FeedCredentials,
    pub feed_uri: String,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub registry_path: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct HelmFeed {
    #[serde(flatten)]
    pub common: FeedCommon,
    #[serde(flatten)]
    pub credentials: FeedCredentials,
    pub feed_uri: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MavenFeed {
    #[serde(flatten)]
    pub common: FeedCommon,
    #[serde(flatten)]
    pub credentials: FeedCredentials,
    #[serde(flatten)]
    pub downloads: FeedDownloads,
    pub feed_uri: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct NuGetFeed {
    #[serde(flatten)]
    pub common: FeedCommon,
    #[serde(flatten)]
    pub credentials: FeedCredentials,
    #[serde(flatten)]
    pub downloads: FeedDownloads,
    pub feed_uri: String,
    #[serde(default)]
    pub enhanced_mode: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GitHubRepositoryFeed {
    #[serde(flatten)]
    pub common: FeedCommon,
    #[serde(flatten)]
    pub credentials: FeedCredentials,
    #[serde(flatten)]
    pub downloads: FeedDownloads,
    pub feed_uri: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ArtifactoryGenericFeed {
    #[serde(flatten)]
    pub common: FeedCommon,
    #[serde(flatten)]
    pub credentials: FeedCredentials,
    pub feed_uri: String,
    pub repository: String,
    #[serde(default)]
    pub layout_regex: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AwsElasticContainerRegistry {
    #[serde(flatten)]
    pub common: FeedCommon,
    pub region: String,
    pub access_key: String,
    #[serde(default)]
    pub secret_key: SensitiveValue,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub registry_path: Option<String>,
}

/// Every feed type, keyed by `FeedType`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "FeedType")]
pub enum Feed {
    Docker(DockerFeed),
    Helm(HelmFeed),
    Maven(MavenFeed),
    NuGet(NuGetFeed),
    GitHub(GitHubRepositoryFeed),
    ArtifactoryGeneric(ArtifactoryGenericFeed),
    AwsElasticContainerRegistry(AwsElasticContainerRegistry),
    BuiltIn(FeedCommon),
    OctopusProject(FeedCommon),
    #[serde(other)]
    Unsupported,
}

impl Collection for Feed {
    const PATH: &'static str = "feeds";
}

impl Feed {
    pub const TYPES: [&'static str; 9] = [
        "ArtifactoryGeneric",
        "AwsElasticContainerRegistry",
        "BuiltIn",
        "Docker",
        "GitHub",
        "Helm",
        "Maven",
        "NuGet",
        "OctopusProject",
    ];

    pub fn feed_type(&self) -> &'static str {
        match self {
            Feed::Docker(_) => "Docker",
            Feed::Helm(_) => "Helm",
            Feed::Maven(_) => "Maven",
            Feed::NuGet(_) => "NuGet",
            Feed::GitHub(_) => "GitHub",
            Feed::ArtifactoryGeneric(_) => "ArtifactoryGeneric",
            Feed::AwsElasticContainerRegistry(_) => "AwsElasticContainerRegistry",
            Feed::BuiltIn(_) => "BuiltIn",
            Feed::OctopusProject(_) => "OctopusProject",
            Feed::Unsupported => "an unsupported feed type",
        }
    }

    pub fn common(&self) -> Option<&FeedCommon> {
        match self {
            Feed::Docker(feed) => Some(&feed.common),
            Feed::Helm(feed) => Some(&feed.common),
            Feed::Maven(feed) => Some(&feed.common),
            Feed::NuGet(feed) => Some(&feed.common),
            Feed::GitHub(feed) => Some(&feed.common),
            Feed::ArtifactoryGeneric(feed) => Some(&feed.common),
            Feed::AwsElasticContainerRegistry(feed) => Some(&feed.common),
            Feed::BuiltIn(common) | Feed::OctopusProject(common) => Some(common),
            Feed::Unsupported => None,
        }
    }

    /// The URI packages are fetched from, for feeds that have one.
    pub fn feed_uri(&self) -> Option<&str> {
        match self {
            Feed::Docker(feed) => Some(&feed.feed_uri),
            Feed::Helm(feed) => Some(&feed.feed_uri),
            Feed::Maven(feed) => Some(&feed.feed_uri),
            Feed::NuGet(feed) => Some(&feed.feed_uri),
            Feed::GitHub(feed) => Some(&feed.feed_uri),
            Feed::ArtifactoryGeneric(feed) => Some(&feed.feed_uri),
            Feed::AwsElasticContainerRegistry(_)
            | Feed::BuiltIn(_)
            | Feed::OctopusProject(_)
            | Feed::Unsupported => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maven_feed_defaults_download_settings() {
        let feed: Feed = serde_json::from_value(serde_json::json!({
            "Id": "Feeds-3",
            "FeedType": "Maven",
            "Name": "maven",
            "FeedUri": "https://repo.maven.apache.org/maven2/",
            "Username": null,
            "Password": { "HasValue": false }
        }))
        .unwrap();

        let Feed::Maven(maven) = feed else {
            panic!("expected a maven feed");
        };
        assert_eq!(maven.downloads, FeedDownloads::default());
        assert_eq!(maven.credentials.username, None);
    }

    #[test]
    fn nuget_feed_serializes_type_and_flattened_fields() {
        let feed = Feed::NuGet(NuGetFeed {
            common: FeedCommon {
                name: "nuget".into(),
                ..Default::default()
            },
            feed_uri: "https://api.nuget.org/v3/index.json".into(),
            enhanced_mode: true,
            ..Default::default()
        });
        let json = serde_json::to_value(&feed).unwrap();
        assert_eq!(json["FeedType"], "NuGet");
        assert_eq!(json["EnhancedMode"], true);
        assert_eq!(json["DownloadAttempts"], 5);
        assert_eq!(feed.feed_uri(), Some("https://api.nuget.org/v3/index.json"));
    }

    #[test]
    fn built_in_feed_is_listed() {
        let feed: Feed = serde_json::from_value(serde_json::json!({
            "Id": "Feeds-1",
            "FeedType": "BuiltIn",
            "Name": "Octopus Server (built-in)"
        }))
        .unwrap();
        assert_eq!(feed.feed_type(), "BuiltIn");
        assert_eq!(feed.common().map(|c| c.name.as_str()), Some("Octopus Server (built-in)"));
    }
}
