//! Minimal Octopus Deploy REST client.
//!
//! Every resource lives under `/api/{space}/{collection}/{id}`. Collections that are not
//! space-scoped, and calls made without a space, drop the space segment.
use std::sync::Arc;

use log::debug;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::runtime::{Config, Credential};

pub mod locks;
pub mod query;

pub use locks::TagSetLocks;
pub use query::{Page, Query};

const API_KEY_HEADER: &str = "x-octopus-apikey";

#[derive(Error, Debug)]
pub enum Error {
    #[error("reqwest: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("{method} {url}: not found")]
    NotFound { method: Method, url: String },

    #[error("Octopus API returned {status}: {message}{}", .details.iter().map(|detail| format!("\n  - {detail}")).collect::<String>())]
    Api {
        status: u16,
        message: String,
        details: Vec<String>,
    },

    #[error("code: {0}, body: {1}")]
    Deserialize(u16, String),

    #[error("cannot build request path from {0}")]
    Url(String),

    #[error("invalid credential header: {0}")]
    Header(#[from] header::InvalidHeaderValue),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// A resource type backed by an Octopus API collection.
pub trait Collection: Serialize + DeserializeOwned + Send + Sync {
    /// Path segment under `/api`, e.g. `environments`.
    const PATH: &'static str;

    /// Whether the collection lives inside a space.
    const SPACE_SCOPED: bool = true;
}

/// Error document returned by the Octopus server on 4xx/5xx responses.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    #[serde(default)]
    error_message: String,
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    base: Url,
    space_id: Option<String>,
    tag_set_locks: Arc<TagSetLocks>,
}

impl Client {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        match &config.credential {
            Credential::ApiKey(api_key) => {
                let mut value = HeaderValue::from_str(api_key)?;
                value.set_sensitive(true);
                headers.insert(API_KEY_HEADER, value);
            }
            Credential::AccessToken(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
                value.set_sensitive(true);
                headers.insert(header::AUTHORIZATION, value);
            }
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            base: config.address.clone(),
            space_id: config.space_id.clone(),
            tag_set_locks: Default::default(),
        })
    }

    /// The space a call should target: the explicit one, or the provider default.
    pub fn space<'a>(&'a self, space_id: Option<&'a str>) -> Option<&'a str> {
        space_id
            .filter(|space_id| !space_id.is_empty())
            .or(self.space_id.as_deref())
    }

    pub fn tag_set_locks(&self) -> &TagSetLocks {
        &self.tag_set_locks
    }

    fn url<T: Collection>(&self, space_id: Option<&str>, rest: &[&str]) -> Result<Url, Error> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::Url(self.base.to_string()))?;
            segments.pop_if_empty().push("api");
            if T::SPACE_SCOPED {
                if let Some(space_id) = self.space(space_id) {
                    segments.push(space_id);
                }
            }
            segments.push(T::PATH);
            segments.extend(rest);
        }
        Ok(url)
    }

    pub async fn get<T: Collection>(&self, space_id: Option<&str>, id: &str) -> Result<T, Error> {
        let url = self.url::<T>(space_id, &[id])?;
        self.call(Method::GET, url, None::<&()>, &[]).await
    }

    /// Like [Client::get], but a 404 is reported as `Ok(None)`.
    pub async fn find<T: Collection>(&self, space_id: Option<&str>, id: &str) -> Result<Option<T>, Error> {
        match self.get(space_id, id).await {
            Ok(resource) => Ok(Some(resource)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn add<T: Collection>(&self, space_id: Option<&str>, resource: &T) -> Result<T, Error> {
        let url = self.url::<T>(space_id, &[])?;
        self.call(Method::POST, url, Some(resource), &[]).await
    }

    pub async fn update<T: Collection>(&self, space_id: Option<&str>, id: &str, resource: &T) -> Result<T, Error> {
        let url = self.url::<T>(space_id, &[id])?;
        self.call(Method::PUT, url, Some(resource), &[]).await
    }

    /// Delete a resource. A resource that is already gone counts as deleted.
    pub async fn delete<T: Collection>(&self, space_id: Option<&str>, id: &str) -> Result<(), Error> {
        let url = self.url::<T>(space_id, &[id])?;
        match self.execute(Method::DELETE, url, None::<&()>, &[]).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_not_found() => {
                debug!("{} {id} was already deleted", T::PATH);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    pub async fn query<T: Collection>(&self, space_id: Option<&str>, query: &Query) -> Result<Page<T>, Error> {
        let url = self.url::<T>(space_id, &[])?;
        self.call(Method::GET, url, None::<&()>, &query.pairs()).await
    }

    /// List the `T` documents held under one `P`, e.g. `teams/{id}/scopeduserroles`.
    pub async fn children<P: Collection, T: Collection>(
        &self,
        space_id: Option<&str>,
        parent_id: &str,
    ) -> Result<Page<T>, Error> {
        let url = self.url::<P>(space_id, &[parent_id, T::PATH])?;
        self.call(Method::GET, url, None::<&()>, &[]).await
    }

    async fn call<B, R>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        params: &[(&str, String)],
    ) -> Result<R, Error>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let (status, bytes) = self.execute(method, url, body, params).await?;
        match serde_json::from_slice(&bytes) {
            Ok(resource) => Ok(resource),
            Err(_) => {
                let body = String::from_utf8_lossy(&bytes);
                Err(Error::Deserialize(status.as_u16(), body.to_string()))
            }
        }
    }

    async fn execute<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        params: &[(&str, String)],
    ) -> Result<(StatusCode, Vec<u8>), Error>
    where
        B: Serialize + Sync + ?Sized,
    {
        debug!("{method} {url}");
        let mut request = self.http.request(method.clone(), url.clone());
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?.to_vec();

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                method,
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            let body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            let message = if body.error_message.is_empty() {
                String::from_utf8_lossy(&bytes).to_string()
            } else {
                body.error_message
            };
            return Err(Error::Api {
                status: status.as_u16(),
                message,
                details: body.errors,
            });
        }
        Ok((status, bytes))
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::config::file;
    use crate::config::runtime::Settings;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    #[serde(rename_all = "PascalCase")]
    struct Widget {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
    }

    impl Collection for Widget {
        const PATH: &'static str = "widgets";
    }

    /// Client pointed at a mock server, authenticated with `API-TEST`.
    pub fn client_for(server: &MockServer, space_id: Option<&str>) -> Client {
        let cfg = Config::resolve(
            &file::File::default(),
            Settings {
                address: Some(server.uri()),
                api_key: Some("API-TEST".into()),
                space_id: space_id.map(str::to_string),
                ..Default::default()
            },
            |_| None,
        )
        .unwrap();
        Client::new(&cfg).unwrap()
    }

    #[tokio::test]
    async fn get_sends_api_key_and_space() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/widgets/Widgets-1"))
            .and(header("X-Octopus-ApiKey", "API-TEST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Id": "Widgets-1",
                "Name": "first",
                "Links": {}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let widget: Widget = client.get(None, "Widgets-1").await.unwrap();
        assert_eq!(widget.name, "first");
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    #[serde(rename_all = "PascalCase")]
    struct Part {
        id: String,
    }

    impl Collection for Part {
        const PATH: &'static str = "parts";
        const SPACE_SCOPED: bool = false;
    }

    #[tokio::test]
    async fn children_are_listed_under_the_parent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/widgets/Widgets-1/parts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": [{ "Id": "Parts-1" }, { "Id": "Parts-2" }],
                "TotalResults": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let page = client.children::<Widget, Part>(None, "Widgets-1").await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].id, "Parts-2");
    }

    #[tokio::test]
    async fn find_reports_missing_resources_as_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/widgets/Widgets-9"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let widget = client.find::<Widget>(None, "Widgets-9").await.unwrap();
        assert_eq!(widget, None);
    }

    #[tokio::test]
    async fn delete_of_missing_resource_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/Spaces-1/widgets/Widgets-9"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        client.delete::<Widget>(Some("Spaces-1"), "Widgets-9").await.unwrap();
    }

    #[tokio::test]
    async fn server_errors_carry_message_and_details() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/widgets"))
            .and(body_partial_json(serde_json::json!({ "Name": "dup" })))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ErrorMessage": "There was a problem with your request.",
                "Errors": ["The name 'dup' is already in use."]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client
            .add(None, &Widget { id: None, name: "dup".into() })
            .await
            .unwrap_err();
        match &err {
            Error::Api { status, details, .. } => {
                assert_eq!(*status, 400);
                assert_eq!(details.len(), 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().contains("already in use"));
    }

    #[tokio::test]
    async fn query_passes_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-2/widgets"))
            .and(query_param("partialName", "fir"))
            .and(query_param("take", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": [{ "Id": "Widgets-1", "Name": "first" }],
                "TotalResults": 1,
                "ItemsPerPage": 5
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-2"));
        let query = Query {
            partial_name: Some("fir".into()),
            take: Some(5),
            ..Default::default()
        };
        let page = client.query::<Widget>(None, &query).await.unwrap();
        assert_eq!(page.total_results, 1);
        assert_eq!(page.items[0].id.as_deref(), Some("Widgets-1"));
    }

    #[tokio::test]
    async fn garbage_response_is_a_deserialize_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/widgets/Widgets-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client.get::<Widget>(None, "Widgets-1").await.unwrap_err();
        assert!(matches!(err, Error::Deserialize(200, _)));
    }
}
