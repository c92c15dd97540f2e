//! Implements [PageStore] over the remote service's JSON HTTP API.

use async_trait::async_trait;
use reqwest::{
    Client, Method, Url,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    Error,
    config::{REQUEST_TIMEOUT, SyncConfig},
    logging::{log_request, log_response},
    models::{QueryRequest, QueryResponse, RemotePage},
    remote::{ApiErrorDetail, ApiResponse, PageStore},
};

const NOTION_VERSION: HeaderName = HeaderName::from_static("notion-version");

/// The body sent to move a page to the trash.
#[derive(Serialize)]
struct ArchiveRequest {
    archived: bool,
    properties: serde_json::Map<String, serde_json::Value>,
}

/// Talks to the remote page database over HTTPS.
///
/// Cloning is cheap, clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct HttpPageStore {
    client: Client,
    base_url: Url,
    headers: HeaderMap,
}

impl HttpPageStore {
    /// Create a client for the service and credentials in `config`.
    ///
    /// Connect and request timeouts are fixed at [REQUEST_TIMEOUT].
    ///
    /// # Errors
    /// Returns [Error::InvalidConfig] if the base URL or token cannot be used.
    pub fn new(config: &SyncConfig) -> Result<Self, Error> {
        let mut base_url = Url::parse(&config.base_url).map_err(|error| {
            Error::InvalidConfig(format!("invalid base URL \"{}\": {error}", config.base_url))
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", config.api_token))
            .map_err(|_| Error::InvalidConfig("the API token is not a valid header".to_owned()))?;
        authorization.set_sensitive(true);

        let version = HeaderValue::from_str(&config.api_version).map_err(|_| {
            Error::InvalidConfig(format!("invalid API version \"{}\"", config.api_version))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(NOTION_VERSION, version);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(REQUEST_TIMEOUT);
        // Proxies from the environment never apply to a server on this machine.
        if is_local(&base_url) {
            builder = builder.no_proxy();
        }

        let client = builder.build().map_err(|error| {
            Error::InvalidConfig(format!("could not build HTTP client: {error}"))
        })?;

        Ok(Self {
            client,
            base_url,
            headers,
        })
    }

    /// The URL of `segments` under the base URL, each segment percent-encoded.
    ///
    /// Empty, `.` and `..` segments would change the request target, so they are rejected.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        if let Some(segment) = segments
            .iter()
            .find(|segment| matches!(segment.trim(), "" | "." | ".."))
        {
            return Err(Error::InvalidId((*segment).to_owned()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::InvalidConfig(format!("base URL \"{}\" cannot have a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn send<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<ApiResponse<T>, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        let body = serde_json::to_string(body)?;
        log_request(&method, &url, &self.headers, &body);

        let response = self
            .client
            .request(method, url)
            .headers(self.headers.clone())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        log_response(status, &text);

        if status.is_success() {
            Ok(ApiResponse::success(
                status.as_u16(),
                serde_json::from_str(&text)?,
            ))
        } else {
            let detail =
                ApiErrorDetail::from_response(status.as_u16(), status.canonical_reason(), &text);
            tracing::warn!("Request to /{} failed: {detail}", segments.join("/"));
            Ok(ApiResponse::failure(detail))
        }
    }
}

fn is_local(url: &Url) -> bool {
    url.host_str()
        .map(|host| matches!(host.to_lowercase().as_str(), "localhost" | "127.0.0.1" | "[::1]"))
        .unwrap_or(false)
}

#[async_trait]
impl PageStore for HttpPageStore {
    async fn create_page(&self, page: &RemotePage) -> Result<ApiResponse<RemotePage>, Error> {
        self.send(Method::POST, &["v1", "pages"], page).await
    }

    async fn update_page(
        &self,
        page_id: &str,
        page: &RemotePage,
    ) -> Result<ApiResponse<RemotePage>, Error> {
        self.send(Method::PATCH, &["v1", "pages", page_id], page)
            .await
    }

    async fn archive_page(&self, page_id: &str) -> Result<ApiResponse<RemotePage>, Error> {
        let body = ArchiveRequest {
            archived: true,
            properties: serde_json::Map::new(),
        };

        self.send(Method::PATCH, &["v1", "pages", page_id], &body)
            .await
    }

    async fn query_database(
        &self,
        container_id: &str,
        query: &QueryRequest,
    ) -> Result<ApiResponse<QueryResponse>, Error> {
        self.send(
            Method::POST,
            &["v1", "databases", container_id, "query"],
            query,
        )
        .await
    }
}
