//! Typed operations against the remote page database.
//!
//! [PageStore] is the seam between the synchronization logic and the HTTP
//! API. Implementations do not retry, callers wrap each call in
//! [crate::backoff::execute].

use std::fmt::Display;

use async_trait::async_trait;

use crate::{
    Error,
    models::{QueryRequest, QueryResponse, RemotePage},
};

mod http;

pub use http::HttpPageStore;

/// Creates, updates, archives and queries pages in the remote page database.
///
/// A returned `Err` means the request never produced a response (or the
/// response could not be read). A response with a non-success status code is
/// returned as `Ok` with the error detail in [ApiResponse::error].
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Create `page` in the database named by its parent.
    async fn create_page(&self, page: &RemotePage) -> Result<ApiResponse<RemotePage>, Error>;

    /// Merge the properties of `page` into the existing page `page_id`.
    async fn update_page(
        &self,
        page_id: &str,
        page: &RemotePage,
    ) -> Result<ApiResponse<RemotePage>, Error>;

    /// Move the page `page_id` to the trash.
    async fn archive_page(&self, page_id: &str) -> Result<ApiResponse<RemotePage>, Error>;

    /// Query the pages of the database `container_id`.
    async fn query_database(
        &self,
        container_id: &str,
        query: &QueryRequest,
    ) -> Result<ApiResponse<QueryResponse>, Error>;
}

/// The outcome of a request that reached the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    /// The HTTP status code.
    pub status: u16,
    /// The decoded body of a success response.
    pub body: Option<T>,
    /// Details of a non-success response.
    pub error: Option<ApiErrorDetail>,
}

impl<T> ApiResponse<T> {
    /// A success response with a decoded `body`.
    pub fn success(status: u16, body: T) -> Self {
        Self {
            status,
            body: Some(body),
            error: None,
        }
    }

    /// A non-success response.
    pub fn failure(detail: ApiErrorDetail) -> Self {
        Self {
            status: detail.status,
            body: None,
            error: Some(detail),
        }
    }

    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Convert the response into the body or an error.
    ///
    /// # Errors
    /// Returns [Error::Api] for non-success responses and
    /// [Error::InvalidResponse] for a success response without a body.
    pub fn into_result(self) -> Result<T, Error> {
        match (self.body, self.error) {
            (_, Some(detail)) => Err(Error::Api(detail)),
            (Some(body), None) if (200..300).contains(&self.status) => Ok(body),
            (_, None) => Err(Error::InvalidResponse(format!(
                "status {} response has no body",
                self.status
            ))),
        }
    }
}

/// Why the remote service rejected a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorDetail {
    /// The HTTP status code.
    pub status: u16,
    /// The error message from the remote service, or the reason phrase of the status code.
    pub message: String,
    /// The raw response body.
    pub body: String,
}

impl ApiErrorDetail {
    /// Build the error detail for a response with `status` and the raw `body`.
    ///
    /// The remote service sends errors as `{"object": "error", "message": ...}`,
    /// when the body has no message the canonical reason phrase is used.
    pub fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| value.get("message")?.as_str().map(str::to_owned))
            .unwrap_or_else(|| reason.unwrap_or_default().to_owned());

        Self {
            status,
            message,
            body: body.to_owned(),
        }
    }
}

impl Display for ApiErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "the remote service responded with status {} ({}): {}",
            self.status, self.message, self.body
        )
    }
}
