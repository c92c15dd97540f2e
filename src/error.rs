//! Defines the crate level error type.

use std::fmt::Display;

use crate::{remote::ApiErrorDetail, sync::SyncProgress};

/// The errors that may occur while synchronizing with the remote page database.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The HTTP request could not be completed because the connection failed
    /// or the request timed out.
    ///
    /// This is the only error that is considered transient and is retried by
    /// [crate::backoff::execute].
    #[error("the request to the remote service failed: {0}")]
    Transport(String),

    /// The remote service responded with a non-success status code.
    ///
    /// The status code, message and raw body are kept for diagnostics.
    #[error("{0}")]
    Api(ApiErrorDetail),

    /// A formula property that the service should have computed for a page
    /// was missing from the response.
    ///
    /// This usually means the configured container ID points at a database
    /// with the wrong schema. Retrying will not help.
    #[error("formula property \"{0}\" not found, check the configured database")]
    FormulaNotFound(String),

    /// The transaction page was created but it could not be linked to its
    /// summary pages.
    ///
    /// The page itself is valid and stays in the remote database, only the
    /// relation properties are missing. `reached` is the last step that
    /// completed before `source` occurred.
    #[error("transaction page {page_id} was created but could not be linked: {source}")]
    PartialLinkage {
        /// The ID of the transaction page that was created.
        page_id: String,
        /// How far the write got before failing.
        reached: SyncProgress,
        /// The error that stopped the write.
        source: Box<Error>,
    },

    /// A container (database) ID required for the operation is not set.
    #[error("the {0} database ID is not configured")]
    MissingContainerId(&'static str),

    /// A success response had a body that could not be read as the expected JSON.
    #[error("could not read the response from the remote service: {0}")]
    InvalidResponse(String),

    /// The amount of a transaction was negative.
    ///
    /// Amounts are always stored as positive numbers, the direction of the
    /// transaction says whether money was spent or earned.
    #[error("{0} is a negative amount, use the transaction direction instead")]
    NegativeAmount(f64),

    /// The transaction is income, but the remote transaction database only
    /// records expenses.
    ///
    /// Writing it anyway would store it as an expense.
    #[error("income cannot be recorded, the transaction database only holds expenses")]
    UnsupportedIncome,

    /// The remote service created a page but did not return its ID.
    #[error("the remote service did not return a page ID")]
    MissingPageId,

    /// A page or database ID cannot be used in a request path.
    #[error("\"{0}\" is not a valid page or database ID")]
    InvalidId(String),

    /// The configured timezone is not a valid, canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// The configuration could not be turned into a working client.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Whether the error belongs to the transient (network/timeout) class and
    /// the operation that caused it may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    pub(crate) fn partial_linkage(reached: SyncProgress, source: Error) -> Self {
        Error::PartialLinkage {
            page_id: reached.page_id().to_owned(),
            reached,
            source: Box::new(source),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_builder() {
            return Error::InvalidConfig(with_url("invalid request", value.url(), &value));
        }

        if value.is_decode() {
            return Error::InvalidResponse(with_url("decode error", value.url(), &value));
        }

        let kind = if value.is_timeout() {
            "timed out"
        } else if value.is_connect() {
            "could not connect"
        } else if value.is_request() || value.is_body() {
            "request error"
        } else {
            return Error::InvalidResponse(with_url("unexpected response", value.url(), &value));
        };

        Error::Transport(with_url(kind, value.url(), &value))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::InvalidResponse(value.to_string())
    }
}

fn with_url(kind: &str, url: Option<&reqwest::Url>, error: impl Display) -> String {
    match url {
        Some(url) => format!("{kind} ({url}): {error}"),
        None => format!("{kind}: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, remote::ApiErrorDetail, sync::SyncProgress};

    #[test]
    fn only_transport_errors_are_transient() {
        assert!(Error::Transport("timed out".to_owned()).is_transient());

        let not_transient = [
            Error::Api(ApiErrorDetail {
                status: 500,
                message: "Internal Server Error".to_owned(),
                body: String::new(),
            }),
            Error::FormulaNotFound("Month".to_owned()),
            Error::MissingContainerId("transaction"),
            Error::InvalidResponse("expected value at line 1 column 1".to_owned()),
            Error::NegativeAmount(-1.0),
            Error::MissingPageId,
            Error::UnsupportedIncome,
            Error::InvalidId("..".to_owned()),
            Error::InvalidTimezone("Mars/Olympus_Mons".to_owned()),
            Error::InvalidConfig("bad URL".to_owned()),
        ];

        for error in not_transient {
            assert!(!error.is_transient(), "{error:?} should not be transient");
        }
    }

    #[test]
    fn invalid_request_is_config_error_not_transient() {
        let error = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();

        let error = Error::from(error);

        assert!(matches!(error, Error::InvalidConfig(_)), "got {error:?}");
        assert!(!error.is_transient());
    }

    #[test]
    fn partial_linkage_keeps_page_id_and_cause() {
        let error = Error::partial_linkage(
            SyncProgress::Created {
                page_id: "page-1".to_owned(),
            },
            Error::FormulaNotFound("Week".to_owned()),
        );

        match error {
            Error::PartialLinkage {
                page_id, source, ..
            } => {
                assert_eq!(page_id, "page-1");
                assert_eq!(*source, Error::FormulaNotFound("Week".to_owned()));
            }
            other => panic!("want partial linkage error, got {other:?}"),
        }
    }
}
