//! Logging for requests to and responses from the remote service.

use reqwest::{
    Method, StatusCode, Url,
    header::{AUTHORIZATION, HeaderMap},
};

/// Bodies longer than this many bytes are truncated in `debug` logs.
///
/// The full body is logged at the `trace` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log an outgoing request.
///
/// The `Authorization` header is redacted.
pub fn log_request(method: &Method, url: &Url, headers: &HeaderMap, body: &str) {
    let headers = redact_headers(headers);

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::debug!(
            "Sending request: {method} {url} {headers:?}\nbody: {}...",
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::trace!("Full request body: {body:?}");
    } else {
        tracing::debug!("Sending request: {method} {url} {headers:?}\nbody: {body:?}");
    }
}

/// Log the response to a request.
pub fn log_response(status: StatusCode, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::debug!(
            "Received response: {status}\nbody: {}...",
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::trace!("Full response body: {body:?}");
    } else {
        tracing::debug!("Received response: {status}\nbody: {body:?}");
    }
}

fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if name == AUTHORIZATION {
                redact_token(value.to_str().unwrap_or_default())
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };

            (name.as_str().to_owned(), value)
        })
        .collect()
}

/// Replace the credentials in an `Authorization` header value, keeping the scheme.
fn redact_token(value: &str) -> String {
    match value.split_once(' ') {
        Some((scheme, _)) => format!("{scheme} ********"),
        None => "********".to_owned(),
    }
}

/// The longest prefix of `text` that is at most `limit` bytes and ends on a
/// character boundary.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let end = text
        .char_indices()
        .map(|(index, _)| index)
        .take_while(|&index| index <= limit)
        .last()
        .unwrap_or(0);

    &text[..end]
}
