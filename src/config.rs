//! Configuration for connecting to the remote page database.
//!
//! Each setting is resolved from, in order: an explicit value (e.g. a command
//! line flag or environment variable), the value baked in at build time from
//! the environment variable of the same name, and finally an empty string.

use std::{fmt::Debug, time::Duration};

use crate::{Error, backoff::RetryPolicy};

/// The base URL of the remote service.
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/";

/// The API version sent with every request.
pub const API_VERSION: &str = "2022-06-28";

/// The connect and request timeout for every remote call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const BUILD_API_KEY: Option<&str> = option_env!("NOTION_API_KEY");
const BUILD_DATABASE_ID: Option<&str> = option_env!("NOTION_DATABASE_ID");
const BUILD_MONTH_DATABASE_ID: Option<&str> = option_env!("NOTION_MONTH_SUMMARY_DATABASE_ID");
const BUILD_WEEK_DATABASE_ID: Option<&str> = option_env!("NOTION_WEEK_SUMMARY_DATABASE_ID");

/// Values that take precedence over the build-time defaults.
#[derive(Default, Clone)]
pub struct ConfigOverrides {
    /// The API token.
    pub api_key: Option<String>,
    /// The transaction database ID.
    pub database_id: Option<String>,
    /// The month summary database ID.
    pub month_database_id: Option<String>,
    /// The week summary database ID.
    pub week_database_id: Option<String>,
    /// The base URL of the remote service.
    pub base_url: Option<String>,
    /// A canonical timezone name, e.g. "Asia/Shanghai".
    pub local_timezone: Option<String>,
}

/// Read-only settings shared by every remote operation.
///
/// The config is passed explicitly to the client and the synchronizer, there
/// is no global settings state.
#[derive(Clone, PartialEq)]
pub struct SyncConfig {
    /// The bearer token for the remote service.
    pub api_token: String,
    /// The database holding transaction pages.
    pub transaction_container_id: String,
    /// The database holding one page per month.
    pub month_container_id: String,
    /// The database holding one page per week.
    pub week_container_id: String,
    /// The base URL of the remote service, with a trailing slash.
    pub base_url: String,
    /// The value of the API version header.
    pub api_version: String,
    /// The canonical timezone used to work out "today", e.g. "Asia/Shanghai".
    ///
    /// `None` uses the system's local offset, or UTC if that is unavailable.
    pub local_timezone: Option<String>,
    /// The retry policy wrapped around every remote call.
    pub retry_policy: RetryPolicy,
}

impl SyncConfig {
    /// Create a config with the default base URL, API version and retry policy.
    pub fn new(
        api_token: &str,
        transaction_container_id: &str,
        month_container_id: &str,
        week_container_id: &str,
    ) -> Self {
        Self {
            api_token: api_token.to_owned(),
            transaction_container_id: transaction_container_id.to_owned(),
            month_container_id: month_container_id.to_owned(),
            week_container_id: week_container_id.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_version: API_VERSION.to_owned(),
            local_timezone: None,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Build the config from `overrides`, falling back to the build-time defaults.
    pub fn resolve(overrides: ConfigOverrides) -> Self {
        let mut config = Self::new(
            &resolve_setting(overrides.api_key, BUILD_API_KEY),
            &resolve_setting(overrides.database_id, BUILD_DATABASE_ID),
            &resolve_setting(overrides.month_database_id, BUILD_MONTH_DATABASE_ID),
            &resolve_setting(overrides.week_database_id, BUILD_WEEK_DATABASE_ID),
        );

        if let Some(base_url) = overrides.base_url.filter(|url| !url.trim().is_empty()) {
            config.base_url = base_url;
        }
        config.local_timezone = overrides
            .local_timezone
            .filter(|timezone| !timezone.trim().is_empty());

        config
    }

    /// Set the base URL, e.g. to point at a test server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        base_url.clone_into(&mut self.base_url);
        self
    }

    /// Set the retry policy.
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Check that the transaction database ID is set.
    ///
    /// # Errors
    /// Returns [Error::MissingContainerId] if the ID is empty.
    pub fn require_transaction_container(&self) -> Result<&str, Error> {
        require(&self.transaction_container_id, "transaction")
    }

    /// Check that all three database IDs are set.
    ///
    /// # Errors
    /// Returns [Error::MissingContainerId] naming the first empty ID.
    pub fn require_all_containers(&self) -> Result<(), Error> {
        self.require_transaction_container()?;
        require(&self.month_container_id, "month summary")?;
        require(&self.week_container_id, "week summary")?;

        Ok(())
    }
}

impl Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("api_token", &"********")
            .field("transaction_container_id", &self.transaction_container_id)
            .field("month_container_id", &self.month_container_id)
            .field("week_container_id", &self.week_container_id)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("local_timezone", &self.local_timezone)
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}

fn resolve_setting(value: Option<String>, build_default: Option<&str>) -> String {
    value
        .filter(|value| !value.trim().is_empty())
        .or_else(|| build_default.map(str::to_owned))
        .unwrap_or_default()
}

fn require<'a>(container_id: &'a str, kind: &'static str) -> Result<&'a str, Error> {
    if container_id.trim().is_empty() {
        tracing::error!("The {kind} database ID is empty, check the configuration.");
        Err(Error::MissingContainerId(kind))
    } else {
        Ok(container_id)
    }
}
