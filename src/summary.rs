//! Finds or creates the summary page for a month or week.
//!
//! Each transaction is linked to one page in the month summary database and
//! one in the week summary database. The summary pages are created on demand
//! the first time a transaction falls in their period.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    Error,
    backoff::RetryPolicy,
    codec::property,
    models::{Filter, PropertyValue, QueryRequest, RemoteId, RemotePage},
    remote::PageStore,
};

/// The kinds of period that transactions are summarized over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodKind {
    /// A calendar month.
    Month,
    /// A Monday to Sunday week.
    Week,
}

impl PeriodKind {
    /// The title property of pages in the summary database for this period.
    ///
    /// Also the name of the formula on transaction pages that holds the period label.
    pub fn title_property(self) -> &'static str {
        match self {
            PeriodKind::Month => property::MONTH,
            PeriodKind::Week => property::WEEK,
        }
    }

    /// The relation property on transaction pages that links to the summary page.
    pub fn relation_property(self) -> &'static str {
        match self {
            PeriodKind::Month => property::MONTH_SUMMARY,
            PeriodKind::Week => property::WEEK_SUMMARY,
        }
    }

    fn database_name(self) -> &'static str {
        match self {
            PeriodKind::Month => "month summary",
            PeriodKind::Week => "week summary",
        }
    }
}

/// The summary page for one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryAnchor {
    /// Whether this is a month or a week.
    pub period_kind: PeriodKind,
    /// The period label, e.g. `2024-03`.
    pub period_label: String,
    /// The ID of the summary page.
    pub remote_id: RemoteId,
}

type LockTable = Mutex<HashMap<(String, String), Arc<tokio::sync::Mutex<()>>>>;

/// Resolves period labels to summary pages, creating missing pages.
///
/// Resolutions of the same label in the same database are serialized, so
/// concurrent callers in one process never create duplicate summary pages.
/// Nothing stops another process from racing this one.
pub struct PeriodSummaryResolver<S> {
    store: Arc<S>,
    retry_policy: RetryPolicy,
    locks: LockTable,
}

impl<S: PageStore> PeriodSummaryResolver<S> {
    /// Create a resolver that wraps every call to `store` in `retry_policy`.
    pub fn new(store: Arc<S>, retry_policy: RetryPolicy) -> Self {
        Self {
            store,
            retry_policy,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Find or create the page for `period_label` in the summary database of `period_kind`.
    ///
    /// # Errors
    /// See [PeriodSummaryResolver::resolve].
    pub async fn resolve_anchor(
        &self,
        period_kind: PeriodKind,
        container_id: &str,
        period_label: &str,
    ) -> Result<SummaryAnchor, Error> {
        if container_id.trim().is_empty() {
            return Err(Error::MissingContainerId(period_kind.database_name()));
        }

        let remote_id = self
            .resolve(container_id, period_kind.title_property(), period_label)
            .await?;

        Ok(SummaryAnchor {
            period_kind,
            period_label: period_label.to_owned(),
            remote_id,
        })
    }

    /// Find the page in `container_id` whose title property `period_property`
    /// contains `period_label`, or create one with that title.
    ///
    /// # Errors
    /// This function will return an error if:
    /// - `container_id` is empty,
    /// - a request fails after retries,
    /// - the remote service responds with a non-success status,
    /// - or a created page comes back without an ID.
    pub async fn resolve(
        &self,
        container_id: &str,
        period_property: &str,
        period_label: &str,
    ) -> Result<RemoteId, Error> {
        if container_id.trim().is_empty() {
            return Err(Error::MissingContainerId("summary"));
        }

        let lock = self.lock_for(container_id, period_label);
        let result = {
            let _guard = lock.lock().await;
            self.find_or_create(container_id, period_property, period_label)
                .await
        };
        drop(lock);
        self.release_unused_locks();

        result
    }

    async fn find_or_create(
        &self,
        container_id: &str,
        period_property: &str,
        period_label: &str,
    ) -> Result<RemoteId, Error> {
        let query = QueryRequest::default()
            .filter(Filter::title_contains(period_property, period_label))
            .page_size(1);

        let found = self
            .retry_policy
            .run(|| self.store.query_database(container_id, &query))
            .await?
            .into_result()?;

        if let Some(id) = found.results.into_iter().find_map(|page| page.id) {
            tracing::debug!("Found summary page {id} for \"{period_label}\"");
            return Ok(id);
        }

        let page = RemotePage::new(container_id)
            .with_property(period_property, PropertyValue::title(period_label));

        let created = self
            .retry_policy
            .run(|| self.store.create_page(&page))
            .await?
            .into_result()?;

        let id = created.id.ok_or(Error::MissingPageId)?;
        tracing::info!("Created summary page {id} for \"{period_label}\"");

        Ok(id)
    }

    fn lock_for(&self, container_id: &str, period_label: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((container_id.to_owned(), period_label.to_owned()))
            .or_default()
            .clone()
    }

    fn release_unused_locks(&self) {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}
