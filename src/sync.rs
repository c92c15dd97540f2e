//! Writes, reads and deletes transactions in the remote page database.
//!
//! Adding a transaction takes several requests: create the transaction page,
//! find or create its month and week summary pages, then link the transaction
//! to them. The steps are not atomic, [SyncProgress] records how far a write
//! got so that callers can tell a failed write from a partially linked one.

use std::sync::Arc;

use time::Date;

use crate::{
    Error,
    codec::{self, property},
    config::SyncConfig,
    models::{
        Direction, MAX_PAGE_SIZE, PropertyValue, QueryRequest, RemoteId, RemotePage,
        SortDirection, Transaction,
    },
    remote::PageStore,
    stats::{self, Statistics},
    summary::{PeriodKind, PeriodSummaryResolver, SummaryAnchor},
};

/// How far adding a transaction got.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncProgress {
    /// The transaction page exists but is not linked to any summary page.
    Created {
        /// The ID of the transaction page.
        page_id: RemoteId,
    },
    /// Both summary pages exist but the transaction page does not link to them yet.
    AnchorsResolved {
        /// The ID of the transaction page.
        page_id: RemoteId,
        /// The month summary page.
        month: SummaryAnchor,
        /// The week summary page.
        week: SummaryAnchor,
    },
    /// The transaction page links to both summary pages.
    Linked {
        /// The ID of the transaction page.
        page_id: RemoteId,
        /// The month summary page.
        month: SummaryAnchor,
        /// The week summary page.
        week: SummaryAnchor,
    },
}

impl SyncProgress {
    /// The ID of the transaction page.
    pub fn page_id(&self) -> &str {
        match self {
            SyncProgress::Created { page_id }
            | SyncProgress::AnchorsResolved { page_id, .. }
            | SyncProgress::Linked { page_id, .. } => page_id,
        }
    }
}

/// Keeps transactions in sync with the remote transaction database.
pub struct TransactionSynchronizer<S> {
    store: Arc<S>,
    config: SyncConfig,
    resolver: PeriodSummaryResolver<S>,
}

impl<S: PageStore> TransactionSynchronizer<S> {
    /// Create a synchronizer that sends requests through `store`.
    pub fn new(store: Arc<S>, config: SyncConfig) -> Self {
        let resolver = PeriodSummaryResolver::new(store.clone(), config.retry_policy);

        Self {
            store,
            config,
            resolver,
        }
    }

    /// The configuration the synchronizer was created with.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Create the page for `transaction` and link it to its month and week summary pages.
    ///
    /// The month and week come from formulas that the remote service computes
    /// when the page is created, so they are read back from the created page.
    ///
    /// # Errors
    /// This function will return an error if:
    /// - the transaction is income, no request is made,
    /// - any of the three database IDs is empty, no request is made,
    /// - the transaction page could not be created, nothing was written,
    /// - or a later step failed. The error is [Error::PartialLinkage] and the
    ///   transaction page stays in the remote database without its links.
    pub async fn add_transaction(&self, transaction: &Transaction) -> Result<SyncProgress, Error> {
        if transaction.direction == Direction::Income {
            tracing::error!("Refusing to record income as an expense");
            return Err(Error::UnsupportedIncome);
        }
        self.config.require_all_containers()?;

        let page = codec::encode(transaction, &self.config.transaction_container_id);
        let created = self
            .config
            .retry_policy
            .run(|| self.store.create_page(&page))
            .await?
            .into_result()?;
        let page_id = created.id.clone().ok_or(Error::MissingPageId)?;
        tracing::info!("Created transaction page {page_id}");

        let mut progress = SyncProgress::Created { page_id };
        match self.link(&created, &mut progress).await {
            Ok(()) => Ok(progress),
            Err(error) => {
                tracing::error!(
                    "Transaction page {} was created but could not be linked to its summary pages: {error}",
                    progress.page_id()
                );
                Err(Error::partial_linkage(progress, error))
            }
        }
    }

    async fn link(&self, created: &RemotePage, progress: &mut SyncProgress) -> Result<(), Error> {
        let page_id = progress.page_id().to_owned();
        let month_label = period_label(created, PeriodKind::Month)?;
        let week_label = period_label(created, PeriodKind::Week)?;

        let month = self
            .resolver
            .resolve_anchor(PeriodKind::Month, &self.config.month_container_id, month_label)
            .await?;
        let week = self
            .resolver
            .resolve_anchor(PeriodKind::Week, &self.config.week_container_id, week_label)
            .await?;

        let update = RemotePage::default()
            .with_property(
                PeriodKind::Month.relation_property(),
                PropertyValue::relation([month.remote_id.as_str()]),
            )
            .with_property(
                PeriodKind::Week.relation_property(),
                PropertyValue::relation([week.remote_id.as_str()]),
            );

        *progress = SyncProgress::AnchorsResolved {
            page_id: page_id.clone(),
            month: month.clone(),
            week: week.clone(),
        };

        self.config
            .retry_policy
            .run(|| self.store.update_page(&page_id, &update))
            .await?
            .into_result()?;
        tracing::debug!(
            "Linked transaction page {page_id} to summary pages {} and {}",
            month.remote_id,
            week.remote_id
        );

        *progress = SyncProgress::Linked {
            page_id,
            month,
            week,
        };

        Ok(())
    }

    /// Get the most recent transactions, newest first.
    ///
    /// Only the first page of results is fetched, at most [MAX_PAGE_SIZE] transactions.
    ///
    /// # Errors
    /// This function will return an error if the transaction database ID is
    /// empty, the request fails after retries, or the remote service responds
    /// with a non-success status.
    pub async fn fetch_transactions(&self) -> Result<Vec<Transaction>, Error> {
        let container_id = self.config.require_transaction_container()?;
        let query = QueryRequest::default()
            .sort(property::REAL_DATE, SortDirection::Descending)
            .page_size(MAX_PAGE_SIZE);

        let response = self
            .config
            .retry_policy
            .run(|| self.store.query_database(container_id, &query))
            .await?
            .into_result()?;

        Ok(codec::decode_all(&response.results))
    }

    /// Get the most recent transactions, or an empty list if they could not be fetched.
    ///
    /// The error is logged. Use [TransactionSynchronizer::fetch_transactions]
    /// to tell an empty database from a failed request.
    pub async fn get_transactions(&self) -> Vec<Transaction> {
        match self.fetch_transactions().await {
            Ok(transactions) => transactions,
            Err(error) => {
                tracing::warn!("Could not fetch transactions, showing none: {error}");
                Vec::new()
            }
        }
    }

    /// Move the transaction page `remote_id` to the trash.
    ///
    /// # Errors
    /// Returns [Error::MissingPageId] if `remote_id` is empty, and
    /// [Error::Api] with the status, message and body if the remote service
    /// rejects the request.
    pub async fn delete_transaction(&self, remote_id: &str) -> Result<(), Error> {
        if remote_id.trim().is_empty() {
            return Err(Error::MissingPageId);
        }

        self.config
            .retry_policy
            .run(|| self.store.archive_page(remote_id))
            .await?
            .into_result()?;
        tracing::info!("Archived transaction page {remote_id}");

        Ok(())
    }

    /// Get the expense totals for the day, week and month of `today`.
    ///
    /// # Errors
    /// See [stats::load_statistics].
    pub async fn load_statistics(&self, today: Date) -> Result<Statistics, Error> {
        let container_id = self.config.require_transaction_container()?;

        stats::load_statistics(
            self.store.as_ref(),
            container_id,
            self.config.retry_policy,
            today,
        )
        .await
    }
}

fn period_label(page: &RemotePage, period_kind: PeriodKind) -> Result<&str, Error> {
    let name = period_kind.title_property();

    page.formula_string(name)
        .filter(|label| !label.is_empty())
        .ok_or_else(|| Error::FormulaNotFound(name.to_owned()))
}
