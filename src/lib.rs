//! [![github]](https://github.com/AnthonyDickson/budgeteur-rs)&ensp;
//!
//! [github]: https://img.shields.io/badge/github-8da0cb?style=for-the-badge&labelColor=555555&logo=github
//!
//! <br>
//!
//! Budgeteur Sync keeps a personal budget in a hosted page database.
//!
//! Transactions are stored as pages in a transaction database. Each page is
//! linked to a page in a month summary database and a page in a week summary
//! database, which are created on demand. The library also reads transactions
//! back, deletes them and totals expenses for the current day, week and month.
//!
//! Start with [TransactionSynchronizer] over an [HttpPageStore]:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use budgeteur_sync::{
//!     ConfigOverrides, HttpPageStore, SyncConfig, TransactionSynchronizer,
//!     models::{Category, Transaction},
//! };
//!
//! # async fn run() -> Result<(), budgeteur_sync::Error> {
//! let config = SyncConfig::resolve(ConfigOverrides::default());
//! let store = Arc::new(HttpPageStore::new(&config)?);
//! let synchronizer = TransactionSynchronizer::new(store, config);
//!
//! let lunch = Transaction::build(42.50, Category::Food).note("Lunch").finalise()?;
//! synchronizer.add_transaction(&lunch).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod backoff;
pub mod codec;
pub mod config;
mod error;
mod logging;
pub mod models;
pub mod period;
pub mod remote;
pub mod stats;
pub mod summary;
pub mod sync;
pub mod timezone;

#[cfg(test)]
mod test_utils;

pub use backoff::RetryPolicy;
pub use config::{ConfigOverrides, SyncConfig};
pub use error::Error;
pub use logging::LOG_BODY_LENGTH_LIMIT;
pub use remote::{ApiErrorDetail, ApiResponse, HttpPageStore, PageStore};
pub use stats::Statistics;
pub use summary::{PeriodKind, PeriodSummaryResolver, SummaryAnchor};
pub use sync::{SyncProgress, TransactionSynchronizer};
