//! Expense totals for the current day, week and month.

use std::collections::BTreeMap;

use time::Date;

use crate::{
    Error,
    backoff::RetryPolicy,
    codec::{amount_of, property},
    models::{Filter, QueryRequest, RemotePage},
    period::{day_label, month_label, parse_day, week_label},
    remote::PageStore,
};

/// Expense totals around a given day.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statistics {
    /// The total spent on the day.
    pub daily_expenses: f64,
    /// The total spent in the Monday to Sunday week containing the day.
    pub weekly_expenses: f64,
    /// The total spent in the month containing the day.
    pub monthly_expenses: f64,
    /// The month label, e.g. `2024-03`.
    pub current_month: String,
    /// The total spent on each day of the month that has expenses.
    pub daily_totals: BTreeMap<Date, f64>,
}

/// Sum the expenses in `container_id` for the day, week and month of `today`.
///
/// The three queries run concurrently. If the remote service rejects one of
/// them, that total is zero and the others are still returned.
///
/// Only the first page of results of each query is summed.
///
/// # Errors
/// Returns an error if a query could not be sent after retries.
pub async fn load_statistics<S: PageStore + ?Sized>(
    store: &S,
    container_id: &str,
    retry_policy: RetryPolicy,
    today: Date,
) -> Result<Statistics, Error> {
    let current_month = month_label(today);

    let daily_query = QueryRequest::default().filter(Filter::formula_date_equals(
        property::REAL_DATE,
        &day_label(today),
    ));
    let weekly_query = QueryRequest::default().filter(Filter::formula_string_equals(
        property::WEEK,
        &week_label(today),
    ));
    let monthly_query = QueryRequest::default().filter(Filter::formula_string_equals(
        property::MONTH,
        &current_month,
    ));

    let (daily, weekly, monthly) = tokio::join!(
        query_pages(store, container_id, retry_policy, &daily_query),
        query_pages(store, container_id, retry_policy, &weekly_query),
        query_pages(store, container_id, retry_policy, &monthly_query),
    );
    let (daily, weekly, monthly) = (daily?, weekly?, monthly?);

    Ok(Statistics {
        daily_expenses: sum_amounts(&daily),
        weekly_expenses: sum_amounts(&weekly),
        monthly_expenses: sum_amounts(&monthly),
        current_month,
        daily_totals: daily_totals(&monthly),
    })
}

async fn query_pages<S: PageStore + ?Sized>(
    store: &S,
    container_id: &str,
    retry_policy: RetryPolicy,
    query: &QueryRequest,
) -> Result<Vec<RemotePage>, Error> {
    let response = retry_policy
        .run(|| store.query_database(container_id, query))
        .await?;

    match response.into_result() {
        Ok(body) => Ok(body.results),
        Err(Error::Api(detail)) => {
            tracing::warn!("Could not load statistics, counting zero: {detail}");
            Ok(Vec::new())
        }
        Err(error) => Err(error),
    }
}

/// The total amount of `pages`, pages without an amount count as zero.
pub fn sum_amounts(pages: &[RemotePage]) -> f64 {
    pages.iter().map(amount_of).sum()
}

/// The total amount of `pages` per day of their `Real date`.
///
/// Pages without a readable date are left out.
pub fn daily_totals(pages: &[RemotePage]) -> BTreeMap<Date, f64> {
    pages.iter().fold(BTreeMap::new(), |mut totals, page| {
        match page.formula_date(property::REAL_DATE).and_then(parse_day) {
            Some(day) => *totals.entry(day).or_default() += amount_of(page),
            None => tracing::debug!("Skipping page {:?} without a date", page.id),
        }

        totals
    })
}
