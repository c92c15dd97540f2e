//! An in-memory [PageStore] that behaves like the remote page database.

use std::{
    cmp::Ordering,
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use time::Date;

use crate::{
    Error,
    codec::property,
    models::{
        DateValue, Filter, FilterCondition, FormulaCondition, FormulaValue, PropertyValue,
        QueryRequest, QueryResponse, RemotePage, Sort, SortDirection, TextCondition,
    },
    period::{day_label, month_label, week_label},
    remote::{ApiErrorDetail, ApiResponse, PageStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Operation {
    Create,
    Update,
    Archive,
    Query,
}

/// A failure to inject into the next call of an [Operation].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Failure {
    /// The service responds with this status code.
    Status(u16),
    /// The request times out.
    Timeout,
}

#[derive(Default)]
struct State {
    pages: Vec<RemotePage>,
    next_id: u32,
    failures: HashMap<Operation, VecDeque<Failure>>,
    calls: HashMap<Operation, u32>,
    last_query: Option<QueryRequest>,
}

/// Stores pages in memory.
///
/// Pages created in the transaction database get the `Real date`, `Month` and
/// `Week` formulas computed from `today`, like the remote service would.
pub(crate) struct FakePageStore {
    transaction_container_id: String,
    today: Date,
    computes_formulas: bool,
    state: Mutex<State>,
}

impl FakePageStore {
    pub(crate) fn new(transaction_container_id: &str, today: Date) -> Self {
        Self {
            transaction_container_id: transaction_container_id.to_owned(),
            today,
            computes_formulas: true,
            state: Mutex::new(State::default()),
        }
    }

    /// Simulate a transaction database without the formula properties.
    pub(crate) fn without_formulas(mut self) -> Self {
        self.computes_formulas = false;
        self
    }

    /// Insert `page`, giving it an ID if it has none. Returns the page ID.
    pub(crate) fn insert(&self, mut page: RemotePage) -> String {
        let mut state = self.state.lock().unwrap();
        let id = match &page.id {
            Some(id) => id.clone(),
            None => next_id(&mut state),
        };
        page.id = Some(id.clone());
        state.pages.push(page);

        id
    }

    /// Make the next call of `operation` fail with `failure`.
    ///
    /// Failures queue up, calling this twice fails the next two calls.
    pub(crate) fn fail_next(&self, operation: Operation, failure: Failure) {
        self.state
            .lock()
            .unwrap()
            .failures
            .entry(operation)
            .or_default()
            .push_back(failure);
    }

    /// The number of times `operation` was called, including failed calls.
    pub(crate) fn calls(&self, operation: Operation) -> u32 {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    /// The body of the most recent query, including failed queries.
    pub(crate) fn last_query(&self) -> Option<QueryRequest> {
        self.state.lock().unwrap().last_query.clone()
    }

    pub(crate) fn page(&self, page_id: &str) -> Option<RemotePage> {
        self.state
            .lock()
            .unwrap()
            .pages
            .iter()
            .find(|page| page.id.as_deref() == Some(page_id))
            .cloned()
    }

    /// The pages in the database `container_id`, including archived pages.
    pub(crate) fn pages_in(&self, container_id: &str) -> Vec<RemotePage> {
        self.state
            .lock()
            .unwrap()
            .pages
            .iter()
            .filter(|page| page.parent.database_id == container_id)
            .cloned()
            .collect()
    }

    fn begin(&self, operation: Operation) -> Option<Failure> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(operation).or_default() += 1;

        state
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
    }
}

fn next_id(state: &mut State) -> String {
    state.next_id += 1;
    format!("page-{}", state.next_id)
}

fn failure_response<T>(failure: Failure) -> Result<ApiResponse<T>, Error> {
    match failure {
        Failure::Status(status) => Ok(ApiResponse::failure(ApiErrorDetail::from_response(
            status,
            None,
            &format!(r#"{{"object":"error","status":{status},"message":"injected failure"}}"#),
        ))),
        Failure::Timeout => Err(Error::Transport("timed out".to_owned())),
    }
}

fn not_found<T>(page_id: &str) -> Result<ApiResponse<T>, Error> {
    Ok(ApiResponse::failure(ApiErrorDetail::from_response(
        404,
        Some("Not Found"),
        &format!(
            r#"{{"object":"error","status":404,"message":"Could not find page with ID: {page_id}."}}"#
        ),
    )))
}

/// A transaction page as the remote service returns it, with the formulas for `date`.
pub(crate) fn stored_transaction(
    container_id: &str,
    amount: f64,
    tag: &str,
    date: Date,
) -> RemotePage {
    with_formulas(
        RemotePage::new(container_id)
            .with_property(property::REMINDER, PropertyValue::title(""))
            .with_property(property::AMOUNT, PropertyValue::number(amount))
            .with_property(property::TAGS, PropertyValue::select(tag)),
        date,
    )
}

fn with_formulas(page: RemotePage, date: Date) -> RemotePage {
    page.with_property(
        property::REAL_DATE,
        PropertyValue::Formula {
            formula: FormulaValue::Date {
                date: Some(DateValue {
                    start: Some(format!("{}T10:00:00.000+08:00", day_label(date))),
                    end: None,
                }),
            },
        },
    )
    .with_property(property::MONTH, formula_string(&month_label(date)))
    .with_property(property::WEEK, formula_string(&week_label(date)))
}

fn formula_string(value: &str) -> PropertyValue {
    PropertyValue::Formula {
        formula: FormulaValue::String {
            string: Some(value.to_owned()),
        },
    }
}

fn text_matches(text: Option<&str>, condition: &TextCondition) -> bool {
    let text = text.unwrap_or_default();

    condition.equals.as_deref().is_none_or(|equals| text == equals)
        && condition
            .contains
            .as_deref()
            .is_none_or(|contains| text.contains(contains))
}

fn matches(page: &RemotePage, filter: &Filter) -> bool {
    let name = filter.property.as_str();

    match &filter.condition {
        FilterCondition::Title(condition) => text_matches(page.title(name), condition),
        FilterCondition::RichText(condition) => text_matches(page.rich_text(name), condition),
        FilterCondition::Formula(FormulaCondition::String(condition)) => {
            text_matches(page.formula_string(name), condition)
        }
        FilterCondition::Formula(FormulaCondition::Date(condition)) => {
            match (page.formula_date(name), condition.equals.as_deref()) {
                (Some(date), Some(day)) => date.starts_with(day),
                (_, None) => true,
                (None, Some(_)) => false,
            }
        }
    }
}

/// Compare two pages by a number, date formula or string formula property.
fn compare(a: &RemotePage, b: &RemotePage, sort: &Sort) -> Ordering {
    let name = sort.property.as_str();
    let ordering = match (a.number(name), b.number(name)) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        _ => a
            .formula_date(name)
            .or(a.formula_string(name))
            .cmp(&b.formula_date(name).or(b.formula_string(name))),
    };

    match sort.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

#[async_trait]
impl PageStore for FakePageStore {
    async fn create_page(&self, page: &RemotePage) -> Result<ApiResponse<RemotePage>, Error> {
        tokio::task::yield_now().await;
        if let Some(failure) = self.begin(Operation::Create) {
            return failure_response(failure);
        }

        let mut created = page.clone();
        if self.computes_formulas && created.parent.database_id == self.transaction_container_id {
            created = with_formulas(created, self.today);
        }
        created.archived = Some(false);

        let mut state = self.state.lock().unwrap();
        created.id = Some(next_id(&mut state));
        state.pages.push(created.clone());

        Ok(ApiResponse::success(200, created))
    }

    async fn update_page(
        &self,
        page_id: &str,
        page: &RemotePage,
    ) -> Result<ApiResponse<RemotePage>, Error> {
        tokio::task::yield_now().await;
        if let Some(failure) = self.begin(Operation::Update) {
            return failure_response(failure);
        }

        let mut state = self.state.lock().unwrap();
        let Some(stored) = state
            .pages
            .iter_mut()
            .find(|stored| stored.id.as_deref() == Some(page_id))
        else {
            return not_found(page_id);
        };

        stored.properties.extend(page.properties.clone());
        if let Some(archived) = page.archived {
            stored.archived = Some(archived);
        }

        Ok(ApiResponse::success(200, stored.clone()))
    }

    async fn archive_page(&self, page_id: &str) -> Result<ApiResponse<RemotePage>, Error> {
        tokio::task::yield_now().await;
        if let Some(failure) = self.begin(Operation::Archive) {
            return failure_response(failure);
        }

        let mut state = self.state.lock().unwrap();
        let Some(stored) = state
            .pages
            .iter_mut()
            .find(|stored| stored.id.as_deref() == Some(page_id))
        else {
            return not_found(page_id);
        };

        stored.archived = Some(true);

        Ok(ApiResponse::success(200, stored.clone()))
    }

    async fn query_database(
        &self,
        container_id: &str,
        query: &QueryRequest,
    ) -> Result<ApiResponse<QueryResponse>, Error> {
        tokio::task::yield_now().await;
        self.state.lock().unwrap().last_query = Some(query.clone());
        if let Some(failure) = self.begin(Operation::Query) {
            return failure_response(failure);
        }

        let state = self.state.lock().unwrap();
        let mut results: Vec<RemotePage> = state
            .pages
            .iter()
            .filter(|page| page.parent.database_id == container_id)
            .filter(|page| page.archived != Some(true))
            .filter(|page| query.filter.as_ref().is_none_or(|filter| matches(page, filter)))
            .cloned()
            .collect();

        for sort in query.sorts.iter().flatten().rev() {
            results.sort_by(|a, b| compare(a, b, sort));
        }

        let has_more = results.len() > query.page_size as usize;
        results.truncate(query.page_size as usize);

        Ok(ApiResponse::success(
            200,
            QueryResponse {
                results,
                next_cursor: None,
                has_more,
            },
        ))
    }
}
