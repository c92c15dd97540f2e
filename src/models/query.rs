//! Request and response bodies for querying a remote database.

use serde::{Deserialize, Serialize};

use crate::models::RemotePage;

/// The largest page size the remote service accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// The body of a database query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Only return pages matching this filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    /// The order to return pages in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorts: Option<Vec<Sort>>,
    /// The maximum number of pages to return.
    pub page_size: u32,
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self {
            filter: None,
            sorts: None,
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl QueryRequest {
    /// Only return pages matching `filter`.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sort the results by `property`.
    pub fn sort(mut self, property: &str, direction: SortDirection) -> Self {
        self.sorts.get_or_insert_with(Vec::new).push(Sort {
            property: property.to_owned(),
            direction,
        });
        self
    }

    /// Set the page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }
}

/// A sort criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// The property to sort by.
    pub property: String,
    /// The sort order.
    pub direction: SortDirection,
}

/// The order to sort pages in a [QueryRequest].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

/// A filter on a single property.
///
/// Serializes as `{"property": "...", "<type>": {<condition>}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// The property to filter on.
    pub property: String,
    /// The condition, keyed by the type of the property.
    #[serde(flatten)]
    pub condition: FilterCondition,
}

impl Filter {
    /// Match pages whose title property `property` contains `value`.
    pub fn title_contains(property: &str, value: &str) -> Self {
        Self {
            property: property.to_owned(),
            condition: FilterCondition::Title(TextCondition::contains(value)),
        }
    }

    /// Match pages whose string formula `property` equals `value`.
    pub fn formula_string_equals(property: &str, value: &str) -> Self {
        Self {
            property: property.to_owned(),
            condition: FilterCondition::Formula(FormulaCondition::String(TextCondition::equals(
                value,
            ))),
        }
    }

    /// Match pages whose date formula `property` is on the day `date` (`YYYY-MM-DD`).
    pub fn formula_date_equals(property: &str, date: &str) -> Self {
        Self {
            property: property.to_owned(),
            condition: FilterCondition::Formula(FormulaCondition::Date(DateCondition {
                equals: Some(date.to_owned()),
            })),
        }
    }
}

/// The condition of a [Filter], keyed by the property type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCondition {
    /// A condition on a title property.
    Title(TextCondition),
    /// A condition on a rich text property.
    RichText(TextCondition),
    /// A condition on the value computed by a formula property.
    Formula(FormulaCondition),
}

/// A condition on the result of a formula, keyed by the result type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaCondition {
    /// The formula returns a string.
    String(TextCondition),
    /// The formula returns a date.
    Date(DateCondition),
}

/// A condition on text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TextCondition {
    /// The text is exactly this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<String>,
    /// The text contains this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
}

impl TextCondition {
    /// Match text equal to `value`.
    pub fn equals(value: &str) -> Self {
        Self {
            equals: Some(value.to_owned()),
            contains: None,
        }
    }

    /// Match text containing `value`.
    pub fn contains(value: &str) -> Self {
        Self {
            equals: None,
            contains: Some(value.to_owned()),
        }
    }
}

/// A condition on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DateCondition {
    /// The date falls on this day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<String>,
}

/// The response to a database query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QueryResponse {
    /// The pages matching the query.
    #[serde(default)]
    pub results: Vec<RemotePage>,
    /// The cursor of the next page of results.
    #[serde(default)]
    pub next_cursor: Option<String>,
    /// Whether there are more results after this page.
    #[serde(default)]
    pub has_more: bool,
}
