//! The JSON representation of pages in the remote page database.
//!
//! Field names follow the remote service's API exactly (`rich_text`,
//! `database_id`, etc.), so the structs here can be sent and received as-is.
//! Deserialization is lenient: missing fields take their default value and
//! unknown property types are kept as [PropertyValue::Unsupported], because
//! pages edited by hand in the remote service may be incomplete.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::RemoteId;

/// A page (row) in a remote database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RemotePage {
    /// The page ID, set by the remote service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RemoteId>,
    /// The database that contains the page.
    ///
    /// Left out of the JSON when unset, update requests must not name a parent.
    #[serde(default, skip_serializing_if = "Parent::is_unset")]
    pub parent: Parent,
    /// The property values of the page, keyed by property name.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    /// Whether the page has been moved to the trash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl RemotePage {
    /// Create an empty page in the database `container_id`.
    pub fn new(container_id: &str) -> Self {
        Self {
            id: None,
            parent: Parent::database(container_id),
            properties: BTreeMap::new(),
            archived: None,
        }
    }

    /// Add or replace the property `name`.
    pub fn with_property(mut self, name: &str, value: PropertyValue) -> Self {
        self.properties.insert(name.to_owned(), value);
        self
    }

    /// Get the property `name`, if the page has it.
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// The text of the first title fragment of the property `name`.
    pub fn title(&self, name: &str) -> Option<&str> {
        match self.property(name)? {
            PropertyValue::Title { title } => title.first().map(RichText::content),
            _ => None,
        }
    }

    /// The text of the first rich text fragment of the property `name`.
    pub fn rich_text(&self, name: &str) -> Option<&str> {
        match self.property(name)? {
            PropertyValue::RichText { rich_text } => rich_text.first().map(RichText::content),
            _ => None,
        }
    }

    /// The value of the number property `name`.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.property(name)? {
            PropertyValue::Number { number } => *number,
            _ => None,
        }
    }

    /// The option name of the select property `name`.
    pub fn select(&self, name: &str) -> Option<&str> {
        match self.property(name)? {
            PropertyValue::Select { select } => select.as_ref().map(|option| option.name.as_str()),
            _ => None,
        }
    }

    /// The string computed by the formula property `name`.
    pub fn formula_string(&self, name: &str) -> Option<&str> {
        match self.property(name)? {
            PropertyValue::Formula {
                formula: FormulaValue::String { string },
            } => string.as_deref(),
            _ => None,
        }
    }

    /// The start of the date computed by the formula property `name`.
    pub fn formula_date(&self, name: &str) -> Option<&str> {
        match self.property(name)? {
            PropertyValue::Formula {
                formula: FormulaValue::Date { date },
            } => date.as_ref().and_then(|date| date.start.as_deref()),
            _ => None,
        }
    }

    /// The IDs of the pages referenced by the relation property `name`.
    pub fn relation(&self, name: &str) -> Vec<&str> {
        match self.property(name) {
            Some(PropertyValue::Relation { relation }) => {
                relation.iter().map(|r| r.id.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// The parent of a page, always a database for the pages this crate handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    /// The kind of parent, `"database_id"`.
    #[serde(rename = "type", default = "database_parent_type")]
    pub kind: String,
    /// The ID of the containing database.
    #[serde(default)]
    pub database_id: RemoteId,
}

fn database_parent_type() -> String {
    "database_id".to_owned()
}

impl Parent {
    /// A parent pointing at the database `container_id`.
    pub fn database(container_id: &str) -> Self {
        Self {
            kind: database_parent_type(),
            database_id: container_id.to_owned(),
        }
    }

    fn is_unset(&self) -> bool {
        self.database_id.is_empty()
    }
}

impl Default for Parent {
    fn default() -> Self {
        Self::database("")
    }
}

/// The value of a single page property.
///
/// Exactly one variant is populated, selected by the `type` field of the JSON
/// object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    /// The page title.
    Title {
        /// The text fragments of the title.
        #[serde(default)]
        title: Vec<RichText>,
    },
    /// Formatted text.
    RichText {
        /// The text fragments.
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    /// A number.
    Number {
        /// `None` when the cell is empty.
        number: Option<f64>,
    },
    /// One option out of a fixed set.
    Select {
        /// `None` when no option is selected.
        select: Option<SelectOption>,
    },
    /// A date or date range.
    Date {
        /// `None` when the cell is empty.
        date: Option<DateValue>,
    },
    /// A value computed by the remote service, read-only.
    Formula {
        /// The computed value.
        formula: FormulaValue,
    },
    /// References to pages in another database.
    Relation {
        /// The referenced pages.
        #[serde(default)]
        relation: Vec<RelationRef>,
    },
    /// An aggregate over related pages, read-only.
    Rollup {
        /// The raw rollup value.
        #[serde(default)]
        rollup: serde_json::Value,
    },
    /// Any property type this crate does not use.
    #[serde(other)]
    Unsupported,
}

impl PropertyValue {
    /// A title property with a single text fragment.
    pub fn title(text: &str) -> Self {
        PropertyValue::Title {
            title: vec![RichText::new(text)],
        }
    }

    /// A rich text property with a single text fragment.
    pub fn rich_text(text: &str) -> Self {
        PropertyValue::RichText {
            rich_text: vec![RichText::new(text)],
        }
    }

    /// A number property.
    pub fn number(number: f64) -> Self {
        PropertyValue::Number {
            number: Some(number),
        }
    }

    /// A select property with the option `name`.
    pub fn select(name: &str) -> Self {
        PropertyValue::Select {
            select: Some(SelectOption {
                name: name.to_owned(),
            }),
        }
    }

    /// A relation property referencing the pages `ids`.
    pub fn relation<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        PropertyValue::Relation {
            relation: ids
                .into_iter()
                .map(|id| RelationRef { id: id.to_owned() })
                .collect(),
        }
    }
}

/// A fragment of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RichText {
    /// The text content.
    #[serde(default)]
    pub text: TextContent,
    /// The text without formatting, only sent by the remote service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_text: Option<String>,
}

impl RichText {
    /// A plain text fragment.
    pub fn new(content: &str) -> Self {
        Self {
            text: TextContent {
                content: content.to_owned(),
            },
            plain_text: None,
        }
    }

    /// The text of the fragment.
    ///
    /// Mentions and equations have no text content, for those the plain text
    /// rendering is used instead.
    pub fn content(&self) -> &str {
        match (&self.text.content, &self.plain_text) {
            (content, Some(plain_text)) if content.is_empty() => plain_text.as_str(),
            (content, _) => content.as_str(),
        }
    }
}

/// The content of a text fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TextContent {
    /// The text.
    #[serde(default)]
    pub content: String,
}

/// A selected option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    /// The option name.
    pub name: String,
}

/// A date or date range as ISO-8601 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DateValue {
    /// The start date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// The end date for ranges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// The result of a formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaValue {
    /// A string result.
    String {
        /// `None` when the formula evaluated to nothing.
        string: Option<String>,
    },
    /// A date result.
    Date {
        /// `None` when the formula evaluated to nothing.
        date: Option<DateValue>,
    },
    /// A number result.
    Number {
        /// `None` when the formula evaluated to nothing.
        number: Option<f64>,
    },
    /// A boolean result.
    Boolean {
        /// `None` when the formula evaluated to nothing.
        boolean: Option<bool>,
    },
    /// Any other result type.
    #[serde(other)]
    Unsupported,
}

/// A reference to another page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRef {
    /// The ID of the referenced page.
    pub id: RemoteId,
}
