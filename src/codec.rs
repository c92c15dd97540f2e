//! Maps [Transaction]s to and from pages in the remote transaction database.
//!
//! Decoding never fails. Pages created by hand in the remote service may be
//! missing any property, so absent or malformed values degrade to defaults.

use crate::models::{Category, Direction, PropertyValue, RemotePage, Transaction};

/// Names of the properties in the remote databases.
pub mod property {
    /// Title of a transaction page, holds the note.
    pub const REMINDER: &str = "Reminder";
    /// Number property holding the amount.
    pub const AMOUNT: &str = "Amount";
    /// Select property holding the category tag.
    pub const TAGS: &str = "Tags";
    /// Rich text property holding the description.
    pub const DESCRIPTION: &str = "Description";
    /// Date formula computed from the creation time, the canonical transaction date.
    pub const REAL_DATE: &str = "Real date";
    /// String formula with the month label, e.g. `2024-03`.
    ///
    /// Also the title property of pages in the month summary database.
    pub const MONTH: &str = "Month";
    /// String formula with the week label, e.g. `24-03-11 ~ 24-03-17`.
    ///
    /// Also the title property of pages in the week summary database.
    pub const WEEK: &str = "Week";
    /// Relation from a transaction to its month summary page.
    pub const MONTH_SUMMARY: &str = "Month Summary";
    /// Relation from a transaction to its week summary page.
    pub const WEEK_SUMMARY: &str = "Week Summary";
}

/// Create the page for `transaction` in the database `container_id`.
///
/// The title is the note, or the description when the note is empty. An empty
/// `container_id` is logged as a configuration error but the page is still
/// returned, the remote service will reject it.
pub fn encode(transaction: &Transaction, container_id: &str) -> RemotePage {
    if container_id.trim().is_empty() {
        tracing::error!(
            "The transaction database ID is empty, check the configuration. \
            The remote service will reject this page."
        );
    }

    let title = if transaction.note.is_empty() {
        &transaction.description
    } else {
        &transaction.note
    };

    let page = RemotePage::new(container_id)
        .with_property(property::REMINDER, PropertyValue::title(title))
        .with_property(property::AMOUNT, PropertyValue::number(transaction.amount))
        .with_property(
            property::TAGS,
            PropertyValue::select(transaction.category.tag_label()),
        );

    tracing::debug!("Encoded transaction as page: {page:?}");

    page
}

/// Create a transaction from a page in the remote transaction database.
///
/// - The category comes from the `Tags` select, unknown tags map to [Category::FALLBACK].
/// - The description comes from `Description`, falling back to the `Reminder` title.
/// - The date comes from the `Real date` formula, not the raw date property.
/// - The amount defaults to zero.
pub fn decode(page: &RemotePage) -> Transaction {
    let category = Category::from_tag_label_or_fallback(page.select(property::TAGS));

    let description = match page.rich_text(property::DESCRIPTION) {
        Some(description) if !description.is_empty() => description,
        _ => page.title(property::REMINDER).unwrap_or_default(),
    };

    Transaction {
        description: description.to_owned(),
        amount: amount_of(page),
        direction: Direction::Expense,
        category,
        note: String::new(),
        date: page
            .formula_date(property::REAL_DATE)
            .unwrap_or_default()
            .to_owned(),
        remote_id: page.id.clone(),
    }
}

/// Decode every page in `pages`.
pub fn decode_all(pages: &[RemotePage]) -> Vec<Transaction> {
    pages.iter().map(decode).collect()
}

/// The amount of a transaction page, zero if it is missing.
pub fn amount_of(page: &RemotePage) -> f64 {
    page.number(property::AMOUNT).unwrap_or(0.0)
}
