//! Defines the transaction domain model.

use crate::{
    Error,
    models::{Category, RemoteId},
};

/// Whether money was spent or earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Money was spent.
    #[default]
    Expense,
    /// Money was earned.
    ///
    /// The remote transaction database only records expenses, so income
    /// cannot be synchronized.
    Income,
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned, never negative.
    pub amount: f64,
    /// Whether the money was spent or earned.
    pub direction: Direction,
    /// What the money was spent on.
    pub category: Category,
    /// A short note, used as the title of the remote page.
    pub note: String,
    /// When the transaction happened as an ISO-8601 string.
    ///
    /// The remote service computes this when the page is created, so it is
    /// empty until the transaction has been read back.
    pub date: String,
    /// The ID of the remote page, `None` until the transaction has been persisted.
    pub remote_id: Option<RemoteId>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: f64, category: Category) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            category,
            direction: Direction::Expense,
            description: String::new(),
            note: String::new(),
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// # Examples
///
/// ```
/// use budgeteur_sync::models::{Category, Transaction};
///
/// let transaction = Transaction::build(42.5, Category::Food)
///     .note("Dumplings")
///     .finalise()
///     .unwrap();
///
/// assert_eq!(transaction.note, "Dumplings");
/// assert_eq!(transaction.remote_id, None);
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The amount of money, must not be negative.
    pub amount: f64,
    /// What the money was spent on.
    pub category: Category,
    /// Defaults to [Direction::Expense].
    pub direction: Direction,
    /// Defaults to an empty string.
    pub description: String,
    /// Defaults to an empty string.
    pub note: String,
}

impl TransactionBuilder {
    /// Set the direction of the transaction.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the description of the transaction.
    pub fn description(mut self, description: &str) -> Self {
        description.clone_into(&mut self.description);
        self
    }

    /// Set the note of the transaction.
    pub fn note(mut self, note: &str) -> Self {
        note.clone_into(&mut self.note);
        self
    }

    /// Create the transaction.
    ///
    /// # Errors
    /// Returns [Error::NegativeAmount] if the amount is negative or not a number.
    pub fn finalise(self) -> Result<Transaction, Error> {
        if self.amount.is_nan() || self.amount < 0.0 {
            return Err(Error::NegativeAmount(self.amount));
        }

        Ok(Transaction {
            description: self.description,
            amount: self.amount,
            direction: self.direction,
            category: self.category,
            note: self.note,
            date: String::new(),
            remote_id: None,
        })
    }
}
