//! This module defines the domain data types and the wire format of the remote
//! page database.

pub use category::{Category, ParseCategoryError};
pub use page::{
    DateValue, FormulaValue, Parent, PropertyValue, RelationRef, RemotePage, RichText,
    SelectOption, TextContent,
};
pub use query::{
    DateCondition, Filter, FilterCondition, FormulaCondition, MAX_PAGE_SIZE, QueryRequest,
    QueryResponse, Sort, SortDirection, TextCondition,
};
pub use transaction::{Direction, Transaction, TransactionBuilder};

mod category;
mod page;
mod query;
mod transaction;

/// Alias for the string type the remote service uses for page and database IDs.
pub type RemoteId = String;
