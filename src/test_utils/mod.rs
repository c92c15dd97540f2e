#![allow(missing_docs)]

pub(crate) mod page_store;

pub(crate) use page_store::{Failure, FakePageStore, Operation, stored_transaction};
