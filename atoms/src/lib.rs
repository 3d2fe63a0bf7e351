//! Domain atoms of the fiscal task tracker.
//!
//! Each module owns one concept (users, catalog, dossiers, assignments,
//! performance). Services take a `&dyn LedgerStore` and the static
//! `ReferenceData` as arguments; none of them hold clients of their own.

pub mod assignments;
pub mod catalog;
pub mod dossiers;
pub mod error;
pub mod performance;
pub mod reference;
pub mod store;
pub mod users;

pub use error::{LedgerError, ReferenceError, StoreError};
pub use reference::ReferenceData;
pub use store::{DynamoStore, LedgerStore, MemoryStore};
