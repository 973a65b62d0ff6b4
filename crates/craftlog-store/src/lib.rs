//! Document store adapter and paginated query engine.
//!
//! The [`DocumentStore`] trait is the contract the rest of craftlog programs
//! against: CRUD plus find-with-filter-limit-skip-sort-count for any
//! [`Document`] type. [`MemoryStore`] is the in-process JSON backend used by
//! the test suites; a server-backed adapter implements the same trait.
//!
//! [`pager::fetch_page`] builds filtered, sorted, paged reads on top of that
//! contract and is reused by every list endpoint.

pub mod document;
pub mod documents;
pub mod error;
pub mod filter;
pub mod memory;
pub mod pager;
pub mod traits;

pub use document::Document;
pub use error::{StoreError, StoreResult};
pub use filter::{Condition, Filter};
pub use memory::MemoryStore;
pub use pager::{fetch_page, Page, PageInfo, PageRequest};
pub use traits::{DocumentStore, FindOptions, Sort};
