//! Document store contract.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::document::Document;
use crate::error::StoreResult;
use crate::filter::Filter;

/// Sort specification for a find query.
#[derive(Debug, Clone)]
pub struct Sort {
    pub field: String,
    pub descending: bool,
}

/// Paging and ordering options for a find query.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    pub sort: Option<Sort>,
}

/// CRUD plus filtered queries over any [`Document`] collection.
///
/// No multi-document transaction is assumed: every method is an independent
/// round trip, and a count following a find may observe concurrent writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert<D: Document>(&self, doc: &D) -> StoreResult<()>;

    async fn get<D: Document>(&self, id: Uuid) -> StoreResult<Option<D>>;

    /// Replace an existing document wholesale.
    async fn replace<D: Document>(&self, doc: &D) -> StoreResult<()>;

    /// Returns whether a document was actually removed.
    async fn delete<D: Document>(&self, id: Uuid) -> StoreResult<bool>;

    async fn find<D: Document>(&self, filter: &Filter, options: &FindOptions)
        -> StoreResult<Vec<D>>;

    async fn count<D: Document>(&self, filter: &Filter) -> StoreResult<u64>;

    /// Bulk delete; returns the number of documents removed.
    async fn delete_many<D: Document>(&self, filter: &Filter) -> StoreResult<u64>;

    /// Bulk shallow-merge of `patch` into every matching document; returns
    /// the number of documents updated.
    async fn update_many<D: Document>(&self, filter: &Filter, patch: &JsonValue)
        -> StoreResult<u64>;
}
