//! CRUD and query helpers over the document store

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::core::backend::DocumentStore;
use crate::core::document::{Document, to_record};
use crate::core::error::StoreError;
use crate::core::query::{FilterCondition, QuerySpec, SortOption};
use crate::core::result::OperationResult;

/// Failure message of [`DocumentAccessor::read`] when no document exists
pub const DOCUMENT_NOT_FOUND: &str = "Document not found";

/// Document operations against the store
///
/// Each call reaches the store exactly once. There is no pagination: list and
/// query results are materialized whole.
#[derive(Clone)]
pub struct DocumentAccessor {
    store: Arc<dyn DocumentStore>,
}

impl DocumentAccessor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Add a record; the result carries the generated id
    pub async fn create<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        data: &T,
    ) -> OperationResult<()> {
        debug!(collection, "creating document");
        let result: Result<String, StoreError> = async {
            let record = to_record(data)?;
            self.store.add(collection, record).await
        }
        .await;
        OperationResult::capture("create", result.map(OperationResult::with_id))
    }

    /// Fetch one document
    ///
    /// A missing document is a failure with [`DOCUMENT_NOT_FOUND`].
    pub async fn read(&self, collection: &str, id: &str) -> OperationResult<Document> {
        debug!(collection, id, "reading document");
        let result = self.store.get(collection, id).await.map(|found| match found {
            Some(document) => OperationResult::ok(document),
            None => OperationResult::failure(DOCUMENT_NOT_FOUND),
        });
        OperationResult::capture("read", result)
    }

    /// Fetch every document of a collection
    pub async fn list(&self, collection: &str) -> OperationResult<Vec<Document>> {
        debug!(collection, "listing collection");
        let result = self.store.list(collection).await.map(OperationResult::ok);
        OperationResult::capture("list", result)
    }

    /// Merge the fields of `partial` into an existing document
    ///
    /// Fields absent from `partial` are left untouched.
    pub async fn update<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        id: &str,
        partial: &T,
    ) -> OperationResult<()> {
        debug!(collection, id, "updating document");
        let result: Result<(), StoreError> = async {
            let record = to_record(partial)?;
            self.store.update(collection, id, record).await
        }
        .await;
        OperationResult::capture("update", result.map(|()| OperationResult::empty()))
    }

    /// Remove a document. Removing a missing document succeeds.
    pub async fn delete(&self, collection: &str, id: &str) -> OperationResult<()> {
        debug!(collection, id, "deleting document");
        let result = self
            .store
            .delete(collection, id)
            .await
            .map(|()| OperationResult::empty());
        OperationResult::capture("delete", result)
    }

    /// Run a query once and return every match with its id
    pub async fn query(
        &self,
        collection: &str,
        spec: &QuerySpec,
    ) -> OperationResult<Vec<Document>> {
        debug!(
            collection,
            conditions = spec.conditions.len(),
            sorted = spec.sort.is_some(),
            limit = spec.limit,
            "querying collection"
        );
        let result = self
            .store
            .run_query(collection, spec)
            .await
            .map(OperationResult::ok);
        OperationResult::capture("query", result)
    }

    /// [`query`](Self::query) with the spec given as separate parts
    pub async fn query_with(
        &self,
        collection: &str,
        conditions: Vec<FilterCondition>,
        sort: Option<SortOption>,
        limit: Option<usize>,
    ) -> OperationResult<Vec<Document>> {
        self.query(collection, &QuerySpec::from_parts(conditions, sort, limit)).await
    }
}
