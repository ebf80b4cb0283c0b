//! In-memory implementation of DocumentStore for testing and development

use crate::core::backend::DocumentStore;
use crate::core::document::{Document, Record, set_path, validate_path};
use crate::core::error::StoreError;
use crate::core::query::QuerySpec;
use async_trait::async_trait;
use rand::Rng;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

const AUTO_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const AUTO_ID_LENGTH: usize = 20;

type Collections = HashMap<String, BTreeMap<String, Record>>;

/// In-memory document store
///
/// Collections are created on first write. Documents are kept ordered by id,
/// which is the order `list` and unsorted queries return. Uses RwLock for
/// thread-safe access.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    project_id: String,
    collections: Arc<RwLock<Collections>>,
    faults: Arc<Mutex<VecDeque<StoreError>>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store for `project_id`
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            collections: Arc::new(RwLock::new(HashMap::new())),
            faults: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Make the next operation fail with `error`
    ///
    /// Queued failures are consumed one per operation, in order.
    pub fn fail_next(&self, error: StoreError) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.push_back(error);
        }
    }

    fn take_fault(&self) -> Result<(), StoreError> {
        let mut faults = self
            .faults
            .lock()
            .map_err(|e| StoreError::internal(format!("Failed to acquire fault lock: {}", e)))?;
        match faults.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn document_path(&self, collection: &str, id: &str) -> String {
        format!(
            "projects/{}/databases/(default)/documents/{}/{}",
            self.project_id, collection, id
        )
    }

    fn read_collections(&self) -> Result<std::sync::RwLockReadGuard<'_, Collections>, StoreError> {
        self.collections
            .read()
            .map_err(|e| StoreError::internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_collections(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, Collections>, StoreError> {
        self.collections
            .write()
            .map_err(|e| StoreError::internal(format!("Failed to acquire write lock: {}", e)))
    }

    fn snapshot(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let collections = self.read_collections()?;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn auto_id() -> String {
    let mut rng = rand::thread_rng();
    (0..AUTO_ID_LENGTH)
        .map(|_| AUTO_ID_ALPHABET[rng.gen_range(0..AUTO_ID_ALPHABET.len())] as char)
        .collect()
}

fn check_collection(collection: &str) -> Result<(), StoreError> {
    if collection.is_empty() || collection.contains('/') {
        return Err(StoreError::invalid_argument(format!(
            "Invalid collection reference '{}'. Collection references must have an odd number of segments",
            collection
        )));
    }
    Ok(())
}

fn check_document(collection: &str, id: &str) -> Result<(), StoreError> {
    check_collection(collection)?;
    if id.is_empty() || id.contains('/') {
        return Err(StoreError::invalid_argument(format!(
            "Invalid document reference '{}/{}'. Document references must have an even number of segments",
            collection, id
        )));
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn add(&self, collection: &str, data: Record) -> Result<String, StoreError> {
        self.take_fault()?;
        check_collection(collection)?;

        let mut collections = self.write_collections()?;
        let docs = collections.entry(collection.to_string()).or_default();

        let mut id = auto_id();
        while docs.contains_key(&id) {
            id = auto_id();
        }
        docs.insert(id.clone(), data);

        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.take_fault()?;
        check_document(collection, id)?;

        let collections = self.read_collections()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.take_fault()?;
        check_collection(collection)?;

        self.snapshot(collection)
    }

    async fn update(&self, collection: &str, id: &str, data: Record) -> Result<(), StoreError> {
        self.take_fault()?;
        check_document(collection, id)?;
        for path in data.keys() {
            validate_path(path)?;
        }

        let mut collections = self.write_collections()?;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| {
                StoreError::not_found(format!(
                    "No document to update: {}",
                    self.document_path(collection, id)
                ))
            })?;

        for (path, value) in data {
            set_path(document, &path, value);
        }

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.take_fault()?;
        check_document(collection, id)?;

        let mut collections = self.write_collections()?;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }

        Ok(())
    }

    async fn run_query(
        &self,
        collection: &str,
        query: &QuerySpec,
    ) -> Result<Vec<Document>, StoreError> {
        self.take_fault()?;
        check_collection(collection)?;
        query.validate()?;

        let documents = self.snapshot(collection)?;
        Ok(query.apply(documents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::StoreErrorCode;
    use crate::core::query::{FilterOp, SortDirection};
    use serde_json::{Value, json};

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_auto_id_shape() {
        let id = auto_id();
        assert_eq!(id.len(), AUTO_ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(auto_id(), id);
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let store = InMemoryDocumentStore::new("demo");
        let id = store.add("items", record(json!({"name": "x"}))).await.unwrap();

        let doc = store.get("items", &id).await.unwrap().unwrap();
        assert_eq!(doc.id, id);
        assert_eq!(doc.get("name"), Some(&json!("x")));
    }

    #[tokio::test]
    async fn test_get_unknown_collection() {
        let store = InMemoryDocumentStore::new("demo");
        assert!(store.get("nothing", "abc").await.unwrap().is_none());
        assert!(store.list("nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_ordered_by_id() {
        let store = InMemoryDocumentStore::new("demo");
        for n in 0..5 {
            store.add("items", record(json!({"n": n}))).await.unwrap();
        }

        let docs = store.list("items").await.unwrap();
        assert_eq!(docs.len(), 5);
        assert!(docs.windows(2).all(|pair| pair[0].id < pair[1].id));
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = InMemoryDocumentStore::new("demo");
        store.add("a", record(json!({"n": 1}))).await.unwrap();
        store.add("b", record(json!({"n": 2}))).await.unwrap();

        assert_eq!(store.list("a").await.unwrap().len(), 1);
        assert_eq!(store.list("b").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_merges_dotted_paths() {
        let store = InMemoryDocumentStore::new("demo");
        let id = store
            .add(
                "users",
                record(json!({"name": "Ada", "profile": {"city": "Lyon", "zip": "69000"}})),
            )
            .await
            .unwrap();

        store
            .update("users", &id, record(json!({"profile.city": "Paris", "age": 36})))
            .await
            .unwrap();

        let doc = store.get("users", &id).await.unwrap().unwrap();
        assert_eq!(
            Value::Object(doc.data),
            json!({"name": "Ada", "age": 36, "profile": {"city": "Paris", "zip": "69000"}})
        );
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = InMemoryDocumentStore::new("demo");
        let err = store
            .update("users", "ghost", record(json!({"a": 1})))
            .await
            .unwrap_err();

        assert_eq!(err.code, StoreErrorCode::NotFound);
        assert!(err.message.contains("projects/demo/databases/(default)/documents/users/ghost"));
    }

    #[tokio::test]
    async fn test_invalid_references() {
        let store = InMemoryDocumentStore::new("demo");
        assert!(store.add("", record(json!({}))).await.is_err());
        assert!(store.get("items", "").await.is_err());
        assert!(store.delete("items/abc", "x").await.is_err());
    }

    #[tokio::test]
    async fn test_fault_injection_consumed_once() {
        let store = InMemoryDocumentStore::new("demo");
        store.fail_next(StoreError::permission_denied());

        let err = store.list("items").await.unwrap_err();
        assert_eq!(err.code, StoreErrorCode::PermissionDenied);
        assert!(store.list("items").await.is_ok());
    }

    #[tokio::test]
    async fn test_run_query() {
        let store = InMemoryDocumentStore::new("demo");
        for (status, created) in [("done", 10), ("open", 20), ("done", 30), ("done", 40)] {
            store
                .add("tasks", record(json!({"status": status, "createdAt": created})))
                .await
                .unwrap();
        }

        let spec = QuerySpec::new()
            .filter("status", FilterOp::Equal, "done")
            .order_by("createdAt", SortDirection::Desc)
            .limit(2);
        let docs = store.run_query("tasks", &spec).await.unwrap();

        let created: Vec<_> = docs.iter().map(|d| d.get("createdAt").cloned().unwrap()).collect();
        assert_eq!(created, vec![json!(40), json!(30)]);
    }

    #[tokio::test]
    async fn test_run_query_validates() {
        let store = InMemoryDocumentStore::new("demo");
        let err = store
            .run_query("tasks", &QuerySpec::new().limit(0))
            .await
            .unwrap_err();
        assert_eq!(err.code, StoreErrorCode::InvalidArgument);
    }

    #[tokio::test]
    async fn test_concurrent_adds() {
        let store = InMemoryDocumentStore::new("demo");
        let mut handles = Vec::new();
        for n in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.add("items", record(json!({"n": n}))).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.list("items").await.unwrap().len(), 16);
    }
}
