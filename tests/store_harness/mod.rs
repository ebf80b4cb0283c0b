//! Shared test harness for document store backends
//!
//! Provides record helpers and the `document_store_tests!` macro, which checks
//! any `DocumentStore` implementation against the accessor-facing contract.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//! use rhye::storage::InMemoryDocumentStore;
//!
//! document_store_tests!(InMemoryDocumentStore::new("test-project"));
//! ```

#![allow(dead_code)]

use rhye::core::document::Record;
use serde_json::{Value, json};

/// Build a record from a JSON object literal
pub fn record(value: Value) -> Record {
    value
        .as_object()
        .cloned()
        .expect("record literal must be a JSON object")
}

/// Task records: (status, createdAt)
pub fn sample_tasks() -> Vec<Record> {
    [
        ("done", "2024-01-01T00:00:00Z"),
        ("open", "2024-01-02T00:00:00Z"),
        ("done", "2024-01-03T00:00:00Z"),
        ("done", "2024-01-04T00:00:00Z"),
        ("open", "2024-01-05T00:00:00Z"),
    ]
    .into_iter()
    .map(|(status, created_at)| record(json!({"status": status, "createdAt": created_at})))
    .collect()
}

/// Generate a `DocumentStore` conformance suite.
///
/// `$factory` is re-evaluated for each test. For the concurrent test the store
/// must be `Clone + 'static` with shared state.
#[macro_export]
macro_rules! document_store_tests {
    ($factory:expr) => {
        mod document_store_contract_tests {
            use super::*;
            use rhye::core::backend::DocumentStore;
            use rhye::core::error::StoreErrorCode;
            use rhye::core::query::{FilterOp, QuerySpec, SortDirection};
            use serde_json::json;

            #[tokio::test]
            async fn test_add_generates_unique_ids() {
                let store = $factory;
                let a = store.add("items", record(json!({"n": 1}))).await.unwrap();
                let b = store.add("items", record(json!({"n": 1}))).await.unwrap();
                assert!(!a.is_empty());
                assert_ne!(a, b);
            }

            #[tokio::test]
            async fn test_get_roundtrip() {
                let store = $factory;
                let id = store
                    .add("items", record(json!({"name": "x", "tags": ["a"]})))
                    .await
                    .unwrap();

                let doc = store.get("items", &id).await.unwrap().unwrap();
                assert_eq!(doc.id, id);
                assert_eq!(doc.get("name"), Some(&json!("x")));
                assert_eq!(doc.get("tags"), Some(&json!(["a"])));
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let store = $factory;
                assert!(store.get("items", "does-not-exist").await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_list_empty_and_full() {
                let store = $factory;
                assert!(store.list("tasks").await.unwrap().is_empty());

                for task in sample_tasks() {
                    store.add("tasks", task).await.unwrap();
                }
                let all = store.list("tasks").await.unwrap();
                assert_eq!(all.len(), 5);
                assert!(all.iter().all(|doc| !doc.id.is_empty()));
            }

            #[tokio::test]
            async fn test_update_is_partial() {
                let store = $factory;
                let id = store
                    .add("items", record(json!({"name": "x", "count": 1})))
                    .await
                    .unwrap();

                store
                    .update("items", &id, record(json!({"count": 2})))
                    .await
                    .unwrap();

                let doc = store.get("items", &id).await.unwrap().unwrap();
                assert_eq!(doc.get("name"), Some(&json!("x")));
                assert_eq!(doc.get("count"), Some(&json!(2)));
            }

            #[tokio::test]
            async fn test_update_nonexistent() {
                let store = $factory;
                let err = store
                    .update("items", "does-not-exist", record(json!({"a": 1})))
                    .await
                    .unwrap_err();
                assert_eq!(err.code, StoreErrorCode::NotFound);
            }

            #[tokio::test]
            async fn test_update_rejects_malformed_paths() {
                let store = $factory;
                let id = store
                    .add("items", record(json!({"a": {"b": 1}})))
                    .await
                    .unwrap();

                for path in ["", "a.", ".a", "x..y"] {
                    let mut data = record(json!({"name": "y"}));
                    data.insert(path.to_string(), json!(5));
                    let err = store.update("items", &id, data).await.unwrap_err();
                    assert_eq!(err.code, StoreErrorCode::InvalidArgument, "path {:?}", path);
                }

                // Rejected updates write nothing
                let doc = store.get("items", &id).await.unwrap().unwrap();
                assert_eq!(serde_json::Value::Object(doc.data), json!({"a": {"b": 1}}));
            }

            #[tokio::test]
            async fn test_delete_then_get() {
                let store = $factory;
                let id = store.add("items", record(json!({"n": 1}))).await.unwrap();

                store.delete("items", &id).await.unwrap();
                assert!(store.get("items", &id).await.unwrap().is_none());

                // Deleting again is not an error
                store.delete("items", &id).await.unwrap();
            }

            #[tokio::test]
            async fn test_query_filter_sort_limit() {
                let store = $factory;
                for task in sample_tasks() {
                    store.add("tasks", task).await.unwrap();
                }

                let spec = QuerySpec::new()
                    .filter("status", FilterOp::Equal, "done")
                    .order_by("createdAt", SortDirection::Desc)
                    .limit(2);
                let docs = store.run_query("tasks", &spec).await.unwrap();

                let created: Vec<_> = docs
                    .iter()
                    .map(|d| d.get("createdAt").and_then(|v| v.as_str()).unwrap().to_string())
                    .collect();
                assert_eq!(created, vec!["2024-01-04T00:00:00Z", "2024-01-03T00:00:00Z"]);
            }

            #[tokio::test]
            async fn test_query_without_constraints_returns_all() {
                let store = $factory;
                for task in sample_tasks() {
                    store.add("tasks", task).await.unwrap();
                }
                let docs = store.run_query("tasks", &QuerySpec::new()).await.unwrap();
                assert_eq!(docs.len(), 5);
            }

            #[tokio::test]
            async fn test_query_no_match() {
                let store = $factory;
                for task in sample_tasks() {
                    store.add("tasks", task).await.unwrap();
                }
                let spec = QuerySpec::new().where_eq("status", "archived");
                assert!(store.run_query("tasks", &spec).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_query_rejects_invalid_spec() {
                let store = $factory;
                let spec = QuerySpec::new().filter("status", FilterOp::NotIn, "done");
                let err = store.run_query("tasks", &spec).await.unwrap_err();
                assert_eq!(err.code, StoreErrorCode::InvalidArgument);
            }

            #[tokio::test]
            async fn test_concurrent_access() {
                let store = $factory;
                let mut handles = Vec::new();
                for n in 0..10 {
                    let store = store.clone();
                    handles.push(tokio::spawn(async move {
                        store.add("items", record(json!({"n": n}))).await.unwrap()
                    }));
                }
                for handle in handles {
                    handle.await.unwrap();
                }
                assert_eq!(store.list("items").await.unwrap().len(), 10);
            }
        }
    };
}
