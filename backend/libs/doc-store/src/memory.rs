//! In-process document store used by tests and local development.
//!
//! Keeps insertion order per collection so that order-by ties resolve to
//! store-assigned document order, and hands out write-time timestamps from a
//! monotonically non-decreasing clock.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::{Direction, Document, DocumentStore, FieldOp, Query, SERVER_TIMESTAMP_SENTINEL};

#[derive(Default)]
struct Collection {
    docs: HashMap<String, Value>,
    // insertion order, for tie-breaking under order-by
    order: Vec<String>,
}

impl Collection {
    fn put(&mut self, id: String, data: Value) {
        if !self.docs.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.docs.insert(id, data);
    }

    fn remove(&mut self, id: &str) -> bool {
        if self.docs.remove(id).is_some() {
            self.order.retain(|existing| existing != id);
            true
        } else {
            false
        }
    }
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Collection>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Inner {
    /// Write-time clock: never runs backwards within one store instance.
    fn tick(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now < last {
                now = last;
            }
        }
        self.last_timestamp = Some(now);
        now
    }

    fn resolve_sentinels(&mut self, data: &mut Value) {
        let now = self.tick();
        let stamp = format_timestamp(now);
        if let Some(map) = data.as_object_mut() {
            for value in map.values_mut() {
                if value.as_str() == Some(SERVER_TIMESTAMP_SENTINEL) {
                    *value = Value::String(stamp.clone());
                }
            }
        }
    }
}

/// In-memory [`DocumentStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Field comparison for order-by. Timestamps are stored as RFC 3339 strings;
/// parse-aware comparison keeps mixed precision values in chronological order.
fn value_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => {
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(tx), Ok(ty)) => tx.cmp(&ty),
                _ => x.cmp(y),
            }
        }
        _ => Ordering::Equal,
    }
}

fn apply_op(map: &mut serde_json::Map<String, Value>, op: FieldOp, now: &str) {
    match op {
        FieldOp::Set { field, value } => {
            map.insert(field, value);
        }
        FieldOp::Increment { field, by } => {
            let current = map.get(&field).and_then(Value::as_i64).unwrap_or(0);
            map.insert(field, Value::from(current + by));
        }
        FieldOp::ArrayUnion { field, value } => {
            let entry = map
                .entry(field)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = entry {
                if !items.contains(&value) {
                    items.push(value);
                }
            }
        }
        FieldOp::ArrayRemove { field, value } => {
            if let Some(Value::Array(items)) = map.get_mut(&field) {
                items.retain(|item| item != &value);
            }
        }
        FieldOp::ServerTimestamp { field } => {
            map.insert(field, Value::String(now.to_string()));
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str, id: &str) -> StoreResult<Option<Value>> {
        let inner = self.inner.read().await;
        Ok(inner
            .collections
            .get(path)
            .and_then(|col| col.docs.get(id))
            .cloned())
    }

    async fn query(&self, path: &str, query: Query) -> StoreResult<Vec<Document>> {
        let inner = self.inner.read().await;
        let Some(col) = inner.collections.get(path) else {
            return Ok(Vec::new());
        };

        let mut results: Vec<Document> = col
            .order
            .iter()
            .filter_map(|id| col.docs.get(id).map(|data| (id, data)))
            .filter(|(_, data)| {
                query
                    .filters
                    .iter()
                    .all(|f| data.get(&f.field) == Some(&f.value))
            })
            .map(|(id, data)| Document {
                id: id.clone(),
                data: data.clone(),
            })
            .collect();

        if let Some((field, direction)) = &query.order_by {
            // stable: preserves document order among equal keys
            results.sort_by(|a, b| {
                let ord = value_cmp(
                    a.data.get(field).unwrap_or(&Value::Null),
                    b.data.get(field).unwrap_or(&Value::Null),
                );
                match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            results.truncate(limit);
        }
        Ok(results)
    }

    async fn insert(&self, path: &str, mut data: Value) -> StoreResult<String> {
        let mut inner = self.inner.write().await;
        inner.resolve_sentinels(&mut data);
        let id = Uuid::new_v4().to_string();
        inner
            .collections
            .entry(path.to_string())
            .or_default()
            .put(id.clone(), data);
        Ok(id)
    }

    async fn set(&self, path: &str, id: &str, mut data: Value) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.resolve_sentinels(&mut data);
        inner
            .collections
            .entry(path.to_string())
            .or_default()
            .put(id.to_string(), data);
        Ok(())
    }

    async fn create(&self, path: &str, id: &str, mut data: Value) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.resolve_sentinels(&mut data);
        let col = inner.collections.entry(path.to_string()).or_default();
        if col.docs.contains_key(id) {
            return Err(StoreError::Conflict(format!("{path}/{id}")));
        }
        col.put(id.to_string(), data);
        Ok(())
    }

    async fn update(&self, path: &str, id: &str, ops: Vec<FieldOp>) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let now = format_timestamp(inner.tick());
        let doc = inner
            .collections
            .get_mut(path)
            .and_then(|col| col.docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(format!("{path}/{id}")))?;
        let map = doc
            .as_object_mut()
            .ok_or_else(|| StoreError::Backend(format!("{path}/{id} is not an object")))?;
        for op in ops {
            apply_op(map, op, &now);
        }
        Ok(())
    }

    async fn delete(&self, path: &str, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(col) = inner.collections.get_mut(path) {
            col.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn keyed_create_conflicts_on_duplicate() {
        let store = MemoryStore::new();
        store
            .create("users", "u1", json!({"username": "ada"}))
            .await
            .unwrap();
        let err = store
            .create("users", "u1", json!({"username": "ada"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn set_is_an_upsert() {
        let store = MemoryStore::new();
        store.set("users", "u1", json!({"v": 1})).await.unwrap();
        store.set("users", "u1", json!({"v": 2})).await.unwrap();
        let doc = store.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(doc["v"], 2);
        let all = store.query("users", Query::new()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn query_filters_orders_and_limits() {
        let store = MemoryStore::new();
        for (name, rank) in [("a", 3), ("b", 1), ("c", 2), ("d", 2)] {
            store
                .insert("items", json!({"name": name, "rank": rank, "kind": "x"}))
                .await
                .unwrap();
        }
        store
            .insert("items", json!({"name": "e", "rank": 9, "kind": "y"}))
            .await
            .unwrap();

        let docs = store
            .query(
                "items",
                Query::new()
                    .filter("kind", "x")
                    .order_by_desc("rank")
                    .limit(3),
            )
            .await
            .unwrap();
        let names: Vec<&str> = docs
            .iter()
            .map(|d| d.data["name"].as_str().unwrap())
            .collect();
        // ties (c, d) keep insertion order
        assert_eq!(names, vec!["a", "c", "d"]);
    }

    #[tokio::test]
    async fn server_timestamps_never_run_backwards() {
        let store = MemoryStore::new();
        let mut stamps = Vec::new();
        for _ in 0..5 {
            let id = store
                .insert("posts", json!({"createdAt": crate::server_timestamp()}))
                .await
                .unwrap();
            let doc = store.get("posts", &id).await.unwrap().unwrap();
            stamps.push(doc["createdAt"].as_str().unwrap().to_string());
        }
        let mut sorted = stamps.clone();
        sorted.sort();
        assert_eq!(stamps, sorted);
    }

    #[tokio::test]
    async fn field_ops_apply_atomically_to_one_document() {
        let store = MemoryStore::new();
        store
            .set("posts", "p1", json!({"likesCount": 0, "likedBy": []}))
            .await
            .unwrap();
        store
            .update(
                "posts",
                "p1",
                vec![
                    FieldOp::increment("likesCount", 1),
                    FieldOp::array_union("likedBy", "u1"),
                ],
            )
            .await
            .unwrap();
        // repeated union is a no-op on membership
        store
            .update("posts", "p1", vec![FieldOp::array_union("likedBy", "u1")])
            .await
            .unwrap();
        let doc = store.get("posts", "p1").await.unwrap().unwrap();
        assert_eq!(doc["likesCount"], 1);
        assert_eq!(doc["likedBy"], json!(["u1"]));

        store
            .update(
                "posts",
                "p1",
                vec![
                    FieldOp::increment("likesCount", -1),
                    FieldOp::array_remove("likedBy", "u1"),
                ],
            )
            .await
            .unwrap();
        let doc = store.get("posts", "p1").await.unwrap().unwrap();
        assert_eq!(doc["likesCount"], 0);
        assert_eq!(doc["likedBy"], json!([]));
    }

    #[tokio::test]
    async fn update_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update("posts", "missing", vec![FieldOp::increment("n", 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        store.set("users", "u1", json!({})).await.unwrap();
        store.delete("users", "u1").await.unwrap();
        store.delete("users", "u1").await.unwrap();
        assert!(store.get("users", "u1").await.unwrap().is_none());
    }
}
