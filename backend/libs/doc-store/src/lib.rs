//! Document store client abstraction
//!
//! Models the hosted document database the application delegates persistence
//! to: named collections (and subcollections, addressed by slash-separated
//! paths such as `users/{uid}/friends`) holding schemaless JSON documents.
//! Supports get-by-id, equality queries with ordering and limit, keyed and
//! auto-id inserts, partial updates with field transforms, and deletes.
//! No multi-document transactions are offered; callers that need multi-write
//! sequences own the partial-failure handling.
//!
//! Two implementations:
//! - [`MemoryStore`]: in-process store used by tests and local development.
//! - [`RestStore`]: HTTP client for a hosted document-store endpoint.

pub mod error;
pub mod memory;
pub mod rest;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use rest::RestStore;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel value for write-time server-assigned timestamps.
///
/// Any top-level field set to this value in an inserted document is replaced
/// by the store with its write-time clock (RFC 3339, UTC).
pub const SERVER_TIMESTAMP_SENTINEL: &str = "$serverTimestamp";

/// Returns the sentinel to place in a document field that should receive the
/// store's write-time timestamp.
pub fn server_timestamp() -> Value {
    Value::String(SERVER_TIMESTAMP_SENTINEL.to_string())
}

/// A stored document: its store-assigned (or caller-assigned) id plus body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// Sort direction for [`Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// Equality filter on a top-level document field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

/// A query over one collection: equality filters, a single optional order-by,
/// and an optional result limit. Ties under order-by are broken by
/// store-assigned document order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn order_by_asc(mut self, field: &str) -> Self {
        self.order_by = Some((field.to_string(), Direction::Asc));
        self
    }

    pub fn order_by_desc(mut self, field: &str) -> Self {
        self.order_by = Some((field.to_string(), Direction::Desc));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

/// Partial-update operation on a single top-level field.
///
/// `Increment`, `ArrayUnion` and `ArrayRemove` are applied atomically by the
/// store with respect to other writers of the same document.
/// `ServerTimestamp` resolves to the store's write-time clock, which is
/// monotonically non-decreasing per store instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum FieldOp {
    Set { field: String, value: Value },
    Increment { field: String, by: i64 },
    ArrayUnion { field: String, value: Value },
    ArrayRemove { field: String, value: Value },
    ServerTimestamp { field: String },
}

impl FieldOp {
    pub fn set(field: &str, value: impl Into<Value>) -> Self {
        FieldOp::Set {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn increment(field: &str, by: i64) -> Self {
        FieldOp::Increment {
            field: field.to_string(),
            by,
        }
    }

    pub fn array_union(field: &str, value: impl Into<Value>) -> Self {
        FieldOp::ArrayUnion {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn array_remove(field: &str, value: impl Into<Value>) -> Self {
        FieldOp::ArrayRemove {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn server_timestamp(field: &str) -> Self {
        FieldOp::ServerTimestamp {
            field: field.to_string(),
        }
    }
}

/// Client interface to the document store.
///
/// `path` is a slash-separated collection path, e.g. `posts` or
/// `users/{uid}/friendRequests`.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id. `Ok(None)` when absent.
    async fn get(&self, path: &str, id: &str) -> StoreResult<Option<Value>>;

    /// Run a query against one collection.
    async fn query(&self, path: &str, query: Query) -> StoreResult<Vec<Document>>;

    /// Insert with a store-assigned id; returns the new id.
    async fn insert(&self, path: &str, data: Value) -> StoreResult<String>;

    /// Keyed upsert: writes the document under `id`, replacing any existing
    /// document with the same key.
    async fn set(&self, path: &str, id: &str, data: Value) -> StoreResult<()>;

    /// Keyed insert: fails with [`StoreError::Conflict`] if `id` exists.
    async fn create(&self, path: &str, id: &str, data: Value) -> StoreResult<()>;

    /// Partial update; fails with [`StoreError::NotFound`] if absent.
    async fn update(&self, path: &str, id: &str, ops: Vec<FieldOp>) -> StoreResult<()>;

    /// Delete by id. Deleting an absent document is not an error.
    async fn delete(&self, path: &str, id: &str) -> StoreResult<()>;
}
