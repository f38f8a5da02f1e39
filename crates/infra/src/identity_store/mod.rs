//! Document store boundary for identity and tenant records.
//!
//! The store exposes keyed reads, single-field equality queries, upserts,
//! deletes, and atomic multi-document batch commits. It is treated as a
//! transactional key/value service with secondary lookups; no indexing or
//! query planning lives here.

pub mod in_memory;
pub mod typed;

#[cfg(any(test, feature = "test-util"))]
pub mod faulty;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

pub use in_memory::InMemoryIdentityStore;
pub use typed::{IdentityStoreExt, Keyed};

#[cfg(any(test, feature = "test-util"))]
pub use faulty::FaultyStore;

/// Maximum number of write operations a single atomic commit may carry.
pub const MAX_BATCH_OPS: usize = 500;

/// A document together with the key it is stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub key: String,
    pub data: Value,
}

/// One write operation inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Full-document replace (upsert).
    Set {
        collection: String,
        key: String,
        document: Value,
    },
    /// Merge top-level fields into an existing document.
    Update {
        collection: String,
        key: String,
        fields: Value,
    },
    /// Remove a document; removing an absent document is a no-op.
    Delete { collection: String, key: String },
}

impl WriteOp {
    pub fn collection(&self) -> &str {
        match self {
            WriteOp::Set { collection, .. }
            | WriteOp::Update { collection, .. }
            | WriteOp::Delete { collection, .. } => collection,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            WriteOp::Set { key, .. } | WriteOp::Update { key, .. } | WriteOp::Delete { key, .. } => {
                key
            }
        }
    }
}

/// Accumulated writes applied atomically by [`IdentityStore::commit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, collection: &str, key: &str, document: Value) -> &mut Self {
        self.ops.push(WriteOp::Set {
            collection: collection.to_string(),
            key: key.to_string(),
            document,
        });
        self
    }

    /// `fields` must be a JSON object; it is merged into the stored document.
    pub fn update(&mut self, collection: &str, key: &str, fields: Value) -> &mut Self {
        self.ops.push(WriteOp::Update {
            collection: collection.to_string(),
            key: key.to_string(),
            fields,
        });
        self
    }

    pub fn delete(&mut self, collection: &str, key: &str) -> &mut Self {
        self.ops.push(WriteOp::Delete {
            collection: collection.to_string(),
            key: key.to_string(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Identity store operation error.
///
/// These are infrastructure failures (connectivity, permissions, limits,
/// malformed documents) as opposed to domain errors. Callers must never treat
/// them as a credential mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("batch of {ops} operations exceeds the commit limit of {limit}")]
    BatchTooLarge { ops: usize, limit: usize },

    #[error("document {collection}/{key} does not exist")]
    MissingDocument { collection: String, key: String },

    #[error("invalid document {collection}/{key}: {message}")]
    Decode {
        collection: String,
        key: String,
        message: String,
    },
}

/// Transactional document store holding tenants, units and identities.
///
/// ## Semantics
///
/// - `get_by_key` returns `None` for absent documents (absence is not an error)
/// - `query_by_field` matches top-level fields by JSON equality; result order
///   is stable per implementation but callers only rely on it for
///   first-match-wins scans
/// - `put` replaces the whole document
/// - `delete` of an absent document succeeds
/// - `commit` applies every operation of the batch or none of them, and
///   rejects batches larger than the implementation's per-commit cap
#[async_trait::async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get_by_key(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError>;

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    async fn put(&self, collection: &str, key: &str, document: Value) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError>;

    /// Start a new batch. Operations accumulate locally until `commit`.
    fn batch(&self) -> WriteBatch {
        WriteBatch::new()
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> IdentityStore for Arc<S>
where
    S: IdentityStore + ?Sized,
{
    async fn get_by_key(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get_by_key(collection, key).await
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        (**self).query_by_field(collection, field, value).await
    }

    async fn put(&self, collection: &str, key: &str, document: Value) -> Result<(), StoreError> {
        (**self).put(collection, key, document).await
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        (**self).delete(collection, key).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        (**self).commit(batch).await
    }
}
