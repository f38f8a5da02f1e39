use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{Map, Value};
use tracing::debug;

use super::{IdentityStore, MAX_BATCH_OPS, StoreError, StoredDocument, WriteBatch, WriteOp};

type Collections = HashMap<String, BTreeMap<String, Value>>;

/// In-memory identity store.
///
/// Intended for tests/dev and the operator console. Documents are kept per
/// collection in key order, so queries return matches in ascending key order.
/// Commits are applied to a working copy and swapped in only when every
/// operation succeeded.
#[derive(Debug)]
pub struct InMemoryIdentityStore {
    collections: RwLock<Collections>,
    batch_limit: usize,
}

impl Default for InMemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            batch_limit: MAX_BATCH_OPS,
        }
    }

    /// Override the per-commit operation cap (tests use small caps).
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit.max(1);
        self
    }

    /// Load a `{ collection: { key: document } }` snapshot.
    pub fn from_snapshot(snapshot: Value) -> Result<Self, StoreError> {
        let Value::Object(root) = snapshot else {
            return Err(snapshot_error("", "snapshot root must be an object"));
        };

        let mut collections = Collections::new();
        for (name, docs) in root {
            let Value::Object(docs) = docs else {
                return Err(snapshot_error(&name, "collection must be an object"));
            };
            let entry = collections.entry(name).or_default();
            for (key, doc) in docs {
                entry.insert(key, doc);
            }
        }

        Ok(Self {
            collections: RwLock::new(collections),
            batch_limit: MAX_BATCH_OPS,
        })
    }

    /// Export every collection as a `{ collection: { key: document } }` value.
    pub fn snapshot(&self) -> Result<Value, StoreError> {
        let collections = self.read()?;
        let mut root = Map::new();
        for (name, docs) in collections.iter() {
            let docs: Map<String, Value> =
                docs.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            root.insert(name.clone(), Value::Object(docs));
        }
        Ok(Value::Object(root))
    }

    /// Seed a document without going through the async API.
    pub fn insert(&self, collection: &str, key: &str, document: Value) -> Result<(), StoreError> {
        self.write()?
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), document);
        Ok(())
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|c| c.get(collection).map(BTreeMap::len).unwrap_or(0))
            .unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, StoreError> {
        self.collections
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, StoreError> {
        self.collections
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

fn snapshot_error(collection: &str, message: &str) -> StoreError {
    StoreError::Decode {
        collection: collection.to_string(),
        key: String::new(),
        message: message.to_string(),
    }
}

fn apply(collections: &mut Collections, op: WriteOp) -> Result<(), StoreError> {
    match op {
        WriteOp::Set {
            collection,
            key,
            document,
        } => {
            collections.entry(collection).or_default().insert(key, document);
        }
        WriteOp::Update {
            collection,
            key,
            fields,
        } => {
            let Value::Object(fields) = fields else {
                return Err(StoreError::Decode {
                    collection,
                    key,
                    message: "update fields must be an object".to_string(),
                });
            };
            let doc = collections
                .get_mut(&collection)
                .and_then(|docs| docs.get_mut(&key));
            match doc {
                Some(Value::Object(existing)) => {
                    for (field, value) in fields {
                        existing.insert(field, value);
                    }
                }
                Some(_) => {
                    return Err(StoreError::Decode {
                        collection,
                        key,
                        message: "stored document is not an object".to_string(),
                    });
                }
                None => return Err(StoreError::MissingDocument { collection, key }),
            }
        }
        WriteOp::Delete { collection, key } => {
            if let Some(docs) = collections.get_mut(&collection) {
                docs.remove(&key);
            }
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn get_by_key(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.read()?;
        let Some(docs) = collections.get(collection) else {
            return Ok(vec![]);
        };

        Ok(docs
            .iter()
            .filter(|(_, doc)| doc.get(field) == Some(value))
            .map(|(key, doc)| StoredDocument {
                key: key.clone(),
                data: doc.clone(),
            })
            .collect())
    }

    async fn put(&self, collection: &str, key: &str, document: Value) -> Result<(), StoreError> {
        let mut collections = self.write()?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), document);
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        let mut collections = self.write()?;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(key);
        }
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.len() > self.batch_limit {
            return Err(StoreError::BatchTooLarge {
                ops: batch.len(),
                limit: self.batch_limit,
            });
        }
        if batch.is_empty() {
            return Ok(());
        }

        let ops = batch.len();
        let mut collections = self.write()?;
        let mut working = collections.clone();
        for op in batch.into_ops() {
            apply(&mut working, op)?;
        }
        *collections = working;
        debug!(ops, "in-memory batch committed");
        Ok(())
    }
}
