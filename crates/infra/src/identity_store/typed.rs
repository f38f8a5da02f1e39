//! Typed record access on top of the untyped document contract.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use opsdesk_core::Entity;

use super::{IdentityStore, StoreError};

/// A decoded record together with its document key.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyed<T> {
    pub key: String,
    pub record: T,
}

fn decode<T: DeserializeOwned>(collection: &str, key: &str, doc: Value) -> Result<T, StoreError> {
    serde_json::from_value(doc).map_err(|e| StoreError::Decode {
        collection: collection.to_string(),
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn encode<T: Serialize>(collection: &str, key: &str, record: &T) -> Result<Value, StoreError> {
    serde_json::to_value(record).map_err(|e| StoreError::Decode {
        collection: collection.to_string(),
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Serde-backed helpers available on every [`IdentityStore`].
#[async_trait::async_trait]
pub trait IdentityStoreExt: IdentityStore {
    async fn get_record<T>(&self, collection: &str, key: &str) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get_by_key(collection, key).await? {
            Some(doc) => decode(collection, key, doc).map(Some),
            None => Ok(None),
        }
    }

    async fn query_records<T>(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Keyed<T>>, StoreError>
    where
        T: DeserializeOwned + Send,
    {
        self.query_by_field(collection, field, value)
            .await?
            .into_iter()
            .map(|doc| -> Result<Keyed<T>, StoreError> {
                let record = decode(collection, &doc.key, doc.data)?;
                Ok(Keyed {
                    key: doc.key,
                    record,
                })
            })
            .collect()
    }

    async fn put_record<T>(&self, collection: &str, key: &str, record: &T) -> Result<(), StoreError>
    where
        T: Serialize + Sync,
    {
        let doc = encode(collection, key, record)?;
        self.put(collection, key, doc).await
    }

    /// Upsert an entity under its own storage key.
    async fn put_entity<E>(&self, collection: &str, entity: &E) -> Result<(), StoreError>
    where
        E: Entity + Serialize + Sync,
    {
        let key = entity.storage_key();
        self.put_record(collection, &key, entity).await
    }
}

impl<S> IdentityStoreExt for S where S: IdentityStore + ?Sized {}
