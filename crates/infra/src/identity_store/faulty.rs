//! Failure-injecting store wrapper for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde_json::Value;

use super::{IdentityStore, StoreError, StoredDocument, WriteBatch};

/// Wraps a store and fails selected operations with [`StoreError::Unavailable`].
#[derive(Debug)]
pub struct FaultyStore<S> {
    inner: S,
    fail_reads: AtomicBool,
    fail_commit_at: AtomicUsize,
    commits: AtomicUsize,
}

impl<S> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_commit_at: AtomicUsize::new(0),
            commits: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Make every read (get/query) fail until reset.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Fail the `n`-th commit attempt (1-based) counted from now; 0 disables.
    pub fn fail_commit_number(&self, n: usize) {
        self.commits.store(0, Ordering::SeqCst);
        self.fail_commit_at.store(n, Ordering::SeqCst);
    }

    /// Number of commit attempts since the last `fail_commit_number`.
    pub fn commit_attempts(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<S: IdentityStore> IdentityStore for FaultyStore<S> {
    async fn get_by_key(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        self.check_reads()?;
        self.inner.get_by_key(collection, key).await
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.check_reads()?;
        self.inner.query_by_field(collection, field, value).await
    }

    async fn put(&self, collection: &str, key: &str, document: Value) -> Result<(), StoreError> {
        self.inner.put(collection, key, document).await
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.inner.delete(collection, key).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let attempt = self.commits.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt == self.fail_commit_at.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "injected failure on commit {attempt}"
            )));
        }
        self.inner.commit(batch).await
    }
}
