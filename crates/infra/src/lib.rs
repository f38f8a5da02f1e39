//! Infrastructure layer: the identity document store boundary.
//!
//! The store is an external collaborator; this crate only defines the
//! contract consumed by the resolver and lifecycle manager, plus an
//! in-memory implementation for tests/dev and the operator console.

pub mod collections;
pub mod identity_store;

pub use identity_store::{
    IdentityStore, IdentityStoreExt, InMemoryIdentityStore, Keyed, MAX_BATCH_OPS, StoreError,
    StoredDocument, WriteBatch, WriteOp,
};

#[cfg(any(test, feature = "test-util"))]
pub use identity_store::FaultyStore;
