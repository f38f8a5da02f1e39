//! Records that live under a stable document key.

/// A persisted record with an identity of its own.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Key of the record within its collection. Usernames are normalized
    /// here so lookups by login input find the record.
    fn storage_key(&self) -> String;
}
