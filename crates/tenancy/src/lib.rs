//! `opsdesk-tenancy`: tenant lifecycle: suspension, cascade delete, and
//! administrative edits.
//!
//! Multi-document changes that must look consistent (suspend/reactivate) go
//! through one atomic `WriteBatch`. Cascade deletes are planned up front and
//! committed in bounded batches, tenant record last.

pub mod cascade;
pub mod config;
pub mod error;
pub mod manager;

pub use cascade::{CascadeInventory, CascadePlan, DocRef};
pub use config::LifecycleConfig;
pub use error::{LifecycleError, LifecycleResult};
pub use manager::{CascadeReport, NewTenant, TenantLifecycleManager};
