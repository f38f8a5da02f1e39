//! Cascade-delete planning.
//!
//! A plan is an ordered list of document deletions computed before anything
//! is written. Dependents come leaf-first (tasks and feedback, unit configs,
//! tenant members, units); the tenant record is kept apart and deleted only
//! once every dependent batch has committed.

use serde::Serialize;

use opsdesk_core::TenantCode;
use opsdesk_infra::WriteBatch;
use opsdesk_infra::collections::{
    COMPANIES, COMPANY_USERS, FEEDBACK, STORE_CONFIGS, STORES, TASKS,
};

/// One document to delete.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocRef {
    pub collection: &'static str,
    pub key: String,
}

impl DocRef {
    pub fn new(collection: &'static str, key: impl Into<String>) -> Self {
        Self {
            collection,
            key: key.into(),
        }
    }
}

/// Keys of every record a tenant owns, as read from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeInventory {
    pub units: Vec<String>,
    pub unit_configs: Vec<String>,
    pub tasks: Vec<String>,
    pub feedback: Vec<String>,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadePlan {
    pub tenant: TenantCode,
    dependents: Vec<DocRef>,
}

impl CascadePlan {
    /// Order an inventory into a deletion plan. Pure.
    pub fn build(tenant: TenantCode, inventory: CascadeInventory) -> Self {
        let CascadeInventory {
            units,
            unit_configs,
            tasks,
            feedback,
            members,
        } = inventory;

        let dependents = tasks
            .into_iter()
            .map(|k| DocRef::new(TASKS, k))
            .chain(feedback.into_iter().map(|k| DocRef::new(FEEDBACK, k)))
            .chain(unit_configs.into_iter().map(|k| DocRef::new(STORE_CONFIGS, k)))
            .chain(members.into_iter().map(|k| DocRef::new(COMPANY_USERS, k)))
            .chain(units.into_iter().map(|k| DocRef::new(STORES, k)))
            .collect();

        Self { tenant, dependents }
    }

    pub fn dependents(&self) -> &[DocRef] {
        &self.dependents
    }

    /// The final deletion, issued alone after all dependents.
    pub fn tenant_doc(&self) -> DocRef {
        DocRef::new(COMPANIES, self.tenant.as_str())
    }

    /// Total deletions including the tenant record.
    pub fn total_deletions(&self) -> usize {
        self.dependents.len() + 1
    }

    /// Dependent deletions partitioned into write batches of at most
    /// `batch_size` operations, in plan order.
    pub fn batches(&self, batch_size: usize) -> Vec<WriteBatch> {
        self.dependents
            .chunks(batch_size.max(1))
            .map(|chunk| {
                let mut batch = WriteBatch::new();
                for doc in chunk {
                    batch.delete(doc.collection, &doc.key);
                }
                batch
            })
            .collect()
    }
}
