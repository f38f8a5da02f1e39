//! `opsdesk-core`: tenant model building blocks.
//!
//! This crate contains **pure domain** primitives (no storage or hashing).
//! Records mirror the documents kept in the identity store; field names are
//! serialized in the store's camelCase convention.

pub mod entity;
pub mod error;
pub mod id;
pub mod model;
pub mod scope;
pub mod validation;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{TenantCode, UnitId, Username};
pub use model::{
    MemberRole, SuperAdminAgent, SupportAgent, TeamMember, Tenant, TenantMember, Unit, UnitConfig,
};
pub use scope::AdminScope;
