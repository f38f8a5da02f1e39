//! Collection names and indexed field names used by the tenant model.

pub const COMPANIES: &str = "companies";
pub const STORES: &str = "stores";
pub const STORE_CONFIGS: &str = "storeConfigs";
pub const COMPANY_USERS: &str = "companyUsers";
pub const SUPPORT_AGENTS: &str = "supportAgents";
pub const SUPER_ADMINS: &str = "superAdmins";
pub const TASKS: &str = "tasks";
pub const FEEDBACK: &str = "feedback";

/// Owning-tenant field on units and tenant members.
pub const FIELD_COMPANY_ID: &str = "companyId";
/// Owning-unit field on tasks and feedback.
pub const FIELD_STORE_ID: &str = "storeId";

pub const FIELD_IS_SUSPENDED: &str = "isSuspended";
pub const FIELD_IS_BLOCKED: &str = "isBlocked";
