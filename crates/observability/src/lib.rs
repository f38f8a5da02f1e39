//! Process-wide tracing setup shared by the opsdesk binaries.

/// Tracing subscriber configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::LogFormat;
