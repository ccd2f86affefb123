

pub mod models;
pub mod sink;

pub use models::{AuditAction, AuditRecord};
pub use sink::{AuditSink, JsonlAuditSink, MemoryAuditSink, TracingAuditSink, dispatch};
