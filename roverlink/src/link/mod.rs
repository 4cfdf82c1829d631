//! In-memory transports for examples and tests.

mod audit;
mod nop;

pub use audit::{Audit, AuditHandle, AuditOption};
pub use nop::Nop;
