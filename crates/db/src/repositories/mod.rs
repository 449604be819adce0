//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or any `PgExecutor` when the caller owns the
//! transaction) as the first argument.

pub mod audit_log_repo;
pub mod player_event_repo;
pub mod player_repo;

pub use audit_log_repo::AuditLogRepo;
pub use player_event_repo::PlayerEventRepo;
pub use player_repo::PlayerRepo;
