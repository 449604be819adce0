//! Row models and DTOs for the steamwatch tables.

pub mod audit_log;
pub mod player;
pub mod player_event;
