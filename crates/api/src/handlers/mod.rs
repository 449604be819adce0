pub mod audit_logs;
pub mod player_events;
pub mod players;
