//! Domain types and pure logic shared by every steamwatch crate.
//!
//! This crate has no internal dependencies and performs no I/O, so it can
//! be used by the repository layer, the polling worker, and the HTTP API
//! alike.

pub mod error;
pub mod persona_state;
pub mod search;
pub mod snowflake;
pub mod steam_id;
pub mod types;
