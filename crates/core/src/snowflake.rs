//! Snowflake id generation.
//!
//! Ids are 63-bit positive integers laid out as
//!
//! ```text
//! | 41 bits: ms since EPOCH_MS | 10 bits: node id | 12 bits: sequence |
//! ```
//!
//! so they sort roughly by creation time and never collide between
//! processes configured with distinct node ids.

use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use crate::error::CoreError;

/// Custom epoch in milliseconds (2010-11-04T01:42:54.657Z).
pub const EPOCH_MS: i64 = 1_288_834_974_657;

const NODE_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;

/// Largest valid node id (1023).
pub const MAX_NODE_ID: i64 = (1 << NODE_BITS) - 1;

const MAX_SEQUENCE: i64 = (1 << SEQUENCE_BITS) - 1;
const NODE_SHIFT: u32 = SEQUENCE_BITS;
const TIME_SHIFT: u32 = NODE_BITS + SEQUENCE_BITS;

/// Thread-safe snowflake generator for a single node.
#[derive(Debug)]
pub struct Snowflake {
    node: i64,
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    last_ms: i64,
    sequence: i64,
}

impl Snowflake {
    /// Create a generator for `node`, which must be in `0..=1023`.
    pub fn new(node: i64) -> Result<Self, CoreError> {
        if !(0..=MAX_NODE_ID).contains(&node) {
            return Err(CoreError::Validation(format!(
                "invalid snowflake node id: {node}, must be between 0 and {MAX_NODE_ID}"
            )));
        }
        Ok(Self {
            node,
            state: Mutex::new(State::default()),
        })
    }

    /// Generate the next id. Never fails.
    ///
    /// Ids from one generator are strictly increasing. If the wall clock
    /// steps backwards the last observed millisecond is reused.
    pub fn generate(&self) -> i64 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let mut now = current_millis().max(state.last_ms);
        if now == state.last_ms {
            state.sequence = (state.sequence + 1) & MAX_SEQUENCE;
            if state.sequence == 0 {
                // Sequence exhausted for this millisecond.
                while now <= state.last_ms {
                    std::hint::spin_loop();
                    now = current_millis();
                }
            }
        } else {
            state.sequence = 0;
        }
        state.last_ms = now;

        ((now - EPOCH_MS) << TIME_SHIFT) | (self.node << NODE_SHIFT) | state.sequence
    }

    /// Split an id into `(unix_ms, node, sequence)`.
    pub fn decompose(id: i64) -> (i64, i64, i64) {
        let ms = (id >> TIME_SHIFT) + EPOCH_MS;
        let node = (id >> NODE_SHIFT) & MAX_NODE_ID;
        let sequence = id & MAX_SEQUENCE;
        (ms, node, sequence)
    }
}

fn current_millis() -> i64 {
    Utc::now().timestamp_millis()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn rejects_out_of_range_node_ids() {
        assert_matches!(Snowflake::new(-1), Err(CoreError::Validation(_)));
        assert_matches!(Snowflake::new(1024), Err(CoreError::Validation(_)));
        assert!(Snowflake::new(0).is_ok());
        assert!(Snowflake::new(1023).is_ok());
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let ids = Snowflake::new(7).unwrap();
        let mut prev = ids.generate();
        for _ in 0..10_000 {
            let next = ids.generate();
            assert!(next > prev, "{next} should be greater than {prev}");
            prev = next;
        }
    }

    #[test]
    fn ids_are_unique_across_threads() {
        let ids = Arc::new(Snowflake::new(1).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..5_000).map(|_| ids.generate()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 20_000);
    }

    #[test]
    fn decompose_recovers_node_and_time() {
        let before = Utc::now().timestamp_millis();
        let id = Snowflake::new(513).unwrap().generate();
        let after = Utc::now().timestamp_millis();

        let (ms, node, _seq) = Snowflake::decompose(id);
        assert_eq!(node, 513);
        assert!(ms >= before && ms <= after);
        assert!(id > 0);
    }

    #[test]
    fn distinct_nodes_never_collide() {
        let a = Snowflake::new(1).unwrap();
        let b = Snowflake::new(2).unwrap();
        let ids_a: HashSet<_> = (0..1_000).map(|_| a.generate()).collect();
        assert!((0..1_000).all(|_| !ids_a.contains(&b.generate())));
    }
}
