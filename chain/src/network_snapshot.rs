use serde::Deserialize;
use serde::Serialize;

use crate::config;

/// Aggregate network counters at one point in time.
///
/// Always fully populated: a failed sub-fetch substitutes a fallback value
/// rather than leaving a hole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSnapshot {
    pub total_blocks: u64,
    pub total_transactions: u64,
    pub active_validators: u32,
    pub network_hashrate: f64,
    pub average_block_time: f64,
}

impl NetworkSnapshot {
    /// The deterministic snapshot used when no connection could be established.
    pub fn disconnected() -> Self {
        Self {
            total_blocks: 0,
            total_transactions: 0,
            active_validators: 0,
            network_hashrate: 0.0,
            average_block_time: config::DEFAULT_BLOCK_TIME_SECS,
        }
    }
}
