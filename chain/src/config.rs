//! Fixed, process-wide configuration.

use std::time::Duration;

/// Public websocket endpoint of the Entropy test network.
pub const ENTROPY_ENDPOINT: &str = "wss://testnet.entropy.xyz";

/// Upper bound on blocks fetched at boot and kept in the recent-blocks view.
pub const MAX_BLOCKS_DISPLAY: usize = 20;

/// How often the home screen re-polls the chain head.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Target block time of the network, used whenever no measured value exists.
pub const DEFAULT_BLOCK_TIME_SECS: f64 = 6.0;

/// The endpoint to connect to, read once at process start.
pub fn endpoint() -> String {
    std::env::var("ENTROPY_ENDPOINT")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| ENTROPY_ENDPOINT.to_string())
}
