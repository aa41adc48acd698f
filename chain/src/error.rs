use thiserror::Error;

/// Failures talking to the remote chain node.
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    #[error("failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("rpc call {method} failed: {reason}")]
    Rpc { method: &'static str, reason: String },

    #[error("block {0} not found")]
    MissingBlock(String),

    #[error("failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },
}
