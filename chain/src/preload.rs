use std::fmt;
use std::sync::Arc;

use crate::block_record::BlockRecord;
use crate::network_snapshot::NetworkSnapshot;
use crate::rpc::ChainRpc;

/// Where a boot load currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIs)]
pub enum LoadStatus {
    Pending,
    Success,
    Failed,
}

/// Everything the splash screen preloads for the main view.
///
/// Read-only once settled. Clones share the connection handle; the main view
/// holds the last reference and releases the connection by dropping it.
#[derive(Clone)]
pub struct PreloadResult {
    pub status: LoadStatus,
    pub snapshot: NetworkSnapshot,
    pub blocks: Vec<BlockRecord>,
    pub connection: Option<Arc<dyn ChainRpc>>,
}

impl PreloadResult {
    /// The terminal result for a load whose connection attempt failed.
    pub fn disconnected() -> Self {
        Self {
            status: LoadStatus::Failed,
            snapshot: NetworkSnapshot::disconnected(),
            blocks: Vec::new(),
            connection: None,
        }
    }
}

impl fmt::Debug for PreloadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreloadResult")
            .field("status", &self.status)
            .field("snapshot", &self.snapshot)
            .field("blocks", &self.blocks.len())
            .field("connection", &self.connection.is_some())
            .finish()
    }
}

impl PartialEq for PreloadResult {
    fn eq(&self, other: &Self) -> bool {
        let same_connection = match (&self.connection, &other.connection) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        self.status == other.status
            && self.snapshot == other.snapshot
            && self.blocks == other.blocks
            && same_connection
    }
}
