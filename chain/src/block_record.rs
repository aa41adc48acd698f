use serde::Deserialize;
use serde::Serialize;

use crate::block_hash::BlockHash;

/// One row of the recent-blocks view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    pub number: u64,
    pub hash: BlockHash,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_hash: Option<BlockHash>,
    pub extrinsics_count: u32,
    pub events_count: u32,
}
