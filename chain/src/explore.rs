//! Best-effort block retrieval shared by the boot preloader and the main view.

use rand::Rng;
use tracing::warn;

use crate::block_record::BlockRecord;
use crate::error::ChainError;
use crate::rpc::ChainRpc;

/// Fetches up to `limit` blocks walking backward from `head_number`.
///
/// Blocks are fetched strictly one at a time in descending number order, so
/// the newest blocks are never held up by an older one. A block whose lookup
/// fails is skipped, not retried; the walk continues with the next number.
pub async fn recent_blocks(client: &dyn ChainRpc, head_number: u64, limit: usize) -> Vec<BlockRecord> {
    let mut blocks = Vec::with_capacity(limit);
    for offset in 0..limit as u64 {
        let Some(number) = head_number.checked_sub(offset).filter(|n| *n > 0) else {
            break;
        };
        match fetch_block(client, number).await {
            Ok(block) => blocks.push(block),
            Err(e) => warn!(number, error = %e, "skipping block"),
        }
    }
    blocks
}

/// Jumps to a uniformly random historical block.
pub async fn surf_random_block(client: &dyn ChainRpc) -> Result<BlockRecord, ChainError> {
    let head = client.head().await?;
    let number = rand::rng().random_range(1..=head.number.max(1));
    fetch_block(client, number).await
}

async fn fetch_block(client: &dyn ChainRpc, number: u64) -> Result<BlockRecord, ChainError> {
    let hash = client
        .block_hash(number)
        .await?
        .ok_or_else(|| ChainError::MissingBlock(number.to_string()))?;
    let body = client.block_body(hash).await?;
    // The event counter is cosmetic; a failed read degrades to zero.
    let events_count = client.event_count(hash).await.unwrap_or_else(|e| {
        warn!(number, error = %e, "event count unavailable");
        0
    });
    Ok(BlockRecord {
        number,
        hash,
        parent_hash: Some(body.parent_hash),
        extrinsics_count: body.extrinsics_count,
        events_count,
    })
}
