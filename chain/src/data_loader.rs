//! The boot-time preload coordinator.
//!
//! A process-wide, single-flight loader: concurrent callers of
//! [`DataLoader::load_all`] share one in-flight load (the in-flight future
//! itself is the synchronization primitive), and a settled result is cached
//! until [`DataLoader::clear`]. `load_all` never fails: every failure mode is
//! folded into the returned [`PreloadResult`].

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::OnceLock;

use futures::future::BoxFuture;
use futures::future::Shared;
use futures::FutureExt;
use rand::Rng;
use tracing::info;
use tracing::warn;

use crate::block_record::BlockRecord;
use crate::config;
use crate::explore;
use crate::network_snapshot::NetworkSnapshot;
use crate::preload::LoadStatus;
use crate::preload::PreloadResult;
use crate::rpc::ChainConnector;
use crate::rpc::ChainHead;
use crate::rpc::ChainRpc;
use crate::rpc::WsConnector;

type LoadFuture = Shared<BoxFuture<'static, PreloadResult>>;

#[derive(Default)]
struct LoaderState {
    settled: Option<PreloadResult>,
    in_flight: Option<LoadFuture>,
    /// Bumped by `clear` so an orphaned in-flight load cannot repopulate the cache.
    generation: u64,
}

/// See the module docs. Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct DataLoader {
    connector: Arc<dyn ChainConnector>,
    state: Arc<Mutex<LoaderState>>,
}

impl PartialEq for DataLoader {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

static LOADER: OnceLock<DataLoader> = OnceLock::new();

/// The process-wide loader, connected to the configured endpoint.
///
/// Created on first use; callers receive a handle to pass around explicitly.
pub fn data_loader() -> &'static DataLoader {
    LOADER.get_or_init(|| DataLoader::new(Arc::new(WsConnector::new(config::endpoint()))))
}

impl DataLoader {
    pub fn new(connector: Arc<dyn ChainConnector>) -> Self {
        Self {
            connector,
            state: Arc::new(Mutex::new(LoaderState::default())),
        }
    }

    /// Loads the boot snapshot, recent blocks, and connection handle.
    ///
    /// Returns the cached result if one has settled, joins the in-flight load
    /// if one exists, and otherwise starts a fresh load. Always settles.
    pub async fn load_all(&self) -> PreloadResult {
        let load = {
            let mut state = self.state.lock().expect("loader state poisoned");
            if let Some(result) = &state.settled {
                return result.clone();
            }
            match &state.in_flight {
                Some(load) => load.clone(),
                None => {
                    let connector = self.connector.clone();
                    let slot = self.state.clone();
                    let generation = state.generation;
                    let load: LoadFuture = async move {
                        let result = perform_load(connector).await;
                        let mut state = slot.lock().expect("loader state poisoned");
                        if state.generation == generation {
                            state.settled = Some(result.clone());
                            state.in_flight = None;
                        }
                        result
                    }
                    .boxed()
                    .shared();
                    state.in_flight = Some(load.clone());
                    load
                }
            }
        };
        load.await
    }

    /// Returns the settled result, if any, without triggering a load.
    pub fn settled(&self) -> Option<PreloadResult> {
        self.state.lock().expect("loader state poisoned").settled.clone()
    }

    /// Discards the cached result and the single-flight slot so the next
    /// `load_all` starts fresh. Awaiters of a load that is still in flight
    /// keep their future; it settles for them but no longer writes the cache.
    pub fn clear(&self) {
        let mut state = self.state.lock().expect("loader state poisoned");
        state.settled = None;
        state.in_flight = None;
        state.generation = state.generation.wrapping_add(1);
    }
}

async fn perform_load(connector: Arc<dyn ChainConnector>) -> PreloadResult {
    info!("starting boot preload");

    let client = match connector.connect().await {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "boot preload could not connect");
            return PreloadResult::disconnected();
        }
    };
    info!("connected, loading recent blocks and network stats");

    let head = match client.head().await {
        Ok(head) => Some(head),
        Err(e) => {
            warn!(error = %e, "chain head lookup failed");
            None
        }
    };

    let blocks = match head {
        Some(head) => {
            explore::recent_blocks(&*client, head.number, config::MAX_BLOCKS_DISPLAY).await
        }
        None => Vec::new(),
    };

    let snapshot = load_network_stats(&*client, head, &blocks).await;
    info!(
        blocks = blocks.len(),
        total_blocks = snapshot.total_blocks,
        "boot preload complete"
    );

    PreloadResult {
        status: LoadStatus::Success,
        snapshot,
        blocks,
        connection: Some(client),
    }
}

/// Builds the stats snapshot. Only the connection step is terminal; every
/// sub-fetch here degrades to a fallback value on failure.
async fn load_network_stats(
    client: &dyn ChainRpc,
    head: Option<ChainHead>,
    blocks: &[BlockRecord],
) -> NetworkSnapshot {
    let Some(head) = head else {
        return NetworkSnapshot::disconnected();
    };

    let active_validators = match client.validator_count().await {
        Ok(count) => count,
        Err(e) => {
            let placeholder = rand::rng().random_range(20..70);
            warn!(error = %e, placeholder, "validator set unavailable, substituting placeholder");
            placeholder
        }
    };

    NetworkSnapshot {
        total_blocks: head.number,
        total_transactions: blocks.iter().map(|b| u64::from(b.extrinsics_count)).sum(),
        active_validators,
        // No node surfaces a hashrate; the figure is a display placeholder.
        network_hashrate: f64::from(rand::rng().random_range(500..1500)),
        average_block_time: config::DEFAULT_BLOCK_TIME_SECS,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::block_hash::BlockHash;
    use crate::error::ChainError;
    use crate::rpc::BlockBody;

    fn hash_for(number: u64) -> BlockHash {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&number.to_le_bytes());
        BlockHash::from_bytes(bytes)
    }

    fn number_of(hash: BlockHash) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    fn rpc_err() -> ChainError {
        ChainError::Rpc {
            method: "test",
            reason: "injected".to_string(),
        }
    }

    #[derive(Default)]
    struct MockChain {
        head: u64,
        fail_head: bool,
        fail_validators: bool,
        fail_events: bool,
        fail_blocks: HashSet<u64>,
        fail_bodies: HashSet<u64>,
    }

    #[async_trait::async_trait]
    impl ChainRpc for MockChain {
        async fn head(&self) -> Result<ChainHead, ChainError> {
            if self.fail_head {
                return Err(rpc_err());
            }
            Ok(ChainHead {
                number: self.head,
                hash: hash_for(self.head),
            })
        }

        async fn block_hash(&self, number: u64) -> Result<Option<BlockHash>, ChainError> {
            if self.fail_blocks.contains(&number) {
                return Err(rpc_err());
            }
            Ok(Some(hash_for(number)))
        }

        async fn block_body(&self, hash: BlockHash) -> Result<BlockBody, ChainError> {
            let number = number_of(hash);
            if self.fail_bodies.contains(&number) {
                return Err(rpc_err());
            }
            Ok(BlockBody {
                parent_hash: hash_for(number.saturating_sub(1)),
                extrinsics_count: 2,
            })
        }

        async fn validator_count(&self) -> Result<u32, ChainError> {
            if self.fail_validators {
                return Err(rpc_err());
            }
            Ok(7)
        }

        async fn event_count(&self, _at: BlockHash) -> Result<u32, ChainError> {
            if self.fail_events {
                return Err(rpc_err());
            }
            Ok(5)
        }
    }

    struct MockConnector {
        chain: Arc<MockChain>,
        fail_connect: bool,
        delay: Duration,
        connects: AtomicUsize,
    }

    impl MockConnector {
        fn new(chain: MockChain) -> Arc<Self> {
            Arc::new(Self {
                chain: Arc::new(chain),
                fail_connect: false,
                delay: Duration::ZERO,
                connects: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                chain: Arc::new(MockChain::default()),
                fail_connect: true,
                delay: Duration::ZERO,
                connects: AtomicUsize::new(0),
            })
        }

        fn slow(chain: MockChain, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                chain: Arc::new(chain),
                fail_connect: false,
                delay,
                connects: AtomicUsize::new(0),
            })
        }

        fn connects(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ChainConnector for MockConnector {
        async fn connect(&self) -> Result<Arc<dyn ChainRpc>, ChainError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail_connect {
                return Err(ChainError::Connect {
                    endpoint: "test".to_string(),
                    reason: "connection refused".to_string(),
                });
            }
            Ok(self.chain.clone())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_load() {
        let connector = MockConnector::slow(
            MockChain {
                head: 30,
                ..MockChain::default()
            },
            Duration::from_millis(50),
        );
        let loader = DataLoader::new(connector.clone());

        let (a, b) = tokio::join!(loader.load_all(), loader.load_all());

        assert_eq!(connector.connects(), 1);
        assert_eq!(a, b);
        assert!(a.status.is_success());
    }

    #[tokio::test]
    async fn settled_result_is_memoized() {
        let connector = MockConnector::new(MockChain {
            head: 10,
            ..MockChain::default()
        });
        let loader = DataLoader::new(connector.clone());

        let first = loader.load_all().await;
        let second = loader.load_all().await;

        assert_eq!(connector.connects(), 1);
        assert_eq!(first, second);
        assert_eq!(loader.settled(), Some(first));
    }

    #[tokio::test]
    async fn clear_enables_a_fresh_load() {
        let connector = MockConnector::new(MockChain {
            head: 10,
            ..MockChain::default()
        });
        let loader = DataLoader::new(connector.clone());

        loader.load_all().await;
        loader.clear();
        assert_eq!(loader.settled(), None);
        loader.load_all().await;

        assert_eq!(connector.connects(), 2);
    }

    #[tokio::test]
    async fn connect_failure_yields_the_deterministic_fallback() {
        let connector = MockConnector::failing();
        let loader = DataLoader::new(connector.clone());

        let result = loader.load_all().await;

        assert!(result.status.is_failed());
        assert!(result.blocks.is_empty());
        assert!(result.connection.is_none());
        assert_eq!(result.snapshot.total_blocks, 0);
        assert_eq!(result.snapshot.total_transactions, 0);
        assert_eq!(result.snapshot.active_validators, 0);
        assert_eq!(result.snapshot.network_hashrate, 0.0);
        assert_eq!(
            result.snapshot.average_block_time,
            config::DEFAULT_BLOCK_TIME_SECS
        );

        // A failed result stays cached; retry is an explicit clear + reload.
        loader.load_all().await;
        assert_eq!(connector.connects(), 1);
        loader.clear();
        loader.load_all().await;
        assert_eq!(connector.connects(), 2);
    }

    #[tokio::test]
    async fn head_failure_still_settles_as_success() {
        let connector = MockConnector::new(MockChain {
            head: 10,
            fail_head: true,
            ..MockChain::default()
        });
        let loader = DataLoader::new(connector);

        let result = loader.load_all().await;

        assert!(result.status.is_success());
        assert!(result.connection.is_some());
        assert!(result.blocks.is_empty());
        assert_eq!(result.snapshot, NetworkSnapshot::disconnected());
    }

    #[tokio::test]
    async fn validator_failure_substitutes_a_placeholder() {
        let connector = MockConnector::new(MockChain {
            head: 5,
            fail_validators: true,
            ..MockChain::default()
        });
        let loader = DataLoader::new(connector);

        let result = loader.load_all().await;

        assert!(result.status.is_success());
        assert!((20..70).contains(&result.snapshot.active_validators));
    }

    #[tokio::test]
    async fn failing_blocks_are_skipped_not_fatal() {
        let connector = MockConnector::new(MockChain {
            head: 5,
            fail_blocks: HashSet::from([3]),
            fail_bodies: HashSet::from([2]),
            ..MockChain::default()
        });
        let loader = DataLoader::new(connector);

        let result = loader.load_all().await;

        assert!(result.status.is_success());
        let numbers: Vec<u64> = result.blocks.iter().map(|b| b.number).collect();
        assert_eq!(numbers, vec![5, 4, 1]);
        // Aggregated from the blocks that were actually fetched.
        assert_eq!(result.snapshot.total_transactions, 6);
        assert_eq!(result.snapshot.total_blocks, 5);
    }

    #[tokio::test]
    async fn event_count_failure_degrades_to_zero() {
        let connector = MockConnector::new(MockChain {
            head: 2,
            fail_events: true,
            ..MockChain::default()
        });
        let loader = DataLoader::new(connector);

        let result = loader.load_all().await;

        assert!(result.status.is_success());
        assert!(result.blocks.iter().all(|b| b.events_count == 0));
    }

    #[tokio::test]
    async fn block_walk_respects_the_display_cap() {
        let connector = MockConnector::new(MockChain {
            head: 100,
            ..MockChain::default()
        });
        let loader = DataLoader::new(connector);

        let result = loader.load_all().await;

        assert_eq!(result.blocks.len(), config::MAX_BLOCKS_DISPLAY);
        assert_eq!(result.blocks.first().map(|b| b.number), Some(100));
        assert_eq!(result.blocks.last().map(|b| b.number), Some(81));
        assert!(result.blocks.windows(2).all(|w| w[0].number > w[1].number));
    }

    #[tokio::test]
    async fn short_chains_stop_above_genesis() {
        let connector = MockConnector::new(MockChain {
            head: 3,
            ..MockChain::default()
        });
        let loader = DataLoader::new(connector);

        let result = loader.load_all().await;

        let numbers: Vec<u64> = result.blocks.iter().map(|b| b.number).collect();
        assert_eq!(numbers, vec![3, 2, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_during_a_load_detaches_it_from_the_cache() {
        let connector = MockConnector::slow(
            MockChain {
                head: 4,
                ..MockChain::default()
            },
            Duration::from_secs(10),
        );
        let loader = DataLoader::new(connector.clone());

        let early = loader.clone();
        let early = tokio::spawn(async move { early.load_all().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        loader.clear();
        let late = loader.load_all().await;
        let early = early.await.expect("first load settles");

        assert_eq!(connector.connects(), 2);
        assert!(early.status.is_success());
        assert!(late.status.is_success());
        // Only the post-clear load may populate the cache.
        assert_eq!(loader.settled(), Some(late));
    }
}
