//! The remote chain surface the dashboard talks to.
//!
//! [`ChainRpc`] is the minimal set of node calls the app needs; the
//! production implementation speaks Substrate-style JSON-RPC over a
//! websocket. Connection establishment lives behind [`ChainConnector`] so
//! the preloader can be exercised against injected failures.

use std::sync::Arc;

use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::rpc_params;
use jsonrpsee::ws_client::WsClient;
use jsonrpsee::ws_client::WsClientBuilder;
use serde::Deserialize;

use crate::block_hash::BlockHash;
use crate::error::ChainError;
use crate::scale;

/// Storage key of `Session::Validators`: twox128("Session") ++ twox128("Validators").
const SESSION_VALIDATORS_KEY: &str =
    "0xcec5070d609dd3497f72bde07fc96ba088dcde934c658227ee1dfafcd6e16903";

/// Storage key of `System::EventCount`: twox128("System") ++ twox128("EventCount").
const SYSTEM_EVENT_COUNT_KEY: &str =
    "0x26aa394eea5630e07c48ae0c9558cef70a98fdbe9ce6c55837576c60c7af3850";

/// The current tip of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainHead {
    pub number: u64,
    pub hash: BlockHash,
}

/// The parts of a block body the dashboard displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockBody {
    pub parent_hash: BlockHash,
    pub extrinsics_count: u32,
}

/// Node calls used by the preloader and the main view. Each is independently
/// fallible; callers decide per call whether a failure is terminal.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn head(&self) -> Result<ChainHead, ChainError>;

    async fn block_hash(&self, number: u64) -> Result<Option<BlockHash>, ChainError>;

    async fn block_body(&self, hash: BlockHash) -> Result<BlockBody, ChainError>;

    async fn validator_count(&self) -> Result<u32, ChainError>;

    async fn event_count(&self, at: BlockHash) -> Result<u32, ChainError>;
}

/// Establishes connections for [`crate::data_loader::DataLoader`].
#[async_trait]
pub trait ChainConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ChainRpc>, ChainError>;
}

/// Connects [`WsChainClient`]s to a fixed endpoint.
pub struct WsConnector {
    endpoint: String,
}

impl WsConnector {
    pub fn new(endpoint: String) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl ChainConnector for WsConnector {
    async fn connect(&self) -> Result<Arc<dyn ChainRpc>, ChainError> {
        let client = WsChainClient::connect(&self.endpoint).await?;
        Ok(Arc::new(client))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcHeader {
    number: String,
    parent_hash: BlockHash,
}

#[derive(Debug, Deserialize)]
struct RpcSignedBlock {
    block: RpcBlock,
}

#[derive(Debug, Deserialize)]
struct RpcBlock {
    header: RpcHeader,
    extrinsics: Vec<String>,
}

/// Block numbers arrive as `0x`-prefixed hex strings.
fn parse_hex_number(raw: &str) -> Result<u64, ChainError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    u64::from_str_radix(digits, 16).map_err(|e| ChainError::Decode {
        what: "block number",
        reason: e.to_string(),
    })
}

/// JSON-RPC websocket client for a Substrate-style node.
pub struct WsChainClient {
    inner: WsClient,
}

impl WsChainClient {
    pub async fn connect(endpoint: &str) -> Result<Self, ChainError> {
        let inner = WsClientBuilder::default()
            .build(endpoint)
            .await
            .map_err(|e| ChainError::Connect {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { inner })
    }

    async fn request<T>(&self, method: &'static str, params: ArrayParams) -> Result<T, ChainError>
    where
        T: serde::de::DeserializeOwned,
    {
        self.inner
            .request(method, params)
            .await
            .map_err(|e| ChainError::Rpc {
                method,
                reason: e.to_string(),
            })
    }

    /// Reads a raw storage value, optionally at a specific block.
    async fn storage(
        &self,
        key: &str,
        at: Option<BlockHash>,
    ) -> Result<Option<Vec<u8>>, ChainError> {
        let raw: Option<String> = match at {
            Some(hash) => {
                self.request("state_getStorage", rpc_params![key, hash.to_string()])
                    .await?
            }
            None => self.request("state_getStorage", rpc_params![key]).await?,
        };
        raw.map(|value| {
            hex::decode(value.trim_start_matches("0x")).map_err(|e| ChainError::Decode {
                what: "storage value",
                reason: e.to_string(),
            })
        })
        .transpose()
    }
}

#[async_trait]
impl ChainRpc for WsChainClient {
    async fn head(&self) -> Result<ChainHead, ChainError> {
        // chain_getBlockHash without a number returns the best block's hash;
        // fetching the header at that hash keeps number and hash consistent.
        let hash: Option<BlockHash> = self.request("chain_getBlockHash", rpc_params![]).await?;
        let hash = hash.ok_or(ChainError::Rpc {
            method: "chain_getBlockHash",
            reason: "node returned no tip hash".to_string(),
        })?;
        let header: RpcHeader = self
            .request("chain_getHeader", rpc_params![hash.to_string()])
            .await?;
        Ok(ChainHead {
            number: parse_hex_number(&header.number)?,
            hash,
        })
    }

    async fn block_hash(&self, number: u64) -> Result<Option<BlockHash>, ChainError> {
        self.request("chain_getBlockHash", rpc_params![number]).await
    }

    async fn block_body(&self, hash: BlockHash) -> Result<BlockBody, ChainError> {
        let signed: Option<RpcSignedBlock> = self
            .request("chain_getBlock", rpc_params![hash.to_string()])
            .await?;
        let signed = signed.ok_or_else(|| ChainError::MissingBlock(hash.to_string()))?;
        Ok(BlockBody {
            parent_hash: signed.block.header.parent_hash,
            extrinsics_count: signed.block.extrinsics.len() as u32,
        })
    }

    async fn validator_count(&self) -> Result<u32, ChainError> {
        let bytes = self
            .storage(SESSION_VALIDATORS_KEY, None)
            .await?
            .ok_or(ChainError::Rpc {
                method: "state_getStorage",
                reason: "validator set not present".to_string(),
            })?;
        Ok(scale::decode_compact_len(&bytes)? as u32)
    }

    async fn event_count(&self, at: BlockHash) -> Result<u32, ChainError> {
        match self.storage(SYSTEM_EVENT_COUNT_KEY, Some(at)).await? {
            Some(bytes) => scale::decode_u32(&bytes),
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_block_numbers() {
        assert_eq!(parse_hex_number("0x0").unwrap(), 0);
        assert_eq!(parse_hex_number("0x4d2").unwrap(), 1234);
        assert!(parse_hex_number("0x").is_err());
        assert!(parse_hex_number("12z4").is_err());
    }

    #[test]
    fn deserializes_header_and_block_wire_shapes() {
        let header: RpcHeader = serde_json::from_str(
            r#"{
                "number": "0x1b4",
                "parentHash": "0x00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff",
                "stateRoot": "0x00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff",
                "digest": { "logs": [] }
            }"#,
        )
        .unwrap();
        assert_eq!(parse_hex_number(&header.number).unwrap(), 436);

        let signed: RpcSignedBlock = serde_json::from_str(
            r#"{
                "block": {
                    "header": {
                        "number": "0x2",
                        "parentHash": "0x00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff"
                    },
                    "extrinsics": ["0x280402000b63ce64c10c01", "0x1c0407005e2c"]
                },
                "justifications": null
            }"#,
        )
        .unwrap();
        assert_eq!(signed.block.extrinsics.len(), 2);
    }
}
