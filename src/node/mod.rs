//! Peer replication hook.
//!
//! Freshly mined blocks are pushed to every known peer with a single POST.
//! Delivery is best-effort: failures are logged, never retried and never
//! reported back to the ledger.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::BlockPayload;

/// Path on a peer that accepts proposed blocks.
pub const BLOCKS_PATH: &str = "/api/v1/blocks/";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeParseError {
    #[error("peer `{0}` must look like host:port")]
    MissingPort(String),

    #[error("peer `{0}` has an invalid port")]
    InvalidPort(String),

    #[error("peer `{0}` has an empty host")]
    EmptyHost(String),
}

/// A known peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub address: String,
    pub port: u16,
    pub url: String, // address:port
}

impl Node {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        let address = address.into();
        let url = format!("{address}:{port}");
        Self { address, port, url }
    }

    pub fn blocks_endpoint(&self) -> String {
        format!("http://{}{}", self.url, BLOCKS_PATH)
    }

    /// POST `block` to this peer. Never fails from the caller's point of view.
    pub async fn broadcast_block(&self, client: &reqwest::Client, block: &BlockPayload) {
        match client.post(self.blocks_endpoint()).json(block).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!("block {} delivered to {}", block.hash, self.url);
            }
            Ok(resp) => {
                warn!(
                    "peer {} refused block {} (status {})",
                    self.url,
                    block.hash,
                    resp.status()
                );
            }
            Err(e) => {
                warn!("could not deliver block {} to {}: {}", block.hash, self.url, e);
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl FromStr for Node {
    type Err = NodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| NodeParseError::MissingPort(s.to_string()))?;
        if host.is_empty() {
            return Err(NodeParseError::EmptyHost(s.to_string()));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| NodeParseError::InvalidPort(s.to_string()))?;
        Ok(Node::new(host, port))
    }
}

/// Fire-and-forget fan-out of `block` to every peer.
/// Must be called from within the actix-web runtime.
pub fn broadcast_to_peers(peers: &[Node], client: &reqwest::Client, block: BlockPayload) {
    if peers.is_empty() {
        return;
    }
    let block = Arc::new(block);
    for peer in peers {
        let peer = peer.clone();
        let client = client.clone();
        let block = Arc::clone(&block);
        actix_web::rt::spawn(async move {
            peer.broadcast_block(&client, &block).await;
        });
    }
    debug!("block {} handed to {} peer(s)", block.hash, peers.len());
}

#[cfg(test)]
mod tests {
    use super::{Node, NodeParseError};
    use crate::blockchain::{Block, BlockPayload};

    #[test]
    fn url_joins_address_and_port() {
        let node = Node::new("127.0.0.1", 5000);
        assert_eq!(node.url, "127.0.0.1:5000");
        assert_eq!(node.to_string(), node.url);
        assert_eq!(node.blocks_endpoint(), "http://127.0.0.1:5000/api/v1/blocks/");
    }

    #[test]
    fn serializes_as_record() {
        let value = serde_json::to_value(Node::new("127.0.0.1", 5000)).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"address": "127.0.0.1", "port": 5000, "url": "127.0.0.1:5000"})
        );
    }

    #[test]
    fn parses_host_port() {
        assert_eq!(
            " node-a:8081 ".parse::<Node>(),
            Ok(Node::new("node-a", 8081))
        );
        assert!(matches!(
            "node-a".parse::<Node>(),
            Err(NodeParseError::MissingPort(_))
        ));
        assert!(matches!(
            "node-a:http".parse::<Node>(),
            Err(NodeParseError::InvalidPort(_))
        ));
        assert!(matches!(
            ":8081".parse::<Node>(),
            Err(NodeParseError::EmptyHost(_))
        ));
    }

    #[actix_web::test]
    async fn broadcast_swallows_delivery_failure() {
        // nothing listens on port 1
        let node = Node::new("127.0.0.1", 1);
        let client = reqwest::Client::new();
        let block = BlockPayload::from(&Block::genesis(vec![]));
        node.broadcast_block(&client, &block).await;
    }
}
