use log::warn;
use std::env;
use std::time::Duration;

use crate::blockchain::{DEFAULT_DIFFICULTY, GenesisAllocation};
use crate::node::Node;

/// Process configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub difficulty: u32,
    pub peers: Vec<Node>,
    pub peer_timeout: Duration,
    pub genesis: Option<GenesisAllocation>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = lookup("PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);
        let difficulty: u32 = lookup("DIFFICULTY")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_DIFFICULTY);
        let peer_timeout = Duration::from_millis(
            lookup("PEER_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        );

        let peers = lookup("PEERS")
            .map(|raw| {
                raw.split(',')
                    .filter(|entry| !entry.trim().is_empty())
                    .filter_map(|entry| match entry.parse::<Node>() {
                        Ok(node) => Some(node),
                        Err(e) => {
                            warn!("ignoring peer: {e}");
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let genesis = match (
            lookup("GENESIS_ADDRESS"),
            lookup("GENESIS_AMOUNT").and_then(|v| v.parse::<i64>().ok()),
        ) {
            (Some(address), Some(amount)) if !address.is_empty() && amount > 0 => {
                Some(GenesisAllocation { address, amount })
            }
            _ => None,
        };

        Self {
            host,
            port,
            difficulty,
            peers,
            peer_timeout,
            genesis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::node::Node;
    use std::collections::HashMap;
    use std::time::Duration;

    fn config(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config(&[]);
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.difficulty, 2);
        assert!(cfg.peers.is_empty());
        assert_eq!(cfg.peer_timeout, Duration::from_millis(3000));
        assert!(cfg.genesis.is_none());
    }

    #[test]
    fn reads_values() {
        let cfg = config(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("DIFFICULTY", "3"),
            ("PEERS", "127.0.0.1:9001, bogus ,node-b:9002,"),
            ("PEER_TIMEOUT_MS", "250"),
            ("GENESIS_ADDRESS", "alice"),
            ("GENESIS_AMOUNT", "100"),
        ]);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.difficulty, 3);
        assert_eq!(
            cfg.peers,
            vec![Node::new("127.0.0.1", 9001), Node::new("node-b", 9002)]
        );
        assert_eq!(cfg.peer_timeout, Duration::from_millis(250));
        let genesis = cfg.genesis.expect("genesis allocation");
        assert_eq!(genesis.address, "alice");
        assert_eq!(genesis.amount, 100);
    }

    #[test]
    fn bad_numbers_fall_back() {
        let cfg = config(&[("PORT", "eighty"), ("DIFFICULTY", "-1"), ("GENESIS_AMOUNT", "0")]);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.difficulty, 2);
        assert!(cfg.genesis.is_none());
    }
}
