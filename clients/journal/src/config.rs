//! Client configuration with validation.
//!
//! Loaded from a JSON file; every field has a default so a partial file (or
//! none at all) works. Command line flags override file values.

use crate::cluster::Cluster;
use crate::error::{JournalError, JournalResult};
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Cluster the client talks to
    pub cluster: Cluster,
    /// RPC URL override; the cluster's default endpoint when unset
    pub rpc_url: Option<String>,
    /// Wallet keypair file (Solana CLI JSON format)
    pub keypair_path: PathBuf,
    /// `processed`, `confirmed` or `finalized`
    pub commitment: String,
    /// Web front-end
    pub server: ServerConfig,
    /// Logging
    pub log: LogConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cluster: Cluster::default(),
            rpc_url: None,
            keypair_path: default_keypair_path(),
            commitment: "confirmed".to_string(),
            server: ServerConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Web front-end configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    /// JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ClientConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> JournalResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path` if given and present, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> JournalResult<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => Err(JournalError::Config(format!(
                "config file not found: {}",
                path.display()
            ))),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> JournalResult<()> {
        if self.keypair_path.as_os_str().is_empty() {
            return Err(JournalError::Config("keypair_path cannot be empty".into()));
        }

        if self.server.port == 0 {
            return Err(JournalError::Config("server.port cannot be 0".into()));
        }

        if let Some(url) = &self.rpc_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(JournalError::Config(format!(
                    "rpc_url must be an http(s) URL, got {url}"
                )));
            }
        }

        self.commitment_config()?;
        Ok(())
    }

    /// RPC endpoint: the override, else the cluster default.
    pub fn rpc_endpoint(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.cluster.endpoint())
    }

    pub fn commitment_config(&self) -> JournalResult<CommitmentConfig> {
        CommitmentConfig::from_str(&self.commitment)
            .map_err(|_| JournalError::Config(format!("unknown commitment: {}", self.commitment)))
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }
}

/// `~/.config/solana/id.json`, the Solana CLI default wallet.
fn default_keypair_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".config/solana/id.json")
}
