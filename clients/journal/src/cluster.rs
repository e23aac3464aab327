//! Network Clusters
//!
//! The active cluster picks the RPC endpoint, the program id and the
//! explorer link shown for submitted transactions.

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use std::fmt;
use std::str::FromStr;

/// Program deployment used on devnet and testnet.
pub const DEVNET_PROGRAM_ID: Pubkey =
    solana_program::pubkey!("coUnmi3oBUtwtd9fjeAvSsJssXh5A5xyPbhpewyzRVF");

/// A Solana network.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Cluster {
    Localnet,
    Devnet,
    Testnet,
    Mainnet,
    /// Any other RPC endpoint, by URL
    Custom(String),
}

impl Cluster {
    /// Short name as used in config files and explorer links.
    pub fn name(&self) -> &str {
        match self {
            Cluster::Localnet => "localnet",
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::Mainnet => "mainnet-beta",
            Cluster::Custom(url) => url,
        }
    }

    /// Default RPC endpoint.
    pub fn endpoint(&self) -> String {
        match self {
            Cluster::Localnet => "http://localhost:8899".to_string(),
            Cluster::Devnet => "https://api.devnet.solana.com".to_string(),
            Cluster::Testnet => "https://api.testnet.solana.com".to_string(),
            Cluster::Mainnet => "https://api.mainnet-beta.solana.com".to_string(),
            Cluster::Custom(url) => url.clone(),
        }
    }

    /// Journal program id deployed on this cluster.
    pub fn program_id(&self) -> Pubkey {
        match self {
            Cluster::Devnet | Cluster::Testnet => DEVNET_PROGRAM_ID,
            Cluster::Localnet | Cluster::Mainnet | Cluster::Custom(_) => crate::id(),
        }
    }

    /// Explorer link for a transaction signature or address.
    pub fn explorer_url(&self, path: &str) -> String {
        let base = format!("https://explorer.solana.com/{path}");
        match self {
            Cluster::Mainnet => base,
            Cluster::Devnet | Cluster::Testnet => format!("{base}?cluster={}", self.name()),
            Cluster::Localnet | Cluster::Custom(_) => format!(
                "{base}?cluster=custom&customUrl={}",
                encode_query_value(&self.endpoint())
            ),
        }
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Cluster::Localnet
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Cluster {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "localnet" | "local" | "localhost" => Ok(Cluster::Localnet),
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "mainnet" | "mainnet-beta" => Ok(Cluster::Mainnet),
            _ if s.starts_with("http://") || s.starts_with("https://") => {
                Ok(Cluster::Custom(s.to_string()))
            }
            other => Err(format!("unknown cluster: {other}")),
        }
    }
}

impl TryFrom<String> for Cluster {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Cluster> for String {
    fn from(cluster: Cluster) -> Self {
        cluster.name().to_string()
    }
}

fn encode_query_value(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}
