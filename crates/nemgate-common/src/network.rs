//! Network selection.
//!
//! A [`NetworkContext`] starts uninitialized and is bootstrapped exactly once
//! with the [`NetworkType`] the process talks to. Resource clients read the
//! network from the context they are handed, so there is no process-wide
//! state: tests and multi-network tools simply build several contexts.

use serde::{Deserialize, Serialize};

use crate::error::{NemgateError, Result};
use crate::protocol::node::NodeDescriptor;

/// The NEM networks a client can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    MainNet,
    TestNet,
    MijinNet,
}

impl NetworkType {
    /// Network version byte as used in addresses and transactions.
    pub fn id(self) -> i16 {
        match self {
            NetworkType::MainNet => 104,
            NetworkType::TestNet => -104,
            NetworkType::MijinNet => 96,
        }
    }

    /// Public node used when a resource client is given no node list.
    pub fn default_node(self) -> NodeDescriptor {
        match self {
            NetworkType::MainNet => NodeDescriptor::http("alice6.nem.ninja", 7890),
            NetworkType::TestNet => NodeDescriptor::http("bigalice2.nem.ninja", 7890),
            NetworkType::MijinNet => NodeDescriptor::http("127.0.0.1", 7890),
        }
    }
}

impl std::str::FromStr for NetworkType {
    type Err = NemgateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "main_net" | "mainnet" | "main" => Ok(NetworkType::MainNet),
            "test_net" | "testnet" | "test" => Ok(NetworkType::TestNet),
            "mijin_net" | "mijinnet" | "mijin" => Ok(NetworkType::MijinNet),
            other => Err(NemgateError::Config(format!("unknown network type '{}'", other))),
        }
    }
}

/// Two-state holder for the selected network.
#[derive(Debug, Clone, Default)]
pub struct NetworkContext {
    network: Option<NetworkType>,
}

impl NetworkContext {
    /// Creates an uninitialized context.
    pub const fn new() -> Self {
        Self { network: None }
    }

    /// Creates a context that is already bootstrapped with `network`.
    pub const fn initialized(network: NetworkType) -> Self {
        Self {
            network: Some(network),
        }
    }

    /// Selects the network.
    ///
    /// # Errors
    ///
    /// Returns [`NemgateError::AlreadyInitialized`] if the context was
    /// bootstrapped before and not [`reset`](Self::reset) since.
    pub fn bootstrap(&mut self, network: NetworkType) -> Result<()> {
        if self.network.is_some() {
            return Err(NemgateError::AlreadyInitialized);
        }
        self.network = Some(network);
        Ok(())
    }

    /// Returns the context to the uninitialized state.
    pub fn reset(&mut self) {
        self.network = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.network.is_some()
    }

    /// Returns the selected network.
    ///
    /// # Errors
    ///
    /// Returns [`NemgateError::NotInitialized`] before [`bootstrap`](Self::bootstrap).
    pub fn network_type(&self) -> Result<NetworkType> {
        self.network.ok_or(NemgateError::NotInitialized)
    }
}
