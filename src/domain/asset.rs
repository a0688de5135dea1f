// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Assets and the protocol/chain pairs they live on.
//!
//! `Protocol` is a closed sum over the supported protocol set, paired with a
//! chain id validated at construction. Deserialization funnels through the
//! same validation, so an unknown protocol/chain pair cannot enter the
//! system from persisted or external data either.

use serde::{Deserialize, Serialize};

use crate::error::VaultError;

/// Supported blockchain protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolName {
    /// Avalanche C-Chain.
    Avalanche,
    /// Ethereum mainnet and test networks.
    Ethereum,
    /// Pocket Network.
    Pocket,
}

impl ProtocolName {
    /// Chain ids this protocol accepts.
    pub fn known_chain_ids(&self) -> &'static [&'static str] {
        match self {
            ProtocolName::Avalanche => &["43114", "43113"],
            ProtocolName::Ethereum => &["1", "11155111"],
            ProtocolName::Pocket => &["mainnet", "testnet"],
        }
    }

    /// Parse a protocol name from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<ProtocolName> {
        match s.to_lowercase().as_str() {
            "avalanche" => Some(ProtocolName::Avalanche),
            "ethereum" => Some(ProtocolName::Ethereum),
            "pocket" => Some(ProtocolName::Pocket),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProtocolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolName::Avalanche => write!(f, "avalanche"),
            ProtocolName::Ethereum => write!(f, "ethereum"),
            ProtocolName::Pocket => write!(f, "pocket"),
        }
    }
}

/// A validated protocol/chain pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawProtocol")]
pub struct Protocol {
    name: ProtocolName,
    chain_id: String,
}

/// Wire shape of [`Protocol`] before chain-id validation.
#[derive(Deserialize)]
struct RawProtocol {
    name: ProtocolName,
    chain_id: String,
}

impl Protocol {
    /// Build a protocol/chain pair, rejecting chain ids the protocol does
    /// not know.
    pub fn new(name: ProtocolName, chain_id: &str) -> Result<Self, VaultError> {
        if !name.known_chain_ids().contains(&chain_id) {
            return Err(VaultError::InvalidRequest(format!(
                "Unknown chain id {chain_id} for protocol {name}"
            )));
        }
        Ok(Self {
            name,
            chain_id: chain_id.to_string(),
        })
    }

    pub fn name(&self) -> ProtocolName {
        self.name
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }
}

impl TryFrom<RawProtocol> for Protocol {
    type Error = VaultError;

    fn try_from(raw: RawProtocol) -> Result<Self, Self::Error> {
        Protocol::new(raw.name, &raw.chain_id)
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.chain_id)
    }
}

/// A fungible unit on a specific protocol/chain. Immutable after creation;
/// replace the record rather than mutating it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    id: String,
    name: String,
    symbol: String,
    protocol: Protocol,
}

impl Asset {
    pub fn new(name: &str, symbol: &str, protocol: Protocol) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            protocol,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }
}
