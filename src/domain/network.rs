// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RPC endpoint records for protocol/chain pairs.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::asset::Protocol;
use crate::error::VaultError;

/// An RPC endpoint on a specific protocol/chain. Referenced by the session
/// layer when an external caller names the network it wants to operate on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNetwork")]
pub struct Network {
    id: String,
    label: String,
    protocol: Protocol,
    rpc_url: String,
    is_default: bool,
}

/// Wire shape of [`Network`] before URL validation.
#[derive(Deserialize)]
struct RawNetwork {
    id: String,
    label: String,
    protocol: Protocol,
    rpc_url: String,
    is_default: bool,
}

impl TryFrom<RawNetwork> for Network {
    type Error = VaultError;

    fn try_from(raw: RawNetwork) -> Result<Self, Self::Error> {
        let validated = Network::new(&raw.label, raw.protocol, &raw.rpc_url, raw.is_default)?;
        Ok(Self {
            id: raw.id,
            ..validated
        })
    }
}

impl Network {
    /// Build a network record. The RPC endpoint must be a valid http(s) URL.
    pub fn new(
        label: &str,
        protocol: Protocol,
        rpc_url: &str,
        is_default: bool,
    ) -> Result<Self, VaultError> {
        let parsed = Url::parse(rpc_url)
            .map_err(|e| VaultError::InvalidRequest(format!("Invalid RPC url: {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(VaultError::InvalidRequest(format!(
                "Invalid RPC url scheme: {}",
                parsed.scheme()
            )));
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            label: label.to_string(),
            protocol,
            rpc_url: parsed.to_string(),
            is_default,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::asset::ProtocolName;

    fn avalanche() -> Protocol {
        Protocol::new(ProtocolName::Avalanche, "43114").unwrap()
    }

    #[test]
    fn accepts_https_endpoint() {
        let network = Network::new(
            "Avalanche Mainnet",
            avalanche(),
            "https://api.avax.network/ext/bc/C/rpc",
            true,
        )
        .unwrap();
        assert_eq!(network.rpc_url(), "https://api.avax.network/ext/bc/C/rpc");
        assert!(network.is_default());
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(Network::new("ws", avalanche(), "ws://api.avax.network/rpc", false).is_err());
        assert!(Network::new("bad", avalanche(), "not a url", false).is_err());
    }

    #[test]
    fn deserialization_re_validates_and_keeps_the_id() {
        let network = Network::new(
            "Fuji",
            Protocol::new(ProtocolName::Avalanche, "43113").unwrap(),
            "https://api.avax-test.network/ext/bc/C/rpc",
            false,
        )
        .unwrap();

        let json = serde_json::to_string(&network).unwrap();
        let restored: Network = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, network);

        let bad = json.replace("https://api.avax-test.network", "ftp://api.avax-test.network");
        assert!(serde_json::from_str::<Network>(&bad).is_err());
    }
}
