// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Website origin references for external sessions.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::VaultError;

/// The origin a session was granted to, normalized to its URL origin form
/// (`scheme://host[:port]`, no path, default ports elided).
///
/// Equality and session matching are by exact normalized value. On the wire
/// it is a bare string; deserialization funnels through the same validation
/// as [`OriginReference::new`], so unvetted origins cannot ride in on an
/// external request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OriginReference {
    value: String,
}

impl OriginReference {
    /// Parse and normalize an origin from a URL string.
    ///
    /// Only `http` and `https` origins are accepted; anything a website
    /// cannot legitimately present is refused up front.
    pub fn new(value: &str) -> Result<Self, VaultError> {
        let url = Url::parse(value)
            .map_err(|e| VaultError::InvalidRequest(format!("Invalid origin URL: {e}")))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(VaultError::InvalidRequest(format!(
                    "Unsupported origin scheme: {other}"
                )))
            }
        }

        Ok(Self {
            value: url.origin().ascii_serialization(),
        })
    }

    /// The normalized origin string.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl TryFrom<String> for OriginReference {
    type Error = VaultError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        OriginReference::new(&value)
    }
}

impl From<OriginReference> for String {
    fn from(origin: OriginReference) -> Self {
        origin.value
    }
}

impl std::fmt::Display for OriginReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}
