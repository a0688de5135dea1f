// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain Model
//!
//! Value objects for the vault core. Everything here is plain data with
//! validation and serialization contracts; orchestration lives in the
//! teller module.
//!
//! ## Shape
//!
//! ```text
//! Vault
//!   accounts: [Account]          # private keys AEAD-wrapped per account
//!     asset: Asset               # validated protocol/chain pair
//!
//! Session
//!   permissions: [Permission]    # built via PermissionsBuilder only
//!   origin: OriginReference?     # None for the owner session
//!
//! ExternalAccessRequest          # unauthenticated website input
//!   accounts: [AccountReference] # non-secret projections
//! ```
//!
//! Construction is the validation boundary: `Protocol`, `Network`, and
//! `OriginReference` cannot be built (or deserialized) with values their
//! constructors would refuse.

pub mod account;
pub mod asset;
pub mod network;
pub mod origin;
pub mod permission;
pub mod request;
pub mod session;
pub mod vault;

pub use account::{Account, AccountReference};
pub use asset::{Asset, Protocol, ProtocolName};
pub use network::Network;
pub use origin::OriginReference;
pub use permission::{Permission, PermissionsBuilder, Resource};
pub use request::ExternalAccessRequest;
pub use session::Session;
pub use vault::Vault;
