// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet Authn - Challenge-Response Wallet Authentication
//!
//! Proves control of a ledger account by a signature over a single-use
//! challenge, then gates role-protected operations on HS256 bearer
//! credentials.
//!
//! ## Modules
//!
//! - `auth` - Challenge flow, signature verification, credentials
//! - `config` - Environment configuration
//! - `directory` - Account key lookup (mirror node, cache)
//! - `error` - Shared error type
//! - `models` - Account, network and key types
//! - `storage` - Challenge and role persistence (redb, in-memory)
//! - `telemetry` - Tracing subscriber setup

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod storage;
pub mod telemetry;

mod timeout;

pub use auth::{
    ChallengeAuthenticator, CredentialClaims, CredentialIssuer, Role, SignatureVerifier,
    TokenAuthorizer,
};
pub use config::AuthConfig;
pub use error::{AuthnError, AuthnResult};
pub use models::{AccountId, ChallengeKey, KeyAlgorithm, Network, PublicKeyRecord};
