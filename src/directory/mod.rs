// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Key Directory
//!
//! Resolves the current public key and key algorithm of an account on a
//! network. The algorithm is decided here, once, and carried in the returned
//! [`PublicKeyRecord`]; nothing downstream re-infers it.
//!
//! - [`MirrorNodeDirectory`] - ledger mirror node REST API over HTTPS
//! - [`CachedKeyDirectory`] - LRU + TTL cache in front of any directory

pub mod cache;
pub mod mirror;

use async_trait::async_trait;

use crate::models::{AccountId, Network, PublicKeyRecord};

pub use cache::CachedKeyDirectory;
pub use mirror::{MirrorNodeDirectory, MirrorNodeUrls};

/// Key directory errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DirectoryError {
    /// The account has no key record on that network.
    #[error("no key record for {0}")]
    NotFound(String),

    /// Transport failure, unexpected status or unreadable response.
    #[error("key directory unavailable: {0}")]
    Unavailable(String),
}

/// Account → public key lookup.
#[async_trait]
pub trait KeyDirectory: Send + Sync {
    async fn resolve(
        &self,
        account: &AccountId,
        network: Network,
    ) -> Result<PublicKeyRecord, DirectoryError>;
}
