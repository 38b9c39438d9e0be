// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Challenge Storage
//!
//! Per-(account, network) challenge values and role assignments.
//!
//! ## Layout
//!
//! - [`ChallengePersistence`] / [`RoleStore`] - the storage seam
//! - [`RedbChallengeStore`] - embedded ACID database (redb)
//! - [`InMemoryChallengeStore`] - process-local map, for tests and single-node use
//! - [`ChallengeStore`] - challenge generation and rotation on top of a persistence
//!
//! ## Consistency
//!
//! A rotation is a single overwrite committed atomically, so readers see either
//! the old value or the new one, never a partial write. `compare_and_swap` is the
//! single-writer-per-key primitive: of two verifications racing on the same
//! challenge, only one can swap it out.

pub mod challenge_db;
pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{AuthnError, AuthnResult};
use crate::models::ChallengeKey;
use crate::timeout::bounded;

pub use challenge_db::RedbChallengeStore;
pub use memory::InMemoryChallengeStore;

/// Smallest challenge magnitude whose decimal form reaches the minimum
/// signing payload length (6 bytes).
const MIN_CHALLENGE_MAGNITUDE: u64 = 100_000;

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Storage Seam
// =============================================================================

/// Key-value persistence for challenges.
#[async_trait]
pub trait ChallengePersistence: Send + Sync {
    /// Current challenge for `key`, if one was ever issued.
    async fn load(&self, key: &ChallengeKey) -> StorageResult<Option<i64>>;

    /// Overwrite the challenge for `key`.
    async fn store(&self, key: &ChallengeKey, value: i64) -> StorageResult<()>;

    /// Store `value` unless a challenge already exists. Returns the challenge
    /// held after the call, whichever writer put it there.
    async fn insert_if_absent(&self, key: &ChallengeKey, value: i64) -> StorageResult<i64>;

    /// Replace the challenge with `replacement` only if it currently equals
    /// `expected`. Returns whether the swap happened.
    async fn compare_and_swap(
        &self,
        key: &ChallengeKey,
        expected: i64,
        replacement: i64,
    ) -> StorageResult<bool>;
}

/// Role assignments per (account, network).
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Roles held by `key`; empty when none were assigned.
    async fn roles(&self, key: &ChallengeKey) -> StorageResult<Vec<String>>;

    async fn set_roles(&self, key: &ChallengeKey, roles: &[String]) -> StorageResult<()>;
}

// =============================================================================
// ChallengeStore
// =============================================================================

/// Issues, reads and rotates challenges.
pub struct ChallengeStore {
    persistence: Arc<dyn ChallengePersistence>,
    rng: SystemRandom,
    timeout: Duration,
}

impl ChallengeStore {
    pub fn new(persistence: Arc<dyn ChallengePersistence>, timeout: Duration) -> Self {
        Self {
            persistence,
            rng: SystemRandom::new(),
            timeout,
        }
    }

    /// Current challenge. `NotFound` if none was ever issued for `key`.
    pub async fn get_challenge(&self, key: &ChallengeKey) -> AuthnResult<i64> {
        bounded(self.timeout, "challenge storage", self.persistence.load(key))
            .await?
            .ok_or_else(|| AuthnError::NotFound(format!("challenge for {key}")))
    }

    /// Current challenge, or a fresh one if none was ever issued.
    ///
    /// Concurrent first-time callers all receive the same value.
    pub async fn get_or_create_challenge(&self, key: &ChallengeKey) -> AuthnResult<i64> {
        match self.get_challenge(key).await {
            Err(AuthnError::NotFound(_)) => {}
            other => return other,
        }
        let value = self.generate()?;
        bounded(
            self.timeout,
            "challenge storage",
            self.persistence.insert_if_absent(key, value),
        )
        .await
    }

    /// Draw a fresh challenge, persist it over any previous one, return it.
    pub async fn rotate_challenge(&self, key: &ChallengeKey) -> AuthnResult<i64> {
        let value = self.generate()?;
        bounded(
            self.timeout,
            "challenge storage",
            self.persistence.store(key, value),
        )
        .await?;
        Ok(value)
    }

    /// Rotate only if the stored challenge is still `expected`.
    ///
    /// Returns the new challenge, or `None` when `expected` was already
    /// consumed by someone else.
    pub async fn consume_challenge(
        &self,
        key: &ChallengeKey,
        expected: i64,
    ) -> AuthnResult<Option<i64>> {
        let value = self.generate()?;
        let swapped = bounded(
            self.timeout,
            "challenge storage",
            self.persistence.compare_and_swap(key, expected, value),
        )
        .await?;
        Ok(swapped.then_some(value))
    }

    fn generate(&self) -> AuthnResult<i64> {
        generate_challenge(&self.rng)
    }
}

/// Draw a challenge from the full signed 64-bit range.
///
/// Values too small to render as a valid signing payload are redrawn.
pub fn generate_challenge(rng: &dyn SecureRandom) -> AuthnResult<i64> {
    loop {
        let mut bytes = [0u8; 8];
        rng.fill(&mut bytes)
            .map_err(|_| AuthnError::UpstreamUnavailable("random source failure".to_string()))?;

        let value = i64::from_be_bytes(bytes);
        if value.unsigned_abs() >= MIN_CHALLENGE_MAGNITUDE {
            return Ok(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountId, Network};

    fn key() -> ChallengeKey {
        ChallengeKey::new(AccountId::new(0, 0, 1001), Network::Testnet)
    }

    fn store() -> ChallengeStore {
        ChallengeStore::new(
            Arc::new(InMemoryChallengeStore::new()),
            Duration::from_secs(1),
        )
    }

    /// Persistence whose writes always fail.
    #[derive(Default)]
    struct ReadOnlyPersistence {
        inner: InMemoryChallengeStore,
    }

    fn read_only_volume() -> StorageError {
        StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only volume",
        ))
    }

    #[async_trait]
    impl ChallengePersistence for ReadOnlyPersistence {
        async fn load(&self, key: &ChallengeKey) -> StorageResult<Option<i64>> {
            self.inner.load(key).await
        }

        async fn store(&self, _key: &ChallengeKey, _value: i64) -> StorageResult<()> {
            Err(read_only_volume())
        }

        async fn insert_if_absent(&self, _key: &ChallengeKey, _value: i64) -> StorageResult<i64> {
            Err(read_only_volume())
        }

        async fn compare_and_swap(
            &self,
            _key: &ChallengeKey,
            _expected: i64,
            _replacement: i64,
        ) -> StorageResult<bool> {
            Err(read_only_volume())
        }
    }

    #[test]
    fn generated_challenges_are_long_enough_to_sign() {
        let rng = SystemRandom::new();
        for _ in 0..1000 {
            let v = generate_challenge(&rng).unwrap();
            assert!(v.to_string().trim_start_matches('-').len() >= 6);
        }
    }

    #[test]
    fn generated_challenges_cover_negative_values() {
        let rng = SystemRandom::new();
        let values: Vec<i64> = (0..256).map(|_| generate_challenge(&rng).unwrap()).collect();
        assert!(values.iter().any(|v| *v < 0));
        assert!(values.iter().any(|v| *v > 0));
    }

    #[tokio::test]
    async fn get_before_issue_is_not_found() {
        let result = store().get_challenge(&key()).await;
        assert!(matches!(result, Err(AuthnError::NotFound(_))));
    }

    #[tokio::test]
    async fn rotate_then_get_returns_rotated_value() {
        let store = store();
        let value = store.rotate_challenge(&key()).await.unwrap();
        assert_eq!(store.get_challenge(&key()).await.unwrap(), value);

        let next = store.rotate_challenge(&key()).await.unwrap();
        assert_ne!(next, value);
        assert_eq!(store.get_challenge(&key()).await.unwrap(), next);
    }

    #[tokio::test]
    async fn get_or_create_keeps_existing_challenge() {
        let store = store();
        let created = store.get_or_create_challenge(&key()).await.unwrap();
        assert_eq!(store.get_or_create_challenge(&key()).await.unwrap(), created);
        assert_eq!(store.get_challenge(&key()).await.unwrap(), created);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_issue_agrees_on_one_value() {
        let store = Arc::new(store());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.get_or_create_challenge(&key()).await.unwrap()
            }));
        }

        let mut issued = Vec::new();
        for handle in handles {
            issued.push(handle.await.unwrap());
        }
        let outstanding = store.get_challenge(&key()).await.unwrap();
        assert!(issued.iter().all(|v| *v == outstanding));
    }

    #[tokio::test]
    async fn failed_writes_leave_previous_challenge_authoritative() {
        let persistence = ReadOnlyPersistence::default();
        persistence.inner.store(&key(), 271_828).await.unwrap();
        let store = ChallengeStore::new(Arc::new(persistence), Duration::from_secs(1));

        let rotated = store.rotate_challenge(&key()).await;
        assert!(matches!(rotated, Err(AuthnError::UpstreamUnavailable(_))));

        let consumed = store.consume_challenge(&key(), 271_828).await;
        assert!(matches!(consumed, Err(AuthnError::UpstreamUnavailable(_))));

        assert_eq!(store.get_challenge(&key()).await.unwrap(), 271_828);
    }

    #[tokio::test]
    async fn consume_only_succeeds_once_per_challenge() {
        let store = store();
        let current = store.rotate_challenge(&key()).await.unwrap();

        let first = store.consume_challenge(&key(), current).await.unwrap();
        assert!(first.is_some());

        let second = store.consume_challenge(&key(), current).await.unwrap();
        assert!(second.is_none());
        assert_eq!(store.get_challenge(&key()).await.unwrap(), first.unwrap());
    }
}
