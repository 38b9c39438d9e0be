// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory challenge and role store.
//!
//! State lives for the lifetime of the process. Suitable for tests and
//! single-instance deployments where losing outstanding challenges on
//! restart is acceptable (clients simply request a new one).

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ChallengePersistence, RoleStore, StorageResult};
use crate::models::ChallengeKey;

#[derive(Default)]
pub struct InMemoryChallengeStore {
    challenges: Mutex<HashMap<ChallengeKey, i64>>,
    roles: Mutex<HashMap<ChallengeKey, Vec<String>>>,
}

impl InMemoryChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChallengePersistence for InMemoryChallengeStore {
    async fn load(&self, key: &ChallengeKey) -> StorageResult<Option<i64>> {
        Ok(self.challenges.lock().await.get(key).copied())
    }

    async fn store(&self, key: &ChallengeKey, value: i64) -> StorageResult<()> {
        self.challenges.lock().await.insert(*key, value);
        Ok(())
    }

    async fn insert_if_absent(&self, key: &ChallengeKey, value: i64) -> StorageResult<i64> {
        Ok(*self.challenges.lock().await.entry(*key).or_insert(value))
    }

    async fn compare_and_swap(
        &self,
        key: &ChallengeKey,
        expected: i64,
        replacement: i64,
    ) -> StorageResult<bool> {
        // Lock held across read and write
        let mut challenges = self.challenges.lock().await;
        match challenges.get_mut(key) {
            Some(current) if *current == expected => {
                *current = replacement;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl RoleStore for InMemoryChallengeStore {
    async fn roles(&self, key: &ChallengeKey) -> StorageResult<Vec<String>> {
        Ok(self.roles.lock().await.get(key).cloned().unwrap_or_default())
    }

    async fn set_roles(&self, key: &ChallengeKey, roles: &[String]) -> StorageResult<()> {
        self.roles.lock().await.insert(*key, roles.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{AccountId, Network};

    fn key() -> ChallengeKey {
        ChallengeKey::new(AccountId::new(0, 0, 42), Network::Testnet)
    }

    #[tokio::test]
    async fn store_and_load() {
        let store = InMemoryChallengeStore::new();
        assert_eq!(store.load(&key()).await.unwrap(), None);

        store.store(&key(), 123_456).await.unwrap();
        assert_eq!(store.load(&key()).await.unwrap(), Some(123_456));
    }

    #[tokio::test]
    async fn insert_if_absent_keeps_first_value() {
        let store = InMemoryChallengeStore::new();
        assert_eq!(store.insert_if_absent(&key(), 200_000).await.unwrap(), 200_000);
        assert_eq!(store.insert_if_absent(&key(), 300_000).await.unwrap(), 200_000);
        assert_eq!(store.load(&key()).await.unwrap(), Some(200_000));
    }

    #[tokio::test]
    async fn concurrent_swaps_have_a_single_winner() {
        let store = Arc::new(InMemoryChallengeStore::new());
        store.store(&key(), 314_159).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.compare_and_swap(&key(), 314_159, 1_000_000 + i).await.unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn roles_default_to_empty() {
        let store = InMemoryChallengeStore::new();
        assert!(store.roles(&key()).await.unwrap().is_empty());

        store.set_roles(&key(), &["USER".to_string()]).await.unwrap();
        assert_eq!(store.roles(&key()).await.unwrap(), vec!["USER"]);
    }
}
