// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU cache in front of a key directory.
//!
//! Account keys change rarely (key rotation is an on-ledger transaction), so
//! a short TTL trades a bounded staleness window for far fewer upstream
//! lookups. Failed lookups are never cached.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;

use super::{DirectoryError, KeyDirectory};
use crate::models::{AccountId, ChallengeKey, Network, PublicKeyRecord};

/// Cached entry: key record + insertion timestamp.
struct CacheEntry {
    record: PublicKeyRecord,
    inserted_at: Instant,
}

/// Caching wrapper for any [`KeyDirectory`].
pub struct CachedKeyDirectory {
    inner: Arc<dyn KeyDirectory>,
    cache: Mutex<LruCache<ChallengeKey, CacheEntry>>,
    ttl: Duration,
}

impl CachedKeyDirectory {
    /// Wrap `inner` with a cache.
    ///
    /// - `capacity`: Max number of (account, network) records kept.
    /// - `ttl`: Time-to-live for each record.
    pub fn new(inner: Arc<dyn KeyDirectory>, capacity: usize, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            ttl,
        }
    }

    fn get_fresh(&self, key: &ChallengeKey) -> Option<PublicKeyRecord> {
        let mut cache = self.cache.lock().ok()?;
        if let Some(entry) = cache.get(key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.record.clone());
            }
            // Expired, drop it
            cache.pop(key);
        }
        None
    }

    fn put(&self, key: ChallengeKey, record: PublicKeyRecord) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(
                key,
                CacheEntry {
                    record,
                    inserted_at: Instant::now(),
                },
            );
        }
    }

    /// Drop the cached record for an account, e.g. after a key rotation.
    pub fn invalidate(&self, account: &AccountId, network: Network) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.pop(&ChallengeKey::new(*account, network));
        }
    }
}

#[async_trait]
impl KeyDirectory for CachedKeyDirectory {
    async fn resolve(
        &self,
        account: &AccountId,
        network: Network,
    ) -> Result<PublicKeyRecord, DirectoryError> {
        let key = ChallengeKey::new(*account, network);
        if let Some(record) = self.get_fresh(&key) {
            return Ok(record);
        }

        let record = self.inner.resolve(account, network).await?;
        self.put(key, record.clone());
        Ok(record)
    }
}
