// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded challenge database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `challenges`: `network|shard.realm.num` → i64 challenge
//! - `roles`: `network|shard.realm.num` → JSON array of role names
//!
//! redb allows one write transaction at a time, so every rotation and
//! compare-and-swap below is serialized against all other writers.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::{ChallengePersistence, RoleStore, StorageResult};
use crate::models::ChallengeKey;

// =============================================================================
// Table Definitions
// =============================================================================

/// Outstanding challenge per (account, network).
const CHALLENGES: TableDefinition<&str, i64> = TableDefinition::new("challenges");

/// Role names per (account, network), serialized as a JSON array.
const ROLES: TableDefinition<&str, &[u8]> = TableDefinition::new("roles");

// =============================================================================
// RedbChallengeStore
// =============================================================================

/// File-backed challenge and role store.
#[derive(Clone)]
pub struct RedbChallengeStore {
    db: Arc<Database>,
}

impl RedbChallengeStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CHALLENGES)?;
            let _ = write_txn.open_table(ROLES)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Run a blocking database closure off the async executor.
    async fn run<T, F>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Database) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db)).await?
    }
}

#[async_trait]
impl ChallengePersistence for RedbChallengeStore {
    async fn load(&self, key: &ChallengeKey) -> StorageResult<Option<i64>> {
        let key = key.storage_key();
        self.run(move |db| {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(CHALLENGES)?;
            let value = table.get(key.as_str())?.map(|v| v.value());
            Ok(value)
        })
        .await
    }

    async fn store(&self, key: &ChallengeKey, value: i64) -> StorageResult<()> {
        let key = key.storage_key();
        self.run(move |db| {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(CHALLENGES)?;
                table.insert(key.as_str(), value)?;
            }
            write_txn.commit()?;
            Ok(())
        })
        .await
    }

    async fn insert_if_absent(&self, key: &ChallengeKey, value: i64) -> StorageResult<i64> {
        let key = key.storage_key();
        self.run(move |db| {
            let write_txn = db.begin_write()?;
            let existing = {
                let mut table = write_txn.open_table(CHALLENGES)?;
                let existing = table.get(key.as_str())?.map(|v| v.value());
                if existing.is_none() {
                    table.insert(key.as_str(), value)?;
                }
                existing
            };
            match existing {
                Some(current) => {
                    write_txn.abort()?;
                    Ok(current)
                }
                None => {
                    write_txn.commit()?;
                    Ok(value)
                }
            }
        })
        .await
    }

    async fn compare_and_swap(
        &self,
        key: &ChallengeKey,
        expected: i64,
        replacement: i64,
    ) -> StorageResult<bool> {
        let key = key.storage_key();
        self.run(move |db| {
            let write_txn = db.begin_write()?;
            let swapped = {
                let mut table = write_txn.open_table(CHALLENGES)?;
                let current = table.get(key.as_str())?.map(|v| v.value());
                if current == Some(expected) {
                    table.insert(key.as_str(), replacement)?;
                    true
                } else {
                    false
                }
            };
            if swapped {
                write_txn.commit()?;
            } else {
                write_txn.abort()?;
            }
            Ok(swapped)
        })
        .await
    }
}

#[async_trait]
impl RoleStore for RedbChallengeStore {
    async fn roles(&self, key: &ChallengeKey) -> StorageResult<Vec<String>> {
        let key = key.storage_key();
        self.run(move |db| {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(ROLES)?;
            let roles = match table.get(key.as_str())? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => Vec::new(),
            };
            Ok(roles)
        })
        .await
    }

    async fn set_roles(&self, key: &ChallengeKey, roles: &[String]) -> StorageResult<()> {
        let key = key.storage_key();
        let json = serde_json::to_vec(roles)?;
        self.run(move |db| {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(ROLES)?;
                table.insert(key.as_str(), json.as_slice())?;
            }
            write_txn.commit()?;
            Ok(())
        })
        .await
    }
}
