// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Challenge issuance and verification.
//!
//! ## Flow
//!
//! 1. Client calls [`ChallengeAuthenticator::issue_challenge`] and receives a
//!    64-bit integer.
//! 2. Client signs `hex(utf8(decimal(challenge)))` with the account key.
//! 3. Client submits the decimal string as the payload together with the
//!    base64 signature to [`ChallengeAuthenticator::verify_challenge`].
//!
//! Every verification attempt, successful or not, retires the challenge it
//! was checked against. A signature is therefore good for one attempt.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::{info, warn};

use super::signature::SignatureVerifier;
use crate::config::AuthConfig;
use crate::directory::{CachedKeyDirectory, KeyDirectory, MirrorNodeDirectory};
use crate::error::{AuthnError, AuthnResult};
use crate::models::{AccountId, ChallengeKey, Network};
use crate::storage::{ChallengePersistence, ChallengeStore};
use crate::timeout::bounded;

/// Inclusive payload length bounds, in bytes.
pub const MIN_PAYLOAD_LEN: usize = 6;
pub const MAX_PAYLOAD_LEN: usize = 2047;

pub struct ChallengeAuthenticator {
    challenges: ChallengeStore,
    directory: Arc<dyn KeyDirectory>,
    verifier: SignatureVerifier,
    timeout: Duration,
}

impl ChallengeAuthenticator {
    /// - `directory`: account key lookup
    /// - `timeout`: deadline for each directory lookup
    pub fn new(
        challenges: ChallengeStore,
        directory: Arc<dyn KeyDirectory>,
        timeout: Duration,
    ) -> Self {
        Self {
            challenges,
            directory,
            verifier: SignatureVerifier::new(),
            timeout,
        }
    }

    /// Wire the mirror node directory, behind a cache, over `persistence`.
    pub fn from_config(
        config: &AuthConfig,
        persistence: Arc<dyn ChallengePersistence>,
    ) -> AuthnResult<Self> {
        let mirror = MirrorNodeDirectory::new(config.mirror_nodes.clone(), config.upstream_timeout)?;
        let directory = CachedKeyDirectory::new(
            Arc::new(mirror),
            config.key_cache_capacity,
            config.key_cache_ttl,
        );
        Ok(Self::new(
            ChallengeStore::new(persistence, config.upstream_timeout),
            Arc::new(directory),
            config.upstream_timeout,
        ))
    }

    /// Outstanding challenge for the account, created if there is none.
    pub async fn issue_challenge(&self, account: &str, network: Network) -> AuthnResult<i64> {
        let result = self.current_or_new(account, network).await;
        match &result {
            Ok(_) => info!(account, network = %network, "challenge issued"),
            Err(e) => warn!(
                account,
                network = %network,
                reason = e.code(),
                "challenge issuance failed"
            ),
        }
        result
    }

    async fn current_or_new(&self, account: &str, network: Network) -> AuthnResult<i64> {
        let key = ChallengeKey::new(account.parse()?, network);
        self.challenges.get_or_create_challenge(&key).await
    }

    /// Check `signature_base64` over `payload` against the account key.
    ///
    /// # Returns
    /// * `Ok(true)` - signature matches and the challenge was consumed
    /// * `Ok(false)` - well-formed signature that does not match
    /// * `Err(_)` - anything else; `ChallengeMismatch` when the payload is
    ///   not the outstanding challenge or a concurrent attempt consumed it
    pub async fn verify_challenge(
        &self,
        account: &str,
        network: Network,
        payload: &str,
        signature_base64: &str,
    ) -> AuthnResult<bool> {
        let account_id: AccountId = match account.parse() {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    account,
                    network = %network,
                    reason = e.code(),
                    "challenge verification rejected"
                );
                return Err(e);
            }
        };
        let key = ChallengeKey::new(account_id, network);

        let result = self.check(&key, payload, signature_base64).await;
        if let Ok(true) = result {
            info!(account = %account_id, network = %network, "challenge verified");
            return result;
        }

        // Retire the challenge before answering
        let rotated = self.challenges.rotate_challenge(&key).await.is_ok();
        let reason = match &result {
            Ok(_) => "signature_mismatch",
            Err(e) => e.code(),
        };
        warn!(
            account = %account_id,
            network = %network,
            reason,
            rotated,
            "challenge verification failed"
        );
        result
    }

    async fn check(
        &self,
        key: &ChallengeKey,
        payload: &str,
        signature_base64: &str,
    ) -> AuthnResult<bool> {
        if !(MIN_PAYLOAD_LEN..=MAX_PAYLOAD_LEN).contains(&payload.len()) {
            return Err(AuthnError::InvalidArgument(format!(
                "payload must be {MIN_PAYLOAD_LEN}..={MAX_PAYLOAD_LEN} bytes, got {}",
                payload.len()
            )));
        }

        let challenge = self.challenges.get_challenge(key).await?;
        if payload != challenge.to_string() {
            return Err(AuthnError::ChallengeMismatch);
        }

        let public_key = bounded(
            self.timeout,
            "key directory",
            self.directory.resolve(&key.account, key.network),
        )
        .await?;

        let message = hex::encode(payload.as_bytes());
        let signature = STANDARD
            .decode(signature_base64)
            .map_err(|e| AuthnError::InvalidArgument(format!("signature is not base64: {e}")))?;

        if !self
            .verifier
            .verify(&public_key, message.as_bytes(), &signature)?
        {
            return Ok(false);
        }

        match self.challenges.consume_challenge(key, challenge).await? {
            Some(_) => Ok(true),
            None => Err(AuthnError::ChallengeMismatch),
        }
    }
}
