// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signature verification, dispatched on key algorithm.
//!
//! | Algorithm | Key | Signature | Primitive |
//! |-----------|-----|-----------|-----------|
//! | Ed25519 | 32 bytes | 64 bytes | `ring` |
//! | ECDSA secp256k1 | SEC1 point (33 or 65 bytes) | 64-byte `r‖s` or DER | `k256` over a Keccak-256 prehash |
//!
//! secp256k1 signatures are checked against `keccak256(message)`, the digest
//! ledger wallets sign with for that key type.
//!
//! A decodable signature that does not match yields `Ok(false)`. Undecodable
//! input yields an error, so callers can tell a wrong key apart from garbage.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use ring::signature::{UnparsedPublicKey, ED25519};
use sha3::{Digest, Keccak256};

use crate::error::{AuthnError, AuthnResult};
use crate::models::{KeyAlgorithm, PublicKeyRecord};

const ED25519_PUBLIC_KEY_LEN: usize = 32;
const ED25519_SIGNATURE_LEN: usize = 64;
const ECDSA_COMPACT_SIGNATURE_LEN: usize = 64;

/// Verifies signatures against resolved account keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureVerifier;

impl SignatureVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Verify `signature` over `message` with `public_key`.
    ///
    /// # Returns
    /// * `Ok(true)` if the signature matches
    /// * `Ok(false)` if it decodes but does not match
    /// * `Err(UnsupportedAlgorithm)` for `KeyAlgorithm::Invalid`
    /// * `Err(InvalidSignatureEncoding)` / `Err(MalformedPublicKey)` for undecodable input
    pub fn verify(
        &self,
        public_key: &PublicKeyRecord,
        message: &[u8],
        signature: &[u8],
    ) -> AuthnResult<bool> {
        match public_key.algorithm {
            KeyAlgorithm::Ed25519 => verify_ed25519(&public_key.key, message, signature),
            KeyAlgorithm::EcdsaSecp256k1 => verify_secp256k1(&public_key.key, message, signature),
            KeyAlgorithm::Invalid => Err(AuthnError::UnsupportedAlgorithm(
                public_key.algorithm.to_string(),
            )),
        }
    }
}

fn verify_ed25519(key: &[u8], message: &[u8], signature: &[u8]) -> AuthnResult<bool> {
    if key.len() != ED25519_PUBLIC_KEY_LEN {
        return Err(AuthnError::MalformedPublicKey(format!(
            "Ed25519 key must be {ED25519_PUBLIC_KEY_LEN} bytes, got {}",
            key.len()
        )));
    }
    if signature.len() != ED25519_SIGNATURE_LEN {
        return Err(AuthnError::InvalidSignatureEncoding(format!(
            "Ed25519 signature must be {ED25519_SIGNATURE_LEN} bytes, got {}",
            signature.len()
        )));
    }

    // ring verifies in constant time and reports every mismatch the same way
    Ok(UnparsedPublicKey::new(&ED25519, key)
        .verify(message, signature)
        .is_ok())
}

fn verify_secp256k1(key: &[u8], message: &[u8], signature: &[u8]) -> AuthnResult<bool> {
    let verifying_key = k256::ecdsa::VerifyingKey::from_sec1_bytes(key)
        .map_err(|e| AuthnError::MalformedPublicKey(format!("secp256k1 key: {e}")))?;

    let signature = if signature.len() == ECDSA_COMPACT_SIGNATURE_LEN {
        k256::ecdsa::Signature::from_slice(signature)
    } else {
        k256::ecdsa::Signature::from_der(signature)
    }
    .map_err(|e| AuthnError::InvalidSignatureEncoding(format!("secp256k1 signature: {e}")))?;

    let digest = Keccak256::digest(message);
    Ok(verifying_key.verify_prehash(&digest, &signature).is_ok())
}
