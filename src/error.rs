// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error taxonomy shared by every authentication component.

use crate::directory::DirectoryError;
use crate::storage::StorageError;

/// Authentication and authorization error.
///
/// Callers outside this crate should only ever see [`AuthnError::Unauthorized`]
/// from the authorization path; the finer-grained variants are returned by the
/// challenge flow, where the caller decides whether to re-issue a challenge.
#[derive(Debug, thiserror::Error)]
pub enum AuthnError {
    /// Malformed account id, out-of-range payload length, bad base64.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No challenge or key record for the (account, network) pair.
    #[error("not found: {0}")]
    NotFound(String),

    /// Key directory or challenge storage failed or timed out.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Key algorithm is `Invalid` or not recognised.
    #[error("unsupported key algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Signature bytes cannot be decoded for the key algorithm.
    #[error("invalid signature encoding: {0}")]
    InvalidSignatureEncoding(String),

    /// Public key bytes are not a valid key for their algorithm.
    #[error("malformed public key: {0}")]
    MalformedPublicKey(String),

    /// Payload does not encode the outstanding challenge.
    #[error("payload does not match the outstanding challenge")]
    ChallengeMismatch,

    /// Uniform authorization failure.
    #[error("unauthorized")]
    Unauthorized,

    /// Bearer credential could not be minted.
    #[error("credential error: {0}")]
    Credential(String),
}

impl AuthnError {
    /// Stable short code, used as the `reason` field in decision logs.
    pub fn code(&self) -> &'static str {
        match self {
            AuthnError::InvalidArgument(_) => "invalid_argument",
            AuthnError::NotFound(_) => "not_found",
            AuthnError::UpstreamUnavailable(_) => "upstream_unavailable",
            AuthnError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            AuthnError::InvalidSignatureEncoding(_) => "invalid_signature_encoding",
            AuthnError::MalformedPublicKey(_) => "malformed_public_key",
            AuthnError::ChallengeMismatch => "challenge_mismatch",
            AuthnError::Unauthorized => "unauthorized",
            AuthnError::Credential(_) => "credential_error",
        }
    }
}

impl From<StorageError> for AuthnError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(what) => AuthnError::NotFound(what),
            other => AuthnError::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl From<DirectoryError> for AuthnError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::NotFound(what) => AuthnError::NotFound(what),
            DirectoryError::Unavailable(msg) => AuthnError::UpstreamUnavailable(msg),
        }
    }
}

/// Result type for authentication operations.
pub type AuthnResult<T> = Result<T, AuthnError>;
