// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Wallet challenge-response authentication and role-based authorization.
//!
//! ## Auth Flow
//!
//! 1. Client requests a challenge for `(account, network)`
//! 2. Client signs `hex(decimal(challenge))` with the account key and submits
//!    the decimal payload plus base64 signature
//! 3. Server:
//!    - Checks the payload is the outstanding challenge
//!    - Resolves the account key from the key directory
//!    - Verifies the signature (Ed25519 or ECDSA secp256k1)
//!    - Retires the challenge, whatever the outcome
//! 4. On success, [`CredentialIssuer`] mints an HS256 bearer credential
//!    carrying the account's roles
//! 5. Protected operations call [`TokenAuthorizer::authorize`] with the
//!    `Authorization` header and the role they require
//!
//! ## Security
//!
//! - A challenge is single-use; replaying a signature fails
//! - Concurrent submissions of one signature succeed at most once
//! - Credential algorithm is pinned to HS256
//! - Authorization failures are indistinguishable to the caller

pub mod challenge;
pub mod claims;
pub mod error;
pub mod issuer;
pub mod roles;
pub mod signature;
pub mod token;

pub use challenge::ChallengeAuthenticator;
pub use claims::CredentialClaims;
pub use error::DenyReason;
pub use issuer::CredentialIssuer;
pub use roles::Role;
pub use signature::SignatureVerifier;
pub use token::TokenAuthorizer;
