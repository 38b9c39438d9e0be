// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer credential authorization.
//!
//! ## Checks, in order
//!
//! 1. `Authorization: Bearer <token>` with a non-empty token
//! 2. HS256 signature under the server secret (algorithm pinned)
//! 3. Typed claims: `sub`, `roles` (strings) and `exp` (integer) present
//! 4. `now < exp`
//! 5. Required role present verbatim in `roles`
//!
//! Every failure collapses to the same negative answer. The specific
//! [`DenyReason`] goes to the log, one record per decision.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::{info, warn};

use super::claims::CredentialClaims;
use super::error::DenyReason;
use crate::config::{AuthConfig, JwtSecret};
use crate::error::{AuthnError, AuthnResult};

pub struct TokenAuthorizer {
    key: DecodingKey,
    validation: Validation,
}

impl TokenAuthorizer {
    pub fn new(secret: &JwtSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against an explicit clock, without leeway
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret)
    }

    /// Whether `authorization` grants `required_role` right now.
    pub fn authorize(&self, authorization: Option<&str>, required_role: &str) -> bool {
        self.authorized_claims(authorization, required_role).is_ok()
    }

    /// Validated claims, for callers that need the subject.
    ///
    /// Fails with [`AuthnError::Unauthorized`] whatever the cause.
    pub fn authorized_claims(
        &self,
        authorization: Option<&str>,
        required_role: &str,
    ) -> AuthnResult<CredentialClaims> {
        self.authorized_claims_at(authorization, required_role, chrono::Utc::now().timestamp())
    }

    pub fn authorized_claims_at(
        &self,
        authorization: Option<&str>,
        required_role: &str,
        now: i64,
    ) -> AuthnResult<CredentialClaims> {
        match self.check(authorization, required_role, now) {
            Ok(claims) => {
                info!(
                    account = %claims.sub,
                    network = %claims.network,
                    role = required_role,
                    "authorization granted"
                );
                Ok(claims)
            }
            Err(reason) => {
                warn!(
                    role = required_role,
                    reason = reason.error_code(),
                    "authorization denied"
                );
                Err(AuthnError::Unauthorized)
            }
        }
    }

    fn check(
        &self,
        authorization: Option<&str>,
        required_role: &str,
        now: i64,
    ) -> Result<CredentialClaims, DenyReason> {
        let header = authorization.ok_or(DenyReason::MissingAuthHeader)?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(DenyReason::InvalidAuthHeader)?;

        let claims = decode::<CredentialClaims>(token, &self.key, &self.validation)
            .map_err(|e| DenyReason::from(&e))?
            .claims;

        if claims.is_expired_at(now) {
            return Err(DenyReason::TokenExpired);
        }
        if !claims.has_role(required_role) {
            return Err(DenyReason::InsufficientPermissions);
        }
        Ok(claims)
    }
}
