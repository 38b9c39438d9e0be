// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reasons an authorization decision came out negative.
//!
//! Callers only ever see the uniform `false` / `Unauthorized`. The reason is
//! recorded in the decision log.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No authorization header present
    MissingAuthHeader,
    /// Not `Bearer <token>`, or an empty token
    InvalidAuthHeader,
    /// Token is not a JWT, or its claims are missing or mistyped
    MalformedToken,
    /// Signature does not verify under the server secret
    InvalidSignature,
    /// Header names an algorithm other than HS256
    InvalidAlgorithm,
    /// `now >= exp`
    TokenExpired,
    /// Valid credential without the required role
    InsufficientPermissions,
}

impl DenyReason {
    /// Get the error code for this reason.
    pub fn error_code(&self) -> &'static str {
        match self {
            DenyReason::MissingAuthHeader => "missing_auth_header",
            DenyReason::InvalidAuthHeader => "invalid_auth_header",
            DenyReason::MalformedToken => "malformed_token",
            DenyReason::InvalidSignature => "invalid_signature",
            DenyReason::InvalidAlgorithm => "invalid_algorithm",
            DenyReason::TokenExpired => "token_expired",
            DenyReason::InsufficientPermissions => "insufficient_permissions",
        }
    }
}

impl From<&jsonwebtoken::errors::Error> for DenyReason {
    fn from(e: &jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::InvalidSignature => DenyReason::InvalidSignature,
            ErrorKind::InvalidAlgorithm => DenyReason::InvalidAlgorithm,
            ErrorKind::ExpiredSignature => DenyReason::TokenExpired,
            _ => DenyReason::MalformedToken,
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::MissingAuthHeader => write!(f, "Authorization header is required"),
            DenyReason::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            DenyReason::MalformedToken => write!(f, "Token is malformed"),
            DenyReason::InvalidSignature => write!(f, "Token signature is invalid"),
            DenyReason::InvalidAlgorithm => write!(f, "Token algorithm is not accepted"),
            DenyReason::TokenExpired => write!(f, "Token has expired"),
            DenyReason::InsufficientPermissions => {
                write!(f, "Insufficient permissions for this operation")
            }
        }
    }
}
