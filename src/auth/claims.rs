// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer credential claims.

use serde::{Deserialize, Serialize};

/// Claims carried by a bearer credential.
///
/// Decoded in one typed step: a missing or mistyped `sub`, `roles` or `exp`
/// fails the whole credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Account id, canonical `shard.realm.num`
    pub sub: String,

    /// Network the account authenticated on
    #[serde(default)]
    pub network: String,

    pub roles: Vec<String>,

    /// Issued at (Unix seconds)
    #[serde(default)]
    pub iat: i64,

    /// Expiry (Unix seconds). Valid while `now < exp`.
    pub exp: i64,
}

impl CredentialClaims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> CredentialClaims {
        CredentialClaims {
            sub: "0.0.4821".to_string(),
            network: "testnet".to_string(),
            roles: vec!["USER".to_string()],
            iat: 1_700_000_000,
            exp: 1_700_003_600,
        }
    }

    #[test]
    fn role_match_is_exact() {
        let claims = sample_claims();
        assert!(claims.has_role("USER"));
        assert!(!claims.has_role("user"));
        assert!(!claims.has_role("ADMIN"));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let claims = sample_claims();
        assert!(!claims.is_expired_at(claims.exp - 1));
        assert!(claims.is_expired_at(claims.exp));
        assert!(claims.is_expired_at(claims.exp + 1));
    }

    #[test]
    fn optional_fields_default() {
        let claims: CredentialClaims =
            serde_json::from_str(r#"{"sub":"0.0.1","roles":[],"exp":5}"#).unwrap();
        assert_eq!(claims.network, "");
        assert_eq!(claims.iat, 0);
    }

    #[test]
    fn required_fields_must_be_present_and_typed() {
        for body in [
            r#"{"sub":"0.0.1","roles":["USER"]}"#,
            r#"{"sub":"0.0.1","exp":5}"#,
            r#"{"sub":"0.0.1","roles":"USER","exp":5}"#,
            r#"{"sub":"0.0.1","roles":[1,2],"exp":5}"#,
            r#"{"sub":"0.0.1","roles":["USER"],"exp":"5"}"#,
        ] {
            assert!(
                serde_json::from_str::<CredentialClaims>(body).is_err(),
                "expected {body} to be rejected"
            );
        }
    }
}
