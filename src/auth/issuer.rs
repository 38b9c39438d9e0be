// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mints HS256 bearer credentials after a successful challenge verification.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use super::claims::CredentialClaims;
use crate::config::{AuthConfig, JwtSecret};
use crate::error::{AuthnError, AuthnResult};
use crate::models::{AccountId, ChallengeKey, Network};
use crate::storage::RoleStore;
use crate::timeout::bounded;

pub struct CredentialIssuer {
    key: EncodingKey,
    ttl: Duration,
    roles: Arc<dyn RoleStore>,
    timeout: Duration,
}

impl CredentialIssuer {
    pub fn new(
        secret: &JwtSecret,
        ttl: Duration,
        roles: Arc<dyn RoleStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            ttl,
            roles,
            timeout,
        }
    }

    pub fn from_config(config: &AuthConfig, roles: Arc<dyn RoleStore>) -> Self {
        Self::new(
            &config.jwt_secret,
            config.credential_ttl,
            roles,
            config.upstream_timeout,
        )
    }

    /// Mint a credential for `account` carrying exactly `roles`.
    pub fn issue(
        &self,
        account: &AccountId,
        network: Network,
        roles: &[String],
    ) -> AuthnResult<String> {
        self.issue_at(account, network, roles, chrono::Utc::now().timestamp())
    }

    /// Mint a credential with the roles assigned in the role store.
    pub async fn issue_for(&self, account: &AccountId, network: Network) -> AuthnResult<String> {
        let key = ChallengeKey::new(*account, network);
        let roles = bounded(self.timeout, "role storage", self.roles.roles(&key)).await?;
        self.issue(account, network, &roles)
    }

    pub(crate) fn issue_at(
        &self,
        account: &AccountId,
        network: Network,
        roles: &[String],
        now: i64,
    ) -> AuthnResult<String> {
        let ttl = i64::try_from(self.ttl.as_secs())
            .map_err(|_| AuthnError::Credential("credential lifetime out of range".to_string()))?;

        let claims = CredentialClaims {
            sub: account.to_string(),
            network: network.to_string(),
            roles: roles.to_vec(),
            iat: now,
            exp: now.saturating_add(ttl),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| AuthnError::Credential(e.to_string()))
    }

    /// `Authorization` header value for `token`.
    pub fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryChallengeStore;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    const SECRET: &[u8] = b"test-secret-test-secret-test-secret!";

    fn issuer(roles: Arc<dyn RoleStore>) -> CredentialIssuer {
        CredentialIssuer::new(
            &JwtSecret::new(SECRET).unwrap(),
            Duration::from_secs(3600),
            roles,
            Duration::from_secs(1),
        )
    }

    fn read(token: &str) -> CredentialClaims {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        decode::<CredentialClaims>(token, &DecodingKey::from_secret(SECRET), &validation)
            .unwrap()
            .claims
    }

    #[test]
    fn issued_claims_carry_account_network_and_lifetime() {
        let issuer = issuer(Arc::new(InMemoryChallengeStore::new()));
        let token = issuer
            .issue_at(
                &AccountId::new(0, 0, 4821),
                Network::Testnet,
                &["USER".to_string()],
                1_700_000_000,
            )
            .unwrap();

        let claims = read(&token);
        assert_eq!(claims.sub, "0.0.4821");
        assert_eq!(claims.network, "testnet");
        assert_eq!(claims.roles, vec!["USER".to_string()]);
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_003_600);
    }

    #[tokio::test]
    async fn issue_for_reads_assigned_roles() {
        let store = Arc::new(InMemoryChallengeStore::new());
        let account = AccountId::new(0, 0, 77);
        store
            .set_roles(
                &ChallengeKey::new(account, Network::Mainnet),
                &["ADMIN".to_string(), "USER".to_string()],
            )
            .await
            .unwrap();

        let issuer = issuer(store);
        let claims = read(&issuer.issue_for(&account, Network::Mainnet).await.unwrap());
        assert_eq!(claims.roles, vec!["ADMIN".to_string(), "USER".to_string()]);

        // Same account, other network: nothing assigned
        let claims = read(&issuer.issue_for(&account, Network::Testnet).await.unwrap());
        assert!(claims.roles.is_empty());
    }

    #[test]
    fn bearer_header_value() {
        assert_eq!(CredentialIssuer::bearer("abc.def.ghi"), "Bearer abc.def.ghi");
    }
}
