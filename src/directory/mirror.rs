// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mirror node key lookups.
//!
//! Fetches `GET {base}/api/v1/accounts/{shard.realm.num}` and reads the
//! account's `key` object:
//!
//! ```json
//! { "account": "0.0.4821", "key": { "_type": "ED25519", "key": "8f3c...e1" } }
//! ```
//!
//! `key.key` is hex, either raw (32-byte Ed25519, 33-byte compressed
//! secp256k1) or wrapped in a DER SubjectPublicKeyInfo. Key types other than
//! `ED25519` and `ECDSA_SECP256K1` (threshold lists, contract ids) resolve to
//! [`KeyAlgorithm::Invalid`] and are rejected by the verifier.
//!
//! ## Security
//!
//! - HTTPS only in production (base URLs come from configuration)
//! - One request per lookup, no retries; wrap in [`super::CachedKeyDirectory`]
//!   to absorb repeat lookups

use std::time::Duration;

use async_trait::async_trait;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::pkcs8::DecodePublicKey;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use super::{DirectoryError, KeyDirectory};
use crate::models::{AccountId, KeyAlgorithm, Network, PublicKeyRecord};

/// DER SubjectPublicKeyInfo prefix of an Ed25519 public key.
const ED25519_SPKI_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

/// Mirror node base URL per network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorNodeUrls {
    pub testnet: Url,
    pub mainnet: Url,
    pub previewnet: Url,
}

impl MirrorNodeUrls {
    pub fn for_network(&self, network: Network) -> &Url {
        match network {
            Network::Testnet => &self.testnet,
            Network::Mainnet => &self.mainnet,
            Network::Previewnet => &self.previewnet,
        }
    }
}

/// Mirror node account response (only the fields we read).
#[derive(Debug, Deserialize)]
struct AccountResponse {
    #[serde(default)]
    key: Option<MirrorKey>,
}

#[derive(Debug, Deserialize)]
struct MirrorKey {
    #[serde(rename = "_type")]
    key_type: String,
    key: String,
}

/// Key directory backed by the public mirror node REST API.
#[derive(Clone)]
pub struct MirrorNodeDirectory {
    urls: MirrorNodeUrls,
    client: reqwest::Client,
}

impl MirrorNodeDirectory {
    /// Create a directory client.
    ///
    /// `timeout` bounds each HTTP request end to end.
    pub fn new(urls: MirrorNodeUrls, timeout: Duration) -> Result<Self, DirectoryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DirectoryError::Unavailable(format!("HTTP client: {e}")))?;
        Ok(Self { urls, client })
    }

    fn account_url(&self, account: &AccountId, network: Network) -> String {
        let base = self.urls.for_network(network).as_str().trim_end_matches('/');
        format!("{base}/api/v1/accounts/{account}")
    }
}

#[async_trait]
impl KeyDirectory for MirrorNodeDirectory {
    async fn resolve(
        &self,
        account: &AccountId,
        network: Network,
    ) -> Result<PublicKeyRecord, DirectoryError> {
        let url = self.account_url(account, network);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DirectoryError::NotFound(format!("{account}@{network}")));
        }
        if !response.status().is_success() {
            return Err(DirectoryError::Unavailable(format!(
                "HTTP {} from mirror node",
                response.status()
            )));
        }

        let body: AccountResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        let key = body
            .key
            .ok_or_else(|| DirectoryError::NotFound(format!("{account}@{network} has no key")))?;

        decode_mirror_key(&key.key_type, &key.key)
    }
}

/// Turn a mirror node `{_type, key}` pair into a key record.
fn decode_mirror_key(key_type: &str, key_hex: &str) -> Result<PublicKeyRecord, DirectoryError> {
    let algorithm = match key_type {
        "ED25519" => KeyAlgorithm::Ed25519,
        "ECDSA_SECP256K1" => KeyAlgorithm::EcdsaSecp256k1,
        _ => KeyAlgorithm::Invalid,
    };

    let bytes = hex::decode(key_hex.trim_start_matches("0x"))
        .map_err(|e| DirectoryError::Unavailable(format!("undecodable key hex: {e}")))?;

    let key = match algorithm {
        KeyAlgorithm::Ed25519 if bytes.starts_with(&ED25519_SPKI_PREFIX) => {
            bytes[ED25519_SPKI_PREFIX.len()..].to_vec()
        }
        KeyAlgorithm::EcdsaSecp256k1 if bytes.first() == Some(&0x30) => {
            let point = k256::PublicKey::from_public_key_der(&bytes)
                .map_err(|e| DirectoryError::Unavailable(format!("undecodable DER key: {e}")))?;
            point.to_encoded_point(true).as_bytes().to_vec()
        }
        _ => bytes,
    };

    Ok(PublicKeyRecord::new(key, algorithm))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(base: &str) -> MirrorNodeUrls {
        let url = Url::parse(base).unwrap();
        MirrorNodeUrls {
            testnet: url.clone(),
            mainnet: url.clone(),
            previewnet: url,
        }
    }

    #[test]
    fn raw_ed25519_key_is_kept() {
        let hex_key = "0aa8e21064c61eab86e2a9c164565b4e7a9a4146106e0a6cd03a8c395a110e92";
        let record = decode_mirror_key("ED25519", hex_key).unwrap();
        assert_eq!(record.algorithm, KeyAlgorithm::Ed25519);
        assert_eq!(record.key, hex::decode(hex_key).unwrap());
    }

    #[test]
    fn der_wrapped_ed25519_key_is_unwrapped() {
        let raw = "0aa8e21064c61eab86e2a9c164565b4e7a9a4146106e0a6cd03a8c395a110e92";
        let der = format!("302a300506032b6570032100{raw}");
        let record = decode_mirror_key("ED25519", &der).unwrap();
        assert_eq!(record.key.len(), 32);
        assert_eq!(record.key, hex::decode(raw).unwrap());
    }

    #[test]
    fn der_wrapped_secp256k1_key_becomes_compressed_point() {
        use k256::ecdsa::SigningKey;
        use k256::pkcs8::EncodePublicKey;

        let signing = SigningKey::from_slice(&[7u8; 32]).unwrap();
        let public = k256::PublicKey::from(signing.verifying_key());
        let der = public.to_public_key_der().unwrap();

        let record = decode_mirror_key("ECDSA_SECP256K1", &hex::encode(der.as_bytes())).unwrap();
        assert_eq!(record.algorithm, KeyAlgorithm::EcdsaSecp256k1);
        assert_eq!(record.key, public.to_encoded_point(true).as_bytes().to_vec());
    }

    #[test]
    fn other_key_types_resolve_to_invalid() {
        let record = decode_mirror_key("ProtobufEncoded", "2a0a").unwrap();
        assert_eq!(record.algorithm, KeyAlgorithm::Invalid);
    }

    #[test]
    fn bad_hex_is_unavailable() {
        let result = decode_mirror_key("ED25519", "not-hex");
        assert!(matches!(result, Err(DirectoryError::Unavailable(_))));
    }

    #[test]
    fn account_url_per_network() {
        let directory = MirrorNodeDirectory::new(
            MirrorNodeUrls {
                testnet: Url::parse("https://testnet.mirrornode.hedera.com/").unwrap(),
                mainnet: Url::parse("https://mainnet-public.mirrornode.hedera.com").unwrap(),
                previewnet: Url::parse("https://previewnet.mirrornode.hedera.com").unwrap(),
            },
            Duration::from_secs(5),
        )
        .unwrap();

        let account = AccountId::new(0, 0, 4821);
        assert_eq!(
            directory.account_url(&account, Network::Testnet),
            "https://testnet.mirrornode.hedera.com/api/v1/accounts/0.0.4821"
        );
        assert_eq!(
            directory.account_url(&account, Network::Mainnet),
            "https://mainnet-public.mirrornode.hedera.com/api/v1/accounts/0.0.4821"
        );
    }

    #[test]
    fn account_response_without_key_parses() {
        let body: AccountResponse = serde_json::from_str(r#"{"account":"0.0.5"}"#).unwrap();
        assert!(body.key.is_none());

        let body: AccountResponse = serde_json::from_str(
            r#"{"account":"0.0.5","key":{"_type":"ED25519","key":"00"},"balance":{"balance":1}}"#,
        )
        .unwrap();
        assert_eq!(body.key.unwrap().key_type, "ED25519");
    }

    #[tokio::test]
    async fn unreachable_mirror_node_is_unavailable() {
        let directory =
            MirrorNodeDirectory::new(urls("http://127.0.0.1:1"), Duration::from_secs(2)).unwrap();
        let result = directory
            .resolve(&AccountId::new(0, 0, 2), Network::Testnet)
            .await;
        assert!(matches!(result, Err(DirectoryError::Unavailable(_))));
    }
}
